//! Task domain module.
//!
//! # Module Structure
//!
//! - `model`: `Task`, status/priority enums, request payloads and filters
//! - `api`: remote `/tasks` endpoints trait
//! - `query`: pure search/sort/group derivations over a task slice

pub mod api;
mod model;
pub mod query;

// Re-export public API
pub use api::TaskApi;
pub use model::{
    NewTask, Priority, Task, TaskFilter, TaskId, TaskPatch, TaskQuery, TaskStatus,
};
