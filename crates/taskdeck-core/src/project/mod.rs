//! Project domain module.
//!
//! - `model`: `Project` and its request payloads
//! - `api`: remote `/projects` endpoints trait

pub mod api;
mod model;

pub use api::ProjectApi;
pub use model::{NewProject, Project, ProjectDetail, ProjectId, ProjectPatch};
