//! Remote API client for Taskdeck.
//!
//! [`HttpApiClient`] implements every remote trait from `taskdeck-core`
//! (`AuthApi`, `ProjectApi`, `TaskApi`, `ChatApi`) over reqwest.

pub mod client;
mod endpoints;

pub use client::HttpApiClient;
