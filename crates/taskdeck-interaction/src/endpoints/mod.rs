//! Trait implementations for each REST resource.

mod auth;
mod chat;
mod projects;
mod tasks;
