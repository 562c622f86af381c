//! Task endpoints trait.

use super::model::{NewTask, Task, TaskId, TaskPatch, TaskQuery};
use crate::error::ApiError;
use async_trait::async_trait;

/// The `/tasks` surface of the remote API.
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// `GET /tasks/?project_id&status&priority`
    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, ApiError>;

    /// `GET /tasks/{id}`
    async fn get_task(&self, id: TaskId) -> Result<Task, ApiError>;

    /// `POST /tasks/`
    async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError>;

    /// `PUT /tasks/{id}` with a partial body.
    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, ApiError>;

    /// `DELETE /tasks/{id}`
    async fn delete_task(&self, id: TaskId) -> Result<(), ApiError>;
}
