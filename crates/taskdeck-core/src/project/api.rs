//! Project endpoints trait.

use super::model::{NewProject, Project, ProjectDetail, ProjectId, ProjectPatch};
use crate::error::ApiError;
use async_trait::async_trait;

/// The `/projects` surface of the remote API.
///
/// The server owns ids and the merged result of updates; deleting a project
/// cascades to its tasks server-side.
#[async_trait]
pub trait ProjectApi: Send + Sync {
    /// `GET /projects/`
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError>;

    /// `GET /projects/{id}`, including the project's tasks.
    async fn get_project(&self, id: ProjectId) -> Result<ProjectDetail, ApiError>;

    /// `POST /projects/`
    async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError>;

    /// `PUT /projects/{id}` with a partial body.
    async fn update_project(&self, id: ProjectId, patch: &ProjectPatch)
    -> Result<Project, ApiError>;

    /// `DELETE /projects/{id}`
    async fn delete_project(&self, id: ProjectId) -> Result<(), ApiError>;
}
