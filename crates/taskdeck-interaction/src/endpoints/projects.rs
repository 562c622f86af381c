use crate::client::HttpApiClient;
use async_trait::async_trait;
use taskdeck_core::ApiError;
use taskdeck_core::project::{
    NewProject, Project, ProjectApi, ProjectDetail, ProjectId, ProjectPatch,
};

#[async_trait]
impl ProjectApi for HttpApiClient {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get("/projects/").await
    }

    async fn get_project(&self, id: ProjectId) -> Result<ProjectDetail, ApiError> {
        self.get(&format!("/projects/{}", id)).await
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError> {
        self.post("/projects/", project).await
    }

    async fn update_project(
        &self,
        id: ProjectId,
        patch: &ProjectPatch,
    ) -> Result<Project, ApiError> {
        self.put(&format!("/projects/{}", id), patch).await
    }

    async fn delete_project(&self, id: ProjectId) -> Result<(), ApiError> {
        self.delete(&format!("/projects/{}", id)).await
    }
}
