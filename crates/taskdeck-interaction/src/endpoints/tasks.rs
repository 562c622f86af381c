use crate::client::HttpApiClient;
use async_trait::async_trait;
use taskdeck_core::ApiError;
use taskdeck_core::task::{NewTask, Task, TaskApi, TaskId, TaskPatch, TaskQuery};

#[async_trait]
impl TaskApi for HttpApiClient {
    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, ApiError> {
        if query.is_empty() {
            self.get("/tasks/").await
        } else {
            self.get_with_query("/tasks/", query).await
        }
    }

    async fn get_task(&self, id: TaskId) -> Result<Task, ApiError> {
        self.get(&format!("/tasks/{}", id)).await
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        self.post("/tasks/", task).await
    }

    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, ApiError> {
        self.put(&format!("/tasks/{}", id), patch).await
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), ApiError> {
        self.delete(&format!("/tasks/{}", id)).await
    }
}
