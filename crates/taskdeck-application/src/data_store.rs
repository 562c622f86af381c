//! DataStore - the client-side cache of projects and tasks.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use taskdeck_core::ApiError;
use taskdeck_core::auth::SessionGate;
use taskdeck_core::project::{
    NewProject, Project, ProjectApi, ProjectDetail, ProjectId, ProjectPatch,
};
use taskdeck_core::stats::DashboardStats;
use taskdeck_core::task::{NewTask, Task, TaskApi, TaskId, TaskPatch, TaskQuery};
use tokio::sync::RwLock;

use crate::optimistic::optimistic_update;

/// Point-in-time copy of everything the store holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub projects_loading: bool,
    pub tasks_loading: bool,
    pub projects_error: Option<String>,
    pub tasks_error: Option<String>,
}

/// Owns the in-memory project and task collections for the signed-in user.
///
/// Responsibilities:
/// - Mirror the server's collections (fetches replace them wholesale)
/// - Apply confirmed create/update/delete results locally
/// - Cascade project deletion to the project's tasks
/// - Toggle task status optimistically, rolling back on failure
///
/// Fetches are skipped while the session is not authenticated. An
/// `Unauthorized` response from any call invalidates the session.
///
/// The state lock is never held across a network call, so the response
/// that resolves last wins when calls race.
pub struct DataStore {
    projects_api: Arc<dyn ProjectApi>,
    tasks_api: Arc<dyn TaskApi>,
    session: Arc<dyn SessionGate>,
    state: RwLock<StoreSnapshot>,
}

impl DataStore {
    pub fn new(
        projects_api: Arc<dyn ProjectApi>,
        tasks_api: Arc<dyn TaskApi>,
        session: Arc<dyn SessionGate>,
    ) -> Self {
        Self {
            projects_api,
            tasks_api,
            session,
            state: RwLock::new(StoreSnapshot::default()),
        }
    }

    // ============================================================================
    // Collection fetches
    // ============================================================================

    /// Replaces the local project list with the server's.
    ///
    /// # Errors
    ///
    /// The error is also recorded as the project collection error; the
    /// previous list stays in place.
    pub async fn fetch_projects(&self) -> Result<(), ApiError> {
        if !self.session.is_authenticated().await {
            tracing::debug!("Skipping project fetch while unauthenticated");
            return Ok(());
        }

        {
            let mut state = self.state.write().await;
            state.projects_loading = true;
            state.projects_error = None;
        }

        let result = self.observe(self.projects_api.list_projects().await).await;

        let mut state = self.state.write().await;
        state.projects_loading = false;
        match result {
            Ok(projects) => {
                tracing::debug!(count = projects.len(), "Fetched projects");
                state.projects = projects;
                Ok(())
            }
            Err(e) => {
                state.projects_error = Some(e.message.clone());
                Err(e)
            }
        }
    }

    /// Replaces the local task list with the server's, filtered by `query`.
    ///
    /// # Errors
    ///
    /// Same contract as [`fetch_projects`](Self::fetch_projects).
    pub async fn fetch_tasks(&self, query: &TaskQuery) -> Result<(), ApiError> {
        if !self.session.is_authenticated().await {
            tracing::debug!("Skipping task fetch while unauthenticated");
            return Ok(());
        }

        {
            let mut state = self.state.write().await;
            state.tasks_loading = true;
            state.tasks_error = None;
        }

        let result = self.observe(self.tasks_api.list_tasks(query).await).await;

        let mut state = self.state.write().await;
        state.tasks_loading = false;
        match result {
            Ok(tasks) => {
                tracing::debug!(count = tasks.len(), "Fetched tasks");
                state.tasks = tasks;
                Ok(())
            }
            Err(e) => {
                state.tasks_error = Some(e.message.clone());
                Err(e)
            }
        }
    }

    /// Fetches projects and every task concurrently.
    ///
    /// # Errors
    ///
    /// The first failure; both fetches still run to completion.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let query = TaskQuery::default();
        let (projects, tasks) = tokio::join!(self.fetch_projects(), self.fetch_tasks(&query));
        projects.and(tasks)
    }

    /// Reads one project (with its tasks) without touching the cache.
    pub async fn fetch_project(&self, id: ProjectId) -> Result<ProjectDetail, ApiError> {
        self.observe(self.projects_api.get_project(id).await).await
    }

    /// Reads one task without touching the cache.
    pub async fn fetch_task(&self, id: TaskId) -> Result<Task, ApiError> {
        self.observe(self.tasks_api.get_task(id).await).await
    }

    // ============================================================================
    // Projects
    // ============================================================================

    pub async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError> {
        let created = self
            .observe(self.projects_api.create_project(project).await)
            .await?;
        upsert(&mut self.state.write().await.projects, created.clone(), |p| p.id);
        tracing::info!(id = created.id, "Created project");
        Ok(created)
    }

    /// Sends `patch` and stores the server's merged result.
    pub async fn update_project(
        &self,
        id: ProjectId,
        patch: &ProjectPatch,
    ) -> Result<Project, ApiError> {
        let updated = self
            .observe(self.projects_api.update_project(id, patch).await)
            .await?;
        replace(&mut self.state.write().await.projects, updated.clone(), |p| p.id);
        Ok(updated)
    }

    /// Deletes the project and every cached task filed under it.
    pub async fn delete_project(&self, id: ProjectId) -> Result<(), ApiError> {
        self.observe(self.projects_api.delete_project(id).await)
            .await?;

        let mut state = self.state.write().await;
        state.projects.retain(|p| p.id != id);
        let before = state.tasks.len();
        state.tasks.retain(|t| t.project_id != Some(id));
        tracing::info!(
            id,
            cascaded_tasks = before - state.tasks.len(),
            "Deleted project"
        );
        Ok(())
    }

    // ============================================================================
    // Tasks
    // ============================================================================

    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        let created = self.observe(self.tasks_api.create_task(task).await).await?;
        upsert(&mut self.state.write().await.tasks, created.clone(), |t| t.id);
        tracing::info!(id = created.id, "Created task");
        Ok(created)
    }

    /// Sends `patch` and stores the server's merged result.
    pub async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, ApiError> {
        let updated = self
            .observe(self.tasks_api.update_task(id, patch).await)
            .await?;
        replace(&mut self.state.write().await.tasks, updated.clone(), |t| t.id);
        Ok(updated)
    }

    pub async fn delete_task(&self, id: TaskId) -> Result<(), ApiError> {
        self.observe(self.tasks_api.delete_task(id).await).await?;
        self.state.write().await.tasks.retain(|t| t.id != id);
        tracing::info!(id, "Deleted task");
        Ok(())
    }

    /// Flips a task between done and not done.
    ///
    /// The new status is applied locally before the server answers: anything
    /// not completed becomes `completed`, `completed` becomes `todo`.
    ///
    /// # Returns
    ///
    /// The task as cached after the toggle, or `None` when the id is not in
    /// the local collection (no request is sent).
    ///
    /// # Errors
    ///
    /// The local status is restored before the error is returned.
    pub async fn toggle_task_status(&self, id: TaskId) -> Result<Option<Task>, ApiError> {
        let outcome = optimistic_update(
            &self.state,
            |state| state.tasks.iter().find(|t| t.id == id).map(|t| t.status),
            |state, status| {
                if let Some(task) = state.tasks.iter_mut().find(|t| t.id == id) {
                    task.status = status;
                }
            },
            |status| status.toggled(),
            |status| async move {
                let patch = TaskPatch::status(status);
                self.tasks_api.update_task(id, &patch).await
            },
        )
        .await;

        match self.observe(outcome).await? {
            Some(status) => {
                tracing::debug!(id, %status, "Toggled task status");
                Ok(self.task(id).await)
            }
            None => Ok(None),
        }
    }

    // ============================================================================
    // Derived views
    // ============================================================================

    /// Counts over the cached collections, evaluated at the current instant.
    pub async fn stats(&self) -> DashboardStats {
        self.stats_at(Utc::now()).await
    }

    pub async fn stats_at(&self, now: DateTime<Utc>) -> DashboardStats {
        let state = self.state.read().await;
        DashboardStats::compute(&state.projects, &state.tasks, now)
    }

    /// Cached tasks filed under `project_id`.
    pub async fn tasks_by_project(&self, project_id: ProjectId) -> Vec<Task> {
        self.state
            .read()
            .await
            .tasks
            .iter()
            .filter(|t| t.project_id == Some(project_id))
            .cloned()
            .collect()
    }

    pub async fn clear_errors(&self) {
        let mut state = self.state.write().await;
        state.projects_error = None;
        state.tasks_error = None;
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.read().await.clone()
    }

    pub async fn projects(&self) -> Vec<Project> {
        self.state.read().await.projects.clone()
    }

    pub async fn tasks(&self) -> Vec<Task> {
        self.state.read().await.tasks.clone()
    }

    pub async fn project(&self, id: ProjectId) -> Option<Project> {
        self.state
            .read()
            .await
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub async fn task(&self, id: TaskId) -> Option<Task> {
        self.state
            .read()
            .await
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    pub async fn projects_error(&self) -> Option<String> {
        self.state.read().await.projects_error.clone()
    }

    pub async fn tasks_error(&self) -> Option<String> {
        self.state.read().await.tasks_error.clone()
    }

    async fn observe<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(e) = &result
            && e.is_unauthorized()
        {
            self.session.invalidate().await;
        }
        result
    }
}

/// Replaces the entry with the same id, or appends.
fn upsert<T>(items: &mut Vec<T>, item: T, id: impl Fn(&T) -> i64) {
    let key = id(&item);
    match items.iter_mut().find(|existing| id(existing) == key) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

/// Replaces the entry with the same id; absent entries are left absent.
fn replace<T>(items: &mut [T], item: T, id: impl Fn(&T) -> i64) {
    let key = id(&item);
    if let Some(existing) = items.iter_mut().find(|existing| id(existing) == key) {
        *existing = item;
    }
}
