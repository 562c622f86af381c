//! In-memory stand-in for the remote API, shared by the service tests.

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use taskdeck_core::ApiError;
use taskdeck_core::auth::{
    AuthApi, Credentials, ProfileUpdate, Registration, SessionGate, TokenResponse, TokenStore,
    User,
};
use taskdeck_core::chat::{ChatApi, ChatReply, ChatRequest};
use taskdeck_core::project::{
    NewProject, Project, ProjectApi, ProjectDetail, ProjectId, ProjectPatch,
};
use taskdeck_core::task::{
    NewTask, Priority, Task, TaskApi, TaskId, TaskPatch, TaskQuery, TaskStatus,
};
use taskdeck_infrastructure::MemoryTokenStore;
use tokio::sync::Notify;

pub(crate) const VALID_TOKEN: &str = "valid-token";
pub(crate) const GOOD_PASSWORD: &str = "correct-horse";

fn api_error(status: u16, detail: &str) -> ApiError {
    ApiError::from_response(
        status,
        Some(&json!({ "detail": detail })),
        &format!("Request failed with status code {}", status),
    )
}

pub(crate) fn unauthorized() -> ApiError {
    api_error(401, "Could not validate credentials")
}

fn not_found(entity: &str) -> ApiError {
    api_error(404, &format!("{} not found", entity))
}

pub(crate) fn project(id: ProjectId, name: &str) -> Project {
    Project {
        id,
        name: name.to_string(),
        description: None,
        color: None,
        task_count: None,
        created_at: None,
        updated_at: None,
    }
}

pub(crate) fn task(
    id: TaskId,
    title: &str,
    status: TaskStatus,
    project_id: Option<ProjectId>,
) -> Task {
    Task {
        id,
        title: title.to_string(),
        description: None,
        priority: Priority::Medium,
        status,
        due_date: None,
        project_id,
        created_at: None,
        updated_at: None,
    }
}

struct Backing {
    user: User,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    next_id: i64,
    calls: Vec<String>,
    failure: Option<ApiError>,
    omit_tokens: bool,
    chat_reply: ChatReply,
    hold: Option<Arc<Notify>>,
}

/// Mock backend implementing every remote trait.
///
/// Like the real client, a 401 from `current_user` clears the token store.
/// Login, register and the list calls can be held in flight with
/// [`hold_next`](Self::hold_next).
pub(crate) struct MockBackend {
    tokens: MemoryTokenStore,
    inner: Mutex<Backing>,
    paused: AtomicBool,
}

impl MockBackend {
    pub(crate) fn new() -> Self {
        Self {
            tokens: MemoryTokenStore::new(),
            inner: Mutex::new(Backing {
                user: User {
                    id: 1,
                    username: "ada".to_string(),
                    email: "ada@example.com".to_string(),
                },
                projects: Vec::new(),
                tasks: Vec::new(),
                next_id: 100,
                calls: Vec::new(),
                failure: None,
                omit_tokens: false,
                chat_reply: ChatReply::default(),
                hold: None,
            }),
            paused: AtomicBool::new(false),
        }
    }

    pub(crate) fn tokens(&self) -> MemoryTokenStore {
        self.tokens.clone()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// The next call fails with `err`.
    pub(crate) fn fail_next(&self, err: ApiError) {
        self.inner.lock().unwrap().failure = Some(err);
    }

    /// Login and register answer without an access token from now on.
    pub(crate) fn omit_tokens(&self) {
        self.inner.lock().unwrap().omit_tokens = true;
    }

    pub(crate) fn seed_project(&self, project: Project) {
        self.inner.lock().unwrap().projects.push(project);
    }

    pub(crate) fn seed_task(&self, task: Task) {
        self.inner.lock().unwrap().tasks.push(task);
    }

    pub(crate) fn server_tasks(&self) -> Vec<Task> {
        self.inner.lock().unwrap().tasks.clone()
    }

    pub(crate) fn set_chat_reply(&self, reply: ChatReply) {
        self.inner.lock().unwrap().chat_reply = reply;
    }

    /// The next holdable call waits until the returned handle is notified.
    pub(crate) fn hold_next(&self) -> Arc<Notify> {
        let release = Arc::new(Notify::new());
        self.inner.lock().unwrap().hold = Some(release.clone());
        release
    }

    /// Yields until a held call is waiting for its release.
    pub(crate) async fn wait_until_paused(&self) {
        while !self.paused.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
    }

    async fn pause(&self) {
        let hold = self.inner.lock().unwrap().hold.take();
        if let Some(release) = hold {
            self.paused.store(true, Ordering::SeqCst);
            release.notified().await;
            self.paused.store(false, Ordering::SeqCst);
        }
    }

    fn record(&self, call: &str) -> Result<(), ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call.to_string());
        match inner.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn token_response(&self) -> TokenResponse {
        let inner = self.inner.lock().unwrap();
        TokenResponse {
            access_token: (!inner.omit_tokens).then(|| VALID_TOKEN.to_string()),
            token_type: Some("bearer".to_string()),
        }
    }

    fn allocate_id(&self) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        inner.next_id
    }
}

#[async_trait]
impl AuthApi for MockBackend {
    async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError> {
        self.pause().await;
        self.record("login")?;
        if credentials.password != GOOD_PASSWORD {
            return Err(api_error(401, "Incorrect username or password"));
        }
        Ok(self.token_response())
    }

    async fn register(&self, _registration: &Registration) -> Result<TokenResponse, ApiError> {
        self.pause().await;
        self.record("register")?;
        Ok(self.token_response())
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.record("current_user")?;
        if self.tokens.load().unwrap().as_deref() == Some(VALID_TOKEN) {
            Ok(self.inner.lock().unwrap().user.clone())
        } else {
            self.tokens.clear().unwrap();
            Err(unauthorized())
        }
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.record("update_profile")?;
        let mut inner = self.inner.lock().unwrap();
        if let Some(username) = &update.username {
            inner.user.username = username.clone();
        }
        if let Some(email) = &update.email {
            inner.user.email = email.clone();
        }
        Ok(inner.user.clone())
    }
}

#[async_trait]
impl ProjectApi for MockBackend {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.pause().await;
        self.record("list_projects")?;
        Ok(self.inner.lock().unwrap().projects.clone())
    }

    async fn get_project(&self, id: ProjectId) -> Result<ProjectDetail, ApiError> {
        self.record("get_project")?;
        let inner = self.inner.lock().unwrap();
        let project = inner
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| not_found("Project"))?;
        let tasks = inner
            .tasks
            .iter()
            .filter(|t| t.project_id == Some(id))
            .cloned()
            .collect();
        Ok(ProjectDetail { project, tasks })
    }

    async fn create_project(&self, new_project: &NewProject) -> Result<Project, ApiError> {
        self.record("create_project")?;
        let mut created = project(self.allocate_id(), &new_project.name);
        created.description = new_project.description.clone();
        created.color = new_project.color.clone();
        created.task_count = Some(0);
        self.inner.lock().unwrap().projects.push(created.clone());
        Ok(created)
    }

    async fn update_project(
        &self,
        id: ProjectId,
        patch: &ProjectPatch,
    ) -> Result<Project, ApiError> {
        self.record("update_project")?;
        let mut inner = self.inner.lock().unwrap();
        let project = inner
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("Project"))?;
        if let Some(name) = &patch.name {
            project.name = name.clone();
        }
        if let Some(description) = &patch.description {
            project.description = Some(description.clone());
        }
        if let Some(color) = &patch.color {
            project.color = Some(color.clone());
        }
        Ok(project.clone())
    }

    async fn delete_project(&self, id: ProjectId) -> Result<(), ApiError> {
        self.record("delete_project")?;
        let mut inner = self.inner.lock().unwrap();
        if !inner.projects.iter().any(|p| p.id == id) {
            return Err(not_found("Project"));
        }
        inner.projects.retain(|p| p.id != id);
        inner.tasks.retain(|t| t.project_id != Some(id));
        Ok(())
    }
}

#[async_trait]
impl TaskApi for MockBackend {
    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, ApiError> {
        self.pause().await;
        self.record("list_tasks")?;
        Ok(self
            .inner
            .lock()
            .unwrap()
            .tasks
            .iter()
            .filter(|t| query.project_id.is_none_or(|id| t.project_id == Some(id)))
            .filter(|t| query.status.is_none_or(|s| t.status == s))
            .filter(|t| query.priority.is_none_or(|p| t.priority == p))
            .cloned()
            .collect())
    }

    async fn get_task(&self, id: TaskId) -> Result<Task, ApiError> {
        self.record("get_task")?;
        self.inner
            .lock()
            .unwrap()
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| not_found("Task"))
    }

    async fn create_task(&self, new_task: &NewTask) -> Result<Task, ApiError> {
        self.record("create_task")?;
        let mut created = task(
            self.allocate_id(),
            &new_task.title,
            new_task.status.unwrap_or_default(),
            new_task.project_id,
        );
        created.description = new_task.description.clone();
        created.priority = new_task.priority.unwrap_or_default();
        created.due_date = new_task.due_date;
        self.inner.lock().unwrap().tasks.push(created.clone());
        Ok(created)
    }

    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, ApiError> {
        self.record("update_task")?;
        let mut inner = self.inner.lock().unwrap();
        let task = inner
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("Task"))?;
        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        if let Some(description) = &patch.description {
            task.description = Some(description.clone());
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(project_id) = patch.project_id {
            task.project_id = Some(project_id);
        }
        Ok(task.clone())
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), ApiError> {
        self.record("delete_task")?;
        let mut inner = self.inner.lock().unwrap();
        if !inner.tasks.iter().any(|t| t.id == id) {
            return Err(not_found("Task"));
        }
        inner.tasks.retain(|t| t.id != id);
        Ok(())
    }
}

#[async_trait]
impl ChatApi for MockBackend {
    async fn send_message(&self, _request: &ChatRequest) -> Result<ChatReply, ApiError> {
        self.record("send_message")?;
        Ok(self.inner.lock().unwrap().chat_reply.clone())
    }
}

/// Session gate with a switchable answer that counts invalidations.
pub(crate) struct MockGate {
    authenticated: AtomicBool,
    invalidations: AtomicUsize,
}

impl MockGate {
    pub(crate) fn new(authenticated: bool) -> Self {
        Self {
            authenticated: AtomicBool::new(authenticated),
            invalidations: AtomicUsize::new(0),
        }
    }

    pub(crate) fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionGate for MockGate {
    async fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    async fn invalidate(&self) {
        self.authenticated.store(false, Ordering::SeqCst);
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}
