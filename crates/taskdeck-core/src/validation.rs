//! Form validation.
//!
//! Presentation surfaces run these before calling into the session manager
//! or the data store, so obviously bad input never reaches the network.
//! Field-level errors coming back from the server travel separately in
//! [`ApiError::field_errors`](crate::error::ApiError).

use crate::auth::{Credentials, ProfileUpdate, Registration};
use crate::project::{NewProject, ProjectPatch};
use crate::task::{NewTask, TaskPatch};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid username regex"));
static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").expect("valid hex color regex")
});

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 50;
pub const MAX_PROJECT_NAME_LEN: usize = 100;
pub const MAX_TASK_TITLE_LEN: usize = 200;

/// Field name → message, in field-name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field`, keeping the first message per field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    fn check(&mut self, field: &str, result: Result<(), String>) {
        if let Err(message) = result {
            self.add(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

// ============================================================================
// Single-value checks
// ============================================================================

pub fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && EMAIL_RE.is_match(email.trim())
}

/// Empty means "no color", which is allowed.
pub fn is_valid_hex_color(color: &str) -> bool {
    color.is_empty() || HEX_COLOR_RE.is_match(color)
}

pub fn validate_required(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} is required"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        ));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), String> {
    let len = username.chars().count();
    if len == 0 {
        return Err("Username is required".to_string());
    }
    if len < MIN_USERNAME_LEN {
        return Err(format!(
            "Username must be at least {MIN_USERNAME_LEN} characters long"
        ));
    }
    if len > MAX_USERNAME_LEN {
        return Err(format!(
            "Username must be less than {MAX_USERNAME_LEN} characters"
        ));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(
            "Username can only contain letters, numbers, underscores, and hyphens".to_string(),
        );
    }
    Ok(())
}

pub fn validate_project_name(name: &str) -> Result<(), String> {
    validate_required(name, "Project name")?;
    if name.chars().count() > MAX_PROJECT_NAME_LEN {
        return Err(format!(
            "Project name must be less than {MAX_PROJECT_NAME_LEN} characters"
        ));
    }
    Ok(())
}

pub fn validate_task_title(title: &str) -> Result<(), String> {
    validate_required(title, "Task title")?;
    if title.chars().count() > MAX_TASK_TITLE_LEN {
        return Err(format!(
            "Task title must be less than {MAX_TASK_TITLE_LEN} characters"
        ));
    }
    Ok(())
}

/// Due dates may be today or later.
pub fn validate_due_date(due: NaiveDate, today: NaiveDate) -> Result<(), String> {
    if due < today {
        return Err("Due date cannot be in the past".to_string());
    }
    Ok(())
}

// ============================================================================
// Form checks
// ============================================================================

pub fn validate_login(credentials: &Credentials) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if credentials.username.trim().is_empty() {
        errors.add("username", "Username or email is required");
    }
    if credentials.password.is_empty() {
        errors.add("password", "Password is required");
    }
    errors.into_result()
}

pub fn validate_registration(registration: &Registration) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if !is_valid_email(&registration.email) {
        errors.add("email", "Please enter a valid email address");
    }
    errors.check("username", validate_username(&registration.username));
    errors.check("password", validate_password(&registration.password));
    errors.into_result()
}

pub fn validate_project(project: &NewProject) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check("name", validate_project_name(&project.name));
    check_color(&mut errors, project.color.as_deref());
    errors.into_result()
}

pub fn validate_project_patch(patch: &ProjectPatch) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if let Some(name) = &patch.name {
        errors.check("name", validate_project_name(name));
    }
    check_color(&mut errors, patch.color.as_deref());
    errors.into_result()
}

fn check_color(errors: &mut ValidationErrors, color: Option<&str>) {
    if color.is_some_and(|c| !is_valid_hex_color(c)) {
        errors.add("color", "Please enter a valid hex color (e.g., #FF5733)");
    }
}

pub fn validate_task(task: &NewTask) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check("title", validate_task_title(&task.title));
    errors.into_result()
}

pub fn validate_task_patch(patch: &TaskPatch) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if let Some(title) = &patch.title {
        errors.check("title", validate_task_title(title));
    }
    errors.into_result()
}

/// Profile edits. A password change needs the current password and a
/// matching confirmation.
pub fn validate_profile_update(
    update: &ProfileUpdate,
    confirm_password: Option<&str>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Some(email) = &update.email
        && !is_valid_email(email)
    {
        errors.add("email", "Please enter a valid email address");
    }
    if let Some(username) = &update.username {
        errors.check("username", validate_username(username));
    }

    if update.new_password.is_some() || confirm_password.is_some() {
        if update
            .current_password
            .as_deref()
            .is_none_or(|p| p.is_empty())
        {
            errors.add(
                "current_password",
                "Current password is required to change password",
            );
        }
        let new_password = update.new_password.as_deref().unwrap_or_default();
        errors.check("new_password", validate_password(new_password));
        if Some(new_password) != confirm_password {
            errors.add("confirm_password", "Passwords do not match");
        }
    }

    errors.into_result()
}
