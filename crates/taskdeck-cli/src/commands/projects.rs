use super::App;
use crate::output;
use anyhow::{Result, bail};
use chrono::Utc;
use taskdeck_core::project::{NewProject, ProjectId, ProjectPatch};
use taskdeck_core::validation::{validate_project, validate_project_patch};

pub async fn list(app: &App) -> Result<()> {
    app.require_user().await?;
    app.store.fetch_projects().await?;
    output::projects(&app.store.projects().await, app.json)
}

pub async fn show(app: &App, id: ProjectId) -> Result<()> {
    app.require_user().await?;
    let detail = app.store.fetch_project(id).await?;
    if app.json {
        return output::print_json(&detail);
    }

    let project = &detail.project;
    println!("#{} {}", project.id, project.name);
    if let Some(description) = project.description.as_deref().filter(|d| !d.is_empty()) {
        println!("{}", description);
    }
    if let Some(color) = &project.color {
        println!("Color: {}", color);
    }
    println!();
    if detail.tasks.is_empty() {
        println!("No tasks in this project.");
    } else {
        println!("{}", output::task_table(&detail.tasks, Utc::now()));
    }
    Ok(())
}

pub async fn create(
    app: &App,
    name: String,
    description: Option<String>,
    color: Option<String>,
) -> Result<()> {
    app.require_user().await?;
    let project = NewProject {
        name: name.trim().to_string(),
        description,
        color,
    };
    validate_project(&project)?;

    let created = app.store.create_project(&project).await?;
    if app.json {
        return output::print_json(&created);
    }
    println!("Created project #{} {}", created.id, created.name);
    Ok(())
}

pub async fn update(
    app: &App,
    id: ProjectId,
    name: Option<String>,
    description: Option<String>,
    color: Option<String>,
) -> Result<()> {
    app.require_user().await?;
    let patch = ProjectPatch {
        name: name.map(|n| n.trim().to_string()),
        description,
        color,
    };
    if patch.is_empty() {
        bail!("Nothing to update; pass --name, --description or --color");
    }
    validate_project_patch(&patch)?;

    let updated = app.store.update_project(id, &patch).await?;
    if app.json {
        return output::print_json(&updated);
    }
    println!("Updated project #{} {}", updated.id, updated.name);
    Ok(())
}

pub async fn delete(app: &App, id: ProjectId) -> Result<()> {
    app.require_user().await?;
    app.store.delete_project(id).await?;
    println!("Deleted project #{} and its tasks", id);
    Ok(())
}
