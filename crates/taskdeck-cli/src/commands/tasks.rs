use super::App;
use crate::output;
use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Utc};
use taskdeck_core::dates;
use taskdeck_core::project::ProjectId;
use taskdeck_core::task::query::{
    self, SortField, SortOrder, filter_tasks, group_by_status, search_tasks, sort_tasks,
};
use taskdeck_core::task::{NewTask, Priority, TaskFilter, TaskId, TaskPatch, TaskQuery, TaskStatus};
use taskdeck_core::validation::{validate_due_date, validate_task, validate_task_patch};

/// Optional task fields shared by `create` and `update`.
pub struct TaskInput {
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub due: Option<String>,
    pub project_id: Option<ProjectId>,
}

pub async fn list(
    app: &App,
    filter: &TaskFilter,
    sort: Option<(SortField, SortOrder)>,
) -> Result<()> {
    app.require_user().await?;
    app.store.fetch_tasks(&filter.to_query()).await?;

    let mut tasks = filter_tasks(&app.store.tasks().await, filter);
    if let Some((field, order)) = sort {
        tasks = sort_tasks(&tasks, field, order);
    }
    output::tasks(&tasks, app.json)
}

pub async fn show(app: &App, id: TaskId) -> Result<()> {
    app.require_user().await?;
    let task = app.store.fetch_task(id).await?;
    if app.json {
        return output::print_json(&task);
    }
    println!("{}", output::task_detail(&task, Utc::now()));
    Ok(())
}

pub async fn create(app: &App, title: String, input: TaskInput) -> Result<()> {
    app.require_user().await?;
    let due_date = input.due.as_deref().map(parse_due).transpose()?;
    if let Some(due) = &due_date {
        validate_due_date(due.date_naive(), Utc::now().date_naive())
            .map_err(|message| anyhow!("due_date: {}", message))?;
    }

    let task = NewTask {
        title: title.trim().to_string(),
        description: input.description,
        priority: input.priority,
        status: input.status,
        due_date,
        project_id: input.project_id,
    };
    validate_task(&task)?;

    let created = app.store.create_task(&task).await?;
    if app.json {
        return output::print_json(&created);
    }
    println!("Created task #{} {}", created.id, created.title);
    Ok(())
}

pub async fn update(app: &App, id: TaskId, title: Option<String>, input: TaskInput) -> Result<()> {
    app.require_user().await?;
    let patch = TaskPatch {
        title: title.map(|t| t.trim().to_string()),
        description: input.description,
        priority: input.priority,
        status: input.status,
        due_date: input.due.as_deref().map(parse_due).transpose()?,
        project_id: input.project_id,
    };
    if patch.is_empty() {
        bail!("Nothing to update");
    }
    validate_task_patch(&patch)?;

    let updated = app.store.update_task(id, &patch).await?;
    if app.json {
        return output::print_json(&updated);
    }
    println!("Updated task #{} {}", updated.id, updated.title);
    Ok(())
}

pub async fn delete(app: &App, id: TaskId) -> Result<()> {
    app.require_user().await?;
    app.store.delete_task(id).await?;
    println!("Deleted task #{}", id);
    Ok(())
}

/// Flips completion. The task has to be in the fetched collection first.
pub async fn toggle(app: &App, id: TaskId) -> Result<()> {
    app.require_user().await?;
    app.store.fetch_tasks(&TaskQuery::default()).await?;

    let Some(task) = app.store.toggle_task_status(id).await? else {
        bail!("Task #{} not found", id);
    };
    if app.json {
        return output::print_json(&task);
    }
    println!("Task #{} {} is now {}", task.id, task.title, task.status);
    Ok(())
}

pub async fn search(app: &App, term: &str) -> Result<()> {
    app.require_user().await?;
    app.store.fetch_tasks(&TaskQuery::default()).await?;
    output::tasks(&search_tasks(&app.store.tasks().await, Some(term)), app.json)
}

pub async fn upcoming(app: &App, days: i64) -> Result<()> {
    app.require_user().await?;
    app.store.fetch_tasks(&TaskQuery::default()).await?;
    output::tasks(&query::upcoming_tasks(&app.store.tasks().await, days), app.json)
}

pub async fn overdue(app: &App) -> Result<()> {
    app.require_user().await?;
    app.store.fetch_tasks(&TaskQuery::default()).await?;
    output::tasks(&query::overdue_tasks(&app.store.tasks().await), app.json)
}

/// Three columns of the task board, one section per status.
pub async fn board(app: &App) -> Result<()> {
    app.require_user().await?;
    app.store.fetch_tasks(&TaskQuery::default()).await?;

    let groups = group_by_status(&app.store.tasks().await);
    if app.json {
        return output::print_json(&groups);
    }

    let now = Utc::now();
    for status in TaskStatus::ALL {
        let bucket = groups.bucket(status);
        println!("== {} ({}) ==", board_title(status), bucket.len());
        if !bucket.is_empty() {
            println!("{}", output::task_table(bucket, now));
        }
        println!();
    }
    Ok(())
}

fn board_title(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "To Do",
        TaskStatus::InProgress => "In Progress",
        TaskStatus::Completed => "Completed",
    }
}

fn parse_due(raw: &str) -> Result<DateTime<Utc>> {
    dates::parse_datetime(raw)
        .ok_or_else(|| anyhow!("Invalid due date '{}'; use YYYY-MM-DD", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_due_date_accepts_plain_dates() {
        assert_eq!(
            parse_due("2025-07-04").unwrap(),
            Utc.with_ymd_and_hms(2025, 7, 4, 0, 0, 0).unwrap()
        );
        assert!(parse_due("next friday").is_err());
    }
}
