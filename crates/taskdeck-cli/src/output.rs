//! Terminal rendering: tables or pretty JSON.

use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL};
use serde::Serialize;
use taskdeck_core::ApiError;
use taskdeck_core::dates;
use taskdeck_core::project::Project;
use taskdeck_core::task::Task;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(Cell::new).collect::<Vec<_>>());
    table
}

pub fn task_table(tasks: &[Task], now: DateTime<Utc>) -> Table {
    let mut table = table(&["ID", "TITLE", "STATUS", "PRIORITY", "DUE", "PROJECT"]);
    for task in tasks {
        let due = match &task.due_date {
            Some(due) if task.is_overdue_at(now) => format!("{} (overdue)", dates::format_date(due)),
            Some(due) => dates::format_date(due),
            None => "-".to_string(),
        };
        table.add_row(vec![
            task.id.to_string(),
            task.title.clone(),
            task.status.to_string(),
            task.priority.to_string(),
            due,
            task.project_id.map_or_else(|| "-".to_string(), |id| id.to_string()),
        ]);
    }
    table
}

pub fn project_table(projects: &[Project]) -> Table {
    let mut table = table(&["ID", "NAME", "TASKS", "COLOR", "CREATED"]);
    for project in projects {
        table.add_row(vec![
            project.id.to_string(),
            project.name.clone(),
            project
                .task_count
                .map_or_else(|| "-".to_string(), |n| n.to_string()),
            project.color.clone().unwrap_or_else(|| "-".to_string()),
            project
                .created_at
                .as_ref()
                .map_or_else(|| "-".to_string(), dates::format_date),
        ]);
    }
    table
}

/// Prints `tasks` as JSON or as a table, with a note when there are none.
pub fn tasks(tasks: &[Task], json: bool) -> Result<()> {
    if json {
        return print_json(tasks);
    }
    if tasks.is_empty() {
        println!("No tasks found.");
    } else {
        println!("{}", task_table(tasks, Utc::now()));
    }
    Ok(())
}

pub fn projects(projects: &[Project], json: bool) -> Result<()> {
    if json {
        return print_json(projects);
    }
    if projects.is_empty() {
        println!("No projects yet.");
    } else {
        println!("{}", project_table(projects));
    }
    Ok(())
}

/// Multi-line detail view of a single task.
pub fn task_detail(task: &Task, now: DateTime<Utc>) -> String {
    let mut lines = vec![
        format!("#{} {}", task.id, task.title),
        format!("Status:   {}", task.status),
        format!("Priority: {}", task.priority),
    ];
    if let Some(due) = &task.due_date {
        let mut line = format!(
            "Due:      {} ({})",
            dates::format_date(due),
            dates::relative_time(due, now)
        );
        if task.is_overdue_at(now) {
            line.push_str(" overdue");
        }
        lines.push(line);
    }
    if let Some(project_id) = task.project_id {
        lines.push(format!("Project:  {}", project_id));
    }
    if let Some(updated) = &task.updated_at {
        lines.push(format!("Updated:  {}", dates::format_date_time(updated)));
    }
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(String::new());
        lines.push(description.to_string());
    }
    lines.join("\n")
}

/// Writes `err` to stderr, followed by any per-field messages from the server.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("Error: {}", err);

    if let Some(api) = err.downcast_ref::<ApiError>() {
        for (field, message) in &api.field_errors {
            eprintln!("  {}: {}", field, message);
        }
    }
}
