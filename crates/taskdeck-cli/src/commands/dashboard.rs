use super::App;
use crate::output;
use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::cmp::Reverse;
use taskdeck_core::project::Project;
use taskdeck_core::stats::DashboardStats;
use taskdeck_core::task::query::{SortField, SortOrder, sort_tasks};
use taskdeck_core::task::Task;

const RECENT_LIMIT: usize = 5;

#[derive(Serialize)]
struct Dashboard {
    username: String,
    stats: DashboardStats,
    completion_percent: u8,
    recent_projects: Vec<Project>,
    upcoming_tasks: Vec<Task>,
}

pub async fn show(app: &App) -> Result<()> {
    let user = app.require_user().await?;

    app.store.refresh().await?;

    let stats = app.store.stats().await;
    let dashboard = Dashboard {
        username: user.username,
        stats,
        completion_percent: stats.completion_percent(),
        recent_projects: recent_projects(&app.store.projects().await),
        upcoming_tasks: next_due(&app.store.tasks().await),
    };

    if app.json {
        return output::print_json(&dashboard);
    }

    println!("Welcome back, {}!", dashboard.username);
    println!();
    println!("Projects:  {}", stats.total_projects);
    println!("Tasks:     {}", stats.total_tasks);
    println!(
        "Completed: {} ({}%)",
        stats.completed_tasks, dashboard.completion_percent
    );
    println!("Pending:   {}", stats.pending_tasks);
    println!("Overdue:   {}", stats.overdue_tasks);

    println!();
    println!("Recent projects");
    if dashboard.recent_projects.is_empty() {
        println!("  No projects yet.");
    } else {
        println!("{}", output::project_table(&dashboard.recent_projects));
    }

    println!();
    println!("Upcoming tasks");
    if dashboard.upcoming_tasks.is_empty() {
        println!("  Nothing due.");
    } else {
        println!("{}", output::task_table(&dashboard.upcoming_tasks, Utc::now()));
    }
    Ok(())
}

/// Newest projects first.
fn recent_projects(projects: &[Project]) -> Vec<Project> {
    let mut recent = projects.to_vec();
    recent.sort_by_key(|p| Reverse(p.created_at));
    recent.truncate(RECENT_LIMIT);
    recent
}

/// Open tasks with a due date, soonest first, past-due included.
fn next_due(tasks: &[Task]) -> Vec<Task> {
    let open: Vec<Task> = tasks
        .iter()
        .filter(|t| !t.is_completed() && t.due_date.is_some())
        .cloned()
        .collect();
    let mut sorted = sort_tasks(&open, SortField::DueDate, SortOrder::Asc);
    sorted.truncate(RECENT_LIMIT);
    sorted
}
