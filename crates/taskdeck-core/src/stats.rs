//! Dashboard statistics.

use crate::project::Project;
use crate::task::Task;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_projects: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub overdue_tasks: usize,
    /// Everything not completed, overdue or not.
    pub pending_tasks: usize,
}

impl DashboardStats {
    /// Derives the counts from the given collections as of `now`.
    pub fn compute(projects: &[Project], tasks: &[Task], now: DateTime<Utc>) -> Self {
        let completed_tasks = tasks.iter().filter(|t| t.is_completed()).count();
        let overdue_tasks = tasks.iter().filter(|t| t.is_overdue_at(now)).count();

        Self {
            total_projects: projects.len(),
            total_tasks: tasks.len(),
            completed_tasks,
            overdue_tasks,
            pending_tasks: tasks.len() - completed_tasks,
        }
    }

    /// Share of completed tasks, 0–100.
    pub fn completion_percent(&self) -> u8 {
        if self.total_tasks == 0 {
            return 0;
        }
        ((self.completed_tasks * 100) / self.total_tasks) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, TaskStatus};
    use chrono::{Duration, TimeZone};

    fn project(id: i64) -> Project {
        Project {
            id,
            name: format!("Project {id}"),
            description: None,
            color: None,
            task_count: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn task(id: i64, status: TaskStatus, due_date: Option<DateTime<Utc>>) -> Task {
        Task {
            id,
            title: format!("Task {id}"),
            description: None,
            priority: Priority::Low,
            status,
            due_date,
            project_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_empty_collections_are_all_zero() {
        let now = Utc::now();
        assert_eq!(DashboardStats::compute(&[], &[], now), DashboardStats::default());
        assert_eq!(DashboardStats::default().completion_percent(), 0);
    }

    #[test]
    fn test_counts() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        let yesterday = now - Duration::days(1);
        let tasks = vec![
            task(1, TaskStatus::Completed, Some(yesterday)),
            task(2, TaskStatus::Todo, Some(yesterday)),
            task(3, TaskStatus::InProgress, None),
        ];

        let stats = DashboardStats::compute(&[project(1), project(2)], &tasks, now);
        assert_eq!(
            stats,
            DashboardStats {
                total_projects: 2,
                total_tasks: 3,
                completed_tasks: 1,
                overdue_tasks: 1,
                pending_tasks: 2,
            }
        );
        assert_eq!(stats.completion_percent(), 33);
    }
}
