//! Pure derivations over a task collection.
//!
//! Nothing here touches the network or mutates its input; every function
//! takes a slice and returns a fresh `Vec`. Functions that depend on the
//! current time come in two flavors: one reading the clock, and an `_at`
//! variant taking `now` explicitly.

use super::model::{Task, TaskFilter, TaskStatus};
use crate::dates;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Field a task list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    DueDate,
    CreatedAt,
    UpdatedAt,
    Priority,
    Title,
    Status,
    Id,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "due_date" | "due" => Ok(Self::DueDate),
            "created_at" | "created" => Ok(Self::CreatedAt),
            "updated_at" | "updated" => Ok(Self::UpdatedAt),
            "priority" => Ok(Self::Priority),
            "title" => Ok(Self::Title),
            "status" => Ok(Self::Status),
            "id" => Ok(Self::Id),
            other => Err(format!("cannot sort by '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort order '{other}' (expected asc or desc)")),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

/// Tasks partitioned into the three fixed status buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TasksByStatus {
    pub todo: Vec<Task>,
    pub in_progress: Vec<Task>,
    pub completed: Vec<Task>,
}

impl TasksByStatus {
    pub fn bucket(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Completed => &self.completed,
        }
    }
}

/// Case-insensitive substring match on title and description.
///
/// An empty or absent term returns the whole collection in its original order.
pub fn search_tasks(tasks: &[Task], term: Option<&str>) -> Vec<Task> {
    let Some(term) = term.filter(|t| !t.is_empty()) else {
        return tasks.to_vec();
    };

    let needle = term.to_lowercase();
    tasks
        .iter()
        .filter(|task| {
            task.title.to_lowercase().contains(&needle)
                || task
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Sorts a copy of `tasks`.
///
/// Timestamps compare as milliseconds with an absent value treated as the
/// epoch; priority compares by rank. Ties keep their input order.
pub fn sort_tasks(tasks: &[Task], field: SortField, order: SortOrder) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = compare_by(a, b, field);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    sorted
}

fn compare_by(a: &Task, b: &Task, field: SortField) -> Ordering {
    fn millis(value: Option<DateTime<Utc>>) -> i64 {
        value.map(|dt| dt.timestamp_millis()).unwrap_or(0)
    }

    match field {
        SortField::DueDate => millis(a.due_date).cmp(&millis(b.due_date)),
        SortField::CreatedAt => millis(a.created_at).cmp(&millis(b.created_at)),
        SortField::UpdatedAt => millis(a.updated_at).cmp(&millis(b.updated_at)),
        SortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
        SortField::Title => a.title.cmp(&b.title),
        SortField::Status => a.status.as_str().cmp(b.status.as_str()),
        SortField::Id => a.id.cmp(&b.id),
    }
}

/// Partitions tasks by status, preserving order inside each bucket.
pub fn group_by_status(tasks: &[Task]) -> TasksByStatus {
    let mut groups = TasksByStatus::default();
    for task in tasks {
        let bucket = match task.status {
            TaskStatus::Todo => &mut groups.todo,
            TaskStatus::InProgress => &mut groups.in_progress,
            TaskStatus::Completed => &mut groups.completed,
        };
        bucket.push(task.clone());
    }
    groups
}

/// Open tasks whose due date is strictly before now.
pub fn overdue_tasks(tasks: &[Task]) -> Vec<Task> {
    overdue_tasks_at(tasks, Utc::now())
}

pub fn overdue_tasks_at(tasks: &[Task], now: DateTime<Utc>) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.is_overdue_at(now))
        .cloned()
        .collect()
}

/// Open tasks due within `[now, now + days]`, soonest first.
pub fn upcoming_tasks(tasks: &[Task], days: i64) -> Vec<Task> {
    upcoming_tasks_at(tasks, days, Utc::now())
}

pub fn upcoming_tasks_at(tasks: &[Task], days: i64, now: DateTime<Utc>) -> Vec<Task> {
    let mut upcoming: Vec<Task> = tasks
        .iter()
        .filter(|task| !task.is_completed())
        .filter(|task| {
            task.due_date
                .is_some_and(|due| dates::is_within_days(&due, days, now))
        })
        .cloned()
        .collect();
    upcoming.sort_by_key(|task| task.due_date);
    upcoming
}

/// Applies every set criterion of `filter`.
pub fn filter_tasks(tasks: &[Task], filter: &TaskFilter) -> Vec<Task> {
    let matching: Vec<Task> = tasks
        .iter()
        .filter(|task| filter.project_id.is_none_or(|id| task.project_id == Some(id)))
        .filter(|task| filter.status.is_none_or(|status| task.status == status))
        .filter(|task| filter.priority.is_none_or(|priority| task.priority == priority))
        .cloned()
        .collect();
    search_tasks(&matching, filter.search.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;
    use chrono::{Duration, TimeZone};

    fn task(id: i64, title: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: None,
            priority: Priority::Medium,
            status: TaskStatus::Todo,
            due_date: None,
            project_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn ids(tasks: &[Task]) -> Vec<i64> {
        tasks.iter().map(|t| t.id).collect()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_search_returns_input_unchanged() {
        let tasks = vec![task(3, "c"), task(1, "a"), task(2, "b")];

        assert_eq!(ids(&search_tasks(&tasks, Some(""))), vec![3, 1, 2]);
        assert_eq!(ids(&search_tasks(&tasks, None)), vec![3, 1, 2]);
    }

    #[test]
    fn test_search_matches_title_and_description_case_insensitively() {
        let mut with_desc = task(2, "Groceries");
        with_desc.description = Some("Buy MILK and eggs".to_string());
        let tasks = vec![task(1, "Milk the cow"), with_desc, task(3, "Taxes")];

        assert_eq!(ids(&search_tasks(&tasks, Some("milk"))), vec![1, 2]);
        assert!(search_tasks(&tasks, Some("nothing")).is_empty());
    }

    #[test]
    fn test_sort_by_priority_desc() {
        let mut low = task(1, "low");
        low.priority = Priority::Low;
        let mut high = task(2, "high");
        high.priority = Priority::High;
        let mut medium = task(3, "medium");
        medium.priority = Priority::Medium;

        let sorted = sort_tasks(&[low, high, medium], SortField::Priority, SortOrder::Desc);
        assert_eq!(ids(&sorted), vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_by_due_date_treats_missing_as_epoch() {
        let mut later = task(1, "later");
        later.due_date = Some(now() + Duration::days(2));
        let undated = task(2, "undated");
        let mut sooner = task(3, "sooner");
        sooner.due_date = Some(now());

        let asc = sort_tasks(&[later.clone(), undated.clone(), sooner.clone()], SortField::DueDate, SortOrder::Asc);
        assert_eq!(ids(&asc), vec![2, 3, 1]);

        let desc = sort_tasks(&[later, undated, sooner], SortField::DueDate, SortOrder::Desc);
        assert_eq!(ids(&desc), vec![1, 3, 2]);
    }

    #[test]
    fn test_sort_keeps_ties_in_input_order() {
        let tasks = vec![task(5, "same"), task(4, "same"), task(6, "same")];
        assert_eq!(ids(&sort_tasks(&tasks, SortField::Title, SortOrder::Asc)), vec![5, 4, 6]);
    }

    #[test]
    fn test_group_by_status() {
        let mut doing = task(2, "doing");
        doing.status = TaskStatus::InProgress;
        let mut done = task(3, "done");
        done.status = TaskStatus::Completed;
        let groups = group_by_status(&[task(1, "todo"), doing, done, task(4, "todo too")]);

        assert_eq!(ids(&groups.todo), vec![1, 4]);
        assert_eq!(ids(&groups.in_progress), vec![2]);
        assert_eq!(ids(groups.bucket(TaskStatus::Completed)), vec![3]);
    }

    #[test]
    fn test_overdue_excludes_completed_and_undated() {
        let mut late = task(1, "late");
        late.due_date = Some(now() - Duration::hours(1));
        let mut late_done = task(2, "late but done");
        late_done.due_date = Some(now() - Duration::days(1));
        late_done.status = TaskStatus::Completed;
        let mut later_today = task(3, "later today");
        later_today.due_date = Some(now() + Duration::hours(3));

        let overdue = overdue_tasks_at(&[late, late_done, later_today, task(4, "undated")], now());
        assert_eq!(ids(&overdue), vec![1]);
    }

    #[test]
    fn test_upcoming_window_and_order() {
        let mut in_ten = task(1, "ten days");
        in_ten.due_date = Some(now() + Duration::days(10));
        let mut in_five = task(2, "five days");
        in_five.due_date = Some(now() + Duration::days(5));
        let mut in_three = task(3, "three days");
        in_three.due_date = Some(now() + Duration::days(3));
        let mut past = task(4, "yesterday");
        past.due_date = Some(now() - Duration::days(1));

        let upcoming = upcoming_tasks_at(&[in_ten, in_five, in_three, past], 7, now());
        assert_eq!(ids(&upcoming), vec![3, 2]);
    }

    #[test]
    fn test_upcoming_with_huge_window_does_not_overflow() {
        let mut far = task(1, "Far future");
        far.due_date = Some(now() + Duration::days(365 * 50));

        assert!(upcoming_tasks(&[], 100_000_000).is_empty());
        assert_eq!(ids(&upcoming_tasks_at(&[far], i64::MAX, now())), vec![1]);
    }

    #[test]
    fn test_filter_combines_criteria() {
        let mut a = task(1, "Write report");
        a.project_id = Some(10);
        a.priority = Priority::High;
        let mut b = task(2, "Write tests");
        b.project_id = Some(10);
        let mut c = task(3, "Write docs");
        c.project_id = Some(11);
        c.priority = Priority::High;

        let filter = TaskFilter {
            project_id: Some(10),
            priority: Some(Priority::High),
            search: Some("write".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_tasks(&[a.clone(), b.clone(), c.clone()], &filter)), vec![1]);
        assert_eq!(ids(&filter_tasks(&[a, b, c], &TaskFilter::default())), vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_field_parse() {
        assert_eq!("due-date".parse::<SortField>(), Ok(SortField::DueDate));
        assert_eq!("priority".parse::<SortField>(), Ok(SortField::Priority));
        assert!("color".parse::<SortField>().is_err());
        assert_eq!("DESC".parse::<SortOrder>(), Ok(SortOrder::Desc));
    }
}
