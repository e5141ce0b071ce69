//! Derives the displayed task sequence from canonical state.
//!
//! # Invariants
//! - `project` is pure: same inputs, same output, input never mutated.
//! - Pipeline order is filter, then search, then a stable sort.
//! - Tasks without a due date sort after dated tasks in both due directions.

use crate::model::state::SortKey;
use crate::model::task::Task;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Completion-state filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskFilter {
    /// Every task.
    #[default]
    All,
    /// Tasks with `completed == false`.
    Active,
    /// Tasks with `completed == true`.
    Completed,
}

impl TaskFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

impl FromStr for TaskFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(format!(
                "unsupported filter `{other}`; expected all|active|completed"
            )),
        }
    }
}

impl Display for TaskFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts over the canonical collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskSummary {
    /// Number of tasks in the collection.
    pub total: usize,
    /// Tasks marked completed.
    pub completed: usize,
    /// `total - completed`.
    pub remaining: usize,
}

impl Display for TaskSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} remaining • {} completed • {} total",
            self.remaining, self.completed, self.total
        )
    }
}

/// Projects `tasks` into display order.
///
/// `search` is matched case-insensitively as a substring of the title. It is
/// not trimmed, so a whitespace-only search still filters literally.
pub fn project(tasks: &[Task], filter: TaskFilter, search: &str, sort: SortKey) -> Vec<Task> {
    let needle = search.to_lowercase();
    let mut view: Vec<Task> = tasks
        .iter()
        .filter(|task| filter.matches(task))
        .filter(|task| needle.is_empty() || task.title.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    // `sort_by` is stable; ties keep filter order.
    view.sort_by(|a, b| compare(a, b, sort));
    view
}

/// Computes summary counts over the full collection.
pub fn summarize(tasks: &[Task]) -> TaskSummary {
    let total = tasks.len();
    let completed = tasks.iter().filter(|task| task.completed).count();
    TaskSummary {
        total,
        completed,
        remaining: total - completed,
    }
}

fn compare(a: &Task, b: &Task, sort: SortKey) -> Ordering {
    match sort {
        SortKey::CreatedAsc => a.created_at.cmp(&b.created_at),
        SortKey::CreatedDesc => b.created_at.cmp(&a.created_at),
        SortKey::DueAsc => due_or(a, NaiveDate::MAX).cmp(&due_or(b, NaiveDate::MAX)),
        SortKey::DueDesc => due_or(b, NaiveDate::MIN).cmp(&due_or(a, NaiveDate::MIN)),
        SortKey::PriorityDesc => b.priority.rank().cmp(&a.priority.rank()),
        SortKey::PriorityAsc => a.priority.rank().cmp(&b.priority.rank()),
        SortKey::Manual => a.order.cmp(&b.order),
    }
}

fn due_or(task: &Task, absent: NaiveDate) -> NaiveDate {
    task.due.unwrap_or(absent)
}
