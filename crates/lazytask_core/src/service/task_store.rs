//! Task Store: canonical collection and its state transitions.
//!
//! # Responsibility
//! - Own the canonical task collection (most recent first).
//! - Create, toggle, rename and remove tasks.
//!
//! # Invariants
//! - Every mutation swaps in a freshly built collection.
//! - Invalid input (blank title, unknown id) is a no-op, never an error.
//! - `order` strictly increases across creations, regardless of deletions.

use crate::model::task::{Priority, Task, TaskId};
use chrono::{NaiveDate, Utc};

/// Source of creation timestamps.
pub trait Clock {
    /// Current time in Unix epoch milliseconds.
    fn now_epoch_ms(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    /// Raw title; trimmed before storing.
    pub title: String,
    /// Optional due date.
    pub due: Option<NaiveDate>,
    /// Falls back to `Priority::Medium` when absent.
    pub priority: Option<Priority>,
}

impl NewTask {
    /// Title-only draft with default due date and priority.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn due(mut self, due: NaiveDate) -> Self {
        self.due = Some(due);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Owner of the canonical task collection.
#[derive(Debug, Clone)]
pub struct TaskStore<C: Clock = SystemClock> {
    tasks: Vec<Task>,
    highest_order: u64,
    clock: C,
}

impl TaskStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for TaskStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TaskStore<C> {
    /// Empty store using `clock` for creation timestamps.
    pub fn with_clock(clock: C) -> Self {
        Self::from_tasks(Vec::new(), clock)
    }

    /// Seeds the store from a previously saved collection.
    pub fn from_tasks(tasks: Vec<Task>, clock: C) -> Self {
        let highest_order = tasks.iter().map(|task| task.order).max().unwrap_or(0);
        Self {
            tasks,
            highest_order,
            clock,
        }
    }

    /// Canonical collection in storage order (most recent first).
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    /// Number of tasks in the collection.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Creates a task at the front of the collection.
    ///
    /// Returns `None` and leaves the collection untouched when the trimmed
    /// title is empty.
    pub fn add(&mut self, draft: NewTask) -> Option<Task> {
        let title = draft.title.trim();
        if title.is_empty() {
            return None;
        }

        let order = self.next_order();
        let task = Task {
            id: self.fresh_id(),
            title: title.to_string(),
            completed: false,
            created_at: self.clock.now_epoch_ms(),
            due: draft.due,
            priority: draft.priority.unwrap_or_default(),
            order,
        };

        let mut next = Vec::with_capacity(self.tasks.len() + 1);
        next.push(task.clone());
        next.extend(self.tasks.iter().cloned());
        self.tasks = next;
        self.highest_order = order;
        Some(task)
    }

    /// Flips `completed`. Returns whether a task matched.
    pub fn toggle(&mut self, id: &TaskId) -> bool {
        self.replace_by_id(id, Task::toggled)
    }

    /// Replaces the title when `title` is not blank. Returns whether a task changed.
    ///
    /// The given text is stored as-is; only the blank check trims.
    pub fn rename(&mut self, id: &TaskId, title: &str) -> bool {
        if title.trim().is_empty() {
            return false;
        }
        self.replace_by_id(id, |task| task.retitled(title))
    }

    /// Deletes the task with `id`. Returns whether a task was removed.
    pub fn remove(&mut self, id: &TaskId) -> bool {
        let before = self.tasks.len();
        self.retain(|task| &task.id != id);
        self.tasks.len() != before
    }

    /// Deletes every completed task. Returns the number removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.retain(|task| !task.completed);
        before - self.tasks.len()
    }

    fn next_order(&self) -> u64 {
        let count = u64::try_from(self.tasks.len()).unwrap_or(u64::MAX);
        self.highest_order.max(count).saturating_add(1)
    }

    fn fresh_id(&self) -> TaskId {
        loop {
            let id = TaskId::generate();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn replace_by_id(&mut self, id: &TaskId, update: impl Fn(&Task) -> Task) -> bool {
        let mut matched = false;
        self.tasks = self
            .tasks
            .iter()
            .map(|task| {
                if &task.id == id {
                    matched = true;
                    update(task)
                } else {
                    task.clone()
                }
            })
            .collect();
        matched
    }

    fn retain(&mut self, keep: impl Fn(&Task) -> bool) {
        self.tasks = self.tasks.iter().filter(|task| keep(task)).cloned().collect();
    }
}
