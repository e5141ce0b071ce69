//! Task session: the explicit state container behind the event surface.
//!
//! # Responsibility
//! - Load persisted state once at startup.
//! - Apply presentation events to the store and view inputs.
//! - Save the full state after every store event and sort change.
//! - Keep the projection in sync with its inputs.
//!
//! # Invariants
//! - Persistence failures are logged and swallowed at this boundary.
//! - `view()` always reflects the latest store state and view inputs.
//! - Filter and search are session-only; they are never persisted.

use crate::model::state::{AppState, SortKey};
use crate::model::task::{Priority, Task, TaskId};
use crate::repo::state_repo::StateRepository;
use crate::service::task_store::{Clock, NewTask, SystemClock, TaskStore};
use crate::view::projector::{project, summarize, TaskFilter, TaskSummary};
use chrono::NaiveDate;
use log::{debug, info, warn};

/// Input events accepted from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// Create a task; blank titles are ignored.
    SubmitTask {
        title: String,
        due: Option<NaiveDate>,
        priority: Option<Priority>,
    },
    /// Flip completion of one task.
    Toggle(TaskId),
    /// Replace a task title; blank titles are ignored.
    Rename { id: TaskId, title: String },
    /// Remove one task.
    Delete(TaskId),
    /// Remove every completed task.
    ClearCompleted,
    /// Change the completion filter of the view.
    SetFilter(TaskFilter),
    /// Change the search text of the view.
    SetSearch(String),
    /// Change and save the sort preference.
    SetSort(SortKey),
}

/// Session over one persisted state slot.
pub struct TaskSession<R: StateRepository, C: Clock = SystemClock> {
    repo: R,
    store: TaskStore<C>,
    sort: SortKey,
    filter: TaskFilter,
    search: String,
    view: Vec<Task>,
}

impl<R: StateRepository> TaskSession<R, SystemClock> {
    /// Opens a session using the wall clock.
    pub fn open(repo: R) -> Self {
        Self::open_with_clock(repo, SystemClock)
    }
}

impl<R: StateRepository, C: Clock> TaskSession<R, C> {
    /// Opens a session, loading saved state exactly once.
    ///
    /// Missing, corrupt or unreadable state starts an empty list sorted by
    /// `created_desc`.
    pub fn open_with_clock(repo: R, clock: C) -> Self {
        let state = match repo.load() {
            Ok(Some(state)) => state,
            Ok(None) => AppState::default(),
            Err(err) => {
                warn!("event=session_open module=service status=degraded reason=load_failed error={err}");
                AppState::default()
            }
        };
        info!(
            "event=session_open module=service status=ok tasks={} sort={}",
            state.tasks.len(),
            state.sort
        );

        let mut session = Self {
            repo,
            store: TaskStore::from_tasks(state.tasks, clock),
            sort: state.sort,
            filter: TaskFilter::default(),
            search: String::new(),
            view: Vec::new(),
        };
        session.refresh();
        session
    }

    /// Applies one presentation event.
    ///
    /// Returns the created task id for an accepted `SubmitTask`.
    pub fn dispatch(&mut self, event: TaskEvent) -> Option<TaskId> {
        match event {
            TaskEvent::SubmitTask {
                title,
                due,
                priority,
            } => {
                return self.submit_task(NewTask {
                    title,
                    due,
                    priority,
                });
            }
            TaskEvent::Toggle(id) => self.toggle(&id),
            TaskEvent::Rename { id, title } => self.rename(&id, &title),
            TaskEvent::Delete(id) => self.delete(&id),
            TaskEvent::ClearCompleted => self.clear_completed(),
            TaskEvent::SetFilter(filter) => self.set_filter(filter),
            TaskEvent::SetSearch(search) => self.set_search(search),
            TaskEvent::SetSort(sort) => self.set_sort(sort),
        }
        None
    }

    /// Creates a task; a blank title is ignored without saving.
    pub fn submit_task(&mut self, draft: NewTask) -> Option<TaskId> {
        let Some(task) = self.store.add(draft) else {
            debug!("event=task_add module=service status=ignored reason=blank_title");
            return None;
        };
        debug!(
            "event=task_add module=service status=ok id={} order={}",
            task.id, task.order
        );
        self.commit();
        Some(task.id)
    }

    /// Flips completion of `id`, then saves even when no task matched.
    pub fn toggle(&mut self, id: &TaskId) {
        let matched = self.store.toggle(id);
        debug!("event=task_toggle module=service matched={matched} id={id}");
        self.commit();
    }

    /// Renames `id` unless `title` is blank, then saves.
    pub fn rename(&mut self, id: &TaskId, title: &str) {
        let changed = self.store.rename(id, title);
        debug!("event=task_rename module=service changed={changed} id={id}");
        self.commit();
    }

    /// Removes `id`, then saves.
    pub fn delete(&mut self, id: &TaskId) {
        let removed = self.store.remove(id);
        debug!("event=task_delete module=service removed={removed} id={id}");
        self.commit();
    }

    /// Removes every completed task, then saves.
    pub fn clear_completed(&mut self) {
        let removed = self.store.clear_completed();
        debug!("event=task_clear_completed module=service removed={removed}");
        self.commit();
    }

    /// Changes the sort preference, then saves.
    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.commit();
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
        self.refresh();
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.refresh();
    }

    /// Projected tasks in display order.
    pub fn view(&self) -> &[Task] {
        &self.view
    }

    /// Counts over the full collection, independent of filter and search.
    pub fn summary(&self) -> TaskSummary {
        summarize(self.store.tasks())
    }

    /// Canonical collection in storage order.
    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    /// Snapshot of the persisted unit.
    pub fn state(&self) -> AppState {
        AppState {
            tasks: self.store.tasks().to_vec(),
            sort: self.sort,
        }
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    fn commit(&mut self) {
        self.persist();
        self.refresh();
    }

    fn persist(&self) {
        if let Err(err) = self.repo.save(&self.state()) {
            warn!("event=state_save module=service status=error error={err}");
        }
    }

    fn refresh(&mut self) {
        self.view = project(self.store.tasks(), self.filter, &self.search, self.sort);
    }
}
