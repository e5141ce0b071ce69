//! Core domain logic for LazyTask.
//! This crate is the single source of truth for task list invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::state::{AppState, SortKey};
pub use model::task::{Priority, Task, TaskId, TaskValidationError};
pub use repo::state_repo::{
    decode_state, encode_state, RepoError, RepoResult, SqliteStateRepository, StateRepository,
    STATE_KEY,
};
pub use service::session::{TaskEvent, TaskSession};
pub use service::task_store::{Clock, NewTask, SystemClock, TaskStore};
pub use view::projector::{project, summarize, TaskFilter, TaskSummary};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
