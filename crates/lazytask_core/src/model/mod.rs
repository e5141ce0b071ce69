//! Domain model for the task list.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Define the persisted state shape (`AppState`).
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Deletion is a hard remove; ids are never recycled.

pub mod state;
pub mod task;
