//! Core use-case services.
//!
//! # Responsibility
//! - `task_store`: canonical collection and its transitions.
//! - `session`: event surface binding store, view and persistence.

pub mod session;
pub mod task_store;
