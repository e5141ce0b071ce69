//! Persistence adapter for the canonical state.
//!
//! # Responsibility
//! - Define the load/save contract consumed by the session.
//! - Keep SQLite and blob encoding details out of service code.

pub mod state_repo;
