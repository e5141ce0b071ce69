//! Read-only projections over canonical state.
//!
//! # Responsibility
//! - Own all filter/search/sort logic for displayed tasks.
//! - Compute summary counts shown next to the list.

pub mod projector;
