//! Application state persisted as one unit.
//!
//! # Invariants
//! - `AppState` is always saved and loaded in full.
//! - Unknown sort keys decode to `SortKey::Manual`, never to an error.

use crate::model::task::Task;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Ordering applied by the view projector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortKey {
    /// Oldest first.
    CreatedAsc,
    /// Newest first.
    #[default]
    CreatedDesc,
    /// Earliest due date first; undated tasks last.
    DueAsc,
    /// Latest due date first; undated tasks last.
    DueDesc,
    /// High before medium before low.
    PriorityDesc,
    /// Low before medium before high.
    PriorityAsc,
    /// Ascending creation sequence (`Task::order`).
    Manual,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        Self::CreatedDesc,
        Self::CreatedAsc,
        Self::DueAsc,
        Self::DueDesc,
        Self::PriorityDesc,
        Self::PriorityAsc,
        Self::Manual,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAsc => "created_asc",
            Self::CreatedDesc => "created_desc",
            Self::DueAsc => "due_asc",
            Self::DueDesc => "due_desc",
            Self::PriorityDesc => "priority_desc",
            Self::PriorityAsc => "priority_asc",
            Self::Manual => "manual",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == value)
            .ok_or_else(|| {
                format!(
                    "unsupported sort key `{value}`; expected one of {}",
                    Self::ALL.map(SortKey::as_str).join("|")
                )
            })
    }
}

impl From<String> for SortKey {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(Self::Manual)
    }
}

impl From<SortKey> for String {
    fn from(value: SortKey) -> Self {
        value.as_str().to_string()
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical state: the task collection plus the sort preference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// Canonical collection in storage order.
    pub tasks: Vec<Task>,
    /// Sort preference chosen by the user.
    pub sort: SortKey,
}
