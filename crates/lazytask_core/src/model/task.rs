//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record persisted by core.
//! - Provide validation for invariants that must hold for stored tasks.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `title.trim()` is never empty for a task in the collection.
//! - `created_at` and `order` are assigned once at creation.
//!
//! # See also
//! - `service::task_store` for the only code path that creates tasks.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Opaque stable identifier for a task.
///
/// Stored as text so identifiers written by older clients (not UUID-shaped)
/// still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered task priority.
///
/// Decoding is lenient: an unrecognized value becomes `Low`, which is also
/// the rank unknown values sort with. A `null` value becomes the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "Option<String>")]
pub enum Priority {
    /// Rank 1.
    Low,
    /// Rank 2; assigned when the caller gives no priority.
    #[default]
    Medium,
    /// Rank 3.
    High,
}

impl Priority {
    /// Sort rank: high=3, medium=2, low=1.
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl From<Option<String>> for Priority {
    fn from(value: Option<String>) -> Self {
        value.map_or_else(Self::default, |value| value.parse().unwrap_or(Self::Low))
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!(
                "unsupported priority `{other}`; expected low|medium|high"
            )),
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for persisted or incoming task records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// `id` is an empty string.
    EmptyId,
    /// `title` is empty after trimming.
    BlankTitle(TaskId),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "task id cannot be empty"),
            Self::BlankTitle(id) => write!(f, "task {id} has a blank title"),
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record.
///
/// Field names on the wire are camelCase (`createdAt`) to stay compatible
/// with the persisted blob layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable identity, never reused.
    pub id: TaskId,
    /// Display text; never blank once stored.
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// Unix epoch milliseconds at creation.
    pub created_at: i64,
    /// Calendar date without time component.
    ///
    /// Blank, `null` or unparsable values decode as `None`.
    #[serde(default, deserialize_with = "deserialize_lenient_date")]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    /// Creation sequence, used as the neutral sort order.
    pub order: u64,
}

fn deserialize_lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(value)) => {
            NaiveDate::parse_from_str(value.trim(), DUE_DATE_FORMAT).ok()
        }
        _ => None,
    })
}

impl Task {
    /// Checks invariants required for a task to live in the collection.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.as_str().is_empty() {
            return Err(TaskValidationError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle(self.id.clone()));
        }
        Ok(())
    }

    /// Returns a copy with `completed` flipped.
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }

    /// Returns a copy with a new title.
    pub fn retitled(&self, title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Priority, Task, TaskId, TaskValidationError};

    fn sample() -> Task {
        Task {
            id: TaskId::from("t-1"),
            title: "water plants".to_string(),
            completed: false,
            created_at: 1_700_000_000_000,
            due: None,
            priority: Priority::Medium,
            order: 1,
        }
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(TaskId::generate(), TaskId::generate());
    }

    #[test]
    fn priority_ranks_are_ordered() {
        assert!(Priority::High.rank() > Priority::Medium.rank());
        assert!(Priority::Medium.rank() > Priority::Low.rank());
    }

    #[test]
    fn priority_parse_is_case_insensitive_and_strict() {
        assert_eq!(" HIGH ".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn malformed_due_and_null_priority_keep_the_task() {
        let value = serde_json::json!({
            "id": "t-9",
            "title": "renew passport",
            "completed": false,
            "createdAt": 5,
            "due": "",
            "priority": null,
            "order": 9
        });
        let task: Task = serde_json::from_value(value).unwrap();
        assert_eq!(task.due, None);
        assert_eq!(task.priority, Priority::Medium);

        let value = serde_json::json!({
            "id": "t-10",
            "title": "pay rent",
            "createdAt": 6,
            "due": 20240101,
            "priority": "urgent",
            "order": 10
        });
        let task: Task = serde_json::from_value(value).unwrap();
        assert_eq!(task.due, None);
        assert_eq!(task.priority, Priority::Low);
    }

    #[test]
    fn due_date_keeps_valid_calendar_day() {
        let value = serde_json::json!({
            "id": "t-11",
            "title": "dentist",
            "createdAt": 7,
            "due": "2024-02-29",
            "order": 11
        });
        let task: Task = serde_json::from_value(value).unwrap();
        assert_eq!(task.due, chrono::NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn validate_rejects_blank_title() {
        let mut task = sample();
        task.title = "   ".to_string();
        assert_eq!(
            task.validate(),
            Err(TaskValidationError::BlankTitle(TaskId::from("t-1")))
        );
    }

    #[test]
    fn toggled_leaves_other_fields_alone() {
        let task = sample();
        let flipped = task.toggled();
        assert!(flipped.completed);
        assert_eq!(flipped.toggled(), task);
    }
}
