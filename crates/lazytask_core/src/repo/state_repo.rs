//! Persisted application state: contract and SQLite key-value implementation.
//!
//! # Responsibility
//! - Save and load the full `AppState` blob under one key.
//! - Tolerate corrupt or partially malformed blobs on load.
//!
//! # Invariants
//! - A blob that is not a JSON object loads as "nothing saved".
//! - Malformed or duplicate task records are skipped, never fatal.
//! - `save` followed by `load` yields an equal state.

use crate::db::DbError;
use crate::model::state::{AppState, SortKey};
use crate::model::task::{Task, TaskId};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default key of the persisted state slot.
pub const STATE_KEY: &str = "lazytask:data";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for state persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Encode(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode state: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Storage boundary for the canonical state.
pub trait StateRepository {
    /// Returns the saved state, or `None` when nothing usable is stored.
    fn load(&self) -> RepoResult<Option<AppState>>;
    /// Replaces the saved state.
    fn save(&self, state: &AppState) -> RepoResult<()>;
}

impl<R: StateRepository + ?Sized> StateRepository for &R {
    fn load(&self) -> RepoResult<Option<AppState>> {
        (**self).load()
    }

    fn save(&self, state: &AppState) -> RepoResult<()> {
        (**self).save(state)
    }
}

/// SQLite-backed key-value state slot.
pub struct SqliteStateRepository<'conn> {
    conn: &'conn Connection,
    key: String,
}

impl<'conn> SqliteStateRepository<'conn> {
    /// Uses the default slot key [`STATE_KEY`].
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_key(conn, STATE_KEY)
    }

    pub fn with_key(conn: &'conn Connection, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Writes a raw blob into the slot without encoding.
    pub fn save_raw(&self, raw: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![self.key.as_str(), raw],
        )?;
        Ok(())
    }

    /// Reads the raw blob stored in the slot.
    pub fn load_raw(&self) -> RepoResult<Option<String>> {
        let raw = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [self.key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(raw)
    }
}

impl StateRepository for SqliteStateRepository<'_> {
    fn load(&self) -> RepoResult<Option<AppState>> {
        let Some(raw) = self.load_raw()? else {
            debug!("event=state_load module=repo status=empty key={}", self.key);
            return Ok(None);
        };

        let state = decode_state(&raw);
        match &state {
            Some(state) => debug!(
                "event=state_load module=repo status=ok key={} tasks={} sort={}",
                self.key,
                state.tasks.len(),
                state.sort
            ),
            None => warn!(
                "event=state_load module=repo status=corrupt key={} bytes={}",
                self.key,
                raw.len()
            ),
        }
        Ok(state)
    }

    fn save(&self, state: &AppState) -> RepoResult<()> {
        let raw = encode_state(state)?;
        self.save_raw(&raw)?;
        debug!(
            "event=state_save module=repo status=ok key={} tasks={} bytes={}",
            self.key,
            state.tasks.len(),
            raw.len()
        );
        Ok(())
    }
}

/// Serializes state into the persisted blob layout `{"tasks": [...], "sort": "..."}`.
pub fn encode_state(state: &AppState) -> RepoResult<String> {
    Ok(serde_json::to_string(state)?)
}

/// Decodes a persisted blob.
///
/// Returns `None` when the blob is not a JSON object. Inside a readable
/// object, a missing or non-array `tasks` means no tasks. A missing, blank,
/// `null`, `false` or `0` `sort` means the default sort key; any other
/// non-string `sort` sorts by creation sequence.
pub fn decode_state(raw: &str) -> Option<AppState> {
    let Ok(Value::Object(mut root)) = serde_json::from_str::<Value>(raw) else {
        return None;
    };

    let tasks = match root.remove("tasks") {
        Some(Value::Array(items)) => decode_tasks(items),
        _ => Vec::new(),
    };
    let sort = match root.remove("sort") {
        Some(Value::String(value)) if !value.is_empty() => SortKey::from(value),
        Some(value) if is_truthy(&value) => SortKey::Manual,
        _ => SortKey::default(),
    };

    Some(AppState { tasks, sort })
}

/// `null`, `false`, `0` and `""` count as unset; anything else is a value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn decode_tasks(items: Vec<Value>) -> Vec<Task> {
    let mut seen: HashSet<TaskId> = HashSet::with_capacity(items.len());
    let mut tasks = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let task = match serde_json::from_value::<Task>(item) {
            Ok(task) => task,
            Err(err) => {
                warn!(
                    "event=state_load module=repo status=skip index={} reason=decode error={}",
                    index, err
                );
                continue;
            }
        };
        if let Err(err) = task.validate() {
            warn!(
                "event=state_load module=repo status=skip index={} reason=invalid error={}",
                index, err
            );
            continue;
        }
        if !seen.insert(task.id.clone()) {
            warn!(
                "event=state_load module=repo status=skip index={} reason=duplicate_id id={}",
                index, task.id
            );
            continue;
        }
        tasks.push(task);
    }

    tasks
}
