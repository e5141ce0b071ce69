//! CLI host for the LazyTask core.
//!
//! # Responsibility
//! - Map subcommands onto session events.
//! - Resolve database and logging locations from flags and environment.
//!
//! Each invocation loads state once, applies one event, and prints the
//! resulting projection.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use lazytask_core::db::open_db;
use lazytask_core::{
    default_log_level, init_logging, Priority, SortKey, SqliteStateRepository, Task, TaskEvent,
    TaskFilter, TaskId, TaskSession,
};
use log::debug;
use std::path::PathBuf;

const DB_FILE_NAME: &str = "lazytask.sqlite3";

/// Local task list.
#[derive(Parser, Debug)]
#[command(name = "lazytask", version, about = "lazytask: a local task list")]
struct Cli {
    /// SQLite file holding saved state.
    #[arg(long, env = "LAZYTASK_DB_PATH")]
    db: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "LAZYTASK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, env = "LAZYTASK_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a task.
    Add {
        title: String,
        /// Due date as YYYY-MM-DD.
        #[arg(long)]
        due: Option<NaiveDate>,
        /// low|medium|high
        #[arg(long, value_parser = parse_priority)]
        priority: Option<Priority>,
    },

    /// Show tasks.
    List {
        #[arg(long, default_value = "all")]
        filter: TaskFilter,
        #[arg(long, default_value = "")]
        search: String,
        /// Also saves the sort preference.
        #[arg(long, value_parser = parse_sort_key)]
        sort: Option<SortKey>,
    },

    /// Flip a task between active and completed.
    Toggle { id: String },

    /// Change a task title; blank titles are ignored.
    Rename { id: String, title: String },

    /// Delete a task.
    Delete { id: String },

    /// Delete every completed task.
    ClearCompleted,

    /// Save the default sort order.
    Sort {
        #[arg(value_parser = parse_sort_key)]
        key: SortKey,
    },

    /// Print core linkage info.
    Ping,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).context("failed to initialize logging")?;
    }

    if matches!(cli.cmd, Command::Ping) {
        println!("lazytask_core ping={}", lazytask_core::ping());
        println!("lazytask_core version={}", lazytask_core::core_version());
        return Ok(());
    }

    let db_path = resolve_db_path(cli.db);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let conn = open_db(&db_path)
        .with_context(|| format!("failed to open state database {}", db_path.display()))?;
    let mut session = TaskSession::open(SqliteStateRepository::new(&conn));

    let event = match cli.cmd {
        Command::Add {
            title,
            due,
            priority,
        } => TaskEvent::SubmitTask {
            title,
            due,
            priority,
        },
        Command::List {
            filter,
            search,
            sort,
        } => {
            session.set_filter(filter);
            session.set_search(search);
            match sort {
                Some(sort) => TaskEvent::SetSort(sort),
                None => {
                    render(&session);
                    return Ok(());
                }
            }
        }
        Command::Toggle { id } => TaskEvent::Toggle(TaskId::from(id)),
        Command::Rename { id, title } => TaskEvent::Rename {
            id: TaskId::from(id),
            title,
        },
        Command::Delete { id } => TaskEvent::Delete(TaskId::from(id)),
        Command::ClearCompleted => TaskEvent::ClearCompleted,
        Command::Sort { key } => TaskEvent::SetSort(key),
        Command::Ping => return Ok(()),
    };

    debug!("event=cli_dispatch module=cli status=start event={event:?}");
    let rejected_add = matches!(event, TaskEvent::SubmitTask { .. });
    match session.dispatch(event) {
        Some(id) => println!("added {id}"),
        None if rejected_add => eprintln!("ignored: task title is blank"),
        None => {}
    }
    render(&session);
    Ok(())
}

// `SortKey` decodes unknown keys leniently through `From<String>`; the command
// line must use the strict `FromStr` instead.
fn parse_sort_key(value: &str) -> Result<SortKey, String> {
    value.parse()
}

fn parse_priority(value: &str) -> Result<Priority, String> {
    value.parse()
}

fn resolve_db_path(flag: Option<PathBuf>) -> PathBuf {
    flag.filter(|path| !path.as_os_str().is_empty())
        .or_else(|| dirs::data_dir().map(|dir| dir.join("lazytask").join(DB_FILE_NAME)))
        .unwrap_or_else(|| std::env::temp_dir().join(DB_FILE_NAME))
}

fn render(session: &TaskSession<SqliteStateRepository<'_>>) {
    println!(
        "[filter={} sort={} search={:?}]",
        session.filter(),
        session.sort(),
        session.search()
    );
    for task in session.view() {
        println!("{}", format_row(task));
    }
    println!("{}", session.summary());
}

fn format_row(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    let due = task
        .due
        .map(|due| format!(" · due {}", due.format("%b %-d")))
        .unwrap_or_default();
    format!(
        "[{mark}] {} {}{} · {}",
        task.id, task.title, due, task.priority
    )
}
