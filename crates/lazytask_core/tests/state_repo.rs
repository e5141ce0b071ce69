use chrono::NaiveDate;
use lazytask_core::db::{open_db, open_db_in_memory};
use lazytask_core::{
    AppState, Priority, SortKey, SqliteStateRepository, StateRepository, Task, TaskId, STATE_KEY,
};

fn sample_state() -> AppState {
    AppState {
        tasks: vec![
            Task {
                id: TaskId::from("b7"),
                title: "Email boss".to_string(),
                completed: false,
                created_at: 1_704_067_200_000,
                due: NaiveDate::from_ymd_opt(2024, 1, 1),
                priority: Priority::Low,
                order: 2,
            },
            Task {
                id: TaskId::from("a1"),
                title: "Call mom".to_string(),
                completed: true,
                created_at: 1_703_980_800_000,
                due: None,
                priority: Priority::High,
                order: 1,
            },
        ],
        sort: SortKey::PriorityDesc,
    }
}

#[test]
fn load_returns_none_when_nothing_saved() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStateRepository::new(&conn);
    assert_eq!(repo.key(), STATE_KEY);
    assert!(repo.load().unwrap().is_none());
}

#[test]
fn save_then_load_roundtrips_state() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStateRepository::new(&conn);
    let state = sample_state();

    repo.save(&state).unwrap();
    assert_eq!(repo.load().unwrap(), Some(state));
}

#[test]
fn save_then_load_roundtrips_empty_state() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStateRepository::new(&conn);
    let state = AppState::default();

    repo.save(&state).unwrap();
    assert_eq!(repo.load().unwrap(), Some(state));
}

#[test]
fn later_save_replaces_earlier_one() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStateRepository::new(&conn);
    repo.save(&sample_state()).unwrap();

    let mut next = sample_state();
    next.tasks.truncate(1);
    next.sort = SortKey::Manual;
    repo.save(&next).unwrap();

    assert_eq!(repo.load().unwrap(), Some(next));
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_store;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn blob_uses_expected_wire_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStateRepository::new(&conn);
    repo.save(&sample_state()).unwrap();

    let raw = repo.load_raw().unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["sort"], "priority_desc");
    assert_eq!(json["tasks"][0]["id"], "b7");
    assert_eq!(json["tasks"][0]["createdAt"], 1_704_067_200_000_i64);
    assert_eq!(json["tasks"][0]["due"], "2024-01-01");
    assert_eq!(json["tasks"][0]["priority"], "low");
    assert_eq!(json["tasks"][1]["due"], serde_json::Value::Null);
    assert_eq!(json["tasks"][1]["completed"], true);
    assert_eq!(json["tasks"][1]["order"], 1);
}

#[test]
fn corrupt_blob_loads_as_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStateRepository::new(&conn);
    repo.save_raw("{not valid json").unwrap();

    assert!(repo.load().unwrap().is_none());
}

#[test]
fn unknown_sort_key_loads_as_manual() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStateRepository::new(&conn);
    repo.save_raw(r#"{"tasks": [], "sort": "alphabetical"}"#).unwrap();

    let state = repo.load().unwrap().unwrap();
    assert_eq!(state.sort, SortKey::Manual);
}

#[test]
fn separate_keys_do_not_collide() {
    let conn = open_db_in_memory().unwrap();
    let work = SqliteStateRepository::with_key(&conn, "work");
    let home = SqliteStateRepository::with_key(&conn, "home");
    work.save(&sample_state()).unwrap();

    assert!(home.load().unwrap().is_none());
    assert!(work.load().unwrap().is_some());
}

#[test]
fn state_survives_reopening_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lazytask.sqlite3");

    let conn = open_db(&path).unwrap();
    SqliteStateRepository::new(&conn)
        .save(&sample_state())
        .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    let loaded = SqliteStateRepository::new(&conn).load().unwrap();
    assert_eq!(loaded, Some(sample_state()));
}
