use newsdesk_core::db::migrations::latest_version;
use newsdesk_core::db::{open_db, open_db_in_memory, DbError};
use newsdesk_core::{RepoError, SqliteStore};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "content_items");
    assert_table_exists(&conn, "ranked_slots");
    assert_table_exists(&conn, "engagement");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("newsdesk.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "ranked_slots");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteStore::try_new(conn).err().unwrap();
    match err {
        RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        } => {
            assert_eq!(expected_version, latest_version());
            assert_eq!(actual_version, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn ranked_slots_schema_rejects_duplicate_rank_and_member_without_rank() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO content_items (item_id, headline, source, category, published_on)
         VALUES ('a', 'A', 'wire', 'local', '2024-03-01'),
                ('b', 'B', 'wire', 'local', '2024-03-01');
         INSERT INTO ranked_slots (list_kind, item_id, is_member, rank)
         VALUES ('top_news', 'a', 1, 1);",
    )
    .unwrap();

    let duplicate = conn.execute(
        "INSERT INTO ranked_slots (list_kind, item_id, is_member, rank)
         VALUES ('top_news', 'b', 1, 1);",
        [],
    );
    assert!(duplicate.is_err());

    let rankless_member = conn.execute(
        "INSERT INTO ranked_slots (list_kind, item_id, is_member, rank)
         VALUES ('trending', 'b', 1, NULL);",
        [],
    );
    assert!(rankless_member.is_err());

    let same_rank_other_kind = conn.execute(
        "INSERT INTO ranked_slots (list_kind, item_id, is_member, rank)
         VALUES ('trending', 'b', 1, 1);",
        [],
    );
    assert!(same_rank_other_kind.is_ok());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
