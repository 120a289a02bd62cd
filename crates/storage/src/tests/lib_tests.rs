use super::*;
use crate::sqlite::sqlite_path;

async fn fresh_store() -> SqliteStore {
    let store = SqliteStore::connect("sqlite::memory:").await.expect("db");
    store.ensure_schema().await.expect("schema");
    store
}

#[tokio::test]
async fn lists_empty_table_as_empty_vec() {
    let store = fresh_store().await;
    let rows = store.list_all().await.expect("list");
    assert!(rows.is_empty());
}

#[tokio::test]
async fn first_insert_gets_id_one() {
    let store = fresh_store().await;
    let id = store.insert("user_1", "hello").await.expect("insert");
    assert_eq!(id, Some(AnnouncementId(1)));

    let rows = store.list_all().await.expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, AnnouncementId(1));
    assert_eq!(rows[0].author, "user_1");
    assert_eq!(rows[0].msg, "hello");
    assert!(rows[0].date.is_some());
}

// Tables created by other clients carry `date` without a default.
#[tokio::test]
async fn insert_stamps_date_on_table_without_default() {
    let store = SqliteStore::connect("sqlite::memory:").await.expect("db");
    sqlx::query(
        "CREATE TABLE announcement (id INTEGER PRIMARY KEY AUTOINCREMENT, author TEXT, date TIMESTAMP, msg TEXT)",
    )
    .execute(store.pool())
    .await
    .expect("bare schema");

    store.insert("user_1", "hello").await.expect("insert");
    let rows = store.list_all().await.expect("list");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].author, "user_1");
    assert_eq!(rows[0].msg, "hello");
    assert!(rows[0].date.is_some(), "{rows:?}");
}

#[tokio::test]
async fn rows_with_null_fields_still_list() {
    let store = SqliteStore::connect("sqlite::memory:").await.expect("db");
    sqlx::query(
        "CREATE TABLE announcement (id INTEGER PRIMARY KEY AUTOINCREMENT, author TEXT, date TIMESTAMP, msg TEXT)",
    )
    .execute(store.pool())
    .await
    .expect("bare schema");
    sqlx::query("INSERT INTO announcement (id) VALUES (3)")
        .execute(store.pool())
        .await
        .expect("raw insert");

    let rows = store.list_all().await.expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, AnnouncementId(3));
    assert_eq!(rows[0].author, "");
    assert_eq!(rows[0].msg, "");
    assert_eq!(rows[0].date, None);
    assert_eq!(rows[0].display_date(), "");
}

#[tokio::test]
async fn insert_appends_row_with_greater_id() {
    let store = fresh_store().await;
    store.insert("user_1", "one").await.expect("insert");
    store.insert("user_2", "two").await.expect("insert");
    let before = store.list_all().await.expect("list");

    store.insert("user_3", "three").await.expect("insert");
    let after = store.list_all().await.expect("list");

    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(&after[..before.len()], &before[..]);
    let added = after.last().expect("new row");
    assert_eq!(added.author, "user_3");
    assert_eq!(added.msg, "three");
    assert!(before.iter().all(|row| row.id < added.id));
}

#[tokio::test]
async fn update_overwrites_target_row_only() {
    let store = fresh_store().await;
    store.insert("user_1", "hello").await.expect("insert");
    store.insert("user_1", "keep me").await.expect("insert");
    let before = store.list_all().await.expect("list");

    let affected = store
        .update(AnnouncementId(1), "user_2", "bye")
        .await
        .expect("update");
    assert_eq!(affected, 1);

    let after = store.list_all().await.expect("list");
    assert_eq!(after.len(), 2);
    assert_eq!(after[0].id, AnnouncementId(1));
    assert_eq!(after[0].author, "user_2");
    assert_eq!(after[0].msg, "bye");
    assert!(after[0].date.is_some());
    assert!(after[0].date >= before[0].date);
    assert_eq!(after[1], before[1]);
}

#[tokio::test]
async fn update_missing_id_reports_zero_rows() {
    let store = fresh_store().await;
    let affected = store
        .update(AnnouncementId(999), "user_1", "x")
        .await
        .expect("update");
    assert_eq!(affected, 0);
    assert!(store.list_all().await.expect("list").is_empty());
}

#[tokio::test]
async fn list_is_ordered_by_id_after_updates() {
    let store = fresh_store().await;
    for msg in ["a", "b", "c", "d"] {
        store.insert("user_1", msg).await.expect("insert");
    }
    store
        .update(AnnouncementId(2), "user_3", "b2")
        .await
        .expect("update");
    store
        .update(AnnouncementId(4), "user_2", "d2")
        .await
        .expect("update");

    let ids: Vec<i64> = store
        .list_all()
        .await
        .expect("list")
        .iter()
        .map(|row| row.id.0)
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn list_is_ordered_by_id_for_out_of_order_inserts() {
    let store = fresh_store().await;
    for id in [5_i64, 2, 9, 1] {
        sqlx::query("INSERT INTO announcement (id, author, msg) VALUES (?, 'user_1', 'x')")
            .bind(id)
            .execute(store.pool())
            .await
            .expect("raw insert");
    }

    let ids: Vec<i64> = store
        .list_all()
        .await
        .expect("list")
        .iter()
        .map(|row| row.id.0)
        .collect();
    assert_eq!(ids, vec![1, 2, 5, 9]);
}

#[tokio::test]
async fn values_are_bound_not_interpolated() {
    let store = fresh_store().await;
    let hostile = "x'); DROP TABLE announcement; --";
    store.insert("user_1", hostile).await.expect("insert");

    let rows = store.list_all().await.expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].msg, hostile);
}

#[tokio::test]
async fn missing_table_surfaces_read_and_write_errors() {
    let store = SqliteStore::connect("sqlite::memory:").await.expect("db");

    let err = store.list_all().await.expect_err("no table");
    assert!(matches!(err, BoardError::Read(_)), "{err:?}");

    let err = store.insert("user_1", "hello").await.expect_err("no table");
    assert!(matches!(err, BoardError::Write(_)), "{err:?}");

    let err = store
        .update(AnnouncementId(1), "user_1", "hello")
        .await
        .expect_err("no table");
    assert!(matches!(err, BoardError::Write(_)), "{err:?}");
}

#[tokio::test]
async fn list_recent_skips_rows_dated_before_window() {
    let store = fresh_store().await;
    sqlx::query(
        "INSERT INTO announcement (author, date, msg) VALUES ('user_1', '2000-01-01 00:00:00', 'old')",
    )
    .execute(store.pool())
    .await
    .expect("raw insert");
    store.insert("user_2", "new").await.expect("insert");

    let recent = store
        .list_recent(Duration::from_secs(60))
        .await
        .expect("list recent");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, AnnouncementId(2));
    assert_eq!(recent[0].msg, "new");
}

#[tokio::test]
async fn restore_keeps_given_date() {
    let store = fresh_store().await;
    store.insert("user_1", "hello").await.expect("insert");
    let original = store.list_all().await.expect("list").remove(0);
    store
        .update(AnnouncementId(1), "user_3", "changed")
        .await
        .expect("update");

    let affected = store.restore(&original).await.expect("restore");
    assert_eq!(affected, 1);
    assert_eq!(store.list_all().await.expect("list"), vec![original.clone()]);

    let missing = Announcement {
        id: AnnouncementId(42),
        ..original
    };
    assert_eq!(store.restore(&missing).await.expect("restore"), 0);
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let store = fresh_store().await;
    store.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("board.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let store = SqliteStore::connect(&database_url).await.expect("db");
    store.close().await;

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}

#[tokio::test]
async fn open_store_rejects_unknown_scheme() {
    let result = open_store(&StoreTarget::Url("postgres://localhost/db".into())).await;
    match result {
        Err(BoardError::Connection(message)) => assert!(message.contains("unsupported")),
        Err(other) => panic!("unexpected error: {other:?}"),
        Ok(_) => panic!("postgres urls are not supported"),
    }
}

#[test]
fn debug_output_redacts_password() {
    let settings = StoreSettings {
        password: "hunter2".into(),
        ..StoreSettings::default()
    };
    let rendered = format!("{settings:?}");
    assert!(!rendered.contains("hunter2"));
    assert!(rendered.contains("project_db"));
}

#[test]
fn sqlite_path_ignores_memory_and_foreign_urls() {
    assert_eq!(sqlite_path("sqlite::memory:"), None);
    assert_eq!(sqlite_path("mysql://root@localhost/db"), None);
    assert_eq!(
        sqlite_path("sqlite://./data/board.db?mode=rwc"),
        Some(std::path::PathBuf::from("./data/board.db"))
    );
}
