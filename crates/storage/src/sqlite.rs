use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use async_trait::async_trait;
use shared::{
    domain::{Announcement, AnnouncementId},
    error::{BoardError, BoardResult},
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};

use crate::{
    connection_error, read_error, write_error, AnnouncementRow, AnnouncementStore, INSERT_SQL,
    LIST_SQL, RESTORE_SQL, UPDATE_SQL,
};

const SCHEMA_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS announcement (
        id     INTEGER PRIMARY KEY AUTOINCREMENT,
        author TEXT,
        date   DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        msg    TEXT NOT NULL
    )
"#;

// `datetime('now', '-N seconds')` yields the same text layout CURRENT_TIMESTAMP
// stores, so the comparison is lexical.
const LIST_RECENT_SQL: &str = "SELECT id, author, date, msg FROM announcement \
     WHERE date >= datetime('now', ?) ORDER BY id";

/// SQLite backed store, used for local runs and tests.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> BoardResult<Self> {
        let pool = connect_pool(database_url).await?;
        tracing::info!(database_url, "opened sqlite store");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl AnnouncementStore for SqliteStore {
    async fn list_all(&self) -> BoardResult<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(LIST_SQL)
            .fetch_all(&self.pool)
            .await
            .map_err(read_error)?;
        tracing::debug!(rows = rows.len(), "listed announcements");
        Ok(rows.into_iter().map(Announcement::from).collect())
    }

    async fn insert(&self, author: &str, msg: &str) -> BoardResult<Option<AnnouncementId>> {
        let result = sqlx::query(INSERT_SQL)
            .bind(msg)
            .bind(author)
            .execute(&self.pool)
            .await
            .map_err(write_error)?;
        let id = AnnouncementId(result.last_insert_rowid());
        tracing::debug!(%id, author, "inserted announcement");
        Ok(Some(id))
    }

    async fn update(&self, id: AnnouncementId, author: &str, msg: &str) -> BoardResult<u64> {
        let result = sqlx::query(UPDATE_SQL)
            .bind(msg)
            .bind(author)
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(write_error)?;
        tracing::debug!(%id, rows = result.rows_affected(), "updated announcement");
        Ok(result.rows_affected())
    }

    async fn list_recent(&self, window: Duration) -> BoardResult<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(LIST_RECENT_SQL)
            .bind(format!("-{} seconds", window.as_secs()))
            .fetch_all(&self.pool)
            .await
            .map_err(read_error)?;
        tracing::debug!(rows = rows.len(), window_secs = window.as_secs(), "listed recent announcements");
        Ok(rows.into_iter().map(Announcement::from).collect())
    }

    async fn restore(&self, entry: &Announcement) -> BoardResult<u64> {
        let result = sqlx::query(RESTORE_SQL)
            .bind(&entry.author)
            .bind(entry.date)
            .bind(&entry.msg)
            .bind(entry.id.0)
            .execute(&self.pool)
            .await
            .map_err(write_error)?;
        tracing::debug!(id = %entry.id, rows = result.rows_affected(), "restored announcement");
        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> BoardResult<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(connection_error)?;
        Ok(())
    }

    async fn ensure_schema(&self) -> BoardResult<()> {
        sqlx::query(SCHEMA_SQL)
            .execute(&self.pool)
            .await
            .map_err(write_error)?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("sqlite store closed");
    }
}

/// One-connection pool for a `sqlite:` url, creating the file and its parent
/// directory when missing.
pub(crate) async fn connect_pool(database_url: &str) -> BoardResult<Pool<Sqlite>> {
    ensure_sqlite_parent_dir_exists(database_url)?;

    let connect_options = SqliteConnectOptions::from_str(database_url)
        .map_err(connection_error)?
        .create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await
        .map_err(connection_error)
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> BoardResult<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).map_err(|err| {
        BoardError::Connection(format!(
            "failed to create parent directory '{}' for database url '{database_url}': {err}",
            parent.display()
        ))
    })
}

pub(crate) fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}
