use async_trait::async_trait;
use shared::{
    domain::{Announcement, AnnouncementId},
    error::{BoardError, BoardResult},
};
use sqlx::{Pool, Sqlite};

use crate::{read_error, sqlite::connect_pool, write_error, AnnouncementRow};

const SCHEMA_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS ledger_entry (
        id     INTEGER PRIMARY KEY,
        author TEXT,
        date   DATETIME,
        msg    TEXT
    )
"#;

/// Append-and-amend record of announcements keyed by id. It holds the
/// author each announcement was first recorded under, which is what
/// `sync_recent` checks edits against.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn exists(&self, id: AnnouncementId) -> BoardResult<bool>;

    /// Fails with [`BoardError::NotFound`] when no entry has that id.
    async fn read(&self, id: AnnouncementId) -> BoardResult<Announcement>;

    /// Fails with [`BoardError::Write`] when an entry with the id exists.
    async fn create(&self, entry: &Announcement) -> BoardResult<()>;

    /// Fails with [`BoardError::NotFound`] when no entry has that id.
    async fn update(&self, entry: &Announcement) -> BoardResult<()>;

    async fn ensure_schema(&self) -> BoardResult<()>;

    async fn close(&self);
}

/// Ledger kept in a `ledger_entry` table of its own SQLite database.
#[derive(Clone)]
pub struct SqliteLedger {
    pool: Pool<Sqlite>,
}

impl SqliteLedger {
    /// Opens the ledger and creates its table when missing.
    pub async fn connect(database_url: &str) -> BoardResult<Self> {
        let ledger = Self {
            pool: connect_pool(database_url).await?,
        };
        ledger.ensure_schema().await?;
        tracing::info!(database_url, "opened ledger");
        Ok(ledger)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl LedgerStore for SqliteLedger {
    async fn exists(&self, id: AnnouncementId) -> BoardResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM ledger_entry WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error)?;
        Ok(found.is_some())
    }

    async fn read(&self, id: AnnouncementId) -> BoardResult<Announcement> {
        sqlx::query_as::<_, AnnouncementRow>(
            "SELECT id, author, date, msg FROM ledger_entry WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(read_error)?
        .map(Announcement::from)
        .ok_or(BoardError::NotFound(id))
    }

    async fn create(&self, entry: &Announcement) -> BoardResult<()> {
        if self.exists(entry.id).await? {
            return Err(BoardError::Write(format!(
                "ledger entry {} already exists",
                entry.id
            )));
        }
        sqlx::query("INSERT INTO ledger_entry (id, author, date, msg) VALUES (?, ?, ?, ?)")
            .bind(entry.id.0)
            .bind(&entry.author)
            .bind(entry.date)
            .bind(&entry.msg)
            .execute(&self.pool)
            .await
            .map_err(write_error)?;
        tracing::debug!(id = %entry.id, author = %entry.author, "ledger entry created");
        Ok(())
    }

    async fn update(&self, entry: &Announcement) -> BoardResult<()> {
        let result =
            sqlx::query("UPDATE ledger_entry SET author = ?, date = ?, msg = ? WHERE id = ?")
                .bind(&entry.author)
                .bind(entry.date)
                .bind(&entry.msg)
                .bind(entry.id.0)
                .execute(&self.pool)
                .await
                .map_err(write_error)?;
        if result.rows_affected() == 0 {
            return Err(BoardError::NotFound(entry.id));
        }
        tracing::debug!(id = %entry.id, "ledger entry updated");
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
        tracing::info!("ledger closed");
    }
}

#[cfg(test)]
#[path = "tests/ledger_tests.rs"]
mod tests;
