use std::{fmt, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use shared::{
    domain::{Announcement, AnnouncementId},
    error::{BoardError, BoardResult},
};

mod ledger;
mod mysql;
mod sqlite;
mod sync;

pub use ledger::{LedgerStore, SqliteLedger};
pub use mysql::MySqlStore;
pub use sqlite::SqliteStore;
pub use sync::{sync_recent, SyncReport};

pub(crate) const LIST_SQL: &str = "SELECT id, author, date, msg FROM announcement ORDER BY id";
pub(crate) const INSERT_SQL: &str =
    "INSERT INTO announcement (msg, author, date) VALUES (?, ?, CURRENT_TIMESTAMP)";
pub(crate) const UPDATE_SQL: &str =
    "UPDATE announcement SET msg = ?, author = ?, date = CURRENT_TIMESTAMP WHERE id = ?";
pub(crate) const RESTORE_SQL: &str =
    "UPDATE announcement SET author = ?, date = ?, msg = ? WHERE id = ?";

/// Connection parameters for a MySQL/MariaDB server.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 3306,
            user: "root".into(),
            password: String::new(),
            database: "project_db".into(),
        }
    }
}

// Keeps the password out of logs.
impl fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Where the announcement table lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    MySql(StoreSettings),
    Url(String),
}

/// Sole owner of the database connection. Each call issues one statement
/// that commits on its own.
#[async_trait]
pub trait AnnouncementStore: Send + Sync {
    /// All rows, ascending by id.
    async fn list_all(&self) -> BoardResult<Vec<Announcement>>;

    /// Inserts a row stamped with the database's current time; the database
    /// assigns the id. Returns the new id when the driver reports one.
    async fn insert(&self, author: &str, msg: &str) -> BoardResult<Option<AnnouncementId>>;

    /// Overwrites msg and author and stamps the current time. Returns the
    /// number of rows affected; zero means no row has that id.
    async fn update(&self, id: AnnouncementId, author: &str, msg: &str) -> BoardResult<u64>;

    /// Rows dated within the last `window` of database time, ascending by id.
    async fn list_recent(&self, window: Duration) -> BoardResult<Vec<Announcement>>;

    /// Writes author, date and msg of `entry` back onto the row with the same
    /// id, keeping the date as given. Returns the number of rows affected.
    async fn restore(&self, entry: &Announcement) -> BoardResult<u64>;

    async fn health_check(&self) -> BoardResult<()>;

    /// Creates the announcement table when it is missing.
    async fn ensure_schema(&self) -> BoardResult<()>;

    async fn close(&self);
}

/// Opens the store for `target` and verifies the connection with a ping.
/// Every failure here is a [`BoardError::Connection`].
pub async fn open_store(target: &StoreTarget) -> BoardResult<Box<dyn AnnouncementStore>> {
    let store: Box<dyn AnnouncementStore> = match target {
        StoreTarget::MySql(settings) => Box::new(MySqlStore::connect(settings).await?),
        StoreTarget::Url(url) if url.starts_with("sqlite:") => {
            Box::new(SqliteStore::connect(url).await?)
        }
        StoreTarget::Url(url) if url.starts_with("mysql:") || url.starts_with("mariadb:") => {
            Box::new(MySqlStore::connect_url(url).await?)
        }
        StoreTarget::Url(url) => {
            return Err(BoardError::Connection(format!(
                "unsupported database url '{url}' (expected mysql:// or sqlite:)"
            )))
        }
    };

    if let Err(err) = store.health_check().await {
        store.close().await;
        return Err(BoardError::Connection(err.to_string()));
    }
    Ok(store)
}

#[derive(sqlx::FromRow)]
pub(crate) struct AnnouncementRow {
    id: i64,
    author: Option<String>,
    date: Option<NaiveDateTime>,
    msg: Option<String>,
}

impl From<AnnouncementRow> for Announcement {
    fn from(row: AnnouncementRow) -> Self {
        Self {
            id: AnnouncementId(row.id),
            author: row.author.unwrap_or_default(),
            date: row.date,
            msg: row.msg.unwrap_or_default(),
        }
    }
}

pub(crate) fn connection_error(err: sqlx::Error) -> BoardError {
    BoardError::Connection(err.to_string())
}

pub(crate) fn read_error(err: sqlx::Error) -> BoardError {
    BoardError::Read(err.to_string())
}

pub(crate) fn write_error(err: sqlx::Error) -> BoardError {
    BoardError::Write(err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
