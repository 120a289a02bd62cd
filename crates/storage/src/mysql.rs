use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use shared::{
    domain::{Announcement, AnnouncementId},
    error::BoardResult,
};
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    MySql, Pool,
};

use crate::{
    connection_error, read_error, write_error, AnnouncementRow, AnnouncementStore,
    StoreSettings, INSERT_SQL, LIST_SQL, RESTORE_SQL, UPDATE_SQL,
};

const SCHEMA_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS announcement (
        id     INT AUTO_INCREMENT PRIMARY KEY,
        author VARCHAR(64),
        date   TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        msg    TEXT NOT NULL
    )
"#;

const LIST_RECENT_SQL: &str = "SELECT id, author, date, msg FROM announcement \
     WHERE date >= CURRENT_TIMESTAMP - INTERVAL ? SECOND ORDER BY id";

/// MySQL/MariaDB backed store holding a single connection.
#[derive(Clone)]
pub struct MySqlStore {
    pool: Pool<MySql>,
}

impl MySqlStore {
    pub async fn connect(settings: &StoreSettings) -> BoardResult<Self> {
        let options = MySqlConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&settings.user)
            .password(&settings.password)
            .database(&settings.database);
        tracing::info!(
            host = %settings.host,
            port = settings.port,
            database = %settings.database,
            "connecting to mysql"
        );
        Self::connect_with(options).await
    }

    pub async fn connect_url(database_url: &str) -> BoardResult<Self> {
        let options = MySqlConnectOptions::from_str(database_url).map_err(connection_error)?;
        tracing::info!("connecting to mysql via url");
        Self::connect_with(options).await
    }

    async fn connect_with(options: MySqlConnectOptions) -> BoardResult<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(connection_error)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<MySql> {
        &self.pool
    }
}

#[async_trait]
impl AnnouncementStore for MySqlStore {
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
        let id = i64::try_from(result.last_insert_id())
            .ok()
            .filter(|id| *id > 0)
            .map(AnnouncementId);
        tracing::debug!(?id, author, "inserted announcement");
        Ok(id)
    }

    // sqlx negotiates CLIENT_FOUND_ROWS, so matched rows are reported even
    // when the new values equal the old ones.
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
            .bind(window.as_secs())
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
        tracing::info!("mysql connection closed");
    }
}
