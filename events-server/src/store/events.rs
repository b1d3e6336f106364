//! SQLite-backed event store.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{error, info};

use super::StoreError;
use crate::event::{NormalizedEvent, StorageId, StoredEvent};
use crate::normalize::utc_now;

#[derive(sqlx::FromRow)]
struct EventRow {
    id: i64,
    #[sqlx(flatten)]
    event: NormalizedEvent,
}

impl From<EventRow> for StoredEvent {
    fn from(row: EventRow) -> Self {
        Self {
            id: StorageId(row.id),
            event: row.event,
        }
    }
}

/// Shared handle to the event table.
///
/// Cloning is cheap; every clone uses the same connection pool.
#[derive(Clone, Debug)]
pub struct EventStore {
    pool: SqlitePool,
}

impl EventStore {
    /// Connect to the database at `url` and apply pending migrations.
    ///
    /// The database file is created if it does not exist. In-memory
    /// databases keep their connections open for the life of the pool,
    /// since closing the last connection discards the data.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        info!(max_connections = max_connections, "event_store_connecting");

        let options = SqliteConnectOptions::from_str(url)
            .map_err(StoreError::Connect)?
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
        if url.contains(":memory:") {
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(StoreError::Connect)?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, applying pending migrations.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations").run(&pool).await?;

        info!("event_store_ready");

        Ok(Self { pool })
    }

    /// Persist an event, returning the identifier the database assigned.
    pub async fn insert(&self, event: &NormalizedEvent) -> Result<StorageId, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO github_events (action, author, from_branch, to_branch, timestamp)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.action)
        .bind(&event.author)
        .bind(&event.from_branch)
        .bind(&event.to_branch)
        .bind(event.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, action = %event.action, "event_insert_failed");
            StoreError::Insert(e)
        })?;

        let id = StorageId(result.last_insert_rowid());

        info!(
            id = %id,
            action = %event.action,
            author = %event.author,
            to_branch = %event.to_branch,
            timestamp = %event.timestamp,
            "event_inserted"
        );

        Ok(id)
    }

    /// Events with a timestamp in `[now - window, now]`, newest first.
    ///
    /// Equal timestamps are ordered by most recent insert.
    pub async fn recent(&self, window: Duration) -> Result<Vec<StoredEvent>, StoreError> {
        let now = utc_now();
        let since = chrono::Duration::from_std(window)
            .ok()
            .and_then(|window| now.checked_sub_signed(window))
            .ok_or_else(|| StoreError::Window(format!("{}s", window.as_secs())))?;

        let rows: Vec<EventRow> = sqlx::query_as(
            r#"
            SELECT id, action, author, from_branch, to_branch, timestamp
            FROM github_events
            WHERE timestamp >= ? AND timestamp <= ?
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(since)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, window_secs = window.as_secs(), "event_query_failed");
            StoreError::Query(e)
        })?;

        info!(
            window_secs = window.as_secs(),
            count = rows.len(),
            "recent_events_fetched"
        );

        Ok(rows.into_iter().map(StoredEvent::from).collect())
    }

    /// Close the pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("event_store_closed");
    }
}
