//! Event persistence.
//!
//! Provides a long-lived [`EventStore`] handle over a SQLite pool, created
//! once at startup and shared by every request handler.
//!
//! ## Records
//!
//! ```text
//! NormalizedEvent → insert() → github_events row (+ id) → recent() → StoredEvent
//! ```

pub mod events;

use thiserror::Error;

pub use events::EventStore;

/// Failures at the storage boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to connect to event store: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("failed to apply event store migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("failed to insert event: {0}")]
    Insert(#[source] sqlx::Error),

    #[error("failed to query events: {0}")]
    Query(#[source] sqlx::Error),

    #[error("invalid recency window: {0}")]
    Window(String),
}
