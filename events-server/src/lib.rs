//! GitHub event ingestion.
//!
//! Receives GitHub webhook deliveries, normalizes push and pull request
//! events into a single record shape, stores them, and serves the most
//! recent ones for display.
//!
//! ## Architecture
//!
//! ```text
//! Webhook → web → normalize → NormalizedEvent → store
//!                                                 ↓
//!                         GET /api/events ← recent()
//! ```

pub mod config;
pub mod event;
pub mod normalize;
pub mod store;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use event::{EventAction, EventView, NormalizedEvent, StorageId, StoredEvent};
pub use normalize::{normalize, parse_timestamp};
pub use store::{EventStore, StoreError};
pub use web::{router, AppState};
