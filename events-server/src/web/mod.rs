//! Web server module for receiving GitHub webhooks and serving stored events.
//!
//! ## Routes
//!
//! ```text
//! POST /webhook     → normalize → store
//! GET  /api/events  → recent events, newest first
//! POST /receiver    → {}
//! GET  /health      → {"status":"ok"}
//! ```

pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{
    github_webhook, health, receiver, recent_events, AppState, ErrorResponse, EventsQuery,
    HealthResponse, WebhookResponse, GITHUB_EVENT_HEADER, MAX_WINDOW_SECS,
};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/receiver", post(receiver))
        .route(
            "/webhook",
            post(github_webhook).layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .route("/api/events", get(recent_events))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
