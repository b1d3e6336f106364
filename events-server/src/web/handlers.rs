//! HTTP endpoint handlers.
//!
//! The webhook handler only:
//! 1. Reads the `X-GitHub-Event` header and JSON body
//! 2. Normalizes the delivery
//! 3. Stores the event, or acknowledges it as ignored
//!
//! Every failure is returned as a JSON body with an appropriate status.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::event::EventView;
use crate::normalize::normalize;
use crate::store::EventStore;
use crate::Config;

/// Header carrying the GitHub event type.
pub const GITHUB_EVENT_HEADER: &str = "X-GitHub-Event";

/// Largest look-back window accepted from a client, roughly a century.
pub const MAX_WINDOW_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: EventStore,
}

impl AppState {
    pub fn new(config: Config, store: EventStore) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Legacy receiver endpoint. Accepts anything and returns an empty object.
pub async fn receiver() -> Json<Value> {
    Json(Value::Object(Default::default()))
}

// =============================================================================
// GitHub Webhook
// =============================================================================

/// Webhook response.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WebhookResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookResponse {
    fn status(status: &str, message: &str) -> Self {
        Self {
            status: Some(status.to_string()),
            message: Some(message.to_string()),
            ..Default::default()
        }
    }

    fn error(error: &str) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Default::default()
        }
    }
}

/// GitHub webhook endpoint.
pub async fn github_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> impl IntoResponse {
    let event_type = headers
        .get(GITHUB_EVENT_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let status = rejection.status();
            warn!(
                event_type = %event_type,
                status = status.as_u16(),
                error = %rejection.body_text(),
                "github_webhook_body_rejected"
            );
            let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
                "Payload too large"
            } else {
                "Failed to read request body"
            };
            return (status, Json(WebhookResponse::error(message)));
        }
    };

    info!(
        event_type = %event_type,
        body_length = body.len(),
        "github_webhook_received"
    );

    if body.is_empty() {
        warn!(event_type = %event_type, "github_webhook_empty_body");
        return (
            StatusCode::BAD_REQUEST,
            Json(WebhookResponse::error("No payload received")),
        );
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!(event_type = %event_type, error = %e, "github_webhook_invalid_json");
            return (
                StatusCode::BAD_REQUEST,
                Json(WebhookResponse::error("Invalid JSON payload")),
            );
        }
    };

    if is_empty_payload(&payload) {
        warn!(event_type = %event_type, "github_webhook_empty_payload");
        return (
            StatusCode::BAD_REQUEST,
            Json(WebhookResponse::error("No payload received")),
        );
    }

    let Some(event) = normalize(event_type, &payload) else {
        info!(event_type = %event_type, "github_webhook_ignored");
        return (
            StatusCode::OK,
            Json(WebhookResponse::status("ignored", "Event not processed")),
        );
    };

    match state.store.insert(&event).await {
        Ok(id) => {
            info!(id = %id, action = %event.action, "github_webhook_stored");
            (
                StatusCode::OK,
                Json(WebhookResponse {
                    id: Some(id.to_string()),
                    ..WebhookResponse::status("success", "Event stored successfully")
                }),
            )
        }
        Err(e) => {
            error!(error = %e, action = %event.action, "github_webhook_store_failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(WebhookResponse::error("Failed to store event")),
            )
        }
    }
}

/// A JSON body with nothing in it: `null`, `false`, zero, or an empty
/// string, array or object.
fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

// =============================================================================
// Recent Events
// =============================================================================

/// Query parameters for the events listing.
#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    /// Look-back window in seconds; the configured default when absent.
    pub window: Option<u64>,
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    fn reply(status: StatusCode, error: &str) -> (StatusCode, Json<ErrorResponse>) {
        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
            }),
        )
    }
}

/// Recent events endpoint, newest first.
///
/// A malformed, negative or oversized `window` is a 400, never a store call.
pub async fn recent_events(
    State(state): State<AppState>,
    query: Result<Query<EventsQuery>, QueryRejection>,
) -> Result<Json<Vec<EventView>>, (StatusCode, Json<ErrorResponse>)> {
    let Query(query) = query.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "recent_events_invalid_query");
        ErrorResponse::reply(StatusCode::BAD_REQUEST, "Invalid window")
    })?;

    let window = match query.window {
        Some(secs) if secs > MAX_WINDOW_SECS => {
            warn!(
                window_secs = secs,
                max_window_secs = MAX_WINDOW_SECS,
                "recent_events_window_too_large"
            );
            return Err(ErrorResponse::reply(StatusCode::BAD_REQUEST, "Invalid window"));
        }
        Some(secs) => Duration::from_secs(secs),
        None => state.config.recent_window,
    };

    let events = state.store.recent(window).await.map_err(|e| {
        error!(error = %e, window_secs = window.as_secs(), "recent_events_failed");
        ErrorResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch events")
    })?;

    Ok(Json(events.into_iter().map(EventView::from).collect()))
}
