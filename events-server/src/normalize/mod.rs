//! Webhook normalization.
//!
//! Maps a GitHub event type and raw JSON payload to at most one
//! [`NormalizedEvent`]. Pure and stateless; safe to call from any number of
//! request handlers at once.
//!
//! ## Flow
//!
//! ```text
//! (X-GitHub-Event, body) → normalize() → Some(NormalizedEvent) | None
//! ```

pub mod payload;
pub mod pull_request;
pub mod push;
pub mod timestamp;

use serde_json::Value;
use tracing::{error, info};

use crate::event::NormalizedEvent;

pub use payload::ExtractError;
pub use pull_request::extract_pull_request;
pub use push::extract_push;
pub use timestamp::{parse_timestamp, utc_now};

/// Placeholder for missing author and branch names.
pub const UNKNOWN: &str = "Unknown";

/// Normalize a webhook delivery.
///
/// Returns `None` for unsupported event types, unrecorded pull request
/// transitions, and payloads whose shape could not be read. None of these
/// are errors for the caller.
pub fn normalize(event_type: &str, payload: &Value) -> Option<NormalizedEvent> {
    let extracted = match event_type {
        "push" => extract_push(payload).map(Some),
        "pull_request" => extract_pull_request(payload),
        _ => {
            info!(event_type = %event_type, "event_type_ignored");
            return None;
        }
    };

    match extracted {
        Ok(event) => event,
        Err(e) => {
            error!(event_type = %event_type, error = %e, "payload_extraction_failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventAction;
    use chrono::NaiveDateTime;
    use serde_json::json;

    fn naive(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_unsupported_event_types_ignored() {
        let payload = json!({"ref": "refs/heads/main", "action": "opened"});
        for event_type in ["issues", "ping", "release", "unknown", "", "PUSH"] {
            assert_eq!(normalize(event_type, &payload), None, "{event_type}");
        }
    }

    #[test]
    fn test_push_end_to_end() {
        let payload = json!({
            "ref": "refs/heads/main",
            "head_commit": {
                "author": {"name": "alice"},
                "timestamp": "2024-03-01T12:00:00Z"
            }
        });

        let event = normalize("push", &payload).unwrap();

        assert_eq!(
            event,
            NormalizedEvent {
                action: EventAction::Push,
                author: "alice".to_string(),
                from_branch: None,
                to_branch: "main".to_string(),
                timestamp: naive("2024-03-01T12:00:00"),
            }
        );
    }

    #[test]
    fn test_merge_end_to_end() {
        let payload = json!({
            "action": "closed",
            "pull_request": {
                "merged": true,
                "user": {"login": "bob"},
                "head": {"ref": "feature"},
                "base": {"ref": "main"},
                "merged_at": "2024-03-02T09:00:00+02:00"
            }
        });

        let event = normalize("pull_request", &payload).unwrap();

        assert_eq!(
            event,
            NormalizedEvent {
                action: EventAction::Merge,
                author: "bob".to_string(),
                from_branch: Some("feature".to_string()),
                to_branch: "main".to_string(),
                timestamp: naive("2024-03-02T07:00:00"),
            }
        );
    }

    #[test]
    fn test_pull_request_opened() {
        let payload = json!({"action": "opened", "pull_request": {"user": {"login": "dave"}}});
        let event = normalize("pull_request", &payload).unwrap();
        assert_eq!(event.action, EventAction::PullRequest);
    }

    #[test]
    fn test_closed_without_merge_ignored() {
        let payload = json!({"action": "closed", "pull_request": {"merged": false}});
        assert_eq!(normalize("pull_request", &payload), None);
    }

    #[test]
    fn test_push_never_has_source_branch() {
        let payloads = [
            json!({}),
            json!({"ref": "refs/heads/dev"}),
            json!({"ref": "refs/heads/dev", "head": {"ref": "other"}}),
        ];
        for payload in payloads {
            let event = normalize("push", &payload).unwrap();
            assert_eq!(event.action, EventAction::Push);
            assert_eq!(event.from_branch, None);
        }
    }

    #[test]
    fn test_extraction_fault_ignored() {
        assert_eq!(normalize("push", &json!({"head_commit": 5})), None);
        assert_eq!(normalize("push", &json!(["not", "an", "object"])), None);
        assert_eq!(
            normalize("pull_request", &json!({"action": "closed", "pull_request": {"merged": "true"}})),
            None
        );
    }

    #[test]
    fn test_bad_timestamp_falls_back_to_now() {
        let payload = json!({"ref": "refs/heads/main", "head_commit": {"timestamp": "yesterday"}});
        let event = normalize("push", &payload).unwrap();

        let drift = (utc_now() - event.timestamp).num_seconds().abs();
        assert!(drift <= 1);
    }
}
