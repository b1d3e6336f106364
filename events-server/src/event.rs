//! Canonical event records.
//!
//! Every accepted webhook delivery becomes exactly one [`NormalizedEvent`],
//! regardless of which GitHub event type produced it. The store hands them
//! back as [`StoredEvent`]s carrying the storage-assigned [`StorageId`].

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Display format for event timestamps, e.g. `01 March 2024 - 12:00 PM UTC`.
const DISPLAY_TIMESTAMP_FORMAT: &str = "%d %B %Y - %I:%M %p UTC";

/// Normalized classification of a webhook delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum EventAction {
    Push,
    PullRequest,
    Merge,
}

impl EventAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventAction::Push => "push",
            EventAction::PullRequest => "pull_request",
            EventAction::Merge => "merge",
        }
    }
}

impl fmt::Display for EventAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A storage-ready event derived from a raw webhook payload.
///
/// `timestamp` is always UTC with no offset attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NormalizedEvent {
    pub action: EventAction,
    pub author: String,
    pub from_branch: Option<String>,
    pub to_branch: String,
    pub timestamp: NaiveDateTime,
}

impl NormalizedEvent {
    /// Human-readable summary used by the events listing.
    pub fn message(&self) -> String {
        let when = self.timestamp.format(DISPLAY_TIMESTAMP_FORMAT);
        let from = self.from_branch.as_deref().unwrap_or("Unknown");

        match self.action {
            EventAction::Push => {
                format!("\"{}\" pushed to \"{}\" on {}", self.author, self.to_branch, when)
            }
            EventAction::PullRequest => format!(
                "\"{}\" submitted a pull request from \"{}\" to \"{}\" on {}",
                self.author, from, self.to_branch, when
            ),
            EventAction::Merge => format!(
                "\"{}\" merged branch \"{}\" to \"{}\" on {}",
                self.author, from, self.to_branch, when
            ),
        }
    }
}

/// Opaque identifier assigned by the backing store on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageId(pub i64);

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An event as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEvent {
    pub id: StorageId,
    pub event: NormalizedEvent,
}

/// Transport shape for the events listing: the stored record with its
/// identifier stringified and the display message attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventView {
    pub id: String,
    pub action: EventAction,
    pub author: String,
    pub from_branch: Option<String>,
    pub to_branch: String,
    pub timestamp: NaiveDateTime,
    pub message: String,
}

impl From<StoredEvent> for EventView {
    fn from(stored: StoredEvent) -> Self {
        let message = stored.event.message();
        let NormalizedEvent {
            action,
            author,
            from_branch,
            to_branch,
            timestamp,
        } = stored.event;

        Self {
            id: stored.id.to_string(),
            action,
            author,
            from_branch,
            to_branch,
            timestamp,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_push_message() {
        let event = NormalizedEvent {
            action: EventAction::Push,
            author: "alice".to_string(),
            from_branch: None,
            to_branch: "main".to_string(),
            timestamp: at(2024, 3, 1, 12, 0),
        };

        assert_eq!(
            event.message(),
            "\"alice\" pushed to \"main\" on 01 March 2024 - 12:00 PM UTC"
        );
    }

    #[test]
    fn test_pull_request_message() {
        let event = NormalizedEvent {
            action: EventAction::PullRequest,
            author: "bob".to_string(),
            from_branch: Some("feature".to_string()),
            to_branch: "main".to_string(),
            timestamp: at(2024, 1, 15, 17, 30),
        };

        assert_eq!(
            event.message(),
            "\"bob\" submitted a pull request from \"feature\" to \"main\" on 15 January 2024 - 05:30 PM UTC"
        );
    }

    #[test]
    fn test_merge_message() {
        let event = NormalizedEvent {
            action: EventAction::Merge,
            author: "bob".to_string(),
            from_branch: Some("feature".to_string()),
            to_branch: "main".to_string(),
            timestamp: at(2024, 3, 2, 7, 0),
        };

        assert_eq!(
            event.message(),
            "\"bob\" merged branch \"feature\" to \"main\" on 02 March 2024 - 07:00 AM UTC"
        );
    }

    #[test]
    fn test_action_serialization() {
        assert_eq!(
            serde_json::to_string(&EventAction::PullRequest).unwrap(),
            "\"pull_request\""
        );
        assert_eq!(EventAction::Merge.to_string(), "merge");
    }

    #[test]
    fn test_event_view_stringifies_id() {
        let stored = StoredEvent {
            id: StorageId(42),
            event: NormalizedEvent {
                action: EventAction::Push,
                author: "alice".to_string(),
                from_branch: None,
                to_branch: "main".to_string(),
                timestamp: at(2024, 3, 1, 12, 0),
            },
        };

        let view = EventView::from(stored);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["id"], "42");
        assert_eq!(json["action"], "push");
        assert_eq!(json["from_branch"], serde_json::Value::Null);
        assert_eq!(json["timestamp"], "2024-03-01T12:00:00");
    }
}
