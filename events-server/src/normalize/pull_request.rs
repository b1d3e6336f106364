//! Pull request event extraction.
//!
//! Only two transitions produce an event: `opened`, and `closed` with the
//! pull request merged. A pull request closed without merging is ignored
//! the same way as any other sub-action.

use serde_json::Value;
use tracing::info;

use super::payload::{bool_at, str_at, str_or, ExtractError};
use super::timestamp::parse_timestamp;
use super::UNKNOWN;
use crate::event::{EventAction, NormalizedEvent};

/// Extract a pull request event, or `None` for transitions that are not recorded.
pub fn extract_pull_request(payload: &Value) -> Result<Option<NormalizedEvent>, ExtractError> {
    let sub_action = str_or(payload, &["action"], "")?;

    let (action, timestamp_field) = match sub_action {
        "opened" => (EventAction::PullRequest, "created_at"),
        "closed" if bool_at(payload, &["pull_request", "merged"])? == Some(true) => {
            (EventAction::Merge, "merged_at")
        }
        _ => {
            info!(sub_action = %sub_action, "pull_request_sub_action_ignored");
            return Ok(None);
        }
    };

    let author = str_or(payload, &["pull_request", "user", "login"], UNKNOWN)?;
    let from_branch = str_or(payload, &["pull_request", "head", "ref"], UNKNOWN)?;
    let to_branch = str_or(payload, &["pull_request", "base", "ref"], UNKNOWN)?;
    let raw_timestamp = str_at(payload, &["pull_request", timestamp_field])?;

    info!(
        sub_action = %sub_action,
        action = %action,
        author = %author,
        from_branch = %from_branch,
        to_branch = %to_branch,
        has_timestamp = raw_timestamp.is_some(),
        "pull_request_extracted"
    );

    Ok(Some(NormalizedEvent {
        action,
        author: author.to_string(),
        from_branch: Some(from_branch.to_string()),
        to_branch: to_branch.to_string(),
        timestamp: parse_timestamp(raw_timestamp),
    }))
}
