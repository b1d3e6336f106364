//! Push event extraction.

use serde_json::Value;
use tracing::info;

use super::payload::{str_at, str_or, ExtractError};
use super::timestamp::parse_timestamp;
use super::UNKNOWN;
use crate::event::{EventAction, NormalizedEvent};

const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Extract a push event. Push deliveries have no source branch.
pub fn extract_push(payload: &Value) -> Result<NormalizedEvent, ExtractError> {
    let author = str_or(payload, &["head_commit", "author", "name"], UNKNOWN)?;
    let git_ref = str_or(payload, &["ref"], "")?;
    let to_branch = git_ref.strip_prefix(BRANCH_REF_PREFIX).unwrap_or(git_ref);
    let raw_timestamp = str_at(payload, &["head_commit", "timestamp"])?;

    info!(
        author = %author,
        to_branch = %to_branch,
        has_timestamp = raw_timestamp.is_some(),
        "push_extracted"
    );

    Ok(NormalizedEvent {
        action: EventAction::Push,
        author: author.to_string(),
        from_branch: None,
        to_branch: to_branch.to_string(),
        timestamp: parse_timestamp(raw_timestamp),
    })
}
