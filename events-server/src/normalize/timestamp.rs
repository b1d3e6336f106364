//! Timestamp normalization.
//!
//! Upstream payloads mix offset-aware strings (`2024-01-15T10:30:00-07:00`,
//! `2024-03-01T12:00:00Z`) with offset-naive ones. Everything is converted to
//! a UTC instant without an attached offset at ingestion time, so stored
//! values and recency windows compare uniformly.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, ParseError, Utc};
use tracing::warn;

/// Offset-aware layouts tried after RFC 3339 and RFC 2822.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];

/// Offset-naive layouts. Clock values are taken as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Current time as a UTC instant with no offset.
pub fn utc_now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Normalize a raw payload timestamp to a UTC instant with no offset.
///
/// Never fails: an absent, empty or unparseable value yields the current
/// UTC time, and parse failures are logged.
pub fn parse_timestamp(raw: Option<&str>) -> NaiveDateTime {
    let raw = match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return utc_now(),
    };

    match parse_flexible(raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(raw_timestamp = %raw, error = %e, "timestamp_parse_failed");
            utc_now()
        }
    }
}

/// Try every known layout. On failure the RFC 3339 error is returned, as it
/// describes the format GitHub sends.
fn parse_flexible(raw: &str) -> Result<NaiveDateTime, ParseError> {
    let rfc3339_err = match parse_with_offset(raw) {
        Ok(aware) => return Ok(aware.naive_utc()),
        Err(e) => e,
    };

    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Ok(naive);
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| rfc3339_err)
}

fn parse_with_offset(raw: &str) -> Result<DateTime<FixedOffset>, ParseError> {
    DateTime::parse_from_rfc3339(raw).or_else(|rfc3339_err| {
        DateTime::parse_from_rfc2822(raw)
            .ok()
            .or_else(|| {
                OFFSET_FORMATS
                    .iter()
                    .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
            })
            .ok_or(rfc3339_err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_near_now(value: NaiveDateTime) {
        let drift = (utc_now() - value).num_milliseconds().abs();
        assert!(drift < 1000, "expected a value near now, drift was {drift}ms");
    }

    fn naive(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_absent_is_now() {
        assert_near_now(parse_timestamp(None));
    }

    #[test]
    fn test_empty_is_now() {
        assert_near_now(parse_timestamp(Some("")));
        assert_near_now(parse_timestamp(Some("   ")));
    }

    #[test]
    fn test_garbage_is_now() {
        assert_near_now(parse_timestamp(Some("not-a-date")));
        assert_near_now(parse_timestamp(Some("2024-13-45T99:00:00")));
    }

    #[test]
    fn test_commit_offset_converted_to_utc() {
        assert_eq!(
            parse_timestamp(Some("2024-01-15T10:30:00-07:00")),
            naive("2024-01-15T17:30:00")
        );
    }

    #[test]
    fn test_zulu_suffix() {
        assert_eq!(
            parse_timestamp(Some("2024-03-01T12:00:00Z")),
            naive("2024-03-01T12:00:00")
        );
    }

    #[test]
    fn test_positive_offset_crosses_midnight() {
        assert_eq!(
            parse_timestamp(Some("2024-03-02T01:00:00+02:00")),
            naive("2024-03-01T23:00:00")
        );
    }

    #[test]
    fn test_naive_taken_as_utc() {
        assert_eq!(
            parse_timestamp(Some("2024-01-15T10:30:00")),
            naive("2024-01-15T10:30:00")
        );
        assert_eq!(
            parse_timestamp(Some("2024-01-15 10:30:00")),
            naive("2024-01-15T10:30:00")
        );
    }

    #[test]
    fn test_compact_offset_and_fraction() {
        assert_eq!(
            parse_timestamp(Some("2024-01-15T10:30:00.000+0100")),
            naive("2024-01-15T09:30:00")
        );
    }

    #[test]
    fn test_rfc2822() {
        assert_eq!(
            parse_timestamp(Some("Mon, 15 Jan 2024 10:30:00 +0000")),
            naive("2024-01-15T10:30:00")
        );
    }

    #[test]
    fn test_unparseable_reports_error() {
        let err = parse_flexible("not-a-date").unwrap_err();
        assert!(!err.to_string().is_empty());

        assert!(parse_flexible("2024-01-15T25:00:00").is_err());
    }

    #[test]
    fn test_date_only() {
        assert_eq!(parse_timestamp(Some("2024-01-15")), naive("2024-01-15T00:00:00"));
    }
}
