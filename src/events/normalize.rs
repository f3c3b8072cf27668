//! Event normalizer: raw records → `AuditEvent`, all-or-nothing per batch.

use super::{AuditEvent, RawEvent};
use crate::error::{EngineError, Result, TIMESTAMP_FORMAT_HINT};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO 8601 timestamp. A written offset is kept so hour and weekday
/// stay as written; naive values are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

pub struct EventNormalizer;

impl EventNormalizer {
    /// Parse one record. `row` is only used to label the error.
    pub fn normalize(row: usize, raw: &RawEvent) -> Result<AuditEvent> {
        let ts_text = raw
            .timestamp
            .as_deref()
            .ok_or_else(|| EngineError::validation(row, format!("missing timestamp. {}", TIMESTAMP_FORMAT_HINT)))?;
        let timestamp = parse_timestamp(ts_text)
            .ok_or_else(|| EngineError::validation(row, TIMESTAMP_FORMAT_HINT))?;

        let user = match raw.user.as_deref() {
            Some(u) if !u.is_empty() => u.to_string(),
            _ => return Err(EngineError::validation(row, "missing or empty user")),
        };

        Ok(AuditEvent {
            timestamp,
            user,
            ip_address: raw.ip_address.clone().unwrap_or_default(),
            event_type: raw.event_type.clone().unwrap_or_default(),
            resource: raw.resource.clone().unwrap_or_default(),
        })
    }
}

/// Normalize a whole batch, preserving order. One bad record fails the batch.
pub fn normalize_batch(records: &[RawEvent]) -> Result<Vec<AuditEvent>> {
    records
        .iter()
        .enumerate()
        .map(|(row, raw)| EventNormalizer::normalize(row, raw))
        .collect()
}
