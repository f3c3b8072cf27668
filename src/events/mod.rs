//! Audit event types: raw records as received and the canonical parsed form.

mod normalize;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

pub use normalize::{normalize_batch, parse_timestamp, EventNormalizer};

pub const LOGIN_SUCCESS: &str = "login_success";
pub const LOGIN_FAILURE: &str = "login_failure";
pub const FILE_ACCESS: &str = "file_access";
pub const PRIVILEGE_ESCALATION: &str = "privilege_escalation";
pub const CONFIG_CHANGE: &str = "config_change";

/// Event types flagged by `is_privileged_event`.
pub const PRIVILEGED_EVENT_TYPES: [&str; 2] = [PRIVILEGE_ESCALATION, CONFIG_CHANGE];

/// Raw audit record: field name to value, exactly as supplied by the caller.
/// Unknown fields are kept in `extra` and ignored by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RawEvent {
    pub fn new(
        timestamp: impl Into<String>,
        user: impl Into<String>,
        ip_address: impl Into<String>,
        event_type: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Some(timestamp.into()),
            user: Some(user.into()),
            ip_address: Some(ip_address.into()),
            event_type: Some(event_type.into()),
            resource: Some(resource.into()),
            extra: serde_json::Map::new(),
        }
    }
}

/// Canonical audit event. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Keeps the written offset; naive input is +00:00. Compares as an instant.
    pub timestamp: DateTime<FixedOffset>,
    pub user: String,
    pub ip_address: String,
    pub event_type: String,
    pub resource: String,
}

impl AuditEvent {
    pub fn is_login_failure(&self) -> bool {
        self.event_type == LOGIN_FAILURE
    }

    pub fn is_privileged(&self) -> bool {
        PRIVILEGED_EVENT_TYPES.contains(&self.event_type.as_str())
    }
}
