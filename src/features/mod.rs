//! Per-event feature extraction from a batch of audit events.
//!
//! Stages (each keyed by input row position):
//! - [`temporal`] — hour, weekday, resource depth, categorical codes
//! - [`window`] — trailing-window login failure counter per user
//! - [`population`] — batch-relative IP and user frequencies
//! - [`pipeline`] — normalizes, runs the stages, assembles [`FeatureVector`]s

pub mod pipeline;
pub mod population;
pub mod temporal;
pub mod window;

pub use pipeline::FeatureExtractor;
pub use population::PopulationFeatures;
pub use temporal::TemporalFeatures;
pub use window::FailureWindowCounter;

use serde::{Deserialize, Serialize};

/// Number of features the risk model consumes.
pub const FEATURE_DIM: usize = 8;

/// Feature names in model input order.
pub const FEATURE_NAMES: [&str; FEATURE_DIM] = [
    "event_hour",
    "event_type_code",
    "resource_depth",
    "is_privileged_event",
    "is_weekend",
    "failed_logins_last_1h",
    "ip_event_count",
    "user_event_rate",
];

/// Fixed 8-field summary of one event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub event_hour: u32,
    /// Batch-local unless a fixed vocabulary is configured; never compare across batches
    pub event_type_code: u32,
    pub resource_depth: u32,
    pub is_privileged_event: u8,
    pub is_weekend: u8,
    pub failed_logins_last_1h: u32,
    pub ip_event_count: u32,
    pub user_event_rate: f64,
}

impl FeatureVector {
    /// Model input in [`FEATURE_NAMES`] order.
    pub fn to_array(&self) -> [f32; FEATURE_DIM] {
        [
            self.event_hour as f32,
            self.event_type_code as f32,
            self.resource_depth as f32,
            self.is_privileged_event as f32,
            self.is_weekend as f32,
            self.failed_logins_last_1h as f32,
            self.ip_event_count as f32,
            self.user_event_rate as f32,
        ]
    }

    /// Inverse of [`to_array`](Self::to_array); integer fields are truncated and floored at 0.
    pub fn from_array(v: [f32; FEATURE_DIM]) -> Self {
        let int = |x: f32| x.max(0.0) as u32;
        Self {
            event_hour: int(v[0]),
            event_type_code: int(v[1]),
            resource_depth: int(v[2]),
            is_privileged_event: (v[3] > 0.0) as u8,
            is_weekend: (v[4] > 0.0) as u8,
            failed_logins_last_1h: int(v[5]),
            ip_event_count: int(v[6]),
            user_event_rate: v[7].max(0.0) as f64,
        }
    }

    pub fn named(&self) -> impl Iterator<Item = (&'static str, f32)> {
        FEATURE_NAMES.into_iter().zip(self.to_array())
    }
}

/// One [`FeatureVector`] per input event, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureTable {
    rows: Vec<FeatureVector>,
}

impl FeatureTable {
    pub fn new(rows: Vec<FeatureVector>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn get(&self, row: usize) -> Option<&FeatureVector> {
        self.rows.get(row)
    }

    pub fn last(&self) -> Option<&FeatureVector> {
        self.rows.last()
    }

    /// Extract one column by feature name.
    pub fn column(&self, name: &str) -> Option<Vec<f32>> {
        let idx = FEATURE_NAMES.iter().position(|n| *n == name)?;
        Some(self.rows.iter().map(|r| r.to_array()[idx]).collect())
    }

    pub fn into_rows(self) -> Vec<FeatureVector> {
        self.rows
    }
}
