//! Trailing-window login failure counter.
//!
//! For each `login_failure` event at time `t`, counts the same user's other
//! `login_failure` events in `[t - window, t)`. The lower bound is inclusive;
//! the upper bound is exclusive, so events sharing `t` never count each other.
//! Every other event type gets 0.
//!
//! Counts are re-attached by row position, so duplicate `(timestamp, user)`
//! pairs cannot fan out into extra rows.

use crate::events::AuditEvent;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

pub struct FailureWindowCounter {
    window: Duration,
}

impl Default for FailureWindowCounter {
    fn default() -> Self {
        Self::new(Duration::hours(1))
    }
}

impl FailureWindowCounter {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Out-of-range values saturate to the largest representable window.
    pub fn from_secs(secs: i64) -> Self {
        Self::new(Duration::try_seconds(secs).unwrap_or(Duration::MAX))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// One count per input row.
    pub fn count(&self, events: &[AuditEvent]) -> Vec<u32> {
        let mut counts = vec![0u32; events.len()];

        // user -> (instant, row) of that user's failures
        let mut groups: HashMap<&str, Vec<(DateTime<Utc>, usize)>> = HashMap::new();
        for (row, e) in events.iter().enumerate() {
            if e.is_login_failure() {
                groups.entry(e.user.as_str()).or_default().push((e.timestamp.with_timezone(&Utc), row));
            }
        }

        for group in groups.values_mut() {
            group.sort_by_key(|(ts, _)| *ts);
            let times: Vec<DateTime<Utc>> = group.iter().map(|(ts, _)| *ts).collect();
            for &(t, row) in group.iter() {
                let start = t.checked_sub_signed(self.window).unwrap_or(DateTime::<Utc>::MIN_UTC);
                let lo = times.partition_point(|x| *x < start);
                let hi = times.partition_point(|x| *x < t);
                counts[row] = (hi - lo) as u32;
            }
        }
        counts
    }
}
