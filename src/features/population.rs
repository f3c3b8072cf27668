//! Batch-relative frequency statistics. Not time-windowed: every row of the
//! supplied batch counts.

use crate::events::AuditEvent;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PopulationFeatures {
    /// Rows sharing this row's IP, itself included
    pub ip_event_count: u32,
    /// Rows sharing this row's user, divided by the observation span in days
    pub user_event_rate: f64,
}

/// `observation_days` is an assumed span; callers should supply batches
/// covering roughly that much time for the rate to be comparable.
pub fn aggregate(events: &[AuditEvent], observation_days: f64) -> Vec<PopulationFeatures> {
    let mut ip_counts: HashMap<&str, u32> = HashMap::new();
    let mut user_counts: HashMap<&str, u32> = HashMap::new();
    for e in events {
        *ip_counts.entry(e.ip_address.as_str()).or_insert(0) += 1;
        *user_counts.entry(e.user.as_str()).or_insert(0) += 1;
    }

    events
        .iter()
        .map(|e| PopulationFeatures {
            ip_event_count: ip_counts[e.ip_address.as_str()],
            user_event_rate: user_counts[e.user.as_str()] as f64 / observation_days,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{normalize_batch, RawEvent};

    #[test]
    fn counts_cover_whole_batch() {
        let raw = vec![
            RawEvent::new("2025-07-01T10:00:00", "a", "X", "login_success", "/"),
            RawEvent::new("2025-07-14T10:00:00", "b", "X", "login_success", "/"),
            RawEvent::new("2025-07-02T10:00:00", "a", "Y", "file_access", "/"),
            RawEvent::new("2025-07-09T10:00:00", "a", "X", "login_failure", "/"),
        ];
        let stats = aggregate(&normalize_batch(&raw).unwrap(), 15.0);
        let ips: Vec<u32> = stats.iter().map(|s| s.ip_event_count).collect();
        assert_eq!(ips, vec![3, 3, 1, 3]);
        assert!((stats[0].user_event_rate - 3.0 / 15.0).abs() < 1e-12);
        assert!((stats[1].user_event_rate - 1.0 / 15.0).abs() < 1e-12);
    }

    #[test]
    fn empty_batch() {
        assert!(aggregate(&[], 15.0).is_empty());
    }
}
