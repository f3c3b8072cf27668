//! Retention-windowed store of recent events, used by the live scoring
//! boundary to hand the engine a meaningful batch instead of a singleton.
//! Lives outside the extractor; the extractor itself stays stateless.

use crate::config::HistoryConfig;
use crate::events::AuditEvent;
use chrono::Duration;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

pub struct EventHistory {
    retention: Duration,
    max_events: usize,
    recent: Mutex<VecDeque<AuditEvent>>,
}

impl EventHistory {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            retention: Duration::try_seconds(config.retention_secs).unwrap_or(Duration::MAX),
            max_events: config.max_events,
            recent: Mutex::new(VecDeque::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<AuditEvent>> {
        self.recent.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Append an event and evict anything older than the newest event minus retention.
    pub fn record(&self, event: AuditEvent) {
        let mut q = self.lock();
        self.push(&mut q, event);
    }

    /// Run `f` over the retained events followed by `event`, then record `event`.
    /// The lock is held throughout, so concurrent callers each see the others' events.
    pub fn with_event<T>(&self, event: AuditEvent, f: impl FnOnce(&[AuditEvent]) -> T) -> T {
        let mut q = self.lock();
        let mut batch: Vec<AuditEvent> = q.iter().cloned().collect();
        batch.push(event);
        let out = f(&batch);
        if let Some(event) = batch.pop() {
            self.push(&mut q, event);
        }
        out
    }

    fn push(&self, q: &mut VecDeque<AuditEvent>, event: AuditEvent) {
        q.push_back(event);
        if let Some(newest) = q.iter().map(|e| e.timestamp).max() {
            if let Some(cutoff) = newest.checked_sub_signed(self.retention) {
                q.retain(|e| e.timestamp >= cutoff);
            }
        }
        while q.len() > self.max_events {
            q.pop_front();
        }
    }

    /// Retained events in arrival order.
    pub fn snapshot(&self) -> Vec<AuditEvent> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
