//! Feature extraction pipeline: raw records → normalized batch → stages → feature table.

use super::{population, temporal, FailureWindowCounter, FeatureTable, FeatureVector};
use super::{PopulationFeatures, TemporalFeatures};
use crate::config::FeaturesConfig;
use crate::error::Result;
use crate::events::{normalize_batch, AuditEvent, RawEvent};
use std::collections::HashSet;
use tracing::{debug, warn, Level};

/// Stateless extractor; safe to share across threads. Each call depends only on its batch.
pub struct FeatureExtractor {
    config: FeaturesConfig,
    failures: FailureWindowCounter,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self {
            config: FeaturesConfig::default(),
            failures: FailureWindowCounter::default(),
        }
    }
}

impl FeatureExtractor {
    pub fn new(config: FeaturesConfig) -> Result<Self> {
        config.validate()?;
        let failures = FailureWindowCounter::from_secs(config.failure_window_secs);
        Ok(Self { config, failures })
    }

    pub fn config(&self) -> &FeaturesConfig {
        &self.config
    }

    /// Validate and extract. Any unparseable record fails the whole batch.
    pub fn extract(&self, records: &[RawEvent]) -> Result<FeatureTable> {
        let events = normalize_batch(records).inspect_err(|e| {
            warn!(rows = records.len(), error = %e, "batch rejected");
        })?;
        Ok(self.extract_events(&events))
    }

    /// Extract from an already normalized batch. Total: never fails.
    pub fn extract_events(&self, events: &[AuditEvent]) -> FeatureTable {
        let temporal = temporal::derive(events, self.config.event_type_vocabulary.as_deref());
        let failures = self.failures.count(events);
        let population = population::aggregate(events, self.config.observation_days);

        if tracing::enabled!(Level::DEBUG) {
            debug!(
                rows = events.len(),
                failure_rows = events.iter().filter(|e| e.is_login_failure()).count(),
                users = events.iter().map(|e| e.user.as_str()).collect::<HashSet<_>>().len(),
                ips = events.iter().map(|e| e.ip_address.as_str()).collect::<HashSet<_>>().len(),
                "features extracted"
            );
        }

        assemble(&temporal, &failures, &population)
    }
}

/// Join stage outputs by row position.
fn assemble(
    temporal: &[TemporalFeatures],
    failures: &[u32],
    population: &[PopulationFeatures],
) -> FeatureTable {
    debug_assert_eq!(temporal.len(), failures.len());
    debug_assert_eq!(temporal.len(), population.len());
    let rows = temporal
        .iter()
        .zip(failures)
        .zip(population)
        .map(|((t, &failed), p)| FeatureVector {
            event_hour: t.event_hour,
            event_type_code: t.event_type_code,
            resource_depth: t.resource_depth,
            is_privileged_event: t.is_privileged_event,
            is_weekend: t.is_weekend,
            failed_logins_last_1h: failed,
            ip_event_count: p.ip_event_count,
            user_event_rate: p.user_event_rate,
        })
        .collect();
    FeatureTable::new(rows)
}
