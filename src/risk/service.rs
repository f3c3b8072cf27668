//! Live scoring boundary: one raw event in, risk score (and optionally attributions) out.
//!
//! Without history each event is scored as a batch of one, so
//! `failed_logins_last_1h`, `ip_event_count` and `user_event_rate` degenerate
//! to `0`, `1` and `1/15`. With an [`EventHistory`] the batch is the retained
//! history plus the event, scored event last.

use super::engine::{ExplainResult, RiskResult};
use crate::error::{EngineError, Result};
use crate::events::{EventNormalizer, RawEvent};
use crate::explain::Explainer;
use crate::features::{FeatureExtractor, FeatureTable, FeatureVector};
use crate::history::EventHistory;
use crate::model::RiskModel;
use std::sync::Arc;
use tracing::{debug, info, info_span};
use uuid::Uuid;

pub struct RiskService {
    extractor: FeatureExtractor,
    model: Arc<dyn RiskModel>,
    explainer: Arc<dyn Explainer>,
    history: Option<EventHistory>,
}

impl RiskService {
    pub fn new(
        extractor: FeatureExtractor,
        model: Arc<dyn RiskModel>,
        explainer: Arc<dyn Explainer>,
    ) -> Self {
        Self {
            extractor,
            model,
            explainer,
            history: None,
        }
    }

    pub fn with_history(mut self, history: EventHistory) -> Self {
        self.history = Some(history);
        self
    }

    pub fn history(&self) -> Option<&EventHistory> {
        self.history.as_ref()
    }

    /// Features for one event, in the context of retained history if any.
    /// With history, reading the context and recording the event happen under
    /// one lock, so concurrent callers are serialised.
    pub fn features_for(&self, raw: &RawEvent) -> Result<FeatureVector> {
        let event = EventNormalizer::normalize(0, raw)?;
        let table = match &self.history {
            Some(h) => h.with_event(event, |batch| self.extractor.extract_events(batch)),
            None => self.extractor.extract_events(std::slice::from_ref(&event)),
        };
        table
            .last()
            .copied()
            .ok_or_else(|| EngineError::validation(0, "empty batch"))
    }

    pub fn score(&self, raw: &RawEvent) -> Result<RiskResult> {
        let request_id = Uuid::new_v4();
        let _span = info_span!("score", %request_id).entered();

        let features = self.features_for(raw)?;
        let result = RiskResult::from_score(self.model.predict(&features)?);
        log_result(raw, &result);
        Ok(result)
    }

    pub fn explain(&self, raw: &RawEvent) -> Result<ExplainResult> {
        let request_id = Uuid::new_v4();
        let _span = info_span!("explain", %request_id).entered();

        let features = self.features_for(raw)?;
        let risk_score = self.model.predict(&features)?;
        let explanations = self.explainer.explain(&features, self.model.as_ref())?;
        debug!(risk_score, "explained");
        Ok(ExplainResult {
            risk_score,
            explanations,
        })
    }

    /// Extract the whole batch and score every row. History is not consulted.
    pub fn score_batch(&self, records: &[RawEvent]) -> Result<(FeatureTable, Vec<RiskResult>)> {
        let table = self.extractor.extract(records)?;
        let results = self
            .model
            .predict_batch(&table)?
            .into_iter()
            .map(RiskResult::from_score)
            .collect();
        Ok((table, results))
    }
}

fn log_result(raw: &RawEvent, result: &RiskResult) {
    let user = raw.user.as_deref().unwrap_or_default();
    if result.classification == super::Classification::Anomaly {
        info!(user, score = result.risk_score, "anomalous event");
    } else {
        debug!(user, score = result.risk_score, "event scored");
    }
}
