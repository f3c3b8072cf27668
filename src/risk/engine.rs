//! Turns a model probability into the fixed two-way classification.

use crate::explain::Attributions;
use serde::Serialize;

/// Probabilities strictly above this are anomalies. Not configurable.
pub const ANOMALY_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Classification {
    Anomaly,
    Normal,
}

impl Classification {
    pub fn from_score(score: f32) -> Self {
        if score > ANOMALY_THRESHOLD {
            Classification::Anomaly
        } else {
            Classification::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Anomaly => "Anomaly",
            Classification::Normal => "Normal",
        }
    }
}

/// `{risk_score, classification}` for one event
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskResult {
    pub risk_score: f32,
    pub classification: Classification,
}

impl RiskResult {
    pub fn from_score(risk_score: f32) -> Self {
        Self {
            risk_score,
            classification: Classification::from_score(risk_score),
        }
    }
}

/// `{risk_score, explanations}` for one event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainResult {
    pub risk_score: f32,
    pub explanations: Attributions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_strict() {
        assert_eq!(Classification::from_score(0.3), Classification::Normal);
        assert_eq!(Classification::from_score(0.5), Classification::Normal);
        assert_eq!(Classification::from_score(0.51), Classification::Anomaly);
    }

    #[test]
    fn result_json_shape() {
        let json = serde_json::to_value(RiskResult::from_score(0.9)).unwrap();
        assert_eq!(json["classification"], "Anomaly");
        assert!((json["risk_score"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }
}
