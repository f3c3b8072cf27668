//! Per-feature attribution for a single prediction.
//!
//! [`Explainer`] is the seam for any attribution method. [`AblationExplainer`]
//! is a model-agnostic implementation: the attribution of feature `i` is
//! `f(x) - f(x')` where `x'` equals `x` with feature `i` replaced by a baseline.

use crate::error::Result;
use crate::features::{FeatureTable, FeatureVector, FEATURE_DIM, FEATURE_NAMES};
use crate::model::RiskModel;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Attribution values in feature order, serialized as `{feature_name: value}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Attributions(Vec<(&'static str, f32)>);

impl Attributions {
    pub fn new(values: [f32; FEATURE_DIM]) -> Self {
        Self(FEATURE_NAMES.into_iter().zip(values).collect())
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.0.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, f32)> {
        self.0.iter()
    }
}

impl Serialize for Attributions {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

pub trait Explainer: Send + Sync {
    fn explain(&self, features: &FeatureVector, model: &dyn RiskModel) -> Result<Attributions>;
}

pub struct AblationExplainer {
    baseline: [f32; FEATURE_DIM],
}

impl Default for AblationExplainer {
    fn default() -> Self {
        Self {
            baseline: [0.0; FEATURE_DIM],
        }
    }
}

impl AblationExplainer {
    pub fn with_baseline(baseline: &FeatureVector) -> Self {
        Self {
            baseline: baseline.to_array(),
        }
    }

    /// Column means of a background table; zeros if the table is empty.
    pub fn from_background(table: &FeatureTable) -> Self {
        let mut baseline = [0.0f32; FEATURE_DIM];
        if table.is_empty() {
            return Self { baseline };
        }
        for row in table.rows() {
            for (acc, v) in baseline.iter_mut().zip(row.to_array()) {
                *acc += v;
            }
        }
        let n = table.len() as f32;
        baseline.iter_mut().for_each(|v| *v /= n);
        Self { baseline }
    }
}

impl Explainer for AblationExplainer {
    fn explain(&self, features: &FeatureVector, model: &dyn RiskModel) -> Result<Attributions> {
        let full = model.predict(features)?;
        let x = features.to_array();
        let mut out = [0.0f32; FEATURE_DIM];
        for i in 0..FEATURE_DIM {
            if x[i] == self.baseline[i] {
                continue;
            }
            let mut ablated = x;
            ablated[i] = self.baseline[i];
            out[i] = full - model.predict(&FeatureVector::from_array(ablated))?;
        }
        Ok(Attributions::new(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    /// score = 0.1 * failed_logins + 0.05 * is_weekend
    struct Linear;

    impl RiskModel for Linear {
        fn predict(&self, f: &FeatureVector) -> Result<f32> {
            Ok(0.1 * f.failed_logins_last_1h as f32 + 0.05 * f.is_weekend as f32)
        }
    }

    struct Broken;

    impl RiskModel for Broken {
        fn predict(&self, _: &FeatureVector) -> Result<f32> {
            Err(EngineError::upstream("boom"))
        }
    }

    fn vector() -> FeatureVector {
        FeatureVector {
            event_hour: 3,
            event_type_code: 1,
            resource_depth: 2,
            is_privileged_event: 0,
            is_weekend: 1,
            failed_logins_last_1h: 4,
            ip_event_count: 1,
            user_event_rate: 1.0 / 15.0,
        }
    }

    #[test]
    fn linear_model_attributions_match_weights() {
        let a = AblationExplainer::default().explain(&vector(), &Linear).unwrap();
        assert!((a.get("failed_logins_last_1h").unwrap() - 0.4).abs() < 1e-5);
        assert!((a.get("is_weekend").unwrap() - 0.05).abs() < 1e-5);
        assert_eq!(a.get("event_hour"), Some(0.0));
        assert_eq!(a.iter().count(), FEATURE_DIM);
    }

    #[test]
    fn serializes_as_named_map() {
        let a = AblationExplainer::default().explain(&vector(), &Linear).unwrap();
        let json = serde_json::to_value(&a).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), FEATURE_DIM);
        assert!(obj.contains_key("user_event_rate"));
    }

    #[test]
    fn background_baseline_is_column_mean() {
        let mut other = vector();
        other.failed_logins_last_1h = 2;
        let explainer = AblationExplainer::from_background(&FeatureTable::new(vec![vector(), other]));
        let a = explainer.explain(&vector(), &Linear).unwrap();
        // baseline failed_logins = 3, so attribution = 0.1 * (4 - 3)
        assert!((a.get("failed_logins_last_1h").unwrap() - 0.1).abs() < 1e-5);
    }

    #[test]
    fn model_failure_propagates() {
        let err = AblationExplainer::default().explain(&vector(), &Broken).unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
