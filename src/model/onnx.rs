//! ONNX Runtime inference for risk probability. Input: [n, 8] f32 in feature order.
//! Uses `ort`; if the model file is missing, loading succeeds but every prediction fails.

use super::RiskModel;
use crate::error::{EngineError, Result};
use crate::features::{FeatureTable, FeatureVector, FEATURE_DIM};
use ndarray::{Array2, CowArray};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct OnnxDetector {
    session: Option<ort::Session>,
    _env: Option<Arc<ort::Environment>>,
    path: PathBuf,
}

impl OnnxDetector {
    /// Load model from path. A missing file is not an error until `predict` is called.
    pub fn load(path: &Path) -> Result<Self> {
        let path = path.to_path_buf();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "ONNX model not found; scoring disabled");
            return Ok(Self {
                session: None,
                _env: None,
                path,
            });
        }

        let env = ort::Environment::builder()
            .with_name("audit-risk")
            .build()?
            .into_arc();
        let session = ort::SessionBuilder::new(&env)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level1)?
            .with_model_from_file(&path)?;
        tracing::info!(path = %path.display(), "ONNX model loaded");

        Ok(Self {
            session: Some(session),
            _env: Some(env),
            path,
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    fn run(&self, rows: Vec<[f32; FEATURE_DIM]>) -> Result<Vec<f32>> {
        let Some(ref session) = self.session else {
            return Err(EngineError::upstream(format!(
                "risk model not loaded from {}",
                self.path.display()
            )));
        };
        let n = rows.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let flat: Vec<f32> = rows.into_iter().flatten().collect();
        let arr = Array2::from_shape_vec((n, FEATURE_DIM), flat)
            .map_err(|e| EngineError::upstream(e.to_string()))?;
        let input = CowArray::from(arr.into_dyn());
        let outputs = session.run(vec![ort::Value::from_array(session.allocator(), &input)?])?;

        let out = outputs
            .first()
            .ok_or_else(|| EngineError::upstream("model produced no output"))?;
        let tensor = out.try_extract::<f32>()?;
        let view = tensor.view();
        let values: Vec<f32> = view.iter().copied().collect();
        probabilities(&values, n)
    }
}

/// One value per row is taken as-is; two per row are `[p(normal), p(anomaly)]`.
fn probabilities(values: &[f32], rows: usize) -> Result<Vec<f32>> {
    let scores: Vec<f32> = if values.len() == rows {
        values.to_vec()
    } else if values.len() == rows * 2 {
        values.chunks(2).map(|c| c[1]).collect()
    } else {
        return Err(EngineError::upstream(format!(
            "unexpected model output length {} for {} rows",
            values.len(),
            rows
        )));
    };
    Ok(scores.into_iter().map(|s| s.clamp(0.0, 1.0)).collect())
}

impl RiskModel for OnnxDetector {
    fn predict(&self, features: &FeatureVector) -> Result<f32> {
        let scores = self.run(vec![features.to_array()])?;
        scores
            .first()
            .copied()
            .ok_or_else(|| EngineError::upstream("model produced no score"))
    }

    fn predict_batch(&self, table: &FeatureTable) -> Result<Vec<f32>> {
        self.run(table.rows().iter().map(FeatureVector::to_array).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_model_loads_but_cannot_predict() {
        let d = OnnxDetector::load(Path::new("nonexistent.onnx")).unwrap();
        assert!(!d.is_loaded());
        let err = d.predict(&FeatureVector::from_array([0.0; FEATURE_DIM])).unwrap_err();
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn two_column_output_takes_positive_class() {
        let p = probabilities(&[0.9, 0.1, 0.2, 0.8], 2).unwrap();
        assert_eq!(p, vec![0.1, 0.8]);
    }

    #[test]
    fn scores_are_clamped() {
        assert_eq!(probabilities(&[1.5, -0.2], 2).unwrap(), vec![1.0, 0.0]);
        assert!(probabilities(&[0.1, 0.2, 0.3], 2).is_err());
    }
}
