//! Risk model seam. The trained classifier lives outside this crate; it is
//! reached through [`RiskModel`].

mod onnx;

pub use onnx::OnnxDetector;

use crate::error::Result;
use crate::features::{FeatureTable, FeatureVector};

/// Maps a feature vector to an anomaly probability in `[0, 1]`.
pub trait RiskModel: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<f32>;

    fn predict_batch(&self, table: &FeatureTable) -> Result<Vec<f32>> {
        table.rows().iter().map(|fv| self.predict(fv)).collect()
    }
}
