//! Risk classification and the live scoring boundary.

mod engine;
mod service;

pub use engine::{Classification, ExplainResult, RiskResult, ANOMALY_THRESHOLD};
pub use service::RiskService;
