//! Audit Risk — feature extraction and windowed aggregation over security audit events.
//!
//! Modular structure:
//! - [`events`] — Raw audit records and batch normalization
//! - [`features`] — Per-event feature vectors: temporal, failure window, population
//! - [`model`] — Risk model seam and ONNX inference
//! - [`explain`] — Per-feature attribution
//! - [`risk`] — Classification and the live scoring boundary
//! - [`history`] — Retained recent events for live scoring
//! - [`logging`] — Structured JSON logging

pub mod config;
pub mod error;
pub mod events;
pub mod explain;
pub mod features;
pub mod history;
pub mod logging;
pub mod model;
pub mod risk;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use events::{AuditEvent, RawEvent};
pub use explain::{AblationExplainer, Explainer};
pub use features::{FeatureExtractor, FeatureTable, FeatureVector};
pub use history::EventHistory;
pub use logging::StructuredLogger;
pub use model::{OnnxDetector, RiskModel};
pub use risk::{Classification, RiskService};
