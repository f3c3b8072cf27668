//! Engine configuration. Classification threshold is fixed and deliberately absent here.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Env var naming the JSON config file.
pub const CONFIG_PATH_ENV: &str = "AUDIT_RISK_CONFIG_PATH";

/// Upper bound for `failure_window_secs` (30 days).
pub const MAX_FAILURE_WINDOW_SECS: i64 = 30 * 24 * 3600;
/// Upper bound for `history.retention_secs` (365 days).
pub const MAX_RETENTION_SECS: i64 = 365 * 24 * 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Path to ONNX risk model
    pub model_path: PathBuf,
    /// Feature extraction parameters
    pub features: FeaturesConfig,
    /// Recent-event history used by the live scoring boundary
    pub history: HistoryConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Trailing window for `failed_logins_last_1h`
    pub failure_window_secs: i64,
    /// Assumed observation span behind `user_event_rate`
    pub observation_days: f64,
    /// Fixed event-type vocabulary; `None` means batch-local first-seen codes
    pub event_type_vocabulary: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// When false, live scoring feeds singleton batches into the engine
    pub enabled: bool,
    /// Events older than newest - retention are evicted
    pub retention_secs: i64,
    /// Hard cap on retained events
    pub max_events: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/risk_model.onnx"),
            features: FeaturesConfig::default(),
            history: HistoryConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            failure_window_secs: 3600,
            observation_days: 15.0,
            event_type_vocabulary: None,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            retention_secs: 15 * 24 * 3600,
            max_events: 10_000,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl FeaturesConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_FAILURE_WINDOW_SECS).contains(&self.failure_window_secs) {
            return Err(EngineError::Config(format!(
                "failure_window_secs must be in 1..={MAX_FAILURE_WINDOW_SECS}, got {}",
                self.failure_window_secs
            )));
        }
        if !(self.observation_days > 0.0) {
            return Err(EngineError::Config(format!(
                "observation_days must be positive, got {}",
                self.observation_days
            )));
        }
        Ok(())
    }
}

impl HistoryConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_RETENTION_SECS).contains(&self.retention_secs) {
            return Err(EngineError::Config(format!(
                "history.retention_secs must be in 1..={MAX_RETENTION_SECS}, got {}",
                self.retention_secs
            )));
        }
        if self.max_events == 0 {
            return Err(EngineError::Config("history.max_events must be positive".into()));
        }
        Ok(())
    }
}

impl EngineConfig {
    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            if let Ok(data) = std::fs::read_to_string(path) {
                match serde_json::from_str::<EngineConfig>(&data) {
                    Ok(c) => return c,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "invalid config; using defaults")
                    }
                }
            }
        }
        Self::default()
    }

    /// Resolve path from `AUDIT_RISK_CONFIG_PATH` (default `config.json`) and load.
    pub fn from_env() -> Self {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.json"));
        Self::load(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let c = EngineConfig::load(Path::new("nonexistent.json"));
        assert_eq!(c.features.failure_window_secs, 3600);
        assert_eq!(c.features.observation_days, 15.0);
        assert!(!c.history.enabled);
    }

    #[test]
    fn partial_file_fills_remaining_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"features": {{"event_type_vocabulary": ["login_success"]}}, "log": {{"json": false}}}}"#).unwrap();
        let c = EngineConfig::load(f.path());
        assert_eq!(
            c.features.event_type_vocabulary.as_deref(),
            Some(&["login_success".to_string()][..])
        );
        assert_eq!(c.features.failure_window_secs, 3600);
        assert!(!c.log.json);
        assert_eq!(c.log.level, "info");
    }

    #[test]
    fn rejects_non_positive_window() {
        let f = FeaturesConfig {
            failure_window_secs: 0,
            ..FeaturesConfig::default()
        };
        assert!(f.validate().is_err());
        assert!(FeaturesConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_oversized_window() {
        for secs in [i64::MAX, 9_000_000_000_000, MAX_FAILURE_WINDOW_SECS + 1] {
            let f = FeaturesConfig {
                failure_window_secs: secs,
                ..FeaturesConfig::default()
            };
            assert!(matches!(f.validate(), Err(EngineError::Config(_))));
        }
        let at_cap = FeaturesConfig {
            failure_window_secs: MAX_FAILURE_WINDOW_SECS,
            ..FeaturesConfig::default()
        };
        assert!(at_cap.validate().is_ok());
    }

    #[test]
    fn history_bounds() {
        assert!(HistoryConfig::default().validate().is_ok());
        for retention_secs in [0, -1, i64::MAX] {
            let h = HistoryConfig {
                retention_secs,
                ..HistoryConfig::default()
            };
            assert!(matches!(h.validate(), Err(EngineError::Config(_))));
        }
        let h = HistoryConfig {
            max_events: 0,
            ..HistoryConfig::default()
        };
        assert!(h.validate().is_err());
    }
}
