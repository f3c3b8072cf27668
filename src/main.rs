//! Audit Risk CLI: reads a batch of audit events (JSON array or NDJSON) from a
//! file or stdin and writes one JSON line per event to stdout.
//!
//! Modes:
//! - default: feature vectors
//! - `--score`: batch extraction, then model score per row
//! - `--live`: each event scored on its own, as the live boundary does
//!   (with retained history when `history.enabled` is set)
//! - `--explain`: like `--live`, with per-feature attributions

use audit_risk::{
    config::EngineConfig,
    error::EngineError,
    events::RawEvent,
    explain::AblationExplainer,
    features::{FeatureExtractor, FeatureVector},
    history::EventHistory,
    logging::{LogEvent, StructuredLogger},
    model::OnnxDetector,
    risk::RiskService,
};
use chrono::Utc;
use serde::Serialize;
use std::io::{BufWriter, Read, Write};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Features,
    Score,
    Live,
    Explain,
}

#[derive(Serialize)]
struct FeatureRow {
    row: usize,
    #[serde(flatten)]
    features: FeatureVector,
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn parse_args() -> Result<(Mode, Option<String>), BoxError> {
    let mut mode = Mode::Features;
    let mut input = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--score" => mode = Mode::Score,
            "--live" => mode = Mode::Live,
            "--explain" => mode = Mode::Explain,
            "-" => input = None,
            flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}").into()),
            path => input = Some(path.to_string()),
        }
    }
    Ok((mode, input))
}

/// JSON array if the input starts with `[`, otherwise one object per non-empty line.
fn parse_records(text: &str) -> Result<Vec<RawEvent>, serde_json::Error> {
    if text.trim_start().starts_with('[') {
        return serde_json::from_str(text);
    }
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(serde_json::from_str)
        .collect()
}

fn build_service(config: &EngineConfig) -> Result<RiskService, EngineError> {
    let extractor = FeatureExtractor::new(config.features.clone())?;
    let model = Arc::new(OnnxDetector::load(&config.model_path)?);
    let service = RiskService::new(extractor, model, Arc::new(AblationExplainer::default()));
    Ok(if config.history.enabled {
        config.history.validate()?;
        service.with_history(EventHistory::new(&config.history))
    } else {
        service
    })
}

fn run(config: &EngineConfig, mode: Mode, records: &[RawEvent], out: &mut impl Write) -> Result<(), BoxError> {
    match mode {
        Mode::Features => {
            let table = FeatureExtractor::new(config.features.clone())?.extract(records)?;
            for (row, features) in table.rows().iter().enumerate() {
                StructuredLogger::emit_json(&FeatureRow { row, features: *features }, &mut *out)?;
            }
        }
        Mode::Score => {
            let service = build_service(config)?;
            let (_, results) = service.score_batch(records)?;
            let ts = Utc::now().to_rfc3339();
            for (row, (raw, result)) in records.iter().zip(&results).enumerate() {
                let line = LogEvent {
                    ts: ts.clone(),
                    row,
                    user: raw.user.as_deref(),
                    risk_score: Some(result.risk_score),
                    classification: Some(result.classification.as_str()),
                    error: None,
                };
                StructuredLogger::emit_json(&line, &mut *out)?;
            }
        }
        Mode::Live => {
            let service = build_service(config)?;
            for (row, raw) in records.iter().enumerate() {
                match service.score(raw) {
                    Ok(result) => {
                        let line = LogEvent {
                            ts: Utc::now().to_rfc3339(),
                            row,
                            user: raw.user.as_deref(),
                            risk_score: Some(result.risk_score),
                            classification: Some(result.classification.as_str()),
                            error: None,
                        };
                        StructuredLogger::emit_json(&line, &mut *out)?;
                    }
                    Err(e) => emit_row_error(row, raw, &e, &mut *out)?,
                }
            }
        }
        Mode::Explain => {
            let service = build_service(config)?;
            for (row, raw) in records.iter().enumerate() {
                match service.explain(raw) {
                    Ok(result) => StructuredLogger::emit_json(&result, &mut *out)?,
                    Err(e) => emit_row_error(row, raw, &e, &mut *out)?,
                }
            }
        }
    }
    Ok(())
}

/// Per-event failures in the live modes are reported in place; the batch continues.
fn emit_row_error(row: usize, raw: &RawEvent, err: &EngineError, out: &mut impl Write) -> std::io::Result<()> {
    let msg = err.to_string();
    let line = LogEvent {
        ts: Utc::now().to_rfc3339(),
        row,
        user: raw.user.as_deref(),
        risk_score: None,
        classification: None,
        error: Some(&msg),
    };
    StructuredLogger::emit_json(&line, out)
}

fn main() -> Result<(), BoxError> {
    let config = EngineConfig::from_env();
    StructuredLogger::init(config.log.json, &config.log.level);

    let (mode, input) = parse_args()?;
    let mut text = String::new();
    match &input {
        Some(path) => text = std::fs::read_to_string(path)?,
        None => {
            std::io::stdin().read_to_string(&mut text)?;
        }
    }
    let records = parse_records(&text)?;
    info!(rows = records.len(), mode = ?mode, "batch loaded");

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if let Err(e) = run(&config, mode, &records, &mut out) {
        out.flush()?;
        error!(error = %e, "batch failed");
        let code = match e.downcast_ref::<EngineError>() {
            Some(err) if err.is_validation() => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
    out.flush()?;
    Ok(())
}
