//! Integration test: config load, batch extraction end to end, validation abort, scoring boundary.

use audit_risk::{
    config::EngineConfig,
    events::RawEvent,
    explain::AblationExplainer,
    features::{FeatureExtractor, FeatureVector, FEATURE_NAMES},
    model::{OnnxDetector, RiskModel},
    risk::{Classification, RiskService},
    EngineError,
};
use std::path::Path;
use std::sync::Arc;

fn raw(ts: &str, user: &str, ip: &str, ev: &str, res: &str) -> RawEvent {
    RawEvent::new(ts, user, ip, ev, res)
}

fn mixed_batch() -> Vec<RawEvent> {
    vec![
        raw("2025-07-14T10:00:00", "A", "10.0.0.1", "login_failure", "/login"),
        raw("2025-07-14T10:20:00", "B", "10.0.0.2", "login_success", "/home/b"),
        raw("2025-07-14T10:40:00", "A", "10.0.0.1", "login_failure", "/login"),
        raw("2025-07-12T03:00:00", "C", "10.0.0.3", "privilege_escalation", "/etc/sudoers"),
        raw("2025-07-14T11:10:00", "A", "10.0.0.1", "login_failure", "/login"),
        raw("2025-07-14T10:50:00", "A", "10.0.0.9", "file_access", "/srv/data/reports/q2.csv"),
    ]
}

#[test]
fn config_load_default() {
    let c = EngineConfig::load(Path::new("nonexistent.json"));
    assert_eq!(c.features.failure_window_secs, 3600);
    assert!(!c.history.enabled);
}

#[test]
fn batch_extraction_end_to_end() {
    let table = FeatureExtractor::default().extract(&mixed_batch()).unwrap();
    assert_eq!(table.len(), 6);

    let failed: Vec<u32> = table.rows().iter().map(|r| r.failed_logins_last_1h).collect();
    assert_eq!(failed, vec![0, 0, 1, 0, 1, 0]);

    let codes: Vec<u32> = table.rows().iter().map(|r| r.event_type_code).collect();
    assert_eq!(codes, vec![0, 1, 0, 2, 0, 3]);

    let ip_counts: Vec<u32> = table.rows().iter().map(|r| r.ip_event_count).collect();
    assert_eq!(ip_counts, vec![3, 1, 3, 1, 3, 1]);

    let a_rate = table.rows()[0].user_event_rate;
    assert!((a_rate - 4.0 / 15.0).abs() < 1e-12);

    let sat = table.rows()[3];
    assert_eq!((sat.is_weekend, sat.is_privileged_event, sat.event_hour), (1, 1, 3));
    assert_eq!(table.rows()[5].resource_depth, 4);
}

#[test]
fn non_failure_rows_always_zero() {
    let mut batch = mixed_batch();
    batch.push(raw("2025-07-14T11:15:00", "A", "10.0.0.1", "login_success", "/login"));
    let table = FeatureExtractor::default().extract(&batch).unwrap();
    for (r, fv) in batch.iter().zip(table.rows()) {
        if r.event_type.as_deref() != Some("login_failure") {
            assert_eq!(fv.failed_logins_last_1h, 0);
        }
    }
}

#[test]
fn malformed_timestamp_aborts_batch() {
    let mut batch = mixed_batch();
    batch[4].timestamp = Some("2025-07-14 25:99".into());
    let err = FeatureExtractor::default().extract(&batch).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("ISO 8601"));
}

#[test]
fn extraction_from_json_records() {
    let json = r#"[
        {"timestamp": "2025-07-14T10:00:00", "user": "A", "ip_address": "1.1.1.1", "event_type": "login_failure", "resource": "/a"},
        {"timestamp": "2025-07-14T10:40:00", "user": "A", "ip_address": "1.1.1.1", "event_type": "login_failure", "resource": "/a"},
        {"timestamp": "2025-07-14T11:10:00", "user": "A", "ip_address": "1.1.1.1", "event_type": "login_failure", "resource": "/a"}
    ]"#;
    let records: Vec<RawEvent> = serde_json::from_str(json).unwrap();
    let table = FeatureExtractor::default().extract(&records).unwrap();
    assert_eq!(table.column("failed_logins_last_1h"), Some(vec![0.0, 1.0, 1.0]));
}

struct RuleModel;

impl RiskModel for RuleModel {
    fn predict(&self, f: &FeatureVector) -> audit_risk::Result<f32> {
        Ok(if f.is_privileged_event == 1 { 0.9 } else { 0.1 })
    }
}

#[test]
fn live_boundary_scores_and_explains() {
    let svc = RiskService::new(
        FeatureExtractor::default(),
        Arc::new(RuleModel),
        Arc::new(AblationExplainer::default()),
    );
    let event = raw("2025-07-14T10:22:00", "user_10", "192.168.1.1", "config_change", "/etc/app.conf");
    let r = svc.score(&event).unwrap();
    assert_eq!(r.classification, Classification::Anomaly);

    let out = svc.explain(&event).unwrap();
    let json = serde_json::to_value(&out).unwrap();
    for name in FEATURE_NAMES {
        assert!(json["explanations"].get(name).is_some());
    }
    assert!(out.explanations.get("is_privileged_event").unwrap() > 0.5);
}

#[test]
fn missing_onnx_model_is_server_side_error() {
    let model = OnnxDetector::load(Path::new("nonexistent.onnx")).unwrap();
    let svc = RiskService::new(
        FeatureExtractor::default(),
        Arc::new(model),
        Arc::new(AblationExplainer::default()),
    );
    let err = svc
        .score(&raw("2025-07-14T10:22:00", "u", "ip", "login_failure", "/secure/data"))
        .unwrap_err();
    assert!(matches!(err, EngineError::UpstreamModel(_)));
    assert_eq!(err.status_code(), 500);
}
