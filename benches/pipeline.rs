//! Pipeline benchmark: raw batch → normalized → feature table.

use audit_risk::events::RawEvent;
use audit_risk::features::FeatureExtractor;
use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const EVENT_TYPES: [&str; 5] = [
    "login_success",
    "login_failure",
    "file_access",
    "privilege_escalation",
    "config_change",
];

fn make_batch(n: usize) -> Vec<RawEvent> {
    let start = NaiveDate::from_ymd_opt(2025, 7, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();
    (0..n)
        .map(|i| {
            // spread over ~15 days
            let ts = start + Duration::seconds((i as i64 * 7919) % (15 * 86_400));
            RawEvent::new(
                ts.format("%Y-%m-%dT%H:%M:%S").to_string(),
                format!("user_{}", i % 20),
                format!("10.0.{}.{}", i % 7, i % 251),
                EVENT_TYPES[(i * 31) % EVENT_TYPES.len()],
                format!("/srv/{}/file_{}", i % 4, i),
            )
        })
        .collect()
}

fn bench_extract(c: &mut Criterion) {
    let extractor = FeatureExtractor::default();
    let mut g = c.benchmark_group("extract_batch");
    for n in [100, 1_000, 5_000] {
        let batch = make_batch(n);
        g.bench_with_input(BenchmarkId::from_parameter(n), &batch, |b, batch| {
            b.iter(|| black_box(extractor.extract(black_box(batch)).unwrap()))
        });
    }
    g.finish();
}

fn bench_singleton(c: &mut Criterion) {
    let extractor = FeatureExtractor::default();
    let batch = make_batch(1);
    c.bench_function("extract_singleton", |b| {
        b.iter(|| black_box(extractor.extract(black_box(&batch)).unwrap()))
    });
}

criterion_group!(benches, bench_extract, bench_singleton);
criterion_main!(benches);
