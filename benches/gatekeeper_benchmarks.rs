//! Performance benchmarks for the request hot path.
//!
//! Every inbound request pays for canonicalization, one HMAC and the
//! validation pass before any I/O happens; these keep that cost visible.

use std::{hint::black_box, sync::Arc, time::Duration};

use axum::http::StatusCode;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use kryos_core::{
    crypto::canonical_json, tier::parse_generation, AuthScheme, Gatekeeper, Schema,
    SignedPayloadAuthenticator, TestClock,
};
use kryos_testing::{PayloadBuilder, TestEnv, TEST_NOW_MS};
use tokio::runtime::Runtime;

const SECRET: &str = "bench_secret_0123456789";

/// Canonicalization and signing of a logs payload.
fn bench_signing(c: &mut Criterion) {
    let mut group = c.benchmark_group("signing");
    let payload = PayloadBuilder::logs(TEST_NOW_MS).build();
    let auth = SignedPayloadAuthenticator::new(SECRET);

    group.bench_function("canonical_json", |b| b.iter(|| canonical_json(black_box(&payload))));
    group.bench_function("sign", |b| b.iter(|| auth.sign(black_box(&payload))));

    group.finish();
}

/// Full admission (authenticate + validate) per scheme.
fn bench_admission(c: &mut Criterion) {
    let mut group = c.benchmark_group("admission");
    let payload = PayloadBuilder::logs(TEST_NOW_MS).build();
    let signature = SignedPayloadAuthenticator::new(SECRET).sign(&payload).unwrap();
    let token = kryos_core::SharedTokenAuthenticator::token_for(SECRET);

    for (scheme, proof) in [(AuthScheme::Signed, signature), (AuthScheme::Token, token)] {
        let gatekeeper = Gatekeeper::for_scheme(
            scheme,
            SECRET,
            Arc::new(TestClock::with_start_millis(TEST_NOW_MS)),
            None,
            None,
        );

        group.bench_with_input(BenchmarkId::new("admit", scheme), &proof, |b, proof| {
            b.iter(|| gatekeeper.admit(black_box(&payload), Some(proof), &Schema::LOGS))
        });
    }

    group.finish();
}

/// Generation text extraction.
fn bench_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation");

    for text in ["250000", "$12,500,000/s", "1.5M/s per second"] {
        group.bench_with_input(BenchmarkId::new("parse", text), text, |b, text| {
            b.iter(|| parse_generation(black_box(text)))
        });
    }

    group.finish();
}

/// Router round trip with a mock destination.
fn bench_relay_round_trip(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let env = rt.block_on(TestEnv::new());

    let mut group = c.benchmark_group("relay");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("logs", |b| {
        b.to_async(&rt).iter(|| async {
            let payload = PayloadBuilder::logs(TEST_NOW_MS).build();
            let response = env.post("/api/logs", &payload).await;
            assert_eq!(response.status, StatusCode::OK);
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_signing,
    bench_admission,
    bench_generation,
    bench_relay_round_trip
);
criterion_main!(benches);
