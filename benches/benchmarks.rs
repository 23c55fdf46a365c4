// benches/benchmarks.rs — Performance benchmarks (criterion)
//
// Hot paths on every request:
//   1. Phone validation (login form)
//   2. Environment resolution + profile construction (startup)
//   3. Header merge and response classification (each attempt)
//   4. MOCK dispatch end to end, with the simulated delay recorded, not slept

use std::collections::BTreeMap;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

use selfcare::client::dispatcher::{classify_response, merge_headers};
use selfcare::client::{
    HttpResponse, RecordingSleeper, RequestDispatcher, RequestOptions, ReqwestTransport,
};
use selfcare::infra::config::Config;
use selfcare::phone::validate_phone_number;
use selfcare::profile::resolver::{resolve, select_profile};
use selfcare::profile::{ConfigProfile, Endpoint, ProfileName};
use selfcare::session::SessionStore;

fn bench_phone_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("phone");
    group.bench_function("valid_masked", |b| {
        b.iter(|| validate_phone_number(black_box("77 123 4567")))
    });
    group.bench_function("invalid_prefix", |b| {
        b.iter(|| validate_phone_number(black_box("0112345678")))
    });
    group.finish();
}

fn bench_resolution(c: &mut Criterion) {
    let config = Config::default();
    let mut group = c.benchmark_group("resolve");
    group.bench_function("resolve_host", |b| {
        b.iter(|| resolve(black_box("selfcare.mobitel.lk"), black_box(None)))
    });
    group.bench_function("select_profile", |b| {
        b.iter(|| select_profile(black_box("localhost"), None, &config))
    });
    group.finish();
}

fn bench_attempt_helpers(c: &mut Criterion) {
    let profile = ConfigProfile::builtin(ProfileName::Production);
    let mut caller = BTreeMap::new();
    caller.insert("X-Trace".to_string(), "abc".to_string());

    c.bench_function("merge_headers", |b| {
        b.iter(|| merge_headers(profile.default_headers(), &caller, Some("token")))
    });

    let body = json!({
        "success": true,
        "transactions": (0..50)
            .map(|i| json!({"id": format!("TXN{i:03}"), "type": "Recharge", "amount": 100, "date": "2024-01-10", "status": "Completed"}))
            .collect::<Vec<_>>(),
    })
    .to_string();
    c.bench_function("classify_json_50_txns", |b| {
        b.iter(|| {
            classify_response(HttpResponse {
                status: 200,
                content_type: Some("application/json".into()),
                body: body.clone(),
            })
        })
    });
}

fn bench_mock_dispatch(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    let dispatcher = RequestDispatcher::new(
        ConfigProfile::builtin(ProfileName::Mock),
        Arc::new(SessionStore::in_memory()),
        Arc::new(ReqwestTransport::new()),
        Arc::new(RecordingSleeper::new()),
    )
    .expect("mock profile");
    let login = RequestOptions::post(json!({"phone": "771234567", "password": "password123"}));

    let mut group = c.benchmark_group("mock_dispatch");
    group.bench_function("login", |b| {
        b.iter(|| rt.block_on(dispatcher.request(Endpoint::Login, login.clone())))
    });
    group.bench_function("transactions", |b| {
        b.iter(|| rt.block_on(dispatcher.request(Endpoint::Transactions, RequestOptions::get())))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_phone_validation,
    bench_resolution,
    bench_attempt_helpers,
    bench_mock_dispatch
);
criterion_main!(benches);
