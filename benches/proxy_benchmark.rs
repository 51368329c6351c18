//! Benchmarks for the asset cache proxy.

#![allow(missing_docs)] // Benchmark macros generate undocumented functions

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use lemmings::cache::{
    CacheStorage, FetchError, Network, ProxyConfig, Registration, Request, Response,
};

/// Origin that answers every request with the same small body.
#[derive(Debug)]
struct StaticNetwork;

impl Network for StaticNetwork {
    fn fetch(&self, _request: &Request) -> Result<Response, FetchError> {
        Ok(Response::ok(vec![b'x'; 4096]))
    }
}

fn registered() -> Registration {
    let registration = Registration::new(Arc::new(StaticNetwork), Arc::new(CacheStorage::new()));
    if let Err(e) = registration.register(ProxyConfig::default()) {
        panic!("install failed: {e}");
    }
    registration
}

fn bench_hit(c: &mut Criterion) {
    let registration = registered();
    let request = Request::get("http://localhost/levels.js");

    c.bench_function("handle_hit", |b| {
        b.iter(|| black_box(registration.handle(black_box(&request))));
    });
}

fn bench_miss(c: &mut Criterion) {
    let registration = registered();
    let requests: Vec<Request> = (0..1000)
        .map(|i| Request::get(format!("http://localhost/assets/{i}.png")))
        .collect();

    c.bench_function("handle_miss_then_hit_1000", |b| {
        b.iter(|| {
            for request in &requests {
                let _ = black_box(registration.handle(request));
            }
        });
    });
}

fn bench_install(c: &mut Criterion) {
    let config = ProxyConfig {
        allow_list: (0..64).map(|i| format!("assets/{i}.png")).collect(),
        ..ProxyConfig::default()
    };

    c.bench_function("register_64_assets", |b| {
        b.iter(|| {
            let registration =
                Registration::new(Arc::new(StaticNetwork), Arc::new(CacheStorage::new()));
            black_box(registration.register(config.clone()))
        });
    });
}

criterion_group!(benches, bench_hit, bench_miss, bench_install);
criterion_main!(benches);
