#![allow(missing_docs)]

use std::hint::black_box;
use criterion::{criterion_group, criterion_main, Criterion};
use bouncer::{CheckOptions, Policy, RateLimiters};

fn benchmark(c: &mut Criterion) {
    let limiters = RateLimiters::new();

    c.bench_function("probe unknown identifier", |b| b.iter(
        || limiters.check(Policy::Login, black_box("nobody@example.com"), CheckOptions::probe())
    ));

    for _ in 0..5 {
        limiters.check(Policy::Login, "blocked@example.com", CheckOptions::failure());
    }
    c.bench_function("check blocked identifier", |b| b.iter(
        || limiters.check(Policy::Login, black_box("blocked@example.com"), CheckOptions::success())
    ));

    let mut i = 0u64;
    c.bench_function("record api call", |b| b.iter(|| {
        i = i.wrapping_add(1);
        let key = format!("client-{}", i % 1_000);
        limiters.check(Policy::ApiGeneral, black_box(&key), CheckOptions::success())
    }));
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
