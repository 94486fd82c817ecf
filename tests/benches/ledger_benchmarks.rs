//! # Guardian Recovery Ledger Benchmarks
//!
//! | Operation | Expected cost |
//! |-----------|---------------|
//! | `initiate_recovery` | one keccak + one batch commit |
//! | `endorse_recovery` | O(guardians) membership + one batch commit |
//! | `complete_recovery` | O(1) + one batch commit |
//! | snapshot | O(ledger) |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gr_tests::fixtures::*;
use guardian_recovery::prelude::*;
use std::time::Duration;

fn bench_request_id_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("request-id");
    group.bench_function("derive_request_id", |b| {
        let mut nonce = 0u64;
        b.iter(|| {
            nonce += 1;
            black_box(derive_request_id(nonce, 42))
        })
    });
    group.finish();
}

fn bench_full_recovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("recovery-flow");
    group.measurement_time(Duration::from_secs(5));

    for n in [3u8, 6, 10] {
        let threshold = n;
        group.throughput(Throughput::Elements(u64::from(n)));
        group.bench_with_input(BenchmarkId::new("initiate_endorse_complete", n), &n, |b, &n| {
            let service = service();
            register(&service, n, threshold);
            b.iter(|| {
                let request = service
                    .initiate_recovery(REQUESTER, RECORD, NEW_OWNER)
                    .unwrap();
                for i in 1..=n {
                    service.endorse_recovery(guardian(i), request).unwrap();
                }
                black_box(service.complete_recovery(REQUESTER, request).unwrap())
            })
        });
    }

    group.finish();
}

fn bench_status_polling(c: &mut Criterion) {
    let mut group = c.benchmark_group("status");
    let service = service();
    register(&service, 5, 3);
    let request = service
        .initiate_recovery(REQUESTER, RECORD, NEW_OWNER)
        .unwrap();
    service.endorse_recovery(guardian(1), request).unwrap();

    group.bench_function("get_status", |b| {
        b.iter(|| black_box(service.get_status(&request).unwrap()))
    });
    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for requests in [10usize, 100, 1_000] {
        let service = service();
        register(&service, 3, 2);
        for _ in 0..requests {
            let request = service
                .initiate_recovery(REQUESTER, RECORD, NEW_OWNER)
                .unwrap();
            service.endorse_recovery(guardian(1), request).unwrap();
        }

        group.throughput(Throughput::Elements(requests as u64));
        group.bench_with_input(BenchmarkId::new("to_bytes", requests), &service, |b, s| {
            b.iter(|| black_box(s.store().snapshot().unwrap().to_bytes().unwrap()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_request_id_derivation,
    bench_full_recovery,
    bench_status_polling,
    bench_snapshot
);
criterion_main!(benches);
