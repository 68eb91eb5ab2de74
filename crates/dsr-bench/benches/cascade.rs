// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dsr_bench::synthetic_point;
use dsr_core::{CorrectionOptions, StableRng, ValidationOptions};
use dsr_correct::CorrectionCascade;
use dsr_ledger::AdjustmentLedger;

const EPOCHS: usize = 500;

fn benchmark_cascade(c: &mut Criterion) {
    let cascade = CorrectionCascade::new(
        ValidationOptions::default(),
        CorrectionOptions::default(),
    )
    .expect("default options");

    let lightly_corrupted = synthetic_point("BENCH-LIGHT", EPOCHS, 100, 0xfeed);
    let heavily_corrupted = synthetic_point("BENCH-HEAVY", EPOCHS, 5, 0xfeed);

    let mut group = c.benchmark_group("cascade");
    group.sample_size(20);
    group.bench_function("light_corruption", |b| {
        b.iter_batched(
            || lightly_corrupted.clone(),
            |mut point| {
                let mut ledger = AdjustmentLedger::new();
                black_box(
                    cascade
                        .run(&mut point, &mut StableRng::new(1), &mut ledger)
                        .expect("cascade runs"),
                )
            },
            criterion::BatchSize::LargeInput,
        )
    });
    group.bench_function("heavy_corruption", |b| {
        b.iter_batched(
            || heavily_corrupted.clone(),
            |mut point| {
                let mut ledger = AdjustmentLedger::new();
                black_box(
                    cascade
                        .run(&mut point, &mut StableRng::new(1), &mut ledger)
                        .expect("cascade runs"),
                )
            },
            criterion::BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group!(benches, benchmark_cascade);
criterion_main!(benches);
