//! Benchmarks for the complete source → reverb → dry/wet chain.
//!
//! Each iteration is one stereo device callback of `size` frames rendered
//! through the offline backend, i.e. the same path a real device takes.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_reverb::{
    engine::{AudioGraphRunner, ChainBuilder, OfflineBackend, ReverbChain},
    EngineConfig,
};

use crate::BLOCK_SIZES;

pub fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/chain");

    for &size in BLOCK_SIZES {
        let config = EngineConfig::new(48_000.0, size, 2);
        let ReverbChain {
            renderer, controls, ..
        } = ChainBuilder::new(config).build().expect("valid chain");
        let (backend, driver) = OfflineBackend::new();
        let mut runner = AudioGraphRunner::new(config, renderer, backend);
        runner.start().expect("offline backend opens");

        let mut out = vec![0.0f32; size * 2];

        // Steady state: no parameter movement
        group.bench_with_input(BenchmarkId::new("steady", size), &size, |b, _| {
            b.iter(|| driver.pull(black_box(&mut out)))
        });

        // A new target on every callback keeps all three ramps running
        let mut flip = false;
        group.bench_with_input(BenchmarkId::new("ramping", size), &size, |b, _| {
            b.iter(|| {
                flip = !flip;
                let (feedback, cutoff, balance) = if flip {
                    (0.9, 800.0, 0.8)
                } else {
                    (0.3, 8_000.0, 0.2)
                };
                let _ = controls.set_feedback(feedback);
                let _ = controls.set_cutoff(cutoff);
                let _ = controls.set_balance(balance);
                driver.pull(black_box(&mut out))
            })
        });

        runner.stop().expect("stop never fails");
    }

    group.finish();
}
