//! Benchmarks for dry/wet mixing.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_reverb::dsp::mix;

use crate::BLOCK_SIZES;

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/mix");

    for &size in BLOCK_SIZES {
        let dry: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let wet: Vec<f32> = (0..size).map(|i| (i as f32 * 0.15).cos()).collect();
        let mut output = vec![0.0f32; size];

        // Validated block mix with a fixed balance
        group.bench_with_input(BenchmarkId::new("block", size), &size, |b, _| {
            b.iter(|| {
                mix::mix_block(
                    black_box(&dry),
                    black_box(&wet),
                    black_box(0.3),
                    black_box(&mut output),
                )
            })
        });

        // Per-sample blend, as the dry/wet node does while balance ramps
        group.bench_with_input(BenchmarkId::new("per_sample", size), &size, |b, _| {
            b.iter(|| {
                for (i, out) in output.iter_mut().enumerate() {
                    let balance = i as f32 / size as f32;
                    *out = mix::blend_dry_wet(black_box(dry[i]), black_box(wet[i]), balance);
                }
            })
        });
    }

    group.finish();
}
