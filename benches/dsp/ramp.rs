//! Benchmarks for parameter ramps.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_reverb::{
    dsp::Ramp,
    param::{param, FEEDBACK},
};

use crate::BLOCK_SIZES;

pub fn bench_ramp(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/ramp");

    for &size in BLOCK_SIZES {
        // Plain ramp, retargeted every block so it is always moving
        let mut ramp = Ramp::new(0.0);
        let mut up = true;
        group.bench_with_input(BenchmarkId::new("advance", size), &size, |b, &size| {
            b.iter(|| {
                up = !up;
                ramp.set_target(if up { 1.0 } else { 0.0 }, size as u32);
                let mut sum = 0.0f32;
                for _ in 0..size {
                    sum += ramp.advance();
                }
                black_box(sum)
            })
        });

        // Cross-thread parameter: publish, poll, advance, publish back
        let (handle, mut audio) = param(FEEDBACK, 0.0, 48_000.0);
        group.bench_with_input(BenchmarkId::new("param_block", size), &size, |b, &size| {
            b.iter(|| {
                up = !up;
                let _ = handle.set_target(if up { 0.9 } else { 0.1 }, 0.005);
                audio.poll();
                let mut sum = 0.0f32;
                for _ in 0..size {
                    sum += audio.advance();
                }
                audio.publish();
                black_box(sum)
            })
        });
    }

    group.finish();
}
