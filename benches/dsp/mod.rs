//! Benchmarks for low-level DSP primitives.

mod mix;
mod ramp;
mod reverb;

pub use mix::bench_mix;
pub use ramp::bench_ramp;
pub use reverb::bench_reverb;
