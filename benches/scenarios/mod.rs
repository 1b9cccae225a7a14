//! Complete-chain benchmarks.

mod chain;

pub use chain::bench_chain;
