//! Running a chain against an output device.
//!
//! ```text
//!   control thread                         audio thread (device callback)
//!   ──────────────                         ─────────────────────────────
//!   AudioGraphRunner::start() ──open──→    RenderCallback::render(out)
//!   AudioGraphRunner::stop()  ──drop──→      try_lock renderer
//!   EngineShared::stats()     ←─atomics──    source → pipeline → out
//! ```

pub mod backend;
pub mod chain;
pub mod cpal_backend;
pub mod renderer;
pub mod runner;

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

pub use backend::{AudioBackend, OfflineBackend, OfflineDriver, OutputStream, RenderCallback};
pub use chain::{ChainBuilder, ChainControls, ChainTaps, ReverbChain};
pub use cpal_backend::CpalBackend;
pub use renderer::ChainRenderer;
pub use runner::AudioGraphRunner;

/// Lifecycle of a runner: `Stopped → Starting → Running → Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RunState {
    Stopped = 0,
    Starting = 1,
    Running = 2,
}

impl RunState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => RunState::Starting,
            2 => RunState::Running,
            _ => RunState::Stopped,
        }
    }
}

/// Realtime counters. Written by the audio thread, read anywhere.
#[derive(Debug, Default)]
pub struct EngineStats {
    callbacks: AtomicU64,
    blocks: AtomicU64,
    overruns: AtomicU64,
    dropped_blocks: AtomicU64,
    stream_errors: AtomicU64,
}

/// Plain copy of [`EngineStats`] at one moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub callbacks: u64,
    pub blocks: u64,
    pub overruns: u64,
    pub dropped_blocks: u64,
    pub stream_errors: u64,
}

impl EngineStats {
    pub(crate) fn add_callback(&self) {
        self.callbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_blocks(&self, blocks: u64) {
        self.blocks.fetch_add(blocks, Ordering::Relaxed);
    }

    pub(crate) fn add_overrun(&self) {
        self.overruns.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_dropped_block(&self) {
        self.dropped_blocks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_stream_error(&self) {
        self.stream_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            callbacks: self.callbacks.load(Ordering::Relaxed),
            blocks: self.blocks.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
            dropped_blocks: self.dropped_blocks.load(Ordering::Relaxed),
            stream_errors: self.stream_errors.load(Ordering::Relaxed),
        }
    }
}

/// State shared between a runner and its callbacks.
#[derive(Debug, Default)]
pub struct EngineShared {
    state: AtomicU8,
    stats: EngineStats,
}

impl EngineShared {
    pub fn state(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_state(&self, state: RunState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_roundtrip() {
        let shared = EngineShared::default();
        assert_eq!(shared.state(), RunState::Stopped);
        for state in [RunState::Starting, RunState::Running, RunState::Stopped] {
            shared.set_state(state);
            assert_eq!(shared.state(), state);
        }
    }

    #[test]
    fn test_stats_snapshot() {
        let stats = EngineStats::default();
        stats.add_callback();
        stats.add_blocks(3);
        stats.add_overrun();
        stats.add_dropped_block();
        stats.add_stream_error();
        assert_eq!(
            stats.snapshot(),
            StatsSnapshot {
                callbacks: 1,
                blocks: 3,
                overruns: 1,
                dropped_blocks: 1,
                stream_errors: 1,
            }
        );
    }
}
