//! Engine and chain configuration.
//!
//! `EngineConfig` is fixed for the lifetime of a running chain. `ChainSettings`
//! holds the user-facing parameter values a front end starts from.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{ChainError, Result},
    MAX_BLOCK_SIZE, MAX_CHANNELS,
};

/// Sample rate, block size and channel layout of a chain.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Frames per processing block. Device buffers are split into blocks of
    /// at most this many frames.
    pub block_size: usize,
    pub channels: usize,
    /// Time allowed for one device callback before it counts as an overrun.
    /// `None` uses the callback's own duration (frames / sample rate).
    pub overrun_budget: Option<Duration>,
}

impl EngineConfig {
    pub fn new(sample_rate: f32, block_size: usize, channels: usize) -> Self {
        Self {
            sample_rate,
            block_size,
            channels,
            overrun_budget: None,
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_overrun_budget(mut self, budget: Duration) -> Self {
        self.overrun_budget = Some(budget);
        self
    }

    /// Check that every field is usable by the realtime path.
    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(ChainError::InvalidConfig(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(ChainError::InvalidConfig(format!(
                "block size must be in 1..={MAX_BLOCK_SIZE}, got {}",
                self.block_size
            )));
        }
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(ChainError::InvalidConfig(format!(
                "channel count must be in 1..={MAX_CHANNELS}, got {}",
                self.channels
            )));
        }
        Ok(())
    }

    /// Callback budget for `frames` frames of output.
    pub fn budget_for(&self, frames: usize) -> Duration {
        self.overrun_budget
            .unwrap_or_else(|| Duration::from_secs_f64(frames as f64 / self.sample_rate as f64))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(48_000.0, 256, 2)
    }
}

/// Parameter values for the reverb chain.
///
/// Defaults match the classic cookbook preset: 60% feedback, 4 kHz damping
/// cutoff, equal dry/wet balance and 20 ms ramps.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainSettings {
    pub feedback: f32,
    pub cutoff_hz: f32,
    pub balance: f32,
    /// Ramp length in seconds applied to every parameter change.
    pub ramp_duration: f32,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            feedback: 0.6,
            cutoff_hz: 4_000.0,
            balance: 0.5,
            ramp_duration: 0.02,
        }
    }
}
