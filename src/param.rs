//! Lock-free control parameters.
//!
//! A parameter has two sides:
//!
//! - [`ParamHandle`]: cloneable, `Send + Sync`, lives on control threads.
//!   `set_target` validates a request and publishes it.
//! - [`ParamRamp`]: single owner, lives on the audio thread. `poll` picks up
//!   the latest request once per block, `advance` steps the ramp once per
//!   sample.
//!
//! A request is `{target, ramp length in samples}`, packed into one `u64` and
//! published with a single atomic store. The audio thread takes it with a
//! single atomic swap, so it can never observe half of one request and half of
//! another. If several requests land within one block the last one wins, the
//! same as moving a slider twice between two screen refreshes.
//!
//! ```text
//!  control thread                        audio thread
//!  ──────────────                        ────────────
//!  set_target(0.8, 0.02)
//!    validate ──✗──→ Err(InvalidParameter), nothing stored
//!    pending.store(pack(0.8, 960)) ────→ poll(): pending.swap(EMPTY)
//!  target() ←─── pending, else ─────────── target.store(0.8)
//!                                          ramp.set_target(0.8, 960)
//!                                        advance() × 960 → 0.8
//!  current() ←──────────────────────────── current.store(...) per block
//! ```

use std::sync::{
    atomic::{AtomicU32, AtomicU64, Ordering},
    Arc,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::ramp::{ramp_samples, Ramp},
    error::{ChainError, Result},
};

/// Range, default and unit label of a user-facing control.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Stable identifier (used in logs and errors).
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub unit: &'static str,
}

/// Comb feedback. Capped below 1.0 so the reverb can never diverge.
pub const FEEDBACK: ParamSpec = ParamSpec {
    id: "feedback",
    name: "Feedback",
    min: 0.0,
    max: 0.999,
    default: 0.6,
    unit: "Percent",
};

/// Damping low-pass cutoff.
pub const CUTOFF: ParamSpec = ParamSpec {
    id: "cutoff",
    name: "Cutoff Frequency",
    min: 12.0,
    max: 20_000.0,
    default: 4_000.0,
    unit: "Hertz",
};

/// Dry/wet balance.
pub const BALANCE: ParamSpec = ParamSpec {
    id: "balance",
    name: "Balance",
    min: 0.0,
    max: 1.0,
    default: 0.5,
    unit: "%",
};

impl ParamSpec {
    /// Reject non-finite, negative or out-of-range values.
    pub fn validate(&self, value: f32) -> Result<()> {
        if !value.is_finite() {
            return Err(ChainError::invalid(self.id, value, "not a finite number"));
        }
        if value < 0.0 {
            return Err(ChainError::invalid(self.id, value, "negative"));
        }
        if value < self.min {
            return Err(ChainError::invalid(self.id, value, "below minimum"));
        }
        if value > self.max {
            return Err(ChainError::invalid(self.id, value, "above maximum"));
        }
        Ok(())
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Map a value in range onto 0..=1 (slider position).
    pub fn normalize(&self, value: f32) -> f32 {
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    /// Map a 0..=1 slider position back into range.
    pub fn denormalize(&self, position: f32) -> f32 {
        self.min + position.clamp(0.0, 1.0) * (self.max - self.min)
    }
}

/// Marker for "no request pending". Its target half is a NaN bit pattern,
/// which `validate` never lets through.
const EMPTY: u64 = u64::MAX;

#[inline]
fn pack(target: f32, samples: u32) -> u64 {
    ((target.to_bits() as u64) << 32) | samples as u64
}

#[inline]
fn unpack(word: u64) -> (f32, u32) {
    (f32::from_bits((word >> 32) as u32), word as u32)
}

struct SharedParam {
    spec: ParamSpec,
    sample_rate: f32,
    pending: AtomicU64,
    /// Target of the last request the audio thread took (f32 bits).
    target: AtomicU32,
    /// Audio-side value as of the last block (f32 bits).
    current: AtomicU32,
}

/// Create a parameter starting at `initial`, returning both sides.
///
/// `initial` is clamped into the parameter's range.
pub fn param(spec: ParamSpec, initial: f32, sample_rate: f32) -> (ParamHandle, ParamRamp) {
    let initial = if initial.is_finite() {
        spec.clamp(initial)
    } else {
        spec.default
    };
    let shared = Arc::new(SharedParam {
        spec,
        sample_rate,
        pending: AtomicU64::new(EMPTY),
        target: AtomicU32::new(initial.to_bits()),
        current: AtomicU32::new(initial.to_bits()),
    });

    (
        ParamHandle {
            shared: Arc::clone(&shared),
        },
        ParamRamp {
            shared,
            ramp: Ramp::new(initial),
        },
    )
}

/// Control-thread side of a parameter.
#[derive(Clone)]
pub struct ParamHandle {
    shared: Arc<SharedParam>,
}

impl ParamHandle {
    pub fn spec(&self) -> &ParamSpec {
        &self.shared.spec
    }

    /// Ramp to `target` over `duration_secs`.
    ///
    /// Fails with [`ChainError::InvalidParameter`] for a non-finite, negative
    /// or out-of-range target, or a non-finite or negative duration. A failed
    /// call changes nothing.
    pub fn set_target(&self, target: f32, duration_secs: f32) -> Result<()> {
        let spec = &self.shared.spec;
        spec.validate(target).inspect_err(|err| {
            tracing::warn!(param = spec.id, %err, "rejected parameter target");
        })?;
        if !duration_secs.is_finite() || duration_secs < 0.0 {
            tracing::warn!(param = spec.id, duration_secs, "rejected ramp duration");
            return Err(ChainError::invalid(
                spec.id,
                duration_secs,
                "ramp duration must be finite and non-negative",
            ));
        }

        let samples = ramp_samples(duration_secs, self.shared.sample_rate);
        self.shared
            .pending
            .store(pack(target, samples), Ordering::Release);
        tracing::debug!(param = spec.id, target, samples, "published ramp");
        Ok(())
    }

    /// Where the parameter is heading: the pending request if one is
    /// waiting, otherwise the target the audio thread is ramping to.
    ///
    /// With several writers this is always a value that plays.
    pub fn target(&self) -> f32 {
        let word = self.shared.pending.load(Ordering::Acquire);
        if word != EMPTY {
            unpack(word).0
        } else {
            f32::from_bits(self.shared.target.load(Ordering::Acquire))
        }
    }

    /// Value the audio thread reached at the end of its last block.
    pub fn current(&self) -> f32 {
        f32::from_bits(self.shared.current.load(Ordering::Relaxed))
    }

    /// True while a published request has not been picked up yet.
    pub fn is_pending(&self) -> bool {
        self.shared.pending.load(Ordering::Acquire) != EMPTY
    }
}

/// Audio-thread side of a parameter. Not `Clone`: there is exactly one reader.
pub struct ParamRamp {
    shared: Arc<SharedParam>,
    ramp: Ramp,
}

impl ParamRamp {
    /// Take the latest published request, if any. Call once per block.
    #[inline]
    pub fn poll(&mut self) {
        let word = self.shared.pending.swap(EMPTY, Ordering::Acquire);
        if word != EMPTY {
            let (target, samples) = unpack(word);
            self.shared.target.store(target.to_bits(), Ordering::Release);
            self.ramp.set_target(target, samples);
        }
    }

    /// Step one sample and return the value to use for it.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.ramp.advance()
    }

    /// Publish the current value for control-side readers. Call once per block.
    #[inline]
    pub fn publish(&self) {
        self.shared
            .current
            .store(self.ramp.current().to_bits(), Ordering::Relaxed);
    }

    /// Apply anything pending and finish the ramp immediately. Used when a
    /// chain (re)starts: ramps in flight at stop time are not resumed.
    pub fn settle(&mut self) {
        self.poll();
        self.ramp.snap();
        self.publish();
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.ramp.current()
    }

    #[inline]
    pub fn is_ramping(&self) -> bool {
        self.ramp.is_ramping()
    }

    pub fn spec(&self) -> &ParamSpec {
        &self.shared.spec
    }
}
