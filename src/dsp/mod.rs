//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! These components are allocation-free once constructed and realtime-safe.
//! They stay focused on the signal-processing math; parameter plumbing and
//! block orchestration live in [`crate::graph`] and [`crate::param`].

/// Dry/wet crossfade.
pub mod mix;
/// Sample-accurate linear parameter ramps.
pub mod ramp;
/// Damped comb / allpass reverb network.
pub mod reverb;

pub use ramp::Ramp;
pub use reverb::CostelloReverb;
