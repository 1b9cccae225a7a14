//! Composable processing stages.
//!
//! Graph nodes wrap the low-level DSP primitives with what a running chain
//! needs: block-based processing, per-sample parameter ramps read from
//! lock-free handles, and taps for visualisation.

/// Fixed-capacity planar audio block.
pub mod block;
/// Dry/wet crossfade around an effect.
pub mod dry_wet;
/// Core trait shared by all stages.
pub mod node;
/// Ordered stage list with per-stage taps.
pub mod pipeline;
/// Ramped damped-comb reverb stage.
pub mod reverb;

pub use block::AudioBlock;
pub use dry_wet::DryWetNode;
pub use node::Processor;
pub use pipeline::Pipeline;
pub use reverb::ReverbNode;
