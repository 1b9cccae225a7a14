pub mod config; // Engine config and chain settings
pub mod dsp; // Ramps, reverb, dry/wet
pub mod engine; // Renderer, backends, runner
pub mod error;
pub mod graph; // Block processors and the pipeline
pub mod io; // Sources, taps, WAV
pub mod param; // Lock-free parameter handles

pub use config::{ChainSettings, EngineConfig};
pub use error::{ChainError, Result};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const MAX_CHANNELS: usize = 8;
