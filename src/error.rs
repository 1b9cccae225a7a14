//! Error types shared by the control path.
//!
//! Nothing in here is ever constructed on the audio thread: realtime problems
//! (overruns, contended renderer, device hiccups) are counters in
//! [`EngineStats`](crate::engine::EngineStats), not errors.

use std::fmt;

/// Errors reported synchronously to control-thread callers.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainError {
    /// A parameter target, duration or balance was out of range or non-finite.
    /// The parameter is left untouched.
    InvalidParameter {
        name: &'static str,
        value: f32,
        reason: &'static str,
    },
    /// The output device could not be opened. The runner stays stopped.
    DeviceUnavailable(String),
    /// An [`EngineConfig`](crate::config::EngineConfig) value was rejected.
    InvalidConfig(String),
    /// A sample source could not be loaded.
    Source(String),
}

impl ChainError {
    pub(crate) fn invalid(name: &'static str, value: f32, reason: &'static str) -> Self {
        ChainError::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::InvalidParameter {
                name,
                value,
                reason,
            } => write!(f, "invalid value {value} for parameter '{name}': {reason}"),
            ChainError::DeviceUnavailable(msg) => write!(f, "output device unavailable: {msg}"),
            ChainError::InvalidConfig(msg) => write!(f, "invalid engine config: {msg}"),
            ChainError::Source(msg) => write!(f, "failed to load sample source: {msg}"),
        }
    }
}

impl std::error::Error for ChainError {}

pub type Result<T> = std::result::Result<T, ChainError>;
