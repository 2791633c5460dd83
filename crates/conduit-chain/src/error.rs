//! Error types for chain construction and processing.

use conduit_registry::EffectError;
use thiserror::Error;

/// Errors returned by [`ProcessingChain`](crate::ProcessingChain) operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainError {
    /// Sample rate outside the supported range.
    #[error("sample rate {0} Hz outside {min}..={max} Hz", min = conduit_core::MIN_SAMPLE_RATE, max = conduit_core::MAX_SAMPLE_RATE)]
    InvalidSampleRate(u32),

    /// Channel count outside the supported range.
    #[error("channel count {0} outside 1..={max}", max = conduit_core::MAX_CHANNELS)]
    InvalidChannels(usize),

    /// Chain gain outside the accepted range.
    #[error("chain gain {0} outside 0..=2")]
    InvalidGain(f32),

    /// `apply` was called on a chain with no nodes.
    #[error("chain has no nodes")]
    Empty,

    /// A buffer or frame count argument was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// No node at this index.
    #[error("node index {index} out of range (chain has {len} nodes)")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Current node count.
        len: usize,
    },

    /// The registry refused to construct an effect.
    #[error(transparent)]
    Effect(#[from] EffectError),
}

impl ChainError {
    /// POSIX-style negative error code for this error.
    pub fn errno(&self) -> i32 {
        match self {
            ChainError::IndexOutOfRange { .. } => -libc::ENOENT,
            ChainError::Effect(e) => e.errno(),
            ChainError::InvalidSampleRate(_)
            | ChainError::InvalidChannels(_)
            | ChainError::InvalidGain(_)
            | ChainError::Empty
            | ChainError::InvalidArgument(_) => -libc::EINVAL,
        }
    }
}
