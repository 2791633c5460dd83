//! Serializable chain descriptions.
//!
//! A [`ChainSpec`] is the value form of a [`ProcessingChain`]: everything
//! needed to rebuild it, with no effect state. Building a spec constructs a
//! fresh effect instance per node in order, so two chains built from the
//! same spec never share state.

use crate::chain::builtin_registry;
use crate::{ChainError, DEFAULT_BLOCK_FRAMES, ProcessingChain};
use conduit_core::{MAX_CHANNELS, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE};
use conduit_registry::{EffectRegistry, GAIN, ProcessingParams};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

fn default_enabled() -> bool {
    true
}

/// One node of a [`ChainSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Effect parameters (including the effect kind).
    #[serde(flatten)]
    pub params: ProcessingParams,
    /// Whether the node processes audio.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl From<ProcessingParams> for NodeSpec {
    fn from(params: ProcessingParams) -> Self {
        Self {
            params,
            enabled: true,
        }
    }
}

/// Description of a processing chain.
///
/// # Example
///
/// ```rust
/// use conduit_chain::ChainSpec;
/// use conduit_registry::{EffectKind, ProcessingParams};
///
/// let spec = ChainSpec::new(48000, 2)
///     .with_node(ProcessingParams::defaults(EffectKind::Compressor))
///     .with_node(ProcessingParams::defaults(EffectKind::Reverb));
/// let chain = spec.build().unwrap();
/// assert_eq!(chain.len(), 2);
/// assert_eq!(chain.spec(), spec);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSpec {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: usize,
    /// Explicit chain gain; the first node's gain is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain: Option<f32>,
    /// Nodes in processing order.
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

impl ChainSpec {
    /// An empty chain description.
    pub fn new(sample_rate: u32, channels: usize) -> Self {
        Self {
            sample_rate,
            channels,
            gain: None,
            nodes: Vec::new(),
        }
    }

    /// Append an enabled node.
    pub fn with_node(mut self, params: ProcessingParams) -> Self {
        self.nodes.push(params.into());
        self
    }

    /// Set the explicit chain gain.
    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = Some(gain);
        self
    }

    /// Check the format, gain and every node's parameters without building.
    pub fn validate(&self) -> Result<(), ChainError> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            return Err(ChainError::InvalidSampleRate(self.sample_rate));
        }
        if !(1..=MAX_CHANNELS).contains(&self.channels) {
            return Err(ChainError::InvalidChannels(self.channels));
        }
        if let Some(gain) = self.gain
            && !GAIN.accepts(gain)
        {
            return Err(ChainError::InvalidGain(gain));
        }
        for node in &self.nodes {
            node.params.validate()?;
        }
        Ok(())
    }

    /// Build a chain with the built-in registry and default block size.
    pub fn build(&self) -> Result<ProcessingChain, ChainError> {
        self.build_with(builtin_registry(), DEFAULT_BLOCK_FRAMES)
    }

    /// Build a chain with the given registry and block size.
    pub fn build_with(
        &self,
        registry: Arc<EffectRegistry>,
        block_frames: usize,
    ) -> Result<ProcessingChain, ChainError> {
        let mut chain =
            ProcessingChain::with_registry(self.sample_rate, self.channels, block_frames, registry)?;
        chain.set_gain(self.gain)?;
        for (index, node) in self.nodes.iter().enumerate() {
            chain.add_node(node.params)?;
            if !node.enabled {
                chain.set_node_enabled(index, false)?;
            }
        }
        Ok(chain)
    }
}
