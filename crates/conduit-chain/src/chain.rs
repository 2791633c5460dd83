//! The processing chain.

use crate::{ChainError, ChainSpec, NodeSpec};
use conduit_core::{
    BufferPool, Effect, MAX_CHANNELS, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE, Samples, SamplesMut,
    from_f32, hard_clip, to_f32,
};
use conduit_registry::{EffectKind, EffectRegistry, GAIN, ProcessingParams};
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Frames processed per pass through the node list when no block size is given.
pub const DEFAULT_BLOCK_FRAMES: usize = 4096;

static BUILTIN_REGISTRY: LazyLock<Arc<EffectRegistry>> =
    LazyLock::new(|| Arc::new(EffectRegistry::builtin()));

/// Shared handle to the registry holding every built-in effect.
pub fn builtin_registry() -> Arc<EffectRegistry> {
    Arc::clone(&BUILTIN_REGISTRY)
}

/// One effect instance in a chain together with the parameters it was built from.
pub struct ProcessingNode {
    params: ProcessingParams,
    enabled: bool,
    effect: Box<dyn Effect + Send>,
}

impl ProcessingNode {
    /// Parameter snapshot the effect was constructed from.
    pub fn params(&self) -> &ProcessingParams {
        &self.params
    }

    /// Effect kind of this node.
    pub fn kind(&self) -> EffectKind {
        self.params.kind()
    }

    /// Whether the node takes part in processing.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Latency reported by the effect, in frames.
    pub fn latency_samples(&self) -> usize {
        self.effect.latency_samples()
    }
}

impl fmt::Debug for ProcessingNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessingNode")
            .field("params", &self.params)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Ordered sequence of effects sharing one sample rate and channel count.
///
/// Audio is converted from its wire format into a float scratch buffer,
/// ping-ponged between the two scratch buffers through every enabled node,
/// scaled by the chain gain, clamped to [-1.0, 1.0] and converted back.
/// Both scratch buffers are allocated at construction, so
/// [`apply`](Self::apply) never allocates: inputs longer than the block size
/// are processed in consecutive block-sized slices with effect state carried
/// across slices.
///
/// # Example
///
/// ```rust
/// use conduit_chain::ProcessingChain;
/// use conduit_core::{Samples, SamplesMut};
/// use conduit_registry::{EffectKind, ProcessingParams};
///
/// let mut chain = ProcessingChain::new(48000, 2).unwrap();
/// chain.add_node(ProcessingParams::defaults(EffectKind::Compressor)).unwrap();
///
/// let input = vec![0i16; 512];
/// let mut output = vec![0i16; 512];
/// let frames = chain
///     .apply(Samples::I16(&input), SamplesMut::I16(&mut output), 256)
///     .unwrap();
/// assert_eq!(frames, 256);
/// ```
pub struct ProcessingChain {
    sample_rate: u32,
    channels: usize,
    nodes: Vec<ProcessingNode>,
    gain: Option<f32>,
    registry: Arc<EffectRegistry>,
    pool: BufferPool,
}

impl ProcessingChain {
    /// Create an empty chain with the built-in registry and default block size.
    pub fn new(sample_rate: u32, channels: usize) -> Result<Self, ChainError> {
        Self::with_block_size(sample_rate, channels, DEFAULT_BLOCK_FRAMES)
    }

    /// Create an empty chain whose scratch buffers hold `block_frames` frames.
    pub fn with_block_size(
        sample_rate: u32,
        channels: usize,
        block_frames: usize,
    ) -> Result<Self, ChainError> {
        Self::with_registry(sample_rate, channels, block_frames, builtin_registry())
    }

    /// Create an empty chain that constructs effects through `registry`.
    pub fn with_registry(
        sample_rate: u32,
        channels: usize,
        block_frames: usize,
        registry: Arc<EffectRegistry>,
    ) -> Result<Self, ChainError> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
            return Err(ChainError::InvalidSampleRate(sample_rate));
        }
        if !(1..=MAX_CHANNELS).contains(&channels) {
            return Err(ChainError::InvalidChannels(channels));
        }
        if block_frames == 0 {
            return Err(ChainError::InvalidArgument("block size must be at least one frame"));
        }
        Ok(Self {
            sample_rate,
            channels,
            nodes: Vec::new(),
            gain: None,
            registry,
            pool: BufferPool::new(2, block_frames * channels),
        })
    }

    /// Sample rate every node was built for.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Interleaved channel count.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Frames processed per pass through the node list.
    pub fn block_frames(&self) -> usize {
        self.pool.block_size() / self.channels
    }

    /// Registry used to construct nodes.
    pub fn registry(&self) -> &Arc<EffectRegistry> {
        &self.registry
    }

    fn build_node(&self, params: ProcessingParams) -> Result<ProcessingNode, ChainError> {
        let effect = self
            .registry
            .create(&params, self.sample_rate as f32, self.channels)?;
        Ok(ProcessingNode {
            params,
            enabled: true,
            effect,
        })
    }

    fn check_index(&self, index: usize) -> Result<(), ChainError> {
        if index < self.nodes.len() {
            Ok(())
        } else {
            Err(ChainError::IndexOutOfRange {
                index,
                len: self.nodes.len(),
            })
        }
    }

    /// Append a node built from `params`. Returns its index.
    pub fn add_node(&mut self, params: ProcessingParams) -> Result<usize, ChainError> {
        let node = self.build_node(params)?;
        self.nodes.push(node);
        tracing::debug!(effect = %params.kind(), nodes = self.nodes.len(), "chain: node added");
        Ok(self.nodes.len() - 1)
    }

    /// Insert a node before `index` (`index == len()` appends).
    pub fn insert_node(&mut self, index: usize, params: ProcessingParams) -> Result<(), ChainError> {
        if index > self.nodes.len() {
            return Err(ChainError::IndexOutOfRange {
                index,
                len: self.nodes.len(),
            });
        }
        let node = self.build_node(params)?;
        self.nodes.insert(index, node);
        tracing::debug!(effect = %params.kind(), index, "chain: node inserted");
        Ok(())
    }

    /// Remove the node at `index`, returning its parameters.
    pub fn remove_node(&mut self, index: usize) -> Result<ProcessingParams, ChainError> {
        self.check_index(index)?;
        let node = self.nodes.remove(index);
        tracing::debug!(effect = %node.kind(), index, "chain: node removed");
        Ok(node.params)
    }

    /// Node at `index`.
    pub fn node(&self, index: usize) -> Option<&ProcessingNode> {
        self.nodes.get(index)
    }

    /// Iterate over the nodes in processing order.
    pub fn nodes(&self) -> impl Iterator<Item = &ProcessingNode> {
        self.nodes.iter()
    }

    /// Enable or bypass the node at `index`.
    pub fn set_node_enabled(&mut self, index: usize, enabled: bool) -> Result<(), ChainError> {
        self.check_index(index)?;
        self.nodes[index].enabled = enabled;
        Ok(())
    }

    /// Replace the parameters of the node at `index`, rebuilding its effect.
    ///
    /// The old instance is kept if the new parameters are rejected.
    pub fn update_node_params(
        &mut self,
        index: usize,
        params: ProcessingParams,
    ) -> Result<(), ChainError> {
        self.check_index(index)?;
        let mut node = self.build_node(params)?;
        node.enabled = self.nodes[index].enabled;
        self.nodes[index] = node;
        Ok(())
    }

    /// Remove every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Number of nodes, enabled or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the chain has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Clear the state of every effect and the scratch buffers.
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.effect.reset();
        }
        self.pool.clear_all();
    }

    /// Total latency of the enabled nodes, in frames.
    pub fn latency_samples(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.enabled)
            .map(ProcessingNode::latency_samples)
            .sum()
    }

    /// Gain applied after the last node.
    ///
    /// An explicit chain gain takes precedence; otherwise the first node's
    /// `gain` parameter is used, and an empty chain has unity gain.
    pub fn gain(&self) -> f32 {
        self.gain
            .or_else(|| self.nodes.first().map(|n| n.params.gain))
            .unwrap_or(GAIN.default)
    }

    /// Explicit chain gain, if one was set.
    pub fn explicit_gain(&self) -> Option<f32> {
        self.gain
    }

    /// Set (or with `None`, clear) the explicit chain gain.
    pub fn set_gain(&mut self, gain: Option<f32>) -> Result<(), ChainError> {
        if let Some(g) = gain
            && !GAIN.accepts(g)
        {
            return Err(ChainError::InvalidGain(g));
        }
        self.gain = gain;
        Ok(())
    }

    /// Process `frame_count` frames from `input` into `output`.
    ///
    /// Both buffers must share a sample format and hold at least
    /// `frame_count * channels()` samples. Returns the number of frames
    /// processed.
    pub fn apply(
        &mut self,
        input: Samples<'_>,
        mut output: SamplesMut<'_>,
        frame_count: usize,
    ) -> Result<usize, ChainError> {
        let total = self.check_apply(frame_count)?;
        if input.format() != output.format() {
            return Err(ChainError::InvalidArgument("input and output formats differ"));
        }
        if input.len() < total || output.len() < total {
            return Err(ChainError::InvalidArgument("buffer shorter than frame count"));
        }

        let block = self.pool.block_size();
        let mut start = 0;
        while start < total {
            let end = (start + block).min(total);
            let n = end - start;
            if let (Some(src), Some(dst)) = (input.get(start..end), output.get_mut(start..end)) {
                to_f32(src, &mut self.pool.get_mut(0)[..n]);
                let slot = self.run_nodes(n);
                from_f32(&self.pool.get(slot)[..n], dst);
            }
            start = end;
        }
        Ok(frame_count)
    }

    /// Process a float buffer in place. Returns the number of frames processed.
    ///
    /// Trailing samples that do not form a whole frame are left untouched.
    pub fn apply_f32_in_place(&mut self, buffer: &mut [f32]) -> Result<usize, ChainError> {
        let frame_count = buffer.len() / self.channels;
        let total = self.check_apply(frame_count)?;

        let block = self.pool.block_size();
        for chunk in buffer[..total].chunks_mut(block) {
            let n = chunk.len();
            self.pool.get_mut(0)[..n].copy_from_slice(chunk);
            let slot = self.run_nodes(n);
            chunk.copy_from_slice(&self.pool.get(slot)[..n]);
        }
        Ok(frame_count)
    }

    fn check_apply(&self, frame_count: usize) -> Result<usize, ChainError> {
        if self.nodes.is_empty() {
            tracing::warn!("chain: apply on empty chain");
            return Err(ChainError::Empty);
        }
        if frame_count == 0 {
            return Err(ChainError::InvalidArgument("frame count must be non-zero"));
        }
        frame_count
            .checked_mul(self.channels)
            .ok_or(ChainError::InvalidArgument("frame count overflows"))
    }

    /// Run the first `n` samples of slot 0 through every enabled node.
    /// Returns the slot holding the gained, clamped result.
    fn run_nodes(&mut self, n: usize) -> usize {
        let gain = self.gain();
        let mut current = 0;
        for node in self.nodes.iter_mut().filter(|node| node.enabled) {
            let (src, dst) = self.pool.pair_mut(current, 1 - current);
            node.effect.process_block(&src[..n], &mut dst[..n]);
            current = 1 - current;
        }
        for sample in &mut self.pool.get_mut(current)[..n] {
            *sample = hard_clip(*sample * gain);
        }
        current
    }

    /// Snapshot of the chain's configuration.
    pub fn spec(&self) -> ChainSpec {
        ChainSpec {
            sample_rate: self.sample_rate,
            channels: self.channels,
            gain: self.gain,
            nodes: self
                .nodes
                .iter()
                .map(|n| NodeSpec {
                    params: n.params,
                    enabled: n.enabled,
                })
                .collect(),
        }
    }

    /// Deep copy: a new chain with freshly constructed effects, same
    /// parameters, enable flags, gain, registry and block size.
    pub fn duplicate(&self) -> Result<Self, ChainError> {
        self.spec()
            .build_with(Arc::clone(&self.registry), self.block_frames())
    }
}

impl fmt::Debug for ProcessingChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessingChain")
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .field("block_frames", &self.block_frames())
            .field("gain", &self.gain)
            .field("nodes", &self.nodes)
            .finish_non_exhaustive()
    }
}
