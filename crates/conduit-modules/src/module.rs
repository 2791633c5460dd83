//! The module contract.

use crate::ModuleError;
use conduit_core::AudioFormat;
use std::fmt;

/// What a module does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    /// Produces audio from a device or stream.
    AudioInput,
    /// Consumes audio into a device or stream.
    AudioOutput,
    /// Transforms audio.
    AudioProcessing,
    /// Moves audio over a network.
    NetworkService,
    /// Control surface.
    Control,
    /// Anything else.
    Other,
}

impl ModuleKind {
    /// All kinds, in ABI order.
    pub const ALL: [ModuleKind; 6] = [
        ModuleKind::AudioInput,
        ModuleKind::AudioOutput,
        ModuleKind::AudioProcessing,
        ModuleKind::NetworkService,
        ModuleKind::Control,
        ModuleKind::Other,
    ];

    /// Decodes the ABI value.
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    /// The ABI value.
    pub fn as_raw(self) -> u32 {
        self as u32
    }

    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            ModuleKind::AudioInput => "audio_input",
            ModuleKind::AudioOutput => "audio_output",
            ModuleKind::AudioProcessing => "audio_processing",
            ModuleKind::NetworkService => "network_service",
            ModuleKind::Control => "control",
            ModuleKind::Other => "other",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMetadata {
    /// Unique identifier; at most one loaded module per id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Module version string.
    pub version: String,
    /// Capability type.
    pub kind: ModuleKind,
}

/// A loadable audio module.
///
/// Buffers crossing this interface are raw little-endian bytes in the sample
/// format implied by [`AudioFormat::bit_depth`].
pub trait Module: Send {
    /// Identity of this module.
    fn metadata(&self) -> &ModuleMetadata;

    /// Initialize from a backend-specific configuration string.
    fn init(&mut self, config: &str) -> Result<(), ModuleError>;

    /// Release everything `init` acquired. Called once before the module is dropped.
    fn deinit(&mut self);

    /// Process `input` into `output`, returning the number of bytes written.
    fn process_audio(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        format: &AudioFormat,
    ) -> Result<usize, ModuleError>;

    /// Whether the module is initialized and ready to process.
    fn is_active(&self) -> bool;

    /// Set a named parameter.
    fn set_parameter(&mut self, key: &str, value: &str) -> Result<(), ModuleError>;

    /// Read a named parameter.
    fn get_parameter(&self, key: &str) -> Option<String>;
}
