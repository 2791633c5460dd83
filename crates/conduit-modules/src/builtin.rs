//! In-process modules, opened by `builtin:<name>` paths.

use crate::{Module, ModuleError, ModuleKind, ModuleMetadata, PluginLoader};
use conduit_chain::{ChainError, ProcessingChain};
use conduit_core::{AudioFormat, SampleFormat, SampleVec};
use conduit_registry::ProcessingParams;
use std::collections::BTreeMap;
use std::path::Path;

/// Path prefix selecting the static backend.
pub const BUILTIN_PREFIX: &str = "builtin:";

/// Constructor for a built-in module.
pub type ModuleFactory = fn() -> Box<dyn Module>;

/// Opens modules compiled into the binary.
#[derive(Debug, Clone)]
pub struct StaticLoader {
    factories: BTreeMap<String, ModuleFactory>,
}

impl StaticLoader {
    /// A loader with no modules.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A loader with the modules shipped in this crate (`builtin:chain`).
    pub fn new() -> Self {
        let mut loader = Self::empty();
        loader.register("chain", || Box::new(ChainModule::new()));
        loader
    }

    /// Register `factory` under `builtin:<name>`, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, factory: ModuleFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Registered names, without the prefix.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl Default for StaticLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginLoader for StaticLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn Module>, ModuleError> {
        let load_failed = |reason: &str| ModuleError::LoadFailed {
            path: path.display().to_string(),
            reason: reason.to_owned(),
        };
        let name = path
            .to_str()
            .and_then(|p| p.strip_prefix(BUILTIN_PREFIX))
            .ok_or_else(|| load_failed("not a builtin: path"))?;
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| load_failed("no such builtin module"))?;
        Ok(factory())
    }
}

const DEFAULT_SAMPLE_RATE: u32 = 48000;
const DEFAULT_CHANNELS: usize = 2;

/// Audio-processing module running a [`ProcessingChain`].
///
/// `init` takes `;`-separated `key=value` pairs:
///
/// | Key           | Value                                          | Default |
/// |---------------|------------------------------------------------|---------|
/// | `sample_rate` | Hz                                             | 48000   |
/// | `channels`    | interleaved channel count                      | 2       |
/// | `effect`      | node, e.g. `compressor:threshold=-18,ratio=4`; repeatable | none |
/// | `gain`        | explicit chain gain, 0 to 2                    | first node's |
///
/// Runtime parameters are `gain` and `bypass`. A chain with no effects
/// passes audio through.
pub struct ChainModule {
    metadata: ModuleMetadata,
    chain: Option<ProcessingChain>,
    bypass: bool,
    input: SampleVec,
    output: SampleVec,
}

impl ChainModule {
    /// An uninitialized chain module.
    pub fn new() -> Self {
        Self {
            metadata: ModuleMetadata {
                id: "chain".into(),
                name: "Effect chain".into(),
                description: "Runs audio through a chain of built-in effects".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                kind: ModuleKind::AudioProcessing,
            },
            chain: None,
            bypass: false,
            input: SampleVec::with_capacity(SampleFormat::F32, 0),
            output: SampleVec::with_capacity(SampleFormat::F32, 0),
        }
    }

    /// The running chain, once initialized.
    pub fn chain(&self) -> Option<&ProcessingChain> {
        self.chain.as_ref()
    }

    fn build(config: &str) -> Result<ProcessingChain, ModuleError> {
        let invalid = |key: &str, value: &str| ModuleError::InvalidParameter {
            key: key.to_owned(),
            value: value.to_owned(),
        };
        let mut sample_rate = DEFAULT_SAMPLE_RATE;
        let mut channels = DEFAULT_CHANNELS;
        let mut gain = None;
        let mut effects = Vec::new();

        for pair in config.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| invalid(pair, ""))?;
            let (key, value) = (key.trim(), value.trim());
            match key {
                "sample_rate" => sample_rate = value.parse().map_err(|_| invalid(key, value))?,
                "channels" => channels = value.parse().map_err(|_| invalid(key, value))?,
                "gain" => gain = Some(value.parse().map_err(|_| invalid(key, value))?),
                "effect" => effects.push(
                    value
                        .parse::<ProcessingParams>()
                        .map_err(ChainError::from)?,
                ),
                _ => return Err(invalid(key, value)),
            }
        }

        let mut chain = ProcessingChain::new(sample_rate, channels)?;
        chain.set_gain(gain)?;
        for params in effects {
            chain.add_node(params)?;
        }
        Ok(chain)
    }
}

impl Default for ChainModule {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for ChainModule {
    fn metadata(&self) -> &ModuleMetadata {
        &self.metadata
    }

    fn init(&mut self, config: &str) -> Result<(), ModuleError> {
        let chain = Self::build(config)?;
        tracing::debug!(
            sample_rate = chain.sample_rate(),
            channels = chain.channels(),
            nodes = chain.len(),
            "modules: chain module initialized"
        );
        self.chain = Some(chain);
        self.bypass = false;
        Ok(())
    }

    fn deinit(&mut self) {
        self.chain = None;
    }

    fn process_audio(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        format: &AudioFormat,
    ) -> Result<usize, ModuleError> {
        let chain = self
            .chain
            .as_mut()
            .ok_or_else(|| ModuleError::Inactive(self.metadata.id.clone()))?;
        let sample_format = format
            .sample_format()
            .ok_or(ModuleError::InvalidArgument("unsupported bit depth"))?;
        if usize::from(format.channels) != chain.channels() {
            return Err(ModuleError::InvalidArgument("channel count differs from chain"));
        }
        let frame_bytes = sample_format.bytes_per_sample() * chain.channels();
        if input.len() % frame_bytes != 0 {
            return Err(ModuleError::InvalidArgument("input is not whole frames"));
        }
        if output.len() < input.len() {
            return Err(ModuleError::InvalidArgument("output shorter than input"));
        }

        if self.bypass || chain.is_empty() {
            output[..input.len()].copy_from_slice(input);
            return Ok(input.len());
        }

        let frames = input.len() / frame_bytes;
        self.input.decode_le(sample_format, input);
        let len = self.input.len();
        chain.apply(
            self.input.as_samples(),
            self.output.prepare(sample_format, len),
            frames,
        )?;
        Ok(self.output.encode_le(output))
    }

    fn is_active(&self) -> bool {
        self.chain.is_some()
    }

    fn set_parameter(&mut self, key: &str, value: &str) -> Result<(), ModuleError> {
        let invalid = || ModuleError::InvalidParameter {
            key: key.to_owned(),
            value: value.to_owned(),
        };
        match key {
            "bypass" => {
                self.bypass = match value {
                    "1" | "true" | "on" => true,
                    "0" | "false" | "off" => false,
                    _ => return Err(invalid()),
                };
            }
            "gain" => {
                let chain = self
                    .chain
                    .as_mut()
                    .ok_or_else(|| ModuleError::Inactive(self.metadata.id.clone()))?;
                let gain = value.parse::<f32>().map_err(|_| invalid())?;
                chain.set_gain(Some(gain)).map_err(|_| invalid())?;
            }
            _ => return Err(invalid()),
        }
        Ok(())
    }

    fn get_parameter(&self, key: &str) -> Option<String> {
        match key {
            "bypass" => Some(self.bypass.to_string()),
            "gain" => self.chain.as_ref().map(|c| c.gain().to_string()),
            "sample_rate" => self.chain.as_ref().map(|c| c.sample_rate().to_string()),
            "channels" => self.chain.as_ref().map(|c| c.channels().to_string()),
            "effects" => self.chain.as_ref().map(|c| {
                c.nodes()
                    .map(|n| n.kind().id())
                    .collect::<Vec<_>>()
                    .join(",")
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(bit_depth: u16) -> AudioFormat {
        AudioFormat {
            sample_rate: 48000,
            channels: 2,
            bit_depth,
            buffer_size: 4,
        }
    }

    fn i16_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn test_static_loader_opens_builtin_chain() {
        let loader = StaticLoader::new();
        assert_eq!(loader.names().collect::<Vec<_>>(), ["chain"]);
        let module = loader.open(Path::new("builtin:chain")).unwrap();
        assert_eq!(module.metadata().id, "chain");
        assert_eq!(module.metadata().kind, ModuleKind::AudioProcessing);
        assert!(!module.is_active());
    }

    #[test]
    fn test_static_loader_rejects_unknown() {
        let loader = StaticLoader::new();
        assert!(matches!(
            loader.open(Path::new("builtin:nope")).err(),
            Some(ModuleError::LoadFailed { .. })
        ));
        assert!(loader.open(Path::new("/usr/lib/libchain.so")).is_err());
    }

    #[test]
    fn test_init_parses_config() {
        let mut module = ChainModule::new();
        module
            .init("sample_rate=44100; channels=1; effect=compressor:threshold=-24,ratio=2; effect=reverb; gain=0.8")
            .unwrap();
        let chain = module.chain().unwrap();
        assert_eq!(chain.sample_rate(), 44100);
        assert_eq!(chain.channels(), 1);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.node(0).unwrap().params().get("ratio"), Some(2.0));
        assert_eq!(module.get_parameter("effects").as_deref(), Some("compressor,reverb"));
        assert_eq!(module.get_parameter("gain").as_deref(), Some("0.8"));
    }

    #[test]
    fn test_init_rejects_bad_config() {
        let mut module = ChainModule::new();
        assert!(module.init("channels=two").is_err());
        assert!(module.init("effect=flanger").is_err());
        assert!(module.init("color=blue").is_err());
        assert!(module.init("channels=12").is_err());
        assert!(!module.is_active());
    }

    #[test]
    fn test_processes_i16_bytes() {
        let mut module = ChainModule::new();
        module.init("effect=equalizer; gain=0.5").unwrap();

        let input = i16_bytes(&[1000, -1000, 2000, -2000]);
        let mut output = vec![0u8; input.len()];
        let written = module.process_audio(&input, &mut output, &format(16)).unwrap();
        assert_eq!(written, input.len());
        let first = i16::from_le_bytes([output[0], output[1]]);
        assert!((i32::from(first) - 500).abs() <= 1);
    }

    #[test]
    fn test_bypass_copies_input() {
        let mut module = ChainModule::new();
        module.init("effect=distortion:drive=1").unwrap();
        module.set_parameter("bypass", "on").unwrap();

        let input = i16_bytes(&[123, 456, 789, 1011]);
        let mut output = vec![0u8; input.len()];
        module.process_audio(&input, &mut output, &format(16)).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_inactive_and_malformed_calls() {
        let mut module = ChainModule::new();
        let mut out = [0u8; 8];
        assert!(matches!(
            module.process_audio(&[0; 8], &mut out, &format(16)),
            Err(ModuleError::Inactive(_))
        ));
        module.init("").unwrap();
        assert!(module.process_audio(&[0; 8], &mut out, &format(24)).is_err());
        assert!(module.process_audio(&[0; 7], &mut out, &format(16)).is_err());
        assert!(module.set_parameter("gain", "3.0").is_err());
        assert!(module.set_parameter("colour", "1").is_err());
        module.deinit();
        assert!(!module.is_active());
    }
}
