//! Effect registry and factory for conduit processing chains.
//!
//! This crate maps every [`EffectKind`] to a factory that builds a configured
//! effect instance for a given sample rate and channel count, and carries the
//! parameter model ([`ProcessingParams`]) stored in chain nodes.
//!
//! # Features
//!
//! - **Effect Discovery**: List all available effects with metadata
//! - **Factory Pattern**: Create configured effects from a parameter snapshot
//! - **Category System**: Effects organized by type (dynamics, modulation, etc.)
//! - **Parameter Info**: Ranges and defaults for every named parameter
//!
//! # Example
//!
//! ```rust
//! use conduit_core::Effect;
//! use conduit_registry::{EffectCategory, EffectKind, EffectRegistry, ProcessingParams};
//!
//! let registry = EffectRegistry::builtin();
//!
//! for effect in registry.all_effects() {
//!     println!("{}: {}", effect.name, effect.description);
//! }
//!
//! let params = ProcessingParams::defaults(EffectKind::Distortion);
//! let mut distortion = registry.create(&params, 48000.0, 2).unwrap();
//! let mut out = [0.0f32; 2];
//! distortion.process_block(&[0.5, -0.5], &mut out);
//!
//! assert_eq!(registry.effects_in_category(EffectCategory::Modulation).len(), 1);
//! ```
//!
//! A registry built with [`EffectRegistry::with_kinds`] only knows a subset of
//! the kinds; asking it for anything else fails with
//! [`EffectError::Unregistered`].

mod error;
mod kind;
mod params;

pub use error::EffectError;
pub use kind::{EffectCategory, EffectKind};
pub use params::{
    ChorusSettings, CompressorSettings, DistortionSettings, EQ_BANDS, EffectSettings,
    EqualizerSettings, GAIN, ParamDescriptor, ParamUnit, PitchShiftSettings, ProcessingParams,
    ReverbSettings,
};

use conduit_core::Effect;
use conduit_effects::{Chorus, Compressor, Distortion, Equalizer, PitchShift, Reverb};

/// Describes an effect in the registry.
#[derive(Debug, Clone)]
pub struct EffectDescriptor {
    /// Kind this entry builds.
    pub kind: EffectKind,
    /// Unique identifier for the effect (lowercase, no spaces).
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Brief description of the effect.
    pub description: &'static str,
    /// Category for organization.
    pub category: EffectCategory,
    /// Parameter descriptors (excluding the shared gain).
    pub params: &'static [ParamDescriptor],
}

/// Factory function type for creating effects.
///
/// Receives settings whose kind matches the entry it is registered under.
type EffectFactory = fn(&EffectSettings, f32, usize) -> Box<dyn Effect + Send>;

/// Internal entry in the registry.
struct RegistryEntry {
    descriptor: EffectDescriptor,
    factory: EffectFactory,
}

/// Registry of available audio effects.
///
/// Construction is the only fallible step of an effect's life: the returned
/// instance is destroyed by dropping it and processes blocks through
/// [`Effect::process_block`].
pub struct EffectRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl EffectRegistry {
    /// Create a registry with all built-in effects registered.
    pub fn builtin() -> Self {
        Self::with_kinds(&EffectKind::ALL)
    }

    /// Create a registry holding only the given kinds.
    pub fn with_kinds(kinds: &[EffectKind]) -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(kinds.len()),
        };
        for &kind in kinds {
            if registry.get(kind).is_none() {
                registry.register_builtin(kind);
            }
        }
        registry
    }

    /// Register the built-in implementation of `kind`.
    fn register_builtin(&mut self, kind: EffectKind) {
        match kind {
            EffectKind::Equalizer => self.register(
                EffectDescriptor {
                    kind,
                    id: kind.id(),
                    name: "Equalizer",
                    description: "10-band graphic equalizer applying the mean band gain",
                    category: kind.category(),
                    params: kind.params(),
                },
                |settings, _sr, channels| {
                    let mut eq = Equalizer::new(channels);
                    if let EffectSettings::Equalizer(s) = settings {
                        eq.set_band_gains_db(&s.bands);
                    }
                    Box::new(eq)
                },
            ),
            EffectKind::Compressor => self.register(
                EffectDescriptor {
                    kind,
                    id: kind.id(),
                    name: "Compressor",
                    description: "Feed-forward compressor with dB-domain envelope",
                    category: kind.category(),
                    params: kind.params(),
                },
                |settings, sr, channels| {
                    let mut comp = Compressor::new(sr, channels);
                    if let EffectSettings::Compressor(s) = settings {
                        comp.set_threshold_db(s.threshold);
                        comp.set_ratio(s.ratio);
                        comp.set_attack_ms(s.attack);
                        comp.set_release_ms(s.release);
                    }
                    Box::new(comp)
                },
            ),
            EffectKind::Reverb => self.register(
                EffectDescriptor {
                    kind,
                    id: kind.id(),
                    name: "Reverb",
                    description: "Single feedback delay line reverb",
                    category: kind.category(),
                    params: kind.params(),
                },
                |settings, sr, channels| {
                    let mut reverb = Reverb::new(sr, channels);
                    if let EffectSettings::Reverb(s) = settings {
                        reverb.set_room_size(s.room_size);
                        reverb.set_damping(s.damp);
                        reverb.set_wet(s.wet);
                        reverb.set_dry(s.dry);
                    }
                    Box::new(reverb)
                },
            ),
            EffectKind::Distortion => self.register(
                EffectDescriptor {
                    kind,
                    id: kind.id(),
                    name: "Distortion",
                    description: "tanh waveshaper with tone low-pass",
                    category: kind.category(),
                    params: kind.params(),
                },
                |settings, sr, channels| {
                    let mut dist = Distortion::new(sr, channels);
                    if let EffectSettings::Distortion(s) = settings {
                        dist.set_drive(s.drive);
                        dist.set_tone(s.tone);
                    }
                    Box::new(dist)
                },
            ),
            EffectKind::Chorus => self.register(
                EffectDescriptor {
                    kind,
                    id: kind.id(),
                    name: "Chorus",
                    description: "LFO-modulated delay chorus with feedback",
                    category: kind.category(),
                    params: kind.params(),
                },
                |settings, sr, channels| {
                    let mut chorus = Chorus::new(sr, channels);
                    if let EffectSettings::Chorus(s) = settings {
                        chorus.set_rate(s.rate);
                        chorus.set_depth(s.depth);
                        chorus.set_feedback(s.feedback);
                    }
                    Box::new(chorus)
                },
            ),
            EffectKind::PitchShift => self.register(
                EffectDescriptor {
                    kind,
                    id: kind.id(),
                    name: "Pitch Shift",
                    description: "Two-tap crossfaded delay-line pitch shifter",
                    category: kind.category(),
                    params: kind.params(),
                },
                |settings, sr, channels| {
                    let mut shifter = PitchShift::new(sr, channels);
                    if let EffectSettings::PitchShift(s) = settings {
                        shifter.set_semitones(s.semitones);
                    }
                    Box::new(shifter)
                },
            ),
        }
    }

    /// Register an effect with the registry.
    fn register(&mut self, descriptor: EffectDescriptor, factory: EffectFactory) {
        self.entries.push(RegistryEntry {
            descriptor,
            factory,
        });
    }

    /// Returns descriptors for all registered effects.
    pub fn all_effects(&self) -> Vec<&EffectDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    /// Returns descriptors for effects in a specific category.
    pub fn effects_in_category(&self, category: EffectCategory) -> Vec<&EffectDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.descriptor.category == category)
            .map(|e| &e.descriptor)
            .collect()
    }

    /// Get a descriptor by kind.
    pub fn get(&self, kind: EffectKind) -> Option<&EffectDescriptor> {
        self.entries
            .iter()
            .find(|e| e.descriptor.kind == kind)
            .map(|e| &e.descriptor)
    }

    /// Get a descriptor by effect ID.
    pub fn get_by_id(&self, id: &str) -> Option<&EffectDescriptor> {
        self.entries
            .iter()
            .find(|e| e.descriptor.id == id)
            .map(|e| &e.descriptor)
    }

    /// Returns true if `kind` can be constructed by this registry.
    pub fn contains(&self, kind: EffectKind) -> bool {
        self.get(kind).is_some()
    }

    /// Create a configured effect instance.
    ///
    /// The parameters are validated first; nothing is constructed if any
    /// value is out of range. The shared `gain` is not part of the effect and
    /// is applied by the owning chain.
    pub fn create(
        &self,
        params: &ProcessingParams,
        sample_rate: f32,
        channels: usize,
    ) -> Result<Box<dyn Effect + Send>, EffectError> {
        let kind = params.kind();
        let entry = self
            .entries
            .iter()
            .find(|e| e.descriptor.kind == kind)
            .ok_or(EffectError::Unregistered(kind))?;
        params.validate()?;
        tracing::debug!(effect = %kind, sample_rate, channels, "creating effect");
        Ok((entry.factory)(&params.settings, sample_rate, channels))
    }

    /// Returns the number of registered effects.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no effects are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_all_kinds() {
        let registry = EffectRegistry::builtin();
        assert_eq!(registry.len(), EffectKind::ALL.len());
        for kind in EffectKind::ALL {
            let desc = registry.get(kind).unwrap();
            assert_eq!(desc.id, kind.id());
            assert_eq!(desc.category, kind.category());
        }
    }

    #[test]
    fn test_get_by_id() {
        let registry = EffectRegistry::builtin();
        let desc = registry.get_by_id("pitch_shift").unwrap();
        assert_eq!(desc.kind, EffectKind::PitchShift);
        assert_eq!(desc.name, "Pitch Shift");
        assert!(registry.get_by_id("nonexistent").is_none());
    }

    #[test]
    fn test_create_every_kind() {
        let registry = EffectRegistry::builtin();
        for kind in EffectKind::ALL {
            let mut effect = registry
                .create(&ProcessingParams::defaults(kind), 48000.0, 2)
                .unwrap();
            let input = [0.25f32; 64];
            let mut output = [0.0f32; 64];
            effect.process_block(&input, &mut output);
            assert!(output.iter().all(|s| s.is_finite()), "{kind} produced NaN");
        }
    }

    #[test]
    fn test_restricted_registry_rejects_missing_kind() {
        let registry = EffectRegistry::with_kinds(&[EffectKind::Compressor, EffectKind::Reverb]);
        assert_eq!(registry.len(), 2);
        assert!(!registry.contains(EffectKind::Chorus));
        let result = registry.create(&ProcessingParams::defaults(EffectKind::Chorus), 48000.0, 2);
        assert!(matches!(result, Err(EffectError::Unregistered(EffectKind::Chorus))));
    }

    #[test]
    fn test_with_kinds_deduplicates() {
        let registry = EffectRegistry::with_kinds(&[EffectKind::Reverb, EffectKind::Reverb]);
        assert_eq!(registry.len(), 1);
        assert!(EffectRegistry::with_kinds(&[]).is_empty());
    }

    #[test]
    fn test_create_validates_parameters() {
        let registry = EffectRegistry::builtin();
        let mut params = ProcessingParams::defaults(EffectKind::Reverb);
        params.set("wet", 3.0).unwrap();
        assert!(matches!(
            registry.create(&params, 48000.0, 2),
            Err(EffectError::InvalidParameter { param: "wet", .. })
        ));
    }

    #[test]
    fn test_created_effect_uses_settings() {
        let registry = EffectRegistry::builtin();
        let mut params = ProcessingParams::defaults(EffectKind::Equalizer);
        for band in 0..EQ_BANDS {
            params.set(&format!("band{band}"), 20.0).unwrap();
        }
        let mut eq = registry.create(&params, 48000.0, 1).unwrap();
        let mut out = [0.0f32; 1];
        eq.process_block(&[0.05], &mut out);
        assert!((out[0] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_effects_in_category() {
        let registry = EffectRegistry::builtin();
        let dynamics = registry.effects_in_category(EffectCategory::Dynamics);
        assert_eq!(dynamics.len(), 1);
        assert_eq!(dynamics[0].kind, EffectKind::Compressor);
    }
}
