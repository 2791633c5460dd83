//! Effect kinds and categories.

use crate::EffectError;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Category of audio effect for organization and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectCategory {
    /// Equalizers and other tone-shaping filters
    Filter,
    /// Dynamics processing (compressor)
    Dynamics,
    /// Time-based effects (reverb)
    TimeBased,
    /// Distortion and waveshaping effects
    Distortion,
    /// Modulation effects (chorus)
    Modulation,
    /// Pitch manipulation
    Pitch,
}

impl EffectCategory {
    /// Returns a human-readable name for the category.
    pub const fn name(&self) -> &'static str {
        match self {
            EffectCategory::Filter => "Filter",
            EffectCategory::Dynamics => "Dynamics",
            EffectCategory::TimeBased => "Time-Based",
            EffectCategory::Distortion => "Distortion",
            EffectCategory::Modulation => "Modulation",
            EffectCategory::Pitch => "Pitch",
        }
    }

    /// Returns a description of the category.
    pub const fn description(&self) -> &'static str {
        match self {
            EffectCategory::Filter => "Equalizers and tone-shaping filters",
            EffectCategory::Dynamics => "Compressors and other dynamics processors",
            EffectCategory::TimeBased => "Reverbs and other delay-based effects",
            EffectCategory::Distortion => "Distortion, overdrive and waveshaping effects",
            EffectCategory::Modulation => "Chorus and other LFO-driven effects",
            EffectCategory::Pitch => "Pitch shifting",
        }
    }
}

/// Every effect type a processing chain node can hold.
///
/// Serialized as its stable identifier (`"pitch_shift"` etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// 10-band graphic equalizer
    Equalizer,
    /// Dynamics compressor
    Compressor,
    /// Feedback delay reverb
    Reverb,
    /// Waveshaping distortion
    Distortion,
    /// Modulated delay chorus
    Chorus,
    /// Delay-line pitch shifter
    PitchShift,
}

impl EffectKind {
    /// All effect kinds in registration order.
    pub const ALL: [EffectKind; 6] = [
        EffectKind::Equalizer,
        EffectKind::Compressor,
        EffectKind::Reverb,
        EffectKind::Distortion,
        EffectKind::Chorus,
        EffectKind::PitchShift,
    ];

    /// Stable identifier (lowercase, no spaces).
    pub const fn id(&self) -> &'static str {
        match self {
            EffectKind::Equalizer => "equalizer",
            EffectKind::Compressor => "compressor",
            EffectKind::Reverb => "reverb",
            EffectKind::Distortion => "distortion",
            EffectKind::Chorus => "chorus",
            EffectKind::PitchShift => "pitch_shift",
        }
    }

    /// Category this kind is filed under.
    pub const fn category(&self) -> EffectCategory {
        match self {
            EffectKind::Equalizer => EffectCategory::Filter,
            EffectKind::Compressor => EffectCategory::Dynamics,
            EffectKind::Reverb => EffectCategory::TimeBased,
            EffectKind::Distortion => EffectCategory::Distortion,
            EffectKind::Chorus => EffectCategory::Modulation,
            EffectKind::PitchShift => EffectCategory::Pitch,
        }
    }

    /// Looks a kind up by identifier.
    pub fn from_id(id: &str) -> Option<EffectKind> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for EffectKind {
    type Err = EffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::from_id(&normalized).ok_or_else(|| EffectError::UnknownEffect(s.to_string()))
    }
}
