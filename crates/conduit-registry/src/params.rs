//! Effect parameter model.
//!
//! [`ProcessingParams`] is the parameter snapshot stored in every chain node:
//! a common output `gain` plus one [`EffectSettings`] variant per effect
//! kind. In TOML and JSON the variant is selected by an `effect` key and the
//! gain sits alongside the variant's own fields:
//!
//! ```toml
//! effect = "compressor"
//! gain = 1.0
//! threshold = -18.0
//! ratio = 4.0
//! ```
//!
//! Every parameter has a [`ParamDescriptor`] giving its range and default.
//! Parameters can also be addressed by name, which is how command-line chain
//! descriptions such as `"compressor:threshold=-18,ratio=4"` are applied.

use crate::{EffectError, EffectKind};
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Number of equalizer bands.
pub use conduit_effects::EQ_BANDS;

/// Unit of a parameter, used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamUnit {
    /// Decibels (dB)
    Decibels,
    /// Hertz (Hz)
    Hertz,
    /// Milliseconds (ms)
    Milliseconds,
    /// Ratio (n:1)
    Ratio,
    /// Semitones (st)
    Semitones,
    /// Dimensionless
    None,
}

impl ParamUnit {
    /// Returns the unit suffix string for display.
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Milliseconds => " ms",
            ParamUnit::Ratio => ":1",
            ParamUnit::Semitones => " st",
            ParamUnit::None => "",
        }
    }
}

/// Describes one named effect parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Parameter key as used in configuration files.
    pub name: &'static str,
    /// Display unit.
    pub unit: ParamUnit,
    /// Smallest accepted value.
    pub min: f32,
    /// Largest accepted value.
    pub max: f32,
    /// Value used when the parameter is omitted.
    pub default: f32,
}

impl ParamDescriptor {
    const fn new(name: &'static str, unit: ParamUnit, min: f32, max: f32, default: f32) -> Self {
        Self {
            name,
            unit,
            min,
            max,
            default,
        }
    }

    /// Returns true if `value` lies within `[min, max]` (NaN never does).
    pub fn accepts(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Descriptor for the output gain shared by every node.
pub const GAIN: ParamDescriptor = ParamDescriptor::new("gain", ParamUnit::None, 0.0, 2.0, 1.0);

const fn band(name: &'static str) -> ParamDescriptor {
    ParamDescriptor::new(name, ParamUnit::Decibels, -24.0, 24.0, 0.0)
}

const EQUALIZER_PARAMS: [ParamDescriptor; EQ_BANDS] = [
    band("band0"),
    band("band1"),
    band("band2"),
    band("band3"),
    band("band4"),
    band("band5"),
    band("band6"),
    band("band7"),
    band("band8"),
    band("band9"),
];

const COMPRESSOR_PARAMS: [ParamDescriptor; 4] = [
    ParamDescriptor::new("threshold", ParamUnit::Decibels, -120.0, 0.0, -18.0),
    ParamDescriptor::new("ratio", ParamUnit::Ratio, 1.0, 100.0, 4.0),
    ParamDescriptor::new("attack", ParamUnit::Milliseconds, 0.01, 5000.0, 10.0),
    ParamDescriptor::new("release", ParamUnit::Milliseconds, 0.01, 5000.0, 100.0),
];

const REVERB_PARAMS: [ParamDescriptor; 4] = [
    ParamDescriptor::new("room_size", ParamUnit::None, 0.0, 1.0, 0.5),
    ParamDescriptor::new("damp", ParamUnit::None, 0.0, 1.0, 0.5),
    ParamDescriptor::new("wet", ParamUnit::None, 0.0, 1.0, 0.3),
    ParamDescriptor::new("dry", ParamUnit::None, 0.0, 1.0, 0.7),
];

const DISTORTION_PARAMS: [ParamDescriptor; 2] = [
    ParamDescriptor::new("drive", ParamUnit::None, 0.0, 1.0, 0.5),
    ParamDescriptor::new("tone", ParamUnit::None, 0.0, 1.0, 0.5),
];

const CHORUS_PARAMS: [ParamDescriptor; 3] = [
    ParamDescriptor::new("rate", ParamUnit::Hertz, 0.01, 20.0, 1.0),
    ParamDescriptor::new("depth", ParamUnit::None, 0.0, 1.0, 0.5),
    ParamDescriptor::new("feedback", ParamUnit::None, 0.0, 0.95, 0.2),
];

const PITCH_SHIFT_PARAMS: [ParamDescriptor; 1] = [ParamDescriptor::new(
    "semitones",
    ParamUnit::Semitones,
    -12.0,
    12.0,
    0.0,
)];

impl EffectKind {
    /// Parameter descriptors for this kind, in storage order.
    ///
    /// The shared `gain` is not included; see [`GAIN`].
    pub fn params(&self) -> &'static [ParamDescriptor] {
        match self {
            EffectKind::Equalizer => &EQUALIZER_PARAMS,
            EffectKind::Compressor => &COMPRESSOR_PARAMS,
            EffectKind::Reverb => &REVERB_PARAMS,
            EffectKind::Distortion => &DISTORTION_PARAMS,
            EffectKind::Chorus => &CHORUS_PARAMS,
            EffectKind::PitchShift => &PITCH_SHIFT_PARAMS,
        }
    }
}

fn default_of(params: &[ParamDescriptor], index: usize) -> f32 {
    params[index].default
}

/// Equalizer band gains in dB, lowest band first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqualizerSettings {
    /// Gain of each band in dB.
    pub bands: [f32; EQ_BANDS],
}

impl Default for EqualizerSettings {
    fn default() -> Self {
        Self {
            bands: [0.0; EQ_BANDS],
        }
    }
}

/// Compressor settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorSettings {
    /// Threshold in dB.
    pub threshold: f32,
    /// Compression ratio (n:1).
    pub ratio: f32,
    /// Attack time in milliseconds.
    pub attack: f32,
    /// Release time in milliseconds.
    pub release: f32,
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self {
            threshold: default_of(&COMPRESSOR_PARAMS, 0),
            ratio: default_of(&COMPRESSOR_PARAMS, 1),
            attack: default_of(&COMPRESSOR_PARAMS, 2),
            release: default_of(&COMPRESSOR_PARAMS, 3),
        }
    }
}

/// Reverb settings, all in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReverbSettings {
    /// Room size; scales the delay line length.
    pub room_size: f32,
    /// Feedback attenuation.
    pub damp: f32,
    /// Delayed signal level.
    pub wet: f32,
    /// Direct signal level.
    pub dry: f32,
}

impl Default for ReverbSettings {
    fn default() -> Self {
        Self {
            room_size: default_of(&REVERB_PARAMS, 0),
            damp: default_of(&REVERB_PARAMS, 1),
            wet: default_of(&REVERB_PARAMS, 2),
            dry: default_of(&REVERB_PARAMS, 3),
        }
    }
}

/// Distortion settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistortionSettings {
    /// Drive amount.
    pub drive: f32,
    /// Tone (0 = dark, 1 = open).
    pub tone: f32,
}

impl Default for DistortionSettings {
    fn default() -> Self {
        Self {
            drive: default_of(&DISTORTION_PARAMS, 0),
            tone: default_of(&DISTORTION_PARAMS, 1),
        }
    }
}

/// Chorus settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChorusSettings {
    /// LFO rate in Hz.
    pub rate: f32,
    /// Modulation depth.
    pub depth: f32,
    /// Feedback amount.
    pub feedback: f32,
}

impl Default for ChorusSettings {
    fn default() -> Self {
        Self {
            rate: default_of(&CHORUS_PARAMS, 0),
            depth: default_of(&CHORUS_PARAMS, 1),
            feedback: default_of(&CHORUS_PARAMS, 2),
        }
    }
}

/// Pitch shifter settings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchShiftSettings {
    /// Shift in semitones.
    #[serde(alias = "shift")]
    pub semitones: f32,
}

/// Effect-specific settings, one variant per [`EffectKind`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum EffectSettings {
    /// Equalizer band gains.
    Equalizer(EqualizerSettings),
    /// Compressor settings.
    Compressor(CompressorSettings),
    /// Reverb settings.
    Reverb(ReverbSettings),
    /// Distortion settings.
    Distortion(DistortionSettings),
    /// Chorus settings.
    Chorus(ChorusSettings),
    /// Pitch shifter settings.
    PitchShift(PitchShiftSettings),
}

impl EffectSettings {
    /// Default settings for `kind`.
    pub fn defaults(kind: EffectKind) -> Self {
        match kind {
            EffectKind::Equalizer => EffectSettings::Equalizer(EqualizerSettings::default()),
            EffectKind::Compressor => EffectSettings::Compressor(CompressorSettings::default()),
            EffectKind::Reverb => EffectSettings::Reverb(ReverbSettings::default()),
            EffectKind::Distortion => EffectSettings::Distortion(DistortionSettings::default()),
            EffectKind::Chorus => EffectSettings::Chorus(ChorusSettings::default()),
            EffectKind::PitchShift => EffectSettings::PitchShift(PitchShiftSettings::default()),
        }
    }

    /// The kind these settings configure.
    pub fn kind(&self) -> EffectKind {
        match self {
            EffectSettings::Equalizer(_) => EffectKind::Equalizer,
            EffectSettings::Compressor(_) => EffectKind::Compressor,
            EffectSettings::Reverb(_) => EffectKind::Reverb,
            EffectSettings::Distortion(_) => EffectKind::Distortion,
            EffectSettings::Chorus(_) => EffectKind::Chorus,
            EffectSettings::PitchShift(_) => EffectKind::PitchShift,
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut f32> {
        match self {
            EffectSettings::Equalizer(s) => {
                let band: usize = name.strip_prefix("band")?.parse().ok()?;
                s.bands.get_mut(band)
            }
            EffectSettings::Compressor(s) => match name {
                "threshold" => Some(&mut s.threshold),
                "ratio" => Some(&mut s.ratio),
                "attack" => Some(&mut s.attack),
                "release" => Some(&mut s.release),
                _ => None,
            },
            EffectSettings::Reverb(s) => match name {
                "room_size" => Some(&mut s.room_size),
                "damp" => Some(&mut s.damp),
                "wet" => Some(&mut s.wet),
                "dry" => Some(&mut s.dry),
                _ => None,
            },
            EffectSettings::Distortion(s) => match name {
                "drive" => Some(&mut s.drive),
                "tone" => Some(&mut s.tone),
                _ => None,
            },
            EffectSettings::Chorus(s) => match name {
                "rate" => Some(&mut s.rate),
                "depth" => Some(&mut s.depth),
                "feedback" => Some(&mut s.feedback),
                _ => None,
            },
            EffectSettings::PitchShift(s) => match name {
                "semitones" | "shift" => Some(&mut s.semitones),
                _ => None,
            },
        }
    }

    /// Parameter values in the order of [`EffectKind::params`].
    pub fn values(&self) -> Vec<f32> {
        match self {
            EffectSettings::Equalizer(s) => s.bands.to_vec(),
            EffectSettings::Compressor(s) => vec![s.threshold, s.ratio, s.attack, s.release],
            EffectSettings::Reverb(s) => vec![s.room_size, s.damp, s.wet, s.dry],
            EffectSettings::Distortion(s) => vec![s.drive, s.tone],
            EffectSettings::Chorus(s) => vec![s.rate, s.depth, s.feedback],
            EffectSettings::PitchShift(s) => vec![s.semitones],
        }
    }

    /// Reads a parameter by name.
    pub fn get(&self, name: &str) -> Option<f32> {
        let mut copy = *self;
        copy.slot_mut(name).map(|v| *v)
    }

    /// Writes a parameter by name without range checking.
    pub fn set(&mut self, name: &str, value: f32) -> Result<(), EffectError> {
        let kind = self.kind();
        let slot = self
            .slot_mut(name)
            .ok_or_else(|| EffectError::UnknownParameter {
                effect: kind,
                param: name.to_string(),
            })?;
        *slot = value;
        Ok(())
    }

    /// Checks every parameter against its descriptor.
    pub fn validate(&self) -> Result<(), EffectError> {
        let kind = self.kind();
        for (desc, value) in kind.params().iter().zip(self.values()) {
            if !desc.accepts(value) {
                return Err(EffectError::InvalidParameter {
                    effect: kind,
                    param: desc.name,
                    value,
                    min: desc.min,
                    max: desc.max,
                });
            }
        }
        Ok(())
    }
}

fn default_gain() -> f32 {
    GAIN.default
}

/// Parameter snapshot of one processing chain node.
///
/// # Example
///
/// ```rust
/// use conduit_registry::{EffectKind, ProcessingParams};
///
/// let params: ProcessingParams = "reverb:room_size=0.25,wet=0.5".parse().unwrap();
/// assert_eq!(params.kind(), EffectKind::Reverb);
/// assert_eq!(params.get("wet"), Some(0.5));
/// assert_eq!(params.gain, 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessingParams {
    /// Output gain (0.0 - 2.0).
    #[serde(default = "default_gain")]
    pub gain: f32,
    /// Effect-specific settings.
    #[serde(flatten)]
    pub settings: EffectSettings,
}

impl ProcessingParams {
    /// Unity-gain parameters wrapping `settings`.
    pub fn new(settings: EffectSettings) -> Self {
        Self {
            gain: GAIN.default,
            settings,
        }
    }

    /// Default parameters for `kind`.
    pub fn defaults(kind: EffectKind) -> Self {
        Self::new(EffectSettings::defaults(kind))
    }

    /// Replaces the gain.
    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    /// The effect kind these parameters configure.
    pub fn kind(&self) -> EffectKind {
        self.settings.kind()
    }

    /// Reads a parameter by name, including `gain`.
    pub fn get(&self, name: &str) -> Option<f32> {
        if name == GAIN.name {
            Some(self.gain)
        } else {
            self.settings.get(name)
        }
    }

    /// Writes a parameter by name, including `gain`, without range checking.
    pub fn set(&mut self, name: &str, value: f32) -> Result<(), EffectError> {
        if name == GAIN.name {
            self.gain = value;
            Ok(())
        } else {
            self.settings.set(name, value)
        }
    }

    /// Checks the gain and every effect parameter against their ranges.
    pub fn validate(&self) -> Result<(), EffectError> {
        if !GAIN.accepts(self.gain) {
            return Err(EffectError::InvalidParameter {
                effect: self.kind(),
                param: GAIN.name,
                value: self.gain,
                min: GAIN.min,
                max: GAIN.max,
            });
        }
        self.settings.validate()
    }
}

impl FromStr for ProcessingParams {
    type Err = EffectError;

    /// Parses `effect[:key=value,...]`, starting from the kind's defaults.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, assignments) = match s.split_once(':') {
            Some((kind, rest)) => (kind, rest),
            None => (s, ""),
        };
        let mut params = Self::defaults(kind.parse()?);
        for assignment in assignments.split(',').map(str::trim).filter(|a| !a.is_empty()) {
            let (key, value) = assignment.split_once('=').unwrap_or((assignment, ""));
            let key = key.trim();
            let parsed: f32 = value.trim().parse().map_err(|_| EffectError::ParseValue {
                param: key.to_string(),
                value: value.trim().to_string(),
            })?;
            params.set(key, parsed)?;
        }
        Ok(params)
    }
}

impl fmt::Display for ProcessingParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:gain={}", self.kind(), self.gain)?;
        for (desc, value) in self.kind().params().iter().zip(self.settings.values()) {
            write!(f, ",{}={}", desc.name, value)?;
        }
        Ok(())
    }
}
