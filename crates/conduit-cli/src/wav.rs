//! WAV file reading and writing.
//!
//! Samples are kept interleaved and normalized to `[-1.0, 1.0]`; integer
//! files of any bit depth are scaled by their full-scale value on read.

use anyhow::Context;
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// Interleaved audio read from a WAV file.
#[derive(Debug, Clone)]
pub struct WavAudio {
    /// Interleaved normalized samples.
    pub samples: Vec<f32>,
    /// Number of interleaved channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl WavAudio {
    /// Number of whole frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }
}

/// Read a whole WAV file.
pub fn read_wav(path: &Path) -> anyhow::Result<WavAudio> {
    let reader =
        WavReader::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();
    if spec.channels == 0 {
        anyhow::bail!("{} declares zero channels", path.display());
    }

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok(WavAudio {
        samples,
        channels: spec.channels,
        sample_rate: spec.sample_rate,
    })
}

/// Write interleaved samples as 16-bit PCM or 32-bit float.
pub fn write_wav(
    path: &Path,
    samples: &[f32],
    channels: u16,
    sample_rate: u32,
    bit_depth: u16,
) -> anyhow::Result<()> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: bit_depth,
        sample_format: if bit_depth == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };
    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("failed to create {}", path.display()))?;

    match bit_depth {
        32 => {
            for &sample in samples {
                writer.write_sample(sample)?;
            }
        }
        16 => {
            for &sample in samples {
                let int_sample = (sample * 32768.0).round().clamp(-32768.0, 32767.0) as i16;
                writer.write_sample(int_sample)?;
            }
        }
        other => anyhow::bail!("unsupported bit depth {other} (use 16 or 32)"),
    }

    writer.finalize()?;
    Ok(())
}
