//! Delay-line pitch shifter.
//!
//! Two read taps sweep a 50 ms window at a rate set by the pitch ratio
//! (`2^(semitones/12)`), half a window apart. Each tap is weighted by a
//! raised-cosine window of its position so the taps crossfade as they wrap;
//! the two weights always sum to one. A shift of zero semitones bypasses the
//! delay entirely.

use alloc::vec::Vec;
use conduit_core::{DelayLine, Effect};
use core::f32::consts::TAU;
use libm::{cosf, powf};

const WINDOW_SECONDS: f32 = 0.05;

/// Semitone range accepted by [`PitchShift::set_semitones`].
pub const MAX_SEMITONES: f32 = 12.0;

/// Pitch shifter effect.
///
/// # Example
///
/// ```rust
/// use conduit_core::Effect;
/// use conduit_effects::PitchShift;
///
/// let mut shifter = PitchShift::new(48000.0, 2);
/// shifter.set_semitones(7.0);
/// assert!((shifter.ratio() - 1.4983).abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct PitchShift {
    lines: Vec<DelayLine>,
    window: f32,
    semitones: f32,
    ratio: f32,
    /// Position of the first tap within the window, [0.0, 1.0)
    phase: f32,
}

impl PitchShift {
    /// Create an unshifted pitch shifter with one delay line per channel.
    pub fn new(sample_rate: f32, channels: usize) -> Self {
        let window = (sample_rate * WINDOW_SECONDS).max(2.0);
        Self {
            lines: (0..channels.max(1))
                .map(|_| DelayLine::new(window as usize + 2))
                .collect(),
            window,
            semitones: 0.0,
            ratio: 1.0,
            phase: 0.0,
        }
    }

    /// Set the shift in semitones (clamped to ±12).
    pub fn set_semitones(&mut self, semitones: f32) {
        self.semitones = semitones.clamp(-MAX_SEMITONES, MAX_SEMITONES);
        self.ratio = powf(2.0, self.semitones / 12.0);
    }

    /// Returns the shift in semitones.
    pub fn semitones(&self) -> f32 {
        self.semitones
    }

    /// Returns the playback ratio.
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    #[inline]
    fn wrap(phase: f32) -> f32 {
        if phase >= 1.0 {
            phase - 1.0
        } else if phase < 0.0 {
            phase + 1.0
        } else {
            phase
        }
    }
}

impl Effect for PitchShift {
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        if self.semitones == 0.0 {
            let n = input.len().min(output.len());
            output[..n].copy_from_slice(&input[..n]);
            return;
        }

        let channels = self.lines.len();
        let step = (1.0 - self.ratio) / self.window;
        for (in_frame, out_frame) in input.chunks(channels).zip(output.chunks_mut(channels)) {
            let phase_a = self.phase;
            let phase_b = Self::wrap(phase_a + 0.5);
            let gain_a = 0.5 - 0.5 * cosf(TAU * phase_a);
            let gain_b = 1.0 - gain_a;
            let delay_a = phase_a * self.window;
            let delay_b = phase_b * self.window;

            for ((line, &x), out) in self.lines.iter_mut().zip(in_frame).zip(out_frame) {
                line.write(x);
                *out = gain_a * line.read(delay_a) + gain_b * line.read(delay_b);
            }

            self.phase = Self::wrap(self.phase + step);
        }
    }

    fn reset(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
        self.phase = 0.0;
    }

    fn latency_samples(&self) -> usize {
        if self.semitones == 0.0 {
            0
        } else {
            (self.window * 0.5) as usize
        }
    }
}
