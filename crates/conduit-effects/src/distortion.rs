//! Soft-clipping distortion with a tone control.
//!
//! Drive maps to a pre-gain of `1 + 9 * drive` into a normalized tanh
//! shaper, so full-scale input stays at full scale. The tone control sweeps
//! a one-pole low-pass from 200 Hz (tone 0.0) to 20 kHz (tone 1.0); at
//! tone 1.0 the filter is bypassed.

use alloc::vec;
use alloc::vec::Vec;
use conduit_core::{Effect, flush_denormal};
use core::f32::consts::TAU;
use libm::{expf, powf, tanhf};

const TONE_MIN_HZ: f32 = 200.0;
const TONE_RANGE: f32 = 100.0;

/// Waveshaping distortion effect.
///
/// # Example
///
/// ```rust
/// use conduit_core::Effect;
/// use conduit_effects::Distortion;
///
/// let mut dist = Distortion::new(48000.0, 1);
/// dist.set_drive(0.8);
/// let mut out = [0.0f32; 1];
/// dist.process_block(&[0.5], &mut out);
/// assert!(out[0] > 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Distortion {
    sample_rate: f32,
    drive: f32,
    tone: f32,
    pre_gain: f32,
    norm: f32,
    lp_coeff: f32,
    lp_state: Vec<f32>,
}

impl Distortion {
    /// Create a distortion with moderate drive and an open tone control.
    pub fn new(sample_rate: f32, channels: usize) -> Self {
        let mut dist = Self {
            sample_rate,
            drive: 0.0,
            tone: 1.0,
            pre_gain: 1.0,
            norm: 1.0,
            lp_coeff: 0.0,
            lp_state: vec![0.0; channels.max(1)],
        };
        dist.set_drive(0.5);
        dist.set_tone(1.0);
        dist
    }

    /// Set drive amount (0-1).
    pub fn set_drive(&mut self, drive: f32) {
        self.drive = drive.clamp(0.0, 1.0);
        self.pre_gain = 1.0 + 9.0 * self.drive;
        self.norm = 1.0 / tanhf(self.pre_gain);
    }

    /// Set tone (0 = dark, 1 = open).
    pub fn set_tone(&mut self, tone: f32) {
        self.tone = tone.clamp(0.0, 1.0);
        let cutoff = TONE_MIN_HZ * powf(TONE_RANGE, self.tone);
        let cutoff = cutoff.min(self.sample_rate * 0.45);
        self.lp_coeff = expf(-TAU * cutoff / self.sample_rate);
    }

    /// Returns the drive amount.
    pub fn drive(&self) -> f32 {
        self.drive
    }

    /// Returns the tone setting.
    pub fn tone(&self) -> f32 {
        self.tone
    }
}

impl Effect for Distortion {
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        let channels = self.lp_state.len();
        let bypass_filter = self.tone >= 1.0;
        for (in_frame, out_frame) in input.chunks(channels).zip(output.chunks_mut(channels)) {
            for ((state, &x), out) in self.lp_state.iter_mut().zip(in_frame).zip(out_frame) {
                let shaped = tanhf(x * self.pre_gain) * self.norm;
                *out = if bypass_filter {
                    shaped
                } else {
                    *state = flush_denormal(shaped + self.lp_coeff * (*state - shaped));
                    *state
                };
            }
        }
    }

    fn reset(&mut self) {
        self.lp_state.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_bounded() {
        let mut dist = Distortion::new(48000.0, 2);
        dist.set_drive(1.0);
        let input: Vec<f32> = (0..256).map(|i| (i as f32 - 128.0) / 16.0).collect();
        let mut output = vec![0.0; 256];
        dist.process_block(&input, &mut output);
        assert!(output.iter().all(|s| s.abs() <= 1.0 + 1e-6));
    }

    #[test]
    fn test_full_scale_preserved() {
        let mut dist = Distortion::new(48000.0, 1);
        dist.set_drive(0.3);
        let mut out = [0.0];
        dist.process_block(&[1.0], &mut out);
        assert!((out[0] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_dark_tone_smooths_steps() {
        let mut dist = Distortion::new(48000.0, 1);
        dist.set_tone(0.0);
        let mut out = [0.0; 4];
        dist.process_block(&[1.0; 4], &mut out);
        assert!(out[0] < 0.1, "filter should slow the attack, got {}", out[0]);
        assert!(out[3] > out[0]);
    }

    #[test]
    fn test_reset() {
        let mut dist = Distortion::new(48000.0, 1);
        dist.set_tone(0.0);
        let mut out = [0.0; 64];
        dist.process_block(&[1.0; 64], &mut out);
        dist.reset();
        assert_eq!(dist.lp_state[0], 0.0);
    }
}
