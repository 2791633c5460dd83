//! Feed-forward dynamics compressor.
//!
//! # Signal Flow
//!
//! ```text
//! |x| → dB (floor -120) → Envelope (attack/release) → Gain Computer → x * gain
//! ```
//!
//! The envelope is a one-pole smoother in the dB domain. It moves towards the
//! instantaneous level with the attack coefficient while the level rises and
//! with the release coefficient while it falls, each precomputed as
//! `exp(-1000 / (time_ms * sample_rate))`.
//!
//! Above the threshold the output level grows at `1/ratio` of the input
//! level, i.e. the gain change is `(envelope - threshold) * (1/ratio - 1)` dB.
//! That term is already negative for any ratio above 1, so it is applied as
//! `10^(gain/20)` and always attenuates; negating it again would boost loud
//! signals. Below the threshold the sample is passed through untouched.
//!
//! # Parameters
//!
//! | Parameter | Range | Default |
//! |-----------|-------|---------|
//! | Threshold | -120 to 0 dB | -18 |
//! | Ratio | ≥ 1 | 4 |
//! | Attack | > 0 ms | 10 |
//! | Release | > 0 ms | 100 |
//!
//! The envelope is linked across channels: one detector follows the
//! interleaved stream, so every channel receives the same gain reduction.

use conduit_core::{Effect, SILENCE_DB, amplitude_to_db, db_to_linear};
use libm::expf;

/// Smoothing coefficient for a one-pole follower with the given time constant.
#[inline]
fn time_coefficient(time_ms: f32, sample_rate: f32) -> f32 {
    expf(-1000.0 / (time_ms * sample_rate))
}

/// Dynamics compressor effect.
///
/// # Example
///
/// ```rust
/// use conduit_core::Effect;
/// use conduit_effects::Compressor;
///
/// let mut comp = Compressor::new(44100.0, 1);
/// comp.set_threshold_db(-20.0);
/// comp.set_ratio(4.0);
/// comp.set_attack_ms(5.0);
/// comp.set_release_ms(50.0);
///
/// let mut out = [0.0f32; 4];
/// comp.process_block(&[0.5; 4], &mut out);
/// ```
#[derive(Debug, Clone)]
pub struct Compressor {
    threshold_db: f32,
    ratio: f32,
    attack_ms: f32,
    release_ms: f32,
    attack_coeff: f32,
    release_coeff: f32,
    envelope_db: f32,
    sample_rate: f32,
    /// Last computed gain change in dB (always non-positive).
    last_gain_reduction_db: f32,
}

impl Compressor {
    /// Create a new compressor with default settings.
    ///
    /// The channel count does not affect the (linked) detector; it is
    /// accepted for symmetry with the other effects.
    pub fn new(sample_rate: f32, _channels: usize) -> Self {
        let mut comp = Self {
            threshold_db: -18.0,
            ratio: 4.0,
            attack_ms: 10.0,
            release_ms: 100.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            envelope_db: SILENCE_DB,
            sample_rate,
            last_gain_reduction_db: 0.0,
        };
        comp.attack_coeff = time_coefficient(comp.attack_ms, sample_rate);
        comp.release_coeff = time_coefficient(comp.release_ms, sample_rate);
        comp
    }

    /// Set threshold in dB.
    pub fn set_threshold_db(&mut self, threshold_db: f32) {
        self.threshold_db = threshold_db.clamp(SILENCE_DB, 0.0);
    }

    /// Set compression ratio (1.0 = no compression).
    pub fn set_ratio(&mut self, ratio: f32) {
        self.ratio = ratio.max(1.0);
    }

    /// Set attack time in milliseconds.
    pub fn set_attack_ms(&mut self, attack_ms: f32) {
        self.attack_ms = attack_ms.max(0.001);
        self.attack_coeff = time_coefficient(self.attack_ms, self.sample_rate);
    }

    /// Set release time in milliseconds.
    pub fn set_release_ms(&mut self, release_ms: f32) {
        self.release_ms = release_ms.max(0.001);
        self.release_coeff = time_coefficient(self.release_ms, self.sample_rate);
    }

    /// Returns the threshold in dB.
    pub fn threshold_db(&self) -> f32 {
        self.threshold_db
    }

    /// Returns the current envelope level in dB.
    pub fn envelope_db(&self) -> f32 {
        self.envelope_db
    }

    /// Returns the last computed gain change in dB (always non-positive).
    ///
    /// A value of 0.0 means no compression is occurring.
    pub fn gain_reduction_db(&self) -> f32 {
        self.last_gain_reduction_db
    }

    #[inline]
    fn process_sample(&mut self, input: f32) -> f32 {
        let level_db = amplitude_to_db(input);
        let coeff = if level_db > self.envelope_db {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope_db = coeff * self.envelope_db + (1.0 - coeff) * level_db;

        if self.envelope_db > self.threshold_db {
            let gain_db = (self.envelope_db - self.threshold_db) * (1.0 / self.ratio - 1.0);
            self.last_gain_reduction_db = gain_db;
            input * db_to_linear(gain_db)
        } else {
            self.last_gain_reduction_db = 0.0;
            input
        }
    }
}

impl Effect for Compressor {
    #[inline]
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        for (out, &inp) in output.iter_mut().zip(input) {
            *out = self.process_sample(inp);
        }
    }

    fn reset(&mut self) {
        self.envelope_db = SILENCE_DB;
        self.last_gain_reduction_db = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coefficients() {
        let comp = Compressor::new(48000.0, 2);
        let expected = expf(-1000.0 / (10.0 * 48000.0));
        assert_eq!(comp.attack_coeff, expected);
        assert!(comp.release_coeff > comp.attack_coeff);
    }

    #[test]
    fn test_quiet_signal_untouched() {
        let mut comp = Compressor::new(48000.0, 1);
        comp.set_threshold_db(-6.0);
        let input: Vec<f32> = (0..512).map(|i| 0.1 * ((i as f32) * 0.05).sin()).collect();
        let mut output = vec![0.0; input.len()];
        comp.process_block(&input, &mut output);
        assert_eq!(output, input);
        assert_eq!(comp.gain_reduction_db(), 0.0);
    }

    #[test]
    fn test_loud_signal_is_attenuated() {
        let mut comp = Compressor::new(48000.0, 1);
        comp.set_threshold_db(-20.0);
        comp.set_ratio(10.0);
        comp.set_attack_ms(0.1);

        let input = vec![0.9f32; 4800];
        let mut output = vec![0.0; input.len()];
        comp.process_block(&input, &mut output);

        let last = *output.last().unwrap();
        assert!(last < 0.9 * 0.5, "expected heavy reduction, got {last}");
        assert!(last > 0.0);
        assert!(comp.gain_reduction_db() < 0.0);
    }

    #[test]
    fn test_steady_state_gain_matches_ratio() {
        let mut comp = Compressor::new(48000.0, 1);
        comp.set_threshold_db(-20.0);
        comp.set_ratio(4.0);
        comp.set_attack_ms(0.1);

        let input = vec![0.9f32; 4800];
        let mut output = vec![0.0; input.len()];
        comp.process_block(&input, &mut output);

        let over = amplitude_to_db(0.9) + 20.0;
        let expected_db = over * (1.0 / 4.0 - 1.0);
        assert!((comp.gain_reduction_db() - expected_db).abs() < 0.05);
        let last = *output.last().unwrap();
        assert!((last - 0.9 * db_to_linear(expected_db)).abs() < 1e-3);
        assert!(output.iter().all(|&y| y <= 0.9));
    }

    #[test]
    fn test_ratio_one_is_transparent() {
        let mut comp = Compressor::new(48000.0, 1);
        comp.set_threshold_db(-40.0);
        comp.set_ratio(1.0);
        let input = vec![0.8f32; 256];
        let mut output = vec![0.0; 256];
        comp.process_block(&input, &mut output);
        for (a, b) in input.iter().zip(&output) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_reset_restores_floor() {
        let mut comp = Compressor::new(48000.0, 1);
        let mut out = [0.0; 64];
        comp.process_block(&[1.0; 64], &mut out);
        assert!(comp.envelope_db() > SILENCE_DB);
        comp.reset();
        assert_eq!(comp.envelope_db(), SILENCE_DB);
    }
}
