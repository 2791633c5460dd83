//! Chorus effect using a modulated delay line.
//!
//! A sine LFO sweeps the delay around a 15 ms center by up to ±5 ms (scaled
//! by depth). The delayed signal is fed back into the line and mixed equally
//! with the dry signal. One LFO drives all channels so the stereo image
//! stays centered.

use alloc::vec::Vec;
use conduit_core::{DelayLine, Effect, Lfo, flush_denormal};

const BASE_DELAY_MS: f32 = 15.0;
const DEPTH_MS: f32 = 5.0;

/// Chorus effect.
///
/// # Parameters
///
/// | Parameter | Range | Default |
/// |-----------|-------|---------|
/// | Rate | 0.01 - 20 Hz | 1.0 |
/// | Depth | 0.0 - 1.0 | 0.5 |
/// | Feedback | 0.0 - 0.95 | 0.0 |
///
/// # Example
///
/// ```rust
/// use conduit_core::Effect;
/// use conduit_effects::Chorus;
///
/// let mut chorus = Chorus::new(44100.0, 2);
/// chorus.set_rate(2.0);
/// chorus.set_depth(0.7);
///
/// let mut out = [0.0f32; 8];
/// chorus.process_block(&[0.5; 8], &mut out);
/// ```
#[derive(Debug, Clone)]
pub struct Chorus {
    lines: Vec<DelayLine>,
    lfo: Lfo,
    sample_rate: f32,
    depth: f32,
    feedback: f32,
}

impl Chorus {
    /// Create a chorus with one delay line per channel.
    pub fn new(sample_rate: f32, channels: usize) -> Self {
        let max_seconds = (BASE_DELAY_MS + DEPTH_MS) / 1000.0;
        Self {
            lines: (0..channels.max(1))
                .map(|_| DelayLine::from_time(sample_rate, max_seconds))
                .collect(),
            lfo: Lfo::new(sample_rate, 1.0),
            sample_rate,
            depth: 0.5,
            feedback: 0.0,
        }
    }

    /// Set LFO rate in Hz.
    pub fn set_rate(&mut self, rate_hz: f32) {
        self.lfo.set_frequency(rate_hz.clamp(0.01, 20.0));
    }

    /// Set modulation depth (0-1).
    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth.clamp(0.0, 1.0);
    }

    /// Set feedback amount (0-0.95).
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.95);
    }

    /// Returns the LFO rate in Hz.
    pub fn rate(&self) -> f32 {
        self.lfo.frequency()
    }
}

impl Effect for Chorus {
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        let channels = self.lines.len();
        let ms_to_samples = self.sample_rate / 1000.0;
        for (in_frame, out_frame) in input.chunks(channels).zip(output.chunks_mut(channels)) {
            let modulation = self.lfo.advance();
            let delay = (BASE_DELAY_MS + modulation * self.depth * DEPTH_MS) * ms_to_samples;
            for ((line, &x), out) in self.lines.iter_mut().zip(in_frame).zip(out_frame) {
                let delayed = line.read(delay);
                line.write(flush_denormal(x + delayed * self.feedback));
                *out = 0.5 * (x + delayed);
            }
        }
    }

    fn reset(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
        self.lfo.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_output_is_half_dry() {
        let mut chorus = Chorus::new(48000.0, 1);
        let mut out = [0.0];
        chorus.process_block(&[0.8], &mut out);
        assert!((out[0] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_wet_arrives_near_base_delay() {
        let sr = 48000.0;
        let mut chorus = Chorus::new(sr, 1);
        chorus.set_depth(0.0);

        let len = 2000;
        let mut input = vec![0.0f32; len];
        input[0] = 1.0;
        let mut output = vec![0.0f32; len];
        chorus.process_block(&input, &mut output);

        // 15 ms at 48 kHz = 720 samples
        let peak = output[1..]
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i + 1)
            .unwrap();
        assert!((719..=721).contains(&peak), "peak at {peak}");
    }

    #[test]
    fn test_output_finite_with_feedback() {
        let mut chorus = Chorus::new(44100.0, 2);
        chorus.set_feedback(0.95);
        chorus.set_depth(1.0);
        chorus.set_rate(5.0);
        let input = vec![0.9f32; 44100];
        let mut output = vec![0.0f32; 44100];
        chorus.process_block(&input, &mut output);
        assert!(output.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_rate_clamped() {
        let mut chorus = Chorus::new(48000.0, 1);
        chorus.set_rate(100.0);
        assert!((chorus.rate() - 20.0).abs() < 1e-3);
    }
}
