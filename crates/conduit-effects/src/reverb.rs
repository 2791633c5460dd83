//! Single feedback delay line reverb.
//!
//! Each channel owns one circular delay line whose length follows the room
//! size: `round(2 * sample_rate * room_size)` samples, at least one sample and
//! at most two seconds. Per sample the line yields the sample written
//! `length` writes ago, feeds `input + delayed * damping` back into the line
//! and outputs `input * dry + delayed * wet`.

use alloc::vec::Vec;
use conduit_core::{DelayLine, Effect, flush_denormal};
use libm::roundf;

/// Longest delay line a reverb instance allocates, in seconds.
const MAX_DELAY_SECONDS: f32 = 2.0;

fn delay_length(sample_rate: f32, room_size: f32) -> usize {
    let cap = (sample_rate * MAX_DELAY_SECONDS) as usize;
    let len = roundf(2.0 * sample_rate * room_size) as usize;
    len.clamp(1, cap.max(1))
}

/// Feedback delay reverb.
///
/// # Parameters
///
/// | Parameter | Range | Default |
/// |-----------|-------|---------|
/// | Room size | 0.0 - 1.0 | 0.5 |
/// | Damping | 0.0 - 1.0 | 0.5 |
/// | Wet | 0.0 - 1.0 | 0.3 |
/// | Dry | 0.0 - 1.0 | 1.0 |
///
/// # Example
///
/// ```rust
/// use conduit_core::Effect;
/// use conduit_effects::Reverb;
///
/// let mut reverb = Reverb::new(48000.0, 2);
/// reverb.set_room_size(0.25);
/// assert_eq!(reverb.delay_samples(), 24000);
/// ```
#[derive(Debug, Clone)]
pub struct Reverb {
    lines: Vec<DelayLine>,
    sample_rate: f32,
    room_size: f32,
    damping: f32,
    wet: f32,
    dry: f32,
}

impl Reverb {
    /// Create a reverb with one delay line per channel.
    pub fn new(sample_rate: f32, channels: usize) -> Self {
        let room_size = 0.5;
        let len = delay_length(sample_rate, room_size);
        Self {
            lines: (0..channels.max(1)).map(|_| DelayLine::new(len)).collect(),
            sample_rate,
            room_size,
            damping: 0.5,
            wet: 0.3,
            dry: 1.0,
        }
    }

    /// Set room size (0-1). Resizes the delay lines, discarding the tail.
    pub fn set_room_size(&mut self, room_size: f32) {
        self.room_size = room_size.clamp(0.0, 1.0);
        let len = delay_length(self.sample_rate, self.room_size);
        if len != self.delay_samples() {
            for line in &mut self.lines {
                *line = DelayLine::new(len);
            }
        }
    }

    /// Set feedback damping (0-1).
    pub fn set_damping(&mut self, damping: f32) {
        self.damping = damping.clamp(0.0, 1.0);
    }

    /// Set wet level (0-1).
    pub fn set_wet(&mut self, wet: f32) {
        self.wet = wet.clamp(0.0, 1.0);
    }

    /// Set dry level (0-1).
    pub fn set_dry(&mut self, dry: f32) {
        self.dry = dry.clamp(0.0, 1.0);
    }

    /// Returns the room size.
    pub fn room_size(&self) -> f32 {
        self.room_size
    }

    /// Returns the delay length in samples.
    pub fn delay_samples(&self) -> usize {
        self.lines.first().map_or(0, DelayLine::capacity)
    }
}

impl Effect for Reverb {
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        let channels = self.lines.len();
        for (in_frame, out_frame) in input.chunks(channels).zip(output.chunks_mut(channels)) {
            for ((line, &x), out) in self.lines.iter_mut().zip(in_frame).zip(out_frame) {
                let delayed = line.oldest();
                line.write(flush_denormal(x + delayed * self.damping));
                *out = x * self.dry + delayed * self.wet;
            }
        }
    }

    fn reset(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
    }

    fn latency_samples(&self) -> usize {
        0
    }
}
