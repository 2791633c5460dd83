//! Ring-buffer sample history shared by the time-based effects.
//!
//! Chorus and pitch shift sweep the read position every sample, so reads
//! take a fractional delay. Reverb combs and allpasses use whole delays.

use alloc::vec;
use alloc::vec::Vec;

/// Fixed-capacity history of the most recent samples of one channel.
///
/// Storage is sized once in [`new`](Self::new); writes and reads never
/// allocate.
///
/// ```rust
/// use conduit_core::DelayLine;
///
/// let mut line = DelayLine::from_time(48000.0, 0.02);
/// line.write(0.25);
/// line.write(0.75);
/// assert_eq!(line.read(1.0), 0.25);
/// assert_eq!(line.read(0.5), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// Creates a delay line holding `max_delay_samples` samples of history.
    ///
    /// A zero capacity is bumped to one sample.
    pub fn new(max_delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay_samples.max(1)],
            write_pos: 0,
        }
    }

    /// Creates a delay line from a sample rate and maximum delay in seconds.
    pub fn from_time(sample_rate: f32, max_seconds: f32) -> Self {
        Self::new((sample_rate * max_seconds) as usize + 1)
    }

    /// Reads the sample written `delay_samples` writes ago, linearly
    /// interpolating fractional delays.
    ///
    /// A delay of 0.0 returns the most recently written sample. Delays beyond
    /// the capacity are clamped.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(0.0, (len - 1) as f32);

        let delay_int = delay as usize;
        let frac = delay - delay_int as f32;

        let read_pos = (self.write_pos + len - delay_int - 1) % len;
        let a = self.buffer[read_pos];
        if frac == 0.0 {
            return a;
        }
        let b = self.buffer[(read_pos + len - 1) % len];
        a + (b - a) * frac
    }

    /// Returns the oldest sample in the line, the one [`write`](Self::write)
    /// is about to overwrite.
    #[inline]
    pub fn oldest(&self) -> f32 {
        self.buffer[self.write_pos]
    }

    /// Writes a sample and advances the write position.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Clears the delay line to silence.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Returns the capacity in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}
