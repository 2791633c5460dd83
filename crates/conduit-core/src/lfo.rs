//! Sine LFO driving modulated delays.

use core::f32::consts::TAU;
use libm::{floorf, sinf};

/// Sine oscillator stepped once per frame.
///
/// The phase is a fraction of a cycle in `[0, 1)`, so the oscillator keeps
/// no state tied to a fixed sample rate beyond its step size.
///
/// ```rust
/// use conduit_core::Lfo;
///
/// let mut lfo = Lfo::new(44100.0, 2.0);
/// assert_eq!(lfo.advance(), 0.0);
/// assert!((lfo.rate_hz() - 2.0).abs() < 1e-4);
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    cycle: f32,
    step: f32,
    sample_rate: f32,
}

impl Lfo {
    /// An oscillator at `rate_hz`, starting at phase zero.
    pub fn new(sample_rate: f32, rate_hz: f32) -> Self {
        let mut lfo = Self {
            cycle: 0.0,
            step: 0.0,
            sample_rate,
        };
        lfo.set_frequency(rate_hz);
        lfo
    }

    /// Change the rate without disturbing the phase.
    pub fn set_frequency(&mut self, rate_hz: f32) {
        self.step = rate_hz / self.sample_rate;
    }

    /// Current rate in Hz.
    pub fn frequency(&self) -> f32 {
        self.rate_hz()
    }

    /// Current rate in Hz.
    pub fn rate_hz(&self) -> f32 {
        self.step * self.sample_rate
    }

    /// Jump to a phase, in cycles; wraps into `[0, 1)`.
    pub fn set_phase(&mut self, cycles: f32) {
        self.cycle = cycles - floorf(cycles);
    }

    /// Back to phase zero.
    pub fn reset(&mut self) {
        self.cycle = 0.0;
    }

    /// Sine of the current phase, then step one frame.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let out = sinf(TAU * self.cycle);
        self.cycle += self.step;
        self.cycle -= floorf(self.cycle);
        out
    }
}
