//! 10-band graphic equalizer.
//!
//! The equalizer stores one gain per octave band but applies them as a
//! single broadband multiplier: the arithmetic mean of the ten linear band
//! gains. No per-band filtering is performed, so a flat setting (all bands
//! at 0 dB) is an exact identity.

use conduit_core::{Effect, db_to_linear};

/// Number of equalizer bands.
pub const EQ_BANDS: usize = 10;

/// Nominal center frequency of each band in Hz.
pub const EQ_BAND_FREQUENCIES: [f32; EQ_BANDS] = [
    31.25, 62.5, 125.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0, 16000.0,
];

/// Graphic equalizer effect.
///
/// # Example
///
/// ```rust
/// use conduit_core::Effect;
/// use conduit_effects::Equalizer;
///
/// let mut eq = Equalizer::new(2);
/// eq.set_band_gains_db(&[6.0; 10]);
/// assert!((eq.effective_gain() - 1.9953).abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct Equalizer {
    band_gains_db: [f32; EQ_BANDS],
    effective_gain: f32,
    channels: usize,
}

impl Equalizer {
    /// Create a flat equalizer.
    pub fn new(channels: usize) -> Self {
        Self {
            band_gains_db: [0.0; EQ_BANDS],
            effective_gain: 1.0,
            channels: channels.max(1),
        }
    }

    /// Set all band gains in dB.
    pub fn set_band_gains_db(&mut self, gains_db: &[f32; EQ_BANDS]) {
        self.band_gains_db = *gains_db;
        self.recompute();
    }

    /// Set one band's gain in dB. Out-of-range bands are ignored.
    pub fn set_band_gain_db(&mut self, band: usize, gain_db: f32) {
        if let Some(slot) = self.band_gains_db.get_mut(band) {
            *slot = gain_db;
            self.recompute();
        }
    }

    /// Returns the gain of `band` in dB.
    pub fn band_gain_db(&self, band: usize) -> Option<f32> {
        self.band_gains_db.get(band).copied()
    }

    /// Returns the broadband multiplier currently applied.
    pub fn effective_gain(&self) -> f32 {
        self.effective_gain
    }

    /// Returns the channel count this instance was built for.
    pub fn channels(&self) -> usize {
        self.channels
    }

    fn recompute(&mut self) {
        let sum: f32 = self.band_gains_db.iter().map(|&db| db_to_linear(db)).sum();
        self.effective_gain = sum / EQ_BANDS as f32;
    }
}

impl Effect for Equalizer {
    #[inline]
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        let gain = self.effective_gain;
        for (out, &inp) in output.iter_mut().zip(input) {
            *out = inp * gain;
        }
    }

    fn reset(&mut self) {}
}
