//! Mathematical utility functions for DSP.
//!
//! All functions are allocation-free and suitable for `no_std`.

use libm::{fabsf, log10f, powf};

/// Level reported for silent or near-silent samples, in dB.
pub const SILENCE_DB: f32 = -120.0;

/// Amplitudes below this are treated as silence by [`amplitude_to_db`].
const SILENCE_AMPLITUDE: f32 = 1e-6;

/// Values below this magnitude are flushed to zero by [`flush_denormal`].
const DENORMAL_THRESHOLD: f32 = 1e-20;

/// Convert decibels to linear gain, `10^(dB/20)`.
///
/// # Example
/// ```rust
/// use conduit_core::db_to_linear;
///
/// assert_eq!(db_to_linear(0.0), 1.0);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    powf(10.0, db / 20.0)
}

/// Convert a sample's magnitude to decibels, floored at [`SILENCE_DB`].
///
/// # Example
/// ```rust
/// use conduit_core::{amplitude_to_db, SILENCE_DB};
///
/// assert_eq!(amplitude_to_db(0.0), SILENCE_DB);
/// assert!(amplitude_to_db(-1.0).abs() < 1e-6);
/// ```
#[inline]
pub fn amplitude_to_db(sample: f32) -> f32 {
    let magnitude = fabsf(sample);
    if magnitude < SILENCE_AMPLITUDE {
        SILENCE_DB
    } else {
        (20.0 * log10f(magnitude)).max(SILENCE_DB)
    }
}

/// Flush values that would decay into denormals to exactly zero.
///
/// Feedback paths (reverb, chorus) decay geometrically; without flushing
/// they spend a long tail in the denormal range, which is slow on most CPUs.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if fabsf(x) < DENORMAL_THRESHOLD { 0.0 } else { x }
}

/// Clamp a sample to [-1.0, 1.0].
#[inline]
pub fn hard_clip(x: f32) -> f32 {
    x.clamp(-1.0, 1.0)
}
