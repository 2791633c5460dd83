//! Conduit Effects - built-in effect implementations
//!
//! Every effect kind a processing chain can host:
//!
//! - [`Equalizer`] - 10-band graphic equalizer (broadband mean gain)
//! - [`Compressor`] - Feed-forward compressor with a dB-domain envelope
//! - [`Reverb`] - Single feedback delay line reverb
//! - [`Distortion`] - tanh waveshaper with a tone low-pass
//! - [`Chorus`] - LFO-modulated delay with feedback
//! - [`PitchShift`] - Two-tap crossfaded delay-line pitch shifter
//!
//! All effects process interleaved blocks with a channel count fixed at
//! construction. Delay lines and oscillators are owned per instance and
//! sized from the instance's sample rate.
//!
//! ## Example
//!
//! ```rust
//! use conduit_core::Effect;
//! use conduit_effects::Compressor;
//!
//! let mut comp = Compressor::new(48000.0, 2);
//! comp.set_threshold_db(-18.0);
//! comp.set_ratio(4.0);
//!
//! let input = [0.5f32; 256];
//! let mut output = [0.0f32; 256];
//! comp.process_block(&input, &mut output);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod chorus;
pub mod compressor;
pub mod distortion;
pub mod equalizer;
pub mod pitch_shift;
pub mod reverb;

pub use chorus::Chorus;
pub use compressor::Compressor;
pub use distortion::Distortion;
pub use equalizer::{EQ_BAND_FREQUENCIES, EQ_BANDS, Equalizer};
pub use pitch_shift::PitchShift;
pub use reverb::Reverb;
