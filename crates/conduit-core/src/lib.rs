//! Conduit Core - shared primitives for audio routing and effect processing
//!
//! This crate provides the building blocks the rest of the conduit workspace
//! is layered on, designed for real-time audio processing with zero
//! allocation in the audio path.
//!
//! # Core Abstractions
//!
//! ## Effect Contract
//!
//! - [`Effect`] - Object-safe trait implemented by every effect kind
//!
//! ## Sample Formats
//!
//! Audio enters and leaves the framework in one of three interleaved wire
//! formats. Processing happens in `f32`:
//!
//! - [`SampleFormat`] - 16-bit integer, 32-bit integer, or 32-bit float
//! - [`Samples`] / [`SamplesMut`] - Borrowed, format-tagged views
//! - [`SampleVec`] - Owned, format-tagged buffer that reuses its allocation
//! - [`AudioFormat`] - Stream description shared with loadable modules
//!
//! ## Scratch Memory
//!
//! - [`BufferPool`] - Pre-sized float scratch buffers handed out per period
//!
//! ## Building Blocks
//!
//! - [`DelayLine`] - Circular delay line with fractional reads
//! - [`Lfo`] - Sine low-frequency oscillator
//!
//! ## Utilities
//!
//! - Level conversions: [`db_to_linear`], [`amplitude_to_db`]
//! - [`flush_denormal`], [`hard_clip`]
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! conduit-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod buffer;
pub mod delay;
pub mod effect;
pub mod lfo;
pub mod math;
pub mod sample;

pub use buffer::BufferPool;
pub use delay::DelayLine;
pub use effect::Effect;
pub use lfo::Lfo;
pub use math::{SILENCE_DB, amplitude_to_db, db_to_linear, flush_denormal, hard_clip};
pub use sample::{
    AudioFormat, SampleFormat, SampleVec, Samples, SamplesMut, from_f32, to_f32,
};

/// Maximum interleaved channel count supported by chains and routes.
pub const MAX_CHANNELS: usize = 8;

/// Minimum supported sample rate in Hz.
pub const MIN_SAMPLE_RATE: u32 = 8_000;

/// Maximum supported sample rate in Hz.
pub const MAX_SAMPLE_RATE: u32 = 192_000;
