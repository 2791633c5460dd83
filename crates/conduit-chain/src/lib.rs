//! Conduit Chain - ordered effect chains for the audio thread.
//!
//! A [`ProcessingChain`] holds an ordered list of effect nodes built by an
//! [`EffectRegistry`](conduit_registry::EffectRegistry) for one sample rate
//! and channel count, and runs interleaved buffers of any wire format through
//! them with [`ProcessingChain::apply`].
//!
//! ```text
//! wire → f32 ─▶ node 0 ─▶ node 1 ─▶ … ─▶ × gain ─▶ clamp ─▶ wire
//!        slot A   A→B       B→A
//! ```
//!
//! [`ChainSpec`] is the serializable description of a chain. Routes and
//! configuration files carry specs, and every copy of a chain is rebuilt from
//! one so effect state is never shared.

mod chain;
mod error;
mod spec;

pub use chain::{DEFAULT_BLOCK_FRAMES, ProcessingChain, ProcessingNode, builtin_registry};
pub use error::ChainError;
pub use spec::{ChainSpec, NodeSpec};
