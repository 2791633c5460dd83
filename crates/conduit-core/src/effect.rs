//! The effect contract.
//!
//! Every effect kind implements [`Effect`]. The registry hands instances out
//! as `Box<dyn Effect + Send>`, a chain node owns its box exclusively, and
//! dropping the box destroys the instance. Blocks are interleaved with the
//! channel count fixed at construction, and all methods run on the audio
//! thread, so none of them may allocate.

/// A block processor with internal state.
///
/// ```rust
/// use conduit_core::Effect;
///
/// /// Flips polarity; stateless.
/// struct Invert;
///
/// impl Effect for Invert {
///     fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
///         for (y, x) in output.iter_mut().zip(input) {
///             *y = -x;
///         }
///     }
///
///     fn reset(&mut self) {}
/// }
///
/// let mut out = [0.0; 2];
/// Invert.process_block(&[0.5, -0.25], &mut out);
/// assert_eq!(out, [-0.5, 0.25]);
/// ```
pub trait Effect {
    /// Process `input` into `output`. Both hold the same number of
    /// interleaved samples.
    fn process_block(&mut self, input: &[f32], output: &mut [f32]);

    /// Clear delay lines, envelopes and oscillator phase, keeping parameters.
    fn reset(&mut self);

    /// Delay the effect adds to the signal, in frames.
    fn latency_samples(&self) -> usize {
        0
    }
}

impl<E: Effect + ?Sized> Effect for alloc::boxed::Box<E> {
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        (**self).process_block(input, output);
    }

    fn reset(&mut self) {
        (**self).reset();
    }

    fn latency_samples(&self) -> usize {
        (**self).latency_samples()
    }
}
