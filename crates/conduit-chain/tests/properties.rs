//! Property-based tests for chain processing.

use conduit_chain::ProcessingChain;
use conduit_core::{Samples, SamplesMut};
use conduit_registry::{EffectKind, ProcessingParams};
use proptest::prelude::*;

fn arb_kind() -> impl Strategy<Value = EffectKind> {
    prop::sample::select(EffectKind::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// 16-bit audio through an identity chain comes back within 1 LSB.
    #[test]
    fn i16_identity_within_one_lsb(
        input in prop::collection::vec(any::<i16>(), 2..1024),
        channels in 1usize..=8,
    ) {
        let frames = input.len() / channels;
        prop_assume!(frames > 0);
        let mut chain = ProcessingChain::with_block_size(48000, channels, 64).unwrap();
        chain.add_node(ProcessingParams::defaults(EffectKind::Equalizer)).unwrap();

        let mut output = vec![0i16; input.len()];
        chain.apply(Samples::I16(&input), SamplesMut::I16(&mut output), frames).unwrap();
        for i in 0..frames * channels {
            prop_assert!((i32::from(input[i]) - i32::from(output[i])).abs() <= 1);
        }
    }

    /// Whatever the chain contains, float output is finite and within full scale.
    #[test]
    fn output_is_finite_and_clamped(
        kinds in prop::collection::vec(arb_kind(), 1..5),
        input in prop::collection::vec(-4.0f32..4.0, 2..512),
        gain in 0.0f32..=2.0,
    ) {
        let mut chain = ProcessingChain::with_block_size(44100, 2, 100).unwrap();
        for kind in kinds {
            chain.add_node(ProcessingParams::defaults(kind).with_gain(gain)).unwrap();
        }
        let frames = input.len() / 2;
        prop_assume!(frames > 0);
        let mut output = vec![0.0f32; input.len()];
        chain.apply(Samples::F32(&input), SamplesMut::F32(&mut output), frames).unwrap();
        for &s in &output[..frames * 2] {
            prop_assert!(s.is_finite());
            prop_assert!((-1.0..=1.0).contains(&s));
        }
    }
}
