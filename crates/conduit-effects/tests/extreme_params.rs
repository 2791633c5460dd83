//! Extreme parameter tests for all conduit effects.
//!
//! Verifies that every effect produces finite (non-NaN, non-Inf) output when
//! its parameters sit at the edges of their ranges, and when running at the
//! supported sample rate extremes (8 kHz and 192 kHz).

use conduit_core::{Effect, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE};
use conduit_effects::{Chorus, Compressor, Distortion, Equalizer, PitchShift, Reverb};

const DEFAULT_SAMPLE_RATE: f32 = 48000.0;
const CHANNELS: usize = 2;
const NUM_FRAMES: usize = 1000;

/// Process `NUM_FRAMES` of a stepped signal and assert all outputs are finite.
fn assert_finite_output(effect: &mut dyn Effect, label: &str) {
    let input: Vec<f32> = (0..NUM_FRAMES * CHANNELS)
        .map(|i| match i % 3 {
            0 => 0.5,
            1 => -0.5,
            _ => 0.0,
        })
        .collect();
    let mut output = vec![0.0f32; input.len()];
    effect.process_block(&input, &mut output);
    for (i, s) in output.iter().enumerate() {
        assert!(s.is_finite(), "{label}: non-finite output at sample {i}: {s}");
    }
}

fn run_extreme_test<E: Effect>(
    name: &str,
    mut create: impl FnMut(f32) -> E,
    set_min: impl Fn(&mut E),
    set_max: impl Fn(&mut E),
) {
    {
        let mut effect = create(DEFAULT_SAMPLE_RATE);
        set_min(&mut effect);
        assert_finite_output(&mut effect, &format!("{name} (all min)"));
    }
    {
        let mut effect = create(DEFAULT_SAMPLE_RATE);
        set_max(&mut effect);
        assert_finite_output(&mut effect, &format!("{name} (all max)"));
    }
    {
        let mut effect = create(MIN_SAMPLE_RATE as f32);
        set_max(&mut effect);
        assert_finite_output(&mut effect, &format!("{name} (8 kHz)"));
    }
    {
        let mut effect = create(MAX_SAMPLE_RATE as f32);
        set_max(&mut effect);
        assert_finite_output(&mut effect, &format!("{name} (192 kHz)"));
    }
}

#[test]
fn extreme_equalizer() {
    run_extreme_test(
        "Equalizer",
        |_| Equalizer::new(CHANNELS),
        |e| e.set_band_gains_db(&[-24.0; 10]),
        |e| e.set_band_gains_db(&[24.0; 10]),
    );
}

#[test]
fn extreme_compressor() {
    run_extreme_test(
        "Compressor",
        |sr| Compressor::new(sr, CHANNELS),
        |c| {
            c.set_threshold_db(-120.0);
            c.set_ratio(1.0);
            c.set_attack_ms(0.0);
            c.set_release_ms(0.0);
        },
        |c| {
            c.set_threshold_db(0.0);
            c.set_ratio(100.0);
            c.set_attack_ms(1000.0);
            c.set_release_ms(5000.0);
        },
    );
}

#[test]
fn extreme_reverb() {
    run_extreme_test(
        "Reverb",
        |sr| Reverb::new(sr, CHANNELS),
        |r| {
            r.set_room_size(0.0);
            r.set_damping(0.0);
            r.set_wet(0.0);
            r.set_dry(0.0);
        },
        |r| {
            r.set_room_size(1.0);
            r.set_damping(1.0);
            r.set_wet(1.0);
            r.set_dry(1.0);
        },
    );
}

#[test]
fn extreme_distortion() {
    run_extreme_test(
        "Distortion",
        |sr| Distortion::new(sr, CHANNELS),
        |d| {
            d.set_drive(0.0);
            d.set_tone(0.0);
        },
        |d| {
            d.set_drive(1.0);
            d.set_tone(1.0);
        },
    );
}

#[test]
fn extreme_chorus() {
    run_extreme_test(
        "Chorus",
        |sr| Chorus::new(sr, CHANNELS),
        |c| {
            c.set_rate(0.0);
            c.set_depth(0.0);
            c.set_feedback(0.0);
        },
        |c| {
            c.set_rate(20.0);
            c.set_depth(1.0);
            c.set_feedback(0.95);
        },
    );
}

#[test]
fn extreme_pitch_shift() {
    run_extreme_test(
        "PitchShift",
        |sr| PitchShift::new(sr, CHANNELS),
        |p| p.set_semitones(-12.0),
        |p| p.set_semitones(12.0),
    );
}
