//! Tone block generator tests

use approx::assert_abs_diff_eq;
use core::f32::consts::TAU;
use doorbell_chime::audio::{PhaseState, Tone, ToneBlock, Waveform};

const SAMPLE_RATE: u32 = 44_100;

#[test]
fn test_samples_follow_sine_of_phase() {
    let tone = Tone::sine(5000, 2000);
    let inc = tone.phase_increment(SAMPLE_RATE);

    let mut phase = PhaseState::ZERO;
    let block: ToneBlock<64> = ToneBlock::generate(&mut phase, tone, SAMPLE_RATE);

    let mut expected_phase = 0.0f32;
    for (i, &sample) in block.samples().iter().enumerate() {
        let expected = 2000.0 * expected_phase.sin();
        assert!(
            (sample as f32 - expected).abs() <= 1.0,
            "sample {}: got {}, expected {}",
            i,
            sample,
            expected
        );
        expected_phase += inc;
        if expected_phase >= TAU {
            expected_phase -= TAU;
        }
    }
}

#[test]
fn test_phase_step_matches_frequency() {
    for freq in [440u32, 2000, 5000, 12_000] {
        let tone = Tone::sine(freq, 1000);
        let expected = TAU * freq as f32 / SAMPLE_RATE as f32;

        let mut phase = PhaseState::ZERO;
        let mut previous = phase.radians();
        for _ in 0..200 {
            let _: ToneBlock<1> = ToneBlock::generate(&mut phase, tone, SAMPLE_RATE);
            let step = (phase.radians() - previous).rem_euclid(TAU);
            assert_abs_diff_eq!(step, expected, epsilon = 1e-4);
            previous = phase.radians();
        }
    }
}

#[test]
fn test_phase_stays_in_range() {
    let mut phase = PhaseState::ZERO;
    for _ in 0..1000 {
        let _: ToneBlock = ToneBlock::generate(&mut phase, Tone::cosine(5000, 2000), SAMPLE_RATE);
        assert!(phase.radians() >= 0.0 && phase.radians() < TAU);
    }
}

#[test]
fn test_two_blocks_match_one_double_block() {
    let tone = Tone::sine(5000, 2000);

    let mut split_phase = PhaseState::ZERO;
    let first: ToneBlock<64> = ToneBlock::generate(&mut split_phase, tone, SAMPLE_RATE);
    let second: ToneBlock<64> = ToneBlock::generate(&mut split_phase, tone, SAMPLE_RATE);

    let mut whole_phase = PhaseState::ZERO;
    let whole: ToneBlock<128> = ToneBlock::generate(&mut whole_phase, tone, SAMPLE_RATE);

    let joined: Vec<i16> = first.samples().iter().chain(second.samples().iter()).copied().collect();
    for (i, (&a, &b)) in joined.iter().zip(whole.samples().iter()).enumerate() {
        assert!((a as i32 - b as i32).abs() <= 1, "discontinuity at sample {}: {} vs {}", i, a, b);
    }
    assert_abs_diff_eq!(split_phase.radians(), whole_phase.radians(), epsilon = 1e-4);
}

#[test]
fn test_no_jump_at_block_boundary() {
    let tone = Tone::sine(2000, 2000);
    let mut phase = PhaseState::ZERO;
    let first: ToneBlock = ToneBlock::generate(&mut phase, tone, SAMPLE_RATE);
    let second: ToneBlock = ToneBlock::generate(&mut phase, tone, SAMPLE_RATE);

    // Max slope of a 2kHz sine at amplitude 2000: 2000 * 2π * 2000 / 44100 ≈ 570 per sample
    let last = *first.samples().last().unwrap() as i32;
    let next = second.samples()[0] as i32;
    assert!((next - last).abs() < 600, "jump {} -> {}", last, next);
}

#[test]
fn test_generation_is_deterministic() {
    for waveform in [Waveform::Sine, Waveform::Cosine] {
        let tone = Tone {
            frequency_hz: 5000,
            amplitude: 2000,
            waveform,
        };
        let start = PhaseState::new(1.2345);

        let mut a = start;
        let mut b = start;
        let block_a: ToneBlock = ToneBlock::generate(&mut a, tone, SAMPLE_RATE);
        let block_b: ToneBlock = ToneBlock::generate(&mut b, tone, SAMPLE_RATE);

        assert_eq!(block_a, block_b);
        assert_eq!(a, b);
    }
}

#[test]
fn test_cosine_is_quarter_period_ahead_of_sine() {
    let mut sine_phase = PhaseState::new(TAU / 4.0);
    let mut cosine_phase = PhaseState::ZERO;

    let sine: ToneBlock = ToneBlock::generate(&mut sine_phase, Tone::sine(5000, 2000), SAMPLE_RATE);
    let cosine: ToneBlock = ToneBlock::generate(&mut cosine_phase, Tone::cosine(5000, 2000), SAMPLE_RATE);

    for (&s, &c) in sine.samples().iter().zip(cosine.samples().iter()) {
        assert!((s as i32 - c as i32).abs() <= 1);
    }
}

#[test]
fn test_full_scale_amplitude_fits_i16() {
    let mut phase = PhaseState::ZERO;
    let block: ToneBlock<256> = ToneBlock::generate(&mut phase, Tone::cosine(100, 32767), SAMPLE_RATE);
    assert_eq!(block.samples()[0], 32767);
    assert!(block.samples().iter().all(|&s| s >= -32767));
}

#[test]
fn test_extreme_phases_normalize_into_range() {
    for radians in [1.0e10f32, -1.0e10, f32::MAX, f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
        let phase = PhaseState::new(radians);
        assert!(
            phase.radians() >= 0.0 && phase.radians() < TAU,
            "{} -> {}",
            radians,
            phase.radians()
        );
    }

    assert_eq!(PhaseState::new(f32::NAN), PhaseState::ZERO);
    assert_eq!(PhaseState::new(f32::INFINITY), PhaseState::ZERO);
}

#[test]
fn test_huge_advance_stays_in_range() {
    let mut phase = PhaseState::new(1.0);
    phase.advance(1.0e9);
    assert!(phase.radians() >= 0.0 && phase.radians() < TAU);

    phase.advance(-1.0e9);
    assert!(phase.radians() >= 0.0 && phase.radians() < TAU);
}

#[test]
fn test_multi_turn_phase_keeps_offset() {
    assert_abs_diff_eq!(PhaseState::new(3.0 * TAU + 0.5).radians(), 0.5, epsilon = 1e-5);
    assert_abs_diff_eq!(PhaseState::new(-0.5).radians(), TAU - 0.5, epsilon = 1e-5);
}
