//! End-to-end pipeline tests — series → waveform → polar bins → plot
//! geometry → offline audio.

use std::f64::consts::{PI, TAU};

use assert_approx_eq::assert_approx_eq;

use harmonia::audio::{calculate_volume, normalization_factor, render_series};
use harmonia::harmonic::{Harmonic, HarmonicSeries};
use harmonia::plot::{polar_plot, waveform_plot};
use harmonia::polar::{
    gap_count, remap_to_polar, remap_to_polar_default, PolarConfig, PolarError, RadialBin,
};
use harmonia::signal::{add_noise, repeat_cycles};
use harmonia::synth::synthesize;

fn max_abs(bins: &[RadialBin]) -> f64 {
    bins.iter()
        .filter_map(RadialBin::value)
        .fold(0.0, |m, v| m.max(v.abs()))
}

#[test]
fn fundamental_plus_octave_at_quarter_turns() {
    let harmonics = [Harmonic::new(0, 1.0, 0.0), Harmonic::new(1, 0.5, 0.0)];
    let wave = synthesize(&harmonics, 4);

    let angles = [0.0, PI / 2.0, PI, 3.0 * PI / 2.0, TAU];
    let expected: Vec<f64> = angles
        .iter()
        .map(|&t| t.sin() + 0.5 * (2.0 * t).sin())
        .collect();

    assert_eq!(wave.samples.len(), 5);
    for (got, want) in wave.samples.iter().zip(&expected) {
        assert_approx_eq!(*got, *want, 1e-12);
    }
    let peak = expected.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    assert_approx_eq!(wave.peak, peak, 1e-12);
    let area: f64 = expected.iter().map(|v| v.abs()).sum();
    assert_approx_eq!(wave.mean_abs, area / 4.0, 1e-12);
}

#[test]
fn silent_series_is_zero_everywhere() {
    for discretization in [1, 7, 250, 800] {
        let wave = synthesize(HarmonicSeries::silent(16).as_slice(), discretization);
        assert!(wave.samples.iter().all(|s| *s == 0.0));
        assert_eq!(wave.peak, 0.0);
        assert_eq!(wave.mean_abs, 0.0);
    }
    // Playback guard: no division by zero, output muted.
    assert_eq!(normalization_factor(0.0), 0.0);
    assert_eq!(calculate_volume(normalization_factor(0.0)), 0.0);
}

#[test]
fn half_period_shift_negates_waveform() {
    let plain = synthesize(&[Harmonic::new(0, 1.0, 0.0)], 360);
    let shifted = synthesize(&[Harmonic::new(0, 1.0, 0.5)], 360);
    for (a, b) in plain.samples.iter().zip(&shifted.samples) {
        assert_approx_eq!(*a, -*b, 1e-9);
    }
}

#[test]
fn folding_two_cycles_at_half_compression_is_gapless() {
    let wave = synthesize(&[Harmonic::new(0, 1.0, 0.0)], 200);
    let signal = repeat_cycles(&wave.samples, 2);
    assert_eq!(signal.len(), 401);

    let bins = remap_to_polar(&signal, 0.5, &PolarConfig::new(100)).unwrap();
    assert_eq!(bins.len(), 100);
    assert_eq!(gap_count(&bins), 0);
    assert_approx_eq!(max_abs(&bins), 1.0, 1e-12);
}

#[test]
fn normalization_holds_for_noisy_input() {
    let wave = synthesize(HarmonicSeries::sawtooth().as_slice(), 300);
    let noisy = add_noise(&repeat_cycles(&wave.samples, 3), 0.2, 7);

    for compression in [0.0, 0.3, 0.66, 0.9] {
        let bins = remap_to_polar_default(&noisy, compression, 250).unwrap();
        assert_approx_eq!(max_abs(&bins), 1.0, 1e-12);
    }
}

#[test]
fn degenerate_compression_is_rejected() {
    let wave = synthesize(&[Harmonic::new(0, 1.0, 0.0)], 50);
    for compression in [0.995, 1.0, 1.5, -0.1, f64::NAN] {
        let err = remap_to_polar_default(&wave.samples, compression, 50).unwrap_err();
        assert!(matches!(err, PolarError::DegenerateCompression(_)));
    }
    assert!(remap_to_polar_default(&wave.samples, 0.99, 50).is_ok());
}

#[test]
fn sparse_signal_leaves_flagged_gaps() {
    // Two samples over a thousand bins: most bins receive nothing.
    let bins = remap_to_polar(&[1.0, -1.0], 0.0, &PolarConfig::new(1000).with_oversampling(0.1))
        .unwrap();
    let gaps = gap_count(&bins);
    assert!(gaps > 0);

    let plot = polar_plot(&bins);
    assert_eq!(plot.gaps.len(), gaps);
    assert_eq!(plot.trace.len(), bins.len() - gaps);
}

#[test]
fn waveform_plot_scales_series_peak() {
    let wave = synthesize(HarmonicSeries::square().as_slice(), 800);
    let plot = waveform_plot(&wave, 800.0, 250.0);
    let top = plot.trace.iter().fold(0.0_f64, |m, p| m.max(p.1.abs()));
    assert_approx_eq!(top, 112.5, 1e-9);
}

#[test]
fn offline_render_is_normalized_and_bounded() {
    let series = HarmonicSeries::square();
    let wave = synthesize(series.as_slice(), 800);
    let gain = calculate_volume(normalization_factor(wave.mean_abs)) as f32;
    assert!(gain > 0.0 && gain <= 0.45);

    let samples = render_series(&series, 220.0, gain, 0.25, 16_000);
    assert_eq!(samples.len(), 4000);
    assert!(samples.iter().all(|s| s.abs() <= 0.95 + 1e-6));
    assert!(samples.iter().any(|s| s.abs() > 0.05));
}
