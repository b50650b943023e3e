//! Offline rendering and WAV export of a harmonic series.

use std::path::Path;

use crate::harmonic::HarmonicSeries;

use super::bank::OscillatorBank;
use super::limiter::Limiter;

/// Sample encoding for exported files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WavFormat {
    #[default]
    Int16,
    Float32,
}

/// Render `seconds` of the series as mono samples through the limiter.
///
/// `gain` is the master gain (see [`super::params::calculate_volume`]).
pub fn render_series(
    series: &HarmonicSeries,
    base_frequency: f64,
    gain: f32,
    seconds: f64,
    sample_rate: u32,
) -> Vec<f32> {
    let frames = (seconds.max(0.0) * sample_rate as f64).round() as usize;
    let mut samples = vec![0.0f32; frames];
    let mut bank = OscillatorBank::from_series(series, base_frequency, sample_rate);
    bank.render(&mut samples, 1, gain);
    let clipped = Limiter::default().limit_block(&mut samples);
    if clipped > 0 {
        log::debug!("limiter clipped {clipped} of {frames} samples");
    }
    samples
}

/// Write mono samples to a WAV file.
pub fn write_wav(
    path: &Path,
    samples: &[f32],
    sample_rate: u32,
    format: WavFormat,
) -> Result<(), hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: match format {
            WavFormat::Int16 => 16,
            WavFormat::Float32 => 32,
        },
        sample_format: match format {
            WavFormat::Int16 => hound::SampleFormat::Int,
            WavFormat::Float32 => hound::SampleFormat::Float,
        },
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &s in samples {
        match format {
            WavFormat::Int16 => writer.write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?,
            WavFormat::Float32 => writer.write_sample(s)?,
        }
    }
    writer.finalize()?;
    log::debug!(
        "wrote {} samples at {sample_rate} Hz to {}",
        samples.len(),
        path.display()
    );
    Ok(())
}
