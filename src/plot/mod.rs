//! Plot geometry — turns synthesizer and remapper output into drawing
//! primitives. No state; the TUI paints the result onto a canvas.

use std::f64::consts::TAU;

use crate::polar::RadialBin;
use crate::synth::Waveform;

/// Fraction of the half-height the waveform peak occupies.
const HEADROOM: f64 = 0.9;

/// Radius of the reference circle and of gap markers in the polar plot.
pub const POLAR_REFERENCE_RADIUS: f64 = 0.5;

/// Divisor squeezing a normalized bin into `[1/6, 5/6]` of the unit radius.
const POLAR_SPREAD: f64 = 1.5;

/// Amplitude-versus-phase trace in a `width` x `height` box centred on y = 0.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformPlot {
    /// `(x, y)` points, one per sample.
    pub trace: Vec<(f64, f64)>,
    /// Positive y offsets of gridlines; draw each at `+y` and `-y`.
    pub gridlines: Vec<f64>,
    /// Pixels per unit of amplitude.
    pub scale: f64,
}

/// Polar trace of folded bins in unit coordinates centred on the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarPlot {
    /// Points of defined bins, in bin order.
    pub trace: Vec<(f64, f64)>,
    /// Points on the reference circle where bins were empty.
    pub gaps: Vec<(f64, f64)>,
}

impl PolarPlot {
    /// Line segments of the trace as a closed loop, last point back to first.
    ///
    /// Fewer than three points have no area to enclose and are not closed.
    pub fn segments(&self) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
        let closing = match (self.trace.first(), self.trace.last()) {
            (Some(&first), Some(&last)) if self.trace.len() >= 3 => Some((last, first)),
            _ => None,
        };
        self.trace
            .windows(2)
            .map(|pair| (pair[0], pair[1]))
            .chain(closing)
    }
}

/// Lay out a waveform so its peak reaches 90% of the half-height.
///
/// A silent waveform is scaled as if its peak were 1.
pub fn waveform_plot(waveform: &Waveform, width: f64, height: f64) -> WaveformPlot {
    let peak = if waveform.peak > 0.0 { waveform.peak } else { 1.0 };
    let scale = HEADROOM * (height / 2.0 / peak);

    let last = waveform.samples.len().saturating_sub(1).max(1) as f64;
    let trace = waveform
        .samples
        .iter()
        .enumerate()
        .map(|(x, &v)| (x as f64 / last * width, v * scale))
        .collect();

    let levels = (height / scale).floor() as usize;
    let gridlines = (1..=levels).map(|i| i as f64 * scale).collect();

    WaveformPlot {
        trace,
        gridlines,
        scale,
    }
}

/// Place each bin on a circle: angle from its position, radius from its value.
pub fn polar_plot(bins: &[RadialBin]) -> PolarPlot {
    let n = bins.len().max(1) as f64;
    let mut trace = Vec::with_capacity(bins.len());
    let mut gaps = Vec::new();

    for (i, bin) in bins.iter().enumerate() {
        let angle = i as f64 / n * TAU;
        match bin {
            RadialBin::Defined(v) => trace.push(polar_point(bin_radius(*v), angle)),
            RadialBin::Empty => gaps.push(polar_point(POLAR_REFERENCE_RADIUS, angle)),
        }
    }

    PolarPlot { trace, gaps }
}

/// Radius of a normalized bin value.
pub fn bin_radius(value: f64) -> f64 {
    (1.0 + value / POLAR_SPREAD) / 2.0
}

fn polar_point(radius: f64, angle: f64) -> (f64, f64) {
    (radius * angle.cos(), radius * angle.sin())
}
