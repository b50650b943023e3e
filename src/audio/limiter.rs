//! Output limiter — keeps normalized playback from clipping the device.

/// Largest magnitude allowed through by default.
pub const DEFAULT_CEILING: f32 = 0.95;

/// Hard clamp to `[-ceiling, ceiling]`; non-finite samples become silence.
///
/// Normalizing by `1 / mean_abs` can push peaky series (few strong
/// overtones) well past full scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limiter {
    ceiling: f32,
}

impl Limiter {
    /// `ceiling` is taken as a magnitude and capped at full scale.
    pub fn new(ceiling: f32) -> Self {
        Self {
            ceiling: ceiling.abs().min(1.0),
        }
    }

    pub fn ceiling(&self) -> f32 {
        self.ceiling
    }

    #[inline]
    pub fn limit(&self, sample: f32) -> f32 {
        if sample.is_finite() {
            sample.clamp(-self.ceiling, self.ceiling)
        } else {
            0.0
        }
    }

    /// Limit a buffer in place and return how many samples were altered.
    pub fn limit_block(&self, buffer: &mut [f32]) -> usize {
        let mut altered = 0;
        for sample in buffer.iter_mut() {
            let limited = self.limit(*sample);
            if limited != *sample || sample.is_nan() {
                altered += 1;
            }
            *sample = limited;
        }
        altered
    }
}

impl Default for Limiter {
    fn default() -> Self {
        Self::new(DEFAULT_CEILING)
    }
}
