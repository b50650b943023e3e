//! Signal shaping for polar exploration — cycle tiling and seeded noise.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Tile one sampled cycle `cycles` times.
///
/// `cycle` is expected to include both endpoints (as produced by
/// [`crate::synth::synthesize`]), so the duplicated endpoint is dropped
/// between repetitions and kept once at the very end.
pub fn repeat_cycles(cycle: &[f64], cycles: usize) -> Vec<f64> {
    if cycle.is_empty() || cycles == 0 {
        return Vec::new();
    }
    let body = &cycle[..cycle.len() - 1];
    let mut out = Vec::with_capacity(body.len() * cycles + 1);
    for _ in 0..cycles {
        out.extend_from_slice(body);
    }
    out.push(cycle[cycle.len() - 1]);
    out
}

/// Add uniform noise in `[-amount, amount]`, reproducible for a given seed.
pub fn add_noise(signal: &[f64], amount: f64, seed: u64) -> Vec<f64> {
    if amount == 0.0 {
        return signal.to_vec();
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let amount = amount.abs();
    signal
        .iter()
        .map(|&s| s + rng.gen_range(-amount..=amount))
        .collect()
}
