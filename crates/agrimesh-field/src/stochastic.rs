//! Sampling helpers over an injected random source.
//!
//! Every stochastic element of the field draws from an [`Rng`] handed in by
//! the caller, so a seeded generator reproduces a run exactly.

use rand::Rng;

/// Sample a normal deviate via the Box-Muller transform.
pub fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.random();
    let radius = (-2.0 * u1.ln()).sqrt();
    mean + std_dev * radius * (core::f64::consts::TAU * u2).cos()
}

/// Sample an exponential deviate with the given mean via inverse transform.
pub fn exponential<R: Rng + ?Sized>(rng: &mut R, mean: f64) -> f64 {
    let u: f64 = rng.random();
    -mean * (1.0 - u).max(f64::MIN_POSITIVE).ln()
}

/// Sample an index from an unnormalized categorical distribution.
///
/// Weights are renormalized internally; an all-zero distribution yields
/// index 0.
pub fn categorical<R: Rng + ?Sized>(rng: &mut R, weights: &[f64]) -> usize {
    let total: f64 = weights.iter().filter(|w| w.is_finite() && **w > 0.0).sum();
    if total <= 0.0 {
        return 0;
    }
    let mut draw: f64 = rng.random::<f64>() * total;
    for (index, weight) in weights.iter().enumerate() {
        if !weight.is_finite() || *weight <= 0.0 {
            continue;
        }
        draw -= weight;
        if draw <= 0.0 {
            return index;
        }
    }
    weights.len().saturating_sub(1)
}
