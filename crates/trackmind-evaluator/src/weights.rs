//! Weight vector operations shared by the policy and the optimizers.
//!
//! - **Initialization**: [`random`] draws each weight uniformly from a range
//! - **Mutation**: [`mutate`] applies clamped Gaussian noise to a random subset of weights
//! - **Bounding**: [`clamp`] forces every weight back into a range
//!
//! All functions take the random number generator explicitly so that a seeded
//! generator reproduces a whole training run.

use std::ops::RangeInclusive;

use rand::Rng;
use rand_distr::Normal;

/// Generates `len` weights sampled uniformly from `range`.
pub fn random<R>(rng: &mut R, range: RangeInclusive<f32>, len: usize) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    (0..len).map(|_| rng.random_range(range.clone())).collect()
}

/// Applies Gaussian mutation in place.
///
/// Each weight is perturbed with probability `rate` by noise drawn from
/// `N(0, sigma)`, then clamped into `range`. Weights that are not selected are
/// left untouched, so a clone mutated with a small `rate` may come out
/// identical to its parent.
///
/// # Panics
///
/// Panics if `sigma` is negative or not finite.
pub fn mutate<R>(weights: &mut [f32], rate: f64, sigma: f32, range: RangeInclusive<f32>, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let normal = Normal::new(0.0, sigma).expect("mutation sigma must be finite and non-negative");
    let rate = rate.clamp(0.0, 1.0);
    for w in weights {
        if rng.random_bool(rate) {
            *w = (*w + rng.sample(normal)).clamp(*range.start(), *range.end());
        }
    }
}

/// Clamps every weight into `range`.
pub fn clamp(weights: &mut [f32], range: &RangeInclusive<f32>) {
    for w in weights {
        *w = w.clamp(*range.start(), *range.end());
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_random_within_range() {
        let mut rng = Pcg32::seed_from_u64(1);
        let weights = random(&mut rng, -2.0..=3.0, 500);
        assert_eq!(weights.len(), 500);
        assert!(weights.iter().all(|w| (-2.0..=3.0).contains(w)));
    }

    #[test]
    fn test_mutate_respects_range() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut weights = vec![4.9; 1000];
        mutate(&mut weights, 1.0, 5.0, -5.0..=5.0, &mut rng);
        assert!(weights.iter().all(|w| (-5.0..=5.0).contains(w)));
        assert!(weights.iter().any(|&w| (w - 4.9).abs() > f32::EPSILON));
    }

    #[test]
    fn test_mutate_zero_rate_is_identity() {
        let mut rng = Pcg32::seed_from_u64(3);
        let original = random(&mut rng, -1.0..=1.0, 100);
        let mut weights = original.clone();
        mutate(&mut weights, 0.0, 1.0, -5.0..=5.0, &mut rng);
        assert_eq!(weights, original);
    }

    #[test]
    fn test_clamp() {
        let mut weights = vec![-10.0, 0.5, 10.0];
        clamp(&mut weights, &(-1.0..=1.0));
        assert_eq!(weights, vec![-1.0, 0.5, 1.0]);
    }
}
