//! Fixed-length weight vector operators for the genetic algorithm.
//!
//! [`random`] initializes, [`blx_alpha`] crosses over, [`mutate`] perturbs,
//! and [`normalize_l1`] projects onto the unit simplex. All operators clamp
//! into `[0, max_weight]`; normalization makes solutions that differ only by
//! a constant factor identical, which shrinks the search space.

use rand::Rng;
use rand_distr::Normal;

/// Builds a weight vector by applying `f` to each index.
///
/// # Examples
///
/// ```
/// let weights: [f32; 3] = gridmind_training::weights::from_fn(|i| i as f32);
/// assert_eq!(weights, [0.0, 1.0, 2.0]);
/// ```
pub fn from_fn<F, const N: usize>(f: F) -> [f32; N]
where
    F: FnMut(usize) -> f32,
{
    std::array::from_fn(f)
}

/// Samples each weight uniformly from `[0, max_weight]`.
pub fn random<R, const N: usize>(rng: &mut R, max_weight: f32) -> [f32; N]
where
    R: Rng + ?Sized,
{
    from_fn(|_| rng.random_range(0.0..=max_weight))
}

/// BLX-α blend crossover.
///
/// Each child weight is drawn uniformly from the parents' range expanded by
/// `alpha` times its width, then clamped. `alpha = 0` keeps children strictly
/// between their parents; `alpha = 0.5` is the usual exploratory setting.
pub fn blx_alpha<R, const N: usize>(
    p1: &[f32; N],
    p2: &[f32; N],
    alpha: f32,
    max_weight: f32,
    rng: &mut R,
) -> [f32; N]
where
    R: Rng + ?Sized,
{
    from_fn(|i| {
        let min = f32::min(p1[i], p2[i]);
        let max = f32::max(p1[i], p2[i]);
        let spread = alpha * (max - min);
        rng.random_range(min - spread..=max + spread)
            .clamp(0.0, max_weight)
    })
}

/// Gaussian mutation in place: with probability `rate` per weight, add noise
/// from `N(0, sigma)` and clamp.
pub fn mutate<R>(weights: &mut [f32], sigma: f32, max_weight: f32, rate: f32, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let normal = Normal::new(0.0, sigma).expect("sigma is finite and non-negative");
    for w in weights {
        if rng.random_bool(rate.into()) {
            *w = (*w + rng.sample(normal)).clamp(0.0, max_weight);
        }
    }
}

/// L1 normalization in place: scales weights to sum to 1.0. A zero vector is
/// left unchanged.
pub fn normalize_l1(weights: &mut [f32]) {
    let sum: f32 = weights.iter().copied().sum();
    if sum > 0.0 {
        for w in weights {
            *w /= sum;
        }
    }
}
