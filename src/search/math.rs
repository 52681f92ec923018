use crate::*;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand_distr::Gamma;

/// Max-shifted softmax. Empty in, empty out.
pub fn softmax(xs: &[f32]) -> Vec<Probability> {
    let max = xs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps = xs.iter().map(|x| (x - max).exp()).collect::<Vec<_>>();
    let sum = exps.iter().sum::<f32>().max(POLICY_MIN);
    exps.into_iter().map(|e| e / sum).collect()
}

/// Rescale to unit mass; uniform if there is no mass to rescale.
pub fn normalize(xs: &[f32]) -> Vec<Probability> {
    let sum = xs.iter().sum::<f32>();
    match sum > 0. && sum.is_finite() {
        true => xs.iter().map(|x| x / sum).collect(),
        false => vec![1. / xs.len() as f32; xs.len()],
    }
}

/// Indices of the `k` largest entries, largest first. Ties keep the lower index.
pub fn top_k(xs: &[f32], k: usize) -> Vec<usize> {
    let mut order = (0..xs.len()).collect::<Vec<_>>();
    order.sort_by(|a, b| xs[*b].total_cmp(&xs[*a]).then(a.cmp(b)));
    order.truncate(k);
    order
}

/// Draw from a symmetric Dirichlet(alpha) via normalized Gamma(alpha, 1) samples.
pub fn dirichlet<R: Rng>(n: usize, alpha: f32, rng: &mut R) -> Vec<Probability> {
    match Gamma::new(alpha, 1.) {
        Ok(gamma) => normalize(&(0..n).map(|_| gamma.sample(rng)).collect::<Vec<f32>>()),
        Err(_) => vec![1. / n as f32; n],
    }
}

/// `eps · Dir(ascale / n) + (1 − eps) · p`.
pub fn perturb<R: Rng>(p: &[Probability], eps: f32, ascale: f32, rng: &mut R) -> Vec<Probability> {
    if eps <= 0. || p.is_empty() {
        return p.to_vec();
    }
    dirichlet(p.len(), ascale / p.len() as f32, rng)
        .into_iter()
        .zip(p.iter())
        .map(|(noise, prior)| eps * noise + (1. - eps) * prior)
        .collect()
}

/// Weights as [`categorical`] draws from them: NaN and anything below
/// `POLICY_MIN` floored, infinities capped so the total stays finite.
pub fn floored(weights: &[f32]) -> Vec<f32> {
    let cap = f32::MAX / (2 * weights.len().max(1)) as f32;
    weights.iter().map(|w| w.max(POLICY_MIN).min(cap)).collect()
}

/// Categorical draw proportional to `weights`. Degenerate weights draw uniformly.
pub fn categorical<R: Rng>(weights: &[f32], rng: &mut R) -> usize {
    match WeightedIndex::new(floored(weights)) {
        Ok(distribution) => distribution.sample(rng),
        Err(_) => rng.random_range(0..weights.len()),
    }
}
