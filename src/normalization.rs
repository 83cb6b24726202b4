//! Normalization of raw color/geometric distances into one merge weight.
//!
//! The policy is fitted once on the distance populations of the initial edges
//! and stays frozen for the whole clustering run:
//! - Manual lambda: fixed blend with the configured lambda
//! - Adaptive lambda: blend with `lambda = mean_g / (mean_c + mean_g)`
//! - Equalization: each distance replaced by its empirical CDF value
//!
//! ```text
//! blend:     w = lambda * dc + (1 - lambda) * dg
//! equalize:  w = CDF_c(bin(dc)) / 2 + CDF_g(bin(dg)) / 2
//! ```

use crate::config::{MergingCriterion, DEFAULT_LAMBDA};
use crate::error::{Result, SvcError};

/// Empirical cumulative distribution over equal-width bins spanning [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Cdf {
    values: Vec<f32>,
}

impl Cdf {
    pub fn bins_num(&self) -> usize {
        self.values.len()
    }

    /// Cumulative fraction of the population at or below `bin`.
    pub fn at_bin(&self, bin: usize) -> f32 {
        self.values[bin.min(self.values.len() - 1)]
    }

    /// Percentile of a raw distance.
    pub fn value(&self, distance: f32) -> f32 {
        self.at_bin(bin_index(distance, self.values.len()))
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

/// Bin of a distance in [0, 1]; 1.0 (and anything above) lands in the last bin.
pub fn bin_index(distance: f32, bins_num: usize) -> usize {
    let last = bins_num.saturating_sub(1);
    let scaled = (distance * bins_num as f32).floor();
    if scaled.is_nan() || scaled <= 0.0 {
        0
    } else {
        (scaled as usize).min(last)
    }
}

/// Build the CDF of a distance population.
///
/// The last bin is exactly 1.0 for any non-empty population; an empty
/// population yields an all-zero table. Zero bins is a configuration error.
pub fn compute_cdf(population: &[f32], bins_num: u16) -> Result<Cdf> {
    if bins_num == 0 {
        return Err(SvcError::config("bins_num must be greater than 0"));
    }
    let bins_num = usize::from(bins_num);
    let mut bins = vec![0usize; bins_num];
    for &d in population {
        bins[bin_index(d, bins_num)] += 1;
    }

    let n = population.len();
    let mut cumulative = 0usize;
    let values = bins
        .iter()
        .map(|count| {
            cumulative += count;
            if n == 0 {
                0.0
            } else {
                (cumulative as f64 / n as f64) as f32
            }
        })
        .collect();

    Ok(Cdf { values })
}

/// Online running mean (Welford update).
pub fn running_mean(values: impl IntoIterator<Item = f32>) -> f32 {
    let mut mean = 0.0f64;
    let mut count = 0.0f64;
    for v in values {
        count += 1.0;
        mean += (v as f64 - mean) / count;
    }
    mean as f32
}

/// Frozen mapping from `(color, geometric)` distances to a merge weight.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizationPolicy {
    Blend { lambda: f32 },
    Equalize { cdf_c: Cdf, cdf_g: Cdf },
}

impl NormalizationPolicy {
    /// Fit the policy on the distances of every initial edge.
    ///
    /// Out-of-range parameters (lambda outside [0, 1], zero bins) are
    /// rejected before any fitting.
    pub fn fit(criterion: MergingCriterion, deltas_c: &[f32], deltas_g: &[f32]) -> Result<Self> {
        criterion.validate()?;
        Ok(match criterion {
            MergingCriterion::ManualLambda { lambda } => NormalizationPolicy::Blend { lambda },
            MergingCriterion::AdaptiveLambda => NormalizationPolicy::Blend {
                lambda: adaptive_lambda(deltas_c, deltas_g),
            },
            MergingCriterion::Equalization { bins_num } => NormalizationPolicy::Equalize {
                cdf_c: compute_cdf(deltas_c, bins_num)?,
                cdf_g: compute_cdf(deltas_g, bins_num)?,
            },
        })
    }

    pub fn weight(&self, delta_c: f32, delta_g: f32) -> f32 {
        match self {
            NormalizationPolicy::Blend { lambda } => {
                lambda * delta_c + (1.0 - lambda) * delta_g
            }
            NormalizationPolicy::Equalize { cdf_c, cdf_g } => {
                cdf_c.value(delta_c) / 2.0 + cdf_g.value(delta_g) / 2.0
            }
        }
    }

    pub fn lambda(&self) -> Option<f32> {
        match self {
            NormalizationPolicy::Blend { lambda } => Some(*lambda),
            NormalizationPolicy::Equalize { .. } => None,
        }
    }
}

fn adaptive_lambda(deltas_c: &[f32], deltas_g: &[f32]) -> f32 {
    let mean_c = running_mean(deltas_c.iter().copied());
    let mean_g = running_mean(deltas_g.iter().copied());
    let total = mean_c + mean_g;
    if total.is_finite() && total > 0.0 {
        mean_g / total
    } else {
        DEFAULT_LAMBDA
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cdf_ends_at_one_and_never_decreases() {
        let population = [0.05, 0.1, 0.1, 0.42, 0.9, 1.0, 0.73, 0.33];
        let cdf = compute_cdf(&population, 10).expect("cdf");
        assert_eq!(cdf.bins_num(), 10);
        assert_eq!(*cdf.values().last().expect("bins"), 1.0);
        for pair in cdf.values().windows(2) {
            assert!(pair[0] <= pair[1], "{:?}", cdf.values());
        }
    }

    #[test]
    fn cdf_counts_per_bin() {
        let cdf = compute_cdf(&[0.0, 0.24, 0.5, 1.0], 4).expect("cdf");
        assert_eq!(cdf.values(), &[0.5, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn cdf_of_empty_population_is_zero() {
        let cdf = compute_cdf(&[], 5).expect("cdf");
        assert!(cdf.values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn exact_one_is_clamped_to_last_bin() {
        assert_eq!(bin_index(1.0, 500), 499);
        assert_eq!(bin_index(1.3, 500), 499);
        assert_eq!(bin_index(0.0, 500), 0);
        assert_eq!(bin_index(-0.2, 500), 0);
        assert_eq!(bin_index(0.5, 4), 2);
    }

    #[test]
    fn running_mean_matches_arithmetic_mean() {
        let values: Vec<f32> = (0..10).map(|i| i as f32).collect();
        assert!((running_mean(values.iter().copied()) - 4.5).abs() < 1e-6);
        assert_eq!(running_mean(std::iter::empty()), 0.0);
    }

    #[test]
    fn manual_blend_uses_lambda() {
        let policy = NormalizationPolicy::fit(MergingCriterion::ManualLambda { lambda: 0.25 }, &[], &[])
            .expect("fit");
        assert!((policy.weight(0.8, 0.4) - (0.25 * 0.8 + 0.75 * 0.4)).abs() < 1e-6);
        assert_eq!(policy.lambda(), Some(0.25));
    }

    #[test]
    fn adaptive_lambda_balances_means() {
        let policy = NormalizationPolicy::fit(
            MergingCriterion::AdaptiveLambda,
            &[0.2, 0.4, 0.6],
            &[0.1, 0.1, 0.1],
        )
        .expect("fit");
        let lambda = policy.lambda().expect("blend");
        assert!((lambda - 0.1 / 0.5).abs() < 1e-6, "lambda {lambda}");
    }

    #[test]
    fn adaptive_lambda_falls_back_on_zero_population() {
        let policy = NormalizationPolicy::fit(MergingCriterion::AdaptiveLambda, &[0.0], &[0.0])
            .expect("fit");
        assert_eq!(policy.lambda(), Some(DEFAULT_LAMBDA));
    }

    #[test]
    fn equalization_halves_percentiles() {
        let policy = NormalizationPolicy::fit(
            MergingCriterion::Equalization { bins_num: 4 },
            &[0.0, 0.24, 0.5, 1.0],
            &[1.0, 1.0, 1.0, 1.0],
        )
        .expect("fit");
        // color 0.1 -> bin 0 -> 0.5; geometric 1.0 -> last bin -> 1.0
        assert!((policy.weight(0.1, 1.0) - 0.75).abs() < 1e-6);
        // geometric distance of exactly 1.0 never indexes out of range
        assert!((policy.weight(1.0, 1.0) - 1.0).abs() < 1e-6);
        assert!(policy.lambda().is_none());
    }

    #[test]
    fn zero_bins_is_rejected() {
        let err = compute_cdf(&[0.2, 0.4], 0).unwrap_err();
        assert!(matches!(err, SvcError::Config(_)));
    }

    #[test]
    fn fit_rejects_out_of_range_parameters() {
        let err = NormalizationPolicy::fit(MergingCriterion::ManualLambda { lambda: 7.0 }, &[0.1], &[0.2])
            .unwrap_err();
        assert!(matches!(err, SvcError::Config(_)));

        let err = NormalizationPolicy::fit(MergingCriterion::Equalization { bins_num: 0 }, &[0.1], &[0.2])
            .unwrap_err();
        assert!(matches!(err, SvcError::Config(_)));
    }
}
