//! The causal estimator: row filtering, seeded subsampling, the BART fit,
//! and posterior summarization.

use rand::SeedableRng;
use rand::rngs::StdRng;
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

use edgap_model::{AnalysisConfig, EffectEstimate, EstimationError};

use crate::bart;

/// Minimum rows per arm for a fit to be attempted.
const MIN_ARM_ROWS: usize = 2;

/// Confounder-adjusted effect estimator over one stratum.
///
/// Wraps the BART response surface: both arms are fit in a single model and
/// the effect is read off the posterior of the counterfactual difference.
#[derive(Debug, Clone, Copy)]
pub struct CausalEstimator<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> CausalEstimator<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Estimate the average treatment effect of `treatment` on `outcome`
    /// adjusting for `confounders` (one feature row per observation).
    ///
    /// Rows carrying a non-finite value anywhere are excluded from the fit,
    /// never imputed. Fits larger than the configured cap are subsampled
    /// with the run seed, so repeated runs are bit-for-bit identical.
    pub fn estimate(
        &self,
        treatment: &[u8],
        outcome: &[f64],
        confounders: &[Vec<f64>],
    ) -> Result<EffectEstimate, EstimationError> {
        let mut usable: Vec<usize> = (0..outcome.len())
            .filter(|&i| {
                outcome[i].is_finite() && confounders[i].iter().all(|v| v.is_finite())
            })
            .collect();

        if usable.len() > self.config.max_fit_rows {
            let mut rng = StdRng::seed_from_u64(self.config.seed);
            let picked =
                rand::seq::index::sample(&mut rng, usable.len(), self.config.max_fit_rows);
            let mut subsample: Vec<usize> = picked.iter().map(|k| usable[k]).collect();
            // Restore dataset order so the fit never depends on draw order.
            subsample.sort_unstable();
            usable = subsample;
        }

        let n_treated = usable.iter().filter(|&&i| treatment[i] == 1).count();
        let n_control = usable.len() - n_treated;
        if n_treated < MIN_ARM_ROWS || n_control < MIN_ARM_ROWS {
            if n_treated == 0 || n_control == 0 {
                return Err(EstimationError::SingleArm {
                    treated: n_treated,
                    control: n_control,
                });
            }
            return Err(EstimationError::TooFewRows { rows: usable.len() });
        }
        if confounders.first().is_none_or(|row| row.is_empty()) {
            return Err(EstimationError::NoConfounders);
        }

        let y: Vec<f64> = usable.iter().map(|&i| outcome[i]).collect();
        let spread = y.iter().copied().fold(f64::NEG_INFINITY, f64::max)
            - y.iter().copied().fold(f64::INFINITY, f64::min);
        if spread <= f64::EPSILON {
            return Err(EstimationError::ConstantOutcome);
        }

        // Design matrix: treatment first, confounders after.
        let x: Vec<Vec<f64>> = usable
            .iter()
            .map(|&i| {
                let mut row = Vec::with_capacity(1 + confounders[i].len());
                row.push(f64::from(treatment[i]));
                row.extend_from_slice(&confounders[i]);
                row
            })
            .collect();

        debug!(
            rows = usable.len(),
            n_treated, n_control, "fitting response surface"
        );
        let draws = bart::posterior_ate_draws(&x, &y, 0, self.config);
        Ok(summarize(&draws, n_treated, n_control))
    }
}

/// Collapse posterior draws into the exported estimate.
fn summarize(draws: &[f64], n_treated: usize, n_control: usize) -> EffectEstimate {
    let ate = mean(draws);
    let mut sorted = draws.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    EffectEstimate {
        ate,
        ci_lower: percentile(&sorted, 0.025),
        ci_upper: percentile(&sorted, 0.975),
        p_value: posterior_p_value(ate, std_dev(draws, ate)),
        n_treated,
        n_control,
    }
}

/// Two-sided p-value treating the effect posterior as approximately normal:
/// p = 2 * (1 - Phi(|ate| / sd)). An approximation carried over deliberately
/// for output parity; do not replace with a tail-probability count.
fn posterior_p_value(ate: f64, sd: f64) -> f64 {
    if sd <= f64::EPSILON {
        return if ate == 0.0 { 1.0 } else { 0.0 };
    }
    let normal = Normal::new(0.0, 1.0).expect("standard normal parameters");
    (2.0 * (1.0 - normal.cdf(ate.abs() / sd))).clamp(0.0, 1.0)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Linear-interpolation percentile of pre-sorted draws.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let h = (n - 1) as f64 * p;
            let lo = h.floor() as usize;
            let frac = h - lo as f64;
            if lo + 1 < n {
                sorted[lo] + frac * (sorted[lo + 1] - sorted[lo])
            } else {
                sorted[lo]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{percentile, posterior_p_value, std_dev, summarize};

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&sorted, 0.0), 1.0);
        assert_eq!(percentile(&sorted, 0.5), 3.0);
        assert_eq!(percentile(&sorted, 1.0), 5.0);
        assert!((percentile(&sorted, 0.025) - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_p_value_degenerate_posterior() {
        assert_eq!(posterior_p_value(0.0, 0.0), 1.0);
        assert_eq!(posterior_p_value(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_p_value_large_effect_is_small() {
        let wide = posterior_p_value(0.1, 1.0);
        let strong = posterior_p_value(5.0, 1.0);
        assert!(strong < 0.001);
        assert!(wide > 0.9);
    }

    #[test]
    fn test_summarize_orders_interval() {
        let draws: Vec<f64> = (0..100).map(|i| f64::from(i) / 10.0).collect();
        let estimate = summarize(&draws, 10, 20);
        assert!(estimate.ci_lower < estimate.ate);
        assert!(estimate.ate < estimate.ci_upper);
        assert_eq!(estimate.n_treated, 10);
        assert_eq!(estimate.n_control, 20);
    }

    #[test]
    fn test_std_dev_constant_is_zero() {
        let values = [2.0, 2.0, 2.0];
        assert_eq!(std_dev(&values, 2.0), 0.0);
    }
}
