//! Per-unit estimation outcomes.

use serde::Serialize;

/// Posterior summary of one causal fit. Values are on the outcome scale
/// (minutes).
#[derive(Debug, Clone, Serialize)]
pub struct EffectEstimate {
    /// Posterior-mean average treatment effect.
    pub ate: f64,
    /// 2.5% posterior percentile.
    pub ci_lower: f64,
    /// 97.5% posterior percentile.
    pub ci_upper: f64,
    /// Two-sided p-value from the posterior-normality approximation.
    pub p_value: f64,
    /// Treated rows actually used in the fit.
    pub n_treated: usize,
    /// Control rows actually used in the fit.
    pub n_control: usize,
}

/// What happened to one analysis unit.
///
/// An explicit three-way outcome so a failed fit can never be read as a zero
/// effect: skipped units never reached the estimator, failed units did and
/// could not be fit.
#[derive(Debug, Clone, Serialize)]
pub enum UnitOutcome {
    Estimated(EffectEstimate),
    Skipped { rows: usize, required: usize },
    Failed { reason: String },
}

impl UnitOutcome {
    /// The estimate, when one was produced.
    pub fn estimate(&self) -> Option<&EffectEstimate> {
        match self {
            UnitOutcome::Estimated(estimate) => Some(estimate),
            _ => None,
        }
    }
}

/// Run-level tallies reported alongside the output.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RunStats {
    pub analyzed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunStats {
    pub fn record(&mut self, outcome: &UnitOutcome) {
        match outcome {
            UnitOutcome::Estimated(_) => self.analyzed += 1,
            UnitOutcome::Skipped { .. } => self.skipped += 1,
            UnitOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.analyzed + self.skipped + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::{EffectEstimate, RunStats, UnitOutcome};

    #[test]
    fn test_run_stats_tallies() {
        let mut stats = RunStats::default();
        stats.record(&UnitOutcome::Estimated(EffectEstimate {
            ate: 1.0,
            ci_lower: 0.5,
            ci_upper: 1.5,
            p_value: 0.01,
            n_treated: 10,
            n_control: 20,
        }));
        stats.record(&UnitOutcome::Skipped {
            rows: 49,
            required: 50,
        });
        stats.record(&UnitOutcome::Failed {
            reason: "outcome has zero variance".to_string(),
        });
        assert_eq!(stats.analyzed, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.total(), 3);
    }

    #[test]
    fn test_estimate_accessor() {
        let outcome = UnitOutcome::Skipped {
            rows: 0,
            required: 10,
        };
        assert!(outcome.estimate().is_none());
    }

    #[test]
    fn test_outcome_serializes_with_variant_tag() {
        let outcome = UnitOutcome::Skipped {
            rows: 49,
            required: 50,
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["Skipped"]["rows"], 49);
        assert_eq!(value["Skipped"]["required"], 50);
    }
}
