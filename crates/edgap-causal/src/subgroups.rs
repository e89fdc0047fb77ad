//! Subgroup enumeration: every analysis unit, in canonical order, with
//! sample-size gating and per-unit error isolation.

use tracing::{info, warn};

use edgap_model::{
    AnalysisConfig, AnalysisUnit, CleanRecord, CleanedDataset, RunStats, UnitOutcome,
};

use crate::estimator::CausalEstimator;

/// Drives the estimator over every analysis unit of a cleaned dataset.
///
/// Enumeration order is canonical and documented: overall per-race units
/// (races sorted), the overall gender unit, per-(year, race) units (years
/// then races sorted), then per-year gender units. Result order follows
/// enumeration order and is the stable row order of the exported table.
pub struct SubgroupRunner<'a> {
    data: &'a CleanedDataset,
    config: &'a AnalysisConfig,
}

impl<'a> SubgroupRunner<'a> {
    pub fn new(data: &'a CleanedDataset, config: &'a AnalysisConfig) -> Self {
        Self { data, config }
    }

    /// Run every unit. Gated-out units are recorded as skipped and
    /// estimator failures as failed; neither aborts the sibling units.
    pub fn run(&self) -> (Vec<(AnalysisUnit, UnitOutcome)>, RunStats) {
        let races = self.data.races();
        let years = self.data.years();
        let all: Vec<&CleanRecord> = self.data.records().iter().collect();

        let mut results = Vec::new();
        let mut stats = RunStats::default();
        let mut push = |unit: AnalysisUnit, outcome: UnitOutcome| {
            stats.record(&outcome);
            results.push((unit, outcome));
        };

        // 1. Overall, one unit per race: this race vs all others.
        for race in &races {
            let gate = all.iter().filter(|r| r.is_race(race)).count();
            let outcome = self.estimate_stratum(
                &AnalysisUnit::overall_race(race.clone()),
                &all,
                gate,
                self.config.min_race_rows,
            );
            push(AnalysisUnit::overall_race(race.clone()), outcome);
        }

        // 2. Overall gender unit.
        let outcome = self.estimate_stratum(
            &AnalysisUnit::overall_gender(),
            &all,
            all.len(),
            self.config.min_total_rows,
        );
        push(AnalysisUnit::overall_gender(), outcome);

        // 3. Per-(year, race). The gate counts the stratum itself (that
        // race within that year); the threshold is deliberately lower than
        // the per-year gender one because race strata are finer-grained.
        for &year in &years {
            let slice: Vec<&CleanRecord> =
                all.iter().copied().filter(|r| r.year == year).collect();
            for race in &races {
                let gate = slice.iter().filter(|r| r.is_race(race)).count();
                let outcome = self.estimate_stratum(
                    &AnalysisUnit::year_race(year, race.clone()),
                    &slice,
                    gate,
                    self.config.min_year_race_rows,
                );
                push(AnalysisUnit::year_race(year, race.clone()), outcome);
            }
        }

        // 4. Per-year gender.
        for &year in &years {
            let slice: Vec<&CleanRecord> =
                all.iter().copied().filter(|r| r.year == year).collect();
            let outcome = self.estimate_stratum(
                &AnalysisUnit::year_gender(year),
                &slice,
                slice.len(),
                self.config.min_year_gender_rows,
            );
            push(AnalysisUnit::year_gender(year), outcome);
        }

        info!(
            analyzed = stats.analyzed,
            skipped = stats.skipped,
            failed = stats.failed,
            "subgroup run finished"
        );
        (results, stats)
    }

    /// The one stratified-estimation routine every unit kind goes through:
    /// gate on sample size, build treatment/confounder inputs from the
    /// unit's selector functions, fit, and isolate failures.
    fn estimate_stratum(
        &self,
        unit: &AnalysisUnit,
        rows: &[&CleanRecord],
        gate_rows: usize,
        required: usize,
    ) -> UnitOutcome {
        if gate_rows < required {
            warn!(
                unit = %unit.label(),
                rows = gate_rows,
                required,
                "skipping unit below minimum sample size"
            );
            return UnitOutcome::Skipped {
                rows: gate_rows,
                required,
            };
        }

        let (treatment, outcome, confounders) = match &unit.race {
            // Race units: treatment is membership in the unit's race;
            // confounders exclude race itself.
            Some(race) => build_inputs(
                rows,
                |r| u8::from(r.is_race(race)),
                |r| vec![r.age, f64::from(r.is_female), r.risk_score],
            ),
            // Gender units: treatment is the female indicator; gender is
            // excluded from the confounders, race enters as is_black.
            None => build_inputs(
                rows,
                |r| r.is_female,
                |r| vec![r.age, r.risk_score, r.is_black()],
            ),
        };

        let estimator = CausalEstimator::new(self.config);
        match estimator.estimate(&treatment, &outcome, &confounders) {
            Ok(estimate) => UnitOutcome::Estimated(estimate),
            Err(error) => {
                warn!(unit = %unit.label(), %error, "estimation failed");
                UnitOutcome::Failed {
                    reason: error.to_string(),
                }
            }
        }
    }
}

/// Materialize treatment vector, outcome vector and confounder matrix from
/// a treatment selector and a confounder builder.
fn build_inputs(
    rows: &[&CleanRecord],
    select_treatment: impl Fn(&CleanRecord) -> u8,
    build_confounders: impl Fn(&CleanRecord) -> Vec<f64>,
) -> (Vec<u8>, Vec<f64>, Vec<Vec<f64>>) {
    let mut treatment = Vec::with_capacity(rows.len());
    let mut outcome = Vec::with_capacity(rows.len());
    let mut confounders = Vec::with_capacity(rows.len());
    for record in rows {
        treatment.push(select_treatment(record));
        outcome.push(record.wait_minutes);
        confounders.push(build_confounders(record));
    }
    (treatment, outcome, confounders)
}
