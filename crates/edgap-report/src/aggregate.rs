//! Normalizes heterogeneous per-unit outcomes into one flat, schema-stable
//! table.

use edgap_model::{AnalysisUnit, EffectEstimate, ResultRow, ResultTable, UnitOutcome};

/// Sentinel p-value for a non-finite posterior summary.
const P_VALUE_SENTINEL: f64 = 1.0;

/// Build the result table from per-unit outcomes, in emission order.
///
/// Every unit with an estimate yields exactly one row; skipped and failed
/// units yield none. Non-finite numerics are replaced with sentinels
/// (p-value 1.0, effect fields 0.0) so the exported table is always fully
/// populated.
pub fn aggregate(units: &[(AnalysisUnit, UnitOutcome)]) -> ResultTable {
    let mut rows = Vec::new();
    for (unit, outcome) in units {
        let Some(estimate) = outcome.estimate() else {
            continue;
        };
        rows.push(result_row(unit, estimate));
    }
    ResultTable::new(rows)
}

fn result_row(unit: &AnalysisUnit, estimate: &EffectEstimate) -> ResultRow {
    let ate = finite_or(estimate.ate, 0.0);
    let p_value = finite_or(estimate.p_value, P_VALUE_SENTINEL);
    ResultRow {
        analysis_type: unit.analysis_type().to_string(),
        subgroup_type: unit.subgroup_type().to_string(),
        subgroup: unit.subgroup(),
        year: unit.year_label(),
        group_comparison: unit.group_comparison(),
        ate,
        ci_lower: finite_or(estimate.ci_lower, 0.0),
        ci_upper: finite_or(estimate.ci_upper, 0.0),
        p_value,
        n_treatment: estimate.n_treated,
        n_control: estimate.n_control,
        total_sample: estimate.n_treated + estimate.n_control,
        is_significant: significance(p_value).to_string(),
        ate_direction: direction(ate).to_string(),
        effect_size: ate.abs(),
    }
}

fn significance(p_value: f64) -> &'static str {
    if p_value < 0.05 {
        "Significant"
    } else {
        "Not Significant"
    }
}

fn direction(ate: f64) -> &'static str {
    if ate > 0.0 { "Positive" } else { "Negative" }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}
