//! Categorical band derivation from continuous fields.
//!
//! All intervals are right-closed with an inclusive lowest boundary, so a
//! value sitting exactly on a cut point falls into the lower-indexed band.

use edgap_model::{AgeBand, RiskBand};

/// Fixed age cut points. Bands are [0,18], (18,35], (35,50], (50,65],
/// (65,120].
pub const AGE_CUTS: [f64; 6] = [0.0, 18.0, 35.0, 50.0, 65.0, 120.0];

/// Band for an age, or None when the age is outside [0, 120].
pub fn age_band(age: f64) -> Option<AgeBand> {
    if !age.is_finite() || age < AGE_CUTS[0] || age > AGE_CUTS[5] {
        return None;
    }
    for (idx, band) in AgeBand::ALL.iter().enumerate() {
        if age <= AGE_CUTS[idx + 1] {
            return Some(*band);
        }
    }
    Some(AgeBand::Senior)
}

/// Quartile cut points (probabilities 0, .25, .5, .75, 1) over the given
/// values, using linear interpolation between order statistics.
///
/// Computed once over the whole cleaned dataset; every stratification reuses
/// the same cuts.
pub fn quartile_cuts(values: &[f64]) -> [f64; 5] {
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    [
        quantile(&sorted, 0.0),
        quantile(&sorted, 0.25),
        quantile(&sorted, 0.5),
        quantile(&sorted, 0.75),
        quantile(&sorted, 1.0),
    ]
}

/// Linear-interpolation quantile of pre-sorted values.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
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

/// Quartile band for a score given the dataset cut points. A score equal to
/// a cut boundary falls into the lower-indexed band.
pub fn risk_band(score: f64, cuts: &[f64; 5]) -> RiskBand {
    for (idx, band) in RiskBand::ALL.iter().take(3).enumerate() {
        if score <= cuts[idx + 1] {
            return *band;
        }
    }
    RiskBand::Q4
}
