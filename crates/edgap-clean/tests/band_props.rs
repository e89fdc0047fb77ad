//! Property tests for band assignment.

use edgap_clean::{AGE_CUTS, age_band, quartile_cuts, risk_band};
use edgap_model::RiskBand;
use proptest::prelude::*;

proptest! {
    /// Every age in [0, 120] maps to exactly one band, and the band's
    /// interval actually contains the age.
    #[test]
    fn age_bands_partition_the_range(age in 0.0f64..=120.0) {
        let band = age_band(age).expect("in-range age must map to a band");
        let idx = band as usize;
        let lower = AGE_CUTS[idx];
        let upper = AGE_CUTS[idx + 1];
        if idx == 0 {
            prop_assert!(age >= lower && age <= upper);
        } else {
            prop_assert!(age > lower && age <= upper);
        }
    }

    /// Ages outside the range never map to a band.
    #[test]
    fn out_of_range_ages_are_rejected(age in prop_oneof![-1000.0f64..-0.0001, 120.0001f64..10000.0]) {
        prop_assert!(age_band(age).is_none());
    }

    /// Quartile cuts are monotonically non-decreasing and span the data.
    #[test]
    fn quartile_cuts_are_monotone(mut values in prop::collection::vec(0.0f64..1000.0, 4..200)) {
        let cuts = quartile_cuts(&values);
        for window in cuts.windows(2) {
            prop_assert!(window[0] <= window[1]);
        }
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        prop_assert_eq!(cuts[0], values[0]);
        prop_assert_eq!(cuts[4], *values.last().unwrap());
    }

    /// Every in-range score lands in a band consistent with the cut points.
    #[test]
    fn risk_band_respects_cuts(values in prop::collection::vec(0.0f64..100.0, 4..100), probe in 0usize..100) {
        let cuts = quartile_cuts(&values);
        let score = values[probe % values.len()];
        let band = risk_band(score, &cuts);
        match band {
            RiskBand::Q1 => prop_assert!(score <= cuts[1]),
            RiskBand::Q2 => prop_assert!(score > cuts[1] && score <= cuts[2]),
            RiskBand::Q3 => prop_assert!(score > cuts[2] && score <= cuts[3]),
            RiskBand::Q4 => prop_assert!(score > cuts[3]),
        }
    }
}
