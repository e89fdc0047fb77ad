//! Integration tests for the causal estimator.

use edgap_causal::CausalEstimator;
use edgap_model::{AnalysisConfig, EstimationError};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::StandardNormal;

/// Reduced sampler settings; the production literals are far too slow for
/// unit tests and the estimator honors whatever the config carries.
fn test_config() -> AnalysisConfig {
    AnalysisConfig::default()
        .with_seed(7)
        .with_sampler(20, 80, 40, 1)
}

/// Synthetic stratum with a known additive effect on the outcome.
fn synthetic(n: usize, effect: f64) -> (Vec<u8>, Vec<f64>, Vec<Vec<f64>>) {
    let mut rng = StdRng::seed_from_u64(99);
    let mut treatment = Vec::with_capacity(n);
    let mut outcome = Vec::with_capacity(n);
    let mut confounders = Vec::with_capacity(n);
    for i in 0..n {
        let t = u8::from(i % 2 == 0);
        let age = 20.0 + (i % 60) as f64;
        let risk = (i % 10) as f64;
        let noise: f64 = rng.sample::<f64, _>(StandardNormal) * 3.0;
        treatment.push(t);
        outcome.push(40.0 + effect * f64::from(t) + 0.2 * age + 1.5 * risk + noise);
        confounders.push(vec![age, risk]);
    }
    (treatment, outcome, confounders)
}

#[test]
fn test_recovers_a_strong_effect() {
    let (treatment, outcome, confounders) = synthetic(200, 10.0);
    let config = test_config();
    let estimate = CausalEstimator::new(&config)
        .estimate(&treatment, &outcome, &confounders)
        .unwrap();
    assert!(
        estimate.ate > 4.0 && estimate.ate < 16.0,
        "ate {} not near the simulated effect",
        estimate.ate
    );
    assert!(estimate.ci_lower <= estimate.ate && estimate.ate <= estimate.ci_upper);
    assert_eq!(estimate.n_treated + estimate.n_control, 200);
}

#[test]
fn test_same_seed_is_bit_for_bit_reproducible() {
    let (treatment, outcome, confounders) = synthetic(150, 8.0);
    let config = test_config();
    let estimator = CausalEstimator::new(&config);
    let first = estimator.estimate(&treatment, &outcome, &confounders).unwrap();
    let second = estimator.estimate(&treatment, &outcome, &confounders).unwrap();
    assert_eq!(first.ate.to_bits(), second.ate.to_bits());
    assert_eq!(first.ci_lower.to_bits(), second.ci_lower.to_bits());
    assert_eq!(first.ci_upper.to_bits(), second.ci_upper.to_bits());
    assert_eq!(first.p_value.to_bits(), second.p_value.to_bits());
}

#[test]
fn test_different_seed_changes_draws() {
    let (treatment, outcome, confounders) = synthetic(150, 8.0);
    let config_a = test_config().with_seed(1);
    let config_b = test_config().with_seed(2);
    let first = CausalEstimator::new(&config_a)
        .estimate(&treatment, &outcome, &confounders)
        .unwrap();
    let second = CausalEstimator::new(&config_b)
        .estimate(&treatment, &outcome, &confounders)
        .unwrap();
    assert_ne!(first.ate.to_bits(), second.ate.to_bits());
}

#[test]
fn test_single_arm_is_an_error() {
    let (mut treatment, outcome, confounders) = synthetic(60, 5.0);
    for t in &mut treatment {
        *t = 1;
    }
    let config = test_config();
    match CausalEstimator::new(&config).estimate(&treatment, &outcome, &confounders) {
        Err(EstimationError::SingleArm { treated, control }) => {
            assert_eq!(treated, 60);
            assert_eq!(control, 0);
        }
        other => panic!("expected single-arm error, got {other:?}"),
    }
}

#[test]
fn test_constant_outcome_is_an_error() {
    let (treatment, mut outcome, confounders) = synthetic(60, 5.0);
    for value in &mut outcome {
        *value = 42.0;
    }
    let config = test_config();
    match CausalEstimator::new(&config).estimate(&treatment, &outcome, &confounders) {
        Err(EstimationError::ConstantOutcome) => {}
        other => panic!("expected constant-outcome error, got {other:?}"),
    }
}

#[test]
fn test_non_finite_rows_are_excluded_not_imputed() {
    let (treatment, mut outcome, mut confounders) = synthetic(120, 8.0);
    outcome[3] = f64::NAN;
    confounders[10][0] = f64::INFINITY;
    let config = test_config();
    let estimate = CausalEstimator::new(&config)
        .estimate(&treatment, &outcome, &confounders)
        .unwrap();
    assert_eq!(estimate.n_treated + estimate.n_control, 118);
}

#[test]
fn test_subsample_caps_fit_size() {
    let (treatment, outcome, confounders) = synthetic(300, 8.0);
    let config = test_config().with_max_fit_rows(100);
    let estimate = CausalEstimator::new(&config)
        .estimate(&treatment, &outcome, &confounders)
        .unwrap();
    assert_eq!(estimate.n_treated + estimate.n_control, 100);
}

#[test]
fn test_subsample_is_seeded_and_stable() {
    let (treatment, outcome, confounders) = synthetic(300, 8.0);
    let config = test_config().with_max_fit_rows(100);
    let estimator = CausalEstimator::new(&config);
    let first = estimator.estimate(&treatment, &outcome, &confounders).unwrap();
    let second = estimator.estimate(&treatment, &outcome, &confounders).unwrap();
    assert_eq!(first.ate.to_bits(), second.ate.to_bits());
    assert_eq!(first.n_treated, second.n_treated);
}
