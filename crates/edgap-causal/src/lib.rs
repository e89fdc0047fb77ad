//! Confounder-adjusted causal estimation over stratified subgroups.
//!
//! [`CausalEstimator`] wraps a sum-of-trees (BART) response surface;
//! [`SubgroupRunner`] enumerates every analysis unit in canonical order and
//! drives one estimate per qualifying unit.

pub mod bart;
pub mod estimator;
pub mod subgroups;

pub use estimator::CausalEstimator;
pub use subgroups::SubgroupRunner;
