//! Validation and binning: raw string table in, analysis-ready dataset out.

pub mod bins;
pub mod cleaner;

pub use bins::{AGE_CUTS, age_band, quartile_cuts, risk_band};
pub use cleaner::{CleanCounts, clean};
