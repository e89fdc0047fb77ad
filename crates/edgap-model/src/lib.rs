//! Core data model for the ED wait-time disparity analyzer.
//!
//! Defines the cleaned record and dataset types, the analysis-unit
//! stratification vocabulary, effect estimates, the exported result schema,
//! and the error taxonomy shared across the workspace.

pub mod config;
pub mod error;
pub mod estimate;
pub mod record;
pub mod table;
pub mod unit;

pub use config::AnalysisConfig;
pub use error::{CleanError, EstimationError};
pub use estimate::{EffectEstimate, RunStats, UnitOutcome};
pub use record::{
    AgeBand, BLACK_LITERAL, CleanRecord, CleanedDataset, FEMALE_LITERAL, REQUIRED_COLUMNS,
    RiskBand,
};
pub use table::{RESULT_COLUMNS, ResultRow, ResultTable};
pub use unit::{AnalysisUnit, UnitKind};
