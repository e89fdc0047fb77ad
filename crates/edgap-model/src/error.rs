use thiserror::Error;

/// Fatal cleaning errors. Any of these aborts the run before estimation
/// starts and before any output file is written.
#[derive(Debug, Error)]
pub enum CleanError {
    /// One or more required input columns are absent.
    #[error("required column(s) missing: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    /// Cleaning dropped every row.
    #[error("no rows survived cleaning")]
    EmptyResult,

    /// The final quality gate failed. All violated conditions are listed,
    /// not just the first one encountered.
    #[error("data quality gate failed: {}", violations.join("; "))]
    Quality { violations: Vec<String> },
}

/// Per-unit estimation failures. These are caught at the iterator boundary
/// and recorded against the unit; they never abort sibling units.
#[derive(Debug, Error)]
pub enum EstimationError {
    /// The treatment vector has only one arm after row filtering.
    #[error("treatment has a single arm ({treated} treated, {control} control)")]
    SingleArm { treated: usize, control: usize },

    /// Not enough usable rows remain for a fit.
    #[error("too few usable rows for a fit ({rows})")]
    TooFewRows { rows: usize },

    /// The outcome is constant, so no effect is identifiable.
    #[error("outcome has zero variance")]
    ConstantOutcome,

    /// The confounder matrix has no columns.
    #[error("confounder matrix is empty")]
    NoConfounders,
}
