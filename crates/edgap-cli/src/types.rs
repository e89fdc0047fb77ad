use std::path::PathBuf;

use edgap_model::{AnalysisUnit, ResultTable, RunStats, UnitOutcome};

/// Everything one analysis run produced, for the end-of-run summary.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub results_path: Option<PathBuf>,
    pub clean_path: Option<PathBuf>,
    pub rows_read: usize,
    pub rows_cleaned: usize,
    pub units: Vec<(AnalysisUnit, UnitOutcome)>,
    pub stats: RunStats,
    pub table: ResultTable,
}
