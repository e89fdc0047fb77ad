//! The flat, schema-stable result table.

use serde::Serialize;

/// Exported result columns, in output order. The exported file carries
/// exactly these, nothing else.
pub const RESULT_COLUMNS: [&str; 15] = [
    "analysis_type",
    "subgroup_type",
    "subgroup",
    "year",
    "group_comparison",
    "ate",
    "ci_lower",
    "ci_upper",
    "p_value",
    "n_treatment",
    "n_control",
    "total_sample",
    "is_significant",
    "ate_direction",
    "effect_size",
];

/// One row of the exported table: the unit's descriptive keys, the effect
/// numbers, and the derived display fields. Every field is always populated;
/// missing numerics were replaced with sentinels during aggregation.
#[derive(Debug, Clone, Serialize)]
pub struct ResultRow {
    pub analysis_type: String,
    pub subgroup_type: String,
    pub subgroup: String,
    pub year: String,
    pub group_comparison: String,
    pub ate: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub p_value: f64,
    pub n_treatment: usize,
    pub n_control: usize,
    pub total_sample: usize,
    pub is_significant: String,
    pub ate_direction: String,
    pub effect_size: f64,
}

/// Ordered collection of result rows. Row order follows the canonical unit
/// enumeration order and is stable across runs for diffing.
#[derive(Debug, Clone, Default)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new(rows: Vec<ResultRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
