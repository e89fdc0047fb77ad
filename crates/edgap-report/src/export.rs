//! Delimited-text export for the two output artifacts.

use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;
use tracing::info;

use edgap_ingest::format_numeric;
use edgap_model::{CleanedDataset, RESULT_COLUMNS, ResultTable};

/// Write the result table. Columns are exactly [`RESULT_COLUMNS`], one row
/// per estimated unit, in canonical order.
pub fn write_result_table(path: &Path, table: &ResultTable) -> Result<()> {
    let mut writer =
        Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    writer.write_record(RESULT_COLUMNS)?;
    for row in table.rows() {
        let record: [String; 15] = [
            row.analysis_type.clone(),
            row.subgroup_type.clone(),
            row.subgroup.clone(),
            row.year.clone(),
            row.group_comparison.clone(),
            format_numeric(row.ate),
            format_numeric(row.ci_lower),
            format_numeric(row.ci_upper),
            format_numeric(row.p_value),
            row.n_treatment.to_string(),
            row.n_control.to_string(),
            row.total_sample.to_string(),
            row.is_significant.clone(),
            row.ate_direction.clone(),
            format_numeric(row.effect_size),
        ];
        writer.write_record(&record)?;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    info!(path = %path.display(), rows = table.len(), "wrote result table");
    Ok(())
}

/// Columns of the cleaned-dataset export, source fields first, derived
/// fields after.
const CLEAN_COLUMNS: [&str; 10] = [
    "race",
    "gender",
    "age",
    "risk_score",
    "wait_minutes",
    "visit_date",
    "year",
    "age_bin",
    "is_female",
    "risk_bin",
];

/// Write the cleaned and binned dataset, one row per surviving record.
pub fn write_clean_dataset(path: &Path, dataset: &CleanedDataset) -> Result<()> {
    let mut writer =
        Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    writer.write_record(CLEAN_COLUMNS)?;
    for record in dataset.records() {
        let row: [String; 10] = [
            record.race.clone(),
            record.gender.clone(),
            format_numeric(record.age),
            format_numeric(record.risk_score),
            format_numeric(record.wait_minutes),
            record.visit_date.clone(),
            record.year.to_string(),
            record.age_band.label().to_string(),
            record.is_female.to_string(),
            record.risk_band.label().to_string(),
        ];
        writer.write_record(&row)?;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    info!(path = %path.display(), rows = dataset.len(), "wrote cleaned dataset");
    Ok(())
}
