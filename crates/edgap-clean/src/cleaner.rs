//! The validator/cleaner: schema check, row filtering, derived fields, and
//! the final quality gate.

use std::collections::BTreeMap;

use tracing::{debug, info};

use edgap_ingest::{CsvTable, column_index, is_missing_value, parse_f64};
use edgap_model::{
    AnalysisConfig, CleanError, CleanRecord, CleanedDataset, FEMALE_LITERAL, REQUIRED_COLUMNS,
};

use crate::bins;

/// Valid year range for the derived visit year.
const YEAR_RANGE: (i32, i32) = (2010, 2025);
/// Valid outcome range in minutes.
const WAIT_RANGE: (f64, f64) = (0.0, 240.0);

/// Row-drop tallies, reported through tracing.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanCounts {
    pub rows_in: usize,
    pub dropped_missing: usize,
    pub dropped_unparsable: usize,
    pub dropped_out_of_range: usize,
    pub rows_out: usize,
}

struct InterimRow {
    race: String,
    gender: String,
    age: f64,
    risk_score: f64,
    wait_minutes: f64,
    visit_date: String,
    year: i32,
}

/// Validate and bin a raw table into an analysis-ready dataset.
///
/// Fails with [`CleanError::Schema`] when a required column is absent,
/// [`CleanError::EmptyResult`] when no row survives, and
/// [`CleanError::Quality`] when the final gate fails. The quality gate
/// enumerates every violated condition before failing.
pub fn clean(table: &CsvTable, config: &AnalysisConfig) -> Result<CleanedDataset, CleanError> {
    let columns = locate_columns(table)?;
    let mut counts = CleanCounts {
        rows_in: table.rows.len(),
        ..CleanCounts::default()
    };

    let mut interim = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        match parse_row(row, &columns) {
            RowParse::Ok(parsed) => interim.push(parsed),
            RowParse::Missing => counts.dropped_missing += 1,
            RowParse::Unparsable => counts.dropped_unparsable += 1,
            RowParse::OutOfRange => counts.dropped_out_of_range += 1,
        }
    }
    if interim.is_empty() {
        return Err(CleanError::EmptyResult);
    }

    // One set of quartile cuts for the whole run, before any stratification.
    let scores: Vec<f64> = interim.iter().map(|row| row.risk_score).collect();
    let risk_cuts = bins::quartile_cuts(&scores);

    let mut records = Vec::with_capacity(interim.len());
    for row in interim {
        let Some(age_band) = bins::age_band(row.age) else {
            // Age already range-checked; keep the drop accounted for anyway.
            counts.dropped_out_of_range += 1;
            continue;
        };
        let is_female = u8::from(row.gender.eq_ignore_ascii_case(FEMALE_LITERAL));
        let risk_band = bins::risk_band(row.risk_score, &risk_cuts);
        records.push(CleanRecord {
            race: row.race,
            gender: row.gender,
            age: row.age,
            risk_score: row.risk_score,
            wait_minutes: row.wait_minutes,
            visit_date: row.visit_date,
            year: row.year,
            age_band,
            is_female,
            risk_band,
        });
    }
    counts.rows_out = records.len();

    debug!(
        dropped_missing = counts.dropped_missing,
        dropped_unparsable = counts.dropped_unparsable,
        dropped_out_of_range = counts.dropped_out_of_range,
        "row drop tallies"
    );
    info!(
        rows_in = counts.rows_in,
        rows_out = counts.rows_out,
        "cleaning finished"
    );

    quality_gate(&records, config)?;
    Ok(CleanedDataset::new(records, risk_cuts))
}

fn locate_columns(table: &CsvTable) -> Result<[usize; 6], CleanError> {
    let mut indices = [0usize; 6];
    let mut missing = Vec::new();
    for (slot, column) in REQUIRED_COLUMNS.iter().enumerate() {
        match column_index(&table.headers, column) {
            Some(idx) => indices[slot] = idx,
            None => missing.push((*column).to_string()),
        }
    }
    if missing.is_empty() {
        Ok(indices)
    } else {
        Err(CleanError::Schema { missing })
    }
}

enum RowParse {
    Ok(InterimRow),
    Missing,
    Unparsable,
    OutOfRange,
}

fn parse_row(row: &[String], columns: &[usize; 6]) -> RowParse {
    // Slot order follows REQUIRED_COLUMNS.
    let [race_idx, gender_idx, age_idx, risk_idx, wait_idx, date_idx] = *columns;
    let cells: Vec<&str> = columns
        .iter()
        .map(|idx| row.get(*idx).map(String::as_str).unwrap_or(""))
        .collect();
    if cells.iter().any(|cell| is_missing_value(cell)) {
        return RowParse::Missing;
    }

    let (Some(age), Some(risk_score), Some(wait_minutes)) = (
        parse_f64(row[age_idx].as_str()),
        parse_f64(row[risk_idx].as_str()),
        parse_f64(row[wait_idx].as_str()),
    ) else {
        return RowParse::Unparsable;
    };
    let visit_date = row[date_idx].trim().to_string();
    // Year is defined as the first four characters of the visit date.
    let Ok(year) = visit_date.chars().take(4).collect::<String>().parse::<i32>() else {
        return RowParse::Unparsable;
    };

    if bins::age_band(age).is_none()
        || wait_minutes < WAIT_RANGE.0
        || wait_minutes > WAIT_RANGE.1
        || risk_score < 0.0
        || !risk_score.is_finite()
        || year < YEAR_RANGE.0
        || year > YEAR_RANGE.1
    {
        return RowParse::OutOfRange;
    }

    RowParse::Ok(InterimRow {
        race: row[race_idx].trim().to_string(),
        gender: row[gender_idx].trim().to_string(),
        age,
        risk_score,
        wait_minutes,
        visit_date,
        year,
    })
}

/// Dataset-level checks that must all pass before estimation. Collects every
/// violation instead of stopping at the first.
fn quality_gate(records: &[CleanRecord], config: &AnalysisConfig) -> Result<(), CleanError> {
    let mut violations = Vec::new();

    let incomplete = records
        .iter()
        .filter(|r| {
            r.race.is_empty()
                || r.gender.is_empty()
                || !r.age.is_finite()
                || !r.risk_score.is_finite()
                || !r.wait_minutes.is_finite()
        })
        .count();
    if incomplete > 0 {
        violations.push(format!("{incomplete} record(s) with missing fields"));
    }

    if records.len() < config.min_total_rows {
        violations.push(format!(
            "only {} rows after cleaning (minimum {})",
            records.len(),
            config.min_total_rows
        ));
    }

    let mut race_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *race_counts.entry(record.race.as_str()).or_default() += 1;
    }
    for (race, count) in race_counts {
        if count < config.min_race_rows {
            violations.push(format!(
                "race {race} has {count} rows (minimum {})",
                config.min_race_rows
            ));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(CleanError::Quality { violations })
    }
}
