//! Integration tests for file export.

use std::fs;

use edgap_model::{
    AgeBand, AnalysisUnit, CleanRecord, CleanedDataset, EffectEstimate, RESULT_COLUMNS, RiskBand,
    UnitOutcome,
};
use edgap_report::{aggregate, write_clean_dataset, write_result_table};
use tempfile::TempDir;

fn sample_table() -> edgap_model::ResultTable {
    let units = vec![
        (
            AnalysisUnit::overall_race("Black"),
            UnitOutcome::Estimated(EffectEstimate {
                ate: 12.5,
                ci_lower: 8.0,
                ci_upper: 17.0,
                p_value: 0.002,
                n_treated: 40,
                n_control: 160,
            }),
        ),
        (
            AnalysisUnit::year_gender(2022),
            UnitOutcome::Estimated(EffectEstimate {
                ate: -2.0,
                ci_lower: -6.0,
                ci_upper: 2.0,
                p_value: 0.31,
                n_treated: 90,
                n_control: 110,
            }),
        ),
    ];
    aggregate(&units)
}

#[test]
fn test_result_table_header_is_exact() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("disparity_results.csv");
    write_result_table(&path, &sample_table()).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    let header = content.lines().next().unwrap();
    assert_eq!(header, RESULT_COLUMNS.join(","));
    assert_eq!(content.lines().count(), 3);
}

#[test]
fn test_result_rows_round_numbers_cleanly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("disparity_results.csv");
    write_result_table(&path, &sample_table()).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    let first = content.lines().nth(1).unwrap();
    assert!(first.starts_with("Race Disparity,Overall,Black,All Years,Black vs All Others,"));
    assert!(first.contains(",12.5,8,17,0.002,40,160,200,Significant,Positive,12.5"));
}

#[test]
fn test_clean_dataset_export_includes_derived_columns() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cleaned.csv");
    let dataset = CleanedDataset::new(
        vec![CleanRecord {
            race: "Black".to_string(),
            gender: "Female".to_string(),
            age: 34.0,
            risk_score: 3.5,
            wait_minutes: 62.0,
            visit_date: "2022-05-04".to_string(),
            year: 2022,
            age_band: AgeBand::YoungAdult,
            is_female: 1,
            risk_band: RiskBand::Q3,
        }],
        [0.0, 1.0, 2.0, 3.0, 4.0],
    );
    write_clean_dataset(&path, &dataset).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next().unwrap(),
        "race,gender,age,risk_score,wait_minutes,visit_date,year,age_bin,is_female,risk_bin"
    );
    assert_eq!(
        lines.next().unwrap(),
        "Black,Female,34,3.5,62,2022-05-04,2022,19-35,1,Q3"
    );
}
