//! End-to-end run of the analyze command over a synthetic visit file.

use std::fs;
use std::path::{Path, PathBuf};

use edgap_cli::cli::AnalyzeArgs;
use edgap_cli::commands::{CLEAN_FILENAME, RESULTS_FILENAME, run_analyze};
use edgap_model::{UnitKind, UnitOutcome};
use tempfile::TempDir;

/// 200 visits, all in 2022: Black 80, White 80, Hispanic 40 rows with
/// alternating genders and varied ages, scores and waits.
fn write_input(dir: &Path) -> PathBuf {
    let mut content = String::from("race,gender,age,risk_score,wait_minutes,visit_date\n");
    for i in 0..200usize {
        let race = match i % 5 {
            0 | 1 => "Black",
            2 | 3 => "White",
            _ => "Hispanic",
        };
        let gender = if i % 2 == 0 { "Female" } else { "Male" };
        let age = 1 + (i * 7) % 90;
        let risk = ((i * 13) % 100) as f64 / 10.0;
        let mut wait = 30.0 + (i % 50) as f64;
        if race == "Black" {
            wait += 20.0;
        }
        if gender == "Female" {
            wait += 10.0;
        }
        let date = format!("2022-{:02}-{:02}", 1 + i % 12, 1 + i % 28);
        content.push_str(&format!("{race},{gender},{age},{risk},{wait},{date}\n"));
    }
    let path = dir.join("visits.csv");
    fs::write(&path, content).unwrap();
    path
}

fn fast_args(input: PathBuf, output_dir: PathBuf) -> AnalyzeArgs {
    AnalyzeArgs {
        input,
        output_dir: Some(output_dir),
        seed: Some(7),
        max_fit_rows: None,
        trees: Some(10),
        draws: Some(30),
        burn_in: Some(15),
        chains: Some(1),
        dry_run: false,
    }
}

#[test]
fn test_analyze_end_to_end() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path());
    let output_dir = dir.path().join("output");
    let outcome = run_analyze(&fast_args(input, output_dir.clone())).unwrap();

    assert_eq!(outcome.rows_read, 200);
    assert_eq!(outcome.rows_cleaned, 200);

    // Three races overall, one overall gender unit, three (2022, race)
    // units, one 2022 gender unit.
    assert_eq!(outcome.units.len(), 8);
    let kinds: Vec<UnitKind> = outcome.units.iter().map(|(unit, _)| unit.kind).collect();
    assert_eq!(
        kinds,
        vec![
            UnitKind::OverallRace,
            UnitKind::OverallRace,
            UnitKind::OverallRace,
            UnitKind::OverallGender,
            UnitKind::YearRace,
            UnitKind::YearRace,
            UnitKind::YearRace,
            UnitKind::YearGender,
        ]
    );
    let races: Vec<Option<&str>> = outcome.units[..3]
        .iter()
        .map(|(unit, _)| unit.race.as_deref())
        .collect();
    assert_eq!(races, vec![Some("Black"), Some("Hispanic"), Some("White")]);

    // Hispanic has 40 rows in 2022, below the 50-row per-year race gate.
    let (unit, hispanic_2022) = &outcome.units[5];
    assert_eq!(unit.race.as_deref(), Some("Hispanic"));
    assert_eq!(unit.year, Some(2022));
    match hispanic_2022 {
        UnitOutcome::Skipped { rows, required } => {
            assert_eq!(*rows, 40);
            assert_eq!(*required, 50);
        }
        other => panic!("expected skip, got {other:?}"),
    }

    assert_eq!(outcome.stats.analyzed, 7);
    assert_eq!(outcome.stats.skipped, 1);
    assert_eq!(outcome.stats.failed, 0);
    assert_eq!(outcome.table.len(), 7);

    let results = fs::read_to_string(output_dir.join(RESULTS_FILENAME)).unwrap();
    assert_eq!(results.lines().count(), 8);
    let cleaned = fs::read_to_string(output_dir.join(CLEAN_FILENAME)).unwrap();
    assert_eq!(cleaned.lines().count(), 201);
}

#[test]
fn test_analyze_outputs_are_reproducible() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path());
    let first_dir = dir.path().join("first");
    let second_dir = dir.path().join("second");
    run_analyze(&fast_args(input.clone(), first_dir.clone())).unwrap();
    run_analyze(&fast_args(input, second_dir.clone())).unwrap();

    let first = fs::read(first_dir.join(RESULTS_FILENAME)).unwrap();
    let second = fs::read(second_dir.join(RESULTS_FILENAME)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path());
    let output_dir = dir.path().join("output");
    let mut args = fast_args(input, output_dir.clone());
    args.dry_run = true;
    let outcome = run_analyze(&args).unwrap();

    assert!(outcome.results_path.is_none());
    assert!(outcome.clean_path.is_none());
    assert_eq!(outcome.stats.analyzed, 7);
    assert!(!output_dir.exists());
}

#[test]
fn test_missing_column_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "race,gender,age\nBlack,Female,30\n").unwrap();
    let error = run_analyze(&fast_args(path, dir.path().join("output"))).unwrap_err();
    let message = format!("{error:#}");
    assert!(message.contains("risk_score"), "unexpected error: {message}");
}
