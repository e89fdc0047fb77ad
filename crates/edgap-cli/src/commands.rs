use std::fs;
use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{info, info_span};

use edgap_causal::SubgroupRunner;
use edgap_clean::clean;
use edgap_ingest::read_csv_table;
use edgap_model::{AnalysisConfig, REQUIRED_COLUMNS};
use edgap_report::{aggregate, write_clean_dataset, write_result_table};

use crate::cli::AnalyzeArgs;
use crate::summary::apply_table_style;
use crate::types::AnalysisOutcome;

/// Name of the exported result table file.
pub const RESULTS_FILENAME: &str = "disparity_results.csv";

/// Name of the exported cleaned dataset file.
pub const CLEAN_FILENAME: &str = "cleaned_dataset.csv";

pub fn run_columns() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Column", "Type", "Constraint"]);
    apply_table_style(&mut table);
    let constraints = [
        ("race", "text", "non-empty"),
        ("gender", "text", "non-empty"),
        ("age", "number", "0 to 120"),
        ("risk_score", "number", ">= 0"),
        ("wait_minutes", "number", "0 to 240"),
        ("visit_date", "date", "year 2010 to 2025"),
    ];
    for (name, kind, constraint) in constraints {
        debug_assert!(REQUIRED_COLUMNS.contains(&name));
        table.add_row(vec![name, kind, constraint]);
    }
    println!("{table}");
    println!("Header matching is case-insensitive; extra columns are ignored.");
    Ok(())
}

pub fn run_analyze(args: &AnalyzeArgs) -> Result<AnalysisOutcome> {
    let span = info_span!("analyze", input = %args.input.display());
    let _guard = span.enter();
    let start = Instant::now();

    let config = analysis_config(args);
    let output_dir = args.output_dir.clone().unwrap_or_else(|| {
        args.input
            .parent()
            .map_or_else(|| "output".into(), |dir| dir.join("output"))
    });

    let table = read_csv_table(&args.input)
        .with_context(|| format!("read {}", args.input.display()))?;
    let rows_read = table.rows.len();
    info!(rows = rows_read, "input loaded");

    let dataset = clean(&table, &config)
        .with_context(|| format!("clean {}", args.input.display()))?;
    let rows_cleaned = dataset.len();

    let estimate_start = Instant::now();
    let (units, stats) = SubgroupRunner::new(&dataset, &config).run();
    info!(
        analyzed = stats.analyzed,
        skipped = stats.skipped,
        failed = stats.failed,
        duration_ms = estimate_start.elapsed().as_millis(),
        "estimation complete"
    );

    let result_table = aggregate(&units);

    let (results_path, clean_path) = if args.dry_run {
        info!("dry run, skipping output files");
        (None, None)
    } else {
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("create {}", output_dir.display()))?;
        let results_path = output_dir.join(RESULTS_FILENAME);
        write_result_table(&results_path, &result_table)?;
        let clean_path = output_dir.join(CLEAN_FILENAME);
        write_clean_dataset(&clean_path, &dataset)?;
        (Some(results_path), Some(clean_path))
    };

    info!(duration_ms = start.elapsed().as_millis(), "analysis complete");
    Ok(AnalysisOutcome {
        input: args.input.clone(),
        output_dir,
        results_path,
        clean_path,
        rows_read,
        rows_cleaned,
        units,
        stats,
        table: result_table,
    })
}

fn analysis_config(args: &AnalyzeArgs) -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(max_fit_rows) = args.max_fit_rows {
        config.max_fit_rows = max_fit_rows;
    }
    if let Some(trees) = args.trees {
        config.trees = trees;
    }
    if let Some(draws) = args.draws {
        config.draws = draws;
    }
    if let Some(burn_in) = args.burn_in {
        config.burn_in = burn_in;
    }
    if let Some(chains) = args.chains {
        config.chains = chains.max(1);
    }
    config
}
