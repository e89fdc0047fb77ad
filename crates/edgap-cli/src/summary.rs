use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use edgap_model::{AnalysisUnit, UnitOutcome};

use crate::types::AnalysisOutcome;

pub fn print_summary(outcome: &AnalysisOutcome) {
    println!("Input: {}", outcome.input.display());
    println!(
        "Rows: {} read, {} after cleaning",
        outcome.rows_read, outcome.rows_cleaned
    );
    if let Some(path) = &outcome.results_path {
        println!("Results: {}", path.display());
    }
    if let Some(path) = &outcome.clean_path {
        println!("Cleaned dataset: {}", path.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Analysis"),
        header_cell("Subgroup"),
        header_cell("Year"),
        header_cell("Status"),
        header_cell("ATE"),
        header_cell("95% CI"),
        header_cell("p"),
        header_cell("N"),
    ]);
    apply_summary_table_style(&mut table);
    for column in 4..8 {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for (unit, outcome) in &outcome.units {
        table.add_row(unit_row(unit, outcome));
    }
    println!("{table}");

    let stats = &outcome.stats;
    println!(
        "Units: {} analyzed, {} skipped, {} failed ({} total)",
        stats.analyzed,
        stats.skipped,
        stats.failed,
        stats.total()
    );
}

fn unit_row(unit: &AnalysisUnit, outcome: &UnitOutcome) -> Vec<Cell> {
    let mut row = vec![
        Cell::new(unit.analysis_type()),
        Cell::new(unit.subgroup()),
        Cell::new(unit.year_label()),
    ];
    match outcome {
        UnitOutcome::Estimated(estimate) => {
            let significant = estimate.p_value < 0.05;
            row.push(
                Cell::new("estimated")
                    .fg(Color::Green)
                    .add_attribute(Attribute::Bold),
            );
            row.push(ate_cell(estimate.ate, significant));
            row.push(Cell::new(format!(
                "[{:.1}, {:.1}]",
                estimate.ci_lower, estimate.ci_upper
            )));
            row.push(Cell::new(format!("{:.3}", estimate.p_value)));
            row.push(Cell::new(estimate.n_treated + estimate.n_control));
        }
        UnitOutcome::Skipped { rows, required } => {
            row.push(Cell::new("skipped").fg(Color::Yellow));
            row.push(dim_cell("-"));
            row.push(dim_cell(format!("{rows} rows < {required}")));
            row.push(dim_cell("-"));
            row.push(Cell::new(*rows));
        }
        UnitOutcome::Failed { reason } => {
            row.push(
                Cell::new("failed")
                    .fg(Color::Red)
                    .add_attribute(Attribute::Bold),
            );
            row.push(dim_cell("-"));
            row.push(Cell::new(reason.clone()).fg(Color::Red));
            row.push(dim_cell("-"));
            row.push(dim_cell("-"));
        }
    }
    row
}

fn ate_cell(ate: f64, significant: bool) -> Cell {
    let cell = Cell::new(format!("{ate:+.1}"));
    if significant {
        cell.fg(Color::Red).add_attribute(Attribute::Bold)
    } else {
        cell
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
