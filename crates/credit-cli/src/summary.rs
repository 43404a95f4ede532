use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use credit_cli::logging::redact_value;
use credit_model::{DropCounts, UnmappedOutcome};

use crate::types::LoadResult;

pub fn print_load_summary(result: &LoadResult) {
    println!("Dataset: {}", result.dataset);
    println!("Input: {}", result.input.display());
    println!("SHA-256: {}", result.source_sha256);
    match &result.outputs {
        Some(paths) => {
            println!("CSV: {}", paths.csv.display());
            println!("Descriptor: {}", paths.descriptor.display());
        }
        None => println!("Outputs: not written (dry run)"),
    }

    let report = &result.report;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Stage"), header_cell("Rows")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Input"), Cell::new(report.input_rows)]);
    for (reason, count) in drop_rows(&report.dropped) {
        table.add_row(vec![dim_cell(reason), count_cell(count, Color::Yellow)]);
    }
    table.add_row(vec![
        Cell::new("Output")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(report.output_rows).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    if report.shuffled {
        println!("Rows shuffled.");
    }
    if !report.ignored_categorical.is_empty() {
        println!(
            "Ignored categorical names (not kept features): {}",
            report.ignored_categorical.join(", ")
        );
    }
    print_warning_table(result);
}

fn drop_rows(dropped: &DropCounts) -> [(&'static str, usize); 5] {
    [
        ("Dropped: missing protected value", dropped.missing_protected),
        ("Dropped: protected value out of domain", dropped.protected_out_of_domain),
        ("Dropped: row filter", dropped.filtered),
        ("Dropped: missing label", dropped.missing_label),
        ("Dropped: incomplete features", dropped.incomplete_features),
    ]
}

fn print_warning_table(result: &LoadResult) {
    let warnings = &result.report.warnings;
    if warnings.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Unmapped value"),
        header_cell("Rows"),
        header_cell("Outcome"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for warning in warnings {
        let outcome = match warning.outcome {
            UnmappedOutcome::PassedThrough => Cell::new("passed through").fg(Color::Yellow),
            UnmappedOutcome::Dropped => Cell::new("rows dropped").fg(Color::Red),
            UnmappedOutcome::Defaulted => Cell::new("coded with default").fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(&warning.column),
            Cell::new(redact_value(&warning.value)),
            Cell::new(warning.rows),
            outcome,
        ]);
    }
    eprintln!("Unmapped values:");
    eprintln!("{table}");
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
        .set_width(80);
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

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
