use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use adam_core::DomainSummary;

use crate::types::RunResult;

pub fn print_summary(result: &RunResult) {
    println!("Data: {}", result.data_dir.display());
    println!("Rules: {}", result.rules);
    println!("{}", summary_table(&result.domains));
    println!(
        "ADSL: {} subjects, {} columns",
        result.subjects, result.columns
    );
    if result.dry_run {
        println!("Dry run: no files written to {}", result.output_dir.display());
        return;
    }
    for path in result.outputs.iter() {
        println!("Wrote {}", path.display());
    }
}

/// Row counts per source domain.
pub fn summary_table(domains: &[DomainSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Domain"),
        header_cell("Rows"),
        header_cell("SUPP rows"),
        header_cell("Merged columns"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for summary in domains {
        let supp = match summary.supp_rows {
            Some(rows) => Cell::new(rows),
            None => dim_cell("-"),
        };
        let merged = if summary.added_columns.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(summary.added_columns.join(", "))
        };
        table.add_row(vec![
            domain_cell(&summary.domain),
            Cell::new(summary.main_rows),
            supp,
            merged,
        ]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
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

fn domain_cell(code: &str) -> Cell {
    Cell::new(code)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
