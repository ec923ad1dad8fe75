use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::commands::{RunResult, display_dir};

pub fn print_summary(result: &RunResult) {
    println!("Output: {}", display_dir(&result.out_dir));
    println!("Summary: {}", result.summary_path.display());
    if result.transposed {
        println!("Input was transposed: patients read from columns.");
    }
    if !result.unresolved.is_empty() {
        println!("Unresolved variables: {}", result.unresolved.join(", "));
    }
    println!("{}", score_table(result));
    println!(
        "Reports: {} written, {} failed",
        result.reports_written, result.report_failures
    );
    if result.warnings > 0 {
        eprintln!("{} formula failure(s); see the log for details.", result.warnings);
    }
}

fn score_table(result: &RunResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Score"),
        header_cell("Computed"),
        header_cell("Missing variables"),
        header_cell("Formula errors"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=3 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let mut total_missing = 0usize;
    let mut total_errors = 0usize;
    for tally in &result.summary.scores {
        total_missing += tally.missing_variables;
        total_errors += tally.formula_errors;
        table.add_row(vec![
            Cell::new(&tally.score)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            count_cell(tally.computed, Color::Green),
            count_cell(tally.missing_variables, Color::Yellow),
            count_cell(tally.formula_errors, Color::Red),
        ]);
    }
    table.add_row(vec![
        Cell::new(format!("TOTAL ({} patients)", result.summary.record_count()))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        count_cell(result.summary.total_computed(), Color::Green).add_attribute(Attribute::Bold),
        count_cell(total_missing, Color::Yellow).add_attribute(Attribute::Bold),
        count_cell(total_errors, Color::Red).add_attribute(Attribute::Bold),
    ]);
    table
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
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
