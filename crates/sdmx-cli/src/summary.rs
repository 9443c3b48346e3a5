use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use sdmx_core::{ActivityOutcome, RunSummary};
use sdmx_model::PipelineConfig;

/// Per-activity totals of a run, followed by a TOTAL row.
pub fn summary_table(summary: &RunSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        heading("Activity"),
        heading("Succeeded"),
        heading("Failed"),
        heading("Rows"),
        heading("New map entries"),
        heading("Discrepancies"),
    ]);
    style_summary(&mut table);
    align_right(&mut table, 1..=5);

    let mut totals = [0usize; 5];
    for activity in &summary.activities {
        let counts = activity_counts(activity);
        for (total, count) in totals.iter_mut().zip(counts) {
            *total += count;
        }
        table.add_row(vec![
            Cell::new(&activity.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(counts[0]),
            count_cell(counts[1], Color::Red),
            Cell::new(counts[2]),
            count_cell(counts[3], Color::Yellow),
            count_cell(counts[4], Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(totals[0]).add_attribute(Attribute::Bold),
        count_cell(totals[1], Color::Red).add_attribute(Attribute::Bold),
        Cell::new(totals[2]).add_attribute(Attribute::Bold),
        count_cell(totals[3], Color::Yellow).add_attribute(Attribute::Bold),
        count_cell(totals[4], Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    table
}

pub fn print_summary(summary: &RunSummary) {
    println!("{}", summary_table(summary));
    if summary.has_failures() {
        eprintln!("Failed queries:");
        for activity in &summary.activities {
            for failure in &activity.failures {
                eprintln!("- {}/{}: {}", activity.name, failure.id, failure.message);
            }
        }
    }
}

/// Configured activities with their category and query count.
pub fn activities_table(config: &PipelineConfig) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        heading("Activity"),
        heading("Category"),
        heading("Subcategory"),
        heading("Queries"),
    ]);
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    align_right(&mut table, [3]);
    for (name, activity) in &config.activities {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(&activity.category),
            dim_if_empty(&activity.subcategory),
            Cell::new(activity.queries.len()),
        ]);
    }
    table
}

/// Succeeded, failed, rows, new map entries, discrepancies.
fn activity_counts(activity: &ActivityOutcome) -> [usize; 5] {
    [
        activity.queries.len(),
        activity.failures.len(),
        activity.rows_written(),
        activity.new_map_entries(),
        activity.discrepancies.len(),
    ]
}

fn style_summary(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_right(table: &mut Table, indices: impl IntoIterator<Item = usize>) {
    for index in indices {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        muted(count)
    }
}

fn dim_if_empty(value: &str) -> Cell {
    if value.is_empty() {
        muted("-")
    } else {
        Cell::new(value)
    }
}

fn heading(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn muted<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
