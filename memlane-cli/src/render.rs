//! Terminal output of a table page.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use memlane_lib::model::Memory;
use memlane_lib::rows::{RowModel, facets, option_label};
use memlane_lib::state::{FilterKey, TableViewState};

/// Column id and header of every table column, in display order.
const COLUMNS: [(&str, &str); 8] = [
    ("task", "Task"),
    ("title", "Title"),
    ("status", "Status"),
    ("priority", "Priority"),
    ("estHours", "Est. Hours"),
    ("createdAt", "Created"),
    ("type", "Type"),
    ("reviewer", "Reviewer"),
];

pub fn print_page(page: &RowModel<'_, Memory>, state: &TableViewState) {
    let columns: Vec<(&str, &str)> = COLUMNS
        .into_iter()
        .filter(|(id, _)| state.is_column_visible(id))
        .collect();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        columns
            .iter()
            .map(|(id, header)| header_cell(id, header, state))
            .collect::<Vec<_>>(),
    );

    for memory in &page.rows {
        let selected = state.row_selection.contains(&memory.id);
        table.add_row(
            columns
                .iter()
                .map(|(id, _)| {
                    let cell = value_cell(memory, id);
                    if selected { cell.add_attribute(Attribute::Bold) } else { cell }
                })
                .collect::<Vec<_>>(),
        );
    }

    if let Some(column) = columns
        .iter()
        .position(|(id, _)| *id == "estHours")
        .and_then(|index| table.column_mut(index))
    {
        column.set_cell_alignment(CellAlignment::Right);
    }

    if page.rows.is_empty() {
        println!("No results.");
    } else {
        println!("{table}");
    }

    println!(
        "Page {} of {} | {} of {} rows | {} selected",
        page.page_index + 1,
        page.page_count.max(1),
        page.filtered_count,
        page.total_count,
        page.selected_count,
    );
}

fn header_cell(id: &str, header: &str, state: &TableViewState) -> Cell {
    let label = match &state.sort {
        Some(sort) if sort.column == id => {
            format!("{header} {}", if sort.descending { "↓" } else { "↑" })
        }
        _ => header.to_string(),
    };
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn value_cell(memory: &Memory, column: &str) -> Cell {
    match column {
        "task" => Cell::new(&memory.task),
        "title" => Cell::new(&memory.title),
        "status" => Cell::new(option_label(FilterKey::Status, memory.status.as_str())),
        "priority" => Cell::new(option_label(FilterKey::Priority, memory.priority.as_str())),
        "estHours" => Cell::new(memory.est_hours),
        "createdAt" => Cell::new(memory.created_at.format("%Y-%m-%d")),
        "type" => Cell::new(&memory.kind),
        "reviewer" => Cell::new(&memory.reviewer),
        _ => Cell::new(""),
    }
}

/// Prints the options of each multi-select filter with their counts. Active
/// options are marked with `*`.
pub fn print_facets(memories: &[Memory], state: &TableViewState) {
    for key in FilterKey::ALL {
        if key == FilterKey::Title {
            continue;
        }
        let active = state.filters.options(key);
        let options: Vec<String> = facets(memories, key)
            .into_iter()
            .map(|facet| {
                let marker = if active.is_some_and(|set| set.contains(&facet.value)) {
                    "*"
                } else {
                    ""
                };
                format!("{marker}{} ({})", facet.label, facet.count)
            })
            .collect();
        println!("{:<9} {}", facet_heading(key), options.join(", "));
    }
}

fn facet_heading(key: FilterKey) -> &'static str {
    match key {
        FilterKey::Title => "Title:",
        FilterKey::Status => "Status:",
        FilterKey::Priority => "Priority:",
        FilterKey::Type => "Type:",
        FilterKey::Reviewer => "Reviewer:",
    }
}
