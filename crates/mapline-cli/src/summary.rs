//! Terminal and JSON rendering of command results.

use anyhow::Result;
use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::Serialize;

use mapline_model::{FileState, PartnerReport, RunReport};

use crate::commands::{ConfigCheck, FormatListing, PartnerListing};

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_run_report(report: &RunReport) {
    if report.dry_run {
        println!("Dry run: nothing was stored");
    }
    if report.partners.is_empty() {
        println!("No partners processed");
        return;
    }
    println!("{}", partner_table(report));
    for partner in &report.partners {
        if partner.files.is_empty() {
            continue;
        }
        println!("Partner: {}", partner.partner_id);
        println!("{}", file_table(partner));
    }
    for partner in &report.partners {
        print_messages(&partner.partner_id, "Warnings", &partner.warnings);
    }
    for partner in &report.partners {
        if !partner.errors.is_empty() {
            eprintln!("Errors ({}):", partner.partner_id);
            for error in &partner.errors {
                eprintln!("- {error}");
            }
        }
    }
}

/// One row per partner plus a total row.
pub fn partner_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Partner"),
        header_cell("Status"),
        header_cell("Files"),
        header_cell("Records"),
        header_cell("Errors"),
        header_cell("Warnings"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for index in 2..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for partner in &report.partners {
        table.add_row(vec![
            Cell::new(&partner.partner_id).add_attribute(Attribute::Bold),
            status_cell(partner.success),
            Cell::new(partner.files_processed),
            Cell::new(partner.records_processed),
            count_cell(partner.errors.len(), Color::Red),
            count_cell(partner.warnings.len(), Color::Yellow),
        ]);
    }
    let errors: usize = report.partners.iter().map(|p| p.errors.len()).sum();
    let warnings: usize = report.partners.iter().map(|p| p.warnings.len()).sum();
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(report.total_files()).add_attribute(Attribute::Bold),
        Cell::new(report.total_records()).add_attribute(Attribute::Bold),
        count_cell(errors, Color::Red).add_attribute(Attribute::Bold),
        count_cell(warnings, Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    table
}

/// One row per file of a partner.
pub fn file_table(partner: &PartnerReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("State"),
        header_cell("Tables"),
        header_cell("Rows read"),
        header_cell("Rows out"),
        header_cell("Stored"),
        header_cell("Errors"),
        header_cell("Warnings"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for index in 3..8 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for file in &partner.files {
        let tables: Vec<&str> = file
            .tables
            .iter()
            .map(|t| t.target_table.as_str())
            .collect();
        let rows_read: usize = file.tables.iter().map(|t| t.rows_read).sum();
        let rows_out: usize = file.tables.iter().map(|t| t.rows_out).sum();
        let stored: usize = file.tables.iter().map(|t| t.rows_stored).sum();
        table.add_row(vec![
            Cell::new(file.file_name()),
            state_cell(file.state),
            if tables.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(tables.join(", "))
            },
            Cell::new(rows_read),
            Cell::new(rows_out),
            Cell::new(stored),
            count_cell(file.errors.len(), Color::Red),
            count_cell(file.warnings.len(), Color::Yellow),
        ]);
    }
    table
}

pub fn print_config_checks(checks: &[ConfigCheck]) {
    if checks.is_empty() {
        println!("No partner configurations found");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Configuration"),
        header_cell("Status"),
        header_cell("Errors"),
        header_cell("Warnings"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for check in checks {
        table.add_row(vec![
            Cell::new(&check.name),
            status_cell(check.valid),
            count_cell(check.errors.len(), Color::Red),
            count_cell(check.warnings.len(), Color::Yellow),
        ]);
    }
    println!("{table}");
    for check in checks {
        print_messages(&check.name, "Warnings", &check.warnings);
        if !check.errors.is_empty() {
            eprintln!("Errors ({}):", check.name);
            for error in &check.errors {
                eprintln!("- {error}");
            }
        }
    }
}

pub fn print_partner_list(partners: &[PartnerListing]) {
    if partners.is_empty() {
        println!("No partner configurations found");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Partner"),
        header_cell("Name"),
        header_cell("Template"),
        header_cell("Format"),
        header_cell("Tables"),
    ]);
    apply_table_style(&mut table);
    for partner in partners {
        table.add_row(vec![
            Cell::new(&partner.partner_id).add_attribute(Attribute::Bold),
            Cell::new(&partner.partner_name),
            Cell::new(&partner.template_id),
            Cell::new(&partner.file_format),
            Cell::new(partner.target_tables.join(", ")),
        ]);
    }
    println!("{table}");
}

pub fn print_formats(formats: &[FormatListing]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Reader"), header_cell("Extensions")]);
    apply_table_style(&mut table);
    for format in formats {
        table.add_row(vec![
            Cell::new(&format.reader).add_attribute(Attribute::Bold),
            Cell::new(format.extensions.join(", ")),
        ]);
    }
    println!("{table}");
}

fn print_messages(owner: &str, label: &str, messages: &[String]) {
    if messages.is_empty() {
        return;
    }
    println!("{label} ({owner}):");
    for message in messages {
        println!("- {message}");
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
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

fn status_cell(ok: bool) -> Cell {
    if ok {
        Cell::new("ok").fg(Color::Green)
    } else {
        Cell::new("failed")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    }
}

fn state_cell(state: FileState) -> Cell {
    let label = match state {
        FileState::Discovered => "discovered",
        FileState::Parsed => "parsed",
        FileState::Mapped => "mapped",
        FileState::Transformed => "transformed",
        FileState::Filtered => "filtered",
        FileState::Validated => "validated",
        FileState::Accepted => "accepted",
        FileState::Rejected => "rejected",
    };
    let color = match state {
        FileState::Accepted => Color::Green,
        FileState::Rejected => Color::Red,
        _ => Color::Yellow,
    };
    Cell::new(label).fg(color)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
