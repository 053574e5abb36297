//! Output formatters for inventory, warnings and results

use anyhow::Result;
use colored::*;
use std::path::Path;
use stockcraft_core::summary::{filter_status, top_excess, top_shortage};
use stockcraft_core::{ColumnNames, InventoryItem, ResultRow, Session, Status, StockReport, Warning};

const DESCRIPTION_WIDTH: usize = 28;

/// Print cleaned inventory items followed by any cleaning warnings
pub fn print_inventory(session: &Session) {
    println!("{}", format!("Inventory: {}", session.source().display()).bold());
    println!();

    let items = session.items();
    if items.is_empty() {
        println!("{}", "No valid rows to process.".yellow().bold());
    } else {
        println!(
            "{}",
            format!(
                "{:<12} {:<w$} {:>8} {:>8} {:>8}",
                "Material No",
                "Description",
                "CBB",
                "PKT",
                "Per Box",
                w = DESCRIPTION_WIDTH
            )
            .bold()
            .underline()
        );
        for item in items {
            print_item(item);
        }
        println!();
    }

    print_warnings("Data warnings", session.warnings());

    let report = session.clean_report();
    println!("{}", "Summary:".bold().underline());
    println!("  {} {}", "Items:".bold(), report.items.len());
    if report.excluded_rows > 0 {
        println!(
            "  {} {} ({} duplicates)",
            "Excluded rows:".yellow().bold(),
            report.excluded_rows,
            report.duplicates_skipped
        );
    }
}

fn print_item(item: &InventoryItem) {
    println!(
        "{} {:<w$} {:>8} {:>8} {:>8}",
        format!("{:<12}", item.material_no).cyan(),
        truncate(&item.description, DESCRIPTION_WIDTH),
        quantity(item.stock_boxes),
        quantity(item.stock_pieces),
        quantity(item.pieces_per_box),
        w = DESCRIPTION_WIDTH
    );
}

/// Print non-fatal warnings under a heading; nothing when there are none
pub fn print_warnings(title: &str, warnings: &[Warning]) {
    if warnings.is_empty() {
        return;
    }
    println!("{}", format!("{}:", title).bold().underline());
    for warning in warnings {
        println!("  {} {}", "WARN".yellow().bold(), warning);
    }
    println!();
}

/// Print a calculation report
///
/// `status` restricts the results table; the summary always covers every row.
pub fn print_report(report: &StockReport, status: Option<Status>, top_n: usize) {
    if report.is_empty() {
        println!("{}", "No valid rows to process.".yellow().bold());
        println!();
        print_warnings("Skipped items", &report.warnings);
        return;
    }

    let rows: Vec<&ResultRow> = match status {
        Some(status) => filter_status(&report.rows, status),
        None => report.rows.iter().collect(),
    };

    println!("{}", "Stock Analysis:".bold().underline());
    println!(
        "{}",
        format!(
            "{:<12} {:<w$} {:>9} {:>9} {:>9} {:<9} {:<18} {:<19} {:>8}",
            "Material No",
            "Description",
            "Current",
            "Target",
            "Delta",
            "Status",
            "Boxes",
            "Pieces",
            "%",
            w = DESCRIPTION_WIDTH
        )
        .bold()
    );
    for row in &rows {
        println!(
            "{} {:<w$} {:>9} {:>9} {:>9} {} {:<18} {:<19} {:>8}",
            format!("{:<12}", row.material_no).cyan(),
            truncate(&row.description, DESCRIPTION_WIDTH),
            row.total_current_pieces,
            row.total_target_pieces,
            format!("{:+}", row.delta_total),
            status_label(row.status, 9),
            row.box_breakdown,
            row.piece_breakdown,
            percentage(row.percentage_difference),
            w = DESCRIPTION_WIDTH
        );
    }
    if rows.is_empty() {
        println!("  {}", "No items with the selected status.".bright_black());
    }
    println!();

    print_ranking("Top excess items", &top_excess(&report.rows, top_n));
    print_ranking("Top shortage items", &top_shortage(&report.rows, top_n));
    print_warnings("Skipped items", &report.warnings);

    let summary = &report.summary;
    println!("{}", "Summary:".bold().underline());
    for (metric, count) in summary.metrics() {
        println!("  {} {}", format!("{:<24}", format!("{}:", metric)).bold(), count);
    }
    println!(
        "  {} {}% ({} pieces)",
        format!("{:<24}", "Excess share:").red().bold(),
        summary.excess_percentage,
        summary.total_excess_pieces
    );
    println!(
        "  {} {}% ({} pieces)",
        format!("{:<24}", "Shortage share:").yellow().bold(),
        summary.shortage_percentage,
        summary.total_shortage_pieces
    );
}

fn print_ranking(title: &str, rows: &[&ResultRow]) {
    if rows.is_empty() {
        return;
    }
    println!("{}", format!("{}:", title).bold().underline());
    for (rank, row) in rows.iter().enumerate() {
        println!(
            "  {}. {} {} {:+} pieces",
            rank + 1,
            row.material_no.as_str().cyan(),
            row.description,
            row.delta_total
        );
    }
    println!();
}

/// One-line live preview shown while entering targets
pub fn preview_line(row: &ResultRow) -> String {
    format!(
        "current {} / target {} pieces, delta {:+} {} ({}, {})",
        row.total_current_pieces,
        row.total_target_pieces,
        row.delta_total,
        status_label(row.status, 0),
        row.box_breakdown,
        row.piece_breakdown
    )
}

fn status_label(status: Status, width: usize) -> ColoredString {
    let padded = format!("{:<width$}", status.as_str(), width = width);
    match status {
        Status::Excess => padded.red().bold(),
        Status::Shortage => padded.yellow().bold(),
        Status::Balanced => padded.green().bold(),
    }
}

fn quantity(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn percentage(value: Option<f64>) -> String {
    value
        .map(|p| format!("{:.2}", p))
        .unwrap_or_else(|| "-".to_string())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}

/// Print cleaned inventory in JSON format
pub fn print_inventory_json(session: &Session) -> Result<()> {
    let report = session.clean_report();
    let output = serde_json::json!({
        "file": session.source().display().to_string(),
        "items": report.items,
        "warnings": report.warnings,
        "summary": {
            "items": report.items.len(),
            "excluded_rows": report.excluded_rows,
            "duplicates_skipped": report.duplicates_skipped,
        }
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Print a calculation report in JSON format
pub fn print_report_json(
    file_path: &Path,
    report: &StockReport,
    status: Option<Status>,
    top_n: usize,
) -> Result<()> {
    let rows: Vec<&ResultRow> = match status {
        Some(status) => filter_status(&report.rows, status),
        None => report.rows.iter().collect(),
    };
    let output = serde_json::json!({
        "file": file_path.display().to_string(),
        "results": rows,
        "warnings": report.warnings,
        "summary": report.summary,
        "top_excess": top_excess(&report.rows, top_n),
        "top_shortage": top_shortage(&report.rows, top_n),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Print the expected input columns with a short sample
pub fn print_format(columns: &ColumnNames) {
    println!("{}", "Required input format".bold());
    println!();
    println!("An .xlsx, .xls, .ods or .csv file whose first row holds these columns:");
    let descriptions = [
        "numeric material identifier (e.g. 9000579)",
        "item name",
        "current stock in boxes",
        "current stock in loose pieces",
        "pieces per box",
    ];
    for (column, description) in columns.required().iter().zip(descriptions) {
        println!(
            "  {} {}",
            format!("{:<24}", column).cyan().bold(),
            description.bright_black()
        );
    }
    println!();

    println!("{}", "Sample data:".bold().underline());
    let [material_no, description, boxes, pieces, per_box] = columns.required();
    println!(
        "{}",
        format!(
            "{:<12} {:<24} {:>13} {:>13} {:>13}",
            material_no, description, boxes, pieces, per_box
        )
        .bold()
    );
    let samples = [
        ("9000579", "MARIE BISCUIT 75GM", 50, 120, 24),
        ("9000741", "GLUCOSE BISCUIT 100GM", 30, 80, 20),
        ("9001048", "CREAM CRACKERS 200GM", 25, 60, 16),
    ];
    for (id, name, cbb, pkt, alt) in samples {
        println!("{:<12} {:<24} {:>13} {:>13} {:>13}", id, name, cbb, pkt, alt);
    }
    println!();
    println!(
        "{}",
        "Rows missing the material number or description are skipped, as are repeated material numbers."
            .bright_black()
    );
}
