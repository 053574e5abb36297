//! Writer module for exporting results and target templates
//!
//! `.xlsx` output carries a results sheet plus a summary sheet; `.csv` output
//! carries the results only. Exported result files can be read back with
//! [`read_report`].

mod csv_writer;
mod xlsx_writer;

pub use csv_writer::write_csv;
pub use xlsx_writer::write_xlsx;

use crate::calculator::{ResultRow, Status};
use crate::config::ColumnNames;
use crate::error::{Result, StockError};
use crate::item::{InventoryItem, MaterialNo};
use crate::reader::{self, CellValue};
use crate::summary::Summary;
use crate::targets::{TARGET_BOXES_COLUMN, TARGET_PIECES_COLUMN, TargetSet};
use serde::Serialize;
use std::path::Path;
use tracing::info;

pub const RESULTS_SHEET: &str = "Stock Analysis";
pub const SUMMARY_SHEET: &str = "Summary";
pub const TEMPLATE_SHEET: &str = "Targets";

/// Column order of exported results
pub const RESULT_HEADERS: [&str; 16] = [
    "Material No",
    "Material Description",
    "Stock in CBB",
    "Stock in PKT",
    "Alt UOM1 Num",
    TARGET_BOXES_COLUMN,
    TARGET_PIECES_COLUMN,
    "Total Current Pieces",
    "Total Target Pieces",
    "Delta (Boxes)",
    "Delta (Pieces)",
    "Delta (Total Pieces)",
    "Status",
    "Excess/Shortage (Boxes)",
    "Excess/Shortage (Pieces)",
    "Percentage Difference",
];

/// One worksheet's worth of output
#[derive(Debug, Clone, PartialEq)]
pub struct SheetData {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    /// Determine the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
            .as_deref()
        {
            Some("xlsx") => Ok(ExportFormat::Xlsx),
            Some("csv") => Ok(ExportFormat::Csv),
            _ => Err(StockError::UnsupportedFormat(format!(
                "'{}' (export supports .xlsx and .csv)",
                path.display()
            ))),
        }
    }
}

/// Build the results sheet
pub fn result_sheet(rows: &[ResultRow]) -> SheetData {
    SheetData {
        name: RESULTS_SHEET.to_string(),
        headers: RESULT_HEADERS.iter().map(|h| h.to_string()).collect(),
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    CellValue::from(r.material_no.as_str()),
                    CellValue::from(r.description.as_str()),
                    r.stock_boxes.into(),
                    r.stock_pieces.into(),
                    r.pieces_per_box.into(),
                    r.target_boxes.into(),
                    r.target_pieces.into(),
                    r.total_current_pieces.into(),
                    r.total_target_pieces.into(),
                    r.delta_boxes.into(),
                    r.delta_pieces.into(),
                    r.delta_total.into(),
                    CellValue::from(r.status.as_str()),
                    CellValue::from(r.box_breakdown.as_str()),
                    CellValue::from(r.piece_breakdown.as_str()),
                    r.percentage_difference.into(),
                ]
            })
            .collect(),
    }
}

/// Build the Metric/Count summary sheet
pub fn summary_sheet(summary: &Summary) -> SheetData {
    SheetData {
        name: SUMMARY_SHEET.to_string(),
        headers: vec!["Metric".to_string(), "Count".to_string()],
        rows: summary
            .metrics()
            .into_iter()
            .map(|(metric, count)| vec![CellValue::from(metric), CellValue::from(count as i64)])
            .collect(),
    }
}

/// Build a targets template: one row per item, targets pre-filled
///
/// Items already in `targets` carry their target; all others get zero.
pub fn template_sheet(items: &[InventoryItem], targets: &TargetSet, columns: &ColumnNames) -> SheetData {
    let mut headers: Vec<String> = columns.required().iter().map(|h| h.to_string()).collect();
    headers.push(TARGET_BOXES_COLUMN.to_string());
    headers.push(TARGET_PIECES_COLUMN.to_string());

    SheetData {
        name: TEMPLATE_SHEET.to_string(),
        headers,
        rows: items
            .iter()
            .map(|item| {
                let (boxes, pieces) = targets
                    .get(&item.material_no)
                    .map(|t| (t.boxes, t.pieces))
                    .unwrap_or((0, 0));
                vec![
                    CellValue::from(item.material_no.as_str()),
                    CellValue::from(item.description.as_str()),
                    item.stock_boxes.into(),
                    item.stock_pieces.into(),
                    item.pieces_per_box.into(),
                    boxes.into(),
                    pieces.into(),
                ]
            })
            .collect(),
    }
}

/// Export calculated rows; the summary sheet is only written to XLSX
pub fn export_report<P: AsRef<Path>>(rows: &[ResultRow], summary: &Summary, path: P) -> Result<()> {
    let path = path.as_ref();
    match ExportFormat::from_path(path)? {
        ExportFormat::Xlsx => write_xlsx(path, &[result_sheet(rows), summary_sheet(summary)])?,
        ExportFormat::Csv => write_csv(path, &result_sheet(rows))?,
    }
    info!("Exported {} result rows to {}", rows.len(), path.display());
    Ok(())
}

/// Write a targets template to XLSX or CSV
pub fn write_template<P: AsRef<Path>>(
    items: &[InventoryItem],
    targets: &TargetSet,
    columns: &ColumnNames,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    let sheet = template_sheet(items, targets, columns);
    match ExportFormat::from_path(path)? {
        ExportFormat::Xlsx => write_xlsx(path, &[sheet])?,
        ExportFormat::Csv => write_csv(path, &sheet)?,
    }
    info!("Wrote targets template for {} items to {}", items.len(), path.display());
    Ok(())
}

/// Identifying fields and deltas read back from an exported result file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRecord {
    pub material_no: MaterialNo,
    pub description: String,
    pub delta_boxes: i64,
    pub delta_pieces: i64,
    pub delta_total: i64,
    pub status: Status,
}

/// Read an exported result file (XLSX results sheet or CSV)
pub fn read_report<P: AsRef<Path>>(path: P) -> Result<Vec<ReportRecord>> {
    let path = path.as_ref();
    let sheet = match ExportFormat::from_path(path)? {
        ExportFormat::Xlsx => Some(RESULTS_SHEET),
        ExportFormat::Csv => None,
    };
    let table = match reader::read_table(path, sheet) {
        // An export of zero rows holds only the header
        Err(StockError::EmptyFile(_)) => return Ok(Vec::new()),
        other => other?,
    };
    let idx = table.require_columns(&[
        RESULT_HEADERS[0],
        RESULT_HEADERS[1],
        RESULT_HEADERS[9],
        RESULT_HEADERS[10],
        RESULT_HEADERS[11],
        RESULT_HEADERS[12],
    ])?;

    table
        .rows
        .iter()
        .map(|row| {
            let invalid = |column: &str| {
                StockError::InvalidReport(format!("row {}: invalid '{}'", row.number, column))
            };
            let whole = |i: usize| {
                row.get(idx[i])
                    .as_whole_number()
                    .ok_or_else(|| invalid(RESULT_HEADERS[i + 7]))
            };

            let material_no = match row.get(idx[0]) {
                CellValue::Number(n) => MaterialNo::from_number(*n),
                other => MaterialNo::parse(&other.display_text()),
            }
            .ok_or_else(|| invalid(RESULT_HEADERS[0]))?;

            Ok(ReportRecord {
                material_no,
                description: row.get(idx[1]).display_text(),
                delta_boxes: whole(2)?,
                delta_pieces: whole(3)?,
                delta_total: whole(4)?,
                status: row
                    .get(idx[5])
                    .display_text()
                    .parse()
                    .map_err(|_| invalid(RESULT_HEADERS[12]))?,
            })
        })
        .collect()
}
