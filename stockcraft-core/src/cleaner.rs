//! Row cleaning and validation
//!
//! One pass over the table, in row order:
//!
//! 1. rows without a usable Material No are excluded,
//! 2. rows without a Material Description are excluded,
//! 3. repeated Material Nos are excluded (the first occurrence wins).
//!
//! Every excluded row produces exactly one [`Warning`]. Quantity cells are
//! coerced to whole numbers but never cause exclusion; unusable quantities
//! become `None` and are dealt with by the calculator.

use crate::config::{ColumnNames, StockConfig};
use crate::error::Result;
use crate::item::{InventoryItem, MaterialNo};
use crate::reader::{CellValue, Row, Table};
use crate::warning::Warning;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Output of a cleaning pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanReport {
    pub items: Vec<InventoryItem>,
    /// One warning per excluded row, in row order
    pub warnings: Vec<Warning>,
    pub excluded_rows: usize,
    pub duplicates_skipped: usize,
}

pub struct Cleaner {
    columns: ColumnNames,
}

/// Column positions resolved against a table header
struct ColumnIndex {
    material_no: usize,
    description: usize,
    stock_boxes: usize,
    stock_pieces: usize,
    pieces_per_box: usize,
}

enum Rejection {
    MissingMaterialNo,
    InvalidMaterialNo(String),
    MissingDescription(MaterialNo),
    Duplicate { material_no: MaterialNo, first_row: u32 },
}

impl Cleaner {
    pub fn new() -> Self {
        Self::with_config(&StockConfig::default())
    }

    pub fn with_config(config: &StockConfig) -> Self {
        Self {
            columns: config.columns.clone(),
        }
    }

    /// Clean a table
    ///
    /// Fails only when a required column is absent from the header.
    pub fn clean(&self, table: &Table) -> Result<CleanReport> {
        let idx = table.require_columns(&self.columns.required())?;
        let columns = ColumnIndex {
            material_no: idx[0],
            description: idx[1],
            stock_boxes: idx[2],
            stock_pieces: idx[3],
            pieces_per_box: idx[4],
        };

        let mut report = CleanReport::default();
        let mut first_seen: HashMap<MaterialNo, u32> = HashMap::new();

        for row in &table.rows {
            match self.clean_row(row, &columns, &first_seen) {
                Ok(item) => {
                    first_seen.insert(item.material_no.clone(), item.row);
                    report.items.push(item);
                }
                Err(rejection) => {
                    if matches!(rejection, Rejection::Duplicate { .. }) {
                        report.duplicates_skipped += 1;
                    }
                    let warning = self.warning_for(row.number, rejection);
                    warn!("{}", warning);
                    report.excluded_rows += 1;
                    report.warnings.push(warning);
                }
            }
        }

        info!(
            "Cleaned {} rows: {} items kept, {} excluded ({} duplicates)",
            table.rows.len(),
            report.items.len(),
            report.excluded_rows,
            report.duplicates_skipped
        );
        Ok(report)
    }

    fn clean_row(
        &self,
        row: &Row,
        columns: &ColumnIndex,
        first_seen: &HashMap<MaterialNo, u32>,
    ) -> std::result::Result<InventoryItem, Rejection> {
        let material_no = coerce_material_no(row.get(columns.material_no))?;

        let description = match row.get(columns.description) {
            cell if cell.is_empty() => return Err(Rejection::MissingDescription(material_no)),
            cell => cell.display_text().trim().to_string(),
        };

        if let Some(first_row) = first_seen.get(&material_no) {
            return Err(Rejection::Duplicate {
                material_no,
                first_row: *first_row,
            });
        }

        let item = InventoryItem {
            material_no,
            description,
            stock_boxes: coerce_quantity(row.get(columns.stock_boxes), 0),
            stock_pieces: coerce_quantity(row.get(columns.stock_pieces), 0),
            pieces_per_box: coerce_quantity(row.get(columns.pieces_per_box), 1),
            row: row.number,
        };
        debug!("Row {}: kept Material {}", row.number, item.material_no);
        Ok(item)
    }

    fn warning_for(&self, row: u32, rejection: Rejection) -> Warning {
        let column = &self.columns.material_no;
        match rejection {
            Rejection::MissingMaterialNo => {
                Warning::for_row(row, format!("missing {}; row excluded", column))
            }
            Rejection::InvalidMaterialNo(raw) => Warning::for_row(
                row,
                format!("invalid {} '{}'; row excluded", column, raw),
            ),
            Rejection::MissingDescription(material_no) => Warning::new(
                Some(row),
                Some(material_no),
                format!("missing {}; row excluded", self.columns.description),
            ),
            Rejection::Duplicate {
                material_no,
                first_row,
            } => Warning::new(
                Some(row),
                Some(material_no),
                format!(
                    "duplicate {}, first seen on row {}; row excluded",
                    column, first_row
                ),
            ),
        }
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new()
    }
}

fn coerce_material_no(cell: &CellValue) -> std::result::Result<MaterialNo, Rejection> {
    if cell.is_empty() {
        return Err(Rejection::MissingMaterialNo);
    }

    let parsed = match cell {
        CellValue::Number(n) => MaterialNo::from_number(*n),
        CellValue::Text(s) => MaterialNo::parse(s),
        _ => None,
    };

    parsed.ok_or_else(|| Rejection::InvalidMaterialNo(cell.display_text().trim().to_string()))
}

/// Whole number no smaller than `min`
fn coerce_quantity(cell: &CellValue, min: i64) -> Option<i64> {
    cell.as_whole_number().filter(|n| *n >= min)
}
