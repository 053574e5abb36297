//! Spreadsheet and CSV reader
//!
//! Workbooks go through calamine, CSV files through the csv crate. Either way
//! the result is a [`Table`]: trimmed headers from the first non-blank row,
//! then every non-blank row beneath it.

use crate::error::{Result, StockError};
use calamine::{Data, Range, Reader, open_workbook_auto};
use std::path::Path;
use tracing::debug;

pub mod table;

pub use table::{CellValue, MAX_WHOLE_NUMBER, Row, Table};

/// Extensions handled by calamine
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Read a table from a workbook or CSV file
///
/// For workbooks `sheet` selects the worksheet by name; the first worksheet
/// is used otherwise. `sheet` is ignored for CSV files.
pub fn read_table<P: AsRef<Path>>(path: P, sheet: Option<&str>) -> Result<Table> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();

    let table = if extension == "csv" {
        read_csv(path)?
    } else if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        read_workbook(path, sheet)?
    } else {
        return Err(StockError::UnsupportedFormat(format!(
            "'{}' (expected .xlsx, .xls, .ods or .csv)",
            path.display()
        )));
    };

    if table.headers.is_empty() || table.is_empty() {
        return Err(StockError::EmptyFile(path.to_path_buf()));
    }

    debug!(
        "Read {} data rows and {} columns from {}",
        table.rows.len(),
        table.headers.len(),
        path.display()
    );
    Ok(table)
}

fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names();

    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| StockError::SheetNotFound(name.to_string()))?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| StockError::EmptyFile(path.to_path_buf()))?,
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    let mut table = table_from_range(&range);
    table.source = path.to_path_buf();
    table.sheet_name = Some(sheet_name);
    Ok(table)
}

fn table_from_range(range: &Range<Data>) -> Table {
    // Absolute 0-based row of the first row in the range
    let first_row = range.start().map(|(row, _)| row).unwrap_or(0);

    let mut headers = Vec::new();
    let mut rows = Vec::new();

    for (offset, data_row) in range.rows().enumerate() {
        let cells: Vec<CellValue> = data_row.iter().map(parse_cell_value).collect();
        let row = Row {
            number: first_row + offset as u32 + 1,
            cells,
        };

        if row.is_blank() {
            continue;
        }

        if headers.is_empty() {
            headers = row.cells.iter().map(header_name).collect();
        } else {
            rows.push(row);
        }
    }

    Table {
        source: Default::default(),
        sheet_name: None,
        headers,
        rows,
    }
}

fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let row = Row {
            // Header occupies line 1
            number: idx as u32 + 2,
            cells: record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(field.to_string())
                    }
                })
                .collect(),
        };
        if !row.is_blank() {
            rows.push(row);
        }
    }

    Ok(Table {
        source: path.to_path_buf(),
        sheet_name: None,
        headers,
        rows,
    })
}

fn header_name(cell: &CellValue) -> String {
    cell.display_text().trim().to_string()
}

fn parse_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(e) => CellValue::Error(format!("{:?}", e)),
        Data::Empty => CellValue::Empty,
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}
