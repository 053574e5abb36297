//! CSV writer

use super::SheetData;
use crate::error::Result;
use std::path::Path;

/// Write a single sheet to a CSV file, header first
pub fn write_csv(path: &Path, sheet: &SheetData) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&sheet.headers)?;

    for row in &sheet.rows {
        writer.write_record(row.iter().map(|cell| cell.display_text()))?;
    }

    writer.flush()?;
    Ok(())
}
