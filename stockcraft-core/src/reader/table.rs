//! In-memory table data structures

use crate::error::{Result, StockError};
use std::path::PathBuf;

/// A header row plus data rows read from one worksheet or CSV file
#[derive(Debug, Clone)]
pub struct Table {
    pub source: PathBuf,
    /// Worksheet the table was read from (None for CSV)
    pub sheet_name: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Find a column by its (trimmed) header name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name.trim())
    }

    /// Resolve every requested column, reporting all missing ones at once
    pub fn require_columns(&self, names: &[&str]) -> Result<Vec<usize>> {
        let mut indices = Vec::with_capacity(names.len());
        let mut missing = Vec::new();

        for name in names {
            match self.column_index(name) {
                Some(idx) => indices.push(idx),
                None => missing.push(name.to_string()),
            }
        }

        if missing.is_empty() {
            Ok(indices)
        } else {
            Err(StockError::MissingColumns(missing))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A data row
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// 1-based spreadsheet row number (the header is usually row 1)
    pub number: u32,
    pub cells: Vec<CellValue>,
}

impl Row {
    /// Cell at `col`, or `Empty` when the row is shorter than the header
    pub fn get(&self, col: usize) -> &CellValue {
        self.cells.get(col).unwrap_or(&CellValue::Empty)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_empty)
    }
}

/// Cell value types
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(String),
}

impl CellValue {
    /// Empty cells and whitespace-only text both count as empty
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Interpret the cell as a whole number
    ///
    /// Numbers must have no fractional part; text must parse as one after
    /// trimming (`"12"`, `"12.0"`). Magnitudes above [`MAX_WHOLE_NUMBER`]
    /// are rejected.
    pub fn as_whole_number(&self) -> Option<i64> {
        match self {
            CellValue::Number(n) => whole_from_f64(*n),
            CellValue::Text(s) => {
                let s = s.trim();
                match s.parse::<i64>() {
                    Ok(n) => Some(n).filter(|n| within_whole_range(*n)),
                    Err(_) => s.parse::<f64>().ok().and_then(whole_from_f64),
                }
            }
            _ => None,
        }
    }

    /// Textual form used in messages and CSV output
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => b.to_string(),
            CellValue::Error(e) => e.clone(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

/// Largest quantity magnitude accepted anywhere: 2^53 - 1
///
/// Every integer up to here survives a trip through an `f64` spreadsheet
/// cell unchanged.
pub const MAX_WHOLE_NUMBER: i64 = 9_007_199_254_740_991;

pub(crate) fn within_whole_range(n: i64) -> bool {
    n.unsigned_abs() <= MAX_WHOLE_NUMBER as u64
}

fn whole_from_f64(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_WHOLE_NUMBER as f64 {
        Some(n as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str]) -> Table {
        Table {
            source: PathBuf::from("test.xlsx"),
            sheet_name: Some("Sheet1".to_string()),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    #[test]
    fn test_whole_numbers() {
        assert_eq!(CellValue::Number(24.0).as_whole_number(), Some(24));
        assert_eq!(CellValue::Number(-3.0).as_whole_number(), Some(-3));
        assert_eq!(CellValue::Number(2.5).as_whole_number(), None);
        assert_eq!(CellValue::Text(" 120 ".into()).as_whole_number(), Some(120));
        assert_eq!(CellValue::Text("50.0".into()).as_whole_number(), Some(50));
        assert_eq!(CellValue::Text("abc".into()).as_whole_number(), None);
        assert_eq!(CellValue::Empty.as_whole_number(), None);
        assert_eq!(CellValue::Boolean(true).as_whole_number(), None);
        assert_eq!(CellValue::Number(f64::NAN).as_whole_number(), None);
    }

    #[test]
    fn test_whole_numbers_are_bounded() {
        let text = |s: &str| CellValue::Text(s.into()).as_whole_number();
        assert_eq!(text("9007199254740991"), Some(MAX_WHOLE_NUMBER));
        assert_eq!(text("-9007199254740991"), Some(-MAX_WHOLE_NUMBER));
        assert_eq!(text("9007199254740992"), None);
        assert_eq!(text("9007199254740993"), None);
        assert_eq!(text("9223372036854775807"), None);
        assert_eq!(text("1e300"), None);
        assert_eq!(CellValue::Number(9_007_199_254_740_992.0).as_whole_number(), None);
        assert_eq!(
            CellValue::Number(MAX_WHOLE_NUMBER as f64).as_whole_number(),
            Some(MAX_WHOLE_NUMBER)
        );
    }

    #[test]
    fn test_require_columns_reports_all_missing() {
        let t = table(&["Material No", "Stock in CBB"]);
        assert_eq!(
            t.require_columns(&["Stock in CBB", "Material No"]).unwrap(),
            vec![1, 0]
        );

        match t.require_columns(&["Material No", "Material Description", "Alt UOM1 Num"]) {
            Err(StockError::MissingColumns(missing)) => {
                assert_eq!(missing, vec!["Material Description", "Alt UOM1 Num"]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let row = Row {
            number: 2,
            cells: vec![CellValue::Text("  ".into())],
        };
        assert!(row.is_blank());
        assert_eq!(row.get(4), &CellValue::Empty);
    }
}
