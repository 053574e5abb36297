//! Inventory data model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Material identifier in integer textual form (e.g. `"9000579"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialNo(String);

impl MaterialNo {
    /// Parse textual identifiers, dropping a float-style `.0` suffix
    ///
    /// `"9000579"`, `" 9000579.0 "` and `"0009000579"` all become
    /// `9000579`. Anything that is not an integer yields `None`.
    pub fn parse(text: &str) -> Option<Self> {
        static INTEGER_TEXT: OnceLock<Regex> = OnceLock::new();
        let re = INTEGER_TEXT.get_or_init(|| Regex::new(r"^([+-]?\d+)(?:\.0*)?$").unwrap());

        let caps = re.captures(text.trim())?;
        let value: i64 = caps.get(1)?.as_str().parse().ok()?;
        Some(Self(value.to_string()))
    }

    /// Build from a numeric cell; fractional values are rejected
    pub fn from_number(value: f64) -> Option<Self> {
        // 2^53: the largest range where f64 holds every integer
        if value.is_finite() && value.fract() == 0.0 && value.abs() <= 9_007_199_254_740_992.0 {
            Some(Self((value as i64).to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MaterialNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cleaned inventory row
///
/// Quantities are `None` when the source cell is empty, not a whole number
/// or out of range (negative stock, pieces-per-box of zero). Such items
/// survive cleaning but are skipped by the calculator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryItem {
    pub material_no: MaterialNo,
    pub description: String,
    /// Current stock in boxes (CBB)
    pub stock_boxes: Option<i64>,
    /// Current stock in pieces (PKT)
    pub stock_pieces: Option<i64>,
    /// Pieces per box (Alt UOM1 Num)
    pub pieces_per_box: Option<i64>,
    /// Source spreadsheet row
    pub row: u32,
}

/// Fully valid current stock of one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentStock {
    pub boxes: i64,
    pub pieces: i64,
    pub pieces_per_box: i64,
}

/// Quantity fields of an [`InventoryItem`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityField {
    StockBoxes,
    StockPieces,
    PiecesPerBox,
}

impl InventoryItem {
    /// All quantities, or the first field that is unusable
    pub fn current_stock(&self) -> Result<CurrentStock, QuantityField> {
        Ok(CurrentStock {
            boxes: self.stock_boxes.ok_or(QuantityField::StockBoxes)?,
            pieces: self.stock_pieces.ok_or(QuantityField::StockPieces)?,
            pieces_per_box: self.pieces_per_box.ok_or(QuantityField::PiecesPerBox)?,
        })
    }
}

impl CurrentStock {
    /// Equivalent total in pieces; None when it would overflow
    pub fn total_pieces(&self) -> Option<i64> {
        self.boxes
            .checked_mul(self.pieces_per_box)?
            .checked_add(self.pieces)
    }
}
