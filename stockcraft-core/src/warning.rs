//! Non-fatal warnings collected while cleaning and calculating

use crate::item::MaterialNo;
use serde::Serialize;
use std::fmt;

/// A human-readable, non-fatal problem tied to a row and/or material
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// Source spreadsheet row, when known
    pub row: Option<u32>,
    pub material_no: Option<MaterialNo>,
    pub message: String,
}

impl Warning {
    pub fn new(row: Option<u32>, material_no: Option<MaterialNo>, message: impl Into<String>) -> Self {
        Self {
            row,
            material_no,
            message: message.into(),
        }
    }

    pub fn for_row(row: u32, message: impl Into<String>) -> Self {
        Self::new(Some(row), None, message)
    }

    pub fn for_material(material_no: &MaterialNo, message: impl Into<String>) -> Self {
        Self::new(None, Some(material_no.clone()), message)
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.row, &self.material_no) {
            (Some(row), Some(material)) => {
                write!(f, "Row {} (Material {}): {}", row, material, self.message)
            }
            (Some(row), None) => write!(f, "Row {}: {}", row, self.message),
            (None, Some(material)) => write!(f, "Material {}: {}", material, self.message),
            (None, None) => f.write_str(&self.message),
        }
    }
}
