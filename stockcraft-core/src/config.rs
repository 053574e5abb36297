//! Configuration system for column names and calculation options

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Main configuration, usually loaded from `stockcraft.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockConfig {
    #[serde(default)]
    pub columns: ColumnNames,
    /// Worksheet to read; the first sheet when unset
    #[serde(default)]
    pub sheet: Option<String>,
    /// Refuse to calculate while any item lacks a target
    #[serde(default)]
    pub require_all_targets: bool,
    /// Number of items listed in the top excess/shortage tables
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl StockConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: StockConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Check that column names are usable
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (key, name) in self.columns.named() {
            if name.trim().is_empty() {
                return Err(StockError::Config(format!(
                    "column name for '{}' cannot be empty",
                    key
                )));
            }
            if !seen.insert(name.trim()) {
                return Err(StockError::Config(format!(
                    "column name '{}' is used more than once",
                    name
                )));
            }
        }

        if self.top_n == 0 {
            return Err(StockError::Config("top_n must be at least 1".to_string()));
        }

        Ok(())
    }
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            sheet: None,
            require_all_targets: false,
            top_n: default_top_n(),
        }
    }
}

fn default_top_n() -> usize {
    5
}

/// Header names of the required input columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub material_no: String,
    pub description: String,
    pub stock_boxes: String,
    pub stock_pieces: String,
    pub pieces_per_box: String,
}

impl ColumnNames {
    /// Required columns in canonical order
    pub fn required(&self) -> [&str; 5] {
        [
            self.material_no.as_str(),
            self.description.as_str(),
            self.stock_boxes.as_str(),
            self.stock_pieces.as_str(),
            self.pieces_per_box.as_str(),
        ]
    }

    fn named(&self) -> [(&'static str, &str); 5] {
        [
            ("material_no", self.material_no.as_str()),
            ("description", self.description.as_str()),
            ("stock_boxes", self.stock_boxes.as_str()),
            ("stock_pieces", self.stock_pieces.as_str()),
            ("pieces_per_box", self.pieces_per_box.as_str()),
        ]
    }
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            material_no: "Material No".to_string(),
            description: "Material Description".to_string(),
            stock_boxes: "Stock in CBB".to_string(),
            stock_pieces: "Stock in PKT".to_string(),
            pieces_per_box: "Alt UOM1 Num".to_string(),
        }
    }
}
