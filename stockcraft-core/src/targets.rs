//! Target stock levels entered per material
//!
//! Targets come from an interactive prompt, a tabular targets file (any format
//! the reader accepts, e.g. the CSV written by the template export) or a TOML
//! file of the form:
//!
//! ```toml
//! [targets."9000579"]
//! boxes = 60
//! pieces = 0
//! ```

use crate::config::ColumnNames;
use crate::error::{Result, StockError};
use crate::item::{InventoryItem, MaterialNo};
use crate::reader::{self, MAX_WHOLE_NUMBER};
use crate::warning::Warning;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

pub const TARGET_BOXES_COLUMN: &str = "Target Stock (Boxes)";
pub const TARGET_PIECES_COLUMN: &str = "Target Stock (Pieces)";

/// User-supplied target for one material
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetEntry {
    pub material_no: MaterialNo,
    pub boxes: i64,
    pub pieces: i64,
}

impl TargetEntry {
    /// Build an entry; targets must lie within `0..=MAX_WHOLE_NUMBER`
    pub fn new(material_no: MaterialNo, boxes: i64, pieces: i64) -> Result<Self> {
        let in_range = |n: i64| (0..=MAX_WHOLE_NUMBER).contains(&n);
        if !in_range(boxes) || !in_range(pieces) {
            return Err(StockError::InvalidTarget(format!(
                "targets for Material {} must be between 0 and {} (boxes {}, pieces {})",
                material_no, MAX_WHOLE_NUMBER, boxes, pieces
            )));
        }
        Ok(Self {
            material_no,
            boxes,
            pieces,
        })
    }
}

/// Targets keyed by material
#[derive(Debug, Clone, Default)]
pub struct TargetSet {
    entries: HashMap<MaterialNo, TargetEntry>,
}

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the target for a material
    pub fn set(&mut self, entry: TargetEntry) {
        debug!(
            "Target for Material {}: {} boxes, {} pieces",
            entry.material_no, entry.boxes, entry.pieces
        );
        self.entries.insert(entry.material_no.clone(), entry);
    }

    pub fn get(&self, material_no: &MaterialNo) -> Option<&TargetEntry> {
        self.entries.get(material_no)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, in no particular order
    pub fn entries(&self) -> impl Iterator<Item = &TargetEntry> {
        self.entries.values()
    }

    /// Merge another set into this one; entries from `other` win
    pub fn extend(&mut self, other: TargetSet) {
        self.entries.extend(other.entries);
    }

    /// Items, in inventory order, that have no target yet
    pub fn missing_for<'a>(&self, items: &'a [InventoryItem]) -> Vec<&'a InventoryItem> {
        items
            .iter()
            .filter(|item| !self.entries.contains_key(&item.material_no))
            .collect()
    }

    /// Load targets from a TOML file or any tabular file
    ///
    /// Unusable rows are skipped with a warning. A file whose header lacks
    /// the target columns is an error.
    pub fn from_file<P: AsRef<Path>>(path: P, columns: &ColumnNames) -> Result<(Self, Vec<Warning>)> {
        let path = path.as_ref();
        let is_toml = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            Self::from_toml(&fs::read_to_string(path)?)
        } else {
            Self::from_table(&reader::read_table(path, None)?, columns)
        }
    }

    /// Parse the TOML targets format
    pub fn from_toml(content: &str) -> Result<(Self, Vec<Warning>)> {
        #[derive(Deserialize)]
        struct TargetsFile {
            #[serde(default)]
            targets: BTreeMap<String, TomlTarget>,
        }

        #[derive(Deserialize)]
        struct TomlTarget {
            #[serde(default)]
            boxes: i64,
            #[serde(default)]
            pieces: i64,
        }

        let file: TargetsFile = toml::from_str(content)?;
        let mut set = TargetSet::new();
        let mut warnings = Vec::new();

        for (key, target) in file.targets {
            let Some(material_no) = MaterialNo::parse(&key) else {
                warnings.push(Warning::new(
                    None,
                    None,
                    format!("invalid Material No '{}' in targets file; entry skipped", key),
                ));
                continue;
            };
            match TargetEntry::new(material_no.clone(), target.boxes, target.pieces) {
                Ok(entry) => set.set(entry),
                Err(_) => warnings.push(Warning::for_material(
                    &material_no,
                    "target out of range in targets file; entry skipped",
                )),
            }
        }

        for warning in &warnings {
            warn!("{}", warning);
        }
        Ok((set, warnings))
    }

    /// Read targets from a table with Material No and the two target columns
    pub fn from_table(table: &reader::Table, columns: &ColumnNames) -> Result<(Self, Vec<Warning>)> {
        let idx = table.require_columns(&[
            columns.material_no.as_str(),
            TARGET_BOXES_COLUMN,
            TARGET_PIECES_COLUMN,
        ])?;

        let mut set = TargetSet::new();
        let mut warnings = Vec::new();

        for row in &table.rows {
            let material_cell = row.get(idx[0]);
            let material_no = match material_cell {
                reader::CellValue::Number(n) => MaterialNo::from_number(*n),
                other => MaterialNo::parse(&other.display_text()),
            };
            let Some(material_no) = material_no else {
                warnings.push(Warning::for_row(
                    row.number,
                    format!(
                        "invalid {} '{}' in targets file; row skipped",
                        columns.material_no,
                        material_cell.display_text()
                    ),
                ));
                continue;
            };

            // Blank target cells mean zero, as in the entry form
            let quantity = |col: usize| match row.get(col) {
                cell if cell.is_empty() => Some(0),
                cell => cell.as_whole_number().filter(|n| *n >= 0),
            };

            match (quantity(idx[1]), quantity(idx[2])) {
                (Some(boxes), Some(pieces)) => set.set(TargetEntry {
                    material_no,
                    boxes,
                    pieces,
                }),
                _ => warnings.push(Warning::new(
                    Some(row.number),
                    Some(material_no),
                    "target is not a non-negative whole number; row skipped",
                )),
            }
        }

        for warning in &warnings {
            warn!("{}", warning);
        }
        Ok((set, warnings))
    }
}
