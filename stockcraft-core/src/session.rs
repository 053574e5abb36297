//! Per-user session context
//!
//! A session is created from the uploaded inventory file, holds the cleaned
//! items and the targets entered so far, and is dropped when the interaction
//! ends. Results are recomputed from scratch on every [`Session::calculate`].

use crate::calculator::{Calculator, ResultRow};
use crate::cleaner::{CleanReport, Cleaner};
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::item::{InventoryItem, MaterialNo};
use crate::reader::{self, Table};
use crate::summary::Summary;
use crate::targets::{TargetEntry, TargetSet};
use crate::warning::Warning;
use crate::writer;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything produced by one calculation
#[derive(Debug, Clone, Serialize)]
pub struct StockReport {
    pub rows: Vec<ResultRow>,
    /// Items that could not be calculated
    pub warnings: Vec<Warning>,
    pub summary: Summary,
}

impl StockReport {
    /// True in the "no valid rows to process" state
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub struct Session {
    config: StockConfig,
    source: PathBuf,
    clean: CleanReport,
    targets: TargetSet,
}

impl Session {
    /// Read and clean an inventory file
    pub fn open<P: AsRef<Path>>(path: P, config: StockConfig) -> Result<Self> {
        let table = reader::read_table(path.as_ref(), config.sheet.as_deref())?;
        Self::from_table(table, config)
    }

    /// Start a session from an already loaded table
    pub fn from_table(table: Table, config: StockConfig) -> Result<Self> {
        let clean = Cleaner::with_config(&config).clean(&table)?;
        info!(
            "Session opened for {} with {} items",
            table.source.display(),
            clean.items.len()
        );
        Ok(Self {
            config,
            source: table.source,
            clean,
            targets: TargetSet::new(),
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn config(&self) -> &StockConfig {
        &self.config
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.clean.items
    }

    pub fn item(&self, material_no: &MaterialNo) -> Option<&InventoryItem> {
        self.clean.items.iter().find(|i| &i.material_no == material_no)
    }

    /// Cleaning warnings, one per excluded row
    pub fn warnings(&self) -> &[Warning] {
        &self.clean.warnings
    }

    pub fn clean_report(&self) -> &CleanReport {
        &self.clean
    }

    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    /// Set the target for an item in this session
    pub fn set_target(&mut self, material_no: &MaterialNo, boxes: i64, pieces: i64) -> Result<()> {
        if self.item(material_no).is_none() {
            return Err(StockError::InvalidTarget(format!(
                "Material {} is not part of the uploaded inventory",
                material_no
            )));
        }
        self.targets
            .set(TargetEntry::new(material_no.clone(), boxes, pieces)?);
        Ok(())
    }

    /// Merge targets from a file, returning warnings for skipped entries
    ///
    /// Entries for materials that are not in the inventory are ignored with
    /// a warning.
    pub fn load_targets<P: AsRef<Path>>(&mut self, path: P) -> Result<Vec<Warning>> {
        let (loaded, mut warnings) = TargetSet::from_file(path.as_ref(), &self.config.columns)?;
        let mut accepted = TargetSet::new();
        for item in &self.clean.items {
            if let Some(entry) = loaded.get(&item.material_no) {
                accepted.set(entry.clone());
            }
        }

        // Sorted so the warnings come out in a stable order
        let mut unknown: Vec<&MaterialNo> = loaded
            .entries()
            .map(|entry| &entry.material_no)
            .filter(|id| self.item(id).is_none())
            .collect();
        unknown.sort();
        for id in unknown {
            warnings.push(Warning::for_material(
                id,
                "not in the uploaded inventory; target ignored",
            ));
        }

        info!(
            "Loaded {} targets from {}",
            accepted.len(),
            path.as_ref().display()
        );
        self.targets.extend(accepted);
        Ok(warnings)
    }

    /// Live preview for one item with its current target (zero if unset)
    ///
    /// Returns None for unknown materials or items with unusable stock.
    /// Quantities too large to calculate also give None.
    pub fn preview(&self, material_no: &MaterialNo) -> Option<ResultRow> {
        let item = self.item(material_no)?;
        let stock = item.current_stock().ok()?;
        let target = self.targets.get(material_no).cloned().unwrap_or(TargetEntry {
            material_no: material_no.clone(),
            boxes: 0,
            pieces: 0,
        });
        ResultRow::compute(item, stock, &target)
    }

    /// Calculate results for all items with targets
    pub fn calculate(&self) -> Result<StockReport> {
        let calculation = Calculator::with_config(&self.config).calculate(&self.clean.items, &self.targets)?;
        let summary = Summary::from_rows(&calculation.rows);
        Ok(StockReport {
            rows: calculation.rows,
            warnings: calculation.warnings,
            summary,
        })
    }

    /// Export a report to XLSX or CSV
    pub fn export<P: AsRef<Path>>(&self, report: &StockReport, path: P) -> Result<()> {
        writer::export_report(&report.rows, &report.summary, path)
    }

    /// Write a targets template for the session's items
    pub fn write_template<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        writer::write_template(&self.clean.items, &self.targets, &self.config.columns, path)
    }
}
