//! Excess/shortage calculation
//!
//! For every item with a target:
//!
//! ```text
//! delta_boxes  = target_boxes  - stock_boxes
//! delta_pieces = target_pieces - stock_pieces
//! delta_total  = (target_boxes * pieces_per_box + target_pieces)
//!              - (stock_boxes  * pieces_per_box + stock_pieces)
//! ```
//!
//! The status is the sign of `delta_total`: positive means more stock is
//! needed (shortage), negative means there is more than needed (excess).

use crate::config::{ColumnNames, StockConfig};
use crate::error::{Result, StockError};
use crate::item::{CurrentStock, InventoryItem, MaterialNo, QuantityField};
use crate::reader::table::within_whole_range;
use crate::targets::{TargetEntry, TargetSet};
use crate::warning::Warning;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Sign classification of a delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Target exceeds current stock
    Shortage,
    /// Current stock exceeds target
    Excess,
    Balanced,
}

impl Status {
    pub fn classify(delta: i64) -> Self {
        match delta {
            d if d > 0 => Status::Shortage,
            d if d < 0 => Status::Excess,
            _ => Status::Balanced,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Shortage => "Shortage",
            Status::Excess => "Excess",
            Status::Balanced => "Balanced",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shortage" => Ok(Status::Shortage),
            "excess" => Ok(Status::Excess),
            "balanced" => Ok(Status::Balanced),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// Calculated result for one item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub material_no: MaterialNo,
    pub description: String,
    pub stock_boxes: i64,
    pub stock_pieces: i64,
    pub pieces_per_box: i64,
    pub target_boxes: i64,
    pub target_pieces: i64,
    pub total_current_pieces: i64,
    pub total_target_pieces: i64,
    pub delta_boxes: i64,
    pub delta_pieces: i64,
    /// Target minus current, in equivalent pieces
    pub delta_total: i64,
    pub status: Status,
    /// e.g. `+3 boxes needed`
    pub box_breakdown: String,
    /// e.g. `-12 pieces extra`
    pub piece_breakdown: String,
    /// `delta_total / total_target_pieces * 100`, two decimals; None when
    /// the target is zero
    pub percentage_difference: Option<f64>,
}

impl ResultRow {
    /// Derive a result from an item's stock and its target
    ///
    /// Returns None when a total or delta falls outside
    /// `±MAX_WHOLE_NUMBER`, which keeps every exported number exact.
    pub fn compute(item: &InventoryItem, stock: CurrentStock, target: &TargetEntry) -> Option<Self> {
        let bounded = |n: Option<i64>| n.filter(|n| within_whole_range(*n));

        let total_current = bounded(stock.total_pieces())?;
        let total_target = bounded(
            target
                .boxes
                .checked_mul(stock.pieces_per_box)
                .and_then(|n| n.checked_add(target.pieces)),
        )?;
        let delta_total = bounded(total_target.checked_sub(total_current))?;
        let delta_boxes = bounded(target.boxes.checked_sub(stock.boxes))?;
        let delta_pieces = bounded(target.pieces.checked_sub(stock.pieces))?;
        let status = Status::classify(delta_total);
        let (box_breakdown, piece_breakdown) = breakdown(delta_total, stock.pieces_per_box, status);

        let percentage_difference = if total_target != 0 {
            Some(round2(delta_total as f64 / total_target as f64 * 100.0))
        } else {
            None
        };

        Some(Self {
            material_no: item.material_no.clone(),
            description: item.description.clone(),
            stock_boxes: stock.boxes,
            stock_pieces: stock.pieces,
            pieces_per_box: stock.pieces_per_box,
            target_boxes: target.boxes,
            target_pieces: target.pieces,
            total_current_pieces: total_current,
            total_target_pieces: total_target,
            delta_boxes,
            delta_pieces,
            delta_total,
            status,
            box_breakdown,
            piece_breakdown,
            percentage_difference,
        })
    }
}

/// Split `|delta|` into whole boxes and remaining pieces
fn breakdown(delta: i64, pieces_per_box: i64, status: Status) -> (String, String) {
    let magnitude = delta.abs();
    let boxes = magnitude / pieces_per_box;
    let pieces = magnitude % pieces_per_box;

    match status {
        Status::Balanced => ("0 boxes".to_string(), "0 pieces".to_string()),
        Status::Shortage => (
            format!("+{} boxes needed", boxes),
            format!("+{} pieces needed", pieces),
        ),
        Status::Excess => (
            format!("-{} boxes extra", boxes),
            format!("-{} pieces extra", pieces),
        ),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rows that could be calculated plus warnings for the ones that could not
#[derive(Debug, Clone, Default, Serialize)]
pub struct Calculation {
    pub rows: Vec<ResultRow>,
    pub warnings: Vec<Warning>,
}

impl Calculation {
    /// True when no item could be calculated
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub struct Calculator {
    columns: ColumnNames,
    require_all_targets: bool,
}

impl Calculator {
    pub fn new() -> Self {
        Self::with_config(&StockConfig::default())
    }

    pub fn with_config(config: &StockConfig) -> Self {
        Self {
            columns: config.columns.clone(),
            require_all_targets: config.require_all_targets,
        }
    }

    /// Calculate results for every item, in inventory order
    ///
    /// Items without a target or with unusable stock quantities are skipped
    /// with a warning. With `require_all_targets` set, a missing target fails
    /// the whole calculation instead.
    pub fn calculate(&self, items: &[InventoryItem], targets: &TargetSet) -> Result<Calculation> {
        if self.require_all_targets {
            let missing = targets.missing_for(items);
            if !missing.is_empty() {
                return Err(StockError::MissingTargets(
                    missing.iter().map(|i| i.material_no.to_string()).collect(),
                ));
            }
        }

        let mut calculation = Calculation::default();

        for item in items {
            let Some(target) = targets.get(&item.material_no) else {
                let warning =
                    Warning::for_material(&item.material_no, "no target set; calculation skipped");
                warn!("{}", warning);
                calculation.warnings.push(warning);
                continue;
            };

            match item.current_stock() {
                Ok(stock) => match ResultRow::compute(item, stock, target) {
                    Some(row) => {
                        debug!(
                            "Material {}: delta {} pieces ({})",
                            row.material_no, row.delta_total, row.status
                        );
                        calculation.rows.push(row);
                    }
                    None => {
                        let warning = Warning::new(
                            Some(item.row),
                            Some(item.material_no.clone()),
                            "quantities are too large to calculate exactly; calculation skipped",
                        );
                        warn!("{}", warning);
                        calculation.warnings.push(warning);
                    }
                },
                Err(field) => {
                    let warning = Warning::new(
                        Some(item.row),
                        Some(item.material_no.clone()),
                        format!(
                            "'{}' is not a valid whole number; calculation skipped",
                            self.column_name(field)
                        ),
                    );
                    warn!("{}", warning);
                    calculation.warnings.push(warning);
                }
            }
        }

        info!(
            "Calculated {} of {} items ({} skipped)",
            calculation.rows.len(),
            items.len(),
            calculation.warnings.len()
        );
        Ok(calculation)
    }

    fn column_name(&self, field: QuantityField) -> &str {
        match field {
            QuantityField::StockBoxes => &self.columns.stock_boxes,
            QuantityField::StockPieces => &self.columns.stock_pieces,
            QuantityField::PiecesPerBox => &self.columns.pieces_per_box,
        }
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, boxes: Option<i64>, pieces: Option<i64>, per_box: Option<i64>) -> InventoryItem {
        InventoryItem {
            material_no: MaterialNo::parse(id).unwrap(),
            description: format!("ITEM {}", id),
            stock_boxes: boxes,
            stock_pieces: pieces,
            pieces_per_box: per_box,
            row: 2,
        }
    }

    fn target(id: &str, boxes: i64, pieces: i64) -> TargetEntry {
        TargetEntry::new(MaterialNo::parse(id).unwrap(), boxes, pieces).unwrap()
    }

    fn targets(entries: Vec<TargetEntry>) -> TargetSet {
        let mut set = TargetSet::new();
        for entry in entries {
            set.set(entry);
        }
        set
    }

    #[test]
    fn test_classify() {
        assert_eq!(Status::classify(50), Status::Shortage);
        assert_eq!(Status::classify(-100), Status::Excess);
        assert_eq!(Status::classify(0), Status::Balanced);
        assert_eq!("excess".parse::<Status>().unwrap(), Status::Excess);
        assert!("maybe".parse::<Status>().is_err());
    }

    #[test]
    fn test_shortage_scenario() {
        let items = vec![item("1", Some(0), Some(100), Some(24))];
        let calc = Calculator::new()
            .calculate(&items, &targets(vec![target("1", 0, 150)]))
            .unwrap();

        let row = &calc.rows[0];
        assert_eq!(row.delta_pieces, 50);
        assert_eq!(row.delta_total, 50);
        assert_eq!(row.status, Status::Shortage);
        assert_eq!(row.box_breakdown, "+2 boxes needed");
        assert_eq!(row.piece_breakdown, "+2 pieces needed");
        assert_eq!(row.percentage_difference, Some(33.33));
    }

    #[test]
    fn test_excess_scenario() {
        let items = vec![item("1", Some(0), Some(200), Some(24))];
        let calc = Calculator::new()
            .calculate(&items, &targets(vec![target("1", 0, 100)]))
            .unwrap();

        let row = &calc.rows[0];
        assert_eq!(row.delta_total, -100);
        assert_eq!(row.status, Status::Excess);
        assert_eq!(row.box_breakdown, "-4 boxes extra");
        assert_eq!(row.piece_breakdown, "-4 pieces extra");
        assert_eq!(row.percentage_difference, Some(-100.0));
    }

    #[test]
    fn test_per_unit_and_total_deltas() {
        // 50 boxes + 120 pieces at 24/box = 1320 pieces; target 60 boxes = 1440
        let items = vec![item("1", Some(50), Some(120), Some(24))];
        let calc = Calculator::new()
            .calculate(&items, &targets(vec![target("1", 60, 0)]))
            .unwrap();

        let row = &calc.rows[0];
        assert_eq!(row.delta_boxes, 10);
        assert_eq!(row.delta_pieces, -120);
        assert_eq!(row.total_current_pieces, 1320);
        assert_eq!(row.total_target_pieces, 1440);
        assert_eq!(row.delta_total, 120);
        assert_eq!(row.status, Status::Shortage);
        assert_eq!(row.box_breakdown, "+5 boxes needed");
        assert_eq!(row.piece_breakdown, "+0 pieces needed");
    }

    #[test]
    fn test_balanced_and_zero_target() {
        let items = vec![
            item("1", Some(2), Some(4), Some(10)),
            item("2", Some(0), Some(0), Some(10)),
        ];
        let calc = Calculator::new()
            .calculate(
                &items,
                &targets(vec![target("1", 1, 14), target("2", 0, 0)]),
            )
            .unwrap();

        assert_eq!(calc.rows[0].status, Status::Balanced);
        assert_eq!(calc.rows[0].box_breakdown, "0 boxes");
        assert_eq!(calc.rows[1].status, Status::Balanced);
        assert_eq!(calc.rows[1].percentage_difference, None);
    }

    #[test]
    fn test_skips_missing_targets_and_bad_quantities() {
        let items = vec![
            item("1", Some(1), Some(0), Some(10)),
            item("2", None, Some(0), Some(10)),
            item("3", Some(1), Some(0), Some(10)),
        ];
        let calc = Calculator::new()
            .calculate(&items, &targets(vec![target("1", 1, 0), target("2", 1, 0)]))
            .unwrap();

        assert_eq!(calc.rows.len(), 1);
        assert_eq!(calc.warnings.len(), 2);
        assert_eq!(
            calc.warnings[0].to_string(),
            "Row 2 (Material 2): 'Stock in CBB' is not a valid whole number; calculation skipped"
        );
        assert_eq!(
            calc.warnings[1].to_string(),
            "Material 3: no target set; calculation skipped"
        );
    }

    #[test]
    fn test_require_all_targets() {
        let config = StockConfig {
            require_all_targets: true,
            ..Default::default()
        };
        let items = vec![
            item("1", Some(1), Some(0), Some(10)),
            item("2", Some(1), Some(0), Some(10)),
        ];

        match Calculator::with_config(&config).calculate(&items, &targets(vec![target("1", 1, 0)])) {
            Err(StockError::MissingTargets(missing)) => assert_eq!(missing, vec!["2"]),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_oversized_totals_are_skipped() {
        let max = crate::reader::MAX_WHOLE_NUMBER;
        let items = vec![
            item("1", Some(max), Some(0), Some(24)),
            item("2", Some(0), Some(max), Some(1)),
            item("3", Some(0), Some(10), Some(2)),
        ];
        let set = targets(vec![target("1", 0, 0), target("2", 0, 0), target("3", max, 0)]);

        let calc = Calculator::new().calculate(&items, &set).unwrap();
        let ids: Vec<_> = calc.rows.iter().map(|r| r.material_no.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
        assert_eq!(calc.rows[0].delta_total, -max);
        assert_eq!(calc.warnings.len(), 2);
        assert!(calc.warnings[0].message.contains("too large"));
    }

    #[test]
    fn test_no_items_is_an_empty_result() {
        let calc = Calculator::new().calculate(&[], &TargetSet::new()).unwrap();
        assert!(calc.is_empty());
        assert!(calc.warnings.is_empty());
    }
}
