//! Summary statistics over calculated rows

use crate::calculator::{ResultRow, Status};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_products: usize,
    pub excess_products: usize,
    pub shortage_products: usize,
    pub balanced_products: usize,
    pub excess_percentage: f64,
    pub shortage_percentage: f64,
    /// Sum of surplus pieces over excess items (positive)
    pub total_excess_pieces: i64,
    /// Sum of missing pieces over shortage items (positive)
    pub total_shortage_pieces: i64,
}

impl Summary {
    pub fn from_rows(rows: &[ResultRow]) -> Self {
        let count = |status: Status| rows.iter().filter(|r| r.status == status).count();
        let total = rows.len();
        let excess = count(Status::Excess);
        let shortage = count(Status::Shortage);

        let percentage = |n: usize| {
            if total > 0 {
                (n as f64 / total as f64 * 10000.0).round() / 100.0
            } else {
                0.0
            }
        };

        Self {
            total_products: total,
            excess_products: excess,
            shortage_products: shortage,
            balanced_products: count(Status::Balanced),
            excess_percentage: percentage(excess),
            shortage_percentage: percentage(shortage),
            total_excess_pieces: rows
                .iter()
                .filter(|r| r.status == Status::Excess)
                .fold(0i64, |acc, r| acc.saturating_sub(r.delta_total)),
            total_shortage_pieces: rows
                .iter()
                .filter(|r| r.status == Status::Shortage)
                .fold(0i64, |acc, r| acc.saturating_add(r.delta_total)),
        }
    }

    /// Metric/count pairs as shown on the summary sheet
    pub fn metrics(&self) -> [(&'static str, usize); 4] {
        [
            ("Total Products", self.total_products),
            ("Products with Excess", self.excess_products),
            ("Products with Shortage", self.shortage_products),
            ("Balanced Products", self.balanced_products),
        ]
    }
}

/// Rows with the given status, in input order
pub fn filter_status(rows: &[ResultRow], status: Status) -> Vec<&ResultRow> {
    rows.iter().filter(|r| r.status == status).collect()
}

/// Excess items with the largest surplus first
pub fn top_excess(rows: &[ResultRow], n: usize) -> Vec<&ResultRow> {
    let mut excess = filter_status(rows, Status::Excess);
    excess.sort_by_key(|r| r.delta_total);
    excess.truncate(n);
    excess
}

/// Shortage items with the largest deficit first
pub fn top_shortage(rows: &[ResultRow], n: usize) -> Vec<&ResultRow> {
    let mut shortage = filter_status(rows, Status::Shortage);
    shortage.sort_by_key(|r| std::cmp::Reverse(r.delta_total));
    shortage.truncate(n);
    shortage
}
