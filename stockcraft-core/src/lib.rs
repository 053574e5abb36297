//! stockcraft-core: inventory cleaning and excess/shortage analysis
//!
//! Reads an inventory spreadsheet, cleans it into [`InventoryItem`]s, compares
//! current stock against user-entered targets and exports the results with a
//! summary.

pub mod calculator;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod item;
pub mod reader;
pub mod session;
pub mod summary;
pub mod targets;
pub mod warning;
pub mod writer;

pub use calculator::{Calculation, Calculator, ResultRow, Status};
pub use cleaner::{CleanReport, Cleaner};
pub use config::{ColumnNames, StockConfig};
pub use error::{Result, StockError};
pub use item::{InventoryItem, MaterialNo};
pub use session::{Session, StockReport};
pub use summary::Summary;
pub use targets::{TargetEntry, TargetSet};
pub use warning::Warning;
pub use writer::{ExportFormat, ReportRecord, export_report, read_report};
