//! File-level error types
//!
//! Row-level problems never surface here: they become [`crate::Warning`]s and
//! processing continues. Only conditions that prevent reading or writing a
//! whole file are errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StockError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Zip operation failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("The file '{}' is empty or has no data rows", .0.display())]
    EmptyFile(PathBuf),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),

    #[error("Please set target quantities for Materials: {}", .0.join(", "))]
    MissingTargets(Vec<String>),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Invalid result report: {0}")]
    InvalidReport(String),
}

pub type Result<T> = std::result::Result<T, StockError>;
