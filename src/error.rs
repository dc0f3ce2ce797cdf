use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("DataFrame error: {0}")]
    DataFrame(#[from] polars::error::PolarsError),
    #[error("Workbook error: {0}")]
    Workbook(String),
    #[error("Sheet error: {0}")]
    Sheet(String),
    #[error("Column {index} is outside the sheet width {width}")]
    ColumnOutOfRange { index: usize, width: usize },
    #[error("Configuration error: {0}")]
    Config(String),
}
