use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompatError {
    #[error("Brewfile does not exist: {}", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Formula not found: {0}")]
    FormulaNotFound(String),

    #[error("Cask not found: {0}")]
    CaskNotFound(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CompatError {
    /// True when the metadata service answered but does not know the name
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FormulaNotFound(_) | Self::CaskNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, CompatError>;
