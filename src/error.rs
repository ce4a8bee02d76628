use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlipError {
    #[error("Cannot read {}: {reason}", path.display())]
    DataSource { path: PathBuf, reason: String },

    #[error("Start date {start} is after end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Cannot load logo {}: {reason}", path.display())]
    Logo { path: PathBuf, reason: String },

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl SlipError {
    pub fn data_source(path: &Path, reason: impl ToString) -> Self {
        SlipError::DataSource {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SlipError>;
