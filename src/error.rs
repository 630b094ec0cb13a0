//! Error types shared across the model

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown stress case: {0}")]
    UnknownStressCase(String),

    #[error("Unknown scenario type: {0}")]
    UnknownScenarioType(String),

    #[error("Unknown assumptions case: {0} (expected Conservative, Likely or Aggressive)")]
    UnknownCase(String),

    #[error("No assumption row for driver key: {0}")]
    UnknownDriver(String),

    #[error("Driver key appears more than once in the register: {0}")]
    DuplicateDriver(String),

    #[error("Failed to write {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Projection horizon must be at least one month")]
    InvalidHorizon,

    #[error("Month calendar out of range: {0}")]
    DateOutOfRange(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
