//! CSV-based assumption loader
//!
//! Loads the model-assumptions defaults table from the data directory.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{ModelError, Result};

/// Default path to the data directory
pub const DEFAULT_DATA_PATH: &str = "data";

/// Assumptions register file name within the data directory
pub const REGISTER_FILE: &str = "assumptions_register.csv";

/// Model defaults file name within the data directory
pub const MODEL_ASSUMPTIONS_FILE: &str = "model_assumptions.csv";

/// Raw CSV row matching model_assumptions.csv columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    assumption_key: String,
    #[serde(default)]
    description: String,
    base_value: String,
}

/// One baseline assumption
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAssumption {
    pub description: String,
    pub base_value: f64,
}

/// Load model assumptions keyed by `assumption_key`
pub fn load_model_assumptions(path: &Path) -> Result<HashMap<String, ModelAssumption>> {
    let reader = csv::Reader::from_path(path)?;
    read_model_assumptions(reader)
}

/// Load model assumptions from any reader (e.g., string buffer)
pub fn load_model_assumptions_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<HashMap<String, ModelAssumption>> {
    read_model_assumptions(csv::Reader::from_reader(reader))
}

fn read_model_assumptions<R: std::io::Read>(
    mut reader: csv::Reader<R>,
) -> Result<HashMap<String, ModelAssumption>> {
    let mut assumptions = HashMap::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        let base_value: f64 = row.base_value.trim().parse().map_err(|_| {
            ModelError::Parse(format!(
                "base_value for {} is not a number: {:?}",
                row.assumption_key, row.base_value
            ))
        })?;
        assumptions.insert(
            row.assumption_key,
            ModelAssumption {
                description: row.description,
                base_value,
            },
        );
    }

    Ok(assumptions)
}
