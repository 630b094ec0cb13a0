//! Assumptions register: per-case driver values with UI metadata
//!
//! The register is a CSV with one row per driver key. Each row has three
//! case columns (`low_case`, `base_value`, `high_case`) and the metadata the
//! editor needs to present it. Writes replace the whole file.

use log::{info, warn};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;

use super::cache::TableCache;
use crate::error::{ModelError, Result};

/// Driver keys exposed to the financial model
pub const MODEL_DRIVER_KEYS: [&str; 25] = [
    "market_households",
    "household_penetration_y1",
    "household_penetration_y2",
    "household_penetration_y3",
    "visits_per_household_week",
    "avg_basket_size_y1",
    "gross_margin_target",
    "shrink_pct_sales",
    "vendor_rebates_pct_sales",
    "store_payroll_pct_sales",
    "payroll_burden_pct_wages",
    "marketing_pct_sales",
    "repairs_maintenance_pct_sales",
    "inventory_days_on_hand",
    "ap_days_payable",
    "construction_loan_commitment",
    "construction_rate_annual",
    "permanent_loan_rate",
    "bridge_loan_rate",
    "dscr_min_target",
    "inflation_general",
    "inflation_wages",
    "inflation_food_cost",
    "discount_rate_npv",
    "cash_runway_target_months",
];

/// UI groups in display order
pub const UI_GROUPS: [&str; 6] = [
    "Revenue & Demand",
    "Margins & COGS",
    "Opex & Staffing",
    "Financing",
    "Working Capital",
    "Macro & Risk",
];

/// Assumption case selecting one of the three value columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssumptionCase {
    /// `low_case` column
    Conservative,
    /// `base_value` column
    Likely,
    /// `high_case` column
    Aggressive,
}

impl AssumptionCase {
    pub fn column(&self) -> &'static str {
        match self {
            AssumptionCase::Conservative => "low_case",
            AssumptionCase::Likely => "base_value",
            AssumptionCase::Aggressive => "high_case",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssumptionCase::Conservative => "Conservative",
            AssumptionCase::Likely => "Likely",
            AssumptionCase::Aggressive => "Aggressive",
        }
    }
}

impl fmt::Display for AssumptionCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssumptionCase {
    type Err = ModelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" | "low" | "low_case" => Ok(AssumptionCase::Conservative),
            "likely" | "base" | "base_value" => Ok(AssumptionCase::Likely),
            "aggressive" | "high" | "high_case" => Ok(AssumptionCase::Aggressive),
            _ => Err(ModelError::UnknownCase(s.to_string())),
        }
    }
}

/// One row of the assumptions register.
///
/// Field order is the column order written back to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssumptionRow {
    pub item_key: String,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub category: String,
    pub low_case: Option<f64>,
    pub base_value: Option<f64>,
    pub high_case: Option<f64>,
    #[serde(default)]
    pub ui_group: String,
    #[serde(default)]
    pub ui_order: Option<f64>,
    #[serde(default, deserialize_with = "read_flag", serialize_with = "write_flag")]
    pub ui_is_editable: bool,
    #[serde(default, deserialize_with = "read_flag", serialize_with = "write_flag")]
    pub ui_is_advanced: bool,
    #[serde(default)]
    pub ui_control: String,
    #[serde(default)]
    pub ui_min: Option<f64>,
    #[serde(default)]
    pub ui_max: Option<f64>,
    #[serde(default)]
    pub ui_step: Option<f64>,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub description: String,
}

impl AssumptionRow {
    /// Value in the column for `case`; NaN counts as absent
    pub fn value(&self, case: AssumptionCase) -> Option<f64> {
        let value = match case {
            AssumptionCase::Conservative => self.low_case,
            AssumptionCase::Likely => self.base_value,
            AssumptionCase::Aggressive => self.high_case,
        };
        value.filter(|v| !v.is_nan())
    }

    /// Case value, falling back to the base value when the case cell is blank
    pub fn value_or_base(&self, case: AssumptionCase) -> Option<f64> {
        self.value(case)
            .or_else(|| self.base_value.filter(|v| !v.is_nan()))
    }

    fn set_value(&mut self, case: AssumptionCase, value: Option<f64>) {
        match case {
            AssumptionCase::Conservative => self.low_case = value,
            AssumptionCase::Likely => self.base_value = value,
            AssumptionCase::Aggressive => self.high_case = value,
        }
    }

    /// Control kind for the editor; anything unknown renders as a number input
    pub fn control(&self) -> UiControl {
        match self.ui_control.trim() {
            "slider" if self.ui_min.is_some() && self.ui_max.is_some() => UiControl::Slider,
            _ => UiControl::NumberInput,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiControl {
    Slider,
    NumberInput,
}

/// Editable rows of one UI group, ordered by `ui_order`
#[derive(Debug, Clone, Default)]
pub struct GroupRows {
    pub main: Vec<AssumptionRow>,
    pub advanced: Vec<AssumptionRow>,
}

impl GroupRows {
    pub fn is_empty(&self) -> bool {
        self.main.is_empty() && self.advanced.is_empty()
    }
}

/// Register flags are written as 0/1 but older exports carry floats or words
fn read_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "0.0" | "false" => Ok(false),
        "1" | "1.0" | "true" => Ok(true),
        other => Err(serde::de::Error::custom(format!("invalid flag value: {}", other))),
    }
}

fn write_flag<S>(flag: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*flag))
}

/// Read and validate the whole register file
pub fn load_register(path: &Path) -> Result<Vec<AssumptionRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    let mut seen = HashSet::new();

    for result in reader.deserialize() {
        let row: AssumptionRow = result?;
        if !seen.insert(row.item_key.clone()) {
            return Err(ModelError::DuplicateDriver(row.item_key));
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Replace the register file with `rows`.
///
/// The table is written to a temp file in the same directory and renamed
/// over the target, so readers never observe a half-written register. The
/// temp file is removed if any step fails.
pub fn save_register(path: &Path, rows: &[AssumptionRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ModelError::Io(e.into_error()))?;

    let persist = |source: std::io::Error| ModelError::Persist {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir).map_err(persist)?;
    staged.write_all(&bytes).map_err(persist)?;
    staged.persist(path).map_err(|e| persist(e.error))?;

    info!("saved {} assumption rows to {}", rows.len(), path.display());
    Ok(())
}

/// File-backed assumptions register with a cached table
#[derive(Debug)]
pub struct AssumptionsRegistry {
    path: PathBuf,
    cache: TableCache<Vec<AssumptionRow>>,
}

impl AssumptionsRegistry {
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache: TableCache::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All rows in file order
    pub fn rows(&mut self) -> Result<&[AssumptionRow]> {
        let rows = self.cache.get_or_load(&self.path, load_register)?;
        Ok(rows.as_slice())
    }

    /// Model drivers for `case`.
    ///
    /// Only keys in [`MODEL_DRIVER_KEYS`] are returned, and a key whose case
    /// value is blank is omitted rather than reported as zero.
    pub fn get(&mut self, case: AssumptionCase) -> Result<BTreeMap<String, f64>> {
        let drivers = self
            .rows()?
            .iter()
            .filter(|row| MODEL_DRIVER_KEYS.contains(&row.item_key.as_str()))
            .filter_map(|row| row.value(case).map(|v| (row.item_key.clone(), v)))
            .collect();
        Ok(drivers)
    }

    /// Set one case value and write the whole table back
    pub fn update_and_persist(&mut self, key: &str, case: AssumptionCase, value: f64) -> Result<()> {
        let mut rows = self.rows()?.to_vec();
        let row = rows
            .iter_mut()
            .find(|row| row.item_key == key)
            .ok_or_else(|| ModelError::UnknownDriver(key.to_string()))?;
        row.set_value(case, Some(value));

        self.persist(&rows)
    }

    /// Copy `base_value` into the case column for every editable row in
    /// `group`, then persist. Returns the number of rows reset.
    pub fn reset_group_to_base(&mut self, group: &str, case: AssumptionCase) -> Result<usize> {
        let mut rows = self.rows()?.to_vec();
        let mut reset = 0;

        for row in rows
            .iter_mut()
            .filter(|row| row.ui_group == group && row.ui_is_editable)
        {
            if let Some(base) = row.value(AssumptionCase::Likely) {
                row.set_value(case, Some(base));
                reset += 1;
            }
        }

        self.persist(&rows)?;
        Ok(reset)
    }

    /// Editable rows of a UI group, split into main and advanced controls
    pub fn group_rows(&mut self, group: &str) -> Result<GroupRows> {
        let mut rows: Vec<AssumptionRow> = self
            .rows()?
            .iter()
            .filter(|row| row.ui_group == group && row.ui_is_editable)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            let a = a.ui_order.unwrap_or(f64::MAX);
            let b = b.ui_order.unwrap_or(f64::MAX);
            a.total_cmp(&b)
        });

        let (advanced, main) = rows.into_iter().partition(|row| row.ui_is_advanced);
        Ok(GroupRows { main, advanced })
    }

    fn persist(&mut self, rows: &[AssumptionRow]) -> Result<()> {
        // Drop the cached table first: after a failed save the file state is unknown
        self.cache.invalidate(&self.path);
        save_register(&self.path, rows).map_err(|err| {
            warn!("assumptions save failed: {}", err);
            err
        })
    }
}
