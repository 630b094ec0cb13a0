//! Model assumptions: defaults file, per-case driver register, stress cases

mod cache;
pub mod loader;
pub mod register;
pub mod stress;

pub use cache::TableCache;
pub use loader::{load_model_assumptions, ModelAssumption};
pub use register::{AssumptionCase, AssumptionRow, AssumptionsRegistry, GroupRows, UiControl};
pub use stress::{StressAdjustment, StressCase};

use log::warn;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::Result;

/// Baseline drivers for the projection, read from model_assumptions.csv
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDefaults {
    /// Annual revenue growth rate
    pub revenue_growth: f64,
    pub gross_margin: f64,
    /// Operating expenses as a fraction of revenue
    pub opex_ratio: f64,
    /// Capex as a fraction of revenue
    pub capex_ratio: f64,
    /// Owner distributions per month
    pub owner_draw: f64,
    /// Target months of cash cushion
    pub cash_safety_months: f64,
    /// Family basket value override from the register, if any
    pub family_basket_value: Option<f64>,
    /// Loan principal override from the register, if any
    pub loan_amount: Option<f64>,
    /// Loan annual rate override from the register, if any
    pub loan_rate: Option<f64>,
}

impl ModelDefaults {
    /// Built-in defaults used when the defaults file omits a key
    pub fn builtin() -> Self {
        Self {
            revenue_growth: 0.15,
            gross_margin: 0.33,
            opex_ratio: 0.35,
            capex_ratio: 0.04,
            owner_draw: 10_000.0,
            cash_safety_months: 6.0,
            family_basket_value: None,
            loan_amount: None,
            loan_rate: None,
        }
    }

    /// Load defaults from `model_assumptions.csv` in a data directory
    pub fn from_csv_path(dir: &Path) -> Result<Self> {
        let table = load_model_assumptions(&dir.join(loader::MODEL_ASSUMPTIONS_FILE))?;
        Ok(Self::from_table(&table))
    }

    /// Build defaults from a loaded table, falling back per key
    pub fn from_table(table: &HashMap<String, ModelAssumption>) -> Self {
        let builtin = Self::builtin();
        let pick = |key: &str, fallback: f64| match table.get(key) {
            Some(assumption) => assumption.base_value,
            None => {
                warn!("model assumption {} missing, using {}", key, fallback);
                fallback
            }
        };

        Self {
            revenue_growth: pick("revenue_growth_rate_yoy", builtin.revenue_growth),
            gross_margin: pick("gross_margin_target", builtin.gross_margin),
            opex_ratio: pick("opex_as_percent_revenue", builtin.opex_ratio),
            capex_ratio: pick("capex_as_percent_revenue", builtin.capex_ratio),
            owner_draw: pick("owner_draw_monthly", builtin.owner_draw),
            cash_safety_months: pick("cash_safety_months", builtin.cash_safety_months),
            ..builtin
        }
    }

    /// Overlay register drivers for one case. Keys absent from `drivers`
    /// leave the current default in place.
    pub fn with_drivers(mut self, drivers: &BTreeMap<String, f64>) -> Self {
        if let Some(&margin) = drivers.get("gross_margin_target") {
            self.gross_margin = margin;
        }
        if let Some(&months) = drivers.get("cash_runway_target_months") {
            self.cash_safety_months = months;
        }
        if let Some(&basket) = drivers.get("avg_basket_size_y1") {
            self.family_basket_value = Some(basket);
        }
        if let Some(&loan) = drivers.get("construction_loan_commitment") {
            self.loan_amount = Some(loan);
        }
        if let Some(&rate) = drivers.get("construction_rate_annual") {
            self.loan_rate = Some(rate);
        }
        self
    }
}

impl Default for ModelDefaults {
    fn default() -> Self {
        Self::builtin()
    }
}
