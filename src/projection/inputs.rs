//! Scenario inputs: the immutable parameter set for one projection

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::assumptions::{ModelDefaults, StressCase};
use crate::error::ModelError;

/// Strategic approach being modeled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioType {
    AcquireExisting,
    StartFromScratch,
}

impl ScenarioType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioType::AcquireExisting => "Acquire Existing Business",
            ScenarioType::StartFromScratch => "Start from Scratch",
        }
    }

    /// Months until the store opens: a short hand-over for an acquisition,
    /// a full build for a new store
    pub fn default_construction_months(&self) -> u32 {
        match self {
            ScenarioType::AcquireExisting => 1,
            ScenarioType::StartFromScratch => 12,
        }
    }
}

impl fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "acquire" | "acquireexisting" | "acquireexistingbusiness" | "buyexisting" => {
                Ok(ScenarioType::AcquireExisting)
            }
            "scratch" | "startfromscratch" | "buildnew" => Ok(ScenarioType::StartFromScratch),
            _ => Err(ModelError::UnknownScenarioType(s.to_string())),
        }
    }
}

/// Default model start month (January 2026)
pub fn default_model_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Parameter set for a single projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioInputs {
    // Identity
    pub label: String,
    pub scenario_type: ScenarioType,
    pub stress_case: StressCase,

    // Timing
    /// Month construction (or hand-over) begins; the loan is drawn here
    pub construction_start: NaiveDate,
    /// Months from construction start to launch
    pub construction_months: u32,

    // Financial drivers
    pub initial_cash: f64,
    /// Annual revenue growth rate, applied to the basket value
    pub revenue_growth: f64,
    pub gross_margin: f64,
    pub opex_ratio: f64,
    pub capex_ratio: f64,
    /// Monthly owner draw
    pub owner_draw: f64,

    // Financing
    /// One-time equity added in the first month
    pub equity_injection: f64,
    pub loan_amount: f64,
    pub loan_rate: f64,
    pub loan_term_years: u32,

    // Demand drivers
    /// Monthly revenue per active family
    pub family_basket_value: f64,
    /// New families added each month after launch
    pub families_per_month: f64,
}

impl ScenarioInputs {
    /// Inputs for a scenario type and stress case seeded from model defaults
    pub fn from_defaults(
        scenario_type: ScenarioType,
        stress_case: StressCase,
        defaults: &ModelDefaults,
        construction_start: NaiveDate,
    ) -> Self {
        Self {
            label: default_label(scenario_type, stress_case),
            scenario_type,
            stress_case,
            construction_start,
            construction_months: scenario_type.default_construction_months(),
            initial_cash: 200_000.0,
            revenue_growth: defaults.revenue_growth,
            gross_margin: defaults.gross_margin,
            opex_ratio: defaults.opex_ratio,
            capex_ratio: defaults.capex_ratio,
            owner_draw: defaults.owner_draw,
            equity_injection: 0.0,
            loan_amount: defaults.loan_amount.unwrap_or(0.0),
            loan_rate: defaults.loan_rate.unwrap_or(0.07),
            loan_term_years: 10,
            family_basket_value: defaults.family_basket_value.unwrap_or(450.0),
            families_per_month: 120.0,
        }
    }

    /// Replace the label, keeping the default when `label` is blank
    pub fn with_label(mut self, label: &str) -> Self {
        if !label.trim().is_empty() {
            self.label = label.trim().to_string();
        }
        self
    }

    /// Same inputs under a different stress case, relabelled if the label
    /// was the generated default
    pub fn with_stress_case(mut self, stress_case: StressCase) -> Self {
        if self.label == default_label(self.scenario_type, self.stress_case) {
            self.label = default_label(self.scenario_type, stress_case);
        }
        self.stress_case = stress_case;
        self
    }
}

impl Default for ScenarioInputs {
    fn default() -> Self {
        Self::from_defaults(
            ScenarioType::AcquireExisting,
            StressCase::Base,
            &ModelDefaults::builtin(),
            default_model_start(),
        )
    }
}

/// "Acquire Existing Business (Base)" style label
pub fn default_label(scenario_type: ScenarioType, stress_case: StressCase) -> String {
    format!("{} ({})", scenario_type, stress_case)
}
