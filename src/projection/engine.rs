//! Core projection engine for monthly cash-flow projections

use chrono::NaiveDate;
use log::debug;

use super::calendar::{month_sequence, month_start, months_between};
use super::cashflows::{ProjectionMetrics, ProjectionResult, ProjectionRow};
use super::debt::LoanTerms;
use super::inputs::{default_model_start, ScenarioInputs};
use super::state::ProjectionState;
use crate::error::{ModelError, Result};

/// Upper bound on the annual growth rate after stress adjustment
pub const MAX_GROWTH: f64 = 0.9;

/// Margin and opex ratios are held inside this band after stress adjustment
pub const RATIO_FLOOR: f64 = 0.05;
pub const RATIO_CAP: f64 = 0.95;

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    /// Number of months to project
    pub horizon_months: u32,

    /// Target months of cash cushion, for the safety buffer
    pub cash_safety_months: f64,

    /// First projected month (any day within it)
    pub model_start: NaiveDate,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            horizon_months: 36,
            cash_safety_months: 6.0,
            model_start: default_model_start(),
        }
    }
}

/// Scenario drivers after stress adjustment and clamping
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDrivers {
    /// Annual growth after stress, capped
    pub growth: f64,
    /// Monthly rate compounding to the annual growth
    pub monthly_growth: f64,
    pub gross_margin: f64,
    pub opex_ratio: f64,
    pub capex_ratio: f64,
    pub initial_cash: f64,
    pub owner_draw: f64,
    pub equity_injection: f64,
    pub family_basket_value: f64,
    pub families_per_month: f64,
    pub construction_months: u32,
}

impl ResolvedDrivers {
    /// Apply the stress multipliers, then clamp every driver into its
    /// operating range so no caller can push the engine out of bounds
    pub fn resolve(inputs: &ScenarioInputs) -> Self {
        let stress = inputs.stress_case.adjustment();

        // Growth is floored too so the monthly conversion stays defined
        let growth = (inputs.revenue_growth * stress.growth_multiplier).clamp(-MAX_GROWTH, MAX_GROWTH);
        let gross_margin = (inputs.gross_margin * stress.margin_multiplier).clamp(RATIO_FLOOR, RATIO_CAP);
        let opex_ratio = (inputs.opex_ratio * stress.opex_multiplier).clamp(RATIO_FLOOR, RATIO_CAP);

        Self {
            growth,
            monthly_growth: (1.0 + growth).powf(1.0 / 12.0) - 1.0,
            gross_margin,
            opex_ratio,
            capex_ratio: inputs.capex_ratio.clamp(0.0, RATIO_CAP),
            initial_cash: inputs.initial_cash.max(0.0),
            owner_draw: inputs.owner_draw.max(0.0),
            equity_injection: inputs.equity_injection.max(0.0),
            family_basket_value: inputs.family_basket_value.max(0.0),
            families_per_month: inputs.families_per_month.max(0.0),
            construction_months: inputs.construction_months.max(1),
        }
    }
}

/// Month indices derived from the construction timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timeline {
    /// Index where the demand ramp starts (may be negative)
    launch_offset: i64,
    /// Index of the loan draw, clamped into the horizon
    loan_draw_index: usize,
}

/// Main projection engine
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with the given config
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run the projection for one scenario
    pub fn run(&self, inputs: &ScenarioInputs) -> Result<ProjectionResult> {
        let horizon = self.config.horizon_months;
        if horizon == 0 {
            return Err(ModelError::InvalidHorizon);
        }

        let drivers = ResolvedDrivers::resolve(inputs);
        let loan = LoanTerms::new(inputs.loan_amount, inputs.loan_rate, inputs.loan_term_years);
        let months = month_sequence(self.config.model_start, horizon)?;
        let timeline = self.timeline(inputs, &drivers);

        debug!(
            "projecting '{}' over {} months: launch offset {}, loan draw at {}, growth {:.4}, margin {:.4}, opex {:.4}",
            inputs.label,
            horizon,
            timeline.launch_offset,
            timeline.loan_draw_index,
            drivers.growth,
            drivers.gross_margin,
            drivers.opex_ratio,
        );

        let mut state = ProjectionState::new(drivers.initial_cash, timeline.launch_offset);
        let mut rows = Vec::with_capacity(months.len());

        for month in months {
            // Advance state to next month
            state.advance_month();

            let row = self.calculate_month(&drivers, &loan, timeline, &mut state, month);
            rows.push(row);
        }

        let metrics = ProjectionMetrics::from_rows(&rows, drivers.initial_cash, self.config.cash_safety_months);

        Ok(ProjectionResult {
            scenario_label: inputs.label.clone(),
            rows,
            metrics,
        })
    }

    fn timeline(&self, inputs: &ScenarioInputs, drivers: &ResolvedDrivers) -> Timeline {
        let model_start = month_start(self.config.model_start);
        let construction_index = months_between(model_start, month_start(inputs.construction_start));
        let last_index = i64::from(self.config.horizon_months) - 1;

        Timeline {
            launch_offset: construction_index + i64::from(drivers.construction_months),
            loan_draw_index: construction_index.clamp(0, last_index) as usize,
        }
    }

    /// Calculate cashflows for a single month
    fn calculate_month(
        &self,
        drivers: &ResolvedDrivers,
        loan: &LoanTerms,
        timeline: Timeline,
        state: &mut ProjectionState,
        month: NaiveDate,
    ) -> ProjectionRow {
        let mut row = ProjectionRow::new(month);
        let since_launch = state.months_since_launch();

        // Demand: families ramp linearly, basket value compounds
        if let Some(elapsed) = since_launch {
            let elapsed = f64::from(elapsed);
            row.families_active = drivers.families_per_month * (elapsed + 1.0);
            let basket = drivers.family_basket_value * (1.0 + drivers.monthly_growth).powf(elapsed);
            row.revenue = row.families_active * basket;
        }

        // Costs scale with revenue
        row.cogs = -row.revenue * (1.0 - drivers.gross_margin);
        row.operating_expenses = -row.revenue * drivers.opex_ratio;
        row.capex = -row.revenue * drivers.capex_ratio;
        row.owner_draw = -drivers.owner_draw;

        // Equity lands in month 0, the loan at construction start
        let index = state.month_index();
        if index == 0 {
            row.financing += drivers.equity_injection;
        }
        if index == timeline.loan_draw_index {
            row.financing += loan.principal;
        }

        // Interest-only until launch, then level amortization
        row.debt_service = -loan.payment_due(since_launch);

        row.ebitda = row.revenue + row.cogs + row.operating_expenses;
        row.net_cash_flow = row.ebitda + row.capex + row.owner_draw + row.financing + row.debt_service;
        row.cumulative_cash = state.apply_cash_flow(row.net_cash_flow);
        row.ebitda_delta = state.record_ebitda(row.ebitda);

        row
    }
}

/// Run a single projection with explicit horizon, safety target and start month
pub fn run(
    inputs: &ScenarioInputs,
    horizon_months: u32,
    cash_safety_months: f64,
    model_start: NaiveDate,
) -> Result<ProjectionResult> {
    ProjectionEngine::new(ProjectionConfig {
        horizon_months,
        cash_safety_months,
        model_start,
    })
    .run(inputs)
}
