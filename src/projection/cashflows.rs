//! Projection output structures and summary metrics

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calendar::month_label;
use crate::report::format_currency;

/// Label used when cash never goes negative within the horizon
pub const BEYOND_HORIZON: &str = "Beyond projection horizon";

/// A single row of projection output for one month.
///
/// Outflows are negative; `financing` is zero except in the equity and loan
/// draw months.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRow {
    pub month: NaiveDate,
    pub families_active: f64,
    pub revenue: f64,
    pub cogs: f64,
    pub operating_expenses: f64,
    pub capex: f64,
    pub owner_draw: f64,
    pub financing: f64,
    pub debt_service: f64,
    pub ebitda: f64,
    pub net_cash_flow: f64,
    pub cumulative_cash: f64,
    pub ebitda_delta: f64,
}

impl ProjectionRow {
    /// Create a new row with zero amounts
    pub fn new(month: NaiveDate) -> Self {
        Self {
            month,
            families_active: 0.0,
            revenue: 0.0,
            cogs: 0.0,
            operating_expenses: 0.0,
            capex: 0.0,
            owner_draw: 0.0,
            financing: 0.0,
            debt_service: 0.0,
            ebitda: 0.0,
            net_cash_flow: 0.0,
            cumulative_cash: 0.0,
            ebitda_delta: 0.0,
        }
    }
}

/// Scalar metrics derived from a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionMetrics {
    pub final_cash: f64,
    pub min_cash: f64,
    /// Last month's revenue annualized
    pub annual_recurring_revenue: f64,
    /// Mean monthly net cash flow
    pub avg_monthly_burn: f64,
    /// Mean monthly debt service (non-positive)
    pub avg_debt_service: f64,
    /// 1-based month cash first goes negative; infinite if it never does
    pub runway_months: f64,
    /// Calendar month of the first shortfall
    pub runway_month: Option<NaiveDate>,
    pub cash_safety_months: f64,
    /// Runway minus the safety target; infinite with infinite runway
    pub safety_buffer_months: f64,
    /// 1-based month cumulative cash first gets back to the starting cash
    pub payback_months: Option<u32>,
    /// Cash needed to keep the balance at or above zero
    pub cash_shortfall: f64,
    pub warning: Option<String>,
}

impl ProjectionMetrics {
    /// Derive metrics from projected rows
    pub fn from_rows(rows: &[ProjectionRow], initial_cash: f64, cash_safety_months: f64) -> Self {
        let count = rows.len().max(1) as f64;

        let min_cash = rows
            .iter()
            .map(|r| r.cumulative_cash)
            .fold(f64::INFINITY, f64::min);
        let min_cash = if min_cash.is_finite() { min_cash } else { initial_cash };
        let final_cash = rows.last().map(|r| r.cumulative_cash).unwrap_or(initial_cash);
        let annual_recurring_revenue = rows.last().map(|r| r.revenue * 12.0).unwrap_or(0.0);
        let avg_monthly_burn = rows.iter().map(|r| r.net_cash_flow).sum::<f64>() / count;
        let avg_debt_service = rows.iter().map(|r| r.debt_service).sum::<f64>() / count;

        let shortfall_at = rows.iter().position(|r| r.cumulative_cash < 0.0);
        let (runway_months, runway_month, safety_buffer_months) = match shortfall_at {
            Some(index) => {
                let runway = (index + 1) as f64;
                (runway, Some(rows[index].month), runway - cash_safety_months)
            }
            None => (f64::INFINITY, None, f64::INFINITY),
        };

        let payback_months = rows
            .iter()
            .position(|r| r.cumulative_cash >= initial_cash)
            .map(|index| (index + 1) as u32);

        let cash_shortfall = if min_cash < 0.0 { min_cash.abs() } else { 0.0 };
        let warning = (cash_shortfall > 0.0).then(|| {
            format!(
                "Runway falls short of the {:.1}-month target. Raise or save approximately {} to stay above zero cash.",
                cash_safety_months,
                format_currency(cash_shortfall, 0)
            )
        });

        Self {
            final_cash,
            min_cash,
            annual_recurring_revenue,
            avg_monthly_burn,
            avg_debt_service,
            runway_months,
            runway_month,
            cash_safety_months,
            safety_buffer_months,
            payback_months,
            cash_shortfall,
            warning,
        }
    }

    pub fn has_infinite_runway(&self) -> bool {
        self.runway_months.is_infinite()
    }

    /// `YYYY-MM` of the first shortfall, or the beyond-horizon sentinel
    pub fn runway_label(&self) -> String {
        match self.runway_month {
            Some(month) => month_label(month),
            None => BEYOND_HORIZON.to_string(),
        }
    }
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub scenario_label: String,

    /// Monthly rows, one per month in the horizon
    pub rows: Vec<ProjectionRow>,

    pub metrics: ProjectionMetrics,
}

impl ProjectionResult {
    /// Month-by-month cumulative cash
    pub fn cumulative_cash(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.cumulative_cash).collect()
    }

    pub fn total_revenue(&self) -> f64 {
        self.rows.iter().map(|r| r.revenue).sum()
    }
}
