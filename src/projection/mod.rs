//! Projection engine for monthly cash-flow projections

pub mod calendar;
mod cashflows;
mod debt;
mod engine;
mod inputs;
mod state;

pub use cashflows::{ProjectionMetrics, ProjectionResult, ProjectionRow, BEYOND_HORIZON};
pub use debt::{amortizing_payment, interest_only_payment, LoanTerms};
pub use engine::{run, ProjectionConfig, ProjectionEngine, ResolvedDrivers, MAX_GROWTH, RATIO_CAP, RATIO_FLOOR};
pub use inputs::{default_label, default_model_start, ScenarioInputs, ScenarioType};
pub use state::ProjectionState;
