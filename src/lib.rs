//! Cash-flow model - monthly projection and scenario planning for a small business launch
//!
//! This library provides:
//! - Monthly cash-flow projections with construction timing, a linear
//!   customer ramp and loan debt service
//! - Stress cases and runway / payback analytics
//! - A file-backed assumptions register with per-case driver values
//! - Side-by-side scenario comparison and CSV export

pub mod assumptions;
pub mod error;
pub mod export;
pub mod projection;
pub mod report;
pub mod scenario;

// Re-export commonly used types
pub use assumptions::{AssumptionCase, AssumptionsRegistry, ModelDefaults, StressCase};
pub use error::{ModelError, Result};
pub use projection::{ProjectionConfig, ProjectionEngine, ProjectionResult, ProjectionRow, ScenarioInputs, ScenarioType};
pub use scenario::{Comparison, ScenarioComparator};
