//! Scenario comparator: primary plus optional comparison projection
//!
//! Both scenarios share one engine configuration (horizon, safety target,
//! start month). Results are kept side by side; rows can be merged into a
//! single labelled sequence for charting or export.

use crate::assumptions::StressCase;
use crate::error::Result;
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult, ProjectionRow, ScenarioInputs};

/// One projection row tagged with its scenario label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioRow<'a> {
    pub scenario: &'a str,
    pub row: &'a ProjectionRow,
}

/// Primary result and optional comparison result
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub primary: ProjectionResult,
    pub comparison: Option<ProjectionResult>,
}

impl Comparison {
    /// Results in display order
    pub fn results(&self) -> impl Iterator<Item = &ProjectionResult> {
        std::iter::once(&self.primary).chain(self.comparison.iter())
    }

    /// Primary rows followed by comparison rows, each tagged with its label
    pub fn combined_rows(&self) -> Vec<ScenarioRow<'_>> {
        self.results()
            .flat_map(|result| {
                result.rows.iter().map(move |row| ScenarioRow {
                    scenario: result.scenario_label.as_str(),
                    row,
                })
            })
            .collect()
    }
}

/// Runs the engine for up to two scenarios with a shared configuration
#[derive(Debug, Clone, Default)]
pub struct ScenarioComparator {
    engine: ProjectionEngine,
}

impl ScenarioComparator {
    pub fn new(config: ProjectionConfig) -> Self {
        Self {
            engine: ProjectionEngine::new(config),
        }
    }

    pub fn config(&self) -> &ProjectionConfig {
        self.engine.config()
    }

    /// Project the primary scenario and, if given, the comparison scenario
    pub fn run(&self, primary: &ScenarioInputs, comparison: Option<&ScenarioInputs>) -> Result<Comparison> {
        let primary = self.engine.run(primary)?;
        let comparison = comparison.map(|inputs| self.engine.run(inputs)).transpose()?;
        Ok(Comparison { primary, comparison })
    }

    /// Project the same inputs under every stress case
    pub fn run_stress_cases(&self, inputs: &ScenarioInputs) -> Result<Vec<ProjectionResult>> {
        StressCase::ALL
            .iter()
            .map(|&case| self.engine.run(&inputs.clone().with_stress_case(case)))
            .collect()
    }
}
