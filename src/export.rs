//! CSV export of projection rows, one row per month per scenario

use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{ModelError, Result};
use crate::projection::calendar::month_label;
use crate::scenario::{Comparison, ScenarioRow};

/// Export record; column names match the projection table headings
#[derive(Debug, Serialize)]
struct ExportRecord<'a> {
    #[serde(rename = "Scenario")]
    scenario: &'a str,
    month: String,
    #[serde(rename = "Families Active")]
    families_active: f64,
    #[serde(rename = "Revenue")]
    revenue: f64,
    #[serde(rename = "COGS")]
    cogs: f64,
    #[serde(rename = "Operating Expenses")]
    operating_expenses: f64,
    #[serde(rename = "Capex")]
    capex: f64,
    #[serde(rename = "Owner Draw")]
    owner_draw: f64,
    #[serde(rename = "Financing")]
    financing: f64,
    #[serde(rename = "Debt Service")]
    debt_service: f64,
    #[serde(rename = "EBITDA")]
    ebitda: f64,
    #[serde(rename = "EBITDA Delta")]
    ebitda_delta: f64,
    #[serde(rename = "Net Cash Flow")]
    net_cash_flow: f64,
    #[serde(rename = "Cumulative Cash")]
    cumulative_cash: f64,
}

impl<'a> From<&ScenarioRow<'a>> for ExportRecord<'a> {
    fn from(tagged: &ScenarioRow<'a>) -> Self {
        let row = tagged.row;
        Self {
            scenario: tagged.scenario,
            month: month_label(row.month),
            families_active: row.families_active,
            revenue: row.revenue,
            cogs: row.cogs,
            operating_expenses: row.operating_expenses,
            capex: row.capex,
            owner_draw: row.owner_draw,
            financing: row.financing,
            debt_service: row.debt_service,
            ebitda: row.ebitda,
            ebitda_delta: row.ebitda_delta,
            net_cash_flow: row.net_cash_flow,
            cumulative_cash: row.cumulative_cash,
        }
    }
}

/// Write tagged rows as CSV to any writer
pub fn write_rows<W: Write>(writer: W, rows: &[ScenarioRow<'_>]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for tagged in rows {
        csv_writer.serialize(ExportRecord::from(tagged))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write every scenario in a comparison to a CSV file
pub fn export_comparison(path: &Path, comparison: &Comparison) -> Result<()> {
    let file = File::create(path).map_err(|source| ModelError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    write_rows(file, &comparison.combined_rows())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{ProjectionConfig, ScenarioInputs};
    use crate::scenario::ScenarioComparator;

    #[test]
    fn test_export_layout() {
        let comparator = ScenarioComparator::new(ProjectionConfig {
            horizon_months: 3,
            ..ProjectionConfig::default()
        });
        let comparison = comparator
            .run(&ScenarioInputs::default(), Some(&ScenarioInputs::default().with_label("Alt")))
            .unwrap();

        let mut buffer = Vec::new();
        write_rows(&mut buffer, &comparison.combined_rows()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Scenario,month,Families Active,Revenue,COGS,Operating Expenses,Capex,Owner Draw,Financing,Debt Service,EBITDA,EBITDA Delta,Net Cash Flow,Cumulative Cash"
        );
        assert_eq!(lines.len(), 7);
        assert!(lines[1].starts_with("Acquire Existing Business (Base),2026-01,"));
        assert!(lines[4].starts_with("Alt,2026-01,"));
    }
}
