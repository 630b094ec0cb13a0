//! End-to-end checks of the projection engine, comparator and register

use approx::assert_relative_eq;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

use cashflow_model::assumptions::loader::{load_model_assumptions, MODEL_ASSUMPTIONS_FILE, REGISTER_FILE};
use cashflow_model::projection::{amortizing_payment, default_model_start};
use cashflow_model::{
    AssumptionCase, AssumptionsRegistry, ModelDefaults, ModelError, ProjectionConfig, ProjectionEngine,
    ScenarioComparator, ScenarioInputs, ScenarioType, StressCase,
};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// New store: build starts in the first model month and takes a year
fn new_build() -> ScenarioInputs {
    ScenarioInputs {
        scenario_type: ScenarioType::StartFromScratch,
        construction_start: default_model_start(),
        construction_months: 12,
        initial_cash: 200_000.0,
        owner_draw: 10_000.0,
        loan_amount: 0.0,
        equity_injection: 0.0,
        family_basket_value: 450.0,
        families_per_month: 120.0,
        ..ScenarioInputs::default()
    }
}

#[test]
fn new_build_has_no_revenue_until_launch() {
    let result = ProjectionEngine::default().run(&new_build()).unwrap();

    assert_eq!(result.rows.len(), 36);
    for row in &result.rows[..12] {
        assert_eq!(row.revenue, 0.0);
        assert_eq!(row.families_active, 0.0);
    }
    assert!(result.rows[12].revenue > 0.0);
    assert_relative_eq!(result.rows[12].families_active, 120.0);
    assert_relative_eq!(result.rows[0].net_cash_flow, -10_000.0);
    assert_relative_eq!(result.rows[0].cumulative_cash, 190_000.0);
}

#[test]
fn cumulative_cash_is_running_sum_of_net_flows() {
    let inputs = ScenarioInputs {
        loan_amount: 250_000.0,
        equity_injection: 40_000.0,
        ..new_build()
    };
    let result = ProjectionEngine::default().run(&inputs).unwrap();

    let mut balance = inputs.initial_cash;
    for row in &result.rows {
        balance += row.net_cash_flow;
        assert_relative_eq!(row.cumulative_cash, balance, max_relative = 1e-9);
        assert_relative_eq!(
            row.net_cash_flow,
            row.ebitda + row.capex + row.owner_draw + row.financing + row.debt_service,
            epsilon = 1e-6
        );
    }
    assert_relative_eq!(result.metrics.final_cash, balance, max_relative = 1e-9);
}

#[test]
fn no_loan_means_no_debt_service() {
    let result = ProjectionEngine::default().run(&new_build()).unwrap();

    assert!(result.rows.iter().all(|row| row.debt_service == 0.0));
    assert_eq!(result.metrics.avg_debt_service, 0.0);
}

#[test]
fn zero_rate_loan_repays_straight_line() {
    let inputs = ScenarioInputs {
        loan_amount: 120_000.0,
        loan_rate: 0.0,
        loan_term_years: 10,
        ..new_build()
    };
    let result = ProjectionEngine::default().run(&inputs).unwrap();

    assert_relative_eq!(amortizing_payment(120_000.0, 0.0, 120), 1_000.0);
    assert_eq!(result.rows[11].debt_service, 0.0);
    assert_relative_eq!(result.rows[12].debt_service, -1_000.0);
    assert_relative_eq!(result.rows[35].debt_service, -1_000.0);
}

#[test]
fn near_zero_rate_loan_stays_finite() {
    let inputs = ScenarioInputs {
        loan_amount: 120_000.0,
        loan_rate: 1e-16,
        loan_term_years: 10,
        ..new_build()
    };
    let result = ProjectionEngine::default().run(&inputs).unwrap();

    assert!(result.rows.iter().all(|row| row.debt_service.is_finite()));
    assert!(result.rows.iter().all(|row| row.cumulative_cash.is_finite()));
    assert_relative_eq!(result.rows[12].debt_service, -1_000.0, max_relative = 1e-9);
    assert!(result.metrics.final_cash.is_finite());
}

#[test]
fn infinite_runway_has_no_shortfall() {
    let inputs = ScenarioInputs {
        initial_cash: 10_000_000.0,
        owner_draw: 0.0,
        ..ScenarioInputs::default()
    };
    let result = ProjectionEngine::default().run(&inputs).unwrap();

    assert!(result.metrics.has_infinite_runway());
    assert_eq!(result.metrics.cash_shortfall, 0.0);
    assert!(result.metrics.warning.is_none());
    assert_eq!(result.metrics.runway_label(), "Beyond projection horizon");
}

#[test]
fn cash_shortfall_carries_warning() {
    let inputs = ScenarioInputs {
        initial_cash: 20_000.0,
        ..new_build()
    };
    let result = ProjectionEngine::default().run(&inputs).unwrap();

    // 10k a month with no revenue runs out in the third month
    assert_relative_eq!(result.metrics.runway_months, 3.0);
    assert!(result.metrics.cash_shortfall > 0.0);
    assert_relative_eq!(result.metrics.cash_shortfall, -result.metrics.min_cash);
    assert!(result.metrics.warning.as_deref().unwrap().contains("6.0-month target"));
}

#[test]
fn upside_never_trails_downside() {
    let comparator = ScenarioComparator::new(ProjectionConfig {
        horizon_months: 48,
        ..ProjectionConfig::default()
    });
    for scenario_type in [ScenarioType::AcquireExisting, ScenarioType::StartFromScratch] {
        let inputs = ScenarioInputs {
            scenario_type,
            construction_months: scenario_type.default_construction_months(),
            ..ScenarioInputs::default()
        };
        let upside = comparator.run(&inputs.clone().with_stress_case(StressCase::Upside), None).unwrap();
        let downside = comparator.run(&inputs.with_stress_case(StressCase::Downside), None).unwrap();

        for (up, down) in upside.primary.rows.iter().zip(&downside.primary.rows) {
            assert!(up.revenue >= down.revenue);
            assert!(up.cumulative_cash >= down.cumulative_cash);
        }
    }
}

#[test]
fn comparison_shares_horizon() {
    let comparator = ScenarioComparator::new(ProjectionConfig {
        horizon_months: 18,
        ..ProjectionConfig::default()
    });
    let comparison = comparator
        .run(&ScenarioInputs::default(), Some(&new_build().with_label("Build new")))
        .unwrap();

    let alternative = comparison.comparison.as_ref().unwrap();
    assert_eq!(comparison.primary.rows.len(), 18);
    assert_eq!(alternative.rows.len(), 18);
    assert_eq!(alternative.scenario_label, "Build new");
    assert_eq!(comparison.combined_rows().len(), 36);
}

#[test]
fn unknown_names_are_rejected() {
    assert!(matches!(
        "Sideways".parse::<StressCase>(),
        Err(ModelError::UnknownStressCase(_))
    ));
    assert!(matches!(
        "Franchise".parse::<ScenarioType>(),
        Err(ModelError::UnknownScenarioType(_))
    ));
    assert!(matches!(
        "Optimistic".parse::<AssumptionCase>(),
        Err(ModelError::UnknownCase(_))
    ));
}

#[test]
fn bundled_model_assumptions_load() {
    let table = load_model_assumptions(&data_dir().join(MODEL_ASSUMPTIONS_FILE)).unwrap();
    assert_eq!(table.len(), 8);

    let defaults = ModelDefaults::from_csv_path(&data_dir()).unwrap();
    assert_relative_eq!(defaults.revenue_growth, 0.15);
    assert_relative_eq!(defaults.gross_margin, 0.33);
    assert_relative_eq!(defaults.owner_draw, 10_000.0);
    assert_relative_eq!(defaults.cash_safety_months, 6.0);
}

#[test]
fn register_edits_survive_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(REGISTER_FILE);
    fs::copy(data_dir().join(REGISTER_FILE), &path).unwrap();

    let mut registry = AssumptionsRegistry::open(&path);
    let likely = registry.get(AssumptionCase::Likely).unwrap();
    assert_eq!(likely.len(), 25);
    assert!(!likely.contains_key("site_address"));

    registry
        .update_and_persist("gross_margin_target", AssumptionCase::Aggressive, 0.4)
        .unwrap();
    let reset = registry
        .reset_group_to_base("Financing", AssumptionCase::Conservative)
        .unwrap();
    assert_eq!(reset, 5);

    let mut reopened = AssumptionsRegistry::open(&path);
    let aggressive = reopened.get(AssumptionCase::Aggressive).unwrap();
    assert_relative_eq!(aggressive["gross_margin_target"], 0.4);
    let conservative = reopened.get(AssumptionCase::Conservative).unwrap();
    assert_relative_eq!(conservative["construction_rate_annual"], 0.075);

    let defaults = ModelDefaults::builtin().with_drivers(&aggressive);
    assert_relative_eq!(defaults.gross_margin, 0.4);
    assert_eq!(defaults.loan_amount, Some(1_800_000.0));
}
