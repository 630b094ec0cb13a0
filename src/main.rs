//! Cash-flow model CLI
//!
//! Command-line interface for running projections and editing the
//! assumptions register

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::warn;
use std::path::{Path, PathBuf};

use cashflow_model::assumptions::loader::{DEFAULT_DATA_PATH, MODEL_ASSUMPTIONS_FILE, REGISTER_FILE};
use cashflow_model::assumptions::register::UI_GROUPS;
use cashflow_model::projection::calendar::{month_label, parse_month};
use cashflow_model::projection::default_label;
use cashflow_model::{
    export, report, AssumptionCase, AssumptionsRegistry, ModelDefaults, ModelError, ProjectionConfig,
    ScenarioComparator, ScenarioInputs, ScenarioType, StressCase,
};

/// Small-business cash-flow model and scenario planner
#[derive(Parser, Debug)]
#[command(name = "cashflow_model")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory holding model_assumptions.csv and assumptions_register.csv
    #[arg(long, global = true, default_value = DEFAULT_DATA_PATH, value_name = "DIR")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Project the primary scenario and an optional comparison scenario
    Project(ProjectArgs),

    /// Print model drivers from the register for one case
    Drivers {
        #[arg(long, default_value = "Likely")]
        case: String,
    },

    /// Set one driver value for a case and save the register
    SetDriver {
        key: String,
        case: String,
        value: f64,
    },

    /// Reset every editable driver in a UI group to its base value
    ResetGroup {
        group: String,
        #[arg(long, default_value = "Likely")]
        case: String,
    },
}

#[derive(Args, Debug)]
struct ProjectArgs {
    /// Projection horizon in months
    #[arg(long, default_value_t = 36, value_parser = clap::value_parser!(u32).range(1..=60))]
    horizon: u32,

    /// First projected month (YYYY-MM)
    #[arg(long, default_value = "2026-01")]
    start: String,

    /// Target months of cash cushion (defaults to cash_safety_months)
    #[arg(long)]
    safety_months: Option<f64>,

    /// Overlay register drivers for this case (Conservative, Likely, Aggressive)
    #[arg(long)]
    case: Option<String>,

    #[command(flatten)]
    scenario: ScenarioArgs,

    /// Add a comparison scenario of this type
    #[arg(long)]
    compare_scenario: Option<String>,

    /// Stress case for the comparison scenario
    #[arg(long, default_value = "Base")]
    compare_stress: String,

    /// Label for the comparison scenario
    #[arg(long)]
    compare_label: Option<String>,

    /// Write all scenarios to this CSV file
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Print results as JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Months shown in the console table
    #[arg(long, default_value_t = 24)]
    show_months: usize,
}

#[derive(Args, Debug)]
struct ScenarioArgs {
    /// Business approach: acquire or scratch
    #[arg(long, default_value = "acquire")]
    scenario: String,

    /// Stress case: Base, Upside or Downside
    #[arg(long, default_value = "Base")]
    stress: String,

    #[arg(long)]
    label: Option<String>,

    /// Construction start month (YYYY-MM); defaults to the model start
    #[arg(long)]
    construction_start: Option<String>,

    #[arg(long)]
    construction_months: Option<u32>,

    #[arg(long)]
    initial_cash: Option<f64>,

    /// Annual revenue growth rate
    #[arg(long)]
    growth: Option<f64>,

    #[arg(long)]
    margin: Option<f64>,

    /// Operating expenses as a fraction of revenue
    #[arg(long)]
    opex: Option<f64>,

    /// Capex as a fraction of revenue
    #[arg(long)]
    capex: Option<f64>,

    #[arg(long)]
    owner_draw: Option<f64>,

    /// One-time equity injection in the first month
    #[arg(long)]
    equity: Option<f64>,

    #[arg(long)]
    loan: Option<f64>,

    #[arg(long)]
    loan_rate: Option<f64>,

    #[arg(long)]
    loan_term: Option<u32>,

    /// Monthly revenue per family
    #[arg(long)]
    basket: Option<f64>,

    /// Families added per month after launch
    #[arg(long)]
    families: Option<f64>,
}

impl ScenarioArgs {
    /// Build inputs from defaults plus flags, clamped to the control ranges
    fn to_inputs(&self, defaults: &ModelDefaults, model_start: chrono::NaiveDate) -> Result<ScenarioInputs> {
        let scenario_type: ScenarioType = self.scenario.parse()?;
        let stress_case: StressCase = self.stress.parse()?;
        let construction_start = match &self.construction_start {
            Some(text) => parse_month(text)?,
            None => model_start,
        };

        let mut inputs = ScenarioInputs::from_defaults(scenario_type, stress_case, defaults, construction_start);
        if let Some(months) = self.construction_months {
            inputs.construction_months = months.max(1);
        }
        if let Some(cash) = self.initial_cash {
            inputs.initial_cash = cash.max(0.0);
        }
        if let Some(growth) = self.growth {
            inputs.revenue_growth = growth.clamp(0.0, 0.8);
        }
        if let Some(margin) = self.margin {
            inputs.gross_margin = margin.clamp(0.1, 0.9);
        }
        if let Some(opex) = self.opex {
            inputs.opex_ratio = opex.clamp(0.1, 0.9);
        }
        if let Some(capex) = self.capex {
            inputs.capex_ratio = capex.clamp(0.0, 0.2);
        }
        if let Some(draw) = self.owner_draw {
            inputs.owner_draw = draw.max(0.0);
        }
        if let Some(equity) = self.equity {
            inputs.equity_injection = equity.max(0.0);
        }
        if let Some(loan) = self.loan {
            inputs.loan_amount = loan.max(0.0);
        }
        if let Some(rate) = self.loan_rate {
            inputs.loan_rate = rate.max(0.0);
        }
        if let Some(term) = self.loan_term {
            inputs.loan_term_years = term.max(1);
        }
        if let Some(basket) = self.basket {
            inputs.family_basket_value = basket.max(0.0);
        }
        if let Some(families) = self.families {
            inputs.families_per_month = families.max(0.0);
        }

        Ok(match &self.label {
            Some(label) => inputs.with_label(label),
            None => inputs,
        })
    }
}

fn load_defaults(data_dir: &Path) -> Result<ModelDefaults> {
    if data_dir.join(MODEL_ASSUMPTIONS_FILE).exists() {
        ModelDefaults::from_csv_path(data_dir)
            .with_context(|| format!("loading {}", data_dir.join(MODEL_ASSUMPTIONS_FILE).display()))
    } else {
        warn!("{} not found in {}, using built-in defaults", MODEL_ASSUMPTIONS_FILE, data_dir.display());
        Ok(ModelDefaults::builtin())
    }
}

fn project(data_dir: &Path, args: &ProjectArgs) -> Result<()> {
    let mut defaults = load_defaults(data_dir)?;
    if let Some(case) = &args.case {
        let case: AssumptionCase = case.parse()?;
        let mut registry = AssumptionsRegistry::open(data_dir.join(REGISTER_FILE));
        let drivers = registry.get(case).context("loading assumptions register")?;
        defaults = defaults.with_drivers(&drivers);
    }

    let model_start = parse_month(&args.start)?;
    let config = ProjectionConfig {
        horizon_months: args.horizon,
        cash_safety_months: args.safety_months.unwrap_or(defaults.cash_safety_months),
        model_start,
    };

    let primary = args.scenario.to_inputs(&defaults, model_start)?;
    let comparison = match &args.compare_scenario {
        // Same drivers as the primary, with its own approach and stress case
        Some(scenario_type) => {
            let scenario_type: ScenarioType = scenario_type.parse()?;
            let stress_case: StressCase = args.compare_stress.parse()?;
            let inputs = ScenarioInputs {
                label: default_label(scenario_type, stress_case),
                scenario_type,
                stress_case,
                construction_months: scenario_type.default_construction_months(),
                ..primary.clone()
            };
            Some(inputs.with_label(args.compare_label.as_deref().unwrap_or("")))
        }
        None => None,
    };

    let comparator = ScenarioComparator::new(config);
    let result = comparator.run(&primary, comparison.as_ref())?;

    if args.json {
        let results: Vec<_> = result.results().collect();
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for projection in result.results() {
            println!("{}", report::render_summary(projection));
        }
        println!(
            "Projection for {} ({} months from {}):",
            result.primary.scenario_label,
            result.primary.rows.len(),
            month_label(model_start)
        );
        println!("{}", report::render_table(&result.primary.rows, args.show_months));
    }

    if let Some(path) = &args.export {
        export::export_comparison(path, &result)?;
        println!("Full results written to: {}", path.display());
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let register_path = cli.data_dir.join(REGISTER_FILE);

    match &cli.command {
        Command::Project(args) => project(&cli.data_dir, args)?,

        Command::Drivers { case } => {
            let case: AssumptionCase = case.parse()?;
            let mut registry = AssumptionsRegistry::open(&register_path);
            let drivers = registry.get(case)?;
            println!("{} case ({} column):", case, case.column());
            for (key, value) in &drivers {
                println!("  {:<32} {:>14.4}", key, value);
            }
        }

        Command::SetDriver { key, case, value } => {
            let case: AssumptionCase = case.parse()?;
            let mut registry = AssumptionsRegistry::open(&register_path);
            match registry.update_and_persist(key, case, *value) {
                Ok(()) => println!("Saved {} = {} for {} case", key, value, case),
                Err(err @ ModelError::Persist { .. }) => {
                    eprintln!("Save failed; the register on disk was not updated");
                    return Err(err.into());
                }
                Err(err) => return Err(err.into()),
            }
        }

        Command::ResetGroup { group, case } => {
            if !UI_GROUPS.contains(&group.as_str()) {
                warn!("{} is not one of the standard UI groups", group);
            }
            let case: AssumptionCase = case.parse()?;
            let mut registry = AssumptionsRegistry::open(&register_path);
            let reset = registry.reset_group_to_base(group, case)?;
            println!("{}: reset {} {} value(s) back to base", group, reset, case);
        }
    }

    Ok(())
}
