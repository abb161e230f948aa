use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use shift_planner::config::{Config, ConfigOverrides};
use shift_planner::optimizer::{simulate_upgrades, Comparison, UpgradeBundle, WhatIfResult};
use shift_planner::output::csv::{bundles_to_csv, plan_to_csv};
use shift_planner::output::json::{render_json, render_plan_export};
use shift_planner::output::table::{
    render_bundles_table, render_comparison_table, render_plan_table, render_rules_table,
    render_whatif_table,
};
use shift_planner::rules::loader::{load_roster, load_rule_table, load_scenario};
use shift_planner::rules::SynergyRule;
use shift_planner::scheduler::{PlanRun, Planner};
use shift_planner::types::{Gating, WorkplaceKind};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "shift-planner",
    about = "Three-shift workplace planning with upgrade suggestions"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    rules: Option<String>,
    #[arg(long)]
    roster: Option<String>,
    #[arg(long)]
    scenario: Option<String>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    /// Fail on unknown workplace types instead of dropping their rules.
    #[arg(long)]
    strict: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Plan with the roster's current tiers, or ignoring tiers.
    Plan {
        #[arg(long)]
        potential: bool,
        /// Emit only the fields the scheduling client imports.
        #[arg(long)]
        export: bool,
    },
    /// Current and potential plans side by side with upgrade bundles.
    Compare,
    Upgrades {
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Re-plan after applying the given upgrade bundles (1-based ranks).
    Whatif {
        #[arg(long, num_args = 1.., required = true)]
        apply: Vec<usize>,
    },
    Rules {
        #[arg(long)]
        workplace: Option<String>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        rules_path: cli.rules.clone(),
        roster_path: cli.roster.clone(),
        scenario_path: cli.scenario.clone(),
        strict: cli.strict,
    });

    if let Commands::Config { init, show } = &cli.command {
        return handle_config_command(*init, *show, &config, &config_path);
    }

    let table = load_rule_table(&config.resolved_rules_path())?;
    let roster = load_roster(&config.resolved_roster_path())?;
    let scenario = load_scenario(&config.resolved_scenario_path())?;
    info!("loaded {} workers", roster.len());
    let planner = Planner::new(&table, roster, scenario, &config)?;

    match &cli.command {
        Commands::Plan { potential, export } => {
            let gating = if *potential {
                Gating::Ignored
            } else {
                Gating::Current
            };
            let run = planner.run(gating);
            if *export {
                println!("{}", render_plan_export(&run)?);
            } else {
                print_plan(&run, cli.output)?;
            }
        }
        Commands::Compare => {
            let comparison = planner.compare();
            print_comparison(&comparison, cli.output)?;
        }
        Commands::Upgrades { top } => {
            let mut bundles = planner.compare().bundles;
            bundles.truncate(*top);
            print_bundles(&bundles, cli.output)?;
        }
        Commands::Whatif { apply } => {
            let bundles = planner.compare().bundles;
            let selected = select_bundles(&bundles, apply)?;
            let result = simulate_upgrades(&planner, &selected);
            print_whatif(&result, cli.output)?;
        }
        Commands::Rules { workplace } => {
            let kind = workplace
                .as_deref()
                .map(WorkplaceKind::from_str)
                .transpose()?;
            let rules: Vec<&SynergyRule> = planner
                .rules()
                .synergy
                .iter()
                .filter(|r| kind.map_or(true, |k| r.kind == k))
                .map(|r| r.as_ref())
                .collect();
            print_rules(&rules, cli.output)?;
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}

fn handle_config_command(init: bool, show: bool, config: &Config, config_path: &PathBuf) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn select_bundles(bundles: &[UpgradeBundle], ranks: &[usize]) -> Result<Vec<UpgradeBundle>> {
    let mut out = Vec::with_capacity(ranks.len());
    for &rank in ranks {
        let bundle = rank
            .checked_sub(1)
            .and_then(|i| bundles.get(i))
            .ok_or_else(|| anyhow!("no upgrade bundle at rank {rank} ({} available)", bundles.len()))?;
        out.push(bundle.clone());
    }
    Ok(out)
}

fn print_plan(run: &PlanRun, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_plan_table(run)),
        OutputFormat::Json => println!("{}", render_json(run)?),
        OutputFormat::Csv => println!("{}", plan_to_csv(run)?),
    }
    Ok(())
}

fn print_comparison(comparison: &Comparison, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_comparison_table(comparison)),
        OutputFormat::Json => println!("{}", render_json(comparison)?),
        OutputFormat::Csv => println!("{}", bundles_to_csv(&comparison.bundles)?),
    }
    Ok(())
}

fn print_bundles(bundles: &[UpgradeBundle], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_bundles_table(bundles)),
        OutputFormat::Json => println!("{}", render_json(bundles)?),
        OutputFormat::Csv => println!("{}", bundles_to_csv(bundles)?),
    }
    Ok(())
}

fn print_whatif(result: &WhatIfResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_whatif_table(result)),
        OutputFormat::Json => println!("{}", render_json(result)?),
        OutputFormat::Csv => {
            warn!("CSV output for whatif not implemented, using JSON");
            println!("{}", render_json(result)?);
        }
    }
    Ok(())
}

fn print_rules(rules: &[&SynergyRule], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_rules_table(rules)),
        OutputFormat::Json => println!("{}", render_json(rules)?),
        OutputFormat::Csv => {
            warn!("CSV output for rules not implemented, using JSON");
            println!("{}", render_json(rules)?);
        }
    }
    Ok(())
}
