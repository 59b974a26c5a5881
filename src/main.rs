use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use analytics::{AggregationCalculator, Histogram};
use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use configuration::{Settings, SimulationOverrides};
use core_types::{Control, RiskModel, RiskProfile, Scenario, ids_match, normalize_id};
use simulator::SimulationEngine;

use crate::report::{AssessmentDetails, TableStyle};

mod export;
mod report;

/// The main entry point for the otrisk command-line tool.
fn main() -> Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let mut settings =
        configuration::load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Commands::Simulate(args) = &cli.command {
        settings.apply_overrides(&args.overrides);
        settings.validate().context("Invalid simulation options")?;
    }

    // Held until exit so buffered file logs are flushed.
    let _log_guard = configuration::init_tracing(&settings.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Aggregate(args) => handle_aggregate(args),
        Commands::Simulate(args) => handle_simulate(args, &settings),
        Commands::ExportSelection(args) => handle_export_selection(args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Quantitative risk estimates for OT threat scenarios.
#[derive(Parser)]
#[command(name = "otrisk", author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults to `otrisk.toml` if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the pre-simulation point estimates for a selection.
    Aggregate(AggregateArgs),
    /// Run the Monte Carlo simulation for a selection.
    Simulate(SimulateArgs),
    /// Write the scenario/control selection to a CSV file.
    ExportSelection(ExportSelectionArgs),
}

/// Which profile to load and which of its records to use.
#[derive(Args)]
struct SelectionArgs {
    /// The risk profile JSON file.
    #[arg(long, short)]
    profile: PathBuf,

    /// Scenario IDs to include (comma separated). All scenarios when omitted.
    #[arg(long, value_delimiter = ',')]
    scenarios: Vec<String>,

    /// Control IDs to apply (comma separated). When omitted, the controls mapped to
    /// the selected scenarios' threats are applied.
    #[arg(long, value_delimiter = ',')]
    controls: Vec<String>,

    /// Also apply every control mapped to the selected scenarios' threats.
    #[arg(long)]
    recommended: bool,
}

#[derive(Args)]
struct AggregateArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Print the metrics as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SimulateArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    #[command(flatten)]
    overrides: SimulationOverrides,

    /// Write every trial's annual loss to this CSV file.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the loss-exceedance curve to this CSV file.
    #[arg(long)]
    exceedance: Option<PathBuf>,

    /// Write a plain-text assessment report to this file.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Print a histogram of simulated annual losses.
    #[arg(long)]
    histogram: bool,

    /// Print the summary as JSON instead of tables.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    details: DetailsArgs,
}

/// Optional header fields for the written report.
#[derive(Args)]
struct DetailsArgs {
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    assessor: Option<String>,
    #[arg(long)]
    email: Option<String>,
}

impl From<DetailsArgs> for AssessmentDetails {
    fn from(args: DetailsArgs) -> Self {
        Self {
            company_name: args.company,
            assessor_name: args.assessor,
            email: args.email,
        }
    }
}

#[derive(Args)]
struct ExportSelectionArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Output file. Defaults to `Configuration<YYYYMMDD>.csv`.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// A loaded model together with the records chosen for a run.
struct Selection {
    model: RiskModel,
    scenarios: Vec<Scenario>,
    controls: Vec<Control>,
}

fn load_selection(args: &SelectionArgs) -> Result<Selection> {
    let profile = RiskProfile::from_path(&args.profile)
        .with_context(|| format!("Failed to read risk profile at {:?}", args.profile))?;
    let model = profile.into_model();

    let scenarios = model.select_scenarios(&args.scenarios);
    warn_unmatched("scenario", &args.scenarios, scenarios.iter().map(|s| s.id.as_str()));

    let controls = if args.controls.is_empty() {
        model.recommended_controls(&scenarios)
    } else {
        let explicit = model.select_controls(&args.controls);
        warn_unmatched("control", &args.controls, explicit.iter().map(|c| c.id.as_str()));
        if args.recommended {
            merge_controls(explicit, model.recommended_controls(&scenarios))
        } else {
            explicit
        }
    };

    tracing::info!(
        scenarios = scenarios.len(),
        controls = controls.len(),
        "Loaded selection from {}.",
        args.profile.display()
    );

    Ok(Selection {
        model,
        scenarios,
        controls,
    })
}

/// Appends the controls of `extra` that are not already in `selected`.
fn merge_controls(mut selected: Vec<Control>, extra: Vec<Control>) -> Vec<Control> {
    for control in extra {
        if !selected.iter().any(|c| ids_match(&c.id, &control.id)) {
            selected.push(control);
        }
    }
    selected
}

fn warn_unmatched<'a>(kind: &str, requested: &[String], found: impl Iterator<Item = &'a str>) {
    let found: Vec<String> = found.map(normalize_id).collect();
    for id in requested {
        if !found.contains(&normalize_id(id)) {
            tracing::warn!("Requested {kind} '{id}' is not in the profile.");
        }
    }
}

fn handle_aggregate(args: AggregateArgs) -> Result<()> {
    let selection = load_selection(&args.selection)?;
    let metrics = AggregationCalculator::new().compute(
        &selection.scenarios,
        &selection.controls,
        &selection.model.threat_control_map,
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    println!("{}", report::scenario_table(&selection.scenarios, TableStyle::Terminal));
    println!("\nPre-Simulation Summary");
    println!("{}", report::metrics_table(&metrics, TableStyle::Terminal));
    Ok(())
}

fn handle_simulate(args: SimulateArgs, settings: &Settings) -> Result<()> {
    let selection = load_selection(&args.selection)?;
    let map = &selection.model.threat_control_map;

    let engine = SimulationEngine::new(settings.simulation.clone());
    let engine = if args.json { engine } else { engine.with_progress_bar()? };
    let result = engine
        .run(
            &selection.scenarios,
            &selection.controls,
            map,
            settings.simulation.trials,
        )
        .context("Simulation failed")?;

    if args.json {
        let summary = serde_json::json!({
            "trials": result.trial_count(),
            "mean_eal": result.mean_eal,
            "p90_eal": result.p90_eal,
            "p95_eal": result.p95_eal,
            "max_loss": result.max_loss(),
            "probability_one_plus_events": result.probability_one_plus_events,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", report::simulation_table(&result, TableStyle::Terminal));
    }

    if args.histogram {
        let histogram = Histogram::build(&result.annual_losses, settings.report.histogram_bins)?;
        println!("{}", report::histogram_table(&histogram, TableStyle::Terminal));
    }

    if let Some(path) = &args.csv {
        export::write_trial_csv(create(path)?, &result.annual_losses)
            .with_context(|| format!("Failed to write trial CSV to {:?}", path))?;
        println!("Trial results written to {}", path.display());
    }

    if let Some(path) = &args.exceedance {
        export::write_exceedance_csv(create(path)?, &result.annual_losses)
            .with_context(|| format!("Failed to write exceedance CSV to {:?}", path))?;
        println!("Exceedance curve written to {}", path.display());
    }

    if let Some(path) = &args.report {
        let metrics = AggregationCalculator::new().compute(
            &selection.scenarios,
            &selection.controls,
            map,
        );
        let text = report::render_report(
            &settings.report.title,
            Local::now().date_naive(),
            &args.details.into(),
            &metrics,
            Some(&result),
        );
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write report to {:?}", path))?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

fn handle_export_selection(args: ExportSelectionArgs) -> Result<()> {
    let selection = load_selection(&args.selection)?;
    let path = args.output.unwrap_or_else(|| {
        PathBuf::from(format!("Configuration{}.csv", Local::now().format("%Y%m%d")))
    });

    export::write_selection_csv(
        create(&path)?,
        &selection.model,
        &selection.scenarios,
        &selection.controls,
    )
    .with_context(|| format!("Failed to write selection to {:?}", path))?;

    println!("Selection written to {}", path.display());
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    Ok(BufWriter::new(file))
}
