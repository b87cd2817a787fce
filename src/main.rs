//! CircuitRisk - dangerous-incident analytics for motorsport circuits
//!
//! A CLI tool that loads the historical circuit/race/status/result tables,
//! computes per-circuit dangerous-incident summaries, and renders them as a
//! Markdown report or the JSON bundle the bubble-chart front end consumes.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, missing/unparseable datasets, I/O)

use anyhow::{Context, Result};
use chrono::Utc;
use circuitrisk::analysis;
use circuitrisk::cli::{Args, OutputFormat};
use circuitrisk::config::Config;
use circuitrisk::dataset::{self, Datasets};
use circuitrisk::interactive;
use circuitrisk::models::{ReportMetadata, RiskReport, StatusCatalog};
use circuitrisk::report::{self, ReportOptions};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("CircuitRisk v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the analysis
    match run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .circuitrisk.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".circuitrisk.toml");

    if path.exists() {
        eprintln!("⚠️  .circuitrisk.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .circuitrisk.toml")?;

    println!("✅ Created .circuitrisk.toml with default settings.");
    println!("   Edit it to customize dataset locations and report options.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete load -> aggregate -> report workflow.
async fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let paths = config.dataset_paths();

    // Step 1: Load the four tables behind the all-or-nothing barrier
    println!("📥 Loading datasets from: {}", config.datasets.dir);
    let spinner = make_spinner(!args.quiet);
    let datasets = dataset::load_all(&paths).await?;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let counts = datasets.counts();
    info!(
        "Loaded {} circuits, {} races, {} statuses, {} results",
        counts.circuits, counts.races, counts.statuses, counts.results
    );

    // Handle --dry-run: validate datasets and exit
    if args.dry_run {
        return handle_dry_run(&datasets);
    }

    // Step 2: Aggregate
    println!("🔬 Aggregating dangerous incidents...");
    let summaries = analysis::summarize(&datasets.circuits, &datasets.races, &datasets.results);
    let catalog = StatusCatalog::from_rows(&datasets.statuses);

    // Handle --interactive: explore the chart state instead of writing output
    if args.interactive {
        return interactive::run(summaries, &catalog);
    }

    // Step 3: Generate the output
    match args.format {
        OutputFormat::Markdown => println!("📝 Generating Markdown report..."),
        OutputFormat::Json => println!("📝 Generating JSON chart bundle..."),
    }

    let duration = start_time.elapsed().as_secs_f64();
    let metadata = ReportMetadata {
        data_dir: config.datasets.dir.clone(),
        generated_at: Utc::now(),
        circuit_count: counts.circuits,
        race_count: counts.races,
        status_count: counts.statuses,
        result_count: counts.results,
        duration_seconds: duration,
    };
    let risk_report = RiskReport {
        metadata,
        summaries,
    };

    let options = ReportOptions {
        sort: config.report.sort,
        top: config.report.top_circuits,
        country: args.country.clone(),
        include_zero_incident_circuits: config.report.include_zero_incident_circuits,
        include_breakdown: config.report.include_breakdown,
    };

    let output_content = match args.format {
        OutputFormat::Markdown => {
            report::generate_markdown_report(&risk_report, &catalog, &options)
        }
        OutputFormat::Json => report::generate_chart_bundle(&risk_report.summaries, &catalog)?,
    };

    let output_path = PathBuf::from(&config.general.output);
    std::fs::write(&output_path, &output_content)
        .with_context(|| format!("Failed to write output to {}", output_path.display()))?;

    // Print summary
    let total_incidents: usize = risk_report
        .summaries
        .iter()
        .map(|summary| summary.total_count)
        .sum();

    println!("\n📊 Aggregation Summary:");
    println!("   Circuits: {}", counts.circuits);
    println!("   Races: {}", counts.races);
    println!("   Dangerous incidents: {}", total_incidents);
    if let Some(top) = analysis::ranked(&risk_report.summaries, config.report.sort)
        .first()
        .filter(|summary| summary.has_incidents())
    {
        println!(
            "   Highest by {}: {} ({:.3} per race, {} incidents)",
            config.report.sort, top.circuit, top.frequency, top.total_count
        );
    }
    println!("   Duration: {:.1}s", duration);
    println!("\n✅ Done! Output saved to: {}", output_path.display());

    Ok(())
}

/// Handle --dry-run: report row counts and reference health, write nothing.
fn handle_dry_run(datasets: &Datasets) -> Result<()> {
    println!("\n🔍 Dry run: datasets loaded and validated.\n");

    let counts = datasets.counts();
    println!("   Circuits: {}", counts.circuits);
    println!("   Races: {}", counts.races);
    println!("   Statuses: {}", counts.statuses);
    println!("   Results: {}", counts.results);

    let gaps = datasets.referential_gaps();
    if gaps.is_clean() {
        println!("   References: every result resolves against races and statuses");
    } else {
        println!(
            "   References: {} results with unknown races, {} with unknown statuses",
            gaps.unknown_races, gaps.unknown_statuses
        );
    }

    println!("\n✅ Dry run complete. No output was written.");
    Ok(())
}

/// Build the load-phase spinner, unless running quiet.
fn make_spinner(show: bool) -> Option<ProgressBar> {
    if !show {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message("circuits, races, status, results");
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .circuitrisk.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
