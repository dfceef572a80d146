//! Crimescope - Crime Incident Analytics CLI
//!
//! A CLI tool that loads a crime incident dataset and computes three
//! descriptive statistics: peak incident hour, peak night-incident
//! area, and the victim age distribution. Each result is rendered as
//! a PNG chart and summarized in a small on-disk table.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (load failure, corrupt data, empty aggregation, I/O)

mod analysis;
mod charts;
mod cli;
mod config;
mod dataset;
mod models;
mod report;

use anyhow::{Context, Result};
use cli::Args;
use config::Config;
use models::AnalysisSummary;
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    // Initialize logging
    init_logging(&args);

    info!("Crimescope v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the analysis
    if let Err(e) = run_analysis(args) {
        error!("Analysis failed: {}", e);
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }
}

/// Handle --init-config: generate a default .crimescope.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(".crimescope.toml");

    if path.exists() {
        anyhow::bail!(".crimescope.toml already exists. Remove it first or edit it manually.");
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .crimescope.toml")?;

    println!("Created .crimescope.toml with default settings.");
    println!("Edit it to customize dataset path, output directory, and charts.");
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
            info!("Loaded default config from .crimescope.toml");
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

/// Run the complete analysis workflow.
fn run_analysis(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let dataset_path = Path::new(&config.dataset.path);
    let output_dir = Path::new(&config.general.output_dir);

    // Step 1: Load the dataset
    println!("Loading dataset: {}", dataset_path.display());
    let dataset = dataset::load_dataset(dataset_path, !args.quiet)?;

    println!(
        "Dataset loaded successfully: {} incidents",
        report::format_count(dataset.len() as u64)
    );
    if let Some((min, max)) = dataset.date_range() {
        println!("Date range: {} to {}", min, max);
    }

    // Handle --dry-run: load and validate only
    if args.dry_run {
        println!("\nDry run complete. No aggregation performed.");
        return Ok(());
    }

    // Step 2: Run the three aggregation passes
    println!("\nAggregating incidents...");
    let records = dataset.records();

    let hourly = analysis::hourly_counts(records).context("Hourly aggregation failed")?;
    let night = analysis::night_area_counts(records).context("Night area aggregation failed")?;
    let ages = analysis::age_bracket_counts(records).context("Age bracket aggregation failed")?;

    info!("Bucketed {} incidents across 24 hours", hourly.total());

    let (peak_hour, peak_hour_count) = hourly.peak();
    debug!(
        "Peak hour {} holds {} incidents",
        peak_hour,
        hourly.get(peak_hour)
    );
    // The aggregation pass guarantees at least one entry.
    let (peak_area, peak_area_count) = night
        .peak()
        .map(|(area, count)| (area.to_string(), count))
        .context("Night area counts unexpectedly empty")?;

    let summary = AnalysisSummary {
        peak_hour,
        peak_hour_count,
        peak_night_area: peak_area,
        peak_night_area_count: peak_area_count,
        total_records: dataset.len(),
    };

    // Step 3: Write output artifacts
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    if config.charts.enabled {
        println!("Rendering charts...");
        let size = config.chart_size();

        charts::render_hourly_chart(&hourly, size, &output_dir.join("peak_crime_hour.png"))
            .context("Failed to render hourly chart")?;
        charts::render_night_area_chart(
            &night,
            config.charts.top_areas,
            size,
            &output_dir.join("peak_night_crime_location.png"),
        )
        .context("Failed to render night area chart")?;
        charts::render_age_chart(&ages, size, &output_dir.join("victim_age_distribution.png"))
            .context("Failed to render age distribution chart")?;
    } else {
        info!("Chart rendering disabled");
    }

    let summary_path = output_dir.join("final_results_summary.csv");
    report::write_summary_csv(&summary, &summary_path)
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;

    // Step 4: Print the console report
    println!();
    print!("{}", report::generate_final_report(&summary, &night, &ages));
    println!(
        "\nAll charts and results saved to '{}'.",
        output_dir.display()
    );

    Ok(())
}
