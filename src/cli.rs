//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Crimescope - crime incident analytics CLI
///
/// Load a crime incident CSV and compute the peak incident hour, the
/// patrol area with the most night incidents, and the victim age
/// distribution. Results are rendered as PNG charts plus a summary
/// table.
///
/// Examples:
///   crimescope --dataset data/crimes.csv
///   crimescope --dataset data/crimes.csv --output results --top-areas 5
///   crimescope --dataset data/crimes.csv --dry-run
///   crimescope --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the incident dataset CSV
    ///
    /// The file must carry the columns Date Rptd, DATE OCC, TIME OCC,
    /// AREA NAME, and Vict Age. Can also be set via CRIMESCOPE_DATASET
    /// or .crimescope.toml.
    #[arg(
        short,
        long,
        default_value = "data/crimes.csv",
        value_name = "FILE",
        env = "CRIMESCOPE_DATASET"
    )]
    pub dataset: PathBuf,

    /// Output directory for charts and the summary table
    ///
    /// Created if it does not exist.
    #[arg(short, long, default_value = "results", value_name = "DIR")]
    pub output: PathBuf,

    /// Path to configuration file
    ///
    /// If not specified, looks for .crimescope.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of areas shown in the night-incident chart
    #[arg(long, default_value = "10", value_name = "COUNT")]
    pub top_areas: usize,

    /// Skip chart rendering (summary table and console report only)
    #[arg(long)]
    pub no_charts: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Load and validate the dataset without aggregating
    ///
    /// Reports the record count and date range, then exits.
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .crimescope.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.top_areas == 0 {
            return Err("--top-areas must be at least 1".to_string());
        }

        // Dataset readability is checked at load time so the error can
        // name the path; only shape problems are rejected here.
        if self.dataset.as_os_str().is_empty() {
            return Err("Dataset path must not be empty".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            dataset: PathBuf::from("data/crimes.csv"),
            output: PathBuf::from("results"),
            config: None,
            top_areas: 10,
            no_charts: false,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_default_args_validate() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_top_areas() {
        let mut args = make_args();
        args.top_areas = 0;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_empty_dataset_path() {
        let mut args = make_args();
        args.dataset = PathBuf::new();
        assert!(args.validate().is_err());

        // --init-config skips the check entirely
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
