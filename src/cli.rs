//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// CircuitRisk - dangerous-incident analytics for motorsport circuits
///
/// Load the historical circuit/race/status/result tables, compute the
/// per-circuit dangerous-incident summaries, and write a Markdown report
/// or the JSON bundle the bubble-chart front end consumes.
///
/// Examples:
///   circuitrisk --data-dir ./formula1
///   circuitrisk --data-dir ./formula1 --format json --output chart.json
///   circuitrisk --data-dir ./formula1 --sort count --top 20
///   circuitrisk --data-dir ./formula1 --interactive
///   circuitrisk --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory containing circuits.csv, races.csv, status.csv, results.csv
    ///
    /// Not required when using --init-config. Can also be set via the
    /// CIRCUITRISK_DATA_DIR env var or .circuitrisk.toml config.
    #[arg(
        short,
        long,
        value_name = "DIR",
        env = "CIRCUITRISK_DATA_DIR",
        required_unless_present = "init_config"
    )]
    pub data_dir: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// If not specified, uses the config file's output setting
    /// (circuit_risk_report.md by default).
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown report, or the JSON chart bundle)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Ordering for the ranking table and circuit sections
    ///
    /// Values: frequency (incidents per race), count (total incidents)
    #[arg(short, long, value_name = "MODE")]
    pub sort: Option<SortBy>,

    /// Restrict the per-circuit report sections to one country
    #[arg(long, value_name = "NAME")]
    pub country: Option<String>,

    /// Number of circuits in the ranking table
    #[arg(long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .circuitrisk.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Explore the aggregated chart interactively instead of writing a report
    #[arg(short, long)]
    pub interactive: bool,

    /// Dry run: load and validate the datasets, print row counts, exit
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .circuitrisk.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown report (default)
    #[default]
    Markdown,
    /// JSON chart bundle for the browser renderer
    Json,
}

/// Ordering selector for --sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortBy {
    Frequency,
    Count,
}

impl From<SortBy> for crate::analysis::SortMode {
    fn from(sort: SortBy) -> Self {
        match sort {
            SortBy::Frequency => crate::analysis::SortMode::Frequency,
            SortBy::Count => crate::analysis::SortMode::Count,
        }
    }
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

        // Validate the data directory
        if let Some(ref data_dir) = self.data_dir {
            if !data_dir.exists() {
                return Err(format!(
                    "Data directory does not exist: {}",
                    data_dir.display()
                ));
            }
            if !data_dir.is_dir() {
                return Err(format!(
                    "Data path is not a directory: {}",
                    data_dir.display()
                ));
            }
        }

        // Validate the ranking table size
        if let Some(top) = self.top {
            if top == 0 {
                return Err("Top must be at least 1".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.interactive && self.dry_run {
            return Err("Cannot use both --interactive and --dry-run".to_string());
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
    use crate::analysis::SortMode;

    fn make_args() -> Args {
        Args {
            data_dir: Some(PathBuf::from(".")),
            output: None,
            format: OutputFormat::Markdown,
            sort: None,
            country: None,
            top: None,
            config: None,
            verbose: false,
            quiet: false,
            interactive: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_missing_data_dir() {
        let mut args = make_args();
        args.data_dir = Some(PathBuf::from("/definitely/not/a/real/directory"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.interactive = true;
        args.dry_run = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_top() {
        let mut args = make_args();
        args.top = Some(0);
        assert!(args.validate().is_err());

        args.top = Some(5);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.data_dir = None;
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

    #[test]
    fn test_sort_by_conversion() {
        assert_eq!(SortMode::from(SortBy::Frequency), SortMode::Frequency);
        assert_eq!(SortMode::from(SortBy::Count), SortMode::Count);
    }
}
