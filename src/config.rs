//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.circuitrisk.toml` files.

use crate::analysis::SortMode;
use crate::dataset::DatasetPaths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset locations.
    #[serde(default)]
    pub datasets: DatasetsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "circuit_risk_report.md".to_string()
}

/// Dataset directory and per-table file names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetsConfig {
    /// Directory holding the four tables.
    #[serde(default = "default_data_dir")]
    pub dir: String,

    /// Circuits table file name.
    #[serde(default = "default_circuits_file")]
    pub circuits: String,

    /// Races table file name.
    #[serde(default = "default_races_file")]
    pub races: String,

    /// Status table file name.
    #[serde(default = "default_status_file")]
    pub status: String,

    /// Results table file name.
    #[serde(default = "default_results_file")]
    pub results: String,
}

impl Default for DatasetsConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            circuits: default_circuits_file(),
            races: default_races_file(),
            status: default_status_file(),
            results: default_results_file(),
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_circuits_file() -> String {
    "circuits.csv".to_string()
}

fn default_races_file() -> String {
    "races.csv".to_string()
}

fn default_status_file() -> String {
    "status.csv".to_string()
}

fn default_results_file() -> String {
    "results.csv".to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Ordering for the ranking table and circuit sections.
    #[serde(default)]
    pub sort: SortMode,

    /// Number of circuits in the ranking table.
    #[serde(default = "default_top_circuits")]
    pub top_circuits: usize,

    /// Include circuits without a single dangerous incident.
    #[serde(default)]
    pub include_zero_incident_circuits: bool,

    /// Include the per-status breakdown table in each circuit section.
    #[serde(default = "default_true")]
    pub include_breakdown: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            sort: SortMode::default(),
            top_circuits: default_top_circuits(),
            include_zero_incident_circuits: false,
            include_breakdown: true,
        }
    }
}

fn default_top_circuits() -> usize {
    10
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but
    /// can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".circuitrisk.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings; only values
    /// the user explicitly provided override.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data_dir) = args.data_dir {
            self.datasets.dir = data_dir.display().to_string();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(sort) = args.sort {
            self.report.sort = sort.into();
        }
        if let Some(top) = args.top {
            self.report.top_circuits = top;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Resolve the dataset file locations.
    pub fn dataset_paths(&self) -> DatasetPaths {
        DatasetPaths::new(
            Path::new(&self.datasets.dir),
            &self.datasets.circuits,
            &self.datasets.races,
            &self.datasets.status,
            &self.datasets.results,
        )
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
