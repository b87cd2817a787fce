//! Dataset loading for the four source tables.
//!
//! The loader reads `circuits.csv`, `races.csv`, `status.csv` and
//! `results.csv` concurrently and joins them behind an all-or-nothing
//! barrier: aggregation only ever sees a complete set of tables, and the
//! first load failure aborts the whole run.

use crate::models::{Circuit, Race, RaceResult, Status};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while loading the source tables.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A source file could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source file could not be parsed as the expected table.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A background load task died before producing a result.
    #[error("dataset load task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Locations of the four source tables.
#[derive(Debug, Clone)]
pub struct DatasetPaths {
    /// Path to the circuits table.
    pub circuits: PathBuf,
    /// Path to the races table.
    pub races: PathBuf,
    /// Path to the status table.
    pub status: PathBuf,
    /// Path to the results table.
    pub results: PathBuf,
}

impl DatasetPaths {
    /// Resolve the given file names against a data directory.
    pub fn new(dir: &Path, circuits: &str, races: &str, status: &str, results: &str) -> Self {
        Self {
            circuits: dir.join(circuits),
            races: dir.join(races),
            status: dir.join(status),
            results: dir.join(results),
        }
    }

    /// Standard file names under a single data directory.
    pub fn from_dir(dir: &Path) -> Self {
        Self::new(dir, "circuits.csv", "races.csv", "status.csv", "results.csv")
    }
}

/// Row counts per loaded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetCounts {
    pub circuits: usize,
    pub races: usize,
    pub statuses: usize,
    pub results: usize,
}

/// Results pointing at rows that do not exist in the referenced tables.
///
/// Neither gap is fatal: a result with an unknown race matches no circuit
/// during aggregation, and an unknown status id falls back to a placeholder
/// label at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferentialGaps {
    /// Results whose race id is absent from the race table.
    pub unknown_races: usize,
    /// Results whose status id is absent from the status table.
    pub unknown_statuses: usize,
}

impl ReferentialGaps {
    /// Whether every result resolves against both referenced tables.
    pub fn is_clean(&self) -> bool {
        self.unknown_races == 0 && self.unknown_statuses == 0
    }
}

/// The four loaded tables.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    /// Circuit rows, in file order.
    pub circuits: Vec<Circuit>,
    /// Race rows, in file order.
    pub races: Vec<Race>,
    /// Status rows, in file order.
    pub statuses: Vec<Status>,
    /// Result rows, in file order.
    pub results: Vec<RaceResult>,
}

impl Datasets {
    /// Row counts per table.
    pub fn counts(&self) -> DatasetCounts {
        DatasetCounts {
            circuits: self.circuits.len(),
            races: self.races.len(),
            statuses: self.statuses.len(),
            results: self.results.len(),
        }
    }

    /// Count results referencing races or statuses absent from their tables.
    pub fn referential_gaps(&self) -> ReferentialGaps {
        let race_ids: HashSet<_> = self.races.iter().map(|race| race.race_id).collect();
        let status_ids: HashSet<_> = self.statuses.iter().map(|status| status.status_id).collect();

        let unknown_races = self
            .results
            .iter()
            .filter(|result| !race_ids.contains(&result.race_id))
            .count();
        let unknown_statuses = self
            .results
            .iter()
            .filter(|result| !status_ids.contains(&result.status_id))
            .count();

        ReferentialGaps {
            unknown_races,
            unknown_statuses,
        }
    }
}

/// Read one CSV table into typed records.
///
/// The reader trims whitespace around fields; unknown extra columns are
/// ignored by name-based deserialization.
fn load_table<T>(path: &Path) -> Result<Vec<T>, DatasetError>
where
    T: DeserializeOwned,
{
    debug!("Loading table: {}", path.display());

    let file = File::open(path).map_err(|source| DatasetError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(|source| DatasetError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Load all four tables concurrently behind a barrier.
///
/// Every table must parse before the result is returned; the first failure
/// (missing file, malformed row, bad identifier) aborts the load. Referential
/// gaps between results and the race/status tables are logged but tolerated.
pub async fn load_all(paths: &DatasetPaths) -> Result<Datasets, DatasetError> {
    let circuits_path = paths.circuits.clone();
    let races_path = paths.races.clone();
    let status_path = paths.status.clone();
    let results_path = paths.results.clone();

    let circuits = tokio::task::spawn_blocking(move || load_table::<Circuit>(&circuits_path));
    let races = tokio::task::spawn_blocking(move || load_table::<Race>(&races_path));
    let statuses = tokio::task::spawn_blocking(move || load_table::<Status>(&status_path));
    let results = tokio::task::spawn_blocking(move || load_table::<RaceResult>(&results_path));

    let (circuits, races, statuses, results) = tokio::try_join!(circuits, races, statuses, results)?;

    let datasets = Datasets {
        circuits: circuits?,
        races: races?,
        statuses: statuses?,
        results: results?,
    };

    let gaps = datasets.referential_gaps();
    if gaps.unknown_races > 0 {
        warn!(
            "{} results reference races missing from the race table",
            gaps.unknown_races
        );
    }
    if gaps.unknown_statuses > 0 {
        warn!(
            "{} results reference statuses missing from the status table",
            gaps.unknown_statuses
        );
    }

    Ok(datasets)
}
