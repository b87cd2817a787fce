//! Data models for the circuit risk analyzer.
//!
//! This module contains the typed records for the four source tables,
//! the canonical identifier newtypes, the fixed dangerous status set,
//! and the derived per-circuit summary consumed by the visualization.

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Status codes classified as dangerous incidents (accidents, collisions,
/// spins, fatal outcomes and the like).
///
/// Fixed by definition: this set is never derived from the data and is not
/// configurable. Results with any other status are invisible to the
/// aggregation.
pub const DANGEROUS_STATUS_IDS: [StatusId; 12] = [
    StatusId(3),
    StatusId(4),
    StatusId(20),
    StatusId(56),
    StatusId(66),
    StatusId(73),
    StatusId(82),
    StatusId(100),
    StatusId(107),
    StatusId(137),
    StatusId(138),
    StatusId(139),
];

/// Deserialize an identifier column into its canonical numeric form.
///
/// The source files render identifiers inconsistently: `4`, `"4"`, `"04"`,
/// sometimes padded with whitespace. All renderings parse to the same `u32`
/// here, once, so every later join is plain integer equality.
fn deserialize_raw_id<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    struct RawIdVisitor;

    impl Visitor<'_> for RawIdVisitor {
        type Value = u32;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a numeric identifier")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<u32, E> {
            u32::try_from(value)
                .map_err(|_| E::custom(format!("identifier out of range: {}", value)))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<u32, E> {
            u32::try_from(value)
                .map_err(|_| E::custom(format!("identifier out of range: {}", value)))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<u32, E> {
            value
                .trim()
                .parse::<u32>()
                .map_err(|_| E::custom(format!("invalid identifier: {:?}", value)))
        }
    }

    deserializer.deserialize_any(RawIdVisitor)
}

/// Canonical circuit identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CircuitId(pub u32);

impl<'de> Deserialize<'de> for CircuitId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_raw_id(deserializer).map(CircuitId)
    }
}

impl fmt::Display for CircuitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical race identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RaceId(pub u32);

impl<'de> Deserialize<'de> for RaceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_raw_id(deserializer).map(RaceId)
    }
}

impl fmt::Display for RaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical result identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ResultId(pub u32);

impl<'de> Deserialize<'de> for ResultId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_raw_id(deserializer).map(ResultId)
    }
}

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical status identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StatusId(pub u32);

impl<'de> Deserialize<'de> for StatusId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_raw_id(deserializer).map(StatusId)
    }
}

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StatusId {
    /// Whether this status code belongs to the dangerous set.
    pub fn is_dangerous(self) -> bool {
        DANGEROUS_STATUS_IDS.contains(&self)
    }
}

/// One row of `circuits.csv`: a racing venue.
///
/// Extra columns in the source file (altitude, URL, ...) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circuit {
    /// Circuit identifier, referenced by races.
    #[serde(rename = "circuitId")]
    pub circuit_id: CircuitId,
    /// Circuit display name.
    pub name: String,
    /// Country hosting the circuit.
    pub country: String,
    /// Geographic latitude.
    pub lat: f64,
    /// Geographic longitude.
    pub lng: f64,
}

/// One row of `races.csv`: a race held at some circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Race {
    /// Race identifier, referenced by results.
    #[serde(rename = "raceId")]
    pub race_id: RaceId,
    /// The circuit this race was held at.
    #[serde(rename = "circuitId")]
    pub circuit_id: CircuitId,
}

/// One row of `results.csv`: a single driver's outcome in a race.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceResult {
    /// Result identifier.
    #[serde(rename = "resultId")]
    pub result_id: ResultId,
    /// The race this result belongs to.
    #[serde(rename = "raceId")]
    pub race_id: RaceId,
    /// How the driver's race ended.
    #[serde(rename = "statusId")]
    pub status_id: StatusId,
}

/// One row of `status.csv`: a result status code and its label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    /// Status identifier, referenced by results.
    #[serde(rename = "statusId")]
    pub status_id: StatusId,
    /// Human-readable label, e.g. "Accident" or "Collision".
    #[serde(rename = "status")]
    pub label: String,
}

/// Lookup from status id to human-readable label.
///
/// Results occasionally reference status codes absent from `status.csv`;
/// lookups through [`StatusCatalog::label_or_unknown`] degrade to a
/// placeholder label instead of failing.
#[derive(Debug, Clone, Default)]
pub struct StatusCatalog {
    labels: HashMap<StatusId, String>,
}

impl StatusCatalog {
    /// Build the catalog from the loaded status table.
    pub fn from_rows(rows: &[Status]) -> Self {
        let labels = rows
            .iter()
            .map(|row| (row.status_id, row.label.clone()))
            .collect();
        Self { labels }
    }

    /// Look up the label for a status id.
    pub fn label(&self, id: StatusId) -> Option<&str> {
        self.labels.get(&id).map(String::as_str)
    }

    /// Look up the label for a status id, falling back to a placeholder
    /// for ids missing from the status table.
    pub fn label_or_unknown(&self, id: StatusId) -> String {
        match self.label(id) {
            Some(label) => label.to_string(),
            None => format!("unknown status ({})", id),
        }
    }
}

/// Occurrence count for one dangerous status code within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status_id: StatusId,
    pub count: usize,
}

/// The derived, per-circuit aggregate record consumed by the visualization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitSummary {
    /// Identifier of the summarized circuit.
    pub circuit_id: CircuitId,
    /// Circuit display name.
    pub circuit: String,
    /// Country hosting the circuit.
    pub country: String,
    /// Geographic latitude.
    pub lat: f64,
    /// Geographic longitude.
    pub lng: f64,
    /// Number of races held at this circuit.
    pub total_races: usize,
    /// Dangerous incidents across all of this circuit's races.
    pub total_count: usize,
    /// Dangerous incidents per race; 0.0 for circuits with no races.
    pub frequency: f64,
    /// Bubble radius: sqrt(frequency * 200).
    pub radius: f64,
    /// One entry per dangerous status code, in set order, zeros included.
    pub breakdown: Vec<StatusCount>,
}

impl CircuitSummary {
    /// Occurrence count for one dangerous status code (0 for codes outside
    /// the dangerous set).
    pub fn count_for(&self, id: StatusId) -> usize {
        self.breakdown
            .iter()
            .find(|entry| entry.status_id == id)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }

    /// Whether any dangerous incident was recorded at this circuit.
    pub fn has_incidents(&self) -> bool {
        self.total_count > 0
    }
}

/// Metadata about a generated risk report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// Directory the datasets were loaded from.
    pub data_dir: String,
    /// Date and time of generation.
    pub generated_at: DateTime<Utc>,
    /// Number of circuit rows loaded.
    pub circuit_count: usize,
    /// Number of race rows loaded.
    pub race_count: usize,
    /// Number of status rows loaded.
    pub status_count: usize,
    /// Number of result rows loaded.
    pub result_count: usize,
    /// Wall-clock duration of the run in seconds.
    pub duration_seconds: f64,
}

/// The complete risk report: metadata plus one summary per circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
    /// Metadata about the run that produced the report.
    pub metadata: ReportMetadata,
    /// One summary per input circuit, input order preserved.
    pub summaries: Vec<CircuitSummary>,
}
