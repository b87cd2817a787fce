//! Drill-down derivations for a selected circuit.
//!
//! Clicking a bubble opens a detail view and a pie chart of the dangerous
//! category proportions; this module derives both from a summary and the
//! status catalog.

use crate::models::{CircuitSummary, StatusCatalog, StatusId};
use serde::Serialize;
use std::fmt;

/// One labeled entry of a circuit's dangerous breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledCount {
    pub status_id: StatusId,
    pub label: String,
    pub count: usize,
}

/// The data behind the click-to-select detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitDetail {
    pub circuit: String,
    pub country: String,
    pub frequency: f64,
    pub total_races: usize,
    pub total_count: usize,
    pub lat: f64,
    pub lng: f64,
    pub breakdown: Vec<LabeledCount>,
}

impl CircuitDetail {
    /// Assemble the detail view for one summary.
    ///
    /// Status ids missing from the catalog resolve to the placeholder label
    /// so a single bad reference never takes down the whole view.
    pub fn from_summary(summary: &CircuitSummary, catalog: &StatusCatalog) -> Self {
        let breakdown = summary
            .breakdown
            .iter()
            .map(|entry| LabeledCount {
                status_id: entry.status_id,
                label: catalog.label_or_unknown(entry.status_id),
                count: entry.count,
            })
            .collect();

        Self {
            circuit: summary.circuit.clone(),
            country: summary.country.clone(),
            frequency: summary.frequency,
            total_races: summary.total_races,
            total_count: summary.total_count,
            lat: summary.lat,
            lng: summary.lng,
            breakdown,
        }
    }
}

impl fmt::Display for CircuitDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Circuit: {}", self.circuit)?;
        writeln!(f, "Average accidents per race: {}", self.frequency)?;
        writeln!(f, "Total race count: {}", self.total_races)?;
        writeln!(f, "Total accident count: {}", self.total_count)?;
        writeln!(f, "Latitude: {}", self.lat)?;
        writeln!(f, "Longitude: {}", self.lng)?;
        writeln!(f, "Country: {}", self.country)?;
        writeln!(f)?;
        for entry in &self.breakdown {
            writeln!(f, "{}: {}", entry.label, entry.count)?;
        }
        Ok(())
    }
}

/// Share of the circuit total for one dangerous status, for the pie chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusShare {
    pub status_id: StatusId,
    pub count: usize,
    pub share: f64,
}

/// Proportion of each dangerous category in the circuit's total.
///
/// One entry per dangerous code in set order; every share is 0.0 when the
/// circuit has no incidents (no division by zero).
pub fn breakdown_shares(summary: &CircuitSummary) -> Vec<StatusShare> {
    summary
        .breakdown
        .iter()
        .map(|entry| {
            let share = if summary.total_count == 0 {
                0.0
            } else {
                entry.count as f64 / summary.total_count as f64
            };
            StatusShare {
                status_id: entry.status_id,
                count: entry.count,
                share,
            }
        })
        .collect()
}
