//! Dangerous-incident analytics for historical motorsport circuits.
//!
//! `circuitrisk` loads the four-table race archive (circuits, races, status,
//! results), joins them into one dangerous-incident summary per circuit, and
//! produces the artifacts an interactive bubble chart consumes: the JSON
//! chart bundle, a Markdown report, and a programmatic chart-state API for
//! the interaction layer.

pub mod analysis;
pub mod chart;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod interactive;
pub mod models;
pub mod report;
