//! Chart-facing interaction layer.
//!
//! The rendering engine (force simulation, SVG, pointer events) is an
//! external collaborator; this module owns the data it binds to: explicit
//! chart state, the deterministic ranked grid, and the drill-down
//! derivations for a selected circuit.

pub mod detail;
pub mod layout;
pub mod state;

pub use detail::{breakdown_shares, CircuitDetail, LabeledCount, StatusShare};
pub use layout::{grid_position, GridLayout, Layout, Point, GRID_CELL, GRID_COLUMNS, GRID_OFFSET};
pub use state::{distinct_countries, BubbleFill, ChartState};
