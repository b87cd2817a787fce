//! Grid layout for the ranked bubble view.
//!
//! The free-floating force layout belongs to the external visualization
//! engine; this module provides the deterministic ranked grid the sort
//! triggers snap bubbles into, behind a pluggable trait so headless contexts
//! can lay out summaries without a physics engine.

use crate::analysis::{ranks, SortMode};
use crate::models::CircuitSummary;
use serde::{Deserialize, Serialize};

/// Number of grid columns.
pub const GRID_COLUMNS: usize = 10;
/// Grid cell size in layout units.
pub const GRID_CELL: f64 = 80.0;
/// Offset of the first cell center from the origin.
pub const GRID_OFFSET: f64 = 40.0;

/// A position in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A layout strategy: one target position per summary, in input order.
pub trait Layout {
    fn layout(&self, summaries: &[CircuitSummary]) -> Vec<Point>;
}

/// Cell center for a 0-based rank: column `rank % 10`, row `rank / 10`.
pub fn grid_position(rank: usize) -> Point {
    Point {
        x: (rank % GRID_COLUMNS) as f64 * GRID_CELL + GRID_OFFSET,
        y: (rank / GRID_COLUMNS) as f64 * GRID_CELL + GRID_OFFSET,
    }
}

/// Deterministic ranked grid layout.
#[derive(Debug, Clone, Copy)]
pub struct GridLayout {
    /// Ordering that assigns ranks.
    pub sort: SortMode,
}

impl Layout for GridLayout {
    fn layout(&self, summaries: &[CircuitSummary]) -> Vec<Point> {
        ranks(summaries, self.sort)
            .into_iter()
            .map(grid_position)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CircuitId;

    fn summary(id: u32, frequency: f64) -> CircuitSummary {
        CircuitSummary {
            circuit_id: CircuitId(id),
            circuit: format!("Circuit {}", id),
            country: "Somewhere".to_string(),
            lat: 0.0,
            lng: 0.0,
            total_races: 10,
            total_count: (frequency * 10.0) as usize,
            frequency,
            radius: (frequency * 200.0).sqrt(),
            breakdown: Vec::new(),
        }
    }

    #[test]
    fn test_grid_position_wraps_every_ten() {
        assert_eq!(grid_position(0), Point { x: 40.0, y: 40.0 });
        assert_eq!(grid_position(9), Point { x: 760.0, y: 40.0 });
        assert_eq!(grid_position(10), Point { x: 40.0, y: 120.0 });
        assert_eq!(grid_position(25), Point { x: 440.0, y: 200.0 });
    }

    #[test]
    fn test_grid_layout_targets_follow_ranks() {
        // Input order: middling, highest, lowest frequency.
        let summaries = vec![summary(1, 1.0), summary(2, 2.0), summary(3, 0.5)];

        let layout = GridLayout {
            sort: SortMode::Frequency,
        };
        let positions = layout.layout(&summaries);

        assert_eq!(positions.len(), 3);
        // Highest frequency gets the first cell.
        assert_eq!(positions[1], grid_position(0));
        assert_eq!(positions[0], grid_position(1));
        assert_eq!(positions[2], grid_position(2));
    }

    #[test]
    fn test_layout_trait_object_is_substitutable() {
        let summaries = vec![summary(1, 1.0)];
        let layout: Box<dyn Layout> = Box::new(GridLayout {
            sort: SortMode::Count,
        });

        assert_eq!(layout.layout(&summaries), vec![grid_position(0)]);
    }
}
