//! Explicit state for the interactive chart.
//!
//! All chart-side mutable state lives in one struct with named mutation
//! methods, so any host (terminal explorer, web front end, tests) drives it
//! through a well-defined surface instead of closure-captured globals.

use crate::analysis::SortMode;
use crate::chart::layout::{GridLayout, Layout, Point};
use crate::models::CircuitSummary;
use std::collections::HashMap;

/// Distinct countries in first-appearance order.
pub fn distinct_countries(summaries: &[CircuitSummary]) -> Vec<&str> {
    let mut seen = Vec::new();
    for summary in summaries {
        if !seen.contains(&summary.country.as_str()) {
            seen.push(summary.country.as_str());
        }
    }
    seen
}

/// Fill bucket for a bubble under the active country filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleFill {
    /// Default fill.
    Base,
    /// The bubble's country matches the active filter.
    Highlighted,
}

/// All mutable state behind the interactive chart.
///
/// The summary sequence itself is immutable after construction; everything
/// else is transient UI state. Mutation methods run to completion, one
/// event at a time, matching the single-threaded event model of the chart.
#[derive(Debug, Clone)]
pub struct ChartState {
    summaries: Vec<CircuitSummary>,
    ordering: Option<SortMode>,
    country_filter: Option<String>,
    selected: Option<usize>,
    pinned: HashMap<usize, Point>,
}

impl ChartState {
    /// Wrap an aggregated summary sequence in a fresh, unfiltered state.
    pub fn new(summaries: Vec<CircuitSummary>) -> Self {
        Self {
            summaries,
            ordering: None,
            country_filter: None,
            selected: None,
            pinned: HashMap::new(),
        }
    }

    /// The immutable summary sequence, in circuit input order.
    pub fn summaries(&self) -> &[CircuitSummary] {
        &self.summaries
    }

    /// Number of bubbles.
    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    /// Whether the chart has no bubbles at all.
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Distinct countries in first-appearance order, for the filter control.
    pub fn countries(&self) -> Vec<&str> {
        distinct_countries(&self.summaries)
    }

    /// Set or clear the country filter (`None` is "all countries").
    pub fn set_filter(&mut self, country: Option<String>) {
        self.country_filter = country;
    }

    /// The active country filter, if any.
    pub fn filter(&self) -> Option<&str> {
        self.country_filter.as_deref()
    }

    /// Fill bucket for the bubble at `index` under the active filter.
    pub fn bubble_fill(&self, index: usize) -> BubbleFill {
        match (&self.country_filter, self.summaries.get(index)) {
            (Some(country), Some(summary)) if summary.country == *country => {
                BubbleFill::Highlighted
            }
            _ => BubbleFill::Base,
        }
    }

    /// Switch the ordering mode (`None` is the free-floating layout).
    pub fn set_ordering(&mut self, mode: Option<SortMode>) {
        self.ordering = mode;
    }

    /// The active ordering mode, if any.
    pub fn ordering(&self) -> Option<SortMode> {
        self.ordering
    }

    /// Ranked grid targets for the active ordering, one per bubble in input
    /// order; `None` while free-floating (the physics engine owns positions
    /// then).
    pub fn target_positions(&self) -> Option<Vec<Point>> {
        self.ordering.map(|sort| {
            let layout = GridLayout { sort };
            layout.layout(&self.summaries)
        })
    }

    /// Select the bubble at `index`, or clear the selection with `None`.
    ///
    /// Returns `false` (and leaves the selection untouched) for an
    /// out-of-range index.
    pub fn select(&mut self, index: Option<usize>) -> bool {
        match index {
            Some(i) if i >= self.summaries.len() => false,
            _ => {
                self.selected = index;
                true
            }
        }
    }

    /// Index of the selected bubble, if any.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Summary behind the current selection, if any.
    pub fn selected_summary(&self) -> Option<&CircuitSummary> {
        self.selected.and_then(|index| self.summaries.get(index))
    }

    /// Pin a bubble to a fixed position while it is being dragged.
    ///
    /// Out-of-range indices are ignored.
    pub fn pin(&mut self, index: usize, position: Point) {
        if index < self.summaries.len() {
            self.pinned.insert(index, position);
        }
    }

    /// Release a dragged bubble back to the simulation.
    pub fn release(&mut self, index: usize) {
        self.pinned.remove(&index);
    }

    /// The pinned position of a bubble, if it is currently being dragged.
    pub fn pinned(&self, index: usize) -> Option<Point> {
        self.pinned.get(&index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CircuitId;

    fn summary(id: u32, name: &str, country: &str, frequency: f64) -> CircuitSummary {
        CircuitSummary {
            circuit_id: CircuitId(id),
            circuit: name.to_string(),
            country: country.to_string(),
            lat: 0.0,
            lng: 0.0,
            total_races: 10,
            total_count: (frequency * 10.0) as usize,
            frequency,
            radius: (frequency * 200.0).sqrt(),
            breakdown: Vec::new(),
        }
    }

    fn sample_state() -> ChartState {
        ChartState::new(vec![
            summary(1, "Monza", "Italy", 1.0),
            summary(2, "Spa", "Belgium", 2.0),
            summary(3, "Imola", "Italy", 0.5),
        ])
    }

    #[test]
    fn test_countries_first_appearance_order() {
        let state = sample_state();
        assert_eq!(state.countries(), vec!["Italy", "Belgium"]);
    }

    #[test]
    fn test_filter_recolors_matching_bubbles() {
        let mut state = sample_state();

        state.set_filter(Some("Italy".to_string()));
        assert_eq!(state.bubble_fill(0), BubbleFill::Highlighted);
        assert_eq!(state.bubble_fill(1), BubbleFill::Base);
        assert_eq!(state.bubble_fill(2), BubbleFill::Highlighted);

        state.set_filter(None);
        for index in 0..state.len() {
            assert_eq!(state.bubble_fill(index), BubbleFill::Base);
        }
    }

    #[test]
    fn test_ordering_produces_grid_targets() {
        let mut state = sample_state();
        assert_eq!(state.target_positions(), None);

        state.set_ordering(Some(SortMode::Frequency));
        let positions = state.target_positions().unwrap();

        assert_eq!(positions.len(), 3);
        // Spa has the highest frequency and takes the first cell.
        assert_eq!(positions[1], crate::chart::layout::grid_position(0));

        state.set_ordering(None);
        assert_eq!(state.target_positions(), None);
    }

    #[test]
    fn test_select_rejects_out_of_range() {
        let mut state = sample_state();

        assert!(state.select(Some(1)));
        assert_eq!(state.selected_summary().unwrap().circuit, "Spa");

        assert!(!state.select(Some(99)));
        // Failed select leaves the previous selection in place.
        assert_eq!(state.selected(), Some(1));

        assert!(state.select(None));
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn test_pin_and_release() {
        let mut state = sample_state();
        let position = Point { x: 120.0, y: 64.0 };

        state.pin(0, position);
        assert_eq!(state.pinned(0), Some(position));

        state.release(0);
        assert_eq!(state.pinned(0), None);

        // Out-of-range pins are ignored.
        state.pin(99, position);
        assert_eq!(state.pinned(99), None);
    }
}
