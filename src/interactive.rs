//! Interactive chart-state explorer.
//!
//! Drives the same state surface the browser front end binds to, from the
//! terminal: the two sort triggers, the country filter, and circuit
//! selection with the drill-down detail view and category shares.

use crate::analysis::{ranked, SortMode};
use crate::chart::{
    breakdown_shares, grid_position, BubbleFill, ChartState, CircuitDetail,
};
use crate::models::{CircuitSummary, StatusCatalog};
use anyhow::Result;
use dialoguer::Select;

const MENU: &[&str] = &[
    "Select a circuit",
    "Sort by frequency",
    "Sort by count",
    "Free layout",
    "Filter by country",
    "Show ranked grid",
    "Quit",
];

/// Run the explorer loop until the user quits.
pub fn run(summaries: Vec<CircuitSummary>, catalog: &StatusCatalog) -> Result<()> {
    let mut state = ChartState::new(summaries);

    if state.is_empty() {
        println!("No circuits loaded.");
        return Ok(());
    }

    println!(
        "Loaded {} circuits across {} countries.",
        state.len(),
        state.countries().len()
    );

    loop {
        println!();
        let choice = Select::new()
            .with_prompt("circuitrisk")
            .items(MENU)
            .default(0)
            .interact()?;

        match choice {
            0 => select_circuit(&mut state, catalog)?,
            1 => {
                state.set_ordering(Some(SortMode::Frequency));
                print_ranked_grid(&state);
            }
            2 => {
                state.set_ordering(Some(SortMode::Count));
                print_ranked_grid(&state);
            }
            3 => {
                state.set_ordering(None);
                println!("Bubbles released to the free-floating layout.");
            }
            4 => filter_by_country(&mut state)?,
            5 => print_ranked_grid(&state),
            _ => break,
        }
    }

    Ok(())
}

/// Prompt for a circuit, select it, and show the drill-down view.
fn select_circuit(state: &mut ChartState, catalog: &StatusCatalog) -> Result<()> {
    let names: Vec<String> = state
        .summaries()
        .iter()
        .map(|summary| format!("{} ({})", summary.circuit, summary.country))
        .collect();

    let index = Select::new()
        .with_prompt("Circuit")
        .items(&names)
        .default(0)
        .interact()?;

    state.select(Some(index));

    if let Some(summary) = state.selected_summary() {
        let detail = CircuitDetail::from_summary(summary, catalog);
        println!();
        print!("{}", detail);
        print_shares(summary);
    }

    Ok(())
}

/// Prompt for a country filter and report how many bubbles it highlights.
fn filter_by_country(state: &mut ChartState) -> Result<()> {
    let mut options = vec!["All countries".to_string()];
    options.extend(state.countries().iter().map(|country| country.to_string()));

    let choice = Select::new()
        .with_prompt("Country")
        .items(&options)
        .default(0)
        .interact()?;

    if choice == 0 {
        state.set_filter(None);
        println!("Filter cleared; all bubbles back to the base fill.");
    } else {
        let country = options[choice].clone();
        state.set_filter(Some(country.clone()));

        let highlighted = (0..state.len())
            .filter(|&index| state.bubble_fill(index) == BubbleFill::Highlighted)
            .count();
        println!("{} circuits highlighted in {}.", highlighted, country);
    }

    Ok(())
}

/// Print the ranked grid for the active ordering.
fn print_ranked_grid(state: &ChartState) {
    match state.ordering() {
        None => println!("Free-floating layout; pick a sort to rank the grid."),
        Some(mode) => {
            println!("Ranked grid (by {}):", mode);
            for (rank, summary) in ranked(state.summaries(), mode).iter().enumerate() {
                let position = grid_position(rank);
                println!(
                    "{:>4}. {:<36} {:>7.3} per race {:>5} incidents  cell ({:.0}, {:.0})",
                    rank + 1,
                    summary.circuit,
                    summary.frequency,
                    summary.total_count,
                    position.x,
                    position.y
                );
            }
        }
    }
}

/// Print a textual pie of the dangerous-category shares.
fn print_shares(summary: &CircuitSummary) {
    if !summary.has_incidents() {
        return;
    }

    println!("Category shares:");
    for share in breakdown_shares(summary) {
        if share.count == 0 {
            continue;
        }
        let bar = "#".repeat((share.share * 20.0).round() as usize);
        println!(
            "  {:>5.1}% {:<20} (status {})",
            share.share * 100.0,
            bar,
            share.status_id
        );
    }
}
