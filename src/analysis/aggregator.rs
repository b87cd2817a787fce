//! Per-circuit dangerous-incident aggregation.
//!
//! The core of the tool: joins the circuit, race and result tables into one
//! summary per circuit, restricted to the fixed dangerous status set.

use crate::models::{
    Circuit, CircuitId, CircuitSummary, Race, RaceId, RaceResult, StatusCount, StatusId,
    DANGEROUS_STATUS_IDS,
};
use std::collections::HashMap;

/// Scaling constant for the derived bubble radius.
pub const RADIUS_SCALE: f64 = 200.0;

/// Join the loaded tables into one summary per circuit.
///
/// A pure transform: output order matches circuit input order, the sequence
/// always has exactly one entry per circuit, and identical inputs produce
/// identical output. Results are attributed through the two-level
/// Result -> Race -> Circuit join; statuses outside the dangerous set never
/// contribute to any count. Circuits with no races are clamped to frequency
/// 0.0 (and radius 0.0) instead of dividing by zero.
pub fn summarize(
    circuits: &[Circuit],
    races: &[Race],
    results: &[RaceResult],
) -> Vec<CircuitSummary> {
    // Index once so the join is linear in the table sizes; the output is
    // identical to re-scanning races and results per circuit.
    let mut race_ids_by_circuit: HashMap<CircuitId, Vec<RaceId>> = HashMap::new();
    for race in races {
        race_ids_by_circuit
            .entry(race.circuit_id)
            .or_default()
            .push(race.race_id);
    }

    let mut dangerous_counts_by_race: HashMap<RaceId, HashMap<StatusId, usize>> = HashMap::new();
    for result in results {
        if result.status_id.is_dangerous() {
            *dangerous_counts_by_race
                .entry(result.race_id)
                .or_default()
                .entry(result.status_id)
                .or_insert(0) += 1;
        }
    }

    circuits
        .iter()
        .map(|circuit| {
            let race_ids = race_ids_by_circuit
                .get(&circuit.circuit_id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);

            let breakdown: Vec<StatusCount> = DANGEROUS_STATUS_IDS
                .iter()
                .map(|&status_id| {
                    let count = race_ids
                        .iter()
                        .filter_map(|race_id| dangerous_counts_by_race.get(race_id))
                        .map(|counts| counts.get(&status_id).copied().unwrap_or(0))
                        .sum();
                    StatusCount { status_id, count }
                })
                .collect();

            let total_count: usize = breakdown.iter().map(|entry| entry.count).sum();
            let total_races = race_ids.len();
            let frequency = if total_races == 0 {
                0.0
            } else {
                total_count as f64 / total_races as f64
            };
            let radius = (frequency * RADIUS_SCALE).sqrt();

            CircuitSummary {
                circuit_id: circuit.circuit_id,
                circuit: circuit.name.clone(),
                country: circuit.country.clone(),
                lat: circuit.lat,
                lng: circuit.lng,
                total_races,
                total_count,
                frequency,
                radius,
                breakdown,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResultId;

    fn circuit(id: u32, name: &str, country: &str) -> Circuit {
        Circuit {
            circuit_id: CircuitId(id),
            name: name.to_string(),
            country: country.to_string(),
            lat: 0.0,
            lng: 0.0,
        }
    }

    fn race(id: u32, circuit_id: u32) -> Race {
        Race {
            race_id: RaceId(id),
            circuit_id: CircuitId(circuit_id),
        }
    }

    fn result(id: u32, race_id: u32, status_id: u32) -> RaceResult {
        RaceResult {
            result_id: ResultId(id),
            race_id: RaceId(race_id),
            status_id: StatusId(status_id),
        }
    }

    #[test]
    fn test_two_level_join() {
        // One circuit, two races; one dangerous result per race plus one
        // harmless finish.
        let circuits = vec![circuit(1, "Monza", "Italy")];
        let races = vec![race(10, 1), race(11, 1)];
        let results = vec![
            result(100, 10, 4),  // dangerous
            result(101, 10, 1),  // not dangerous
            result(102, 11, 20), // dangerous
        ];

        let summaries = summarize(&circuits, &races, &results);
        assert_eq!(summaries.len(), 1);

        let summary = &summaries[0];
        assert_eq!(summary.total_count, 2);
        assert_eq!(summary.total_races, 2);
        assert_eq!(summary.frequency, 1.0);
        assert!((summary.radius - 14.142).abs() < 1e-3);

        assert_eq!(summary.breakdown.len(), 12);
        assert_eq!(summary.count_for(StatusId(4)), 1);
        assert_eq!(summary.count_for(StatusId(20)), 1);
        for entry in &summary.breakdown {
            if entry.status_id != StatusId(4) && entry.status_id != StatusId(20) {
                assert_eq!(entry.count, 0);
            }
        }
    }

    #[test]
    fn test_non_dangerous_statuses_excluded() {
        let circuits = vec![circuit(1, "Monza", "Italy")];
        let races = vec![race(10, 1)];
        let results = vec![result(100, 10, 1), result(101, 10, 11), result(102, 10, 2)];

        let summaries = summarize(&circuits, &races, &results);
        assert_eq!(summaries[0].total_count, 0);
        assert_eq!(summaries[0].frequency, 0.0);
    }

    #[test]
    fn test_results_attributed_to_owning_circuit_only() {
        let circuits = vec![circuit(1, "Monza", "Italy"), circuit(2, "Spa", "Belgium")];
        let races = vec![race(10, 1), race(20, 2)];
        let results = vec![result(100, 20, 3), result(101, 20, 3)];

        let summaries = summarize(&circuits, &races, &results);
        assert_eq!(summaries[0].total_count, 0);
        assert_eq!(summaries[1].total_count, 2);
    }

    #[test]
    fn test_zero_race_circuit_clamped() {
        let circuits = vec![circuit(1, "Monza", "Italy"), circuit(2, "Unused", "Nowhere")];
        let races = vec![race(10, 1)];
        let results = vec![result(100, 10, 3)];

        let summaries = summarize(&circuits, &races, &results);
        let unused = &summaries[1];

        assert_eq!(unused.total_races, 0);
        assert_eq!(unused.frequency, 0.0);
        assert_eq!(unused.radius, 0.0);
        assert!(unused.frequency.is_finite());
        assert!(unused.radius.is_finite());
    }

    #[test]
    fn test_order_and_length_preserved() {
        let circuits = vec![
            circuit(3, "C", "X"),
            circuit(1, "A", "Y"),
            circuit(2, "B", "Z"),
        ];

        let summaries = summarize(&circuits, &[], &[]);
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].circuit, "C");
        assert_eq!(summaries[1].circuit, "A");
        assert_eq!(summaries[2].circuit, "B");
    }

    #[test]
    fn test_breakdown_sums_to_total() {
        let circuits = vec![circuit(1, "Monza", "Italy")];
        let races = vec![race(10, 1), race(11, 1), race(12, 1)];
        let results = vec![
            result(100, 10, 3),
            result(101, 10, 3),
            result(102, 11, 4),
            result(103, 12, 137),
            result(104, 12, 1),
        ];

        let summaries = summarize(&circuits, &races, &results);
        let summary = &summaries[0];
        let breakdown_sum: usize = summary.breakdown.iter().map(|entry| entry.count).sum();

        assert_eq!(breakdown_sum, summary.total_count);
        assert_eq!(summary.total_count, 4);
        assert!((summary.frequency - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_race_reference_matches_nothing() {
        let circuits = vec![circuit(1, "Monza", "Italy")];
        let races = vec![race(10, 1)];
        // Race 999 does not exist; the result silently joins to no circuit.
        let results = vec![result(100, 999, 3)];

        let summaries = summarize(&circuits, &races, &results);
        assert_eq!(summaries[0].total_count, 0);
    }

    #[test]
    fn test_deterministic() {
        let circuits = vec![circuit(1, "Monza", "Italy"), circuit(2, "Spa", "Belgium")];
        let races = vec![race(10, 1), race(11, 2)];
        let results = vec![result(100, 10, 3), result(101, 11, 4)];

        let first = summarize(&circuits, &races, &results);
        let second = summarize(&circuits, &races, &results);
        assert_eq!(first, second);
    }
}
