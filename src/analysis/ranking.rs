//! Ranking derivations over the summary sequence.
//!
//! Two orderings drive the ranked grid view: descending incident frequency
//! and descending incident count. Both are stable, so ties keep the input
//! (circuit table) order.

use crate::models::CircuitSummary;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported orderings over the summary sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Order by dangerous incidents per race, highest first.
    #[default]
    Frequency,
    /// Order by total dangerous incidents, highest first.
    Count,
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortMode::Frequency => write!(f, "frequency"),
            SortMode::Count => write!(f, "count"),
        }
    }
}

/// Indices of `summaries` in ranked (descending) order.
pub fn sorted_indices(summaries: &[CircuitSummary], mode: SortMode) -> Vec<usize> {
    let mut order: Vec<usize> = (0..summaries.len()).collect();
    order.sort_by(|&a, &b| match mode {
        // Frequencies are always finite under the zero-race clamp, so
        // total_cmp is a plain descending comparison here.
        SortMode::Frequency => summaries[b].frequency.total_cmp(&summaries[a].frequency),
        SortMode::Count => summaries[b].total_count.cmp(&summaries[a].total_count),
    });
    order
}

/// 0-based rank per summary, in input order.
///
/// `ranks(s, mode)[i]` is the grid rank of `s[i]`; the inverse permutation
/// of [`sorted_indices`].
pub fn ranks(summaries: &[CircuitSummary], mode: SortMode) -> Vec<usize> {
    let order = sorted_indices(summaries, mode);
    let mut ranks = vec![0usize; summaries.len()];
    for (rank, &index) in order.iter().enumerate() {
        ranks[index] = rank;
    }
    ranks
}

/// Summaries in ranked order, highest first.
pub fn ranked(summaries: &[CircuitSummary], mode: SortMode) -> Vec<&CircuitSummary> {
    sorted_indices(summaries, mode)
        .into_iter()
        .map(|index| &summaries[index])
        .collect()
}
