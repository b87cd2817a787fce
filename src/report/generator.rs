//! Markdown report and chart-bundle generation.
//!
//! This module renders the aggregated summaries two ways: a Markdown report
//! for humans and a JSON "chart bundle" carrying everything the browser
//! renderer binds to (summaries, status labels, both rankings, the country
//! filter options).

use crate::analysis::{ranked, SortMode};
use crate::chart::{breakdown_shares, distinct_countries, CircuitDetail};
use crate::models::{
    CircuitSummary, ReportMetadata, RiskReport, StatusCatalog, DANGEROUS_STATUS_IDS,
};
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// Options shaping the generated report.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Ordering used for the ranking table and the per-circuit sections.
    pub sort: SortMode,
    /// Number of circuits in the ranking table.
    pub top: usize,
    /// Restrict the per-circuit sections to one country.
    pub country: Option<String>,
    /// Include circuits without a single dangerous incident.
    pub include_zero_incident_circuits: bool,
    /// Include the per-status breakdown table in each circuit section.
    pub include_breakdown: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            sort: SortMode::Frequency,
            top: 10,
            country: None,
            include_zero_incident_circuits: false,
            include_breakdown: true,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(
    report: &RiskReport,
    catalog: &StatusCatalog,
    options: &ReportOptions,
) -> String {
    let mut output = String::new();

    output.push_str("# Circuit Risk Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(&report.summaries));
    output.push_str(&generate_ranking_section(&report.summaries, options));
    output.push_str(&generate_circuits_section(&report.summaries, catalog, options));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Data Directory:** `{}`\n", metadata.data_dir));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Circuits:** {}\n", metadata.circuit_count));
    section.push_str(&format!("- **Races:** {}\n", metadata.race_count));
    section.push_str(&format!("- **Statuses:** {}\n", metadata.status_count));
    section.push_str(&format!("- **Results:** {}\n", metadata.result_count));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the totals section.
fn generate_summary_section(summaries: &[CircuitSummary]) -> String {
    let mut section = String::new();

    let total_incidents: usize = summaries.iter().map(|s| s.total_count).sum();
    let with_incidents = summaries.iter().filter(|s| s.has_incidents()).count();
    let countries = distinct_countries(summaries);

    section.push_str("## Summary\n\n");
    section.push_str(&format!(
        "- **Total dangerous incidents:** {}\n",
        total_incidents
    ));
    section.push_str(&format!(
        "- **Circuits with incidents:** {} of {}\n",
        with_incidents,
        summaries.len()
    ));
    section.push_str(&format!("- **Countries:** {}\n", countries.len()));

    if let Some(most_dangerous) = ranked(summaries, SortMode::Frequency).first() {
        if most_dangerous.has_incidents() {
            section.push_str(&format!(
                "- **Highest incident rate:** {} ({:.3} per race)\n",
                most_dangerous.circuit, most_dangerous.frequency
            ));
        }
    }
    section.push('\n');

    section
}

/// Generate the top-N ranking table.
fn generate_ranking_section(summaries: &[CircuitSummary], options: &ReportOptions) -> String {
    let mut section = String::new();

    section.push_str(&format!("## Top Circuits by {}\n\n", heading(options.sort)));

    let ranked_summaries = ranked(summaries, options.sort);
    if ranked_summaries.is_empty() {
        section.push_str("No circuits loaded.\n\n");
        return section;
    }

    section.push_str("| # | Circuit | Country | Races | Incidents | Per Race |\n");
    section.push_str("|:---:|:---|:---|:---:|:---:|:---:|\n");

    for (rank, summary) in ranked_summaries.iter().take(options.top).enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {:.3} |\n",
            rank + 1,
            summary.circuit,
            summary.country,
            summary.total_races,
            summary.total_count,
            summary.frequency
        ));
    }
    section.push('\n');

    section
}

fn heading(sort: SortMode) -> &'static str {
    match sort {
        SortMode::Frequency => "Incident Frequency",
        SortMode::Count => "Incident Count",
    }
}

/// Generate the per-circuit sections.
fn generate_circuits_section(
    summaries: &[CircuitSummary],
    catalog: &StatusCatalog,
    options: &ReportOptions,
) -> String {
    let mut section = String::new();

    section.push_str("## Circuits\n\n");

    let selected: Vec<&CircuitSummary> = ranked(summaries, options.sort)
        .into_iter()
        .filter(|summary| options.include_zero_incident_circuits || summary.has_incidents())
        .filter(|summary| match &options.country {
            Some(country) => summary.country == *country,
            None => true,
        })
        .collect();

    if selected.is_empty() {
        section.push_str("No circuits matched the report filters.\n\n");
        return section;
    }

    for summary in selected {
        section.push_str(&generate_circuit_block(summary, catalog, options));
    }

    section
}

/// Generate one circuit's section.
fn generate_circuit_block(
    summary: &CircuitSummary,
    catalog: &StatusCatalog,
    options: &ReportOptions,
) -> String {
    let mut block = String::new();

    let detail = CircuitDetail::from_summary(summary, catalog);

    block.push_str(&format!("### {} ({})\n\n", detail.circuit, detail.country));
    block.push_str(&format!(
        "*Races: {} | Incidents: {} | Per race: {:.3} | Location: {:.4}, {:.4}*\n\n",
        detail.total_races, detail.total_count, detail.frequency, detail.lat, detail.lng
    ));

    if options.include_breakdown && summary.has_incidents() {
        let shares = breakdown_shares(summary);

        block.push_str("| Status | Count | Share |\n");
        block.push_str("|:---|:---:|:---:|\n");

        for (entry, share) in detail.breakdown.iter().zip(&shares) {
            if entry.count == 0 {
                continue;
            }
            block.push_str(&format!(
                "| {} | {} | {:.1}% |\n",
                entry.label,
                entry.count,
                share.share * 100.0
            ));
        }
        block.push('\n');
    }

    block
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by circuitrisk*\n".to_string()
}

/// Everything the browser renderer binds to.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChartBundle<'a> {
    /// One summary per circuit, input order preserved.
    summaries: &'a [CircuitSummary],
    /// Label per dangerous status id (placeholder for missing ids).
    status_labels: BTreeMap<u32, String>,
    /// 0-based rank per summary for each ordering, in summary order.
    rankings: Rankings,
    /// Country filter options, first-appearance order.
    countries: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Rankings {
    by_frequency: Vec<usize>,
    by_count: Vec<usize>,
}

/// Generate the JSON chart bundle.
pub fn generate_chart_bundle(
    summaries: &[CircuitSummary],
    catalog: &StatusCatalog,
) -> Result<String> {
    let status_labels = DANGEROUS_STATUS_IDS
        .iter()
        .map(|&id| (id.0, catalog.label_or_unknown(id)))
        .collect();

    let bundle = ChartBundle {
        summaries,
        status_labels,
        rankings: Rankings {
            by_frequency: crate::analysis::ranks(summaries, SortMode::Frequency),
            by_count: crate::analysis::ranks(summaries, SortMode::Count),
        },
        countries: distinct_countries(summaries),
    };

    serde_json::to_string_pretty(&bundle).map_err(Into::into)
}

/// Write a generated report (either format) to a file.
pub fn write_output(content: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CircuitId, Status, StatusCount, StatusId};
    use chrono::Utc;

    fn summary(id: u32, name: &str, country: &str, races: usize, count: usize) -> CircuitSummary {
        let frequency = if races == 0 {
            0.0
        } else {
            count as f64 / races as f64
        };
        CircuitSummary {
            circuit_id: CircuitId(id),
            circuit: name.to_string(),
            country: country.to_string(),
            lat: 45.0,
            lng: 9.0,
            total_races: races,
            total_count: count,
            frequency,
            radius: (frequency * 200.0).sqrt(),
            breakdown: vec![StatusCount {
                status_id: StatusId(3),
                count,
            }],
        }
    }

    fn test_report() -> RiskReport {
        RiskReport {
            metadata: ReportMetadata {
                data_dir: "data".to_string(),
                generated_at: Utc::now(),
                circuit_count: 3,
                race_count: 30,
                status_count: 3,
                result_count: 600,
                duration_seconds: 0.2,
            },
            summaries: vec![
                summary(1, "Monza", "Italy", 10, 5),
                summary(2, "Spa", "Belgium", 10, 20),
                summary(3, "Quiet Ring", "Italy", 10, 0),
            ],
        }
    }

    fn catalog() -> StatusCatalog {
        StatusCatalog::from_rows(&[Status {
            status_id: StatusId(3),
            label: "Accident".to_string(),
        }])
    }

    #[test]
    fn test_markdown_report_sections() {
        let markdown =
            generate_markdown_report(&test_report(), &catalog(), &ReportOptions::default());

        assert!(markdown.contains("# Circuit Risk Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Summary"));
        assert!(markdown.contains("## Top Circuits by Incident Frequency"));
        assert!(markdown.contains("## Circuits"));
        assert!(markdown.contains("Monza"));
        assert!(markdown.contains("| Accident | 5 |"));
    }

    #[test]
    fn test_ranking_table_respects_sort_and_top() {
        let options = ReportOptions {
            sort: SortMode::Count,
            top: 1,
            ..ReportOptions::default()
        };
        let markdown = generate_markdown_report(&test_report(), &catalog(), &options);

        // Only the top row appears, and Spa leads by count.
        assert!(markdown.contains("## Top Circuits by Incident Count"));
        assert!(markdown.contains("| 1 | Spa | Belgium | 10 | 20 | 2.000 |"));
        assert!(!markdown.contains("| 2 | Monza"));
    }

    #[test]
    fn test_zero_incident_circuits_skipped_by_default() {
        let markdown =
            generate_markdown_report(&test_report(), &catalog(), &ReportOptions::default());
        assert!(!markdown.contains("### Quiet Ring"));

        let options = ReportOptions {
            include_zero_incident_circuits: true,
            ..ReportOptions::default()
        };
        let markdown = generate_markdown_report(&test_report(), &catalog(), &options);
        assert!(markdown.contains("### Quiet Ring"));
    }

    #[test]
    fn test_country_filter_restricts_circuit_sections() {
        let options = ReportOptions {
            country: Some("Italy".to_string()),
            ..ReportOptions::default()
        };
        let markdown = generate_markdown_report(&test_report(), &catalog(), &options);

        assert!(markdown.contains("### Monza"));
        assert!(!markdown.contains("### Spa"));
    }

    #[test]
    fn test_chart_bundle_contents() {
        let report = test_report();
        let json = generate_chart_bundle(&report.summaries, &catalog()).unwrap();
        let bundle: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(bundle["summaries"].as_array().unwrap().len(), 3);
        assert_eq!(bundle["statusLabels"]["3"], "Accident");
        // Ids missing from the status table get the placeholder label.
        assert_eq!(bundle["statusLabels"]["4"], "unknown status (4)");
        // Spa (index 1) ranks first under both orderings.
        assert_eq!(bundle["rankings"]["byFrequency"][1], 0);
        assert_eq!(bundle["rankings"]["byCount"][1], 0);
        assert_eq!(bundle["countries"][0], "Italy");
        assert_eq!(bundle["countries"][1], "Belgium");
    }
}
