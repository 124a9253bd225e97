//! Markdown report generation.
//!
//! This module renders the analytics report - summary metrics plus the
//! trend, district, age-group and status views - as Markdown tables, with
//! a JSON alternative for downstream tooling.

use crate::config::ReportConfig;
use crate::models::{Report, ReportMetadata};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, config: &ReportConfig) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# EpiView Outbreak Report\n\n");

    // Metadata section
    output.push_str(&generate_metadata_section(&report.metadata));

    // Summary metrics
    output.push_str(&generate_metrics_section(report));

    // Case trend over time
    output.push_str(&generate_trend_section(report, config));

    // Cumulative trend
    if config.include_cumulative {
        output.push_str(&generate_cumulative_section(report, config));
    }

    // District breakdown
    output.push_str(&generate_district_section(report));

    // Confirmed cases by age group
    output.push_str(&generate_age_histogram_section(report));

    // Status distribution
    output.push_str(&generate_status_section(report));

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Rows Read:** {}\n", metadata.rows_read));
    section.push_str(&format!(
        "- **Rows Retained:** {}\n",
        metadata.rows_retained
    ));
    if metadata.rows_dropped > 0 {
        section.push_str(&format!("- **Rows Dropped:** {}\n", metadata.rows_dropped));
    }
    if metadata.ages_imputed > 0 {
        section.push_str(&format!(
            "- **Ages Imputed:** {} (median {})\n",
            metadata.ages_imputed,
            metadata
                .median_age
                .map(|m| format!("{:.1}", m))
                .unwrap_or_else(|| "n/a".to_string())
        ));
    }
    section.push_str(&format!(
        "- **Districts:** {}\n",
        match metadata.districts_selected {
            Some(ref districts) => districts.join(", "),
            None => "all".to_string(),
        }
    ));
    section.push_str(&format!(
        "- **Age Groups:** {}\n",
        match metadata.age_groups_selected {
            Some(ref groups) => groups
                .iter()
                .map(|g| g.label().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            None => "all".to_string(),
        }
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the summary metrics section.
fn generate_metrics_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Total Confirmed Cases | Avg Time to Sample | Confirmed Ratio |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {}% |\n\n",
        report.metrics.total_confirmed,
        report
            .metrics
            .avg_time_to_sample
            .map(|avg| format!("{:.1} days", avg))
            .unwrap_or_else(|| "n/a".to_string()),
        report.metrics.confirmed_ratio
    ));

    section
}

/// Generate the daily case trend section.
fn generate_trend_section(report: &Report, config: &ReportConfig) -> String {
    let mut section = String::new();

    section.push_str("## Case Trend Over Time\n\n");

    if report.daily.is_empty() {
        section.push_str("No cases match the current selection.\n\n");
        return section;
    }

    section.push_str("| Date | Status | Cases |\n");
    section.push_str("|:---|:---|:---:|\n");

    for row in report.daily.iter().take(config.max_table_rows) {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            row.date, row.status, row.cases
        ));
    }
    if report.daily.len() > config.max_table_rows {
        section.push_str(&format!(
            "\n*… {} more rows elided.*\n",
            report.daily.len() - config.max_table_rows
        ));
    }
    section.push('\n');

    section
}

/// Generate the cumulative trend section.
fn generate_cumulative_section(report: &Report, config: &ReportConfig) -> String {
    let mut section = String::new();

    section.push_str("## Cumulative Cases\n\n");

    if report.cumulative.is_empty() {
        section.push_str("No cases match the current selection.\n\n");
        return section;
    }

    section.push_str("| Date | Status | Cases | Cumulative |\n");
    section.push_str("|:---|:---|:---:|:---:|\n");

    for row in report.cumulative.iter().take(config.max_table_rows) {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            row.date, row.status, row.cases, row.cumulative_cases
        ));
    }
    if report.cumulative.len() > config.max_table_rows {
        section.push_str(&format!(
            "\n*… {} more rows elided.*\n",
            report.cumulative.len() - config.max_table_rows
        ));
    }
    section.push('\n');

    section
}

/// Generate the district breakdown section.
fn generate_district_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("## Case Distribution by District\n\n");

    if report.districts.is_empty() {
        section.push_str("No cases match the current selection.\n\n");
        return section;
    }

    section.push_str("| District | Status | Cases |\n");
    section.push_str("|:---|:---|:---:|\n");

    for row in &report.districts {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            row.district, row.status, row.cases
        ));
    }
    section.push('\n');

    section
}

/// Generate the confirmed-by-age-group histogram section.
fn generate_age_histogram_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("## Confirmed Cases by Age Group\n\n");

    if report.age_histogram.is_empty() {
        section.push_str("No confirmed cases match the current selection.\n\n");
        return section;
    }

    section.push_str("| Age Group | Cases |\n");
    section.push_str("|:---|:---:|\n");

    for row in &report.age_histogram {
        section.push_str(&format!("| {} | {} |\n", row.age_group, row.cases));
    }
    section.push('\n');

    section
}

/// Generate the status distribution section.
fn generate_status_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("## Case Status Distribution\n\n");

    if report.status_distribution.is_empty() {
        section.push_str("No cases match the current selection.\n\n");
        return section;
    }

    section.push_str("| Status | Cases |\n");
    section.push_str("|:---|:---:|\n");

    for row in &report.status_distribution {
        section.push_str(&format!("| {} | {} |\n", row.status, row.cases));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    format!(
        "---\n\n*Generated by EpiView v{}*\n",
        env!("CARGO_PKG_VERSION")
    )
}
