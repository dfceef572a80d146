//! Console report and summary table generation.
//!
//! This module renders the three aggregation results as a sectioned
//! text report and writes the key/value summary table to disk as CSV.

use crate::models::{AgeBracketCounts, AnalysisSummary, NightAreaCounts};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while writing the summary table.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write summary table: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode summary table: {0}")]
    Csv(#[from] csv::Error),
}

type Result<T> = std::result::Result<T, ReportError>;

/// Format a count with thousands separators, display only.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

/// Generate the complete console report.
pub fn generate_final_report(
    summary: &AnalysisSummary,
    night: &NightAreaCounts,
    ages: &AgeBracketCounts,
) -> String {
    let mut output = String::new();
    let rule = "=".repeat(60);

    output.push_str(&rule);
    output.push_str("\nCRIME INCIDENT ANALYSIS - FINAL RESULTS\n");
    output.push_str(&rule);
    output.push('\n');

    output.push_str(&generate_peak_hour_section(summary));
    output.push_str(&generate_night_area_section(summary, night));
    output.push_str(&generate_age_section(ages));

    output.push_str(&rule);
    output.push('\n');
    output.push_str(&format!(
        "Total incidents analyzed: {}\n",
        format_count(summary.total_records as u64)
    ));

    output
}

/// Section 1: the peak hour.
fn generate_peak_hour_section(summary: &AnalysisSummary) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "1. Peak Incident Hour: {}:00 (24-hour format)\n",
        summary.peak_hour
    ));
    section.push_str(&format!(
        "   -> {} incidents occurred during this hour\n",
        format_count(summary.peak_hour_count)
    ));

    section
}

/// Section 2: the peak night area.
fn generate_night_area_section(summary: &AnalysisSummary, night: &NightAreaCounts) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "2. Most Incidents at Night (10 PM - 3:59 AM): {}\n",
        summary.peak_night_area
    ));
    section.push_str(&format!(
        "   -> {} night incidents ({} night incidents across {} areas)\n",
        format_count(summary.peak_night_area_count),
        format_count(night.total()),
        night.len()
    ));

    section
}

/// Section 3: the age bracket distribution with percentages.
fn generate_age_section(ages: &AgeBracketCounts) -> String {
    let mut section = String::new();

    section.push_str("3. Victim Age Groups:\n");
    for (bracket, count) in ages.iter() {
        section.push_str(&format!(
            "   - {}: {} incidents ({:.1}%)\n",
            bracket.label(),
            format_count(count),
            ages.percentage(bracket)
        ));
    }
    if ages.excluded() > 0 {
        section.push_str(&format!(
            "   ({} records without a valid age excluded)\n",
            format_count(ages.excluded())
        ));
    }

    section
}

/// Write the key/value summary table as CSV.
///
/// Counts are written bare here (no separators); the file is meant to
/// be machine-readable.
pub fn write_summary_csv(summary: &AnalysisSummary, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    let peak_hour = summary.peak_hour.to_string();
    let total_records = summary.total_records.to_string();

    writer.write_record(["Metric", "Value"])?;
    writer.write_record(["Peak Incident Hour", peak_hour.as_str()])?;
    writer.write_record(["Peak Night Incident Area", summary.peak_night_area.as_str()])?;
    writer.write_record(["Total Incidents Analyzed", total_records.as_str()])?;
    writer.flush()?;

    Ok(())
}
