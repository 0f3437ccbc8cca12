//! Output formatting and persistence for segment analysis reports.
//!
//! Supports the human-readable stdout report, JSON serialization, and CSV append.

use anyhow::{Context, Result};
use tracing::debug;

use crate::analyzers::histogram::histogram_extremes;
use crate::analyzers::types::{ReportSummary, SegmentReport};
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Distribution buckets shown at each end of the histogram.
const DISTRIBUTION_EDGE: usize = 5;

/// Writes the human-readable analysis report.
pub fn write_report<W: Write>(out: &mut W, report: &SegmentReport) -> Result<()> {
    writeln!(out, "Analysis Results:")?;
    writeln!(out, "Total unique segments with lamps: {}", report.lamp_segments)?;
    writeln!(out, "Total street segments in GeoJSON: {}", report.street_segments)?;
    writeln!(out, "Segments with zero lamps: {}", report.zero_score_segments)?;
    writeln!(
        out,
        "Segments in GeoJSON but not in lamp data: {}",
        report.coverage.geometry_only.len()
    )?;
    writeln!(
        out,
        "Segments in lamp data but not in GeoJSON: {}",
        report.coverage.lamp_only.len()
    )?;

    writeln!(
        out,
        "\nSample of segments with zero lamps (showing {}):",
        report.zero_score_samples.len()
    )?;
    writeln!(out, "SegID, Street Name, Length (m)")?;
    for segment in &report.zero_score_samples {
        writeln!(
            out,
            "{}, {}, {:.1}m",
            segment.segment_id.as_deref().unwrap_or("-"),
            segment.name,
            segment.length_m
        )?;
    }

    writeln!(out, "\nDistribution of lamps per segment:")?;
    let extremes = histogram_extremes(&report.distribution, DISTRIBUTION_EDGE);
    for (lamps, segments) in &extremes.lowest {
        writeln!(out, "{lamps} lamp(s): {segments} segments")?;
    }
    if extremes.omitted > 0 {
        writeln!(out, "...")?;
    }
    for (lamps, segments) in &extremes.highest {
        writeln!(out, "{lamps} lamp(s): {segments} segments")?;
    }

    Ok(())
}

/// Prints the analysis report to stdout.
pub fn print_report(report: &SegmentReport) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, report)?;
    out.flush()?;
    Ok(())
}

/// Writes the full report as pretty-printed JSON.
pub fn write_report_json(path: &Path, report: &SegmentReport) -> Result<()> {
    let body = serde_json::to_vec_pretty(report)?;
    std::fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), "Report JSON written");
    Ok(())
}

/// Appends a [`ReportSummary`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_summary(path: &Path, summary: &ReportSummary) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV record");

    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(summary)?;
    writer.flush()?;

    Ok(())
}
