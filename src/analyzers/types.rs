//! Data types produced by the segment analysis.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A segment whose streetlamp score is exactly zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZeroScoreSegment {
    pub segment_id: Option<String>,
    pub name: String,
    pub length_m: f64,
}

/// Identifiers found in only one of the two datasets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub geometry_only: BTreeSet<String>,
    pub lamp_only: BTreeSet<String>,
}

/// Full result of a segment analysis run.
#[derive(Debug, Serialize)]
pub struct SegmentReport {
    pub generated_at: DateTime<Utc>,
    /// Distinct segment ids referenced by at least one lamp.
    pub lamp_segments: usize,
    pub lamps_total: usize,
    /// Distinct segment ids in the joined collection.
    pub street_segments: usize,
    pub features: usize,
    /// Features without a segment id.
    pub unidentified_features: usize,
    pub zero_score_segments: usize,
    pub coverage: Coverage,
    /// Longest zero-score segments, longest first.
    pub zero_score_samples: Vec<ZeroScoreSegment>,
    /// Lamp count -> number of segments with exactly that many lamps.
    pub distribution: BTreeMap<usize, usize>,
}

/// Flat summary of a [`SegmentReport`], one CSV row per run.
#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub generated_at: DateTime<Utc>,
    pub lamp_segments: usize,
    pub lamps_total: usize,
    pub street_segments: usize,
    pub zero_score_segments: usize,
    pub geometry_only: usize,
    pub lamp_only: usize,
}

impl From<&SegmentReport> for ReportSummary {
    fn from(report: &SegmentReport) -> Self {
        Self {
            generated_at: report.generated_at,
            lamp_segments: report.lamp_segments,
            lamps_total: report.lamps_total,
            street_segments: report.street_segments,
            zero_score_segments: report.zero_score_segments,
            geometry_only: report.coverage.geometry_only.len(),
            lamp_only: report.coverage.lamp_only.len(),
        }
    }
}
