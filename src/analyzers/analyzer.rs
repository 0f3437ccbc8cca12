use anyhow::Result;
use chrono::Utc;
use geojson::Feature;
use std::collections::HashSet;
use std::io::BufRead;
use tracing::info;

use crate::analyzers::coverage::coverage;
use crate::analyzers::samples::ZeroScoreSamples;
use crate::analyzers::types::{SegmentReport, ZeroScoreSegment};
use crate::config::{FieldNames, PipelineConfig};
use crate::density::streetlamp_score;
use crate::lamps::LampCountIndex;
use crate::segment::SegmentView;
use crate::stream::FeatureReader;

/// Zero-score segments listed in the report.
pub const SAMPLE_LIMIT: usize = 10;

/// What a single pass over the joined collection observed.
#[derive(Debug)]
pub struct SegmentScan {
    pub segment_ids: HashSet<String>,
    pub features: usize,
    pub unidentified: usize,
    pub zero_score: usize,
    pub samples: Vec<ZeroScoreSegment>,
}

/// Scans joined features, collecting ids and zero-score segments.
///
/// A feature without a score property is scored from `index` and its length,
/// so it is judged by the same rule the joiner applies.
pub fn scan_segments<R: BufRead>(
    features: FeatureReader<R, Feature>,
    index: &LampCountIndex,
    fields: &FieldNames,
) -> Result<SegmentScan> {
    let mut segment_ids = HashSet::new();
    let mut samples = ZeroScoreSamples::new(SAMPLE_LIMIT);
    let mut features_seen = 0;
    let mut unidentified = 0;
    let mut zero_score = 0;

    for feature in features {
        let feature = feature?;
        features_seen += 1;

        let view = SegmentView::new(feature.properties.as_ref());
        let segment_id = view.segment_id(&fields.segment_id);
        let length_m = view.length_m(&fields.length);
        let score = view.score(&fields.score).unwrap_or_else(|| {
            let lamps = segment_id.as_deref().map_or(0, |id| index.count(id));
            streetlamp_score(lamps, length_m)
        });

        if score == 0.0 {
            zero_score += 1;
            samples.push(ZeroScoreSegment {
                segment_id: segment_id.clone(),
                name: view.name(&fields.street_name),
                length_m,
            });
        }

        match segment_id {
            Some(id) => {
                segment_ids.insert(id);
            }
            None => unidentified += 1,
        }
    }

    Ok(SegmentScan {
        segment_ids,
        features: features_seen,
        unidentified,
        zero_score,
        samples: samples.into_sorted(),
    })
}

/// Builds the report from an independent lamp count and a segment scan.
pub fn build_report(index: &LampCountIndex, scan: SegmentScan) -> SegmentReport {
    let lamp_ids: HashSet<String> = index.segment_ids().map(str::to_string).collect();

    SegmentReport {
        generated_at: Utc::now(),
        lamp_segments: index.len(),
        lamps_total: index.total(),
        street_segments: scan.segment_ids.len(),
        features: scan.features,
        unidentified_features: scan.unidentified,
        zero_score_segments: scan.zero_score,
        coverage: coverage(&scan.segment_ids, &lamp_ids),
        zero_score_samples: scan.samples,
        distribution: index.distribution(),
    }
}

/// Re-counts lamps from the raw CSV and checks them against the scored output.
#[tracing::instrument(skip_all, fields(
    lamps = %config.paths.lamps_csv.display(),
    segments = %config.paths.centerlines_with_score.display(),
))]
pub fn analyze_segments(config: &PipelineConfig) -> Result<SegmentReport> {
    let index = LampCountIndex::from_path(&config.paths.lamps_csv, &config.fields.lamp_segment_id)?;

    let features = FeatureReader::open(&config.paths.centerlines_with_score)?;
    let scan = scan_segments(features, &index, &config.fields)?;
    let report = build_report(&index, scan);

    info!(
        street_segments = report.street_segments,
        lamp_segments = report.lamp_segments,
        zero_score = report.zero_score_segments,
        geometry_only = report.coverage.geometry_only.len(),
        lamp_only = report.coverage.lamp_only.len(),
        "Segment analysis complete"
    );
    Ok(report)
}
