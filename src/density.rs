//! Streetlamp density: joins lamp counts onto length-enriched segments.

use anyhow::Result;
use geojson::{Feature, JsonObject, JsonValue};
use std::io::{BufRead, Write};
use tracing::info;

use crate::config::{FieldNames, PipelineConfig};
use crate::lamps::LampCountIndex;
use crate::segment::SegmentView;
use crate::stream::{
    FeatureCollectionWriter, FeatureReader, count_features, normalize_feature, write_collection,
};

/// Lamps per meter of segment; 0 when the segment has no positive length.
pub fn streetlamp_score(lamps: usize, length_m: f64) -> f64 {
    if length_m > 0.0 {
        lamps as f64 / length_m
    } else {
        0.0
    }
}

/// Totals for one join pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct JoinSummary {
    pub features: usize,
    /// Features with at least one lamp joined.
    pub matched: usize,
    pub lamps_joined: usize,
}

/// Progress reporting for a streaming pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct Progress {
    pub total: Option<usize>,
    pub interval: usize,
}

impl Progress {
    fn tick(&self, processed: usize) {
        if self.interval > 0 && processed % self.interval == 0 {
            info!(processed, total = self.total, "Processing segments");
        }
    }
}

/// Streams `features` to `writer`, adding the score property to each one.
pub fn join_features<R: BufRead, W: Write>(
    features: FeatureReader<R, Feature>,
    writer: &mut FeatureCollectionWriter<W>,
    index: &LampCountIndex,
    fields: &FieldNames,
    progress: Progress,
) -> Result<JoinSummary> {
    let mut summary = JoinSummary::default();

    for feature in features {
        let mut feature = feature?;

        let view = SegmentView::new(feature.properties.as_ref());
        let lamps = view
            .segment_id(&fields.segment_id)
            .map_or(0, |id| index.count(&id));
        let score = streetlamp_score(lamps, view.length_m(&fields.length));

        let properties = feature.properties.get_or_insert_with(JsonObject::new);
        properties.insert(fields.score.clone(), JsonValue::from(score));
        normalize_feature(&mut feature);
        writer.write_feature(&feature)?;

        summary.features += 1;
        if lamps > 0 {
            summary.matched += 1;
            summary.lamps_joined += lamps;
        }
        progress.tick(summary.features);
    }

    Ok(summary)
}

/// Writes the scored collection from the length-enriched one.
#[tracing::instrument(skip_all, fields(
    input = %config.paths.centerlines_with_length.display(),
    output = %config.paths.centerlines_with_score.display(),
))]
pub fn join_density(config: &PipelineConfig, index: &LampCountIndex) -> Result<JoinSummary> {
    let input = &config.paths.centerlines_with_length;

    let progress = if config.progress_interval > 0 {
        Progress {
            total: Some(count_features(input)?),
            interval: config.progress_interval,
        }
    } else {
        Progress::default()
    };

    let features = FeatureReader::open(input)?;
    let summary = write_collection(&config.paths.centerlines_with_score, |writer| {
        join_features(features, writer, index, &config.fields, progress)
    })?;

    info!(
        features = summary.features,
        matched = summary.matched,
        lamps_joined = summary.lamps_joined,
        lamps_total = index.total(),
        "Streetlamp scores written"
    );
    Ok(summary)
}
