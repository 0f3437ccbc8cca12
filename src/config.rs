//! Pipeline configuration: file locations and property/column names.
//!
//! Every field has a default matching the standard data layout, so an empty
//! JSON object (or no config file at all) is a valid configuration:
//! ```json
//! {
//!   "paths": { "lamps_csv": "data/streetlights/Street_Lights.csv" },
//!   "fields": { "segment_id": "STREETSEGID" },
//!   "progress_interval": 10000
//! }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PipelinePaths,
    pub fields: FieldNames,
    /// Log a progress line every this many features (0 disables).
    pub progress_interval: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            paths: PipelinePaths::default(),
            fields: FieldNames::default(),
            progress_interval: 10_000,
        }
    }
}

/// Input, intermediate and output files for each stage.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelinePaths {
    pub lamps_csv: PathBuf,
    pub centerlines: PathBuf,
    pub centerlines_with_length: PathBuf,
    pub centerlines_with_score: PathBuf,
}

impl Default for PipelinePaths {
    fn default() -> Self {
        Self {
            lamps_csv: "data/streetlights/Street_Lights.csv".into(),
            centerlines: "data/streets/Street_Centerlines.geojson".into(),
            centerlines_with_length:
                "data/streets/processed/Street_Centerlines_with_length.geojson".into(),
            centerlines_with_score:
                "data/streets/processed/Street_Centerlines_with_lamp_score.geojson".into(),
        }
    }
}

/// Column and property names the stages read and write.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    /// Segment identifier column in the streetlight CSV.
    pub lamp_segment_id: String,
    /// Segment identifier property on centerline features.
    pub segment_id: String,
    pub street_name: String,
    pub length: String,
    pub score: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            lamp_segment_id: "STREETSEGMID".to_string(),
            segment_id: "STREETSEGID".to_string(),
            street_name: "FULLNAME".to_string(),
            length: "segment_length_m".to_string(),
            score: "streetlamp_score".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{path}'"))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("invalid config file '{path}'"))?;
        Ok(config)
    }
}
