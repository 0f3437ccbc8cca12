//! Geodesic length of street centerline geometries.

use anyhow::{Context, Result, bail, ensure};
use geo::{Distance, Geodesic, Point};
use geojson::{Feature, Geometry, JsonObject, JsonValue, Value};
use std::io::{BufRead, Write};
use tracing::info;

use crate::config::PipelineConfig;
use crate::stream::{FeatureCollectionWriter, FeatureReader, normalize_feature, write_collection};

/// Totals for one length pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LengthSummary {
    pub features: usize,
    pub zero_length: usize,
    pub total_m: f64,
}

fn to_point(position: &[f64]) -> Result<Point<f64>> {
    ensure!(
        position.len() >= 2,
        "position must have at least 2 ordinates, found {}",
        position.len()
    );
    let (lon, lat) = (position[0], position[1]);
    ensure!(
        lon.is_finite() && lat.is_finite(),
        "non-finite coordinate [{lon}, {lat}]"
    );
    Ok(Point::new(lon, lat))
}

/// Sum of WGS84 geodesic distances in meters between consecutive vertices.
///
/// Positions are `[longitude, latitude, ...]`; lines with fewer than two
/// vertices have length 0.
pub fn linestring_length(positions: &[Vec<f64>]) -> Result<f64> {
    let points = positions
        .iter()
        .map(|p| to_point(p))
        .collect::<Result<Vec<_>>>()?;
    Ok(points
        .windows(2)
        .map(|pair| Geodesic.distance(pair[0], pair[1]))
        .sum())
}

fn geometry_type(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Length of a LineString or MultiLineString; a missing geometry is 0 m.
pub fn geometry_length(geometry: Option<&Geometry>) -> Result<f64> {
    let Some(geometry) = geometry else {
        return Ok(0.0);
    };
    match &geometry.value {
        Value::LineString(line) => linestring_length(line),
        Value::MultiLineString(parts) => parts
            .iter()
            .map(|part| linestring_length(part))
            .sum::<Result<f64>>(),
        other => bail!("unsupported geometry type {}", geometry_type(other)),
    }
}

/// Adds the length property to every feature read from `features`.
pub fn annotate_lengths<R: BufRead, W: Write>(
    features: FeatureReader<R, Feature>,
    writer: &mut FeatureCollectionWriter<W>,
    length_field: &str,
) -> Result<LengthSummary> {
    let mut summary = LengthSummary::default();

    for feature in features {
        let mut feature = feature?;
        let index = summary.features;
        let length_m = geometry_length(feature.geometry.as_ref())
            .with_context(|| format!("invalid geometry on feature {index}"))?;

        let properties = feature.properties.get_or_insert_with(JsonObject::new);
        properties.insert(length_field.to_string(), JsonValue::from(length_m));
        normalize_feature(&mut feature);
        writer.write_feature(&feature)?;

        summary.features += 1;
        summary.total_m += length_m;
        if length_m <= 0.0 {
            summary.zero_length += 1;
        }
    }

    Ok(summary)
}

/// Reads the raw centerlines and writes the length-enriched collection.
#[tracing::instrument(skip_all, fields(
    input = %config.paths.centerlines.display(),
    output = %config.paths.centerlines_with_length.display(),
))]
pub fn calculate_lengths(config: &PipelineConfig) -> Result<LengthSummary> {
    let features = FeatureReader::open(&config.paths.centerlines)?;
    let summary = write_collection(&config.paths.centerlines_with_length, |writer| {
        annotate_lengths(features, writer, &config.fields.length)
    })?;

    info!(
        features = summary.features,
        zero_length = summary.zero_length,
        total_km = summary.total_m / 1000.0,
        "Segment lengths written"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value as Json;
    use std::io::Cursor;

    fn line(coords: &[[f64; 2]]) -> Vec<Vec<f64>> {
        coords.iter().map(|c| c.to_vec()).collect()
    }

    #[test]
    fn test_degenerate_lines_have_zero_length() {
        assert_eq!(linestring_length(&[]).unwrap(), 0.0);
        assert_eq!(linestring_length(&line(&[[-77.0, 38.9]])).unwrap(), 0.0);
    }

    #[test]
    fn test_thousandth_degree_of_latitude_is_about_111m() {
        let len = linestring_length(&line(&[[0.0, 0.0], [0.0, 0.001]])).unwrap();
        assert!((len - 110.574).abs() < 0.5, "got {len}");
    }

    #[test]
    fn test_length_is_sum_of_pairs() {
        let a = [-77.0365, 38.8977];
        let b = [-77.0350, 38.8990];
        let c = [-77.0330, 38.8995];
        let whole = linestring_length(&line(&[a, b, c])).unwrap();
        let ab = linestring_length(&line(&[a, b])).unwrap();
        let bc = linestring_length(&line(&[b, c])).unwrap();
        assert!((whole - (ab + bc)).abs() < 1e-9);
    }

    #[test]
    fn test_multilinestring_sums_parts() {
        let p1 = line(&[[0.0, 0.0], [0.0, 0.001]]);
        let p2 = line(&[[1.0, 1.0], [1.001, 1.0], [1.001, 1.001]]);
        let expected = linestring_length(&p1).unwrap() + linestring_length(&p2).unwrap();

        let geom = Geometry::new(Value::MultiLineString(vec![p1, p2]));
        let len = geometry_length(Some(&geom)).unwrap();
        assert!((len - expected).abs() < 1e-9);
    }

    #[test]
    fn test_missing_geometry_is_zero() {
        assert_eq!(geometry_length(None).unwrap(), 0.0);
    }

    #[test]
    fn test_unsupported_geometry_is_error() {
        let geom = Geometry::new(Value::Point(vec![0.0, 0.0]));
        let err = geometry_length(Some(&geom)).unwrap_err();
        assert!(err.to_string().contains("Point"));
    }

    #[test]
    fn test_short_position_is_error() {
        assert!(linestring_length(&[vec![0.0, 0.0], vec![1.0]]).is_err());
    }

    #[test]
    fn test_annotate_keeps_properties_and_order() {
        let doc = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"STREETSEGID":"S1","FULLNAME":"A ST"},
             "geometry":{"type":"LineString","coordinates":[[0,0],[0,0.001]]}},
            {"type":"Feature","properties":{"STREETSEGID":"S2"},"geometry":null}]}"#;
        let features = FeatureReader::new(Cursor::new(doc.as_bytes()));
        let mut writer = FeatureCollectionWriter::new(Vec::new()).unwrap();

        let summary = annotate_lengths(features, &mut writer, "segment_length_m").unwrap();
        let out: Json = serde_json::from_slice(&writer.finish().unwrap()).unwrap();

        assert_eq!(summary.features, 2);
        assert_eq!(summary.zero_length, 1);
        let features = out["features"].as_array().unwrap();
        assert_eq!(features[0]["properties"]["STREETSEGID"], "S1");
        assert_eq!(features[0]["properties"]["FULLNAME"], "A ST");
        assert!(features[0]["properties"]["segment_length_m"].as_f64().unwrap() > 110.0);
        assert_eq!(features[1]["properties"]["STREETSEGID"], "S2");
        assert_eq!(features[1]["properties"]["segment_length_m"].as_f64(), Some(0.0));
    }
}
