use std::path::PathBuf;

use streetlamp_density::analyzers::analyzer::analyze_segments;
use streetlamp_density::config::PipelineConfig;
use streetlamp_density::density::join_density;
use streetlamp_density::lamps::LampCountIndex;
use streetlamp_density::length::calculate_lengths;
use streetlamp_density::output::write_report;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn config_in(dir: &std::path::Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.paths.lamps_csv = fixture("Street_Lights.csv");
    config.paths.centerlines = fixture("Street_Centerlines.geojson");
    config.paths.centerlines_with_length = dir.join("processed/with_length.geojson");
    config.paths.centerlines_with_score = dir.join("processed/with_score.geojson");
    config.progress_interval = 2;
    config
}

fn read_features(path: &std::path::Path) -> Vec<serde_json::Value> {
    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(doc["type"], "FeatureCollection");
    doc["features"].as_array().unwrap().clone()
}

#[test]
fn test_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let lengths = calculate_lengths(&config).unwrap();
    assert_eq!(lengths.features, 4);
    assert_eq!(lengths.zero_length, 1);

    let index = LampCountIndex::from_path(&config.paths.lamps_csv, &config.fields.lamp_segment_id)
        .unwrap();
    assert_eq!(index.total(), 6);
    assert_eq!(index.count("1001"), 3);

    let joined = join_density(&config, &index).unwrap();
    assert_eq!(joined.features, 4);
    assert_eq!(joined.matched, 3);

    let with_length = read_features(&config.paths.centerlines_with_length);
    let with_score = read_features(&config.paths.centerlines_with_score);
    assert_eq!(with_length.len(), with_score.len());

    for (before, after) in with_length.iter().zip(&with_score) {
        let before = before["properties"].as_object().unwrap();
        let after = after["properties"].as_object().unwrap();
        assert_eq!(before["STREETSEGID"], after["STREETSEGID"]);
        for (key, value) in before {
            assert_eq!(after.get(key), Some(value), "property {key} changed");
        }
        assert_eq!(after.len(), before.len() + 1);

        let length = after["segment_length_m"].as_f64().unwrap();
        let score = after["streetlamp_score"].as_f64().unwrap();
        let lamps = index.count(&after["STREETSEGID"].to_string());
        if length > 0.0 {
            assert!((score - lamps as f64 / length).abs() < 1e-12);
        } else {
            assert_eq!(score, 0.0);
        }
    }

    // 1004 has a lamp but no geometry.
    assert_eq!(with_score[3]["properties"]["segment_length_m"].as_f64(), Some(0.0));
    assert_eq!(with_score[3]["properties"]["streetlamp_score"].as_f64(), Some(0.0));

    let report = analyze_segments(&config).unwrap();
    assert_eq!(report.lamp_segments, 4);
    assert_eq!(report.street_segments, 4);
    assert_eq!(report.zero_score_segments, 2);
    assert_eq!(report.coverage.geometry_only.iter().collect::<Vec<_>>(), vec!["1003"]);
    assert_eq!(report.coverage.lamp_only.iter().collect::<Vec<_>>(), vec!["2999"]);
    assert_eq!(report.distribution.get(&1), Some(&3));
    assert_eq!(report.distribution.get(&3), Some(&1));

    let names: Vec<&str> = report
        .zero_score_samples
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(names, vec!["Unknown", "G PL NW"]);

    let mut text = Vec::new();
    write_report(&mut text, &report).unwrap();
    let text = String::from_utf8(text).unwrap();
    assert!(text.contains("Segments in lamp data but not in GeoJSON: 1"));
    assert!(text.contains("1004, G PL NW, 0.0m"));
}

#[test]
fn test_unsupported_geometry_aborts_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    let input = dir.path().join("points.geojson");
    std::fs::write(
        &input,
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"STREETSEGID":1},"geometry":{"type":"Point","coordinates":[0,0]}}]}"#,
    )
    .unwrap();
    config.paths.centerlines = input;

    assert!(calculate_lengths(&config).is_err());
    assert!(!config.paths.centerlines_with_length.exists());
}
