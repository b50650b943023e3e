//! Series and config persistence — file I/O across sessions.

use std::io;

use harmonia::config::AppConfig;
use harmonia::harmonic::{
    load_series, load_series_or_default, reset_series, save_series, Harmonic, HarmonicSeries,
    HARMONICS_VERSION,
};
use harmonia::synth::MeanDivisor;

#[test]
fn edited_series_survives_a_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("harmonics.json");

    let series = HarmonicSeries::default()
        .with_amplify(2, 0.4)
        .with_shift(2, 0.75);
    save_series(&path, &series).unwrap();

    let loaded = load_series(&path).unwrap().unwrap();
    assert_eq!(loaded, series);
    assert_eq!(loaded.get(2).unwrap().shift, 0.75);
}

#[test]
fn file_carries_version_tag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("harmonics.json");
    save_series(&path, &HarmonicSeries::square()).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["version"], HARMONICS_VERSION);
    assert_eq!(value["harmonics"].as_array().unwrap().len(), 16);
}

#[test]
fn other_version_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("harmonics.json");
    std::fs::write(
        &path,
        r#"{"version": 99, "harmonics": "laid out some other way"}"#,
    )
    .unwrap();

    assert!(load_series(&path).unwrap().is_none());
    let series = load_series(&path).unwrap().unwrap_or_default();
    assert_eq!(series, HarmonicSeries::default());
}

#[test]
fn wrong_shape_series_is_an_error_but_explorer_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("harmonics.json");
    std::fs::write(&path, r#"{"version":1,"harmonics":[{"index":0}]}"#).unwrap();

    let err = load_series(&path).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert_eq!(load_series_or_default(&path), HarmonicSeries::default());
}

#[test]
fn missing_series_falls_back_quietly() {
    let dir = tempfile::tempdir().unwrap();
    let series = load_series_or_default(&dir.path().join("absent.json"));
    assert_eq!(series, HarmonicSeries::default());
}

#[test]
fn arbitrary_length_series_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("harmonics.json");
    std::fs::write(
        &path,
        r#"{"version": 1, "harmonics": [
            {"index": 0, "amplify": 1.0, "shift": 0.0},
            {"index": 9, "amplify": 0.3, "shift": 0.5},
            {"index": 4, "amplify": 0.2, "shift": 0.1}
        ]}"#,
    )
    .unwrap();

    let series = load_series(&path).unwrap().unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series.get(1), Some(&Harmonic::new(9, 0.3, 0.5)));
    assert_eq!(series.max_multiplier(), 10);
}

#[test]
fn reset_then_load_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("harmonics.json");
    save_series(&path, &HarmonicSeries::triangle()).unwrap();

    let fresh = reset_series(&path).unwrap();
    assert_eq!(fresh, HarmonicSeries::default());
    assert!(!path.exists());
    assert!(load_series(&path).unwrap().is_none());
}

#[test]
fn config_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(
        &path,
        "polar_discretization: 360\noversampling: 4\nmean_divisor: samples\n",
    )
    .unwrap();

    let config = AppConfig::load_from(&path).unwrap();
    assert_eq!(config.polar_discretization, 360);
    assert_eq!(config.polar().oversampling, 4.0);
    assert_eq!(config.mean_divisor, MeanDivisor::Samples);
    assert_eq!(config.waveform_discretization, 800);
}

#[test]
fn missing_config_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = AppConfig::load_from(&dir.path().join("absent.yaml")).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
}
