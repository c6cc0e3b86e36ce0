//! Config loading and defaults.

use churn_core::{
    config::{DashboardConfig, DatasetConfig, MissingSource, DEFAULT_SEED},
    synthetic::GeneratorPreset,
};
use std::path::PathBuf;

#[test]
fn defaults_select_full_synthetic_dataset() {
    let config = DashboardConfig::default();
    assert_eq!(config.dataset.source_path, None);
    assert_eq!(config.dataset.seed, DEFAULT_SEED);
    assert_eq!(config.dataset.preset, GeneratorPreset::Full);
    assert_eq!(config.dataset.missing_source, MissingSource::Synthetic);
    assert_eq!(config.dataset.synthetic_rows(), 7043);
}

#[test]
fn partial_json_fills_in_defaults() {
    let config: DashboardConfig =
        serde_json::from_str(r#"{"dataset": {"seed": 7, "missing_source": "fail"}}"#).unwrap();
    assert_eq!(config.dataset.seed, 7);
    assert_eq!(config.dataset.missing_source, MissingSource::Fail);
    assert_eq!(config.dataset.preset, GeneratorPreset::Full);

    let empty: DashboardConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, DashboardConfig::default());
}

#[test]
fn loads_from_file() {
    let path = std::env::temp_dir().join(format!("churn-config-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{"dataset": {"source_path": "data/telco.csv", "preset": "compact", "rows": 250}}"#,
    )
    .unwrap();

    let config = DashboardConfig::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(config.dataset.source_path, Some(PathBuf::from("data/telco.csv")));
    assert_eq!(config.dataset.preset, GeneratorPreset::Compact);
    assert_eq!(config.dataset.synthetic_rows(), 250);
}

#[test]
fn missing_file_is_an_error() {
    assert!(DashboardConfig::load("/nonexistent/dashboard.json").is_err());
}

#[test]
fn test_config_is_compact() {
    let dataset: DatasetConfig = DashboardConfig::default_test().dataset;
    assert_eq!(dataset.preset, GeneratorPreset::Compact);
    assert_eq!(dataset.synthetic_rows(), 1000);
}
