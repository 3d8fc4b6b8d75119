//! Coverage for config parsing, env overrides and validation.

use std::collections::HashMap;

use genesis_kernel::config::{
    ConfigError, KernelConfig, PipelineConfig, StabilizerConfig, MAX_INPUT_LEN,
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn default_pipeline_values() {
    let pipeline = PipelineConfig::default();
    assert_eq!(pipeline.max_input_len, 10_000);
    assert!((pipeline.filter_percentile - 90.0).abs() < f64::EPSILON);
}

#[test]
fn default_stabilizer_values() {
    let stabilizer = StabilizerConfig::default();
    assert!((stabilizer.seed_floor - 0.001).abs() < f64::EPSILON);
    assert_eq!(stabilizer.max_memory_mb, 100);
}

#[test]
fn parse_partial_config_keeps_defaults() {
    let toml_str = r#"
[pipeline]
max_input_len = 256

[logging]
level = "debug"
"#;
    let config = match KernelConfig::from_toml(toml_str) {
        Ok(config) => config,
        Err(err) => panic!("partial config should parse: {err}"),
    };
    assert_eq!(config.pipeline.max_input_len, 256);
    assert!((config.pipeline.filter_percentile - 90.0).abs() < f64::EPSILON);
    assert_eq!(config.stabilizer, StabilizerConfig::default());
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn parse_empty_config_is_default() {
    let config = KernelConfig::from_toml("").expect("empty config should parse");
    assert_eq!(config, KernelConfig::default());
}

#[test]
fn parse_rejects_wrong_types() {
    let result = KernelConfig::from_toml("[stabilizer]\nmax_memory_mb = \"lots\"\n");
    assert!(result.is_err());
}

#[test]
fn env_overrides_file_values() {
    let mut config =
        KernelConfig::from_toml("[pipeline]\nmax_input_len = 256\n").expect("should parse");
    config.apply_overrides(env_from(&[
        ("GENESIS_MAX_INPUT_LEN", "512"),
        ("GENESIS_FILTER_PERCENTILE", "75.5"),
        ("GENESIS_MAX_MEMORY_MB", "50"),
        ("GENESIS_LOG_LEVEL", "warn"),
    ]));
    assert_eq!(config.pipeline.max_input_len, 512);
    assert!((config.pipeline.filter_percentile - 75.5).abs() < f64::EPSILON);
    assert_eq!(config.stabilizer.max_memory_mb, 50);
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn invalid_env_override_is_ignored() {
    let mut config = KernelConfig::default();
    config.apply_overrides(env_from(&[("GENESIS_MAX_INPUT_LEN", "-3")]));
    assert_eq!(config.pipeline.max_input_len, 10_000);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut config = KernelConfig::default();
    config.pipeline.filter_percentile = 120.0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid {
            field: "pipeline.filter_percentile",
            ..
        })
    ));

    let mut config = KernelConfig::default();
    config.stabilizer.seed_floor = 0.0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid {
            field: "stabilizer.seed_floor",
            ..
        })
    ));

    let mut config = KernelConfig::default();
    config.pipeline.max_input_len = 0;
    assert!(config.validate().is_err());

    let mut config = KernelConfig::default();
    config.pipeline.max_input_len = MAX_INPUT_LEN + 1;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid {
            field: "pipeline.max_input_len",
            ..
        })
    ));
}

#[test]
fn env_cannot_raise_input_cap() {
    let mut config = KernelConfig::default();
    config.apply_overrides(env_from(&[("GENESIS_MAX_INPUT_LEN", "20000")]));
    assert!(config.validate().is_err());

    let mut config = KernelConfig::default();
    config.apply_overrides(env_from(&[("GENESIS_MAX_INPUT_LEN", "64")]));
    assert!(config.validate().is_ok());
    assert_eq!(config.pipeline.max_input_len, 64);
}

#[test]
fn load_from_missing_file_yields_defaults() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let config = KernelConfig::load_from(&tmp.path().join("absent.toml")).expect("defaults");
    assert_eq!(config, KernelConfig::default());
}

#[test]
fn load_from_reads_file() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join("genesis.toml");
    std::fs::write(&path, "[stabilizer]\nmax_memory_mb = 3\n").expect("write config");

    let config = KernelConfig::load_from(&path).expect("should load");
    assert_eq!(config.stabilizer.max_memory_mb, 3);
}

#[test]
fn load_from_reports_parse_errors_with_path() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join("broken.toml");
    std::fs::write(&path, "[pipeline\n").expect("write config");

    let err = match KernelConfig::load_from(&path) {
        Ok(_) => panic!("broken TOML should not load"),
        Err(err) => err,
    };
    assert!(err.to_string().contains("broken.toml"));
}
