//! Configuration loading and validation.
//!
//! Loads kernel configuration from `./genesis.toml` (or `$GENESIS_CONFIG_PATH`).
//! Environment variables override file values; file values override defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use thiserror::Error;

/// Hard ceiling on the samples a single cycle may process.
///
/// Configuration may lower the limit but never raise it.
pub const MAX_INPUT_LEN: usize = 10_000;

// ── Top-level config ────────────────────────────────────────────

/// Top-level kernel configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Pipeline shape and input bounds.
    pub pipeline: PipelineConfig,
    /// Stabilization operator bounds.
    pub stabilizer: StabilizerConfig,
    /// Log level for hosts that initialise logging from config.
    pub logging: LoggingConfig,
}

/// Configuration validation failures.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A field holds a value outside its allowed range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl KernelConfig {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// Config file path: `$GENESIS_CONFIG_PATH` or `./genesis.toml`.
    /// A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed,
    /// or the result fails validation.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path_with(|key| std::env::var(key).ok());
        let mut config = Self::load_from(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file only, no env overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                Self::from_toml(&contents)
                    .with_context(|| format!("failed to parse config at {}", path.display()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no config file found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "failed to read config at {}: {e}",
                path.display()
            )),
        }
    }

    /// Parse a TOML string into config.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or has wrong field types.
    pub fn from_toml(toml_str: &str) -> anyhow::Result<Self> {
        let config: KernelConfig =
            toml::from_str(toml_str).context("failed to parse config TOML")?;
        Ok(config)
    }

    /// Resolve the config path using a custom env resolver.
    pub fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
        env("GENESIS_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("genesis.toml"))
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function for testability (avoids `set_var` in tests).
    /// Unparseable values are ignored with a warning.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        override_parsed(&env, "GENESIS_MAX_INPUT_LEN", &mut self.pipeline.max_input_len);
        override_parsed(
            &env,
            "GENESIS_FILTER_PERCENTILE",
            &mut self.pipeline.filter_percentile,
        );
        override_parsed(
            &env,
            "GENESIS_MAX_MEMORY_MB",
            &mut self.stabilizer.max_memory_mb,
        );
        if let Some(v) = env("GENESIS_LOG_LEVEL") {
            self.logging.level = v;
        }
    }

    /// Check every bound.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first out-of-range field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let len = self.pipeline.max_input_len;
        if len == 0 || len > MAX_INPUT_LEN {
            return Err(ConfigError::Invalid {
                field: "pipeline.max_input_len",
                reason: format!("{len} is outside [1, {MAX_INPUT_LEN}]"),
            });
        }
        let p = self.pipeline.filter_percentile;
        if !(0.0..=100.0).contains(&p) {
            return Err(ConfigError::Invalid {
                field: "pipeline.filter_percentile",
                reason: format!("{p} is outside [0, 100]"),
            });
        }
        let floor = self.stabilizer.seed_floor;
        if !floor.is_finite() || floor <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "stabilizer.seed_floor",
                reason: format!("{floor} is not a positive finite number"),
            });
        }
        Ok(())
    }
}

fn override_parsed<T: std::str::FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    target: &mut T,
) {
    if let Some(v) = env(var) {
        match v.parse() {
            Ok(n) => *target = n,
            Err(_) => tracing::warn!(var, value = %v, "ignoring invalid env override"),
        }
    }
}

// ── Sections ────────────────────────────────────────────────────

/// Pipeline shape and input bounds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Inputs longer than this are rejected with the limit sentinel.
    /// Capped at [`MAX_INPUT_LEN`].
    pub max_input_len: usize,
    /// Spectral samples below this magnitude percentile are zeroed.
    pub filter_percentile: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_input_len: MAX_INPUT_LEN,
            filter_percentile: 90.0,
        }
    }
}

/// Stabilization operator bounds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    /// Seeds are raised to at least this value.
    pub seed_floor: f64,
    /// Footprint ceiling for a single value, in megabytes.
    pub max_memory_mb: u64,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            seed_floor: 0.001,
            max_memory_mb: 100,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Tracing filter directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}
