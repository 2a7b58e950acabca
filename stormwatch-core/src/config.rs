//! Configuration file support for Stormwatch
//!
//! Loads engine configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.stormwatchrc.json` in the working directory
//! 3. `stormwatch.config.json` in the working directory
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::memory::DEFAULT_MEMORY_CAPACITY;
use crate::risk::RiskThresholds;
use crate::trends::{DEFAULT_TREND_WINDOW, MIN_TREND_SAMPLES};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const RC_FILE_NAME: &str = ".stormwatchrc.json";
pub const CONFIG_FILE_NAME: &str = "stormwatch.config.json";

const MAX_MEMORY_CAPACITY: usize = 1000;
const MAX_TREND_WINDOW: usize = 50;
pub const DEFAULT_LOCATION: &str = "Unspecified location";

/// Stormwatch configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StormwatchConfig {
    /// Observations kept in engine memory (default: 50)
    #[serde(default)]
    pub memory_capacity: Option<usize>,

    /// Observations considered by trend analysis (default: 10)
    #[serde(default)]
    pub trend_window: Option<usize>,

    /// Custom risk level thresholds
    #[serde(default)]
    pub thresholds: Option<ThresholdConfig>,

    /// Location label used when none is given on the command line
    #[serde(default)]
    pub location: Option<String>,
}

/// Custom risk level thresholds (inclusive lower bounds)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    /// Score threshold for LOW (default: 15)
    pub low: Option<f64>,
    /// Score threshold for MODERATE (default: 30)
    pub moderate: Option<f64>,
    /// Score threshold for HIGH (default: 50)
    pub high: Option<f64>,
    /// Score threshold for CRITICAL (default: 70)
    pub critical: Option<f64>,
}

impl ThresholdConfig {
    fn merged(&self) -> RiskThresholds {
        let defaults = RiskThresholds::default();
        RiskThresholds {
            low: self.low.unwrap_or(defaults.low),
            moderate: self.moderate.unwrap_or(defaults.moderate),
            high: self.high.unwrap_or(defaults.high),
            critical: self.critical.unwrap_or(defaults.critical),
        }
    }
}

/// Resolved configuration ready to build an engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub memory_capacity: usize,
    pub trend_window: usize,
    pub thresholds: RiskThresholds,
    pub location: String,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            trend_window: DEFAULT_TREND_WINDOW,
            thresholds: RiskThresholds::default(),
            location: DEFAULT_LOCATION.to_string(),
            config_path: None,
        }
    }
}

impl StormwatchConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(capacity) = self.memory_capacity {
            if !(1..=MAX_MEMORY_CAPACITY).contains(&capacity) {
                anyhow::bail!(
                    "memory_capacity must be between 1 and {} (got {})",
                    MAX_MEMORY_CAPACITY,
                    capacity
                );
            }
        }

        if let Some(window) = self.trend_window {
            if !(MIN_TREND_SAMPLES..=MAX_TREND_WINDOW).contains(&window) {
                anyhow::bail!(
                    "trend_window must be between {} and {} (got {})",
                    MIN_TREND_SAMPLES,
                    MAX_TREND_WINDOW,
                    window
                );
            }
        }

        // Validate thresholds are positive, ordered and reachable
        if let Some(ref t) = self.thresholds {
            let merged = t.merged();
            let levels = [
                ("low", merged.low),
                ("moderate", merged.moderate),
                ("high", merged.high),
                ("critical", merged.critical),
            ];
            for (name, value) in levels {
                if !value.is_finite() || value <= 0.0 {
                    anyhow::bail!("thresholds.{} must be positive (got {})", name, value);
                }
            }
            for pair in levels.windows(2) {
                let (lower_name, lower) = pair[0];
                let (upper_name, upper) = pair[1];
                if lower >= upper {
                    anyhow::bail!(
                        "thresholds.{} ({}) must be less than thresholds.{} ({})",
                        lower_name,
                        lower,
                        upper_name,
                        upper
                    );
                }
            }
            if merged.critical > 100.0 {
                anyhow::bail!(
                    "thresholds.critical must not exceed 100 (got {})",
                    merged.critical
                );
            }
        }

        if let Some(ref location) = self.location {
            if location.trim().is_empty() {
                anyhow::bail!("location must not be empty");
            }
        }

        Ok(())
    }

    /// Resolve config into settings ready for use
    pub fn resolve(&self) -> Result<EngineSettings> {
        self.validate()?;

        let defaults = EngineSettings::default();
        Ok(EngineSettings {
            memory_capacity: self.memory_capacity.unwrap_or(defaults.memory_capacity),
            trend_window: self.trend_window.unwrap_or(defaults.trend_window),
            thresholds: self
                .thresholds
                .as_ref()
                .map_or(defaults.thresholds, ThresholdConfig::merged),
            location: self
                .location
                .as_ref()
                .map_or(defaults.location, |l| l.trim().to_string()),
            config_path: None,
        })
    }
}

/// Discover and load a config file from a directory
///
/// Search order:
/// 1. `.stormwatchrc.json`
/// 2. `stormwatch.config.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(root: &Path) -> Result<Option<(StormwatchConfig, PathBuf)>> {
    for name in [RC_FILE_NAME, CONFIG_FILE_NAME] {
        let path = root.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<StormwatchConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: StormwatchConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve engine settings
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from `root`.
/// Returns default settings if nothing is found.
pub fn load_and_resolve(root: &Path, config_path: Option<&Path>) -> Result<EngineSettings> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(root)? {
            Some((config, path)) => (config, Some(path)),
            None => (StormwatchConfig::default(), None),
        }
    };

    let mut settings = config.resolve()?;
    settings.config_path = source_path;
    tracing::debug!(config_path = ?settings.config_path, "engine settings resolved");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config_is_valid() {
        let config = StormwatchConfig::default();
        config.validate().expect("default config should be valid");
        let settings = config.resolve().expect("default config should resolve");
        assert_eq!(settings, EngineSettings::default());
        assert_eq!(settings.memory_capacity, 50);
        assert_eq!(settings.trend_window, 10);
        assert_eq!(settings.thresholds.critical, 70.0);
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "memory_capacity": 120,
            "trend_window": 6,
            "thresholds": {
                "low": 10.0,
                "moderate": 25.0,
                "high": 45.0,
                "critical": 65.0
            },
            "location": "Barangay San Roque"
        }"#;
        let config: StormwatchConfig = serde_json::from_str(json).unwrap();
        let settings = config.resolve().unwrap();
        assert_eq!(settings.memory_capacity, 120);
        assert_eq!(settings.trend_window, 6);
        assert_eq!(settings.thresholds.low, 10.0);
        assert_eq!(settings.thresholds.critical, 65.0);
        assert_eq!(settings.location, "Barangay San Roque");
    }

    #[test]
    fn test_reject_unknown_fields() {
        let json = r#"{"unknown_field": true}"#;
        let result: Result<StormwatchConfig, _> = serde_json::from_str(json);
        assert!(result.is_err(), "unknown fields should be rejected");

        let json = r#"{"thresholds": {"severe": 80.0}}"#;
        let result: Result<StormwatchConfig, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_reject_out_of_range_capacity_and_window() {
        for json in [
            r#"{"memory_capacity": 0}"#,
            r#"{"memory_capacity": 1001}"#,
            r#"{"trend_window": 2}"#,
            r#"{"trend_window": 51}"#,
        ] {
            let config: StormwatchConfig = serde_json::from_str(json).unwrap();
            assert!(config.validate().is_err(), "{} should be rejected", json);
        }
    }

    #[test]
    fn test_reject_negative_threshold() {
        let json = r#"{"thresholds": {"low": -1.0}}"#;
        let config: StormwatchConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_unordered_thresholds() {
        let json = r#"{"thresholds": {"moderate": 55.0}}"#;
        let config: StormwatchConfig = serde_json::from_str(json).unwrap();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("thresholds.moderate"), "{}", err);
    }

    #[test]
    fn test_reject_unreachable_critical() {
        let json = r#"{"thresholds": {"critical": 120.0}}"#;
        let config: StormwatchConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_thresholds_use_defaults_for_rest() {
        let json = r#"{"thresholds": {"critical": 80.0}}"#;
        let config: StormwatchConfig = serde_json::from_str(json).unwrap();
        let settings = config.resolve().unwrap();
        assert_eq!(settings.thresholds.critical, 80.0);
        assert_eq!(settings.thresholds.high, 50.0); // default
        assert_eq!(settings.thresholds.low, 15.0); // default
    }

    #[test]
    fn test_discover_rc_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(RC_FILE_NAME);
        fs::write(&config_path, r#"{"memory_capacity": 20}"#).unwrap();

        let (config, path) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.memory_capacity, Some(20));
        assert_eq!(path, config_path);
    }

    #[test]
    fn test_discover_priority_order() {
        let dir = tempfile::tempdir().unwrap();

        // Create both config files - .stormwatchrc.json should win
        fs::write(dir.path().join(RC_FILE_NAME), r#"{"trend_window": 4}"#).unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{"trend_window": 8}"#).unwrap();

        let (config, _) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(
            config.trend_window,
            Some(4),
            ".stormwatchrc.json should take priority"
        );
    }

    #[test]
    fn test_no_config_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, r#"{"memory_capacity": "lots"}"#).unwrap();

        let err = load_config_file(&config_path).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to parse config file"));
    }

    #[test]
    fn test_load_and_resolve_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_and_resolve(dir.path(), None).unwrap();
        assert!(settings.config_path.is_none());
        assert_eq!(settings.memory_capacity, 50);
    }

    #[test]
    fn test_load_and_resolve_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(RC_FILE_NAME), r#"{"memory_capacity": 5}"#).unwrap();
        let config_path = dir.path().join("custom.json");
        fs::write(&config_path, r#"{"memory_capacity": 200}"#).unwrap();

        let settings = load_and_resolve(dir.path(), Some(&config_path)).unwrap();
        assert_eq!(settings.memory_capacity, 200);
        assert_eq!(settings.config_path, Some(config_path));
    }
}
