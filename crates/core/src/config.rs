//! Configuration management for GeoFix.
//!
//! Defaults mirror the field constants the acquisition layer has always used:
//! a 30 second live-fix deadline, 10 second update interval, 5 second fastest
//! interval and a 10 meter minimum displacement.

use crate::error::{GeoError, GeoResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoFixConfig {
    /// Fix acquisition parameters
    pub acquisition: AcquisitionConfig,
    /// Logging parameters
    pub logging: LoggingConfig,
}

/// Requested accuracy/power trade-off for live updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePriority {
    /// Best available accuracy (GPS)
    HighAccuracy,
    /// Block-level accuracy
    Balanced,
    /// City-level accuracy
    LowPower,
}

/// Parameters of a continuous-update subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveRequestConfig {
    /// Accuracy/power trade-off
    pub priority: UpdatePriority,
    /// Desired update interval in milliseconds
    pub interval_ms: u64,
    /// Fastest interval the consumer can handle in milliseconds
    pub fastest_interval_ms: u64,
    /// Minimum displacement between updates in meters
    pub min_displacement_m: f32,
}

impl LiveRequestConfig {
    /// Desired update interval
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Fastest accepted update interval
    pub fn fastest_interval(&self) -> Duration {
        Duration::from_millis(self.fastest_interval_ms)
    }
}

impl Default for LiveRequestConfig {
    fn default() -> Self {
        Self {
            priority: UpdatePriority::HighAccuracy,
            interval_ms: 10_000,
            fastest_interval_ms: 5_000,
            min_displacement_m: 10.0,
        }
    }
}

/// Fix acquisition configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Deadline for the first live update in milliseconds
    pub timeout_ms: u64,
    /// Live subscription parameters
    pub live: LiveRequestConfig,
}

impl AcquisitionConfig {
    /// Deadline for the first live update
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Reject configurations the resolver cannot honor.
    pub fn validate(&self) -> GeoResult<()> {
        if self.timeout_ms == 0 {
            return Err(GeoError::Config(
                "acquisition.timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.live.fastest_interval_ms > self.live.interval_ms {
            return Err(GeoError::Config(format!(
                "acquisition.live.fastest_interval_ms ({}) exceeds interval_ms ({})",
                self.live.fastest_interval_ms, self.live.interval_ms
            )));
        }
        if !self.live.min_displacement_m.is_finite() || self.live.min_displacement_m < 0.0 {
            return Err(GeoError::Config(format!(
                "acquisition.live.min_displacement_m must be a non-negative number, got {}",
                self.live.min_displacement_m
            )));
        }
        Ok(())
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            live: LiveRequestConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl GeoFixConfig {
    /// Load and validate a TOML configuration file.
    #[cfg(feature = "config-file")]
    pub fn from_file<P: AsRef<Path>>(path: P) -> GeoResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML configuration text.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(content: &str) -> GeoResult<Self> {
        let config: GeoFixConfig = toml::from_str(content)?;
        config.acquisition.validate()?;
        Ok(config)
    }

    /// Parse and validate JSON configuration text.
    pub fn from_json_str(content: &str) -> GeoResult<Self> {
        let config: GeoFixConfig = serde_json::from_str(content)?;
        config.acquisition.validate()?;
        Ok(config)
    }

    /// Check whether a path looks like a JSON document.
    pub fn is_json_path<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }
}
