//! Core error types

use thiserror::Error;

/// Core error type for GeoFix
#[derive(Debug, Error)]
pub enum GeoError {
    /// Coordinate outside [-90, 90] x [-180, 180] or not finite
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Configuration rejected during validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[cfg(feature = "config-file")]
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for core operations.
pub type GeoResult<T> = Result<T, GeoError>;
