//! Acquisition failure taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Stable reason code attached to every failed acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    /// Neither fine nor coarse location access is granted
    PermissionDenied,
    /// Provider rejected the call despite apparent permission
    SecurityError,
    /// No live fix arrived before the deadline
    Timeout,
    /// Provider call itself failed, or the resolver was destroyed
    ProviderUnavailable,
    /// Acquisition was cancelled before resolving
    Cancelled,
}

impl FailureReason {
    /// Numeric code for programmatic branching across FFI boundaries.
    pub fn code(&self) -> u8 {
        match self {
            FailureReason::PermissionDenied => 1,
            FailureReason::SecurityError => 2,
            FailureReason::Timeout => 3,
            FailureReason::ProviderUnavailable => 4,
            FailureReason::Cancelled => 5,
        }
    }

    /// Upper snake case label
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::PermissionDenied => "PERMISSION_DENIED",
            FailureReason::SecurityError => "SECURITY_ERROR",
            FailureReason::Timeout => "TIMEOUT",
            FailureReason::ProviderUnavailable => "PROVIDER_UNAVAILABLE",
            FailureReason::Cancelled => "CANCELLED",
        }
    }

    fn default_message(&self) -> &'static str {
        match self {
            FailureReason::PermissionDenied => "location permission not granted",
            FailureReason::SecurityError => "location provider rejected the request",
            FailureReason::Timeout => "timed out waiting for a live location fix",
            FailureReason::ProviderUnavailable => "location provider unavailable",
            FailureReason::Cancelled => "location request cancelled",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of one acquisition attempt.
///
/// The message is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(from = "AcquisitionErrorRecord")]
#[error("{reason}: {message}")]
pub struct AcquisitionError {
    /// Reason code
    pub reason: FailureReason,
    /// Human-readable message
    pub message: String,
}

#[derive(Deserialize)]
struct AcquisitionErrorRecord {
    reason: FailureReason,
    #[serde(default)]
    message: String,
}

impl From<AcquisitionErrorRecord> for AcquisitionError {
    fn from(record: AcquisitionErrorRecord) -> Self {
        Self::new(record.reason, record.message)
    }
}

impl AcquisitionError {
    /// Create an error, substituting the reason's default text for an empty message.
    pub fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            reason.default_message().to_string()
        } else {
            message
        };
        Self { reason, message }
    }

    /// Location permission missing
    pub fn permission_denied() -> Self {
        Self::new(FailureReason::PermissionDenied, "")
    }

    /// Provider raised a security fault
    pub fn security(message: impl Into<String>) -> Self {
        Self::new(FailureReason::SecurityError, message)
    }

    /// Deadline elapsed before the first live update
    pub fn timeout(after: Duration) -> Self {
        Self::new(
            FailureReason::Timeout,
            format!("no live location fix within {} ms", after.as_millis()),
        )
    }

    /// Provider call failed
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(FailureReason::ProviderUnavailable, message)
    }

    /// Request cancelled before resolution
    pub fn cancelled() -> Self {
        Self::new(FailureReason::Cancelled, "")
    }

    /// Numeric reason code
    pub fn code(&self) -> u8 {
        self.reason.code()
    }
}

/// Synchronous faults a [`crate::LocationProvider`] may raise.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Authorization revoked or otherwise refused at call time
    #[error("Security error: {0}")]
    Security(String),

    /// Provider could not service the call
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

impl From<ProviderError> for AcquisitionError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Security(message) => AcquisitionError::security(message),
            ProviderError::Unavailable(message) => AcquisitionError::unavailable(message),
        }
    }
}
