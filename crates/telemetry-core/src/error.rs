//! Telemetry error taxonomy.

use thiserror::Error;

/// Errors raised while acquiring frames or resolving telemetry values.
///
/// Acquisition errors ([`is_acquisition_error`](Self::is_acquisition_error))
/// never leave the polling loop; they drive it into backoff. Resolution errors
/// are returned to whoever called `resolve`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TelemetryError {
    #[error("Telemetry source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Malformed telemetry frame: expected {expected} bytes, got {actual}")]
    MalformedFrame { expected: usize, actual: usize },

    #[error("Clock anomaly (elapsed {elapsed_secs}s): {reason}")]
    ClockAnomaly { elapsed_secs: f32, reason: String },

    #[error("Unknown telemetry value: {0}")]
    UnknownTelemetryValue(String),

    #[error("Polling thread error: {0}")]
    PollingThread(String),
}

impl TelemetryError {
    pub fn source_unavailable(reason: impl Into<String>) -> Self {
        Self::SourceUnavailable(reason.into())
    }

    pub fn clock_anomaly(elapsed_secs: f32, reason: impl Into<String>) -> Self {
        Self::ClockAnomaly {
            elapsed_secs,
            reason: reason.into(),
        }
    }

    pub fn unknown_value(name: impl Into<String>) -> Self {
        Self::UnknownTelemetryValue(name.into())
    }

    /// Whether this error belongs to frame acquisition (and therefore triggers backoff).
    pub fn is_acquisition_error(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable(_) | Self::MalformedFrame { .. }
        )
    }
}
