//! Error types for falconctl

use falcon_telemetry_core::TelemetryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Telemetry source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Unknown telemetry value: {0}")]
    UnknownValue(String),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::UnknownValue(_) => 3,
            Self::InvalidFrame(_) | Self::InvalidConfiguration(_) => 4,
            Self::SourceUnavailable(_) => 5,
            Self::Provider(_) => 1,
        }
    }
}

impl From<TelemetryError> for CliError {
    fn from(error: TelemetryError) -> Self {
        match error {
            TelemetryError::SourceUnavailable(reason) => Self::SourceUnavailable(reason),
            TelemetryError::MalformedFrame { .. } => Self::InvalidFrame(error.to_string()),
            TelemetryError::UnknownTelemetryValue(name) => Self::UnknownValue(name),
            TelemetryError::ClockAnomaly { .. } | TelemetryError::PollingThread(_) => {
                Self::Provider(error.to_string())
            }
        }
    }
}
