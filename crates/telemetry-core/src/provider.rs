//! Host-facing provider contract.
//!
//! The host application drives a provider through [`TelemetryProvider`] and
//! consumes [`TelemetryInfo`] snapshots delivered once per acquired frame.
//! Registration with the host and its plugin lifecycle live outside this crate.

use crate::{NamedValue, TelemetryError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Polling loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum LoopState {
    #[default]
    Stopped = 0,
    Running = 1,
    ErrorBackoff = 2,
}

impl LoopState {
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Running,
            2 => Self::ErrorBackoff,
            _ => Self::Stopped,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_active(self) -> bool {
        !matches!(self, Self::Stopped)
    }
}

/// Static descriptive metadata shown by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    pub name: String,
    pub author: String,
    pub version: String,
    pub banner_image: String,
    pub icon_image: String,
    /// Advertised samples per second. Informational only; the polling cadence is
    /// set by the loop's own interval.
    pub update_frequency_hz: u32,
}

impl ProviderMetadata {
    pub fn nominal_interval(&self) -> Duration {
        if self.update_frequency_hz == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs(1) / self.update_frequency_hz
    }
}

/// A resolver-capable snapshot bound to one (current, previous) sample pair.
pub trait TelemetryInfo: Send + Sync {
    /// Resolve a telemetry value by its case-sensitive name.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::UnknownTelemetryValue`] when the name is not
    /// known or its value is absent, and [`TelemetryError::ClockAnomaly`] when a
    /// rate cannot be derived from the bound sample pair.
    fn resolve(&self, name: &str) -> Result<NamedValue, TelemetryError>;
}

/// Lifecycle and query surface a telemetry provider exposes to its host.
pub trait TelemetryProvider: Send {
    type Update: TelemetryInfo;
    type Subscription;

    fn metadata(&self) -> &ProviderMetadata;

    /// Every name [`TelemetryInfo::resolve`] accepts for a valid sample pair.
    fn value_names(&self) -> BTreeSet<&'static str>;

    /// Start polling. A no-op while already started.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::PollingThread`] if the polling context cannot be spawned.
    fn start(&mut self) -> Result<(), TelemetryError>;

    /// Stop polling and wait for the polling context to exit.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::PollingThread`] if the polling context panicked.
    fn stop(&mut self) -> Result<(), TelemetryError>;

    fn is_running(&self) -> bool;

    fn is_connected(&self) -> bool;

    /// Register a new consumer of published updates.
    fn subscribe(&self) -> Self::Subscription;
}
