//! Core telemetry contracts for Falcon BMS telemetry providers.
//!
//! ## Modules
//! - `value` - Dynamically typed values (`TelemetryValue`, `NamedValue`)
//! - `error` - Acquisition and resolution errors (`TelemetryError`)
//! - `session` - Per-polling-lifetime clock (`Session`)
//! - `provider` - Host-facing provider traits, loop state and metadata

#![deny(static_mut_refs)]

pub mod error;
pub mod provider;
pub mod session;
pub mod value;

pub use error::TelemetryError;
pub use provider::{LoopState, ProviderMetadata, TelemetryInfo, TelemetryProvider};
pub use session::Session;
pub use value::{NamedValue, TelemetryValue};
