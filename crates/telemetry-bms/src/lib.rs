//! Falcon BMS telemetry provider.
//!
//! Reads the simulator's `FlightData` block from shared memory, normalizes it
//! into motion samples and serves named values, including angular rates derived
//! from consecutive samples.
//!
//! ```no_run
//! use falcon_telemetry_bms::{FalconTelemetryProvider, ProviderConfig};
//! use falcon_telemetry_core::{TelemetryInfo, TelemetryProvider};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut provider = FalconTelemetryProvider::from_config(ProviderConfig::default())?;
//! let updates = provider.subscribe();
//! provider.start()?;
//! let update = updates.recv()?;
//! println!("{}", update.resolve("pitchrate")?);
//! provider.stop()?;
//! # Ok(())
//! # }
//! ```

#![deny(static_mut_refs)]

pub mod config;
pub mod derived;
pub mod frame;
pub mod poller;
pub mod resolver;
pub mod sample;
pub mod source;

pub use config::{ConfigError, DEFAULT_SHARED_MEMORY_NAME, ProviderConfig, default_metadata};
pub use derived::{DerivedQuantity, DerivedValueEngine, MIN_ELAPSED_SECS};
pub use frame::{RawFrame, display_lines};
pub use poller::{FalconTelemetryProvider, ProviderStats};
pub use resolver::{NamedValueResolver, TelemetryUpdate, value_names};
pub use sample::{KNOTS_TO_KMH, Sample, SampleBuilder};
pub use source::{MappedFileSource, MockFrameSource, RawFrameSource, default_source};

#[cfg(windows)]
pub use source::SharedMemorySource;
