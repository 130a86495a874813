//! Provider configuration and static metadata.

use falcon_telemetry_core::ProviderMetadata;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the shared memory area the simulator publishes `FlightData` into.
pub const DEFAULT_SHARED_MEMORY_NAME: &str = "FalconSharedMemoryArea";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Polling and source settings for a [`FalconTelemetryProvider`](crate::FalconTelemetryProvider).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub shared_memory_name: String,
    /// Read frames from this file instead of the named mapping. Non-Windows
    /// hosts fall back to `/dev/shm/<shared_memory_name>` when unset.
    pub mapped_file: Option<PathBuf>,
    pub poll_interval_ms: u64,
    pub backoff_ms: u64,
    /// Queue depth per subscriber; updates are dropped for a full queue.
    pub subscriber_capacity: usize,
    pub thread_name: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            shared_memory_name: DEFAULT_SHARED_MEMORY_NAME.to_string(),
            mapped_file: None,
            poll_interval_ms: 10,
            backoff_ms: 1000,
            subscriber_capacity: 100,
            thread_name: "falcon-telemetry".to_string(),
        }
    }
}

impl ProviderConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.subscriber_capacity == 0 {
            return Err(ConfigError::Invalid(
                "subscriber_capacity must be greater than zero".to_string(),
            ));
        }
        if self.shared_memory_name.is_empty() && self.mapped_file.is_none() {
            return Err(ConfigError::Invalid(
                "shared_memory_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    /// File the [`MappedFileSource`](crate::MappedFileSource) reads from.
    pub fn mapped_file_path(&self) -> PathBuf {
        self.mapped_file
            .clone()
            .unwrap_or_else(|| Path::new("/dev/shm").join(&self.shared_memory_name))
    }
}

/// Metadata advertised to the host for the Falcon provider.
pub fn default_metadata() -> ProviderMetadata {
    ProviderMetadata {
        name: "Falcon".to_string(),
        author: "Falcon Telemetry Contributors".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        banner_image: "assets/falcon-banner.png".to_string(),
        icon_image: "assets/falcon-icon.png".to_string(),
        update_frequency_hz: 100,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.shared_memory_name, "FalconSharedMemoryArea");
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.backoff(), Duration::from_secs(1));
        assert_eq!(config.subscriber_capacity, 100);
        assert!(config.validate().is_ok());
        assert_eq!(
            config.mapped_file_path(),
            PathBuf::from("/dev/shm/FalconSharedMemoryArea")
        );
    }

    #[test]
    fn test_partial_yaml_uses_defaults() -> TestResult {
        let config = ProviderConfig::from_yaml_str("poll_interval_ms: 20\nmapped_file: /tmp/frame.bin\n")?;
        assert_eq!(config.poll_interval_ms, 20);
        assert_eq!(config.backoff_ms, 1000);
        assert_eq!(config.mapped_file_path(), PathBuf::from("/tmp/frame.bin"));
        Ok(())
    }

    #[test]
    fn test_rejects_zero_interval_and_capacity() {
        assert!(matches!(
            ProviderConfig::from_yaml_str("poll_interval_ms: 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ProviderConfig::from_yaml_str("subscriber_capacity: 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_yaml() {
        assert!(matches!(
            ProviderConfig::from_yaml_str("poll_interval_ms: [fast]"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("falcon.yaml");
        std::fs::write(&path, "thread_name: bms-poller\nbackoff_ms: 250\n")?;
        let config = ProviderConfig::load(&path)?;
        assert_eq!(config.thread_name, "bms-poller");
        assert_eq!(config.backoff(), Duration::from_millis(250));

        assert!(matches!(
            ProviderConfig::load(dir.path().join("missing.yaml")),
            Err(ConfigError::Io { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_metadata() {
        let metadata = default_metadata();
        assert_eq!(metadata.name, "Falcon");
        assert_eq!(metadata.update_frequency_hz, 100);
        assert_eq!(metadata.nominal_interval(), Duration::from_millis(10));
    }
}
