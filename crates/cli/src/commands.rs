//! Command implementations.

use crate::error::CliError;
use crate::output::{self, Resolved};
use anyhow::{Context, Result};
use crossbeam::channel::{self, Receiver};
use falcon_telemetry_bms::{
    FalconTelemetryProvider, NamedValueResolver, ProviderConfig, RawFrame, SampleBuilder,
    TelemetryUpdate, default_source, value_names,
};
use falcon_telemetry_core::{TelemetryInfo, TelemetryProvider};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Values printed by `watch` when none are requested.
pub const DEFAULT_WATCH_VALUES: &[&str] = &[
    "pitch",
    "roll",
    "yaw",
    "pitchrate",
    "rollrate",
    "yawrate",
    "airspeed",
    "heave",
];

pub fn names(json: bool) -> Result<()> {
    output::print_names(value_names(), json);
    Ok(())
}

pub fn decode(file: &Path, json: bool) -> Result<()> {
    let bytes = std::fs::read(file)
        .with_context(|| format!("Failed to read frame file {}", file.display()))?;
    let frame = RawFrame::decode(&bytes).map_err(CliError::from)?;
    let sample = SampleBuilder::build(&frame, 0.0);
    let resolver = NamedValueResolver::new(&sample, None, &frame);

    let values: Vec<Resolved> = value_names()
        .into_iter()
        .map(|name| (name.to_string(), resolver.resolve(name)))
        .collect();
    output::print_decoded(&file.display().to_string(), &values, json);
    Ok(())
}

pub struct WatchOptions<'a> {
    pub values: &'a [String],
    pub duration_secs: Option<u64>,
    pub config: Option<&'a Path>,
    pub file: Option<&'a Path>,
}

pub async fn watch(options: WatchOptions<'_>, json: bool) -> Result<()> {
    let requested = requested_values(options.values)?;
    let config = load_config(options.config, options.file)?;

    let mut provider = FalconTelemetryProvider::from_config(config)
        .map_err(|e| CliError::InvalidConfiguration(e.to_string()))?;
    let updates = provider.subscribe();
    provider.start().map_err(CliError::from)?;
    info!("Watching {} value(s)", requested.len());

    let (stop_tx, stop_rx) = channel::bounded::<()>(1);
    let printer =
        tokio::task::spawn_blocking(move || print_updates(&updates, &stop_rx, &requested, json));

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            info!("Interrupted");
        }
        () = wait_for(options.duration_secs.map(Duration::from_secs)) => {
            debug!("Watch duration elapsed");
        }
    }

    drop(stop_tx);
    let printed = printer.await.context("Update printer failed")?;
    provider.stop().map_err(CliError::from)?;
    debug!("Printed {printed} update(s)");

    output::print_stats(&provider.stats(), json);
    Ok(())
}

pub fn capture(out: &Path, config: Option<&Path>, file: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config, file)?;
    let mut source = default_source(&config);
    let frame = source.read().map_err(CliError::from)?;
    let bytes = frame.encode();
    std::fs::write(out, &bytes)
        .with_context(|| format!("Failed to write frame to {}", out.display()))?;

    output::print_capture(
        &source.describe(),
        &out.display().to_string(),
        bytes.len(),
        json,
    );
    Ok(())
}

/// Load provider settings, with `file` overriding the configured source.
pub fn load_config(path: Option<&Path>, file: Option<&Path>) -> Result<ProviderConfig> {
    let mut config = match path {
        Some(path) => ProviderConfig::load(path)
            .map_err(|e| CliError::InvalidConfiguration(e.to_string()))?,
        None => ProviderConfig::default(),
    };
    if let Some(file) = file {
        config.mapped_file = Some(PathBuf::from(file));
    }
    Ok(config)
}

/// Requested names, or the defaults; unknown names are rejected up front.
pub fn requested_values(values: &[String]) -> Result<Vec<String>, CliError> {
    if values.is_empty() {
        return Ok(DEFAULT_WATCH_VALUES.iter().map(ToString::to_string).collect());
    }
    let known = value_names();
    match values.iter().find(|name| !known.contains(name.as_str())) {
        Some(unknown) => Err(CliError::UnknownValue(unknown.clone())),
        None => Ok(values.to_vec()),
    }
}

async fn wait_for(duration: Option<Duration>) {
    match duration {
        Some(duration) => tokio::time::sleep(duration).await,
        None => std::future::pending().await,
    }
}

fn print_updates(
    updates: &Receiver<TelemetryUpdate>,
    stop: &Receiver<()>,
    names: &[String],
    json: bool,
) -> u64 {
    let mut printed = 0u64;
    loop {
        channel::select! {
            recv(stop) -> _ => return printed,
            recv(updates) -> update => {
                let Ok(update) = update else {
                    return printed;
                };
                let values: Vec<Resolved> = names
                    .iter()
                    .map(|name| (name.clone(), update.resolve(name)))
                    .collect();
                output::print_update(update.sequence, update.current.time, &values, json);
                printed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_requested_values_defaults() -> TestResult {
        let values = requested_values(&[])?;
        assert_eq!(values.len(), DEFAULT_WATCH_VALUES.len());
        assert!(values.iter().any(|v| v == "pitchrate"));
        Ok(())
    }

    #[test]
    fn test_requested_values_rejects_unknown() {
        let values = vec!["pitch".to_string(), "warpFactor".to_string()];
        assert!(matches!(
            requested_values(&values),
            Err(CliError::UnknownValue(name)) if name == "warpFactor"
        ));
    }

    #[test]
    fn test_load_config_file_override() -> TestResult {
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join("falcon.yaml");
        std::fs::write(&config_path, "poll_interval_ms: 25\n")?;
        let frame_path = dir.path().join("frame.bin");

        let config = load_config(Some(config_path.as_path()), Some(frame_path.as_path()))?;
        assert_eq!(config.poll_interval_ms, 25);
        assert_eq!(config.mapped_file.as_deref(), Some(frame_path.as_path()));
        Ok(())
    }

    #[test]
    fn test_load_config_invalid() -> TestResult {
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join("falcon.yaml");
        std::fs::write(&config_path, "subscriber_capacity: 0\n")?;
        let err = load_config(Some(config_path.as_path()), None)
            .err()
            .ok_or("expected invalid config")?;
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::InvalidConfiguration(_))
        ));
        Ok(())
    }
}
