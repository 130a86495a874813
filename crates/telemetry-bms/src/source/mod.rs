//! Raw frame acquisition.
//!
//! A [`RawFrameSource`] hands back one fresh [`RawFrame`] per call. Sources are
//! read only from the polling thread.

use crate::config::ProviderConfig;
use crate::frame::RawFrame;
use falcon_telemetry_core::TelemetryError;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[cfg(windows)]
mod windows;

#[cfg(windows)]
pub use windows::SharedMemorySource;

pub trait RawFrameSource: Send {
    /// Read the current frame.
    ///
    /// # Errors
    ///
    /// [`TelemetryError::SourceUnavailable`] when the producer is absent and
    /// [`TelemetryError::MalformedFrame`] when fewer than [`RawFrame::SIZE`]
    /// bytes are available.
    fn read(&mut self) -> Result<RawFrame, TelemetryError>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Platform source for `config`: the named mapping on Windows unless a file is
/// configured, the mapped file everywhere else.
pub fn default_source(config: &ProviderConfig) -> Box<dyn RawFrameSource> {
    #[cfg(windows)]
    {
        if config.mapped_file.is_none() {
            return Box::new(SharedMemorySource::new(&config.shared_memory_name));
        }
    }
    Box::new(MappedFileSource::new(config.mapped_file_path()))
}

/// Reads frames from a file, such as a `/dev/shm` bridge or a captured dump.
#[derive(Debug, Clone)]
pub struct MappedFileSource {
    path: PathBuf,
}

impl MappedFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RawFrameSource for MappedFileSource {
    fn read(&mut self) -> Result<RawFrame, TelemetryError> {
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TelemetryError::source_unavailable(format!(
                "{} does not exist",
                self.path.display()
            )),
            _ => TelemetryError::source_unavailable(format!("{}: {e}", self.path.display())),
        })?;

        let mut buffer = Vec::with_capacity(RawFrame::SIZE);
        file.take(RawFrame::SIZE as u64)
            .read_to_end(&mut buffer)
            .map_err(|e| {
                TelemetryError::source_unavailable(format!("{}: {e}", self.path.display()))
            })?;

        RawFrame::decode(&buffer)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Scripted source for tests and demos.
///
/// Steps are consumed in order. Once the script runs out the last frame is
/// repeated; with no frame ever scripted every read fails.
#[derive(Debug, Default)]
pub struct MockFrameSource {
    script: VecDeque<Result<RawFrame, TelemetryError>>,
    last_frame: Option<RawFrame>,
    reads: Arc<AtomicU64>,
}

impl MockFrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_frames(frames: impl IntoIterator<Item = RawFrame>) -> Self {
        let mut source = Self::new();
        source.script.extend(frames.into_iter().map(Ok));
        source
    }

    pub fn with_frame(mut self, frame: RawFrame) -> Self {
        self.script.push_back(Ok(frame));
        self
    }

    pub fn with_error(mut self, error: TelemetryError) -> Self {
        self.script.push_back(Err(error));
        self
    }

    /// Queue `count` [`TelemetryError::SourceUnavailable`] results.
    pub fn with_failures(mut self, count: usize) -> Self {
        for attempt in 0..count {
            self.script.push_back(Err(TelemetryError::source_unavailable(format!(
                "scripted failure {attempt}"
            ))));
        }
        self
    }

    /// Shared counter of `read` calls; stays valid after the source is moved.
    pub fn read_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.reads)
    }
}

impl RawFrameSource for MockFrameSource {
    fn read(&mut self) -> Result<RawFrame, TelemetryError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        match self.script.pop_front() {
            Some(Ok(frame)) => {
                self.last_frame = Some(frame.clone());
                Ok(frame)
            }
            Some(Err(error)) => Err(error),
            None => {
                debug!("mock script exhausted");
                self.last_frame
                    .clone()
                    .ok_or_else(|| TelemetryError::source_unavailable("no frame scripted"))
            }
        }
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
