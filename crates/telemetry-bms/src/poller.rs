//! Background polling loop and the host-facing Falcon provider.
//!
//! One dedicated thread reads the source at the configured interval, turns each
//! frame into a [`Sample`], pairs it with the sample before it and publishes a
//! [`TelemetryUpdate`] to every subscriber. While the source is unavailable the
//! loop sits in [`LoopState::ErrorBackoff`] and retries after the backoff delay.

use crate::config::{ConfigError, ProviderConfig, default_metadata};
use crate::resolver::{TelemetryUpdate, value_names};
use crate::sample::{Sample, SampleBuilder};
use crate::source::{RawFrameSource, default_source};
use crossbeam::channel::{
    self, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError,
};
use falcon_telemetry_core::{
    LoopState, ProviderMetadata, Session, TelemetryError, TelemetryProvider,
};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

type SharedSource = Arc<Mutex<Box<dyn RawFrameSource>>>;
type Subscribers = Arc<Mutex<Vec<Sender<TelemetryUpdate>>>>;

/// Counters accumulated over the provider's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProviderStats {
    pub frames_published: u64,
    pub read_failures: u64,
    pub sessions_started: u64,
}

#[derive(Debug, Default)]
struct StatsCounters {
    frames_published: AtomicU64,
    read_failures: AtomicU64,
    sessions_started: AtomicU64,
}

impl StatsCounters {
    fn snapshot(&self) -> ProviderStats {
        ProviderStats {
            frames_published: self.frames_published.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            sessions_started: self.sessions_started.load(Ordering::Relaxed),
        }
    }
}

/// Telemetry provider for Falcon BMS.
pub struct FalconTelemetryProvider {
    config: ProviderConfig,
    metadata: ProviderMetadata,
    source: SharedSource,
    state: Arc<AtomicU8>,
    connected: Arc<AtomicBool>,
    subscribers: Subscribers,
    counters: Arc<StatsCounters>,
    shutdown_tx: Option<Sender<()>>,
    poll_thread: Option<JoinHandle<()>>,
}

impl FalconTelemetryProvider {
    pub fn new(config: ProviderConfig, source: Box<dyn RawFrameSource>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            metadata: default_metadata(),
            source: Arc::new(Mutex::new(source)),
            state: Arc::new(AtomicU8::new(LoopState::Stopped.as_u8())),
            connected: Arc::new(AtomicBool::new(false)),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            counters: Arc::new(StatsCounters::default()),
            shutdown_tx: None,
            poll_thread: None,
        })
    }

    /// Provider reading from the platform default source for `config`.
    pub fn from_config(config: ProviderConfig) -> Result<Self, ConfigError> {
        let source = default_source(&config);
        Self::new(config, source)
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn state(&self) -> LoopState {
        LoopState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn stats(&self) -> ProviderStats {
        self.counters.snapshot()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl TelemetryProvider for FalconTelemetryProvider {
    type Update = TelemetryUpdate;
    type Subscription = Receiver<TelemetryUpdate>;

    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    fn value_names(&self) -> BTreeSet<&'static str> {
        value_names()
    }

    fn start(&mut self) -> Result<(), TelemetryError> {
        if self.poll_thread.is_some() {
            debug!("Falcon polling already started");
            return Ok(());
        }

        let (shutdown_tx, shutdown_rx) = channel::bounded(1);
        let ctx = PollContext {
            source: Arc::clone(&self.source),
            state: Arc::clone(&self.state),
            connected: Arc::clone(&self.connected),
            subscribers: Arc::clone(&self.subscribers),
            counters: Arc::clone(&self.counters),
            shutdown_rx,
            poll_interval: self.config.poll_interval(),
            backoff: self.config.backoff(),
        };

        self.state
            .store(LoopState::Running.as_u8(), Ordering::Release);
        let poll_thread = thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || poll_thread_main(ctx))
            .map_err(|e| {
                self.state
                    .store(LoopState::Stopped.as_u8(), Ordering::Release);
                TelemetryError::PollingThread(format!("Failed to spawn polling thread: {e}"))
            })?;

        self.shutdown_tx = Some(shutdown_tx);
        self.poll_thread = Some(poll_thread);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), TelemetryError> {
        let Some(poll_thread) = self.poll_thread.take() else {
            return Ok(());
        };

        info!("Stopping Falcon polling");
        // Disconnecting the channel wakes the loop out of any wait.
        drop(self.shutdown_tx.take());

        let joined = poll_thread.join();
        self.state
            .store(LoopState::Stopped.as_u8(), Ordering::Release);
        self.connected.store(false, Ordering::Release);

        match joined {
            Ok(()) => Ok(()),
            Err(_) => {
                error!("Falcon polling thread panicked");
                Err(TelemetryError::PollingThread(
                    "polling thread panicked".to_string(),
                ))
            }
        }
    }

    fn is_running(&self) -> bool {
        self.state() == LoopState::Running
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn subscribe(&self) -> Receiver<TelemetryUpdate> {
        let (tx, rx) = channel::bounded(self.config.subscriber_capacity);
        self.subscribers.lock().push(tx);
        rx
    }
}

impl Drop for FalconTelemetryProvider {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Falcon provider stopped with error: {e}");
        }
    }
}

struct PollContext {
    source: SharedSource,
    state: Arc<AtomicU8>,
    connected: Arc<AtomicBool>,
    subscribers: Subscribers,
    counters: Arc<StatsCounters>,
    shutdown_rx: Receiver<()>,
    poll_interval: Duration,
    backoff: Duration,
}

impl PollContext {
    fn set_state(&self, state: LoopState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    /// Sleep for `duration`; returns true once shutdown is requested.
    fn wait(&self, duration: Duration) -> bool {
        !matches!(
            self.shutdown_rx.recv_timeout(duration),
            Err(RecvTimeoutError::Timeout)
        )
    }

    fn shutdown_requested(&self) -> bool {
        !matches!(self.shutdown_rx.try_recv(), Err(TryRecvError::Empty))
    }

    fn publish(&self, update: TelemetryUpdate) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| match tx.try_send(update.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!(sequence = update.sequence, "Subscriber queue full, dropping update");
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
    }
}

fn poll_thread_main(ctx: PollContext) {
    let session = Session::start();
    ctx.counters.sessions_started.fetch_add(1, Ordering::Relaxed);
    let source_name = ctx.source.lock().describe();
    info!(session = session.id(), source = %source_name, "Falcon polling started");

    let mut previous: Option<Arc<Sample>> = None;
    let mut sequence = 0u64;
    let mut consecutive_failures = 0u32;

    loop {
        if ctx.shutdown_requested() {
            break;
        }

        let read = ctx.source.lock().read();
        match read {
            Ok(frame) => {
                if consecutive_failures > 0 {
                    info!(
                        session = session.id(),
                        failures = consecutive_failures,
                        "Falcon telemetry source recovered"
                    );
                    consecutive_failures = 0;
                }
                ctx.connected.store(true, Ordering::Release);
                ctx.set_state(LoopState::Running);

                let current = Arc::new(SampleBuilder::build(&frame, session.elapsed_secs()));
                let update = TelemetryUpdate {
                    current: Arc::clone(&current),
                    previous: previous.take(),
                    frame: Arc::new(frame),
                    session,
                    sequence,
                };
                ctx.publish(update);
                ctx.counters.frames_published.fetch_add(1, Ordering::Relaxed);
                sequence = sequence.wrapping_add(1);
                previous = Some(current);

                if ctx.wait(ctx.poll_interval) {
                    break;
                }
            }
            Err(e) => {
                ctx.counters.read_failures.fetch_add(1, Ordering::Relaxed);
                ctx.connected.store(false, Ordering::Release);
                ctx.set_state(LoopState::ErrorBackoff);
                consecutive_failures = consecutive_failures.saturating_add(1);
                // One skipped cycle keeps the pair; a longer gap breaks it.
                if consecutive_failures > 1 {
                    previous = None;
                }
                if consecutive_failures == 1 {
                    if e.is_acquisition_error() {
                        warn!(
                            "Falcon telemetry unavailable ({e}), retrying every {:?}",
                            ctx.backoff
                        );
                    } else {
                        error!("Unexpected error reading Falcon telemetry: {e}");
                    }
                } else {
                    debug!("Falcon telemetry still unavailable: {e}");
                }

                if ctx.wait(ctx.backoff) {
                    break;
                }
                ctx.set_state(LoopState::Running);
            }
        }
    }

    ctx.connected.store(false, Ordering::Release);
    info!(
        session = session.id(),
        frames = sequence,
        "Falcon polling stopped"
    );
}
