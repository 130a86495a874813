//! Polling session clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Clock for one polling lifetime, from loop start to loop stop.
///
/// Sample timestamps are seconds since [`Session::started_at`]. A restart of the
/// loop opens a new session; nothing carries over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    id: u64,
    started_at: Instant,
}

impl Session {
    pub fn start() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(started_at: Instant) -> Self {
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            started_at,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(self.started_at)
    }

    /// Monotonic seconds since the session started.
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_have_distinct_ids() {
        let a = Session::start();
        let b = Session::start();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_elapsed_is_monotonic() {
        let session = Session::start();
        let first = session.elapsed_secs();
        std::thread::sleep(Duration::from_millis(2));
        let second = session.elapsed_secs();
        assert!(second > first);
        assert!(first >= 0.0);
    }
}
