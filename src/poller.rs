// Copyright 2026 Hypermesh Foundation. All rights reserved.
// SAGSIN PathKit - Position Polling

//! Periodic refresh of mobile node positions.
//!
//! [`PositionPoller`] is the merge step: one fetch, one atomic snapshot swap.
//! A failed fetch is logged and swallowed so the next tick simply retries.
//! On native targets [`PollHandle`] drives it from a background thread; on
//! `wasm32` the host's JS timer feeds positions through the facade instead.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::backend::Backend;
use crate::snapshot::SnapshotStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTick {
    /// Fetch succeeded; this many nodes moved.
    Merged(usize),
    /// Fetch failed; the snapshot is unchanged.
    Skipped,
    /// The poller was cancelled; nothing was merged.
    Cancelled,
}

/// Counters shared between a poller and whoever watches it.
#[derive(Debug, Default)]
pub struct PollStats {
    pub ticks: AtomicU64,
    pub failures: AtomicU64,
}

impl PollStats {
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct PositionPoller {
    store: Arc<SnapshotStore>,
    stats: Arc<PollStats>,
    /// Held across the cancel check and the merge, so once `cancel` returns
    /// no merge is running or can start.
    cancelled: Arc<Mutex<bool>>,
}

impl PositionPoller {
    pub fn new(store: Arc<SnapshotStore>) -> Self {
        Self {
            store,
            stats: Arc::new(PollStats::default()),
            cancelled: Arc::new(Mutex::new(false)),
        }
    }

    pub fn stats(&self) -> Arc<PollStats> {
        Arc::clone(&self.stats)
    }

    /// Stop all future merges, including one whose fetch is in flight.
    /// Waits only for a merge already holding the snapshot write.
    pub fn cancel(&self) {
        *self.cancelled.lock().unwrap_or_else(PoisonError::into_inner) = true;
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn poll_once(&self, backend: &dyn Backend) -> PollTick {
        if self.is_cancelled() {
            return PollTick::Cancelled;
        }
        self.stats.ticks.fetch_add(1, Ordering::Relaxed);
        match backend.positions() {
            Ok(updates) => {
                let cancelled = self.cancelled.lock().unwrap_or_else(PoisonError::into_inner);
                if *cancelled {
                    tracing::debug!("poller cancelled during fetch; dropping positions");
                    return PollTick::Cancelled;
                }
                let moved = self.store.merge_positions(&updates);
                drop(cancelled);
                tracing::trace!(moved, "merged node positions");
                PollTick::Merged(moved)
            }
            Err(e) => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %e, "position poll failed; retrying next tick");
                PollTick::Skipped
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::PollHandle;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::sync::mpsc::{self, RecvTimeoutError, Sender};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use super::{PollTick, PositionPoller};
    use crate::backend::Backend;

    /// A running poll loop. Dropping the handle stops it.
    #[derive(Debug)]
    pub struct PollHandle {
        stop_tx: Option<Sender<()>>,
        poller: PositionPoller,
    }

    impl PollHandle {
        /// Poll immediately, then every `interval` until stopped.
        pub fn spawn(poller: PositionPoller, backend: Arc<dyn Backend>, interval: Duration) -> Self {
            let (stop_tx, stop_rx) = mpsc::channel::<()>();
            let worker = poller.clone();
            thread::spawn(move || loop {
                if worker.poll_once(backend.as_ref()) == PollTick::Cancelled {
                    break;
                }
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    // stop() drops the sender, which lands here immediately
                    _ => break,
                }
            });
            Self { stop_tx: Some(stop_tx), poller }
        }

        /// Stop polling. Safe to call any number of times. Once it returns
        /// the snapshot no longer changes, even if a fetch is still in flight.
        pub fn stop(&mut self) {
            self.poller.cancel();
            self.stop_tx.take();
        }

        pub fn is_stopped(&self) -> bool {
            self.poller.is_cancelled()
        }
    }

    impl Drop for PollHandle {
        fn drop(&mut self) {
            self.stop();
        }
    }
}
