//! Page and failure caps shared by every fetch task

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Why a crawl stopped admitting work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `max-pages` fetches completed
    PageLimit,
    /// `max-failures` non-success fetches recorded
    FailureLimit,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageLimit => f.write_str("page limit reached"),
            Self::FailureLimit => f.write_str("failure limit reached"),
        }
    }
}

/// Point-in-time view of the controller's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitSnapshot {
    pub started: usize,
    pub fetched: usize,
    pub non_success: usize,
    pub stop_reason: Option<StopReason>,
}

impl LimitSnapshot {
    /// Fetches begun but not yet finished
    pub fn in_flight(&self) -> usize {
        self.started.saturating_sub(self.fetched)
    }
}

/// Tracks fetch progress and decides when the crawl stops admitting work
///
/// Fetch slots are reserved with [`LimitController::try_begin_fetch`] before
/// the request goes out, so the number of fetches never exceeds `max_pages`
/// no matter how many tasks race for the last slot. Once stopped, the
/// controller stays stopped.
#[derive(Debug)]
pub struct LimitController {
    max_pages: usize,
    max_failures: usize,
    started: AtomicUsize,
    fetched: AtomicUsize,
    non_success: AtomicUsize,
    stop_reason: OnceLock<StopReason>,
}

impl LimitController {
    pub fn new(max_pages: usize, max_failures: usize) -> Self {
        Self {
            max_pages,
            max_failures,
            started: AtomicUsize::new(0),
            fetched: AtomicUsize::new(0),
            non_success: AtomicUsize::new(0),
            stop_reason: OnceLock::new(),
        }
    }

    /// Returns false once either cap has been reached
    pub fn should_admit(&self) -> bool {
        self.stop_reason.get().is_none()
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason.get().copied()
    }

    /// Reserves a fetch slot, returning false if none remain
    pub fn try_begin_fetch(&self) -> bool {
        if !self.should_admit() {
            return false;
        }

        self.started
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |started| {
                (started < self.max_pages).then_some(started + 1)
            })
            .is_ok()
    }

    /// Records the end of a fetch started with [`Self::try_begin_fetch`]
    ///
    /// Returns the stop reason if this call is the one that stopped the crawl.
    pub fn finish_fetch(&self, success: bool) -> Option<StopReason> {
        let fetched = self.fetched.fetch_add(1, Ordering::SeqCst) + 1;
        let non_success = if success {
            self.non_success.load(Ordering::SeqCst)
        } else {
            self.non_success.fetch_add(1, Ordering::SeqCst) + 1
        };

        if non_success >= self.max_failures {
            return self.stop(StopReason::FailureLimit);
        }
        if fetched >= self.max_pages {
            return self.stop(StopReason::PageLimit);
        }
        None
    }

    /// True while another fetch could still be started
    pub fn has_capacity(&self) -> bool {
        self.should_admit() && self.started.load(Ordering::SeqCst) < self.max_pages
    }

    pub fn snapshot(&self) -> LimitSnapshot {
        LimitSnapshot {
            started: self.started.load(Ordering::SeqCst),
            fetched: self.fetched.load(Ordering::SeqCst),
            non_success: self.non_success.load(Ordering::SeqCst),
            stop_reason: self.stop_reason(),
        }
    }

    fn stop(&self, reason: StopReason) -> Option<StopReason> {
        match self.stop_reason.set(reason) {
            Ok(()) => {
                let snapshot = self.snapshot();
                tracing::info!(
                    "Stopping crawl: {} ({} fetched, {} non-success)",
                    reason,
                    snapshot.fetched,
                    snapshot.non_success
                );
                Some(reason)
            }
            Err(_) => None,
        }
    }
}
