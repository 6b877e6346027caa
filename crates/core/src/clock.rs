//! Clock abstraction for testable time
//!
//! The ledger never reads the wall clock directly. It asks a [`Clock`] for
//! the current time, wrapped in a [`MonotonicClock`] so that step timestamps
//! never move backwards and a failing time source never fails an append.

use crate::types::Timestamp;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

/// Source of the current time in seconds since the Unix epoch
pub trait Clock: Send + Sync {
    /// Read the current time, or `None` if the source is unavailable
    fn try_now(&self) -> Option<Timestamp>;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn try_now(&self) -> Option<Timestamp> {
        (**self).try_now()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn try_now(&self) -> Option<Timestamp> {
        (**self).try_now()
    }
}

/// Wall clock, read through `chrono::Utc`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn try_now(&self) -> Option<Timestamp> {
        Some(Timestamp::now())
    }
}

/// Settable clock for tests
///
/// Clones share the same underlying time, so a test can keep one handle
/// and give another to the ledger.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    secs: Arc<AtomicI64>,
    unavailable: Arc<AtomicBool>,
}

impl ManualClock {
    /// Start at the given time
    pub fn new(start: Timestamp) -> Self {
        Self {
            secs: Arc::new(AtomicI64::new(start.as_secs())),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Jump to an absolute time (may move backwards)
    pub fn set(&self, ts: Timestamp) {
        self.secs.store(ts.as_secs(), Ordering::SeqCst);
    }

    /// Move forward by `secs` seconds
    pub fn advance(&self, secs: i64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }

    /// Simulate the time source going away (or coming back)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn try_now(&self) -> Option<Timestamp> {
        if self.unavailable.load(Ordering::SeqCst) {
            return None;
        }
        Some(Timestamp::from_secs(self.secs.load(Ordering::SeqCst)))
    }
}

/// Non-decreasing view over any [`Clock`]
///
/// `now()` returns the greater of the source's reading and the last value
/// handed out. If the source is unavailable the last known value is reused.
pub struct MonotonicClock {
    source: Box<dyn Clock>,
    last: AtomicI64,
}

impl MonotonicClock {
    /// Wrap a clock, starting from the epoch
    pub fn new(source: impl Clock + 'static) -> Self {
        Self::from_boxed(Box::new(source))
    }

    /// Wrap an already boxed clock
    pub fn from_boxed(source: Box<dyn Clock>) -> Self {
        Self {
            source,
            last: AtomicI64::new(Timestamp::EPOCH.as_secs()),
        }
    }

    /// Current time, never earlier than any value returned before
    pub fn now(&self) -> Timestamp {
        match self.source.try_now() {
            Some(ts) => {
                let prev = self.last.fetch_max(ts.as_secs(), Ordering::AcqRel);
                Timestamp::from_secs(prev.max(ts.as_secs()))
            }
            None => {
                let last = Timestamp::from_secs(self.last.load(Ordering::Acquire));
                tracing::warn!(
                    last_known = %last,
                    "time source unavailable, reusing last known time"
                );
                last
            }
        }
    }

    /// Raise the floor to at least `ts`
    ///
    /// Used after recovery so new steps are never older than recovered ones.
    pub fn observe(&self, ts: Timestamp) {
        self.last.fetch_max(ts.as_secs(), Ordering::AcqRel);
    }

    /// Last value handed out (or observed)
    pub fn last(&self) -> Timestamp {
        Timestamp::from_secs(self.last.load(Ordering::Acquire))
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl std::fmt::Debug for MonotonicClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonotonicClock")
            .field("last", &self.last())
            .finish_non_exhaustive()
    }
}
