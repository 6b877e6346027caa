//! Main ledger entry point.
//!
//! This module provides the `Ledger` struct, the primary entry point for
//! creating lots, appending steps and reading lot histories.

use crate::error::{Error, Result};
use cafeledger_core::chain;
use cafeledger_core::{
    validate_description, Clock, LedgerError, LotId, LotSnapshot, MonotonicClock, StepRecord,
    SystemClock, DEFAULT_MAX_DESCRIPTION_LEN,
};
use cafeledger_durability::{
    recover, DurabilityMode, RecoveryResult, Wal, WalRecord, WAL_FILE_NAME,
};
use cafeledger_storage::{LotRecord, LotStore};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::TempDir;
use tracing::{debug, error, info, warn};

/// The coffee-lot provenance ledger.
///
/// Create a ledger using [`Ledger::open`], [`Ledger::ephemeral`] or
/// [`Ledger::builder`]. A `Ledger` is `Send + Sync`; share it between
/// threads with `Arc<Ledger>`.
///
/// # Example
///
/// ```no_run
/// use cafeledger::prelude::*;
///
/// let ledger = Ledger::open("./lots")?;
///
/// let lot = ledger.create_lot()?;
/// ledger.add_step(lot, "Siembra")?;
/// ledger.add_step(lot, "Cosecha")?;
///
/// let snapshot = ledger.get_lot(lot)?;
/// assert_eq!(snapshot.steps, vec!["Siembra", "Cosecha"]);
/// # Ok::<(), cafeledger::Error>(())
/// ```
pub struct Ledger {
    /// All lots
    store: LotStore,

    /// Step timestamps
    clock: MonotonicClock,

    /// WAL, absent for ephemeral ledgers
    wal: Option<Mutex<Wal>>,

    /// Next id to hand out; also serializes creation
    next_id: Mutex<LotId>,

    max_description_len: usize,
    mode: DurabilityMode,
    path: Option<PathBuf>,

    /// Keeps a temporary directory alive for `open_temp` ledgers
    _temp_dir: Option<TempDir>,

    /// What WAL replay found at open, for durable ledgers
    recovery: Option<RecoveryResult>,

    lots_created: AtomicU64,
    steps_appended: AtomicU64,
}

impl Ledger {
    /// Open a durable ledger in the given directory.
    ///
    /// Uses strict durability: every successful write is on disk before the
    /// call returns. Existing history is recovered from the WAL.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory for the ledger files (created if missing)
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().path(path).open()
    }

    /// Create an in-memory ledger with no disk I/O.
    ///
    /// All data is lost when the ledger is dropped.
    pub fn ephemeral() -> Result<Self> {
        Self::builder().no_durability().open()
    }

    /// Create a builder for ledger configuration.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cafeledger::prelude::*;
    ///
    /// let ledger = Ledger::builder()
    ///     .path("./lots")
    ///     .buffered()
    ///     .max_description_len(256)
    ///     .open()?;
    /// # Ok::<(), cafeledger::Error>(())
    /// ```
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::new()
    }

    // =========================================================================
    // Core operations
    // =========================================================================

    /// Create a new lot with an empty history.
    ///
    /// Ids start at 1 and increase by one per successful call. If the
    /// creation cannot be logged, no id is consumed.
    pub fn create_lot(&self) -> Result<LotId> {
        let mut next = self.next_id.lock();
        let lot_id = *next;

        self.log(&WalRecord::LotCreated { lot_id })?;
        self.store.insert(LotRecord::new(lot_id))?;
        *next = lot_id.next();
        drop(next);

        self.lots_created.fetch_add(1, Ordering::Relaxed);
        debug!(lot_id = %lot_id, "lot created");
        Ok(lot_id)
    }

    /// Append a step to a lot's history.
    ///
    /// The step is stamped with the current time, never earlier than the
    /// lot's previous step.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] for id 0 or a blank/oversized description
    /// - [`Error::NotFound`] if the lot was never created
    /// - [`Error::Storage`] if the step could not be logged; nothing is
    ///   recorded in that case
    pub fn add_step(&self, id: LotId, description: &str) -> Result<()> {
        let id = id.ensure_valid()?;
        validate_description(description, self.max_description_len)?;
        let handle = self
            .store
            .get(&id)
            .ok_or(LedgerError::LotNotFound(id))?;

        let mut record = handle.write();
        let now = self.clock.now();
        let timestamp = record.last_timestamp().map_or(now, |last| last.max(now));
        let step = record.prepare(description, timestamp);
        let index = step.index;

        self.log(&WalRecord::StepAppended {
            lot_id: id,
            step: step.clone(),
        })?;
        record.push(step)?;
        drop(record);

        self.steps_appended.fetch_add(1, Ordering::Relaxed);
        debug!(lot_id = %id, index, timestamp = timestamp.as_secs(), "step appended");
        Ok(())
    }

    /// Read a consistent snapshot of a lot.
    ///
    /// The snapshot is a copy and does not change with later appends.
    pub fn get_lot(&self, id: LotId) -> Result<LotSnapshot> {
        let id = id.ensure_valid()?;
        self.store
            .snapshot(&id)
            .ok_or_else(|| LedgerError::LotNotFound(id).into())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Check whether a lot exists.
    pub fn contains(&self, id: LotId) -> bool {
        self.store.contains(&id)
    }

    /// Number of lots.
    pub fn lot_count(&self) -> usize {
        self.store.len()
    }

    /// All lot ids, ascending.
    pub fn lot_ids(&self) -> Vec<LotId> {
        self.store.ids()
    }

    /// Most recent step of a lot, if it has any.
    pub fn latest_step(&self, id: LotId) -> Result<Option<StepRecord>> {
        let id = id.ensure_valid()?;
        let handle = self
            .store
            .get(&id)
            .ok_or(LedgerError::LotNotFound(id))?;
        let record = handle.read();
        Ok(record.last().cloned())
    }

    /// Recompute a lot's hash chain and check it against the stored hashes.
    ///
    /// Returns the verified head hash.
    pub fn verify_lot(&self, id: LotId) -> Result<chain::ChainHash> {
        let id = id.ensure_valid()?;
        let handle = self
            .store
            .get(&id)
            .ok_or(LedgerError::LotNotFound(id))?;
        let record = handle.read();

        let head = chain::verify_chain(id, record.history()).into_result(id)?;
        if head != record.head() {
            return Err(Error::Corruption(format!(
                "lot {} head {} does not match recomputed {}",
                id,
                record.head(),
                head
            )));
        }
        Ok(head)
    }

    /// Ledger metrics.
    pub fn metrics(&self) -> LedgerMetrics {
        LedgerMetrics {
            lots: self.store.len() as u64,
            steps: self.store.total_steps() as u64,
            lots_created: self.lots_created.load(Ordering::Relaxed),
            steps_appended: self.steps_appended.load(Ordering::Relaxed),
            wal_bytes: self.wal.as_ref().map(|w| w.lock().offset()),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Force pending WAL writes to disk.
    ///
    /// Only needed in batched mode; strict mode syncs every write.
    pub fn flush(&self) -> Result<()> {
        if let Some(wal) = &self.wal {
            wal.lock().flush()?;
        }
        Ok(())
    }

    /// Flush pending WAL writes before shutdown.
    ///
    /// The ledger stays usable afterwards; the WAL is also flushed when the
    /// ledger is dropped.
    pub fn close(&self) -> Result<()> {
        self.flush()
    }

    /// Ledger directory, if the ledger lives on disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current durability mode.
    pub fn durability_mode(&self) -> DurabilityMode {
        self.mode
    }

    /// Check if this is an in-memory ledger.
    pub fn is_ephemeral(&self) -> bool {
        self.wal.is_none()
    }

    /// Report from the WAL replay performed at open.
    ///
    /// `None` for ephemeral ledgers.
    pub fn recovery(&self) -> Option<&RecoveryResult> {
        self.recovery.as_ref()
    }

    fn log(&self, record: &WalRecord) -> Result<()> {
        let Some(wal) = &self.wal else {
            return Ok(());
        };
        wal.lock().append(record).map(|_| ()).map_err(|e| {
            error!(lot_id = %record.lot_id(), error = %e, "WAL append failed");
            Error::from(e)
        })
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("lots", &self.store.len())
            .finish_non_exhaustive()
    }
}

/// Ledger metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerMetrics {
    /// Lots currently stored (including recovered ones)
    pub lots: u64,
    /// Steps currently stored (including recovered ones)
    pub steps: u64,
    /// Lots created since open
    pub lots_created: u64,
    /// Steps appended since open
    pub steps_appended: u64,
    /// Size of the WAL in bytes, for durable ledgers
    pub wal_bytes: Option<u64>,
}

/// Builder for ledger configuration.
///
/// # Example
///
/// ```no_run
/// use cafeledger::prelude::*;
///
/// // Production: disk-backed, every write durable on return
/// let ledger = Ledger::builder().path("./lots").strict().open()?;
///
/// // Tests: temp directory with a controllable clock
/// let clock = ManualClock::new(Timestamp::from_secs(1_700_000_000));
/// let ledger = Ledger::builder().clock(clock.clone()).open_temp()?;
///
/// // Unit tests: no disk at all
/// let ledger = Ledger::ephemeral()?;
/// # Ok::<(), cafeledger::Error>(())
/// ```
pub struct LedgerBuilder {
    path: Option<PathBuf>,
    mode: DurabilityMode,
    clock: Option<Box<dyn Clock>>,
    max_description_len: usize,
}

impl LedgerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            path: None,
            mode: DurabilityMode::Strict,
            clock: None,
            max_description_len: DEFAULT_MAX_DESCRIPTION_LEN,
        }
    }

    /// Set the ledger directory path.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use strict mode (default): fsync every write before returning.
    pub fn strict(mut self) -> Self {
        self.mode = DurabilityMode::Strict;
        self
    }

    /// Use batched mode with default thresholds (100ms or 1000 writes).
    ///
    /// Acknowledged writes since the last sync can be lost on crash.
    pub fn buffered(mut self) -> Self {
        self.mode = DurabilityMode::buffered_default();
        self
    }

    /// Use batched mode with custom parameters.
    ///
    /// # Arguments
    ///
    /// * `flush_interval_ms` - Maximum time between fsyncs
    /// * `max_pending_writes` - Maximum writes before forced fsync
    pub fn buffered_with(mut self, flush_interval_ms: u64, max_pending_writes: usize) -> Self {
        self.mode = DurabilityMode::Batched {
            interval_ms: flush_interval_ms,
            batch_size: max_pending_writes,
        };
        self
    }

    /// Keep everything in memory; no WAL is written or read.
    pub fn no_durability(mut self) -> Self {
        self.mode = DurabilityMode::None;
        self
    }

    /// Use a specific time source for step timestamps.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Limit step descriptions to `max` bytes.
    pub fn max_description_len(mut self, max: usize) -> Self {
        self.max_description_len = max;
        self
    }

    /// Open the ledger.
    ///
    /// Durable ledgers without a configured path use a temporary directory.
    pub fn open(self) -> Result<Ledger> {
        if self.mode.requires_wal() && self.path.is_none() {
            return self.open_temp();
        }
        self.open_in(None)
    }

    /// Open a ledger in a fresh temporary directory.
    ///
    /// The directory is removed when the ledger is dropped.
    pub fn open_temp(mut self) -> Result<Ledger> {
        let dir = tempfile::Builder::new().prefix("cafeledger-").tempdir()?;
        self.path = Some(dir.path().to_path_buf());
        self.open_in(Some(dir))
    }

    fn open_in(self, temp_dir: Option<TempDir>) -> Result<Ledger> {
        let clock = match self.clock {
            Some(clock) => MonotonicClock::from_boxed(clock),
            None => MonotonicClock::new(SystemClock),
        };
        let store = LotStore::new();

        let (wal, recovery) = match (&self.path, self.mode.requires_wal()) {
            (Some(dir), true) => {
                std::fs::create_dir_all(dir)?;
                let wal_path = dir.join(WAL_FILE_NAME);
                let recovery = recover(&wal_path, &store)?;
                if recovery.has_issues() {
                    warn!(path = %wal_path.display(), "{}", recovery.summary());
                }
                let wal = Wal::open(&wal_path, self.mode)?;
                (Some(Mutex::new(wal)), Some(recovery))
            }
            _ => (None, None),
        };
        let path = if wal.is_some() { self.path } else { None };

        if let Some(latest) = store.max_timestamp() {
            clock.observe(latest);
        }
        let next_id = store.max_id().map_or(LotId::FIRST, |id| id.next());

        info!(
            path = ?path,
            mode = self.mode.description(),
            lots = store.len(),
            next_id = %next_id,
            "ledger opened"
        );

        Ok(Ledger {
            store,
            clock,
            wal,
            next_id: Mutex::new(next_id),
            max_description_len: self.max_description_len,
            mode: self.mode,
            path,
            _temp_dir: temp_dir,
            recovery,
            lots_created: AtomicU64::new(0),
            steps_appended: AtomicU64::new(0),
        })
    }
}

impl Default for LedgerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
