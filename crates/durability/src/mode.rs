//! When WAL writes reach the disk

use std::time::Duration;

/// Sync policy for WAL writes
///
/// | Mode | Acknowledged write survives crash | Use Case |
/// |------|-----------------------------------|----------|
/// | None | No | Tests, ephemeral ledgers |
/// | Strict | Yes | Default for on-disk ledgers |
/// | Batched | Up to the last sync | Bulk imports |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurabilityMode {
    /// No WAL at all; the ledger lives and dies in memory
    None,

    /// fsync before every write returns
    #[default]
    Strict,

    /// fsync once `batch_size` records are pending or `interval_ms` has
    /// passed since the last sync, whichever comes first
    Batched {
        /// Maximum time between fsyncs in milliseconds
        interval_ms: u64,
        /// Maximum records between fsyncs
        batch_size: usize,
    },
}

impl DurabilityMode {
    /// Batched with a 100ms interval and 1000-record batches
    pub const fn buffered_default() -> Self {
        DurabilityMode::Batched {
            interval_ms: 100,
            batch_size: 1000,
        }
    }

    /// Whether a WAL file is kept
    pub fn requires_wal(&self) -> bool {
        !matches!(self, DurabilityMode::None)
    }

    /// Whether the writer must fsync now, given `pending` unsynced records
    /// and the time since the last sync
    pub fn should_sync(&self, pending: usize, since_sync: Duration) -> bool {
        match *self {
            DurabilityMode::None => false,
            DurabilityMode::Strict => pending > 0,
            DurabilityMode::Batched {
                interval_ms,
                batch_size,
            } => pending >= batch_size || since_sync >= Duration::from_millis(interval_ms),
        }
    }

    /// Short label for logs
    pub fn description(&self) -> &'static str {
        match self {
            DurabilityMode::None => "in-memory",
            DurabilityMode::Strict => "strict",
            DurabilityMode::Batched { .. } => "batched",
        }
    }
}
