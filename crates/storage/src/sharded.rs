//! Sharded lot storage
//!
//! DashMap keyed by LotId, one RwLock per lot.
//!
//! # Design
//!
//! - DashMap: 16-way sharded by default, map lookups only touch one shard
//! - `Arc<RwLock<LotRecord>>` per lot: the shard guard is released before
//!   the lot lock is taken, so a slow append never holds up other lots
//! - Per-lot write lock: appends to one lot are totally ordered
//!
//! # Thread Safety
//!
//! All operations are thread-safe:
//! - get()/snapshot(): shard read, then the lot's read lock
//! - insert(): locks the target shard only
//! - Different lots never contend on their record locks

use cafeledger_core::{LedgerError, LotId, LotSnapshot, Result, Timestamp};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::record::LotRecord;

/// Shared handle to one lot's record
pub type LotHandle = Arc<RwLock<LotRecord>>;

/// All lots, sharded by id
pub struct LotStore {
    lots: DashMap<LotId, LotHandle>,
}

impl LotStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            lots: DashMap::new(),
        }
    }

    /// Create with expected number of lots
    pub fn with_capacity(num_lots: usize) -> Self {
        Self {
            lots: DashMap::with_capacity(num_lots),
        }
    }

    /// Number of lots
    pub fn len(&self) -> usize {
        self.lots.len()
    }

    /// Whether no lot has been stored
    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    /// Check if a lot exists
    #[inline]
    pub fn contains(&self, id: &LotId) -> bool {
        self.lots.contains_key(id)
    }

    /// Store a new lot
    ///
    /// Fails with `DuplicateLot` if the id is taken; the existing record
    /// is left untouched.
    pub fn insert(&self, record: LotRecord) -> Result<()> {
        let id = record.id();
        match self.lots.entry(id) {
            Entry::Occupied(_) => Err(LedgerError::DuplicateLot(id)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(RwLock::new(record)));
                Ok(())
            }
        }
    }

    /// Handle to a lot's record
    ///
    /// The shard guard is dropped before returning; callers lock the
    /// record themselves.
    #[inline]
    pub fn get(&self, id: &LotId) -> Option<LotHandle> {
        self.lots.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Consistent copy of a lot
    pub fn snapshot(&self, id: &LotId) -> Option<LotSnapshot> {
        self.get(id).map(|handle| handle.read().snapshot())
    }

    /// All lot ids, ascending
    pub fn ids(&self) -> Vec<LotId> {
        let mut ids: Vec<LotId> = self.lots.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    /// Highest lot id stored, if any
    pub fn max_id(&self) -> Option<LotId> {
        self.lots.iter().map(|entry| *entry.key()).max()
    }

    /// Total number of steps across every lot
    pub fn total_steps(&self) -> usize {
        self.handles().iter().map(|h| h.read().len()).sum()
    }

    /// Latest step timestamp across every lot
    pub fn max_timestamp(&self) -> Option<Timestamp> {
        self.handles()
            .iter()
            .filter_map(|h| h.read().last_timestamp())
            .max()
    }

    // Collect handles first so no shard guard is held while lot locks are taken.
    fn handles(&self) -> Vec<LotHandle> {
        self.lots
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }
}

impl Default for LotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LotStore")
            .field("lot_count", &self.len())
            .field("total_steps", &self.total_steps())
            .finish()
    }
}
