//! Core types for the ledger
//!
//! This module defines the fundamental types used throughout the system:
//! - [`LotId`]: Unique identifier for a coffee lot
//! - [`Timestamp`]: Step time in whole seconds since the Unix epoch
//! - [`StepRecord`]: One immutable entry of a lot's history
//! - [`LotSnapshot`]: Point-in-time, read-only copy of a lot

use crate::chain::{self, ChainHash};
use crate::error::{LedgerError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default upper bound on a step description, in bytes
pub const DEFAULT_MAX_DESCRIPTION_LEN: usize = 4096;

/// Unique identifier for a lot
///
/// Lot ids are assigned by the ledger, starting at 1 and increasing by one
/// per successful creation. Zero is never a valid lot id.
///
/// # Examples
///
/// ```
/// use cafeledger_core::LotId;
///
/// let id = LotId::new(7);
/// assert_eq!(id.as_u64(), 7);
/// assert_eq!(id.next(), LotId::new(8));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LotId(u64);

impl LotId {
    /// The first id a fresh ledger hands out
    pub const FIRST: LotId = LotId(1);

    /// Wrap a raw id
    ///
    /// No validation happens here; the ledger rejects zero when the id is used.
    pub const fn new(raw: u64) -> Self {
        LotId(raw)
    }

    /// Raw numeric value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Whether this id could ever have been assigned
    pub const fn is_valid(&self) -> bool {
        self.0 > 0
    }

    /// The id allocated after this one
    pub const fn next(&self) -> LotId {
        LotId(self.0 + 1)
    }

    /// Reject ids that can never have been assigned
    pub fn ensure_valid(self) -> Result<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(LedgerError::InvalidLotId(self.0 as i128))
        }
    }
}

impl From<u64> for LotId {
    fn from(raw: u64) -> Self {
        LotId(raw)
    }
}

impl TryFrom<i64> for LotId {
    type Error = LedgerError;

    /// Convert an externally supplied id, rejecting non-positive values
    fn try_from(raw: i64) -> Result<Self> {
        if raw <= 0 {
            return Err(LedgerError::InvalidLotId(raw as i128));
        }
        Ok(LotId(raw as u64))
    }
}

impl std::fmt::Display for LotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Seconds since the Unix epoch
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// The epoch itself
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Build from whole seconds
    pub const fn from_secs(secs: i64) -> Self {
        Timestamp(secs)
    }

    /// Whole seconds since the epoch
    pub const fn as_secs(&self) -> i64 {
        self.0
    }

    /// Current wall-clock time
    pub fn now() -> Self {
        Timestamp(Utc::now().timestamp())
    }

    /// Calendar form, if the value is in chrono's representable range
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.0, 0)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "{}s", self.0),
        }
    }
}

/// One entry in a lot's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Position in the lot's history (0-based)
    pub index: u64,
    /// Human-readable label of the processing step
    pub description: String,
    /// When the step was recorded
    pub timestamp: Timestamp,
    /// Chain hash covering this step and everything before it
    pub hash: ChainHash,
}

impl StepRecord {
    /// Build the record that follows `prev` in lot `lot_id`'s chain
    pub fn chained(
        lot_id: LotId,
        index: u64,
        description: impl Into<String>,
        timestamp: Timestamp,
        prev: &ChainHash,
    ) -> Self {
        let description = description.into();
        let hash = chain::step_hash(prev, lot_id, index, timestamp, &description);
        Self {
            index,
            description,
            timestamp,
            hash,
        }
    }
}

/// Read-only, point-in-time copy of a lot
///
/// `steps` and `timestamps` are index-aligned: `timestamps[i]` is the time
/// at which `steps[i]` was recorded. `head` is the chain hash of the latest
/// step, or the lot's genesis hash when the history is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotSnapshot {
    /// Lot identifier
    pub id: LotId,
    /// Step descriptions in provenance order
    pub steps: Vec<String>,
    /// Step times, aligned with `steps`
    pub timestamps: Vec<Timestamp>,
    /// Hash at the head of the lot's chain
    pub head: ChainHash,
}

impl LotSnapshot {
    /// Copy a lot's history into a snapshot
    pub fn from_history(id: LotId, history: &[StepRecord]) -> Self {
        let mut steps = Vec::with_capacity(history.len());
        let mut timestamps = Vec::with_capacity(history.len());
        for record in history {
            steps.push(record.description.clone());
            timestamps.push(record.timestamp);
        }
        let head = history
            .last()
            .map(|r| r.hash)
            .unwrap_or_else(|| chain::genesis(id));
        Self {
            id,
            steps,
            timestamps,
            head,
        }
    }

    /// Number of recorded steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no step has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps paired with their timestamps, oldest first
    pub fn entries(&self) -> impl Iterator<Item = (&str, Timestamp)> + '_ {
        self.steps
            .iter()
            .map(String::as_str)
            .zip(self.timestamps.iter().copied())
    }

    /// Most recent step, if any
    pub fn last_step(&self) -> Option<(&str, Timestamp)> {
        self.entries().last()
    }
}

/// Check a step description before it is appended
///
/// Whitespace-only descriptions are rejected; the stored value is never
/// trimmed or otherwise rewritten.
pub fn validate_description(description: &str, max_len: usize) -> Result<()> {
    if description.trim().is_empty() {
        return Err(LedgerError::EmptyDescription);
    }
    if description.len() > max_len {
        return Err(LedgerError::DescriptionTooLong {
            len: description.len(),
            max: max_len,
        });
    }
    Ok(())
}
