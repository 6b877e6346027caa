//! In-memory lot record
//!
//! A [`LotRecord`] owns one lot's history. The only mutation it offers is
//! [`LotRecord::push`], which refuses any entry that does not extend the
//! history in order: wrong index, older timestamp, or a hash that does not
//! chain from the current head.

use cafeledger_core::chain::{self, ChainHash};
use cafeledger_core::{LedgerError, LotId, LotSnapshot, Result, StepRecord, Timestamp};

/// One lot and its append-only history
#[derive(Debug, Clone)]
pub struct LotRecord {
    id: LotId,
    history: Vec<StepRecord>,
    head: ChainHash,
}

impl LotRecord {
    /// Create an empty lot
    pub fn new(id: LotId) -> Self {
        Self {
            id,
            history: Vec::new(),
            head: chain::genesis(id),
        }
    }

    /// Lot identifier
    pub fn id(&self) -> LotId {
        self.id
    }

    /// Recorded steps, oldest first
    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    /// Number of recorded steps
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether no step has been recorded
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Index the next step must carry
    pub fn next_index(&self) -> u64 {
        self.history.len() as u64
    }

    /// Hash the next step must chain from
    pub fn head(&self) -> ChainHash {
        self.head
    }

    /// Timestamp of the latest step, if any
    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.history.last().map(|r| r.timestamp)
    }

    /// Latest step, if any
    pub fn last(&self) -> Option<&StepRecord> {
        self.history.last()
    }

    /// Build the record that would come next, without appending it
    pub fn prepare(&self, description: &str, timestamp: Timestamp) -> StepRecord {
        StepRecord::chained(self.id, self.next_index(), description, timestamp, &self.head)
    }

    /// Append a step
    ///
    /// Nothing is modified if the entry fails any check.
    pub fn push(&mut self, record: StepRecord) -> Result<()> {
        let expected = self.next_index();
        if record.index != expected {
            return Err(LedgerError::OutOfOrder {
                lot_id: self.id,
                expected,
                actual: record.index,
            });
        }
        if let Some(previous) = self.last_timestamp() {
            if record.timestamp < previous {
                return Err(LedgerError::TimestampRegression {
                    lot_id: self.id,
                    previous,
                    actual: record.timestamp,
                });
            }
        }
        let hash = chain::step_hash(
            &self.head,
            self.id,
            record.index,
            record.timestamp,
            &record.description,
        );
        if hash != record.hash {
            return Err(LedgerError::ChainMismatch {
                lot_id: self.id,
                index: record.index,
            });
        }

        self.head = hash;
        self.history.push(record);
        Ok(())
    }

    /// Copy the current state
    pub fn snapshot(&self) -> LotSnapshot {
        LotSnapshot::from_history(self.id, &self.history)
    }
}
