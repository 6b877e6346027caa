//! WAL record types
//!
//! Each record is one acknowledged ledger write:
//! - LotCreated: a new lot id was allocated
//! - StepAppended: a step was appended to a lot
//!
//! Records carry everything needed to rebuild the lot exactly, including
//! the step's chain hash, so replay re-verifies the chain as it goes.

use cafeledger_core::{LotId, StepRecord};
use serde::{Deserialize, Serialize};

/// WAL record types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalRecord {
    /// Lot creation
    LotCreated {
        /// Newly allocated id
        lot_id: LotId,
    },

    /// Step append
    StepAppended {
        /// Lot the step belongs to
        lot_id: LotId,
        /// The step as recorded
        step: StepRecord,
    },
}

impl WalRecord {
    /// Lot this record refers to
    pub fn lot_id(&self) -> LotId {
        match self {
            WalRecord::LotCreated { lot_id } => *lot_id,
            WalRecord::StepAppended { lot_id, .. } => *lot_id,
        }
    }

    /// Check if this record creates a lot
    pub fn is_creation(&self) -> bool {
        matches!(self, WalRecord::LotCreated { .. })
    }
}
