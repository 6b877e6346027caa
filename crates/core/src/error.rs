//! Error types for ledger invariants
//!
//! These are the detailed, internal errors raised by the core and storage
//! layers. The `cafeledger` facade maps them onto its public error type.

use crate::types::{LotId, Timestamp};
use thiserror::Error;

/// Errors raised while validating or mutating lot history
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Lot was never created
    #[error("lot {0} not found")]
    LotNotFound(LotId),

    /// Identifier is not a valid lot id (zero or negative)
    #[error("invalid lot id: {0}")]
    InvalidLotId(i128),

    /// Step description is empty or whitespace only
    #[error("step description must not be empty")]
    EmptyDescription,

    /// Step description exceeds the configured limit
    #[error("step description is {len} bytes, limit is {max}")]
    DescriptionTooLong {
        /// Actual length in bytes
        len: usize,
        /// Maximum allowed length in bytes
        max: usize,
    },

    /// Appended entry does not continue the lot's history
    #[error("out-of-order append to lot {lot_id}: expected index {expected}, got {actual}")]
    OutOfOrder {
        /// Lot being appended to
        lot_id: LotId,
        /// Next index the lot expects
        expected: u64,
        /// Index carried by the entry
        actual: u64,
    },

    /// Appended entry is older than the lot's latest step
    #[error("timestamp regression on lot {lot_id}: {actual} is before {previous}")]
    TimestampRegression {
        /// Lot being appended to
        lot_id: LotId,
        /// Timestamp of the latest recorded step
        previous: Timestamp,
        /// Timestamp carried by the entry
        actual: Timestamp,
    },

    /// Stored hash does not match the recomputed chain
    #[error("hash chain mismatch on lot {lot_id} at step {index}")]
    ChainMismatch {
        /// Lot whose chain is broken
        lot_id: LotId,
        /// First step whose hash does not verify
        index: u64,
    },

    /// Lot id was already created
    #[error("lot {0} already exists")]
    DuplicateLot(LotId),
}

impl LedgerError {
    /// Check if this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::LotNotFound(_))
    }

    /// Check if this error was caused by bad caller input
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidLotId(_)
                | LedgerError::EmptyDescription
                | LedgerError::DescriptionTooLong { .. }
        )
    }

    /// Check if this error indicates damaged history
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            LedgerError::OutOfOrder { .. }
                | LedgerError::TimestampRegression { .. }
                | LedgerError::ChainMismatch { .. }
                | LedgerError::DuplicateLot(_)
        )
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, LedgerError>;
