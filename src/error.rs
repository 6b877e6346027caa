//! Unified error types for cafeledger.
//!
//! This module provides a clean error type that wraps internal errors
//! and presents a consistent interface to users.

use cafeledger_core::LedgerError;
use cafeledger_durability::DurabilityError;
use thiserror::Error;

/// All cafeledger errors.
///
/// This is the canonical error type for all ledger operations.
/// Failed operations never leave partial state behind.
#[derive(Debug, Error)]
pub enum Error {
    /// Lot was never created
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller supplied an invalid id or description
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Persistence failed; the operation had no effect
    #[error("storage error: {0}")]
    Storage(String),

    /// I/O error while setting up the ledger directory
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Recorded history does not verify
    #[error("corruption: {0}")]
    Corruption(String),

    /// Internal error (bug or invariant violation)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for cafeledger operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if this error was caused by bad input.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }

    /// Check if this error came from the persistence layer.
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage(_) | Error::Io(_) | Error::Corruption(_))
    }

    /// Check if this error is retryable.
    ///
    /// Write failures leave no partial state, so the whole operation may
    /// be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Storage(_) | Error::Io(_))
    }

    /// Check if this is a serious/unrecoverable error.
    pub fn is_serious(&self) -> bool {
        matches!(self, Error::Corruption(_) | Error::Internal(_))
    }
}

// Convert from internal ledger errors
impl From<LedgerError> for Error {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::LotNotFound(id) => Error::NotFound(format!("lot {}", id)),
            e @ (LedgerError::InvalidLotId(_)
            | LedgerError::EmptyDescription
            | LedgerError::DescriptionTooLong { .. }) => Error::InvalidArgument(e.to_string()),
            e @ (LedgerError::OutOfOrder { .. }
            | LedgerError::TimestampRegression { .. }
            | LedgerError::ChainMismatch { .. }) => Error::Corruption(e.to_string()),
            e @ LedgerError::DuplicateLot(_) => Error::Internal(e.to_string()),
        }
    }
}

// Convert from durability errors
impl From<DurabilityError> for Error {
    fn from(e: DurabilityError) -> Self {
        match e {
            DurabilityError::Io(io_err) => Error::Storage(format!("WAL I/O: {}", io_err)),
            DurabilityError::Encode(msg) => Error::Storage(format!("encode: {}", msg)),
            e @ DurabilityError::WalFailed { .. } => Error::Storage(e.to_string()),
            e @ (DurabilityError::Decode { .. }
            | DurabilityError::ChecksumMismatch { .. }
            | DurabilityError::RecordTooLarge { .. }
            | DurabilityError::Corrupt { .. }) => Error::Corruption(e.to_string()),
        }
    }
}
