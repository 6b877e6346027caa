//! Durability errors

use thiserror::Error;

/// Errors from WAL writing and recovery
#[derive(Debug, Error)]
pub enum DurabilityError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be serialized
    #[error("encode error: {0}")]
    Encode(String),

    /// Record payload could not be deserialized
    #[error("decode error at offset {offset}: {message}")]
    Decode {
        /// Byte offset of the frame
        offset: u64,
        /// Underlying decoder message
        message: String,
    },

    /// Frame payload does not match its checksum
    #[error("checksum mismatch at offset {offset}: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        /// Byte offset of the frame
        offset: u64,
        /// Checksum stored in the frame header
        expected: u32,
        /// Checksum of the payload as read
        actual: u32,
    },

    /// Frame declares an impossible payload length
    #[error("record at offset {offset} claims {len} bytes (limit {max})")]
    RecordTooLarge {
        /// Byte offset of the frame
        offset: u64,
        /// Declared payload length
        len: usize,
        /// Largest payload accepted
        max: usize,
    },

    /// A failed append could not be rolled back; the WAL accepts no more writes
    #[error("WAL unusable after a failed write at offset {offset}")]
    WalFailed {
        /// Last good end of the log
        offset: u64,
    },

    /// A well-formed record breaks a ledger invariant during replay
    #[error("corrupt WAL at offset {offset}: {reason}")]
    Corrupt {
        /// Byte offset of the frame
        offset: u64,
        /// What was wrong
        reason: String,
    },
}

impl DurabilityError {
    /// Whether this error means the log contents cannot be trusted
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            DurabilityError::Decode { .. }
                | DurabilityError::ChecksumMismatch { .. }
                | DurabilityError::RecordTooLarge { .. }
                | DurabilityError::Corrupt { .. }
        )
    }
}

/// Result type for durability operations
pub type Result<T> = std::result::Result<T, DurabilityError>;
