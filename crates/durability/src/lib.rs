//! Durability layer for cafeledger
//!
//! This crate implements write-ahead logging and recovery:
//! - WalRecord types: LotCreated, StepAppended
//! - Frame encoding/decoding with CRC32 checksums
//! - Durability modes: None, Strict (default on disk), Batched
//! - Recovery: replay the WAL into a LotStore, dropping a torn tail

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encoding;
pub mod error;
pub mod mode;
pub mod record;
pub mod recovery;
pub mod wal;

pub use encoding::{decode_record, encode_record, FRAME_HEADER_LEN, MAX_RECORD_LEN};
pub use error::{DurabilityError, Result};
pub use mode::DurabilityMode;
pub use record::WalRecord;
pub use recovery::{recover, RecoveryResult};
pub use wal::{Wal, WAL_FILE_NAME};
