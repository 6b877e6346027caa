//! Core types for the cafeledger provenance ledger
//!
//! This crate defines the fundamental building blocks shared by every layer:
//! - [`LotId`] and [`Timestamp`]: identifiers and step times
//! - [`StepRecord`] and [`LotSnapshot`]: immutable views of a lot's history
//! - [`Clock`]: injectable time source, plus [`MonotonicClock`]
//! - [`chain`]: SHA-256 hash chaining of step histories
//! - [`LedgerError`]: internal error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chain;
pub mod clock;
pub mod error;
pub mod types;

pub use chain::{ChainHash, ChainVerification};
pub use clock::{Clock, ManualClock, MonotonicClock, SystemClock};
pub use error::{LedgerError, Result};
pub use types::{
    validate_description, LotId, LotSnapshot, StepRecord, Timestamp, DEFAULT_MAX_DESCRIPTION_LEN,
};
