//! Storage layer for cafeledger
//!
//! This crate holds every lot in memory:
//! - LotRecord: one lot's append-only history with invariant checks
//! - LotStore: DashMap-sharded map of lots, each behind its own RwLock

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod record;
pub mod sharded;

pub use record::LotRecord;
pub use sharded::LotStore;
