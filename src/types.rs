//! Public types for the cafeledger API.
//!
//! This module re-exports types from internal crates with a clean public interface.

// Identifiers and time
pub use cafeledger_core::LotId;
pub use cafeledger_core::Timestamp;

// Lot views
pub use cafeledger_core::LotSnapshot;
pub use cafeledger_core::StepRecord;

// Hash chain
pub use cafeledger_core::ChainHash;

// Clocks
pub use cafeledger_core::{Clock, ManualClock, SystemClock};

// Limits
pub use cafeledger_core::DEFAULT_MAX_DESCRIPTION_LEN;

// Re-export durability mode and recovery report
pub use cafeledger_durability::{DurabilityMode, RecoveryResult};
