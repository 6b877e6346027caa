//! Convenient imports for cafeledger.
//!
//! This module re-exports the most commonly used types so you can get started
//! with a single import:
//!
//! ```no_run
//! use cafeledger::prelude::*;
//!
//! let ledger = Ledger::ephemeral()?;
//! let lot = ledger.create_lot()?;
//! ledger.add_step(lot, "Siembra")?;
//! # Ok::<(), cafeledger::Error>(())
//! ```

// Main entry point
pub use crate::ledger::{Ledger, LedgerBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Core types
pub use crate::types::{LotId, LotSnapshot, StepRecord, Timestamp};

// Time sources
pub use crate::types::{Clock, ManualClock, SystemClock};

// Durability
pub use crate::types::DurabilityMode;
