//! # cafeledger
//!
//! Append-only, tamper-evident provenance ledger for coffee lots.
//!
//! A lot is created, processing steps are appended to it over time, and any
//! party can later read the full, ordered history of the lot.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cafeledger::prelude::*;
//!
//! // Open (or recover) a durable ledger
//! let ledger = Ledger::open("./lots")?;
//!
//! let lot = ledger.create_lot()?;
//! ledger.add_step(lot, "Siembra")?;
//! ledger.add_step(lot, "Cosecha")?;
//!
//! let snapshot = ledger.get_lot(lot)?;
//! for (step, at) in snapshot.entries() {
//!     println!("{} - {}", step, at);
//! }
//!
//! ledger.close()?;
//! # Ok::<(), cafeledger::Error>(())
//! ```
//!
//! ## Guarantees
//!
//! - Lot ids start at 1, increase by one, and are never reused
//! - History is append-only; `steps` and `timestamps` always line up
//! - Timestamps never decrease within a lot
//! - Every step is hash-chained to its predecessor ([`Ledger::verify_lot`])
//! - Unknown ids fail with [`Error::NotFound`]; no empty lot is fabricated
//! - With strict durability, every acknowledged write survives a crash

#![warn(missing_docs)]

mod error;
mod ledger;
mod types;

pub mod prelude;

// Re-export main entry points
pub use error::{Error, Result};
pub use ledger::{Ledger, LedgerBuilder, LedgerMetrics};

// Re-export types
pub use types::*;
