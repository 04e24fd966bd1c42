//! Adjudica Decision Ledger
//!
//! Append-only, tamper-evident audit log of claim decisions.
//!
//! # Architecture
//!
//! - One JSON record per line in `decisions.jsonl`
//! - Each record carries the SHA-256 of its own canonical content
//!   (`record_hash`) and the hash of its predecessor (`previous_hash`);
//!   the first record points at `GENESIS`
//! - Appends are serialized and written through temp file + fsync + rename
//! - `verify()` walks the chain and reports the first failing index
//!
//! # Examples
//!
//! ```no_run
//! use adjudica_ledger::JsonlLedger;
//!
//! let ledger = JsonlLedger::open("decisions.jsonl").unwrap();
//! let report = ledger.verify().unwrap();
//! println!("{} records, valid = {}", report.total_records, report.valid);
//! ```

#![warn(missing_docs)]

mod error;
pub mod hash;
mod ledger;
mod verify;

pub use error::LedgerError;
pub use ledger::{JsonlLedger, LEDGER_FILE};
pub use verify::{FailureKind, VerificationFailure, VerificationReport};
