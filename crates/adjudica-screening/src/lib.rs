//! Adjudica Screening
//!
//! Deterministic business checks run before clause evaluation.
//!
//! The Screening Engine provides:
//! - An ordered list of named checks behind the [`Check`] trait
//! - Built-in motor-claim checks (policy validity, mileage, vehicle age, ...)
//! - Hard-fail detection and auto-reject
//! - A payout estimate from the coverage summary
//!
//! # Examples
//!
//! ```
//! use adjudica_domain::ClaimFacts;
//! use adjudica_screening::{CheckContext, ScreeningConfig, ScreeningEngine};
//! use chrono::NaiveDate;
//!
//! let engine = ScreeningEngine::new(ScreeningConfig::default());
//! let facts = ClaimFacts::new("CLM-1", vec![]);
//! let as_of = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
//!
//! let result = engine.screen(&CheckContext::new("CLM-1", &facts, as_of));
//! assert!(!result.auto_reject);
//! ```

#![warn(missing_docs)]

mod check;
pub mod checks;
mod config;
mod engine;
mod error;
pub mod facts;
mod payout;

pub use check::{Check, CheckContext, CheckOutcome};
pub use config::{PayoutConfig, ScreeningConfig};
pub use engine::ScreeningEngine;
pub use error::ScreeningError;
pub use payout::compute_payout;
