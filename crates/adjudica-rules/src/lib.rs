//! Adjudica Rules
//!
//! Evaluates compiled policy clauses against a claim's reconciled facts.
//!
//! # Overview
//!
//! Policy wording is compiled (outside this crate) into clauses whose logic
//! is a small expression tree. Trees are authored in a normalized form and
//! transpiled once into the canonical form the evaluator walks.
//!
//! # Architecture
//!
//! ```text
//! facts ──► Claim Data Mapper ──► nested data ─┐
//!                                              ├─► Tree Evaluator ──► ClauseBatch ──► Dossier
//! authoring clauses ──► Transpiler ──► ClauseSet┘
//! ```
//!
//! # Key Features
//!
//! - **Claim Data Mapper**: dotted keys (`claim.parties.claimants[0].role`) to nested JSON
//! - **Transpiler**: `{operator, arguments}` to `{operator: arguments}`
//! - **Tree Evaluator**: boolean, comparison, arithmetic, lookup and membership operators
//! - **Isolation**: one faulty clause yields an ERROR verdict, never a failed batch
//! - **Dossier Assembly**: claim verdict, line-item decisions and a financial summary
//!
//! # Example Usage
//!
//! ```
//! use adjudica_domain::{Clause, ClauseSet, ClauseType, ClauseVerdict};
//! use adjudica_rules::{inflate, transpile, RuleEvaluator, RulesConfig};
//! use serde_json::json;
//! use std::collections::BTreeMap;
//!
//! let logic = transpile(&json!({
//!     "operator": "<=",
//!     "arguments": [{"operator": "var", "arguments": ["vehicle.odometer_km"]}, 150000]
//! }));
//! let set = ClauseSet {
//!     policy_id: "MW-1".to_string(),
//!     version: "2025".to_string(),
//!     clauses: vec![Clause {
//!         clause_id: "C-1".to_string(),
//!         clause_type: ClauseType::Condition,
//!         logic,
//!         description: String::new(),
//!         source_reference: "§2.1".to_string(),
//!     }],
//! };
//!
//! let mut flat = BTreeMap::new();
//! flat.insert("vehicle.odometer_km".to_string(), json!(91000));
//!
//! let batch = RuleEvaluator::new(RulesConfig::default()).evaluate(&set, &inflate(&flat));
//! assert_eq!(batch.clauses.conditions[0].verdict, ClauseVerdict::Pass);
//! ```

#![warn(missing_docs)]

mod config;
mod dossier;
mod error;
mod evaluator;
pub mod logic;
pub mod mapper;
mod transpile;
mod verdict;

#[cfg(test)]
mod tests;

pub use config::RulesConfig;
pub use dossier::{
    assemble_rules_dossier, assemble_screening_dossier, financial_summary, line_item_decisions,
    DossierContext,
};
pub use error::RulesError;
pub use evaluator::{ClauseBatch, RuleEvaluator};
pub use logic::{evaluate_logic, truthy};
pub use mapper::{build_claim_data, inflate, inflate_with_limit, DEFAULT_MAX_ARRAY_INDEX};
pub use transpile::{transpile, transpile_clause_set, validate_logic};
pub use verdict::claim_verdict;
