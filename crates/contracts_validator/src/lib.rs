//! # Data Contracts Validator
//!
//! Validation engine for data contracts. This crate checks records against
//! contract definitions:
//!
//! - Record validation (presence, types, string rules, bounds, nesting)
//! - Quality rules over batches (freshness, completeness, uniqueness, statistics)
//! - PASS/FAIL reports for single records and batches
//!
//! ## Example
//!
//! ```rust
//! use contracts_core::{ContractSchemaBuilder, FieldBuilder, ValidationContext};
//! use contracts_validator::ValidationEngine;
//! use serde_json::json;
//!
//! let schema = ContractSchemaBuilder::new("1.0")
//!     .field("user_id", FieldBuilder::string().pattern(r"^usr_\d+$").build())
//!     .field("age", FieldBuilder::integer().min(13.0).optional().build())
//!     .build()
//!     .unwrap();
//!
//! let engine = ValidationEngine::new(&schema, ValidationContext::new());
//! let records = [json!({"user_id": "usr_1", "age": 30}), json!({"user_id": "u2"})];
//! let report = engine.validate_json_batch(&records).unwrap();
//!
//! assert_eq!(report.passed, 1);
//! assert_eq!(report.failed, 1);
//! ```

mod dataset;
mod engine;
mod error;
mod patterns;
mod quality;
mod schema;

pub use dataset::*;
pub use engine::*;
pub use error::*;
pub use patterns::*;
pub use quality::*;
pub use schema::*;
