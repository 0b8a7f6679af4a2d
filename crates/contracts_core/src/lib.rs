//! # Data Contracts Core
//!
//! Core data structures and types for the Data Contracts Engine.
//!
//! This crate provides the shared model every other crate of the workspace
//! works on: the parser produces it, the validators check records against
//! it, and the change detector diffs two of them. A data contract is a
//! formal agreement about the structure and quality of data shared between
//! systems.
//!
//! ## Key Concepts
//!
//! - **ContractSchema**: A parsed contract: declared version, domain and field definitions
//! - **FieldDefinition**: One field, typed as a tagged [`FieldKind`] carrying only its own constraints
//! - **QualityRules**: Batch-level rules (freshness, completeness, uniqueness, statistics)
//! - **ChangeReport**: Classified differences between two schemas with a risk score
//!
//! ## Example
//!
//! ```rust
//! use contracts_core::{ContractSchemaBuilder, FieldBuilder, FieldType, StringFormat};
//!
//! let schema = ContractSchemaBuilder::new("1.0")
//!     .domain("user-analytics")
//!     .field("user_id", FieldBuilder::string().pattern(r"^usr_\d+$").build())
//!     .field("email", FieldBuilder::string().format(StringFormat::Email).optional().build())
//!     .field(
//!         "tags",
//!         FieldBuilder::array(FieldBuilder::string().build()).max_length(5).build(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.field("tags").unwrap().field_type(), FieldType::Array);
//! ```

pub mod builder;
pub mod change;
pub mod contract;
pub mod error;
pub mod temporal;
pub mod validator;

pub use builder::*;
pub use change::*;
pub use contract::*;
pub use error::*;
pub use validator::*;
