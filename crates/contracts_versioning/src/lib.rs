//! # Data Contracts Versioning
//!
//! Tracks how contracts evolve:
//!
//! - [`ChangeDetector`] classifies schema differences as breaking or not
//! - [`SemanticVersion`] numbers versions from those differences
//! - [`VersionController`] registers, versions, compares and rolls back
//!   contracts kept in a [`VersionStore`]
//!
//! ## Example
//!
//! ```rust
//! use contracts_versioning::{InMemoryVersionStore, VersionController};
//!
//! let v1 = r#"
//! contract_version: "1.0"
//! schema:
//!   id:
//!     type: string
//!   email:
//!     type: string
//! "#;
//! let v2 = r#"
//! contract_version: "2.0"
//! schema:
//!   id:
//!     type: string
//! "#;
//!
//! let mut controller = VersionController::new(InMemoryVersionStore::new());
//! controller.register_contract("users", v1, "alice").unwrap();
//! let record = controller.create_version("users", v2, "alice").unwrap();
//!
//! assert_eq!(record.version.to_string(), "2.0.0");
//! assert!(record.change_summary.report.has_breaking_changes());
//! ```

mod controller;
mod detector;
mod error;
mod store;
mod version;

pub use controller::*;
pub use detector::*;
pub use error::*;
pub use store::*;
pub use version::*;

pub use contracts_core::{Change, ChangeKind, ChangeReport, RiskLevel};
