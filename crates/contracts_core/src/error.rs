//! Error types for data contracts.
//!
//! This module defines the errors raised when a schema model violates its
//! own structural invariants (inverted bounds, uncompilable patterns, empty
//! schemas) or when a textual enum value names an unknown variant.

use thiserror::Error;

/// Result type for data contract operations.
pub type Result<T> = std::result::Result<T, ContractError>;

/// Main error type for schema model operations.
#[derive(Error, Debug)]
pub enum ContractError {
    /// A field constraint is internally inconsistent
    #[error("Invalid constraint on field '{field}': {message}")]
    InvalidConstraint {
        /// Dotted path of the offending field
        field: String,
        /// Description of the violation
        message: String,
    },

    /// A textual value does not name a known variant
    #[error("Unknown {kind} '{value}', expected one of: {expected}")]
    UnknownVariant {
        /// What was being parsed (e.g. "type", "format")
        kind: &'static str,
        /// The rejected value
        value: String,
        /// Comma separated list of accepted values
        expected: String,
    },

    /// The schema map has no fields
    #[error("Schema must contain at least one field")]
    EmptySchema,

    /// Quality rules are structurally invalid
    #[error("Invalid quality rules: {0}")]
    InvalidQualityRules(String),
}

impl ContractError {
    /// Creates a new constraint error for a field path.
    pub fn constraint(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConstraint {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new quality rules error.
    pub fn quality_rules(message: impl Into<String>) -> Self {
        Self::InvalidQualityRules(message.into())
    }
}
