//! Validation options and outcome types shared by validator implementations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of errors collected for a single record.
pub const MAX_ERRORS_PER_RECORD: usize = 10;

/// Number of leading array items checked against the item definition.
pub const MAX_ARRAY_ITEMS_CHECKED: usize = 10;

/// Errors kept per failed record in a batch report.
pub const MAX_BATCH_ERRORS_PER_RECORD: usize = 5;

/// Total sample errors kept in a batch report.
pub const MAX_BATCH_SAMPLE_ERRORS: usize = 50;

/// Reported offending values are truncated to this many characters.
pub const MAX_REPORTED_VALUE_LEN: usize = 100;

/// Context for validation operations.
///
/// Carries the runtime knobs of a validation run. Built once and handed to
/// the engine together with the contract.
///
/// # Example
///
/// ```rust
/// use contracts_core::ValidationContext;
///
/// let context = ValidationContext::new()
///     .with_strict(true)
///     .with_sample_size(1_000);
///
/// assert!(context.strict);
/// assert_eq!(context.sample_size, Some(1_000));
/// ```
#[derive(Debug, Default, Clone)]
pub struct ValidationContext {
    /// Treat quality warnings as failures
    pub strict: bool,

    /// Validate the schema only (skip quality rules)
    pub schema_only: bool,

    /// Maximum number of records of a batch to validate
    pub sample_size: Option<usize>,
}

impl ValidationContext {
    /// Creates a new validation context with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets strict validation mode.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets schema-only validation mode.
    pub fn with_schema_only(mut self, schema_only: bool) -> Self {
        self.schema_only = schema_only;
        self
    }

    /// Sets the number of batch records to validate.
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = Some(size);
        self
    }
}

/// Overall outcome of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationStatus {
    Pass,
    Fail,
}

impl ValidationStatus {
    /// `Pass` when no errors were found.
    pub fn from_error_count(errors: usize) -> Self {
        if errors == 0 {
            ValidationStatus::Pass
        } else {
            ValidationStatus::Fail
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, ValidationStatus::Pass)
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationStatus::Pass => f.write_str("PASS"),
            ValidationStatus::Fail => f.write_str("FAIL"),
        }
    }
}
