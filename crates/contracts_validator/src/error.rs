//! Validation findings and input errors.
//!
//! A record that breaks the contract is not an error in the Rust sense: its
//! problems come back as [`ValidationError`] records alongside a FAIL status.
//! [`InputError`] is reserved for input that cannot be treated as records at
//! all.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use contracts_core::MAX_REPORTED_VALUE_LEN;

/// Classification of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    RequiredFieldMissing,
    TypeMismatch,
    PatternMismatch,
    FormatMismatch,
    LengthTooShort,
    LengthTooLong,
    EnumMismatch,
    ValueTooSmall,
    ValueTooLarge,
    InvalidTimestamp,
    TimestampTooOld,
    TimestampTooRecent,
    ArrayTooShort,
    ArrayTooLong,
    Freshness,
    Completeness,
    Uniqueness,
    Statistics,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::RequiredFieldMissing => "REQUIRED_FIELD_MISSING",
            ErrorType::TypeMismatch => "TYPE_MISMATCH",
            ErrorType::PatternMismatch => "PATTERN_MISMATCH",
            ErrorType::FormatMismatch => "FORMAT_MISMATCH",
            ErrorType::LengthTooShort => "LENGTH_TOO_SHORT",
            ErrorType::LengthTooLong => "LENGTH_TOO_LONG",
            ErrorType::EnumMismatch => "ENUM_MISMATCH",
            ErrorType::ValueTooSmall => "VALUE_TOO_SMALL",
            ErrorType::ValueTooLarge => "VALUE_TOO_LARGE",
            ErrorType::InvalidTimestamp => "INVALID_TIMESTAMP",
            ErrorType::TimestampTooOld => "TIMESTAMP_TOO_OLD",
            ErrorType::TimestampTooRecent => "TIMESTAMP_TOO_RECENT",
            ErrorType::ArrayTooShort => "ARRAY_TOO_SHORT",
            ErrorType::ArrayTooLong => "ARRAY_TOO_LONG",
            ErrorType::Freshness => "FRESHNESS",
            ErrorType::Completeness => "COMPLETENESS",
            ErrorType::Uniqueness => "UNIQUENESS",
            ErrorType::Statistics => "STATISTICS",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One problem found in a record or batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field (`address.zip`, `tags[2]`)
    pub field: String,

    pub error_type: ErrorType,

    pub message: String,

    /// Offending value, truncated to 100 characters
    pub value: Option<String>,

    /// What the contract expects
    pub expected: Option<String>,
}

impl ValidationError {
    /// Creates a finding with no recorded value.
    pub fn new(field: impl Into<String>, error_type: ErrorType, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            error_type,
            message: message.into(),
            value: None,
            expected: None,
        }
    }

    /// Records the offending value, truncated to the reporting limit.
    pub fn with_value(mut self, value: impl fmt::Display) -> Self {
        self.value = Some(truncate(&value.to_string()));
        self
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }
}

fn truncate(text: &str) -> String {
    text.chars().take(MAX_REPORTED_VALUE_LEN).collect()
}

/// Errors raised when input cannot be read as records.
#[derive(Debug, Error)]
pub enum InputError {
    /// A record is not a JSON object
    #[error("Record {index} is not an object (found {found})")]
    NotARecord { index: usize, found: &'static str },

    /// The payload is neither an object nor an array of objects
    #[error("Expected a record object or an array of records, found {0}")]
    UnsupportedPayload(&'static str),
}
