//! Parser for Data Contracts (YAML/TOML formats).
//!
//! This crate turns contract text into the strongly-typed
//! [`ContractSchema`] model and back. Parsing is strict about the field
//! schema (any structural problem fails the whole document) and lenient
//! about quality rules (a malformed `quality_rules` block is dropped with a
//! warning).
//!
//! # Example
//!
//! ```rust
//! use contracts_parser::parse_yaml;
//!
//! let yaml = r#"
//! contract_version: "1.0"
//! domain: user-analytics
//! description: User events dataset
//! schema:
//!   user_id:
//!     type: string
//!     pattern: '^usr_\d+$'
//!   age:
//!     type: integer
//!     required: false
//!     min: 0
//!     max: 120
//! "#;
//!
//! let contract = parse_yaml(yaml).expect("Failed to parse contract");
//! assert_eq!(contract.domain, "user-analytics");
//! assert_eq!(contract.field_count(), 2);
//! ```

mod document;
mod field;
mod quality;
mod serialize;
mod templates;

use contracts_core::{ContractError, ContractSchema};
use std::path::Path;
use thiserror::Error;

pub use field::validate_field_definition;
pub use quality::validate_quality_rules;
pub use serialize::to_yaml;
pub use templates::{template, templates, ContractTemplate};

/// Errors that can occur during contract parsing.
#[derive(Debug, Error)]
pub enum ParserError {
    /// The text is not valid structured data, or not a mapping at the top level
    #[error("Invalid contract syntax: {0}")]
    Syntax(String),

    /// A required top-level key is absent
    #[error("Missing required key: '{key}'. Contract must include: contract_version, schema")]
    MissingRequiredKey { key: String },

    /// A field definition (or the schema map itself) is structurally invalid
    #[error("Invalid field definition for '{field}': {message}")]
    InvalidSchema { field: String, message: String },

    /// File I/O error
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,

    /// The contract could not be written back to text
    #[error("Failed to serialize contract: {0}")]
    Serialization(String),
}

impl ParserError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ParserError::InvalidSchema {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<ContractError> for ParserError {
    fn from(err: ContractError) -> Self {
        match err {
            ContractError::InvalidConstraint { field, message } => {
                ParserError::InvalidSchema { field, message }
            }
            ContractError::InvalidQualityRules(message) => ParserError::InvalidSchema {
                field: "quality_rules".to_string(),
                message,
            },
            other => ParserError::InvalidSchema {
                field: "schema".to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported contract file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
}

/// Parse a contract from a YAML string.
///
/// # Errors
///
/// * [`ParserError::Syntax`] when the text is not YAML or not a mapping
/// * [`ParserError::MissingRequiredKey`] when `contract_version` or `schema` is absent
/// * [`ParserError::InvalidSchema`] when any field definition is invalid
///
/// # Example
///
/// ```rust
/// use contracts_parser::{parse_yaml, ParserError};
///
/// let err = parse_yaml("schema: {}").unwrap_err();
/// assert!(matches!(err, ParserError::MissingRequiredKey { ref key } if key == "contract_version"));
/// ```
pub fn parse_yaml(content: &str) -> Result<ContractSchema> {
    let document: serde_yaml_ng::Value = serde_yaml_ng::from_str(content)
        .map_err(|e| ParserError::Syntax(format!("Invalid YAML syntax: {}", e)))?;
    document::contract_from_value(&document)
}

/// Parse a contract from a TOML string.
///
/// Field specs use the same keys as in YAML:
///
/// ```rust
/// use contracts_parser::parse_toml;
///
/// let toml = r#"
/// contract_version = "1.0"
/// domain = "iot"
///
/// [schema.device_id]
/// type = "string"
///
/// [schema.value]
/// type = "float"
/// min = -40.0
/// "#;
///
/// let contract = parse_toml(toml).unwrap();
/// assert_eq!(contract.field_count(), 2);
/// ```
pub fn parse_toml(content: &str) -> Result<ContractSchema> {
    let table: toml::Table = toml::from_str(content)
        .map_err(|e| ParserError::Syntax(format!("Invalid TOML syntax: {}", e)))?;
    let document = document::toml_to_yaml(toml::Value::Table(table));
    document::contract_from_value(&document)
}

/// Detect the contract format from a file path based on its extension.
///
/// # Supported Extensions
///
/// * `.yaml`, `.yml` → `ContractFormat::Yaml`
/// * `.toml` → `ContractFormat::Toml`
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<ContractFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(ContractFormat::Yaml),
        "toml" => Ok(ContractFormat::Toml),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a contract from a file with automatic format detection.
///
/// ```no_run
/// use contracts_parser::parse_file;
/// use std::path::Path;
///
/// let contract = parse_file(Path::new("contracts/user_events.yml")).unwrap();
/// println!("Loaded contract for domain {}", contract.domain);
/// ```
pub fn parse_file(path: &Path) -> Result<ContractSchema> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        ContractFormat::Yaml => parse_yaml(&content),
        ContractFormat::Toml => parse_toml(&content),
    }
}
