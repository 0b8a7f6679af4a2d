//! Error types for contract versioning.

use contracts_parser::ParserError;
use thiserror::Error;

/// Result type for versioning operations.
pub type Result<T> = std::result::Result<T, VersioningError>;

/// Errors that can occur while versioning contracts.
#[derive(Debug, Error)]
pub enum VersioningError {
    /// No contract is stored under the id
    #[error("Contract not found: {0}")]
    ContractNotFound(String),

    /// The contract has no version with this number
    #[error("Version {version} not found for contract {contract_id}")]
    VersionNotFound { contract_id: String, version: String },

    /// A contract with this id is already registered
    #[error("Contract already exists: {0}")]
    DuplicateContract(String),

    /// The version number is already taken
    #[error("Version {version} already exists for contract {contract_id}")]
    DuplicateVersion { contract_id: String, version: String },

    /// Incoming contract text failed to parse
    #[error("Invalid contract: {0}")]
    InvalidContract(#[from] ParserError),

    /// A version string is not `major.minor[.patch]`
    #[error("Invalid version '{version}': {message}")]
    InvalidVersion { version: String, message: String },

    /// Stored data cannot be read back
    #[error("Corrupt record for contract {contract_id}: {message}")]
    CorruptRecord { contract_id: String, message: String },
}

impl VersioningError {
    pub(crate) fn version_not_found(contract_id: &str, version: impl ToString) -> Self {
        VersioningError::VersionNotFound {
            contract_id: contract_id.to_string(),
            version: version.to_string(),
        }
    }

    pub(crate) fn corrupt(contract_id: &str, message: impl ToString) -> Self {
        VersioningError::CorruptRecord {
            contract_id: contract_id.to_string(),
            message: message.to_string(),
        }
    }
}
