pub mod bump;
pub mod check;
pub mod diff;
pub mod init;
pub mod validate;

use anyhow::{Context, Result};
use contracts_core::ContractSchema;
use contracts_parser::parse_file;
use std::path::Path;

/// Parses a contract file, naming the path on failure.
pub(crate) fn load_contract(path: &str) -> Result<ContractSchema> {
    parse_file(Path::new(path)).with_context(|| format!("Failed to parse contract file: {}", path))
}
