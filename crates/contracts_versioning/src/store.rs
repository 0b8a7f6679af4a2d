//! Storage of contracts and their version history.

use chrono::{DateTime, Utc};
use contracts_core::ChangeReport;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{ChangeType, Result, SemanticVersion, VersioningError};

/// The current state of a registered contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRecord {
    pub contract_id: String,
    /// Contract text of the current version
    pub content: String,
    pub version: SemanticVersion,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry of a contract's version history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: SemanticVersion,
    /// Contract text exactly as submitted
    pub content: String,
    pub change_type: ChangeType,
    pub change_summary: ChangeSummary,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

/// The change report stored with a version, plus rollback details for
/// rollback versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSummary {
    #[serde(flatten)]
    pub report: ChangeReport,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback_info: Option<RollbackInfo>,
}

impl ChangeSummary {
    pub fn from_report(report: ChangeReport) -> Self {
        Self {
            report,
            rollback_info: None,
        }
    }
}

/// Where a rollback came from and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackInfo {
    pub from_version: SemanticVersion,
    pub to_version: SemanticVersion,
    pub reason: String,
}

/// Persistence for contracts and their versions.
///
/// Both mutating operations must be atomic: either every write they imply
/// happens, or none does. Mutation takes `&mut self`, so callers sharing a
/// store across threads wrap it in their own lock or transaction.
pub trait VersionStore {
    /// Returns the current state of a contract.
    fn load_contract(&self, contract_id: &str) -> Result<Option<ContractRecord>>;

    /// Stores a new contract together with its first version.
    fn insert_contract(&mut self, contract: ContractRecord, initial: VersionRecord) -> Result<()>;

    /// Appends a version and makes it the contract's current one. A version
    /// number already in the history is rejected before anything changes.
    fn append_version(&mut self, contract_id: &str, record: VersionRecord) -> Result<ContractRecord>;

    /// Returns up to `limit` versions, newest first.
    fn list_versions(&self, contract_id: &str, limit: usize) -> Result<Vec<VersionRecord>>;

    /// Returns one version of a contract.
    fn get_version(
        &self,
        contract_id: &str,
        version: &SemanticVersion,
    ) -> Result<Option<VersionRecord>>;
}

#[derive(Debug, Clone)]
struct StoredContract {
    current: ContractRecord,
    /// Oldest first
    versions: Vec<VersionRecord>,
}

/// A [`VersionStore`] kept in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVersionStore {
    contracts: HashMap<String, StoredContract>,
}

impl InMemoryVersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered contracts.
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

impl VersionStore for InMemoryVersionStore {
    fn load_contract(&self, contract_id: &str) -> Result<Option<ContractRecord>> {
        Ok(self.contracts.get(contract_id).map(|c| c.current.clone()))
    }

    fn insert_contract(&mut self, contract: ContractRecord, initial: VersionRecord) -> Result<()> {
        if self.contracts.contains_key(&contract.contract_id) {
            return Err(VersioningError::DuplicateContract(contract.contract_id));
        }
        self.contracts.insert(
            contract.contract_id.clone(),
            StoredContract {
                current: contract,
                versions: vec![initial],
            },
        );
        Ok(())
    }

    fn append_version(&mut self, contract_id: &str, record: VersionRecord) -> Result<ContractRecord> {
        let stored = self
            .contracts
            .get_mut(contract_id)
            .ok_or_else(|| VersioningError::ContractNotFound(contract_id.to_string()))?;

        if stored.versions.iter().any(|v| v.version == record.version) {
            return Err(VersioningError::DuplicateVersion {
                contract_id: contract_id.to_string(),
                version: record.version.to_string(),
            });
        }

        stored.current.content = record.content.clone();
        stored.current.version = record.version.clone();
        stored.current.updated_at = record.created_at;
        stored.versions.push(record);
        Ok(stored.current.clone())
    }

    fn list_versions(&self, contract_id: &str, limit: usize) -> Result<Vec<VersionRecord>> {
        let stored = self
            .contracts
            .get(contract_id)
            .ok_or_else(|| VersioningError::ContractNotFound(contract_id.to_string()))?;
        Ok(stored.versions.iter().rev().take(limit).cloned().collect())
    }

    fn get_version(
        &self,
        contract_id: &str,
        version: &SemanticVersion,
    ) -> Result<Option<VersionRecord>> {
        Ok(self
            .contracts
            .get(contract_id)
            .and_then(|c| c.versions.iter().find(|v| &v.version == version))
            .cloned())
    }
}
