//! Version lifecycle of stored contracts.

use chrono::Utc;
use contracts_core::{ChangeReport, ContractSchema};
use contracts_parser::parse_yaml;
use tracing::{debug, info};

use crate::{
    ChangeDetector, ChangeSummary, ChangeType, ContractRecord, Result, RollbackInfo,
    SemanticVersion, VersionRecord, VersionStore, VersioningError,
};

/// Derives, records and restores contract versions on top of a
/// [`VersionStore`].
///
/// Contract texts are YAML documents. Every new version is diffed against
/// the current one and numbered by the kind of change it makes.
///
/// # Example
///
/// ```rust
/// use contracts_versioning::{ChangeType, InMemoryVersionStore, VersionController};
///
/// let mut controller = VersionController::new(InMemoryVersionStore::new());
/// controller
///     .register_contract("users", "contract_version: '1.0'\nschema:\n  id:\n    type: string\n", "alice")
///     .unwrap();
///
/// let next = controller
///     .create_version(
///         "users",
///         "contract_version: '1.1'\nschema:\n  id:\n    type: string\n  name:\n    type: string\n    required: false\n",
///         "alice",
///     )
///     .unwrap();
///
/// assert_eq!(next.version.to_string(), "1.1.0");
/// assert_eq!(next.change_type, ChangeType::NonBreaking);
/// ```
#[derive(Debug)]
pub struct VersionController<S> {
    store: S,
    detector: ChangeDetector,
}

impl<S: VersionStore> VersionController<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            detector: ChangeDetector::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Registers a new contract at version 1.0.0.
    pub fn register_contract(
        &mut self,
        contract_id: &str,
        content: &str,
        created_by: &str,
    ) -> Result<ContractRecord> {
        parse_yaml(content)?;

        let now = Utc::now();
        let version = SemanticVersion::initial();
        let contract = ContractRecord {
            contract_id: contract_id.to_string(),
            content: content.to_string(),
            version: version.clone(),
            created_at: now,
            updated_at: now,
        };
        let mut report = ChangeReport::empty();
        report.summary = "Initial contract creation".to_string();
        let initial = VersionRecord {
            version,
            content: content.to_string(),
            change_type: ChangeType::Initial,
            change_summary: ChangeSummary::from_report(report),
            created_at: now,
            created_by: created_by.to_string(),
        };

        self.store.insert_contract(contract.clone(), initial)?;
        info!("Registered contract {} at v{}", contract_id, contract.version);
        Ok(contract)
    }

    /// Records `content` as the next version of a contract.
    ///
    /// The version number follows from the changes against the current
    /// version. Resubmitting identical content still produces a patch
    /// version.
    pub fn create_version(
        &mut self,
        contract_id: &str,
        content: &str,
        created_by: &str,
    ) -> Result<VersionRecord> {
        let current = self.load(contract_id)?;
        let new_schema = parse_yaml(content)?;
        let current_schema = parse_stored(contract_id, &current.content)?;

        let report = self.detector.detect_changes(&current_schema, &new_schema);
        let change_type = ChangeType::from_report(&report);
        let version = self.calculate_next_version(&current.version, &report)?;

        let record = VersionRecord {
            version,
            content: content.to_string(),
            change_type,
            change_summary: ChangeSummary::from_report(report),
            created_at: Utc::now(),
            created_by: created_by.to_string(),
        };
        self.store.append_version(contract_id, record.clone())?;

        info!(
            "Contract {}: v{} -> v{} ({})",
            contract_id, current.version, record.version, change_type
        );
        Ok(record)
    }

    /// Next version number for `report` applied on top of `current`.
    pub fn calculate_next_version(
        &self,
        current: &SemanticVersion,
        report: &ChangeReport,
    ) -> Result<SemanticVersion> {
        current.bump(report)
    }

    /// Makes the text of `target_version` current again.
    ///
    /// The restored text gets a new major version; history is never
    /// rewritten.
    pub fn rollback_to_version(
        &mut self,
        contract_id: &str,
        target_version: &str,
        created_by: &str,
        reason: &str,
    ) -> Result<ContractRecord> {
        let current = self.load(contract_id)?;
        let target = self.get_version(contract_id, target_version)?;
        let version = current.version.next_major()?;

        let mut report = ChangeReport::empty();
        report.summary = format!("Rolled back from v{} to v{}", current.version, target.version);
        let record = VersionRecord {
            version: version.clone(),
            content: target.content,
            change_type: ChangeType::Rollback,
            change_summary: ChangeSummary {
                report,
                rollback_info: Some(RollbackInfo {
                    from_version: current.version.clone(),
                    to_version: target.version.clone(),
                    reason: reason.to_string(),
                }),
            },
            created_at: Utc::now(),
            created_by: created_by.to_string(),
        };

        let contract = self.store.append_version(contract_id, record)?;
        info!(
            "Contract {} rolled back from v{} to v{} as v{}",
            contract_id, current.version, target.version, version
        );
        Ok(contract)
    }

    /// Diffs two stored versions of a contract.
    pub fn compare_versions(
        &self,
        contract_id: &str,
        from_version: &str,
        to_version: &str,
    ) -> Result<ChangeReport> {
        let from = self.get_version(contract_id, from_version)?;
        let to = self.get_version(contract_id, to_version)?;
        debug!(
            "Comparing contract {} v{} with v{}",
            contract_id, from.version, to.version
        );

        let from_schema = parse_stored(contract_id, &from.content)?;
        let to_schema = parse_stored(contract_id, &to.content)?;
        Ok(self.detector.detect_changes(&from_schema, &to_schema))
    }

    /// Up to `limit` versions, newest first.
    pub fn get_version_history(&self, contract_id: &str, limit: usize) -> Result<Vec<VersionRecord>> {
        self.store.list_versions(contract_id, limit)
    }

    pub fn get_version(&self, contract_id: &str, version: &str) -> Result<VersionRecord> {
        let version = SemanticVersion::parse(version)?;
        self.load(contract_id)?;
        self.store
            .get_version(contract_id, &version)?
            .ok_or_else(|| VersioningError::version_not_found(contract_id, &version))
    }

    /// Schema of the current version.
    pub fn current_schema(&self, contract_id: &str) -> Result<ContractSchema> {
        let current = self.load(contract_id)?;
        parse_stored(contract_id, &current.content)
    }

    fn load(&self, contract_id: &str) -> Result<ContractRecord> {
        self.store
            .load_contract(contract_id)?
            .ok_or_else(|| VersioningError::ContractNotFound(contract_id.to_string()))
    }
}

fn parse_stored(contract_id: &str, content: &str) -> Result<ContractSchema> {
    parse_yaml(content).map_err(|e| VersioningError::corrupt(contract_id, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryVersionStore;

    const V1: &str = "contract_version: '1.0'\nschema:\n  id:\n    type: string\n";

    #[test]
    fn test_invalid_content_is_rejected_before_storing() {
        let mut controller = VersionController::new(InMemoryVersionStore::new());
        let err = controller
            .register_contract("c", "schema: {}", "tester")
            .unwrap_err();

        assert!(matches!(err, VersioningError::InvalidContract(_)));
        assert!(controller.store().is_empty());
    }

    #[test]
    fn test_invalid_new_version_leaves_history_untouched() {
        let mut controller = VersionController::new(InMemoryVersionStore::new());
        controller.register_contract("c", V1, "tester").unwrap();

        let err = controller
            .create_version("c", "contract_version: '2.0'\n", "tester")
            .unwrap_err();
        assert!(matches!(err, VersioningError::InvalidContract(_)));
        assert_eq!(controller.get_version_history("c", 10).unwrap().len(), 1);
    }

    #[test]
    fn test_unchanged_content_bumps_patch() {
        let mut controller = VersionController::new(InMemoryVersionStore::new());
        controller.register_contract("c", V1, "tester").unwrap();

        let record = controller.create_version("c", V1, "tester").unwrap();
        assert_eq!(record.version.to_string(), "1.0.1");
        assert_eq!(record.change_type, ChangeType::Patch);
        assert_eq!(record.change_summary.report.summary, "No changes detected");
    }

    #[test]
    fn test_malformed_version_argument() {
        let mut controller = VersionController::new(InMemoryVersionStore::new());
        controller.register_contract("c", V1, "tester").unwrap();

        assert!(matches!(
            controller.get_version("c", "latest").unwrap_err(),
            VersioningError::InvalidVersion { .. }
        ));
    }

    #[test]
    fn test_next_version_overflow_is_reported() {
        let controller = VersionController::new(InMemoryVersionStore::new());
        let current = SemanticVersion::new(1, 0, u64::MAX);

        let err = controller
            .calculate_next_version(&current, &ChangeReport::empty())
            .unwrap_err();
        assert!(matches!(
            err,
            VersioningError::InvalidVersion { ref version, .. } if version == "1.0.18446744073709551615"
        ));
    }
}
