use anyhow::Result;
use contracts_versioning::{ChangeDetector, ChangeType, SemanticVersion};
use tracing::info;

use super::load_contract;
use crate::output;

pub fn execute(current: &str, old_path: &str, new_path: &str) -> Result<()> {
    let current = SemanticVersion::parse(current)?;
    info!("Computing next version from v{}", current);

    let old = load_contract(old_path)?;
    let new = load_contract(new_path)?;
    let report = ChangeDetector::new().detect_changes(&old, &new);

    let next = current.bump(&report)?;
    let change_type = ChangeType::from_report(&report);

    output::print_success(&format!("v{} -> v{} ({})", current, next, change_type));
    println!("  Next version: {}", next);
    println!("  Change type:  {}", change_type);
    println!("  {}", report.summary);

    Ok(())
}
