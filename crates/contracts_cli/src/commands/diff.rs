use anyhow::Result;
use contracts_versioning::ChangeDetector;
use tracing::info;

use super::load_contract;
use crate::output::{self, OutputFormat};

pub fn execute(old_path: &str, new_path: &str, format: OutputFormat) -> Result<()> {
    info!("Comparing {} with {}", old_path, new_path);

    let old = load_contract(old_path)?;
    let new = load_contract(new_path)?;
    let report = ChangeDetector::new().detect_changes(&old, &new);

    output::print_change_report(&report, format)
}
