use anyhow::{Context, Result};
use contracts_core::ValidationContext;
use contracts_validator::{Payload, ValidationEngine};
use serde_json::Value;
use std::fs;
use tracing::info;

use super::load_contract;
use crate::output::{self, OutputFormat};

pub fn execute(
    contract_path: &str,
    records_path: &str,
    strict: bool,
    schema_only: bool,
    sample_size: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    info!("Validating {} against contract {}", records_path, contract_path);
    info!("Strict mode: {}", strict);
    info!("Schema only: {}", schema_only);
    if let Some(size) = sample_size {
        info!("Sample size: {}", size);
    }

    let contract = load_contract(contract_path)?;
    if format == OutputFormat::Text {
        output::print_info(&format!(
            "Contract loaded: {} v{} ({} fields)",
            contract.domain,
            contract.contract_version,
            contract.field_count()
        ));
    }

    let text = fs::read_to_string(records_path)
        .with_context(|| format!("Failed to read records file: {}", records_path))?;
    let document: Value = serde_json::from_str(&text)
        .with_context(|| format!("Records file is not valid JSON: {}", records_path))?;

    let mut context = ValidationContext::new()
        .with_strict(strict)
        .with_schema_only(schema_only);
    if let Some(size) = sample_size {
        context = context.with_sample_size(size);
    }
    let engine = ValidationEngine::new(&contract, context);

    let payload = Payload::from_json(&document).with_context(|| {
        format!(
            "Records file must hold a JSON object or an array of objects: {}",
            records_path
        )
    })?;

    let passed = match payload {
        Payload::Record(record) => {
            let report = engine.validate_json_record(record)?;
            output::print_record_report(&report, format)?;
            report.passed()
        }
        Payload::Batch(records) => {
            let report = engine.validate_json_batch(records)?;
            output::print_batch_report(&report, format)?;
            report.status.is_pass()
        }
    };

    if !passed {
        std::process::exit(1);
    }

    Ok(())
}
