use anyhow::Result;
use contracts_core::{ContractSchema, QualityRules};
use serde_json::json;
use tracing::info;

use super::load_contract;
use crate::output::{self, OutputFormat};

pub fn execute(contract_path: &str, format: OutputFormat) -> Result<()> {
    info!("Checking contract: {}", contract_path);

    let contract = load_contract(contract_path)?;
    let rules = contract
        .quality_rules
        .as_ref()
        .map(rule_names)
        .unwrap_or_default();

    match format {
        OutputFormat::Json => output::print_json(&json!({
            "valid": true,
            "contract_version": contract.contract_version,
            "domain": contract.domain,
            "description": contract.description,
            "fields": contract.schema.iter().map(|(name, field)| json!({
                "name": name,
                "type": field.field_type(),
                "required": field.required,
            })).collect::<Vec<_>>(),
            "quality_rules": rules,
        })),
        OutputFormat::Text => {
            output::print_success("Contract is valid");
            print_summary(&contract, &rules);
            Ok(())
        }
    }
}

fn print_summary(contract: &ContractSchema, rules: &[&str]) {
    println!("\nContract Summary:");
    println!("  Version:     {}", contract.contract_version);
    println!("  Domain:      {}", contract.domain);
    println!(
        "  Description: {}",
        contract.description.as_deref().unwrap_or("N/A")
    );
    println!("  Fields:      {}", contract.field_count());

    for (name, field) in &contract.schema {
        let presence = if field.required { "required" } else { "optional" };
        println!("    {:<20} {:<10} {}", name, field.field_type().as_str(), presence);
    }

    if !rules.is_empty() {
        println!("  Quality Rules: {}", rules.join(", "));
    }
}

fn rule_names(rules: &QualityRules) -> Vec<&'static str> {
    let mut names = Vec::new();
    if rules.freshness.is_some() {
        names.push("freshness");
    }
    if rules.completeness.is_some() {
        names.push("completeness");
    }
    if rules.uniqueness.is_some() {
        names.push("uniqueness");
    }
    if rules.statistics.is_some() {
        names.push("statistics");
    }
    names
}
