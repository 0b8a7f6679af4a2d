//! Top-level contract document handling.

use std::collections::BTreeMap;

use contracts_core::{ContractSchema, FieldDefinition};
use serde_yaml_ng::{Mapping, Value};
use tracing::{debug, info, warn};

use crate::field::validate_field_definition;
use crate::quality::validate_quality_rules;
use crate::{ParserError, Result};

/// Builds a contract from an already parsed document tree.
pub(crate) fn contract_from_value(document: &Value) -> Result<ContractSchema> {
    let document = document
        .as_mapping()
        .ok_or_else(|| ParserError::Syntax("contract must be a mapping at the top level".into()))?;

    let required = |key: &str| {
        document
            .get(key)
            .ok_or_else(|| ParserError::MissingRequiredKey {
                key: key.to_string(),
            })
    };
    let version = required("contract_version")?;
    let fields = required("schema")?;

    let contract_version = contract_version(version)?;
    let domain = optional_text(document, "domain")?
        .unwrap_or_else(|| ContractSchema::DEFAULT_DOMAIN.to_string());
    let description = optional_text(document, "description")?;
    let schema = parse_schema(fields)?;

    let quality_rules = match document.get("quality_rules") {
        None | Some(Value::Null) => None,
        Some(rules) => match validate_quality_rules(rules) {
            Ok(rules) if rules.is_empty() => None,
            Ok(rules) => Some(rules),
            Err(e) => {
                warn!("Invalid quality rules, ignoring them: {}", e);
                None
            }
        },
    };

    for (key, _) in document {
        if let Some(key) = key.as_str() {
            if !matches!(
                key,
                "contract_version" | "domain" | "description" | "schema" | "quality_rules"
            ) {
                debug!("Ignoring unknown top-level key '{}'", key);
            }
        }
    }

    let contract = ContractSchema {
        contract_version,
        domain,
        description,
        schema,
        quality_rules,
    };
    contract.validate_constraints()?;

    info!(
        "Successfully parsed contract with {} fields",
        contract.field_count()
    );
    Ok(contract)
}

fn contract_version(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(ParserError::invalid(
            "contract_version",
            "must be a string or a number",
        )),
    }
}

fn optional_text(document: &Mapping, key: &str) -> Result<Option<String>> {
    match document.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ParserError::invalid(key, "must be a string")),
    }
}

fn parse_schema(value: &Value) -> Result<BTreeMap<String, FieldDefinition>> {
    let fields = value
        .as_mapping()
        .ok_or_else(|| ParserError::invalid("schema", "schema must be a mapping"))?;

    if fields.is_empty() {
        return Err(ParserError::invalid(
            "schema",
            "schema must contain at least one field",
        ));
    }

    let mut parsed = BTreeMap::new();
    for (name, spec) in fields {
        let name = name
            .as_str()
            .ok_or_else(|| ParserError::invalid("schema", "field names must be strings"))?;
        parsed.insert(name.to_string(), validate_field_definition(name, spec)?);
    }
    Ok(parsed)
}

/// Converts a TOML tree into the YAML value model so both surface syntaxes
/// share one parsing path. Datetimes become their text form.
pub(crate) fn toml_to_yaml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Sequence(items.into_iter().map(toml_to_yaml).collect()),
        toml::Value::Table(table) => {
            let mut mapping = Mapping::new();
            for (key, value) in table {
                mapping.insert(Value::String(key), toml_to_yaml(value));
            }
            Value::Mapping(mapping)
        }
    }
}
