//! Contract serialization back to YAML.

use contracts_core::{ContractSchema, FieldDefinition, FieldKind, Literal, TemporalBound};
use serde_yaml_ng::{Mapping, Value};

use crate::{ParserError, Result};

/// Largest magnitude written as an integer for integer fields.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Serializes a contract to YAML.
///
/// The output is the inverse of [`crate::parse_yaml`]: parsing it yields a
/// contract equal to the input, though not necessarily the original text.
///
/// # Example
///
/// ```rust
/// use contracts_core::{ContractSchemaBuilder, FieldBuilder};
/// use contracts_parser::{parse_yaml, to_yaml};
///
/// let contract = ContractSchemaBuilder::new("1.0")
///     .field("id", FieldBuilder::string().min_length(3).build())
///     .build()
///     .unwrap();
///
/// let yaml = to_yaml(&contract).unwrap();
/// assert_eq!(parse_yaml(&yaml).unwrap(), contract);
/// ```
pub fn to_yaml(contract: &ContractSchema) -> Result<String> {
    let mut document = Mapping::new();
    document.insert(
        key("contract_version"),
        Value::String(contract.contract_version.clone()),
    );
    document.insert(key("domain"), Value::String(contract.domain.clone()));
    if let Some(description) = &contract.description {
        document.insert(key("description"), Value::String(description.clone()));
    }

    let mut schema = Mapping::new();
    for (name, field) in &contract.schema {
        schema.insert(Value::String(name.clone()), field_to_value(field));
    }
    document.insert(key("schema"), Value::Mapping(schema));

    if let Some(rules) = contract.quality_rules.as_ref().filter(|r| !r.is_empty()) {
        let rules = serde_yaml_ng::to_value(rules)
            .map_err(|e| ParserError::Serialization(e.to_string()))?;
        document.insert(key("quality_rules"), rules);
    }

    serde_yaml_ng::to_string(&Value::Mapping(document))
        .map_err(|e| ParserError::Serialization(e.to_string()))
}

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

fn field_to_value(field: &FieldDefinition) -> Value {
    let mut spec = Mapping::new();
    spec.insert(key("type"), key(field.field_type().as_str()));
    spec.insert(key("required"), Value::Bool(field.required));
    if let Some(description) = &field.description {
        spec.insert(key("description"), Value::String(description.clone()));
    }

    match &field.kind {
        FieldKind::String(rules) => {
            insert_opt(&mut spec, "pattern", rules.pattern.clone().map(Value::String));
            insert_opt(&mut spec, "format", rules.format.map(|f| key(f.as_str())));
            insert_opt(&mut spec, "min_length", rules.min_length.map(Value::from));
            insert_opt(&mut spec, "max_length", rules.max_length.map(Value::from));
            insert_opt(&mut spec, "enum", rules.allowed.as_deref().map(literals));
        }
        FieldKind::Integer(rules) => {
            insert_opt(&mut spec, "min", rules.min.map(integral));
            insert_opt(&mut spec, "max", rules.max.map(integral));
            insert_opt(&mut spec, "enum", rules.allowed.as_deref().map(literals));
        }
        FieldKind::Float(rules) => {
            insert_opt(&mut spec, "min", rules.min.map(Value::from));
            insert_opt(&mut spec, "max", rules.max.map(Value::from));
            insert_opt(&mut spec, "enum", rules.allowed.as_deref().map(literals));
        }
        FieldKind::Timestamp(rules) | FieldKind::Date(rules) => {
            insert_opt(&mut spec, "min", rules.min.as_ref().map(instant));
            insert_opt(&mut spec, "max", rules.max.as_ref().map(instant));
        }
        FieldKind::Array(rules) => {
            insert_opt(&mut spec, "min_length", rules.min_items.map(Value::from));
            insert_opt(&mut spec, "max_length", rules.max_items.map(Value::from));
            spec.insert(key("items"), field_to_value(&rules.items));
        }
        FieldKind::Object(rules) => {
            let mut properties = Mapping::new();
            for (name, property) in &rules.properties {
                properties.insert(Value::String(name.clone()), field_to_value(property));
            }
            spec.insert(key("properties"), Value::Mapping(properties));
        }
        FieldKind::Boolean => {}
    }

    Value::Mapping(spec)
}

fn insert_opt(spec: &mut Mapping, name: &str, value: Option<Value>) {
    if let Some(value) = value {
        spec.insert(key(name), value);
    }
}

/// Whole-valued bounds of integer fields are written without a fraction.
fn integral(bound: f64) -> Value {
    if bound.fract() == 0.0 && bound.abs() <= MAX_EXACT_INTEGER {
        Value::from(bound as i64)
    } else {
        Value::from(bound)
    }
}

fn instant(bound: &TemporalBound) -> Value {
    Value::String(bound.raw().to_string())
}

fn literals(values: &[Literal]) -> Value {
    Value::Sequence(
        values
            .iter()
            .map(|literal| match literal {
                Literal::Boolean(b) => Value::Bool(*b),
                Literal::Integer(i) => Value::from(*i),
                Literal::Float(f) => Value::from(*f),
                Literal::String(s) => Value::String(s.clone()),
            })
            .collect(),
    )
}
