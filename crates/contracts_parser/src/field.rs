//! Field definition parsing.
//!
//! Every field spec, at any nesting depth, goes through
//! [`validate_field_definition`]: array items are validated as `name[]` and
//! object properties as `name.property`, so error messages always carry the
//! full path of the offending definition.

use std::collections::BTreeMap;

use contracts_core::{
    ArrayRules, FieldDefinition, FieldKind, FieldType, Literal, NumericRules, ObjectRules,
    StringFormat, StringRules, TemporalBound, TemporalRules,
};
use serde_yaml_ng::{Mapping, Value};
use tracing::{debug, warn};

use crate::{ParserError, Result};

/// Keys accepted on every field spec, whatever its type.
const COMMON_KEYS: [&str; 3] = ["type", "required", "description"];

/// Constraint keys; each applies to a subset of the types.
const CONSTRAINT_KEYS: [&str; 9] = [
    "pattern",
    "format",
    "min",
    "max",
    "min_length",
    "max_length",
    "enum",
    "items",
    "properties",
];

fn applicable_keys(field_type: FieldType) -> &'static [&'static str] {
    match field_type {
        FieldType::String => &["pattern", "format", "min_length", "max_length", "enum"],
        FieldType::Integer | FieldType::Float => &["min", "max", "enum"],
        FieldType::Timestamp | FieldType::Date => &["min", "max"],
        FieldType::Array => &["items", "min_length", "max_length", "min", "max"],
        FieldType::Object => &["properties"],
        FieldType::Boolean => &[],
    }
}

/// Validates one field spec and builds its definition.
///
/// `name` is the path used in errors and as the prefix of nested paths.
///
/// # Example
///
/// ```rust
/// use contracts_core::FieldType;
/// use contracts_parser::validate_field_definition;
///
/// let spec: serde_yaml_ng::Value =
///     serde_yaml_ng::from_str("{ type: array, items: { type: integer, min: 0 } }").unwrap();
/// let field = validate_field_definition("scores", &spec).unwrap();
///
/// assert_eq!(field.items().unwrap().field_type(), FieldType::Integer);
/// ```
pub fn validate_field_definition(name: &str, spec: &Value) -> Result<FieldDefinition> {
    let map = spec.as_mapping().ok_or_else(|| {
        ParserError::invalid(name, format!("field '{}' specification must be a mapping", name))
    })?;
    let spec = FieldSpec { name, map };

    let field_type = spec.field_type()?;
    spec.skip_inapplicable_keys(field_type)?;

    let kind = match field_type {
        FieldType::String => FieldKind::String(spec.string_rules()?),
        FieldType::Integer => FieldKind::Integer(spec.numeric_rules()?),
        FieldType::Float => FieldKind::Float(spec.numeric_rules()?),
        FieldType::Boolean => FieldKind::Boolean,
        FieldType::Timestamp => FieldKind::Timestamp(spec.temporal_rules()?),
        FieldType::Date => FieldKind::Date(spec.temporal_rules()?),
        FieldType::Array => FieldKind::Array(spec.array_rules()?),
        FieldType::Object => FieldKind::Object(spec.object_rules()?),
    };

    let definition = FieldDefinition {
        required: spec.required()?,
        description: spec.description()?,
        kind,
    };
    definition.validate_constraints(name)?;
    Ok(definition)
}

struct FieldSpec<'a> {
    name: &'a str,
    map: &'a Mapping,
}

impl<'a> FieldSpec<'a> {
    /// Returns the value of `key`, treating an explicit null as absent.
    fn get(&self, key: &str) -> Option<&'a Value> {
        match self.map.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    fn invalid(&self, message: impl Into<String>) -> ParserError {
        ParserError::invalid(self.name, message)
    }

    fn field_type(&self) -> Result<FieldType> {
        let raw = self
            .get("type")
            .ok_or_else(|| self.invalid(format!("field '{}' must specify 'type'", self.name)))?;
        let raw = raw
            .as_str()
            .ok_or_else(|| self.invalid("'type' must be a string"))?;

        raw.parse::<FieldType>().map_err(|_| {
            self.invalid(format!(
                "invalid type '{}'. Must be one of: {}",
                raw,
                FieldType::ALL.map(|t| t.as_str()).join(", ")
            ))
        })
    }

    /// Logs constraints that do not apply to `field_type` and keys outside
    /// the contract vocabulary. Neither is read when building the rules.
    fn skip_inapplicable_keys(&self, field_type: FieldType) -> Result<()> {
        let applicable = applicable_keys(field_type);
        for (key, value) in self.map {
            let Some(key) = key.as_str() else {
                return Err(self.invalid("spec keys must be strings"));
            };
            if COMMON_KEYS.contains(&key) || applicable.contains(&key) || value.is_null() {
                continue;
            }
            if CONSTRAINT_KEYS.contains(&key) {
                warn!(
                    "Ignoring '{}' on field '{}': it does not apply to {} fields",
                    key, self.name, field_type
                );
                continue;
            }
            debug!("Ignoring unknown key '{}' on field '{}'", key, self.name);
        }
        Ok(())
    }

    fn required(&self) -> Result<bool> {
        match self.get("required") {
            None => Ok(true),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(self.invalid("'required' must be a boolean")),
        }
    }

    fn description(&self) -> Result<Option<String>> {
        match self.get("description") {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.invalid("'description' must be a string")),
        }
    }

    /// Empty strings count as absent.
    fn text(&self, key: &str) -> Result<Option<&'a str>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(self.invalid(format!("'{}' must be a string", key))),
        }
    }

    fn number(&self, key: &str) -> Result<Option<f64>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| self.invalid(format!("'{}' must be a number", key))),
            Some(_) => Err(self.invalid(format!("'{}' must be a number", key))),
        }
    }

    fn count(&self, key: &str) -> Result<Option<usize>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| {
                    self.invalid(format!("'{}' must be a non-negative integer", key))
                }),
        }
    }

    fn instant(&self, key: &str) -> Result<Option<TemporalBound>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => TemporalBound::parse(s.as_str())
                .map(Some)
                .ok_or_else(|| {
                    self.invalid(format!(
                        "'{}' must be an ISO 8601 date or date-time, got '{}'",
                        key, s
                    ))
                }),
            Some(_) => Err(self.invalid(format!(
                "'{}' must be an ISO 8601 date or date-time",
                key
            ))),
        }
    }

    /// Reads `enum`, dropping literals of the wrong type. A list left empty
    /// counts as absent.
    fn allowed(&self, numeric: bool) -> Result<Option<Vec<Literal>>> {
        let Some(value) = self.get("enum") else {
            return Ok(None);
        };
        let items = value
            .as_sequence()
            .ok_or_else(|| self.invalid("'enum' must be a list of values"))?;

        let mut literals = Vec::with_capacity(items.len());
        for item in items {
            let literal = literal(item)
                .ok_or_else(|| self.invalid("'enum' values must be scalars"))?;
            let matches_type = if numeric {
                literal.as_f64().is_some()
            } else {
                matches!(literal, Literal::String(_))
            };
            if !matches_type {
                warn!(
                    "Ignoring enum value '{}' on field '{}': it does not match the field type",
                    literal, self.name
                );
                continue;
            }
            literals.push(literal);
        }

        Ok((!literals.is_empty()).then_some(literals))
    }

    fn string_rules(&self) -> Result<StringRules> {
        let format = self
            .text("format")?
            .map(|raw| {
                raw.parse::<StringFormat>().map_err(|_| {
                    self.invalid(format!(
                        "invalid format '{}'. Must be one of: {}",
                        raw,
                        StringFormat::ALL.map(|f| f.as_str()).join(", ")
                    ))
                })
            })
            .transpose()?;

        Ok(StringRules {
            pattern: self.text("pattern")?.map(str::to_string),
            format,
            min_length: self.count("min_length")?,
            max_length: self.count("max_length")?,
            allowed: self.allowed(false)?,
        })
    }

    fn numeric_rules(&self) -> Result<NumericRules> {
        Ok(NumericRules {
            min: self.number("min")?,
            max: self.number("max")?,
            allowed: self.allowed(true)?,
        })
    }

    fn temporal_rules(&self) -> Result<TemporalRules> {
        Ok(TemporalRules {
            min: self.instant("min")?,
            max: self.instant("max")?,
        })
    }

    /// `min`/`max` are accepted as aliases of `min_length`/`max_length`.
    fn array_rules(&self) -> Result<ArrayRules> {
        let items = self.get("items").ok_or_else(|| {
            self.invalid(format!("array field '{}' must specify 'items'", self.name))
        })?;
        let items = validate_field_definition(&format!("{}[]", self.name), items)?;

        Ok(ArrayRules {
            items: Box::new(items),
            min_items: self.aliased_count("min_length", "min")?,
            max_items: self.aliased_count("max_length", "max")?,
        })
    }

    fn aliased_count(&self, key: &str, alias: &str) -> Result<Option<usize>> {
        match (self.count(key)?, self.count(alias)?) {
            (Some(_), Some(_)) => Err(self.invalid(format!(
                "'{}' and '{}' are aliases; specify only one",
                key, alias
            ))),
            (primary, secondary) => Ok(primary.or(secondary)),
        }
    }

    fn object_rules(&self) -> Result<ObjectRules> {
        let properties = self.get("properties").ok_or_else(|| {
            self.invalid(format!(
                "object field '{}' must specify 'properties'",
                self.name
            ))
        })?;
        let properties = properties
            .as_mapping()
            .ok_or_else(|| self.invalid("'properties' must be a mapping"))?;

        let mut parsed = BTreeMap::new();
        for (name, spec) in properties {
            let name = name
                .as_str()
                .ok_or_else(|| self.invalid("property names must be strings"))?;
            let path = format!("{}.{}", self.name, name);
            parsed.insert(name.to_string(), validate_field_definition(&path, spec)?);
        }
        Ok(ObjectRules { properties: parsed })
    }
}

fn literal(value: &Value) -> Option<Literal> {
    match value {
        Value::Bool(b) => Some(Literal::Boolean(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(Literal::Integer)
            .or_else(|| n.as_f64().map(Literal::Float)),
        Value::String(s) => Some(Literal::String(s.clone())),
        _ => None,
    }
}
