//! Schema validation logic.
//!
//! This module checks single records against the field definitions of a
//! contract: presence, types, string rules, numeric and temporal bounds, and
//! nested arrays and objects.

use crate::{DataRow, DataValue, ErrorType, PatternTable, ValidationError};
use chrono::{DateTime, Utc};
use contracts_core::temporal::{instant_from_epoch, parse_instant};
use contracts_core::{
    ArrayRules, ContractSchema, FieldDefinition, FieldKind, Literal, MAX_ARRAY_ITEMS_CHECKED,
    MAX_ERRORS_PER_RECORD, NumericRules, ObjectRules, StringRules, TemporalRules,
};
use std::collections::{BTreeMap, HashMap};

/// Validates records against the schema of one contract.
///
/// Built once per contract; every regular expression the schema needs is
/// compiled up front, so the same validator can check any number of records
/// from any number of threads.
///
/// # Example
///
/// ```rust
/// use contracts_core::{ContractSchemaBuilder, FieldBuilder};
/// use contracts_validator::{DataRow, DataValue, ErrorType, RecordValidator};
///
/// let schema = ContractSchemaBuilder::new("1.0")
///     .field("age", FieldBuilder::integer().min(0.0).build())
///     .build()
///     .unwrap();
/// let validator = RecordValidator::new(&schema);
///
/// let record = DataRow::from([("age".to_string(), DataValue::Int(-5))]);
/// let errors = validator.validate(&record);
/// assert_eq!(errors[0].error_type, ErrorType::ValueTooSmall);
/// ```
#[derive(Debug, Clone)]
pub struct RecordValidator {
    fields: BTreeMap<String, FieldDefinition>,
    patterns: PatternTable,
}

/// Where a checked value lives; decides the wording of presence errors.
#[derive(Clone, Copy)]
enum Member {
    Field,
    Property,
}

impl RecordValidator {
    /// Creates a validator for the given contract schema.
    pub fn new(schema: &ContractSchema) -> Self {
        Self {
            fields: schema.schema.clone(),
            patterns: PatternTable::for_schema(schema),
        }
    }

    /// Validates one record.
    ///
    /// Returns at most ten errors, in field-name order. An empty list means
    /// the record conforms. Keys the contract does not declare are ignored.
    pub fn validate(&self, record: &DataRow) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (name, field) in &self.fields {
            self.check_member(name, name, record.get(name), field, Member::Field, &mut errors);
            if errors.len() >= MAX_ERRORS_PER_RECORD {
                break;
            }
        }

        errors.truncate(MAX_ERRORS_PER_RECORD);
        errors
    }

    /// Applies the presence and null rules, then checks the value.
    fn check_member(
        &self,
        path: &str,
        name: &str,
        value: Option<&DataValue>,
        field: &FieldDefinition,
        member: Member,
        errors: &mut Vec<ValidationError>,
    ) {
        let value = match value {
            Some(value) => value,
            None => {
                if field.required {
                    errors.push(missing(path, name, member));
                }
                return;
            }
        };

        if value.is_null() && !field.required {
            return;
        }

        self.check_value(path, value, field, errors);
    }

    fn check_value(
        &self,
        path: &str,
        value: &DataValue,
        field: &FieldDefinition,
        errors: &mut Vec<ValidationError>,
    ) {
        if let Some(err) = check_type(path, value, field) {
            errors.push(err);
            return;
        }

        match (&field.kind, value) {
            (FieldKind::String(rules), DataValue::String(text)) => {
                self.check_string(path, text, rules, errors)
            }
            (FieldKind::Integer(rules) | FieldKind::Float(rules), _) => {
                if let Some(number) = value.as_float() {
                    check_number(path, value, number, rules, errors)
                }
            }
            (FieldKind::Timestamp(rules) | FieldKind::Date(rules), _) => {
                check_temporal(path, value, rules, errors)
            }
            (FieldKind::Array(rules), DataValue::List(items)) => {
                self.check_array(path, items, rules, errors)
            }
            (FieldKind::Object(rules), DataValue::Map(map)) => {
                self.check_object(path, map, rules, errors)
            }
            _ => {}
        }
    }

    fn check_string(
        &self,
        path: &str,
        text: &str,
        rules: &StringRules,
        errors: &mut Vec<ValidationError>,
    ) {
        if let Some(pattern) = &rules.pattern {
            if !self.patterns.matches_pattern(pattern, text) {
                errors.push(
                    ValidationError::new(
                        path,
                        ErrorType::PatternMismatch,
                        format!("Value does not match pattern: {}", pattern),
                    )
                    .with_value(text)
                    .with_expected(pattern.clone()),
                );
            }
        }

        if let Some(format) = rules.format {
            if !self.patterns.matches_format(format, text) {
                errors.push(
                    ValidationError::new(
                        path,
                        ErrorType::FormatMismatch,
                        format!("Value does not match format: {}", format),
                    )
                    .with_value(text)
                    .with_expected(format.as_str()),
                );
            }
        }

        let length = text.chars().count();
        if let Some(min_length) = rules.min_length {
            if length < min_length {
                errors.push(
                    ValidationError::new(
                        path,
                        ErrorType::LengthTooShort,
                        format!("Length {} is less than minimum {}", length, min_length),
                    )
                    .with_value(text)
                    .with_expected(format!("min_length: {}", min_length)),
                );
            }
        }
        if let Some(max_length) = rules.max_length {
            if length > max_length {
                errors.push(
                    ValidationError::new(
                        path,
                        ErrorType::LengthTooLong,
                        format!("Length {} exceeds maximum {}", length, max_length),
                    )
                    .with_value(text)
                    .with_expected(format!("max_length: {}", max_length)),
                );
            }
        }

        if let Some(allowed) = &rules.allowed {
            let listed = allowed
                .iter()
                .any(|literal| matches!(literal, Literal::String(s) if s == text));
            if !listed {
                errors.push(enum_mismatch(path, text, allowed));
            }
        }
    }

    fn check_array(
        &self,
        path: &str,
        items: &[DataValue],
        rules: &ArrayRules,
        errors: &mut Vec<ValidationError>,
    ) {
        let count = items.len();
        let shown = format!("[{} items]", count);

        if let Some(min_items) = rules.min_items {
            if count < min_items {
                errors.push(
                    ValidationError::new(
                        path,
                        ErrorType::ArrayTooShort,
                        format!("Array length {} less than minimum {}", count, min_items),
                    )
                    .with_value(&shown)
                    .with_expected(format!("min: {}", min_items)),
                );
            }
        }
        if let Some(max_items) = rules.max_items {
            if count > max_items {
                errors.push(
                    ValidationError::new(
                        path,
                        ErrorType::ArrayTooLong,
                        format!("Array length {} exceeds maximum {}", count, max_items),
                    )
                    .with_value(&shown)
                    .with_expected(format!("max: {}", max_items)),
                );
            }
        }

        for (index, item) in items.iter().take(MAX_ARRAY_ITEMS_CHECKED).enumerate() {
            if errors.len() >= MAX_ERRORS_PER_RECORD {
                break;
            }
            let item_path = format!("{}[{}]", path, index);
            self.check_member(&item_path, &item_path, Some(item), &rules.items, Member::Property, errors);
        }
    }

    fn check_object(
        &self,
        path: &str,
        map: &HashMap<String, DataValue>,
        rules: &ObjectRules,
        errors: &mut Vec<ValidationError>,
    ) {
        for (name, property) in &rules.properties {
            if errors.len() >= MAX_ERRORS_PER_RECORD {
                break;
            }
            let property_path = format!("{}.{}", path, name);
            self.check_member(
                &property_path,
                name,
                map.get(name),
                property,
                Member::Property,
                errors,
            );
        }
    }
}

fn missing(path: &str, name: &str, member: Member) -> ValidationError {
    let (message, expected) = match member {
        Member::Field => (format!("Required field '{}' is missing", name), "required field"),
        Member::Property => (
            format!("Required property '{}' is missing", name),
            "required property",
        ),
    };
    ValidationError::new(path, ErrorType::RequiredFieldMissing, message).with_expected(expected)
}

/// A float field accepts integers; booleans never pass as numbers.
fn check_type(path: &str, value: &DataValue, field: &FieldDefinition) -> Option<ValidationError> {
    let matches = match &field.kind {
        FieldKind::String(_) => matches!(value, DataValue::String(_)),
        FieldKind::Integer(_) => matches!(value, DataValue::Int(_)),
        FieldKind::Float(_) => matches!(value, DataValue::Int(_) | DataValue::Float(_)),
        FieldKind::Boolean => matches!(value, DataValue::Bool(_)),
        FieldKind::Timestamp(_) => matches!(
            value,
            DataValue::String(_) | DataValue::Int(_) | DataValue::Float(_)
        ),
        FieldKind::Date(_) => matches!(value, DataValue::String(_)),
        FieldKind::Array(_) => matches!(value, DataValue::List(_)),
        FieldKind::Object(_) => matches!(value, DataValue::Map(_)),
    };

    if matches {
        return None;
    }

    let expected = field.field_type();
    Some(
        ValidationError::new(
            path,
            ErrorType::TypeMismatch,
            format!("Expected {}, got {}", expected, value.type_name()),
        )
        .with_value(value)
        .with_expected(expected.as_str()),
    )
}

fn check_number(
    path: &str,
    value: &DataValue,
    number: f64,
    rules: &NumericRules,
    errors: &mut Vec<ValidationError>,
) {
    if let Some(min) = rules.min {
        if number < min {
            errors.push(
                ValidationError::new(
                    path,
                    ErrorType::ValueTooSmall,
                    format!("Value {} is less than minimum {}", value, min),
                )
                .with_value(value)
                .with_expected(format!("min: {}", min)),
            );
        }
    }
    if let Some(max) = rules.max {
        if number > max {
            errors.push(
                ValidationError::new(
                    path,
                    ErrorType::ValueTooLarge,
                    format!("Value {} exceeds maximum {}", value, max),
                )
                .with_value(value)
                .with_expected(format!("max: {}", max)),
            );
        }
    }

    if let Some(allowed) = &rules.allowed {
        if !allowed.iter().any(|literal| literal.as_f64() == Some(number)) {
            errors.push(enum_mismatch(path, value, allowed));
        }
    }
}

fn check_temporal(
    path: &str,
    value: &DataValue,
    rules: &TemporalRules,
    errors: &mut Vec<ValidationError>,
) {
    let Some(at) = instant_of(value) else {
        errors.push(
            ValidationError::new(path, ErrorType::InvalidTimestamp, "Cannot parse timestamp")
                .with_value(value)
                .with_expected("ISO 8601 or Unix timestamp"),
        );
        return;
    };

    if let Some(min) = &rules.min {
        if at < min.at() {
            errors.push(
                ValidationError::new(
                    path,
                    ErrorType::TimestampTooOld,
                    format!("Timestamp before minimum: {}", min.raw()),
                )
                .with_value(value)
                .with_expected(format!("min: {}", min.raw())),
            );
        }
    }
    if let Some(max) = &rules.max {
        if at > max.at() {
            errors.push(
                ValidationError::new(
                    path,
                    ErrorType::TimestampTooRecent,
                    format!("Timestamp after maximum: {}", max.raw()),
                )
                .with_value(value)
                .with_expected(format!("max: {}", max.raw())),
            );
        }
    }
}

/// Reads ISO 8601 text or Unix epoch seconds.
pub(crate) fn instant_of(value: &DataValue) -> Option<DateTime<Utc>> {
    match value {
        DataValue::String(text) => parse_instant(text),
        DataValue::Int(seconds) => instant_from_epoch(*seconds as f64),
        DataValue::Float(seconds) => instant_from_epoch(*seconds),
        _ => None,
    }
}

fn enum_mismatch(path: &str, value: impl std::fmt::Display, allowed: &[Literal]) -> ValidationError {
    let listed = serde_json::to_string(allowed).unwrap_or_default();
    ValidationError::new(
        path,
        ErrorType::EnumMismatch,
        format!("Value not in allowed list: {}", listed),
    )
    .with_value(value)
    .with_expected(listed)
}
