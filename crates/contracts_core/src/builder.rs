//! Builder pattern for creating contract schemas.
//!
//! This module provides ergonomic builders for constructing schemas, field
//! definitions and quality rules with a fluent API, without going through
//! contract text.

use std::collections::BTreeMap;

use crate::{
    ArrayRules, CompletenessRule, ContractSchema, FieldDefinition, FieldKind, FreshnessRule,
    Literal, NumericRules, ObjectRules, QualityRules, Result, StatisticsRule, StringFormat,
    StringRules, TemporalBound, TemporalRules, UniquenessRule,
};

/// Builder for creating a `ContractSchema`.
///
/// # Example
///
/// ```rust
/// use contracts_core::{ContractSchemaBuilder, FieldBuilder};
///
/// let schema = ContractSchemaBuilder::new("1.0")
///     .domain("user-analytics")
///     .description("User interaction events")
///     .field("user_id", FieldBuilder::string().pattern(r"^usr_\d+$").build())
///     .field("age", FieldBuilder::integer().min(0.0).max(120.0).optional().build())
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.field_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct ContractSchemaBuilder {
    contract_version: String,
    domain: Option<String>,
    description: Option<String>,
    fields: BTreeMap<String, FieldDefinition>,
    quality_rules: Option<QualityRules>,
}

impl ContractSchemaBuilder {
    /// Creates a new schema builder with the declared contract version.
    pub fn new(contract_version: impl Into<String>) -> Self {
        Self {
            contract_version: contract_version.into(),
            ..Default::default()
        }
    }

    /// Sets the business domain (defaults to `"default"`).
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Sets the contract description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a field, replacing any previous field with the same name.
    pub fn field(mut self, name: impl Into<String>, field: FieldDefinition) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Sets quality rules.
    pub fn quality_rules(mut self, rules: QualityRules) -> Self {
        self.quality_rules = Some(rules);
        self
    }

    /// Builds the schema, checking every constraint invariant.
    pub fn build(self) -> Result<ContractSchema> {
        let schema = ContractSchema {
            contract_version: self.contract_version,
            domain: self
                .domain
                .unwrap_or_else(|| ContractSchema::DEFAULT_DOMAIN.to_string()),
            description: self.description,
            schema: self.fields,
            quality_rules: self.quality_rules,
        };
        schema.validate_constraints()?;
        Ok(schema)
    }
}

/// Builder for creating a `FieldDefinition`.
///
/// Start from one of the type constructors, then chain constraints.
/// Constraint setters are ignored for kinds that do not carry the
/// constraint (e.g. `pattern` on an integer field).
///
/// # Example
///
/// ```rust
/// use contracts_core::{FieldBuilder, StringFormat};
///
/// let email = FieldBuilder::string()
///     .format(StringFormat::Email)
///     .description("User email address")
///     .build();
/// assert_eq!(email.format(), Some(StringFormat::Email));
/// ```
#[derive(Debug)]
pub struct FieldBuilder {
    field: FieldDefinition,
}

impl FieldBuilder {
    fn of(kind: FieldKind) -> Self {
        Self {
            field: FieldDefinition::new(kind),
        }
    }

    /// Starts a `string` field.
    pub fn string() -> Self {
        Self::of(FieldKind::String(StringRules::default()))
    }

    /// Starts an `integer` field.
    pub fn integer() -> Self {
        Self::of(FieldKind::Integer(NumericRules::default()))
    }

    /// Starts a `float` field.
    pub fn float() -> Self {
        Self::of(FieldKind::Float(NumericRules::default()))
    }

    /// Starts a `boolean` field.
    pub fn boolean() -> Self {
        Self::of(FieldKind::Boolean)
    }

    /// Starts a `timestamp` field.
    pub fn timestamp() -> Self {
        Self::of(FieldKind::Timestamp(TemporalRules::default()))
    }

    /// Starts a `date` field.
    pub fn date() -> Self {
        Self::of(FieldKind::Date(TemporalRules::default()))
    }

    /// Starts an `array` field whose items follow `items`.
    pub fn array(items: FieldDefinition) -> Self {
        Self::of(FieldKind::Array(ArrayRules {
            items: Box::new(items),
            min_items: None,
            max_items: None,
        }))
    }

    /// Starts an `object` field with no properties yet.
    pub fn object() -> Self {
        Self::of(FieldKind::Object(ObjectRules::default()))
    }

    /// Sets whether the field is required.
    pub fn required(mut self, required: bool) -> Self {
        self.field.required = required;
        self
    }

    /// Marks the field as optional.
    pub fn optional(self) -> Self {
        self.required(false)
    }

    /// Sets the field description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.field.description = Some(description.into());
        self
    }

    /// Sets the regex pattern of a string field.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        if let FieldKind::String(rules) = &mut self.field.kind {
            rules.pattern = Some(pattern.into());
        }
        self
    }

    /// Sets the well-known format of a string field.
    pub fn format(mut self, format: StringFormat) -> Self {
        if let FieldKind::String(rules) = &mut self.field.kind {
            rules.format = Some(format);
        }
        self
    }

    /// Sets the minimum length of a string, or minimum item count of an array.
    pub fn min_length(mut self, min_length: usize) -> Self {
        match &mut self.field.kind {
            FieldKind::String(rules) => rules.min_length = Some(min_length),
            FieldKind::Array(rules) => rules.min_items = Some(min_length),
            _ => {}
        }
        self
    }

    /// Sets the maximum length of a string, or maximum item count of an array.
    pub fn max_length(mut self, max_length: usize) -> Self {
        match &mut self.field.kind {
            FieldKind::String(rules) => rules.max_length = Some(max_length),
            FieldKind::Array(rules) => rules.max_items = Some(max_length),
            _ => {}
        }
        self
    }

    /// Sets the lower bound of a numeric field.
    pub fn min(mut self, min: f64) -> Self {
        if let FieldKind::Integer(rules) | FieldKind::Float(rules) = &mut self.field.kind {
            rules.min = Some(min);
        }
        self
    }

    /// Sets the upper bound of a numeric field.
    pub fn max(mut self, max: f64) -> Self {
        if let FieldKind::Integer(rules) | FieldKind::Float(rules) = &mut self.field.kind {
            rules.max = Some(max);
        }
        self
    }

    /// Sets the earliest instant of a timestamp or date field.
    pub fn earliest(mut self, bound: TemporalBound) -> Self {
        if let FieldKind::Timestamp(rules) | FieldKind::Date(rules) = &mut self.field.kind {
            rules.min = Some(bound);
        }
        self
    }

    /// Sets the latest instant of a timestamp or date field.
    pub fn latest(mut self, bound: TemporalBound) -> Self {
        if let FieldKind::Timestamp(rules) | FieldKind::Date(rules) = &mut self.field.kind {
            rules.max = Some(bound);
        }
        self
    }

    /// Sets the allowed values of a string or numeric field.
    pub fn allowed<I, L>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Literal>,
    {
        let values: Vec<Literal> = values.into_iter().map(Into::into).collect();
        match &mut self.field.kind {
            FieldKind::String(rules) => rules.allowed = Some(values),
            FieldKind::Integer(rules) | FieldKind::Float(rules) => rules.allowed = Some(values),
            _ => {}
        }
        self
    }

    /// Adds a property to an object field.
    pub fn property(mut self, name: impl Into<String>, property: FieldDefinition) -> Self {
        if let FieldKind::Object(rules) = &mut self.field.kind {
            rules.properties.insert(name.into(), property);
        }
        self
    }

    /// Builds the field.
    pub fn build(self) -> FieldDefinition {
        self.field
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self {
        Literal::Integer(i)
    }
}

impl From<f64> for Literal {
    fn from(f: f64) -> Self {
        Literal::Float(f)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Boolean(b)
    }
}

/// Builder for creating `QualityRules`.
#[derive(Debug, Default)]
pub struct QualityRulesBuilder {
    rules: QualityRules,
}

impl QualityRulesBuilder {
    /// Creates a new quality rules builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the freshness rule.
    pub fn freshness(mut self, max_latency_hours: f64) -> Self {
        self.rules.freshness = Some(FreshnessRule { max_latency_hours });
        self
    }

    /// Sets the completeness rule.
    pub fn completeness(
        mut self,
        min_row_count: Option<u64>,
        max_null_percentage: Option<f64>,
    ) -> Self {
        self.rules.completeness = Some(CompletenessRule {
            min_row_count,
            max_null_percentage,
        });
        self
    }

    /// Sets the uniqueness rule.
    pub fn uniqueness<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.uniqueness = Some(UniquenessRule {
            fields: fields.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Adds distribution bounds for a field.
    pub fn statistics(mut self, field: impl Into<String>, rule: StatisticsRule) -> Self {
        self.rules
            .statistics
            .get_or_insert_with(BTreeMap::new)
            .insert(field.into(), rule);
        self
    }

    /// Builds the quality rules.
    pub fn build(self) -> QualityRules {
        self.rules
    }
}
