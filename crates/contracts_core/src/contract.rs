//! Data contract schema types.
//!
//! A [`ContractSchema`] is the parsed form of a contract document: a named set
//! of [`FieldDefinition`]s plus optional batch-level [`QualityRules`]. Field
//! definitions are a tagged tree: every [`FieldKind`] carries only the
//! constraints meaningful for its type, and arrays/objects nest further
//! definitions through `items` and `properties`.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::temporal::parse_instant;
use crate::{ContractError, Result};

/// The fixed type vocabulary of a contract field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 text
    String,
    /// Whole number
    Integer,
    /// Floating point number (integers are accepted)
    Float,
    /// `true` / `false`, never a number
    Boolean,
    /// Point in time, ISO 8601 text or Unix epoch seconds
    Timestamp,
    /// Calendar date as text
    Date,
    /// Homogeneous list described by `items`
    Array,
    /// Nested record described by `properties`
    Object,
}

impl FieldType {
    /// Every supported type, in declaration order.
    pub const ALL: [FieldType; 8] = [
        FieldType::String,
        FieldType::Integer,
        FieldType::Float,
        FieldType::Boolean,
        FieldType::Timestamp,
        FieldType::Date,
        FieldType::Array,
        FieldType::Object,
    ];

    /// Returns the contract keyword for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Timestamp => "timestamp",
            FieldType::Date => "date",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ContractError::UnknownVariant {
                kind: "type",
                value: s.to_string(),
                expected: join_keywords(FieldType::ALL.iter().map(|t| t.as_str())),
            })
    }
}

/// Well-known string formats checked with fixed regular expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringFormat {
    /// `local@domain.tld`
    Email,
    /// `http://` or `https://` URL
    Url,
    /// Lowercase or uppercase hyphenated UUID
    Uuid,
    /// Dotted-quad IPv4 address
    Ipv4,
}

impl StringFormat {
    /// Every supported format, in declaration order.
    pub const ALL: [StringFormat; 4] = [
        StringFormat::Email,
        StringFormat::Url,
        StringFormat::Uuid,
        StringFormat::Ipv4,
    ];

    /// Returns the contract keyword for this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            StringFormat::Email => "email",
            StringFormat::Url => "url",
            StringFormat::Uuid => "uuid",
            StringFormat::Ipv4 => "ipv4",
        }
    }

    /// Returns the regular expression a value must match. Matching is
    /// case-insensitive.
    pub fn pattern(&self) -> &'static str {
        match self {
            StringFormat::Email => r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$",
            StringFormat::Url => r"^https?://[^\s/$.?#].[^\s]*$",
            StringFormat::Uuid => r"^[0-9a-f]{8}-([0-9a-f]{4}-){3}[0-9a-f]{12}$",
            StringFormat::Ipv4 => {
                r"^((25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9])\.){3}(25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9])$"
            }
        }
    }
}

impl fmt::Display for StringFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StringFormat {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self> {
        StringFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ContractError::UnknownVariant {
                kind: "format",
                value: s.to_string(),
                expected: join_keywords(StringFormat::ALL.iter().map(|f| f.as_str())),
            })
    }
}

fn join_keywords<'a>(keywords: impl Iterator<Item = &'a str>) -> String {
    keywords.collect::<Vec<_>>().join(", ")
}

/// A literal allowed by an `enum` constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    /// Boolean literal
    Boolean(bool),
    /// Integer literal
    Integer(i64),
    /// Floating point literal
    Float(f64),
    /// Text literal
    String(String),
}

impl Literal {
    /// Returns the numeric value of integer and float literals.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Integer(i) => Some(*i as f64),
            Literal::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Value equality where `1` and `1.0` are the same literal.
    pub fn same_value(&self, other: &Literal) -> bool {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(x) => write!(f, "{}", x),
            Literal::String(s) => f.write_str(s),
        }
    }
}

/// Returns true when every literal of `subset` appears in `superset`.
pub fn literals_within(subset: &[Literal], superset: &[Literal]) -> bool {
    subset
        .iter()
        .all(|item| superset.iter().any(|other| item.same_value(other)))
}

/// A point in time used as a `min`/`max` bound on temporal fields.
///
/// Keeps the text as written so the contract serializes back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalBound {
    raw: String,
    at: DateTime<Utc>,
}

impl TemporalBound {
    /// Parses an ISO 8601 date or date-time.
    pub fn parse(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let at = parse_instant(&raw)?;
        Some(Self { raw, at })
    }

    /// The bound exactly as written in the contract.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The bound as a UTC instant.
    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }
}

/// A range bound as seen by the change detector.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    /// Numeric bound (values, or item counts for arrays)
    Number(f64),
    /// Temporal bound
    Temporal(TemporalBound),
}

impl Bound {
    /// Orders two bounds of the same kind; bounds of different kinds are
    /// incomparable.
    pub fn compare(&self, other: &Bound) -> Option<Ordering> {
        match (self, other) {
            (Bound::Number(a), Bound::Number(b)) => a.partial_cmp(b),
            (Bound::Temporal(a), Bound::Temporal(b)) => Some(a.at.cmp(&b.at)),
            _ => None,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Number(n) => write!(f, "{}", n),
            Bound::Temporal(t) => f.write_str(t.raw()),
        }
    }
}

/// Constraints carried by `string` fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringRules {
    /// Regular expression the value must match from its first character
    pub pattern: Option<String>,
    /// Well-known format the value must satisfy
    pub format: Option<StringFormat>,
    /// Minimum length in characters
    pub min_length: Option<usize>,
    /// Maximum length in characters
    pub max_length: Option<usize>,
    /// Allowed values
    pub allowed: Option<Vec<Literal>>,
}

/// Constraints carried by `integer` and `float` fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericRules {
    /// Inclusive lower bound
    pub min: Option<f64>,
    /// Inclusive upper bound
    pub max: Option<f64>,
    /// Allowed values
    pub allowed: Option<Vec<Literal>>,
}

/// Constraints carried by `timestamp` and `date` fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemporalRules {
    /// Earliest accepted instant
    pub min: Option<TemporalBound>,
    /// Latest accepted instant
    pub max: Option<TemporalBound>,
}

/// Constraints carried by `array` fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayRules {
    /// Definition every item must satisfy
    pub items: Box<FieldDefinition>,
    /// Minimum number of items
    pub min_items: Option<usize>,
    /// Maximum number of items
    pub max_items: Option<usize>,
}

/// Constraints carried by `object` fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectRules {
    /// Declared properties of the nested record
    pub properties: BTreeMap<String, FieldDefinition>,
}

/// The type of a field together with its type-specific constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String(StringRules),
    Integer(NumericRules),
    Float(NumericRules),
    Boolean,
    Timestamp(TemporalRules),
    Date(TemporalRules),
    Array(ArrayRules),
    Object(ObjectRules),
}

/// One field of a contract schema.
///
/// # Example
///
/// ```rust
/// use contracts_core::{FieldBuilder, FieldType};
///
/// let age = FieldBuilder::integer().min(0.0).max(120.0).build();
/// assert_eq!(age.field_type(), FieldType::Integer);
/// assert!(age.required);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    /// Whether the field must be present (defaults to true)
    pub required: bool,

    /// Optional human-readable description
    pub description: Option<String>,

    /// Type and type-specific constraints
    pub kind: FieldKind,
}

impl FieldDefinition {
    /// Creates a required, undocumented field of the given kind.
    pub fn new(kind: FieldKind) -> Self {
        Self {
            required: true,
            description: None,
            kind,
        }
    }

    /// Returns the declared type.
    pub fn field_type(&self) -> FieldType {
        match &self.kind {
            FieldKind::String(_) => FieldType::String,
            FieldKind::Integer(_) => FieldType::Integer,
            FieldKind::Float(_) => FieldType::Float,
            FieldKind::Boolean => FieldType::Boolean,
            FieldKind::Timestamp(_) => FieldType::Timestamp,
            FieldKind::Date(_) => FieldType::Date,
            FieldKind::Array(_) => FieldType::Array,
            FieldKind::Object(_) => FieldType::Object,
        }
    }

    pub fn pattern(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::String(rules) => rules.pattern.as_deref(),
            _ => None,
        }
    }

    pub fn format(&self) -> Option<StringFormat> {
        match &self.kind {
            FieldKind::String(rules) => rules.format,
            _ => None,
        }
    }

    /// Lower range bound: numeric value or instant.
    pub fn min(&self) -> Option<Bound> {
        match &self.kind {
            FieldKind::Integer(rules) | FieldKind::Float(rules) => rules.min.map(Bound::Number),
            FieldKind::Timestamp(rules) | FieldKind::Date(rules) => {
                rules.min.clone().map(Bound::Temporal)
            }
            _ => None,
        }
    }

    /// Upper range bound: numeric value or instant.
    pub fn max(&self) -> Option<Bound> {
        match &self.kind {
            FieldKind::Integer(rules) | FieldKind::Float(rules) => rules.max.map(Bound::Number),
            FieldKind::Timestamp(rules) | FieldKind::Date(rules) => {
                rules.max.clone().map(Bound::Temporal)
            }
            _ => None,
        }
    }

    pub fn enum_values(&self) -> Option<&[Literal]> {
        match &self.kind {
            FieldKind::String(rules) => rules.allowed.as_deref(),
            FieldKind::Integer(rules) | FieldKind::Float(rules) => rules.allowed.as_deref(),
            _ => None,
        }
    }

    pub fn items(&self) -> Option<&FieldDefinition> {
        match &self.kind {
            FieldKind::Array(rules) => Some(&rules.items),
            _ => None,
        }
    }

    pub fn properties(&self) -> Option<&BTreeMap<String, FieldDefinition>> {
        match &self.kind {
            FieldKind::Object(rules) => Some(&rules.properties),
            _ => None,
        }
    }

    /// Checks the ordering invariants of this definition and every nested
    /// definition below it.
    ///
    /// `path` is the dotted name used in error messages; array items are
    /// reported as `path[]` and object properties as `path.property`.
    pub fn validate_constraints(&self, path: &str) -> Result<()> {
        match &self.kind {
            FieldKind::String(rules) => {
                if let Some(pattern) = &rules.pattern {
                    Regex::new(pattern).map_err(|e| {
                        ContractError::constraint(path, format!("invalid regex pattern: {}", e))
                    })?;
                }
                check_order(path, "min_length", rules.min_length, "max_length", rules.max_length)
            }
            FieldKind::Integer(rules) | FieldKind::Float(rules) => {
                check_order(path, "min", rules.min, "max", rules.max)
            }
            FieldKind::Timestamp(rules) | FieldKind::Date(rules) => {
                match (&rules.min, &rules.max) {
                    (Some(min), Some(max)) if min.at > max.at => Err(ContractError::constraint(
                        path,
                        format!("min ({}) must be <= max ({})", min.raw, max.raw),
                    )),
                    _ => Ok(()),
                }
            }
            FieldKind::Array(rules) => {
                check_order(path, "min_length", rules.min_items, "max_length", rules.max_items)?;
                rules.items.validate_constraints(&format!("{}[]", path))
            }
            FieldKind::Object(rules) => {
                for (name, property) in &rules.properties {
                    property.validate_constraints(&format!("{}.{}", path, name))?;
                }
                Ok(())
            }
            FieldKind::Boolean => Ok(()),
        }
    }
}

fn check_order<T: PartialOrd + fmt::Display + Copy>(
    path: &str,
    low_name: &str,
    low: Option<T>,
    high_name: &str,
    high: Option<T>,
) -> Result<()> {
    match (low, high) {
        (Some(low), Some(high)) if low > high => Err(ContractError::constraint(
            path,
            format!(
                "{} ({}) must be <= {} ({})",
                low_name, low, high_name, high
            ),
        )),
        _ => Ok(()),
    }
}

/// A parsed data contract.
///
/// Created by the parser (or [`crate::ContractSchemaBuilder`]) and never
/// mutated afterwards. Field iteration order is the lexical order of the
/// field names.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractSchema {
    /// Version string declared by the contract author (free-form)
    pub contract_version: String,

    /// Business domain owning the contract
    pub domain: String,

    /// Human-readable description of the dataset
    pub description: Option<String>,

    /// Field definitions keyed by field name
    pub schema: BTreeMap<String, FieldDefinition>,

    /// Optional batch-level quality rules
    pub quality_rules: Option<QualityRules>,
}

impl ContractSchema {
    /// Default domain for contracts that do not declare one.
    pub const DEFAULT_DOMAIN: &'static str = "default";

    /// Returns the definition of a top-level field.
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.schema.get(name)
    }

    /// Returns the number of top-level fields.
    pub fn field_count(&self) -> usize {
        self.schema.len()
    }

    /// Checks that the schema is non-empty and every field satisfies its
    /// constraint invariants.
    pub fn validate_constraints(&self) -> Result<()> {
        if self.schema.is_empty() {
            return Err(ContractError::EmptySchema);
        }
        for (name, field) in &self.schema {
            field.validate_constraints(name)?;
        }
        if let Some(rules) = &self.quality_rules {
            rules.validate()?;
        }
        Ok(())
    }
}

/// Batch-level quality rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityRules {
    /// Maximum age of the newest data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freshness: Option<FreshnessRule>,

    /// Row count and null share limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completeness: Option<CompletenessRule>,

    /// Fields whose values must not repeat
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uniqueness: Option<UniquenessRule>,

    /// Distribution bounds per numeric field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<BTreeMap<String, StatisticsRule>>,
}

impl QualityRules {
    /// Returns true when no rule is configured.
    pub fn is_empty(&self) -> bool {
        self.freshness.is_none()
            && self.completeness.is_none()
            && self.uniqueness.is_none()
            && self.statistics.is_none()
    }

    /// Checks the value ranges of every configured rule.
    pub fn validate(&self) -> Result<()> {
        if let Some(freshness) = &self.freshness {
            let hours = freshness.max_latency_hours;
            if hours.is_nan() || hours <= 0.0 {
                return Err(ContractError::quality_rules(
                    "max_latency_hours must be a positive number",
                ));
            }
        }

        if let Some(completeness) = &self.completeness {
            if let Some(max_null) = completeness.max_null_percentage {
                if !(0.0..=100.0).contains(&max_null) {
                    return Err(ContractError::quality_rules(
                        "max_null_percentage must be between 0 and 100",
                    ));
                }
            }
        }

        if let Some(uniqueness) = &self.uniqueness {
            if uniqueness.fields.is_empty() {
                return Err(ContractError::quality_rules(
                    "uniqueness fields must be a non-empty list",
                ));
            }
        }

        Ok(())
    }
}

/// Freshness rule: data must be newer than `max_latency_hours`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreshnessRule {
    pub max_latency_hours: f64,
}

/// Completeness rule over a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletenessRule {
    /// Minimum number of records in a batch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_row_count: Option<u64>,

    /// Maximum share of nulls per field, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_null_percentage: Option<f64>,
}

/// Uniqueness rule: each listed field must hold distinct values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniquenessRule {
    pub fields: Vec<String>,
}

/// Distribution bounds for one numeric field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<MeanBounds>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<StdDevBounds>,
}

/// Accepted range for the mean of a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeanBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Upper limit for the standard deviation of a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StdDevBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}
