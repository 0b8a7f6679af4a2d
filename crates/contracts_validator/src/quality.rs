//! Quality check validation logic.
//!
//! This module checks batch-level quality rules against a dataset:
//! - Freshness: age of the records' timestamps
//! - Completeness: row count and per-field null share
//! - Uniqueness: repeated values in listed fields
//! - Statistics: mean and standard deviation bounds (warnings only)

use crate::schema::instant_of;
use crate::{DataRow, DataSet, DataValue, ErrorType};
use chrono::{DateTime, Utc};
use contracts_core::{
    CompletenessRule, FreshnessRule, QualityRules, StatisticsRule, UniquenessRule,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Record fields inspected by the freshness rule, in priority order.
pub const TIMESTAMP_FIELDS: [&str; 4] = ["timestamp", "created_at", "updated_at", "date"];

/// Maximum number of duplicate values listed per uniqueness finding.
const MAX_LISTED_DUPLICATES: usize = 5;

const ERROR_PENALTY: f64 = 10.0;
const WARNING_PENALTY: f64 = 3.0;

/// How much a quality finding weighs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("ERROR"),
            Severity::Warning => f.write_str("WARNING"),
        }
    }
}

/// One quality finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    /// `FRESHNESS`, `COMPLETENESS`, `UNIQUENESS` or `STATISTICS`
    pub rule: ErrorType,
    pub message: String,
    pub severity: Severity,
    /// Measured values behind the finding
    pub details: Value,
}

impl QualityIssue {
    fn error(rule: ErrorType, message: String, details: Value) -> Self {
        Self {
            rule,
            message,
            severity: Severity::Error,
            details,
        }
    }

    fn warning(rule: ErrorType, message: String, details: Value) -> Self {
        Self {
            rule,
            message,
            severity: Severity::Warning,
            details,
        }
    }
}

/// Outcome of a quality check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityResult {
    /// False when an ERROR finding exists (or any finding, in strict mode)
    pub passed: bool,
    pub issues: Vec<QualityIssue>,
    /// 100 minus 10 per error and 3 per warning, floored at 0
    pub quality_score: f64,
}

impl QualityResult {
    /// Returns the findings of the given severity.
    pub fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &QualityIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Validates quality rules on a dataset.
///
/// # Example
///
/// ```rust
/// use contracts_core::QualityRulesBuilder;
/// use contracts_validator::{DataSet, QualityValidator};
/// use serde_json::json;
///
/// let rules = QualityRulesBuilder::new().uniqueness(["id"]).build();
/// let batch = DataSet::from_json(&[json!({"id": 1}), json!({"id": 1})]).unwrap();
///
/// let result = QualityValidator::new(rules).validate(&batch);
/// assert!(!result.passed);
/// assert_eq!(result.quality_score, 90.0);
/// ```
#[derive(Debug, Clone)]
pub struct QualityValidator {
    rules: QualityRules,
    strict: bool,
}

impl QualityValidator {
    /// Creates a new quality validator.
    pub fn new(rules: QualityRules) -> Self {
        Self {
            rules,
            strict: false,
        }
    }

    /// In strict mode warnings fail the check too.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn rules(&self) -> &QualityRules {
        &self.rules
    }

    /// Validates a dataset against the current wall clock.
    pub fn validate(&self, dataset: &DataSet) -> QualityResult {
        self.validate_at(dataset, Utc::now())
    }

    /// Validates a dataset, measuring freshness against `now`.
    pub fn validate_at(&self, dataset: &DataSet, now: DateTime<Utc>) -> QualityResult {
        let mut issues = Vec::new();

        if let Some(freshness) = &self.rules.freshness {
            issues.extend(check_freshness(freshness, dataset, now));
        }
        if let Some(completeness) = &self.rules.completeness {
            issues.extend(check_completeness(completeness, dataset));
        }
        if let Some(uniqueness) = &self.rules.uniqueness {
            issues.extend(check_uniqueness(uniqueness, dataset));
        }
        if let Some(statistics) = &self.rules.statistics {
            for (field, rule) in statistics {
                issues.extend(check_statistics(field, rule, dataset));
            }
        }

        let errors = issues.iter().filter(|i| i.severity == Severity::Error).count();
        let warnings = issues.len() - errors;
        let passed = errors == 0 && (!self.strict || warnings == 0);
        let quality_score =
            (100.0 - ERROR_PENALTY * errors as f64 - WARNING_PENALTY * warnings as f64).max(0.0);

        debug!(
            "Quality check on {} record(s): {} error(s), {} warning(s), score {}",
            dataset.len(),
            errors,
            warnings,
            quality_score
        );

        QualityResult {
            passed,
            issues,
            quality_score,
        }
    }
}

/// Reports the first record older than the limit.
fn check_freshness(
    rule: &FreshnessRule,
    dataset: &DataSet,
    now: DateTime<Utc>,
) -> Option<QualityIssue> {
    let limit = rule.max_latency_hours;

    for record in dataset.rows() {
        let Some(at) = record_instant(record) else {
            continue;
        };

        let age_hours = (now - at).num_milliseconds() as f64 / 3_600_000.0;
        if age_hours > limit {
            return Some(QualityIssue::error(
                ErrorType::Freshness,
                format!(
                    "Data is {:.1} hours old, exceeds limit of {} hours",
                    age_hours, limit
                ),
                json!({ "age_hours": age_hours, "max_latency_hours": limit }),
            ));
        }
    }

    None
}

/// Finds the timestamp of a record. Values that are neither text nor numbers
/// fall through to the next candidate field; unreadable ones end the search.
fn record_instant(record: &DataRow) -> Option<DateTime<Utc>> {
    for field in TIMESTAMP_FIELDS {
        let value = match record.get(field) {
            Some(value @ (DataValue::String(_) | DataValue::Int(_) | DataValue::Float(_))) => value,
            _ => continue,
        };

        let at = instant_of(value);
        if at.is_none() {
            warn!("Cannot parse timestamp from {}: {}", field, value);
        }
        return at;
    }
    None
}

fn check_completeness(rule: &CompletenessRule, dataset: &DataSet) -> Vec<QualityIssue> {
    let mut issues = Vec::new();
    let total = dataset.len();

    if let Some(min_row_count) = rule.min_row_count {
        if (total as u64) < min_row_count {
            issues.push(QualityIssue::error(
                ErrorType::Completeness,
                format!("Insufficient records: got {}, expected {}", total, min_row_count),
                json!({ "actual_count": total, "min_count": min_row_count }),
            ));
        }
    }

    let (Some(limit), Some(first)) = (rule.max_null_percentage, dataset.get_row(0)) else {
        return issues;
    };

    let mut fields: Vec<&String> = first.keys().collect();
    fields.sort();

    for field in fields {
        let nulls = dataset
            .rows()
            .filter(|row| row.get(field).is_none_or(DataValue::is_null))
            .count();
        let percentage = nulls as f64 / total as f64 * 100.0;

        if percentage > limit {
            issues.push(QualityIssue::error(
                ErrorType::Completeness,
                format!(
                    "Field '{}' has {:.1}% nulls, exceeds {}% limit",
                    field, percentage, limit
                ),
                json!({ "field": field, "null_percentage": percentage }),
            ));
        }
    }

    issues
}

fn check_uniqueness(rule: &UniquenessRule, dataset: &DataSet) -> Vec<QualityIssue> {
    let mut issues = Vec::new();

    for field in &rule.fields {
        // Keyed by canonical JSON so "1" and 1 stay distinct; kept in
        // first-seen order.
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut counts: Vec<(&DataValue, usize)> = Vec::new();

        for value in dataset.rows().filter_map(|row| row.get(field)) {
            let key = value.to_json().to_string();
            match index.get(&key) {
                Some(&slot) => counts[slot].1 += 1,
                None => {
                    index.insert(key, counts.len());
                    counts.push((value, 1));
                }
            }
        }

        let duplicates: Vec<_> = counts.into_iter().filter(|(_, count)| *count > 1).collect();
        if duplicates.is_empty() {
            continue;
        }

        let listed = duplicates
            .iter()
            .take(MAX_LISTED_DUPLICATES)
            .map(|(value, count)| format!("'{}' ({}x)", value, count))
            .collect::<Vec<_>>()
            .join(", ");

        issues.push(QualityIssue::error(
            ErrorType::Uniqueness,
            format!("Duplicate values in '{}': {}", field, listed),
            json!({ "field": field, "duplicate_count": duplicates.len() }),
        ));
    }

    issues
}

/// Population mean and standard deviation over the numeric values of a field.
fn check_statistics(field: &str, rule: &StatisticsRule, dataset: &DataSet) -> Vec<QualityIssue> {
    let mut issues = Vec::new();

    let values: Vec<f64> = dataset
        .rows()
        .filter_map(|row| match row.get(field) {
            Some(DataValue::Int(i)) => Some(*i as f64),
            Some(DataValue::Float(f)) => Some(*f),
            _ => None,
        })
        .collect();

    if values.is_empty() {
        return issues;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    if let Some(bounds) = &rule.mean {
        if let Some(min) = bounds.min.filter(|min| mean < *min) {
            issues.push(QualityIssue::warning(
                ErrorType::Statistics,
                format!("Field '{}' mean {:.2} below minimum {}", field, mean, min),
                json!({ "field": field, "mean": mean }),
            ));
        }
        if let Some(max) = bounds.max.filter(|max| mean > *max) {
            issues.push(QualityIssue::warning(
                ErrorType::Statistics,
                format!("Field '{}' mean {:.2} exceeds maximum {}", field, mean, max),
                json!({ "field": field, "mean": mean }),
            ));
        }
    }

    if let Some(max) = rule.std_dev.as_ref().and_then(|b| b.max) {
        if std_dev > max {
            issues.push(QualityIssue::warning(
                ErrorType::Statistics,
                format!("Field '{}' std dev {:.2} exceeds maximum {}", field, std_dev, max),
                json!({ "field": field, "std_dev": std_dev }),
            ));
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use contracts_core::{MeanBounds, QualityRulesBuilder, StdDevBounds};
    use pretty_assertions::assert_eq;

    fn batch(values: Vec<Value>) -> DataSet {
        DataSet::from_json(&values).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_no_rules_passes() {
        let result = QualityValidator::new(QualityRules::default())
            .validate(&batch(vec![json!({"id": 1})]));
        assert!(result.passed);
        assert!(!result.has_issues());
        assert_eq!(result.quality_score, 100.0);
    }

    #[test]
    fn test_freshness_first_stale_record_wins() {
        let validator = QualityValidator::new(QualityRulesBuilder::new().freshness(1.0).build());
        let data = batch(vec![
            json!({"timestamp": "2024-01-15T11:30:00Z"}),
            json!({"created_at": "2024-01-15T09:00:00Z"}),
            json!({"timestamp": "2024-01-14T12:00:00Z"}),
        ]);

        let result = validator.validate_at(&data, now());
        assert!(!result.passed);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].rule, ErrorType::Freshness);
        assert_eq!(
            result.issues[0].message,
            "Data is 3.0 hours old, exceeds limit of 1 hours"
        );
    }

    #[test]
    fn test_freshness_epoch_and_skips() {
        let validator = QualityValidator::new(QualityRulesBuilder::new().freshness(2.0).build());
        let fresh = now().timestamp() - 600;
        let data = batch(vec![
            json!({"timestamp": "garbage", "created_at": "2000-01-01T00:00:00Z"}),
            json!({"timestamp": null, "updated_at": fresh}),
            json!({"id": 3}),
        ]);

        let result = validator.validate_at(&data, now());
        assert!(result.passed, "{:?}", result.issues);
    }

    #[test]
    fn test_completeness_row_count() {
        let validator = QualityValidator::new(
            QualityRulesBuilder::new().completeness(Some(3), None).build(),
        );
        let result = validator.validate(&batch(vec![json!({"id": 1})]));

        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].message, "Insufficient records: got 1, expected 3");
        assert_eq!(result.issues[0].details, json!({"actual_count": 1, "min_count": 3}));
    }

    #[test]
    fn test_completeness_null_share() {
        let validator = QualityValidator::new(
            QualityRulesBuilder::new().completeness(None, Some(25.0)).build(),
        );
        let data = batch(vec![
            json!({"a": 1, "b": null}),
            json!({"a": 2, "b": 1}),
            json!({"a": null}),
            json!({"a": 4, "b": 2, "c": null}),
        ]);

        let result = validator.validate(&data);
        let messages: Vec<&str> = result.issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(messages, vec!["Field 'b' has 50.0% nulls, exceeds 25% limit"]);
    }

    #[test]
    fn test_zero_null_limit_enforced() {
        let validator = QualityValidator::new(
            QualityRulesBuilder::new().completeness(None, Some(0.0)).build(),
        );
        let result = validator.validate(&batch(vec![json!({"a": 1}), json!({"a": null})]));
        assert_eq!(result.issues.len(), 1);
    }

    #[test]
    fn test_uniqueness_lists_duplicates_in_order() {
        let validator =
            QualityValidator::new(QualityRulesBuilder::new().uniqueness(["id", "email"]).build());
        let data = batch(vec![
            json!({"id": "b", "email": "x@y.z"}),
            json!({"id": "a", "email": "w@y.z"}),
            json!({"id": "b"}),
            json!({"id": "a"}),
            json!({"id": "b"}),
            json!({"id": 1}),
            json!({"id": "1"}),
        ]);

        let result = validator.validate(&data);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(
            result.issues[0].message,
            "Duplicate values in 'id': 'b' (3x), 'a' (2x)"
        );
        assert_eq!(result.issues[0].details["duplicate_count"], json!(2));
    }

    #[test]
    fn test_statistics_warnings() {
        let rule = StatisticsRule {
            mean: Some(MeanBounds {
                min: Some(10.0),
                max: None,
            }),
            std_dev: Some(StdDevBounds { max: Some(0.5) }),
        };
        let validator =
            QualityValidator::new(QualityRulesBuilder::new().statistics("value", rule).build());
        let data = batch(vec![
            json!({"value": 2}),
            json!({"value": 4.0}),
            json!({"value": true}),
            json!({"value": "9"}),
        ]);

        let result = validator.validate(&data);
        assert!(result.passed);
        assert_eq!(result.by_severity(Severity::Warning).count(), 2);
        assert_eq!(result.issues[0].message, "Field 'value' mean 3.00 below minimum 10");
        assert_eq!(
            result.issues[1].message,
            "Field 'value' std dev 1.00 exceeds maximum 0.5"
        );
        assert_eq!(result.quality_score, 94.0);
    }

    #[test]
    fn test_strict_fails_on_warnings() {
        let rule = StatisticsRule {
            mean: Some(MeanBounds {
                min: None,
                max: Some(0.0),
            }),
            std_dev: None,
        };
        let validator = QualityValidator::new(QualityRulesBuilder::new().statistics("v", rule).build())
            .with_strict(true);

        let result = validator.validate(&batch(vec![json!({"v": 5})]));
        assert!(!result.passed);
        assert_eq!(result.by_severity(Severity::Error).count(), 0);
    }

    #[test]
    fn test_score_floors_at_zero() {
        let validator = QualityValidator::new(
            QualityRulesBuilder::new().completeness(Some(100), Some(0.0)).build(),
        );
        let fields: serde_json::Map<String, Value> =
            (0..12).map(|i| (format!("f{}", i), Value::Null)).collect();
        let result = validator.validate(&batch(vec![Value::Object(fields)]));

        assert_eq!(result.issues.len(), 13);
        assert_eq!(result.quality_score, 0.0);
    }
}
