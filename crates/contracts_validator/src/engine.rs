//! Main validation engine.
//!
//! This module provides the `ValidationEngine` that runs record validation and
//! quality rules for one contract version and produces PASS/FAIL reports.

use crate::{
    DataRow, DataSet, ErrorType, InputError, QualityResult, QualityValidator, RecordValidator,
    ValidationError, row_from_json,
};
use chrono::{DateTime, Utc};
use contracts_core::{
    ContractSchema, MAX_BATCH_ERRORS_PER_RECORD, MAX_BATCH_SAMPLE_ERRORS, ValidationContext,
    ValidationStatus,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info};

/// Field name used for quality findings on a single record.
pub const RECORD_QUALITY_FIELD: &str = "quality";

/// Field name used for quality findings on a batch.
pub const BATCH_QUALITY_FIELD: &str = "batch_quality";

/// Outcome of validating one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub status: ValidationStatus,
    pub errors: Vec<ValidationError>,
    pub execution_time_ms: f64,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.status.is_pass()
    }
}

/// Outcome of validating a batch of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// PASS when every record passed and the batch quality rules held
    pub status: ValidationStatus,
    pub total_records: usize,
    pub passed: usize,
    pub failed: usize,
    /// Share of passing records, in percent
    pub pass_rate: f64,
    pub execution_time_ms: f64,
    /// Count per error type over the kept errors
    pub errors_summary: BTreeMap<ErrorType, usize>,
    /// First errors found, capped per record and overall
    pub sample_errors: Vec<ValidationError>,
    /// Batch quality result, when the rules were applied
    pub quality: Option<QualityResult>,
}

/// Validation engine for one contract version.
///
/// # Example
///
/// ```rust
/// use contracts_core::{ContractSchemaBuilder, FieldBuilder, ValidationContext};
/// use contracts_validator::ValidationEngine;
/// use serde_json::json;
///
/// let schema = ContractSchemaBuilder::new("1.0")
///     .field("id", FieldBuilder::string().build())
///     .build()
///     .unwrap();
/// let engine = ValidationEngine::new(&schema, ValidationContext::new());
///
/// let report = engine.validate_json_record(&json!({"id": 7})).unwrap();
/// assert!(!report.passed());
/// assert_eq!(report.errors[0].message, "Expected string, got integer");
/// ```
#[derive(Debug, Clone)]
pub struct ValidationEngine {
    records: RecordValidator,
    quality: Option<QualityValidator>,
    context: ValidationContext,
}

impl ValidationEngine {
    /// Creates an engine for the given contract.
    pub fn new(schema: &ContractSchema, context: ValidationContext) -> Self {
        let quality = schema
            .quality_rules
            .as_ref()
            .filter(|rules| !rules.is_empty() && !context.schema_only)
            .map(|rules| QualityValidator::new(rules.clone()).with_strict(context.strict));

        Self {
            records: RecordValidator::new(schema),
            quality,
            context,
        }
    }

    pub fn context(&self) -> &ValidationContext {
        &self.context
    }

    /// Validates one record.
    pub fn validate_record(&self, record: &DataRow) -> ValidationReport {
        self.validate_record_at(record, Utc::now())
    }

    /// Validates one record, measuring freshness against `now`.
    ///
    /// Quality rules run only when the record passes the schema; their
    /// findings are reported under the `quality` field. The per-record error
    /// cap bounds schema errors only.
    pub fn validate_record_at(&self, record: &DataRow, now: DateTime<Utc>) -> ValidationReport {
        let start = Instant::now();
        let mut errors = self.records.validate(record);

        if errors.is_empty() {
            if let Some(quality) = &self.quality {
                let single = DataSet::from_rows(vec![record.clone()]);
                let result = quality.validate_at(&single, now);
                if !result.passed {
                    errors.extend(quality_errors(&result, RECORD_QUALITY_FIELD));
                }
            }
        }

        let status = ValidationStatus::from_error_count(errors.len());
        debug!("Record validation: {} ({} error(s))", status, errors.len());

        ValidationReport {
            status,
            errors,
            execution_time_ms: elapsed_ms(start),
        }
    }

    /// Validates a JSON object as one record.
    pub fn validate_json_record(&self, record: &Value) -> Result<ValidationReport, InputError> {
        Ok(self.validate_record(&row_from_json(record, 0)?))
    }

    /// Validates a batch of records.
    pub fn validate_batch(&self, dataset: &DataSet) -> BatchReport {
        self.validate_batch_at(dataset, Utc::now())
    }

    /// Validates a batch, measuring freshness against `now`.
    ///
    /// Each failing record contributes its first five errors. Batch quality
    /// rules run over the whole batch once at least one record passed.
    pub fn validate_batch_at(&self, dataset: &DataSet, now: DateTime<Utc>) -> BatchReport {
        let start = Instant::now();

        let sampled;
        let dataset = match self.context.sample_size {
            Some(size) if size < dataset.len() => {
                sampled = dataset.sample(size);
                &sampled
            }
            _ => dataset,
        };

        let mut passed = 0;
        let mut failed = 0;
        let mut kept = Vec::new();

        for record in dataset.rows() {
            let errors = self.records.validate(record);
            if errors.is_empty() {
                passed += 1;
            } else {
                failed += 1;
                kept.extend(errors.into_iter().take(MAX_BATCH_ERRORS_PER_RECORD));
            }
        }

        let quality = match &self.quality {
            Some(validator) if passed > 0 => Some(validator.validate_at(dataset, now)),
            _ => None,
        };
        if let Some(result) = quality.as_ref().filter(|r| !r.passed) {
            kept.extend(quality_errors(result, BATCH_QUALITY_FIELD));
        }

        let mut errors_summary = BTreeMap::new();
        for error in &kept {
            *errors_summary.entry(error.error_type).or_insert(0) += 1;
        }
        kept.truncate(MAX_BATCH_SAMPLE_ERRORS);

        let total_records = dataset.len();
        let pass_rate = if total_records > 0 {
            passed as f64 / total_records as f64 * 100.0
        } else {
            0.0
        };
        let quality_passed = quality.as_ref().is_none_or(|r| r.passed);
        let status = if failed == 0 && quality_passed {
            ValidationStatus::Pass
        } else {
            ValidationStatus::Fail
        };

        info!(
            "Batch validation: {} ({}/{} records passed)",
            status, passed, total_records
        );

        BatchReport {
            status,
            total_records,
            passed,
            failed,
            pass_rate,
            execution_time_ms: elapsed_ms(start),
            errors_summary,
            sample_errors: kept,
            quality,
        }
    }

    /// Validates JSON objects as a batch. Any non-object rejects the batch.
    pub fn validate_json_batch(&self, records: &[Value]) -> Result<BatchReport, InputError> {
        Ok(self.validate_batch(&DataSet::from_json(records)?))
    }
}

fn quality_errors<'a>(
    result: &'a QualityResult,
    field: &'a str,
) -> impl Iterator<Item = ValidationError> + 'a {
    result.issues.iter().map(move |issue| {
        ValidationError::new(field, issue.rule, issue.message.clone())
            .with_expected(issue.details.to_string())
    })
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use contracts_core::{
        ContractSchemaBuilder, FieldBuilder, MeanBounds, QualityRulesBuilder, StatisticsRule,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    fn orders(min_rows: u64) -> ContractSchema {
        ContractSchemaBuilder::new("1.0")
            .field("order_id", FieldBuilder::string().pattern(r"^ord_\d+$").build())
            .field("amount", FieldBuilder::float().min(0.0).build())
            .field("timestamp", FieldBuilder::timestamp().build())
            .quality_rules(
                QualityRulesBuilder::new()
                    .freshness(24.0)
                    .completeness(Some(min_rows), None)
                    .uniqueness(["order_id"])
                    .build(),
            )
            .build()
            .unwrap()
    }

    fn order(id: &str, amount: f64) -> Value {
        json!({"order_id": id, "amount": amount, "timestamp": "2024-01-15T10:00:00Z"})
    }

    #[test]
    fn test_valid_record() {
        let engine = ValidationEngine::new(&orders(1), ValidationContext::new());
        let record = row_from_json(&order("ord_1", 9.5), 0).unwrap();

        let report = engine.validate_record_at(&record, now());
        assert_eq!(report.status, ValidationStatus::Pass);
        assert!(report.errors.is_empty());
        assert!(report.execution_time_ms >= 0.0);
    }

    #[test]
    fn test_schema_errors_skip_quality() {
        let engine = ValidationEngine::new(&orders(5), ValidationContext::new());
        let record = row_from_json(&order("bad", -1.0), 0).unwrap();

        let report = engine.validate_record_at(&record, now());
        let kinds: Vec<ErrorType> = report.errors.iter().map(|e| e.error_type).collect();
        assert_eq!(kinds, vec![ErrorType::ValueTooSmall, ErrorType::PatternMismatch]);
    }

    #[test]
    fn test_single_record_quality_folded() {
        let engine = ValidationEngine::new(&orders(5), ValidationContext::new());
        let record = row_from_json(&order("ord_1", 1.0), 0).unwrap();

        let report = engine.validate_record_at(&record, now());
        assert_eq!(report.status, ValidationStatus::Fail);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, RECORD_QUALITY_FIELD);
        assert_eq!(report.errors[0].error_type, ErrorType::Completeness);
        assert_eq!(
            report.errors[0].expected.as_deref(),
            Some(r#"{"actual_count":1,"min_count":5}"#)
        );
    }

    #[test]
    fn test_record_error_cap_bounds_schema_errors_only() {
        let rule = StatisticsRule {
            mean: Some(MeanBounds {
                min: Some(100.0),
                max: None,
            }),
            std_dev: None,
        };
        let mut schema = ContractSchemaBuilder::new("1.0");
        let mut rules = QualityRulesBuilder::new();
        for i in 0..12 {
            let name = format!("m{:02}", i);
            schema = schema.field(name.clone(), FieldBuilder::float().build());
            rules = rules.statistics(name, rule.clone());
        }
        let schema = schema.quality_rules(rules.build()).build().unwrap();
        let engine = ValidationEngine::new(&schema, ValidationContext::new().with_strict(true));

        let empty = row_from_json(&json!({}), 0).unwrap();
        let report = engine.validate_record_at(&empty, now());
        assert_eq!(report.errors.len(), contracts_core::MAX_ERRORS_PER_RECORD);
        assert!(
            report
                .errors
                .iter()
                .all(|e| e.error_type == ErrorType::RequiredFieldMissing)
        );

        let low: serde_json::Map<String, Value> =
            (0..12).map(|i| (format!("m{:02}", i), json!(1.0))).collect();
        let report = engine.validate_record_at(&row_from_json(&Value::Object(low), 0).unwrap(), now());
        assert_eq!(report.errors.len(), 12);
        assert!(report.errors.iter().all(|e| e.field == RECORD_QUALITY_FIELD));
    }

    #[test]
    fn test_schema_only_skips_quality() {
        let context = ValidationContext::new().with_schema_only(true);
        let engine = ValidationEngine::new(&orders(5), context);
        let record = row_from_json(&order("ord_1", 1.0), 0).unwrap();

        assert!(engine.validate_record_at(&record, now()).passed());
    }

    #[test]
    fn test_batch_counts_and_quality() {
        let engine = ValidationEngine::new(&orders(1), ValidationContext::new());
        let records = [
            order("ord_1", 1.0),
            order("ord_1", 2.0),
            order("x", 3.0),
            json!({"amount": "free"}),
        ];
        let dataset = DataSet::from_json(&records).unwrap();

        let report = engine.validate_batch_at(&dataset, now());
        assert_eq!(report.status, ValidationStatus::Fail);
        assert_eq!(report.total_records, 4);
        assert_eq!(report.passed, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(report.pass_rate, 50.0);

        let quality = report.quality.as_ref().unwrap();
        assert!(!quality.passed);

        let last = report.sample_errors.last().unwrap();
        assert_eq!(last.field, BATCH_QUALITY_FIELD);
        assert_eq!(last.error_type, ErrorType::Uniqueness);

        assert_eq!(report.errors_summary[&ErrorType::PatternMismatch], 1);
        assert_eq!(report.errors_summary[&ErrorType::TypeMismatch], 1);
        assert_eq!(report.errors_summary[&ErrorType::RequiredFieldMissing], 2);
        assert_eq!(report.errors_summary[&ErrorType::Uniqueness], 1);
    }

    #[test]
    fn test_batch_quality_needs_a_passing_record() {
        let engine = ValidationEngine::new(&orders(100), ValidationContext::new());
        let dataset = DataSet::from_json(&[order("bad", 1.0)]).unwrap();

        let report = engine.validate_batch_at(&dataset, now());
        assert!(report.quality.is_none());
        assert_eq!(report.errors_summary.len(), 1);
    }

    #[test]
    fn test_batch_pass() {
        let engine = ValidationEngine::new(&orders(2), ValidationContext::new());
        let dataset = DataSet::from_json(&[order("ord_1", 1.0), order("ord_2", 2.0)]).unwrap();

        let report = engine.validate_batch_at(&dataset, now());
        assert_eq!(report.status, ValidationStatus::Pass);
        assert_eq!(report.pass_rate, 100.0);
        assert!(report.sample_errors.is_empty());
        assert_eq!(report.quality.map(|q| q.quality_score), Some(100.0));
    }

    #[test]
    fn test_sample_errors_capped() {
        let mut builder = ContractSchemaBuilder::new("1.0");
        for i in 0..8 {
            builder = builder.field(format!("f{}", i), FieldBuilder::integer().build());
        }
        let engine = ValidationEngine::new(&builder.build().unwrap(), ValidationContext::new());
        let records: Vec<Value> = (0..20).map(|_| json!({})).collect();

        let report = engine.validate_json_batch(&records).unwrap();
        assert_eq!(report.failed, 20);
        assert_eq!(report.sample_errors.len(), MAX_BATCH_SAMPLE_ERRORS);
        assert_eq!(report.errors_summary[&ErrorType::RequiredFieldMissing], 100);
    }

    #[test]
    fn test_sample_size() {
        let context = ValidationContext::new().with_sample_size(2);
        let engine = ValidationEngine::new(&orders(1), context);
        let records: Vec<Value> = (0..5).map(|i| order(&format!("ord_{}", i), 1.0)).collect();

        let report = engine
            .validate_batch_at(&DataSet::from_json(&records).unwrap(), now());
        assert_eq!(report.total_records, 2);
    }

    #[test]
    fn test_strict_fails_batch_on_warnings() {
        let rule = StatisticsRule {
            mean: Some(MeanBounds {
                min: Some(100.0),
                max: None,
            }),
            std_dev: None,
        };
        let schema = ContractSchemaBuilder::new("1.0")
            .field("value", FieldBuilder::float().build())
            .quality_rules(QualityRulesBuilder::new().statistics("value", rule).build())
            .build()
            .unwrap();
        let dataset = DataSet::from_json(&[json!({"value": 1.0})]).unwrap();

        let lenient = ValidationEngine::new(&schema, ValidationContext::new());
        let report = lenient.validate_batch_at(&dataset, now());
        assert_eq!(report.status, ValidationStatus::Pass);
        assert!(report.sample_errors.is_empty());

        let strict = ValidationEngine::new(&schema, ValidationContext::new().with_strict(true));
        let report = strict.validate_batch_at(&dataset, now());
        assert_eq!(report.status, ValidationStatus::Fail);
        assert_eq!(report.sample_errors[0].error_type, ErrorType::Statistics);
    }

    #[test]
    fn test_non_object_rejected() {
        let engine = ValidationEngine::new(&orders(1), ValidationContext::new());
        assert!(engine.validate_json_record(&json!([1, 2])).is_err());
        assert!(engine.validate_json_batch(&[order("ord_1", 1.0), json!("x")]).is_err());
    }

    #[test]
    fn test_empty_batch() {
        let engine = ValidationEngine::new(&orders(1), ValidationContext::new());
        let report = engine.validate_batch(&DataSet::empty());
        assert_eq!(report.total_records, 0);
        assert_eq!(report.pass_rate, 0.0);
        assert_eq!(report.status, ValidationStatus::Pass);
    }
}
