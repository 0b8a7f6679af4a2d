//! Integration tests for the validation engine.
//!
//! These tests parse complete YAML contracts and validate realistic batches
//! against them end to end.

use chrono::{DateTime, TimeZone, Utc};
use contracts_core::{ValidationContext, ValidationStatus};
use contracts_parser::{parse_yaml, template};
use contracts_validator::{DataSet, ErrorType, ValidationEngine};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

const USER_EVENTS: &str = r#"
contract_version: "2.0"
domain: user-analytics
description: User interaction events
schema:
  event_id:
    type: string
    format: uuid
  user_id:
    type: string
    pattern: '^usr_\d+$'
  event_type:
    type: string
    enum: [page_view, button_click, purchase, sign_up]
  session_id:
    type: string
    required: false
    min_length: 8
  amount:
    type: float
    required: false
    min: 0
  timestamp:
    type: timestamp
  device:
    type: object
    required: false
    properties:
      os:
        type: string
        enum: [ios, android, web]
      version:
        type: string
        required: false
  tags:
    type: array
    required: false
    max_length: 3
    items:
      type: string
      max_length: 10
quality_rules:
  freshness:
    max_latency_hours: 2
  completeness:
    min_row_count: 3
    max_null_percentage: 50
  uniqueness:
    fields: [event_id]
  statistics:
    amount:
      mean: { max: 500 }
"#;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn event(n: u32, event_type: &str) -> Value {
    json!({
        "event_id": format!("550e8400-e29b-41d4-a716-4466554400{:02}", n),
        "user_id": format!("usr_{}", n),
        "event_type": event_type,
        "session_id": "sess_00000001",
        "amount": 19.99,
        "timestamp": "2024-03-01T11:15:00Z",
        "device": {"os": "ios", "version": "17.2"},
        "tags": ["promo"]
    })
}

fn engine(context: ValidationContext) -> ValidationEngine {
    let contract = parse_yaml(USER_EVENTS).expect("contract parses");
    ValidationEngine::new(&contract, context)
}

#[test]
fn test_valid_batch_passes() {
    let records: Vec<Value> = (1..=5).map(|n| event(n, "purchase")).collect();
    let dataset = DataSet::from_json(&records).unwrap();

    let report = engine(ValidationContext::new()).validate_batch_at(&dataset, now());

    assert_eq!(report.status, ValidationStatus::Pass, "{:?}", report.sample_errors);
    assert_eq!(report.passed, 5);
    assert_eq!(report.pass_rate, 100.0);
    assert!(report.errors_summary.is_empty());
    assert_eq!(report.quality.as_ref().map(|q| q.quality_score), Some(100.0));
}

#[test]
fn test_invalid_records_are_reported_per_field() {
    let mut bad = event(9, "refund");
    bad["user_id"] = json!("user-9");
    bad["device"] = json!({"os": "beos"});
    bad["tags"] = json!(["a", "much-too-long-tag", "b", "c"]);

    let report = engine(ValidationContext::new())
        .validate_json_record(&bad)
        .unwrap();

    assert_eq!(report.status, ValidationStatus::Fail);
    let found: Vec<(&str, ErrorType)> = report
        .errors
        .iter()
        .map(|e| (e.field.as_str(), e.error_type))
        .collect();
    assert_eq!(
        found,
        vec![
            ("device.os", ErrorType::EnumMismatch),
            ("event_type", ErrorType::EnumMismatch),
            ("tags", ErrorType::ArrayTooLong),
            ("tags[1]", ErrorType::LengthTooLong),
            ("user_id", ErrorType::PatternMismatch),
        ]
    );
}

#[test]
fn test_batch_quality_findings() {
    let mut records: Vec<Value> = (1..=3).map(|n| event(n, "page_view")).collect();
    records.push(event(1, "purchase"));
    records[2]["timestamp"] = json!("2024-02-28T12:00:00Z");
    for record in records.iter_mut().take(3) {
        record["amount"] = json!(2000.0);
    }

    let dataset = DataSet::from_json(&records).unwrap();
    let report = engine(ValidationContext::new()).validate_batch_at(&dataset, now());

    assert_eq!(report.passed, 4);
    assert_eq!(report.status, ValidationStatus::Fail);

    let quality = report.quality.as_ref().unwrap();
    let rules: Vec<ErrorType> = quality.issues.iter().map(|i| i.rule).collect();
    assert_eq!(
        rules,
        vec![ErrorType::Freshness, ErrorType::Uniqueness, ErrorType::Statistics]
    );
    assert_eq!(quality.quality_score, 77.0);

    assert!(report
        .sample_errors
        .iter()
        .all(|e| e.field == "batch_quality"));
    assert_eq!(report.errors_summary.get(&ErrorType::Statistics), Some(&1));
}

#[test]
fn test_schema_only_ignores_quality() {
    let records = [event(1, "sign_up")];
    let dataset = DataSet::from_json(&records).unwrap();

    let report = engine(ValidationContext::new().with_schema_only(true))
        .validate_batch_at(&dataset, now());

    assert_eq!(report.status, ValidationStatus::Pass);
    assert!(report.quality.is_none());
}

#[test]
fn test_template_contract_validates_records() {
    let contract = parse_yaml(template("ecommerce-orders").unwrap().content).unwrap();
    let engine = ValidationEngine::new(&contract, ValidationContext::new().with_schema_only(true));

    let order = json!({
        "order_id": "ord_A1",
        "customer_id": "cus_1",
        "total_amount": 42.0,
        "items": [
            {"product_id": "p1", "quantity": 2, "price": 21.0},
            {"product_id": "p2", "quantity": 0, "price": 1.0}
        ],
        "order_date": "2024-03-01T10:00:00Z"
    });

    let report = engine.validate_json_record(&order).unwrap();
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].field, "items[1].quantity");
    assert_eq!(report.errors[0].error_type, ErrorType::ValueTooSmall);
}
