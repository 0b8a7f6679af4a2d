use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get the path to test fixtures
fn fixture_path(name: &str) -> String {
    format!("tests/fixtures/{}", name)
}

/// Helper to create a Command for the dce binary
// TODO: Migrate to cargo::cargo_bin_cmd! macro when available
// See: https://github.com/assert-rs/assert_cmd/issues/139
#[allow(deprecated)]
fn dce() -> Command {
    Command::cargo_bin("dce").expect("Failed to find dce binary")
}

fn stdout_json(output: &[u8]) -> serde_json::Value {
    let text = String::from_utf8_lossy(output);
    serde_json::from_str(&text)
        .unwrap_or_else(|e| panic!("Output should be valid JSON ({}): {}", e, text))
}

// ============================================================================
// check command tests
// ============================================================================

#[test]
fn test_check_valid_contract() {
    dce()
        .arg("check")
        .arg(fixture_path("simple_contract.yml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Contract is valid"))
        .stdout(predicate::str::contains("simple_test"))
        .stdout(predicate::str::contains("Fields:      2"));
}

#[test]
fn test_check_contract_with_quality() {
    dce()
        .arg("check")
        .arg(fixture_path("contract_with_quality.yml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("quality_test"))
        .stdout(predicate::str::contains(
            "Quality Rules: freshness, completeness, uniqueness",
        ));
}

#[test]
fn test_check_toml_contract() {
    dce()
        .arg("check")
        .arg(fixture_path("contract.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("toml_test"))
        .stdout(predicate::str::contains("temperature"));
}

#[test]
fn test_check_json_output() {
    let output = dce()
        .arg("check")
        .arg("--format")
        .arg("json")
        .arg(fixture_path("contract_with_quality.yml"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = stdout_json(&output);
    assert_eq!(json["domain"], "quality_test");
    assert_eq!(json["fields"].as_array().unwrap().len(), 3);
    assert_eq!(json["fields"][0]["name"], "created_at");
    assert_eq!(json["fields"][0]["type"], "timestamp");
}

#[test]
fn test_check_invalid_contract() {
    dce()
        .arg("check")
        .arg(fixture_path("invalid_contract.yml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("uuid"));
}

#[test]
fn test_check_missing_file() {
    dce()
        .arg("check")
        .arg("nonexistent.yml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_check_unsupported_extension() {
    let temp_dir = TempDir::new().unwrap();
    let contract = temp_dir.path().join("contract.json");
    fs::write(&contract, "{}").unwrap();

    dce()
        .arg("check")
        .arg(contract.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

// ============================================================================
// validate command tests
// ============================================================================

#[test]
fn test_validate_passing_batch() {
    dce()
        .arg("validate")
        .arg(fixture_path("users_v1.yml"))
        .arg(fixture_path("valid_users.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Validation PASSED"))
        .stdout(predicate::str::contains("Total records:  3"));
}

#[test]
fn test_validate_failing_batch_exits_with_error() {
    dce()
        .arg("validate")
        .arg(fixture_path("users_v1.yml"))
        .arg(fixture_path("invalid_users.json"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Validation FAILED"))
        .stdout(predicate::str::contains("PATTERN_MISMATCH"))
        .stdout(predicate::str::contains("Duplicate values in 'user_id'"));
}

#[test]
fn test_validate_batch_json_output() {
    let output = dce()
        .arg("validate")
        .arg("--format")
        .arg("json")
        .arg(fixture_path("users_v1.yml"))
        .arg(fixture_path("invalid_users.json"))
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let json = stdout_json(&output);
    assert_eq!(json["status"], "FAIL");
    assert_eq!(json["total_records"], 3);
    assert_eq!(json["passed"], 1);
    assert_eq!(json["failed"], 2);
    assert_eq!(json["errors_summary"]["FORMAT_MISMATCH"], 1);
    assert_eq!(json["errors_summary"]["VALUE_TOO_SMALL"], 1);
    assert_eq!(json["quality"]["passed"], false);
}

#[test]
fn test_validate_schema_only_skips_quality() {
    let output = dce()
        .arg("validate")
        .arg("--schema-only")
        .arg("--format")
        .arg("json")
        .arg(fixture_path("users_v1.yml"))
        .arg(fixture_path("invalid_users.json"))
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let json = stdout_json(&output);
    assert!(json["quality"].is_null());
}

#[test]
fn test_validate_single_record() {
    let output = dce()
        .arg("validate")
        .arg("--format")
        .arg("json")
        .arg(fixture_path("users_v1.yml"))
        .arg(fixture_path("single_user.json"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = stdout_json(&output);
    assert_eq!(json["status"], "PASS");
    assert_eq!(json["errors"].as_array().unwrap().len(), 0);
}

#[test]
fn test_validate_with_sample_size() {
    dce()
        .arg("validate")
        .arg("--sample-size")
        .arg("1")
        .arg(fixture_path("users_v1.yml"))
        .arg(fixture_path("invalid_users.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Total records:  1"));
}

#[test]
fn test_validate_rejects_scalar_payload() {
    let temp_dir = TempDir::new().unwrap();
    let records = temp_dir.path().join("records.json");
    fs::write(&records, "42").unwrap();

    dce()
        .arg("validate")
        .arg(fixture_path("users_v1.yml"))
        .arg(records.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON object or an array"))
        .stderr(predicate::str::contains("found number"));
}

#[test]
fn test_validate_rejects_non_object_records() {
    let temp_dir = TempDir::new().unwrap();
    let records = temp_dir.path().join("records.json");
    fs::write(&records, r#"[{"user_id": "usr_1"}, "oops"]"#).unwrap();

    dce()
        .arg("validate")
        .arg(fixture_path("users_v1.yml"))
        .arg(records.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_validate_invalid_json_file() {
    let temp_dir = TempDir::new().unwrap();
    let records = temp_dir.path().join("records.json");
    fs::write(&records, "{not json").unwrap();

    dce()
        .arg("validate")
        .arg(fixture_path("users_v1.yml"))
        .arg(records.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid JSON"));
}

#[test]
fn test_validate_missing_records_file() {
    dce()
        .arg("validate")
        .arg(fixture_path("users_v1.yml"))
        .arg("nonexistent.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read records file"));
}

#[test]
fn test_validate_invalid_contract() {
    dce()
        .arg("validate")
        .arg(fixture_path("invalid_contract.yml"))
        .arg(fixture_path("valid_users.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse contract file"));
}

#[test]
fn test_validate_empty_contract_file() {
    let temp_dir = TempDir::new().unwrap();
    let empty_file = temp_dir.path().join("empty.yml");
    fs::write(&empty_file, "").unwrap();

    dce()
        .arg("validate")
        .arg(empty_file.to_str().unwrap())
        .arg(fixture_path("valid_users.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

// ============================================================================
// diff and bump command tests
// ============================================================================

#[test]
fn test_diff_breaking_changes() {
    dce()
        .arg("diff")
        .arg(fixture_path("users_v1.yml"))
        .arg(fixture_path("users_v2_breaking.yml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Breaking changes:"))
        .stdout(predicate::str::contains("Field 'email' was removed"))
        .stdout(predicate::str::contains("Type changed from string to integer"))
        .stdout(predicate::str::contains("major version bump"));
}

#[test]
fn test_diff_json_output() {
    let output = dce()
        .arg("diff")
        .arg("--format")
        .arg("json")
        .arg(fixture_path("users_v1.yml"))
        .arg(fixture_path("users_v2_additive.yml"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = stdout_json(&output);
    assert_eq!(json["breaking_changes"].as_array().unwrap().len(), 0);
    assert_eq!(json["non_breaking_changes"][0]["type"], "OPTIONAL_FIELD_ADDED");
    assert_eq!(json["non_breaking_changes"][0]["field"], "nickname");
    assert_eq!(json["non_breaking_changes"][1]["type"], "ENUM_VALUES_ADDED");
    assert_eq!(json["risk_score"], 6);
    assert_eq!(json["risk_level"], "LOW");
}

#[test]
fn test_diff_identical_contracts() {
    dce()
        .arg("diff")
        .arg(fixture_path("users_v1.yml"))
        .arg(fixture_path("users_v1.yml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes detected"));
}

#[test]
fn test_bump_versions() {
    dce()
        .arg("bump")
        .arg("1.2.0")
        .arg(fixture_path("users_v1.yml"))
        .arg(fixture_path("users_v2_breaking.yml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Next version: 2.0.0"))
        .stdout(predicate::str::contains("BREAKING"));

    dce()
        .arg("bump")
        .arg("v1.2")
        .arg(fixture_path("users_v1.yml"))
        .arg(fixture_path("users_v2_additive.yml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Next version: 1.3.0"))
        .stdout(predicate::str::contains("NON_BREAKING"));

    dce()
        .arg("bump")
        .arg("1.2.0")
        .arg(fixture_path("users_v1.yml"))
        .arg(fixture_path("users_v1.yml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Next version: 1.2.1"))
        .stdout(predicate::str::contains("PATCH"));
}

#[test]
fn test_bump_invalid_version() {
    dce()
        .arg("bump")
        .arg("latest")
        .arg(fixture_path("users_v1.yml"))
        .arg(fixture_path("users_v1.yml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid version 'latest'"));
}

// ============================================================================
// init command tests
// ============================================================================

#[test]
fn test_init_list_templates() {
    dce()
        .arg("init")
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("basic-user-events"))
        .stdout(predicate::str::contains("ecommerce-orders"))
        .stdout(predicate::str::contains("iot-sensor-data"));
}

#[test]
fn test_init_template_to_stdout() {
    dce()
        .arg("init")
        .arg("--template")
        .arg("iot-sensor-data")
        .assert()
        .success()
        .stdout(predicate::str::contains("contract_version"))
        .stdout(predicate::str::contains("domain: iot"));
}

#[test]
fn test_init_with_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("orders.yml");

    dce()
        .arg("init")
        .arg("--template")
        .arg("ecommerce-orders")
        .arg("--output")
        .arg(output_path.to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("Contract written to"));

    // The written contract must pass the check command.
    dce()
        .arg("check")
        .arg(output_path.to_str().unwrap())
        .assert()
        .success();
}

#[test]
fn test_init_unknown_template() {
    dce()
        .arg("init")
        .arg("--template")
        .arg("payments")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown template: payments"))
        .stderr(predicate::str::contains("basic-user-events"));
}

#[test]
fn test_init_requires_template_or_list() {
    dce().arg("init").assert().failure();
}

// ============================================================================
// General CLI tests
// ============================================================================

#[test]
fn test_cli_help() {
    dce()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("diff"))
        .stdout(predicate::str::contains("bump"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_cli_version() {
    dce()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_validate_help() {
    dce()
        .arg("validate")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("schema-only"))
        .stdout(predicate::str::contains("strict"))
        .stdout(predicate::str::contains("sample-size"))
        .stdout(predicate::str::contains("format"));
}

#[test]
fn test_validate_with_invalid_sample_size() {
    dce()
        .arg("validate")
        .arg("--sample-size")
        .arg("invalid")
        .arg(fixture_path("users_v1.yml"))
        .arg(fixture_path("valid_users.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid"));
}

#[test]
fn test_validate_with_invalid_format() {
    dce()
        .arg("validate")
        .arg("--format")
        .arg("invalid_format")
        .arg(fixture_path("users_v1.yml"))
        .arg(fixture_path("valid_users.json"))
        .assert()
        .failure();
}
