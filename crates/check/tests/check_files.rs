//! Integration tests for the batch checker reading rule and record files.

use std::io::Write;
use std::path::PathBuf;

use assert_matches::assert_matches;
use caveat_check::checker;
use caveat_check::config::CheckConfig;
use caveat_core::CoreError;
use tempfile::NamedTempFile;

const RULES: &str = r#"{
    "entity": "account",
    "rules": [
        { "field": "balance", "rule": "presence", "message": "must be present" },
        { "field": "owner", "rule": "length", "config": { "min": 2 }, "on": "create" }
    ],
    "warnings": [
        { "field": "balance", "rule": "numericality",
          "config": { "greater_than_or_equal_to": 0 },
          "message": "should be non-negative" }
    ]
}"#;

fn file_with(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file should be created");
    file.write_all(contents.as_bytes())
        .expect("temp file should be writable");
    file
}

fn config(rules: &NamedTempFile, records: &NamedTempFile) -> CheckConfig {
    CheckConfig {
        rules_path: rules.path().to_path_buf(),
        records_path: records.path().to_path_buf(),
        run_context: None,
        strict: false,
    }
}

fn lines(output: Vec<u8>) -> Vec<serde_json::Value> {
    String::from_utf8(output)
        .expect("output should be UTF-8")
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be JSON"))
        .collect()
}

// ---------------------------------------------------------------------------
// Test: warnings are reported but do not fail the batch
// ---------------------------------------------------------------------------

#[test]
fn warnings_do_not_fail_the_batch() {
    let rules = file_with(RULES);
    let records = file_with(r#"[{ "balance": -5, "owner": "A" }, { "balance": 10 }]"#);

    let mut out = Vec::new();
    let summary = checker::run(&config(&rules, &records), &mut out).unwrap();

    assert!(summary.passed(false));
    assert!(!summary.passed(true));

    let lines = lines(out);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["is_valid"], true);
    assert_eq!(lines[0]["warnings"][0]["message"], "should be non-negative");
    assert_eq!(lines[1]["warnings"].as_array().map(Vec::len), Some(0));
}

/// A missing balance is a blocking error and produces no warning.
#[test]
fn missing_balance_fails_the_batch() {
    let rules = file_with(RULES);
    let records = file_with(r#"[{ "owner": "Ada" }]"#);

    let mut out = Vec::new();
    let summary = checker::run(&config(&rules, &records), &mut out).unwrap();

    assert!(!summary.passed(false));
    let lines = lines(out);
    assert_eq!(lines[0]["errors"][0]["field"], "balance");
    assert_eq!(lines[0]["errors"][0]["message"], "must be present");
    assert_eq!(lines[0]["warnings"].as_array().map(Vec::len), Some(0));
}

/// Rules limited to `create` only run when that context is configured.
#[test]
fn run_context_enables_scoped_rules() {
    let rules = file_with(RULES);
    let records = file_with(r#"[{ "balance": 1, "owner": "A" }]"#);

    let mut cfg = config(&rules, &records);
    let summary = checker::run(&cfg, &mut Vec::new()).unwrap();
    assert_eq!(summary.invalid(), 0);

    cfg.run_context = Some("create".to_string());
    let summary = checker::run(&cfg, &mut Vec::new()).unwrap();
    assert_eq!(summary.invalid(), 1);
}

#[test]
fn null_warnings_block_is_rejected() {
    let rules = file_with(r#"{ "entity": "account", "warnings": null }"#);
    let records = file_with("[]");

    let err = checker::run(&config(&rules, &records), &mut Vec::new()).unwrap_err();
    assert_matches!(
        err.downcast_ref::<CoreError>(),
        Some(CoreError::InvalidUsage(msg))
            if msg.contains("warnings block requires rule declarations")
    );
}

/// A misspelled config key fails the run instead of loading a rule that
/// never fires.
#[test]
fn misspelled_rule_config_fails_the_run() {
    let rules = file_with(
        r#"{ "entity": "a", "rules": [
            { "field": "x", "rule": "length", "config": { "minimum": 5 } }
        ] }"#,
    );
    let records = file_with(r#"[{ "x": "a" }]"#);

    let err = checker::run(&config(&rules, &records), &mut Vec::new()).unwrap_err();
    assert_matches!(err.downcast_ref::<CoreError>(), Some(CoreError::InvalidUsage(_)));
}

#[test]
fn non_object_record_is_rejected() {
    let rules = file_with(RULES);
    let records = file_with(r#"[{ "balance": 1 }, 42]"#);

    let err = checker::run(&config(&rules, &records), &mut Vec::new()).unwrap_err();
    assert!(err.to_string().contains("record 1"));
}

#[test]
fn missing_rule_file_is_reported() {
    let records = file_with("[]");
    let cfg = CheckConfig {
        rules_path: PathBuf::from("/nonexistent/caveat/rules.json"),
        records_path: records.path().to_path_buf(),
        run_context: None,
        strict: false,
    };

    let err = checker::run(&cfg, &mut Vec::new()).unwrap_err();
    assert!(err.to_string().contains("failed to read rule document"));
}
