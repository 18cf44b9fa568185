//! Declarative rule documents.
//!
//! A rule document lists blocking rules under `rules` and non-blocking ones
//! under `warnings`:
//!
//! ```json
//! {
//!   "entity": "account",
//!   "rules": [{ "field": "balance", "rule": "presence", "message": "must be present" }],
//!   "warnings": [{ "field": "balance", "rule": "numericality",
//!                 "config": { "greater_than_or_equal_to": 0 } }]
//! }
//! ```
//!
//! The `warnings` list is declared through [`RuleDeclarer::declare_warnings`],
//! so documents and hand-written declarations share one code path.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::rules::{RuleDeclarer, RuleOptions, RuleSet};
use crate::validators::{
    AttributeCheck, Email, Format, Inclusion, Length, Numericality, Presence, TypeCheck, Url,
};

/// One rule declaration in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub field: String,
    pub rule: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_nil: Option<bool>,
}

/// A parsed rule document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleFile {
    pub entity: String,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
    /// `None` when the document has no warnings block at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<RuleDefinition>>,
}

impl RuleFile {
    /// Parse a rule document. A `"warnings": null` entry is a warnings block
    /// without declarations and is rejected.
    pub fn parse(source: &str) -> Result<Self, CoreError> {
        let document: Value = serde_json::from_str(source)?;
        if matches!(document.get("warnings"), Some(Value::Null)) {
            return Err(CoreError::InvalidUsage(
                "warnings block requires rule declarations".to_string(),
            ));
        }
        Ok(serde_json::from_value(document)?)
    }

    /// Declare every rule of the document and return the finished set.
    pub fn to_rule_set(&self) -> Result<RuleSet, CoreError> {
        let mut declarer = RuleDeclarer::new();
        for definition in &self.rules {
            declare(&mut declarer, definition)?;
        }
        if let Some(warnings) = &self.warnings {
            declarer.declare_warnings(|w| {
                warnings
                    .iter()
                    .try_for_each(|definition| declare(w, definition))
            })?;
        }
        tracing::debug!(
            entity = %self.entity,
            rules = self.rules.len(),
            warnings = self.warnings.as_ref().map_or(0, Vec::len),
            "Loaded rule document"
        );
        Ok(declarer.build())
    }
}

fn declare(declarer: &mut RuleDeclarer, definition: &RuleDefinition) -> Result<(), CoreError> {
    let check = build_check(definition)?;
    let options = RuleOptions {
        on: definition.on.clone(),
        allow_nil: definition.allow_nil.unwrap_or(true),
        message: definition.message.clone(),
    };
    declarer.validates(&[definition.field.as_str()], check, options);
    Ok(())
}

/// Map a rule name and its config onto a built-in check. The names used by
/// imported rule tables (`required`, `min_length`, ...) are accepted too.
fn build_check(definition: &RuleDefinition) -> Result<Box<dyn AttributeCheck>, CoreError> {
    let rule = definition.rule.as_str();
    let check: Box<dyn AttributeCheck> = match rule {
        "presence" | "required" => Box::new(Presence),
        "length" => {
            let length = config::<Length>(definition)?;
            if length.min.is_none() && length.max.is_none() {
                return Err(invalid_config(definition, "needs `min` or `max`"));
            }
            Box::new(length)
        }
        "min_length" => Box::new(Length {
            min: Some(usize_setting(definition, "min")?),
            max: None,
        }),
        "max_length" => Box::new(Length {
            min: None,
            max: Some(usize_setting(definition, "max")?),
        }),
        "numericality" => Box::new(config::<Numericality>(definition)?),
        "min_value" => Box::new(Numericality {
            greater_than_or_equal_to: Some(f64_setting(definition, "min")?),
            ..Numericality::default()
        }),
        "max_value" => Box::new(Numericality {
            less_than_or_equal_to: Some(f64_setting(definition, "max")?),
            ..Numericality::default()
        }),
        "format" | "regex_pattern" => {
            let pattern = definition
                .config
                .get("pattern")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid_config(definition, "missing string `pattern`"))?;
            Box::new(Format::new(pattern)?)
        }
        "inclusion" | "enum_values" => Box::new(config::<Inclusion>(definition)?),
        "type_check" => Box::new(config::<TypeCheck>(definition)?),
        "email" => Box::new(Email),
        "url" => Box::new(Url),
        other => {
            return Err(CoreError::InvalidUsage(format!(
                "unknown rule `{other}` for field `{}`",
                definition.field
            )))
        }
    };
    Ok(check)
}

fn config<T: DeserializeOwned>(definition: &RuleDefinition) -> Result<T, CoreError> {
    let config = if definition.config.is_null() {
        Value::Object(Default::default())
    } else {
        definition.config.clone()
    };
    serde_json::from_value(config).map_err(|e| invalid_config(definition, &e.to_string()))
}

fn usize_setting(definition: &RuleDefinition, key: &str) -> Result<usize, CoreError> {
    let n = definition
        .config
        .get(key)
        .and_then(Value::as_u64)
        .ok_or_else(|| invalid_config(definition, &format!("missing integer `{key}`")))?;
    usize::try_from(n).map_err(|_| invalid_config(definition, &format!("`{key}` is too large")))
}

fn f64_setting(definition: &RuleDefinition, key: &str) -> Result<f64, CoreError> {
    definition
        .config
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| invalid_config(definition, &format!("missing number `{key}`")))
}

fn invalid_config(definition: &RuleDefinition, detail: &str) -> CoreError {
    CoreError::InvalidUsage(format!(
        "invalid `{}` config for field `{}`: {detail}",
        definition.rule, definition.field
    ))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::{json, Map};

    use super::*;
    use crate::record::Validated;
    use crate::types::ValidationContext;

    const ACCOUNT: &str = r#"{
        "entity": "account",
        "rules": [
            { "field": "balance", "rule": "presence", "message": "must be present" }
        ],
        "warnings": [
            { "field": "balance", "rule": "numericality",
              "config": { "greater_than_or_equal_to": 0 },
              "message": "should be non-negative" }
        ]
    }"#;

    #[test]
    fn warnings_section_binds_to_warnings_context() {
        let rules = RuleFile::parse(ACCOUNT).unwrap().to_rule_set().unwrap();
        assert_eq!(rules.count(ValidationContext::Errors), 1);
        assert_eq!(rules.count(ValidationContext::Warnings), 1);
    }

    #[test]
    fn loaded_rules_validate_records() {
        let rules = RuleFile::parse(ACCOUNT).unwrap().to_rule_set().unwrap();
        let mut map = Map::new();
        map.insert("balance".into(), json!(-5));
        let mut model = Validated::new(map);

        assert!(model.is_valid(&rules, None).unwrap());
        assert!(model.has_warnings(&rules, None).unwrap());
        assert_eq!(
            model.warnings().get("balance"),
            &["should be non-negative".to_string()]
        );
    }

    #[test]
    fn null_warnings_block_is_invalid_usage() {
        let source = r#"{ "entity": "account", "warnings": null }"#;
        assert_matches!(RuleFile::parse(source), Err(CoreError::InvalidUsage(_)));
    }

    #[test]
    fn absent_warnings_block_is_fine() {
        let file = RuleFile::parse(r#"{ "entity": "account" }"#).unwrap();
        assert!(file.warnings.is_none());
        assert!(file.to_rule_set().unwrap().is_empty());
    }

    #[test]
    fn unknown_rule_is_rejected() {
        let source = r#"{ "entity": "a", "rules": [{ "field": "x", "rule": "telepathy" }] }"#;
        let file = RuleFile::parse(source).unwrap();
        assert_matches!(
            file.to_rule_set(),
            Err(CoreError::InvalidUsage(msg)) if msg.contains("telepathy")
        );
    }

    #[test]
    fn malformed_config_is_rejected() {
        let source = r#"{ "entity": "a", "rules": [
            { "field": "x", "rule": "length", "config": { "min": "five" } }
        ] }"#;
        let file = RuleFile::parse(source).unwrap();
        assert_matches!(file.to_rule_set(), Err(CoreError::InvalidUsage(_)));
    }

    #[test]
    fn misspelled_config_key_is_rejected() {
        let source = r#"{ "entity": "a", "rules": [
            { "field": "x", "rule": "length", "config": { "minimum": 5 } }
        ] }"#;
        let file = RuleFile::parse(source).unwrap();
        assert_matches!(
            file.to_rule_set(),
            Err(CoreError::InvalidUsage(msg)) if msg.contains("minimum")
        );

        let source = r#"{ "entity": "a", "warnings": [
            { "field": "x", "rule": "numericality", "config": { "greater_then": 0 } }
        ] }"#;
        let file = RuleFile::parse(source).unwrap();
        assert_matches!(file.to_rule_set(), Err(CoreError::InvalidUsage(_)));
    }

    #[test]
    fn length_without_bounds_is_rejected() {
        for config in [r#""config": {}"#, r#""config": null"#] {
            let source = format!(
                r#"{{ "entity": "a", "rules": [{{ "field": "x", "rule": "length", {config} }}] }}"#
            );
            let file = RuleFile::parse(&source).unwrap();
            assert_matches!(
                file.to_rule_set(),
                Err(CoreError::InvalidUsage(msg)) if msg.contains("`min` or `max`")
            );
        }
    }

    #[test]
    fn negative_length_setting_is_rejected() {
        let source = r#"{ "entity": "a", "rules": [
            { "field": "x", "rule": "min_length", "config": { "min": -1 } }
        ] }"#;
        let file = RuleFile::parse(source).unwrap();
        assert_matches!(file.to_rule_set(), Err(CoreError::InvalidUsage(_)));
    }

    #[cfg(target_pointer_width = "32")]
    #[test]
    fn oversized_length_setting_is_rejected() {
        let source = r#"{ "entity": "a", "rules": [
            { "field": "x", "rule": "min_length", "config": { "min": 4294967296 } }
        ] }"#;
        let file = RuleFile::parse(source).unwrap();
        assert_matches!(
            file.to_rule_set(),
            Err(CoreError::InvalidUsage(msg)) if msg.contains("too large")
        );
    }

    #[test]
    fn legacy_rule_names_are_accepted() {
        let source = r#"{ "entity": "a", "rules": [
            { "field": "name", "rule": "required" },
            { "field": "name", "rule": "max_length", "config": { "max": 3 } },
            { "field": "age", "rule": "min_value", "config": { "min": 18 } },
            { "field": "kind", "rule": "enum_values", "config": { "values": ["a", "b"] } },
            { "field": "code", "rule": "regex_pattern", "config": { "pattern": "^[A-Z]+$" } }
        ] }"#;
        let rules = RuleFile::parse(source).unwrap().to_rule_set().unwrap();
        assert_eq!(rules.len(), 5);

        let mut map = Map::new();
        map.insert("name".into(), json!("Augusta"));
        map.insert("age".into(), json!(12));
        map.insert("kind".into(), json!("c"));
        map.insert("code".into(), json!("abc"));
        let mut model = Validated::new(map);

        assert!(!model.is_valid(&rules, None).unwrap());
        let fields: Vec<_> = model.errors().keys().collect();
        assert_eq!(fields, vec!["name", "age", "kind", "code"]);
    }

    #[test]
    fn bad_pattern_is_rejected() {
        let source = r#"{ "entity": "a", "rules": [
            { "field": "x", "rule": "format", "config": { "pattern": "(" } }
        ] }"#;
        let file = RuleFile::parse(source).unwrap();
        assert_matches!(file.to_rule_set(), Err(CoreError::InvalidUsage(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert_matches!(RuleFile::parse("{ not json"), Err(CoreError::Parse(_)));
    }
}
