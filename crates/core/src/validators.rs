//! Built-in attribute checks.
//!
//! A check inspects one attribute value and returns the message to report
//! when the value fails. Null values never reach a check unless it opts in
//! through [`AttributeCheck::checks_null`]; otherwise the owning rule's
//! `allow_nil` option decides whether null is skipped or reported.

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{ValidateEmail, ValidateUrl};

use crate::error::CoreError;
use crate::record::ValidationTarget;
use crate::rules::{RuleOptions, Validator};
use crate::types::Value;

/// Predicate over a single attribute value.
pub trait AttributeCheck: Send + Sync {
    /// Short name used in logs and execution errors.
    fn kind(&self) -> &str;

    /// Message reported when the check fails without a more specific one.
    fn default_message(&self) -> String;

    /// `Some(message)` when `value` fails the check.
    fn check(&self, value: &Value) -> Result<Option<String>, CoreError>;

    /// Whether null values are passed to [`check`](Self::check).
    fn checks_null(&self) -> bool {
        false
    }
}

impl<C: AttributeCheck + ?Sized> AttributeCheck for Box<C> {
    fn kind(&self) -> &str {
        (**self).kind()
    }

    fn default_message(&self) -> String {
        (**self).default_message()
    }

    fn check(&self, value: &Value) -> Result<Option<String>, CoreError> {
        (**self).check(value)
    }

    fn checks_null(&self) -> bool {
        (**self).checks_null()
    }
}

/// Runs one [`AttributeCheck`] against each of a list of attributes.
pub struct EachValidator {
    attributes: Vec<String>,
    check: Box<dyn AttributeCheck>,
}

impl EachValidator {
    pub fn new<C>(attributes: impl IntoIterator<Item = String>, check: C) -> Self
    where
        C: AttributeCheck + 'static,
    {
        Self {
            attributes: attributes.into_iter().collect(),
            check: Box::new(check),
        }
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }
}

impl Validator for EachValidator {
    fn name(&self) -> &str {
        self.check.kind()
    }

    fn validate(
        &self,
        target: &mut dyn ValidationTarget,
        options: &RuleOptions,
    ) -> Result<(), CoreError> {
        for attribute in &self.attributes {
            let value = target.read_attribute(attribute);
            let outcome = if value.is_null() && !self.check.checks_null() {
                if options.allow_nil {
                    None
                } else {
                    Some(self.check.default_message())
                }
            } else {
                self.check.check(&value)?
            };

            if let Some(message) = outcome {
                let message = options.message.clone().unwrap_or(message);
                tracing::trace!(
                    attribute = %attribute,
                    rule = self.check.kind(),
                    "Rule reported an issue"
                );
                target.issues().add(attribute.as_str(), message);
            }
        }
        Ok(())
    }
}

/// Fails on null, empty or whitespace-only strings, and empty arrays/objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct Presence;

impl AttributeCheck for Presence {
    fn kind(&self) -> &str {
        "presence"
    }

    fn default_message(&self) -> String {
        "can't be blank".to_string()
    }

    fn check(&self, value: &Value) -> Result<Option<String>, CoreError> {
        let blank = match value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            _ => false,
        };
        Ok(blank.then(|| self.default_message()))
    }

    fn checks_null(&self) -> bool {
        true
    }
}

/// Character count of strings, element count of arrays. Other types pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Length {
    #[serde(default)]
    pub min: Option<usize>,
    #[serde(default)]
    pub max: Option<usize>,
}

impl AttributeCheck for Length {
    fn kind(&self) -> &str {
        "length"
    }

    fn default_message(&self) -> String {
        "is the wrong length".to_string()
    }

    fn check(&self, value: &Value) -> Result<Option<String>, CoreError> {
        let len = match value {
            Value::String(s) => s.chars().count(),
            Value::Array(items) => items.len(),
            _ => return Ok(None),
        };
        if let Some(min) = self.min.filter(|min| len < *min) {
            return Ok(Some(format!("is too short (minimum is {min})")));
        }
        if let Some(max) = self.max.filter(|max| len > *max) {
            return Ok(Some(format!("is too long (maximum is {max})")));
        }
        Ok(None)
    }
}

/// Numeric bounds. Numeric strings are accepted the way form input arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Numericality {
    #[serde(default)]
    pub only_integer: bool,
    #[serde(default)]
    pub greater_than: Option<f64>,
    #[serde(default)]
    pub greater_than_or_equal_to: Option<f64>,
    #[serde(default)]
    pub less_than: Option<f64>,
    #[serde(default)]
    pub less_than_or_equal_to: Option<f64>,
}

impl Numericality {
    pub fn non_negative() -> Self {
        Self {
            greater_than_or_equal_to: Some(0.0),
            ..Self::default()
        }
    }
}

impl AttributeCheck for Numericality {
    fn kind(&self) -> &str {
        "numericality"
    }

    fn default_message(&self) -> String {
        "is not a number".to_string()
    }

    fn check(&self, value: &Value) -> Result<Option<String>, CoreError> {
        let num = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        let Some(num) = num.filter(|n| n.is_finite()) else {
            return Ok(Some(self.default_message()));
        };

        if self.only_integer && num.fract() != 0.0 {
            return Ok(Some("must be an integer".to_string()));
        }
        if let Some(bound) = self.greater_than.filter(|b| num <= *b) {
            return Ok(Some(format!("must be greater than {bound}")));
        }
        if let Some(bound) = self.greater_than_or_equal_to.filter(|b| num < *b) {
            return Ok(Some(format!("must be greater than or equal to {bound}")));
        }
        if let Some(bound) = self.less_than.filter(|b| num >= *b) {
            return Ok(Some(format!("must be less than {bound}")));
        }
        if let Some(bound) = self.less_than_or_equal_to.filter(|b| num > *b) {
            return Ok(Some(format!("must be less than or equal to {bound}")));
        }
        Ok(None)
    }
}

/// String must match a regular expression. Non-strings pass.
#[derive(Debug, Clone)]
pub struct Format {
    pattern: Regex,
}

impl Format {
    pub fn new(pattern: &str) -> Result<Self, CoreError> {
        let pattern = Regex::new(pattern)
            .map_err(|e| CoreError::InvalidUsage(format!("invalid format pattern: {e}")))?;
        Ok(Self { pattern })
    }
}

impl AttributeCheck for Format {
    fn kind(&self) -> &str {
        "format"
    }

    fn default_message(&self) -> String {
        "is invalid".to_string()
    }

    fn check(&self, value: &Value) -> Result<Option<String>, CoreError> {
        Ok(match value.as_str() {
            Some(s) if !self.pattern.is_match(s) => Some(self.default_message()),
            _ => None,
        })
    }
}

/// Value must equal one of a fixed list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Inclusion {
    #[serde(rename = "values")]
    pub allowed: Vec<Value>,
}

impl AttributeCheck for Inclusion {
    fn kind(&self) -> &str {
        "inclusion"
    }

    fn default_message(&self) -> String {
        "is not included in the list".to_string()
    }

    fn check(&self, value: &Value) -> Result<Option<String>, CoreError> {
        let included = self
            .allowed
            .iter()
            .any(|allowed| same_value(allowed, value));
        Ok((!included).then(|| self.default_message()))
    }
}

/// Numbers compare by value, so `1` and `1.0` are the same member.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Expected JSON type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeCheck {
    #[serde(rename = "type")]
    pub expected: JsonType,
}

impl AttributeCheck for TypeCheck {
    fn kind(&self) -> &str {
        "type_check"
    }

    fn default_message(&self) -> String {
        let name = match self.expected {
            JsonType::String => "a string",
            JsonType::Number => "a number",
            JsonType::Integer => "an integer",
            JsonType::Boolean => "a boolean",
            JsonType::Array => "an array",
            JsonType::Object => "an object",
        };
        format!("must be {name}")
    }

    fn check(&self, value: &Value) -> Result<Option<String>, CoreError> {
        let matches = match self.expected {
            JsonType::String => value.is_string(),
            JsonType::Number => value.is_number(),
            JsonType::Integer => value.is_i64() || value.is_u64(),
            JsonType::Boolean => value.is_boolean(),
            JsonType::Array => value.is_array(),
            JsonType::Object => value.is_object(),
        };
        Ok((!matches).then(|| self.default_message()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Email;

impl AttributeCheck for Email {
    fn kind(&self) -> &str {
        "email"
    }

    fn default_message(&self) -> String {
        "is not a valid email address".to_string()
    }

    fn check(&self, value: &Value) -> Result<Option<String>, CoreError> {
        let valid = match value {
            Value::String(s) => s.validate_email(),
            _ => false,
        };
        Ok((!valid).then(|| self.default_message()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Url;

impl AttributeCheck for Url {
    fn kind(&self) -> &str {
        "url"
    }

    fn default_message(&self) -> String {
        "is not a valid URL".to_string()
    }

    fn check(&self, value: &Value) -> Result<Option<String>, CoreError> {
        let valid = match value {
            Value::String(s) => s.validate_url(),
            _ => false,
        };
        Ok((!valid).then(|| self.default_message()))
    }
}

/// Caller-supplied predicate. Sees the raw value, null included, and may fail
/// with an error that aborts the run.
pub struct Predicate<F> {
    name: String,
    body: F,
}

impl<F> Predicate<F>
where
    F: Fn(&Value) -> Result<Option<String>, CoreError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

impl<F> AttributeCheck for Predicate<F>
where
    F: Fn(&Value) -> Result<Option<String>, CoreError> + Send + Sync,
{
    fn kind(&self) -> &str {
        &self.name
    }

    fn default_message(&self) -> String {
        "is invalid".to_string()
    }

    fn check(&self, value: &Value) -> Result<Option<String>, CoreError> {
        (self.body)(value)
    }

    fn checks_null(&self) -> bool {
        true
    }
}
