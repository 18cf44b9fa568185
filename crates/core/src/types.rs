use serde::{Deserialize, Serialize};

/// Attribute values are read from records as JSON values; absent attributes
/// read as `Value::Null`.
pub type Value = serde_json::Value;

/// Key used for issues that concern the record as a whole.
pub const BASE_KEY: &str = "base";

/// Which issue collection a declared rule reports into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationContext {
    /// Blocking rules, reported into `errors`.
    #[default]
    Errors,
    /// Non-blocking rules, reported into `warnings`.
    Warnings,
}

impl ValidationContext {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Errors => "errors",
            Self::Warnings => "warnings",
        }
    }
}

impl std::fmt::Display for ValidationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
