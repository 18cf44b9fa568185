#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid usage: {0}")]
    InvalidUsage(String),

    #[error("Rule {rule} failed to execute: {message}")]
    RuleExecution { rule: String, message: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Malformed rule document: {0}")]
    Parse(#[from] serde_json::Error),
}
