//! Serializable snapshot of a record's validation outcome.

use serde::{Deserialize, Serialize};

use crate::issues::IssueCollection;

/// Aggregated outcome of the most recent runs against one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True only when `checked` and no blocking issue was found.
    pub is_valid: bool,
    /// Whether a blocking run has happened since the record last changed.
    pub checked: bool,
    pub errors: Vec<FieldViolation>,
    pub warnings: Vec<FieldViolation>,
}

/// A single attribute-level issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl ValidationReport {
    pub fn from_collections(
        errors: &IssueCollection,
        warnings: &IssueCollection,
        checked: bool,
    ) -> Self {
        Self {
            is_valid: checked && errors.is_empty(),
            checked,
            errors: violations(errors),
            warnings: violations(warnings),
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

fn violations(issues: &IssueCollection) -> Vec<FieldViolation> {
    issues
        .iter()
        .map(|(field, message)| FieldViolation {
            field: field.to_string(),
            message: message.to_string(),
        })
        .collect()
}
