//! Ordered attribute → messages multi-map used for both errors and warnings.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::BASE_KEY;

/// Validation outcomes keyed by attribute name.
///
/// Keys keep the order in which they were first reported; messages for one
/// key keep the order in which they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueCollection {
    entries: IndexMap<String, Vec<String>>,
}

impl IssueCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `attribute`.
    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) {
        self.entries
            .entry(attribute.into())
            .or_default()
            .push(message.into());
    }

    /// Record a message that concerns the whole record.
    pub fn add_to_base(&mut self, message: impl Into<String>) {
        self.add(BASE_KEY, message);
    }

    /// Messages reported for `attribute`, empty when there are none.
    pub fn get(&self, attribute: &str) -> &[String] {
        self.entries
            .get(attribute)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.entries.contains_key(attribute)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of messages across all attributes.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate `(attribute, message)` pairs in report order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(attribute, messages)| {
            messages
                .iter()
                .map(move |message| (attribute.as_str(), message.as_str()))
        })
    }

    /// Human-readable messages, prefixed with the attribute name except for
    /// whole-record issues.
    pub fn full_messages(&self) -> Vec<String> {
        self.iter()
            .map(|(attribute, message)| {
                if attribute == BASE_KEY {
                    message.to_string()
                } else {
                    format!("{attribute} {message}")
                }
            })
            .collect()
    }
}
