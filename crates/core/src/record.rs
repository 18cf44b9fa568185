//! Record access and the per-instance issue collections.
//!
//! The host persistence layer owns the record; this crate only needs to read
//! attributes from it. [`Validated`] pairs a record with its `errors` and
//! `warnings` collections, and [`WarningProxy`] stands in for it while
//! warning rules run so that their outcomes land in `warnings`.

use std::collections::HashMap;
use std::hash::BuildHasher;

use crate::issues::IssueCollection;
use crate::types::Value;

/// Attribute access supplied by the host framework.
pub trait Record {
    /// Current value of `name`, `Value::Null` when the attribute is absent.
    fn read_attribute(&self, name: &str) -> Value;
}

impl Record for serde_json::Map<String, Value> {
    fn read_attribute(&self, name: &str) -> Value {
        self.get(name).cloned().unwrap_or(Value::Null)
    }
}

impl<S: BuildHasher> Record for HashMap<String, Value, S> {
    fn read_attribute(&self, name: &str) -> Value {
        self.get(name).cloned().unwrap_or(Value::Null)
    }
}

/// What a validator sees while it runs: attribute reads plus the collection
/// its outcomes are reported into.
pub trait ValidationTarget {
    fn read_attribute(&self, name: &str) -> Value;

    /// Collection that receives this rule's issues.
    fn issues(&mut self) -> &mut IssueCollection;
}

/// A record together with its blocking and non-blocking issues.
#[derive(Debug, Clone)]
pub struct Validated<R> {
    record: R,
    errors: IssueCollection,
    warnings: IssueCollection,
    /// Set by a blocking run, reset whenever the record may have changed.
    checked: bool,
}

impl<R> Validated<R> {
    pub fn new(record: R) -> Self {
        Self {
            record,
            errors: IssueCollection::new(),
            warnings: IssueCollection::new(),
            checked: false,
        }
    }

    pub fn record(&self) -> &R {
        &self.record
    }

    /// Mutable access to the wrapped record. Collections are left as they are
    /// until the next run, but `errors` no longer counts as checked.
    pub fn record_mut(&mut self) -> &mut R {
        self.checked = false;
        &mut self.record
    }

    /// Whether `errors` reflects a blocking run against the current record.
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn into_inner(self) -> R {
        self.record
    }

    /// Blocking issues from the most recent run.
    pub fn errors(&self) -> &IssueCollection {
        &self.errors
    }

    /// Non-blocking issues from the most recent run.
    pub fn warnings(&self) -> &IssueCollection {
        &self.warnings
    }

    pub(crate) fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    pub(crate) fn errors_mut(&mut self) -> &mut IssueCollection {
        &mut self.errors
    }

    pub(crate) fn warnings_mut(&mut self) -> &mut IssueCollection {
        &mut self.warnings
    }
}

impl<R: Record> ValidationTarget for Validated<R> {
    fn read_attribute(&self, name: &str) -> Value {
        self.record.read_attribute(name)
    }

    fn issues(&mut self) -> &mut IssueCollection {
        &mut self.errors
    }
}

/// Decorator that forwards everything to the wrapped record except the
/// issue collection, which resolves to `warnings`.
pub struct WarningProxy<'a, R> {
    owner: &'a mut Validated<R>,
}

impl<'a, R> WarningProxy<'a, R> {
    pub fn new(owner: &'a mut Validated<R>) -> Self {
        Self { owner }
    }
}

impl<R: Record> ValidationTarget for WarningProxy<'_, R> {
    fn read_attribute(&self, name: &str) -> Value {
        self.owner.read_attribute(name)
    }

    fn issues(&mut self) -> &mut IssueCollection {
        &mut self.owner.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn account(balance: Value) -> Validated<serde_json::Map<String, Value>> {
        let mut map = serde_json::Map::new();
        map.insert("balance".into(), balance);
        Validated::new(map)
    }

    #[test]
    fn absent_attribute_reads_as_null() {
        let model = account(json!(5));
        assert_eq!(model.read_attribute("owner"), Value::Null);
        assert_eq!(model.read_attribute("balance"), json!(5));
    }

    #[test]
    fn record_reports_into_errors() {
        let mut model = account(json!(5));
        model.issues().add("balance", "must be present");
        assert_eq!(model.errors().len(), 1);
        assert!(model.warnings().is_empty());
    }

    #[test]
    fn proxy_reports_into_warnings() {
        let mut model = account(json!(-5));
        {
            let mut proxy = WarningProxy::new(&mut model);
            assert_eq!(proxy.read_attribute("balance"), json!(-5));
            proxy.issues().add("balance", "should be non-negative");
        }
        assert!(model.errors().is_empty());
        assert_eq!(model.warnings().get("balance"), &["should be non-negative".to_string()]);
    }

    #[test]
    fn hash_map_records_are_supported() {
        let mut map: HashMap<String, Value> = HashMap::new();
        map.insert("name".into(), json!("Ada"));
        assert_eq!(map.read_attribute("name"), json!("Ada"));
        assert!(map.read_attribute("missing").is_null());
    }
}
