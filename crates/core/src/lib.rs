//! Non-blocking "warning" validations for persisted records.
//!
//! Rules are declared once per record type through a [`RuleDeclarer`]. Rules
//! declared inside [`RuleDeclarer::declare_warnings`] report into a record's
//! `warnings` collection and never affect [`Validated::is_valid`]; all other
//! rules report into `errors` as usual.
//!
//! ```
//! use caveat_core::{Numericality, Presence, RuleDeclarer, RuleOptions, Validated};
//! use serde_json::json;
//!
//! let mut declarer = RuleDeclarer::new();
//! declarer.validates(&["balance"], Presence, RuleOptions::default());
//! declarer
//!     .declare_warnings(|w| {
//!         w.validates(&["balance"], Numericality::non_negative(), RuleOptions::default());
//!         Ok(())
//!     })
//!     .unwrap();
//! let rules = declarer.build();
//!
//! let mut account = Validated::new(json!({ "balance": -5 }).as_object().unwrap().clone());
//! assert!(account.is_valid(&rules, None).unwrap());
//! assert!(account.has_warnings(&rules, None).unwrap());
//! ```

pub mod error;
pub mod issues;
pub mod record;
pub mod report;
pub mod rule_file;
pub mod rules;
pub mod runner;
pub mod types;
pub mod validators;

pub use error::CoreError;
pub use issues::IssueCollection;
pub use record::{Record, Validated, ValidationTarget, WarningProxy};
pub use report::{FieldViolation, ValidationReport};
pub use rule_file::{RuleDefinition, RuleFile};
pub use rules::{
    BoundRule, FnValidator, RuleDeclarer, RuleOptions, RuleSet, Validator, WarningsScope,
};
pub use runner::{Model, RunForErrors, RunForWarnings, ValidationRunner};
pub use types::{ValidationContext, Value, BASE_KEY};
pub use validators::{
    AttributeCheck, EachValidator, Email, Format, Inclusion, JsonType, Length, Numericality,
    Predicate, Presence, TypeCheck, Url,
};
