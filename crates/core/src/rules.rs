//! Rule declaration.
//!
//! Rules are declared through a [`RuleDeclarer`]. Every rule is bound to the
//! declarer's current [`ValidationContext`] at the moment it is declared, so a
//! rule declared inside [`RuleDeclarer::declare_warnings`] stays a warning
//! rule for every later run. The finished [`RuleSet`] is immutable and can be
//! shared across threads.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::error::CoreError;
use crate::record::ValidationTarget;
use crate::types::ValidationContext;
use crate::validators::{AttributeCheck, EachValidator};

/// A rule body. Implementations report into `target.issues()` and return
/// `Err` only when the rule itself cannot be evaluated.
pub trait Validator: Send + Sync {
    /// Short name used in logs and execution errors.
    fn name(&self) -> &str;

    fn validate(
        &self,
        target: &mut dyn ValidationTarget,
        options: &RuleOptions,
    ) -> Result<(), CoreError>;
}

/// Per-declaration options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOptions {
    /// Run context (`"create"`, `"update"`, ...) the rule is limited to.
    /// `None` runs the rule in every context.
    pub on: Option<String>,
    /// Treat null attributes as "rule inapplicable". Ignored by presence and
    /// custom checks, which always see the raw value.
    pub allow_nil: bool,
    /// Replaces the check's default message.
    pub message: Option<String>,
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            on: None,
            allow_nil: true,
            message: None,
        }
    }
}

impl RuleOptions {
    pub fn on(mut self, context: impl Into<String>) -> Self {
        self.on = Some(context.into());
        self
    }

    pub fn allow_nil(mut self, allow_nil: bool) -> Self {
        self.allow_nil = allow_nil;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// A validator together with the context it was declared in.
#[derive(Clone)]
pub struct BoundRule {
    context: ValidationContext,
    validator: Arc<dyn Validator>,
    options: RuleOptions,
}

impl BoundRule {
    pub fn context(&self) -> ValidationContext {
        self.context
    }

    pub fn validator(&self) -> &dyn Validator {
        self.validator.as_ref()
    }

    pub fn options(&self) -> &RuleOptions {
        &self.options
    }

    /// Whether the rule takes part in a run started with `run_context`.
    pub fn applies_to(&self, run_context: Option<&str>) -> bool {
        match self.options.on.as_deref() {
            None => true,
            Some(on) => run_context == Some(on),
        }
    }

    pub(crate) fn run(&self, target: &mut dyn ValidationTarget) -> Result<(), CoreError> {
        self.validator.validate(target, &self.options)
    }
}

impl fmt::Debug for BoundRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundRule")
            .field("context", &self.context)
            .field("validator", &self.validator.name())
            .field("options", &self.options)
            .finish()
    }
}

/// Immutable set of declared rules for one record type.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<BoundRule>,
}

impl RuleSet {
    /// Rules bound to `context` that take part in a run with `run_context`,
    /// in declaration order.
    pub fn rules_for<'a>(
        &'a self,
        context: ValidationContext,
        run_context: Option<&'a str>,
    ) -> impl Iterator<Item = &'a BoundRule> + 'a {
        self.rules
            .iter()
            .filter(move |rule| rule.context == context && rule.applies_to(run_context))
    }

    /// Number of rules declared in `context`, regardless of run context.
    pub fn count(&self, context: ValidationContext) -> usize {
        self.rules.iter().filter(|rule| rule.context == context).count()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundRule> {
        self.rules.iter()
    }
}

/// Closure-backed validator for record-level rules.
pub struct FnValidator<F> {
    name: String,
    body: F,
}

impl<F> FnValidator<F>
where
    F: Fn(&mut dyn ValidationTarget) -> Result<(), CoreError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

impl<F> Validator for FnValidator<F>
where
    F: Fn(&mut dyn ValidationTarget) -> Result<(), CoreError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(
        &self,
        target: &mut dyn ValidationTarget,
        _options: &RuleOptions,
    ) -> Result<(), CoreError> {
        (self.body)(target)
    }
}

/// Collects rule declarations for one record type.
#[derive(Debug, Default)]
pub struct RuleDeclarer {
    rules: Vec<BoundRule>,
    context: ValidationContext,
}

impl RuleDeclarer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context new declarations are bound to.
    pub fn context(&self) -> ValidationContext {
        self.context
    }

    /// Declare `check` against each of `attributes`.
    pub fn validates<C>(
        &mut self,
        attributes: &[&str],
        check: C,
        options: RuleOptions,
    ) -> &mut Self
    where
        C: AttributeCheck + 'static,
    {
        let validator = EachValidator::new(attributes.iter().map(|a| a.to_string()), check);
        self.add(validator, options)
    }

    /// Declare a record-level rule backed by a closure.
    pub fn validate_with<F>(&mut self, name: &str, body: F, options: RuleOptions) -> &mut Self
    where
        F: Fn(&mut dyn ValidationTarget) -> Result<(), CoreError> + Send + Sync + 'static,
    {
        self.add(FnValidator::new(name, body), options)
    }

    /// Declare an arbitrary validator in the current context.
    pub fn add<V>(&mut self, validator: V, options: RuleOptions) -> &mut Self
    where
        V: Validator + 'static,
    {
        tracing::trace!(
            rule = validator.name(),
            context = %self.context,
            "Declaring validation rule"
        );
        self.rules.push(BoundRule {
            context: self.context,
            validator: Arc::new(validator),
            options,
        });
        self
    }

    /// Run `block` with every declaration bound to the warnings context.
    ///
    /// The default context is restored when the block returns, when it
    /// returns an error and when it panics. Nested warnings blocks are
    /// rejected with [`CoreError::InvalidUsage`].
    pub fn declare_warnings<F>(&mut self, block: F) -> Result<&mut Self, CoreError>
    where
        F: FnOnce(&mut RuleDeclarer) -> Result<(), CoreError>,
    {
        let mut scope = self.enter_warnings()?;
        block(&mut *scope)?;
        drop(scope);
        Ok(self)
    }

    /// Switch to the warnings context until the returned guard is dropped.
    pub fn enter_warnings(&mut self) -> Result<WarningsScope<'_>, CoreError> {
        if self.context == ValidationContext::Warnings {
            tracing::warn!("Rejected nested warnings block");
            return Err(CoreError::InvalidUsage(
                "warnings blocks cannot be nested".to_string(),
            ));
        }
        self.context = ValidationContext::Warnings;
        Ok(WarningsScope { declarer: self })
    }

    pub fn build(self) -> RuleSet {
        RuleSet { rules: self.rules }
    }
}

/// Guard holding a [`RuleDeclarer`] in the warnings context.
pub struct WarningsScope<'a> {
    declarer: &'a mut RuleDeclarer,
}

impl Deref for WarningsScope<'_> {
    type Target = RuleDeclarer;

    fn deref(&self) -> &RuleDeclarer {
        &*self.declarer
    }
}

impl DerefMut for WarningsScope<'_> {
    fn deref_mut(&mut self) -> &mut RuleDeclarer {
        &mut *self.declarer
    }
}

impl Drop for WarningsScope<'_> {
    fn drop(&mut self) {
        self.declarer.context = ValidationContext::Errors;
    }
}
