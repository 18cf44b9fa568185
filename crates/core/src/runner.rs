//! Running declared rules against a record.
//!
//! Each [`ValidationRunner`] executes only the rules bound to its own
//! context and clears its own collection first. [`Validated::is_valid`] and
//! [`Validated::has_warnings`] pick the runner explicitly.

use crate::error::CoreError;
use crate::record::{Record, Validated, WarningProxy};
use crate::report::ValidationReport;
use crate::rules::RuleSet;
use crate::types::ValidationContext;

/// Strategy for one validation context.
pub trait ValidationRunner {
    fn context(&self) -> ValidationContext;

    fn run<R: Record>(
        &self,
        rules: &RuleSet,
        model: &mut Validated<R>,
        run_context: Option<&str>,
    ) -> Result<(), CoreError>;
}

/// Runs error-context rules into `errors`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunForErrors;

impl ValidationRunner for RunForErrors {
    fn context(&self) -> ValidationContext {
        ValidationContext::Errors
    }

    fn run<R: Record>(
        &self,
        rules: &RuleSet,
        model: &mut Validated<R>,
        run_context: Option<&str>,
    ) -> Result<(), CoreError> {
        model.errors_mut().clear();
        model.set_checked(false);
        for rule in rules.rules_for(ValidationContext::Errors, run_context) {
            rule.run(&mut *model)?;
        }
        model.set_checked(true);
        tracing::debug!(
            context = %ValidationContext::Errors,
            run_context = run_context.unwrap_or("none"),
            issues = model.errors().len(),
            "Validation run finished"
        );
        Ok(())
    }
}

/// Runs warning-context rules through a [`WarningProxy`] into `warnings`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunForWarnings;

impl ValidationRunner for RunForWarnings {
    fn context(&self) -> ValidationContext {
        ValidationContext::Warnings
    }

    fn run<R: Record>(
        &self,
        rules: &RuleSet,
        model: &mut Validated<R>,
        run_context: Option<&str>,
    ) -> Result<(), CoreError> {
        model.warnings_mut().clear();
        {
            let mut proxy = WarningProxy::new(model);
            for rule in rules.rules_for(ValidationContext::Warnings, run_context) {
                rule.run(&mut proxy)?;
            }
        }
        tracing::debug!(
            context = %ValidationContext::Warnings,
            run_context = run_context.unwrap_or("none"),
            issues = model.warnings().len(),
            "Validation run finished"
        );
        Ok(())
    }
}

impl<R: Record> Validated<R> {
    /// Run `runner` against this record.
    pub fn run<V: ValidationRunner>(
        &mut self,
        runner: &V,
        rules: &RuleSet,
        run_context: Option<&str>,
    ) -> Result<(), CoreError> {
        runner.run(rules, self, run_context)
    }

    /// Blocking validity check.
    ///
    /// Clears `warnings`, then runs the error-context rules. Returns whether
    /// `errors` is empty afterwards.
    pub fn is_valid(
        &mut self,
        rules: &RuleSet,
        run_context: Option<&str>,
    ) -> Result<bool, CoreError> {
        self.warnings_mut().clear();
        self.run(&RunForErrors, rules, run_context)?;
        Ok(self.errors().is_empty())
    }

    /// Re-run the warning-context rules against the current attributes and
    /// report whether any of them produced an issue. `errors` is untouched.
    pub fn has_warnings(
        &mut self,
        rules: &RuleSet,
        run_context: Option<&str>,
    ) -> Result<bool, CoreError> {
        self.run(&RunForWarnings, rules, run_context)?;
        Ok(!self.warnings().is_empty())
    }

    /// Gate for persistence: `Err(CoreError::Validation)` when blocking rules
    /// fail. Warnings never fail the gate.
    pub fn ensure_valid(
        &mut self,
        rules: &RuleSet,
        run_context: Option<&str>,
    ) -> Result<(), CoreError> {
        if self.is_valid(rules, run_context)? {
            return Ok(());
        }
        Err(CoreError::Validation(self.errors().full_messages().join(", ")))
    }

    /// Snapshot of both collections as they stand. `is_valid` is only true
    /// when a blocking run has happened since the record was last changed.
    pub fn report(&self) -> ValidationReport {
        ValidationReport::from_collections(self.errors(), self.warnings(), self.is_checked())
    }
}

/// A record type with a rule set of its own.
pub trait Model: Record {
    fn rules() -> &'static RuleSet;
}

impl<M: Model> Validated<M> {
    /// [`is_valid`](Self::is_valid) with the type's own rules.
    pub fn valid(&mut self, run_context: Option<&str>) -> Result<bool, CoreError> {
        self.is_valid(M::rules(), run_context)
    }

    /// [`has_warnings`](Self::has_warnings) with the type's own rules.
    pub fn warnings_present(&mut self, run_context: Option<&str>) -> Result<bool, CoreError> {
        self.has_warnings(M::rules(), run_context)
    }

    /// [`ensure_valid`](Self::ensure_valid) with the type's own rules.
    pub fn validate_for_save(&mut self, run_context: Option<&str>) -> Result<(), CoreError> {
        self.ensure_valid(M::rules(), run_context)
    }
}
