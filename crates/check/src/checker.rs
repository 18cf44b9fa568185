//! Batch validation of JSON records against a rule document.

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context};
use caveat_core::{CoreError, RuleFile, RuleSet, Validated, ValidationReport};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::CheckConfig;

/// Outcome for one record, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordOutcome {
    pub index: usize,
    #[serde(flatten)]
    pub report: ValidationReport,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub outcomes: Vec<RecordOutcome>,
}

impl CheckSummary {
    pub fn invalid(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.report.is_valid).count()
    }

    pub fn warned(&self) -> usize {
        self.outcomes.iter().filter(|o| o.report.has_warnings()).count()
    }

    /// Whether the batch passes. Warnings only count in strict mode.
    pub fn passed(&self, strict: bool) -> bool {
        self.invalid() == 0 && (!strict || self.warned() == 0)
    }
}

pub fn load_rules(path: &Path) -> anyhow::Result<RuleSet> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rule document {}", path.display()))?;
    let file = RuleFile::parse(&source)
        .with_context(|| format!("invalid rule document {}", path.display()))?;
    Ok(file.to_rule_set()?)
}

pub fn load_records(path: &Path) -> anyhow::Result<Vec<Map<String, Value>>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read records {}", path.display()))?;
    let document: Value = serde_json::from_str(&source)
        .with_context(|| format!("records file {} is not valid JSON", path.display()))?;
    let Value::Array(items) = document else {
        bail!("records file {} must contain a JSON array", path.display());
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(map),
            _ => bail!("record {index} is not a JSON object"),
        })
        .collect()
}

/// Run blocking and warning rules against every record.
pub fn check_records(
    rules: &RuleSet,
    records: Vec<Map<String, Value>>,
    run_context: Option<&str>,
) -> Result<CheckSummary, CoreError> {
    let mut outcomes = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let mut model = Validated::new(record);
        model.is_valid(rules, run_context)?;
        model.has_warnings(rules, run_context)?;
        outcomes.push(RecordOutcome {
            index,
            report: model.report(),
        });
    }
    Ok(CheckSummary { outcomes })
}

/// Load inputs per `config`, write one JSON line per record to `out` and
/// return the summary.
pub fn run(config: &CheckConfig, out: &mut impl Write) -> anyhow::Result<CheckSummary> {
    let rules = load_rules(&config.rules_path)?;
    let records = load_records(&config.records_path)?;
    tracing::info!(records = records.len(), rules = rules.len(), "Checking records");

    let summary = check_records(&rules, records, config.run_context.as_deref())?;
    for outcome in &summary.outcomes {
        serde_json::to_writer(&mut *out, outcome)?;
        writeln!(out)?;
    }

    tracing::info!(
        invalid = summary.invalid(),
        warned = summary.warned(),
        "Check finished"
    );
    Ok(summary)
}
