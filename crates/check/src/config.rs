use std::path::PathBuf;

use anyhow::{bail, Context};

/// Checker configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    /// Rule document to validate against.
    pub rules_path: PathBuf,
    /// JSON array of records.
    pub records_path: PathBuf,
    /// Run context passed to every validation run (e.g. `create`).
    pub run_context: Option<String>,
    /// Count records with warnings as failures.
    pub strict: bool,
}

impl CheckConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var               | Default  |
    /// |-----------------------|----------|
    /// | `CAVEAT_RULES_PATH`   | required |
    /// | `CAVEAT_RECORDS_PATH` | required |
    /// | `CAVEAT_CONTEXT`      | unset    |
    /// | `CAVEAT_STRICT`       | `false`  |
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rules_path = lookup("CAVEAT_RULES_PATH")
            .filter(|v| !v.trim().is_empty())
            .context("CAVEAT_RULES_PATH environment variable is required")?;

        let records_path = lookup("CAVEAT_RECORDS_PATH")
            .filter(|v| !v.trim().is_empty())
            .context("CAVEAT_RECORDS_PATH environment variable is required")?;

        let run_context = lookup("CAVEAT_CONTEXT")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let strict = match lookup("CAVEAT_STRICT").as_deref().map(str::trim) {
            None | Some("") => false,
            Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => true,
            Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => false,
            Some(other) => bail!("CAVEAT_STRICT must be true/false, got {other:?}"),
        };

        Ok(Self {
            rules_path: rules_path.into(),
            records_path: records_path.into(),
            run_context,
            strict,
        })
    }
}
