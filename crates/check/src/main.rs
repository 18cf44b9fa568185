//! `caveat-check` -- validate a batch of JSON records against a rule document.
//!
//! Prints one JSON line per record with its errors and warnings. Warnings
//! never fail the run unless strict mode is enabled.
//!
//! # Environment variables
//!
//! | Variable              | Required | Default | Description                              |
//! |-----------------------|----------|---------|------------------------------------------|
//! | `CAVEAT_RULES_PATH`   | yes      | --      | Rule document (JSON)                     |
//! | `CAVEAT_RECORDS_PATH` | yes      | --      | JSON array of records                    |
//! | `CAVEAT_CONTEXT`      | no       | --      | Run context such as `create` or `update` |
//! | `CAVEAT_STRICT`       | no       | `false` | Treat warnings as failures               |
//!
//! Exit codes: `0` all records pass, `1` some record fails, `2` bad setup.

use std::process::ExitCode;

use caveat_check::checker;
use caveat_check::config::CheckConfig;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caveat_check=info,caveat_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match CheckConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::from(2);
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match checker::run(&config, &mut out) {
        Ok(summary) if summary.passed(config.strict) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Check failed");
            ExitCode::from(2)
        }
    }
}
