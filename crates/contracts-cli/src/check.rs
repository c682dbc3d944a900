//! # Check Subcommand
//!
//! Loads, resolves and governs the schema set and builds the IR of every
//! message schema without running a backend. Intended for CI.

use anyhow::Result;
use clap::Args;

use contracts_schema::{Generator, GeneratorConfig};

use crate::{discover_schemas, print_report, SchemaArgs};

/// Arguments for the `contracts check` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    #[command(flatten)]
    pub schemas: SchemaArgs,

    /// Treat warnings as errors.
    #[arg(long)]
    pub deny_warnings: bool,
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 when the set is clean, 1 otherwise.
pub fn run_check(args: &CheckArgs, mut config: GeneratorConfig) -> Result<u8> {
    args.schemas.apply(&mut config);
    config.validate()?;

    let sources = discover_schemas(&config.schema_root)?;
    let report = match Generator::new(&config).check(sources) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(1);
        }
    };
    print_report(&report);

    let has_findings = !report.diagnostics.diagnostics().is_empty();
    if !report.is_success() || (args.deny_warnings && has_findings) {
        Ok(1)
    } else {
        Ok(0)
    }
}
