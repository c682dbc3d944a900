//! # contracts CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use contracts_cli::check::{run_check, CheckArgs};
use contracts_cli::generate::{run_generate, GenerateArgs};
use contracts_cli::load_config;

/// Messaging contracts generator.
///
/// Reads JSON Schema message contracts, resolves `allOf` composition,
/// enforces governance rules, and generates C# and Rust types.
#[derive(Parser, Debug)]
#[command(name = "contracts", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the configuration file (default: ./contracts.yaml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate source files for every message schema.
    Generate(GenerateArgs),

    /// Load, resolve, govern and build every schema without writing anything.
    Check(CheckArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("contracts CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let work_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = match load_config(cli.config.as_deref(), &work_dir) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(2);
        }
    };

    let result = match cli.command {
        Commands::Generate(args) => run_generate(&args, config),
        Commands::Check(args) => run_check(&args, config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
