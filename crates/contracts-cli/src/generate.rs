//! # Generate Subcommand
//!
//! Runs the full pipeline and writes the generated sources below the
//! output root, one directory per backend.
//!
//! A run that reports any error writes nothing, unless `--allow-partial`
//! is given; then the sources of the schemas that passed are written and
//! the exit code still reports the failure.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use contracts_schema::{BackendKind, GeneratedArtifact, Generator, GeneratorConfig};

use crate::{discover_schemas, print_report, SchemaArgs};

/// Arguments for the `contracts generate` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub schemas: SchemaArgs,

    /// Directory generated sources are written to.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Backend to run (`csharp`, `rust`). Repeatable; replaces the configured list.
    #[arg(short, long = "backend", value_name = "NAME")]
    pub backends: Vec<BackendKind>,

    /// Write the sources of successful schemas even when others failed.
    #[arg(long)]
    pub allow_partial: bool,

    /// Report what would be written without touching the filesystem.
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateArgs {
    fn apply(&self, config: &mut GeneratorConfig) {
        self.schemas.apply(config);
        if let Some(dir) = &self.output_dir {
            config.output_root = dir.clone();
        }
        if !self.backends.is_empty() {
            config.backends = self.backends.clone();
        }
        if self.allow_partial {
            config.allow_partial = true;
        }
    }
}

/// Execute the generate subcommand.
///
/// Returns exit code: 0 on success, 1 on schema or governance errors.
pub fn run_generate(args: &GenerateArgs, mut config: GeneratorConfig) -> Result<u8> {
    args.apply(&mut config);
    config.validate()?;

    let sources = discover_schemas(&config.schema_root)?;
    let generator = Generator::new(&config);
    let report = match generator.run(sources) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(1);
        }
    };
    print_report(&report);

    let artifacts = report.writable_artifacts(config.allow_partial);
    if artifacts.is_empty() && !report.artifacts.is_empty() {
        println!("Nothing written: fix the errors above or pass --allow-partial.");
    } else if args.dry_run {
        for artifact in artifacts {
            println!("  would write {}", artifact.output_path(&config.output_root).display());
        }
    } else {
        let written = write_artifacts(artifacts, &config.output_root)?;
        println!("Wrote {written} file(s) to {}", config.output_root.display());
    }

    Ok(if report.is_success() { 0 } else { 1 })
}

/// Write artifacts below `output_root`, creating directories as needed.
pub fn write_artifacts(artifacts: &[GeneratedArtifact], output_root: &Path) -> Result<usize> {
    for artifact in artifacts {
        let path = artifact.output_path(output_root);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, &artifact.contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), "wrote artifact");
    }
    Ok(artifacts.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_replace_backends_and_output() {
        let mut config = GeneratorConfig::default();
        let args = GenerateArgs {
            output_dir: Some(PathBuf::from("out")),
            backends: vec![BackendKind::Rust],
            allow_partial: true,
            ..GenerateArgs::default()
        };
        args.apply(&mut config);
        assert_eq!(config.output_root, PathBuf::from("out"));
        assert_eq!(config.backends, vec![BackendKind::Rust]);
        assert!(config.allow_partial);
    }

    #[test]
    fn writes_nested_paths() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = vec![GeneratedArtifact {
            backend: "rust",
            relative_path: PathBuf::from("orders/order.rs"),
            contents: "pub struct Order;\n".into(),
            source: None,
        }];
        assert_eq!(write_artifacts(&artifacts, dir.path()).unwrap(), 1);
        let written = std::fs::read_to_string(dir.path().join("rust/orders/order.rs")).unwrap();
        assert_eq!(written, "pub struct Order;\n");
    }
}
