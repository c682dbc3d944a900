//! # contracts-cli — CLI for the Messaging Contracts Generator
//!
//! Provides the `contracts` command-line interface. The generator library
//! never touches the filesystem; this crate discovers schema files, loads
//! the configuration, prints diagnostics and writes generated sources.
//!
//! ## Subcommands
//!
//! - `contracts generate`: run the full pipeline and write sources.
//! - `contracts check`: load, resolve, govern and build IR; writes nothing.
//!
//! ```bash
//! contracts generate
//! contracts generate --backend rust --output-dir out --allow-partial
//! contracts check --schema-root schemas -v
//! ```
//!
//! ## Exit Codes
//!
//! `0` success, `1` schema or governance errors, `2` operational failure
//! (unreadable config, I/O).

pub mod check;
pub mod generate;

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use contracts_core::SchemaId;
use contracts_schema::{GenerationReport, GeneratorConfig, RawSchema, Severity};

/// Configuration file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "contracts.yaml";

/// Arguments shared by every subcommand that reads schemas.
#[derive(Args, Debug, Clone, Default)]
pub struct SchemaArgs {
    /// Directory scanned recursively for `*.json` schemas.
    #[arg(long, value_name = "DIR")]
    pub schema_root: Option<PathBuf>,

    /// Dotted root namespace of the generated types.
    #[arg(long, value_name = "NAMESPACE")]
    pub root_namespace: Option<String>,

    /// Process independent schemas on worker threads.
    #[arg(long)]
    pub parallel: bool,
}

impl SchemaArgs {
    /// Apply these flags over a loaded configuration.
    pub fn apply(&self, config: &mut GeneratorConfig) {
        if let Some(root) = &self.schema_root {
            config.schema_root = root.clone();
        }
        if let Some(ns) = &self.root_namespace {
            config.root_namespace = ns.clone();
        }
        if self.parallel {
            config.parallel = true;
        }
    }
}

/// Load the configuration.
///
/// An explicit `path` must exist. Without one, `contracts.yaml` in
/// `work_dir` is used when present, else the defaults. Relative
/// `schema_root` and `output_root` values are resolved against the
/// directory holding the file.
pub fn load_config(path: Option<&Path>, work_dir: &Path) -> Result<GeneratorConfig> {
    let file = match path {
        Some(p) => Some(resolve_path(p, work_dir)),
        None => Some(work_dir.join(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
    };

    let Some(file) = file else {
        tracing::debug!("no configuration file; using defaults");
        let mut config = GeneratorConfig::default();
        anchor_paths(&mut config, work_dir);
        return Ok(config);
    };

    let mut config =
        GeneratorConfig::load(&file).with_context(|| format!("failed to load {}", file.display()))?;
    let base = file.parent().unwrap_or(work_dir);
    anchor_paths(&mut config, base);
    tracing::debug!(config = %file.display(), "loaded configuration");
    Ok(config)
}

fn anchor_paths(config: &mut GeneratorConfig, base: &Path) {
    config.schema_root = resolve_path(&config.schema_root, base);
    config.output_root = resolve_path(&config.output_root, base);
}

/// Resolve a possibly relative path against `base`.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Read every `*.json` file below `schema_root`, sorted by identity.
///
/// The identity of a file is its path relative to `schema_root`.
pub fn discover_schemas(schema_root: &Path) -> Result<Vec<RawSchema>> {
    if !schema_root.is_dir() {
        anyhow::bail!("schema root {} is not a directory", schema_root.display());
    }

    let mut files = Vec::new();
    find_json_files(schema_root, &mut files)?;
    files.sort();

    let mut sources = Vec::with_capacity(files.len());
    for path in files {
        let relative = path.strip_prefix(schema_root).unwrap_or(&path);
        let logical: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        let id = SchemaId::new(logical.join("/"))?;
        let text =
            std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
        sources.push(RawSchema::new(id, text));
    }

    tracing::info!(
        schema_root = %schema_root.display(),
        count = sources.len(),
        "discovered schema files"
    );
    Ok(sources)
}

fn find_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            find_json_files(&path, out)?;
        } else if path.extension().is_some_and(|e| e == "json") {
            out.push(path);
        }
    }
    Ok(())
}

/// Print failures and findings to stderr and a summary line to stdout.
pub fn print_report(report: &GenerationReport) {
    for failure in &report.failures {
        eprintln!("error: {failure}");
    }
    for diagnostic in report.diagnostics.diagnostics() {
        eprintln!("{diagnostic}");
    }

    let warnings = report
        .diagnostics
        .diagnostics()
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    println!(
        "Schemas: {}/{} messages built, {} error(s), {} warning(s)",
        report.generated.len(),
        report.messages.len(),
        report.error_count(),
        warnings
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo_root() -> PathBuf {
        let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        dir.pop(); // crates/
        dir.pop(); // repo root
        dir
    }

    #[test]
    fn discovers_reference_schemas_by_identity() {
        let sources = discover_schemas(&repo_root().join("schemas")).unwrap();
        let ids: Vec<&str> = sources.iter().map(|s| s.id.as_str()).collect();
        assert!(ids.contains(&"base-message"));
        assert!(ids.contains(&"orders/order-completed-event"));
        assert!(ids.contains(&"shared/price-breakdown"));
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn repository_config_anchors_paths() {
        let root = repo_root();
        let config = load_config(Some(Path::new("contracts.yaml")), &root).unwrap();
        assert_eq!(config.schema_root, root.join("schemas"));
        assert_eq!(config.output_root, root.join("generated"));
        assert_eq!(config.root_namespace, "Maliev.MessagingContracts.Contracts");
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        assert!(load_config(Some(Path::new("no-such-config.yaml")), &repo_root()).is_err());
    }

    #[test]
    fn flags_override_config() {
        let mut config = GeneratorConfig::default();
        let args = SchemaArgs {
            schema_root: Some(PathBuf::from("/tmp/schemas")),
            root_namespace: Some("Acme.Contracts".into()),
            parallel: true,
        };
        args.apply(&mut config);
        assert_eq!(config.schema_root, PathBuf::from("/tmp/schemas"));
        assert_eq!(config.root_namespace, "Acme.Contracts");
        assert!(config.parallel);
    }
}
