//! Integration tests for `contracts generate` and `contracts check` against
//! temporary schema trees.

use std::path::{Path, PathBuf};

use contracts_cli::check::{run_check, CheckArgs};
use contracts_cli::generate::{run_generate, GenerateArgs};
use contracts_cli::{load_config, SchemaArgs};
use contracts_schema::{BackendKind, GeneratorConfig};

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

const ENVELOPE: &str = r#"{
    "$schema": "http://json-schema.org/draft-07/schema#",
    "title": "BaseMessage",
    "type": "object",
    "properties": {
        "messageId": {"type": "string", "format": "uuid"},
        "timestamp": {"type": "string", "format": "date-time"},
        "correlationId": {"type": "string", "format": "uuid"},
        "consumedBy": {"type": "array", "items": {"type": "string"}}
    },
    "required": ["messageId", "timestamp", "correlationId", "consumedBy"]
}"#;

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, text).unwrap();
}

fn message(consumers: &str) -> String {
    format!(
        r#"{{"allOf": [{{"$ref": "../base-message.json"}}, {{"properties": {{"consumedBy": {{"const": {consumers}}}, "orderId": {{"type": "string", "format": "uuid"}}}}, "required": ["orderId"]}}]}}"#
    )
}

fn config(schema_root: &Path, output_root: &Path) -> GeneratorConfig {
    GeneratorConfig {
        root_namespace: "Acme.Contracts".into(),
        schema_root: schema_root.to_path_buf(),
        output_root: output_root.to_path_buf(),
        backends: vec![BackendKind::Csharp, BackendKind::Rust],
        ..GeneratorConfig::default()
    }
}

fn count_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|e| {
            let path = e.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}

#[test]
fn generates_reference_schemas() {
    let out = tempfile::tempdir().unwrap();
    let config = load_config(Some(repo_root().join("contracts.yaml").as_path()), &repo_root()).unwrap();
    let args = GenerateArgs {
        output_dir: Some(out.path().to_path_buf()),
        ..GenerateArgs::default()
    };

    assert_eq!(run_generate(&args, config).unwrap(), 0);

    let csharp = out.path().join("csharp/Orders/OrderCompletedEvent.cs");
    let text = std::fs::read_to_string(csharp).unwrap();
    assert!(text.contains("public record OrderCompletedEvent"));
    assert!(out.path().join("rust/lib.rs").is_file());
    assert!(out.path().join("rust/shared/price_breakdown.rs").is_file());
    assert!(out.path().join("rust/geometry/bounding_box.rs").is_file());
}

#[test]
fn failed_run_writes_nothing() {
    let schemas = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(schemas.path(), "base-message.json", ENVELOPE);
    write(schemas.path(), "orders/order-placed.json", &message(r#"["Billing"]"#));
    write(schemas.path(), "orders/order-voided.json", &message("[]"));

    let code = run_generate(&GenerateArgs::default(), config(schemas.path(), out.path())).unwrap();
    assert_eq!(code, 1);
    assert_eq!(count_files(out.path()), 0);
}

#[test]
fn allow_partial_writes_passing_schemas() {
    let schemas = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(schemas.path(), "base-message.json", ENVELOPE);
    write(schemas.path(), "orders/order-placed.json", &message(r#"["Billing"]"#));
    write(schemas.path(), "orders/order-voided.json", &message("[]"));

    let args = GenerateArgs {
        allow_partial: true,
        backends: vec![BackendKind::Csharp],
        ..GenerateArgs::default()
    };
    let code = run_generate(&args, config(schemas.path(), out.path())).unwrap();
    assert_eq!(code, 1);
    assert!(out.path().join("csharp/Orders/OrderPlaced.cs").is_file());
    assert!(!out.path().join("csharp/Orders/OrderVoided.cs").exists());
}

#[test]
fn dry_run_touches_nothing() {
    let schemas = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(schemas.path(), "base-message.json", ENVELOPE);
    write(schemas.path(), "orders/order-placed.json", &message(r#"["Billing"]"#));

    let args = GenerateArgs {
        dry_run: true,
        ..GenerateArgs::default()
    };
    assert_eq!(run_generate(&args, config(schemas.path(), out.path())).unwrap(), 0);
    assert_eq!(count_files(out.path()), 0);
}

#[test]
fn check_reports_cycles_and_missing_root() {
    let schemas = tempfile::tempdir().unwrap();
    write(schemas.path(), "a.json", r#"{"allOf": [{"$ref": "b.json"}]}"#);
    write(schemas.path(), "b.json", r#"{"allOf": [{"$ref": "a.json"}]}"#);
    let cfg = config(schemas.path(), schemas.path());

    assert_eq!(run_check(&CheckArgs::default(), cfg.clone()).unwrap(), 1);

    let missing = CheckArgs {
        schemas: SchemaArgs {
            schema_root: Some(schemas.path().join("nope")),
            ..SchemaArgs::default()
        },
        ..CheckArgs::default()
    };
    assert!(run_check(&missing, cfg).is_err());
}

#[test]
fn check_passes_reference_schemas() {
    let config = load_config(Some(repo_root().join("contracts.yaml").as_path()), &repo_root()).unwrap();
    assert_eq!(run_check(&CheckArgs { deny_warnings: true, ..CheckArgs::default() }, config).unwrap(), 0);
}
