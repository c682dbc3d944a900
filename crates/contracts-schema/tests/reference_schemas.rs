//! Integration test: run the full pipeline over the reference schemas in
//! `schemas/` with the repository's `contracts.yaml`.

use std::path::{Path, PathBuf};

use contracts_core::SchemaId;
use contracts_schema::{
    GeneratorConfig, Generator, IrFieldType, IrTypeKind, PrimitiveKind, RawSchema, SchemaLoader,
};

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn find_schema_files(dir: &Path, out: &mut Vec<PathBuf>) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                find_schema_files(&path, out);
            } else if path.extension().is_some_and(|e| e == "json") {
                out.push(path);
            }
        }
    }
}

fn reference_sources() -> Vec<RawSchema> {
    let schema_root = repo_root().join("schemas");
    let mut files = Vec::new();
    find_schema_files(&schema_root, &mut files);
    files.sort();
    files
        .iter()
        .map(|path| {
            let relative = path.strip_prefix(&schema_root).unwrap();
            let id = SchemaId::new(relative.to_string_lossy()).unwrap();
            RawSchema::new(id, std::fs::read_to_string(path).unwrap())
        })
        .collect()
}

fn config() -> GeneratorConfig {
    GeneratorConfig::load(&repo_root().join("contracts.yaml")).expect("contracts.yaml must parse")
}

fn id(s: &str) -> SchemaId {
    SchemaId::new(s).unwrap()
}

#[test]
fn reference_set_classifies_messages() {
    let set = SchemaLoader::new().load(reference_sources()).unwrap();
    assert_eq!(set.rejected().count(), 0, "{:?}", set.rejected().collect::<Vec<_>>());
    let messages: Vec<&str> = set.message_ids().iter().map(|id| id.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "customers/nda-expiring-event",
            "geometry/file-analyzed-event",
            "orders/order-completed-event",
            "pricing/price-calculated-event",
        ]
    );
}

#[test]
fn reference_set_generates_cleanly() {
    let report = Generator::new(&config()).run(reference_sources()).unwrap();
    let failures: Vec<String> = report.failures.iter().map(ToString::to_string).collect();
    assert!(failures.is_empty(), "{failures:#?}");
    assert!(report.diagnostics.diagnostics().is_empty(), "{:#?}", report.diagnostics);
    assert!(report.is_success());
    assert_eq!(report.generated.len(), 4);
    assert_eq!(report.writable_artifacts(false).len(), report.artifacts.len());
}

#[test]
fn order_completed_event_keeps_envelope_order() {
    let set = SchemaLoader::new().load(reference_sources()).unwrap();
    let generator = Generator::new(&config());
    let graph = generator
        .build_graph(&set, &id("orders/order-completed-event"))
        .unwrap();
    let root = graph.root();

    assert_eq!(root.name, "OrderCompletedEvent");
    assert_eq!(root.namespace.to_string(), "Maliev.MessagingContracts.Contracts.Orders");
    assert_eq!(
        root.field_names(),
        vec![
            "messageId",
            "messageName",
            "messageType",
            "messageVersion",
            "publishedBy",
            "consumedBy",
            "correlationId",
            "causationId",
            "timestamp",
            "isPublic",
            "orderId",
            "quotationId",
            "completedAt",
            "jobSucceeded",
            "actualPrintTimeHours",
            "actualTotalCost",
        ]
    );

    let cost = root.field("actualTotalCost").unwrap();
    assert!(cost.nullable && cost.optional);
    assert_eq!(cost.ty, IrFieldType::Primitive(PrimitiveKind::Decimal));
    let order_id = root.field("orderId").unwrap();
    assert!(!order_id.nullable && !order_id.optional);
    assert!(root.field("causationId").unwrap().nullable);
}

#[test]
fn price_calculated_event_collects_auxiliary_types() {
    let set = SchemaLoader::new().load(reference_sources()).unwrap();
    let graph = Generator::new(&config())
        .build_graph(&set, &id("pricing/price-calculated-event"))
        .unwrap();

    let names: Vec<&str> = graph.types().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "PriceCalculatedEvent",
            "MessageType",
            "Strategy",
            "PriceBreakdown",
            "PriceAdjustment"
        ]
    );

    let breakdown = graph.get("PriceBreakdown").unwrap();
    assert_eq!(breakdown.namespace.to_string(), "Maliev.MessagingContracts.Contracts.Shared");
    assert_eq!(breakdown.kind, IrTypeKind::Record);
    assert_eq!(graph.get("Strategy").unwrap().kind, IrTypeKind::Enum);
    assert_eq!(
        graph.get("PriceAdjustment").unwrap().description.as_deref(),
        Some("A manual change to a calculated price.")
    );
}

#[test]
fn emitted_sources_reflect_the_contract() {
    let report = Generator::new(&config()).run(reference_sources()).unwrap();
    let file = |backend: &str, path: &str| {
        report
            .artifacts
            .iter()
            .find(|a| a.backend == backend && a.relative_path == Path::new(path))
            .map(|a| a.contents.as_str())
            .unwrap_or_else(|| panic!("missing {backend}/{path}"))
    };

    let csharp = file("csharp", "Orders/OrderCompletedEvent.cs");
    assert!(csharp.contains("namespace Maliev.MessagingContracts.Contracts.Orders;"));
    assert!(csharp.contains("public string PublishedBy { get; init; } = \"OrderService\";"));
    assert!(csharp.contains("public decimal? ActualTotalCost { get; init; }"));
    assert!(csharp.contains("public required Guid OrderId { get; init; }"));
    assert!(csharp.contains("public bool IsPublic { get; init; } = false;"));

    let rust = file("rust", "pricing/price_calculated_event.rs");
    assert!(rust.contains("pub breakdown: super::super::shared::PriceBreakdown,"));
    assert!(rust.contains("pub adjustments: Option<Vec<super::PriceAdjustment>>,"));
    assert!(rust.contains("pub fn price_calculated_event_currency() -> String {"));

    let geometry = file("rust", "geometry/file_analyzed_event.rs");
    assert!(geometry.contains(
        "#[serde(rename = \"layerHeightsMm\", with = \"decimal_list\")]\n    pub layer_heights_mm: Vec<::rust_decimal::Decimal>,"
    ));
    assert!(geometry.contains("mod decimal_list {"));
    let message_type = file("rust", "geometry/message_type.rs");
    assert!(message_type.contains("/// Whether the message is a command or an event.\n#[derive("));

    let lib = file("rust", "lib.rs");
    assert!(lib.contains("pub mod customers;\npub mod geometry;\npub mod orders;\npub mod pricing;\npub mod shared;\n"));
}

#[test]
fn parallel_generation_is_deterministic() {
    let serial = Generator::new(&config()).with_parallel(false).run(reference_sources()).unwrap();
    let parallel = Generator::new(&config()).with_parallel(true).run(reference_sources()).unwrap();
    assert_eq!(serial.artifacts, parallel.artifacts);
    assert_eq!(serial.diagnostics, parallel.diagnostics);
}
