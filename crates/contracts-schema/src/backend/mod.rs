//! # Language Backends
//!
//! A backend turns one [`IrType`] into source text for one target language.
//! Backends are pure: they never touch the filesystem and never mutate the
//! IR. Writing [`GeneratedArtifact`]s is the caller's concern.
//!
//! Adding a language means implementing [`LanguageBackend`]; the resolver,
//! validator and IR builder are unaware of which backends exist.

pub mod csharp;
pub mod rust;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use contracts_core::{ContractsError, NamespacePath, SchemaId};

use crate::config::BackendKind;
use crate::ir::{IrGraph, IrType};

pub use csharp::CsharpBackend;
pub use rust::RustBackend;

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifact {
    /// Backend that produced the file.
    pub backend: &'static str,
    /// Path below the backend's output directory.
    pub relative_path: PathBuf,
    /// Source text.
    pub contents: String,
    /// Message schema the file was generated for, if any.
    pub source: Option<SchemaId>,
}

impl GeneratedArtifact {
    /// Where the file lands under `output_root`.
    pub fn output_path(&self, output_root: &Path) -> PathBuf {
        output_root.join(self.backend).join(&self.relative_path)
    }
}

/// Emits source text for one target language.
pub trait LanguageBackend: Send + Sync {
    /// Short name, also used as the output subdirectory.
    fn name(&self) -> &'static str;

    /// File path of `ty` below the backend's output directory.
    fn relative_path(&self, ty: &IrType) -> PathBuf;

    /// Source text for one type.
    fn emit(&self, ty: &IrType, namespace: &NamespacePath) -> Result<String, ContractsError>;

    /// Module index files for a finished set of emitted paths.
    ///
    /// Languages that discover types by namespace need none.
    fn emit_index(&self, _paths: &[&Path]) -> Vec<GeneratedArtifact> {
        Vec::new()
    }

    /// Emit every type of a graph.
    fn emit_graph(&self, graph: &IrGraph) -> Result<Vec<GeneratedArtifact>, ContractsError> {
        graph
            .types()
            .iter()
            .map(|ty| {
                Ok(GeneratedArtifact {
                    backend: self.name(),
                    relative_path: self.relative_path(ty),
                    contents: self.emit(ty, &ty.namespace)?,
                    source: Some(graph.root_id().clone()),
                })
            })
            .collect()
    }
}

/// Construct the built-in backend for `kind`.
pub fn backend_for(kind: BackendKind, root: &NamespacePath) -> Box<dyn LanguageBackend> {
    match kind {
        BackendKind::Csharp => Box::new(CsharpBackend::new(root.clone())),
        BackendKind::Rust => Box::new(RustBackend::new(root.clone())),
    }
}

/// Namespace segments below `root`, or all of them when `ns` is elsewhere.
pub(crate) fn relative_segments<'n>(root: &NamespacePath, ns: &'n NamespacePath) -> &'n [String] {
    let root = root.segments();
    let all = ns.segments();
    if all.starts_with(root) {
        &all[root.len()..]
    } else {
        all
    }
}

/// Identifier for an enum value: its PascalCase form, prefixed when that
/// would not start with a letter.
pub(crate) fn variant_name(value: &str) -> String {
    let name = crate::namespace::pascal_case(value);
    match name.chars().next() {
        Some(c) if c.is_alphabetic() => name,
        _ => format!("V{name}"),
    }
}

/// Identifiers for every value of an enum, in declaration order.
///
/// # Errors
///
/// `Backend` when two distinct values map to the same identifier.
pub(crate) fn variant_names(ty: &IrType) -> Result<Vec<String>, ContractsError> {
    let mut seen: HashMap<String, &str> = HashMap::with_capacity(ty.variants.len());
    let mut names = Vec::with_capacity(ty.variants.len());
    for value in &ty.variants {
        let name = variant_name(value);
        if let Some(first) = seen.insert(name.clone(), value.as_str()) {
            return Err(ContractsError::Backend(format!(
                "{}: enum values {first:?} and {value:?} both map to variant {name}",
                ty.name
            )));
        }
        names.push(name);
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_segments_strip_root() {
        let root = NamespacePath::parse_dotted("Maliev.Contracts");
        let ns = NamespacePath::parse_dotted("Maliev.Contracts.Orders");
        assert_eq!(relative_segments(&root, &ns), ["Orders".to_string()]);
        let other = NamespacePath::parse_dotted("Elsewhere");
        assert_eq!(relative_segments(&root, &other).len(), 1);
    }

    #[test]
    fn variant_name_forms() {
        assert_eq!(variant_name("RuleBased"), "RuleBased");
        assert_eq!(variant_name("machine-learning"), "MachineLearning");
        assert_eq!(variant_name("3mf"), "V3mf");
        assert_eq!(variant_name(""), "V");
    }

    fn enumeration(values: &[&str]) -> IrType {
        IrType {
            name: "Finish".into(),
            namespace: NamespacePath::parse_dotted("Maliev.Contracts.Orders"),
            kind: crate::ir::IrTypeKind::Enum,
            fields: Vec::new(),
            variants: values.iter().map(|v| v.to_string()).collect(),
            description: None,
            source: SchemaId::new("orders/finish").unwrap(),
        }
    }

    #[test]
    fn variant_names_keep_declaration_order() {
        let names = variant_names(&enumeration(&["matte", "high-gloss", "3d"])).unwrap();
        assert_eq!(names, vec!["Matte", "HighGloss", "V3d"]);
    }

    #[test]
    fn colliding_variant_names_are_rejected() {
        let err = variant_names(&enumeration(&["a-b", "a_b"])).unwrap_err();
        match err {
            ContractsError::Backend(message) => {
                assert!(message.contains("Finish"), "{message}");
                assert!(message.contains("\"a-b\"") && message.contains("\"a_b\""), "{message}");
            }
            other => panic!("expected Backend error, got {other:?}"),
        }
    }

    #[test]
    fn artifacts_land_under_backend_directory() {
        let artifact = GeneratedArtifact {
            backend: "rust",
            relative_path: PathBuf::from("orders/order.rs"),
            contents: String::new(),
            source: None,
        };
        assert_eq!(
            artifact.output_path(Path::new("out")),
            PathBuf::from("out/rust/orders/order.rs")
        );
    }
}
