//! Rust backend: serde structs and enums.
//!
//! Layout mirrors the namespace below the root in snake case, one module
//! per type (`orders/order_completed_event.rs`), plus `mod.rs` indexes and
//! a `lib.rs` at the top that re-export every type. Cross-type paths are
//! written relative (`super::`), so the generated tree works as a crate or
//! mounted as a module.
//!
//! Value mapping: `Decimal` for numbers (serialized as exact JSON numbers,
//! also inside lists), `DateTime<Utc>` for timestamps, `Uuid` for
//! identifiers, `i64` for integers. `Option<T>` for optional or nullable
//! fields; a required nullable field must still be present on the wire.
//! Constants and defaults become named functions wired in with
//! `#[serde(default = ..)]`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use contracts_core::{ContractsError, Literal, NamespacePath};

use super::{relative_segments, variant_name, variant_names, GeneratedArtifact, LanguageBackend};
use crate::document::PrimitiveKind;
use crate::ir::{IrField, IrFieldType, IrType, IrTypeKind};
use crate::namespace::snake_case;

const INDENT: &str = "    ";
const DECIMAL: &str = "::rust_decimal::Decimal";

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "box", "break", "const", "continue", "do", "dyn", "else", "enum", "extern", "false",
    "final", "fn", "for", "if", "impl", "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override",
    "priv", "pub", "ref", "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe",
    "unsized", "use", "virtual", "where", "while", "yield",
];

/// Emits Rust source.
#[derive(Debug, Clone)]
pub struct RustBackend {
    root: NamespacePath,
}

/// How a list of decimals in one file is (de)serialized.
#[derive(Default)]
struct DecimalLists {
    plain: bool,
    optional: bool,
}

/// A field's default function.
struct DefaultFn {
    name: String,
    return_type: String,
    body: String,
    doc: String,
}

impl RustBackend {
    /// A backend laying modules out below `root`.
    pub fn new(root: NamespacePath) -> Self {
        Self { root }
    }

    fn depth(&self, namespace: &NamespacePath) -> usize {
        relative_segments(&self.root, namespace).len()
    }

    fn type_expr(&self, ty: &IrFieldType, current: &NamespacePath) -> String {
        match ty {
            IrFieldType::Primitive(p) => match p {
                PrimitiveKind::String => "String".to_string(),
                PrimitiveKind::Boolean => "bool".to_string(),
                PrimitiveKind::Integer => "i64".to_string(),
                PrimitiveKind::Decimal => DECIMAL.to_string(),
                PrimitiveKind::Timestamp => "::chrono::DateTime<::chrono::Utc>".to_string(),
                PrimitiveKind::Identifier => "::uuid::Uuid".to_string(),
            },
            IrFieldType::Named(r) if &r.namespace == current => format!("super::{}", r.name),
            IrFieldType::Named(r) => {
                let mut path = "super::".repeat(self.depth(current) + 1);
                for segment in relative_segments(&self.root, &r.namespace) {
                    path.push_str(&snake_case(segment));
                    path.push_str("::");
                }
                path.push_str(&r.name);
                path
            }
            IrFieldType::Array(inner) => format!("Vec<{}>", self.type_expr(inner, current)),
        }
    }

    fn literal_expr(&self, literal: &Literal, ty: &IrFieldType, current: &NamespacePath) -> Result<String, String> {
        let expr = match (literal, ty) {
            (Literal::String(s), IrFieldType::Primitive(PrimitiveKind::String)) => format!("{s:?}.to_string()"),
            (Literal::String(s), IrFieldType::Named(_)) => {
                format!("{}::{}", self.type_expr(ty, current), variant_name(s))
            }
            (Literal::Bool(b), IrFieldType::Primitive(PrimitiveKind::Boolean)) => b.to_string(),
            (Literal::Integer(i), IrFieldType::Primitive(PrimitiveKind::Integer)) => i.to_string(),
            (Literal::Integer(i), IrFieldType::Primitive(PrimitiveKind::Decimal)) => format!("{DECIMAL}::from({i}i64)"),
            (Literal::Decimal(d), IrFieldType::Primitive(PrimitiveKind::Decimal)) => {
                format!("{DECIMAL}::from_i128_with_scale({}, {})", d.mantissa(), d.scale())
            }
            (Literal::List(items), IrFieldType::Array(inner)) => {
                let values = items
                    .iter()
                    .map(|item| self.literal_expr(item, inner, current))
                    .collect::<Result<Vec<_>, _>>()?;
                format!("vec![{}]", values.join(", "))
            }
            (literal, ty) => {
                return Err(format!(
                    "literal {literal} cannot initialize {}",
                    self.type_expr(ty, current)
                ))
            }
        };
        Ok(expr)
    }

    fn default_fn(&self, owner: &IrType, field: &IrField, base: &str) -> Result<Option<DefaultFn>, ContractsError> {
        let (literal, fixed) = match (&field.constant, &field.default) {
            (Some(c), _) => (c, true),
            (None, Some(d)) => (d, false),
            (None, None) => return Ok(None),
        };
        let fail = |reason: String| ContractsError::Backend(format!("{}.{}: {reason}", owner.name, field.name));

        let (return_type, body) = match literal {
            Literal::Null if field.nullable => (format!("Option<{base}>"), "None".to_string()),
            Literal::Null => return Err(fail("null literal on a non-nullable field".into())),
            literal => {
                let expr = self.literal_expr(literal, &field.ty, &owner.namespace).map_err(fail)?;
                if field.nullable {
                    (format!("Option<{base}>"), format!("Some({expr})"))
                } else {
                    (base.to_string(), expr)
                }
            }
        };
        let doc = if fixed {
            format!("Fixed value of `{}::{}`: always `{literal}`.", owner.name, field_ident(&field.name))
        } else {
            format!("Default for `{}::{}` when absent: `{literal}`.", owner.name, field_ident(&field.name))
        };
        Ok(Some(DefaultFn {
            name: format!("{}_{}", snake_case(&owner.name), snake_case(&field.name)),
            return_type,
            body,
            doc,
        }))
    }

    fn record(&self, ty: &IrType, out: &mut String) -> Result<(), ContractsError> {
        let mut defaults = Vec::new();
        let mut lists = DecimalLists::default();
        out.push_str("#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]\n");
        out.push_str(&format!("pub struct {} {{\n", ty.name));
        for field in &ty.fields {
            let base = self.type_expr(&field.ty, &ty.namespace);
            let default = self.default_fn(ty, field, &base)?;
            let wrapped = field.nullable || (field.optional && default.is_none());

            if let Some(description) = &field.description {
                doc_comment(description, INDENT, out);
            }
            if let (Some(constant), Some(_)) = (&field.constant, &default) {
                if field.description.is_some() {
                    out.push_str(&format!("{INDENT}///\n"));
                }
                out.push_str(&format!("{INDENT}/// Always `{constant}`.\n"));
            }

            let mut attrs = vec![format!("rename = {:?}", field.name)];
            match &default {
                Some(f) => attrs.push(format!("default = {:?}", f.name)),
                None if field.optional => {
                    attrs.push("default".into());
                    attrs.push("skip_serializing_if = \"Option::is_none\"".into());
                }
                None => {}
            }
            let exact = decimal_attrs(&field.ty, wrapped, &mut lists)
                .map_err(|reason| ContractsError::Backend(format!("{}.{}: {reason}", ty.name, field.name)))?;
            if wrapped && !field.optional && default.is_none() && exact.is_empty() {
                attrs.push("deserialize_with = \"Option::deserialize\"".into());
            }
            attrs.extend(exact);
            out.push_str(&format!("{INDENT}#[serde({})]\n", attrs.join(", ")));

            let field_type = if wrapped { format!("Option<{base}>") } else { base };
            out.push_str(&format!("{INDENT}pub {}: {field_type},\n", field_ident(&field.name)));
            defaults.extend(default);
        }
        out.push_str("}\n");

        for f in defaults {
            out.push('\n');
            out.push_str(&format!("/// {}\n", f.doc));
            out.push_str(&format!("pub fn {}() -> {} {{\n", f.name, f.return_type));
            out.push_str(&format!("{INDENT}{}\n}}\n", f.body));
        }
        if lists.plain || lists.optional {
            decimal_list_module(&lists, out);
        }
        Ok(())
    }

    fn enumeration(&self, ty: &IrType, out: &mut String) -> Result<(), ContractsError> {
        out.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]\n");
        out.push_str(&format!("pub enum {} {{\n", ty.name));
        for (value, name) in ty.variants.iter().zip(variant_names(ty)?) {
            out.push_str(&format!("{INDENT}#[serde(rename = {value:?})]\n"));
            out.push_str(&format!("{INDENT}{name},\n"));
        }
        out.push_str("}\n");
        Ok(())
    }
}

impl LanguageBackend for RustBackend {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn relative_path(&self, ty: &IrType) -> PathBuf {
        let mut path: PathBuf = relative_segments(&self.root, &ty.namespace)
            .iter()
            .map(|s| snake_case(s))
            .collect();
        path.push(format!("{}.rs", snake_case(&ty.name)));
        path
    }

    fn emit(&self, ty: &IrType, _namespace: &NamespacePath) -> Result<String, ContractsError> {
        let mut out = format!("//! Generated from `{}`. Do not edit.\n\n", ty.source);
        out.push_str("use serde::{Deserialize, Serialize};\n\n");
        if let Some(description) = &ty.description {
            doc_comment(description, "", &mut out);
        }
        match ty.kind {
            IrTypeKind::Record => self.record(ty, &mut out)?,
            IrTypeKind::Enum => self.enumeration(ty, &mut out)?,
        }
        Ok(out)
    }

    fn emit_index(&self, paths: &[&Path]) -> Vec<GeneratedArtifact> {
        let mut dirs: BTreeMap<PathBuf, (BTreeSet<String>, BTreeSet<String>)> = BTreeMap::new();
        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
            dirs.entry(parent.clone()).or_default().0.insert(stem.to_string());

            // Every ancestor declares the directory below it.
            let mut child = parent;
            while let Some(up) = child.parent().map(Path::to_path_buf) {
                if let Some(name) = child.file_name().and_then(|s| s.to_str()) {
                    dirs.entry(up.clone()).or_default().1.insert(name.to_string());
                }
                child = up;
            }
        }

        dirs.into_iter()
            .map(|(dir, (files, subdirs))| {
                let mut contents = String::from("//! Generated module index. Do not edit.\n\n");
                for name in subdirs.iter().chain(files.iter()) {
                    contents.push_str(&format!("pub mod {name};\n"));
                }
                if !files.is_empty() {
                    contents.push('\n');
                    for name in &files {
                        contents.push_str(&format!("pub use self::{name}::*;\n"));
                    }
                }
                let file = if dir.as_os_str().is_empty() { "lib.rs" } else { "mod.rs" };
                GeneratedArtifact {
                    backend: self.name(),
                    relative_path: dir.join(file),
                    contents,
                    source: None,
                }
            })
            .collect()
    }
}

/// Serde attributes keeping the decimals of one field exact.
fn decimal_attrs(ty: &IrFieldType, wrapped: bool, lists: &mut DecimalLists) -> Result<Vec<String>, String> {
    let attrs = match ty {
        IrFieldType::Primitive(PrimitiveKind::Decimal) if wrapped => {
            vec!["with = \"::rust_decimal::serde::arbitrary_precision_option\"".to_string()]
        }
        IrFieldType::Primitive(PrimitiveKind::Decimal) => {
            vec!["with = \"::rust_decimal::serde::arbitrary_precision\"".to_string()]
        }
        IrFieldType::Array(inner) if **inner == IrFieldType::Primitive(PrimitiveKind::Decimal) => {
            if wrapped {
                lists.optional = true;
                vec![
                    "serialize_with = \"decimal_list::serialize_option\"".to_string(),
                    "deserialize_with = \"decimal_list::deserialize_option\"".to_string(),
                ]
            } else {
                lists.plain = true;
                vec!["with = \"decimal_list\"".to_string()]
            }
        }
        IrFieldType::Array(inner) if holds_decimal(inner) => {
            return Err("decimals in nested lists cannot be serialized exactly".into())
        }
        _ => Vec::new(),
    };
    Ok(attrs)
}

fn holds_decimal(ty: &IrFieldType) -> bool {
    match ty {
        IrFieldType::Primitive(PrimitiveKind::Decimal) => true,
        IrFieldType::Array(inner) => holds_decimal(inner),
        _ => false,
    }
}

/// A private module serializing each list element as an exact JSON number.
fn decimal_list_module(lists: &DecimalLists, out: &mut String) {
    out.push_str("\n/// Lists of decimals as exact JSON numbers.\n");
    out.push_str("mod decimal_list {\n");
    out.push_str(&format!("{INDENT}use serde::{{Deserialize, Deserializer, Serialize, Serializer}};\n\n"));
    out.push_str(&format!("{INDENT}#[derive(Serialize, Deserialize)]\n"));
    out.push_str(&format!("{INDENT}#[serde(transparent)]\n"));
    out.push_str(&format!(
        "{INDENT}struct Exact(#[serde(with = \"::rust_decimal::serde::arbitrary_precision\")] {DECIMAL});\n"
    ));
    if lists.plain {
        out.push_str(&format!(
            "
{INDENT}pub fn serialize<S: Serializer>(values: &[{DECIMAL}], serializer: S) -> Result<S::Ok, S::Error> {{
{INDENT}{INDENT}serializer.collect_seq(values.iter().copied().map(Exact))
{INDENT}}}

{INDENT}pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<{DECIMAL}>, D::Error> {{
{INDENT}{INDENT}let values = Vec::<Exact>::deserialize(deserializer)?;
{INDENT}{INDENT}Ok(values.into_iter().map(|Exact(value)| value).collect())
{INDENT}}}
"
        ));
    }
    if lists.optional {
        out.push_str(&format!(
            "
{INDENT}pub fn serialize_option<S: Serializer>(
{INDENT}{INDENT}values: &Option<Vec<{DECIMAL}>>,
{INDENT}{INDENT}serializer: S,
{INDENT}) -> Result<S::Ok, S::Error> {{
{INDENT}{INDENT}match values {{
{INDENT}{INDENT}{INDENT}Some(values) => serializer.serialize_some(&values.iter().copied().map(Exact).collect::<Vec<_>>()),
{INDENT}{INDENT}{INDENT}None => serializer.serialize_none(),
{INDENT}{INDENT}}}
{INDENT}}}

{INDENT}pub fn deserialize_option<'de, D: Deserializer<'de>>(
{INDENT}{INDENT}deserializer: D,
{INDENT}) -> Result<Option<Vec<{DECIMAL}>>, D::Error> {{
{INDENT}{INDENT}let values = Option::<Vec<Exact>>::deserialize(deserializer)?;
{INDENT}{INDENT}Ok(values.map(|values| values.into_iter().map(|Exact(value)| value).collect()))
{INDENT}}}
"
        ));
    }
    out.push_str("}\n");
}

fn field_ident(wire: &str) -> String {
    let name = snake_case(wire);
    match name.as_str() {
        "" => "value".to_string(),
        "self" | "super" | "crate" => format!("{name}_"),
        n if KEYWORDS.contains(&n) => format!("r#{name}"),
        n if n.starts_with(|c: char| c.is_ascii_digit()) => format!("_{name}"),
        _ => name,
    }
}

fn doc_comment(text: &str, indent: &str, out: &mut String) {
    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            out.push_str(&format!("{indent}///\n"));
        } else {
            out.push_str(&format!("{indent}/// {line}\n"));
        }
    }
}
