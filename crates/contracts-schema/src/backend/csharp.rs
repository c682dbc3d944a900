//! C# backend: `record` types for System.Text.Json.
//!
//! Each type goes to its own file under a directory per namespace segment
//! below the root (`Orders/OrderCompletedEvent.cs`) with a file-scoped
//! namespace declaration. Properties are `init`-only; a required field with
//! no constant or default is marked `required`.

use std::path::PathBuf;

use contracts_core::{ContractsError, Literal, NamespacePath};

use super::{relative_segments, variant_name, variant_names, LanguageBackend};
use crate::document::PrimitiveKind;
use crate::ir::{IrField, IrFieldType, IrType, IrTypeKind};
use crate::namespace::pascal_case;

const INDENT: &str = "    ";

/// Emits C# source.
#[derive(Debug, Clone)]
pub struct CsharpBackend {
    root: NamespacePath,
}

impl CsharpBackend {
    /// A backend laying files out below `root`.
    pub fn new(root: NamespacePath) -> Self {
        Self { root }
    }

    fn record(&self, ty: &IrType, out: &mut String) -> Result<(), ContractsError> {
        out.push_str(&format!("public record {}\n{{\n", ty.name));
        for (i, field) in ty.fields.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            self.property(ty, field, out)?;
        }
        out.push_str("}\n");
        Ok(())
    }

    fn property(&self, owner: &IrType, field: &IrField, out: &mut String) -> Result<(), ContractsError> {
        if let Some(description) = &field.description {
            doc_comment(description, INDENT, out);
        }
        let initializer = match field.constant.as_ref().or(field.default.as_ref()) {
            Some(literal) => Some(literal_expr(literal, &field.ty, &owner.namespace).map_err(|reason| {
                ContractsError::Backend(format!("{}.{}: {reason}", owner.name, field.name))
            })?),
            None => None,
        };

        let mut type_expr = type_expr(&field.ty, &owner.namespace);
        if field.nullable || (field.optional && initializer.is_none()) {
            type_expr.push('?');
        }
        let required = if !field.optional && initializer.is_none() {
            "required "
        } else {
            ""
        };

        out.push_str(&format!("{INDENT}[JsonPropertyName({})]\n", quote(&field.name)));
        out.push_str(&format!(
            "{INDENT}public {required}{type_expr} {} {{ get; init; }}",
            property_name(owner, &field.name)
        ));
        match initializer {
            Some(expr) => out.push_str(&format!(" = {expr};\n")),
            None => out.push('\n'),
        }
        Ok(())
    }

    fn enumeration(&self, ty: &IrType, out: &mut String) -> Result<(), ContractsError> {
        out.push_str("[JsonConverter(typeof(JsonStringEnumConverter))]\n");
        out.push_str(&format!("public enum {}\n{{\n", ty.name));
        for (value, name) in ty.variants.iter().zip(variant_names(ty)?) {
            if &name != value {
                out.push_str(&format!("{INDENT}[JsonStringEnumMemberName({})]\n", quote(value)));
            }
            out.push_str(&format!("{INDENT}{name},\n"));
        }
        out.push_str("}\n");
        Ok(())
    }
}

impl LanguageBackend for CsharpBackend {
    fn name(&self) -> &'static str {
        "csharp"
    }

    fn relative_path(&self, ty: &IrType) -> PathBuf {
        let mut path: PathBuf = relative_segments(&self.root, &ty.namespace).iter().collect();
        path.push(format!("{}.cs", ty.name));
        path
    }

    fn emit(&self, ty: &IrType, namespace: &NamespacePath) -> Result<String, ContractsError> {
        let mut out = String::new();
        out.push_str("// <auto-generated>\n");
        out.push_str(&format!("// Generated from {}. Do not edit.\n", ty.source));
        out.push_str("// </auto-generated>\n");
        out.push_str("#nullable enable\n\n");
        out.push_str("using System;\n");
        out.push_str("using System.Collections.Generic;\n");
        out.push_str("using System.Text.Json.Serialization;\n\n");
        if !namespace.is_empty() {
            out.push_str(&format!("namespace {};\n\n", namespace.join(".")));
        }
        if let Some(description) = &ty.description {
            doc_comment(description, "", &mut out);
        }
        match ty.kind {
            IrTypeKind::Record => self.record(ty, &mut out)?,
            IrTypeKind::Enum => self.enumeration(ty, &mut out)?,
        }
        Ok(out)
    }
}

/// A property may not share its record's name in C#.
fn property_name(owner: &IrType, wire: &str) -> String {
    let name = pascal_case(wire);
    if name == owner.name {
        format!("{name}Value")
    } else {
        name
    }
}

fn type_expr(ty: &IrFieldType, current: &NamespacePath) -> String {
    match ty {
        IrFieldType::Primitive(p) => match p {
            PrimitiveKind::String => "string",
            PrimitiveKind::Boolean => "bool",
            PrimitiveKind::Integer => "long",
            PrimitiveKind::Decimal => "decimal",
            PrimitiveKind::Timestamp => "DateTime",
            PrimitiveKind::Identifier => "Guid",
        }
        .to_string(),
        IrFieldType::Named(r) if &r.namespace == current || r.namespace.is_empty() => r.name.clone(),
        IrFieldType::Named(r) => format!("global::{}.{}", r.namespace.join("."), r.name),
        IrFieldType::Array(inner) => format!("IReadOnlyList<{}>", type_expr(inner, current)),
    }
}

fn literal_expr(literal: &Literal, ty: &IrFieldType, current: &NamespacePath) -> Result<String, String> {
    let expr = match (literal, ty) {
        (Literal::Null, _) => "null".to_string(),
        (Literal::String(s), IrFieldType::Primitive(PrimitiveKind::String)) => quote(s),
        (Literal::String(s), IrFieldType::Primitive(PrimitiveKind::Identifier)) => {
            format!("Guid.Parse({})", quote(s))
        }
        (Literal::String(s), IrFieldType::Primitive(PrimitiveKind::Timestamp)) => format!(
            "DateTime.Parse({}, null, System.Globalization.DateTimeStyles.RoundtripKind)",
            quote(s)
        ),
        (Literal::String(s), IrFieldType::Named(_)) => format!("{}.{}", type_expr(ty, current), variant_name(s)),
        (Literal::Bool(b), IrFieldType::Primitive(PrimitiveKind::Boolean)) => b.to_string(),
        (Literal::Integer(i), IrFieldType::Primitive(PrimitiveKind::Integer)) => format!("{i}L"),
        (Literal::Integer(i), IrFieldType::Primitive(PrimitiveKind::Decimal)) => format!("{i}m"),
        (Literal::Decimal(d), IrFieldType::Primitive(PrimitiveKind::Decimal)) => format!("{d}m"),
        (Literal::List(items), IrFieldType::Array(inner)) => {
            let element = type_expr(inner, current);
            if items.is_empty() {
                format!("Array.Empty<{element}>()")
            } else {
                let values = items
                    .iter()
                    .map(|item| literal_expr(item, inner, current))
                    .collect::<Result<Vec<_>, _>>()?;
                format!("new {element}[] {{ {} }}", values.join(", "))
            }
        }
        (literal, ty) => return Err(format!("literal {literal} does not fit {}", type_expr(ty, current))),
    };
    Ok(expr)
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn doc_comment(text: &str, indent: &str, out: &mut String) {
    let escaped = text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;");
    let lines: Vec<&str> = escaped.lines().map(str::trim_end).collect();
    if let [line] = lines.as_slice() {
        out.push_str(&format!("{indent}/// <summary>{line}</summary>\n"));
        return;
    }
    out.push_str(&format!("{indent}/// <summary>\n"));
    for line in lines {
        out.push_str(&format!("{indent}/// {line}\n").replace(" \n", "\n"));
    }
    out.push_str(&format!("{indent}/// </summary>\n"));
}
