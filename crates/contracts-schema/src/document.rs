//! # Schema Document Model
//!
//! Parsed, closed representation of one schema file. Raw JSON is inspected
//! exactly once, here; everything downstream matches on [`ValueKind`]
//! instead of re-reading loosely typed nodes.
//!
//! ## Accepted Keywords
//!
//! `title`, `description`, `type` (a name, or a `[name, "null"]` pair),
//! `format` (`uuid`, `date-time`), `properties`, `required`, `items`,
//! `enum` (strings only), `const`, `default`, `nullable`, `allOf`,
//! `$ref` (relative file paths, or `#/definitions/<Name>` and
//! `#/$defs/<Name>`), `definitions` / `$defs`. Anything else is ignored.
//!
//! `type: number` always maps to [`PrimitiveKind::Decimal`]: contract
//! numbers carry money and measurements and are never floating point.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use contracts_core::{Literal, SchemaError, SchemaId};

/// Scalar value kinds a field can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// UTF-8 text.
    String,
    /// `true` / `false`.
    Boolean,
    /// 64-bit signed integer.
    Integer,
    /// Arbitrary-precision decimal number.
    Decimal,
    /// UTC instant (`format: date-time`).
    Timestamp,
    /// UUID (`format: uuid`).
    Identifier,
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Timestamp => "timestamp",
            Self::Identifier => "identifier",
        };
        f.write_str(name)
    }
}

/// A `$ref` from a property to another type.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaRef {
    /// `#/definitions/<Name>` inside the owning document.
    Local(String),
    /// Another schema document, already resolved to its identity.
    External(SchemaId),
}

/// An inline object type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSpec {
    /// Explicit type name, if the object declares a `title`.
    pub title: Option<String>,
    /// Doc text for the generated type.
    pub description: Option<String>,
    /// Fields in declaration order.
    pub properties: IndexMap<String, FieldSpec>,
    /// Required field names.
    pub required: IndexSet<String>,
}

/// The tagged kind of a field's value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    /// A scalar.
    Primitive(PrimitiveKind),
    /// An inline nested object.
    Object(ObjectSpec),
    /// A list of values of the inner kind.
    Array(Box<ValueKind>),
    /// A closed set of string values.
    Enum(Vec<String>),
    /// A named type defined elsewhere.
    Reference(SchemaRef),
}

impl ValueKind {
    /// The primitive kind, when this is a scalar.
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        match self {
            Self::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    fn collect_external_refs<'a>(&'a self, out: &mut Vec<&'a SchemaId>) {
        match self {
            Self::Reference(SchemaRef::External(id)) => out.push(id),
            Self::Array(inner) => inner.collect_external_refs(out),
            Self::Object(obj) => {
                for field in obj.properties.values() {
                    field.kind.collect_external_refs(out);
                }
            }
            _ => {}
        }
    }
}

/// One field of a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Wire name of the field.
    pub name: String,
    /// Value kind.
    pub kind: ValueKind,
    /// Whether the field may carry an explicit `null` when present.
    pub nullable: bool,
    /// `default` literal.
    pub default: Option<Literal>,
    /// `const` literal.
    pub constant: Option<Literal>,
    /// Doc text.
    pub description: Option<String>,
}

/// Top-level shape of a schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    /// A record with properties; the only shape that composes or generates.
    Object,
    /// A list value schema.
    Array,
    /// A scalar or enum value schema.
    Primitive,
}

/// One entry of an `allOf` list.
#[derive(Debug, Clone, PartialEq)]
pub enum CompositionEntry {
    /// A reference to another loaded schema.
    Reference(SchemaId),
    /// An inline sub-schema.
    Inline(Box<SchemaDocument>),
}

/// One parsed schema file (or inline `allOf` fragment).
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    /// Stable identity. Inline fragments use `<owner>#<pointer>`.
    pub id: SchemaId,
    /// Generated type name, when given.
    pub title: Option<String>,
    /// Doc text for the generated type.
    pub description: Option<String>,
    /// Top-level shape.
    pub schema_type: SchemaType,
    /// Own fields in declaration order.
    pub properties: IndexMap<String, FieldSpec>,
    /// Own required field names.
    pub required: IndexSet<String>,
    /// `allOf` entries in declaration order.
    pub composition: Vec<CompositionEntry>,
    /// Own `const` fields.
    pub constants: IndexMap<String, Literal>,
    /// Named local types (`definitions` / `$defs`).
    pub definitions: IndexMap<String, FieldSpec>,
    /// The value description of an array or primitive document.
    pub value: Option<FieldSpec>,
}

impl SchemaDocument {
    /// Whether this document describes a record.
    pub fn is_object(&self) -> bool {
        self.schema_type == SchemaType::Object
    }

    /// Identities named in `allOf`, including those inside inline fragments.
    pub fn composition_refs(&self) -> Vec<&SchemaId> {
        let mut out = Vec::new();
        for entry in &self.composition {
            match entry {
                CompositionEntry::Reference(id) => out.push(id),
                CompositionEntry::Inline(fragment) => out.extend(fragment.composition_refs()),
            }
        }
        out
    }

    /// Identities named by property `$ref`s anywhere in this document.
    pub fn property_refs(&self) -> Vec<&SchemaId> {
        let mut out = Vec::new();
        for field in self
            .properties
            .values()
            .chain(self.definitions.values())
            .chain(self.value.iter())
        {
            field.kind.collect_external_refs(&mut out);
        }
        for entry in &self.composition {
            if let CompositionEntry::Inline(fragment) = entry {
                out.extend(fragment.property_refs());
            }
        }
        out
    }
}

/// Parse one schema document from its JSON value.
pub fn parse_document(id: SchemaId, root: &Value) -> Result<SchemaDocument, SchemaError> {
    let definitions: IndexSet<String> = ["definitions", "$defs"]
        .iter()
        .filter_map(|key| root.get(*key).and_then(Value::as_object))
        .flat_map(|defs| defs.keys().cloned())
        .collect();
    let parser = Parser {
        id: &id,
        definitions,
    };
    parser.document(root, "", id.clone(), true)
}

struct Parser<'a> {
    id: &'a SchemaId,
    definitions: IndexSet<String>,
}

impl Parser<'_> {
    fn malformed(&self, pointer: &str, reason: impl Into<String>) -> SchemaError {
        SchemaError::MalformedSchema {
            schema_id: self.id.clone(),
            pointer: pointer.to_string(),
            reason: reason.into(),
        }
    }

    fn document(
        &self,
        node: &Value,
        pointer: &str,
        doc_id: SchemaId,
        is_root: bool,
    ) -> Result<SchemaDocument, SchemaError> {
        let obj = node
            .as_object()
            .ok_or_else(|| self.malformed(pointer, "schema must be a JSON object"))?;

        let title = self.optional_string(obj, "title", pointer)?;
        let description = self.optional_string(obj, "description", pointer)?;

        let mut composition = Vec::new();
        if let Some(all_of) = obj.get("allOf") {
            let entries = all_of
                .as_array()
                .ok_or_else(|| self.malformed(&format!("{pointer}/allOf"), "'allOf' must be an array"))?;
            for (i, entry) in entries.iter().enumerate() {
                let entry_ptr = format!("{pointer}/allOf/{i}");
                composition.push(self.composition_entry(entry, &entry_ptr)?);
            }
        }

        let declared_type = obj.get("type");
        let is_object = match declared_type {
            Some(Value::String(t)) => t == "object",
            Some(_) => false,
            None => {
                obj.contains_key("properties")
                    || !composition.is_empty()
                    || !VALUE_KEYWORDS.iter().any(|k| obj.contains_key(*k))
            }
        };

        let mut doc = SchemaDocument {
            id: doc_id,
            title,
            description,
            schema_type: SchemaType::Object,
            properties: IndexMap::new(),
            required: IndexSet::new(),
            composition,
            constants: IndexMap::new(),
            definitions: IndexMap::new(),
            value: None,
        };

        if is_object {
            let object = self.object_spec(obj, pointer)?;
            doc.properties = object.properties;
            doc.required = object.required;
            doc.constants = doc
                .properties
                .iter()
                .filter_map(|(name, field)| field.constant.clone().map(|c| (name.clone(), c)))
                .collect();
        } else {
            if !doc.composition.is_empty() {
                return Err(self.malformed(pointer, "only object schemas may use 'allOf'"));
            }
            let value = self.field("", node, pointer)?;
            doc.schema_type = match value.kind {
                ValueKind::Array(_) => SchemaType::Array,
                _ => SchemaType::Primitive,
            };
            doc.value = Some(value);
        }

        if is_root {
            for key in ["definitions", "$defs"] {
                if let Some(defs) = obj.get(key) {
                    let defs_ptr = format!("{pointer}/{key}");
                    let defs = defs
                        .as_object()
                        .ok_or_else(|| self.malformed(&defs_ptr, format!("'{key}' must be an object")))?;
                    for (name, def) in defs {
                        let def_ptr = format!("{defs_ptr}/{}", escape_pointer(name));
                        let spec = self.field(name, def, &def_ptr)?;
                        doc.definitions.insert(name.clone(), spec);
                    }
                }
            }
        }

        Ok(doc)
    }

    fn composition_entry(&self, entry: &Value, pointer: &str) -> Result<CompositionEntry, SchemaError> {
        match entry.get("$ref") {
            Some(Value::String(reference)) => {
                if reference.starts_with('#') {
                    return Err(self.malformed(
                        &format!("{pointer}/$ref"),
                        "'allOf' may only reference other schema files",
                    ));
                }
                self.external_ref(reference, pointer).map(CompositionEntry::Reference)
            }
            Some(_) => Err(self.malformed(&format!("{pointer}/$ref"), "'$ref' must be a string")),
            None => {
                let fragment = self.document(entry, pointer, self.id.fragment(pointer), false)?;
                Ok(CompositionEntry::Inline(Box::new(fragment)))
            }
        }
    }

    fn object_spec(&self, obj: &Map<String, Value>, pointer: &str) -> Result<ObjectSpec, SchemaError> {
        let mut spec = ObjectSpec {
            title: self.optional_string(obj, "title", pointer)?,
            description: self.optional_string(obj, "description", pointer)?,
            ..ObjectSpec::default()
        };

        if let Some(props) = obj.get("properties") {
            let props_ptr = format!("{pointer}/properties");
            let props = props
                .as_object()
                .ok_or_else(|| self.malformed(&props_ptr, "'properties' must be an object"))?;
            for (name, prop) in props {
                let prop_ptr = format!("{props_ptr}/{}", escape_pointer(name));
                spec.properties.insert(name.clone(), self.field(name, prop, &prop_ptr)?);
            }
        }

        if let Some(required) = obj.get("required") {
            let req_ptr = format!("{pointer}/required");
            let items = required
                .as_array()
                .ok_or_else(|| self.malformed(&req_ptr, "'required' must be an array of strings"))?;
            for (i, item) in items.iter().enumerate() {
                let name = item.as_str().ok_or_else(|| {
                    self.malformed(&format!("{req_ptr}/{i}"), "'required' entries must be strings")
                })?;
                spec.required.insert(name.to_string());
            }
        }

        Ok(spec)
    }

    fn field(&self, name: &str, node: &Value, pointer: &str) -> Result<FieldSpec, SchemaError> {
        let obj = node
            .as_object()
            .ok_or_else(|| self.malformed(pointer, "property schema must be a JSON object"))?;

        let default = self.optional_literal(obj, "default", pointer)?;
        let constant = self.optional_literal(obj, "const", pointer)?;
        let mut nullable = matches!(obj.get("nullable"), Some(Value::Bool(true)));

        let kind = if let Some(reference) = obj.get("$ref") {
            let reference = reference
                .as_str()
                .ok_or_else(|| self.malformed(&format!("{pointer}/$ref"), "'$ref' must be a string"))?;
            ValueKind::Reference(self.property_ref(reference, pointer)?)
        } else {
            let type_name = match obj.get("type") {
                Some(Value::String(t)) => Some(t.as_str()),
                Some(Value::Array(types)) => {
                    let mut non_null = Vec::new();
                    for t in types {
                        match t.as_str() {
                            Some("null") => nullable = true,
                            Some(other) => non_null.push(other),
                            None => {
                                return Err(self.malformed(
                                    &format!("{pointer}/type"),
                                    "'type' entries must be strings",
                                ))
                            }
                        }
                    }
                    match non_null.as_slice() {
                        [single] => Some(*single),
                        [] => return Err(self.malformed(&format!("{pointer}/type"), "'type' names no value type")),
                        _ => {
                            return Err(self.malformed(
                                &format!("{pointer}/type"),
                                "union types other than [T, \"null\"] are not supported",
                            ))
                        }
                    }
                }
                Some(_) => {
                    return Err(self.malformed(&format!("{pointer}/type"), "'type' must be a string or array"))
                }
                None => None,
            };
            match type_name {
                Some(t) => self.typed_kind(t, obj, pointer)?,
                None => self.inferred_kind(obj, constant.as_ref(), pointer)?,
            }
        };

        Ok(FieldSpec {
            name: name.to_string(),
            kind,
            nullable,
            default,
            constant,
            description: self.optional_string(obj, "description", pointer)?,
        })
    }

    fn typed_kind(&self, type_name: &str, obj: &Map<String, Value>, pointer: &str) -> Result<ValueKind, SchemaError> {
        match type_name {
            "string" => {
                if let Some(values) = obj.get("enum") {
                    return self.enum_kind(values, pointer);
                }
                Ok(match obj.get("format").and_then(Value::as_str) {
                    Some("uuid") => ValueKind::Primitive(PrimitiveKind::Identifier),
                    Some("date-time") => ValueKind::Primitive(PrimitiveKind::Timestamp),
                    _ => ValueKind::Primitive(PrimitiveKind::String),
                })
            }
            "boolean" => Ok(ValueKind::Primitive(PrimitiveKind::Boolean)),
            "integer" => Ok(ValueKind::Primitive(PrimitiveKind::Integer)),
            "number" => Ok(ValueKind::Primitive(PrimitiveKind::Decimal)),
            "object" => Ok(ValueKind::Object(self.object_spec(obj, pointer)?)),
            "array" => {
                let items_ptr = format!("{pointer}/items");
                let items = obj
                    .get("items")
                    .ok_or_else(|| self.malformed(pointer, "array schema requires 'items'"))?;
                let item = self.field("", items, &items_ptr)?;
                Ok(ValueKind::Array(Box::new(item.kind)))
            }
            other => Err(self.malformed(&format!("{pointer}/type"), format!("unknown type '{other}'"))),
        }
    }

    fn inferred_kind(
        &self,
        obj: &Map<String, Value>,
        constant: Option<&Literal>,
        pointer: &str,
    ) -> Result<ValueKind, SchemaError> {
        if let Some(values) = obj.get("enum") {
            return self.enum_kind(values, pointer);
        }
        if let Some(literal) = constant {
            return literal_kind(literal)
                .ok_or_else(|| self.malformed(&format!("{pointer}/const"), "cannot infer a type from this 'const'"));
        }
        if obj.contains_key("properties") {
            return Ok(ValueKind::Object(self.object_spec(obj, pointer)?));
        }
        if obj.contains_key("items") {
            return self.typed_kind("array", obj, pointer);
        }
        Err(self.malformed(pointer, "missing 'type'"))
    }

    fn enum_kind(&self, values: &Value, pointer: &str) -> Result<ValueKind, SchemaError> {
        let enum_ptr = format!("{pointer}/enum");
        let items = values
            .as_array()
            .filter(|items| !items.is_empty())
            .ok_or_else(|| self.malformed(&enum_ptr, "'enum' must be a non-empty array"))?;
        items
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.malformed(&format!("{enum_ptr}/{i}"), "only string enums are supported"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(ValueKind::Enum)
    }

    fn property_ref(&self, reference: &str, pointer: &str) -> Result<SchemaRef, SchemaError> {
        let ref_ptr = format!("{pointer}/$ref");
        for prefix in ["#/definitions/", "#/$defs/"] {
            if let Some(name) = reference.strip_prefix(prefix) {
                if !self.definitions.contains(name) {
                    return Err(self.malformed(&ref_ptr, format!("no local definition named '{name}'")));
                }
                return Ok(SchemaRef::Local(name.to_string()));
            }
        }
        if reference.starts_with('#') {
            return Err(self.malformed(&ref_ptr, format!("unsupported local reference '{reference}'")));
        }
        self.external_ref(reference, pointer).map(SchemaRef::External)
    }

    fn external_ref(&self, reference: &str, pointer: &str) -> Result<SchemaId, SchemaError> {
        let ref_ptr = format!("{pointer}/$ref");
        if reference.contains('#') {
            return Err(self.malformed(&ref_ptr, "references into another file's definitions are not supported"));
        }
        self.id
            .resolve_relative(reference)
            .ok_or_else(|| self.malformed(&ref_ptr, format!("reference '{reference}' escapes the schema root")))
    }

    fn optional_string(
        &self,
        obj: &Map<String, Value>,
        key: &str,
        pointer: &str,
    ) -> Result<Option<String>, SchemaError> {
        match obj.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.malformed(&format!("{pointer}/{key}"), format!("'{key}' must be a string"))),
        }
    }

    fn optional_literal(
        &self,
        obj: &Map<String, Value>,
        key: &str,
        pointer: &str,
    ) -> Result<Option<Literal>, SchemaError> {
        obj.get(key)
            .map(|v| Literal::from_json(v).map_err(|reason| self.malformed(&format!("{pointer}/{key}"), reason)))
            .transpose()
    }
}

/// Keywords that mark a schema as a value rather than a record.
const VALUE_KEYWORDS: &[&str] = &["enum", "const", "$ref", "items", "format"];

fn literal_kind(literal: &Literal) -> Option<ValueKind> {
    match literal {
        Literal::Null => None,
        Literal::Bool(_) => Some(ValueKind::Primitive(PrimitiveKind::Boolean)),
        Literal::Integer(_) => Some(ValueKind::Primitive(PrimitiveKind::Integer)),
        Literal::Decimal(_) => Some(ValueKind::Primitive(PrimitiveKind::Decimal)),
        Literal::String(_) => Some(ValueKind::Primitive(PrimitiveKind::String)),
        Literal::List(items) => {
            let inner = match items.first() {
                Some(first) => literal_kind(first)?,
                None => ValueKind::Primitive(PrimitiveKind::String),
            };
            Some(ValueKind::Array(Box::new(inner)))
        }
    }
}

/// Escape a property name for use in a JSON Pointer.
fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
