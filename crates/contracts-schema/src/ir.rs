//! # Intermediate Representation
//!
//! Lowers an effective schema into language-neutral type descriptions. One
//! message schema becomes one [`IrGraph`]: the message record first, then
//! every auxiliary record and enum it needs, in first-use order.
//!
//! ## Lowering Rules
//!
//! - Field order equals the effective schema's merged order.
//! - Inline objects become records named by their `title`, else by the
//!   PascalCase field name, in the namespace of the type that holds them.
//! - String enums become enum types named the same way.
//! - `#/definitions/<Name>` becomes a type named `<Name>`.
//! - A property `$ref` to another file becomes the record (or enum) built
//!   from that file's effective schema, in that file's own namespace.
//! - `optional` means "not required"; `nullable` means an explicit `null`
//!   is allowed. The two are independent.
//!
//! A record may refer to itself, directly or through other records. Its
//! name is fixed before its fields are lowered, so such references resolve
//! to the record being built.
//!
//! A name already taken by a different type in the same namespace is
//! prefixed with the holding type's name (`PriceCalculatedEventStrategy`).
//!
//! Graphs are immutable once built. Backends only ever see `&IrType`, so
//! any number of backends can read one graph.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use contracts_core::{Literal, NamespacePath, SchemaError, SchemaId};

use crate::compose::{CompositionResolver, EffectiveSchema};
use crate::document::{FieldSpec, ObjectSpec, PrimitiveKind, SchemaRef, ValueKind};
use crate::namespace::{pascal_case, type_name, NamespaceMapper};

/// What a generated type is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IrTypeKind {
    /// A struct/record with fields.
    Record,
    /// A closed set of string values.
    Enum,
}

/// A reference to a generated type by name and namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeRef {
    /// Type name.
    pub name: String,
    /// Namespace the type lives in.
    pub namespace: NamespacePath,
}

/// Type of one IR field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum IrFieldType {
    /// A scalar.
    Primitive(PrimitiveKind),
    /// A generated record or enum.
    Named(TypeRef),
    /// A list.
    Array(Box<IrFieldType>),
}

/// One field of a generated record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrField {
    /// Wire name.
    pub name: String,
    /// Field type.
    pub ty: IrFieldType,
    /// May be absent on the wire.
    pub optional: bool,
    /// May be an explicit `null`.
    pub nullable: bool,
    /// Default when absent.
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_literal")]
    pub default: Option<Literal>,
    /// Fixed value of the field.
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_literal")]
    pub constant: Option<Literal>,
    /// Doc text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn serialize_literal<S: serde::Serializer>(literal: &Option<Literal>, s: S) -> Result<S::Ok, S::Error> {
    serde::Serialize::serialize(&literal.as_ref().map(Literal::to_json), s)
}

/// One generated type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrType {
    /// Type name.
    pub name: String,
    /// Namespace segments.
    pub namespace: NamespacePath,
    /// Record or enum.
    pub kind: IrTypeKind,
    /// Record fields in wire order (empty for enums).
    pub fields: Vec<IrField>,
    /// Enum values in declaration order (empty for records).
    pub variants: Vec<String>,
    /// Doc text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Schema the type was built from.
    pub source: SchemaId,
}

impl IrType {
    /// A reference to this type.
    pub fn type_ref(&self) -> TypeRef {
        TypeRef {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
        }
    }

    /// Look up a field by wire name.
    pub fn field(&self, name: &str) -> Option<&IrField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Wire names in order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Whether two types describe the same shape, regardless of provenance.
    pub fn same_shape(&self, other: &IrType) -> bool {
        self.name == other.name
            && self.namespace == other.namespace
            && self.kind == other.kind
            && self.fields == other.fields
            && self.variants == other.variants
            && self.description == other.description
    }
}

/// All types generated for one message schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrGraph {
    root: SchemaId,
    types: Vec<IrType>,
}

impl IrGraph {
    /// The message schema this graph was built for.
    pub fn root_id(&self) -> &SchemaId {
        &self.root
    }

    /// The message type.
    pub fn root(&self) -> &IrType {
        &self.types[0]
    }

    /// Every type, message first.
    pub fn types(&self) -> &[IrType] {
        &self.types
    }

    /// Find a type by name.
    pub fn get(&self, name: &str) -> Option<&IrType> {
        self.types.iter().find(|t| t.name == name)
    }
}

/// Lowers effective schemas to IR.
#[derive(Debug, Clone, Copy)]
pub struct IrBuilder<'a> {
    resolver: CompositionResolver<'a>,
    mapper: &'a NamespaceMapper,
}

/// Where a kind is being lowered.
#[derive(Clone, Copy)]
struct Site<'s> {
    /// Name of the type holding the field.
    owner: &'s str,
    /// Wire name of the field.
    field: &'s str,
    /// Namespace auxiliary types are placed in.
    namespace: &'s NamespacePath,
    /// Document whose local definitions apply.
    source: &'s SchemaId,
    /// Doc text of the field or definition being lowered.
    description: Option<&'s str>,
}

#[derive(Default)]
struct BuildState {
    aux: Vec<IrType>,
    taken: HashMap<(NamespacePath, String), usize>,
    definitions: HashMap<(SchemaId, String), IrFieldType>,
    externals: HashMap<SchemaId, IrFieldType>,
    /// Non-object definitions and value schemas currently being lowered.
    pending: HashSet<(SchemaId, String)>,
}

impl<'a> IrBuilder<'a> {
    /// A builder dereferencing through `resolver` and naming through `mapper`.
    pub fn new(resolver: CompositionResolver<'a>, mapper: &'a NamespaceMapper) -> Self {
        Self { resolver, mapper }
    }

    /// Build the graph for one validated effective schema.
    ///
    /// `namespace` is the mapper's output for the schema's location.
    ///
    /// # Errors
    ///
    /// `UnresolvedReference` when a property `$ref` names a schema that is
    /// not loaded, or any resolver error from the referenced schema.
    pub fn build(&self, schema: &EffectiveSchema, namespace: &NamespacePath) -> Result<IrGraph, SchemaError> {
        let name = type_name(schema.title.as_deref(), &schema.id);
        let mut state = BuildState::default();
        // Reserve the message's own name so auxiliaries never take it.
        state.taken.insert((namespace.clone(), name.clone()), usize::MAX);

        let root = self.effective_record(&mut state, schema, &name, namespace)?;

        let mut types = Vec::with_capacity(state.aux.len() + 1);
        types.push(root);
        types.append(&mut state.aux);

        tracing::debug!(
            schema_id = %schema.id,
            type_name = %name,
            types = types.len(),
            "built IR graph"
        );

        Ok(IrGraph {
            root: schema.id.clone(),
            types,
        })
    }

    fn effective_record(
        &self,
        state: &mut BuildState,
        schema: &EffectiveSchema,
        name: &str,
        namespace: &NamespacePath,
    ) -> Result<IrType, SchemaError> {
        let mut fields = Vec::with_capacity(schema.fields.len());
        for (field_name, field) in &schema.fields {
            let site = Site {
                owner: name,
                field: field_name,
                namespace,
                source: &field.source,
                description: None,
            };
            let constant = schema.constants.get(field_name).map(|c| c.value.clone());
            fields.push(self.field(state, &field.spec, site, !schema.is_required(field_name), constant)?);
        }
        Ok(IrType {
            name: name.to_string(),
            namespace: namespace.clone(),
            kind: IrTypeKind::Record,
            fields,
            variants: Vec::new(),
            description: schema.description.clone(),
            source: schema.id.clone(),
        })
    }

    fn field(
        &self,
        state: &mut BuildState,
        spec: &FieldSpec,
        site: Site<'_>,
        optional: bool,
        constant: Option<Literal>,
    ) -> Result<IrField, SchemaError> {
        let site = Site {
            description: spec.description.as_deref(),
            ..site
        };
        Ok(IrField {
            name: spec.name.clone(),
            ty: self.lower(state, &spec.kind, site)?,
            optional,
            nullable: spec.nullable,
            default: spec.default.clone(),
            constant,
            description: spec.description.clone(),
        })
    }

    fn lower(&self, state: &mut BuildState, kind: &ValueKind, site: Site<'_>) -> Result<IrFieldType, SchemaError> {
        match kind {
            ValueKind::Primitive(p) => Ok(IrFieldType::Primitive(*p)),
            ValueKind::Array(inner) => Ok(IrFieldType::Array(Box::new(self.lower(state, inner, site)?))),
            ValueKind::Enum(values) => {
                let ty = IrType {
                    name: pascal_case(site.field),
                    namespace: site.namespace.clone(),
                    kind: IrTypeKind::Enum,
                    fields: Vec::new(),
                    variants: values.clone(),
                    description: site.description.map(str::to_string),
                    source: site.source.clone(),
                };
                Ok(IrFieldType::Named(register(state, ty, site.owner)))
            }
            ValueKind::Object(spec) => {
                let name = spec
                    .title
                    .as_deref()
                    .map(pascal_case)
                    .unwrap_or_else(|| pascal_case(site.field));
                self.inline_record(state, spec, name, site)
            }
            ValueKind::Reference(SchemaRef::Local(def_name)) => self.local_definition(state, def_name, site),
            ValueKind::Reference(SchemaRef::External(target)) => self.external(state, target, site),
        }
    }

    fn inline_record(
        &self,
        state: &mut BuildState,
        spec: &ObjectSpec,
        name: String,
        site: Site<'_>,
    ) -> Result<IrFieldType, SchemaError> {
        let fields = self.object_fields(state, spec, &name, site)?;
        let ty = IrType {
            name,
            namespace: site.namespace.clone(),
            kind: IrTypeKind::Record,
            fields,
            variants: Vec::new(),
            description: spec.description.clone(),
            source: site.source.clone(),
        };
        Ok(IrFieldType::Named(register(state, ty, site.owner)))
    }

    fn object_fields(
        &self,
        state: &mut BuildState,
        spec: &ObjectSpec,
        owner: &str,
        site: Site<'_>,
    ) -> Result<Vec<IrField>, SchemaError> {
        let mut fields = Vec::with_capacity(spec.properties.len());
        for (field_name, field) in &spec.properties {
            let inner = Site {
                owner,
                field: field_name,
                ..site
            };
            fields.push(self.field(
                state,
                field,
                inner,
                !spec.required.contains(field_name),
                field.constant.clone(),
            )?);
        }
        Ok(fields)
    }

    fn local_definition(
        &self,
        state: &mut BuildState,
        def_name: &str,
        site: Site<'_>,
    ) -> Result<IrFieldType, SchemaError> {
        let key = (site.source.clone(), def_name.to_string());
        if let Some(ty) = state.definitions.get(&key) {
            return Ok(ty.clone());
        }

        let definition = self
            .resolver
            .schemas()
            .get(site.source)
            .and_then(|doc| doc.definitions.get(def_name))
            .ok_or_else(|| SchemaError::UnresolvedReference {
                from: site.source.clone(),
                target: format!("#/definitions/{def_name}"),
            })?;

        let def_site = Site {
            field: def_name,
            description: definition.description.as_deref(),
            ..site
        };
        let ValueKind::Object(spec) = &definition.kind else {
            if !state.pending.insert(key.clone()) {
                return Err(SchemaError::MalformedSchema {
                    schema_id: site.source.clone(),
                    pointer: format!("/definitions/{def_name}"),
                    reason: "definition refers to itself without an object in between".into(),
                });
            }
            let ty = self.lower(state, &definition.kind, def_site)?;
            state.pending.remove(&key);
            state.definitions.insert(key, ty.clone());
            return Ok(ty);
        };

        // The name is fixed before the fields are lowered so self-references terminate.
        let name = spec.title.as_deref().map_or_else(|| pascal_case(def_name), pascal_case);
        let (type_ref, index) = reserve(state, name, site.namespace, site.owner, site.source);
        let named = IrFieldType::Named(type_ref.clone());
        state.definitions.insert(key, named.clone());

        let fields = self.object_fields(state, spec, &type_ref.name, def_site)?;
        let record = IrType {
            name: type_ref.name,
            namespace: type_ref.namespace,
            kind: IrTypeKind::Record,
            fields,
            variants: Vec::new(),
            description: spec.description.clone().or_else(|| definition.description.clone()),
            source: site.source.clone(),
        };
        fill(state, index, record);
        Ok(named)
    }

    fn external(&self, state: &mut BuildState, target: &SchemaId, site: Site<'_>) -> Result<IrFieldType, SchemaError> {
        if let Some(ty) = state.externals.get(target) {
            return Ok(ty.clone());
        }

        let doc = self
            .resolver
            .schemas()
            .get(target)
            .ok_or_else(|| SchemaError::UnresolvedReference {
                from: site.source.clone(),
                target: target.to_string(),
            })?;
        let namespace = self.mapper.map(target);
        let name = type_name(doc.title.as_deref(), target);

        if !doc.is_object() {
            let value = doc.value.as_ref().ok_or_else(|| SchemaError::MalformedSchema {
                schema_id: target.clone(),
                pointer: String::new(),
                reason: "value schema has no type".into(),
            })?;
            let key = (target.clone(), String::new());
            if !state.pending.insert(key.clone()) {
                return Err(SchemaError::MalformedSchema {
                    schema_id: target.clone(),
                    pointer: String::new(),
                    reason: "value schema refers to itself without an object in between".into(),
                });
            }
            let value_site = Site {
                owner: &name,
                field: &name,
                namespace: &namespace,
                source: target,
                description: value.description.as_deref().or(doc.description.as_deref()),
            };
            let ty = self.lower(state, &value.kind, value_site)?;
            state.pending.remove(&key);
            state.externals.insert(target.clone(), ty.clone());
            return Ok(ty);
        }

        // The name is fixed before the fields are lowered so self-references terminate.
        let (type_ref, index) = reserve(state, name, &namespace, site.owner, target);
        let named = IrFieldType::Named(type_ref.clone());
        state.externals.insert(target.clone(), named.clone());

        let effective = self.resolver.resolve(target)?;
        let record = self.effective_record(state, &effective, &type_ref.name, &namespace)?;
        fill(state, index, record);
        Ok(named)
    }
}

/// Claim a free name for a record whose fields are not lowered yet.
///
/// Returns the reference and the slot in `state.aux` holding a fieldless
/// placeholder. The name stays unavailable for reuse until [`fill`].
fn reserve(
    state: &mut BuildState,
    base: String,
    namespace: &NamespacePath,
    owner: &str,
    source: &SchemaId,
) -> (TypeRef, usize) {
    let mut attempt = 0usize;
    let name = loop {
        let name = candidate(&base, owner, attempt);
        if !state.taken.contains_key(&(namespace.clone(), name.clone())) {
            break name;
        }
        attempt += 1;
    };
    let index = state.aux.len();
    state.taken.insert((namespace.clone(), name.clone()), usize::MAX);
    state.aux.push(IrType {
        name,
        namespace: namespace.clone(),
        kind: IrTypeKind::Record,
        fields: Vec::new(),
        variants: Vec::new(),
        description: None,
        source: source.clone(),
    });
    (state.aux[index].type_ref(), index)
}

/// Replace a reserved placeholder with the finished record.
fn fill(state: &mut BuildState, index: usize, record: IrType) {
    state.taken.insert((record.namespace.clone(), record.name.clone()), index);
    state.aux[index] = record;
}

fn candidate(base: &str, owner: &str, attempt: usize) -> String {
    match attempt {
        0 => base.to_string(),
        1 => format!("{owner}{base}"),
        n => format!("{owner}{base}{n}"),
    }
}

/// Add an auxiliary type, reusing an identical one and renaming on clashes.
fn register(state: &mut BuildState, mut ty: IrType, owner: &str) -> TypeRef {
    let base = ty.name.clone();
    let mut attempt = 0usize;
    loop {
        ty.name = candidate(&base, owner, attempt);
        let key = (ty.namespace.clone(), ty.name.clone());
        match state.taken.get(&key) {
            None => {
                state.taken.insert(key, state.aux.len());
                let type_ref = ty.type_ref();
                state.aux.push(ty);
                return type_ref;
            }
            Some(&index) if index != usize::MAX && state.aux[index].same_shape(&ty) => {
                return ty.type_ref();
            }
            Some(_) => attempt += 1,
        }
    }
}
