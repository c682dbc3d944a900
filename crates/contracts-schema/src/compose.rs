//! # Composition Resolver
//!
//! Flattens a schema and everything it composes through `allOf` into one
//! [`EffectiveSchema`].
//!
//! ## Merge Rules
//!
//! Layers are merged in declaration order, bases before the schema's own
//! properties:
//!
//! - Fields: first declaration wins. A later layer that re-declares a field
//!   does not change its kind, nullability or position.
//! - `required`: union, in first-seen order.
//! - Constants: union. Two sources fixing the same field to different
//!   literals is a `ConstantConflict`.
//!
//! ## Graph Traversal
//!
//! Composition is a directed graph walked depth first. The resolution stack
//! is local to one [`CompositionResolver::resolve`] call, so independent
//! schemas can be resolved concurrently against the same shared
//! [`SchemaSet`]. Revisiting an identity on the stack is a
//! `CompositionCycle`; a diamond (two bases sharing a base) is not.

use indexmap::{IndexMap, IndexSet};

use contracts_core::{Literal, SchemaError, SchemaId};

use crate::document::{CompositionEntry, FieldSpec, SchemaDocument};
use crate::loader::SchemaSet;

/// Maximum `allOf` nesting depth before resolution gives up.
pub const MAX_COMPOSITION_DEPTH: usize = 32;

/// A merged field with the document that contributed it.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveField {
    /// The winning declaration.
    pub spec: FieldSpec,
    /// Top-level document that declared it (never an inline fragment id).
    pub source: SchemaId,
}

/// A merged constant with the document that contributed it.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConstant {
    /// The fixed literal.
    pub value: Literal,
    /// Top-level document that declared it.
    pub source: SchemaId,
}

/// The fully merged view of one schema.
///
/// Immutable once built; consumed by the governance validator and the IR
/// builder, then dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveSchema {
    /// Identity of the schema that was resolved.
    pub id: SchemaId,
    /// The schema's own `title`.
    pub title: Option<String>,
    /// The schema's own `description`.
    pub description: Option<String>,
    /// The first file composed by reference, treated as the envelope.
    pub envelope: Option<SchemaId>,
    /// Merged fields in effective order.
    pub fields: IndexMap<String, EffectiveField>,
    /// Merged required names.
    pub required: IndexSet<String>,
    /// Merged constants.
    pub constants: IndexMap<String, EffectiveConstant>,
}

impl EffectiveSchema {
    fn empty(doc: &SchemaDocument) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.title.clone(),
            description: doc.description.clone(),
            envelope: None,
            fields: IndexMap::new(),
            required: IndexSet::new(),
            constants: IndexMap::new(),
        }
    }

    /// Field names in effective order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Whether `name` is required.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }

    /// Merge another resolved schema into this one.
    fn absorb(&mut self, other: &EffectiveSchema) -> Result<(), SchemaError> {
        for (name, field) in &other.fields {
            self.fields.entry(name.clone()).or_insert_with(|| field.clone());
        }
        self.required.extend(other.required.iter().cloned());
        for (name, constant) in &other.constants {
            self.add_constant(name, &constant.value, &constant.source)?;
        }
        Ok(())
    }

    /// Merge one document's own declarations (no composition).
    fn absorb_layer(&mut self, layer: &SchemaDocument, owner: &SchemaId) -> Result<(), SchemaError> {
        for (name, spec) in &layer.properties {
            self.fields.entry(name.clone()).or_insert_with(|| EffectiveField {
                spec: spec.clone(),
                source: owner.clone(),
            });
        }
        self.required.extend(layer.required.iter().cloned());
        for (name, value) in &layer.constants {
            self.add_constant(name, value, owner)?;
        }
        Ok(())
    }

    fn add_constant(&mut self, name: &str, value: &Literal, source: &SchemaId) -> Result<(), SchemaError> {
        match self.constants.get(name) {
            Some(existing) if existing.value != *value => Err(SchemaError::ConstantConflict {
                field: name.to_string(),
                first_source: existing.source.clone(),
                first: existing.value.clone(),
                second_source: source.clone(),
                second: value.clone(),
            }),
            Some(_) => Ok(()),
            None => {
                self.constants.insert(
                    name.to_string(),
                    EffectiveConstant {
                        value: value.clone(),
                        source: source.clone(),
                    },
                );
                Ok(())
            }
        }
    }
}

/// Resolves schemas against a loaded [`SchemaSet`].
#[derive(Debug, Clone, Copy)]
pub struct CompositionResolver<'a> {
    schemas: &'a SchemaSet,
    max_depth: usize,
}

impl<'a> CompositionResolver<'a> {
    /// A resolver over `schemas` with the default depth limit.
    pub fn new(schemas: &'a SchemaSet) -> Self {
        Self {
            schemas,
            max_depth: MAX_COMPOSITION_DEPTH,
        }
    }

    /// Override the depth limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The schema set this resolver reads.
    pub fn schemas(&self) -> &'a SchemaSet {
        self.schemas
    }

    /// Produce the effective schema for `id`.
    ///
    /// # Errors
    ///
    /// `UnresolvedReference` when `id` or anything it composes is not
    /// loaded, `CompositionCycle`, `CompositionTooDeep`, `ConstantConflict`,
    /// or `MalformedSchema` when a composed base is not an object schema.
    pub fn resolve(&self, id: &SchemaId) -> Result<EffectiveSchema, SchemaError> {
        let doc = self.lookup(id, id)?;
        let mut stack = Vec::new();
        let effective = self.resolve_document(doc, &doc.id, &mut stack)?;
        tracing::debug!(
            schema_id = %id,
            fields = effective.fields.len(),
            envelope = ?effective.envelope.as_ref().map(SchemaId::as_str),
            "resolved schema"
        );
        Ok(effective)
    }

    fn resolve_document(
        &self,
        doc: &SchemaDocument,
        owner: &SchemaId,
        stack: &mut Vec<SchemaId>,
    ) -> Result<EffectiveSchema, SchemaError> {
        if stack.contains(&doc.id) {
            let mut chain = stack.clone();
            chain.push(doc.id.clone());
            return Err(SchemaError::CompositionCycle { chain });
        }
        if stack.len() >= self.max_depth {
            return Err(SchemaError::CompositionTooDeep {
                schema_id: owner.clone(),
                limit: self.max_depth,
            });
        }

        stack.push(doc.id.clone());
        let mut effective = EffectiveSchema::empty(doc);

        for entry in &doc.composition {
            match entry {
                CompositionEntry::Reference(target) => {
                    let base = self.lookup(owner, target)?;
                    if !base.is_object() {
                        return Err(SchemaError::MalformedSchema {
                            schema_id: owner.clone(),
                            pointer: "/allOf".to_string(),
                            reason: format!("composed schema '{target}' is not an object schema"),
                        });
                    }
                    let resolved = self.resolve_document(base, &base.id, stack)?;
                    if effective.envelope.is_none() {
                        effective.envelope = Some(target.clone());
                    }
                    effective.absorb(&resolved)?;
                }
                CompositionEntry::Inline(fragment) => {
                    let resolved = self.resolve_document(fragment, owner, stack)?;
                    if effective.envelope.is_none() {
                        effective.envelope = resolved.envelope.clone();
                    }
                    effective.absorb(&resolved)?;
                }
            }
        }

        effective.absorb_layer(doc, owner)?;
        stack.pop();
        Ok(effective)
    }

    /// Flatten the composition graph of `id` into merge layers, bases first.
    ///
    /// Merging the layers left to right with [`merge_layers`] yields the same
    /// effective schema as [`resolve`](Self::resolve).
    pub fn linearize(&self, id: &SchemaId) -> Result<Vec<Layer<'a>>, SchemaError> {
        let doc = self.lookup(id, id)?;
        let mut layers = Vec::new();
        let mut stack = Vec::new();
        self.linearize_into(doc, &doc.id, &mut stack, &mut layers)?;
        Ok(layers)
    }

    fn linearize_into(
        &self,
        doc: &'a SchemaDocument,
        owner: &SchemaId,
        stack: &mut Vec<SchemaId>,
        layers: &mut Vec<Layer<'a>>,
    ) -> Result<(), SchemaError> {
        if stack.contains(&doc.id) {
            let mut chain = stack.clone();
            chain.push(doc.id.clone());
            return Err(SchemaError::CompositionCycle { chain });
        }
        if stack.len() >= self.max_depth {
            return Err(SchemaError::CompositionTooDeep {
                schema_id: owner.clone(),
                limit: self.max_depth,
            });
        }

        stack.push(doc.id.clone());
        for entry in &doc.composition {
            match entry {
                CompositionEntry::Reference(target) => {
                    let base = self.lookup(owner, target)?;
                    self.linearize_into(base, &base.id, stack, layers)?;
                }
                CompositionEntry::Inline(fragment) => {
                    self.linearize_into(fragment, owner, stack, layers)?;
                }
            }
        }
        layers.push(Layer {
            document: doc,
            owner: owner.clone(),
        });
        stack.pop();
        Ok(())
    }

    fn lookup(&self, from: &SchemaId, target: &SchemaId) -> Result<&'a SchemaDocument, SchemaError> {
        self.schemas
            .get(target)
            .ok_or_else(|| SchemaError::UnresolvedReference {
                from: from.clone(),
                target: target.to_string(),
            })
    }
}

/// One document's own declarations, in flattened merge order.
#[derive(Debug, Clone)]
pub struct Layer<'a> {
    /// The document (or inline fragment).
    pub document: &'a SchemaDocument,
    /// Top-level document the declarations are attributed to.
    pub owner: SchemaId,
}

/// Merge flattened layers into an effective schema for `root`.
pub fn merge_layers(root: &SchemaDocument, layers: &[Layer<'_>]) -> Result<EffectiveSchema, SchemaError> {
    let mut effective = EffectiveSchema::empty(root);
    for layer in layers {
        effective.absorb_layer(layer.document, &layer.owner)?;
    }
    Ok(effective)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{RawSchema, SchemaLoader};

    fn id(s: &str) -> SchemaId {
        SchemaId::new(s).unwrap()
    }

    fn load(sources: &[(&str, &str)]) -> SchemaSet {
        SchemaLoader::new()
            .load(sources.iter().map(|(i, t)| RawSchema::new(id(i), *t)))
            .unwrap()
    }

    const ENVELOPE: &str = r#"{
        "type": "object",
        "properties": {
            "messageId": {"type": "string", "format": "uuid"},
            "timestamp": {"type": "string", "format": "date-time"},
            "correlationId": {"type": "string", "format": "uuid"},
            "consumedBy": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["messageId", "timestamp", "correlationId", "consumedBy"]
    }"#;

    const ORDER_COMPLETED: &str = r#"{
        "title": "OrderCompletedEvent",
        "allOf": [
            {"$ref": "../base-message.json"},
            {
                "type": "object",
                "properties": {
                    "consumedBy": {"const": ["OrderService"]},
                    "orderId": {"type": "string", "format": "uuid"},
                    "jobSucceeded": {"type": "boolean"},
                    "actualTotalCost": {"type": ["number", "null"]}
                },
                "required": ["orderId", "jobSucceeded"]
            }
        ]
    }"#;

    #[test]
    fn envelope_fields_come_first() {
        let set = load(&[
            ("orders/order-completed-event", ORDER_COMPLETED),
            ("base-message", ENVELOPE),
        ]);
        let eff = CompositionResolver::new(&set)
            .resolve(&id("orders/order-completed-event"))
            .unwrap();

        assert_eq!(
            eff.field_names(),
            vec![
                "messageId",
                "timestamp",
                "correlationId",
                "consumedBy",
                "orderId",
                "jobSucceeded",
                "actualTotalCost"
            ]
        );
        assert_eq!(eff.envelope, Some(id("base-message")));
        assert_eq!(eff.fields["messageId"].source, id("base-message"));
        assert_eq!(eff.fields["orderId"].source, id("orders/order-completed-event"));
        assert_eq!(
            eff.constants["consumedBy"].value,
            Literal::List(vec![Literal::String("OrderService".into())])
        );
        assert!(eff.is_required("messageId") && eff.is_required("jobSucceeded"));
        assert!(!eff.is_required("actualTotalCost"));
    }

    #[test]
    fn first_declaration_wins() {
        let set = load(&[
            ("base", r#"{"type": "object", "properties": {"amount": {"type": "number"}}}"#),
            (
                "child",
                r#"{"allOf": [{"$ref": "base.json"}], "properties": {"amount": {"type": ["string", "null"]}}}"#,
            ),
        ]);
        let eff = CompositionResolver::new(&set).resolve(&id("child")).unwrap();
        let amount = &eff.fields["amount"];
        assert_eq!(amount.source, id("base"));
        assert!(!amount.spec.nullable);
    }

    #[test]
    fn conflicting_constants_fail() {
        let set = load(&[
            ("base", r#"{"type": "object", "properties": {"source": {"const": "OrderService"}}}"#),
            (
                "child",
                r#"{"allOf": [{"$ref": "base.json"}, {"properties": {"source": {"const": "PricingService"}}}]}"#,
            ),
        ]);
        let err = CompositionResolver::new(&set).resolve(&id("child")).unwrap_err();
        match err {
            SchemaError::ConstantConflict {
                field,
                first_source,
                second_source,
                ..
            } => {
                assert_eq!(field, "source");
                assert_eq!(first_source, id("base"));
                assert_eq!(second_source, id("child"));
            }
            other => panic!("expected ConstantConflict, got {other:?}"),
        }
    }

    #[test]
    fn equal_constants_from_a_diamond_merge() {
        let set = load(&[
            ("root", r#"{"type": "object", "properties": {"kind": {"const": "event"}}}"#),
            ("left", r#"{"allOf": [{"$ref": "root.json"}], "properties": {"l": {"type": "string"}}}"#),
            ("right", r#"{"allOf": [{"$ref": "root.json"}], "properties": {"r": {"type": "string"}}}"#),
            ("leaf", r#"{"allOf": [{"$ref": "left.json"}, {"$ref": "right.json"}]}"#),
        ]);
        let eff = CompositionResolver::new(&set).resolve(&id("leaf")).unwrap();
        assert_eq!(eff.field_names(), vec!["kind", "l", "r"]);
        assert_eq!(eff.envelope, Some(id("left")));
    }

    #[test]
    fn cycles_are_detected_from_either_side() {
        let set = load(&[
            ("a", r#"{"allOf": [{"$ref": "b.json"}]}"#),
            ("b", r#"{"allOf": [{"$ref": "a.json"}]}"#),
        ]);
        let resolver = CompositionResolver::new(&set);
        for start in ["a", "b"] {
            match resolver.resolve(&id(start)).unwrap_err() {
                SchemaError::CompositionCycle { chain } => {
                    assert_eq!(chain.first(), chain.last());
                    assert_eq!(chain.len(), 3);
                }
                other => panic!("expected CompositionCycle, got {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_base_is_unresolved() {
        let set = load(&[("a", r#"{"allOf": [{"$ref": "missing.json"}]}"#)]);
        let err = CompositionResolver::new(&set).resolve(&id("a")).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnresolvedReference {
                from: id("a"),
                target: "missing".into()
            }
        );
    }

    #[test]
    fn depth_is_bounded() {
        let set = load(&[
            ("a", r#"{"allOf": [{"$ref": "b.json"}]}"#),
            ("b", r#"{"allOf": [{"$ref": "c.json"}]}"#),
            ("c", r#"{"type": "object"}"#),
        ]);
        let err = CompositionResolver::new(&set)
            .with_max_depth(2)
            .resolve(&id("a"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::CompositionTooDeep { limit: 2, .. }));
    }

    #[test]
    fn flattened_merge_matches_recursive_resolution() {
        let set = load(&[
            ("c1", r#"{"type": "object", "properties": {"x": {"type": "string"}, "k": {"const": 1}}, "required": ["x"]}"#),
            ("c2", r#"{"type": "object", "properties": {"y": {"type": "integer"}, "x": {"type": "number"}}}"#),
            ("b", r#"{"allOf": [{"$ref": "c1.json"}, {"$ref": "c2.json"}], "properties": {"z": {"type": "boolean"}}}"#),
            ("a", r#"{"allOf": [{"$ref": "b.json"}, {"properties": {"w": {"type": "string"}}, "required": ["w"]}]}"#),
        ]);
        let resolver = CompositionResolver::new(&set);
        let recursive = resolver.resolve(&id("a")).unwrap();
        let layers = resolver.linearize(&id("a")).unwrap();
        let flattened = merge_layers(set.get(&id("a")).unwrap(), &layers).unwrap();

        assert_eq!(recursive.fields, flattened.fields);
        assert_eq!(recursive.required, flattened.required);
        assert_eq!(recursive.constants, flattened.constants);
        assert_eq!(recursive.field_names(), vec!["x", "k", "y", "z", "w"]);
    }
}
