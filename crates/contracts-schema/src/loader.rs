//! # Schema Loader
//!
//! Turns `(identity, raw text)` pairs into a [`SchemaSet`]. The loader never
//! touches a filesystem; its caller hands it already-read content.
//!
//! ## Failure Scope
//!
//! - A duplicate identity aborts the whole load: later stages could not tell
//!   which document a reference means.
//! - A malformed source is set aside in [`SchemaSet::rejected`] and the load
//!   continues. Schemas that depend on it fail later with
//!   `UnresolvedReference`.
//! - References are not checked here. Forward references across files are
//!   legal and are only dereferenced by the resolver.

use std::collections::{BTreeSet, HashSet};

use indexmap::IndexMap;
use serde_json::Value;

use contracts_core::{SchemaError, SchemaId};

use crate::document::{parse_document, SchemaDocument};

/// `$schema` URIs whose meta-schema ships with the `jsonschema` crate.
const KNOWN_META_SCHEMAS: &[&str] = &[
    "http://json-schema.org/draft-04/schema",
    "http://json-schema.org/draft-06/schema",
    "http://json-schema.org/draft-07/schema",
    "https://json-schema.org/draft/2019-09/schema",
    "https://json-schema.org/draft/2020-12/schema",
];

/// One raw schema source as supplied by the discovery layer.
#[derive(Debug, Clone)]
pub struct RawSchema {
    /// Logical identity (path below the schema root).
    pub id: SchemaId,
    /// Unparsed JSON text.
    pub text: String,
}

impl RawSchema {
    /// Pair an identity with its source text.
    pub fn new(id: SchemaId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// Loads raw sources into a [`SchemaSet`].
#[derive(Debug, Clone)]
pub struct SchemaLoader {
    check_meta_schema: bool,
}

impl Default for SchemaLoader {
    fn default() -> Self {
        Self {
            check_meta_schema: true,
        }
    }
}

impl SchemaLoader {
    /// A loader that checks each document against its JSON Schema meta-schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the meta-schema check.
    pub fn with_meta_schema_check(mut self, enabled: bool) -> Self {
        self.check_meta_schema = enabled;
        self
    }

    /// Load every source in order.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::DuplicateSchemaId` if two sources share an
    /// identity. Per-source parse failures do not fail the load.
    pub fn load<I>(&self, sources: I) -> Result<SchemaSet, SchemaError>
    where
        I: IntoIterator<Item = RawSchema>,
    {
        let mut seen = HashSet::new();
        let mut set = SchemaSet::default();

        for source in sources {
            if !seen.insert(source.id.clone()) {
                return Err(SchemaError::DuplicateSchemaId {
                    schema_id: source.id,
                });
            }

            match self.parse_source(&source) {
                Ok(doc) => {
                    tracing::debug!(
                        schema_id = %doc.id,
                        properties = doc.properties.len(),
                        composition = doc.composition.len(),
                        "loaded schema"
                    );
                    set.documents.insert(source.id, doc);
                }
                Err(e) => {
                    tracing::warn!(schema_id = %source.id, "rejected schema: {e}");
                    set.rejected.insert(source.id, e);
                }
            }
        }

        Ok(set)
    }

    fn parse_source(&self, source: &RawSchema) -> Result<SchemaDocument, SchemaError> {
        let value: Value = serde_json::from_str(&source.text).map_err(|e| SchemaError::MalformedSchema {
            schema_id: source.id.clone(),
            pointer: String::new(),
            reason: format!("invalid JSON at line {}, column {}: {e}", e.line(), e.column()),
        })?;

        if self.check_meta_schema && has_known_meta_schema(&value) {
            if let Err(e) = jsonschema::meta::validate(&value) {
                return Err(SchemaError::MalformedSchema {
                    schema_id: source.id.clone(),
                    pointer: e.instance_path.to_string(),
                    reason: format!("not a valid JSON Schema: {e}"),
                });
            }
        }

        parse_document(source.id.clone(), &value)
    }
}

fn has_known_meta_schema(value: &Value) -> bool {
    match value.get("$schema").and_then(Value::as_str) {
        None => value.is_object(),
        Some(uri) => {
            let uri = uri.trim_end_matches('#');
            KNOWN_META_SCHEMAS.contains(&uri)
        }
    }
}

/// The documents of one run, keyed by identity in load order.
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    documents: IndexMap<SchemaId, SchemaDocument>,
    rejected: IndexMap<SchemaId, SchemaError>,
}

impl SchemaSet {
    /// Look up a successfully parsed document.
    pub fn get(&self, id: &SchemaId) -> Option<&SchemaDocument> {
        self.documents.get(id)
    }

    /// Whether a parsed document with this identity exists.
    pub fn contains(&self, id: &SchemaId) -> bool {
        self.documents.contains_key(id)
    }

    /// Number of parsed documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether no document parsed.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Parsed documents in load order.
    pub fn documents(&self) -> impl Iterator<Item = &SchemaDocument> {
        self.documents.values()
    }

    /// Sources that failed to parse, in load order.
    pub fn rejected(&self) -> impl Iterator<Item = &SchemaError> {
        self.rejected.values()
    }

    /// Identities referenced by some other document, via `allOf` or a
    /// property `$ref`. These are building blocks, not messages.
    pub fn referenced_ids(&self) -> BTreeSet<&SchemaId> {
        self.documents
            .values()
            .flat_map(|doc| {
                doc.composition_refs()
                    .into_iter()
                    .chain(doc.property_refs())
                    .filter(move |target| *target != &doc.id)
            })
            .collect()
    }

    /// Object schemas nobody references, sorted by identity.
    ///
    /// These are the message schemas: the ones that are governed and
    /// generated as top-level types.
    pub fn message_ids(&self) -> Vec<&SchemaId> {
        let referenced = self.referenced_ids();
        let mut ids: Vec<&SchemaId> = self
            .documents
            .values()
            .filter(|doc| doc.is_object() && !referenced.contains(&doc.id))
            .map(|doc| &doc.id)
            .collect();
        ids.sort();
        ids
    }

    /// Every object schema, sorted by identity.
    pub fn object_ids(&self) -> Vec<&SchemaId> {
        let mut ids: Vec<&SchemaId> = self
            .documents
            .values()
            .filter(|doc| doc.is_object())
            .map(|doc| &doc.id)
            .collect();
        ids.sort();
        ids
    }
}
