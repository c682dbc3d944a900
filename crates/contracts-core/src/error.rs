//! # Error Types
//!
//! Defines the error types used throughout the contracts generator. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Scope
//!
//! Every [`SchemaError`] variant is scoped either to one schema (and its
//! transitive dependents) or to the whole loaded set. Only
//! [`SchemaError::DuplicateSchemaId`] is set-scoped: identity resolution is
//! ambiguous past that point, so a run stops before generating anything.

use thiserror::Error;

use crate::identity::SchemaId;
use crate::literal::Literal;

/// Top-level error type for the contracts generator.
#[derive(Error, Debug)]
pub enum ContractsError {
    /// A schema failed to load, resolve, or build.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A language backend could not render a type.
    #[error("backend error: {0}")]
    Backend(String),

    /// The generator configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure while loading, composing, or lowering a schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// The source text is not a structurally valid schema document.
    #[error("malformed schema '{schema_id}' at {pointer}: {reason}")]
    MalformedSchema {
        /// Identity of the offending source.
        schema_id: SchemaId,
        /// JSON Pointer to the offending node (`""` for the document root).
        pointer: String,
        /// What was wrong.
        reason: String,
    },

    /// Two sources resolve to the same identity.
    #[error("duplicate schema id '{schema_id}'")]
    DuplicateSchemaId {
        /// The identity claimed twice.
        schema_id: SchemaId,
    },

    /// A reference names an identity absent from the loaded set.
    #[error("schema '{from}' references unknown schema '{target}'")]
    UnresolvedReference {
        /// The schema holding the reference.
        from: SchemaId,
        /// The reference target as written after path resolution.
        target: String,
    },

    /// Composition revisits a schema already on the resolution stack.
    #[error("composition cycle: {}", format_chain(chain))]
    CompositionCycle {
        /// The resolution stack, ending with the revisited identity.
        chain: Vec<SchemaId>,
    },

    /// Composition nests deeper than the resolver allows.
    #[error("composition of '{schema_id}' exceeds the depth limit of {limit}")]
    CompositionTooDeep {
        /// The schema being resolved when the limit was hit.
        schema_id: SchemaId,
        /// The depth limit.
        limit: usize,
    },

    /// Two composed sources fix the same field to different literals.
    #[error(
        "constant conflict on field '{field}': '{first_source}' fixes {first}, '{second_source}' fixes {second}"
    )]
    ConstantConflict {
        /// The field both sources constrain.
        field: String,
        /// Source that contributed the constant first.
        first_source: SchemaId,
        /// Literal from the first source.
        first: Literal,
        /// Source that contributed the conflicting constant.
        second_source: SchemaId,
        /// Literal from the second source.
        second: Literal,
    },
}

impl SchemaError {
    /// The schema this error is attributed to, for per-schema reporting.
    pub fn schema_id(&self) -> &SchemaId {
        match self {
            Self::MalformedSchema { schema_id, .. }
            | Self::DuplicateSchemaId { schema_id }
            | Self::CompositionTooDeep { schema_id, .. } => schema_id,
            Self::UnresolvedReference { from, .. } => from,
            Self::ConstantConflict { second_source, .. } => second_source,
            // A cycle chain always holds at least the revisited identity.
            Self::CompositionCycle { chain } => chain.first().unwrap_or(SchemaId::root()),
        }
    }

    /// Whether this error invalidates the entire loaded set.
    pub fn is_set_fatal(&self) -> bool {
        matches!(self, Self::DuplicateSchemaId { .. })
    }

    /// Short machine-friendly name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedSchema { .. } => "MalformedSchema",
            Self::DuplicateSchemaId { .. } => "DuplicateSchemaId",
            Self::UnresolvedReference { .. } => "UnresolvedReference",
            Self::CompositionCycle { .. } => "CompositionCycle",
            Self::CompositionTooDeep { .. } => "CompositionTooDeep",
            Self::ConstantConflict { .. } => "ConstantConflict",
        }
    }
}

fn format_chain(chain: &[SchemaId]) -> String {
    chain
        .iter()
        .map(SchemaId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
