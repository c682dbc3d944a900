//! # contracts-schema — Schema Composition & Contract Generation
//!
//! Turns a set of JSON Schema documents describing cross-service messages
//! into strongly typed source code for several languages, with governance
//! checks in between.
//!
//! ## Pipeline
//!
//! - [`loader`] parses raw documents into a [`SchemaSet`] keyed by
//!   [`SchemaId`](contracts_core::SchemaId).
//! - [`compose`] flattens `allOf` composition into an [`EffectiveSchema`]
//!   with deterministic field order, detecting cycles and constant
//!   conflicts per resolution call.
//! - [`governance`] runs ordered [`GovernanceRule`]s over each message
//!   schema and collects [`ValidationDiagnostic`]s.
//! - [`ir`] lowers a passing schema into an [`IrGraph`] of records and enums.
//! - [`backend`] turns IR types into source text; C# and Rust are built in.
//! - [`generate`] wires the stages into one run and returns a
//!   [`GenerationReport`].
//!
//! ## Crate Policy
//!
//! - No filesystem access. Discovering schema files and writing artifacts
//!   belong to the caller (`contracts-cli`).
//! - Numbers are exact decimals end to end; no floating point.
//! - Everything a run reports is sorted by schema identity.

pub mod backend;
pub mod compose;
pub mod config;
pub mod document;
pub mod generate;
pub mod governance;
pub mod ir;
pub mod loader;
pub mod namespace;

pub use backend::{backend_for, CsharpBackend, GeneratedArtifact, LanguageBackend, RustBackend};
pub use compose::{CompositionResolver, EffectiveField, EffectiveSchema, MAX_COMPOSITION_DEPTH};
pub use config::{BackendKind, GeneratorConfig, GovernanceConfig, IdentityField};
pub use document::{FieldSpec, PrimitiveKind, SchemaDocument, ValueKind};
pub use generate::{GenerationReport, Generator, SchemaFailure};
pub use governance::{
    ConsumersDeclaredRule, DiagnosticReport, GovernanceRule, GovernanceValidator,
    RequiredFieldsResolvableRule, Severity, StableIdentityFieldsRule, ValidationDiagnostic,
};
pub use ir::{IrBuilder, IrField, IrFieldType, IrGraph, IrType, IrTypeKind, TypeRef};
pub use loader::{RawSchema, SchemaLoader, SchemaSet};
pub use namespace::NamespaceMapper;
