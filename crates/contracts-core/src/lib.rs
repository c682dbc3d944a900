//! # contracts-core — Foundational Types for the Contracts Generator
//!
//! Every other crate in the workspace depends on `contracts-core`; it depends
//! on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identities.** `SchemaId` and `NamespacePath`
//!    are validated newtypes. No bare strings for schema identity.
//!
//! 2. **Decimal-exact literals.** `Literal` stores numbers with a fractional
//!    part as `rust_decimal::Decimal`. Constants and defaults read from schema
//!    text never pass through `f64`.
//!
//! 3. **One error taxonomy.** `SchemaError` names every way a schema can fail
//!    between loading and IR construction. Each variant carries the schema
//!    identity it is scoped to.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `contracts-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod literal;

// Re-export primary types for ergonomic imports.
pub use error::{ContractsError, SchemaError};
pub use identity::{NamespacePath, SchemaId};
pub use literal::Literal;
