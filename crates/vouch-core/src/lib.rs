#![deny(missing_docs)]

//! # vouch-core — Foundational Types for the vouch Validation Engine
//!
//! This crate defines the primitives every other `vouch-*` crate builds on:
//! symbolic references, the error model, validation options, the per-call
//! validation state, and literal sets. It carries no schema logic of its own.
//!
//! ## Key Design Principles
//!
//! 1. **Two error classes.** Construction errors ([`ConfigError`]) are
//!    returned synchronously when a malformed rule is attached. Validation
//!    failures ([`Failure`]) are never raised; they aggregate into a
//!    [`ValidationError`] carried inside the validation result.
//!
//! 2. **Messages are data.** Every failure holds an [`ErrorKind`] and a
//!    context map. The rendered message is a pure function of both, so a
//!    detail's `message` always matches its `context`.
//!
//! 3. **References resolve late.** A [`Reference`] is a path, not a value.
//!    It is resolved against live data on every validation call.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vouch-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod literal;
pub mod message;
pub mod options;
pub mod reference;
pub mod report;
pub mod state;

// Re-export primary types for ergonomic imports.
pub use error::{ConfigError, LoadError, ReferenceError};
pub use literal::LiteralSet;
pub use options::{Presence, SchemaSettings, ValidationOptions};
pub use reference::{Reference, ReferenceKind};
pub use report::{Context, ErrorDetail, ErrorKind, Failure, ValidationError, Violation};
pub use state::ValidationState;
