//! # vouch-schema — Declarative Schema Validation
//!
//! Build a schema with chained rule factories, then validate candidate
//! values against it. A validation call returns the converted value, or a
//! [`ValidationError`] listing every violated constraint with its path,
//! type code, context and fully rendered message.
//!
//! ```
//! use serde_json::json;
//! use vouch_schema::{Schema, SchemaBuilder};
//!
//! let name = Schema::string().trim().min(3)?.max(30)?;
//! let result = name.validate(json!("  ada  "));
//! assert_eq!(result.value, Some(json!("ada")));
//!
//! let error = name.validate(json!("al")).error.unwrap();
//! assert_eq!(error.message, "\"value\" length must be at least 3 characters long");
//! # Ok::<(), vouch_schema::ConfigError>(())
//! ```
//!
//! ## Key Design Principles
//!
//! 1. **Copy-on-write schemas.** A [`Schema`] is an `Arc` around an
//!    immutable node. Builder methods return a new handle and copy the node
//!    only when it is shared, so derived schemas never affect their source.
//!
//! 2. **Closed rule set.** Tests are variants of [`Rule`], validated when
//!    attached. A schema that was built can always be evaluated.
//!
//! 3. **Lossless descriptions.** [`describe`] and [`Schema::build`] are
//!    inverses; equality of schemas is equality of their descriptions.
//!
//! 4. **Pure validation.** A call reads the schema, the value and the
//!    options, and allocates its own state. Schemas are `Send + Sync`.
//!
//! ## Crate Policy
//!
//! - Depends on `vouch-core` and `vouch-formats` within the workspace.
//! - Logging through `tracing` only; no subscriber is installed here.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod describe;
pub mod engine;
pub mod flags;
pub mod rules;
pub mod schema;
pub mod string;

pub use describe::{describe, Description};
pub use engine::{validate, ValidationResult};
pub use flags::{Case, Flags};
pub use rules::{LengthLimit, Limit, LimitArg, Rule, RuleContext};
pub use schema::{ObjectSchema, Schema, SchemaBuilder, SchemaNode, SchemaType};
pub use string::StringSchema;

// Types callers need to configure and inspect validation.
pub use vouch_core::{
    ConfigError, ErrorDetail, ErrorKind, LoadError, Presence, Reference, SchemaSettings,
    ValidationError, ValidationOptions,
};
pub use vouch_formats::{
    CidrMode, EmailOptions, ErrorLevel, IpOptions, IpVersion, Pattern, SchemeSpec, UriOptions,
};
