//! # vouch-formats — String Format Recognizers
//!
//! Pure, allocation-light recognizers for the string formats the schema
//! layer validates: email addresses, URIs, IP addresses with CIDR suffixes,
//! hostnames, ISO 8601 dates, GUIDs, Luhn checksums and character classes,
//! plus byte-length measurement in the common character encodings.
//!
//! ## Key Design Principles
//!
//! 1. **Fixed grammars.** Each recognizer implements one grammar. Options
//!    narrow a grammar (schemes, IP families, CIDR policy, TLDs); they never
//!    extend it.
//!
//! 2. **Compile once.** Option-dependent matchers ([`UriMatcher`],
//!    [`IpMatcher`], [`Pattern`]) compile their expression at construction
//!    and report a [`ConfigError`] there, never while matching.
//!
//! 3. **ASCII grammar classes.** Format grammars use ASCII character classes
//!    regardless of the Unicode awareness of user patterns.
//!
//! ## Crate Policy
//!
//! - Depends only on `vouch-core` within the workspace.
//! - No I/O: email checks never consult DNS.
//! - No `panic!()` or `.unwrap()` outside tests.
//!
//! [`ConfigError`]: vouch_core::ConfigError

pub mod charset;
pub mod email;
pub mod encoding;
pub mod guid;
pub mod hostname;
pub mod ip;
pub mod iso_date;
pub mod luhn;
pub mod pattern;
pub mod rfc3986;
pub mod uri;
pub mod whitespace;

pub use email::{Diagnosis, EmailOptions, ErrorLevel};
pub use encoding::Encoding;
pub use ip::{CidrMode, IpMatcher, IpOptions, IpVersion};
pub use pattern::{Pattern, PatternDescription};
pub use uri::{SchemeSpec, UriMatcher, UriOptions};
