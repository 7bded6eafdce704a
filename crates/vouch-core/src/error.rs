//! # Error Types — Construction, Resolution, and Loading Failures
//!
//! Construction errors describe a malformed schema and are returned by the
//! rule factory that received the bad argument. Their `Display` text is part
//! of the schema-authoring surface and must stay stable.
//!
//! Reference errors are produced while resolving a [`Reference`] against
//! live data. Rules translate them into validation failures; they never
//! escape a `validate` call.
//!
//! [`Reference`]: crate::reference::Reference

use thiserror::Error;

/// A rule was attached with an argument it cannot accept.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A length limit was neither a non-negative integer nor a reference.
    #[error("limit must be a positive integer or reference")]
    InvalidLimit,

    /// Unknown character encoding for a byte-length test.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// A reference key was empty.
    #[error("Invalid reference key: {0}")]
    InvalidReference(String),

    /// A pattern failed to compile or carried unsupported flags.
    #[error("invalid pattern /{pattern}/{flags}: {reason}")]
    InvalidPattern {
        /// Pattern source as supplied.
        pattern: String,
        /// Pattern flags as supplied.
        flags: String,
        /// Compiler or flag diagnostic.
        reason: String,
    },

    /// Email options were not an object.
    #[error("email options must be an object")]
    EmailOptionsShape,

    /// DNS checks were requested; the engine performs no I/O.
    #[error("checkDNS option is not supported")]
    CheckDnsUnsupported,

    /// `tldWhitelist` was neither a list nor a map.
    #[error("tldWhitelist must be an array or object")]
    TldWhitelistShape,

    /// `minDomainAtoms` was not a positive integer.
    #[error("minDomainAtoms must be a positive integer")]
    MinDomainAtoms,

    /// `errorLevel` was neither a boolean nor a non-negative integer.
    #[error("errorLevel must be a non-negative integer or boolean")]
    ErrorLevel,

    /// Rule options were not an object.
    #[error("options must be an object")]
    OptionsShape,

    /// The IP `cidr` option was not a string.
    #[error("cidr must be a string")]
    CidrShape,

    /// The IP `cidr` option named an unknown mode.
    #[error("cidr must be one of required, optional, forbidden")]
    CidrMode,

    /// The IP `version` option was an empty list.
    #[error("version must have at least 1 version specified")]
    VersionEmpty,

    /// An IP version entry was not a string.
    #[error("version at position {position} must be a string")]
    VersionShape {
        /// Index of the offending entry.
        position: usize,
    },

    /// An IP version entry named an unknown family.
    #[error("version at position {position} must be one of ipv4, ipv6, ipvfuture")]
    VersionUnknown {
        /// Index of the offending entry.
        position: usize,
    },

    /// The URI `scheme` option had an unsupported shape.
    #[error("scheme must be a RegExp, String, or Array")]
    SchemeShape,

    /// The URI `scheme` option was an empty list.
    #[error("scheme must have at least 1 scheme specified")]
    SchemeEmpty,

    /// A literal URI scheme cannot match any scheme.
    #[error("scheme at position {position} must be a valid scheme")]
    SchemeInvalid {
        /// Index of the offending entry.
        position: usize,
    },

    /// A URI scheme entry was neither a string nor a pattern.
    #[error("scheme at position {position} must be a RegExp or String")]
    SchemeEntryShape {
        /// Index of the offending entry.
        position: usize,
    },

    /// A rule name has no registry entry for the schema type.
    #[error("unknown rule '{name}' for {schema_type} schema")]
    UnknownRule {
        /// Schema type the rule was attached to.
        schema_type: String,
        /// Rule name as found in the description.
        name: String,
    },

    /// A description is structurally inconsistent.
    #[error("malformed description: {0}")]
    MalformedDescription(String),
}

/// A reference could not be followed to a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// Nothing exists at the referenced path.
    #[error("reference '{key}' does not resolve to a value")]
    Missing {
        /// Reference key as written, without the context prefix.
        key: String,
    },

    /// The path crosses a value that cannot be descended into.
    #[error("reference '{key}' cannot descend into segment '{segment}'")]
    Invalid {
        /// Reference key as written, without the context prefix.
        key: String,
        /// The segment that could not be followed.
        segment: String,
    },
}

/// Options or a schema description could not be loaded.
#[derive(Error, Debug)]
pub enum LoadError {
    /// JSON parsing or shape mismatch.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or shape mismatch.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The description parsed but does not build into a schema.
    #[error("schema construction error: {0}")]
    Config(#[from] ConfigError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages_are_verbatim() {
        assert_eq!(
            ConfigError::InvalidLimit.to_string(),
            "limit must be a positive integer or reference"
        );
        assert_eq!(
            ConfigError::VersionUnknown { position: 0 }.to_string(),
            "version at position 0 must be one of ipv4, ipv6, ipvfuture"
        );
        assert_eq!(
            ConfigError::SchemeInvalid { position: 1 }.to_string(),
            "scheme at position 1 must be a valid scheme"
        );
        assert_eq!(
            ConfigError::InvalidEncoding("utf7".into()).to_string(),
            "Invalid encoding: utf7"
        );
    }

    #[test]
    fn test_load_error_wraps_config_error() {
        let err: LoadError = ConfigError::CheckDnsUnsupported.into();
        assert!(err.to_string().contains("checkDNS option is not supported"));
    }
}
