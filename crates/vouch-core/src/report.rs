//! # Validation Reports
//!
//! A failing rule yields a [`Violation`]: an [`ErrorKind`] plus the template
//! variables describing what went wrong. The engine places it in the tree as
//! a [`Failure`], adding the path and label of the node. Failures under a
//! composite parent nest as `reasons` of an `object.child` wrapper.
//!
//! [`ValidationError`] is the caller-facing aggregate: the top-level message
//! joins the top-level failures, and `details` lists the leaves in discovery
//! order.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::message::render;

/// Template variables of a single failure.
pub type Context = BTreeMap<String, Value>;

/// Context key holding the display label of the failing node.
pub const LABEL_KEY: &str = "label";

/// Context key holding the raw key of the failing node, when it has one.
pub const KEY_KEY: &str = "key";

/// Stable failure codes, one per message template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// `any.unknown`
    AnyUnknown,
    /// `any.invalid`
    AnyInvalid,
    /// `any.empty`
    AnyEmpty,
    /// `any.required`
    AnyRequired,
    /// `any.only`
    AnyOnly,
    /// `number.base`
    NumberBase,
    /// `object.base`
    ObjectBase,
    /// `object.child`
    ObjectChild,
    /// `object.allowUnknown`
    ObjectAllowUnknown,
    /// `string.base`
    StringBase,
    /// `string.min`
    StringMin,
    /// `string.max`
    StringMax,
    /// `string.length`
    StringLength,
    /// `string.alphanum`
    StringAlphanum,
    /// `string.token`
    StringToken,
    /// `string.regex.base`
    StringRegexBase,
    /// `string.regex.name`
    StringRegexName,
    /// `string.email`
    StringEmail,
    /// `string.uri`
    StringUri,
    /// `string.uriCustomScheme`
    StringUriCustomScheme,
    /// `string.isoDate`
    StringIsoDate,
    /// `string.guid`
    StringGuid,
    /// `string.hex`
    StringHex,
    /// `string.hostname`
    StringHostname,
    /// `string.lowercase`
    StringLowercase,
    /// `string.uppercase`
    StringUppercase,
    /// `string.trim`
    StringTrim,
    /// `string.creditCard`
    StringCreditCard,
    /// A numeric limit referenced a value that is not a non-negative integer.
    ReferenceNotNumber,
    /// `string.ip`
    StringIp,
    /// `string.ipVersion`
    StringIpVersion,
}

impl ErrorKind {
    /// Every kind, in declaration order.
    pub const ALL: [ErrorKind; 31] = [
        Self::AnyUnknown,
        Self::AnyInvalid,
        Self::AnyEmpty,
        Self::AnyRequired,
        Self::AnyOnly,
        Self::NumberBase,
        Self::ObjectBase,
        Self::ObjectChild,
        Self::ObjectAllowUnknown,
        Self::StringBase,
        Self::StringMin,
        Self::StringMax,
        Self::StringLength,
        Self::StringAlphanum,
        Self::StringToken,
        Self::StringRegexBase,
        Self::StringRegexName,
        Self::StringEmail,
        Self::StringUri,
        Self::StringUriCustomScheme,
        Self::StringIsoDate,
        Self::StringGuid,
        Self::StringHex,
        Self::StringHostname,
        Self::StringLowercase,
        Self::StringUppercase,
        Self::StringTrim,
        Self::StringCreditCard,
        Self::ReferenceNotNumber,
        Self::StringIp,
        Self::StringIpVersion,
    ];

    /// Dotted identifier reported as the detail `type`.
    pub fn code(self) -> &'static str {
        match self {
            Self::AnyUnknown => "any.unknown",
            Self::AnyInvalid => "any.invalid",
            Self::AnyEmpty => "any.empty",
            Self::AnyRequired => "any.required",
            Self::AnyOnly => "any.only",
            Self::NumberBase => "number.base",
            Self::ObjectBase => "object.base",
            Self::ObjectChild => "object.child",
            Self::ObjectAllowUnknown => "object.allowUnknown",
            Self::StringBase => "string.base",
            Self::StringMin => "string.min",
            Self::StringMax => "string.max",
            Self::StringLength => "string.length",
            Self::StringAlphanum => "string.alphanum",
            Self::StringToken => "string.token",
            Self::StringRegexBase => "string.regex.base",
            Self::StringRegexName => "string.regex.name",
            Self::StringEmail => "string.email",
            Self::StringUri => "string.uri",
            Self::StringUriCustomScheme => "string.uriCustomScheme",
            Self::StringIsoDate => "string.isoDate",
            Self::StringGuid => "string.guid",
            Self::StringHex => "string.hex",
            Self::StringHostname => "string.hostname",
            Self::StringLowercase => "string.lowercase",
            Self::StringUppercase => "string.uppercase",
            Self::StringTrim => "string.trim",
            Self::StringCreditCard => "string.creditCard",
            Self::ReferenceNotNumber => "string.ref",
            Self::StringIp => "string.ip",
            Self::StringIpVersion => "string.ipVersion",
        }
    }

    /// Message template. A leading `!!` suppresses the label prefix.
    pub fn template(self) -> &'static str {
        match self {
            Self::AnyUnknown => "is not allowed",
            Self::AnyInvalid => "contains an invalid value",
            Self::AnyEmpty => "is not allowed to be empty",
            Self::AnyRequired => "is required",
            Self::AnyOnly => "must be one of {{valids}}",
            Self::NumberBase => "must be a number",
            Self::ObjectBase => "must be an object",
            Self::ObjectChild => "!!child \"{{!child}}\" fails because {{reason}}",
            Self::ObjectAllowUnknown => "!!\"{{!child}}\" is not allowed",
            Self::StringBase => "must be a string",
            Self::StringMin => "length must be at least {{limit}} characters long",
            Self::StringMax => {
                "length must be less than or equal to {{limit}} characters long"
            }
            Self::StringLength => "length must be {{limit}} characters long",
            Self::StringAlphanum => "must only contain alpha-numeric characters",
            Self::StringToken => "must only contain alpha-numeric and underscore characters",
            Self::StringRegexBase => {
                "with value \"{{!value}}\" fails to match the required pattern: {{pattern}}"
            }
            Self::StringRegexName => "with value \"{{!value}}\" fails to match the {{name}} pattern",
            Self::StringEmail => "must be a valid email",
            Self::StringUri => "must be a valid uri",
            Self::StringUriCustomScheme => {
                "must be a valid uri with a scheme matching the {{scheme}} pattern"
            }
            Self::StringIsoDate => "must be a valid ISO 8601 date",
            Self::StringGuid => "must be a valid GUID",
            Self::StringHex => "must only contain hexadecimal characters",
            Self::StringHostname => "must be a valid hostname",
            Self::StringLowercase => "must only contain lowercase characters",
            Self::StringUppercase => "must only contain uppercase characters",
            Self::StringTrim => "must not have leading or trailing whitespace",
            Self::StringCreditCard => "must be a credit card",
            Self::ReferenceNotNumber => "references \"{{ref}}\" which is not a number",
            Self::StringIp => "must be a valid ip address with a {{cidr}} CIDR",
            Self::StringIpVersion => {
                "must be a valid ip address of one of the following versions {{version}} with a {{cidr}} CIDR"
            }
        }
    }

    /// Reverse of [`ErrorKind::code`].
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for ErrorKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Self::from_code(&code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown error type '{code}'")))
    }
}

/// What a single rule reports when it rejects a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Failure code.
    pub kind: ErrorKind,
    /// Template variables.
    pub context: Context,
}

impl Violation {
    /// A violation with an empty context.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: Context::new(),
        }
    }

    /// Add a template variable.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.context.insert(name.to_string(), value.into());
        self
    }
}

/// A violation positioned in the validated document.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// Failure code.
    pub kind: ErrorKind,
    /// Key segments from the root to the failing node.
    pub path: Vec<String>,
    /// Template variables, including `label` and `key`.
    pub context: Context,
    /// Nested failures of a composite child, in discovery order.
    pub reasons: Vec<Failure>,
}

impl Failure {
    /// Place `violation` at `path`, labelled `label`.
    pub fn new(violation: Violation, path: Vec<String>, label: &str) -> Self {
        let mut context = violation.context;
        context.insert(LABEL_KEY.to_string(), Value::String(label.to_string()));
        if let Some(key) = path.last() {
            context
                .entry(KEY_KEY.to_string())
                .or_insert_with(|| Value::String(key.clone()));
        }
        Self {
            kind: violation.kind,
            path,
            context,
            reasons: Vec::new(),
        }
    }

    /// Wrap the failures of a composite child.
    pub fn child(path: Vec<String>, label: &str, reasons: Vec<Failure>) -> Self {
        let violation = Violation::new(ErrorKind::ObjectChild).with("child", label);
        let mut failure = Self::new(violation, path, label);
        failure.reasons = reasons;
        failure
    }

    /// Fully interpolated message.
    pub fn message(&self) -> String {
        let template = self.kind.template();
        let (template, prefixed) = match template.strip_prefix("!!") {
            Some(bare) => (bare, false),
            None => (template, true),
        };
        let mut context = self.context.clone();
        if !self.reasons.is_empty() {
            let nested = self
                .reasons
                .iter()
                .map(|reason| Value::String(reason.message()))
                .collect();
            context.insert("reason".to_string(), Value::Array(nested));
        }
        let body = render(template, &context);
        if prefixed {
            format!("{} {body}", render("\"{{!label}}\"", &context))
        } else {
            body
        }
    }

    fn collect_leaves(&self, out: &mut Vec<ErrorDetail>) {
        if self.reasons.is_empty() {
            out.push(ErrorDetail {
                message: self.message(),
                path: self.path.clone(),
                kind: self.kind,
                context: self.context.clone(),
            });
            return;
        }
        for reason in &self.reasons {
            reason.collect_leaves(out);
        }
    }
}

/// One leaf failure as reported to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Rendered message, `context` interpolated.
    pub message: String,
    /// Key segments from the root.
    pub path: Vec<String>,
    /// Failure code, serialized as `type`.
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    /// Template variables.
    pub context: Context,
}

/// The aggregate failure of one validation call. Never empty.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ValidationError {
    /// Top-level failure messages joined with `". "`.
    pub message: String,
    /// Leaf failures in discovery order.
    pub details: Vec<ErrorDetail>,
}

impl ValidationError {
    /// Aggregate the top-level failures of a walk; `None` when there are none.
    pub fn from_failures(failures: &[Failure]) -> Option<Self> {
        if failures.is_empty() {
            return None;
        }
        let message = failures
            .iter()
            .map(Failure::message)
            .collect::<Vec<_>>()
            .join(". ");
        let mut details = Vec::new();
        for failure in failures {
            failure.collect_leaves(&mut details);
        }
        Some(Self { message, details })
    }

    /// Leaf failures in discovery order.
    pub fn details(&self) -> &[ErrorDetail] {
        &self.details
    }

    /// Number of leaf failures.
    pub fn len(&self) -> usize {
        self.details.len()
    }

    /// Always false for an error built by [`ValidationError::from_failures`].
    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    /// Leaf failure codes in discovery order.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.details.iter().map(|d| d.kind).collect()
    }
}
