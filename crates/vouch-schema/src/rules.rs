//! # Rules — Named Constraint Tests and Their Registry
//!
//! A [`Rule`] is a closed variant per constraint the string type supports.
//! Each variant carries its already-validated arguments, so checking a value
//! never fails for configuration reasons; the only runtime failure besides
//! the value itself is a length reference that does not resolve to a number.
//!
//! The registry maps a rule name to the factory that rebuilds the rule from
//! its plain-data arguments. It is consulted once per rule when a schema is
//! built from a description, never during validation.

use serde_json::{json, Map, Value};
use vouch_core::{ConfigError, ErrorKind, Reference, Violation};
use vouch_formats::encoding;
use vouch_formats::{
    charset, email, guid, hostname, iso_date, luhn, whitespace, EmailOptions, Encoding,
    IpMatcher, IpOptions, Pattern, PatternDescription, UriMatcher, UriOptions,
};

use crate::schema::SchemaType;

/// Rebuilds a rule from its description arguments.
pub type RuleFactory = fn(&Value) -> Result<Rule, ConfigError>;

/// Rules of the string type, by description name.
pub const STRING_RULES: &[(&str, RuleFactory)] = &[
    ("min", min_rule),
    ("max", max_rule),
    ("length", length_rule),
    ("regex", regex_rule),
    ("email", email_rule),
    ("uri", uri_rule),
    ("ip", ip_rule),
    ("hostname", hostname_rule),
    ("isoDate", iso_date_rule),
    ("guid", guid_rule),
    ("hex", hex_rule),
    ("alphanum", alphanum_rule),
    ("token", token_rule),
    ("creditCard", credit_card_rule),
    ("lowercase", lowercase_rule),
    ("uppercase", uppercase_rule),
    ("trim", trim_rule),
];

/// Find the factory for `name` among the rules of `schema_type`.
pub fn lookup(schema_type: SchemaType, name: &str) -> Result<RuleFactory, ConfigError> {
    let registry: &[(&str, RuleFactory)] = match schema_type {
        SchemaType::String => STRING_RULES,
        SchemaType::Any | SchemaType::Number | SchemaType::Object => &[],
    };
    registry
        .iter()
        .find(|(rule, _)| *rule == name)
        .map(|(_, factory)| *factory)
        .ok_or_else(|| ConfigError::UnknownRule {
            schema_type: schema_type.to_string(),
            name: name.to_string(),
        })
}

/// A length limit as attached: a count, or a reference resolved per call.
#[derive(Debug, Clone, PartialEq)]
pub enum Limit {
    Count(usize),
    Ref(Reference),
}

impl Limit {
    fn resolve(&self, ctx: &RuleContext<'_>) -> Result<usize, Violation> {
        match self {
            Self::Count(count) => Ok(*count),
            Self::Ref(reference) => reference
                .resolve(ctx.parent, ctx.context)
                .ok()
                .and_then(as_count)
                .ok_or_else(|| {
                    Violation::new(ErrorKind::ReferenceNotNumber).with("ref", reference.key())
                }),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Count(count) => json!(count),
            Self::Ref(reference) => json!({ "ref": reference.raw() }),
        }
    }

    fn from_value(value: &Value) -> Result<Self, ConfigError> {
        match value {
            Value::Object(map) => {
                let raw = map
                    .get("ref")
                    .and_then(Value::as_str)
                    .ok_or(ConfigError::InvalidLimit)?;
                Ok(Self::Ref(Reference::parse(raw)?))
            }
            other => as_count(other).map(Self::Count).ok_or(ConfigError::InvalidLimit),
        }
    }
}

/// A non-negative integral JSON number.
fn as_count(value: &Value) -> Option<usize> {
    if let Some(count) = value.as_u64() {
        return usize::try_from(count).ok();
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
        .map(|f| f as usize)
}

/// A limit argument before validation: any number, or a reference.
#[derive(Debug, Clone, PartialEq)]
pub enum LimitArg {
    Int(i64),
    Float(f64),
    Ref(Reference),
}

impl LimitArg {
    pub(crate) fn into_limit(self) -> Result<Limit, ConfigError> {
        match self {
            Self::Int(n) => usize::try_from(n)
                .map(Limit::Count)
                .map_err(|_| ConfigError::InvalidLimit),
            Self::Float(f) => as_count(&json!(f))
                .map(Limit::Count)
                .ok_or(ConfigError::InvalidLimit),
            Self::Ref(reference) => Ok(Limit::Ref(reference)),
        }
    }
}

impl From<i32> for LimitArg {
    fn from(n: i32) -> Self {
        Self::Int(n.into())
    }
}

impl From<i64> for LimitArg {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<u32> for LimitArg {
    fn from(n: u32) -> Self {
        Self::Int(n.into())
    }
}

impl From<usize> for LimitArg {
    fn from(n: usize) -> Self {
        i64::try_from(n).map_or(Self::Float(n as f64), Self::Int)
    }
}

impl From<f64> for LimitArg {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<Reference> for LimitArg {
    fn from(reference: Reference) -> Self {
        Self::Ref(reference)
    }
}

/// Arguments of `min`, `max` and `length`.
#[derive(Debug, Clone, PartialEq)]
pub struct LengthLimit {
    pub limit: Limit,
    /// Count bytes in this encoding instead of code points.
    pub encoding: Option<Encoding>,
}

impl LengthLimit {
    pub(crate) fn new(limit: LimitArg, encoding: Option<&str>) -> Result<Self, ConfigError> {
        Ok(Self {
            limit: limit.into_limit()?,
            encoding: encoding.map(Encoding::parse).transpose()?,
        })
    }

    /// The limit the value is compared against, as resolved for this call.
    pub(crate) fn resolve(&self, ctx: &RuleContext<'_>) -> Option<usize> {
        self.limit.resolve(ctx).ok()
    }

    fn compare(
        &self,
        value: &str,
        ctx: &RuleContext<'_>,
        kind: ErrorKind,
        accept: fn(usize, usize) -> bool,
    ) -> Result<(), Violation> {
        let limit = self.limit.resolve(ctx)?;
        if accept(encoding::measure(value, self.encoding), limit) {
            return Ok(());
        }
        let mut violation = Violation::new(kind).with("limit", limit).with("value", value);
        if let Some(encoding) = self.encoding {
            violation = violation.with("encoding", encoding.name());
        }
        Err(violation)
    }

    fn to_value(&self) -> Value {
        let mut args = Map::new();
        args.insert("limit".into(), self.limit.to_value());
        if let Some(encoding) = self.encoding {
            args.insert("encoding".into(), json!(encoding.name()));
        }
        Value::Object(args)
    }

    fn from_value(args: &Value) -> Result<Self, ConfigError> {
        let limit = args.get("limit").ok_or(ConfigError::InvalidLimit)?;
        let encoding = match args.get("encoding") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(Encoding::parse(name)?),
            Some(other) => return Err(ConfigError::InvalidEncoding(other.to_string())),
        };
        Ok(Self {
            limit: Limit::from_value(limit)?,
            encoding,
        })
    }
}

/// What a rule may consult besides the value.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Object enclosing the value, for sibling references.
    pub parent: Option<&'a Map<String, Value>>,
    /// Caller context, for `$` references.
    pub context: &'a Map<String, Value>,
    /// Whether transforms ran; the case and trim tests pass when they did.
    pub convert: bool,
}

/// One constraint test of a string schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Min(LengthLimit),
    Max(LengthLimit),
    Length(LengthLimit),
    Regex {
        /// Normalized: only the `i` flag survives.
        pattern: Pattern,
        name: Option<String>,
    },
    Email(EmailOptions),
    Uri(UriMatcher),
    Ip(IpMatcher),
    Hostname,
    IsoDate,
    Guid,
    Hex,
    Alphanum,
    Token,
    CreditCard,
    Lowercase,
    Uppercase,
    Trim,
}

impl Rule {
    /// A `regex` rule; flags other than `i` are dropped.
    pub fn regex(pattern: &Pattern, name: Option<String>) -> Result<Self, ConfigError> {
        Ok(Self::Regex {
            pattern: pattern.retain_flags("i")?,
            name,
        })
    }

    /// Name used in descriptions and the registry.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::Length(_) => "length",
            Self::Regex { .. } => "regex",
            Self::Email(_) => "email",
            Self::Uri(_) => "uri",
            Self::Ip(_) => "ip",
            Self::Hostname => "hostname",
            Self::IsoDate => "isoDate",
            Self::Guid => "guid",
            Self::Hex => "hex",
            Self::Alphanum => "alphanum",
            Self::Token => "token",
            Self::CreditCard => "creditCard",
            Self::Lowercase => "lowercase",
            Self::Uppercase => "uppercase",
            Self::Trim => "trim",
        }
    }

    /// Plain-data arguments; `null` for rules without any.
    pub fn args(&self) -> Value {
        match self {
            Self::Min(limit) | Self::Max(limit) | Self::Length(limit) => limit.to_value(),
            Self::Regex { pattern, name } => {
                let mut args = Map::new();
                args.insert("pattern".into(), json!(pattern.describe()));
                if let Some(name) = name {
                    args.insert("name".into(), json!(name));
                }
                Value::Object(args)
            }
            Self::Email(options) => options.to_value(),
            Self::Uri(matcher) => matcher.options().to_value(),
            Self::Ip(matcher) => matcher.options().to_value(),
            _ => Value::Null,
        }
    }

    fn kind(&self) -> ErrorKind {
        match self {
            Self::Min(_) => ErrorKind::StringMin,
            Self::Max(_) => ErrorKind::StringMax,
            Self::Length(_) => ErrorKind::StringLength,
            Self::Regex { .. } => ErrorKind::StringRegexBase,
            Self::Email(_) => ErrorKind::StringEmail,
            Self::Uri(_) => ErrorKind::StringUri,
            Self::Ip(_) => ErrorKind::StringIp,
            Self::Hostname => ErrorKind::StringHostname,
            Self::IsoDate => ErrorKind::StringIsoDate,
            Self::Guid => ErrorKind::StringGuid,
            Self::Hex => ErrorKind::StringHex,
            Self::Alphanum => ErrorKind::StringAlphanum,
            Self::Token => ErrorKind::StringToken,
            Self::CreditCard => ErrorKind::StringCreditCard,
            Self::Lowercase => ErrorKind::StringLowercase,
            Self::Uppercase => ErrorKind::StringUppercase,
            Self::Trim => ErrorKind::StringTrim,
        }
    }

    /// Test `value`, reporting the violation when it fails.
    pub fn check(&self, value: &str, ctx: &RuleContext<'_>) -> Result<(), Violation> {
        let passed = match self {
            Self::Min(limit) => return limit.compare(value, ctx, self.kind(), |len, n| len >= n),
            Self::Max(limit) => return limit.compare(value, ctx, self.kind(), |len, n| len <= n),
            Self::Length(limit) => {
                return limit.compare(value, ctx, self.kind(), |len, n| len == n)
            }
            Self::Regex { pattern, name } => {
                if pattern.is_match(value) {
                    return Ok(());
                }
                let violation = match name {
                    Some(name) => {
                        Violation::new(ErrorKind::StringRegexName).with("name", name.as_str())
                    }
                    None => Violation::new(ErrorKind::StringRegexBase)
                        .with("pattern", pattern.to_string()),
                };
                return Err(violation.with("value", value));
            }
            Self::Uri(matcher) => {
                if matcher.is_match(value) {
                    return Ok(());
                }
                let violation = match matcher.scheme_display() {
                    Some(scheme) => {
                        Violation::new(ErrorKind::StringUriCustomScheme).with("scheme", scheme)
                    }
                    None => Violation::new(ErrorKind::StringUri),
                };
                return Err(violation.with("value", value));
            }
            Self::Ip(matcher) => {
                if matcher.is_match(value) {
                    return Ok(());
                }
                let options = matcher.options();
                let violation = match &options.version {
                    Some(versions) => {
                        let names: Vec<&str> = versions.iter().map(|v| v.name()).collect();
                        Violation::new(ErrorKind::StringIpVersion).with("version", names)
                    }
                    None => Violation::new(ErrorKind::StringIp),
                };
                return Err(violation
                    .with("cidr", options.cidr.name())
                    .with("value", value));
            }
            Self::Email(options) => email::is_email(value, options),
            Self::Hostname => hostname::is_hostname(value),
            Self::IsoDate => iso_date::is_iso_date(value),
            Self::Guid => guid::is_guid(value),
            Self::Hex => charset::is_hex(value),
            Self::Alphanum => charset::is_alphanum(value),
            Self::Token => charset::is_token(value),
            Self::CreditCard => luhn::is_valid(value),
            Self::Lowercase => ctx.convert || charset::is_lowercase(value),
            Self::Uppercase => ctx.convert || charset::is_uppercase(value),
            Self::Trim => ctx.convert || whitespace::is_trimmed(value),
        };
        if passed {
            Ok(())
        } else {
            Err(Violation::new(self.kind()).with("value", value))
        }
    }
}

fn malformed(rule: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::MalformedDescription(format!("{rule}: {reason}"))
}

/// Rule options default to an empty object when the description omits them.
fn options_or_empty(args: &Value) -> Value {
    if args.is_null() {
        Value::Object(Map::new())
    } else {
        args.clone()
    }
}

fn min_rule(args: &Value) -> Result<Rule, ConfigError> {
    LengthLimit::from_value(args).map(Rule::Min)
}

fn max_rule(args: &Value) -> Result<Rule, ConfigError> {
    LengthLimit::from_value(args).map(Rule::Max)
}

fn length_rule(args: &Value) -> Result<Rule, ConfigError> {
    LengthLimit::from_value(args).map(Rule::Length)
}

fn regex_rule(args: &Value) -> Result<Rule, ConfigError> {
    let pattern = args
        .get("pattern")
        .cloned()
        .ok_or_else(|| malformed("regex", "missing pattern"))?;
    let description: PatternDescription =
        serde_json::from_value(pattern).map_err(|e| malformed("regex", e))?;
    let name = args.get("name").and_then(Value::as_str).map(str::to_string);
    Rule::regex(&Pattern::from_description(&description)?, name)
}

fn email_rule(args: &Value) -> Result<Rule, ConfigError> {
    EmailOptions::from_value(&options_or_empty(args)).map(Rule::Email)
}

fn uri_rule(args: &Value) -> Result<Rule, ConfigError> {
    let options = UriOptions::from_value(&options_or_empty(args))?;
    UriMatcher::new(options).map(Rule::Uri)
}

fn ip_rule(args: &Value) -> Result<Rule, ConfigError> {
    let options = IpOptions::from_value(&options_or_empty(args))?;
    IpMatcher::new(options).map(Rule::Ip)
}

fn hostname_rule(_: &Value) -> Result<Rule, ConfigError> {
    Ok(Rule::Hostname)
}

fn iso_date_rule(_: &Value) -> Result<Rule, ConfigError> {
    Ok(Rule::IsoDate)
}

fn guid_rule(_: &Value) -> Result<Rule, ConfigError> {
    Ok(Rule::Guid)
}

fn hex_rule(_: &Value) -> Result<Rule, ConfigError> {
    Ok(Rule::Hex)
}

fn alphanum_rule(_: &Value) -> Result<Rule, ConfigError> {
    Ok(Rule::Alphanum)
}

fn token_rule(_: &Value) -> Result<Rule, ConfigError> {
    Ok(Rule::Token)
}

fn credit_card_rule(_: &Value) -> Result<Rule, ConfigError> {
    Ok(Rule::CreditCard)
}

fn lowercase_rule(_: &Value) -> Result<Rule, ConfigError> {
    Ok(Rule::Lowercase)
}

fn uppercase_rule(_: &Value) -> Result<Rule, ConfigError> {
    Ok(Rule::Uppercase)
}

fn trim_rule(_: &Value) -> Result<Rule, ConfigError> {
    Ok(Rule::Trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_refs() -> Map<String, Value> {
        Map::new()
    }

    fn ctx(context: &Map<String, Value>) -> RuleContext<'_> {
        RuleContext {
            parent: None,
            context,
            convert: true,
        }
    }

    #[test]
    fn test_limit_arguments_are_validated() {
        assert!(LimitArg::from(3).into_limit().is_ok());
        assert_eq!(
            LimitArg::from(-1).into_limit().unwrap_err(),
            ConfigError::InvalidLimit
        );
        assert_eq!(
            LimitArg::from(1.2).into_limit().unwrap_err(),
            ConfigError::InvalidLimit
        );
        assert_eq!(LimitArg::from(2.0).into_limit().unwrap(), Limit::Count(2));
    }

    #[test]
    fn test_length_counts_bytes_with_encoding() {
        let context = no_refs();
        let rule = Rule::Max(LengthLimit::new(1.into(), Some("utf8")).unwrap());
        let violation = rule.check("\u{bd}", &ctx(&context)).unwrap_err();
        assert_eq!(violation.kind, ErrorKind::StringMax);
        assert_eq!(violation.context["limit"], json!(1));
        assert_eq!(violation.context["encoding"], json!("utf8"));
        assert!(Rule::Max(LengthLimit::new(1.into(), None).unwrap())
            .check("\u{bd}", &ctx(&context))
            .is_ok());
    }

    #[test]
    fn test_reference_limit_not_a_number() {
        let context = match json!({"a": "x"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let limit = LimitArg::from(Reference::parse("$a").unwrap());
        let rule = Rule::Min(LengthLimit::new(limit, None).unwrap());
        let violation = rule.check("abc", &ctx(&context)).unwrap_err();
        assert_eq!(violation.kind, ErrorKind::ReferenceNotNumber);
        assert_eq!(violation.context["ref"], json!("a"));
    }

    #[test]
    fn test_case_and_trim_tests_pass_under_convert() {
        let context = no_refs();
        let strict = RuleContext {
            convert: false,
            ..ctx(&context)
        };
        assert!(Rule::Trim.check(" a", &ctx(&context)).is_ok());
        assert_eq!(
            Rule::Trim.check(" a", &strict).unwrap_err().kind,
            ErrorKind::StringTrim
        );
        assert!(Rule::Lowercase.check("ABC", &strict).is_err());
        assert!(Rule::Uppercase.check("ABC", &strict).is_ok());
    }

    #[test]
    fn test_regex_normalizes_flags() {
        let pattern = Pattern::new("^abc$", "gi").unwrap();
        let rule = Rule::regex(&pattern, None).unwrap();
        assert_eq!(
            rule.args(),
            json!({"pattern": {"source": "^abc$", "flags": "i"}})
        );
        let context = no_refs();
        assert!(rule.check("ABC", &ctx(&context)).is_ok());
        let violation = rule.check("abcd", &ctx(&context)).unwrap_err();
        assert_eq!(violation.context["pattern"], json!("/^abc$/i"));
    }

    #[test]
    fn test_registry_rebuilds_every_rule() {
        let limit = LengthLimit::new(Reference::parse("a.b").unwrap().into(), Some("hex")).unwrap();
        let rules = vec![
            Rule::Min(limit),
            Rule::regex(&Pattern::new("a+", "").unwrap(), Some("as".into())).unwrap(),
            Rule::Email(EmailOptions::default().min_domain_atoms(2)),
            Rule::Uri(UriMatcher::new(UriOptions::default().scheme(["http"])).unwrap()),
            Rule::Ip(IpMatcher::new(IpOptions::default()).unwrap()),
            Rule::IsoDate,
            Rule::Trim,
        ];
        for rule in rules {
            let factory = lookup(SchemaType::String, rule.name()).unwrap();
            assert_eq!(factory(&rule.args()).unwrap(), rule, "{}", rule.name());
        }
    }

    #[test]
    fn test_unknown_rule() {
        let err = lookup(SchemaType::String, "ssn").unwrap_err();
        assert_eq!(err.to_string(), "unknown rule 'ssn' for string schema");
        assert!(lookup(SchemaType::Number, "min").is_err());
    }
}
