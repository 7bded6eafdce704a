//! # String Schema
//!
//! Rule factories of the string type and the conversion step that runs
//! before its tests. Factories that take options validate them here and
//! return a [`ConfigError`]; the resulting rule can no longer fail to
//! evaluate.
//!
//! Conversion order: case folding, trimming, replacements in definition
//! order, then truncation to the first `max` limit when `truncate` is on.

use vouch_core::ConfigError;
use vouch_formats::{encoding, whitespace};
use vouch_formats::{EmailOptions, IpMatcher, IpOptions, Pattern, UriMatcher, UriOptions};

use crate::flags::Case;
use crate::rules::{LengthLimit, LimitArg, Rule, RuleContext};
use crate::schema::{Replacement, Schema, SchemaBuilder, SchemaNode, SchemaType};

/// Builder for string schemas.
#[derive(Debug, Clone, PartialEq)]
pub struct StringSchema {
    schema: Schema,
}

impl StringSchema {
    pub fn new() -> Self {
        Self {
            schema: Schema::new(SchemaType::String),
        }
    }

    fn test(mut self, rule: Rule) -> Self {
        self.schema.node_mut().tests.push(rule);
        self
    }

    /// At least `limit` code points.
    pub fn min(self, limit: impl Into<LimitArg>) -> Result<Self, ConfigError> {
        Ok(self.test(Rule::Min(LengthLimit::new(limit.into(), None)?)))
    }

    /// At least `limit` bytes in `encoding`.
    pub fn min_bytes(
        self,
        limit: impl Into<LimitArg>,
        encoding: &str,
    ) -> Result<Self, ConfigError> {
        Ok(self.test(Rule::Min(LengthLimit::new(limit.into(), Some(encoding))?)))
    }

    /// At most `limit` code points; also the truncation target.
    pub fn max(self, limit: impl Into<LimitArg>) -> Result<Self, ConfigError> {
        Ok(self.test(Rule::Max(LengthLimit::new(limit.into(), None)?)))
    }

    pub fn max_bytes(
        self,
        limit: impl Into<LimitArg>,
        encoding: &str,
    ) -> Result<Self, ConfigError> {
        Ok(self.test(Rule::Max(LengthLimit::new(limit.into(), Some(encoding))?)))
    }

    /// Exactly `limit` code points.
    pub fn length(self, limit: impl Into<LimitArg>) -> Result<Self, ConfigError> {
        Ok(self.test(Rule::Length(LengthLimit::new(limit.into(), None)?)))
    }

    pub fn length_bytes(
        self,
        limit: impl Into<LimitArg>,
        encoding: &str,
    ) -> Result<Self, ConfigError> {
        Ok(self.test(Rule::Length(LengthLimit::new(
            limit.into(),
            Some(encoding),
        )?)))
    }

    /// Must match `pattern`. Only its `i` flag is kept.
    pub fn regex(self, pattern: &Pattern) -> Result<Self, ConfigError> {
        Ok(self.test(Rule::regex(pattern, None)?))
    }

    /// As [`regex`](Self::regex), naming the pattern in the failure message.
    pub fn regex_named(self, pattern: &Pattern, name: &str) -> Result<Self, ConfigError> {
        Ok(self.test(Rule::regex(pattern, Some(name.to_string()))?))
    }

    pub fn email(self, options: EmailOptions) -> Result<Self, ConfigError> {
        options.check()?;
        Ok(self.test(Rule::Email(options)))
    }

    pub fn uri(self, options: UriOptions) -> Result<Self, ConfigError> {
        Ok(self.test(Rule::Uri(UriMatcher::new(options)?)))
    }

    pub fn ip(self, options: IpOptions) -> Result<Self, ConfigError> {
        Ok(self.test(Rule::Ip(IpMatcher::new(options)?)))
    }

    pub fn hostname(self) -> Self {
        self.test(Rule::Hostname)
    }

    pub fn iso_date(self) -> Self {
        self.test(Rule::IsoDate)
    }

    pub fn guid(self) -> Self {
        self.test(Rule::Guid)
    }

    pub fn hex(self) -> Self {
        self.test(Rule::Hex)
    }

    pub fn alphanum(self) -> Self {
        self.test(Rule::Alphanum)
    }

    pub fn token(self) -> Self {
        self.test(Rule::Token)
    }

    /// Digits passing the Luhn checksum.
    pub fn credit_card(self) -> Self {
        self.test(Rule::CreditCard)
    }

    /// Fold to lowercase when converting; otherwise require lowercase.
    pub fn lowercase(mut self) -> Self {
        self.schema.node_mut().flags.case = Some(Case::Lower);
        self.test(Rule::Lowercase)
    }

    pub fn uppercase(mut self) -> Self {
        self.schema.node_mut().flags.case = Some(Case::Upper);
        self.test(Rule::Uppercase)
    }

    /// Strip surrounding whitespace when converting; otherwise reject it.
    pub fn trim(mut self) -> Self {
        self.schema.node_mut().flags.trim = true;
        self.test(Rule::Trim)
    }

    /// Compare literal sets case-insensitively.
    pub fn insensitive(mut self) -> Self {
        self.schema.node_mut().flags.insensitive = true;
        self
    }

    /// Cut values down to the first `max` limit when converting.
    pub fn truncate(mut self, enabled: bool) -> Self {
        self.schema.node_mut().flags.truncate = Some(enabled);
        self
    }

    /// Replace matches of `pattern` when converting; every match if global.
    pub fn replace(mut self, pattern: &Pattern, replacement: &str) -> Self {
        self.schema.node_mut().replacements.push(Replacement {
            pattern: pattern.clone(),
            replacement: replacement.to_string(),
        });
        self
    }

    /// Replace every occurrence of `text`.
    pub fn replace_text(self, text: &str, replacement: &str) -> Result<Self, ConfigError> {
        let pattern = Pattern::literal(text)?;
        Ok(self.replace(&pattern, replacement))
    }
}

impl Default for StringSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaBuilder for StringSchema {
    fn as_schema(&self) -> &Schema {
        &self.schema
    }

    fn as_schema_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }
}

impl From<StringSchema> for Schema {
    fn from(string: StringSchema) -> Self {
        string.schema
    }
}

/// Apply the conversions configured on `node` to `value`.
pub(crate) fn convert(node: &SchemaNode, value: &str, ctx: &RuleContext<'_>) -> String {
    let mut value = match node.flags.case {
        Some(Case::Lower) => value.to_lowercase(),
        Some(Case::Upper) => value.to_uppercase(),
        None => value.to_string(),
    };
    if node.flags.trim {
        value = whitespace::trim(&value).to_string();
    }
    for replacement in &node.replacements {
        value = replacement
            .pattern
            .replace(&value, &replacement.replacement);
    }
    if node.flags.truncates() {
        let max = node.tests.iter().find_map(|rule| match rule {
            Rule::Max(limit) => Some(limit),
            _ => None,
        });
        // An unresolvable reference leaves the value for the max test to reject.
        if let Some(limit) = max {
            if let Some(count) = limit.resolve(ctx) {
                value = encoding::truncate(&value, count, limit.encoding).to_string();
            }
        }
    }
    value
}
