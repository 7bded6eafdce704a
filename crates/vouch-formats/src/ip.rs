//! # IP Address Matching
//!
//! Matches IPv4, IPv6 and IPvFuture addresses, each with a CIDR suffix that
//! is required, optional or forbidden. The set of families may be narrowed;
//! the failure message then names them.

use std::fmt;

use regex::Regex;
use serde_json::{json, Map, Value};
use vouch_core::ConfigError;

use crate::rfc3986;

/// How a `/prefix` suffix is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CidrMode {
    Required,
    #[default]
    Optional,
    Forbidden,
}

impl CidrMode {
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name.to_lowercase().as_str() {
            "required" => Ok(Self::Required),
            "optional" => Ok(Self::Optional),
            "forbidden" => Ok(Self::Forbidden),
            _ => Err(ConfigError::CidrMode),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Optional => "optional",
            Self::Forbidden => "forbidden",
        }
    }

    fn suffix(self) -> String {
        match self {
            Self::Required => format!("/{}", rfc3986::CIDR),
            Self::Optional => format!("(?:/{})?", rfc3986::CIDR),
            Self::Forbidden => String::new(),
        }
    }
}

impl fmt::Display for CidrMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpVersion {
    Ipv4,
    Ipv6,
    IpvFuture,
}

impl IpVersion {
    pub const ALL: [IpVersion; 3] = [Self::Ipv4, Self::Ipv6, Self::IpvFuture];

    /// Case-insensitive family name lookup.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "ipv4" => Some(Self::Ipv4),
            "ipv6" => Some(Self::Ipv6),
            "ipvfuture" => Some(Self::IpvFuture),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::IpvFuture => "ipvfuture",
        }
    }

    fn grammar(self) -> String {
        match self {
            Self::Ipv4 => rfc3986::ipv4_address(),
            Self::Ipv6 => rfc3986::ipv6_address(),
            Self::IpvFuture => rfc3986::ipv_future(),
        }
    }
}

/// Options of the `ip` rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpOptions {
    pub cidr: CidrMode,
    /// Allowed families, de-duplicated in order. `None` allows all three.
    pub version: Option<Vec<IpVersion>>,
}

impl IpOptions {
    pub fn cidr(mut self, cidr: CidrMode) -> Self {
        self.cidr = cidr;
        self
    }

    pub fn versions(mut self, versions: impl IntoIterator<Item = IpVersion>) -> Self {
        let mut unique = Vec::new();
        for version in versions {
            if !unique.contains(&version) {
                unique.push(version);
            }
        }
        self.version = Some(unique);
        self
    }

    /// Parse the plain-data form: `{"cidr": "required", "version": ["ipv4"]}`.
    ///
    /// A single version may be given as a bare string.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let options = value.as_object().ok_or(ConfigError::OptionsShape)?;
        let mut parsed = Self::default();

        match options.get("cidr") {
            None | Some(Value::Null) | Some(Value::Bool(false)) => {}
            Some(Value::String(mode)) => parsed.cidr = CidrMode::parse(mode)?,
            Some(_) => return Err(ConfigError::CidrShape),
        }

        if let Some(version) = options.get("version") {
            let entries = match version {
                Value::Array(items) => items.clone(),
                single => vec![single.clone()],
            };
            if entries.is_empty() {
                return Err(ConfigError::VersionEmpty);
            }
            let mut versions = Vec::with_capacity(entries.len());
            for (position, entry) in entries.iter().enumerate() {
                let name = entry
                    .as_str()
                    .ok_or(ConfigError::VersionShape { position })?;
                versions.push(IpVersion::parse(name).ok_or(ConfigError::VersionUnknown { position })?);
            }
            parsed = parsed.versions(versions);
        }
        Ok(parsed)
    }

    pub fn to_value(&self) -> Value {
        let mut options = Map::new();
        options.insert("cidr".into(), json!(self.cidr.name()));
        if let Some(versions) = &self.version {
            let names: Vec<&str> = versions.iter().map(|v| v.name()).collect();
            options.insert("version".into(), json!(names));
        }
        Value::Object(options)
    }
}

/// Compiled matcher for one [`IpOptions`].
#[derive(Debug, Clone)]
pub struct IpMatcher {
    options: IpOptions,
    regex: Regex,
}

impl IpMatcher {
    pub fn new(options: IpOptions) -> Result<Self, ConfigError> {
        let families = options
            .version
            .clone()
            .unwrap_or_else(|| IpVersion::ALL.to_vec());
        if families.is_empty() {
            return Err(ConfigError::VersionEmpty);
        }
        let suffix = options.cidr.suffix();
        let alternatives: Vec<String> = families
            .iter()
            .map(|family| format!("{}{suffix}", family.grammar()))
            .collect();
        let source = format!("^(?:{})$", alternatives.join("|"));
        let regex = Regex::new(&source).map_err(|e| ConfigError::InvalidPattern {
            pattern: source.clone(),
            flags: String::new(),
            reason: e.to_string(),
        })?;
        tracing::debug!(
            cidr = %options.cidr,
            families = families.len(),
            "compiled ip matcher"
        );
        Ok(Self { options, regex })
    }

    pub fn options(&self) -> &IpOptions {
        &self.options
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for IpMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.options == other.options
    }
}
