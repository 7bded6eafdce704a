//! # Email Address Diagnosis
//!
//! Parses an address into local part and domain and reports the most severe
//! diagnosis found as a numeric [`Diagnosis`] code. Codes below
//! [`Diagnosis::ERROR_THRESHOLD`] are warnings: the address is deliverable
//! but unusual (quoted local part, single-label domain, address literal).
//! Codes at or above it are errors.
//!
//! Supported syntax: dot-atom and quoted-string local parts, LDH domains and
//! bracketed domain literals. Comments and folding whitespace are rejected.

use std::collections::BTreeSet;
use std::net::{Ipv4Addr, Ipv6Addr};

use serde_json::{json, Map, Value};
use vouch_core::ConfigError;

/// Diagnosis codes, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum Diagnosis {
    Valid = 0,
    /// The domain has a single label.
    Rfc5321Tld = 9,
    /// The top-level domain starts with a digit.
    Rfc5321TldNumeric = 10,
    Rfc5321QuotedString = 11,
    Rfc5321AddressLiteral = 12,
    /// The domain contains characters outside letter-digit-hyphen.
    Rfc5322Domain = 65,
    Rfc5322TooLong = 66,
    Rfc5322LocalTooLong = 67,
    Rfc5322DomainTooLong = 68,
    Rfc5322LabelTooLong = 69,
    Rfc5322DomainLiteral = 70,
    ExpectingDtext = 129,
    NoLocalPart = 130,
    NoDomain = 131,
    ConsecutiveDots = 132,
    AtextAfterQs = 134,
    AtextAfterDomainLiteral = 135,
    ExpectingQpair = 136,
    ExpectingAtext = 137,
    ExpectingQtext = 138,
    BackslashEnd = 140,
    DotStart = 141,
    DotEnd = 142,
    DomainHyphenStart = 143,
    DomainHyphenEnd = 144,
    UnclosedQuotedString = 145,
    UnclosedDomainLiteral = 147,
    UnknownTld = 160,
    DomainTooShort = 161,
}

impl Diagnosis {
    /// First error code; everything below is a warning.
    pub const ERROR_THRESHOLD: u32 = 16;

    pub fn code(self) -> u32 {
        self as u32
    }
}

const MAX_ADDRESS: usize = 254;
const MAX_LOCAL: usize = 64;
const MAX_DOMAIN: usize = 255;
const MAX_LABEL: usize = 63;

/// How strictly warnings are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorLevel {
    /// `true` accepts only a clean diagnosis; `false` keeps the default.
    Strict(bool),
    /// Codes below the threshold count as clean.
    Threshold(u32),
}

/// Options of the `email` rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailOptions {
    /// Accepted top-level domains, lowercase.
    pub tld_whitelist: Option<BTreeSet<String>>,
    /// Minimum number of domain labels.
    pub min_domain_atoms: Option<u32>,
    pub error_level: Option<ErrorLevel>,
    /// DNS lookups are never performed; `true` is rejected at construction.
    pub check_dns: bool,
}

impl EmailOptions {
    pub fn tld_whitelist<I, S>(mut self, tlds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tld_whitelist = Some(tlds.into_iter().map(|t| t.as_ref().to_lowercase()).collect());
        self
    }

    pub fn min_domain_atoms(mut self, atoms: u32) -> Self {
        self.min_domain_atoms = Some(atoms);
        self
    }

    pub fn error_level(mut self, level: ErrorLevel) -> Self {
        self.error_level = Some(level);
        self
    }

    /// Reject option combinations the rule cannot honor.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.check_dns {
            return Err(ConfigError::CheckDnsUnsupported);
        }
        if self.min_domain_atoms == Some(0) {
            return Err(ConfigError::MinDomainAtoms);
        }
        Ok(())
    }

    /// Parse the plain-data form, e.g. `{"tldWhitelist": ["com"], "errorLevel": true}`.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let options = value.as_object().ok_or(ConfigError::EmailOptionsShape)?;
        let mut parsed = Self::default();

        if truthy(options.get("checkDNS")) {
            return Err(ConfigError::CheckDnsUnsupported);
        }

        match options.get("tldWhitelist") {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                parsed = parsed.tld_whitelist(items.iter().filter_map(Value::as_str));
            }
            Some(Value::Object(map)) => {
                parsed = parsed.tld_whitelist(map.keys());
            }
            Some(_) => return Err(ConfigError::TldWhitelistShape),
        }

        match options.get("minDomainAtoms") {
            None | Some(Value::Null) => {}
            Some(value) => {
                let atoms = value
                    .as_u64()
                    .filter(|n| *n > 0)
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or(ConfigError::MinDomainAtoms)?;
                parsed.min_domain_atoms = Some(atoms);
            }
        }

        match options.get("errorLevel") {
            None | Some(Value::Null) => {}
            Some(Value::Bool(strict)) => parsed.error_level = Some(ErrorLevel::Strict(*strict)),
            Some(value) => {
                let level = value
                    .as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or(ConfigError::ErrorLevel)?;
                parsed.error_level = Some(ErrorLevel::Threshold(level));
            }
        }

        parsed.check()?;
        Ok(parsed)
    }

    pub fn to_value(&self) -> Value {
        let mut options = Map::new();
        if let Some(tlds) = &self.tld_whitelist {
            options.insert("tldWhitelist".into(), json!(tlds));
        }
        if let Some(atoms) = self.min_domain_atoms {
            options.insert("minDomainAtoms".into(), json!(atoms));
        }
        match self.error_level {
            Some(ErrorLevel::Strict(strict)) => {
                options.insert("errorLevel".into(), json!(strict));
            }
            Some(ErrorLevel::Threshold(level)) => {
                options.insert("errorLevel".into(), json!(level));
            }
            None => {}
        }
        Value::Object(options)
    }

    /// Whether a diagnosis code is acceptable under these options.
    pub fn accepts(&self, code: u32) -> bool {
        match self.error_level {
            Some(ErrorLevel::Strict(true)) => code == 0,
            Some(ErrorLevel::Threshold(level)) if level > 0 => code < level,
            _ => code < Diagnosis::ERROR_THRESHOLD,
        }
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// True when `address` is valid under `options`.
pub fn is_email(address: &str, options: &EmailOptions) -> bool {
    options.accepts(diagnose(address, options).code())
}

/// Most severe diagnosis for `address`.
pub fn diagnose(address: &str, options: &EmailOptions) -> Diagnosis {
    let (local, domain) = match parse_local(address) {
        Ok(parts) => parts,
        Err(error) => return error,
    };
    let mut worst = local.diagnosis;
    if local.text.len() > MAX_LOCAL {
        worst = worst.max(Diagnosis::Rfc5322LocalTooLong);
    }

    if domain.is_empty() {
        return Diagnosis::NoDomain;
    }
    let domain_diagnosis = if domain.starts_with('[') {
        diagnose_literal(domain)
    } else {
        diagnose_domain(domain, options)
    };
    worst = worst.max(domain_diagnosis);

    if address.len() > MAX_ADDRESS {
        worst = worst.max(Diagnosis::Rfc5322TooLong);
    }
    worst
}

struct LocalPart<'a> {
    text: &'a str,
    diagnosis: Diagnosis,
}

fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~".contains(c)
}

fn is_qtext(c: char) -> bool {
    matches!(c, ' ' | '!' | '#'..='[' | ']'..='~')
}

/// Split at the `@` that ends the local part, diagnosing the local part.
fn parse_local(address: &str) -> Result<(LocalPart<'_>, &str), Diagnosis> {
    let mut chars = address.char_indices().peekable();
    let mut diagnosis = Diagnosis::Valid;
    let mut element_len = 0usize;
    let mut previous_dot = false;

    while let Some((index, c)) = chars.next() {
        match c {
            '@' => {
                if index == 0 {
                    return Err(Diagnosis::NoLocalPart);
                }
                if previous_dot {
                    return Err(Diagnosis::DotEnd);
                }
                let local = LocalPart {
                    text: &address[..index],
                    diagnosis,
                };
                return Ok((local, &address[index + 1..]));
            }
            '.' => {
                if element_len == 0 {
                    return Err(if index == 0 {
                        Diagnosis::DotStart
                    } else {
                        Diagnosis::ConsecutiveDots
                    });
                }
                element_len = 0;
                previous_dot = true;
            }
            '"' if element_len == 0 => {
                diagnosis = diagnosis.max(Diagnosis::Rfc5321QuotedString);
                let mut closed = false;
                while let Some((_, q)) = chars.next() {
                    match q {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some((_, escaped)) if (' '..='~').contains(&escaped) => {}
                            Some(_) => return Err(Diagnosis::ExpectingQpair),
                            None => return Err(Diagnosis::BackslashEnd),
                        },
                        q if is_qtext(q) => {}
                        _ => return Err(Diagnosis::ExpectingQtext),
                    }
                }
                if !closed {
                    return Err(Diagnosis::UnclosedQuotedString);
                }
                match chars.peek() {
                    Some((_, '.' | '@')) | None => {}
                    Some(_) => return Err(Diagnosis::AtextAfterQs),
                }
                element_len = 1;
                previous_dot = false;
            }
            c if is_atext(c) => {
                element_len += 1;
                previous_dot = false;
            }
            _ => return Err(Diagnosis::ExpectingAtext),
        }
    }
    if address.is_empty() {
        return Err(Diagnosis::NoLocalPart);
    }
    Err(Diagnosis::NoDomain)
}

fn diagnose_literal(domain: &str) -> Diagnosis {
    let Some(inner) = domain.strip_prefix('[') else {
        return Diagnosis::ExpectingAtext;
    };
    let Some(close) = inner.find(']') else {
        return Diagnosis::UnclosedDomainLiteral;
    };
    if close + 1 != inner.len() {
        return Diagnosis::AtextAfterDomainLiteral;
    }
    let body = &inner[..close];
    if !body.chars().all(|c| matches!(c, '!'..='Z' | '^'..='~')) {
        return Diagnosis::ExpectingDtext;
    }
    let is_address = match body.strip_prefix("IPv6:") {
        Some(v6) => v6.parse::<Ipv6Addr>().is_ok(),
        None => body.parse::<Ipv4Addr>().is_ok(),
    };
    if is_address {
        Diagnosis::Rfc5321AddressLiteral
    } else {
        Diagnosis::Rfc5322DomainLiteral
    }
}

fn diagnose_domain(domain: &str, options: &EmailOptions) -> Diagnosis {
    let mut worst = Diagnosis::Valid;
    let labels: Vec<&str> = domain.split('.').collect();
    let last = labels.len() - 1;

    for (index, label) in labels.iter().enumerate() {
        if label.is_empty() {
            return if index == 0 {
                Diagnosis::DotStart
            } else if index == last {
                Diagnosis::DotEnd
            } else {
                Diagnosis::ConsecutiveDots
            };
        }
        if let Some(bad) = label.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '-') {
            if !is_atext(bad) {
                return Diagnosis::ExpectingAtext;
            }
            worst = worst.max(Diagnosis::Rfc5322Domain);
        }
        if label.starts_with('-') {
            return Diagnosis::DomainHyphenStart;
        }
        if label.ends_with('-') {
            return Diagnosis::DomainHyphenEnd;
        }
        if label.len() > MAX_LABEL {
            worst = worst.max(Diagnosis::Rfc5322LabelTooLong);
        }
    }

    if domain.len() > MAX_DOMAIN {
        worst = worst.max(Diagnosis::Rfc5322DomainTooLong);
    }

    let tld = labels[last];
    if labels.len() == 1 {
        worst = worst.max(Diagnosis::Rfc5321Tld);
    }
    if tld.starts_with(|c: char| c.is_ascii_digit()) {
        worst = worst.max(Diagnosis::Rfc5321TldNumeric);
    }
    if let Some(whitelist) = &options.tld_whitelist {
        if !whitelist.contains(&tld.to_lowercase()) {
            worst = worst.max(Diagnosis::UnknownTld);
        }
    }
    if let Some(min) = options.min_domain_atoms {
        if labels.len() < min as usize {
            worst = worst.max(Diagnosis::DomainTooShort);
        }
    }
    worst
}
