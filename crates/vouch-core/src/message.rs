//! # Message Templates
//!
//! Templates interpolate `{{name}}` from a context map. `{{!name}}` marks a
//! value for HTML escaping, used wherever user input is echoed back (the
//! field label, a rejected value).
//!
//! Interpolation follows a fixed stringification: strings verbatim, arrays
//! as `[a, b]`, `null` as `null`, integral numbers without a fraction.

use serde_json::Value;

use crate::report::Context;

/// Characters passed through [`escape_html`] unchanged besides ASCII
/// alphanumerics.
const SAFE_PUNCTUATION: &[char] = &[' ', '.', ',', '-', ':', '_'];

/// Escape a string for safe inclusion in HTML.
///
/// Named entities are used for the common markup characters; everything else
/// outside the safe set becomes a numeric reference, one per UTF-16 unit.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() || SAFE_PUNCTUATION.contains(&ch) {
            out.push(ch);
            continue;
        }
        let mut units = [0u16; 2];
        for unit in ch.encode_utf16(&mut units) {
            push_escaped_unit(&mut out, *unit);
        }
    }
    out
}

fn push_escaped_unit(out: &mut String, unit: u16) {
    let named = match unit {
        0x26 => Some("&amp;"),
        0x3c => Some("&lt;"),
        0x3e => Some("&gt;"),
        0x22 => Some("&quot;"),
        0xa0 => Some("&nbsp;"),
        0xa2 => Some("&cent;"),
        0xa3 => Some("&pound;"),
        0xa4 => Some("&curren;"),
        0xa9 => Some("&copy;"),
        0xae => Some("&reg;"),
        _ => None,
    };
    match named {
        Some(entity) => out.push_str(entity),
        None if unit >= 256 => out.push_str(&format!("&#{unit};")),
        None => out.push_str(&format!("&#x{unit:02x};")),
    }
}

/// Render a context value the way messages display it.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(stringify).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(_) => value.to_string(),
    }
}

/// Interpolate `template` from `context`.
///
/// Unknown names render as an empty string.
pub fn render(template: &str, context: &Context) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let token = &after[..end];
        let (escape, name) = match token.strip_prefix('!') {
            Some(name) => (true, name),
            None => (false, token),
        };
        let text = context.get(name).map(stringify).unwrap_or_default();
        if escape {
            out.push_str(&escape_html(&text));
        } else {
            out.push_str(&text);
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}
