//! Recovering a JSON object from free-form model output.
//!
//! Models wrap the object in reasoning blocks and prose, and the object
//! itself is often slightly malformed or cut off by the token budget.
//! [`recover_json`] runs the cheap checks first and only falls back to
//! textual repairs, then to per-field extraction, when parsing fails.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

const THINK_OPEN: &str = "<think>";
const THINK_CLOSE: &str = "</think>";

lazy_static! {
    // A value that ends one line followed by a key, object or array on the next
    static ref MISSING_COMMA_RE: Regex =
        Regex::new(r#"("|\}|\]|\d|true|false|null)([ \t]*\r?\n\s*)(["\{\[])"#).unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryMethod {
    /// Parsed as returned, after stripping reasoning and surrounding prose
    Direct,
    /// Parsed after textual repairs
    Repaired,
    /// Rebuilt from individually extracted fields
    FieldFallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonRecovery {
    pub value: Value,
    pub method: RecoveryMethod,
}

/// Drop a leading `<think>...</think>` block
pub fn strip_think_block(text: &str) -> &str {
    let trimmed = text.trim_start();
    let Some(rest) = trimmed.strip_prefix(THINK_OPEN) else {
        return text.trim();
    };

    match rest.find(THINK_CLOSE) {
        Some(end) => rest[end + THINK_CLOSE.len()..].trim(),
        // Cut off while still reasoning
        None => rest.trim(),
    }
}

/// Span from the first `{` to the last `}`, or to the end when the object was truncated
pub fn slice_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    match text.rfind('}') {
        Some(end) if end > start => Some(&text[start..=end]),
        _ => Some(&text[start..]),
    }
}

/// Apply the textual repairs in order: missing commas, bare keys,
/// bracket balancing, trailing commas
pub fn repair_json(candidate: &str) -> String {
    let text = MISSING_COMMA_RE.replace_all(candidate, "$1,$2$3");
    let text = quote_bare_keys(&text);
    let text = balance_brackets(&text);
    drop_trailing_commas(&text)
}

/// Parse an object out of model output, repairing it if needed
pub fn extract_and_repair_json(text: &str) -> Option<Value> {
    recover_json(text, &[]).map(|recovery| recovery.value)
}

/// Like [`extract_and_repair_json`], falling back to pulling `required`
/// fields one by one. The fallback only succeeds when every required field
/// is found; an empty list disables it.
pub fn recover_json(text: &str, required: &[&str]) -> Option<JsonRecovery> {
    let body = strip_think_block(text);

    if let Some(value) = parse_object(body) {
        return Some(JsonRecovery {
            value,
            method: RecoveryMethod::Direct,
        });
    }

    if let Some(span) = slice_json_span(body) {
        if let Some(value) = parse_object(span) {
            return Some(JsonRecovery {
                value,
                method: RecoveryMethod::Direct,
            });
        }

        let repaired = repair_json(span);
        if let Some(value) = parse_object(&repaired) {
            tracing::debug!("JSON recovered after repair ({} chars)", repaired.len());
            return Some(JsonRecovery {
                value,
                method: RecoveryMethod::Repaired,
            });
        }
    }

    if required.is_empty() {
        return None;
    }

    let fields = extract_fields(body, required);
    if fields.len() == required.len() {
        tracing::debug!("JSON rebuilt from fields: {:?}", required);
        return Some(JsonRecovery {
            value: Value::Object(fields),
            method: RecoveryMethod::FieldFallback,
        });
    }

    None
}

/// Pull `"field": "..."` or `"field": 12` values straight out of the text
pub fn extract_fields(text: &str, fields: &[&str]) -> Map<String, Value> {
    let mut found = Map::new();

    for field in fields {
        let name = regex::escape(field);
        let Ok(string_re) = Regex::new(&format!(r#""{name}"\s*:\s*"((?:[^"\\]|\\.)*)""#)) else {
            continue;
        };
        let Ok(number_re) = Regex::new(&format!(r#""{name}"\s*:\s*(-?\d+(?:\.\d+)?)"#)) else {
            continue;
        };

        if let Some(raw) = string_re.captures(text).and_then(|c| c.get(1)) {
            let raw = raw.as_str();
            let value = serde_json::from_str::<String>(&format!("\"{raw}\""))
                .unwrap_or_else(|_| raw.to_string());
            found.insert(field.to_string(), Value::String(value));
        } else if let Some(raw) = number_re.captures(text).and_then(|c| c.get(1)) {
            if let Ok(value) = serde_json::from_str::<Value>(raw.as_str()) {
                found.insert(field.to_string(), value);
            }
        }
    }

    found
}

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text.trim())
        .ok()
        .filter(Value::is_object)
}

/// Quote identifiers used as object keys, leaving string contents alone
fn quote_bare_keys(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut in_string = false;
    let mut escaped = false;
    let mut last_significant: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
                last_significant = Some(c);
            }
            i += 1;
            continue;
        }

        if (c.is_ascii_alphabetic() || c == '_') && matches!(last_significant, Some('{' | ',')) {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let ident: String = chars[start..i].iter().collect();

            let next = chars[i..].iter().find(|ch| !ch.is_whitespace());
            if next == Some(&':') {
                out.push('"');
                out.push_str(&ident);
                out.push('"');
            } else {
                out.push_str(&ident);
            }
            last_significant = ident.chars().last();
            continue;
        }

        if c == '"' {
            in_string = true;
        } else if !c.is_whitespace() {
            last_significant = Some(c);
        }
        out.push(c);
        i += 1;
    }

    out
}

/// Remove commas directly before a closing `}` or `]`, outside string literals
fn drop_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if c == ',' && text[i + 1..].trim_start().starts_with(['}', ']']) {
            continue;
        }
        out.push(c);
    }

    out
}

/// Close what the text leaves open and drop closers with no opener.
///
/// Works outside string literals only. A string still open at the end is
/// closed; a dangling key gets a `null` value so the object stays valid.
fn balance_brackets(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut string_is_key = false;
    let mut pending_key = false;
    let mut last_significant: Option<char> = None;

    for c in text.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
                pending_key = string_is_key;
                last_significant = Some(c);
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                string_is_key =
                    stack.last() == Some(&'{') && matches!(last_significant, Some('{' | ','));
                out.push(c);
            }
            '{' | '[' => {
                stack.push(c);
                out.push(c);
                last_significant = Some(c);
            }
            '}' | ']' => {
                let opener = if c == '}' { '{' } else { '[' };
                if stack.last() == Some(&opener) {
                    stack.pop();
                    out.push(c);
                    last_significant = Some(c);
                    pending_key = false;
                }
            }
            _ => {
                if !c.is_whitespace() {
                    last_significant = Some(c);
                    pending_key = false;
                }
                out.push(c);
            }
        }
    }

    if stack.is_empty() && !in_string {
        return out;
    }

    if in_string {
        if escaped {
            out.pop();
        }
        out.push('"');
        pending_key = string_is_key;
    }

    out.truncate(out.trim_end().len());
    if out.ends_with(',') {
        out.pop();
    }

    if pending_key && out.ends_with('"') {
        out.push_str(": null");
    } else if out.ends_with(':') {
        out.push_str(" null");
    }

    while let Some(open) = stack.pop() {
        out.push(if open == '{' { '}' } else { ']' });
    }

    out
}
