//! Minimal template renderer for message content and context expressions.
//!
//! Substitution only — deliberately minimal:
//! - Placeholders: `{{ path.to.field }}`, resolved as a dotted path against
//!   a JSON view of the session
//! - Missing paths render as the empty string
//! - Values flatten to their text form (strings unquoted, numbers and bools
//!   via `to_string`, anything else as compact JSON)
//!
//! **Explicitly NOT supported**: conditionals, loops, helpers, or any other
//! logic. Rendering is a pure function of (template, data).

use serde_json::Value;

/// Render `template` against `data`, substituting `{{ ... }}` placeholders.
pub fn render(template: &str, data: &Value) -> String {
    let chars: Vec<char> = template.chars().collect();
    let mut out = String::with_capacity(template.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '{' && chars.get(i + 1) == Some(&'{') {
            if let Some(close) = find_close(&chars, i + 2) {
                let path: String = chars[i + 2..close].iter().collect();
                out.push_str(&lookup(data, path.trim()));
                i = close + 2;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Index of the next `}}`, starting at `from`.
fn find_close(chars: &[char], from: usize) -> Option<usize> {
    let mut i = from;
    while i + 1 < chars.len() {
        if chars[i] == '}' && chars[i + 1] == '}' {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Resolve a dotted field path and flatten the result to text.
fn lookup(data: &Value, path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    let mut current = data;
    for segment in path.split('.') {
        match current.get(segment) {
            Some(value) => current = value,
            None => return String::new(),
        }
    }
    match current {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
