//! Escaping for generated text
//!
//! Every generator in the crate goes through these helpers for YAML scalars,
//! frontmatter blocks, Markdown table cells and Python literals, so special
//! characters are handled the same way in every artifact.

use std::borrow::Cow;

const YAML_KEYWORDS: &[&str] = &["true", "false", "yes", "no", "on", "off", "null", "y", "n", "~"];

/// Characters that may not start a plain YAML scalar
const YAML_INDICATORS: &[char] = &[
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`',
];

/// Characters that force quoting anywhere in the value
const YAML_SPECIAL: &[char] = &[':', '#', '\'', '"', '[', ']', '{', '}', '\n', '\r', '\t'];

fn needs_yaml_quotes(value: &str) -> bool {
    if value.is_empty() || value.trim() != value {
        return true;
    }
    if value.starts_with(YAML_INDICATORS) || value.contains(YAML_SPECIAL) {
        return true;
    }
    if value.chars().any(char::is_control) {
        return true;
    }

    let lower = value.to_ascii_lowercase();
    if YAML_KEYWORDS.contains(&lower.as_str()) {
        return true;
    }

    // Would resolve to a number
    lower.parse::<f64>().is_ok()
        || lower.starts_with("0x")
        || lower.starts_with("0o")
        || lower.starts_with(".inf")
        || lower.starts_with(".nan")
}

/// Render a string as a YAML scalar, double-quoting it when needed
pub fn yaml_scalar(value: &str) -> Cow<'_, str> {
    if !needs_yaml_quotes(value) {
        return Cow::Borrowed(value);
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_control() => quoted.push_str(&format!("\\u{:04X}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

/// Builder for a `---` delimited YAML frontmatter block
#[derive(Debug, Default)]
pub struct Frontmatter {
    lines: Vec<String>,
}

impl Frontmatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `key: value`
    pub fn field(mut self, key: &str, value: &str) -> Self {
        self.lines.push(format!("{}: {}", key, yaml_scalar(value)));
        self
    }

    /// `key: value`, skipped when the value is absent or blank
    pub fn optional(self, key: &str, value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => self.field(key, v),
            None => self,
        }
    }

    /// Block sequence, or `key: []` when empty
    pub fn list<S: AsRef<str>>(mut self, key: &str, items: &[S]) -> Self {
        if items.is_empty() {
            self.lines.push(format!("{}: []", key));
            return self;
        }
        self.lines.push(format!("{}:", key));
        for item in items {
            self.lines.push(format!("  - {}", yaml_scalar(item.as_ref())));
        }
        self
    }

    /// Nested string map; entries with blank values are dropped
    pub fn map(mut self, key: &str, entries: &[(&str, Option<&str>)]) -> Self {
        let present: Vec<_> = entries
            .iter()
            .filter_map(|(k, v)| v.map(str::trim).filter(|v| !v.is_empty()).map(|v| (*k, v)))
            .collect();
        if present.is_empty() {
            return self;
        }
        self.lines.push(format!("{}:", key));
        for (k, v) in present {
            self.lines.push(format!("  {}: {}", yaml_scalar(k), yaml_scalar(v)));
        }
        self
    }

    /// The block including both delimiters and a trailing newline
    pub fn render(&self) -> String {
        format!("---\n{}\n---\n", self.lines.join("\n"))
    }
}

/// Escape text for a Markdown table cell
pub fn md_cell(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return "-".to_string();
    }
    value
        .replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}

/// Collapse text onto one line for list items and headings
pub fn md_inline(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Double-quoted Python string literal
pub fn python_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Text safe to place inside a `"""` docstring
pub fn python_docstring(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
