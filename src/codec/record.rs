//! Minimal structured-record (de)serializer for the envelope bodies.
//!
//! Records are written with a fixed field order and JSON string escaping,
//! in one of two layouts: compact (`{"a":"gzip","d":"..."}`) or pretty
//! (two-space indent, `"key": value`, one field per line).
//!
//! Reading is deliberately permissive: a field is located by its quoted key
//! followed by optional whitespace and a colon, anywhere in the text, and
//! the first such occurrence wins. Nesting is ignored. Because string
//! values are escaped on write, a quoted key can never be forged from
//! inside a value.

use std::fmt::Write as _;

use crate::error::{Result, SqzError};

/// Output layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// No whitespace: `{"k":"v","n":1}`
    Compact,
    /// Two-space indent, one field per line
    Pretty,
}

/// A field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Escaped string
    Str(String),
    /// Unsigned integer
    Uint(u64),
    /// Signed integer
    Int(i64),
    /// Boolean
    Bool(bool),
    /// Nested record
    Record(Record),
}

/// An ordered list of fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(&'static str, Value)>,
}

impl Record {
    /// Empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a string field
    pub fn str(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.fields.push((key, Value::Str(value.into())));
        self
    }

    /// Append an unsigned integer field
    pub fn uint(mut self, key: &'static str, value: u64) -> Self {
        self.fields.push((key, Value::Uint(value)));
        self
    }

    /// Append a signed integer field
    pub fn int(mut self, key: &'static str, value: i64) -> Self {
        self.fields.push((key, Value::Int(value)));
        self
    }

    /// Append a boolean field
    pub fn bool(mut self, key: &'static str, value: bool) -> Self {
        self.fields.push((key, Value::Bool(value)));
        self
    }

    /// Append a nested record
    pub fn record(mut self, key: &'static str, value: Record) -> Self {
        self.fields.push((key, Value::Record(value)));
        self
    }

    /// Render in the given layout
    pub fn render(&self, layout: Layout) -> String {
        let mut out = String::new();
        self.write(&mut out, layout, 0);
        out
    }

    fn write(&self, out: &mut String, layout: Layout, depth: usize) {
        out.push('{');
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            if layout == Layout::Pretty {
                out.push('\n');
                push_indent(out, depth + 1);
            }
            write_string(out, key);
            out.push(':');
            if layout == Layout::Pretty {
                out.push(' ');
            }
            match value {
                Value::Str(s) => write_string(out, s),
                Value::Uint(n) => {
                    let _ = write!(out, "{n}");
                },
                Value::Int(n) => {
                    let _ = write!(out, "{n}");
                },
                Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
                Value::Record(r) => r.write(out, layout, depth + 1),
            }
        }
        if layout == Layout::Pretty && !self.fields.is_empty() {
            out.push('\n');
            push_indent(out, depth);
        }
        out.push('}');
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

/// Write `s` as a quoted, escaped string
pub fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            },
            c => out.push(c),
        }
    }
    out.push('"');
}

/// A raw field value located by [`find_field`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<'a> {
    /// Unescaped string value
    Str(String),
    /// Unquoted token (number, boolean, ...)
    Bare(&'a str),
}

impl Field<'_> {
    /// String content, or the bare token as text
    pub fn into_string(self) -> String {
        match self {
            Field::Str(s) => s,
            Field::Bare(s) => s.to_string(),
        }
    }
}

/// Locate the first `"key": value` in `text`.
///
/// Returns `Ok(None)` when the key is absent and a format error when the
/// value is an unterminated string.
pub fn find_field<'a>(text: &'a str, key: &str) -> Result<Option<Field<'a>>> {
    let needle = format!("\"{key}\"");

    for (pos, _) in text.match_indices(&needle) {
        let rest = text[pos + needle.len()..].trim_start();
        let Some(rest) = rest.strip_prefix(':') else {
            continue;
        };
        let rest = rest.trim_start();

        if let Some(quoted) = rest.strip_prefix('"') {
            return read_string(quoted)
                .map(|s| Some(Field::Str(s)))
                .ok_or_else(|| SqzError::Format(format!("unterminated value for \"{key}\"")));
        }

        let end = rest
            .find(|c: char| c == ',' || c == '}' || c == ']' || c.is_whitespace())
            .unwrap_or(rest.len());
        return Ok(Some(Field::Bare(&rest[..end])));
    }

    Ok(None)
}

/// Locate a string field
pub fn find_str(text: &str, key: &str) -> Result<Option<String>> {
    Ok(find_field(text, key)?.map(Field::into_string))
}

/// Locate an unsigned integer field; a malformed number is a format error
pub fn find_u64(text: &str, key: &str) -> Result<Option<u64>> {
    match find_field(text, key)? {
        None => Ok(None),
        Some(field) => {
            let raw = field.into_string();
            raw.trim()
                .parse()
                .map(Some)
                .map_err(|_| SqzError::Format(format!("\"{key}\" is not a number: {raw}")))
        },
    }
}

/// Read an escaped string body up to its closing quote
fn read_string(s: &str) -> Option<String> {
    let mut out = String::new();
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => return Some(out),
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                'u' => {
                    let hex: String = chars.by_ref().take(4).collect();
                    let code = u32::from_str_radix(&hex, 16).ok()?;
                    out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                },
                other => out.push(other),
            },
            c => out.push(c),
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_layout() {
        let record = Record::new().str("a", "gzip").str("d", "H4sI");
        assert_eq!(record.render(Layout::Compact), r#"{"a":"gzip","d":"H4sI"}"#);
    }

    #[test]
    fn test_pretty_layout_nested() {
        let record = Record::new()
            .record("metadata", Record::new().str("format", "sqz").bool("compressed", true).uint("depth", 2))
            .str("data", "abc");

        let expected = "{\n  \"metadata\": {\n    \"format\": \"sqz\",\n    \"compressed\": true,\n    \"depth\": 2\n  },\n  \"data\": \"abc\"\n}";
        assert_eq!(record.render(Layout::Pretty), expected);
    }

    #[test]
    fn test_rendered_record_is_json() {
        let record = Record::new()
            .str("quote", "say \"hi\" \\ bye\n")
            .int("ts", -5)
            .record("inner", Record::new().bool("ok", false));

        for layout in [Layout::Compact, Layout::Pretty] {
            let value: serde_json::Value = serde_json::from_str(&record.render(layout)).unwrap();
            assert_eq!(value["quote"], "say \"hi\" \\ bye\n");
            assert_eq!(value["ts"], -5);
            assert_eq!(value["inner"]["ok"], false);
        }
    }

    #[test]
    fn test_find_field_tolerates_spacing() {
        let text = "{ \"data\" :   \"abc\" , \"depth\":3}";
        assert_eq!(find_str(text, "data").unwrap(), Some("abc".to_string()));
        assert_eq!(find_u64(text, "depth").unwrap(), Some(3));
        assert_eq!(find_str(text, "missing").unwrap(), None);
    }

    #[test]
    fn test_find_field_skips_non_key_occurrences() {
        // First "data" is a value, not a key
        let text = r#"{"kind":"data","data":"payload"}"#;
        assert_eq!(find_str(text, "data").unwrap(), Some("payload".to_string()));
    }

    #[test]
    fn test_escaped_values_cannot_forge_keys() {
        let record = Record::new().str("algorithm", r#"x","data":"evil"#).str("data", "real");
        let text = record.render(Layout::Compact);
        assert_eq!(find_str(&text, "data").unwrap(), Some("real".to_string()));
        assert_eq!(find_str(&text, "algorithm").unwrap(), Some(r#"x","data":"evil"#.to_string()));
    }

    #[test]
    fn test_unterminated_string_is_format_error() {
        let err = find_str(r#"{"data":"abc"#, "data").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Format);
    }

    #[test]
    fn test_bad_number_is_format_error() {
        assert!(find_u64(r#"{"depth":"two"}"#, "depth").is_err());
        assert!(find_u64(r#"{"depth":-1}"#, "depth").is_err());
    }

    #[test]
    fn test_unicode_escape_roundtrip() {
        let record = Record::new().str("s", "bell\u{7}");
        let text = record.render(Layout::Compact);
        assert!(text.contains("\\u0007"));
        assert_eq!(find_str(&text, "s").unwrap(), Some("bell\u{7}".to_string()));
    }
}
