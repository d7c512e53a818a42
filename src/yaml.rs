use crate::document::BymlDocument;
use crate::error::BymlError;
use crate::types::*;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use std::fmt::Write;

// ─── EmitterConfig ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Spaces per nesting level.
    pub indent_width: usize,
    /// Containers with at most this many entries, none of them containers,
    /// are written on one line in flow style.
    pub inline_container_max_count: usize,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            indent_width: 2,
            inline_container_max_count: 5,
        }
    }
}

// ─── YamlEmitter ────────────────────────────────────────────────────────────

/// Text builder shared by every container during one emission pass.
///
/// `is_indented` is set right after a sequence marker: the next block line
/// continues on the current line instead of starting a new one.
#[derive(Debug, Default)]
pub struct YamlEmitter {
    builder: String,
    level: usize,
    /// Containers currently being emitted, flow ones included.
    depth: usize,
    is_indented: bool,
    config: EmitterConfig,
}

impl YamlEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EmitterConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[inline]
    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    #[inline]
    pub fn level(&self) -> usize {
        self.level
    }

    #[inline]
    pub fn is_indented(&self) -> bool {
        self.is_indented
    }

    pub fn as_str(&self) -> &str {
        &self.builder
    }

    pub fn into_string(self) -> String {
        self.builder
    }

    // ════════════════════════════════════════════════════════════════════════
    // Layout
    // ════════════════════════════════════════════════════════════════════════

    #[inline]
    pub fn write(&mut self, text: &str) {
        self.is_indented = false;
        self.builder.push_str(text);
    }

    /// Move to a fresh line at the current level, unless a sequence marker
    /// already left us at the right column.
    pub fn begin_line(&mut self) {
        if self.is_indented {
            self.is_indented = false;
            return;
        }
        if !self.builder.is_empty() && !self.builder.ends_with('\n') {
            // Drop the space after a dangling `key:`.
            let trimmed = self.builder.trim_end_matches(' ').len();
            self.builder.truncate(trimmed);
            self.builder.push('\n');
        }
        let width = self.level * self.config.indent_width;
        self.builder.extend(std::iter::repeat_n(' ', width));
    }

    /// `- ` padded to the indent width, so nested block lines line up.
    pub fn write_sequence_marker(&mut self) {
        self.builder.push('-');
        let pad = self.config.indent_width.max(2) - 1;
        self.builder.extend(std::iter::repeat_n(' ', pad));
        self.is_indented = true;
    }

    /// Run `f` one level deeper. The level is restored on every return path.
    pub fn with_indent<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, BymlError>,
    ) -> Result<T, BymlError> {
        self.level += 1;
        let result = f(self);
        self.level -= 1;
        result
    }

    /// Emit the container `node` one nesting level deeper, refusing to go
    /// past `MAX_DEPTH`.
    fn with_container<T>(
        &mut self,
        node: Node,
        f: impl FnOnce(&mut Self) -> Result<T, BymlError>,
    ) -> Result<T, BymlError> {
        if self.depth >= MAX_DEPTH {
            return Err(BymlError::TooDeep {
                offset: node.value,
                limit: MAX_DEPTH,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ════════════════════════════════════════════════════════════════════════
    // Scalars
    // ════════════════════════════════════════════════════════════════════════

    /// Write `s` plain when YAML would read it back as the same string,
    /// double-quoted otherwise.
    pub fn emit_string(&mut self, s: &str) -> Result<(), BymlError> {
        if is_plain_safe(s) {
            self.write(s);
            return Ok(());
        }
        self.is_indented = false;
        self.builder.push('"');
        for c in s.chars() {
            match c {
                '"' => self.builder.push_str("\\\""),
                '\\' => self.builder.push_str("\\\\"),
                '\n' => self.builder.push_str("\\n"),
                '\r' => self.builder.push_str("\\r"),
                '\t' => self.builder.push_str("\\t"),
                c if c.is_control() => write!(self.builder, "\\u{:04X}", c as u32)?,
                c => self.builder.push(c),
            }
        }
        self.builder.push('"');
        Ok(())
    }

    fn emit_f32(&mut self, v: f32) {
        let text = format_float(f64::from(v), v.to_string());
        self.write(&text);
    }

    fn emit_f64(&mut self, v: f64) {
        let text = format_float(v, v.to_string());
        self.write(&text);
    }

    fn emit_display(&mut self, tag: &str, value: impl std::fmt::Display) -> Result<(), BymlError> {
        self.is_indented = false;
        self.builder.push_str(tag);
        write!(self.builder, "{value}")?;
        Ok(())
    }

    // ════════════════════════════════════════════════════════════════════════
    // Node dispatch
    // ════════════════════════════════════════════════════════════════════════

    pub fn emit_node(&mut self, node: Node, doc: &BymlDocument<'_>) -> Result<(), BymlError> {
        match node.node_type {
            TAG_MAP => self.with_container(node, |e| doc.map_view(node)?.emit_yaml(e, doc)),
            TAG_ARRAY => self.with_container(node, |e| doc.array_view(node)?.emit_yaml(e, doc)),
            TAG_STRING => self.emit_string(doc.string(node.value)?),
            TAG_NULL => {
                self.write("null");
                Ok(())
            }
            TAG_BOOL => {
                self.write(if node.as_bool() { "true" } else { "false" });
                Ok(())
            }
            TAG_INT => self.emit_display("", node.as_i32()),
            TAG_UINT => self.emit_display("!u 0x", format_args!("{:X}", node.value)),
            TAG_FLOAT => {
                self.emit_f32(node.as_f32());
                Ok(())
            }
            TAG_INT64 => self.emit_display("!l ", doc.read_u64(node)? as i64),
            TAG_UINT64 => self.emit_display("!ul ", doc.read_u64(node)?),
            TAG_DOUBLE => {
                self.write("!d ");
                self.emit_f64(f64::from_bits(doc.read_u64(node)?));
                Ok(())
            }
            TAG_BINARY => {
                let data = doc.binary(node)?;
                self.emit_display("!!binary ", STANDARD.encode(data))
            }
            TAG_FILE => {
                let (data, alignment) = doc.file(node)?;
                let encoded = STANDARD.encode(data);
                self.emit_display(
                    "!file ",
                    format_args!("{{Alignment: {alignment}, Data: {encoded}}}"),
                )
            }
            other => Err(BymlError::UnknownNodeType(other)),
        }
    }
}

/// Floats always carry a decimal point so they read back as floats.
fn format_float(v: f64, text: String) -> String {
    if v.is_nan() {
        ".nan".to_string()
    } else if v.is_infinite() {
        (if v > 0.0 { ".inf" } else { "-.inf" }).to_string()
    } else if text.contains(['.', 'e', 'E']) {
        text
    } else {
        text + ".0"
    }
}

const RESERVED_WORDS: &[&str] = &["null", "~", "true", "false", "yes", "no", "on", "off"];

fn is_plain_safe(s: &str) -> bool {
    let Some(first) = s.chars().next() else {
        return false;
    };
    if first.is_whitespace() || s.ends_with(char::is_whitespace) {
        return false;
    }
    if "-?:,[]{}#&*!|>'\"%@`".contains(first) {
        return false;
    }
    if s.chars()
        .any(|c| c.is_control() || matches!(c, ':' | '#' | ',' | '"' | '[' | ']' | '{' | '}'))
    {
        return false;
    }
    if RESERVED_WORDS.iter().any(|w| w.eq_ignore_ascii_case(s)) {
        return false;
    }
    s.parse::<f64>().is_err() && s.parse::<i64>().is_err() && !looks_numeric(s)
}

/// Catch YAML numeric forms Rust does not parse, like `0x1F`, `.5` or `1_000`.
fn looks_numeric(s: &str) -> bool {
    let body = s.trim_start_matches(['+', '-']);
    body.starts_with("0x")
        || body.starts_with("0o")
        || body.starts_with(".inf")
        || body.starts_with(".nan")
        || body.starts_with(".Inf")
        || body.starts_with(".NaN")
        || (body.starts_with('.') && body[1..].starts_with(|c: char| c.is_ascii_digit()))
        || (body.starts_with(|c: char| c.is_ascii_digit())
            && body.chars().all(|c| c.is_ascii_digit() || c == '_' || c == '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_strings() {
        for s in ["abc", "Link", "snake_case", "with space", "a-b"] {
            let mut e = YamlEmitter::new();
            e.emit_string(s).unwrap();
            assert_eq!(e.as_str(), s);
        }
    }

    #[test]
    fn test_quoted_strings() {
        let cases = [
            ("", "\"\""),
            ("123", "\"123\""),
            ("1.5", "\"1.5\""),
            ("true", "\"true\""),
            ("Null", "\"Null\""),
            ("a: b", "\"a: b\""),
            ("- item", "\"- item\""),
            ("{x}", "\"{x}\""),
            (" lead", "\" lead\""),
            ("line\nbreak", "\"line\\nbreak\""),
            ("say \"hi\"", "\"say \\\"hi\\\"\""),
            ("bell\u{7}", "\"bell\\u0007\""),
            ("0x10", "\"0x10\""),
        ];
        for (input, expected) in cases {
            let mut e = YamlEmitter::new();
            e.emit_string(input).unwrap();
            assert_eq!(e.as_str(), expected, "input {input:?}");
        }
    }

    #[test]
    fn test_float_formatting() {
        assert_eq!(format_float(1.0, 1.0f64.to_string()), "1.0");
        assert_eq!(format_float(0.25, 0.25f64.to_string()), "0.25");
        assert_eq!(format_float(f64::NAN, String::new()), ".nan");
        assert_eq!(format_float(f64::NEG_INFINITY, String::new()), "-.inf");
    }

    #[test]
    fn test_with_indent_restores_level_on_error() {
        let mut e = YamlEmitter::new();
        let result: Result<(), BymlError> = e.with_indent(|inner| {
            assert_eq!(inner.level(), 1);
            Err(BymlError::UnknownNodeType(0))
        });
        assert!(result.is_err());
        assert_eq!(e.level(), 0);
    }

    #[test]
    fn test_begin_line_after_sequence_marker() {
        let mut e = YamlEmitter::new();
        e.begin_line();
        e.write_sequence_marker();
        assert!(e.is_indented());
        e.begin_line();
        e.write("a: 1");
        assert_eq!(e.as_str(), "- a: 1");
        assert!(!e.is_indented());
    }

    #[test]
    fn test_config_from_json() {
        let config: EmitterConfig = serde_json::from_str(r#"{"indent_width": 4}"#).unwrap();
        assert_eq!(config.indent_width, 4);
        assert_eq!(config.inline_container_max_count, 5);
    }
}
