//! EDN text encoder.

use crate::error::{EdnError, EdnResult};
use crate::value::Value;
use std::fmt::Write;

/// Encode a value to EDN text.
///
/// Output is deterministic: collections print in stored order, map
/// entries are separated by `, ` and every other element by a single
/// space.
///
/// # Errors
///
/// Returns an error if the value contains a NaN or infinite float.
pub fn to_edn_string(value: &Value) -> EdnResult<String> {
    let mut encoder = EdnEncoder::new();
    encoder.encode(value)?;
    Ok(encoder.into_string())
}

/// An EDN text encoder.
pub struct EdnEncoder {
    buffer: String,
}

impl EdnEncoder {
    /// Create a new encoder.
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Create a new encoder with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: String::with_capacity(capacity),
        }
    }

    /// Encode a value, appending to the buffer.
    pub fn encode(&mut self, value: &Value) -> EdnResult<()> {
        match value {
            Value::Nil => self.buffer.push_str("nil"),
            Value::Bool(b) => self.buffer.push_str(if *b { "true" } else { "false" }),
            Value::Integer(n) => {
                let _ = write!(self.buffer, "{n}");
            }
            Value::Float(f) => self.encode_float(*f)?,
            Value::BigDec(digits) => {
                self.buffer.push_str(digits);
                self.buffer.push('M');
            }
            Value::Text(s) => self.encode_text(s),
            Value::Keyword(k) => {
                let _ = write!(self.buffer, "{k}");
            }
            Value::Symbol(s) => self.buffer.push_str(s.as_str()),
            Value::Vector(items) => self.encode_seq("[", items, "]")?,
            Value::List(items) => self.encode_seq("(", items, ")")?,
            Value::Set(items) => self.encode_seq("#{", items, "}")?,
            Value::Map(pairs) => self.encode_map(pairs)?,
            Value::Tagged(tag, inner) => {
                self.buffer.push('#');
                self.buffer.push_str(tag);
                self.buffer.push(' ');
                self.encode(inner)?;
            }
        }
        Ok(())
    }

    /// Consume this encoder and return the text.
    pub fn into_string(self) -> String {
        self.buffer
    }

    /// Get a reference to the text encoded so far.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    fn encode_float(&mut self, f: f64) -> EdnResult<()> {
        if !f.is_finite() {
            return Err(EdnError::NonFiniteFloat);
        }
        // Debug formatting always keeps a `.0` or an exponent, so the
        // reader never mistakes the literal for an integer.
        let _ = write!(self.buffer, "{f:?}");
        Ok(())
    }

    fn encode_text(&mut self, text: &str) {
        self.buffer.push('"');
        for c in text.chars() {
            match c {
                '"' => self.buffer.push_str("\\\""),
                '\\' => self.buffer.push_str("\\\\"),
                '\n' => self.buffer.push_str("\\n"),
                '\t' => self.buffer.push_str("\\t"),
                '\r' => self.buffer.push_str("\\r"),
                c if c.is_control() => {
                    let _ = write!(self.buffer, "\\u{:04x}", u32::from(c));
                }
                c => self.buffer.push(c),
            }
        }
        self.buffer.push('"');
    }

    fn encode_seq(&mut self, open: &str, items: &[Value], close: &str) -> EdnResult<()> {
        self.buffer.push_str(open);
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.buffer.push(' ');
            }
            self.encode(item)?;
        }
        self.buffer.push_str(close);
        Ok(())
    }

    fn encode_map(&mut self, pairs: &[(Value, Value)]) -> EdnResult<()> {
        self.buffer.push('{');
        for (i, (key, value)) in pairs.iter().enumerate() {
            if i > 0 {
                self.buffer.push_str(", ");
            }
            self.encode(key)?;
            self.buffer.push(' ');
            self.encode(value)?;
        }
        self.buffer.push('}');
        Ok(())
    }
}

impl Default for EdnEncoder {
    fn default() -> Self {
        Self::new()
    }
}
