//! EDN text decoder.

use crate::error::{EdnError, EdnResult};
use crate::value::{Keyword, Symbol, Value};

/// Maximum nesting of collections and tagged elements.
/// Bounds recursion on untrusted input.
pub const MAX_DEPTH: usize = 128;

/// Decode exactly one value from EDN text.
///
/// Whitespace, commas and comments around the element are allowed;
/// anything else after it is an error.
///
/// # Errors
///
/// Returns an error if the text is not valid EDN, uses an element this
/// codec does not model, or nests deeper than [`MAX_DEPTH`].
pub fn from_edn(text: &str) -> EdnResult<Value> {
    let mut decoder = EdnDecoder::new(text);
    let value = decoder.decode()?;
    decoder.skip_whitespace();
    if !decoder.is_empty() {
        return Err(EdnError::TrailingInput {
            offset: decoder.pos,
        });
    }
    Ok(value)
}

/// An EDN text decoder.
pub struct EdnDecoder<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> EdnDecoder<'a> {
    /// Create a new decoder for the given text.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    /// Decode the next value.
    pub fn decode(&mut self) -> EdnResult<Value> {
        self.skip_discarded()?;
        let c = self.peek().ok_or(EdnError::UnexpectedEof)?;
        match c {
            '"' => {
                self.bump();
                self.decode_text()
            }
            ':' => {
                self.bump();
                let token = self.read_token();
                if token.is_empty() {
                    return Err(self.unexpected_here());
                }
                Ok(Value::Keyword(Keyword::parse(token)))
            }
            '[' => {
                self.bump();
                self.nested(|d| d.decode_until(']').map(Value::Vector))
            }
            '(' => {
                self.bump();
                self.nested(|d| d.decode_until(')').map(Value::List))
            }
            '{' => {
                self.bump();
                self.nested(Self::decode_map)
            }
            '#' => {
                self.bump();
                self.decode_dispatch()
            }
            '\\' => Err(EdnError::unsupported("character literal")),
            ')' | ']' | '}' => Err(self.unexpected_here()),
            _ => {
                let token = self.read_token();
                if token.is_empty() {
                    return Err(self.unexpected_here());
                }
                Self::decode_atom(token)
            }
        }
    }

    /// Check if all input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Get the unread input.
    pub fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Skip whitespace, commas and `;` line comments.
    pub fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == ',' {
                self.bump();
            } else if c == ';' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    /// Skip whitespace and any run of `#_` discarded elements.
    fn skip_discarded(&mut self) -> EdnResult<()> {
        loop {
            self.skip_whitespace();
            if !self.remaining().starts_with("#_") {
                return Ok(());
            }
            self.pos += 2;
            self.nested(|d| d.decode())?;
        }
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    #[inline]
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn unexpected_here(&self) -> EdnError {
        match self.peek() {
            Some(found) => EdnError::UnexpectedChar {
                found,
                offset: self.pos,
            },
            None => EdnError::UnexpectedEof,
        }
    }

    fn nested<F>(&mut self, f: F) -> EdnResult<Value>
    where
        F: FnOnce(&mut Self) -> EdnResult<Value>,
    {
        if self.depth >= MAX_DEPTH {
            return Err(EdnError::TooDeep { max: MAX_DEPTH });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn read_token(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, ',' | '(' | ')' | '[' | ']' | '{' | '}' | '"' | ';')
            {
                break;
            }
            self.bump();
        }
        &self.input[start..self.pos]
    }

    fn decode_until(&mut self, close: char) -> EdnResult<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            self.skip_discarded()?;
            match self.peek() {
                None => return Err(EdnError::UnexpectedEof),
                Some(c) if c == close => {
                    self.bump();
                    return Ok(items);
                }
                Some(_) => items.push(self.decode()?),
            }
        }
    }

    fn decode_map(&mut self) -> EdnResult<Value> {
        let forms = self.decode_until('}')?;
        if forms.len() % 2 != 0 {
            return Err(EdnError::OddMapEntries);
        }
        let mut pairs = Vec::with_capacity(forms.len() / 2);
        let mut iter = forms.into_iter();
        while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
            pairs.push((k, v));
        }
        Ok(Value::Map(pairs))
    }

    fn decode_dispatch(&mut self) -> EdnResult<Value> {
        match self.peek() {
            Some('{') => {
                self.bump();
                self.nested(|d| d.decode_until('}').map(Value::Set))
            }
            Some(c) if c.is_alphabetic() => {
                let tag = self.read_token().to_string();
                self.nested(|d| d.decode().map(|inner| Value::tagged(tag, inner)))
            }
            _ => Err(self.unexpected_here()),
        }
    }

    fn decode_text(&mut self) -> EdnResult<Value> {
        let mut out = String::new();
        loop {
            let c = self.bump().ok_or(EdnError::UnexpectedEof)?;
            match c {
                '"' => return Ok(Value::Text(out)),
                '\\' => {
                    let escape = self.bump().ok_or(EdnError::UnexpectedEof)?;
                    match escape {
                        '"' => out.push('"'),
                        '\\' => out.push('\\'),
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        'u' => out.push(self.decode_unicode_escape()?),
                        other => return Err(EdnError::InvalidEscape { escape: other }),
                    }
                }
                c => out.push(c),
            }
        }
    }

    fn decode_unicode_escape(&mut self) -> EdnResult<char> {
        let start = self.pos;
        for _ in 0..4 {
            self.bump().ok_or(EdnError::UnexpectedEof)?;
        }
        let hex = &self.input[start..self.pos];
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(EdnError::InvalidEscape { escape: 'u' });
        }
        u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or(EdnError::InvalidEscape { escape: 'u' })
    }

    fn decode_atom(token: &str) -> EdnResult<Value> {
        match token {
            "nil" => return Ok(Value::Nil),
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            _ => {}
        }

        let mut chars = token.chars();
        let first = chars.next().unwrap_or_default();
        let numeric = first.is_ascii_digit()
            || (matches!(first, '+' | '-') && chars.next().is_some_and(|c| c.is_ascii_digit()));

        if numeric {
            Self::decode_number(token)
        } else {
            Ok(Value::Symbol(Symbol::new(token)))
        }
    }

    fn decode_number(token: &str) -> EdnResult<Value> {
        if let Some(digits) = token.strip_suffix('M') {
            return if digits.parse::<f64>().is_ok() {
                Ok(Value::BigDec(digits.to_string()))
            } else {
                Err(EdnError::invalid_number(token))
            };
        }
        if let Some(digits) = token.strip_suffix('N') {
            return digits
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| EdnError::invalid_number(token));
        }
        if token.contains(['.', 'e', 'E']) {
            return token
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| EdnError::invalid_number(token));
        }
        token
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| EdnError::invalid_number(token))
    }
}
