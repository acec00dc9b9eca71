//! Error types for the EDN codec.

use thiserror::Error;

/// Result type for codec operations.
pub type EdnResult<T> = Result<T, EdnError>;

/// Errors that can occur while encoding or decoding EDN text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EdnError {
    /// Float is NaN or infinite and has no EDN literal.
    #[error("non-finite float values cannot be encoded")]
    NonFiniteFloat,

    /// Input ended in the middle of an element.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A character that cannot start or continue the current element.
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar {
        /// The offending character.
        found: char,
        /// Byte offset into the input.
        offset: usize,
    },

    /// A numeric literal that does not parse.
    #[error("invalid number literal {literal:?}")]
    InvalidNumber {
        /// The literal as read.
        literal: String,
    },

    /// A string escape sequence that EDN does not define.
    #[error("invalid escape sequence \\{escape}")]
    InvalidEscape {
        /// The character following the backslash.
        escape: char,
    },

    /// Map literal with an odd number of forms.
    #[error("map literal has a key without a value")]
    OddMapEntries,

    /// Element nesting exceeds the decoder limit.
    #[error("nesting deeper than {max} levels")]
    TooDeep {
        /// The configured limit.
        max: usize,
    },

    /// Input continues after the first complete element.
    #[error("trailing input at offset {offset}")]
    TrailingInput {
        /// Byte offset of the first unread character.
        offset: usize,
    },

    /// Value is well-formed EDN but does not have the expected shape.
    #[error("unexpected shape: expected {expected}, got {actual}")]
    UnexpectedShape {
        /// What the caller wanted.
        expected: String,
        /// What was found.
        actual: String,
    },

    /// Element kinds this codec does not model (characters, etc.).
    #[error("unsupported element: {what}")]
    Unsupported {
        /// Description of the element.
        what: String,
    },
}

impl EdnError {
    /// Create an invalid number error.
    pub fn invalid_number(literal: impl Into<String>) -> Self {
        Self::InvalidNumber {
            literal: literal.into(),
        }
    }

    /// Create an unexpected shape error.
    pub fn unexpected_shape(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::UnexpectedShape {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an unsupported element error.
    pub fn unsupported(what: impl Into<String>) -> Self {
        Self::Unsupported { what: what.into() }
    }
}
