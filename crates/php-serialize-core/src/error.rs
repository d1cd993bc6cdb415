//! Error types for PHP serialization and deserialization.
//!
//! Every failure surfaces as a single [`PhpSerializeError`]. Errors raised by
//! the reader carry the byte offset of the offending input together with what
//! was expected and what was found. Errors raised while converting an already
//! parsed value into a host type, or while encoding, have no offset.

use std::fmt;
use thiserror::Error;

/// The main error type for the codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct PhpSerializeError {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// The byte position where the error occurred, if it came from the reader.
    pub position: Option<usize>,
    /// Optional context about what was being parsed or bound.
    pub context: Option<String>,
    /// Preview of input around error position for debugging.
    pub input_preview: Option<String>,
}

impl fmt::Display for PhpSerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(position) = self.position {
            write!(f, " at position {}", position)?;
        }
        if let Some(ref ctx) = self.context {
            write!(f, " ({})", ctx)?;
        }
        if let Some(ref preview) = self.input_preview {
            write!(f, "\n{}", preview)?;
        }
        Ok(())
    }
}

/// Specific kinds of codec errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unexpected end of input.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// The next token does not start any known production.
    #[error("unexpected token '{0}'")]
    UnexpectedToken(char),

    /// Fixed punctuation or digits of a production did not match.
    #[error("expected {expected}, found {found}")]
    MalformedLiteral {
        /// What the grammar required at this point.
        expected: String,
        /// What was actually read.
        found: String,
    },

    /// A declared byte length or entry count disagrees with the content.
    #[error("{what} length mismatch: declared {expected}, found {found}")]
    LengthMismatch {
        /// The production whose length was wrong (string, array, object...).
        what: &'static str,
        /// The declared length or count.
        expected: usize,
        /// The length or count actually present.
        found: usize,
    },

    /// An array could not be read as either a list or a map.
    #[error("malformed array: {0}")]
    MalformedArray(String),

    /// The token in the stream disagrees with the target type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Description of the target type.
        expected: String,
        /// Name of the token or value that was found.
        found: &'static str,
    },

    /// A numeric or string conversion into the target type failed.
    #[error("cannot convert {value} to {target}")]
    ConversionError {
        /// The offending value, rendered as text.
        value: String,
        /// The target type.
        target: String,
    },

    /// The type shape is not covered by any binding rule.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// Invalid UTF-8 sequence where text was required.
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,

    /// Nesting depth exceeded.
    #[error("maximum nesting depth ({0}) exceeded")]
    MaxDepthExceeded(usize),
}

impl PhpSerializeError {
    /// Create a new error with the given kind and position.
    #[inline]
    pub fn new(kind: ErrorKind, position: usize) -> Self {
        Self {
            kind,
            position: Some(position),
            context: None,
            input_preview: None,
        }
    }

    /// Create an error that is not tied to a position in the input.
    #[inline]
    pub fn detached(kind: ErrorKind) -> Self {
        Self {
            kind,
            position: None,
            context: None,
            input_preview: None,
        }
    }

    /// Shorthand for a detached [`ErrorKind::TypeMismatch`].
    #[cold]
    pub fn type_mismatch(expected: impl Into<String>, found: &'static str) -> Self {
        Self::detached(ErrorKind::TypeMismatch {
            expected: expected.into(),
            found,
        })
    }

    /// Shorthand for a detached [`ErrorKind::ConversionError`].
    #[cold]
    pub fn conversion(value: impl fmt::Display, target: impl Into<String>) -> Self {
        Self::detached(ErrorKind::ConversionError {
            value: value.to_string(),
            target: target.into(),
        })
    }

    /// Shorthand for a detached [`ErrorKind::UnsupportedType`].
    #[cold]
    pub fn unsupported(what: impl Into<String>) -> Self {
        Self::detached(ErrorKind::UnsupportedType(what.into()))
    }

    /// Attach a byte offset to an error raised away from the reader.
    #[inline]
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    /// Add context to the error.
    #[inline]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add input preview around the error position for debugging.
    ///
    /// Shows up to 20 bytes before and after the error position.
    #[cold]
    pub fn with_input_preview(mut self, data: &[u8], error_pos: usize) -> Self {
        let start = error_pos.saturating_sub(20);
        let end = (error_pos + 20).min(data.len());

        if start < end {
            let slice = &data[start..end];
            let preview = String::from_utf8_lossy(slice);

            let relative_pos = error_pos.saturating_sub(start);
            let mut result = String::with_capacity(preview.len() + relative_pos + 2);
            result.push_str(&preview);
            result.push('\n');
            result.push_str(&" ".repeat(relative_pos));
            result.push('^');

            self.input_preview = Some(result);
        }
        self
    }
}

/// Result type alias for the codec.
pub type Result<T> = std::result::Result<T, PhpSerializeError>;
