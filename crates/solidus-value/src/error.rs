//! Error types shared by the value model, pointers and format codecs.
use std::fmt;

use thiserror::Error;

/// An error produced while parsing or evaluating a JSON Pointer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointerError {
    /// The pointer as a whole is malformed.
    #[error("invalid pointer at offset {offset}: {reason}")]
    InvalidPointer { offset: usize, reason: String },
    /// A single reference token is malformed.
    #[error("invalid reference token at offset {offset}: {reason}")]
    InvalidReferenceToken { offset: usize, reason: String },
    /// A write addressed a location that does not exist in the target value.
    #[error("no value at '{pointer}'")]
    MissingValue { pointer: String },
}

impl PointerError {
    pub(crate) fn pointer(offset: usize, reason: impl Into<String>) -> Self {
        PointerError::InvalidPointer {
            offset,
            reason: reason.into(),
        }
    }
    pub(crate) fn token(offset: usize, reason: impl Into<String>) -> Self {
        PointerError::InvalidReferenceToken {
            offset,
            reason: reason.into(),
        }
    }
}

/// An error produced while parsing a JSONPath expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid JSONPath at offset {offset}: {reason}")]
pub struct PathError {
    pub offset: usize,
    pub reason: String,
}

impl PathError {
    pub(crate) fn new(offset: usize, reason: impl Into<String>) -> Self {
        PathError {
            offset,
            reason: reason.into(),
        }
    }
}

/// An error produced while decoding a number from its decimal text form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid decimal number '{text}'")]
pub struct NumberParseError {
    pub text: String,
}

/// Where in the input a read error happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadPosition {
    /// Byte offset from the start of the input.
    pub offset: usize,
    /// One-based line number; zero for binary formats.
    pub line: usize,
}

impl fmt::Display for ReadPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "offset {}", self.offset)
        } else {
            write!(f, "line {}, offset {}", self.line, self.offset)
        }
    }
}

/// An error produced by a format reader.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReadError {
    #[error("unexpected end of input at {position}")]
    UnexpectedEof { position: ReadPosition },
    #[error("syntax error at {position}: {reason}")]
    Syntax {
        position: ReadPosition,
        reason: String,
    },
    #[error("invalid UTF-8 at {position}")]
    InvalidUtf8 { position: ReadPosition },
    #[error("number out of the representable range at {position}")]
    NumberOutOfRange { position: ReadPosition },
    #[error("alias '{name}' refers to an unknown anchor")]
    UnknownAlias { name: String },
    #[error("events did not form a complete value")]
    IncompleteValue,
}

impl ReadError {
    pub(crate) fn syntax(position: ReadPosition, reason: impl Into<String>) -> Self {
        ReadError::Syntax {
            position,
            reason: reason.into(),
        }
    }
    pub(crate) fn eof(position: ReadPosition) -> Self {
        ReadError::UnexpectedEof { position }
    }
}

/// An error produced by a format writer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    #[error("event is not valid in the current writer state: {reason}")]
    InvalidEvent { reason: String },
    #[error("the format cannot represent this value: {reason}")]
    Unrepresentable { reason: String },
    #[error("writer already finished")]
    Finished,
}

impl WriteError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        WriteError::InvalidEvent {
            reason: reason.into(),
        }
    }
}

/// An error produced by the content-encoding codecs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("content decoding failed for '{encoding}': {reason}")]
    ContentDecodingFailed { encoding: String, reason: String },
    #[error("content encoding failed for '{encoding}': {reason}")]
    ContentEncodingFailed { encoding: String, reason: String },
    #[error("unsupported encoding '{encoding}'")]
    UnsupportedEncoding { encoding: String },
}

impl EncodingError {
    pub(crate) fn decoding(encoding: &str, reason: impl Into<String>) -> Self {
        EncodingError::ContentDecodingFailed {
            encoding: encoding.to_string(),
            reason: reason.into(),
        }
    }
}
