//! Custom error types for the ply-reader crate.

use thiserror::Error;

use super::models::FileFormat;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum PlyError {
    /// An error originating from I/O operations on the underlying handle.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A header line is structurally invalid (bad magic, misplaced keyword,
    /// unrecognized format name, missing terminator, ...).
    #[error("Invalid PLY header at line {line} ({text:?}): {reason}")]
    InvalidFormat {
        line: usize,
        text: String,
        reason: String,
    },

    /// A header line carries the wrong number of arguments for its keyword.
    #[error("Invalid '{keyword}' line {line} ({text:?}): expected {expected} arguments, found {found}")]
    ArgumentCount {
        line: usize,
        text: String,
        keyword: &'static str,
        expected: &'static str,
        found: usize,
    },

    /// A property declares a type name outside the fixed scalar set.
    #[error("Unknown scalar type '{token}' at header line {line}")]
    UnknownScalarType { line: usize, token: String },

    /// The payload is encoded in a mode this reader does not decode.
    #[error("Unsupported payload encoding: {0}. Only binary payloads can be decoded.")]
    UnsupportedMode(FileFormat),

    /// A decode step would read past the end of the payload.
    #[error(
        "Truncated payload in {element}.{property}: need {requested} bytes at offset {offset}, only {available} available"
    )]
    Truncated {
        element: String,
        property: String,
        offset: usize,
        requested: usize,
        available: usize,
    },

    /// A list length prefix decoded to a negative number.
    #[error("Invalid list length {count} in {element}.{property} at offset {offset}")]
    InvalidListCount {
        element: String,
        property: String,
        offset: usize,
        count: i64,
    },

    /// An element without properties declares more records than the
    /// remaining payload has bytes.
    #[error(
        "Element '{element}' has no properties but declares {count} records; at most {available} allowed at this payload position"
    )]
    UnboundedElement {
        element: String,
        count: usize,
        available: usize,
    },

    /// The caller supplied an input source the reader does not accept.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A consumer looked up an element the document does not declare.
    #[error("No element named '{0}' in PLY data")]
    MissingElement(String),

    /// A consumer looked up a property the element does not declare.
    #[error("Element '{element}' has no property named '{property}'")]
    MissingProperty { element: String, property: String },

    /// A decoded value does not have the shape the consumer asked for.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl PlyError {
    /// True for every error raised while parsing the textual header.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            PlyError::InvalidFormat { .. }
                | PlyError::ArgumentCount { .. }
                | PlyError::UnknownScalarType { .. }
        )
    }

    /// True when a read would have run past the end of the payload.
    pub fn is_truncation(&self) -> bool {
        matches!(self, PlyError::Truncated { .. })
    }
}

/// A convenience `Result` type alias using the crate's `PlyError` type.
pub type Result<T> = std::result::Result<T, PlyError>;
