//! Contains the Error and Result type used across the crate.

use crate::{TagType, MAX_DEPTH};

/// Convenience type for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong reading, building or querying tag trees.
///
/// The variants are deliberately coarse: each one is a failure *kind*, with
/// detail carried in the message. Codec callers usually only care whether a
/// failure was malformed input ([`Error::Format`]), a contract violation on
/// their side ([`Error::Validation`]) or a lookup miss
/// ([`Error::MissingField`]).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed binary input: unknown type byte, truncated stream, or a
    /// mismatch between the expected and actual tag kind. Fatal to the
    /// current read; only the documented compression fallback retries.
    #[error("format error: {0}")]
    Format(String),

    /// A tree-construction contract violation, raised at the violating call
    /// with the tree left unmodified.
    #[error("validation error: {0}")]
    Validation(String),

    /// A typed accessor was called for a name that is absent or holds a
    /// different kind. The `_or` accessor forms return a default instead.
    #[error("missing field: {0}")]
    MissingField(String),

    /// The text codec rejected a line. `line` is 1-based.
    #[error("parse error on line {line}: {msg}")]
    TextParse { line: usize, msg: String },

    /// A query string failed to parse.
    #[error("invalid query: {0}")]
    Query(String),

    /// An underlying stream failure that is not itself a format problem.
    #[error("io error: {0}")]
    Io(std::io::Error),
}

// Truncated streams surface from io as UnexpectedEof; the decompressors
// report corruption as InvalidData or InvalidInput. All three are format
// errors here. Anything else is a genuine io failure.
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof => Error::eof(),
            std::io::ErrorKind::InvalidData | std::io::ErrorKind::InvalidInput => {
                Error::Format(e.to_string())
            }
            _ => Error::Io(e),
        }
    }
}

impl Error {
    pub(crate) fn unknown_tag_type(id: u8) -> Error {
        Error::Format(format!("unknown tag type: {}", id))
    }

    pub(crate) fn eof() -> Error {
        Error::Format("unexpected end of input".to_owned())
    }

    pub(crate) fn tag_mismatch(expected: TagType, found: TagType) -> Error {
        Error::Format(format!(
            "invalid tag type: expected {}, found {}",
            expected, found
        ))
    }

    pub(crate) fn nonunicode() -> Error {
        Error::Format("invalid string: not UTF-8".to_owned())
    }

    pub(crate) fn depth_limit() -> Error {
        Error::Format(format!("nesting deeper than {} levels", MAX_DEPTH))
    }

    pub(crate) fn list_of_end() -> Error {
        Error::Format("non-empty list with End element type".to_owned())
    }

    pub(crate) fn element_mismatch(expected: TagType, found: TagType) -> Error {
        Error::Validation(format!(
            "incompatible element for list of {}: {}",
            expected, found
        ))
    }

    pub(crate) fn not_a(expected: TagType, found: TagType) -> Error {
        Error::Validation(format!("expected a {} tag, found {}", expected, found))
    }

    pub(crate) fn dead_tag() -> Error {
        Error::Validation("tag no longer exists in this tree".to_owned())
    }

    pub(crate) fn name_mismatch(wanted: &str, got: Option<&str>) -> Error {
        Error::Validation(format!(
            "invalid tag name: wanted \"{}\", got \"{}\"",
            wanted,
            got.unwrap_or("")
        ))
    }

    pub(crate) fn oversized_string(len: usize) -> Error {
        Error::Validation(format!("string of {} bytes exceeds u16 length prefix", len))
    }

    pub(crate) fn missing(name: &str) -> Error {
        Error::MissingField(format!("no tag named \"{}\"", name))
    }

    pub(crate) fn wrong_type(name: &str, expected: TagType, found: TagType) -> Error {
        Error::MissingField(format!(
            "tag \"{}\" is a {}, not a {}",
            name, found, expected
        ))
    }

    pub(crate) fn text_parse(line: usize, msg: impl Into<String>) -> Error {
        Error::TextParse {
            line,
            msg: msg.into(),
        }
    }

    pub(crate) fn filter(expr: &str) -> Error {
        Error::Query(format!("invalid filter expression: \"{}\"", expr))
    }
}
