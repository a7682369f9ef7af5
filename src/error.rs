//! When encoding or decoding an ordered map as JSON goes wrong.

use std::io;

use thiserror::Error;

use crate::key::{KeyError, KeyKind};

/// Alias for a `Result` with the error type [`orderedmap::Error`](Error).
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while turning an [`OrderedMap`] into JSON or
/// back.
///
/// [`OrderedMap`]: crate::OrderedMap
#[derive(Debug, Error)]
pub enum Error {
    /// A key could not be rendered as a member name.
    #[error("cannot encode {kind} key as a member name: {source}")]
    KeyEncode {
        kind: KeyKind,
        #[source]
        source: KeyError,
    },

    /// A member name could not be parsed into a key.
    #[error("cannot decode member name {name:?} as {kind} key at line {line} column {column}: {source}")]
    KeyDecode {
        name: String,
        kind: KeyKind,
        line: usize,
        column: usize,
        #[source]
        source: KeyError,
    },

    /// The top-level JSON value is something other than an object.
    #[error("expected a JSON object at line {line} column {column}")]
    NotAnObject { line: usize, column: usize },

    /// The object names the same member twice. Only raised with the
    /// `no_duplicate_keys` feature.
    #[error("duplicate member name {name:?} at line {line} column {column}")]
    DuplicateKey {
        name: String,
        line: usize,
        column: usize,
    },

    /// Raised by serde_json while reading or writing the JSON itself.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Categorizes the cause of an [`Error`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Category {
    /// A key could not be rendered as a member name.
    KeyEncode,

    /// A member name could not be parsed into a key.
    KeyDecode,

    /// The input is not syntactically valid JSON, or is valid JSON that is
    /// not an object.
    Syntax,

    /// The input is well formed but a value does not fit the map's value
    /// type, or a member name repeats.
    Data,

    /// The input ended before the object was complete.
    Eof,

    /// Reading or writing bytes failed.
    Io,
}

impl Error {
    /// Categorizes the cause of this error.
    pub fn classify(&self) -> Category {
        match self {
            Error::KeyEncode { .. } => Category::KeyEncode,
            Error::KeyDecode { .. } => Category::KeyDecode,
            Error::NotAnObject { .. } => Category::Syntax,
            Error::DuplicateKey { .. } => Category::Data,
            Error::Json(err) => match err.classify() {
                serde_json::error::Category::Io => Category::Io,
                serde_json::error::Category::Syntax => Category::Syntax,
                serde_json::error::Category::Data => Category::Data,
                serde_json::error::Category::Eof => Category::Eof,
            },
            Error::Io(_) => Category::Io,
        }
    }

    pub fn is_key_encode(&self) -> bool {
        self.classify() == Category::KeyEncode
    }

    pub fn is_key_decode(&self) -> bool {
        self.classify() == Category::KeyDecode
    }

    /// Returns true if the input was not syntactically valid JSON or was not
    /// an object.
    pub fn is_syntax(&self) -> bool {
        self.classify() == Category::Syntax
    }

    pub fn is_data(&self) -> bool {
        self.classify() == Category::Data
    }

    /// Returns true if the input ended before the object was complete.
    pub fn is_eof(&self) -> bool {
        self.classify() == Category::Eof
    }

    pub fn is_io(&self) -> bool {
        self.classify() == Category::Io
    }

    /// One-based line number at which the error was detected, or 0 when the
    /// error has no position in the input (encoding and IO errors).
    pub fn line(&self) -> usize {
        match self {
            Error::KeyDecode { line, .. }
            | Error::NotAnObject { line, .. }
            | Error::DuplicateKey { line, .. } => *line,
            Error::Json(err) => err.line(),
            Error::KeyEncode { .. } | Error::Io(_) => 0,
        }
    }

    /// One-based column number at which the error was detected, or 0 when
    /// the error has no position in the input.
    pub fn column(&self) -> usize {
        match self {
            Error::KeyDecode { column, .. }
            | Error::NotAnObject { column, .. }
            | Error::DuplicateKey { column, .. } => *column,
            Error::Json(err) => err.column(),
            Error::KeyEncode { .. } | Error::Io(_) => 0,
        }
    }
}

impl From<Error> for io::Error {
    /// Syntax, data and key errors become `InvalidData`, EOF errors become
    /// `UnexpectedEof`, and IO errors are unwrapped.
    fn from(err: Error) -> Self {
        match err {
            Error::Io(err) => err,
            Error::Json(err) => err.into(),
            err => match err.classify() {
                Category::Eof => io::Error::new(io::ErrorKind::UnexpectedEof, err),
                _ => io::Error::new(io::ErrorKind::InvalidData, err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, Error};
    use crate::key::{KeyError, KeyKind};
    use std::io;

    #[test]
    fn test_classify_serde_json_errors() {
        let eof = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let syntax = serde_json::from_str::<serde_json::Value>("{]").unwrap_err();
        let data = serde_json::from_str::<u8>("\"x\"").unwrap_err();

        assert_eq!(Category::Eof, Error::from(eof).classify());
        assert_eq!(Category::Syntax, Error::from(syntax).classify());
        assert_eq!(Category::Data, Error::from(data).classify());
    }

    #[test]
    fn test_positions() {
        let err = Error::NotAnObject { line: 2, column: 3 };
        assert!(err.is_syntax());
        assert_eq!(2, err.line());
        assert_eq!(3, err.column());
        assert_eq!("expected a JSON object at line 2 column 3", err.to_string());

        let err = Error::KeyEncode {
            kind: KeyKind::Text,
            source: KeyError::custom("nope"),
        };
        assert!(err.is_key_encode());
        assert_eq!(0, err.line());
        assert_eq!("cannot encode text key as a member name: nope", err.to_string());
    }

    #[test]
    fn test_into_io_error() {
        let err: io::Error = Error::NotAnObject { line: 1, column: 1 }.into();
        assert_eq!(io::ErrorKind::InvalidData, err.kind());

        let eof = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        let err: io::Error = Error::from(eof).into();
        assert_eq!(io::ErrorKind::UnexpectedEof, err.kind());
    }
}
