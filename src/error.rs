//! Error and warning types for ROFF reading and writing.
//!
//! Every fatal condition is a variant of [`Error`]. Reading and writing abort on the first
//! error; no partial document is ever returned.
//!
//! ## Error Categories
//!
//! - **Tokenization**: the expected token was not found at the current position. Used
//!   internally for grammar alternation and only escapes when no alternative matches.
//! - **Wrong file mode**: the header does not match the mode the stream was opened in.
//! - **Syntax**: a token of the wrong kind, or a malformed numeral, where the grammar
//!   requires something else.
//! - **Type**: a syntactically valid token that is wrong for the requested type.
//! - **Parsing**: a token that belongs to a different section than the one being parsed.
//! - **Format**: `filedata`/`byteswaptest` invariant violations.
//! - **Write**: validation failures while writing.
//!
//! Non-fatal conditions are reported as [`Warning`]s instead.
//!
//! ## Examples
//!
//! ```rust
//! use roffio::{from_slice, Error};
//!
//! let result = from_slice(b"not a roff file");
//! assert!(matches!(result, Err(Error::Tokenization { .. })));
//! ```

use crate::byte_order::Endianness;
use crate::value::ElementType;
use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while reading or writing ROFF data.
///
/// Errors raised while decoding carry the byte offset in the stream where the
/// offending token starts.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Expected token not found at the given position
    #[error("Tokenization error at byte {position}: {msg}")]
    Tokenization { position: u64, msg: String },

    /// Header does not match the mode the stream was opened in
    #[error("Wrong file mode: {0}")]
    WrongFileMode(String),

    /// Unexpected token kind or malformed numeral
    #[error("Syntax error at byte {position}: {msg}")]
    Syntax { position: u64, msg: String },

    /// Token is valid but wrong for the requested type
    #[error("Type error at byte {position}: {msg}")]
    Type { position: u64, msg: String },

    /// Token belongs to a different section than the one being parsed
    #[error("Parsing error at byte {position}: {msg}")]
    Parsing { position: u64, msg: String },

    /// Violation of the `filedata`/`byteswaptest` invariants
    #[error("Format error: {0}")]
    Format(String),

    /// Validation failure while writing
    #[error("Write error: {0}")]
    Write(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a tokenization error at the given byte offset.
    pub fn tokenization(position: u64, msg: impl Into<String>) -> Self {
        Error::Tokenization {
            position,
            msg: msg.into(),
        }
    }

    /// Creates a syntax error at the given byte offset.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use roffio::Error;
    ///
    /// let err = Error::syntax(12, "expected endtag");
    /// assert!(err.to_string().contains("byte 12"));
    /// ```
    pub fn syntax(position: u64, msg: impl Into<String>) -> Self {
        Error::Syntax {
            position,
            msg: msg.into(),
        }
    }

    /// Creates a type error at the given byte offset.
    pub fn type_error(position: u64, msg: impl Into<String>) -> Self {
        Error::Type {
            position,
            msg: msg.into(),
        }
    }

    /// Creates a parsing error at the given byte offset.
    pub fn parsing(position: u64, msg: impl Into<String>) -> Self {
        Error::Parsing {
            position,
            msg: msg.into(),
        }
    }

    pub fn wrong_file_mode(msg: impl Into<String>) -> Self {
        Error::WrongFileMode(msg.into())
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }

    /// Creates a write error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use roffio::Error;
    ///
    /// let err = Error::write("Roff only allows homogenous arrays");
    /// assert!(err.to_string().contains("homogenous"));
    /// ```
    pub fn write(msg: impl Into<String>) -> Self {
        Error::Write(msg.into())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for stream reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` for the recoverable error used by grammar alternation.
    #[inline]
    #[must_use]
    pub const fn is_tokenization(&self) -> bool {
        matches!(self, Error::Tokenization { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::io(&err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A non-fatal advisory raised while reading or writing.
///
/// Decoding and encoding continue after a warning, using the stated default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A binary file did not start with a `filedata` tag, so the default byte
    /// order is used without checking `byteswaptest`.
    MissingFiledata { endianness: Endianness },

    /// A native value had no exact wire equivalent and was converted.
    Cast {
        from: &'static str,
        to: ElementType,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingFiledata { endianness } => write!(
                f,
                "First tag of file is not filedata, default endianess {}-endian is used \
                 without checking 'byteswaptest' field.",
                endianness
            ),
            Warning::Cast { from, to } => write!(f, "casting {} to {}", from, to),
        }
    }
}

/// Logs `warning` and records it unless an identical warning was already recorded.
pub(crate) fn record_warning(warnings: &mut Vec<Warning>, warning: Warning) {
    if !warnings.contains(&warning) {
        tracing::warn!("{}", warning);
        warnings.push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenization_is_recoverable() {
        assert!(Error::tokenization(0, "expected comment").is_tokenization());
        assert!(!Error::syntax(0, "trailing tokens").is_tokenization());
        assert!(!Error::write("bad name").is_tokenization());
    }

    #[test]
    fn test_io_conversion() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof").into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_record_warning_deduplicates() {
        let mut warnings = Vec::new();
        let cast = Warning::Cast {
            from: "i64",
            to: ElementType::Int,
        };
        record_warning(&mut warnings, cast.clone());
        record_warning(&mut warnings, cast.clone());
        assert_eq!(warnings, vec![cast]);
    }

    #[test]
    fn test_warning_display() {
        let warning = Warning::MissingFiledata {
            endianness: Endianness::Little,
        };
        assert!(warning.to_string().contains("little-endian"));
        let cast = Warning::Cast {
            from: "u64",
            to: ElementType::Int,
        };
        assert_eq!(cast.to_string(), "casting u64 to int");
    }
}
