//! Configuration options for ROFF reading and writing.
//!
//! This module provides types to customize how ROFF files are read and written:
//!
//! - [`Format`]: Choice of output encoding (binary or ASCII)
//! - [`FileMode`]: The encoding a stream is expected to hold when reading
//! - [`ReadOptions`]: Reading configuration (file mode and default byte order)
//! - [`WriteOptions`]: Writing configuration (format and byte order)
//!
//! ## Examples
//!
//! ```rust
//! use roffio::{roff, to_vec_with_options, Endianness, Format, WriteOptions};
//!
//! let data = roff! { "grid" => { "nx" => 4 } };
//!
//! // ASCII output
//! let options = WriteOptions::new().with_format(Format::Ascii);
//! let bytes = to_vec_with_options(&data, &options).unwrap();
//! assert!(bytes.starts_with(b"roff-asc"));
//!
//! // Big-endian binary output
//! let options = WriteOptions::new().with_endianness(Endianness::Big);
//! let bytes = to_vec_with_options(&data, &options).unwrap();
//! assert!(bytes.starts_with(b"roff-bin\0"));
//! ```

use crate::byte_order::Endianness;

/// Output encoding of a written ROFF file.
///
/// # Examples
///
/// ```rust
/// use roffio::Format;
///
/// assert_eq!(Format::default(), Format::Binary);
/// assert_eq!(Format::Ascii.header(), "roff-asc");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Binary,
    Ascii,
}

impl Format {
    /// Returns the 8 byte header keyword for this format.
    #[must_use]
    pub const fn header(&self) -> &'static str {
        match self {
            Format::Binary => "roff-bin",
            Format::Ascii => "roff-asc",
        }
    }
}

/// The encoding a stream is opened in for reading.
///
/// A stream opened as [`FileMode::Binary`] that holds an ASCII header, or the other way
/// around, fails with [`Error::WrongFileMode`](crate::Error::WrongFileMode).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileMode {
    Binary,
    Text,
}

/// Configuration options for reading ROFF data.
///
/// # Examples
///
/// ```rust
/// use roffio::{Endianness, FileMode, ReadOptions};
///
/// // Auto-detect the encoding, little-endian default
/// let options = ReadOptions::new();
/// assert_eq!(options.mode, None);
///
/// // Require a binary file assumed big-endian until `byteswaptest` says otherwise
/// let options = ReadOptions::new()
///     .with_mode(FileMode::Binary)
///     .with_endianness(Endianness::Big);
/// assert_eq!(options.endianness, Endianness::Big);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ReadOptions {
    /// `None` probes binary first and falls back to text.
    pub mode: Option<FileMode>,
    pub endianness: Endianness,
}

impl ReadOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the stream to hold the given encoding.
    #[must_use]
    pub fn with_mode(mut self, mode: FileMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets the byte order decoding starts from.
    #[must_use]
    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }
}

/// Configuration options for writing ROFF data.
///
/// # Examples
///
/// ```rust
/// use roffio::{Format, WriteOptions};
///
/// let options = WriteOptions::new();
/// assert_eq!(options.format, Format::Binary);
///
/// let options = WriteOptions::ascii();
/// assert_eq!(options.format, Format::Ascii);
/// ```
#[derive(Clone, Debug, Default)]
pub struct WriteOptions {
    pub format: Format,
    /// Byte order of binary numeric values. Ignored for ASCII output.
    pub endianness: Endianness,
}

impl WriteOptions {
    /// Creates default options (binary, little-endian).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for ASCII output.
    #[must_use]
    pub fn ascii() -> Self {
        WriteOptions {
            format: Format::Ascii,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }
}

impl From<Format> for WriteOptions {
    fn from(format: Format) -> Self {
        WriteOptions::new().with_format(format)
    }
}
