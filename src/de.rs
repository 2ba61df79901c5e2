//! ROFF reading.
//!
//! This module provides [`RoffReader`], the tag-by-tag reader, and the functions that
//! read a whole file into a [`RoffData`].
//!
//! ## Usage
//!
//! Most users should use the high-level functions:
//!
//! ```rust
//! use roffio::{from_slice, Value};
//!
//! let data = from_slice(b"roff-asc tag dimensions int nX 4 int nY 3 endtag").unwrap();
//! let dimensions = data.get_tag("dimensions").unwrap();
//! assert_eq!(dimensions.get_value("nX"), Some(&Value::Int(4)));
//! ```
//!
//! ## Lazy reading
//!
//! [`lazy_read`] hands out one tag at a time. Array data of binary files is only
//! decoded when the key holding it is reached, so skipping a tag skips its arrays:
//!
//! ```rust
//! use roffio::lazy_read;
//! use std::io::Cursor;
//!
//! let input = Cursor::new(b"roff-asc tag a int x 1 endtag tag b int y 2 endtag".to_vec());
//! let mut reader = lazy_read(input).unwrap();
//! let mut names = Vec::new();
//! while let Some(tag) = reader.next_tag().unwrap() {
//!     names.push(tag.name().to_string());
//! }
//! assert_eq!(names, vec!["a", "b"]);
//! ```
//!
//! ## File mode
//!
//! By default the encoding is detected from the header. A [`ReadOptions`] with an
//! explicit [`FileMode`] insists on one encoding and fails with
//! [`Error::WrongFileMode`] when the header announces the other.

use crate::endianness::{EndiannessHandler, TagReader};
use crate::error::{Error, Result, Warning};
use crate::map::{RoffData, TagMap};
use crate::options::{FileMode, ReadOptions};
use crate::parser::RoffParser;
use crate::tokenizer::RoffTokenizer;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// Reads ROFF tags one at a time.
///
/// Created by [`lazy_read`], [`lazy_read_path`] or [`RoffReader::with_options`].
pub struct RoffReader<R> {
    handler: EndiannessHandler<R>,
}

impl<R: Read + Seek> RoffReader<R> {
    /// Opens a reader that detects the encoding from the header.
    ///
    /// # Errors
    ///
    /// Fails if the stream does not start with a ROFF header.
    pub fn new(reader: R) -> Result<Self> {
        Self::with_options(reader, &ReadOptions::default())
    }

    /// Opens a reader with the given options. The header is read immediately.
    ///
    /// # Errors
    ///
    /// [`Error::WrongFileMode`] if a mode was requested and the header announces the
    /// other one; [`Error::Tokenization`] if there is no ROFF header.
    pub fn with_options(reader: R, options: &ReadOptions) -> Result<Self> {
        let mode = options.mode.unwrap_or(FileMode::Binary);
        let mut tokens = RoffTokenizer::new(reader, mode, options.endianness)?;
        match (tokens.read_header(), options.mode) {
            (Ok(_), _) => {}
            (Err(Error::WrongFileMode(_)), None) => {
                tracing::debug!("binary probe found a text header, reading as text");
                tokens.restart(FileMode::Text)?;
                tokens.read_header()?;
            }
            (Err(err), _) => return Err(err),
        }
        Ok(RoffReader {
            handler: EndiannessHandler::new(RoffParser::new(tokens)),
        })
    }

    /// Moves to the next tag, or returns `None` after the last one.
    ///
    /// The returned [`TagReader`] iterates over the tag's keys. Keys left unread are
    /// skipped by the following call.
    ///
    /// # Errors
    ///
    /// Any tokenization, parse or format error met while moving to the tag.
    pub fn next_tag(&mut self) -> Result<Option<TagReader<'_, R>>> {
        self.handler.next_tag()
    }

    /// Advisories raised so far, such as a binary file without `filedata`.
    pub fn warnings(&self) -> &[Warning] {
        self.handler.warnings()
    }

    /// Reads every remaining tag. Repeated tag and key names are collected in order.
    ///
    /// # Errors
    ///
    /// The first error met while reading.
    pub fn read_to_end(&mut self) -> Result<RoffData> {
        let mut data = RoffData::new();
        while let Some(tag) = self.next_tag()? {
            let name = tag.name().to_string();
            let mut keys = TagMap::new();
            for key in tag {
                let (key, value) = key?;
                keys.push(key, value);
            }
            data.push(name, keys);
        }
        Ok(data)
    }

    /// Closes the reader and returns the underlying stream.
    pub fn into_inner(self) -> R {
        self.handler.into_inner()
    }
}

/// Reads a whole ROFF stream, detecting its encoding.
///
/// # Examples
///
/// ```rust
/// use roffio::{read, OneOrMany, Value};
/// use std::io::Cursor;
///
/// let input = Cursor::new(b"roff-asc tag t double x 1.0 endtag tag t double x 2.0 endtag".to_vec());
/// let data = read(input).unwrap();
/// let tags: Vec<_> = data.get("t").unwrap().iter().collect();
/// assert_eq!(tags.len(), 2);
/// assert_eq!(tags[1].get_value("x"), Some(&Value::Double(2.0)));
/// ```
///
/// # Errors
///
/// Any error met while reading.
pub fn read<R: Read + Seek>(reader: R) -> Result<RoffData> {
    read_with_options(reader, &ReadOptions::default())
}

/// Reads a whole ROFF stream with the given options.
///
/// # Errors
///
/// Any error met while reading.
pub fn read_with_options<R: Read + Seek>(reader: R, options: &ReadOptions) -> Result<RoffData> {
    RoffReader::with_options(reader, options)?.read_to_end()
}

/// Reads a whole ROFF file.
///
/// # Errors
///
/// [`Error::Io`] if the file cannot be opened, otherwise any error met while reading.
pub fn read_path<P: AsRef<Path>>(path: P) -> Result<RoffData> {
    read(File::open(path)?)
}

/// Reads ROFF data held in memory.
///
/// # Errors
///
/// Any error met while reading.
pub fn from_slice(bytes: &[u8]) -> Result<RoffData> {
    read(Cursor::new(bytes))
}

/// Opens a tag-by-tag reader, detecting the encoding.
///
/// # Errors
///
/// Fails if the stream does not start with a ROFF header.
pub fn lazy_read<R: Read + Seek>(reader: R) -> Result<RoffReader<R>> {
    RoffReader::new(reader)
}

/// Opens a tag-by-tag reader with the given options.
///
/// # Errors
///
/// See [`RoffReader::with_options`].
pub fn lazy_read_with_options<R: Read + Seek>(
    reader: R,
    options: &ReadOptions,
) -> Result<RoffReader<R>> {
    RoffReader::with_options(reader, options)
}

/// Opens a tag-by-tag reader over a file. The file is closed when the reader is
/// dropped.
///
/// # Errors
///
/// [`Error::Io`] if the file cannot be opened, or a header error.
pub fn lazy_read_path<P: AsRef<Path>>(path: P) -> Result<RoffReader<File>> {
    RoffReader::new(File::open(path)?)
}
