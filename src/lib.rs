//! # roffio
//!
//! Reading and writing of ROFF (Roxar Open File Format) files, the tag-based container
//! format used to exchange geological grids, surfaces and properties.
//!
//! ## What is ROFF?
//!
//! A ROFF file is a sequence of named tags, each holding named, typed values and
//! homogeneous arrays. The same structure can be stored in a compact binary encoding
//! or a human-readable ASCII encoding. See [`format`] for the details.
//!
//! ## Key Features
//!
//! - **Both encodings**: binary and ASCII, with the encoding detected from the header
//! - **Byte order detection**: binary files of either byte order are decoded through
//!   their `byteswaptest` marker
//! - **Lazy reading**: tags are handed out one at a time, and binary array data is only
//!   decoded when reached
//! - **Serde Compatible**: any `T: Serialize` of the right shape can be written
//! - **No Unsafe Code**: written entirely in safe Rust
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! roffio = "0.1"
//! ```
//!
//! ### Writing and reading
//!
//! ```rust
//! use roffio::{from_slice, roff, to_vec, Format, Value};
//!
//! let grid = roff! {
//!     "dimensions" => { "nX" => 2, "nY" => 2, "nZ" => 1 },
//!     "zvalues" => { "data" => vec![1.0f32, 2.0, 3.0, 4.0] },
//! };
//!
//! let bytes = to_vec(&grid, Format::Binary).unwrap();
//! let data = from_slice(&bytes).unwrap();
//!
//! let zvalues = data.get_tag("zvalues").unwrap();
//! assert_eq!(zvalues.get_value("data"), Some(&Value::from(vec![1.0f32, 2.0, 3.0, 4.0])));
//!
//! // Every file written carries its metadata tags
//! assert!(data.contains_key("filedata"));
//! assert!(data.contains_key("version"));
//! assert!(data.contains_key("eof"));
//! ```
//!
//! ### Writing your own types
//!
//! A document is a map or struct of tags, each a map or struct of values:
//!
//! ```rust
//! use roffio::{to_vec, Format};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Dimensions { nx: i32, ny: i32, nz: i32 }
//!
//! #[derive(Serialize)]
//! struct Grid { dimensions: Dimensions }
//!
//! let grid = Grid { dimensions: Dimensions { nx: 4, ny: 3, nz: 2 } };
//! let text = String::from_utf8(to_vec(&grid, Format::Ascii).unwrap()).unwrap();
//! assert!(text.contains("tag dimensions\nint nx 4\nint ny 3\nint nz 2\nendtag\n"));
//! ```
//!
//! Sequences of `(name, tag)` and `(name, value)` pairs are accepted too, which allows
//! repeated names.
//!
//! ### Lazy reading
//!
//! ```rust
//! use roffio::{lazy_read, roff, to_vec, Format};
//! use std::io::Cursor;
//!
//! let bytes = to_vec(&roff! { "a" => { "x" => 1 } }, Format::Binary).unwrap();
//! let mut reader = lazy_read(Cursor::new(bytes)).unwrap();
//! while let Some(tag) = reader.next_tag().unwrap() {
//!     if tag.name() == "a" {
//!         for key in tag {
//!             let (name, value) = key.unwrap();
//!             assert_eq!((name.as_str(), value.as_i32()), ("x", Some(1)));
//!         }
//!     }
//! }
//! ```
//!
//! ## Logging
//!
//! Advisories are emitted as `tracing` warnings and also recorded on the reader or
//! writer that raised them ([`RoffReader::warnings`], [`RoffWriter::warnings`]).
//! Header detection and byte order switches are logged at debug level.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - Writing a grid and reading it back
//! - **`lazy_read.rs`** - Pulling a single tag out of a file
//!
//! Run any example with: `cargo run --example <name>`

#[macro_use]
pub mod macros;

pub mod byte_order;
pub mod de;
pub mod encode;
pub mod endianness;
pub mod error;
pub mod format;
pub mod map;
pub mod options;
pub mod parser;
pub mod ser;
pub mod tokenizer;
pub mod value;

pub use byte_order::Endianness;
pub use de::{
    from_slice, lazy_read, lazy_read_path, lazy_read_with_options, read, read_path,
    read_with_options, RoffReader,
};
pub use encode::RoffWriter;
pub use endianness::TagReader;
pub use error::{Error, Result, Warning};
pub use map::{OneOrMany, RoffData, TagMap};
pub use options::{FileMode, Format, ReadOptions, WriteOptions};
pub use ser::to_value;
pub use value::{Array, ElementType, Value};

use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Encode any `T: Serialize` as a ROFF file in memory.
///
/// # Examples
///
/// ```rust
/// use roffio::{roff, to_vec, Format};
///
/// let bytes = to_vec(&roff! { "t" => { "x" => 1 } }, Format::Ascii).unwrap();
/// assert!(bytes.starts_with(b"roff-asc\n"));
/// ```
///
/// # Errors
///
/// Returns [`Error::Write`] if the value is not a ROFF document or holds data the
/// format cannot represent.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T>(value: &T, format: Format) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    to_vec_with_options(value, &WriteOptions::from(format))
}

/// Encode any `T: Serialize` as a ROFF file in memory with custom options.
///
/// # Errors
///
/// See [`to_vec`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec_with_options<T>(value: &T, options: &WriteOptions) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    RoffWriter::new(options.clone()).to_vec(value)
}

/// Write any `T: Serialize` as a ROFF file to a writer.
///
/// The file is encoded completely before anything is written, so an invalid document
/// leaves the writer untouched.
///
/// # Errors
///
/// See [`to_vec`]; [`Error::Io`] if writing fails.
pub fn write<W, T>(writer: W, value: &T, format: Format) -> Result<()>
where
    W: Write,
    T: ?Sized + Serialize,
{
    write_with_options(writer, value, &WriteOptions::from(format))
}

/// Write any `T: Serialize` as a ROFF file to a writer with custom options.
///
/// # Errors
///
/// See [`write`].
pub fn write_with_options<W, T>(writer: W, value: &T, options: &WriteOptions) -> Result<()>
where
    W: Write,
    T: ?Sized + Serialize,
{
    RoffWriter::new(options.clone()).write(writer, value)
}

/// Write any `T: Serialize` as a ROFF file at `path`.
///
/// The file is only created once the document has been encoded.
///
/// # Errors
///
/// See [`write`].
pub fn write_path<P, T>(path: P, value: &T, format: Format) -> Result<()>
where
    P: AsRef<Path>,
    T: ?Sized + Serialize,
{
    let bytes = to_vec(value, format)?;
    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::io::Cursor;

    #[derive(Serialize)]
    struct Dimensions {
        #[serde(rename = "nX")]
        nx: i32,
        #[serde(rename = "nY")]
        ny: i32,
    }

    #[derive(Serialize)]
    struct Grid {
        dimensions: Dimensions,
        zvalues: Zvalues,
    }

    #[derive(Serialize)]
    struct Zvalues {
        data: Vec<f32>,
    }

    fn grid() -> Grid {
        Grid {
            dimensions: Dimensions { nx: 2, ny: 1 },
            zvalues: Zvalues {
                data: vec![0.5, -1.25],
            },
        }
    }

    #[test]
    fn test_write_read_binary() {
        let bytes = to_vec(&grid(), Format::Binary).unwrap();
        let data = from_slice(&bytes).unwrap();
        let dimensions = data.get_tag("dimensions").unwrap();
        assert_eq!(dimensions.get_value("nX"), Some(&Value::Int(2)));
        assert_eq!(
            data.get_tag("zvalues").unwrap().get_value("data"),
            Some(&Value::Array(Array::Float(vec![0.5, -1.25])))
        );
    }

    #[test]
    fn test_write_read_ascii() {
        let bytes = to_vec(&grid(), Format::Ascii).unwrap();
        let data = from_slice(&bytes).unwrap();
        assert_eq!(
            data.keys().collect::<Vec<_>>(),
            vec!["filedata", "version", "dimensions", "zvalues", "eof"]
        );
    }

    #[test]
    fn test_big_endian_output_reads_back() {
        let options = WriteOptions::new().with_endianness(Endianness::Big);
        let bytes = to_vec_with_options(&grid(), &options).unwrap();
        let data = read(Cursor::new(bytes)).unwrap();
        assert_eq!(
            data.get_tag("filedata").unwrap().get_value("byteswaptest"),
            Some(&Value::Int(1))
        );
        assert_eq!(
            data.get_tag("dimensions").unwrap().get_value("nY"),
            Some(&Value::Int(1))
        );
    }

    #[test]
    fn test_write_to_writer() {
        let mut out = Vec::new();
        write(&mut out, &grid(), Format::Ascii).unwrap();
        assert!(out.starts_with(b"roff-asc\n#ROFF file#\n#Creator: roffio, version "));
    }

    #[test]
    fn test_value_inference() {
        assert_eq!(to_value(&vec![1i32, 2]).unwrap(), Value::from(vec![1, 2]));
    }
}
