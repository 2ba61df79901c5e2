//! The ROFF file format
//!
//! This module documents ROFF (Roxar Open File Format) as read and written by this
//! library. It contains no code.
//!
//! # Overview
//!
//! A ROFF file is a header followed by a sequence of tags. A tag has a name and holds
//! an ordered list of tagkeys; a tagkey has a type, a name and either one value or an
//! array of values. Tag names and key names may repeat.
//!
//! The same structure has two encodings, binary (`roff-bin`) and ASCII (`roff-asc`).
//!
//! # Types
//!
//! | Keyword | Binary width | Rust |
//! |---------|--------------|------|
//! | `char` | NUL-terminated | `String` |
//! | `bool` | 1 byte, `0` or `1` | `bool` |
//! | `byte` | 1 byte | `u8` |
//! | `int` | 4 bytes | `i32` |
//! | `float` | 4 bytes | `f32` |
//! | `double` | 8 bytes | `f64` |
//!
//! # Binary encoding
//!
//! ```text
//! roff-bin\0
//! #ROFF file#\0
//! tag\0dimensions\0
//! int\0nX\0<4 bytes>
//! array\0float\0data\0<4 byte count><count * 4 bytes>
//! array\0char\0names\0<4 byte count>first\0second\0
//! endtag\0
//! ```
//!
//! **Rules**:
//! - Keywords, names and `char` values end with a NUL byte.
//! - Comments are `#...#\0` and may appear before keywords, before names and at the end
//!   of the file, never before values.
//! - Numbers and array counts use the file's byte order, which is only known from the
//!   `byteswaptest` key of the `filedata` tag (see below).
//!
//! # ASCII encoding
//!
//! ```text
//! roff-asc
//! #ROFF file#
//! tag dimensions
//! int nX 4
//! array float data 2
//! 0.5
//! 1.5
//! array char names 2
//! "first"
//! "second"
//! endtag
//! ```
//!
//! **Rules**:
//! - Tokens are separated by any run of whitespace and `#...#` comments.
//! - A name is any run of non-whitespace characters.
//! - Numbers start with a digit or `-` and continue with digits or any of `.eE+-`.
//!   Booleans are written `0` or `1`.
//! - Strings are enclosed in `"` and have no escape sequences.
//! - An array is followed by its count and then that many values.
//!
//! # Metadata tags
//!
//! | Tag | Keys |
//! |-----|------|
//! | `filedata` | `byteswaptest` (int, always `1` as written), `creationDate`, others |
//! | `version` | `major = 2`, `minor = 0` |
//! | `eof` | none, always last |
//!
//! A reader of a binary file decodes `byteswaptest`. If it is not `1`, every number
//! after it, including array counts, is decoded in the other byte order. A binary file
//! without a leading `filedata` tag is read in the default order with a
//! [`Warning::MissingFiledata`](crate::Warning::MissingFiledata).
//!
//! # Limitations
//!
//! - Arrays hold at most `u32::MAX` elements.
//! - Arrays are flat and homogeneous; a tagkey cannot hold a nested tag.
//! - Binary names and strings cannot contain NUL; ASCII names cannot contain whitespace
//!   or `#`, and ASCII strings cannot contain `"`.
//! - Non-finite floats can be stored in binary files only.
