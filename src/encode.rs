//! Encoding of inferred documents into ROFF bytes.
//!
//! [`RoffWriter`] adds the metadata every ROFF file carries, validates the whole
//! document and only then emits it, so a failed write leaves the destination
//! untouched.
//!
//! Every file written starts with a `filedata` tag (`byteswaptest` and
//! `creationDate`) and a `version` tag (`major = 2`, `minor = 0`) and ends with an
//! empty `eof` tag. Tags of those names given by the caller are merged into the
//! injected ones by key name.
//!
//! ```rust
//! use roffio::encode::RoffWriter;
//! use roffio::{roff, WriteOptions};
//!
//! let data = roff! { "filedata" => { "filetype" => "grid" }, "grid" => { "nx" => 4 } };
//! let mut writer = RoffWriter::new(WriteOptions::ascii());
//! let bytes = writer.to_vec(&data).unwrap();
//! let text = String::from_utf8(bytes).unwrap();
//!
//! assert!(text.starts_with("roff-asc\n#ROFF file#\n"));
//! assert!(text.contains("tag filedata\nint byteswaptest 1\nchar creationDate \""));
//! assert!(text.contains("char filetype \"grid\"\nendtag\ntag version\nint major 2\nint minor 0\nendtag\n"));
//! assert!(text.ends_with("tag grid\nint nx 4\nendtag\ntag eof\nendtag\n"));
//! ```

use crate::byte_order::{Endianness, WireNumber};
use crate::error::{Error, Result, Warning};
use crate::options::{Format, WriteOptions};
use crate::ser::{Document, Serializer};
use crate::value::{Array, Value};
use serde::Serialize;
use std::io::Write;

const FILEDATA: &str = "filedata";
const VERSION: &str = "version";
const EOF: &str = "eof";
const CREATION_DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Writes serde data as ROFF files.
#[derive(Debug, Default)]
pub struct RoffWriter {
    options: WriteOptions,
    warnings: Vec<Warning>,
}

impl RoffWriter {
    pub fn new(options: WriteOptions) -> Self {
        RoffWriter {
            options,
            warnings: Vec::new(),
        }
    }

    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Cast warnings raised by every document written so far.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Encodes a document into memory.
    ///
    /// # Errors
    ///
    /// [`Error::Write`] if the data is not a valid ROFF document, if it tries to
    /// change the `version` tag or `byteswaptest`, or if a name or value cannot be
    /// represented in the chosen format.
    pub fn to_vec<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<Vec<u8>> {
        let mut serializer = Serializer::resume(std::mem::take(&mut self.warnings));
        let document = serializer.document(value);
        self.warnings = serializer.into_warnings();
        let document = with_metadata(document?)?;
        match self.options.format {
            Format::Binary => encode_binary(&document, self.options.endianness),
            Format::Ascii => encode_ascii(&document),
        }
    }

    /// Encodes a document and writes it to `writer` in one go.
    ///
    /// # Errors
    ///
    /// See [`RoffWriter::to_vec`]; [`Error::Io`] if writing fails.
    pub fn write<W: Write, T: Serialize + ?Sized>(&mut self, mut writer: W, value: &T) -> Result<()> {
        let bytes = self.to_vec(value)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }
}

/// Merges `keys` into `target`. Existing keys keep their place and take the new
/// value, new keys are appended.
fn merge(target: &mut Vec<(String, Value)>, keys: Vec<(String, Value)>) {
    for (name, value) in keys {
        match target.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => target.push((name, value)),
        }
    }
}

fn creation_date() -> String {
    chrono::Local::now().format(CREATION_DATE_FORMAT).to_string()
}

fn lookup<'k>(keys: &'k [(String, Value)], name: &str) -> Option<&'k Value> {
    keys.iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
}

/// Puts `filedata` and `version` first and a single `eof` last.
fn with_metadata(document: Document) -> Result<Document> {
    let mut filedata = vec![
        ("byteswaptest".to_string(), Value::Int(1)),
        ("creationDate".to_string(), Value::Char(creation_date())),
    ];
    let mut version = vec![
        ("major".to_string(), Value::Int(2)),
        ("minor".to_string(), Value::Int(0)),
    ];
    let mut tags = Vec::with_capacity(document.len() + 3);
    for (name, keys) in document {
        match name.as_str() {
            FILEDATA => merge(&mut filedata, keys),
            VERSION => merge(&mut version, keys),
            EOF => {}
            _ => tags.push((name, keys)),
        }
    }

    if lookup(&version, "major") != Some(&Value::Int(2))
        || lookup(&version, "minor") != Some(&Value::Int(0))
    {
        return Err(Error::write(
            "Cannot change roff file version in values given to write",
        ));
    }
    if let Some((name, _)) = version
        .iter()
        .find(|(name, _)| name != "major" && name != "minor")
    {
        return Err(Error::write(format!(
            "No additional fields in the version tag is permitted, found {}",
            name
        )));
    }
    if let Some(value) = lookup(&filedata, "byteswaptest").filter(|v| **v != Value::Int(1)) {
        return Err(Error::write(format!(
            "It is not possible to set the byteswaptest value, found {}. \
             Use the endianness option to set endianness.",
            value
        )));
    }

    let mut result = Vec::with_capacity(tags.len() + 3);
    result.push((FILEDATA.to_string(), filedata));
    result.push((VERSION.to_string(), version));
    result.extend(tags);
    result.push((EOF.to_string(), Vec::new()));
    Ok(result)
}

fn creator() -> String {
    format!("#Creator: roffio, version {}#", env!("CARGO_PKG_VERSION"))
}

fn push_binary_string(out: &mut Vec<u8>, string: &str) -> Result<()> {
    if string.contains('\0') {
        return Err(Error::write(format!(
            "char values, tag names and key names cannot contain zero-character \
             in binary roff-format. Found {:?}",
            string
        )));
    }
    out.extend_from_slice(string.as_bytes());
    out.push(0);
    Ok(())
}

fn push_binary_scalar(out: &mut Vec<u8>, value: &Value, endianness: Endianness) -> Result<()> {
    match value {
        Value::Bool(b) => out.push(u8::from(*b)),
        Value::Byte(b) => out.push(*b),
        Value::Int(i) => i.write_wire(endianness, out),
        Value::Float(f) => f.write_wire(endianness, out),
        Value::Double(d) => d.write_wire(endianness, out),
        Value::Char(s) => push_binary_string(out, s)?,
        Value::Array(_) => return Err(Error::write("Roff does not support nested arrays")),
    }
    Ok(())
}

fn push_binary_array(out: &mut Vec<u8>, array: &Array, endianness: Endianness) -> Result<()> {
    let count = u32::try_from(array.len()).map_err(|_| {
        Error::write(format!(
            "Roff arrays hold at most {} elements, found {}",
            u32::MAX,
            array.len()
        ))
    })?;
    count.write_wire(endianness, out);
    match array {
        Array::Bool(v) => out.extend(v.iter().map(|b| u8::from(*b))),
        Array::Bytes(v) => out.extend_from_slice(v),
        Array::Int(v) => v.iter().for_each(|x| x.write_wire(endianness, out)),
        Array::Float(v) => v.iter().for_each(|x| x.write_wire(endianness, out)),
        Array::Double(v) => v.iter().for_each(|x| x.write_wire(endianness, out)),
        Array::Char(v) => {
            for s in v {
                push_binary_string(out, s)?;
            }
        }
    }
    Ok(())
}

/// Binary readers take a leading `#` as the start of a comment.
fn check_binary_name(name: &str) -> Result<()> {
    if name.starts_with('#') {
        return Err(Error::write(format!(
            "Names in roff binary format cannot start with '#'. found '{}'",
            name
        )));
    }
    Ok(())
}

/// Encodes a complete document in the binary format.
pub(crate) fn encode_binary(document: &Document, endianness: Endianness) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.extend_from_slice(b"roff-bin\0#ROFF file#\0");
    out.extend_from_slice(creator().as_bytes());
    out.push(0);
    for (tag, keys) in document {
        check_binary_name(tag)?;
        out.extend_from_slice(b"tag\0");
        push_binary_string(&mut out, tag)?;
        for (name, value) in keys {
            check_binary_name(name)?;
            if let Value::Array(array) = value {
                out.extend_from_slice(b"array\0");
                out.extend_from_slice(array.element_type().keyword().as_bytes());
                out.push(0);
                push_binary_string(&mut out, name)?;
                push_binary_array(&mut out, array, endianness)?;
            } else {
                out.extend_from_slice(value.element_type().keyword().as_bytes());
                out.push(0);
                push_binary_string(&mut out, name)?;
                push_binary_scalar(&mut out, value, endianness)?;
            }
        }
        out.extend_from_slice(b"endtag\0");
    }
    Ok(out)
}

fn check_ascii_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::write("Names in roff ascii format cannot have 0 length."));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(Error::write(format!(
            "Names in roff ascii format cannot contain space. found '{}'",
            name
        )));
    }
    if name.contains('#') {
        return Err(Error::write(format!(
            "Names in roff ascii format cannot contain '#'. found '{}'",
            name
        )));
    }
    Ok(())
}

fn push_ascii_string(out: &mut String, string: &str) -> Result<()> {
    if string.contains('"') {
        return Err(Error::write(format!(
            "char values cannot contain '\"' in roff ascii format. found {:?}",
            string
        )));
    }
    out.push('"');
    out.push_str(string);
    out.push('"');
    Ok(())
}

fn push_ascii_float<F: Into<f64> + std::fmt::Debug + Copy>(out: &mut String, value: F) -> Result<()> {
    if !value.into().is_finite() {
        return Err(Error::write(format!(
            "Non-finite value {:?} cannot be written in roff ascii format",
            value
        )));
    }
    out.push_str(&format!("{:?}", value));
    Ok(())
}

fn push_ascii_scalar(out: &mut String, value: &Value) -> Result<()> {
    match value {
        Value::Bool(b) => out.push(if *b { '1' } else { '0' }),
        Value::Byte(b) => out.push_str(&b.to_string()),
        Value::Int(i) => out.push_str(&i.to_string()),
        Value::Float(f) => push_ascii_float(out, *f)?,
        Value::Double(d) => push_ascii_float(out, *d)?,
        Value::Char(s) => push_ascii_string(out, s)?,
        Value::Array(_) => return Err(Error::write("Roff does not support nested arrays")),
    }
    Ok(())
}

fn push_ascii_array(out: &mut String, array: &Array) -> Result<()> {
    fn lines<T>(
        out: &mut String,
        items: &[T],
        mut push: impl FnMut(&mut String, &T) -> Result<()>,
    ) -> Result<()> {
        for item in items {
            push(out, item)?;
            out.push('\n');
        }
        Ok(())
    }

    match array {
        Array::Bool(v) => lines(out, v, |out, b| push_ascii_scalar(out, &Value::Bool(*b))),
        Array::Bytes(v) => lines(out, v, |out, b| {
            out.push_str(&b.to_string());
            Ok(())
        }),
        Array::Int(v) => lines(out, v, |out, i| {
            out.push_str(&i.to_string());
            Ok(())
        }),
        Array::Float(v) => lines(out, v, |out, f| push_ascii_float(out, *f)),
        Array::Double(v) => lines(out, v, |out, d| push_ascii_float(out, *d)),
        Array::Char(v) => lines(out, v, |out, s| push_ascii_string(out, s)),
    }
}

/// Encodes a complete document in the ASCII format.
pub(crate) fn encode_ascii(document: &Document) -> Result<Vec<u8>> {
    let mut out = String::new();
    out.push_str("roff-asc\n#ROFF file#\n");
    out.push_str(&creator());
    out.push('\n');
    for (tag, keys) in document {
        check_ascii_name(tag)?;
        out.push_str("tag ");
        out.push_str(tag);
        out.push('\n');
        for (name, value) in keys {
            check_ascii_name(name)?;
            if let Value::Array(array) = value {
                out.push_str(&format!(
                    "array {} {} {}\n",
                    array.element_type(),
                    name,
                    array.len()
                ));
                push_ascii_array(&mut out, array)?;
            } else {
                out.push_str(&format!("{} {} ", value.element_type(), name));
                push_ascii_scalar(&mut out, value)?;
                out.push('\n');
            }
        }
        out.push_str("endtag\n");
    }
    Ok(out.into_bytes())
}
