//! Byte order detection through the `filedata` tag.
//!
//! A binary ROFF file says nothing about its byte order until the `byteswaptest`
//! key of its `filedata` tag, which holds the integer `1` as written. Reading it back
//! as anything else means the file was written in the other byte order, and every
//! numeric value that follows has to be decoded swapped.

use crate::error::{record_warning, Error, Result, Warning};
use crate::parser::{ParsedValue, RoffParser};
use crate::value::Value;
use std::io::{Read, Seek};

const FILEDATA: &str = "filedata";
const BYTESWAPTEST: &str = "byteswaptest";

/// Tag-level iteration that applies the `byteswaptest` of the first `filedata` tag.
pub struct EndiannessHandler<R> {
    parser: RoffParser<R>,
    found_byteswaptest: bool,
    warnings: Vec<Warning>,
}

impl<R: Read + Seek> EndiannessHandler<R> {
    pub fn new(parser: RoffParser<R>) -> Self {
        EndiannessHandler {
            parser,
            found_byteswaptest: false,
            warnings: Vec::new(),
        }
    }

    /// Warnings raised so far.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_inner(self) -> R {
        self.parser.into_inner()
    }

    /// Moves to the next tag, or returns `None` after the last one.
    ///
    /// # Errors
    ///
    /// Besides parse errors, [`Error::Format`] for a `filedata` tag without a
    /// `byteswaptest` key or for a second `filedata` tag.
    pub fn next_tag(&mut self) -> Result<Option<TagReader<'_, R>>> {
        let Some(name) = self.parser.next_tag_name()? else {
            return Ok(None);
        };
        if name == FILEDATA {
            let keys = self.read_filedata()?;
            return Ok(Some(TagReader {
                handler: self,
                name,
                buffered: Some(keys.into_iter()),
                done: false,
            }));
        }
        if !self.found_byteswaptest && self.parser.is_binary() {
            let endianness = self.parser.endianness();
            record_warning(&mut self.warnings, Warning::MissingFiledata { endianness });
        }
        Ok(Some(TagReader {
            handler: self,
            name,
            buffered: None,
            done: false,
        }))
    }

    /// Reads the whole `filedata` tag. The byte order is switched as soon as
    /// `byteswaptest` is seen, and arrays are decoded only once the tag is complete.
    fn read_filedata(&mut self) -> Result<Vec<(String, Value)>> {
        if self.found_byteswaptest {
            return Err(Error::format("Roff file has duplicate filedata tags."));
        }
        let mut keys = Vec::new();
        while let Some((name, value)) = self.parser.next_tagkey()? {
            let value = if name == BYTESWAPTEST && !self.found_byteswaptest {
                self.found_byteswaptest = true;
                if self.parser.force(value)? != Value::Int(1) {
                    self.parser.swap_endianness();
                }
                ParsedValue::Ready(Value::Int(1))
            } else {
                value
            };
            keys.push((name, value));
        }
        if !self.found_byteswaptest {
            return Err(Error::format(
                "Roff file tag filedata is missing byteswaptest tagkey.",
            ));
        }
        keys.into_iter()
            .map(|(name, value)| Ok((name, self.parser.force(value)?)))
            .collect()
    }
}

/// Iterator over the keys of one tag, borrowed from the reader.
///
/// Keys left unread are skipped when the next tag is requested.
pub struct TagReader<'h, R> {
    handler: &'h mut EndiannessHandler<R>,
    name: String,
    buffered: Option<std::vec::IntoIter<(String, Value)>>,
    done: bool,
}

impl<R> TagReader<'_, R> {
    /// The tag's name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<R: Read + Seek> Iterator for TagReader<'_, R> {
    type Item = Result<(String, Value)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(buffered) = &mut self.buffered {
            return buffered.next().map(Ok);
        }
        match self.handler.parser.next_tagkey_value() {
            Ok(Some(key)) => Some(Ok(key)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
