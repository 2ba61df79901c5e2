//! Body tokenizer for `roff-bin` files.
//!
//! Every keyword, name and string value is terminated by a single NUL byte. Numeric
//! values have a fixed width and no terminator. `#...#\0` comments may appear before
//! keywords and names but never in front of a value, since a value starting with `#`
//! could not be told apart from a comment.

use super::body::{tokenize_word, ArrayData, BodyTokenizer};
use super::combinators::{repeated, Rewind};
use super::source::Source;
use super::token::{Token, TokenKind};
use crate::byte_order::{DecodeContext, WireNumber};
use crate::error::{Error, Result};
use crate::value::ElementType;
use std::io::{Read, Seek};

/// A view of the source as a binary body. Array sizes are decoded with the byte order
/// current in `context`.
pub struct BinaryBodyTokenizer<'a, R> {
    source: &'a mut Source<R>,
    context: &'a DecodeContext,
}

impl<'a, R: Read + Seek> BinaryBodyTokenizer<'a, R> {
    pub fn new(source: &'a mut Source<R>, context: &'a DecodeContext) -> Self {
        BinaryBodyTokenizer { source, context }
    }

    /// Takes a single NUL byte.
    fn tokenize_delimiter(&mut self) -> Result<()> {
        let start = self.source.position();
        if self.source.read_byte()? == Some(0) {
            Ok(())
        } else {
            self.source.seek_to(start)?;
            Err(Error::tokenization(
                start,
                format!("Expected delimiter at {}", start),
            ))
        }
    }

    /// Takes a `#...#\0` comment. Comments produce no tokens.
    fn tokenize_comment(&mut self) -> Result<Vec<Token>> {
        let start = self.source.position();
        if self.source.read_byte()? != Some(b'#') {
            self.source.seek_to(start)?;
            return Err(Error::tokenization(
                start,
                format!("Expected comment at {}", start),
            ));
        }
        loop {
            match self.source.read_byte()? {
                Some(b'#') => break,
                Some(_) => {}
                None => {
                    self.source.seek_to(start)?;
                    return Err(Error::tokenization(
                        start,
                        "Reached end of stream while reading comment",
                    ));
                }
            }
        }
        if let Err(err) = self.tokenize_delimiter() {
            self.source.seek_to(start)?;
            return Err(err);
        }
        Ok(Vec::new())
    }

    fn tokenize_comments(&mut self) -> Result<()> {
        repeated(self, |t: &mut Self| t.tokenize_comment())?;
        Ok(())
    }

    /// Takes any bytes up to a NUL. The token excludes the NUL.
    fn tokenize_string(&mut self, kind: TokenKind) -> Result<Vec<Token>> {
        let start = self.source.position();
        loop {
            match self.source.read_byte()? {
                Some(0) => {
                    let end = self.source.position() - 1;
                    return Ok(vec![Token::new(kind, start, end)]);
                }
                Some(_) => {}
                None => {
                    self.source.seek_to(start)?;
                    return Err(Error::tokenization(
                        start,
                        format!("could not tokenize string at {}", start),
                    ));
                }
            }
        }
    }

    fn tokenize_numeric_value(&mut self, width: usize) -> Result<Vec<Token>> {
        let start = self.source.position();
        if self.source.skip(width as u64)? {
            Ok(vec![Token::new(
                TokenKind::BinaryNumericValue,
                start,
                self.source.position(),
            )])
        } else {
            Err(Error::tokenization(
                start,
                format!("Reached end of stream while reading {} byte value", width),
            ))
        }
    }
}

impl<R: Read + Seek> Rewind for BinaryBodyTokenizer<'_, R> {
    fn position(&self) -> u64 {
        self.source.position()
    }

    fn rewind(&mut self, position: u64) -> Result<()> {
        self.source.seek_to(position)
    }
}

impl<R: Read + Seek> BodyTokenizer for BinaryBodyTokenizer<'_, R> {
    fn tokenize_keyword(&mut self, kind: TokenKind) -> Result<Vec<Token>> {
        let start = self.source.position();
        let word = kind
            .keyword()
            .ok_or_else(|| Error::tokenization(start, format!("{} is not a keyword", kind)))?;
        self.tokenize_comments()?;
        let result = tokenize_word(self.source, word, kind).and_then(|tokens| {
            self.tokenize_delimiter()?;
            Ok(tokens)
        });
        if result.is_err() {
            self.source.seek_to(start)?;
        }
        result
    }

    fn tokenize_name(&mut self) -> Result<Vec<Token>> {
        let start = self.source.position();
        self.tokenize_comments()?;
        let result = self.tokenize_string(TokenKind::Name);
        if result.is_err() {
            self.source.seek_to(start)?;
        }
        result
    }

    fn tokenize_value(&mut self, element: ElementType) -> Result<Vec<Token>> {
        match element.fixed_width() {
            Some(width) => self.tokenize_numeric_value(width),
            None => self.tokenize_string(TokenKind::StringLiteral),
        }
    }

    fn tokenize_array_size(&mut self) -> Result<Vec<Token>> {
        self.tokenize_numeric_value(u32::WIDTH)
    }

    fn tokenize_array_data(&mut self, element: ElementType, size: &Token) -> Result<ArrayData> {
        let bytes = size.value(self.source)?;
        let count = u32::from_wire(&bytes, self.context.endianness()).ok_or_else(|| {
            Error::tokenization(size.start, "Expected 4 byte array size")
        })?;
        let Some(width) = element.fixed_width() else {
            return Ok(ArrayData::Elements(count));
        };
        let start = self.source.position();
        let length = u64::from(count) * width as u64;
        if self.source.skip(length)? {
            Ok(ArrayData::Blob(Token::new(
                TokenKind::ArrayBlob,
                start,
                self.source.position(),
            )))
        } else {
            Err(Error::tokenization(
                start,
                format!(
                    "Reached end of stream while reading {} values of type {}",
                    count, element
                ),
            ))
        }
    }

    fn tokenize_end_of_file(&mut self) -> Result<Vec<Token>> {
        let start = self.source.position();
        self.tokenize_comments()?;
        let at = self.source.position();
        match self.source.read_byte()? {
            None => Ok(Vec::new()),
            Some(byte) => {
                self.source.seek_to(start)?;
                Err(Error::tokenization(
                    at,
                    format!(
                        "Expected end of file or new tag at {} got {:?}",
                        at, byte as char
                    ),
                ))
            }
        }
    }
}
