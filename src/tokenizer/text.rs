//! Body tokenizer for `roff-asc` files.
//!
//! Tokens are separated by any run of whitespace and `#...#` comments. Numeric values
//! are decimal or exponential literals, and strings are delimited by `"` with no escape
//! sequences.

use super::body::{tokenize_word, ArrayData, BodyTokenizer};
use super::combinators::{one_of, repeated, Rewind, Tokenizer};
use super::source::Source;
use super::token::{Token, TokenKind};
use crate::byte_order::WireNumber;
use crate::error::{Error, Result};
use crate::value::ElementType;
use std::io::{Read, Seek};

fn is_numeric_start(byte: u8) -> bool {
    byte.is_ascii_digit() || byte == b'-'
}

fn is_numeric_continuation(byte: u8) -> bool {
    byte.is_ascii_digit() || matches!(byte, b'.' | b'e' | b'E' | b'+' | b'-')
}

/// A view of the source as a text body.
pub struct TextBodyTokenizer<'a, R> {
    source: &'a mut Source<R>,
}

impl<'a, R: Read + Seek> TextBodyTokenizer<'a, R> {
    pub fn new(source: &'a mut Source<R>) -> Self {
        TextBodyTokenizer { source }
    }

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
                Some(b'#') => return Ok(Vec::new()),
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
    }

    fn tokenize_space(&mut self) -> Result<Vec<Token>> {
        let start = self.source.position();
        let mut end = start;
        while let Some(byte) = self.source.read_byte()? {
            if !byte.is_ascii_whitespace() {
                break;
            }
            end = self.source.position();
        }
        self.source.seek_to(end)?;
        if end == start {
            return Err(Error::tokenization(
                start,
                format!("Expected space at {}", start),
            ));
        }
        Ok(Vec::new())
    }

    /// Takes any run of whitespace and comments, including none.
    fn tokenize_delimiter(&mut self) -> Result<()> {
        repeated(self, |t: &mut Self| {
            let comment = |t: &mut Self| t.tokenize_comment();
            let space = |t: &mut Self| t.tokenize_space();
            let alternatives: [Tokenizer<'_, Self>; 2] = [&comment, &space];
            one_of(t, alternatives)
        })?;
        Ok(())
    }

    /// Runs `tokenizer` after the delimiter, restoring the start position on failure.
    fn delimited<F>(&mut self, tokenizer: F) -> Result<Vec<Token>>
    where
        F: FnOnce(&mut Self) -> Result<Vec<Token>>,
    {
        let start = self.source.position();
        self.tokenize_delimiter()?;
        let result = tokenizer(self);
        if result.is_err() {
            self.source.seek_to(start)?;
        }
        result
    }

    fn tokenize_numeric_value(&mut self) -> Result<Vec<Token>> {
        self.delimited(|t| {
            let start = t.source.position();
            let mut end = start;
            if let Some(first) = t.source.read_byte()? {
                if is_numeric_start(first) {
                    end = t.source.position();
                    while let Some(byte) = t.source.read_byte()? {
                        if !is_numeric_continuation(byte) {
                            break;
                        }
                        end = t.source.position();
                    }
                }
            }
            t.source.seek_to(end)?;
            if end == start {
                return Err(Error::tokenization(
                    start,
                    format!("Expected numeric value at {}", start),
                ));
            }
            Ok(vec![Token::new(TokenKind::NumericValue, start, end)])
        })
    }

    /// The token covers the text between the quotes.
    fn tokenize_string_literal(&mut self) -> Result<Vec<Token>> {
        self.delimited(|t| {
            let start = t.source.position();
            if t.source.read_byte()? != Some(b'"') {
                return Err(Error::tokenization(
                    start,
                    format!("Expected string at {}", start),
                ));
            }
            let literal_start = t.source.position();
            loop {
                match t.source.read_byte()? {
                    Some(b'"') => {
                        let literal_end = t.source.position() - 1;
                        return Ok(vec![Token::new(
                            TokenKind::StringLiteral,
                            literal_start,
                            literal_end,
                        )]);
                    }
                    Some(_) => {}
                    None => {
                        return Err(Error::tokenization(
                            start,
                            "Reached end of stream while reading string literal",
                        ))
                    }
                }
            }
        })
    }
}

impl<R: Read + Seek> Rewind for TextBodyTokenizer<'_, R> {
    fn position(&self) -> u64 {
        self.source.position()
    }

    fn rewind(&mut self, position: u64) -> Result<()> {
        self.source.seek_to(position)
    }
}

impl<R: Read + Seek> BodyTokenizer for TextBodyTokenizer<'_, R> {
    fn tokenize_keyword(&mut self, kind: TokenKind) -> Result<Vec<Token>> {
        let word = kind.keyword().ok_or_else(|| {
            Error::tokenization(self.source.position(), format!("{} is not a keyword", kind))
        })?;
        self.delimited(|t| tokenize_word(t.source, word, kind))
    }

    fn tokenize_name(&mut self) -> Result<Vec<Token>> {
        self.delimited(|t| {
            let start = t.source.position();
            let mut end = start;
            while let Some(byte) = t.source.read_byte()? {
                if byte.is_ascii_whitespace() {
                    break;
                }
                end = t.source.position();
            }
            t.source.seek_to(end)?;
            if end == start {
                return Err(Error::tokenization(
                    start,
                    format!("could not tokenize name at {}", start),
                ));
            }
            Ok(vec![Token::new(TokenKind::Name, start, end)])
        })
    }

    /// Any numeric or string literal. Whether it suits `element` is checked when the
    /// value is parsed.
    fn tokenize_value(&mut self, _element: ElementType) -> Result<Vec<Token>> {
        let numeric = |t: &mut Self| t.tokenize_numeric_value();
        let string = |t: &mut Self| t.tokenize_string_literal();
        let alternatives: [Tokenizer<'_, Self>; 2] = [&numeric, &string];
        one_of(self, alternatives)
    }

    fn tokenize_array_size(&mut self) -> Result<Vec<Token>> {
        self.tokenize_numeric_value()
    }

    /// A size that is not a plain count announces no elements; the parser reports it
    /// when decoding the size.
    fn tokenize_array_data(&mut self, _element: ElementType, size: &Token) -> Result<ArrayData> {
        let text = size.text(self.source)?;
        Ok(ArrayData::Elements(u32::parse_text(&text).unwrap_or(0)))
    }

    fn tokenize_end_of_file(&mut self) -> Result<Vec<Token>> {
        let start = self.source.position();
        self.tokenize_delimiter()?;
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
