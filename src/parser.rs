//! Recursive-descent parser over the token stream.
//!
//! [`RoffParser`] walks the file one tag at a time. For each tag it hands out a
//! [`RoffTagKeyParser`] that yields the tag's keys as `(name, value)` pairs.
//!
//! Values of binary arrays are not decoded when parsed: the blob becomes a
//! [`PendingArray`] that is decoded later with the byte order current *at that time*.
//! This lets the `byteswaptest` key, which may come after an array in the same tag,
//! decide how the array is read.

use crate::byte_order::{decode_run, DecodeContext, Endianness, WireNumber};
use crate::error::{Error, Result};
use crate::tokenizer::{RoffTokenizer, Source, Token, TokenKind};
use crate::value::{Array, ElementType, Value};
use std::io::{Read, Seek};
use std::rc::Rc;

/// An array whose blob has been tokenized but not decoded.
#[derive(Debug, Clone)]
pub struct PendingArray {
    element: ElementType,
    count: u32,
    blob: Token,
    context: Rc<DecodeContext>,
}

impl PendingArray {
    #[must_use]
    pub fn element_type(&self) -> ElementType {
        self.element
    }

    #[must_use]
    pub fn len(&self) -> u32 {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Reads the blob back and decodes it with the current byte order.
    pub fn decode<R: Read + Seek>(&self, source: &mut Source<R>) -> Result<Array> {
        let bytes = self.blob.value(source)?;
        let expected = self
            .element
            .fixed_width()
            .map(|width| width as u64 * u64::from(self.count));
        if expected != Some(bytes.len() as u64) {
            return Err(Error::syntax(
                self.blob.start,
                format!(
                    "Array blob of {} bytes does not hold {} values of type {}",
                    bytes.len(),
                    self.count,
                    self.element
                ),
            ));
        }
        let endianness = self.context.endianness();
        Ok(match self.element {
            ElementType::Byte => Array::Bytes(bytes),
            ElementType::Bool => Array::Bool(
                bytes
                    .iter()
                    .enumerate()
                    .map(|(i, byte)| decode_bool(*byte, self.blob.start + i as u64))
                    .collect::<Result<_>>()?,
            ),
            ElementType::Int => Array::Int(decode_run(&bytes, endianness)),
            ElementType::Float => Array::Float(decode_run(&bytes, endianness)),
            ElementType::Double => Array::Double(decode_run(&bytes, endianness)),
            ElementType::Char => {
                return Err(Error::syntax(
                    self.blob.start,
                    "char arrays are never stored as a blob",
                ))
            }
        })
    }
}

/// A tagkey value as it comes out of the parser.
#[derive(Debug, Clone)]
pub enum ParsedValue {
    Ready(Value),
    Pending(PendingArray),
}

fn decode_bool(value: u8, position: u64) -> Result<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(Error::type_error(
            position,
            format!("boolean values must be either 1 or 0, found {}", other),
        )),
    }
}

/// Parses the tag structure of a ROFF stream.
///
/// # Examples
///
/// ```rust
/// use roffio::parser::RoffParser;
/// use roffio::tokenizer::RoffTokenizer;
/// use roffio::{Endianness, FileMode, Value};
/// use std::io::Cursor;
///
/// let input = Cursor::new(b"roff-asc tag y int x 3 endtag".to_vec());
/// let tokens = RoffTokenizer::new(input, FileMode::Text, Endianness::Little).unwrap();
/// let mut parser = RoffParser::new(tokens);
///
/// assert_eq!(parser.next_tag_name().unwrap().as_deref(), Some("y"));
/// let (name, value) = parser.next_tagkey_value().unwrap().unwrap();
/// assert_eq!((name.as_str(), value), ("x", Value::Int(3)));
/// assert!(parser.next_tagkey_value().unwrap().is_none());
/// assert!(parser.next_tag_name().unwrap().is_none());
/// ```
pub struct RoffParser<R> {
    tokens: RoffTokenizer<R>,
    context: Rc<DecodeContext>,
    peeked: Option<Token>,
    started: bool,
    is_binary: bool,
    /// Name of the tag whose keys are being read, until its `endtag` is consumed.
    open_tag: Option<String>,
}

impl<R: Read + Seek> RoffParser<R> {
    pub fn new(tokens: RoffTokenizer<R>) -> Self {
        let context = tokens.context();
        RoffParser {
            tokens,
            context,
            peeked: None,
            started: false,
            is_binary: false,
            open_tag: None,
        }
    }

    /// Whether the stream has a binary header. Only meaningful once parsing started.
    pub fn is_binary(&self) -> bool {
        self.is_binary
    }

    pub fn endianness(&self) -> Endianness {
        self.context.endianness()
    }

    /// Flips the byte order for the parser and its tokenizer alike.
    pub fn swap_endianness(&mut self) {
        self.tokens.swap_endianness();
    }

    pub fn into_inner(self) -> R {
        self.tokens.into_inner()
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        match self.peeked.take() {
            Some(token) => Ok(Some(token)),
            None => self.tokens.next().transpose(),
        }
    }

    fn peek_token(&mut self) -> Result<Option<Token>> {
        if self.peeked.is_none() {
            self.peeked = self.tokens.next().transpose()?;
        }
        Ok(self.peeked)
    }

    /// Position just past the last token handed out, for end-of-stream errors.
    fn position(&mut self) -> u64 {
        self.tokens.source_mut().position()
    }

    fn start(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        match self.next_token()? {
            Some(token) if token.kind == TokenKind::RoffBin => self.is_binary = true,
            Some(token) if token.kind == TokenKind::RoffAsc => self.is_binary = false,
            Some(token) => {
                return Err(Error::syntax(
                    token.start,
                    format!("Expected {} to be one of roff-bin, roff-asc", token.kind),
                ))
            }
            None => {
                let position = self.position();
                return Err(Error::syntax(position, "Expected roff header"));
            }
        }
        Ok(())
    }

    fn text(&mut self, token: &Token) -> Result<String> {
        token.text(self.tokens.source_mut())
    }

    fn bytes(&mut self, token: &Token) -> Result<Vec<u8>> {
        token.value(self.tokens.source_mut())
    }

    fn parse_name(&mut self) -> Result<String> {
        match self.next_token()? {
            Some(token) if token.kind == TokenKind::Name => self.text(&token),
            Some(token) => Err(Error::type_error(
                token.start,
                format!("Expected name at {} found {}", token.start, token.kind),
            )),
            None => {
                let position = self.position();
                Err(Error::syntax(position, "Expected name, reached end of file"))
            }
        }
    }

    /// Moves to the next tag and returns its name, or `None` after the last tag.
    ///
    /// Keys of the previous tag that were not read are skipped.
    pub fn next_tag_name(&mut self) -> Result<Option<String>> {
        self.start()?;
        self.skip_open_tag()?;
        match self.next_token()? {
            None => Ok(None),
            Some(token) if token.kind == TokenKind::Tag => {
                let name = self.parse_name()?;
                self.open_tag = Some(name.clone());
                Ok(Some(name))
            }
            Some(token) => Err(Error::syntax(
                token.start,
                format!(
                    "Parsing ended with trailing tokens at {}: expected tag, found {}",
                    token.start, token.kind
                ),
            )),
        }
    }

    /// Consumes tokens up to and including the `endtag` of the open tag.
    fn skip_open_tag(&mut self) -> Result<()> {
        let Some(name) = self.open_tag.take() else {
            return Ok(());
        };
        loop {
            match self.next_token()? {
                Some(token) if token.kind == TokenKind::EndTag => return Ok(()),
                Some(_) => {}
                None => {
                    let position = self.position();
                    return Err(Error::syntax(
                        position,
                        format!("did not find closing endtag for tag {}", name),
                    ));
                }
            }
        }
    }

    /// Returns a parser for the keys of the tag last returned by
    /// [`next_tag_name`](Self::next_tag_name).
    pub fn tag_keys(&mut self) -> RoffTagKeyParser<'_, R> {
        RoffTagKeyParser { parser: self }
    }

    /// Parses the next key of the open tag, or returns `None` at its `endtag`.
    pub fn next_tagkey(&mut self) -> Result<Option<(String, ParsedValue)>> {
        if self.open_tag.is_none() {
            return Ok(None);
        }
        let token = match self.next_token()? {
            Some(token) => token,
            None => {
                let position = self.position();
                let tag = self.open_tag.take().unwrap_or_default();
                return Err(Error::syntax(
                    position,
                    format!("did not find closing endtag for tag {}", tag),
                ));
            }
        };
        match token.kind {
            TokenKind::EndTag => {
                self.open_tag = None;
                Ok(None)
            }
            TokenKind::Array => self.parse_array_tagkey_body().map(Some),
            kind => match kind.element_type() {
                Some(element) => {
                    let name = self.parse_name()?;
                    let value = self.parse_value(element)?;
                    Ok(Some((name, ParsedValue::Ready(value))))
                }
                None => {
                    let value = self.bytes(&token)?;
                    Err(Error::syntax(
                        token.start,
                        format!(
                            "expected tag key type at {} got {}: {:?}",
                            token.start,
                            kind,
                            String::from_utf8_lossy(&value)
                        ),
                    ))
                }
            },
        }
    }

    /// Like [`next_tagkey`](Self::next_tagkey), decoding pending arrays right away.
    pub fn next_tagkey_value(&mut self) -> Result<Option<(String, Value)>> {
        match self.next_tagkey()? {
            Some((name, value)) => Ok(Some((name, self.force(value)?))),
            None => Ok(None),
        }
    }

    /// Decodes a pending array with the current byte order.
    pub fn force(&mut self, value: ParsedValue) -> Result<Value> {
        match value {
            ParsedValue::Ready(value) => Ok(value),
            ParsedValue::Pending(pending) => Ok(Value::Array(
                pending.decode(self.tokens.source_mut())?,
            )),
        }
    }

    fn expect_value_token(&mut self) -> Result<Token> {
        match self.next_token()? {
            Some(token) => Ok(token),
            None => {
                let position = self.position();
                Err(Error::syntax(position, "Expected value, reached end of file"))
            }
        }
    }

    fn parse_value(&mut self, element: ElementType) -> Result<Value> {
        let token = self.expect_value_token()?;
        self.parse_value_token(element, &token)
    }

    fn parse_value_token(&mut self, element: ElementType, token: &Token) -> Result<Value> {
        Ok(match element {
            ElementType::Char => Value::Char(self.parse_string_literal(token)?),
            ElementType::Bool => Value::Bool(self.parse_boolean(token)?),
            ElementType::Byte => Value::Byte(self.parse_numeric(token, element)?),
            ElementType::Int => Value::Int(self.parse_numeric(token, element)?),
            ElementType::Float => Value::Float(self.parse_numeric(token, element)?),
            ElementType::Double => Value::Double(self.parse_numeric(token, element)?),
        })
    }

    fn parse_string_literal(&mut self, token: &Token) -> Result<String> {
        if token.kind != TokenKind::StringLiteral {
            return Err(Error::type_error(
                token.start,
                format!("Expected string literal at {} found {}", token.start, token.kind),
            ));
        }
        self.text(token)
    }

    fn parse_boolean(&mut self, token: &Token) -> Result<bool> {
        self.check_numeric_kind(token)?;
        let bytes = self.bytes(token)?;
        if bytes.len() != 1 {
            return Err(Error::syntax(
                token.start,
                format!(
                    "too long boolean value, found: {:?}",
                    String::from_utf8_lossy(&bytes)
                ),
            ));
        }
        let value = if token.kind == TokenKind::BinaryNumericValue {
            bytes[0]
        } else {
            self.parse_numeric(token, ElementType::Bool)?
        };
        decode_bool(value, token.start)
    }

    fn check_numeric_kind(&self, token: &Token) -> Result<()> {
        match token.kind {
            TokenKind::NumericValue | TokenKind::BinaryNumericValue => Ok(()),
            TokenKind::StringLiteral => Err(Error::type_error(
                token.start,
                format!("Expected numeric value at {} found string literal", token.start),
            )),
            kind => Err(Error::parsing(
                token.start,
                format!("Expected numeric value, got {} at {}", kind, token.start),
            )),
        }
    }

    fn parse_numeric<T: WireNumber>(&mut self, token: &Token, element: ElementType) -> Result<T> {
        self.check_numeric_kind(token)?;
        if token.kind == TokenKind::NumericValue {
            let text = self.text(token)?;
            T::parse_text(&text).ok_or_else(|| {
                Error::syntax(
                    token.start,
                    format!("Could not parse {} got {:?}", element, text),
                )
            })
        } else {
            let bytes = self.bytes(token)?;
            T::from_wire(&bytes, self.context.endianness()).ok_or_else(|| {
                Error::syntax(
                    token.start,
                    format!("Expected {} bytes for {}, got {}", T::WIDTH, element, bytes.len()),
                )
            })
        }
    }

    fn parse_array_tagkey_body(&mut self) -> Result<(String, ParsedValue)> {
        let element = match self.next_token()? {
            Some(token) => token.kind.element_type().ok_or_else(|| {
                Error::syntax(
                    token.start,
                    format!("Expected {} to be one of the simple types at {}", token.kind, token.start),
                )
            })?,
            None => {
                let position = self.position();
                return Err(Error::syntax(position, "Expected array type, reached end of file"));
            }
        };
        let name = self.parse_name()?;
        let size = self.expect_value_token()?;
        let count: u32 = self.parse_numeric(&size, ElementType::Int)?;

        if let Some(blob) = self.peek_token()? {
            if blob.kind == TokenKind::ArrayBlob {
                self.peeked = None;
                let pending = PendingArray {
                    element,
                    count,
                    blob,
                    context: Rc::clone(&self.context),
                };
                return Ok((name, ParsedValue::Pending(pending)));
            }
        }

        let mut array = Array::empty(element);
        for _ in 0..count {
            let token = match self.next_token()? {
                Some(token) => token,
                None => {
                    let position = self.position();
                    return Err(Error::syntax(
                        position,
                        format!("Expected {} values to follow array {} at {}", count, name, size.start),
                    ));
                }
            };
            let value = self.parse_value_token(element, &token)?;
            array.push(value).map_err(|value| {
                Error::type_error(
                    token.start,
                    format!("{} value in array of {}", value.element_type(), element),
                )
            })?;
        }
        Ok((name, ParsedValue::Ready(Value::Array(array))))
    }
}

/// Iterator over the keys of one tag. Pending arrays are returned undecoded.
pub struct RoffTagKeyParser<'p, R> {
    parser: &'p mut RoffParser<R>,
}

impl<R: Read + Seek> RoffTagKeyParser<'_, R> {
    /// Decodes a pending array with the parser's current byte order.
    pub fn force(&mut self, value: ParsedValue) -> Result<Value> {
        self.parser.force(value)
    }
}

impl<R: Read + Seek> Iterator for RoffTagKeyParser<'_, R> {
    type Item = Result<(String, ParsedValue)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parser.next_tagkey().transpose()
    }
}

#[cfg(test)]
pub(crate) fn parser_for(
    bytes: &[u8],
    mode: crate::options::FileMode,
) -> Result<RoffParser<std::io::Cursor<Vec<u8>>>> {
    let tokens = RoffTokenizer::new(
        std::io::Cursor::new(bytes.to_vec()),
        mode,
        Endianness::default(),
    )?;
    Ok(RoffParser::new(tokens))
}
