//! The lexical model: token kinds and spans.

use super::source::Source;
use crate::error::{Error, Result};
use crate::value::ElementType;
use std::fmt;
use std::io::{Read, Seek};

/// Kind of a token in either encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    RoffAsc,
    RoffBin,
    Tag,
    EndTag,
    StringLiteral,
    NumericValue,
    BinaryNumericValue,
    Name,
    Char,
    Bool,
    Byte,
    Int,
    Float,
    Double,
    Array,
    ArrayBlob,
}

impl TokenKind {
    pub const SIMPLE_TYPES: [TokenKind; 6] = [
        TokenKind::Char,
        TokenKind::Bool,
        TokenKind::Byte,
        TokenKind::Int,
        TokenKind::Float,
        TokenKind::Double,
    ];

    /// Returns the literal spelling of keyword kinds.
    #[must_use]
    pub const fn keyword(self) -> Option<&'static str> {
        match self {
            TokenKind::RoffBin => Some("roff-bin"),
            TokenKind::RoffAsc => Some("roff-asc"),
            TokenKind::Tag => Some("tag"),
            TokenKind::EndTag => Some("endtag"),
            TokenKind::Array => Some("array"),
            TokenKind::Char => Some("char"),
            TokenKind::Bool => Some("bool"),
            TokenKind::Byte => Some("byte"),
            TokenKind::Int => Some("int"),
            TokenKind::Float => Some("float"),
            TokenKind::Double => Some("double"),
            _ => None,
        }
    }

    /// Returns the element type named by a simple type keyword.
    #[must_use]
    pub const fn element_type(self) -> Option<ElementType> {
        match self {
            TokenKind::Char => Some(ElementType::Char),
            TokenKind::Bool => Some(ElementType::Bool),
            TokenKind::Byte => Some(ElementType::Byte),
            TokenKind::Int => Some(ElementType::Int),
            TokenKind::Float => Some(ElementType::Float),
            TokenKind::Double => Some(ElementType::Double),
            _ => None,
        }
    }
}

impl From<ElementType> for TokenKind {
    fn from(element: ElementType) -> Self {
        match element {
            ElementType::Char => TokenKind::Char,
            ElementType::Bool => TokenKind::Bool,
            ElementType::Byte => TokenKind::Byte,
            ElementType::Int => TokenKind::Int,
            ElementType::Float => TokenKind::Float,
            ElementType::Double => TokenKind::Double,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.keyword() {
            Some(keyword) => f.write_str(keyword),
            None => write!(f, "{:?}", self),
        }
    }
}

/// A span `[start, end)` of the stream, tagged with its kind.
///
/// Tokens never hold their bytes. The value is read back from the stream on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: u64,
    pub end: u64,
}

impl Token {
    #[must_use]
    pub const fn new(kind: TokenKind, start: u64, end: u64) -> Self {
        Token { kind, start, end }
    }

    #[must_use]
    pub const fn len(&self) -> u64 {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Reads the bytes covered by the token. The stream position is left unchanged.
    pub fn value<R: Read + Seek>(&self, source: &mut Source<R>) -> Result<Vec<u8>> {
        source.read_span(self.start, self.end)
    }

    /// Reads the token's bytes as UTF-8 text.
    pub fn text<R: Read + Seek>(&self, source: &mut Source<R>) -> Result<String> {
        let bytes = self.value(source)?;
        String::from_utf8(bytes).map_err(|_| {
            Error::syntax(
                self.start,
                format!("{} at {} is not valid UTF-8", self.kind, self.start),
            )
        })
    }
}
