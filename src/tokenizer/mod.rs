//! Tokenization of ROFF streams.
//!
//! [`RoffTokenizer`] reads the 8 byte header, picks the body grammar for the encoding
//! it announces, and then yields tokens lazily as they are pulled:
//!
//! ```rust
//! use roffio::tokenizer::{RoffTokenizer, TokenKind};
//! use roffio::{Endianness, FileMode};
//! use std::io::Cursor;
//!
//! let input = Cursor::new(b"roff-asc tag t int x 3 endtag".to_vec());
//! let tokenizer = RoffTokenizer::new(input, FileMode::Text, Endianness::Little).unwrap();
//! let kinds: Vec<TokenKind> = tokenizer.map(|token| token.unwrap().kind).collect();
//! assert_eq!(
//!     kinds,
//!     vec![
//!         TokenKind::RoffAsc,
//!         TokenKind::Tag,
//!         TokenKind::Name,
//!         TokenKind::Int,
//!         TokenKind::Name,
//!         TokenKind::NumericValue,
//!         TokenKind::EndTag,
//!     ]
//! );
//! ```

pub mod binary;
pub mod body;
pub mod combinators;
pub mod source;
pub mod text;
pub mod token;

pub use self::body::{ArrayData, BodyState, BodyTokenizer};
pub use self::combinators::Rewind;
pub use self::source::Source;
pub use self::token::{Token, TokenKind};

use self::binary::BinaryBodyTokenizer;
use self::text::TextBodyTokenizer;
use crate::byte_order::{DecodeContext, Endianness};
use crate::error::{Error, Result};
use crate::options::FileMode;
use std::collections::VecDeque;
use std::io::{Read, Seek};
use std::rc::Rc;

const HEADER_LEN: usize = 8;

/// Reads the header and reports which encoding it announces.
fn tokenize_header<R: Read + Seek>(source: &mut Source<R>, mode: FileMode) -> Result<Token> {
    let start = source.position();
    let header = source.read_upto(HEADER_LEN)?;
    let end = start + HEADER_LEN as u64;
    match (header.as_slice(), mode) {
        (b"roff-bin", FileMode::Binary) => match source.read_byte()? {
            Some(0) => Ok(Token::new(TokenKind::RoffBin, start, end)),
            other => {
                source.seek_to(start)?;
                Err(Error::tokenization(
                    end,
                    format!(
                        "Expected delimiter after header token got {:?}",
                        other.map(char::from)
                    ),
                ))
            }
        },
        (b"roff-asc", FileMode::Text) => Ok(Token::new(TokenKind::RoffAsc, start, end)),
        (b"roff-asc", FileMode::Binary) => {
            source.seek_to(start)?;
            Err(Error::wrong_file_mode(
                "Ascii formatted roff file was opened in binary mode!",
            ))
        }
        (b"roff-bin", FileMode::Text) => {
            source.seek_to(start)?;
            Err(Error::wrong_file_mode(
                "Binary formatted roff file was opened in text mode!",
            ))
        }
        _ => {
            source.seek_to(start)?;
            Err(Error::tokenization(
                start,
                format!(
                    "Did not find roff header, got {:?}.",
                    String::from_utf8_lossy(&header)
                ),
            ))
        }
    }
}

/// Lazy token stream over a whole ROFF file.
///
/// The first token is the header (`RoffBin` or `RoffAsc`). After an error the
/// iterator is fused and yields nothing more.
///
/// The byte order used for binary array sizes lives in a [`DecodeContext`] shared
/// with whoever holds [`RoffTokenizer::context`], so a swap made by the parser takes
/// effect here immediately.
pub struct RoffTokenizer<R> {
    source: Source<R>,
    context: Rc<DecodeContext>,
    mode: FileMode,
    header: Option<TokenKind>,
    state: BodyState,
    queue: VecDeque<Token>,
    failed: bool,
}

impl<R: Read + Seek> RoffTokenizer<R> {
    /// Creates a tokenizer starting at the current position of `reader`.
    pub fn new(reader: R, mode: FileMode, endianness: Endianness) -> Result<Self> {
        Ok(Self::from_source(Source::new(reader)?, mode, endianness))
    }

    pub fn from_source(source: Source<R>, mode: FileMode, endianness: Endianness) -> Self {
        RoffTokenizer {
            source,
            context: DecodeContext::new(endianness),
            mode,
            header: None,
            state: BodyState::Tags,
            queue: VecDeque::new(),
            failed: false,
        }
    }

    #[inline]
    pub fn mode(&self) -> FileMode {
        self.mode
    }

    /// Reads the header unless it has been read already.
    ///
    /// # Errors
    ///
    /// [`Error::WrongFileMode`] if the header announces the other encoding than the
    /// tokenizer's mode; [`Error::Tokenization`] if there is no ROFF header.
    pub fn read_header(&mut self) -> Result<TokenKind> {
        if let Some(kind) = self.header {
            return Ok(kind);
        }
        let token = tokenize_header(&mut self.source, self.mode)?;
        tracing::debug!(header = %token.kind, "found roff header");
        self.header = Some(token.kind);
        self.queue.push_back(token);
        Ok(token.kind)
    }

    /// Rewinds to where the source started and switches to `mode`.
    pub fn restart(&mut self, mode: FileMode) -> Result<()> {
        let origin = self.source.origin();
        self.source.seek_to(origin)?;
        self.mode = mode;
        self.header = None;
        self.state = BodyState::Tags;
        self.queue.clear();
        self.failed = false;
        Ok(())
    }

    /// Returns `true` once a `roff-bin` header has been read.
    pub fn is_binary(&self) -> bool {
        self.header == Some(TokenKind::RoffBin)
    }

    pub fn context(&self) -> Rc<DecodeContext> {
        Rc::clone(&self.context)
    }

    pub fn endianness(&self) -> Endianness {
        self.context.endianness()
    }

    /// Flips the byte order for every numeric value not yet decoded.
    pub fn swap_endianness(&mut self) {
        self.context.swap();
    }

    pub fn source_mut(&mut self) -> &mut Source<R> {
        &mut self.source
    }

    pub fn into_inner(self) -> R {
        self.source.into_inner()
    }

    fn fill_queue(&mut self) -> Result<()> {
        let header = self.read_header()?;
        while self.queue.is_empty() && self.state != BodyState::Done {
            match header {
                TokenKind::RoffBin => {
                    let mut body = BinaryBodyTokenizer::new(&mut self.source, &self.context);
                    self.state.advance(&mut body, &mut self.queue)?;
                }
                _ => {
                    let mut body = TextBodyTokenizer::new(&mut self.source);
                    self.state.advance(&mut body, &mut self.queue)?;
                }
            }
        }
        Ok(())
    }
}

impl<R: Read + Seek> Iterator for RoffTokenizer<R> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if self.queue.is_empty() {
            if let Err(err) = self.fill_queue() {
                self.failed = true;
                return Some(Err(err));
            }
        }
        self.queue.pop_front().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tokenize(bytes: &[u8], mode: FileMode) -> Result<Vec<Token>> {
        RoffTokenizer::new(Cursor::new(bytes.to_vec()), mode, Endianness::Little)?.collect()
    }

    fn kinds(bytes: &[u8], mode: FileMode) -> Vec<TokenKind> {
        tokenize(bytes, mode)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_binary_file() {
        let bytes = b"roff-bin\0#ROFF file#\0tag\0t\0int\0x\0\x01\0\0\0endtag\0";
        assert_eq!(
            kinds(bytes, FileMode::Binary),
            vec![
                TokenKind::RoffBin,
                TokenKind::Tag,
                TokenKind::Name,
                TokenKind::Int,
                TokenKind::Name,
                TokenKind::BinaryNumericValue,
                TokenKind::EndTag,
            ]
        );
    }

    #[test]
    fn test_text_file_with_arrays() {
        let text = b"roff-asc\n#ROFF file#\ntag t\narray int a 2\n1\n2\nendtag\ntag eof\nendtag\n";
        assert_eq!(
            kinds(text, FileMode::Text),
            vec![
                TokenKind::RoffAsc,
                TokenKind::Tag,
                TokenKind::Name,
                TokenKind::Array,
                TokenKind::Int,
                TokenKind::Name,
                TokenKind::NumericValue,
                TokenKind::NumericValue,
                TokenKind::NumericValue,
                TokenKind::EndTag,
                TokenKind::Tag,
                TokenKind::Name,
                TokenKind::EndTag,
            ]
        );
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(kinds(b"roff-bin\0", FileMode::Binary), vec![TokenKind::RoffBin]);
        assert_eq!(kinds(b"roff-asc  ", FileMode::Text), vec![TokenKind::RoffAsc]);
    }

    #[test]
    fn test_wrong_file_mode() {
        assert!(matches!(
            tokenize(b"roff-asc tag t endtag", FileMode::Binary),
            Err(Error::WrongFileMode(_))
        ));
        assert!(matches!(
            tokenize(b"roff-bin\0tag\0t\0endtag\0", FileMode::Text),
            Err(Error::WrongFileMode(_))
        ));
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            tokenize(b"roff-xyz", FileMode::Binary),
            Err(Error::Tokenization { .. })
        ));
        assert!(matches!(
            tokenize(b"roff-binx", FileMode::Binary),
            Err(Error::Tokenization { .. })
        ));
    }

    #[test]
    fn test_fused_after_error() {
        let mut tokenizer = RoffTokenizer::new(
            Cursor::new(b"roff-asc tag t bogus".to_vec()),
            FileMode::Text,
            Endianness::Little,
        )
        .unwrap();
        let results: Vec<_> = tokenizer.by_ref().collect();
        assert!(results.last().unwrap().is_err());
        assert!(tokenizer.next().is_none());
    }

    #[test]
    fn test_restart_in_other_mode() {
        let mut tokenizer = RoffTokenizer::new(
            Cursor::new(b"roff-asc tag t endtag".to_vec()),
            FileMode::Binary,
            Endianness::Little,
        )
        .unwrap();
        assert!(matches!(tokenizer.read_header(), Err(Error::WrongFileMode(_))));
        tokenizer.restart(FileMode::Text).unwrap();
        assert_eq!(tokenizer.read_header().unwrap(), TokenKind::RoffAsc);
        assert_eq!(tokenizer.count(), 4);
    }

    #[test]
    fn test_swap_is_seen_by_array_sizes() {
        let bytes = b"roff-bin\0tag\0t\0array\0byte\0b\0\0\0\0\x01\x09endtag\0";
        let mut tokenizer =
            RoffTokenizer::new(Cursor::new(bytes.to_vec()), FileMode::Binary, Endianness::Little)
                .unwrap();
        for _ in 0..3 {
            tokenizer.next().unwrap().unwrap();
        }
        tokenizer.swap_endianness();
        let rest: Vec<TokenKind> = tokenizer.map(|token| token.unwrap().kind).collect();
        assert_eq!(
            rest,
            vec![
                TokenKind::Array,
                TokenKind::Byte,
                TokenKind::Name,
                TokenKind::BinaryNumericValue,
                TokenKind::ArrayBlob,
                TokenKind::EndTag,
            ]
        );
    }
}
