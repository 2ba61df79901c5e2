//! Grammar shared by the binary and text encodings.
//!
//! ```text
//! body          := tag_group* end_of_file
//! tag_group     := TAG NAME tagkey* ENDTAG
//! tagkey        := simple_tagkey | array_tagkey
//! simple_tagkey := type NAME value
//! array_tagkey  := ARRAY type NAME size element*
//! ```
//!
//! The encodings differ only in how the terminals are delimited, which the
//! [`BodyTokenizer`] implementations supply. The grammar itself is written once, as
//! free functions over that trait, and driven one step at a time by [`BodyState`] so
//! that tokens are produced as the caller pulls them.

use super::combinators::{one_of, sequence, Rewind, Tokenizer};
use super::source::Source;
use super::token::{Token, TokenKind};
use crate::error::{Error, Result};
use crate::value::ElementType;
use std::collections::VecDeque;
use std::io::{Read, Seek};

/// How the elements of an array follow its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayData {
    /// The whole run of fixed-width values as a single `ARRAYBLOB` token.
    Blob(Token),
    /// This many values, to be tokenized one at a time.
    Elements(u32),
}

/// The encoding-specific terminals of the body grammar.
pub trait BodyTokenizer: Rewind {
    /// Tokenizes a keyword, including any delimiter in front of it.
    fn tokenize_keyword(&mut self, kind: TokenKind) -> Result<Vec<Token>>;

    fn tokenize_name(&mut self) -> Result<Vec<Token>>;

    /// Tokenizes one value of the given type.
    fn tokenize_value(&mut self, element: ElementType) -> Result<Vec<Token>>;

    fn tokenize_array_size(&mut self) -> Result<Vec<Token>>;

    /// Called right after the array size token.
    fn tokenize_array_data(&mut self, element: ElementType, size: &Token) -> Result<ArrayData>;

    fn tokenize_end_of_file(&mut self) -> Result<Vec<Token>>;
}

/// Matches `word` exactly at the current position.
pub(crate) fn tokenize_word<R: Read + Seek>(
    source: &mut Source<R>,
    word: &str,
    kind: TokenKind,
) -> Result<Vec<Token>> {
    let start = source.position();
    let read = source.read_upto(word.len())?;
    if read == word.as_bytes() {
        Ok(vec![Token::new(kind, start, source.position())])
    } else {
        source.seek_to(start)?;
        Err(Error::tokenization(
            start,
            format!(
                "Token {:?} did not match {}",
                String::from_utf8_lossy(&read),
                word
            ),
        ))
    }
}

/// `TAG NAME`
pub fn tokenize_tag_start<T: BodyTokenizer + ?Sized>(tokenizer: &mut T) -> Result<Vec<Token>> {
    let tag = |t: &mut T| t.tokenize_keyword(TokenKind::Tag);
    let name = |t: &mut T| t.tokenize_name();
    let parts: [Tokenizer<'_, T>; 2] = [&tag, &name];
    sequence(tokenizer, parts)
}

/// One of the six simple type keywords.
pub fn tokenize_simple_type<T: BodyTokenizer + ?Sized>(tokenizer: &mut T) -> Result<Vec<Token>> {
    one_of(
        tokenizer,
        TokenKind::SIMPLE_TYPES.map(|kind| move |t: &mut T| t.tokenize_keyword(kind)),
    )
}

fn token_at(tokens: &[Token], index: usize) -> Result<Token> {
    tokens.get(index).copied().ok_or_else(|| {
        let position = tokens.last().map_or(0, |token| token.end);
        Error::tokenization(position, "Expected more tokens")
    })
}

/// Element type named by the `index`th token, which a successful match guarantees
/// is a simple type keyword.
fn element_at(tokens: &[Token], index: usize) -> Result<ElementType> {
    let token = token_at(tokens, index)?;
    token
        .kind
        .element_type()
        .ok_or_else(|| Error::tokenization(token.start, "Expected simple type"))
}

/// `type NAME value`
pub fn tokenize_simple_tagkey<T: BodyTokenizer + ?Sized>(tokenizer: &mut T) -> Result<Vec<Token>> {
    sequence(tokenizer, [|t: &mut T| -> Result<Vec<Token>> {
        let mut tokens = tokenize_simple_type(t)?;
        let element = element_at(&tokens, 0)?;
        tokens.extend(t.tokenize_name()?);
        tokens.extend(t.tokenize_value(element)?);
        Ok(tokens)
    }])
}

/// `ARRAY type NAME size`
pub fn tokenize_array_header<T: BodyTokenizer + ?Sized>(tokenizer: &mut T) -> Result<Vec<Token>> {
    let array = |t: &mut T| t.tokenize_keyword(TokenKind::Array);
    let simple_type = |t: &mut T| tokenize_simple_type(t);
    let name = |t: &mut T| t.tokenize_name();
    let size = |t: &mut T| t.tokenize_array_size();
    let parts: [Tokenizer<'_, T>; 4] = [&array, &simple_type, &name, &size];
    sequence(tokenizer, parts)
}

/// `simple_tagkey | ARRAY type NAME size`
///
/// The array elements are not part of the match; they follow through
/// [`BodyTokenizer::tokenize_array_data`].
pub fn tokenize_tagkey<T: BodyTokenizer + ?Sized>(tokenizer: &mut T) -> Result<Vec<Token>> {
    let simple = |t: &mut T| tokenize_simple_tagkey(t);
    let array = |t: &mut T| tokenize_array_header(t);
    let alternatives: [Tokenizer<'_, T>; 2] = [&simple, &array];
    one_of(tokenizer, alternatives)
}

/// A complete array tagkey, with every element token.
pub fn tokenize_array_tagkey<T: BodyTokenizer + ?Sized>(tokenizer: &mut T) -> Result<Vec<Token>> {
    let mut tokens = tokenize_array_header(tokenizer)?;
    let element = element_at(&tokens, 1)?;
    let size = token_at(&tokens, 3)?;
    match tokenizer.tokenize_array_data(element, &size)? {
        ArrayData::Blob(blob) => tokens.push(blob),
        ArrayData::Elements(count) => {
            let mut state = BodyState::ArrayElements {
                element,
                remaining: count,
            };
            let mut elements = VecDeque::new();
            while matches!(state, BodyState::ArrayElements { .. }) {
                state.step_array_element(tokenizer, &mut elements)?;
            }
            tokens.extend(elements);
        }
    }
    Ok(tokens)
}

/// `TAG NAME tagkey* ENDTAG`, tokenized in one go.
pub fn tokenize_tag_group<T: BodyTokenizer + ?Sized>(tokenizer: &mut T) -> Result<Vec<Token>> {
    sequence(tokenizer, [|t: &mut T| -> Result<Vec<Token>> {
        let mut tokens = VecDeque::from(tokenize_tag_start(t)?);
        let mut state = BodyState::TagKeys;
        while state != BodyState::Tags {
            state.advance(t, &mut tokens)?;
        }
        Ok(tokens.into())
    }])
}

/// Where the body tokenizer is in the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyState {
    /// Between tags: expecting `TAG NAME` or the end of the file.
    Tags,
    /// Inside a tag: expecting a tagkey or `ENDTAG`.
    TagKeys,
    /// Inside an array tagkey whose elements are tokenized one at a time.
    ArrayElements {
        element: ElementType,
        remaining: u32,
    },
    Done,
}

impl BodyState {
    /// Tokenizes the next grammar step and appends its tokens to `out`.
    ///
    /// A step is a tag start, a whole simple tagkey, an array header (with its blob,
    /// if any), a single array element, an `ENDTAG`, or the end of the file.
    pub fn advance<T: BodyTokenizer + ?Sized>(
        &mut self,
        tokenizer: &mut T,
        out: &mut VecDeque<Token>,
    ) -> Result<()> {
        match *self {
            BodyState::Done => Ok(()),
            BodyState::Tags => {
                let tag_start = |t: &mut T| tokenize_tag_start(t);
                let end_of_file = |t: &mut T| t.tokenize_end_of_file();
                let alternatives: [Tokenizer<'_, T>; 2] = [&tag_start, &end_of_file];
                let tokens = one_of(tokenizer, alternatives)?;
                *self = if tokens.is_empty() {
                    BodyState::Done
                } else {
                    BodyState::TagKeys
                };
                out.extend(tokens);
                Ok(())
            }
            BodyState::TagKeys => {
                let tagkey = |t: &mut T| tokenize_tagkey(t);
                let endtag = |t: &mut T| t.tokenize_keyword(TokenKind::EndTag);
                let alternatives: [Tokenizer<'_, T>; 2] = [&tagkey, &endtag];
                let tokens = one_of(tokenizer, alternatives)?;
                match tokens.first().map(|token| token.kind) {
                    Some(TokenKind::EndTag) => *self = BodyState::Tags,
                    Some(TokenKind::Array) => {
                        let element = element_at(&tokens, 1)?;
                        let size = token_at(&tokens, 3)?;
                        match tokenizer.tokenize_array_data(element, &size)? {
                            ArrayData::Blob(blob) => {
                                out.extend(tokens);
                                out.push_back(blob);
                                return Ok(());
                            }
                            ArrayData::Elements(remaining) => {
                                *self = BodyState::ArrayElements { element, remaining };
                            }
                        }
                    }
                    _ => {}
                }
                out.extend(tokens);
                Ok(())
            }
            BodyState::ArrayElements { .. } => self.step_array_element(tokenizer, out),
        }
    }

    /// Tokenizes one array element, or leaves the array once the announced count is
    /// reached or no further value matches. A short array is left for the parser to
    /// report.
    fn step_array_element<T: BodyTokenizer + ?Sized>(
        &mut self,
        tokenizer: &mut T,
        out: &mut VecDeque<Token>,
    ) -> Result<()> {
        let BodyState::ArrayElements { element, remaining } = *self else {
            return Ok(());
        };
        if remaining == 0 {
            *self = BodyState::TagKeys;
            return Ok(());
        }
        let start = tokenizer.position();
        match tokenizer.tokenize_value(element) {
            Ok(tokens) => {
                *self = BodyState::ArrayElements {
                    element,
                    remaining: remaining - 1,
                };
                out.extend(tokens);
                Ok(())
            }
            Err(err) if err.is_tokenization() => {
                tokenizer.rewind(start)?;
                *self = BodyState::TagKeys;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
