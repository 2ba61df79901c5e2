//! Format-agnostic tokenizer combinators.
//!
//! A tokenizer is any function from a rewindable state to the tokens it consumed.
//! Failure to match is signalled by [`Error::Tokenization`]; these combinators catch
//! only that variant, restore the position the attempt started from, and let every
//! other error propagate unchanged.

use super::token::Token;
use crate::error::{Error, Result};

/// State whose read position can be saved and restored.
pub trait Rewind {
    fn position(&self) -> u64;
    fn rewind(&mut self, position: u64) -> Result<()>;
}

/// A borrowed tokenizer over state `S`, for building lists of alternatives.
pub type Tokenizer<'t, S> = &'t dyn Fn(&mut S) -> Result<Vec<Token>>;

/// Runs `tokenizer`, restoring the start position if it fails to match.
pub fn attempt<S, F>(state: &mut S, tokenizer: F) -> Result<Vec<Token>>
where
    S: Rewind + ?Sized,
    F: FnOnce(&mut S) -> Result<Vec<Token>>,
{
    let start = state.position();
    match tokenizer(state) {
        Err(err) if err.is_tokenization() => {
            state.rewind(start)?;
            Err(err)
        }
        result => result,
    }
}

/// Runs each tokenizer in order and concatenates their tokens.
///
/// Fails on the first failing tokenizer, with the position restored to where the
/// sequence started.
pub fn sequence<S, F, I>(state: &mut S, tokenizers: I) -> Result<Vec<Token>>
where
    S: Rewind + ?Sized,
    F: FnOnce(&mut S) -> Result<Vec<Token>>,
    I: IntoIterator<Item = F>,
{
    attempt(state, |state| {
        let mut tokens = Vec::new();
        for tokenizer in tokenizers {
            tokens.extend(tokenizer(state)?);
        }
        Ok(tokens)
    })
}

/// Returns the tokens of the first tokenizer that matches at the current position.
///
/// # Errors
///
/// When no alternative matches, the tokenization errors of all alternatives are
/// aggregated into one.
pub fn one_of<S, F, I>(state: &mut S, tokenizers: I) -> Result<Vec<Token>>
where
    S: Rewind + ?Sized,
    F: FnOnce(&mut S) -> Result<Vec<Token>>,
    I: IntoIterator<Item = F>,
{
    let start = state.position();
    let mut errors = Vec::new();
    for tokenizer in tokenizers {
        match attempt(state, tokenizer) {
            Ok(tokens) => return Ok(tokens),
            Err(Error::Tokenization { msg, .. }) => errors.push(msg),
            Err(err) => return Err(err),
        }
    }
    Err(Error::tokenization(
        start,
        format!("Tokenization failed, due to one of\n*{}", errors.join("\n*")),
    ))
}

/// Applies `tokenizer` zero or more times, until it fails to match.
///
/// Never fails to match itself. Stops early on a match that consumes nothing.
pub fn repeated<S, F>(state: &mut S, mut tokenizer: F) -> Result<Vec<Token>>
where
    S: Rewind + ?Sized,
    F: FnMut(&mut S) -> Result<Vec<Token>>,
{
    let mut tokens = Vec::new();
    loop {
        let start = state.position();
        match attempt(state, &mut tokenizer) {
            Ok(matched) => {
                tokens.extend(matched);
                if state.position() == start {
                    return Ok(tokens);
                }
            }
            Err(err) if err.is_tokenization() => return Ok(tokens),
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::token::TokenKind;

    struct Letters {
        input: Vec<u8>,
        position: u64,
    }

    impl Letters {
        fn new(input: &str) -> Self {
            Letters {
                input: input.as_bytes().to_vec(),
                position: 0,
            }
        }
    }

    impl Rewind for Letters {
        fn position(&self) -> u64 {
            self.position
        }

        fn rewind(&mut self, position: u64) -> Result<()> {
            self.position = position;
            Ok(())
        }
    }

    fn letter(expected: u8) -> impl Fn(&mut Letters) -> Result<Vec<Token>> {
        move |state: &mut Letters| {
            let start = state.position;
            match state.input.get(start as usize) {
                Some(&byte) if byte == expected => {
                    state.position += 1;
                    Ok(vec![Token::new(TokenKind::Name, start, start + 1)])
                }
                _ => {
                    // consume to check that failures are rewound
                    state.position += 1;
                    Err(Error::tokenization(start, format!("expected {}", expected as char)))
                }
            }
        }
    }

    #[test]
    fn test_sequence() {
        let (a, b) = (letter(b'a'), letter(b'b'));
        let mut state = Letters::new("ab");
        let parts: [Tokenizer<'_, Letters>; 2] = [&a, &b];
        let tokens = sequence(&mut state, parts).unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(state.position, 2);
    }

    #[test]
    fn test_sequence_failure_restores_start() {
        let (a, b) = (letter(b'a'), letter(b'b'));
        let mut state = Letters::new("aa");
        let parts: [Tokenizer<'_, Letters>; 2] = [&a, &b];
        assert!(sequence(&mut state, parts).unwrap_err().is_tokenization());
        assert_eq!(state.position, 0);
    }

    #[test]
    fn test_one_of_takes_first_match() {
        let (a, b) = (letter(b'a'), letter(b'b'));
        let mut state = Letters::new("b");
        let alternatives: [Tokenizer<'_, Letters>; 2] = [&a, &b];
        let tokens = one_of(&mut state, alternatives).unwrap();
        assert_eq!(tokens, vec![Token::new(TokenKind::Name, 0, 1)]);
    }

    #[test]
    fn test_one_of_aggregates_errors() {
        let (a, b) = (letter(b'a'), letter(b'b'));
        let mut state = Letters::new("c");
        let alternatives: [Tokenizer<'_, Letters>; 2] = [&a, &b];
        let err = one_of(&mut state, alternatives).unwrap_err();
        assert_eq!(state.position, 0);
        match err {
            Error::Tokenization { msg, .. } => {
                assert_eq!(msg, "Tokenization failed, due to one of\n*expected a\n*expected b");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_one_of_propagates_other_errors() {
        let failing = |_: &mut Letters| -> Result<Vec<Token>> { Err(Error::format("broken")) };
        let a = letter(b'a');
        let mut state = Letters::new("a");
        let alternatives: [Tokenizer<'_, Letters>; 2] = [&failing, &a];
        assert!(matches!(one_of(&mut state, alternatives), Err(Error::Format(_))));
    }

    #[test]
    fn test_repeated() {
        let mut state = Letters::new("aaab");
        let tokens = repeated(&mut state, letter(b'a')).unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(state.position, 3);

        let tokens = repeated(&mut state, letter(b'a')).unwrap();
        assert!(tokens.is_empty());
        assert_eq!(state.position, 3);
    }

    #[test]
    fn test_repeated_stops_on_empty_match() {
        let mut state = Letters::new("");
        let tokens = repeated(&mut state, |_: &mut Letters| Ok(Vec::new())).unwrap();
        assert!(tokens.is_empty());
    }
}
