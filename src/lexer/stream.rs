use std::vec::IntoIter;

use crate::Span;

use super::tokens::{Token, TokenKind};

/// Anything the parser can pull tokens from.
///
/// Implementations must keep returning an `EOF` token once the input is
/// exhausted.
pub trait TokenSource {
    fn next_token(&mut self) -> Token;
}

/// A [`TokenSource`] over tokens that were produced ahead of time, such as
/// the output of [`tokenize`](super::lexer::tokenize).
pub struct TokenStream {
    tokens: IntoIter<Token>,
    eof: Token,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        // Repeat the stream's own EOF so positions stay meaningful
        let eof = match tokens.iter().rev().find(|token| token.kind == TokenKind::EOF) {
            Some(token) => token.clone(),
            None => match tokens.last() {
                Some(last) => Token::eof(Span {
                    start: last.span.end.clone(),
                    end: last.span.end.clone(),
                }),
                None => Token::eof(Span::null()),
            },
        };

        TokenStream {
            tokens: tokens.into_iter(),
            eof,
        }
    }
}

impl TokenSource for TokenStream {
    fn next_token(&mut self) -> Token {
        match self.tokens.next() {
            Some(token) => token,
            None => self.eof.clone(),
        }
    }
}
