use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::{
    stream::TokenSource,
    tokens::{Token, TokenKind, RESERVED_LOOKUP},
};

/// Handles a pattern match at the lexer's position. Returns `None` when the
/// matched text produces no token (whitespace, comments).
pub type RegexHandler = fn(&mut Lexer, &Regex) -> Option<Token>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

lazy_static! {
    // Tried in order; the first pattern matching at the current position wins.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern { regex: Regex::new("^[a-zA-Z_][a-zA-Z0-9_]*").unwrap(), handler: symbol_handler },
        RegexPattern { regex: Regex::new("^[0-9]+").unwrap(), handler: integer_handler },
        RegexPattern { regex: Regex::new("^\\s+").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new("^\"(?:[^\"\\\\]|\\\\.)*\"").unwrap(), handler: string_handler },
        RegexPattern { regex: Regex::new("^//.*").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new("^\\[").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenBracket, "[") },
        RegexPattern { regex: Regex::new("^\\]").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseBracket, "]") },
        RegexPattern { regex: Regex::new("^\\{").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{") },
        RegexPattern { regex: Regex::new("^\\}").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}") },
        RegexPattern { regex: Regex::new("^\\(").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(") },
        RegexPattern { regex: Regex::new("^\\)").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")") },
        RegexPattern { regex: Regex::new("^==").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Equals, "==") },
        RegexPattern { regex: Regex::new("^!=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=") },
        RegexPattern { regex: Regex::new("^!").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Not, "!") },
        RegexPattern { regex: Regex::new("^=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=") },
        RegexPattern { regex: Regex::new("^<").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Less, "<") },
        RegexPattern { regex: Regex::new("^>").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Greater, ">") },
        RegexPattern { regex: Regex::new("^;").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";") },
        RegexPattern { regex: Regex::new("^:").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Colon, ":") },
        RegexPattern { regex: Regex::new("^,").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Comma, ",") },
        RegexPattern { regex: Regex::new("^\\+").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Plus, "+") },
        RegexPattern { regex: Regex::new("^-").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Dash, "-") },
        RegexPattern { regex: Regex::new("^/").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Slash, "/") },
        RegexPattern { regex: Regex::new("^\\*").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Star, "*") },
    ];
}

/// Streaming lexer.
///
/// Tokens are produced on demand through [`TokenSource::next_token`]. A
/// character no pattern accepts becomes a single `Illegal` token; once the
/// source is exhausted every call yields `EOF`.
pub struct Lexer {
    source: String,
    pub pos: usize,
    pub file: Arc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Arc::new(file)
        } else {
            Arc::new(String::from("shell"))
        };

        Lexer {
            source,
            pos: 0,
            file: file_name,
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn at(&self) -> Option<char> {
        self.remainder().chars().next()
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn span_from(&self, start: usize) -> Span {
        Span {
            start: Position(start as u32, Arc::clone(&self.file)),
            end: Position(self.pos as u32, Arc::clone(&self.file)),
        }
    }

    fn illegal(&mut self, ch: char) -> Token {
        let start = self.pos;
        self.advance_n(ch.len_utf8());
        MK_TOKEN!(TokenKind::Illegal, ch.to_string(), self.span_from(start))
    }
}

impl TokenSource for Lexer {
    fn next_token(&mut self) -> Token {
        'scan: loop {
            let Some(ch) = self.at() else {
                return Token::eof(self.span_from(self.pos));
            };

            for pattern in PATTERNS.iter() {
                if !pattern.regex.is_match(self.remainder()) {
                    continue;
                }

                match (pattern.handler)(self, &pattern.regex) {
                    Some(token) => {
                        tracing::trace!(kind = %token.kind, value = %token.value, "scanned token");
                        return token;
                    }
                    None => continue 'scan,
                }
            }

            return self.illegal(ch);
        }
    }
}

fn integer_handler(lexer: &mut Lexer, regex: &Regex) -> Option<Token> {
    let matched = regex.find(lexer.remainder())?.as_str().to_string();
    let start = lexer.pos;
    lexer.advance_n(matched.len());

    Some(MK_TOKEN!(TokenKind::Integer, matched, lexer.span_from(start)))
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) -> Option<Token> {
    let matched = regex.find(lexer.remainder())?.end();
    lexer.advance_n(matched);
    None
}

fn string_handler(lexer: &mut Lexer, regex: &Regex) -> Option<Token> {
    let matched = regex.find(lexer.remainder())?.as_str().to_string();
    let start = lexer.pos;
    lexer.advance_n(matched.len());

    let string_literal = unescape(&matched[1..matched.len() - 1]);

    Some(MK_TOKEN!(TokenKind::String, string_literal, lexer.span_from(start)))
}

fn unescape(raw: &str) -> String {
    let mut result = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.peek() {
            Some('n') => {
                result.push('\n');
                chars.next();
            }
            Some('t') => {
                result.push('\t');
                chars.next();
            }
            Some('r') => {
                result.push('\r');
                chars.next();
            }
            Some('\\') => {
                result.push('\\');
                chars.next();
            }
            Some('"') => {
                result.push('"');
                chars.next();
            }
            Some('0') => {
                result.push('\0');
                chars.next();
            }
            Some('x') => {
                chars.next();

                let mut hex = String::new();
                while hex.len() < 2 {
                    match chars.peek() {
                        Some(c) if c.is_ascii_hexdigit() => {
                            hex.push(*c);
                            chars.next();
                        }
                        _ => break,
                    }
                }

                match u8::from_str_radix(&hex, 16) {
                    Ok(byte) => result.push(byte as char),
                    Err(_) => {
                        // Not a valid escape, keep it as written
                        result.push_str("\\x");
                        result.push_str(&hex);
                    }
                }
            }
            // Keep the backslash
            _ => result.push(ch),
        }
    }

    result
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) -> Option<Token> {
    let value = regex.find(lexer.remainder())?.as_str().to_string();
    let start = lexer.pos;
    lexer.advance_n(value.len());

    let kind = RESERVED_LOOKUP
        .get(value.as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);

    Some(MK_TOKEN!(kind, value, lexer.span_from(start)))
}

/// Tokenizes a whole source eagerly.
///
/// Unlike the streaming [`Lexer`], an unrecognised character is an error
/// here. The returned vector always ends with an `EOF` token.
pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);
    let mut tokens = vec![];

    loop {
        let token = lex.next_token();

        match token.kind {
            TokenKind::Illegal => {
                return Err(Error::new(
                    ErrorImpl::UnrecognisedToken { token: token.value },
                    token.span.start,
                ));
            }
            TokenKind::EOF => {
                tokens.push(token);
                break;
            }
            _ => tokens.push(token),
        }
    }

    tracing::debug!(file = %lex.file, count = tokens.len(), "tokenized source");
    Ok(tokens)
}
