//! Parser implementation for building the Abstract Syntax Tree.
//!
//! This module contains the main Parser struct and the program driver.
//! The parser is a Pratt parser: expressions are built by NUD (prefix) and
//! LED (infix) handlers looked up by token kind, with binding powers
//! deciding how far an expression extends.
//!
//! Parsing never stops at the first problem. Each failure is recorded in the
//! error list, the construct being parsed is dropped, and the driver carries
//! on with the next statement.

use std::collections::HashMap;

use crate::{
    ast::ast::Program,
    errors::errors::{Error, ErrorImpl},
    lexer::{
        stream::{TokenSource, TokenStream},
        tokens::{Token, TokenKind},
    },
    Span,
};

/// How deeply expressions may nest before the parser gives up on them.
pub const MAX_NESTING_DEPTH: usize = 256;

use super::{
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler,
        NUDLookup,
    },
    stmt::parse_stmt,
};

/// The main parser structure that maintains parsing state.
///
/// It sees the token stream through a two token window: the current token
/// and one token of lookahead.
pub struct Parser {
    /// Where tokens come from
    source: Box<dyn TokenSource>,
    /// The token being parsed
    current: Token,
    /// One token of lookahead
    peek: Token,
    /// Everything that went wrong so far, in order
    errors: Vec<Error>,
    /// Lookup table for null denotation (prefix) expression handlers
    nud_lookup: NUDLookup,
    /// Lookup table for left denotation (infix) expression handlers
    led_lookup: LEDLookup,
    /// Lookup table for expression binding powers (precedence)
    binding_power_lookup: BPLookup,
    /// Expressions currently being parsed, innermost included
    expr_depth: usize,
    /// Blocks currently open
    block_depth: usize,
}

impl Parser {
    /// Creates a parser reading from `source`, with every standard handler
    /// registered and the current/peek window filled.
    pub fn new<S: TokenSource + 'static>(source: S) -> Self {
        let mut parser = Parser {
            source: Box::new(source),
            current: Token::eof(Span::null()),
            peek: Token::eof(Span::null()),
            errors: vec![],
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            expr_depth: 0,
            block_depth: 0,
        };
        create_token_lookups(&mut parser);

        parser.advance();
        parser.advance();

        parser
    }

    pub fn current_token(&self) -> &Token {
        &self.current
    }

    pub fn current_token_kind(&self) -> TokenKind {
        self.current.kind
    }

    pub fn peek_token(&self) -> &Token {
        &self.peek
    }

    pub fn peek_token_kind(&self) -> TokenKind {
        self.peek.kind
    }

    pub fn current_token_is(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    pub fn peek_token_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    /// Shifts the window one token forward.
    pub fn advance(&mut self) {
        let next = self.source.next_token();
        self.current = std::mem::replace(&mut self.peek, next);
    }

    /// Advances if the peek token is of `expected_kind`.
    ///
    /// Otherwise records an unexpected token error and leaves the window
    /// where it is.
    pub fn expect_peek(&mut self, expected_kind: TokenKind) -> bool {
        if self.peek_token_is(expected_kind) {
            self.advance();
            true
        } else {
            self.peek_error(expected_kind);
            false
        }
    }

    pub fn peek_error(&mut self, expected_kind: TokenKind) {
        let error = Error::new(
            ErrorImpl::UnexpectedToken {
                expected: expected_kind,
                actual: self.peek.kind,
            },
            self.peek.span.start.clone(),
        );
        self.push_error(error);
    }

    pub fn push_error(&mut self, error: Error) {
        tracing::debug!(%error, offset = error.get_position().0, "recorded parse error");
        self.errors.push(error);
    }

    /// Errors recorded so far. Empty after a parse means the source was
    /// syntactically clean.
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    /// Enters one more level of expression nesting.
    ///
    /// Past [`MAX_NESTING_DEPTH`] this records an error at the current token
    /// and returns `false`; the caller must not call [`Parser::exit_expr`]
    /// in that case.
    pub fn enter_expr(&mut self) -> bool {
        if self.expr_depth >= MAX_NESTING_DEPTH {
            let error = Error::new(
                ErrorImpl::NestingTooDeep {
                    limit: MAX_NESTING_DEPTH,
                },
                self.current.span.start.clone(),
            );
            self.push_error(error);
            return false;
        }

        self.expr_depth += 1;
        true
    }

    pub fn exit_expr(&mut self) {
        self.expr_depth -= 1;
    }

    pub fn enter_block(&mut self) {
        self.block_depth += 1;
    }

    pub fn exit_block(&mut self) {
        self.block_depth -= 1;
    }

    pub fn in_block(&self) -> bool {
        self.block_depth > 0
    }

    /// Binding power of `kind`; kinds without one bind at `Lowest`.
    pub fn binding_power(&self, kind: TokenKind) -> BindingPower {
        self.binding_power_lookup
            .get(&kind)
            .copied()
            .unwrap_or(BindingPower::Lowest)
    }

    pub fn current_binding_power(&self) -> BindingPower {
        self.binding_power(self.current.kind)
    }

    pub fn peek_binding_power(&self) -> BindingPower {
        self.binding_power(self.peek.kind)
    }

    /// Registers a left denotation (infix) handler for a token.
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Parses statements until the end of input.
    ///
    /// Statements that fail to parse are left out of the program; their
    /// errors are available through [`Parser::errors`].
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();

        while !self.current_token_is(TokenKind::EOF) {
            if let Some(stmt) = parse_stmt(self) {
                tracing::trace!(kind = ?stmt.get_stmt_type(), "parsed statement");
                program.body.push(stmt);
            }

            self.advance();
        }

        tracing::debug!(
            statements = program.len(),
            errors = self.errors.len(),
            "parsed program"
        );

        program
    }
}

/// Parses a stream of tokens into a [`Program`].
///
/// This is the main entry point for parsing pre-tokenized input. The parser
/// is handed back alongside the program so its errors can be inspected.
pub fn parse(tokens: Vec<Token>) -> (Parser, Program) {
    let mut parser = Parser::new(TokenStream::new(tokens));
    let program = parser.parse_program();

    (parser, program)
}
