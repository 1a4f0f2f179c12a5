use crate::{
    ast::{
        ast::Stmt,
        expressions::IdentifierExpr,
        statements::{BlockStmt, ExpressionStmt, LetStmt, ReturnStmt},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::parser::Parser;

/// Parses the statement starting at the current token.
///
/// Returns `None` when the statement is malformed; the reason has already
/// been recorded on the parser. On return the current token is the last one
/// the statement used.
pub fn parse_stmt(parser: &mut Parser) -> Option<Stmt> {
    match parser.current_token_kind() {
        TokenKind::Let => parse_let_stmt(parser),
        TokenKind::Return => parse_return_stmt(parser),
        _ => parse_expression_stmt(parser),
    }
}

/// `let <identifier> = <expression> [;]`
pub fn parse_let_stmt(parser: &mut Parser) -> Option<Stmt> {
    let token = parser.current_token().clone();

    if !parser.expect_peek(TokenKind::Identifier) {
        return None;
    }

    let name_token = parser.current_token().clone();
    let name = IdentifierExpr {
        value: name_token.value.clone(),
        token: name_token,
    };

    if !parser.expect_peek(TokenKind::Assignment) {
        return None;
    }

    parser.advance();
    let value = parse_expr(parser, BindingPower::Lowest);
    skip_semicolon(parser, value.is_none());

    Some(Stmt::Let(LetStmt {
        token,
        name,
        value: value?,
    }))
}

/// `return [expression] [;]`
pub fn parse_return_stmt(parser: &mut Parser) -> Option<Stmt> {
    let token = parser.current_token().clone();

    // Bare return
    if parser.peek_token_is(TokenKind::Semicolon)
        || parser.peek_token_is(TokenKind::CloseCurly)
        || parser.peek_token_is(TokenKind::EOF)
    {
        if parser.peek_token_is(TokenKind::Semicolon) {
            parser.advance();
        }

        return Some(Stmt::Return(ReturnStmt { token, value: None }));
    }

    parser.advance();
    let value = parse_expr(parser, BindingPower::Lowest);
    skip_semicolon(parser, value.is_none());

    Some(Stmt::Return(ReturnStmt {
        token,
        value: Some(value?),
    }))
}

/// An expression followed by an optional `;`.
pub fn parse_expression_stmt(parser: &mut Parser) -> Option<Stmt> {
    let token = parser.current_token().clone();
    let expression = parse_expr(parser, BindingPower::Lowest);
    skip_semicolon(parser, expression.is_none());

    Some(Stmt::Expression(ExpressionStmt {
        token,
        expression: expression?,
    }))
}

/// `{ <statements> }`. The current token is the `{`; on success it is the
/// matching `}`.
pub fn parse_block_stmt(parser: &mut Parser) -> Option<BlockStmt> {
    let token = parser.current_token().clone();
    parser.advance();

    parser.enter_block();
    let body = parse_block_body(parser);
    parser.exit_block();

    Some(BlockStmt { token, body: body? })
}

fn parse_block_body(parser: &mut Parser) -> Option<Vec<Stmt>> {
    let mut body = Vec::new();
    while !parser.current_token_is(TokenKind::CloseCurly) {
        if parser.current_token_is(TokenKind::EOF) {
            let error = Error::new(
                ErrorImpl::UnexpectedToken {
                    expected: TokenKind::CloseCurly,
                    actual: TokenKind::EOF,
                },
                parser.current_token().span.start.clone(),
            );
            parser.push_error(error);
            return None;
        }

        match parse_stmt(parser) {
            Some(stmt) => body.push(stmt),
            // The failed statement stopped on the `}` that closes this block
            None if parser.current_token_is(TokenKind::CloseCurly) => break,
            None => {}
        }
        parser.advance();
    }

    Some(body)
}

/// Consumes an optional `;` after a statement.
///
/// Inside a block, a statement that failed on a `}` leaves it, and whatever
/// follows it, to the enclosing block.
fn skip_semicolon(parser: &mut Parser, failed: bool) {
    if failed && parser.in_block() && parser.current_token_is(TokenKind::CloseCurly) {
        return;
    }

    if parser.peek_token_is(TokenKind::Semicolon) {
        parser.advance();
    }
}
