use crate::{
    ast::{
        ast::Expr,
        expressions::{
            ArrayExpr, BooleanExpr, CallExpr, FunctionExpr, HashExpr, IdentifierExpr, IfExpr,
            IndexExpr, InfixExpr, IntegerExpr, PrefixExpr, StringExpr,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{lookups::BindingPower, parser::Parser, stmt::parse_block_stmt};

/// Parses one expression whose operators all bind tighter than `bp`.
///
/// On return the current token is the last token of the expression.
pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Option<Expr> {
    if !parser.enter_expr() {
        return None;
    }

    let expr = parse_nud_led(parser, bp);
    parser.exit_expr();

    expr
}

fn parse_nud_led(parser: &mut Parser, bp: BindingPower) -> Option<Expr> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_nud_lookup().get(&token_kind).copied() else {
        let error = Error::new(
            ErrorImpl::NoPrefixParseFn { kind: token_kind },
            parser.current_token().span.start.clone(),
        );
        parser.push_error(error);
        return None;
    };

    let mut left = nud(parser)?;

    // While the next operator binds tighter than bp, it takes left as its lhs
    while !parser.peek_token_is(TokenKind::Semicolon) && bp < parser.peek_binding_power() {
        let Some(led) = parser.get_led_lookup().get(&parser.peek_token_kind()).copied() else {
            return Some(left);
        };

        parser.advance();
        left = led(parser, left)?;
    }

    Some(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Option<Expr> {
    let token = parser.current_token().clone();

    match token.kind {
        TokenKind::Identifier => Some(Expr::Identifier(IdentifierExpr {
            value: token.value.clone(),
            token,
        })),
        TokenKind::Integer => match token.value.parse::<i64>() {
            Ok(value) => Some(Expr::Integer(IntegerExpr { token, value })),
            Err(_) => {
                let error = Error::new(
                    ErrorImpl::IntegerParseError {
                        token: token.value.clone(),
                    },
                    token.span.start.clone(),
                );
                parser.push_error(error);
                None
            }
        },
        TokenKind::String => Some(Expr::String(StringExpr {
            value: token.value.clone(),
            token,
        })),
        TokenKind::True | TokenKind::False => Some(Expr::Boolean(BooleanExpr {
            value: token.kind == TokenKind::True,
            token,
        })),
        _ => {
            let error = Error::new(ErrorImpl::NoPrefixParseFn { kind: token.kind }, token.span.start);
            parser.push_error(error);
            None
        }
    }
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Option<Expr> {
    let operator_token = parser.current_token().clone();
    parser.advance();

    let right = parse_expr(parser, BindingPower::Prefix)?;

    Some(Expr::Prefix(PrefixExpr {
        operator: operator_token.value.clone(),
        token: operator_token,
        right: Box::new(right),
    }))
}

/// Infix operators recurse at their own binding power, which makes chains of
/// equal power associate to the left.
pub fn parse_binary_expr(parser: &mut Parser, left: Expr) -> Option<Expr> {
    let operator_token = parser.current_token().clone();
    let bp = parser.current_binding_power();
    parser.advance();

    let right = parse_expr(parser, bp)?;

    Some(Expr::Infix(InfixExpr {
        operator: operator_token.value.clone(),
        token: operator_token,
        left: Box::new(left),
        right: Box::new(right),
    }))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Option<Expr> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Lowest)?;

    if !parser.expect_peek(TokenKind::CloseParen) {
        return None;
    }

    Some(expr)
}

/// `if <condition> { ... } [else { ... }]`
///
/// The condition is an ordinary expression, so `if (x < y)` and `if x < y`
/// are both accepted.
pub fn parse_if_expr(parser: &mut Parser) -> Option<Expr> {
    let token = parser.current_token().clone();
    parser.advance();

    let condition = parse_expr(parser, BindingPower::Lowest)?;

    if !parser.expect_peek(TokenKind::OpenCurly) {
        return None;
    }
    let consequence = parse_block_stmt(parser)?;

    let alternative = if parser.peek_token_is(TokenKind::Else) {
        parser.advance();

        if !parser.expect_peek(TokenKind::OpenCurly) {
            return None;
        }
        Some(parse_block_stmt(parser)?)
    } else {
        None
    };

    Some(Expr::If(IfExpr {
        token,
        condition: Box::new(condition),
        consequence,
        alternative,
    }))
}

/// `fn(<parameters>) { <body> }`
pub fn parse_function_expr(parser: &mut Parser) -> Option<Expr> {
    let token = parser.current_token().clone();

    if !parser.expect_peek(TokenKind::OpenParen) {
        return None;
    }
    let parameters = parse_function_parameters(parser)?;

    if !parser.expect_peek(TokenKind::OpenCurly) {
        return None;
    }
    let body = parse_block_stmt(parser)?;

    Some(Expr::Function(FunctionExpr {
        token,
        parameters,
        body,
    }))
}

fn parse_function_parameters(parser: &mut Parser) -> Option<Vec<IdentifierExpr>> {
    let mut parameters = Vec::new();

    if parser.peek_token_is(TokenKind::CloseParen) {
        parser.advance();
        return Some(parameters);
    }

    loop {
        if !parser.expect_peek(TokenKind::Identifier) {
            return None;
        }

        let token = parser.current_token().clone();
        parameters.push(IdentifierExpr {
            value: token.value.clone(),
            token,
        });

        if !parser.peek_token_is(TokenKind::Comma) {
            break;
        }
        parser.advance();
    }

    if !parser.expect_peek(TokenKind::CloseParen) {
        return None;
    }

    Some(parameters)
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr) -> Option<Expr> {
    let token = parser.current_token().clone();
    let arguments = parse_expr_list(parser, TokenKind::CloseParen)?;

    Some(Expr::Call(CallExpr {
        token,
        callee: Box::new(left),
        arguments,
    }))
}

pub fn parse_index_expr(parser: &mut Parser, left: Expr) -> Option<Expr> {
    let token = parser.current_token().clone();
    parser.advance();

    let index = parse_expr(parser, BindingPower::Lowest)?;

    if !parser.expect_peek(TokenKind::CloseBracket) {
        return None;
    }

    Some(Expr::Index(IndexExpr {
        token,
        left: Box::new(left),
        index: Box::new(index),
    }))
}

pub fn parse_array_expr(parser: &mut Parser) -> Option<Expr> {
    let token = parser.current_token().clone();
    let elements = parse_expr_list(parser, TokenKind::CloseBracket)?;

    Some(Expr::Array(ArrayExpr { token, elements }))
}

/// `{ <key>: <value>, ... }`
pub fn parse_hash_expr(parser: &mut Parser) -> Option<Expr> {
    let token = parser.current_token().clone();
    let mut pairs = Vec::new();

    while !parser.peek_token_is(TokenKind::CloseCurly) {
        parser.advance();
        let key = parse_expr(parser, BindingPower::Lowest)?;

        if !parser.expect_peek(TokenKind::Colon) {
            return None;
        }

        parser.advance();
        let value = parse_expr(parser, BindingPower::Lowest)?;

        pairs.push((key, value));

        if !parser.peek_token_is(TokenKind::CloseCurly) && !parser.expect_peek(TokenKind::Comma) {
            return None;
        }
    }

    parser.advance();

    Some(Expr::Hash(HashExpr { token, pairs }))
}

/// Comma separated expressions up to `end`. The current token is the
/// opening delimiter; on success it is `end`.
fn parse_expr_list(parser: &mut Parser, end: TokenKind) -> Option<Vec<Expr>> {
    let mut list = Vec::new();

    if parser.peek_token_is(end) {
        parser.advance();
        return Some(list);
    }

    parser.advance();
    list.push(parse_expr(parser, BindingPower::Lowest)?);

    while parser.peek_token_is(TokenKind::Comma) {
        parser.advance();
        parser.advance();
        list.push(parse_expr(parser, BindingPower::Lowest)?);
    }

    if !parser.expect_peek(end) {
        return None;
    }

    Some(list)
}
