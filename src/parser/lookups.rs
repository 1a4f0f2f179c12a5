use std::collections::HashMap;

use crate::{ast::ast::Expr, lexer::tokens::TokenKind};

use super::{expr::*, parser::Parser};

/// Operator precedence, lowest first.
///
/// The derived ordering is the precedence order: a token binds tighter than
/// another when its binding power compares greater.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug)]
pub enum BindingPower {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

/// Builds an expression starting at the current token.
pub type NUDHandler = fn(&mut Parser) -> Option<Expr>;
/// Continues an expression from the current (operator) token, given the
/// already parsed left operand.
pub type LEDHandler = fn(&mut Parser, Expr) -> Option<Expr>;

pub fn create_token_lookups(parser: &mut Parser) {
    // Equality
    parser.led(TokenKind::Equals, BindingPower::Equals, parse_binary_expr);
    parser.led(TokenKind::NotEquals, BindingPower::Equals, parse_binary_expr);

    // Relational
    parser.led(TokenKind::Less, BindingPower::LessGreater, parse_binary_expr);
    parser.led(TokenKind::Greater, BindingPower::LessGreater, parse_binary_expr);

    // Additive and multiplicative
    parser.led(TokenKind::Plus, BindingPower::Sum, parse_binary_expr);
    parser.led(TokenKind::Dash, BindingPower::Sum, parse_binary_expr);
    parser.led(TokenKind::Star, BindingPower::Product, parse_binary_expr);
    parser.led(TokenKind::Slash, BindingPower::Product, parse_binary_expr);

    parser.led(TokenKind::OpenParen, BindingPower::Call, parse_call_expr);
    parser.led(TokenKind::OpenBracket, BindingPower::Index, parse_index_expr);

    // Literals and symbols
    parser.nud(TokenKind::Identifier, parse_primary_expr);
    parser.nud(TokenKind::Integer, parse_primary_expr);
    parser.nud(TokenKind::String, parse_primary_expr);
    parser.nud(TokenKind::True, parse_primary_expr);
    parser.nud(TokenKind::False, parse_primary_expr);
    parser.nud(TokenKind::Not, parse_prefix_expr);
    parser.nud(TokenKind::Dash, parse_prefix_expr);
    parser.nud(TokenKind::OpenParen, parse_grouping_expr);
    parser.nud(TokenKind::If, parse_if_expr);
    parser.nud(TokenKind::Fn, parse_function_expr);
    parser.nud(TokenKind::OpenBracket, parse_array_expr);
    parser.nud(TokenKind::OpenCurly, parse_hash_expr);
}

// Lookup tables inside parser struct, so it's easier
pub type NUDLookup = HashMap<TokenKind, NUDHandler>;
pub type LEDLookup = HashMap<TokenKind, LEDHandler>;
pub type BPLookup = HashMap<TokenKind, BindingPower>;
