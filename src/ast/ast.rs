use std::fmt::{self, Display};

use crate::lexer::tokens::Token;

use super::{
    expressions::{
        ArrayExpr, BooleanExpr, CallExpr, FunctionExpr, HashExpr, IdentifierExpr, IfExpr,
        IndexExpr, InfixExpr, IntegerExpr, PrefixExpr, StringExpr,
    },
    statements::{BlockStmt, ExpressionStmt, LetStmt, ReturnStmt},
};

/// Statement Types
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum StmtType {
    LetStmt,
    ReturnStmt,
    ExpressionStmt,
    BlockStmt,
}

/// Any statement in the AST.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let(LetStmt),
    Return(ReturnStmt),
    Expression(ExpressionStmt),
    Block(BlockStmt),
}

impl Stmt {
    pub fn get_stmt_type(&self) -> StmtType {
        match self {
            Stmt::Let(_) => StmtType::LetStmt,
            Stmt::Return(_) => StmtType::ReturnStmt,
            Stmt::Expression(_) => StmtType::ExpressionStmt,
            Stmt::Block(_) => StmtType::BlockStmt,
        }
    }

    /// The token the statement starts with.
    pub fn get_token(&self) -> &Token {
        match self {
            Stmt::Let(stmt) => &stmt.token,
            Stmt::Return(stmt) => &stmt.token,
            Stmt::Expression(stmt) => &stmt.token,
            Stmt::Block(stmt) => &stmt.token,
        }
    }

    pub fn token_literal(&self) -> &str {
        &self.get_token().value
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Let(stmt) => Display::fmt(stmt, f),
            Stmt::Return(stmt) => Display::fmt(stmt, f),
            Stmt::Expression(stmt) => Display::fmt(stmt, f),
            Stmt::Block(stmt) => Display::fmt(stmt, f),
        }
    }
}

/// Expression Types
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum ExprType {
    Identifier,
    Integer,
    Boolean,
    String,
    Prefix,
    Infix,
    If,
    Function,
    Call,
    Array,
    Index,
    Hash,
}

/// Any expression in the AST.
///
/// Children are boxed; a parent owns its subtree exclusively.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(IdentifierExpr),
    Integer(IntegerExpr),
    Boolean(BooleanExpr),
    String(StringExpr),
    Prefix(PrefixExpr),
    Infix(InfixExpr),
    If(IfExpr),
    Function(FunctionExpr),
    Call(CallExpr),
    Array(ArrayExpr),
    Index(IndexExpr),
    Hash(HashExpr),
}

impl Expr {
    pub fn get_expr_type(&self) -> ExprType {
        match self {
            Expr::Identifier(_) => ExprType::Identifier,
            Expr::Integer(_) => ExprType::Integer,
            Expr::Boolean(_) => ExprType::Boolean,
            Expr::String(_) => ExprType::String,
            Expr::Prefix(_) => ExprType::Prefix,
            Expr::Infix(_) => ExprType::Infix,
            Expr::If(_) => ExprType::If,
            Expr::Function(_) => ExprType::Function,
            Expr::Call(_) => ExprType::Call,
            Expr::Array(_) => ExprType::Array,
            Expr::Index(_) => ExprType::Index,
            Expr::Hash(_) => ExprType::Hash,
        }
    }

    /// The token that introduced the expression.
    ///
    /// For infix, call and index expressions this is the operator token, not
    /// the first token of the left operand.
    pub fn get_token(&self) -> &Token {
        match self {
            Expr::Identifier(expr) => &expr.token,
            Expr::Integer(expr) => &expr.token,
            Expr::Boolean(expr) => &expr.token,
            Expr::String(expr) => &expr.token,
            Expr::Prefix(expr) => &expr.token,
            Expr::Infix(expr) => &expr.token,
            Expr::If(expr) => &expr.token,
            Expr::Function(expr) => &expr.token,
            Expr::Call(expr) => &expr.token,
            Expr::Array(expr) => &expr.token,
            Expr::Index(expr) => &expr.token,
            Expr::Hash(expr) => &expr.token,
        }
    }

    pub fn token_literal(&self) -> &str {
        &self.get_token().value
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Identifier(expr) => Display::fmt(expr, f),
            Expr::Integer(expr) => Display::fmt(expr, f),
            Expr::Boolean(expr) => Display::fmt(expr, f),
            Expr::String(expr) => Display::fmt(expr, f),
            Expr::Prefix(expr) => Display::fmt(expr, f),
            Expr::Infix(expr) => Display::fmt(expr, f),
            Expr::If(expr) => Display::fmt(expr, f),
            Expr::Function(expr) => Display::fmt(expr, f),
            Expr::Call(expr) => Display::fmt(expr, f),
            Expr::Array(expr) => Display::fmt(expr, f),
            Expr::Index(expr) => Display::fmt(expr, f),
            Expr::Hash(expr) => Display::fmt(expr, f),
        }
    }
}

/// Root of a parsed source: its top-level statements in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub body: Vec<Stmt>,
}

impl Program {
    pub fn iter(&self) -> std::slice::Iter<'_, Stmt> {
        self.body.iter()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn token_literal(&self) -> &str {
        self.body.first().map(Stmt::token_literal).unwrap_or("")
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.body {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}
