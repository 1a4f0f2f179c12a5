use std::{fmt::{self, Display}, slice::Iter};

use crate::lexer::tokens::Token;

use super::{ast::{Expr, Stmt}, expressions::IdentifierExpr};

/// `let <name> = <value>;`
#[derive(Debug, Clone, PartialEq)]
pub struct LetStmt {
    pub token: Token,
    pub name: IdentifierExpr,
    pub value: Expr,
}

impl Display for LetStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} = {};", self.token.value, self.name, self.value)
    }
}

/// `return [value];`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub token: Token,
    /// `None` for a bare `return;`
    pub value: Option<Expr>,
}

impl Display for ReturnStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} {};", self.token.value, value),
            None => write!(f, "{};", self.token.value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStmt {
    /// First token of the expression
    pub token: Token,
    pub expression: Expr,
}

impl Display for ExpressionStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

/// Braced statement list used by conditionals and function bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    /// The opening `{`
    pub token: Token,
    pub body: Vec<Stmt>,
}

impl BlockStmt {
    pub fn iter(&self) -> Iter<'_, Stmt> {
        self.body.iter()
    }
}

impl Display for BlockStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.body {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}
