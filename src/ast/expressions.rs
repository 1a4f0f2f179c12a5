use std::fmt::{self, Display};

use crate::lexer::tokens::Token;

use super::{ast::Expr, statements::BlockStmt};

fn write_list<T: Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

// LITERALS

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierExpr {
    pub token: Token,
    pub value: String,
}

impl Display for IdentifierExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegerExpr {
    pub token: Token,
    pub value: i64,
}

impl Display for IntegerExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanExpr {
    pub token: Token,
    pub value: bool,
}

impl Display for BooleanExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token.value)
    }
}

/// String literal; `value` has escapes already resolved by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct StringExpr {
    pub token: Token,
    pub value: String,
}

impl Display for StringExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

// OPERATORS

/// `<operator><right>`, e.g. `-a` or `!ok`.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpr {
    pub token: Token,
    pub operator: String,
    pub right: Box<Expr>,
}

impl Display for PrefixExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}{})", self.operator, self.right)
    }
}

/// `<left> <operator> <right>`. `token` is the operator token.
#[derive(Debug, Clone, PartialEq)]
pub struct InfixExpr {
    pub token: Token,
    pub left: Box<Expr>,
    pub operator: String,
    pub right: Box<Expr>,
}

impl Display for InfixExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.left, self.operator, self.right)
    }
}

// COMPOUND

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    pub token: Token,
    pub condition: Box<Expr>,
    pub consequence: BlockStmt,
    pub alternative: Option<BlockStmt>,
}

impl Display for IfExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "if{} {}", self.condition, self.consequence)?;
        if let Some(alternative) = &self.alternative {
            write!(f, "else {}", alternative)?;
        }
        Ok(())
    }
}

/// `fn(<parameters>) { <body> }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpr {
    pub token: Token,
    pub parameters: Vec<IdentifierExpr>,
    pub body: BlockStmt,
}

impl Display for FunctionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.token.value)?;
        write_list(f, &self.parameters)?;
        write!(f, ") {}", self.body)
    }
}

/// `<callee>(<arguments>)`. `token` is the `(`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub token: Token,
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
}

impl Display for CallExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.callee)?;
        write_list(f, &self.arguments)?;
        write!(f, ")")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayExpr {
    pub token: Token,
    pub elements: Vec<Expr>,
}

impl Display for ArrayExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        write_list(f, &self.elements)?;
        write!(f, "]")
    }
}

/// `<left>[<index>]`. `token` is the `[`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub token: Token,
    pub left: Box<Expr>,
    pub index: Box<Expr>,
}

impl Display for IndexExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}[{}])", self.left, self.index)
    }
}

/// Key/value pairs in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct HashExpr {
    pub token: Token,
    pub pairs: Vec<(Expr, Expr)>,
}

impl Display for HashExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}
