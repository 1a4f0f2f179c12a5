//! Lexical analysis module.
//!
//! This module turns source text into the token stream the parser reads:
//!
//! - Tokenization of source code using regex patterns
//! - Recognition of keywords, identifiers, literals, and operators
//! - Token position tracking for error reporting
//! - The `TokenSource` capability the parser consumes

pub mod lexer;
pub mod stream;
pub mod tokens;
