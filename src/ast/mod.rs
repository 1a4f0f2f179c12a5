/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: `Program`, and the `Stmt` / `Expr` enums tying the node types together
/// - expressions: Definitions for the expression node types
/// - statements: Definitions for the statement node types
pub mod ast;
pub mod expressions;
pub mod statements;
