// Lev Language Interpreter Library
//
// Front end and tree-walking evaluator for a small Lox-style language:
// source text is scanned into tokens, parsed into statements and run
// directly against a chain of lexical scopes.

// Public modules
pub mod ast;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod repl;
pub mod runner;
pub mod value;

// Re-export commonly used items
pub use ast::{Expr, ExprVisitor, Stmt, StmtVisitor};
pub use environment::Environment;
pub use error::{Diagnostics, LevError, Span};
pub use interpreter::Interpreter;
pub use lexer::{Lexer, Literal, Token, TokenType};
pub use parser::Parser;
pub use printer::AstPrinter;
pub use value::Value;

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::{run, RunOptions};
