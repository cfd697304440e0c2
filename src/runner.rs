use crate::ast::Stmt;
use crate::error::Diagnostics;
use crate::interpreter::Interpreter;
use crate::lexer::{Lexer, Token};
use crate::parser::Parser;
use crate::printer::AstPrinter;
use std::io::{self, Write};
use tracing::debug;

/// Debug dumps requested on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Write the scanned token stream before parsing.
    pub dump_tokens: bool,
    /// Write the parsed statements before interpreting.
    pub dump_ast: bool,
}

pub fn scan(source: &str, diagnostics: &mut Diagnostics) -> Vec<Token> {
    Lexer::new(source).scan_tokens(diagnostics)
}

pub fn parse(tokens: Vec<Token>, diagnostics: &mut Diagnostics) -> Vec<Stmt> {
    Parser::new(tokens).parse(diagnostics)
}

/// Scan, parse and interpret `source`.
///
/// Interpretation is skipped when scanning or parsing reported anything.
/// The returned diagnostics hold every error of the run; only writing a dump
/// can fail the call itself.
pub fn run<W: Write>(
    source: &str,
    interpreter: &mut Interpreter<W>,
    options: RunOptions,
) -> io::Result<Diagnostics> {
    let mut diagnostics = Diagnostics::new();

    let tokens = scan(source, &mut diagnostics);
    if options.dump_tokens {
        for token in &tokens {
            writeln!(interpreter.output(), "{}", token)?;
        }
    }

    let statements = parse(tokens, &mut diagnostics);
    if options.dump_ast {
        let mut printer = AstPrinter::new();
        for statement in &statements {
            writeln!(interpreter.output(), "{}", printer.print_stmt(statement))?;
        }
    }

    if diagnostics.had_error() {
        debug!("static errors present, not interpreting");
        return Ok(diagnostics);
    }

    if let Err(error) = interpreter.interpret(&statements) {
        diagnostics.report(error);
    }

    Ok(diagnostics)
}
