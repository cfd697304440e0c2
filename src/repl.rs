use crate::ast::{Expr, Stmt};
use crate::error::{Diagnostics, LevError};
use crate::interpreter::Interpreter;
use crate::runner;
use std::io::{self, BufRead, Write};

/// Interactive loop. Bindings persist between lines; a line holding a single
/// non-assignment expression statement echoes its value.
pub fn start(pretty: bool) -> io::Result<()> {
    println!("Lev Interpreter v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or press Ctrl+D to quit");
    println!();

    let mut interpreter = Interpreter::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            // EOF
            println!();
            break;
        };
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            println!("Goodbye!");
            break;
        }

        run_repl_command(line, &mut interpreter).emit(line, None, pretty)?;
    }

    Ok(())
}

fn run_repl_command<W: Write>(source: &str, interpreter: &mut Interpreter<W>) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    let tokens = runner::scan(source, &mut diagnostics);
    // echo failures are reported against the line's first token
    let anchor = tokens.first().cloned();
    let statements = runner::parse(tokens, &mut diagnostics);
    if diagnostics.had_error() {
        return diagnostics;
    }

    if let [Stmt::Expression { expr }] = statements.as_slice() {
        if !matches!(expr, Expr::Assign { .. }) {
            match interpreter.evaluate(expr) {
                Ok(value) => {
                    if let (Err(e), Some(token)) =
                        (writeln!(interpreter.output(), "{}", value), &anchor)
                    {
                        diagnostics.report(LevError::runtime_error(
                            token,
                            format!("Failed to write output: {}", e),
                        ));
                    }
                }
                Err(error) => diagnostics.report(error),
            }
            return diagnostics;
        }
    }

    if let Err(error) = interpreter.interpret(&statements) {
        diagnostics.report(error);
    }
    diagnostics
}
