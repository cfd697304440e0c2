use clap::{Arg, ArgAction, Command};
use lev::runner::{self, RunOptions};
use lev::Interpreter;
use std::fs;
use std::path::Path;
use std::process;

fn main() {
    init_tracing();

    let matches = Command::new("lev")
        .about("A tree-walking interpreter for a small Lox-style language")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("file")
                .help("The script file to execute")
                .value_name("FILE")
                .index(1)
                .required_unless_present("interactive"),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive REPL mode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("tokens")
                .long("tokens")
                .help("Print the scanned tokens before running")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ast")
                .long("ast")
                .help("Print the parsed syntax tree before running")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .help("Render errors as annotated source excerpts")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let pretty = matches.get_flag("pretty");

    if let Some(file_path) = matches.get_one::<String>("file") {
        let options = RunOptions {
            dump_tokens: matches.get_flag("tokens"),
            dump_ast: matches.get_flag("ast"),
        };
        process::exit(run_file(file_path, options, pretty));
    }

    if let Err(e) = lev::start_repl(pretty) {
        eprintln!("Error reading input: {}", e);
        process::exit(1);
    }
}

/// Only installs a subscriber when `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run_file(path: &str, options: RunOptions, pretty: bool) -> i32 {
    let path = Path::new(path);

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            return 1;
        }
    };

    let mut interpreter = Interpreter::new();
    let diagnostics = match runner::run(&source, &mut interpreter, options) {
        Ok(diagnostics) => diagnostics,
        Err(e) => {
            eprintln!("Error writing output: {}", e);
            return 1;
        }
    };

    let filename = path.to_str();
    if let Err(e) = diagnostics.emit(&source, filename, pretty) {
        eprintln!("Error writing diagnostics: {}", e);
    }
    diagnostics.exit_code()
}
