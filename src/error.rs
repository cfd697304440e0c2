use crate::lexer::{Token, TokenType};
use ariadne::{Color, Config, Fmt, Label, Report, ReportKind, Source};
use std::fmt;
use std::io::{self, Write};
use thiserror::Error;
use tracing::debug;

/// Exit code for a run that hit a lexical or syntax error.
pub const EXIT_STATIC_ERROR: i32 = 65;
/// Exit code for a run that stopped on a runtime error.
pub const EXIT_RUNTIME_ERROR: i32 = 70;

/// Character offsets into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LexError,
    ParseError,
    RuntimeError,
}

/// Where a syntax error sits relative to the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    AtEnd,
    At(String),
}

impl Location {
    pub fn of(token: &Token) -> Self {
        if token.token_type == TokenType::Eof {
            Location::AtEnd
        } else {
            Location::At(token.lexeme.clone())
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Location::AtEnd => write!(f, " at end"),
            Location::At(lexeme) => write!(f, " at '{}'", lexeme),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LevError {
    #[error("[line {line}] Error: {message}")]
    Lex {
        line: usize,
        span: Span,
        message: String,
    },
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        line: usize,
        span: Span,
        location: Location,
        message: String,
        help: Option<String>,
    },
    #[error("{message}\n[line {line}]")]
    Runtime {
        line: usize,
        span: Span,
        message: String,
    },
}

impl LevError {
    pub fn lex_error(line: usize, span: Span, message: impl Into<String>) -> Self {
        LevError::Lex {
            line,
            span,
            message: message.into(),
        }
    }

    pub fn parse_error(token: &Token, message: impl Into<String>) -> Self {
        LevError::Parse {
            line: token.line,
            span: token.span,
            location: Location::of(token),
            message: message.into(),
            help: None,
        }
    }

    pub fn parse_error_with_help(
        token: &Token,
        message: impl Into<String>,
        help: impl Into<String>,
    ) -> Self {
        LevError::Parse {
            line: token.line,
            span: token.span,
            location: Location::of(token),
            message: message.into(),
            help: Some(help.into()),
        }
    }

    pub fn runtime_error(token: &Token, message: impl Into<String>) -> Self {
        LevError::Runtime {
            line: token.line,
            span: token.span,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LevError::Lex { .. } => ErrorKind::LexError,
            LevError::Parse { .. } => ErrorKind::ParseError,
            LevError::Runtime { .. } => ErrorKind::RuntimeError,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            LevError::Lex { line, .. }
            | LevError::Parse { line, .. }
            | LevError::Runtime { line, .. } => *line,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            LevError::Lex { span, .. }
            | LevError::Parse { span, .. }
            | LevError::Runtime { span, .. } => *span,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            LevError::Lex { message, .. }
            | LevError::Parse { message, .. }
            | LevError::Runtime { message, .. } => message,
        }
    }

    /// Render the error as an annotated source excerpt on stderr.
    pub fn report(&self, source: &str, filename: Option<&str>) -> io::Result<()> {
        self.write_report(source, filename, true, io::stderr())
    }

    pub fn write_report<W: Write>(
        &self,
        source: &str,
        filename: Option<&str>,
        colored: bool,
        out: W,
    ) -> io::Result<()> {
        let filename = filename.unwrap_or("<repl>");
        let span = self.span();

        let color = match self.kind() {
            ErrorKind::LexError => Color::Red,
            ErrorKind::ParseError => Color::Yellow,
            ErrorKind::RuntimeError => Color::Magenta,
        };

        let kind_str = match self.kind() {
            ErrorKind::LexError => "Lexical Error",
            ErrorKind::ParseError => "Parse Error",
            ErrorKind::RuntimeError => "Runtime Error",
        };

        let mut report_builder = Report::build(ReportKind::Error, filename, span.start)
            .with_config(Config::default().with_color(colored))
            .with_message(format!(
                "{} [line {}]: {}",
                kind_str.fg(color),
                self.line(),
                self.message()
            ))
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_message(self.message())
                    .with_color(color),
            );

        if let LevError::Parse {
            help: Some(help_text),
            ..
        } = self
        {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        report_builder
            .finish()
            .write((filename, Source::from(source)), out)
    }
}

/// Errors reported by one pipeline run, in the order they occurred.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    errors: Vec<LevError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, error: LevError) {
        debug!(kind = ?error.kind(), line = error.line(), text = error.message(), "error reported");
        self.errors.push(error);
    }

    /// True when a lexical or syntax error was reported.
    pub fn had_error(&self) -> bool {
        self.errors
            .iter()
            .any(|e| matches!(e.kind(), ErrorKind::LexError | ErrorKind::ParseError))
    }

    pub fn had_runtime_error(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.kind() == ErrorKind::RuntimeError)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[LevError] {
        &self.errors
    }

    pub fn exit_code(&self) -> i32 {
        if self.had_error() {
            EXIT_STATIC_ERROR
        } else if self.had_runtime_error() {
            EXIT_RUNTIME_ERROR
        } else {
            0
        }
    }

    /// Write every error to stderr, either plain or as ariadne reports.
    pub fn emit(&self, source: &str, filename: Option<&str>, pretty: bool) -> io::Result<()> {
        for error in &self.errors {
            if pretty {
                error.report(source, filename)?;
            } else {
                eprintln!("{}", error);
            }
        }
        Ok(())
    }
}
