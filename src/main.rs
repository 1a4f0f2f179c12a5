use std::{
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
    time::Instant,
};

use anyhow::{bail, Context, Result};
use clap::Parser as ClapParser;
use monkey_parser::{
    format_error,
    lexer::{lexer::Lexer, stream::TokenSource, tokens::TokenKind},
    parser::parser::Parser,
};
use tracing_subscriber::EnvFilter;

const PROMPT: &str = ">> ";

/// Parses Monkey source and prints the program it reconstructs from the AST.
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source file to parse. Lines are read from stdin when omitted.
    file: Option<PathBuf>,

    /// Print the token stream instead of the parsed program
    #[arg(short, long)]
    tokens: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match args.file {
        Some(path) => run_file(path, args.tokens),
        None => run_repl(args.tokens),
    }
}

fn run_file(path: PathBuf, print_tokens: bool) -> Result<()> {
    let start = Instant::now();

    let source = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut out = io::stdout().lock();

    if print_tokens {
        write_tokens(&mut out, Lexer::new(source, Some(file_name)))?;
        return Ok(());
    }

    let mut parser = Parser::new(Lexer::new(source.clone(), Some(file_name)));
    let program = parser.parse_program();

    tracing::info!(elapsed = ?start.elapsed(), statements = program.len(), "parsed {}", path.display());

    if !parser.errors().is_empty() {
        for error in parser.errors() {
            eprintln!("{}\n", format_error(error, &source));
        }
        bail!("{} parse error(s) in {}", parser.errors().len(), path.display());
    }

    writeln!(out, "{}", program)?;
    Ok(())
}

/// Parses each line on its own; nothing carries over between lines.
fn run_repl(print_tokens: bool) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut out = io::stdout().lock();

    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line.context("failed to read from stdin")?;

        if print_tokens {
            write_tokens(&mut out, Lexer::new(line, None))?;
            continue;
        }

        let mut parser = Parser::new(Lexer::new(line, None));
        let program = parser.parse_program();

        if parser.errors().is_empty() {
            writeln!(out, "{}", program)?;
        } else {
            writeln!(out, "parser errors:")?;
            for message in parser.error_messages() {
                writeln!(out, "\t{}", message)?;
            }
        }
    }
}

fn write_tokens(out: &mut impl Write, mut lexer: Lexer) -> Result<()> {
    loop {
        let token = lexer.next_token();
        if token.kind == TokenKind::EOF {
            return Ok(());
        }

        if token.is_one_of_many(&[
            TokenKind::String,
            TokenKind::Identifier,
            TokenKind::Integer,
            TokenKind::Illegal,
        ]) {
            writeln!(out, "{} ({})", token.kind, token.value)?;
        } else {
            writeln!(out, "{}", token.kind)?;
        }
    }
}
