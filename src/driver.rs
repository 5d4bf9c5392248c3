//! Command-line driver: argument parsing and the front-end pipeline.

use clap::Parser as CliParser;
use std::path::PathBuf;

use crate::ast::dumper::AstDumper;
use crate::ast::Ast;
use crate::diagnostic::{DiagnosticEngine, ErrorFormatter};
use crate::lexer::{Lexer, TokenKind};
use crate::parser::Parser;
use crate::scope::ScopeTree;
use crate::source_manager::{SourceId, SourceManager};

/// CLI interface using clap.
#[derive(CliParser, Debug)]
#[clap(name = "kolak", about = "C front-end written in Rust")]
pub struct Cli {
    /// Input C source files
    #[clap(value_parser, required = true)]
    pub input_files: Vec<PathBuf>,

    /// Output file for dumps (defaults to stdout)
    #[clap(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable verbose parser tracing
    #[clap(short, long)]
    pub verbose: bool,

    /// Dump the classified token stream and stop
    #[clap(long)]
    pub dump_tokens: bool,

    /// Dump the AST after parsing
    #[clap(long)]
    pub dump_ast: bool,
}

/// Run the front-end over every input file. Returns the process exit code:
/// zero iff no file produced an error diagnostic.
pub fn run(cli: Cli) -> i32 {
    let level = if cli.verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();

    let mut any_errors = false;
    let mut dumps = String::new();

    for path in &cli.input_files {
        let mut source_manager = SourceManager::new();
        let source_id = match source_manager.add_file_from_path(path) {
            Ok(id) => id,
            Err(error) => {
                eprintln!("kolak: cannot read '{}': {}", path.display(), error);
                any_errors = true;
                continue;
            }
        };

        if cli.dump_tokens {
            dumps.push_str(&dump_tokens(&source_manager, source_id));
            continue;
        }

        let mut ast = Ast::new();
        let mut scopes = ScopeTree::new();
        let mut diag = DiagnosticEngine::new();

        let source = source_manager.get_buffer(source_id).to_string();
        let root = {
            let lexer = Lexer::new(&source, source_id);
            let mut parser = Parser::new(lexer, &mut ast, &mut scopes, &mut diag);
            parser.parse_translation_unit()
        };

        let formatter = ErrorFormatter::default();
        formatter.print_diagnostics(diag.diagnostics(), &source_manager);
        if diag.has_errors() {
            eprintln!("kolak: {} error(s) in '{}'", diag.error_count(), path.display());
            any_errors = true;
        }

        if cli.dump_ast {
            dumps.push_str(&AstDumper::new(&ast, &scopes).dump(root));
        }
    }

    if !dumps.is_empty() {
        match &cli.output {
            Some(path) => {
                if let Err(error) = std::fs::write(path, &dumps) {
                    eprintln!("kolak: cannot write '{}': {}", path.display(), error);
                    any_errors = true;
                }
            }
            None => print!("{}", dumps),
        }
    }

    if any_errors {
        1
    } else {
        0
    }
}

/// One classified token per line, with line/column positions.
fn dump_tokens(source_manager: &SourceManager, source_id: SourceId) -> String {
    let source = source_manager.get_buffer(source_id);
    let mut lexer = Lexer::new(source, source_id);
    let mut out = String::new();
    loop {
        let token = lexer.next_token();
        let (line, column) = source_manager
            .get_line_column(token.span.start())
            .unwrap_or((0, 0));
        out.push_str(&format!("{}:{}: {:?}\n", line, column, token.kind));
        if matches!(token.kind, TokenKind::EndOfFile) {
            break;
        }
    }
    out
}
