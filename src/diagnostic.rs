//! Diagnostics: parse errors, collected diagnostics and snippet rendering.

use crate::lexer::TokenKind;
use crate::source_manager::{SourceManager, SourceSpan};
use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};
use symbol_table::GlobalSymbol as Symbol;

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Note,
}

/// One reported diagnostic with its primary location.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    pub span: SourceSpan,
    /// Suggestions for fixing
    pub hints: Vec<String>,
    /// Related locations, e.g. a previous declaration
    pub related: Vec<SourceSpan>,
}

/// Errors raised by the grammar. Syntax errors come from token mismatches,
/// the remaining variants are the narrow class of declaration-specifier
/// combination errors the parser itself can decide.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("expected {expected}, found {found:?}")]
    UnexpectedToken {
        expected: String,
        found: TokenKind,
        span: SourceSpan,
    },

    #[error("unexpected end of file")]
    UnexpectedEof { span: SourceSpan },

    #[error("{message}")]
    SyntaxError { message: String, span: SourceSpan },

    #[error("'{first}' cannot be combined with '{second}'")]
    ConflictingSpecifiers {
        first: String,
        second: String,
        span: SourceSpan,
        previous: SourceSpan,
    },

    #[error("multiple storage classes in declaration")]
    MultipleStorageClasses { span: SourceSpan, previous: SourceSpan },

    #[error("redeclaration of '{name}'")]
    Redeclaration {
        name: Symbol,
        span: SourceSpan,
        previous: SourceSpan,
    },

    #[error("bit-field width must be an integer literal")]
    InvalidBitField { span: SourceSpan },

    #[error("typedef is not allowed in a function parameter")]
    TypedefInParameter { span: SourceSpan },
}

impl ParseError {
    pub fn span(&self) -> SourceSpan {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::UnexpectedEof { span }
            | ParseError::SyntaxError { span, .. }
            | ParseError::ConflictingSpecifiers { span, .. }
            | ParseError::MultipleStorageClasses { span, .. }
            | ParseError::Redeclaration { span, .. }
            | ParseError::InvalidBitField { span }
            | ParseError::TypedefInParameter { span } => *span,
        }
    }

    fn related(&self) -> Vec<SourceSpan> {
        match self {
            ParseError::ConflictingSpecifiers { previous, .. }
            | ParseError::MultipleStorageClasses { previous, .. }
            | ParseError::Redeclaration { previous, .. } => vec![*previous],
            _ => Vec::new(),
        }
    }
}

/// Collects diagnostics across a whole translation unit so that one bad
/// declaration does not abort the parse.
pub struct DiagnosticEngine {
    pub diagnostics: Vec<Diagnostic>,
    pub warnings_as_errors: bool,
}

impl Default for DiagnosticEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticEngine {
    pub fn new() -> Self {
        DiagnosticEngine {
            diagnostics: Vec::new(),
            warnings_as_errors: false,
        }
    }

    fn report(&mut self, level: DiagnosticLevel, message: String, span: SourceSpan, related: Vec<SourceSpan>) {
        let level = if level == DiagnosticLevel::Warning && self.warnings_as_errors {
            DiagnosticLevel::Error
        } else {
            level
        };
        self.diagnostics.push(Diagnostic {
            level,
            message,
            span,
            hints: Vec::new(),
            related,
        });
    }

    pub fn report_parse_error(&mut self, error: ParseError) {
        let span = error.span();
        let related = error.related();
        self.report(DiagnosticLevel::Error, error.to_string(), span, related);
    }

    pub fn report_warning(&mut self, message: impl Into<String>, span: SourceSpan) {
        self.report(DiagnosticLevel::Warning, message.into(), span, Vec::new());
    }

    pub fn report_note(&mut self, message: impl Into<String>, span: SourceSpan) {
        self.report(DiagnosticLevel::Note, message.into(), span, Vec::new());
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == DiagnosticLevel::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Error)
            .count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Renders diagnostics with source snippets via annotate_snippets.
pub struct ErrorFormatter {
    pub use_colors: bool,
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        ErrorFormatter { use_colors: true }
    }
}

impl ErrorFormatter {
    /// Format a single diagnostic with source context.
    pub fn format_diagnostic(&self, diag: &Diagnostic, source_manager: &SourceManager) -> String {
        let renderer = if self.use_colors {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        let source = source_manager.get_buffer(diag.span.source_id());
        let path = source_manager
            .get_file_info(diag.span.source_id())
            .and_then(|fi| fi.path.to_str())
            .unwrap_or("<unknown>");

        let mut snippet = Snippet::source(source).line_start(1).path(path);
        snippet = snippet.annotation(
            AnnotationKind::Primary.span(diag.span.start().offset() as usize..diag.span.end().offset() as usize),
        );
        for rel in &diag.related {
            if rel.source_id() == diag.span.source_id() {
                snippet = snippet.annotation(
                    AnnotationKind::Context
                        .span(rel.start().offset() as usize..rel.end().offset() as usize)
                        .label("previously declared here"),
                );
            }
        }

        let mut group = self.level(diag).primary_title(&diag.message).element(snippet);
        for hint in &diag.hints {
            group = group.element(Level::HELP.message(hint));
        }

        let report = &[group];
        renderer.render(report).to_string()
    }

    fn level<'a>(&self, diag: &Diagnostic) -> Level<'a> {
        match diag.level {
            DiagnosticLevel::Error => Level::ERROR,
            DiagnosticLevel::Warning => Level::WARNING,
            DiagnosticLevel::Note => Level::NOTE,
        }
    }

    /// Print all diagnostics to stderr.
    pub fn print_diagnostics(&self, diagnostics: &[Diagnostic], source_manager: &SourceManager) {
        for diag in diagnostics {
            eprintln!("{}", self.format_diagnostic(diag, source_manager));
        }
    }
}
