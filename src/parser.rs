//! Parser for one translation unit.
//!
//! The parser owns a four-token lookahead window over the lexer, the
//! current-scope pointer, and the list of record/enum declarations waiting
//! to be attached to the enclosing declaration. Sub-grammars live in the
//! submodules and take the parser by mutable reference.
//!
//! Grammar rules return `Result` and propagate errors with `?`. The
//! translation-unit loop, the statement loop inside compound statements and
//! the field loop inside record bodies are the recovery points: they report
//! the in-flight error, skip to a synchronization token and restore the
//! current scope and the pending-declaration list.

use crate::ast::{Ast, Node, NodeKind, NodeRef, Symbol};
use crate::diagnostic::{DiagnosticEngine, ParseError};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::scope::{ScopeId, ScopeTree};
use crate::source_manager::SourceSpan;
use log::debug;

pub mod decl_specifiers;
pub mod declarations;
pub mod declarator;
pub mod enum_parsing;
pub mod expressions;
pub mod statements;
pub mod struct_parsing;
pub mod token_buffer;
pub mod type_builder;

use token_buffer::TokenBuffer;

/// Saved state for error recovery. Restoring it undoes scope pushes and
/// speculative tag declarations left behind by an aborted grammar rule.
pub(crate) struct RecoveryPoint {
    scope: ScopeId,
    pending_len: usize,
}

/// Main parser structure.
pub struct Parser<'a, 'src> {
    buffer: TokenBuffer<'src>,
    pub ast: &'a mut Ast,
    pub scopes: &'a mut ScopeTree,
    pub diag: &'a mut DiagnosticEngine,

    /// When set, `,` does not act as the comma operator; call argument
    /// lists, initializer lists and enumerator initializers use this.
    pub(crate) comma_terminates: bool,

    /// Record/enum declaration nodes produced while parsing declaration
    /// specifiers, waiting to be attached to the translation unit or the
    /// enclosing declaration statement.
    pub(crate) pending_tag_decls: Vec<NodeRef>,

    /// Last declaration node seen per interned tag type, for chaining a
    /// definition to its forward declaration.
    pub(crate) tag_decl_nodes: hashbrown::HashMap<crate::ast::TypeRef, NodeRef>,

    anon_record_seq: u32,
    anon_enum_seq: u32,
    anon_field_seq: u32,
    dummy_var_seq: u32,
}

impl<'a, 'src> Parser<'a, 'src> {
    pub fn new(
        lexer: Lexer<'src>,
        ast: &'a mut Ast,
        scopes: &'a mut ScopeTree,
        diag: &'a mut DiagnosticEngine,
    ) -> Self {
        Parser {
            buffer: TokenBuffer::new(lexer),
            ast,
            scopes,
            diag,
            comma_terminates: false,
            pending_tag_decls: Vec::new(),
            tag_decl_nodes: hashbrown::HashMap::new(),
            anon_record_seq: 0,
            anon_enum_seq: 0,
            anon_field_seq: 0,
            dummy_var_seq: 0,
        }
    }

    /// Parse the whole input as a translation unit.
    pub fn parse_translation_unit(&mut self) -> NodeRef {
        declarations::parse_translation_unit(self)
    }

    // --- token access -----------------------------------------------------

    pub(crate) fn current_token(&self) -> Token {
        self.buffer.peek(0)
    }

    pub(crate) fn current_kind(&self) -> TokenKind {
        self.buffer.peek(0).kind
    }

    pub(crate) fn current_span(&self) -> SourceSpan {
        self.buffer.peek(0).span
    }

    pub(crate) fn peek_kind(&self, n: usize) -> TokenKind {
        self.buffer.peek(n).kind
    }

    pub(crate) fn previous_span(&self) -> SourceSpan {
        self.buffer.last_span()
    }

    /// Count of consumed tokens; used by recovery loops to guarantee
    /// progress.
    pub(crate) fn position(&self) -> usize {
        self.buffer.position()
    }

    pub(crate) fn advance(&mut self) -> Token {
        self.buffer.next()
    }

    pub(crate) fn at_eof(&self) -> bool {
        matches!(self.current_kind(), TokenKind::EndOfFile)
    }

    pub(crate) fn is_token(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Consume the current token iff it has the given kind.
    pub(crate) fn accept(&mut self, kind: TokenKind) -> Option<Token> {
        if self.current_kind() == kind {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consume the current token or raise a syntax error naming both kinds.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.current_token();
        if token.kind == kind {
            Ok(self.advance())
        } else if self.at_eof() {
            Err(ParseError::UnexpectedEof {
                span: self.previous_span(),
            })
        } else {
            Err(ParseError::UnexpectedToken {
                expected: format!("{:?}", kind),
                found: token.kind,
                span: token.span,
            })
        }
    }

    /// Consume an identifier and return its interned symbol.
    pub(crate) fn expect_name(&mut self) -> Result<(Symbol, SourceSpan), ParseError> {
        let token = self.current_token();
        if let TokenKind::Identifier(symbol) = token.kind {
            self.advance();
            Ok((symbol, token.span))
        } else {
            Err(ParseError::UnexpectedToken {
                expected: "identifier".to_string(),
                found: token.kind,
                span: token.span,
            })
        }
    }

    pub(crate) fn accept_name(&mut self) -> Option<(Symbol, SourceSpan)> {
        let token = self.current_token();
        if let TokenKind::Identifier(symbol) = token.kind {
            self.advance();
            Some((symbol, token.span))
        } else {
            None
        }
    }

    // --- classification ---------------------------------------------------

    /// Can the current token begin a declaration? Identifiers qualify only
    /// when they name a user-defined type; this lookup is what resolves the
    /// declaration-vs-expression ambiguity for typedef names.
    pub(crate) fn starts_declaration(&self) -> bool {
        match self.current_kind() {
            TokenKind::Identifier(symbol) => self.scopes.lookup_user_type(symbol).is_some(),
            kind => kind.is_declaration_specifier_start(),
        }
    }

    /// Can `token` begin a type name (cast, sizeof, compound literal)?
    pub(crate) fn token_starts_type_name(&self, kind: TokenKind) -> bool {
        match kind {
            TokenKind::Identifier(symbol) => self.scopes.lookup_user_type(symbol).is_some(),
            kind => kind.is_type_specifier() || kind.is_type_qualifier(),
        }
    }

    pub(crate) fn starts_type_name(&self) -> bool {
        self.token_starts_type_name(self.current_kind())
    }

    // --- AST helpers ------------------------------------------------------

    pub(crate) fn push_node(&mut self, kind: NodeKind, span: SourceSpan) -> NodeRef {
        self.ast.push_node(Node::new(kind, span))
    }

    pub(crate) fn node_span(&self, node: NodeRef) -> SourceSpan {
        self.ast.get_node(node).span
    }

    // --- synthesized names ------------------------------------------------

    /// Anonymous records, enums, fields and unnamed declarators get interned
    /// names starting with '!', which cannot collide with source
    /// identifiers.
    pub(crate) fn next_anon_record_name(&mut self) -> Symbol {
        self.anon_record_seq += 1;
        Symbol::new(&format!("!recordty{}", self.anon_record_seq))
    }

    pub(crate) fn next_anon_enum_name(&mut self) -> Symbol {
        self.anon_enum_seq += 1;
        Symbol::new(&format!("!enumty{}", self.anon_enum_seq))
    }

    pub(crate) fn next_anon_field_name(&mut self, record: Symbol) -> Symbol {
        self.anon_field_seq += 1;
        Symbol::new(&format!("!{}!field{}", record, self.anon_field_seq))
    }

    pub(crate) fn next_dummy_var_name(&mut self) -> Symbol {
        self.dummy_var_seq += 1;
        Symbol::new(&format!("!dummyVar{}", self.dummy_var_seq))
    }

    // --- error recovery ---------------------------------------------------

    pub(crate) fn recovery_point(&self) -> RecoveryPoint {
        RecoveryPoint {
            scope: self.scopes.current_scope(),
            pending_len: self.pending_tag_decls.len(),
        }
    }

    /// Restore parser state after an aborted rule: the current scope and the
    /// pending tag declarations.
    pub(crate) fn restore(&mut self, point: RecoveryPoint) {
        self.scopes.set_current(point.scope);
        self.pending_tag_decls.truncate(point.pending_len);
    }

    /// Skip tokens until a statement boundary: a `;` at bracket depth zero,
    /// a brace that closes the current nesting, or end of input.
    pub(crate) fn synchronize(&mut self) {
        debug!("synchronize: skipping from {:?}", self.current_kind());
        let mut brace_depth: i32 = 0;
        let mut paren_depth: i32 = 0;
        while !self.at_eof() {
            match self.current_kind() {
                TokenKind::LeftBrace => {
                    brace_depth += 1;
                    self.advance();
                }
                TokenKind::RightBrace => {
                    brace_depth -= 1;
                    if brace_depth < 0 {
                        // Closes an enclosing block; leave it for the caller.
                        return;
                    }
                    self.advance();
                    if brace_depth == 0 && paren_depth == 0 {
                        return;
                    }
                }
                TokenKind::LeftParen => {
                    paren_depth += 1;
                    self.advance();
                }
                TokenKind::RightParen => {
                    paren_depth -= 1;
                    self.advance();
                }
                TokenKind::Semicolon => {
                    self.advance();
                    if brace_depth == 0 && paren_depth == 0 {
                        return;
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Recovery inside a record body: skip to the end of the current field
    /// declaration without consuming the closing brace.
    pub(crate) fn synchronize_field(&mut self) {
        while !self.at_eof() {
            match self.current_kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RightBrace => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests_parser;
