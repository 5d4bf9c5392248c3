//! Fixed-depth lookahead window over the lexer stream.

use crate::lexer::{Lexer, Token, TokenKind};
use crate::source_manager::SourceSpan;

/// Number of tokens the parser may look ahead.
pub const LOOKAHEAD: usize = 4;

/// Sliding window of the next [`LOOKAHEAD`] tokens. Once the lexer produces
/// the end-of-file sentinel it latches: every further refill yields the same
/// sentinel token.
pub struct TokenBuffer<'src> {
    lexer: Lexer<'src>,
    window: [Token; LOOKAHEAD],
    eof_token: Option<Token>,
    last_span: SourceSpan,
    consumed: usize,
}

impl<'src> TokenBuffer<'src> {
    pub fn new(lexer: Lexer<'src>) -> Self {
        let mut buffer = TokenBuffer {
            lexer,
            window: [Token {
                kind: TokenKind::EndOfFile,
                span: SourceSpan::empty(),
            }; LOOKAHEAD],
            eof_token: None,
            last_span: SourceSpan::empty(),
            consumed: 0,
        };
        for i in 0..LOOKAHEAD {
            buffer.window[i] = buffer.pull();
        }
        buffer
    }

    fn pull(&mut self) -> Token {
        if let Some(eof) = self.eof_token {
            return eof;
        }
        let token = self.lexer.next_token();
        if matches!(token.kind, TokenKind::EndOfFile) {
            self.eof_token = Some(token);
        }
        token
    }

    /// Look at the n-th upcoming token without consuming it. Asking beyond
    /// the window is a bug in the parser.
    pub fn peek(&self, n: usize) -> Token {
        assert!(n < LOOKAHEAD, "only {} tokens of lookahead are supported", LOOKAHEAD);
        self.window[n]
    }

    /// Consume the front token, shift the window and refill its tail.
    pub fn next(&mut self) -> Token {
        let token = self.window[0];
        for i in 1..LOOKAHEAD {
            self.window[i - 1] = self.window[i];
        }
        self.window[LOOKAHEAD - 1] = self.pull();
        self.last_span = token.span;
        self.consumed += 1;
        token
    }

    /// Span of the most recently consumed token.
    pub fn last_span(&self) -> SourceSpan {
        self.last_span
    }

    /// Number of tokens consumed so far; recovery uses this to guarantee
    /// forward progress.
    pub fn position(&self) -> usize {
        self.consumed
    }
}
