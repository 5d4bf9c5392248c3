//! Streaming lexer producing classified tokens for the parser.
//!
//! The lexer is pull-based: `next_token` scans one token from the source
//! buffer and returns it with its span. After the end of the buffer it keeps
//! returning the end-of-file sentinel.

use crate::source_manager::{SourceId, SourceSpan};
use hashbrown::HashMap;
use std::sync::OnceLock;
use symbol_table::GlobalSymbol as Symbol;

/// Token kinds for the C declaration and statement grammar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    // === LITERALS ===
    IntegerConstant(i64),
    FloatConstant(f64),
    CharacterConstant(u8),
    StringLiteral(Symbol),

    // === IDENTIFIERS ===
    Identifier(Symbol),

    // === KEYWORDS ===
    // Storage class specifiers
    Auto,
    Extern,
    Register,
    Static,
    Typedef,

    // Type qualifiers
    Const,
    Restrict,
    Volatile,

    // Type specifiers
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Signed,
    Unsigned,
    Void,

    // Tagged type specifiers
    Struct,
    Union,
    Enum,

    // Control flow
    Break,
    Case,
    Continue,
    Default,
    Do,
    Else,
    For,
    Goto,
    If,
    Return,
    Switch,
    While,

    // Other keywords
    Inline,
    Sizeof,

    // === OPERATORS ===
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Increment,
    Decrement,

    And,
    Or,
    Xor,
    Not,
    Tilde,
    LeftShift,
    RightShift,

    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,

    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    LeftShiftAssign,
    RightShiftAssign,

    LogicAnd,
    LogicOr,

    Arrow,
    Dot,

    Question,
    Colon,

    // === PUNCTUATION ===
    Comma,
    Semicolon,
    Ellipsis,

    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,

    // === SPECIAL TOKENS ===
    EndOfFile,
    Unknown,
}

impl TokenKind {
    pub(crate) fn is_storage_class_specifier(&self) -> bool {
        matches!(
            self,
            TokenKind::Typedef | TokenKind::Extern | TokenKind::Static | TokenKind::Auto | TokenKind::Register
        )
    }

    pub(crate) fn is_type_specifier(&self) -> bool {
        matches!(
            self,
            TokenKind::Void
                | TokenKind::Char
                | TokenKind::Short
                | TokenKind::Int
                | TokenKind::Long
                | TokenKind::Float
                | TokenKind::Double
                | TokenKind::Signed
                | TokenKind::Unsigned
                | TokenKind::Struct
                | TokenKind::Union
                | TokenKind::Enum
        )
    }

    pub(crate) fn is_type_qualifier(&self) -> bool {
        matches!(self, TokenKind::Const | TokenKind::Restrict | TokenKind::Volatile)
    }

    /// Token kinds that unambiguously begin declaration specifiers. Typedef
    /// names also begin declarations but need a symbol-table lookup, which
    /// the parser layers on top.
    pub(crate) fn is_declaration_specifier_start(&self) -> bool {
        self.is_storage_class_specifier()
            || self.is_type_specifier()
            || self.is_type_qualifier()
            || matches!(self, TokenKind::Inline)
    }
}

/// Token with its source span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: SourceSpan,
}

fn keyword_map() -> &'static HashMap<&'static str, TokenKind> {
    static KEYWORDS: OnceLock<HashMap<&'static str, TokenKind>> = OnceLock::new();
    KEYWORDS.get_or_init(|| {
        let mut m = HashMap::new();
        m.insert("auto", TokenKind::Auto);
        m.insert("break", TokenKind::Break);
        m.insert("case", TokenKind::Case);
        m.insert("char", TokenKind::Char);
        m.insert("const", TokenKind::Const);
        m.insert("continue", TokenKind::Continue);
        m.insert("default", TokenKind::Default);
        m.insert("do", TokenKind::Do);
        m.insert("double", TokenKind::Double);
        m.insert("else", TokenKind::Else);
        m.insert("enum", TokenKind::Enum);
        m.insert("extern", TokenKind::Extern);
        m.insert("float", TokenKind::Float);
        m.insert("for", TokenKind::For);
        m.insert("goto", TokenKind::Goto);
        m.insert("if", TokenKind::If);
        m.insert("inline", TokenKind::Inline);
        m.insert("int", TokenKind::Int);
        m.insert("long", TokenKind::Long);
        m.insert("register", TokenKind::Register);
        m.insert("restrict", TokenKind::Restrict);
        m.insert("return", TokenKind::Return);
        m.insert("short", TokenKind::Short);
        m.insert("signed", TokenKind::Signed);
        m.insert("sizeof", TokenKind::Sizeof);
        m.insert("static", TokenKind::Static);
        m.insert("struct", TokenKind::Struct);
        m.insert("switch", TokenKind::Switch);
        m.insert("typedef", TokenKind::Typedef);
        m.insert("union", TokenKind::Union);
        m.insert("unsigned", TokenKind::Unsigned);
        m.insert("void", TokenKind::Void);
        m.insert("volatile", TokenKind::Volatile);
        m.insert("while", TokenKind::While);
        m
    })
}

/// Check if an identifier spelling is a keyword.
pub fn classify_identifier(text: &str) -> Option<TokenKind> {
    keyword_map().get(text).copied()
}

/// Character-level lexer over one source buffer.
pub struct Lexer<'src> {
    src: &'src str,
    bytes: &'src [u8],
    pos: usize,
    source_id: SourceId,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str, source_id: SourceId) -> Self {
        Lexer {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            source_id,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.pos + n).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    fn span_from(&self, start: usize) -> SourceSpan {
        SourceSpan::new_with_length(self.source_id, start as u32, (self.pos - start) as u32)
    }

    fn make(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            span: self.span_from(start),
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.pos += 1;
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    self.pos += 2;
                    while self.pos < self.bytes.len() {
                        if self.peek() == Some(b'*') && self.peek_at(1) == Some(b'/') {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    /// Scan the next token. At end of input this returns (and keeps
    /// returning) the end-of-file sentinel.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let start = self.pos;
        let c = match self.peek() {
            Some(c) => c,
            None => return self.make(TokenKind::EndOfFile, start),
        };

        if c.is_ascii_alphabetic() || c == b'_' {
            return self.lex_identifier(start);
        }
        if c.is_ascii_digit() {
            return self.lex_number(start);
        }
        match c {
            b'\'' => self.lex_char_literal(start),
            b'"' => self.lex_string_literal(start),
            _ => self.lex_punctuator(start),
        }
    }

    fn lex_identifier(&mut self, start: usize) -> Token {
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = &self.src[start..self.pos];
        let kind = classify_identifier(text).unwrap_or_else(|| TokenKind::Identifier(Symbol::new(text)));
        self.make(kind, start)
    }

    fn lex_number(&mut self, start: usize) -> Token {
        let mut is_float = false;
        if self.peek() == Some(b'0') && matches!(self.peek_at(1), Some(b'x') | Some(b'X')) {
            self.pos += 2;
            while let Some(b) = self.peek() {
                if b.is_ascii_hexdigit() {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        } else {
            while let Some(b) = self.peek() {
                if b.is_ascii_digit() {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            if self.peek() == Some(b'.') {
                is_float = true;
                self.pos += 1;
                while let Some(b) = self.peek() {
                    if b.is_ascii_digit() {
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
            }
            if matches!(self.peek(), Some(b'e') | Some(b'E')) {
                let mut ahead = 1;
                if matches!(self.peek_at(1), Some(b'+') | Some(b'-')) {
                    ahead = 2;
                }
                if self.peek_at(ahead).is_some_and(|b| b.is_ascii_digit()) {
                    is_float = true;
                    self.pos += ahead;
                    while let Some(b) = self.peek() {
                        if b.is_ascii_digit() {
                            self.pos += 1;
                        } else {
                            break;
                        }
                    }
                }
            }
        }

        // suffixes: u/U, l/L, f/F in any legal combination
        let digits_end = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b'u' | b'U' | b'l' | b'L' | b'f' | b'F') {
                if matches!(b, b'f' | b'F') {
                    is_float = true;
                }
                self.pos += 1;
            } else {
                break;
            }
        }

        let digits = &self.src[start..digits_end];
        let kind = if is_float {
            digits
                .parse::<f64>()
                .map(TokenKind::FloatConstant)
                .unwrap_or(TokenKind::Unknown)
        } else {
            parse_integer_literal(digits)
                .map(TokenKind::IntegerConstant)
                .unwrap_or(TokenKind::Unknown)
        };
        self.make(kind, start)
    }

    fn lex_char_literal(&mut self, start: usize) -> Token {
        self.pos += 1; // opening quote
        let value = match self.bump() {
            Some(b'\\') => self.lex_escape(),
            Some(b) => b,
            None => 0,
        };
        if self.peek() == Some(b'\'') {
            self.pos += 1;
            self.make(TokenKind::CharacterConstant(value), start)
        } else {
            // unterminated character constant
            self.make(TokenKind::Unknown, start)
        }
    }

    fn lex_escape(&mut self) -> u8 {
        match self.bump() {
            Some(b'n') => b'\n',
            Some(b't') => b'\t',
            Some(b'r') => b'\r',
            Some(b'0') => 0,
            Some(b'\\') => b'\\',
            Some(b'\'') => b'\'',
            Some(b'"') => b'"',
            Some(b'x') => {
                let mut value: u32 = 0;
                while let Some(b) = self.peek() {
                    if let Some(d) = (b as char).to_digit(16) {
                        value = value.wrapping_mul(16).wrapping_add(d);
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
                value as u8
            }
            Some(other) => other,
            None => 0,
        }
    }

    fn lex_string_literal(&mut self, start: usize) -> Token {
        self.pos += 1; // opening quote
        let mut content = String::new();
        loop {
            match self.bump() {
                Some(b'"') => {
                    return self.make(TokenKind::StringLiteral(Symbol::new(&content)), start);
                }
                Some(b'\\') => content.push(self.lex_escape() as char),
                Some(b) => content.push(b as char),
                None => return self.make(TokenKind::Unknown, start),
            }
        }
    }

    fn lex_punctuator(&mut self, start: usize) -> Token {
        use TokenKind::*;

        let c = self.bump().expect("caller checked a byte is present");
        let one = |lexer: &Self, kind| lexer.make(kind, start);

        let kind = match c {
            b'(' => return one(self, LeftParen),
            b')' => return one(self, RightParen),
            b'[' => return one(self, LeftBracket),
            b']' => return one(self, RightBracket),
            b'{' => return one(self, LeftBrace),
            b'}' => return one(self, RightBrace),
            b',' => return one(self, Comma),
            b';' => return one(self, Semicolon),
            b'?' => return one(self, Question),
            b':' => return one(self, Colon),
            b'~' => return one(self, Tilde),
            b'.' => {
                if self.peek() == Some(b'.') && self.peek_at(1) == Some(b'.') {
                    self.pos += 2;
                    Ellipsis
                } else {
                    Dot
                }
            }
            b'+' => match self.peek() {
                Some(b'+') => {
                    self.pos += 1;
                    Increment
                }
                Some(b'=') => {
                    self.pos += 1;
                    PlusAssign
                }
                _ => Plus,
            },
            b'-' => match self.peek() {
                Some(b'-') => {
                    self.pos += 1;
                    Decrement
                }
                Some(b'=') => {
                    self.pos += 1;
                    MinusAssign
                }
                Some(b'>') => {
                    self.pos += 1;
                    Arrow
                }
                _ => Minus,
            },
            b'*' => match self.peek() {
                Some(b'=') => {
                    self.pos += 1;
                    StarAssign
                }
                _ => Star,
            },
            b'/' => match self.peek() {
                Some(b'=') => {
                    self.pos += 1;
                    DivAssign
                }
                _ => Slash,
            },
            b'%' => match self.peek() {
                Some(b'=') => {
                    self.pos += 1;
                    ModAssign
                }
                _ => Percent,
            },
            b'^' => match self.peek() {
                Some(b'=') => {
                    self.pos += 1;
                    XorAssign
                }
                _ => Xor,
            },
            b'!' => match self.peek() {
                Some(b'=') => {
                    self.pos += 1;
                    NotEqual
                }
                _ => Not,
            },
            b'=' => match self.peek() {
                Some(b'=') => {
                    self.pos += 1;
                    Equal
                }
                _ => Assign,
            },
            b'&' => match self.peek() {
                Some(b'&') => {
                    self.pos += 1;
                    LogicAnd
                }
                Some(b'=') => {
                    self.pos += 1;
                    AndAssign
                }
                _ => And,
            },
            b'|' => match self.peek() {
                Some(b'|') => {
                    self.pos += 1;
                    LogicOr
                }
                Some(b'=') => {
                    self.pos += 1;
                    OrAssign
                }
                _ => Or,
            },
            b'<' => match self.peek() {
                Some(b'<') => {
                    self.pos += 1;
                    if self.peek() == Some(b'=') {
                        self.pos += 1;
                        LeftShiftAssign
                    } else {
                        LeftShift
                    }
                }
                Some(b'=') => {
                    self.pos += 1;
                    LessEqual
                }
                _ => Less,
            },
            b'>' => match self.peek() {
                Some(b'>') => {
                    self.pos += 1;
                    if self.peek() == Some(b'=') {
                        self.pos += 1;
                        RightShiftAssign
                    } else {
                        RightShift
                    }
                }
                Some(b'=') => {
                    self.pos += 1;
                    GreaterEqual
                }
                _ => Greater,
            },
            _ => Unknown,
        };
        self.make(kind, start)
    }

    /// Collect every token up to and including the end-of-file sentinel.
    pub fn tokenize_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = matches!(token.kind, TokenKind::EndOfFile);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

/// Parse a C integer literal, handling 0x/0 prefixes and u/l suffixes.
fn parse_integer_literal(text: &str) -> Option<i64> {
    let stripped = text
        .trim_end_matches(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
    let (digits, base) = if let Some(hex) = stripped.strip_prefix("0x").or_else(|| stripped.strip_prefix("0X")) {
        (hex, 16)
    } else if stripped.len() > 1 && stripped.starts_with('0') {
        (&stripped[1..], 8)
    } else {
        (stripped, 10)
    };
    u64::from_str_radix(digits, base).ok().map(|v| v as i64)
}

#[cfg(test)]
mod tests_lexer;
