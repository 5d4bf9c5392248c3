use super::*;
use crate::source_manager::SourceManager;

fn lex(source: &str) -> Vec<TokenKind> {
    let mut sm = SourceManager::new();
    let id = sm.add_buffer(source.to_string(), "test.c");
    let text = sm.get_buffer(id).to_string();
    let mut lexer = Lexer::new(&text, id);
    lexer
        .tokenize_all()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn keywords_and_identifiers() {
    let kinds = lex("static const int *id;");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Static,
            TokenKind::Const,
            TokenKind::Int,
            TokenKind::Star,
            TokenKind::Identifier(Symbol::new("id")),
            TokenKind::Semicolon,
            TokenKind::EndOfFile,
        ]
    );
}

#[test]
fn integer_literal_bases_and_suffixes() {
    assert_eq!(lex("42")[0], TokenKind::IntegerConstant(42));
    assert_eq!(lex("0x1f")[0], TokenKind::IntegerConstant(31));
    assert_eq!(lex("010")[0], TokenKind::IntegerConstant(8));
    assert_eq!(lex("7ull")[0], TokenKind::IntegerConstant(7));
    assert_eq!(lex("123L")[0], TokenKind::IntegerConstant(123));
}

#[test]
fn float_literals() {
    assert_eq!(lex("1.5")[0], TokenKind::FloatConstant(1.5));
    assert_eq!(lex("2e3")[0], TokenKind::FloatConstant(2000.0));
    assert_eq!(lex("1.0f")[0], TokenKind::FloatConstant(1.0));
}

#[test]
fn char_and_string_literals() {
    assert_eq!(lex("'a'")[0], TokenKind::CharacterConstant(b'a'));
    assert_eq!(lex("'\\n'")[0], TokenKind::CharacterConstant(b'\n'));
    assert_eq!(lex("\"hi\\t\"")[0], TokenKind::StringLiteral(Symbol::new("hi\t")));
}

#[test]
fn multi_char_punctuators() {
    let kinds = lex("a <<= b >>= c ... -> ++ -- == != <= >= && ||");
    assert!(kinds.contains(&TokenKind::LeftShiftAssign));
    assert!(kinds.contains(&TokenKind::RightShiftAssign));
    assert!(kinds.contains(&TokenKind::Ellipsis));
    assert!(kinds.contains(&TokenKind::Arrow));
    assert!(kinds.contains(&TokenKind::Increment));
    assert!(kinds.contains(&TokenKind::Decrement));
    assert!(kinds.contains(&TokenKind::Equal));
    assert!(kinds.contains(&TokenKind::NotEqual));
    assert!(kinds.contains(&TokenKind::LessEqual));
    assert!(kinds.contains(&TokenKind::GreaterEqual));
    assert!(kinds.contains(&TokenKind::LogicAnd));
    assert!(kinds.contains(&TokenKind::LogicOr));
}

#[test]
fn comments_are_skipped() {
    let kinds = lex("int /* block */ x; // line\nint y;");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Int,
            TokenKind::Identifier(Symbol::new("x")),
            TokenKind::Semicolon,
            TokenKind::Int,
            TokenKind::Identifier(Symbol::new("y")),
            TokenKind::Semicolon,
            TokenKind::EndOfFile,
        ]
    );
}

#[test]
fn eof_sentinel_latches() {
    let mut sm = SourceManager::new();
    let id = sm.add_buffer("x".to_string(), "test.c");
    let text = sm.get_buffer(id).to_string();
    let mut lexer = Lexer::new(&text, id);
    lexer.next_token();
    assert_eq!(lexer.next_token().kind, TokenKind::EndOfFile);
    assert_eq!(lexer.next_token().kind, TokenKind::EndOfFile);
}

#[test]
fn spans_point_at_source_text() {
    let mut sm = SourceManager::new();
    let id = sm.add_buffer("int foo;".to_string(), "test.c");
    let text = sm.get_buffer(id).to_string();
    let mut lexer = Lexer::new(&text, id);
    let _int = lexer.next_token();
    let foo = lexer.next_token();
    assert_eq!(foo.span.start().offset(), 4);
    assert_eq!(foo.span.end().offset(), 7);
}
