//! Statement parsing.
//!
//! One entry point dispatches on the leading token. Compound statements own
//! the statement-boundary recovery policy: a failed statement is reported,
//! the stream is synchronized and parsing continues with the next one.

use crate::ast::{CompoundStmt, ForStmt, IfStmt, NodeKind, NodeRef, WhileStmt};
use crate::diagnostic::ParseError;
use crate::lexer::TokenKind;
use crate::scope::ScopeKind;
use log::debug;
use thin_vec::ThinVec;

use super::expressions::parse_expression;
use super::Parser;

/// Parse one statement.
pub(crate) fn parse_statement(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let token = parser.current_token();

    // A label is an identifier directly followed by ':'.
    if let TokenKind::Identifier(label) = token.kind {
        if parser.peek_kind(1) == TokenKind::Colon {
            parser.advance();
            parser.advance();
            let stmt = parse_statement(parser)?;
            let span = token.span.merge(parser.node_span(stmt));
            return Ok(parser.push_node(NodeKind::Label(label, stmt), span));
        }
    }

    match token.kind {
        TokenKind::LeftBrace => parse_compound_statement(parser),
        TokenKind::If => parse_if_statement(parser),
        TokenKind::Switch => parse_switch_statement(parser),
        TokenKind::Case => parse_case_statement(parser),
        TokenKind::Default => parse_default_statement(parser),
        TokenKind::While => parse_while_statement(parser),
        TokenKind::Do => parse_do_statement(parser),
        TokenKind::For => parse_for_statement(parser),
        TokenKind::Goto => parse_goto_statement(parser),
        TokenKind::Continue => {
            parser.advance();
            let end = parser.expect(TokenKind::Semicolon)?;
            Ok(parser.push_node(NodeKind::Continue, token.span.merge(end.span)))
        }
        TokenKind::Break => {
            parser.advance();
            let end = parser.expect(TokenKind::Semicolon)?;
            Ok(parser.push_node(NodeKind::Break, token.span.merge(end.span)))
        }
        TokenKind::Return => parse_return_statement(parser),
        TokenKind::Semicolon => {
            parser.advance();
            Ok(parser.push_node(NodeKind::EmptyStatement, token.span))
        }
        _ if parser.starts_declaration() => super::declarations::parse_declaration_statement(parser),
        _ => parse_expression_statement(parser),
    }
}

/// `{ ... }`: opens a block scope, parses statements until the closing
/// brace, recovering at statement boundaries.
pub(crate) fn parse_compound_statement(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let open = parser.expect(TokenKind::LeftBrace)?;
    let scope = parser.scopes.push_scope(ScopeKind::Block);

    let mut items: ThinVec<NodeRef> = ThinVec::new();
    while !parser.is_token(TokenKind::RightBrace) && !parser.at_eof() {
        let point = parser.recovery_point();
        match parse_statement(parser) {
            Ok(stmt) => items.push(stmt),
            Err(error) => {
                debug!("statement failed, synchronizing: {}", error);
                parser.diag.report_parse_error(error);
                parser.restore(point);
                parser.synchronize();
            }
        }
    }

    let close = parser.expect(TokenKind::RightBrace)?;
    parser.scopes.pop_scope();

    let node = parser.push_node(
        NodeKind::CompoundStatement(CompoundStmt { scope, items }),
        open.span.merge(close.span),
    );
    parser.scopes.set_owner(scope, node);
    Ok(node)
}

fn parse_if_statement(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let keyword = parser.expect(TokenKind::If)?;
    parser.expect(TokenKind::LeftParen)?;
    let condition = parse_expression(parser, 0)?;
    parser.expect(TokenKind::RightParen)?;

    let then_branch = parse_statement(parser)?;
    let else_branch = if parser.accept(TokenKind::Else).is_some() {
        Some(parse_statement(parser)?)
    } else {
        None
    };

    let end = else_branch.unwrap_or(then_branch);
    let span = keyword.span.merge(parser.node_span(end));
    Ok(parser.push_node(
        NodeKind::If(IfStmt {
            condition,
            then_branch,
            else_branch,
        }),
        span,
    ))
}

fn parse_switch_statement(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let keyword = parser.expect(TokenKind::Switch)?;
    parser.expect(TokenKind::LeftParen)?;
    let condition = parse_expression(parser, 0)?;
    parser.expect(TokenKind::RightParen)?;
    let body = parse_statement(parser)?;
    let span = keyword.span.merge(parser.node_span(body));
    Ok(parser.push_node(NodeKind::Switch(condition, body), span))
}

fn parse_case_statement(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let keyword = parser.expect(TokenKind::Case)?;
    let expr = parse_expression(parser, 0)?;
    parser.expect(TokenKind::Colon)?;
    let stmt = parse_statement(parser)?;
    let span = keyword.span.merge(parser.node_span(stmt));
    Ok(parser.push_node(NodeKind::Case(expr, stmt), span))
}

fn parse_default_statement(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let keyword = parser.expect(TokenKind::Default)?;
    parser.expect(TokenKind::Colon)?;
    let stmt = parse_statement(parser)?;
    let span = keyword.span.merge(parser.node_span(stmt));
    Ok(parser.push_node(NodeKind::Default(stmt), span))
}

fn parse_while_statement(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let keyword = parser.expect(TokenKind::While)?;
    parser.expect(TokenKind::LeftParen)?;
    let condition = parse_expression(parser, 0)?;
    parser.expect(TokenKind::RightParen)?;
    let body = parse_statement(parser)?;
    let span = keyword.span.merge(parser.node_span(body));
    Ok(parser.push_node(NodeKind::While(WhileStmt { condition, body }), span))
}

fn parse_do_statement(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let keyword = parser.expect(TokenKind::Do)?;
    let body = parse_statement(parser)?;
    parser.expect(TokenKind::While)?;
    parser.expect(TokenKind::LeftParen)?;
    let condition = parse_expression(parser, 0)?;
    parser.expect(TokenKind::RightParen)?;
    let end = parser.expect(TokenKind::Semicolon)?;
    Ok(parser.push_node(NodeKind::DoWhile(body, condition), keyword.span.merge(end.span)))
}

/// `for (decl-or-expr; cond; step) body`. A header that begins with a
/// declaration gets its own scope; its parent is the enclosing block, never
/// the translation unit.
fn parse_for_statement(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let keyword = parser.expect(TokenKind::For)?;
    parser.expect(TokenKind::LeftParen)?;

    let mut pushed = None;
    let init = if parser.accept(TokenKind::Semicolon).is_some() {
        None
    } else if parser.starts_declaration() {
        debug!("for-header declares; opening header scope");
        pushed = Some(parser.scopes.push_scope(ScopeKind::ForHeader));
        // The declaration statement consumes the first ';'.
        Some(super::declarations::parse_declaration_statement(parser)?)
    } else {
        let expr = parse_expression(parser, 0)?;
        parser.expect(TokenKind::Semicolon)?;
        Some(expr)
    };

    let condition = if parser.is_token(TokenKind::Semicolon) {
        None
    } else {
        Some(parse_expression(parser, 0)?)
    };
    parser.expect(TokenKind::Semicolon)?;

    let step = if parser.is_token(TokenKind::RightParen) {
        None
    } else {
        Some(parse_expression(parser, 0)?)
    };
    parser.expect(TokenKind::RightParen)?;

    let body = parse_statement(parser)?;

    let scope = pushed.unwrap_or_else(|| parser.scopes.current_scope());
    if pushed.is_some() {
        parser.scopes.pop_scope();
    }

    let span = keyword.span.merge(parser.node_span(body));
    let node = parser.push_node(
        NodeKind::For(ForStmt {
            scope,
            init,
            condition,
            step,
            body,
        }),
        span,
    );
    if pushed.is_some() {
        parser.scopes.set_owner(scope, node);
    }
    Ok(node)
}

fn parse_goto_statement(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let keyword = parser.expect(TokenKind::Goto)?;
    let (label, _) = parser.expect_name()?;
    let end = parser.expect(TokenKind::Semicolon)?;
    Ok(parser.push_node(NodeKind::Goto(label), keyword.span.merge(end.span)))
}

fn parse_return_statement(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let keyword = parser.expect(TokenKind::Return)?;
    let value = if parser.is_token(TokenKind::Semicolon) {
        None
    } else {
        Some(parse_expression(parser, 0)?)
    };
    let end = parser.expect(TokenKind::Semicolon)?;
    Ok(parser.push_node(NodeKind::Return(value), keyword.span.merge(end.span)))
}

fn parse_expression_statement(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let expr = parse_expression(parser, 0)?;
    let end = parser.expect(TokenKind::Semicolon)?;
    let span = parser.node_span(expr).merge(end.span);
    Ok(parser.push_node(NodeKind::ExpressionStatement(expr), span))
}
