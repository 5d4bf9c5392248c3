//! Pratt expression parsing.
//!
//! Every token kind has a null denotation (how it begins an expression) and
//! a left denotation (how it continues one), each with its own binding
//! power. `parse_expression(rbp)` applies the null denotation of the
//! current token and then folds left denotations while their power exceeds
//! `rbp`. The power table lives in this module and is consulted through the
//! parser, which lets the comma operator drop out of the table inside call
//! arguments, initializer lists and enumerator initializers.

use crate::ast::{AssignOp, BinaryOp, NodeKind, NodeRef, UnaryOp};
use crate::diagnostic::ParseError;
use crate::lexer::TokenKind;

use super::Parser;

// Binding powers, highest binds tightest. Prefix (nud) and infix (led)
// powers are independent: `*` reads as dereference at 140 when it begins an
// expression and as multiplication at 130 when it continues one.
pub(crate) const POWER_COMMA: i16 = 10;
pub(crate) const POWER_ASSIGN: i16 = 20;
pub(crate) const POWER_CONDITIONAL: i16 = 30;
pub(crate) const POWER_LOGIC_OR: i16 = 40;
pub(crate) const POWER_LOGIC_AND: i16 = 50;
pub(crate) const POWER_BIT_OR: i16 = 60;
pub(crate) const POWER_BIT_XOR: i16 = 70;
pub(crate) const POWER_BIT_AND: i16 = 80;
pub(crate) const POWER_EQUALITY: i16 = 90;
pub(crate) const POWER_RELATIONAL: i16 = 100;
pub(crate) const POWER_SHIFT: i16 = 110;
pub(crate) const POWER_ADDITIVE: i16 = 120;
pub(crate) const POWER_MULTIPLICATIVE: i16 = 130;
pub(crate) const POWER_UNARY: i16 = 140;
pub(crate) const POWER_POSTFIX: i16 = 160;
const NO_POWER: i16 = -1;

/// Left-denotation binding power of a token, honoring the current comma
/// mode.
fn led_power(parser: &Parser, kind: TokenKind) -> i16 {
    match kind {
        TokenKind::Comma => {
            if parser.comma_terminates {
                NO_POWER
            } else {
                POWER_COMMA
            }
        }
        TokenKind::Assign
        | TokenKind::PlusAssign
        | TokenKind::MinusAssign
        | TokenKind::StarAssign
        | TokenKind::DivAssign
        | TokenKind::ModAssign
        | TokenKind::AndAssign
        | TokenKind::OrAssign
        | TokenKind::XorAssign
        | TokenKind::LeftShiftAssign
        | TokenKind::RightShiftAssign => POWER_ASSIGN,
        TokenKind::Question => POWER_CONDITIONAL,
        TokenKind::LogicOr => POWER_LOGIC_OR,
        TokenKind::LogicAnd => POWER_LOGIC_AND,
        TokenKind::Or => POWER_BIT_OR,
        TokenKind::Xor => POWER_BIT_XOR,
        TokenKind::And => POWER_BIT_AND,
        TokenKind::Equal | TokenKind::NotEqual => POWER_EQUALITY,
        TokenKind::Less | TokenKind::Greater | TokenKind::LessEqual | TokenKind::GreaterEqual => POWER_RELATIONAL,
        TokenKind::LeftShift | TokenKind::RightShift => POWER_SHIFT,
        TokenKind::Plus | TokenKind::Minus => POWER_ADDITIVE,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => POWER_MULTIPLICATIVE,
        TokenKind::Increment
        | TokenKind::Decrement
        | TokenKind::LeftParen
        | TokenKind::LeftBracket
        | TokenKind::Dot
        | TokenKind::Arrow => POWER_POSTFIX,
        _ => NO_POWER,
    }
}

/// Parse an expression with the given right binding power.
pub(crate) fn parse_expression(parser: &mut Parser, rbp: i16) -> Result<NodeRef, ParseError> {
    let mut left = parse_null_denotation(parser)?;
    loop {
        let power = led_power(parser, parser.current_kind());
        if rbp >= power {
            break;
        }
        left = parse_left_denotation(parser, left, power)?;
    }
    Ok(left)
}

fn parse_null_denotation(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let token = parser.current_token();
    match token.kind {
        TokenKind::Identifier(symbol) => {
            parser.advance();
            Ok(parser.push_node(NodeKind::Ident(symbol), token.span))
        }
        TokenKind::IntegerConstant(value) => {
            parser.advance();
            Ok(parser.push_node(NodeKind::LiteralInt(value), token.span))
        }
        TokenKind::FloatConstant(value) => {
            parser.advance();
            Ok(parser.push_node(NodeKind::LiteralFloat(value), token.span))
        }
        TokenKind::StringLiteral(value) => {
            parser.advance();
            Ok(parser.push_node(NodeKind::LiteralString(value), token.span))
        }
        TokenKind::CharacterConstant(value) => {
            parser.advance();
            Ok(parser.push_node(NodeKind::LiteralChar(value), token.span))
        }
        TokenKind::LeftParen => parse_paren_expression(parser),
        TokenKind::Sizeof => parse_sizeof(parser),
        TokenKind::Plus
        | TokenKind::Minus
        | TokenKind::Star
        | TokenKind::And
        | TokenKind::Not
        | TokenKind::Tilde
        | TokenKind::Increment
        | TokenKind::Decrement => {
            let op = match token.kind {
                TokenKind::Plus => UnaryOp::Plus,
                TokenKind::Minus => UnaryOp::Minus,
                TokenKind::Star => UnaryOp::Deref,
                TokenKind::And => UnaryOp::AddrOf,
                TokenKind::Not => UnaryOp::LogicNot,
                TokenKind::Tilde => UnaryOp::BitNot,
                TokenKind::Increment => UnaryOp::Increment,
                TokenKind::Decrement => UnaryOp::Decrement,
                _ => unreachable!(),
            };
            parser.advance();
            let operand = parse_expression(parser, POWER_UNARY)?;
            let span = token.span.merge(parser.node_span(operand));
            Ok(parser.push_node(NodeKind::UnaryOp(op, false, operand), span))
        }
        TokenKind::LeftBrace => super::declarations::parse_initializer(parser),
        _ => Err(ParseError::UnexpectedToken {
            expected: "an expression".to_string(),
            found: token.kind,
            span: token.span,
        }),
    }
}

/// `(` beginning an expression: a parenthesized expression, a cast
/// `(T)expr` or a compound literal `(T){...}`, told apart by whether a type
/// name follows the parenthesis.
fn parse_paren_expression(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let open = parser.advance();
    if parser.starts_type_name() {
        let ty = super::declarations::parse_type_name(parser)?;
        parser.expect(TokenKind::RightParen)?;
        if parser.is_token(TokenKind::LeftBrace) {
            let init = super::declarations::parse_initializer(parser)?;
            let span = open.span.merge(parser.node_span(init));
            Ok(parser.push_node(NodeKind::CompoundLiteral(ty, init), span))
        } else {
            let operand = parse_expression(parser, POWER_UNARY)?;
            let span = open.span.merge(parser.node_span(operand));
            Ok(parser.push_node(NodeKind::Cast(ty, operand), span))
        }
    } else {
        // Inside parentheses the comma is an operator again.
        let saved = parser.comma_terminates;
        parser.comma_terminates = false;
        let expr = parse_expression(parser, 0);
        parser.comma_terminates = saved;
        let expr = expr?;
        parser.expect(TokenKind::RightParen)?;
        Ok(expr)
    }
}

/// `sizeof (type-name)` or `sizeof unary-expression`.
fn parse_sizeof(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let keyword = parser.advance();
    if parser.is_token(TokenKind::LeftParen) && parser.token_starts_type_name(parser.peek_kind(1)) {
        parser.advance();
        let ty = super::declarations::parse_type_name(parser)?;
        let close = parser.expect(TokenKind::RightParen)?;
        Ok(parser.push_node(NodeKind::SizeOfType(ty), keyword.span.merge(close.span)))
    } else {
        let operand = parse_expression(parser, POWER_UNARY)?;
        let span = keyword.span.merge(parser.node_span(operand));
        Ok(parser.push_node(NodeKind::SizeOfExpr(operand), span))
    }
}

fn parse_left_denotation(parser: &mut Parser, left: NodeRef, power: i16) -> Result<NodeRef, ParseError> {
    let token = parser.current_token();
    match token.kind {
        TokenKind::LeftParen => parse_call(parser, left),
        TokenKind::LeftBracket => parse_index(parser, left),
        TokenKind::Dot | TokenKind::Arrow => {
            let is_arrow = token.kind == TokenKind::Arrow;
            parser.advance();
            let (member, member_span) = parser.expect_name()?;
            let span = parser.node_span(left).merge(member_span);
            Ok(parser.push_node(NodeKind::MemberAccess(left, member, is_arrow), span))
        }
        TokenKind::Increment | TokenKind::Decrement => {
            parser.advance();
            let op = if token.kind == TokenKind::Increment {
                UnaryOp::Increment
            } else {
                UnaryOp::Decrement
            };
            let span = parser.node_span(left).merge(token.span);
            Ok(parser.push_node(NodeKind::UnaryOp(op, true, left), span))
        }
        TokenKind::Question => {
            parser.advance();
            let then_expr = parse_expression(parser, POWER_CONDITIONAL)?;
            parser.expect(TokenKind::Colon)?;
            // Right-associative: a ? b : c ? d : e nests to the right.
            let else_expr = parse_expression(parser, POWER_CONDITIONAL - 1)?;
            let span = parser.node_span(left).merge(parser.node_span(else_expr));
            Ok(parser.push_node(NodeKind::Conditional(left, then_expr, else_expr), span))
        }
        kind => {
            if let Some(op) = assignment_operator(kind) {
                parser.advance();
                // Right-associative.
                let right = parse_expression(parser, POWER_ASSIGN - 1)?;
                let span = parser.node_span(left).merge(parser.node_span(right));
                return Ok(parser.push_node(NodeKind::Assignment(op, left, right), span));
            }
            let op = binary_operator(kind).ok_or(ParseError::UnexpectedToken {
                expected: "an operator".to_string(),
                found: kind,
                span: token.span,
            })?;
            parser.advance();
            // Left-associative: parse the right side at the same power.
            let right = parse_expression(parser, power)?;
            let span = parser.node_span(left).merge(parser.node_span(right));
            Ok(parser.push_node(NodeKind::BinaryOp(op, left, right), span))
        }
    }
}

/// Call arguments: commas separate rather than combine.
fn parse_call(parser: &mut Parser, callee: NodeRef) -> Result<NodeRef, ParseError> {
    parser.advance();
    let saved = parser.comma_terminates;
    parser.comma_terminates = true;

    let mut args = thin_vec::ThinVec::new();
    let result = loop {
        if parser.is_token(TokenKind::RightParen) || parser.at_eof() {
            break Ok(());
        }
        match parse_expression(parser, 0) {
            Ok(arg) => args.push(arg),
            Err(error) => break Err(error),
        }
        if parser.accept(TokenKind::Comma).is_none() && !parser.is_token(TokenKind::RightParen) {
            break Err(ParseError::UnexpectedToken {
                expected: "',' or ')'".to_string(),
                found: parser.current_kind(),
                span: parser.current_span(),
            });
        }
    };
    parser.comma_terminates = saved;
    result?;

    let close = parser.expect(TokenKind::RightParen)?;
    let span = parser.node_span(callee).merge(close.span);
    Ok(parser.push_node(NodeKind::FunctionCall(callee, args), span))
}

fn parse_index(parser: &mut Parser, array: NodeRef) -> Result<NodeRef, ParseError> {
    parser.advance();
    let saved = parser.comma_terminates;
    parser.comma_terminates = false;
    let index = parse_expression(parser, 0);
    parser.comma_terminates = saved;
    let index = index?;
    let close = parser.expect(TokenKind::RightBracket)?;
    let span = parser.node_span(array).merge(close.span);
    Ok(parser.push_node(NodeKind::IndexAccess(array, index), span))
}

fn assignment_operator(kind: TokenKind) -> Option<AssignOp> {
    match kind {
        TokenKind::Assign => Some(AssignOp::Assign),
        TokenKind::PlusAssign => Some(AssignOp::Add),
        TokenKind::MinusAssign => Some(AssignOp::Sub),
        TokenKind::StarAssign => Some(AssignOp::Mul),
        TokenKind::DivAssign => Some(AssignOp::Div),
        TokenKind::ModAssign => Some(AssignOp::Mod),
        TokenKind::AndAssign => Some(AssignOp::BitAnd),
        TokenKind::OrAssign => Some(AssignOp::BitOr),
        TokenKind::XorAssign => Some(AssignOp::BitXor),
        TokenKind::LeftShiftAssign => Some(AssignOp::LeftShift),
        TokenKind::RightShiftAssign => Some(AssignOp::RightShift),
        _ => None,
    }
}

fn binary_operator(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::Percent => Some(BinaryOp::Mod),
        TokenKind::LeftShift => Some(BinaryOp::LeftShift),
        TokenKind::RightShift => Some(BinaryOp::RightShift),
        TokenKind::Less => Some(BinaryOp::Less),
        TokenKind::Greater => Some(BinaryOp::Greater),
        TokenKind::LessEqual => Some(BinaryOp::LessEqual),
        TokenKind::GreaterEqual => Some(BinaryOp::GreaterEqual),
        TokenKind::Equal => Some(BinaryOp::Equal),
        TokenKind::NotEqual => Some(BinaryOp::NotEqual),
        TokenKind::And => Some(BinaryOp::BitAnd),
        TokenKind::Xor => Some(BinaryOp::BitXor),
        TokenKind::Or => Some(BinaryOp::BitOr),
        TokenKind::LogicAnd => Some(BinaryOp::LogicAnd),
        TokenKind::LogicOr => Some(BinaryOp::LogicOr),
        TokenKind::Comma => Some(BinaryOp::Comma),
        _ => None,
    }
}
