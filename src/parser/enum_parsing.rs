//! Enum specifier parsing.
//!
//! Enum tags are interned the same way record tags are. Each enumerator is
//! declared twice: as an ordinary symbol (its value is an integer constant)
//! and as a type-name symbol carrying the enumerator-constant type.

use crate::ast::{
    EnumDeclData, Enumerator, EnumeratorDeclData, NodeKind, NodeRef, StorageClass, Symbol, Type, TypeRef,
};
use crate::diagnostic::ParseError;
use crate::lexer::TokenKind;
use crate::scope::SymbolEntry;
use crate::source_manager::SourceSpan;
use log::debug;
use thin_vec::ThinVec;

use super::Parser;

/// Parse an enum specifier; the `enum` keyword has been consumed.
pub(crate) fn parse_enum_specifier(parser: &mut Parser, keyword_span: SourceSpan) -> Result<TypeRef, ParseError> {
    let named_tag = parser.accept_name();
    let (tag, tag_span) = match named_tag {
        Some((tag, span)) => (tag, span),
        None => (parser.next_anon_enum_name(), keyword_span),
    };

    let existing = if named_tag.is_some() {
        parser.scopes.lookup_user_type(tag)
    } else {
        None
    };

    if let Some(existing) = existing {
        if !parser.is_token(TokenKind::LeftBrace) {
            return Ok(existing);
        }
        match parser.ast.get_type(existing) {
            Type::Enum {
                is_definition: false, ..
            } => {}
            _ => {
                let previous = parser
                    .tag_decl_nodes
                    .get(&existing)
                    .map(|node| parser.ast.get_node(*node).span)
                    .unwrap_or_default();
                return Err(ParseError::Redeclaration {
                    name: tag,
                    span: tag_span,
                    previous,
                });
            }
        }
        debug!("enum '{}': defining forward-declared tag", tag);
        let prev = parser.tag_decl_nodes.get(&existing).copied();
        parse_enum_body(parser, existing, tag, tag_span, prev)?;
        return Ok(existing);
    }

    let ty = parser.ast.push_type(Type::Enum {
        tag,
        is_definition: false,
        enumerators: ThinVec::new(),
    });
    parser.scopes.register_user_type(tag, ty, tag_span)?;
    parser.scopes.add_type_symbol(SymbolEntry {
        name: tag,
        span: tag_span,
        ty,
        storage: StorageClass::None,
        is_type_name: true,
        scope: parser.scopes.current_scope(),
    });

    if !parser.is_token(TokenKind::LeftBrace) {
        let node = parser.push_node(
            NodeKind::EnumDecl(EnumDeclData {
                tag,
                ty,
                is_definition: false,
                enumerators: ThinVec::new(),
                prev: None,
            }),
            keyword_span.merge(tag_span),
        );
        parser.pending_tag_decls.push(node);
        parser.tag_decl_nodes.insert(ty, node);
        return Ok(ty);
    }

    parse_enum_body(parser, ty, tag, tag_span, None)?;
    Ok(ty)
}

/// Parse `{ enumerator-list }` and complete the interned type in place.
/// Enumerator values count up from zero; an integer-literal initializer
/// resets the counter, any other initializer leaves the value unresolved.
fn parse_enum_body(
    parser: &mut Parser,
    ty: TypeRef,
    tag: Symbol,
    tag_span: SourceSpan,
    prev: Option<NodeRef>,
) -> Result<NodeRef, ParseError> {
    parser.expect(TokenKind::LeftBrace)?;

    let mut enumerators: ThinVec<Enumerator> = ThinVec::new();
    let mut enumerator_nodes: ThinVec<NodeRef> = ThinVec::new();
    let mut next_value: i64 = 0;

    while !parser.is_token(TokenKind::RightBrace) && !parser.at_eof() {
        let (name, span) = parser.expect_name().map_err(|_| ParseError::SyntaxError {
            message: "expected an enumerator name".to_string(),
            span: parser.current_span(),
        })?;

        let mut value = Some(next_value);
        let init = if parser.accept(TokenKind::Assign).is_some() {
            let saved = parser.comma_terminates;
            parser.comma_terminates = true;
            let expr = super::expressions::parse_expression(parser, 0);
            parser.comma_terminates = saved;
            let expr = expr?;
            value = match &parser.ast.get_node(expr).kind {
                NodeKind::LiteralInt(literal) => Some(*literal),
                _ => None,
            };
            Some(expr)
        } else {
            None
        };
        if let Some(resolved) = value {
            next_value = resolved + 1;
        }

        let symbol = parser.scopes.add_symbol(SymbolEntry {
            name,
            span,
            ty,
            storage: StorageClass::None,
            is_type_name: false,
            scope: parser.scopes.current_scope(),
        });
        let constant_ty = parser.ast.push_type(Type::EnumConstant { enum_tag: tag });
        parser.scopes.add_type_symbol(SymbolEntry {
            name,
            span,
            ty: constant_ty,
            storage: StorageClass::None,
            is_type_name: true,
            scope: parser.scopes.current_scope(),
        });

        enumerators.push(Enumerator {
            name,
            init,
            value,
            span,
        });
        enumerator_nodes.push(parser.push_node(
            NodeKind::EnumeratorDecl(EnumeratorDeclData {
                name,
                symbol,
                init,
                value,
            }),
            span,
        ));

        if parser.accept(TokenKind::Comma).is_none() {
            break;
        }
        // trailing comma before the closing brace
    }

    let close = parser.expect(TokenKind::RightBrace)?;

    match parser.ast.get_type_mut(ty) {
        Type::Enum {
            is_definition,
            enumerators: slot,
            ..
        } => {
            *is_definition = true;
            *slot = enumerators;
        }
        _ => unreachable!("enum tag interned as a non-enum type"),
    }

    let node = parser.push_node(
        NodeKind::EnumDecl(EnumDeclData {
            tag,
            ty,
            is_definition: true,
            enumerators: enumerator_nodes,
            prev,
        }),
        tag_span.merge(close.span),
    );
    parser.pending_tag_decls.push(node);
    parser.tag_decl_nodes.insert(ty, node);
    Ok(node)
}
