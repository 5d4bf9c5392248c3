//! Struct and union specifier parsing.
//!
//! Tag types are interned: every mention of `struct T` in scope resolves to
//! the same type object, a forward declaration included. The tag is
//! registered in the nearest tag-hosting scope before the body is parsed so
//! that a member may already mention `struct T *`.

use crate::ast::{Field, NodeKind, NodeRef, RecordDeclData, StorageClass, Symbol, Type, TypeRef};
use crate::diagnostic::ParseError;
use crate::lexer::TokenKind;
use crate::scope::{ScopeKind, SymbolEntry};
use crate::source_manager::SourceSpan;
use log::debug;
use thin_vec::ThinVec;

use super::Parser;

/// Parse a record specifier; the `struct`/`union` keyword has been
/// consumed.
pub(crate) fn parse_record_specifier(
    parser: &mut Parser,
    is_union: bool,
    keyword_span: SourceSpan,
) -> Result<TypeRef, ParseError> {
    let named_tag = parser.accept_name();
    let (tag, tag_span) = match named_tag {
        Some((tag, span)) => (tag, span),
        None => (parser.next_anon_record_name(), keyword_span),
    };

    let existing = if named_tag.is_some() {
        parser.scopes.lookup_user_type(tag)
    } else {
        None
    };

    if let Some(existing) = existing {
        if !parser.is_token(TokenKind::LeftBrace) {
            // Plain reference to an already known tag.
            return Ok(existing);
        }
        // A body after a known tag completes its forward declaration.
        match parser.ast.get_type(existing) {
            Type::Record {
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
        debug!("record '{}': defining forward-declared tag", tag);
        let prev = parser.tag_decl_nodes.get(&existing).copied();
        parse_record_body(parser, existing, tag, tag_span, prev)?;
        return Ok(existing);
    }

    // Unknown (or anonymous) tag: intern it before any body is parsed.
    let ty = parser.ast.push_type(Type::Record {
        tag,
        is_union,
        is_definition: false,
        fields: ThinVec::new(),
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
        // Forward declaration or first mention without a body.
        let node = parser.push_node(
            NodeKind::RecordDecl(RecordDeclData {
                tag,
                ty,
                is_definition: false,
                scope: None,
                fields: ThinVec::new(),
                prev: None,
            }),
            keyword_span.merge(tag_span),
        );
        parser.pending_tag_decls.push(node);
        parser.tag_decl_nodes.insert(ty, node);
        return Ok(ty);
    }

    parse_record_body(parser, ty, tag, tag_span, None)?;
    Ok(ty)
}

/// Parse `{ field-declarations }` and complete the interned type in place.
fn parse_record_body(
    parser: &mut Parser,
    ty: TypeRef,
    tag: Symbol,
    tag_span: SourceSpan,
    prev: Option<NodeRef>,
) -> Result<NodeRef, ParseError> {
    parser.expect(TokenKind::LeftBrace)?;
    let scope = parser.scopes.push_scope(ScopeKind::Record);

    let mut fields: ThinVec<Field> = ThinVec::new();
    let mut field_nodes: ThinVec<NodeRef> = ThinVec::new();

    while !parser.is_token(TokenKind::RightBrace) && !parser.at_eof() {
        match parse_field_declaration(parser, tag, &mut fields, &mut field_nodes) {
            Ok(()) => {}
            Err(error) => {
                parser.diag.report_parse_error(error);
                parser.synchronize_field();
            }
        }
    }
    let close = parser.expect(TokenKind::RightBrace)?;
    parser.scopes.pop_scope();

    match parser.ast.get_type_mut(ty) {
        Type::Record {
            is_definition,
            fields: slot,
            ..
        } => {
            *is_definition = true;
            *slot = fields;
        }
        _ => unreachable!("record tag interned as a non-record type"),
    }

    let node = parser.push_node(
        NodeKind::RecordDecl(RecordDeclData {
            tag,
            ty,
            is_definition: true,
            scope: Some(scope),
            fields: field_nodes,
            prev,
        }),
        tag_span.merge(close.span),
    );
    parser.scopes.set_owner(scope, node);
    parser.pending_tag_decls.push(node);
    parser.tag_decl_nodes.insert(ty, node);
    Ok(node)
}

/// One field declaration: specifiers plus a comma-separated declarator
/// list, each declarator optionally carrying a bit-field width.
fn parse_field_declaration(
    parser: &mut Parser,
    record_tag: Symbol,
    fields: &mut ThinVec<Field>,
    field_nodes: &mut ThinVec<NodeRef>,
) -> Result<(), ParseError> {
    let specifiers = super::decl_specifiers::parse_declaration_specifiers(parser)?;
    if specifiers.storage != StorageClass::None {
        return Err(ParseError::SyntaxError {
            message: "storage class is not allowed in a field declaration".to_string(),
            span: specifiers.storage_span,
        });
    }

    loop {
        // A bare nested record with no declarator is an anonymous member.
        if parser.is_token(TokenKind::Semicolon) {
            let name = parser.next_anon_field_name(record_tag);
            push_field(parser, fields, field_nodes, name, specifiers.span, specifiers.base, None);
            break;
        }

        let (ty, declared) = if parser.is_token(TokenKind::Colon) {
            (specifiers.base, None)
        } else {
            let declarator = super::declarator::parse_declarator(parser)?;
            super::type_builder::build_type(parser, specifiers.base, &declarator)
        };
        let (name, name_span) = match declared {
            Some((name, span)) => (name, span),
            None => (parser.next_anon_field_name(record_tag), parser.current_span()),
        };

        let bit_width = if parser.accept(TokenKind::Colon).is_some() {
            // TODO: accept a constant-expression width once constant
            // evaluation is available; only integer literals for now.
            let token = parser.current_token();
            if let TokenKind::IntegerConstant(value) = token.kind {
                parser.advance();
                Some(parser.push_node(NodeKind::LiteralInt(value), token.span))
            } else {
                return Err(ParseError::InvalidBitField { span: token.span });
            }
        } else {
            None
        };

        push_field(parser, fields, field_nodes, name, name_span, ty, bit_width);

        if parser.accept(TokenKind::Comma).is_none() {
            break;
        }
    }

    parser.expect(TokenKind::Semicolon)?;
    Ok(())
}

fn push_field(
    parser: &mut Parser,
    fields: &mut ThinVec<Field>,
    field_nodes: &mut ThinVec<NodeRef>,
    name: Symbol,
    span: SourceSpan,
    ty: TypeRef,
    bit_width: Option<NodeRef>,
) {
    fields.push(Field {
        name,
        ty,
        bit_width,
        span,
    });
    parser.scopes.add_symbol(SymbolEntry {
        name,
        span,
        ty,
        storage: StorageClass::None,
        is_type_name: false,
        scope: parser.scopes.current_scope(),
    });
    let node = parser.push_node(
        NodeKind::FieldDecl(crate::ast::FieldDeclData { name, ty, bit_width }),
        span,
    );
    field_nodes.push(node);
}
