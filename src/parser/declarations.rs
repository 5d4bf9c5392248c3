//! External declarations, declaration statements and initializers.
//!
//! A declaration is one specifier run followed by a comma-separated list of
//! init-declarators. Record and enum declarations produced while parsing
//! the specifiers attach to the translation unit or to the enclosing
//! declaration statement, whichever is closer.

use crate::ast::{
    FunctionDeclData, NodeKind, NodeRef, ParamDeclData, StorageClass, Symbol, TranslationUnitData, Type,
    TypedefDeclData, TypeRef, VariableDeclData,
};
use crate::diagnostic::ParseError;
use crate::lexer::TokenKind;
use crate::scope::{ScopeKind, SymbolEntry};
use crate::source_manager::SourceSpan;
use log::debug;
use thin_vec::ThinVec;

use super::decl_specifiers::{parse_declaration_specifiers, DeclSpecifiers};
use super::declarator::{
    declarator_function_params, declarator_function_scope, parse_declarator, Declarator,
};
use super::expressions::parse_expression;
use super::type_builder::build_type;
use super::Parser;

/// Parse the whole token stream as a translation unit. Never fails: broken
/// declarations are reported and skipped.
pub(crate) fn parse_translation_unit(parser: &mut Parser) -> NodeRef {
    let start = parser.current_span();
    let mut decls: Vec<NodeRef> = Vec::new();

    while !parser.at_eof() {
        let saved_scope = parser.scopes.current_scope();
        let position = parser.position();
        match parse_external_declaration(parser, &mut decls) {
            Ok(()) => {}
            Err(error) => {
                debug!("external declaration failed, synchronizing: {}", error);
                parser.diag.report_parse_error(error);
                // Tag declarations parsed before the failure are kept.
                decls.extend(parser.pending_tag_decls.drain(..));
                parser.scopes.set_current(saved_scope);
                parser.synchronize();
                if parser.position() == position {
                    // Nothing consumed; force progress.
                    parser.advance();
                }
            }
        }
    }

    let span = start.merge(parser.previous_span());
    let root_scope = parser.scopes.root();
    let node = parser.push_node(
        NodeKind::TranslationUnit(TranslationUnitData {
            scope: root_scope,
            decls: decls.into_iter().collect(),
        }),
        span,
    );
    parser.scopes.set_owner(root_scope, node);
    parser.ast.set_root(node);
    node
}

/// One external declaration: specifiers, then init-declarators, or a
/// function definition.
fn parse_external_declaration(parser: &mut Parser, decls: &mut Vec<NodeRef>) -> Result<(), ParseError> {
    // File scope holds declarations only. A missing type specifier falls
    // back to implicit int (with a warning), so even `f(T);` parses as a
    // function declaration.
    let specifiers = parse_declaration_specifiers(parser)?;
    let drained: Vec<NodeRef> = parser.pending_tag_decls.drain(..).collect();
    let drained_count = drained.len();
    decls.extend(drained);

    if parser.accept(TokenKind::Semicolon).is_some() {
        if drained_count == 0 {
            parser
                .diag
                .report_warning("declaration does not declare anything", specifiers.span);
        }
        return Ok(());
    }

    loop {
        let declarator = parse_declarator(parser)?;
        let (node, was_definition) = finish_init_declarator(parser, &specifiers, declarator, true)?;
        decls.push(node);
        if was_definition {
            return Ok(());
        }
        if parser.accept(TokenKind::Comma).is_none() {
            parser.expect(TokenKind::Semicolon)?;
            return Ok(());
        }
    }
}

/// A declaration in statement position (blocks and for-headers).
pub(crate) fn parse_declaration_statement(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    let specifiers = parse_declaration_specifiers(parser)?;
    let mut items: ThinVec<NodeRef> = ThinVec::new();
    let drained: Vec<NodeRef> = parser.pending_tag_decls.drain(..).collect();
    let drained_count = drained.len();
    items.extend(drained);

    if parser.accept(TokenKind::Semicolon).is_none() {
        loop {
            let declarator = parse_declarator(parser)?;
            let (node, _) = finish_init_declarator(parser, &specifiers, declarator, false)?;
            items.push(node);
            if parser.accept(TokenKind::Comma).is_none() {
                parser.expect(TokenKind::Semicolon)?;
                break;
            }
        }
    } else if drained_count == 0 {
        parser
            .diag
            .report_warning("declaration does not declare anything", specifiers.span);
    }

    let span = specifiers.span.merge(parser.previous_span());
    Ok(parser.push_node(NodeKind::DeclStatement(items), span))
}

/// Turn one parsed declarator into a declaration node, binding its name in
/// the current scope. Returns the node and whether it consumed a function
/// body.
fn finish_init_declarator(
    parser: &mut Parser,
    specifiers: &DeclSpecifiers,
    declarator: Declarator,
    allow_function_definition: bool,
) -> Result<(NodeRef, bool), ParseError> {
    let (ty, declared) = build_type(parser, specifiers.base, &declarator);
    let span = specifiers.span.merge(parser.previous_span());

    // typedef: the name becomes a user-defined type, not an object.
    if specifiers.is_typedef() {
        let (name, name_span) = declared.ok_or(ParseError::SyntaxError {
            message: "typedef requires a name".to_string(),
            span,
        })?;
        if parser.is_token(TokenKind::Assign) {
            return Err(ParseError::SyntaxError {
                message: "typedef cannot have an initializer".to_string(),
                span: parser.current_span(),
            });
        }
        let alias = parser.ast.push_type(Type::Alias { name, referred: ty });
        parser.scopes.register_user_type(name, alias, name_span)?;
        let symbol = parser.scopes.add_type_symbol(SymbolEntry {
            name,
            span: name_span,
            ty: alias,
            storage: StorageClass::Typedef,
            is_type_name: true,
            scope: parser.scopes.current_scope(),
        });
        debug!("declared typedef '{}'", name);
        let node = parser.push_node(NodeKind::TypedefDecl(TypedefDeclData { name, symbol }), span);
        return Ok((node, false));
    }

    // A declarator whose outermost derivation is a function type declares a
    // function, unless the function layer is buried under a pointer.
    let is_function = matches!(parser.ast.get_type(ty), Type::Function { .. });
    if is_function {
        if let Some((name, name_span)) = declared {
            return finish_function_declarator(
                parser,
                specifiers,
                &declarator,
                ty,
                name,
                name_span,
                span,
                allow_function_definition,
            );
        }
    }

    // Object declaration. Abstract declarators still produce a complete
    // type under a synthesized name.
    let (name, name_span) = match declared {
        Some((name, name_span)) => (name, name_span),
        None => {
            let dummy = parser.next_dummy_var_name();
            (dummy, span)
        }
    };
    let symbol = parser.scopes.add_symbol(SymbolEntry {
        name,
        span: name_span,
        ty,
        storage: specifiers.storage,
        is_type_name: false,
        scope: parser.scopes.current_scope(),
    });
    let init = if parser.accept(TokenKind::Assign).is_some() {
        Some(parse_initializer(parser)?)
    } else {
        None
    };
    debug!("declared variable '{}'", name);
    let node = parser.push_node(NodeKind::VariableDecl(VariableDeclData { name, symbol, init }), span);
    Ok((node, false))
}

#[allow(clippy::too_many_arguments)]
fn finish_function_declarator(
    parser: &mut Parser,
    specifiers: &DeclSpecifiers,
    declarator: &Declarator,
    ty: TypeRef,
    name: Symbol,
    name_span: SourceSpan,
    span: SourceSpan,
    allow_function_definition: bool,
) -> Result<(NodeRef, bool), ParseError> {
    // The parameter scope of the declarator that named the function; kept
    // so a definition can chain its body below it.
    let fn_scope = match declarator_function_scope(declarator) {
        Some(scope) => scope,
        None => {
            // Function type via typedef; no parameter scope was parsed.
            let scope = parser.scopes.push_scope(ScopeKind::Function);
            parser.scopes.pop_scope();
            scope
        }
    };
    parser.scopes.set_kind(fn_scope, ScopeKind::Function);

    let symbol = parser.scopes.add_symbol(SymbolEntry {
        name,
        span: name_span,
        ty,
        storage: specifiers.storage,
        is_type_name: false,
        scope: parser.scopes.current_scope(),
    });

    let mut params: ThinVec<NodeRef> = ThinVec::new();
    let mut is_variadic = false;
    if let Some((infos, variadic)) = declarator_function_params(declarator) {
        is_variadic = variadic;
        for info in infos.iter() {
            let node = parser.push_node(
                NodeKind::ParamDecl(ParamDeclData {
                    name: info.name,
                    symbol: info.symbol,
                }),
                info.span,
            );
            params.push(node);
        }
    }

    let mut body = None;
    let mut was_definition = false;
    if parser.is_token(TokenKind::LeftBrace) {
        if !allow_function_definition {
            return Err(ParseError::SyntaxError {
                message: "function definition is not allowed here".to_string(),
                span: parser.current_span(),
            });
        }
        debug!("parsing definition of function '{}'", name);
        let enclosing = parser.scopes.current_scope();
        parser.scopes.set_current(fn_scope);
        let result = super::statements::parse_compound_statement(parser);
        parser.scopes.set_current(enclosing);
        body = Some(result?);
        was_definition = true;
    }

    let node = parser.push_node(
        NodeKind::FunctionDecl(FunctionDeclData {
            name,
            symbol,
            scope: fn_scope,
            params,
            is_variadic,
            is_inline: specifiers.is_inline,
            body,
        }),
        span,
    );
    parser.scopes.set_owner(fn_scope, node);
    Ok((node, was_definition))
}

/// `= initializer`: either a single assignment-level expression or a braced
/// list, nested lists included, tolerating a trailing comma. Commas inside
/// separate initializers rather than acting as the comma operator.
pub(crate) fn parse_initializer(parser: &mut Parser) -> Result<NodeRef, ParseError> {
    if let Some(open) = parser.accept(TokenKind::LeftBrace) {
        let saved = parser.comma_terminates;
        parser.comma_terminates = true;

        let mut items: ThinVec<NodeRef> = ThinVec::new();
        let result = loop {
            if parser.is_token(TokenKind::RightBrace) || parser.at_eof() {
                break Ok(());
            }
            match parse_initializer(parser) {
                Ok(item) => items.push(item),
                Err(error) => break Err(error),
            }
            if parser.accept(TokenKind::Comma).is_none() {
                break Ok(());
            }
        };
        parser.comma_terminates = saved;
        result?;

        let close = parser.expect(TokenKind::RightBrace)?;
        return Ok(parser.push_node(NodeKind::InitializerList(items), open.span.merge(close.span)));
    }

    let saved = parser.comma_terminates;
    parser.comma_terminates = true;
    let expr = parse_expression(parser, 0);
    parser.comma_terminates = saved;
    expr
}

/// A type name: declaration specifiers plus an abstract declarator, used by
/// casts, sizeof and compound literals.
pub(crate) fn parse_type_name(parser: &mut Parser) -> Result<TypeRef, ParseError> {
    let specifiers = parse_declaration_specifiers(parser)?;
    if specifiers.storage != StorageClass::None {
        return Err(ParseError::SyntaxError {
            message: "storage class is not allowed in a type name".to_string(),
            span: specifiers.storage_span,
        });
    }
    let declarator = parse_declarator(parser)?;
    let (ty, _) = build_type(parser, specifiers.base, &declarator);
    Ok(ty)
}
