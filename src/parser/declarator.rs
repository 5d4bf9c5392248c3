//! Recursive declarator parsing.
//!
//! A declarator layers pointer, array and function modifiers around a name
//! (or around nothing, for abstract declarators). Parsing produces a
//! [`Declarator`] tree; grafting the base type from the declaration
//! specifiers into that tree is the type builder's job. Array and function
//! suffixes bind tighter than the pointer prefixes collected at the same
//! nesting level, which the tree encodes by wrapping suffixes inside the
//! pointer layers.

use crate::ast::{Symbol, TypeQualifiers, TypeRef};
use crate::diagnostic::ParseError;
use crate::lexer::TokenKind;
use crate::scope::{ScopeId, ScopeKind, SymbolEntry};
use crate::source_manager::SourceSpan;
use thin_vec::ThinVec;

use super::Parser;

/// Parsed shape of one declarator.
#[derive(Debug)]
pub enum Declarator {
    /// No name: abstract declarator in a type name or parameter.
    Abstract,
    Identifier(Symbol, SourceSpan),
    Pointer(TypeQualifiers, Box<Declarator>),
    /// One node per run of `[..]` suffixes; consecutive dimensions
    /// accumulate here.
    Array(Box<Declarator>, ThinVec<Option<crate::ast::NodeRef>>),
    Function {
        inner: Box<Declarator>,
        /// Parameter scope pushed while the list was parsed. Retained when
        /// this declarator turns out to declare a function.
        scope: ScopeId,
        params: ThinVec<ParamInfo>,
        is_variadic: bool,
    },
}

/// One parsed parameter.
#[derive(Debug, Clone)]
pub struct ParamInfo {
    pub name: Symbol,
    pub symbol: crate::scope::SymbolId,
    pub ty: TypeRef,
    pub span: SourceSpan,
}

/// The parameter scope of the function declarator that directly names the
/// declared identifier. `Some` exactly when the declaration declares a
/// function (as opposed to, say, a pointer to one).
pub(crate) fn declarator_function_scope(declarator: &Declarator) -> Option<ScopeId> {
    match declarator {
        Declarator::Function { inner, scope, .. } => {
            if matches!(**inner, Declarator::Identifier(..)) {
                Some(*scope)
            } else {
                declarator_function_scope(inner)
            }
        }
        Declarator::Pointer(_, inner) => declarator_function_scope(inner),
        Declarator::Array(inner, _) => declarator_function_scope(inner),
        _ => None,
    }
}

/// Parameter lists of the function declarator found by
/// [`declarator_function_scope`].
pub(crate) fn declarator_function_params(declarator: &Declarator) -> Option<(&ThinVec<ParamInfo>, bool)> {
    match declarator {
        Declarator::Function {
            inner,
            params,
            is_variadic,
            ..
        } => {
            if matches!(**inner, Declarator::Identifier(..)) {
                Some((params, *is_variadic))
            } else {
                declarator_function_params(inner)
            }
        }
        Declarator::Pointer(_, inner) => declarator_function_params(inner),
        Declarator::Array(inner, _) => declarator_function_params(inner),
        _ => None,
    }
}

fn parse_type_qualifiers(parser: &mut Parser) -> TypeQualifiers {
    let mut qualifiers = TypeQualifiers::empty();
    loop {
        let qualifier = match parser.current_kind() {
            TokenKind::Const => TypeQualifiers::CONST,
            TokenKind::Volatile => TypeQualifiers::VOLATILE,
            TokenKind::Restrict => TypeQualifiers::RESTRICT,
            _ => break,
        };
        qualifiers.insert(qualifier);
        parser.advance();
    }
    qualifiers
}

/// Does the `(` at the cursor open a parameter list rather than a nested
/// declarator? True when the token after it begins declaration specifiers
/// or immediately closes the list.
fn paren_opens_parameter_list(parser: &Parser) -> bool {
    let next = parser.peek_kind(1);
    next == TokenKind::RightParen || parser.token_starts_type_name(next) || next.is_storage_class_specifier()
}

/// Parse one declarator: leading pointers, then a name, a parenthesized
/// nested declarator or nothing, then array/function suffixes.
pub(crate) fn parse_declarator(parser: &mut Parser) -> Result<Declarator, ParseError> {
    let mut pointers = Vec::new();
    while parser.accept(TokenKind::Star).is_some() {
        pointers.push(parse_type_qualifiers(parser));
    }

    let mut base = if parser.is_token(TokenKind::LeftParen) && !paren_opens_parameter_list(parser) {
        parser.advance();
        let inner = parse_declarator(parser)?;
        parser.expect(TokenKind::RightParen)?;
        inner
    } else if let Some((name, span)) = parser.accept_name() {
        Declarator::Identifier(name, span)
    } else {
        Declarator::Abstract
    };

    loop {
        match parser.current_kind() {
            TokenKind::LeftBracket => {
                let lengths = parse_array_dimensions(parser)?;
                base = Declarator::Array(Box::new(base), lengths);
            }
            TokenKind::LeftParen => {
                parser.advance();
                let scope = parser.scopes.push_scope(ScopeKind::Prototype);
                // The scope is popped on every path, error paths included;
                // recovery only has to restore the current-scope pointer.
                let result = parse_parameter_list(parser).and_then(|parsed| {
                    parser.expect(TokenKind::RightParen)?;
                    Ok(parsed)
                });
                parser.scopes.pop_scope();
                let (params, is_variadic) = result?;
                base = Declarator::Function {
                    inner: Box::new(base),
                    scope,
                    params,
                    is_variadic,
                };
            }
            _ => break,
        }
    }

    for qualifiers in pointers.into_iter().rev() {
        base = Declarator::Pointer(qualifiers, Box::new(base));
    }
    Ok(base)
}

/// Parse a run of `[...]` suffixes into one dimension list. An empty pair
/// of brackets records an unspecified length.
fn parse_array_dimensions(parser: &mut Parser) -> Result<ThinVec<Option<crate::ast::NodeRef>>, ParseError> {
    let mut lengths = ThinVec::new();
    while parser.is_token(TokenKind::LeftBracket) {
        let open = parser.advance();
        if parser.accept(TokenKind::RightBracket).is_some() {
            lengths.push(None);
            continue;
        }
        if parser.is_token(TokenKind::Star) && parser.peek_kind(1) == TokenKind::RightBracket {
            return Err(ParseError::SyntaxError {
                message: "variable-length array '[*]' is not supported".to_string(),
                span: open.span.merge(parser.current_span()),
            });
        }
        let saved = parser.comma_terminates;
        parser.comma_terminates = false;
        let length = super::expressions::parse_expression(parser, 0);
        parser.comma_terminates = saved;
        lengths.push(Some(length?));
        parser.expect(TokenKind::RightBracket)?;
    }
    Ok(lengths)
}

/// Parse a parameter-type list. The caller pushed the parameter scope, so
/// parameter names declared here land in it. A trailing `...` marks a
/// variadic function.
fn parse_parameter_list(parser: &mut Parser) -> Result<(ThinVec<ParamInfo>, bool), ParseError> {
    let mut params = ThinVec::new();
    let mut is_variadic = false;

    while !parser.is_token(TokenKind::RightParen) && !parser.at_eof() {
        if let Some(ellipsis) = parser.accept(TokenKind::Ellipsis) {
            if !parser.is_token(TokenKind::RightParen) {
                return Err(ParseError::SyntaxError {
                    message: "'...' must be the last parameter of a variadic function".to_string(),
                    span: ellipsis.span,
                });
            }
            is_variadic = true;
            break;
        }

        let start_span = parser.current_span();
        let specifiers = super::decl_specifiers::parse_declaration_specifiers(parser)?;
        if specifiers.is_typedef() {
            return Err(ParseError::TypedefInParameter {
                span: specifiers.storage_span,
            });
        }

        let declarator = parse_declarator(parser)?;
        let (ty, name) = super::type_builder::build_type(parser, specifiers.base, &declarator);
        let (name, name_span) = match name {
            Some((name, span)) => (name, span),
            None => (parser.next_dummy_var_name(), start_span),
        };
        let symbol = parser.scopes.add_symbol(SymbolEntry {
            name,
            span: name_span,
            ty,
            storage: specifiers.storage,
            is_type_name: false,
            scope: parser.scopes.current_scope(),
        });
        params.push(ParamInfo {
            name,
            symbol,
            ty,
            span: start_span.merge(parser.previous_span()),
        });

        if parser.accept(TokenKind::Comma).is_none() {
            break;
        }
    }

    Ok((params, is_variadic))
}
