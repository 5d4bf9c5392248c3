//! Declaration-specifier parsing.
//!
//! Consumes a run of storage-class, type-specifier and type-qualifier
//! tokens in any order, keeping every occurrence with its span so that
//! conflicts can point at both offenders.

use crate::ast::{IntWidth, StorageClass, Type, TypeQualifiers, TypeRef};
use crate::diagnostic::ParseError;
use crate::lexer::TokenKind;
use crate::source_manager::SourceSpan;
use log::debug;

use super::Parser;

/// Result of parsing one specifier run.
pub struct DeclSpecifiers {
    /// Resolved base type with qualifiers already applied.
    pub base: TypeRef,
    pub storage: StorageClass,
    pub storage_span: SourceSpan,
    pub is_inline: bool,
    pub span: SourceSpan,
}

impl DeclSpecifiers {
    pub fn is_typedef(&self) -> bool {
        self.storage == StorageClass::Typedef
    }
}

/// Occurrences of the combinable integer-specifier keywords.
#[derive(Default)]
struct SpecifierParts {
    long: Vec<SourceSpan>,
    int: Vec<SourceSpan>,
    short: Vec<SourceSpan>,
    char_: Vec<SourceSpan>,
    signed: Vec<SourceSpan>,
    unsigned: Vec<SourceSpan>,
}

impl SpecifierParts {
    fn is_empty(&self) -> bool {
        self.long.is_empty()
            && self.int.is_empty()
            && self.short.is_empty()
            && self.char_.is_empty()
            && self.signed.is_empty()
            && self.unsigned.is_empty()
    }

    /// The conflict rules that depend only on specifier tokens.
    fn check(&self, at: SourceSpan) -> Result<(), ParseError> {
        let conflict = |first: &str, firsts: &[SourceSpan], second: &str| ParseError::ConflictingSpecifiers {
            first: first.to_string(),
            second: second.to_string(),
            span: at,
            previous: firsts.first().copied().unwrap_or(at),
        };

        if !self.long.is_empty() {
            if !self.short.is_empty() {
                return Err(conflict("long", &self.long, "short"));
            }
            if !self.char_.is_empty() {
                return Err(conflict("long", &self.long, "char"));
            }
            if self.long.len() > 2 {
                return Err(conflict("long long", &self.long, "long"));
            }
        }
        if self.int.len() > 1 {
            return Err(conflict("int", &self.int, "int"));
        }
        if !self.char_.is_empty() && (!self.short.is_empty() || !self.int.is_empty()) {
            let second = if self.short.is_empty() { "int" } else { "short" };
            return Err(conflict("char", &self.char_, second));
        }
        if !self.signed.is_empty() && !self.unsigned.is_empty() {
            return Err(conflict("signed", &self.signed, "unsigned"));
        }
        Ok(())
    }

    /// Resolve the collected keywords into one integer type.
    fn resolve(&self) -> Type {
        let width = if self.long.len() >= 2 {
            IntWidth::LongLong
        } else if !self.long.is_empty() {
            IntWidth::Long
        } else if !self.short.is_empty() {
            IntWidth::Short
        } else if !self.char_.is_empty() {
            IntWidth::Char
        } else {
            IntWidth::Int
        };
        Type::Integer {
            width,
            unsigned: !self.unsigned.is_empty(),
        }
    }
}

/// Parse declaration specifiers. The caller has checked that the current
/// token can start them.
pub(crate) fn parse_declaration_specifiers(parser: &mut Parser) -> Result<DeclSpecifiers, ParseError> {
    let start_span = parser.current_span();
    let mut storage = StorageClass::None;
    let mut storage_span = SourceSpan::empty();
    let mut is_inline = false;
    let mut qualifiers = TypeQualifiers::empty();
    let mut parts = SpecifierParts::default();
    let mut base: Option<TypeRef> = None;

    loop {
        let token = parser.current_token();
        match token.kind {
            kind if kind.is_storage_class_specifier() => {
                parser.advance();
                let class = match kind {
                    TokenKind::Auto => StorageClass::Auto,
                    TokenKind::Static => StorageClass::Static,
                    TokenKind::Extern => StorageClass::Extern,
                    TokenKind::Register => StorageClass::Register,
                    TokenKind::Typedef => StorageClass::Typedef,
                    _ => unreachable!(),
                };
                if storage != StorageClass::None {
                    return Err(ParseError::MultipleStorageClasses {
                        span: token.span,
                        previous: storage_span,
                    });
                }
                if base.is_some() || !parts.is_empty() {
                    // Legal, but `int static x;` reads badly.
                    parser.diag.report_warning(
                        "storage class is not at the beginning of the declaration",
                        token.span,
                    );
                }
                storage = class;
                storage_span = token.span;
                if class == StorageClass::Typedef {
                    debug!("specifiers: typedef declaration");
                }
            }
            kind if kind.is_type_qualifier() => {
                parser.advance();
                let qualifier = match kind {
                    TokenKind::Const => TypeQualifiers::CONST,
                    TokenKind::Volatile => TypeQualifiers::VOLATILE,
                    TokenKind::Restrict => TypeQualifiers::RESTRICT,
                    _ => unreachable!(),
                };
                if qualifiers.contains(qualifier) {
                    parser
                        .diag
                        .report_warning(format!("duplicate '{}' qualifier", qualifier), token.span);
                }
                qualifiers.insert(qualifier);
            }
            TokenKind::Inline => {
                parser.advance();
                is_inline = true;
            }
            TokenKind::Void | TokenKind::Float | TokenKind::Double => {
                parser.advance();
                if base.is_some() || (token.kind != TokenKind::Double && !parts.is_empty()) {
                    return Err(ParseError::SyntaxError {
                        message: "invalid combination of type specifiers".to_string(),
                        span: token.span,
                    });
                }
                let ty = match token.kind {
                    TokenKind::Void => Type::Void,
                    TokenKind::Float => Type::Float,
                    TokenKind::Double => Type::Double,
                    _ => unreachable!(),
                };
                base = Some(parser.ast.push_type(ty));
            }
            TokenKind::Int
            | TokenKind::Long
            | TokenKind::Short
            | TokenKind::Char
            | TokenKind::Signed
            | TokenKind::Unsigned => {
                parser.advance();
                if base.is_some() {
                    return Err(ParseError::SyntaxError {
                        message: "invalid combination of type specifiers".to_string(),
                        span: token.span,
                    });
                }
                match token.kind {
                    TokenKind::Int => parts.int.push(token.span),
                    TokenKind::Long => parts.long.push(token.span),
                    TokenKind::Short => parts.short.push(token.span),
                    TokenKind::Char => parts.char_.push(token.span),
                    TokenKind::Signed => parts.signed.push(token.span),
                    TokenKind::Unsigned => parts.unsigned.push(token.span),
                    _ => unreachable!(),
                }
                parts.check(token.span)?;
            }
            TokenKind::Struct | TokenKind::Union => {
                parser.advance();
                if base.is_some() || !parts.is_empty() {
                    return Err(ParseError::SyntaxError {
                        message: "invalid combination of type specifiers".to_string(),
                        span: token.span,
                    });
                }
                let is_union = token.kind == TokenKind::Union;
                base = Some(super::struct_parsing::parse_record_specifier(
                    parser, is_union, token.span,
                )?);
            }
            TokenKind::Enum => {
                parser.advance();
                if base.is_some() || !parts.is_empty() {
                    return Err(ParseError::SyntaxError {
                        message: "invalid combination of type specifiers".to_string(),
                        span: token.span,
                    });
                }
                base = Some(super::enum_parsing::parse_enum_specifier(parser, token.span)?);
            }
            TokenKind::Identifier(symbol) => {
                // An identifier acts as a type specifier only when no type
                // has been seen yet and it names a typedef: otherwise it is
                // the declared name and ends the specifier run.
                if base.is_none() && parts.is_empty() {
                    if let Some(user_type) = parser.scopes.lookup_user_type(symbol) {
                        debug!("specifiers: '{}' resolved as a typedef name", symbol);
                        parser.advance();
                        base = Some(user_type);
                        continue;
                    }
                }
                break;
            }
            _ => break,
        }
    }

    let span = start_span.merge(parser.previous_span());

    let base = match base {
        Some(ty) => ty,
        None if parts.is_empty() => {
            // No type specifier at all, e.g. `static x;`.
            parser
                .diag
                .report_warning("type specifier missing, defaults to 'int'", span);
            parser.ast.push_type(Type::Integer {
                width: IntWidth::Int,
                unsigned: false,
            })
        }
        None => parser.ast.push_type(parts.resolve()),
    };

    let base = if qualifiers.is_empty() {
        base
    } else {
        parser.ast.push_type(Type::Qualified {
            inner: base,
            qualifiers,
        })
    };

    Ok(DeclSpecifiers {
        base,
        storage,
        storage_span,
        is_inline,
        span,
    })
}
