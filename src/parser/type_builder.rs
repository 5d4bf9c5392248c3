//! Grafting the specifier base type into a declarator.
//!
//! The declarator tree is outside-in: the root is the outermost modifier
//! and the identifier sits at the leaf. Folding from the root therefore
//! threads a partially-built type towards the leaf; each step fills the
//! "hole" left by the previous layer with a new derived type whose own hole
//! is one level deeper. Suffix layers were wrapped inside pointer layers by
//! the declarator parser, which is exactly why `int *f()` folds to a
//! function returning a pointer while `int (*f)()` folds to a pointer to a
//! function.

use crate::ast::{Symbol, Type, TypeRef};
use crate::source_manager::SourceSpan;
use thin_vec::ThinVec;

use super::declarator::Declarator;
use super::Parser;

/// Fold `declarator` over `base`, returning the complete type and the
/// declared name, if the declarator has one.
pub(crate) fn build_type(
    parser: &mut Parser,
    base: TypeRef,
    declarator: &Declarator,
) -> (TypeRef, Option<(Symbol, SourceSpan)>) {
    match declarator {
        Declarator::Abstract => (base, None),
        Declarator::Identifier(name, span) => (base, Some((*name, *span))),
        Declarator::Pointer(qualifiers, inner) => {
            let mut pointer = parser.ast.push_type(Type::Pointer { pointee: base });
            if !qualifiers.is_empty() {
                pointer = parser.ast.push_type(Type::Qualified {
                    inner: pointer,
                    qualifiers: *qualifiers,
                });
            }
            build_type(parser, pointer, inner)
        }
        Declarator::Array(inner, lengths) => {
            let array = parser.ast.push_type(Type::Array {
                element: base,
                lengths: lengths.clone(),
            });
            build_type(parser, array, inner)
        }
        Declarator::Function {
            inner,
            params,
            is_variadic,
            ..
        } => {
            let param_types: ThinVec<TypeRef> = params.iter().map(|param| param.ty).collect();
            let function = parser.ast.push_type(Type::Function {
                return_type: base,
                params: param_types,
                is_variadic: *is_variadic,
            });
            build_type(parser, function, inner)
        }
    }
}
