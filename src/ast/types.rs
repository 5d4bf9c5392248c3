//! In-memory representation of C types and the canonical type printer.

use super::{Ast, NodeKind, NodeRef, Symbol, TypeRef};
use crate::source_manager::SourceSpan;
use thin_vec::ThinVec;

bitflags::bitflags! {
    /// Type qualifier set; multiple qualifiers merge into one value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TypeQualifiers: u8 {
        const CONST = 1 << 0;
        const VOLATILE = 1 << 1;
        const RESTRICT = 1 << 2;
    }
}

impl std::fmt::Display for TypeQualifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (flag, name) in [
            (TypeQualifiers::CONST, "const"),
            (TypeQualifiers::VOLATILE, "volatile"),
            (TypeQualifiers::RESTRICT, "restrict"),
        ] {
            if self.contains(flag) {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Width tag of an integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    Char,
    Short,
    Int,
    Long,
    LongLong,
}

impl IntWidth {
    pub fn keyword(self) -> &'static str {
        match self {
            IntWidth::Char => "char",
            IntWidth::Short => "short",
            IntWidth::Int => "int",
            IntWidth::Long => "long",
            IntWidth::LongLong => "long long",
        }
    }
}

/// One record field.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: Symbol,
    pub ty: TypeRef,
    /// Bit-field width expression; widths are currently restricted to
    /// integer literals.
    pub bit_width: Option<NodeRef>,
    pub span: SourceSpan,
}

/// One enumerator.
#[derive(Debug, Clone)]
pub struct Enumerator {
    pub name: Symbol,
    pub init: Option<NodeRef>,
    /// Value when it could be computed (literal initializers and the
    /// running previous-plus-one counter).
    pub value: Option<i64>,
    pub span: SourceSpan,
}

/// Tagged union of C types. Stored and interned in the [`Ast`] arena;
/// record and enum variants are completed in place when their definition is
/// parsed, so every mention of a tag shares one `TypeRef`.
#[derive(Debug, Clone)]
pub enum Type {
    Void,
    Integer {
        width: IntWidth,
        unsigned: bool,
    },
    Float,
    Double,
    Qualified {
        inner: TypeRef,
        qualifiers: TypeQualifiers,
    },
    Pointer {
        pointee: TypeRef,
    },
    Array {
        element: TypeRef,
        /// One entry per dimension; `None` for an unspecified length `[]`.
        lengths: ThinVec<Option<NodeRef>>,
    },
    Function {
        return_type: TypeRef,
        params: ThinVec<TypeRef>,
        is_variadic: bool,
    },
    Record {
        tag: Symbol,
        is_union: bool,
        is_definition: bool,
        fields: ThinVec<Field>,
    },
    Enum {
        tag: Symbol,
        is_definition: bool,
        enumerators: ThinVec<Enumerator>,
    },
    /// The distinguished type of an enumerator name.
    EnumConstant {
        enum_tag: Symbol,
    },
    /// A typedef name bound to the type it abbreviates.
    Alias {
        name: Symbol,
        referred: TypeRef,
    },
}

impl Ast {
    /// Render a type in canonical C declaration form, e.g. `int *[4]` for an
    /// array of pointers and `int (*)[4]` for a pointer to an array.
    pub fn type_to_string(&self, ty: TypeRef) -> String {
        self.format_declarator(ty, String::new())
    }

    /// Render a type with a declared name in place of the abstract hole.
    pub fn type_to_string_with_name(&self, ty: TypeRef, name: Symbol) -> String {
        self.format_declarator(ty, name.as_str().to_string())
    }

    fn format_declarator(&self, ty: TypeRef, decl: String) -> String {
        match self.get_type(ty) {
            Type::Pointer { pointee } => self.format_declarator(*pointee, format!("*{}", decl)),
            Type::Array { element, lengths } => {
                let mut decl = Self::parenthesize_pointer(decl);
                for length in lengths {
                    decl.push('[');
                    if let Some(expr) = length {
                        decl.push_str(&self.render_length_expr(*expr));
                    }
                    decl.push(']');
                }
                self.format_declarator(*element, decl)
            }
            Type::Function {
                return_type,
                params,
                is_variadic,
            } => {
                let mut decl = Self::parenthesize_pointer(decl);
                decl.push('(');
                let mut first = true;
                for param in params {
                    if !first {
                        decl.push_str(", ");
                    }
                    decl.push_str(&self.type_to_string(*param));
                    first = false;
                }
                if *is_variadic {
                    if !first {
                        decl.push_str(", ");
                    }
                    decl.push_str("...");
                }
                decl.push(')');
                self.format_declarator(*return_type, decl)
            }
            Type::Qualified { inner, qualifiers } => {
                if matches!(self.get_type(*inner), Type::Pointer { .. }) {
                    // Pointer-level qualifier: int *const p
                    let decl = if decl.is_empty() {
                        qualifiers.to_string()
                    } else {
                        format!("{} {}", qualifiers, decl)
                    };
                    self.format_declarator(*inner, decl)
                } else {
                    let base = format!("{} {}", qualifiers, self.base_name(*inner));
                    Self::combine(base, decl)
                }
            }
            _ => Self::combine(self.base_name(ty), decl),
        }
    }

    fn base_name(&self, ty: TypeRef) -> String {
        match self.get_type(ty) {
            Type::Void => "void".to_string(),
            Type::Integer { width, unsigned } => {
                if *unsigned {
                    format!("unsigned {}", width.keyword())
                } else {
                    width.keyword().to_string()
                }
            }
            Type::Float => "float".to_string(),
            Type::Double => "double".to_string(),
            Type::Record { tag, is_union, .. } => {
                let keyword = if *is_union { "union" } else { "struct" };
                if tag.as_str().starts_with('!') {
                    format!("{} <anonymous>", keyword)
                } else {
                    format!("{} {}", keyword, tag)
                }
            }
            Type::Enum { tag, .. } => {
                if tag.as_str().starts_with('!') {
                    "enum <anonymous>".to_string()
                } else {
                    format!("enum {}", tag)
                }
            }
            Type::EnumConstant { enum_tag } => format!("enum {} constant", enum_tag),
            Type::Alias { name, .. } => name.as_str().to_string(),
            // Derived types are handled by format_declarator; reaching here
            // means a derived type sits where a base was expected.
            other => format!("{:?}", other),
        }
    }

    fn render_length_expr(&self, expr: NodeRef) -> String {
        match &self.get_node(expr).kind {
            NodeKind::LiteralInt(value) => value.to_string(),
            NodeKind::Ident(name) => name.as_str().to_string(),
            _ => "...".to_string(),
        }
    }

    fn parenthesize_pointer(decl: String) -> String {
        if decl.starts_with('*') {
            format!("({})", decl)
        } else {
            decl
        }
    }

    fn combine(base: String, decl: String) -> String {
        if decl.is_empty() {
            base
        } else {
            format!("{} {}", base, decl)
        }
    }

    /// Strip typedef aliases down to the referred type.
    pub fn resolve_alias(&self, mut ty: TypeRef) -> TypeRef {
        while let Type::Alias { referred, .. } = self.get_type(ty) {
            ty = *referred;
        }
        ty
    }

    /// Strip qualifier and alias layers.
    pub fn unqualified(&self, mut ty: TypeRef) -> TypeRef {
        loop {
            match self.get_type(ty) {
                Type::Qualified { inner, .. } => ty = *inner,
                Type::Alias { referred, .. } => ty = *referred,
                _ => return ty,
            }
        }
    }
}
