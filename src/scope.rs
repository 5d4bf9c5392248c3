//! Lexical scopes and the symbol table.
//!
//! Scopes form a tree rooted at the translation-unit scope. Each scope keeps
//! its symbols and user-defined type registrations in declaration order, and
//! a back-pointer to the AST node that owns it once that node exists.
//!
//! C keeps tags and typedef names in a namespace separate from ordinary
//! identifiers; the same spelling may be declared in both within one scope.
//! Lookups therefore always name the namespace they search.

use crate::ast::{NodeRef, StorageClass, TypeRef};
use crate::diagnostic::ParseError;
use crate::source_manager::SourceSpan;
use log::debug;
use std::num::NonZeroU32;
use symbol_table::GlobalSymbol as Symbol;

/// Reference to a scope in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(NonZeroU32);

impl ScopeId {
    pub const ROOT: Self = match NonZeroU32::new(1) {
        Some(id) => ScopeId(id),
        None => unreachable!(),
    };

    fn new(id: u32) -> Self {
        ScopeId(NonZeroU32::new(id).expect("ScopeId must be non-zero"))
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Reference to a symbol entry.
pub type SymbolId = NonZeroU32;

/// What kind of construct opened the scope. Used to find the nearest scope
/// that may host tag and typedef registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    TranslationUnit,
    /// Parameter scope of a function declaration; chained to the body when
    /// the declaration turns out to be a definition.
    Function,
    /// Parameter scope of a non-defining declarator; kept only for the
    /// parameter types.
    Prototype,
    Block,
    Record,
    ForHeader,
}

impl ScopeKind {
    /// Tags and typedef names never attach to record field scopes,
    /// parameter scopes or for-headers.
    fn hosts_type_names(self) -> bool {
        matches!(self, ScopeKind::TranslationUnit | ScopeKind::Block)
    }
}

/// Which namespace a lookup searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Ordinary,
    TypeName,
}

/// One declared name.
#[derive(Debug)]
pub struct SymbolEntry {
    pub name: Symbol,
    pub span: SourceSpan,
    pub ty: TypeRef,
    pub storage: StorageClass,
    /// Set for names introduced by typedef, struct, union or enum.
    pub is_type_name: bool,
    pub scope: ScopeId,
}

/// One node in the scope tree.
#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub kind: ScopeKind,
    /// The AST node this scope belongs to, filled in once that node exists.
    pub owner: Option<NodeRef>,
    /// Symbols in declaration order.
    pub symbols: Vec<SymbolId>,
    /// User-defined types registered here, in declaration order.
    pub user_types: Vec<UserTypeEntry>,
}

#[derive(Debug, Clone, Copy)]
pub struct UserTypeEntry {
    pub name: Symbol,
    pub ty: TypeRef,
    pub span: SourceSpan,
}

/// The scope tree plus flattened symbol storage.
pub struct ScopeTree {
    scopes: Vec<Scope>,
    entries: Vec<SymbolEntry>,
    current: ScopeId,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// Create the tree with its translation-unit root scope.
    pub fn new() -> Self {
        ScopeTree {
            scopes: vec![Scope {
                parent: None,
                children: Vec::new(),
                kind: ScopeKind::TranslationUnit,
                owner: None,
                symbols: Vec::new(),
                user_types: Vec::new(),
            }],
            entries: Vec::new(),
            current: ScopeId::ROOT,
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId::ROOT
    }

    pub fn current_scope(&self) -> ScopeId {
        self.current
    }

    /// Re-enter a previously created scope (used when a function definition
    /// chains its body to the retained parameter scope).
    pub fn set_current(&mut self, scope_id: ScopeId) {
        self.current = scope_id;
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.get() as usize - 1]
    }

    fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.get() as usize - 1]
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn set_owner(&mut self, id: ScopeId, owner: NodeRef) {
        self.scope_mut(id).owner = Some(owner);
    }

    /// Re-kind a scope, e.g. a prototype parameter scope that turns out to
    /// belong to a function declaration.
    pub fn set_kind(&mut self, id: ScopeId, kind: ScopeKind) {
        self.scope_mut(id).kind = kind;
    }

    /// Open a child of the current scope and make it current.
    pub fn push_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let id = ScopeId::new(self.scopes.len() as u32 + 1);
        self.scopes.push(Scope {
            parent: Some(self.current),
            children: Vec::new(),
            kind,
            owner: None,
            symbols: Vec::new(),
            user_types: Vec::new(),
        });
        self.scope_mut(self.current).children.push(id);
        self.current = id;
        debug!("push_scope: {:?} -> scope {}", kind, id.get());
        id
    }

    /// Close the current scope. Popping the root is a bug in the parser, not
    /// a user-facing diagnostic.
    pub fn pop_scope(&mut self) -> ScopeId {
        let popped = self.current;
        let parent = self
            .scope(popped)
            .parent
            .expect("cannot pop the translation-unit scope");
        self.current = parent;
        debug!("pop_scope: scope {} -> scope {}", popped.get(), parent.get());
        popped
    }

    pub fn symbol(&self, id: SymbolId) -> &SymbolEntry {
        &self.entries[(id.get() - 1) as usize]
    }

    fn push_entry(&mut self, entry: SymbolEntry) -> SymbolId {
        let id = self.entries.len() as u32 + 1;
        self.entries.push(entry);
        SymbolId::new(id).expect("SymbolId overflow")
    }

    /// Append a symbol to the current scope.
    pub fn add_symbol(&mut self, mut entry: SymbolEntry) -> SymbolId {
        entry.scope = self.current;
        debug!("add_symbol: '{}' in scope {}", entry.name, self.current.get());
        let id = self.push_entry(entry);
        self.scope_mut(self.current).symbols.push(id);
        id
    }

    /// Append a type-name symbol to the nearest scope that hosts type names.
    pub fn add_type_symbol(&mut self, mut entry: SymbolEntry) -> SymbolId {
        let target = self.tag_hosting_scope();
        entry.scope = target;
        entry.is_type_name = true;
        debug!("add_type_symbol: '{}' in scope {}", entry.name, target.get());
        let id = self.push_entry(entry);
        self.scope_mut(target).symbols.push(id);
        id
    }

    /// Nearest enclosing scope, including the current one, owned by a
    /// compound statement or the translation unit.
    pub fn tag_hosting_scope(&self) -> ScopeId {
        let mut id = self.current;
        loop {
            let scope = self.scope(id);
            if scope.kind.hosts_type_names() {
                return id;
            }
            match scope.parent {
                Some(parent) => id = parent,
                // The root always hosts type names, so this is unreachable
                // unless the tree is malformed.
                None => return id,
            }
        }
    }

    /// Search from the current scope towards the root; first match wins.
    pub fn lookup_symbol(&self, name: Symbol, namespace: Namespace) -> Option<SymbolId> {
        self.lookup_symbol_from(self.current, name, namespace)
    }

    pub fn lookup_symbol_from(&self, start: ScopeId, name: Symbol, namespace: Namespace) -> Option<SymbolId> {
        let mut id = Some(start);
        while let Some(scope_id) = id {
            if let Some(found) = self.lookup_symbol_in(scope_id, name, namespace) {
                return Some(found);
            }
            id = self.scope(scope_id).parent;
        }
        None
    }

    pub fn lookup_symbol_in(&self, scope_id: ScopeId, name: Symbol, namespace: Namespace) -> Option<SymbolId> {
        self.scope(scope_id)
            .symbols
            .iter()
            .copied()
            .find(|&sym_id| {
                let entry = self.symbol(sym_id);
                entry.name == name && entry.is_type_name == (namespace == Namespace::TypeName)
            })
    }

    /// Register a user-defined type (tag or typedef name) in the nearest
    /// tag-hosting scope. Redeclaring a name in the same scope is an error.
    pub fn register_user_type(&mut self, name: Symbol, ty: TypeRef, span: SourceSpan) -> Result<(), ParseError> {
        let target = self.tag_hosting_scope();
        if let Some(prev) = self
            .scope(target)
            .user_types
            .iter()
            .find(|entry| entry.name == name)
        {
            return Err(ParseError::Redeclaration {
                name,
                span,
                previous: prev.span,
            });
        }
        debug!("register_user_type: '{}' in scope {}", name, target.get());
        self.scope_mut(target).user_types.push(UserTypeEntry { name, ty, span });
        Ok(())
    }

    /// Search user-defined types from the current scope towards the root.
    pub fn lookup_user_type(&self, name: Symbol) -> Option<TypeRef> {
        let mut id = Some(self.current);
        while let Some(scope_id) = id {
            let scope = self.scope(scope_id);
            if let Some(entry) = scope.user_types.iter().find(|entry| entry.name == name) {
                return Some(entry.ty);
            }
            id = scope.parent;
        }
        None
    }

    /// Iterate all scopes with their ids, in creation order.
    pub fn iter_scopes(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes
            .iter()
            .enumerate()
            .map(|(i, scope)| (ScopeId::new(i as u32 + 1), scope))
    }
}
