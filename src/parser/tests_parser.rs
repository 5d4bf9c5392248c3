use super::expressions;
use super::Parser;
use crate::ast::{
    Ast, AssignOp, BinaryOp, IntWidth, NodeKind, NodeRef, StorageClass, Symbol, Type, UnaryOp,
};
use crate::diagnostic::DiagnosticEngine;
use crate::lexer::Lexer;
use crate::scope::{Namespace, ScopeTree};
use crate::source_manager::SourceManager;

struct ParseOutcome {
    ast: Ast,
    scopes: ScopeTree,
    diag: DiagnosticEngine,
    root: NodeRef,
}

fn parse(source: &str) -> ParseOutcome {
    let mut sm = SourceManager::new();
    let id = sm.add_buffer(source.to_string(), "test.c");
    let text = sm.get_buffer(id).to_string();

    let mut ast = Ast::new();
    let mut scopes = ScopeTree::new();
    let mut diag = DiagnosticEngine::new();
    let root = {
        let lexer = Lexer::new(&text, id);
        let mut parser = Parser::new(lexer, &mut ast, &mut scopes, &mut diag);
        parser.parse_translation_unit()
    };
    ParseOutcome {
        ast,
        scopes,
        diag,
        root,
    }
}

fn parse_clean(source: &str) -> ParseOutcome {
    let outcome = parse(source);
    assert!(
        !outcome.diag.has_errors(),
        "unexpected errors parsing {:?}: {:?}",
        source,
        outcome.diag.diagnostics()
    );
    outcome
}

fn parse_expr(source: &str) -> (Ast, NodeRef) {
    let mut sm = SourceManager::new();
    let id = sm.add_buffer(source.to_string(), "expr.c");
    let text = sm.get_buffer(id).to_string();

    let mut ast = Ast::new();
    let mut scopes = ScopeTree::new();
    let mut diag = DiagnosticEngine::new();
    let expr = {
        let lexer = Lexer::new(&text, id);
        let mut parser = Parser::new(lexer, &mut ast, &mut scopes, &mut diag);
        expressions::parse_expression(&mut parser, 0).expect("expression should parse")
    };
    (ast, expr)
}

fn tu_decls(outcome: &ParseOutcome) -> Vec<NodeRef> {
    match &outcome.ast.get_node(outcome.root).kind {
        NodeKind::TranslationUnit(data) => data.decls.to_vec(),
        other => panic!("root is not a translation unit: {:?}", other),
    }
}

fn symbol_type_string(outcome: &ParseOutcome, name: &str) -> String {
    let id = outcome
        .scopes
        .lookup_symbol_from(outcome.scopes.root(), Symbol::new(name), Namespace::Ordinary)
        .unwrap_or_else(|| panic!("symbol '{}' not found", name));
    let entry = outcome.scopes.symbol(id);
    outcome.ast.type_to_string(entry.ty)
}

// --- declarations ---------------------------------------------------------

#[test]
fn static_const_pointer_declarations() {
    let outcome = parse_clean("static const int *id, *id2;");
    let decls = tu_decls(&outcome);
    assert_eq!(decls.len(), 2);

    for name in ["id", "id2"] {
        let sym_id = outcome
            .scopes
            .lookup_symbol_from(outcome.scopes.root(), Symbol::new(name), Namespace::Ordinary)
            .unwrap();
        let entry = outcome.scopes.symbol(sym_id);
        assert_eq!(entry.storage, StorageClass::Static);
        assert_eq!(entry.scope, outcome.scopes.root());
        assert_eq!(outcome.ast.type_to_string(entry.ty), "const int *");
    }
}

#[test]
fn pointer_to_function_declaration() {
    let outcome = parse_clean("int (*fp)(void, void);");
    let decls = tu_decls(&outcome);
    assert_eq!(decls.len(), 1);
    assert!(matches!(
        outcome.ast.get_node(decls[0]).kind,
        NodeKind::VariableDecl(_)
    ));
    assert_eq!(symbol_type_string(&outcome, "fp"), "int (*)(void, void)");
}

#[test]
fn declarator_suffixes_bind_tighter_than_pointers() {
    let outcome = parse_clean("int *arr[4]; int (*ptr)[4]; int *f(void);");
    assert_eq!(symbol_type_string(&outcome, "arr"), "int *[4]");
    assert_eq!(symbol_type_string(&outcome, "ptr"), "int (*)[4]");
    assert_eq!(symbol_type_string(&outcome, "f"), "int *(void)");

    // `f` declares a function, `ptr` an object.
    let decls = tu_decls(&outcome);
    assert!(matches!(
        outcome.ast.get_node(decls[2]).kind,
        NodeKind::FunctionDecl(_)
    ));
    assert!(matches!(
        outcome.ast.get_node(decls[1]).kind,
        NodeKind::VariableDecl(_)
    ));
}

#[test]
fn multi_dimensional_arrays_accumulate() {
    let outcome = parse_clean("int grid[2][3];");
    assert_eq!(symbol_type_string(&outcome, "grid"), "int [2][3]");
}

#[test]
fn struct_with_self_referential_fields() {
    let outcome = parse_clean("struct Tree { int payload; struct Tree *Left, *Right; } tree;");

    let decls = tu_decls(&outcome);
    assert_eq!(decls.len(), 2);

    let record_ty = match &outcome.ast.get_node(decls[0]).kind {
        NodeKind::RecordDecl(data) => {
            assert!(data.is_definition);
            assert_eq!(data.fields.len(), 3);
            data.ty
        }
        other => panic!("expected record declaration, got {:?}", other),
    };

    // The object is typed with the very same record object.
    let tree_sym = outcome
        .scopes
        .lookup_symbol_from(outcome.scopes.root(), Symbol::new("tree"), Namespace::Ordinary)
        .unwrap();
    assert_eq!(outcome.scopes.symbol(tree_sym).ty, record_ty);
    assert_eq!(symbol_type_string(&outcome, "tree"), "struct Tree");

    // Both pointer fields point back at that same record object.
    match outcome.ast.get_type(record_ty) {
        Type::Record { fields, is_definition, .. } => {
            assert!(*is_definition);
            assert_eq!(fields.len(), 3);
            for field in fields.iter().skip(1) {
                match outcome.ast.get_type(field.ty) {
                    Type::Pointer { pointee } => assert_eq!(*pointee, record_ty),
                    other => panic!("expected pointer field, got {:?}", other),
                }
            }
        }
        other => panic!("expected record type, got {:?}", other),
    }
}

#[test]
fn typedef_resolves_in_specifier_position() {
    let outcome = parse_clean("typedef int T; T x; f(T);");
    let decls = tu_decls(&outcome);
    assert_eq!(decls.len(), 3);
    assert!(matches!(
        outcome.ast.get_node(decls[0]).kind,
        NodeKind::TypedefDecl(_)
    ));

    // x is an object whose type resolves to int through the alias.
    let x = outcome
        .scopes
        .lookup_symbol_from(outcome.scopes.root(), Symbol::new("x"), Namespace::Ordinary)
        .unwrap();
    let resolved = outcome.ast.resolve_alias(outcome.scopes.symbol(x).ty);
    assert!(matches!(
        outcome.ast.get_type(resolved),
        Type::Integer {
            width: IntWidth::Int,
            unsigned: false
        }
    ));

    // f is a function declaration whose single parameter is typed int.
    match &outcome.ast.get_node(decls[2]).kind {
        NodeKind::FunctionDecl(data) => {
            assert_eq!(data.params.len(), 1);
            let f_ty = outcome.scopes.symbol(data.symbol).ty;
            match outcome.ast.get_type(f_ty) {
                Type::Function { params, .. } => {
                    assert_eq!(params.len(), 1);
                    let param = outcome.ast.resolve_alias(params[0]);
                    assert!(matches!(
                        outcome.ast.get_type(param),
                        Type::Integer {
                            width: IntWidth::Int,
                            ..
                        }
                    ));
                }
                other => panic!("expected function type, got {:?}", other),
            }
        }
        other => panic!("expected function declaration, got {:?}", other),
    }
}

#[test]
fn enum_forward_then_definition_shares_identity() {
    let outcome = parse_clean("enum Color; enum Color clr; enum Color { red, green = 3, blue };");

    // Exactly one user type named Color in the top scope.
    let root = outcome.scopes.root();
    let entries: Vec<_> = outcome
        .scopes
        .scope(root)
        .user_types
        .iter()
        .filter(|e| e.name == Symbol::new("Color"))
        .collect();
    assert_eq!(entries.len(), 1);
    let enum_ty = entries[0].ty;

    // clr was declared before the definition, with the same type object.
    let clr = outcome
        .scopes
        .lookup_symbol_from(root, Symbol::new("clr"), Namespace::Ordinary)
        .unwrap();
    assert_eq!(outcome.scopes.symbol(clr).ty, enum_ty);
    assert_eq!(symbol_type_string(&outcome, "clr"), "enum Color");

    // The definition completed that same object in place.
    match outcome.ast.get_type(enum_ty) {
        Type::Enum {
            is_definition,
            enumerators,
            ..
        } => {
            assert!(*is_definition);
            let values: Vec<_> = enumerators.iter().map(|e| e.value).collect();
            assert_eq!(values, vec![Some(0), Some(3), Some(4)]);
        }
        other => panic!("expected enum type, got {:?}", other),
    }

    // Enumerators are visible as ordinary constants and as enumerator
    // names.
    for name in ["red", "green", "blue"] {
        assert!(outcome
            .scopes
            .lookup_symbol_from(root, Symbol::new(name), Namespace::Ordinary)
            .is_some());
        assert!(outcome
            .scopes
            .lookup_symbol_from(root, Symbol::new(name), Namespace::TypeName)
            .is_some());
    }
}

#[test]
fn record_forward_then_definition_is_idempotent() {
    let outcome = parse_clean("struct T; struct T { int x; };");
    let root = outcome.scopes.root();
    let entries: Vec<_> = outcome
        .scopes
        .scope(root)
        .user_types
        .iter()
        .filter(|e| e.name == Symbol::new("T"))
        .collect();
    assert_eq!(entries.len(), 1);
    match outcome.ast.get_type(entries[0].ty) {
        Type::Record {
            is_definition,
            fields,
            ..
        } => {
            assert!(*is_definition);
            assert_eq!(fields.len(), 1);
        }
        other => panic!("expected record type, got {:?}", other),
    }

    // The definition node chains back to the forward declaration.
    let decls = tu_decls(&outcome);
    match &outcome.ast.get_node(decls[1]).kind {
        NodeKind::RecordDecl(data) => {
            assert!(data.is_definition);
            assert_eq!(data.prev, Some(decls[0]));
        }
        other => panic!("expected record declaration, got {:?}", other),
    }
}

#[test]
fn for_header_scope_nests_inside_function_body() {
    let outcome = parse_clean("int main(int arg) { for (int i = 0; i < arg; i++) { } }");

    let decls = tu_decls(&outcome);
    let (fn_scope, body) = match &outcome.ast.get_node(decls[0]).kind {
        NodeKind::FunctionDecl(data) => (data.scope, data.body.expect("definition has a body")),
        other => panic!("expected function declaration, got {:?}", other),
    };

    let (body_scope, items) = match &outcome.ast.get_node(body).kind {
        NodeKind::CompoundStatement(stmt) => (stmt.scope, stmt.items.to_vec()),
        other => panic!("expected compound body, got {:?}", other),
    };

    let for_stmt = match &outcome.ast.get_node(items[0]).kind {
        NodeKind::For(stmt) => stmt.clone(),
        other => panic!("expected for statement, got {:?}", other),
    };

    // The header scope holds i, sits under the body scope and is nowhere
    // near the root.
    assert!(outcome
        .scopes
        .lookup_symbol_in(for_stmt.scope, Symbol::new("i"), Namespace::Ordinary)
        .is_some());
    assert_eq!(outcome.scopes.scope(for_stmt.scope).parent, Some(body_scope));
    assert_ne!(for_stmt.scope, outcome.scopes.root());
    assert_ne!(
        outcome.scopes.scope(for_stmt.scope).parent,
        Some(outcome.scopes.root())
    );

    // The parameter scope chains: body -> function -> root.
    assert_eq!(outcome.scopes.scope(body_scope).parent, Some(fn_scope));
    assert_eq!(outcome.scopes.scope(fn_scope).parent, Some(outcome.scopes.root()));
    assert!(outcome
        .scopes
        .lookup_symbol_in(fn_scope, Symbol::new("arg"), Namespace::Ordinary)
        .is_some());

    // The body is empty apart from the for statement, whose own body is an
    // empty compound statement.
    assert!(matches!(
        outcome.ast.get_node(for_stmt.body).kind,
        NodeKind::CompoundStatement(_)
    ));
}

#[test]
fn scope_tree_is_well_formed() {
    let outcome = parse_clean(
        "struct S { int x; } s;\n\
         int main(int argc) {\n\
             for (int i = 0; i < argc; i++) {\n\
                 int inner;\n\
             }\n\
             { int block_local; }\n\
             return 0;\n\
         }\n",
    );

    let mut roots = 0;
    for (id, scope) in outcome.scopes.iter_scopes() {
        match scope.parent {
            None => roots += 1,
            Some(parent) => {
                assert!(
                    outcome.scopes.scope(parent).children.contains(&id),
                    "scope {:?} missing from its parent's children",
                    id
                );
            }
        }
    }
    assert_eq!(roots, 1);
}

#[test]
fn tag_and_object_namespaces_coexist() {
    let outcome = parse_clean("struct T { int x; }; int T;");
    let root = outcome.scopes.root();
    assert!(outcome
        .scopes
        .lookup_symbol_from(root, Symbol::new("T"), Namespace::Ordinary)
        .is_some());
    assert!(outcome
        .scopes
        .lookup_symbol_from(root, Symbol::new("T"), Namespace::TypeName)
        .is_some());
}

#[test]
fn anonymous_record_gets_synthesized_tag() {
    let outcome = parse_clean("struct { int x; } v;");
    let v = outcome
        .scopes
        .lookup_symbol_from(outcome.scopes.root(), Symbol::new("v"), Namespace::Ordinary)
        .unwrap();
    match outcome.ast.get_type(outcome.scopes.symbol(v).ty) {
        Type::Record { tag, .. } => assert!(tag.as_str().starts_with('!')),
        other => panic!("expected record type, got {:?}", other),
    }
    assert_eq!(symbol_type_string(&outcome, "v"), "struct <anonymous>");
}

#[test]
fn bit_fields_and_anonymous_fields() {
    let outcome = parse_clean("struct Flags { int a : 4; int : 2; int b; };");
    let decls = tu_decls(&outcome);
    match &outcome.ast.get_node(decls[0]).kind {
        NodeKind::RecordDecl(data) => {
            assert_eq!(data.fields.len(), 3);
        }
        other => panic!("expected record declaration, got {:?}", other),
    }
    let root = outcome.scopes.root();
    let ty = outcome
        .scopes
        .scope(root)
        .user_types
        .iter()
        .find(|e| e.name == Symbol::new("Flags"))
        .unwrap()
        .ty;
    match outcome.ast.get_type(ty) {
        Type::Record { fields, .. } => {
            assert!(fields[0].bit_width.is_some());
            assert!(fields[1].bit_width.is_some());
            assert!(fields[1].name.as_str().starts_with('!'));
            assert!(fields[2].bit_width.is_none());
        }
        other => panic!("expected record type, got {:?}", other),
    }
}

#[test]
fn nested_record_definition_usable_on_same_line() {
    let outcome = parse_clean("struct Outer { struct Inner { int v; } one, *two; };");
    let root = outcome.scopes.root();
    // Inner is registered in the translation-unit scope, not the field
    // scope of Outer.
    assert!(outcome
        .scopes
        .scope(root)
        .user_types
        .iter()
        .any(|e| e.name == Symbol::new("Inner")));

    let outer_ty = outcome
        .scopes
        .scope(root)
        .user_types
        .iter()
        .find(|e| e.name == Symbol::new("Outer"))
        .unwrap()
        .ty;
    match outcome.ast.get_type(outer_ty) {
        Type::Record { fields, .. } => {
            assert_eq!(fields.len(), 2);
            assert!(matches!(outcome.ast.get_type(fields[0].ty), Type::Record { .. }));
            assert!(matches!(outcome.ast.get_type(fields[1].ty), Type::Pointer { .. }));
        }
        other => panic!("expected record type, got {:?}", other),
    }
}

#[test]
fn abstract_parameters_get_complete_types() {
    let outcome = parse_clean("int f(int *, int [3]);");
    let f = outcome
        .scopes
        .lookup_symbol_from(outcome.scopes.root(), Symbol::new("f"), Namespace::Ordinary)
        .unwrap();
    match outcome.ast.get_type(outcome.scopes.symbol(f).ty) {
        Type::Function { params, .. } => {
            assert_eq!(outcome.ast.type_to_string(params[0]), "int *");
            assert_eq!(outcome.ast.type_to_string(params[1]), "int [3]");
        }
        other => panic!("expected function type, got {:?}", other),
    }
}

#[test]
fn variadic_function_declaration() {
    let outcome = parse_clean("int printf(char *fmt, ...);");
    assert_eq!(symbol_type_string(&outcome, "printf"), "int (char *, ...)");
    let decls = tu_decls(&outcome);
    match &outcome.ast.get_node(decls[0]).kind {
        NodeKind::FunctionDecl(data) => assert!(data.is_variadic),
        other => panic!("expected function declaration, got {:?}", other),
    }
}

#[test]
fn typedef_of_derived_type() {
    let outcome = parse_clean("typedef int (*Callback)(int); Callback cb;");
    let cb = outcome
        .scopes
        .lookup_symbol_from(outcome.scopes.root(), Symbol::new("cb"), Namespace::Ordinary)
        .unwrap();
    let resolved = outcome.ast.resolve_alias(outcome.scopes.symbol(cb).ty);
    assert_eq!(outcome.ast.type_to_string(resolved), "int (*)(int)");
}

#[test]
fn initializers_allow_nesting_and_trailing_comma() {
    let outcome = parse_clean("int a = 1; int b[2] = {1, 2,}; int c[2][2] = {{1, 2}, {3, 4}};");
    let decls = tu_decls(&outcome);
    match &outcome.ast.get_node(decls[2]).kind {
        NodeKind::VariableDecl(data) => {
            let init = data.init.expect("c has an initializer");
            match &outcome.ast.get_node(init).kind {
                NodeKind::InitializerList(items) => {
                    assert_eq!(items.len(), 2);
                    assert!(matches!(
                        outcome.ast.get_node(items[0]).kind,
                        NodeKind::InitializerList(_)
                    ));
                }
                other => panic!("expected initializer list, got {:?}", other),
            }
        }
        other => panic!("expected variable declaration, got {:?}", other),
    }
}

// --- specifier conflicts --------------------------------------------------

#[test]
fn conflicting_specifiers_are_rejected() {
    for source in [
        "long short x;",
        "long long long x;",
        "int int x;",
        "char int x;",
        "char short x;",
        "signed unsigned x;",
        "static extern int x;",
    ] {
        let outcome = parse(source);
        assert!(outcome.diag.has_errors(), "{:?} should be rejected", source);
    }
}

#[test]
fn integer_specifier_combinations_resolve() {
    let outcome = parse_clean(
        "unsigned u; signed s; unsigned int ui; long l; long long ll;\n\
         unsigned long long ull; short int si; signed char sc; unsigned char uc;",
    );
    assert_eq!(symbol_type_string(&outcome, "u"), "unsigned int");
    assert_eq!(symbol_type_string(&outcome, "s"), "int");
    assert_eq!(symbol_type_string(&outcome, "ui"), "unsigned int");
    assert_eq!(symbol_type_string(&outcome, "l"), "long");
    assert_eq!(symbol_type_string(&outcome, "ll"), "long long");
    assert_eq!(symbol_type_string(&outcome, "ull"), "unsigned long long");
    assert_eq!(symbol_type_string(&outcome, "si"), "short");
    assert_eq!(symbol_type_string(&outcome, "sc"), "char");
    assert_eq!(symbol_type_string(&outcome, "uc"), "unsigned char");
}

#[test]
fn duplicate_qualifier_warns_but_parses() {
    let outcome = parse("const const int x;");
    assert!(!outcome.diag.has_errors());
    assert!(!outcome.diag.diagnostics().is_empty());
    assert_eq!(symbol_type_string(&outcome, "x"), "const int");
}

#[test]
fn typedef_in_parameter_is_rejected() {
    let outcome = parse("int f(typedef int t);");
    assert!(outcome
        .diag
        .diagnostics()
        .iter()
        .any(|d| d.message.contains("typedef")));
    assert!(outcome.diag.has_errors());
}

#[test]
fn bad_bit_field_width_is_rejected() {
    let outcome = parse("struct S { int a : b; };");
    assert!(outcome.diag.has_errors());
}

#[test]
fn record_redefinition_is_rejected() {
    let outcome = parse("struct T { int x; }; struct T { int y; };");
    assert!(outcome.diag.has_errors());
}

#[test]
fn vla_star_is_rejected() {
    let outcome = parse("int f(int a[*]);");
    assert!(outcome.diag.has_errors());
}

// --- error recovery -------------------------------------------------------

#[test]
fn recovery_continues_after_broken_declaration() {
    let outcome = parse("int bad bad2; int good;");
    assert!(outcome.diag.has_errors());
    assert!(outcome
        .scopes
        .lookup_symbol_from(outcome.scopes.root(), Symbol::new("good"), Namespace::Ordinary)
        .is_some());
}

#[test]
fn recovery_at_statement_boundaries() {
    let outcome = parse("int main(void) { x + ; int z; z = 1; }");
    assert!(outcome.diag.has_errors());
    // The function still parsed and z was declared in its body.
    let decls = tu_decls(&outcome);
    assert!(matches!(
        outcome.ast.get_node(decls[0]).kind,
        NodeKind::FunctionDecl(_)
    ));
}

#[test]
fn recovery_inside_record_body() {
    let outcome = parse("struct S { int a : bad; int b; }; struct S s;");
    assert!(outcome.diag.has_errors());
    // b survived the broken field.
    let root = outcome.scopes.root();
    let ty = outcome
        .scopes
        .scope(root)
        .user_types
        .iter()
        .find(|e| e.name == Symbol::new("S"))
        .unwrap()
        .ty;
    match outcome.ast.get_type(ty) {
        Type::Record { fields, .. } => {
            assert!(fields.iter().any(|f| f.name == Symbol::new("b")));
        }
        other => panic!("expected record type, got {:?}", other),
    }
}

#[test]
fn stray_tokens_do_not_hang_the_parser() {
    let outcome = parse("} } ; int ok;");
    assert!(outcome.diag.has_errors());
    assert!(outcome
        .scopes
        .lookup_symbol_from(outcome.scopes.root(), Symbol::new("ok"), Namespace::Ordinary)
        .is_some());
}

// --- expressions ----------------------------------------------------------

fn expr_kind(ast: &Ast, node: NodeRef) -> &NodeKind {
    &ast.get_node(node).kind
}

#[test]
fn multiplicative_binds_tighter_than_additive() {
    let (ast, expr) = parse_expr("1 + 2 * 3");
    match expr_kind(&ast, expr) {
        NodeKind::BinaryOp(BinaryOp::Add, left, right) => {
            assert!(matches!(expr_kind(&ast, *left), NodeKind::LiteralInt(1)));
            assert!(matches!(
                expr_kind(&ast, *right),
                NodeKind::BinaryOp(BinaryOp::Mul, _, _)
            ));
        }
        other => panic!("expected addition at the top, got {:?}", other),
    }
}

#[test]
fn assignment_is_right_associative() {
    let (ast, expr) = parse_expr("a = b = c");
    match expr_kind(&ast, expr) {
        NodeKind::Assignment(AssignOp::Assign, _, right) => {
            assert!(matches!(
                expr_kind(&ast, *right),
                NodeKind::Assignment(AssignOp::Assign, _, _)
            ));
        }
        other => panic!("expected assignment at the top, got {:?}", other),
    }
}

#[test]
fn conditional_is_right_associative() {
    let (ast, expr) = parse_expr("a ? b : c ? d : e");
    match expr_kind(&ast, expr) {
        NodeKind::Conditional(_, _, else_branch) => {
            assert!(matches!(expr_kind(&ast, *else_branch), NodeKind::Conditional(..)));
        }
        other => panic!("expected conditional at the top, got {:?}", other),
    }
}

#[test]
fn comma_operator_vs_argument_separator() {
    let (ast, expr) = parse_expr("f(a, b)");
    match expr_kind(&ast, expr) {
        NodeKind::FunctionCall(_, args) => assert_eq!(args.len(), 2),
        other => panic!("expected call, got {:?}", other),
    }

    let (ast, expr) = parse_expr("(a, b)");
    assert!(matches!(
        expr_kind(&ast, expr),
        NodeKind::BinaryOp(BinaryOp::Comma, _, _)
    ));

    // Parentheses inside an argument list restore the comma operator.
    let (ast, expr) = parse_expr("f((a, b), c)");
    match expr_kind(&ast, expr) {
        NodeKind::FunctionCall(_, args) => {
            assert_eq!(args.len(), 2);
            assert!(matches!(
                expr_kind(&ast, args[0]),
                NodeKind::BinaryOp(BinaryOp::Comma, _, _)
            ));
        }
        other => panic!("expected call, got {:?}", other),
    }
}

#[test]
fn postfix_binds_tighter_than_prefix() {
    let (ast, expr) = parse_expr("*p++");
    match expr_kind(&ast, expr) {
        NodeKind::UnaryOp(UnaryOp::Deref, false, inner) => {
            assert!(matches!(
                expr_kind(&ast, *inner),
                NodeKind::UnaryOp(UnaryOp::Increment, true, _)
            ));
        }
        other => panic!("expected dereference at the top, got {:?}", other),
    }
}

#[test]
fn member_access_chains() {
    let (ast, expr) = parse_expr("a.b->c");
    match expr_kind(&ast, expr) {
        NodeKind::MemberAccess(inner, member, true) => {
            assert_eq!(*member, Symbol::new("c"));
            assert!(matches!(
                expr_kind(&ast, *inner),
                NodeKind::MemberAccess(_, _, false)
            ));
        }
        other => panic!("expected arrow access at the top, got {:?}", other),
    }
}

#[test]
fn subscripts_nest_left_to_right() {
    let (ast, expr) = parse_expr("m[i][j]");
    match expr_kind(&ast, expr) {
        NodeKind::IndexAccess(inner, _) => {
            assert!(matches!(expr_kind(&ast, *inner), NodeKind::IndexAccess(_, _)));
        }
        other => panic!("expected subscript at the top, got {:?}", other),
    }
}

#[test]
fn sizeof_type_vs_sizeof_expression() {
    let (ast, expr) = parse_expr("sizeof(int)");
    assert!(matches!(expr_kind(&ast, expr), NodeKind::SizeOfType(_)));

    let (ast, expr) = parse_expr("sizeof(x)");
    assert!(matches!(expr_kind(&ast, expr), NodeKind::SizeOfExpr(_)));

    let (ast, expr) = parse_expr("sizeof x");
    assert!(matches!(expr_kind(&ast, expr), NodeKind::SizeOfExpr(_)));
}

#[test]
fn cast_and_compound_literal() {
    let (ast, expr) = parse_expr("(int)x");
    match expr_kind(&ast, expr) {
        NodeKind::Cast(ty, _) => assert_eq!(ast.type_to_string(*ty), "int"),
        other => panic!("expected cast, got {:?}", other),
    }

    let (ast, expr) = parse_expr("(int){ 1 }");
    assert!(matches!(expr_kind(&ast, expr), NodeKind::CompoundLiteral(_, _)));
}

#[test]
fn logical_operators_nest_by_precedence() {
    let (ast, expr) = parse_expr("a || b && c");
    match expr_kind(&ast, expr) {
        NodeKind::BinaryOp(BinaryOp::LogicOr, _, right) => {
            assert!(matches!(
                expr_kind(&ast, *right),
                NodeKind::BinaryOp(BinaryOp::LogicAnd, _, _)
            ));
        }
        other => panic!("expected || at the top, got {:?}", other),
    }
}

#[test]
fn shift_vs_relational_precedence() {
    let (ast, expr) = parse_expr("a << b < c");
    // << binds tighter than <.
    match expr_kind(&ast, expr) {
        NodeKind::BinaryOp(BinaryOp::Less, left, _) => {
            assert!(matches!(
                expr_kind(&ast, *left),
                NodeKind::BinaryOp(BinaryOp::LeftShift, _, _)
            ));
        }
        other => panic!("expected < at the top, got {:?}", other),
    }
}

// --- statements -----------------------------------------------------------

fn body_items(outcome: &ParseOutcome) -> Vec<NodeRef> {
    let decls = tu_decls(outcome);
    let body = match &outcome.ast.get_node(*decls.last().unwrap()).kind {
        NodeKind::FunctionDecl(data) => data.body.expect("definition"),
        other => panic!("expected function, got {:?}", other),
    };
    match &outcome.ast.get_node(body).kind {
        NodeKind::CompoundStatement(stmt) => stmt.items.to_vec(),
        other => panic!("expected compound body, got {:?}", other),
    }
}

#[test]
fn all_statement_forms_parse() {
    let outcome = parse_clean(
        "int main(void) {\n\
             int n = 3;\n\
             if (n) n = 1; else n = 2;\n\
             while (n) n--;\n\
             do { n++; } while (n < 10);\n\
             switch (n) {\n\
                 case 1: n = 0; break;\n\
                 default: n = 9;\n\
             }\n\
             again: n += 1;\n\
             if (n < 20) goto again;\n\
             for (;;) { break; }\n\
             ;\n\
             return n;\n\
         }",
    );

    let items = body_items(&outcome);
    assert_eq!(items.len(), 10);
    assert!(matches!(outcome.ast.get_node(items[1]).kind, NodeKind::If(_)));
    assert!(matches!(outcome.ast.get_node(items[2]).kind, NodeKind::While(_)));
    assert!(matches!(outcome.ast.get_node(items[3]).kind, NodeKind::DoWhile(..)));
    assert!(matches!(outcome.ast.get_node(items[4]).kind, NodeKind::Switch(..)));
    assert!(matches!(outcome.ast.get_node(items[5]).kind, NodeKind::Label(..)));
    assert!(matches!(outcome.ast.get_node(items[7]).kind, NodeKind::For(_)));
    assert!(matches!(outcome.ast.get_node(items[8]).kind, NodeKind::EmptyStatement));
    assert!(matches!(outcome.ast.get_node(items[9]).kind, NodeKind::Return(_)));
}

#[test]
fn declaration_vs_expression_statement_backoff() {
    // `T * x;` is a declaration when T is a typedef name, and an
    // expression statement (multiplication) otherwise.
    let outcome = parse_clean("typedef int T; int main(void) { T *x; return 0; }");
    let items = body_items(&outcome);
    assert!(matches!(
        outcome.ast.get_node(items[0]).kind,
        NodeKind::DeclStatement(_)
    ));

    let outcome = parse_clean("int main(void) { int T = 1; int x = 2; T * x; return 0; }");
    let items = body_items(&outcome);
    assert!(matches!(
        outcome.ast.get_node(items[2]).kind,
        NodeKind::ExpressionStatement(_)
    ));
}

#[test]
fn local_typedef_shadows_in_inner_scope_only() {
    let outcome = parse_clean(
        "int main(void) {\n\
             typedef int Local;\n\
             Local a;\n\
             { Local b; }\n\
             return 0;\n\
         }",
    );
    let items = body_items(&outcome);
    assert!(matches!(
        outcome.ast.get_node(items[1]).kind,
        NodeKind::DeclStatement(_)
    ));
    // The typedef is registered in the function body's block scope, not
    // the translation unit.
    assert!(outcome
        .scopes
        .scope(outcome.scopes.root())
        .user_types
        .iter()
        .all(|e| e.name != Symbol::new("Local")));
}

#[test]
fn record_declared_in_block_attaches_to_statement() {
    let outcome = parse_clean("int main(void) { struct Local { int v; } l; l.v = 1; return 0; }");
    let items = body_items(&outcome);
    match &outcome.ast.get_node(items[0]).kind {
        NodeKind::DeclStatement(children) => {
            assert!(matches!(
                outcome.ast.get_node(children[0]).kind,
                NodeKind::RecordDecl(_)
            ));
            assert!(matches!(
                outcome.ast.get_node(children[1]).kind,
                NodeKind::VariableDecl(_)
            ));
        }
        other => panic!("expected declaration statement, got {:?}", other),
    }
}

#[test]
fn array_length_expressions_are_kept() {
    let outcome = parse_clean("int a[4]; int b[]; int c[2][3];");
    let root = outcome.scopes.root();
    let b = outcome
        .scopes
        .lookup_symbol_from(root, Symbol::new("b"), Namespace::Ordinary)
        .unwrap();
    match outcome.ast.get_type(outcome.scopes.symbol(b).ty) {
        Type::Array { lengths, .. } => {
            assert_eq!(lengths.len(), 1);
            assert!(lengths[0].is_none());
        }
        other => panic!("expected array type, got {:?}", other),
    }
    assert_eq!(symbol_type_string(&outcome, "b"), "int []");
}
