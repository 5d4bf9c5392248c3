//! Visitor over the AST.
//!
//! Every node variant gets an enter and an exit callback; returning `false`
//! from the enter callback prunes the node's children. Analyses keep their
//! own state in the visitor value and navigate scopes independently through
//! the owner pointers stored on compound, function, record and for nodes.

use super::nodes::*;
use super::{Ast, NodeRef, Symbol, TypeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStage {
    Enter,
    Exit,
}

/// Callbacks for each node variant. All default to "keep walking".
#[allow(unused_variables)]
pub trait AstVisitor {
    fn visit_literal_int(&mut self, ast: &Ast, node: NodeRef, value: i64, stage: WalkStage) -> bool { true }
    fn visit_literal_float(&mut self, ast: &Ast, node: NodeRef, value: f64, stage: WalkStage) -> bool { true }
    fn visit_literal_string(&mut self, ast: &Ast, node: NodeRef, value: Symbol, stage: WalkStage) -> bool { true }
    fn visit_literal_char(&mut self, ast: &Ast, node: NodeRef, value: u8, stage: WalkStage) -> bool { true }
    fn visit_ident(&mut self, ast: &Ast, node: NodeRef, name: Symbol, stage: WalkStage) -> bool { true }
    fn visit_unary_op(&mut self, ast: &Ast, node: NodeRef, op: UnaryOp, postfix: bool, stage: WalkStage) -> bool { true }
    fn visit_binary_op(&mut self, ast: &Ast, node: NodeRef, op: BinaryOp, stage: WalkStage) -> bool { true }
    fn visit_assignment(&mut self, ast: &Ast, node: NodeRef, op: AssignOp, stage: WalkStage) -> bool { true }
    fn visit_conditional(&mut self, ast: &Ast, node: NodeRef, stage: WalkStage) -> bool { true }
    fn visit_function_call(&mut self, ast: &Ast, node: NodeRef, stage: WalkStage) -> bool { true }
    fn visit_member_access(&mut self, ast: &Ast, node: NodeRef, member: Symbol, arrow: bool, stage: WalkStage) -> bool { true }
    fn visit_index_access(&mut self, ast: &Ast, node: NodeRef, stage: WalkStage) -> bool { true }
    fn visit_cast(&mut self, ast: &Ast, node: NodeRef, ty: TypeRef, stage: WalkStage) -> bool { true }
    fn visit_compound_literal(&mut self, ast: &Ast, node: NodeRef, ty: TypeRef, stage: WalkStage) -> bool { true }
    fn visit_sizeof_expr(&mut self, ast: &Ast, node: NodeRef, stage: WalkStage) -> bool { true }
    fn visit_sizeof_type(&mut self, ast: &Ast, node: NodeRef, ty: TypeRef, stage: WalkStage) -> bool { true }
    fn visit_initializer_list(&mut self, ast: &Ast, node: NodeRef, stage: WalkStage) -> bool { true }

    fn visit_compound_statement(&mut self, ast: &Ast, node: NodeRef, stmt: &CompoundStmt, stage: WalkStage) -> bool { true }
    fn visit_if(&mut self, ast: &Ast, node: NodeRef, stmt: &IfStmt, stage: WalkStage) -> bool { true }
    fn visit_while(&mut self, ast: &Ast, node: NodeRef, stmt: &WhileStmt, stage: WalkStage) -> bool { true }
    fn visit_do_while(&mut self, ast: &Ast, node: NodeRef, stage: WalkStage) -> bool { true }
    fn visit_for(&mut self, ast: &Ast, node: NodeRef, stmt: &ForStmt, stage: WalkStage) -> bool { true }
    fn visit_switch(&mut self, ast: &Ast, node: NodeRef, stage: WalkStage) -> bool { true }
    fn visit_case(&mut self, ast: &Ast, node: NodeRef, stage: WalkStage) -> bool { true }
    fn visit_default(&mut self, ast: &Ast, node: NodeRef, stage: WalkStage) -> bool { true }
    fn visit_label(&mut self, ast: &Ast, node: NodeRef, label: Symbol, stage: WalkStage) -> bool { true }
    fn visit_goto(&mut self, ast: &Ast, node: NodeRef, label: Symbol, stage: WalkStage) -> bool { true }
    fn visit_break(&mut self, ast: &Ast, node: NodeRef, stage: WalkStage) -> bool { true }
    fn visit_continue(&mut self, ast: &Ast, node: NodeRef, stage: WalkStage) -> bool { true }
    fn visit_return(&mut self, ast: &Ast, node: NodeRef, stage: WalkStage) -> bool { true }
    fn visit_expression_statement(&mut self, ast: &Ast, node: NodeRef, stage: WalkStage) -> bool { true }
    fn visit_empty_statement(&mut self, ast: &Ast, node: NodeRef, stage: WalkStage) -> bool { true }
    fn visit_decl_statement(&mut self, ast: &Ast, node: NodeRef, stage: WalkStage) -> bool { true }

    fn visit_variable_decl(&mut self, ast: &Ast, node: NodeRef, data: &VariableDeclData, stage: WalkStage) -> bool { true }
    fn visit_typedef_decl(&mut self, ast: &Ast, node: NodeRef, data: &TypedefDeclData, stage: WalkStage) -> bool { true }
    fn visit_function_decl(&mut self, ast: &Ast, node: NodeRef, data: &FunctionDeclData, stage: WalkStage) -> bool { true }
    fn visit_record_decl(&mut self, ast: &Ast, node: NodeRef, data: &RecordDeclData, stage: WalkStage) -> bool { true }
    fn visit_enum_decl(&mut self, ast: &Ast, node: NodeRef, data: &EnumDeclData, stage: WalkStage) -> bool { true }
    fn visit_field_decl(&mut self, ast: &Ast, node: NodeRef, data: &FieldDeclData, stage: WalkStage) -> bool { true }
    fn visit_enumerator_decl(&mut self, ast: &Ast, node: NodeRef, data: &EnumeratorDeclData, stage: WalkStage) -> bool { true }
    fn visit_param_decl(&mut self, ast: &Ast, node: NodeRef, data: &ParamDeclData, stage: WalkStage) -> bool { true }

    fn visit_translation_unit(&mut self, ast: &Ast, node: NodeRef, data: &TranslationUnitData, stage: WalkStage) -> bool { true }
}

fn dispatch<V: AstVisitor>(visitor: &mut V, ast: &Ast, node_ref: NodeRef, stage: WalkStage) -> bool {
    let node = ast.get_node(node_ref);
    match &node.kind {
        NodeKind::LiteralInt(v) => visitor.visit_literal_int(ast, node_ref, *v, stage),
        NodeKind::LiteralFloat(v) => visitor.visit_literal_float(ast, node_ref, *v, stage),
        NodeKind::LiteralString(v) => visitor.visit_literal_string(ast, node_ref, *v, stage),
        NodeKind::LiteralChar(v) => visitor.visit_literal_char(ast, node_ref, *v, stage),
        NodeKind::Ident(name) => visitor.visit_ident(ast, node_ref, *name, stage),
        NodeKind::UnaryOp(op, postfix, _) => visitor.visit_unary_op(ast, node_ref, *op, *postfix, stage),
        NodeKind::BinaryOp(op, _, _) => visitor.visit_binary_op(ast, node_ref, *op, stage),
        NodeKind::Assignment(op, _, _) => visitor.visit_assignment(ast, node_ref, *op, stage),
        NodeKind::Conditional(..) => visitor.visit_conditional(ast, node_ref, stage),
        NodeKind::FunctionCall(..) => visitor.visit_function_call(ast, node_ref, stage),
        NodeKind::MemberAccess(_, member, arrow) => visitor.visit_member_access(ast, node_ref, *member, *arrow, stage),
        NodeKind::IndexAccess(..) => visitor.visit_index_access(ast, node_ref, stage),
        NodeKind::Cast(ty, _) => visitor.visit_cast(ast, node_ref, *ty, stage),
        NodeKind::CompoundLiteral(ty, _) => visitor.visit_compound_literal(ast, node_ref, *ty, stage),
        NodeKind::SizeOfExpr(_) => visitor.visit_sizeof_expr(ast, node_ref, stage),
        NodeKind::SizeOfType(ty) => visitor.visit_sizeof_type(ast, node_ref, *ty, stage),
        NodeKind::InitializerList(_) => visitor.visit_initializer_list(ast, node_ref, stage),
        NodeKind::CompoundStatement(stmt) => visitor.visit_compound_statement(ast, node_ref, stmt, stage),
        NodeKind::If(stmt) => visitor.visit_if(ast, node_ref, stmt, stage),
        NodeKind::While(stmt) => visitor.visit_while(ast, node_ref, stmt, stage),
        NodeKind::DoWhile(..) => visitor.visit_do_while(ast, node_ref, stage),
        NodeKind::For(stmt) => visitor.visit_for(ast, node_ref, stmt, stage),
        NodeKind::Switch(..) => visitor.visit_switch(ast, node_ref, stage),
        NodeKind::Case(..) => visitor.visit_case(ast, node_ref, stage),
        NodeKind::Default(_) => visitor.visit_default(ast, node_ref, stage),
        NodeKind::Label(label, _) => visitor.visit_label(ast, node_ref, *label, stage),
        NodeKind::Goto(label) => visitor.visit_goto(ast, node_ref, *label, stage),
        NodeKind::Break => visitor.visit_break(ast, node_ref, stage),
        NodeKind::Continue => visitor.visit_continue(ast, node_ref, stage),
        NodeKind::Return(_) => visitor.visit_return(ast, node_ref, stage),
        NodeKind::ExpressionStatement(_) => visitor.visit_expression_statement(ast, node_ref, stage),
        NodeKind::EmptyStatement => visitor.visit_empty_statement(ast, node_ref, stage),
        NodeKind::DeclStatement(_) => visitor.visit_decl_statement(ast, node_ref, stage),
        NodeKind::VariableDecl(data) => visitor.visit_variable_decl(ast, node_ref, data, stage),
        NodeKind::TypedefDecl(data) => visitor.visit_typedef_decl(ast, node_ref, data, stage),
        NodeKind::FunctionDecl(data) => visitor.visit_function_decl(ast, node_ref, data, stage),
        NodeKind::RecordDecl(data) => visitor.visit_record_decl(ast, node_ref, data, stage),
        NodeKind::EnumDecl(data) => visitor.visit_enum_decl(ast, node_ref, data, stage),
        NodeKind::FieldDecl(data) => visitor.visit_field_decl(ast, node_ref, data, stage),
        NodeKind::EnumeratorDecl(data) => visitor.visit_enumerator_decl(ast, node_ref, data, stage),
        NodeKind::ParamDecl(data) => visitor.visit_param_decl(ast, node_ref, data, stage),
        NodeKind::TranslationUnit(data) => visitor.visit_translation_unit(ast, node_ref, data, stage),
    }
}

/// Children of a node, in source order.
pub fn node_children(ast: &Ast, node_ref: NodeRef) -> Vec<NodeRef> {
    let node = ast.get_node(node_ref);
    match &node.kind {
        NodeKind::UnaryOp(_, _, expr)
        | NodeKind::Cast(_, expr)
        | NodeKind::CompoundLiteral(_, expr)
        | NodeKind::SizeOfExpr(expr)
        | NodeKind::MemberAccess(expr, _, _)
        | NodeKind::Default(expr)
        | NodeKind::Label(_, expr)
        | NodeKind::ExpressionStatement(expr) => vec![*expr],
        NodeKind::BinaryOp(_, left, right)
        | NodeKind::Assignment(_, left, right)
        | NodeKind::IndexAccess(left, right)
        | NodeKind::DoWhile(left, right)
        | NodeKind::Switch(left, right)
        | NodeKind::Case(left, right) => vec![*left, *right],
        NodeKind::Conditional(cond, then_expr, else_expr) => vec![*cond, *then_expr, *else_expr],
        NodeKind::FunctionCall(func, args) => {
            let mut children = vec![*func];
            children.extend(args.iter().copied());
            children
        }
        NodeKind::InitializerList(items) | NodeKind::DeclStatement(items) => items.to_vec(),
        NodeKind::CompoundStatement(stmt) => stmt.items.to_vec(),
        NodeKind::If(stmt) => {
            let mut children = vec![stmt.condition, stmt.then_branch];
            children.extend(stmt.else_branch);
            children
        }
        NodeKind::While(stmt) => vec![stmt.condition, stmt.body],
        NodeKind::For(stmt) => {
            let mut children = Vec::new();
            children.extend(stmt.init);
            children.extend(stmt.condition);
            children.extend(stmt.step);
            children.push(stmt.body);
            children
        }
        NodeKind::Return(expr) => expr.iter().copied().collect(),
        NodeKind::VariableDecl(data) => data.init.iter().copied().collect(),
        NodeKind::FunctionDecl(data) => {
            let mut children: Vec<NodeRef> = data.params.to_vec();
            children.extend(data.body);
            children
        }
        NodeKind::RecordDecl(data) => data.fields.to_vec(),
        NodeKind::EnumDecl(data) => data.enumerators.to_vec(),
        NodeKind::FieldDecl(data) => data.bit_width.iter().copied().collect(),
        NodeKind::EnumeratorDecl(data) => data.init.iter().copied().collect(),
        NodeKind::TranslationUnit(data) => data.decls.to_vec(),
        _ => Vec::new(),
    }
}

/// Walk a subtree: enter, children (unless pruned), exit.
pub fn walk<V: AstVisitor>(visitor: &mut V, ast: &Ast, node_ref: NodeRef) {
    let descend = dispatch(visitor, ast, node_ref, WalkStage::Enter);
    if descend {
        for child in node_children(ast, node_ref) {
            walk(visitor, ast, child);
        }
    }
    dispatch(visitor, ast, node_ref, WalkStage::Exit);
}
