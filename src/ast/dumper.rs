//! Human-readable AST rendering, a diagnostic aid behind `--dump-ast`.

use super::nodes::*;
use super::{Ast, NodeKind, NodeRef};
use crate::scope::ScopeTree;

/// Renders the tree with two-space indentation, one node per line.
pub struct AstDumper<'a> {
    ast: &'a Ast,
    scopes: &'a ScopeTree,
    out: String,
    indent: usize,
}

impl<'a> AstDumper<'a> {
    pub fn new(ast: &'a Ast, scopes: &'a ScopeTree) -> Self {
        AstDumper {
            ast,
            scopes,
            out: String::new(),
            indent: 0,
        }
    }

    pub fn dump(mut self, root: NodeRef) -> String {
        self.dump_node(root);
        self.out
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn nested(&mut self, children: impl IntoIterator<Item = NodeRef>) {
        self.indent += 1;
        for child in children {
            self.dump_node(child);
        }
        self.indent -= 1;
    }

    fn symbol_text(&self, id: crate::scope::SymbolId) -> String {
        let entry = self.scopes.symbol(id);
        let ty = self.ast.type_to_string_with_name(entry.ty, entry.name);
        if entry.storage == StorageClass::None {
            ty
        } else {
            format!("{} {}", entry.storage, ty)
        }
    }

    fn dump_node(&mut self, node_ref: NodeRef) {
        let node = self.ast.get_node(node_ref).clone();
        match &node.kind {
            NodeKind::LiteralInt(v) => self.line(&format!("IntLiteral({})", v)),
            NodeKind::LiteralFloat(v) => self.line(&format!("FloatLiteral({})", v)),
            NodeKind::LiteralString(s) => self.line(&format!("StringLiteral(\"{}\")", s)),
            NodeKind::LiteralChar(c) => self.line(&format!("CharLiteral({:?})", *c as char)),
            NodeKind::Ident(name) => self.line(&format!("Ident({})", name)),
            NodeKind::UnaryOp(op, postfix, expr) => {
                let fixity = if *postfix { "postfix" } else { "prefix" };
                self.line(&format!("UnaryOp({} {})", fixity, op.symbol()));
                self.nested([*expr]);
            }
            NodeKind::BinaryOp(op, left, right) => {
                self.line(&format!("BinaryOp({})", op.symbol()));
                self.nested([*left, *right]);
            }
            NodeKind::Assignment(op, left, right) => {
                self.line(&format!("Assignment({})", op.symbol()));
                self.nested([*left, *right]);
            }
            NodeKind::Conditional(cond, then_expr, else_expr) => {
                self.line("Conditional");
                self.nested([*cond, *then_expr, *else_expr]);
            }
            NodeKind::FunctionCall(func, args) => {
                self.line("FunctionCall");
                let mut children = vec![*func];
                children.extend(args.iter().copied());
                self.nested(children);
            }
            NodeKind::MemberAccess(object, member, arrow) => {
                let op = if *arrow { "->" } else { "." };
                self.line(&format!("MemberAccess({}{})", op, member));
                self.nested([*object]);
            }
            NodeKind::IndexAccess(array, index) => {
                self.line("IndexAccess");
                self.nested([*array, *index]);
            }
            NodeKind::Cast(ty, expr) => {
                self.line(&format!("Cast({})", self.ast.type_to_string(*ty)));
                self.nested([*expr]);
            }
            NodeKind::CompoundLiteral(ty, init) => {
                self.line(&format!("CompoundLiteral({})", self.ast.type_to_string(*ty)));
                self.nested([*init]);
            }
            NodeKind::SizeOfExpr(expr) => {
                self.line("SizeofExpr");
                self.nested([*expr]);
            }
            NodeKind::SizeOfType(ty) => {
                self.line(&format!("SizeofType({})", self.ast.type_to_string(*ty)));
            }
            NodeKind::InitializerList(items) => {
                self.line("InitializerList");
                self.nested(items.iter().copied());
            }
            NodeKind::CompoundStatement(stmt) => {
                self.line("CompoundStmt");
                self.nested(stmt.items.iter().copied());
            }
            NodeKind::If(stmt) => {
                self.line("IfStmt");
                let mut children = vec![stmt.condition, stmt.then_branch];
                children.extend(stmt.else_branch);
                self.nested(children);
            }
            NodeKind::While(stmt) => {
                self.line("WhileStmt");
                self.nested([stmt.condition, stmt.body]);
            }
            NodeKind::DoWhile(body, cond) => {
                self.line("DoStmt");
                self.nested([*body, *cond]);
            }
            NodeKind::For(stmt) => {
                self.line("ForStmt");
                let mut children = Vec::new();
                children.extend(stmt.init);
                children.extend(stmt.condition);
                children.extend(stmt.step);
                children.push(stmt.body);
                self.nested(children);
            }
            NodeKind::Switch(cond, body) => {
                self.line("SwitchStmt");
                self.nested([*cond, *body]);
            }
            NodeKind::Case(expr, stmt) => {
                self.line("CaseStmt");
                self.nested([*expr, *stmt]);
            }
            NodeKind::Default(stmt) => {
                self.line("DefaultStmt");
                self.nested([*stmt]);
            }
            NodeKind::Label(label, stmt) => {
                self.line(&format!("LabelStmt({})", label));
                self.nested([*stmt]);
            }
            NodeKind::Goto(label) => self.line(&format!("Goto({})", label)),
            NodeKind::Break => self.line("BreakStmt"),
            NodeKind::Continue => self.line("ContinueStmt"),
            NodeKind::Return(expr) => {
                self.line("ReturnStmt");
                self.nested(expr.iter().copied());
            }
            NodeKind::ExpressionStatement(expr) => {
                self.line("ExprStmt");
                self.nested([*expr]);
            }
            NodeKind::EmptyStatement => self.line("EmptyStmt"),
            NodeKind::DeclStatement(items) => {
                self.line("DeclStmt");
                self.nested(items.iter().copied());
            }
            NodeKind::VariableDecl(data) => {
                self.line(&format!("VarDecl({})", self.symbol_text(data.symbol)));
                self.nested(data.init.iter().copied());
            }
            NodeKind::TypedefDecl(data) => {
                let entry = self.scopes.symbol(data.symbol);
                let referred = match self.ast.get_type(entry.ty) {
                    super::Type::Alias { referred, .. } => *referred,
                    _ => entry.ty,
                };
                self.line(&format!(
                    "TypedefDecl({} = {})",
                    data.name,
                    self.ast.type_to_string(referred)
                ));
            }
            NodeKind::FunctionDecl(data) => {
                let inline = if data.is_inline { "inline " } else { "" };
                self.line(&format!("FuncDecl({}{})", inline, self.symbol_text(data.symbol)));
                let mut children: Vec<NodeRef> = data.params.to_vec();
                children.extend(data.body);
                self.nested(children);
            }
            NodeKind::RecordDecl(data) => {
                let keyword = match self.ast.get_type(data.ty) {
                    super::Type::Record { is_union: true, .. } => "union",
                    _ => "struct",
                };
                let suffix = if data.is_definition { "" } else { " forward" };
                self.line(&format!("RecordDecl({} {}{})", keyword, data.tag, suffix));
                self.nested(data.fields.iter().copied());
            }
            NodeKind::EnumDecl(data) => {
                let suffix = if data.is_definition { "" } else { " forward" };
                self.line(&format!("EnumDecl(enum {}{})", data.tag, suffix));
                self.nested(data.enumerators.iter().copied());
            }
            NodeKind::FieldDecl(data) => {
                let rendered = self.ast.type_to_string_with_name(data.ty, data.name);
                self.line(&format!("FieldDecl({})", rendered));
                self.nested(data.bit_width.iter().copied());
            }
            NodeKind::EnumeratorDecl(data) => {
                match data.value {
                    Some(value) => self.line(&format!("Enumerator({} = {})", data.name, value)),
                    None => self.line(&format!("Enumerator({})", data.name)),
                }
                self.nested(data.init.iter().copied());
            }
            NodeKind::ParamDecl(data) => {
                self.line(&format!("ParamDecl({})", self.symbol_text(data.symbol)));
            }
            NodeKind::TranslationUnit(data) => {
                self.line("TranslationUnit");
                self.nested(data.decls.iter().copied());
            }
        }
    }
}
