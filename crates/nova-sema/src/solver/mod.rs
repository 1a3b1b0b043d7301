//! Type/reference solver: a walk over the unit that records a type for
//! every expression and type reference and a symbol for every name.
//!
//! Declarations are completed through the second pass; bodies are walked
//! here. Expressions whose type needs a target (lambdas, method
//! references, diamond instantiations, under-constrained generic calls)
//! are first typed as deferred and fixed once the target is known, see
//! [`deferred`].

mod annotations;
mod deferred;
mod expressions;
mod types;

use crate::context::Sema;
use crate::ids::{NodeId, SymbolId, TypeId};
use crate::symbols::SymbolKind;
use crate::tree::{Name, NodeKind};
use crate::types::{Primitive, TypeKind};

/// What a name denotes before it is used: the qualifier of a member
/// select can be a package, a type (static access) or a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Site {
    Package(SymbolId),
    Type(TypeId),
    Value(TypeId),
}

impl<'a> Sema<'a> {
    /// Completes every declaration of the unit and types every body.
    /// Stops early once a fatal error is recorded.
    pub(crate) fn attribute_unit(&mut self) {
        let tree = self.tree();
        let NodeKind::CompilationUnit { types, .. } = tree.kind(tree.root()) else {
            return;
        };
        for class in types {
            self.attribute_class(*class);
            if self.fatal.is_some() {
                return;
            }
        }
    }

    pub(crate) fn attribute_class(&mut self, node: NodeId) {
        let tree = self.tree();
        let NodeKind::Class(decl) = tree.kind(node) else {
            return;
        };
        let Some(class) = self.symbol_of_node(node) else {
            return;
        };
        self.complete(class);
        for param in &decl.type_params {
            if let Some(variable) = self.symbol_of_node(*param) {
                self.complete(variable);
            }
        }
        for member in &decl.members {
            self.attribute_member(*member);
            if self.fatal.is_some() {
                return;
            }
        }
    }

    fn attribute_member(&mut self, node: NodeId) {
        let tree = self.tree();
        match tree.kind(node) {
            NodeKind::Class(_) => self.attribute_class(node),
            NodeKind::Method(decl) => {
                let Some(method) = self.symbol_of_node(node) else {
                    return;
                };
                self.complete(method);
                for param in &decl.type_params {
                    if let Some(variable) = self.symbol_of_node(*param) {
                        self.complete(variable);
                    }
                }
                let result = self.return_type(method);
                for param in self.parameters(method) {
                    self.complete(param);
                }
                if let Some(body) = decl.body {
                    self.attribute_statement(body, result);
                }
            }
            NodeKind::Variable(decl) => {
                let Some(field) = self.symbol_of_node(node) else {
                    return;
                };
                let ty = self.type_of_symbol(field);
                if let Some(init) = decl.initializer {
                    self.attribute_expression(init, Some(ty));
                }
            }
            NodeKind::EnumConstant { args, body, .. } => {
                let Some(constant) = self.symbol_of_node(node) else {
                    return;
                };
                let enum_type = self.type_of_symbol(constant);
                let env = self.env_of(node);
                let arg_types: Vec<TypeId> = args.iter().map(|arg| self.expression_type(*arg)).collect();
                let res = self.find_constructor(env, enum_type, &arg_types, &[]);
                match res.symbol {
                    Ok(constructor) => {
                        self.add_usage(constructor, node);
                        self.resolve_deferred_arguments(res.ty, constructor, args, &arg_types);
                    }
                    Err(_) => {
                        for arg in args {
                            self.attribute_expression(*arg, None);
                        }
                    }
                }
                if let Some(body) = body {
                    self.attribute_class(*body);
                }
            }
            NodeKind::Initializer { body, .. } => self.attribute_statement(*body, None),
            _ => {}
        }
    }

    /// Types a statement; `result` is the declared result of the enclosing
    /// method or lambda, the target of `return` expressions.
    pub(crate) fn attribute_statement(&mut self, node: NodeId, result: Option<TypeId>) {
        let tree = self.tree();
        let boolean = self.wk.primitive(Primitive::Boolean);
        match tree.kind(node) {
            NodeKind::Block(statements) => {
                for statement in statements {
                    self.attribute_statement(*statement, result);
                }
            }
            NodeKind::Variable(decl) => {
                let Some(variable) = self.symbol_of_node(node) else {
                    return;
                };
                let ty = self.type_of_symbol(variable);
                if let Some(init) = decl.initializer {
                    self.attribute_expression(init, Some(ty));
                }
            }
            NodeKind::Class(_) => self.attribute_class(node),
            NodeKind::Empty => {}
            NodeKind::ExpressionStatement(expr) => {
                self.attribute_expression(*expr, None);
            }
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.attribute_expression(*cond, Some(boolean));
                self.attribute_statement(*then_branch, result);
                if let Some(else_branch) = else_branch {
                    self.attribute_statement(*else_branch, result);
                }
            }
            NodeKind::While { cond, body } | NodeKind::DoWhile { body, cond } => {
                self.attribute_expression(*cond, Some(boolean));
                self.attribute_statement(*body, result);
            }
            NodeKind::For {
                init,
                cond,
                update,
                body,
            } => {
                for child in init {
                    self.attribute_statement(*child, result);
                }
                if let Some(cond) = cond {
                    self.attribute_expression(*cond, Some(boolean));
                }
                for child in update {
                    self.attribute_expression(*child, None);
                }
                self.attribute_statement(*body, result);
            }
            NodeKind::ForEach {
                variable,
                iterable,
                body,
            } => {
                self.attribute_expression(*iterable, None);
                self.attribute_statement(*variable, result);
                self.attribute_statement(*body, result);
            }
            NodeKind::Labeled { body, .. } => self.attribute_statement(*body, result),
            NodeKind::Break(Some(label)) | NodeKind::Continue(Some(label)) => {
                self.resolve_label(node, label);
            }
            NodeKind::Break(None) | NodeKind::Continue(None) => {}
            NodeKind::Return(expr) => {
                if let Some(expr) = expr {
                    let target = result.filter(|ty| !matches!(self.ty(*ty), TypeKind::Void));
                    self.attribute_expression(*expr, target);
                }
            }
            NodeKind::Throw(expr) => {
                self.attribute_expression(*expr, None);
            }
            NodeKind::Switch { selector, cases } => {
                let selector_type = self.attribute_expression(*selector, None);
                for case in cases {
                    let NodeKind::Case { labels, body } = tree.kind(*case) else {
                        continue;
                    };
                    for label in labels {
                        self.attribute_case_label(*label, selector_type);
                    }
                    for statement in body {
                        self.attribute_statement(*statement, result);
                    }
                }
            }
            NodeKind::Try {
                resources,
                block,
                catches,
                finally,
            } => {
                for resource in resources {
                    self.attribute_statement(*resource, result);
                }
                self.attribute_statement(*block, result);
                for catch in catches {
                    self.attribute_statement(*catch, result);
                }
                if let Some(finally) = finally {
                    self.attribute_statement(*finally, result);
                }
            }
            NodeKind::Catch { parameter, block } => {
                self.attribute_statement(*parameter, result);
                self.attribute_statement(*block, result);
            }
            NodeKind::Synchronized { lock, body } => {
                self.attribute_expression(*lock, None);
                self.attribute_statement(*body, result);
            }
            NodeKind::Assert { cond, detail } => {
                self.attribute_expression(*cond, Some(boolean));
                if let Some(detail) = detail {
                    self.attribute_expression(*detail, None);
                }
            }
            _ => {
                self.attribute_expression(node, None);
            }
        }
    }

    /// Enum switch labels name constants of the selector's enum without
    /// qualification.
    fn attribute_case_label(&mut self, label: NodeId, selector_type: TypeId) {
        let tree = self.tree();
        let enum_symbol = self.type_symbol(selector_type);
        if let NodeKind::Identifier(name) = tree.kind(label) {
            if !self.is_unknown_symbol(enum_symbol) && self.is_enum(enum_symbol) {
                let mut constant = None;
                if let Some(members) = self.members(enum_symbol) {
                    for symbol in self.lookup_local(members, name) {
                        if self.kind(symbol) == SymbolKind::Variable {
                            constant = Some(symbol);
                            break;
                        }
                    }
                }
                if let Some(constant) = constant {
                    self.associate_symbol(label, constant);
                    self.add_usage(constant, label);
                    self.register_type(label, selector_type);
                    return;
                }
            }
        }
        self.attribute_expression(label, Some(selector_type));
    }

    fn resolve_label(&mut self, node: NodeId, label: &Name) {
        let env = self.env_of(node);
        let scope = self.env(env).scope;
        let symbol = self
            .lookup(scope, label)
            .into_iter()
            .find(|symbol| self.kind(*symbol) == SymbolKind::Label);
        if let Some(symbol) = symbol {
            self.associate_symbol(node, symbol);
            self.add_usage(symbol, node);
        }
    }
}

#[cfg(test)]
mod tests {
    use nova_classpath::InMemoryClasspath;
    use pretty_assertions::assert_eq;

    use crate::context::test_support::sema;
    use crate::tree::{ClassDecl, ClassKind, MethodDecl, NodeKind, TreeBuilder};

    #[test]
    fn labels_resolve_to_their_statement() {
        let mut b = TreeBuilder::new();
        let brk = b.add(NodeKind::Break(Some("outer".into())));
        let body = b.block(vec![brk]);
        let cond = b.literal(crate::tree::LiteralKind::Boolean, "true");
        let lp = b.add(NodeKind::While { cond, body });
        let labeled = b.add(NodeKind::Labeled {
            label: "outer".into(),
            body: lp,
        });
        let block = b.block(vec![labeled]);
        let void = b.void();
        let run = b.method(MethodDecl::new("run", Some(void)).body(block));
        let class = b.class(ClassDecl::new(ClassKind::Class, "Loop").members(vec![run]));
        let unit = b.unit(None, vec![], vec![class]);
        let tree = b.finish(unit);

        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        sema.enter_unit();
        sema.attribute_unit();
        let label = sema.symbol_of_node(labeled).unwrap();
        assert_eq!(sema.symbol_of_node(brk), Some(label));
        assert_eq!(sema.usages(label), &[brk]);
    }
}
