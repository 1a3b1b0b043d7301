//! Deferred types: lambdas, method references, `new C<>()` and generic
//! calls whose type variables the arguments left open. Typing them is two
//! phases; a placeholder first, then the real type once the target (the
//! formal parameter, the declared variable, the return type) is known.

use crate::context::Sema;
use crate::ids::{NodeId, SymbolId, TypeId};
use crate::symbols::{Completion, SymbolKind};
use crate::tree::NodeKind;
use crate::types::{Deferred, TypeKind};

impl<'a> Sema<'a> {
    pub(crate) fn resolve_deferred(&mut self, node: NodeId, deferred: Deferred, target: TypeId) -> TypeId {
        if let Deferred::Uninferred(partial) = deferred {
            return self.infer_uninferred(partial, target);
        }
        let tree = self.tree();
        match tree.kind(node) {
            NodeKind::Parenthesized(inner) => self.attribute_expression(*inner, Some(target)),
            NodeKind::Conditional {
                then_expr, else_expr, ..
            } => {
                let then_type = self.attribute_expression(*then_expr, Some(target));
                let else_type = self.attribute_expression(*else_expr, Some(target));
                self.conditional_type(then_type, else_type)
            }
            NodeKind::Lambda { .. } => self.attribute_lambda(node, Some(target)),
            NodeKind::MethodReference { .. } => {
                let env = self.env_of(node);
                let sam_args = self.find_sam_method_args(target);
                let res = self.find_method_reference(env, &sam_args, node);
                if let Ok(method) = res.symbol {
                    self.associate_symbol(node, method);
                    self.add_usage(method, node);
                }
                target
            }
            NodeKind::NewClass { .. } => self.infer_diamond(node, target),
            _ => self.standalone_expression(node, deferred),
        }
    }

    /// Type of a deferred expression that has no target: lambda bodies are
    /// still typed, open type variables are erased.
    pub(crate) fn standalone_expression(&mut self, node: NodeId, deferred: Deferred) -> TypeId {
        if let Deferred::Uninferred(partial) = deferred {
            return self.erase_open_variables(partial);
        }
        let tree = self.tree();
        match tree.kind(node) {
            NodeKind::Parenthesized(inner) => self.attribute_expression(*inner, None),
            NodeKind::Conditional {
                then_expr, else_expr, ..
            } => {
                let then_type = self.attribute_expression(*then_expr, None);
                let else_type = self.attribute_expression(*else_expr, None);
                self.conditional_type(then_type, else_type)
            }
            NodeKind::Lambda { .. } => {
                self.attribute_lambda(node, None);
                self.wk.unknown_type
            }
            NodeKind::NewClass { .. } => self.erased_diamond(node),
            _ => self.wk.unknown_type,
        }
    }

    /// Erasure fallback for a deferred type nothing constrains; other types
    /// are returned unchanged.
    pub(crate) fn standalone_type(&mut self, ty: TypeId) -> TypeId {
        match *self.ty(ty) {
            TypeKind::Deferred(Deferred::Uninferred(partial)) => self.erase_open_variables(partial),
            TypeKind::Deferred(Deferred::Node(node)) => match self.tree().kind(node) {
                NodeKind::NewClass { .. } => self.erased_diamond(node),
                _ => self.wk.unknown_type,
            },
            _ => ty,
        }
    }

    /// `new C<>()` without a target: each type variable becomes its
    /// erasure.
    fn erased_diamond(&mut self, node: NodeId) -> TypeId {
        let class = self.diamond_class(node);
        if self.is_unknown_symbol(class) {
            return self.wk.unknown_type;
        }
        let variables = self.type_variables(class);
        let erased = self.erasure_substitution(&variables);
        let identity = self.identity_parameterization(class);
        self.apply_substitution(identity, &erased)
    }

    fn diamond_class(&mut self, node: NodeId) -> SymbolId {
        let tree = self.tree();
        let NodeKind::NewClass { ty, .. } = tree.kind(node) else {
            return self.wk.unknown_symbol;
        };
        let class_type = self.resolve_type(*ty);
        self.type_symbol(class_type)
    }

    /// `new C<>(..)` assigned to `target`: the class type variables are
    /// read off the target's view of `C`.
    fn infer_diamond(&mut self, node: NodeId, target: TypeId) -> TypeId {
        let class = self.diamond_class(node);
        if self.is_unknown_symbol(class) {
            return self.wk.unknown_type;
        }
        let target = self.boxed(target);
        let target = self.function_type(target);
        let target_symbol = self.type_symbol(target);
        let identity = self.identity_parameterization(class);
        let Some(view) = self.as_super(identity, target_symbol) else {
            return self.erased_diamond(node);
        };
        let variables = self.type_variables(class);
        let mut substitution = self.infer_from_target(&variables, view, target);
        for variable in &variables {
            if substitution.substituted_type(*variable).is_none() {
                let erased = self.erasure(*variable);
                substitution.add(*variable, erased);
            }
        }
        self.apply_substitution(identity, &substitution)
    }

    /// A generic call result: the remaining method type variables are
    /// inferred from the target, anything still open is erased.
    fn infer_uninferred(&mut self, partial: TypeId, target: TypeId) -> TypeId {
        let mut variables = Vec::new();
        self.open_method_variables(partial, &mut variables);
        let target = self.boxed(target);
        let substitution = self.infer_from_target(&variables, partial, target);
        let ty = self.apply_substitution(partial, &substitution);
        self.erase_open_variables(ty)
    }

    fn erase_open_variables(&mut self, ty: TypeId) -> TypeId {
        let mut variables = Vec::new();
        self.open_method_variables(ty, &mut variables);
        if variables.is_empty() {
            return ty;
        }
        let erased = self.erasure_substitution(&variables);
        self.apply_substitution(ty, &erased)
    }

    /// Type variables of generic methods still mentioned by `ty`.
    fn open_method_variables(&self, ty: TypeId, variables: &mut Vec<TypeId>) {
        match self.ty(ty) {
            TypeKind::TypeVar(symbol) => {
                let owner = self.owner(*symbol);
                let open = owner.is_some_and(|owner| self.kind(owner) == SymbolKind::Method);
                if open && !variables.contains(&ty) {
                    variables.push(ty);
                }
            }
            TypeKind::Array(element) => self.open_method_variables(*element, variables),
            TypeKind::Wildcard { bound, .. } => self.open_method_variables(*bound, variables),
            TypeKind::Parameterized { substitution, .. } => {
                let args: Vec<TypeId> = substitution.substituted_types().collect();
                for arg in args {
                    self.open_method_variables(arg, variables);
                }
            }
            _ => {}
        }
    }

    /// Types a lambda against its functional interface: implicitly typed
    /// parameters take the function type's parameters, the body is typed
    /// with its result as target. Returns the target, or unknown.
    fn attribute_lambda(&mut self, node: NodeId, target: Option<TypeId>) -> TypeId {
        let tree = self.tree();
        let NodeKind::Lambda { params, body } = tree.kind(node) else {
            return self.wk.unknown_type;
        };
        let sam_args = match target {
            Some(target) => self.find_sam_method_args(target),
            None => Vec::new(),
        };
        for (index, param) in params.iter().enumerate() {
            let Some(symbol) = self.symbol_of_node(*param) else {
                continue;
            };
            let implicit = matches!(
                tree.kind(*param),
                NodeKind::Variable(decl) if matches!(tree.kind(decl.ty), NodeKind::InferredType)
            );
            if implicit {
                let ty = sam_args.get(index).copied().unwrap_or(self.wk.unknown_type);
                self.set_symbol_type(symbol, ty);
                self.symbol_mut(symbol).completion = Completion::Completed;
            } else {
                self.complete(symbol);
            }
        }
        let result = target.and_then(|target| self.sam_return_type(target));
        if matches!(tree.kind(*body), NodeKind::Block(_)) {
            self.attribute_statement(*body, result);
        } else {
            let result = result.filter(|ty| !matches!(self.ty(*ty), TypeKind::Void));
            self.attribute_expression(*body, result);
        }
        target.unwrap_or(self.wk.unknown_type)
    }

    /// Result of the function type of `target`, seen through its type
    /// arguments.
    fn sam_return_type(&mut self, target: TypeId) -> Option<TypeId> {
        let method = self.sam_method(target)?;
        let result = self.return_type(method)?;
        let function = self.function_type(target);
        let site = match self.owner(method) {
            Some(owner) => self.as_super(function, owner).unwrap_or(function),
            None => function,
        };
        let result = self.apply_site_substitution(result, site);
        Some(match self.ty(result) {
            TypeKind::Wildcard { bound, .. } => *bound,
            _ => result,
        })
    }
}

#[cfg(test)]
mod tests {
    use nova_classpath::InMemoryClasspath;
    use pretty_assertions::assert_eq;

    use crate::context::test_support::{empty_tree, sema};
    use crate::flags::Flags;
    use crate::subst::TypeSubstitution;
    use crate::types::{Deferred, MethodType};

    #[test]
    fn open_method_variables_are_inferred_from_the_target() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let package = sema.wk.default_package;
        let holder = sema.new_type_symbol(Flags::PUBLIC, "Box".into(), package);
        let e = sema.add_type_parameter(holder, "E".into());
        let e = sema.type_of_symbol(e);
        let method = sema.new_method(Flags::PUBLIC | Flags::STATIC, "empty".into(), holder);
        let t = sema.add_type_parameter(method, "T".into());
        let t = sema.type_of_symbol(t);
        sema.set_method_type(
            method,
            MethodType {
                params: vec![],
                result: None,
                thrown: vec![],
            },
        );

        let open = sema.parameterized(holder, TypeSubstitution::from_pairs(&[e], &[t]));
        let string = sema.wk.string_type;
        let target = sema.parameterized(holder, TypeSubstitution::from_pairs(&[e], &[string]));
        let deferred = sema.deferred(Deferred::Uninferred(open));

        assert_eq!(sema.infer_uninferred(open, target), target);

        let object = sema.wk.object_type;
        let erased = sema.parameterized(holder, TypeSubstitution::from_pairs(&[e], &[object]));
        assert_eq!(sema.standalone_type(deferred), erased);
    }
}
