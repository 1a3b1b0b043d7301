//! Expression typing. Every expression gets a type in the node table and
//! every name a symbol, resolved in the environment of the nearest
//! enclosing statement or declaration.

use crate::context::Sema;
use crate::ids::{EnvId, NodeId, SymbolId, TypeId};
use crate::resolve::{Resolution, ResolveError};
use crate::solver::Site;
use crate::subst::TypeSubstitution;
use crate::symbols::{KindSet, SymbolKind};
use crate::tree::{BinaryOp, LiteralKind, Name, NodeKind, UnaryOp};
use crate::types::{Deferred, Primitive, TypeKind};

impl<'a> Sema<'a> {
    /// Type of an expression, computed once. Lambdas, method references,
    /// diamond instantiations and calls whose result depends on the target
    /// come back deferred; see [`Sema::attribute_expression`].
    pub(crate) fn expression_type(&mut self, node: NodeId) -> TypeId {
        if let Some(ty) = self.type_of_node(node) {
            return ty;
        }
        let ty = self.compute_expression_type(node);
        self.register_type(node, ty);
        ty
    }

    /// Types `node` against an optional target; a deferred type is fixed
    /// here, from the target when there is one.
    pub(crate) fn attribute_expression(&mut self, node: NodeId, target: Option<TypeId>) -> TypeId {
        let ty = self.expression_type(node);
        let TypeKind::Deferred(deferred) = *self.ty(ty) else {
            return ty;
        };
        let resolved = match target {
            Some(target) if !self.is_unknown(target) && !self.is_deferred(target) => {
                self.resolve_deferred(node, deferred, target)
            }
            _ => self.standalone_expression(node, deferred),
        };
        self.register_type(node, resolved);
        resolved
    }

    fn compute_expression_type(&mut self, node: NodeId) -> TypeId {
        let tree = self.tree();
        let boolean = self.wk.primitive(Primitive::Boolean);
        match tree.kind(node) {
            NodeKind::Literal { kind, .. } => self.literal_type(*kind),
            NodeKind::Identifier(_) | NodeKind::MemberSelect { .. } => match self.expression_site(node, false) {
                Site::Value(ty) | Site::Type(ty) => ty,
                Site::Package(_) => self.wk.unknown_type,
            },
            NodeKind::Parenthesized(inner) => self.expression_type(*inner),
            NodeKind::MethodInvocation {
                type_args,
                method,
                args,
            } => self.invocation_type(type_args, *method, args),
            NodeKind::NewClass { .. } => self.new_class_type(node),
            NodeKind::NewArray {
                elem_type,
                dimensions,
                extra_dimensions,
                initializers,
            } => self.new_array_type(*elem_type, dimensions, *extra_dimensions, initializers.as_deref()),
            NodeKind::ArrayAccess { array, index } => {
                let int = self.wk.primitive(Primitive::Int);
                self.attribute_expression(*index, Some(int));
                let array = self.attribute_expression(*array, None);
                self.element_type(array).unwrap_or(self.wk.unknown_type)
            }
            NodeKind::Unary { op, operand } => self.unary_type(node, *op, *operand),
            NodeKind::Binary { op, left, right } => self.binary_type(node, *op, *left, *right),
            NodeKind::Assignment { op, target, value } => {
                let target_type = self.attribute_expression(*target, None);
                match op {
                    None => {
                        self.attribute_expression(*value, Some(target_type));
                    }
                    Some(_) => {
                        self.attribute_expression(*value, None);
                    }
                }
                target_type
            }
            NodeKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                self.attribute_expression(*cond, Some(boolean));
                let then_type = self.expression_type(*then_expr);
                let else_type = self.expression_type(*else_expr);
                if self.is_deferred(then_type) {
                    return then_type;
                }
                if self.is_deferred(else_type) {
                    return else_type;
                }
                self.conditional_type(then_type, else_type)
            }
            NodeKind::InstanceOf { expr, ty } => {
                self.attribute_expression(*expr, None);
                self.resolve_type(*ty);
                boolean
            }
            NodeKind::Cast { ty, expr } => {
                let target = self.resolve_type(*ty);
                self.attribute_expression(*expr, Some(target));
                target
            }
            NodeKind::Lambda { .. } => self.deferred(Deferred::Node(node)),
            NodeKind::MethodReference { expr, type_args, .. } => {
                match tree.kind(*expr) {
                    NodeKind::PrimitiveType(_) | NodeKind::ArrayType { .. } | NodeKind::ParameterizedType { .. } => {
                        self.resolve_type(*expr);
                    }
                    _ => {
                        self.expression_site(*expr, true);
                    }
                }
                for arg in type_args {
                    self.resolve_type(*arg);
                }
                self.deferred(Deferred::Node(node))
            }
            NodeKind::PrimitiveType(_)
            | NodeKind::VoidType
            | NodeKind::ArrayType { .. }
            | NodeKind::ParameterizedType { .. } => self.resolve_type(node),
            _ => self.wk.unknown_type,
        }
    }

    fn literal_type(&mut self, kind: LiteralKind) -> TypeId {
        match kind {
            LiteralKind::Int => self.wk.primitive(Primitive::Int),
            LiteralKind::Long => self.wk.primitive(Primitive::Long),
            LiteralKind::Float => self.wk.primitive(Primitive::Float),
            LiteralKind::Double => self.wk.primitive(Primitive::Double),
            LiteralKind::Char => self.wk.primitive(Primitive::Char),
            LiteralKind::Boolean => self.wk.primitive(Primitive::Boolean),
            LiteralKind::String => self.wk.string_type,
            LiteralKind::Null => self.wk.null_type,
        }
    }

    // ---- names ----

    /// What a name expression denotes. Qualifiers may also name packages.
    pub(crate) fn expression_site(&mut self, node: NodeId, qualifier: bool) -> Site {
        if let (Some(symbol), Some(ty)) = (self.symbol_of_node(node), self.type_of_node(node)) {
            return self.site_of_symbol(symbol, ty);
        }
        let tree = self.tree();
        let site = match tree.kind(node) {
            NodeKind::Identifier(name) => {
                let env = self.env_of(node);
                let kinds = if qualifier {
                    KindSet::VARIABLE | KindSet::TYPE | KindSet::PACKAGE
                } else {
                    KindSet::VARIABLE | KindSet::TYPE
                };
                let res = self.find_ident(env, name, kinds);
                self.site_of_resolution(node, res)
            }
            NodeKind::MemberSelect { expr, name } => {
                let outer = self.expression_site(*expr, true);
                self.member_site(node, outer, name, qualifier)
            }
            NodeKind::PrimitiveType(_)
            | NodeKind::VoidType
            | NodeKind::ArrayType { .. }
            | NodeKind::ParameterizedType { .. } => return Site::Type(self.resolve_type(node)),
            _ => return Site::Value(self.expression_type(node)),
        };
        let ty = match site {
            Site::Value(ty) | Site::Type(ty) => ty,
            Site::Package(_) => self.wk.unknown_type,
        };
        self.register_type(node, ty);
        site
    }

    fn site_of_symbol(&self, symbol: SymbolId, ty: TypeId) -> Site {
        match self.kind(symbol) {
            SymbolKind::Package => Site::Package(symbol),
            SymbolKind::Type | SymbolKind::TypeVariable => Site::Type(ty),
            _ => Site::Value(ty),
        }
    }

    /// Records the symbol a name resolved to. A symbol that is not
    /// accessible is recorded too, with its declared type.
    fn site_of_resolution(&mut self, node: NodeId, res: Resolution) -> Site {
        let (symbol, ty) = match res.symbol {
            Ok(symbol) => (symbol, res.ty),
            Err(ResolveError::AccessDenied(symbol)) => (symbol, self.type_of_symbol(symbol)),
            Err(_) => return Site::Value(self.wk.unknown_type),
        };
        self.associate_symbol(node, symbol);
        self.add_usage(symbol, node);
        self.site_of_symbol(symbol, ty)
    }

    fn member_site(&mut self, node: NodeId, outer: Site, name: &Name, qualifier: bool) -> Site {
        let env = self.env_of(node);
        match outer {
            Site::Package(package) => {
                let kinds = if qualifier {
                    KindSet::TYPE | KindSet::PACKAGE
                } else {
                    KindSet::TYPE
                };
                let res = self.find_ident_in_package(package, name, kinds);
                if !res.is_found() {
                    let full_name = self.qualified_child_name(package, name);
                    self.record_not_found(&full_name);
                }
                self.site_of_resolution(node, res)
            }
            Site::Type(ty) => match name.as_str() {
                "class" => Site::Value(self.class_literal_type(ty)),
                "this" | "super" => {
                    let class = self.type_symbol(ty);
                    let scope = self.members(class);
                    let variable = scope.and_then(|scope| self.lookup_local(scope, name).first().copied());
                    match variable {
                        Some(variable) => {
                            let res = Resolution::found(variable, self.type_of_symbol(variable));
                            self.site_of_resolution(node, res)
                        }
                        None => Site::Value(ty),
                    }
                }
                _ => {
                    let class = self.type_symbol(ty);
                    if self.is_unknown_symbol(class) {
                        return Site::Value(self.wk.unknown_type);
                    }
                    let res = self.find_ident_in_type(env, class, name, KindSet::VARIABLE | KindSet::TYPE);
                    self.site_of_resolution(node, res)
                }
            },
            Site::Value(ty) => {
                if matches!(self.ty(ty), TypeKind::Array(_)) && name == "length" {
                    let length = self.wk.array_length;
                    let int = self.wk.primitive(Primitive::Int);
                    return self.site_of_resolution(node, Resolution::found(length, int));
                }
                let site = self.member_lookup_type(ty);
                let class = self.type_symbol(site);
                if self.is_unknown_symbol(class) {
                    return Site::Value(self.wk.unknown_type);
                }
                let mut res = self.find_field(env, site, name, class);
                if res.is_found() {
                    res.ty = self.apply_site_substitution(res.ty, site);
                }
                self.site_of_resolution(node, res)
            }
        }
    }

    /// Type whose members a value of `ty` has: type variables and
    /// wildcards use their (first) bound.
    fn member_lookup_type(&mut self, ty: TypeId) -> TypeId {
        match self.ty(ty).clone() {
            TypeKind::TypeVar(symbol) => match self.bounds(symbol).first() {
                Some(bound) => self.member_lookup_type(*bound),
                None => self.wk.object_type,
            },
            TypeKind::Wildcard { bound, .. } => self.member_lookup_type(bound),
            TypeKind::Intersection(types) => match types.first() {
                Some(first) => *first,
                None => self.wk.object_type,
            },
            _ => ty,
        }
    }

    // ---- invocations ----

    fn invocation_type(&mut self, type_args: &[NodeId], method: NodeId, args: &[NodeId]) -> TypeId {
        let tree = self.tree();
        let type_arg_types: Vec<TypeId> = type_args.iter().map(|arg| self.resolve_type(*arg)).collect();
        let arg_types: Vec<TypeId> = args.iter().map(|arg| self.expression_type(*arg)).collect();
        let env = self.env_of(method);
        let res = match tree.kind(method) {
            NodeKind::Identifier(name) => self.find_method(env, name, &arg_types, &type_arg_types),
            NodeKind::MemberSelect { expr, name } => match self.expression_site(*expr, true) {
                Site::Type(site) | Site::Value(site) => {
                    let site = self.member_lookup_type(site);
                    self.find_method_in(env, site, name, &arg_types, &type_arg_types)
                }
                Site::Package(_) => self.unresolved(ResolveError::NotFound),
            },
            _ => self.unresolved(ResolveError::NotFound),
        };
        let symbol = match res.symbol {
            Ok(symbol) | Err(ResolveError::AccessDenied(symbol)) => Some(symbol),
            Err(_) => None,
        };
        if let Some(symbol) = symbol {
            self.associate_symbol(method, symbol);
            self.add_usage(symbol, method);
        }
        let (Some(symbol), Ok(_)) = (symbol, res.symbol) else {
            tracing::trace!(target: "nova.sema", ?method, "unresolved method invocation");
            self.attribute_standalone(args, &arg_types);
            return self.wk.unknown_type;
        };
        self.register_type(method, res.ty);
        self.resolve_deferred_arguments(res.ty, symbol, args, &arg_types);
        match self.ty(res.ty) {
            TypeKind::Method(method_type) => method_type.result.unwrap_or(self.wk.void_type),
            _ => self.wk.unknown_type,
        }
    }

    fn attribute_standalone(&mut self, args: &[NodeId], arg_types: &[TypeId]) {
        for (arg, ty) in args.iter().zip(arg_types) {
            if self.is_deferred(*ty) {
                self.attribute_expression(*arg, None);
            }
        }
    }

    /// Fixes deferred arguments against the formals of the selected method
    /// or constructor, given by its type at the call site. Trailing
    /// variable-arity arguments target the element type.
    pub(crate) fn resolve_deferred_arguments(
        &mut self,
        method_type: TypeId,
        method: SymbolId,
        args: &[NodeId],
        arg_types: &[TypeId],
    ) {
        let TypeKind::Method(signature) = self.ty(method_type).clone() else {
            self.attribute_standalone(args, arg_types);
            return;
        };
        let mut formals = signature.params;
        if self.is_constructor(method) && !formals.is_empty() {
            let implicit_outer = self
                .owner(method)
                .and_then(|class| self.implicit_outer_type(class))
                .is_some();
            if implicit_outer {
                formals.remove(0);
            }
        }
        let varargs = self.is_varargs(method);
        for (index, (arg, ty)) in args.iter().zip(arg_types).enumerate() {
            if !self.is_deferred(*ty) {
                continue;
            }
            let formal = if varargs && index + 1 >= formals.len() {
                formals.last().and_then(|last| self.element_type(*last))
            } else {
                formals.get(index).copied()
            };
            self.attribute_expression(*arg, formal);
        }
    }

    // ---- instance creation ----

    fn new_class_type(&mut self, node: NodeId) -> TypeId {
        let tree = self.tree();
        let NodeKind::NewClass {
            outer,
            type_args,
            ty,
            args,
            body,
        } = tree.kind(node)
        else {
            return self.wk.unknown_type;
        };
        let env = self.env_of(node);
        let diamond = matches!(tree.kind(*ty), NodeKind::ParameterizedType { args, .. } if args.is_empty());
        let class_type = match outer {
            Some(outer) => {
                let outer_type = self.attribute_expression(*outer, None);
                self.inner_class_type(env, outer_type, *ty)
            }
            None => self.resolve_type(*ty),
        };
        let type_arg_types: Vec<TypeId> = type_args.iter().map(|arg| self.resolve_type(*arg)).collect();
        let arg_types: Vec<TypeId> = args.iter().map(|arg| self.expression_type(*arg)).collect();
        let class = self.type_symbol(class_type);

        let mut result = class_type;
        if self.is_unknown_symbol(class) || self.is_interface(class) {
            self.attribute_standalone(args, &arg_types);
        } else {
            let site = if diamond {
                self.identity_parameterization(class)
            } else {
                class_type
            };
            let res = self.find_constructor(env, site, &arg_types, &type_arg_types);
            match res.symbol {
                Ok(constructor) => {
                    self.associate_symbol(node, constructor);
                    self.add_usage(constructor, node);
                    if diamond {
                        result = self.diamond_from_arguments(node, class, res.ty, &arg_types, args.len());
                    }
                    self.resolve_deferred_arguments(res.ty, constructor, args, &arg_types);
                }
                Err(error) => {
                    if let ResolveError::AccessDenied(constructor) = error {
                        self.associate_symbol(node, constructor);
                        self.add_usage(constructor, node);
                    }
                    tracing::trace!(target: "nova.sema", ?node, ?error, "constructor not resolved");
                    self.attribute_standalone(args, &arg_types);
                }
            }
        }
        if let Some(body) = body {
            self.attribute_class(*body);
            if let Some(anonymous) = self.symbol_of_node(*body) {
                result = self.class_type(anonymous);
            }
        }
        result
    }

    /// `outer.new Inner()`: `Inner` is a member type of the outer value.
    fn inner_class_type(&mut self, env: EnvId, outer_type: TypeId, ty: NodeId) -> TypeId {
        let tree = self.tree();
        let name_node = match tree.kind(ty) {
            NodeKind::ParameterizedType { ty, .. } => *ty,
            _ => ty,
        };
        let NodeKind::Identifier(name) = tree.kind(name_node) else {
            return self.resolve_type(ty);
        };
        let site = self.member_lookup_type(outer_type);
        let outer_class = self.type_symbol(site);
        if self.is_unknown_symbol(outer_class) {
            return self.wk.unknown_type;
        }
        let res = self.find_member_type(env, outer_class, name, outer_class);
        let class_type = self.record_type_reference(name_node, res);
        if name_node != ty {
            self.resolve_type(ty);
        }
        class_type
    }

    /// Instantiation of `new C<>(args)` from the constructor arguments.
    /// When some class type variable is not bound by them the expression
    /// stays deferred until its target is known.
    fn diamond_from_arguments(
        &mut self,
        node: NodeId,
        class: SymbolId,
        constructor_type: TypeId,
        arg_types: &[TypeId],
        arg_count: usize,
    ) -> TypeId {
        let variables = self.type_variables(class);
        let TypeKind::Method(signature) = self.ty(constructor_type).clone() else {
            return self.class_type(class);
        };
        let skip = signature.params.len().saturating_sub(arg_count);
        let mut bound = TypeSubstitution::new();
        for (formal, arg) in signature.params[skip..].iter().zip(arg_types) {
            if self.is_deferred(*arg) || matches!(self.ty(*arg), TypeKind::Null) {
                continue;
            }
            let inferred = self.infer_from_target(&variables, *formal, *arg);
            for (variable, ty) in inferred.pairs() {
                if bound.substituted_type(*variable).is_none() {
                    bound.add(*variable, *ty);
                }
            }
        }
        let mut instantiation = Vec::with_capacity(variables.len());
        for variable in &variables {
            match bound.substituted_type(*variable) {
                Some(ty) => instantiation.push(ty),
                None => return self.deferred(Deferred::Node(node)),
            }
        }
        let substitution = TypeSubstitution::from_pairs(&variables, &instantiation);
        self.parameterized(class, substitution)
    }

    // ---- arrays ----

    fn new_array_type(
        &mut self,
        elem_type: Option<NodeId>,
        dimensions: &[NodeId],
        extra_dimensions: usize,
        initializers: Option<&[NodeId]>,
    ) -> TypeId {
        let int = self.wk.primitive(Primitive::Int);
        for dimension in dimensions {
            self.attribute_expression(*dimension, Some(int));
        }
        let Some(elem_type) = elem_type else {
            let initializers = initializers.unwrap_or_default();
            let types: Vec<TypeId> = initializers
                .iter()
                .map(|init| self.attribute_expression(*init, None))
                .collect();
            let element = self.initializer_element_type(&types);
            return self.array_of(element);
        };
        let mut ty = self.resolve_type(elem_type);
        for _ in 0..dimensions.len() + extra_dimensions {
            ty = self.array_of(ty);
        }
        if let Some(initializers) = initializers {
            let element = self.element_type(ty);
            for init in initializers {
                self.attribute_expression(*init, element);
            }
        }
        ty
    }

    /// Element type of `{a, b, ...}` without a declared type.
    fn initializer_element_type(&mut self, types: &[TypeId]) -> TypeId {
        let Some(first) = types.first().copied() else {
            return self.wk.object_type;
        };
        if types.iter().all(|ty| *ty == first) {
            return first;
        }
        let boxed: Vec<TypeId> = types.iter().map(|ty| self.boxed(*ty)).collect();
        self.least_upper_bound(&boxed)
    }

    // ---- operators ----

    /// Result of the predefined operator `op` for these operand types.
    fn operator_type(&mut self, node: NodeId, op: &str, operands: &[TypeId]) -> Option<TypeId> {
        let env = self.env_of(node);
        let predef = self.class_type(self.wk.predef_class);
        let res = self.find_method_in(env, predef, &Name::new(op), operands, &[]);
        let Ok(operator) = res.symbol else {
            return None;
        };
        self.associate_symbol(node, operator);
        match self.ty(res.ty) {
            TypeKind::Method(method_type) => method_type.result,
            _ => None,
        }
    }

    fn unary_type(&mut self, node: NodeId, op: UnaryOp, operand: NodeId) -> TypeId {
        let operand_type = self.attribute_expression(operand, None);
        match op {
            UnaryOp::Not => self.wk.primitive(Primitive::Boolean),
            UnaryOp::PreIncrement | UnaryOp::PreDecrement | UnaryOp::PostIncrement | UnaryOp::PostDecrement => {
                operand_type
            }
            UnaryOp::Plus | UnaryOp::Minus | UnaryOp::BitNot => {
                let unboxed = self.unboxed(operand_type);
                self.operator_type(node, op.symbol(), &[unboxed])
                    .unwrap_or_else(|| self.unary_promotion(unboxed))
            }
        }
    }

    /// `byte`, `short` and `char` promote to `int`.
    fn unary_promotion(&self, ty: TypeId) -> TypeId {
        match self.ty(ty).primitive() {
            Some(Primitive::Byte | Primitive::Short | Primitive::Char) => self.wk.primitive(Primitive::Int),
            _ => ty,
        }
    }

    fn binary_type(&mut self, node: NodeId, op: BinaryOp, left: NodeId, right: NodeId) -> TypeId {
        let left_type = self.attribute_expression(left, None);
        let right_type = self.attribute_expression(right, None);
        let boolean = self.wk.primitive(Primitive::Boolean);
        let result = self.operator_type(node, op.symbol(), &[left_type, right_type]);
        match op {
            BinaryOp::Lt
            | BinaryOp::Gt
            | BinaryOp::Le
            | BinaryOp::Ge
            | BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::And
            | BinaryOp::Or => boolean,
            _ => match result {
                Some(result) => result,
                None if op == BinaryOp::Add
                    && (left_type == self.wk.string_type || right_type == self.wk.string_type) =>
                {
                    self.wk.string_type
                }
                None => self.binary_promotion(left_type, right_type),
            },
        }
    }

    /// Binary numeric promotion, or unknown for non-numeric operands.
    fn binary_promotion(&self, left: TypeId, right: TypeId) -> TypeId {
        let left = self.ty(self.unboxed(left)).primitive();
        let right = self.ty(self.unboxed(right)).primitive();
        match (left, right) {
            (Some(l), Some(r)) if l.is_numeric() && r.is_numeric() => {
                let wider = l.max(r).max(Primitive::Int);
                self.wk.primitive(wider)
            }
            _ => self.wk.unknown_type,
        }
    }

    /// Type of `c ? a : b` from its branch types: equal types, `null`
    /// against a reference, `short` for `byte` against `short`, binary
    /// numeric promotion for other numeric pairs, else the least upper
    /// bound of the boxed types.
    pub(crate) fn conditional_type(&mut self, then_type: TypeId, else_type: TypeId) -> TypeId {
        if then_type == else_type {
            return then_type;
        }
        let null = self.wk.null_type;
        if then_type == null {
            return self.boxed(else_type);
        }
        if else_type == null {
            return self.boxed(then_type);
        }
        let then_unboxed = self.unboxed(then_type);
        let else_unboxed = self.unboxed(else_type);
        if self.is_numerical(then_unboxed) && self.is_numerical(else_unboxed) {
            let pair = (self.ty(then_unboxed).primitive(), self.ty(else_unboxed).primitive());
            return match pair {
                (Some(Primitive::Byte), Some(Primitive::Short)) | (Some(Primitive::Short), Some(Primitive::Byte)) => {
                    self.wk.primitive(Primitive::Short)
                }
                (Some(l), Some(r)) if l == r => self.wk.primitive(l),
                _ => self.binary_promotion(then_unboxed, else_unboxed),
            };
        }
        let boolean = self.wk.primitive(Primitive::Boolean);
        if then_unboxed == boolean && else_unboxed == boolean {
            return boolean;
        }
        if self.is_unknown(then_type) || self.is_unknown(else_type) {
            return self.wk.unknown_type;
        }
        let boxed = [self.boxed(then_type), self.boxed(else_type)];
        self.least_upper_bound(&boxed)
    }
}

#[cfg(test)]
mod tests {
    use nova_classpath::InMemoryClasspath;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::context::test_support::{empty_tree, sema};

    #[test]
    fn numeric_conditionals_promote_their_branches() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let [byte, char, short, int, long] =
            [Primitive::Byte, Primitive::Char, Primitive::Short, Primitive::Int, Primitive::Long]
                .map(|p| sema.wk.primitive(p));

        assert_eq!(sema.conditional_type(char, byte), int);
        assert_eq!(sema.conditional_type(byte, char), int);
        assert_eq!(sema.conditional_type(char, short), int);
        assert_eq!(sema.conditional_type(byte, short), short);
        assert_eq!(sema.conditional_type(short, byte), short);
        assert_eq!(sema.conditional_type(int, long), long);

        let boxed_char = sema.wk.boxed(Primitive::Char);
        assert_eq!(sema.conditional_type(boxed_char, char), char);
        assert_eq!(sema.conditional_type(boxed_char, byte), int);
    }
}
