//! Type references: the type trees of declarations, casts, `instanceof`
//! and `new`.

use crate::context::Sema;
use crate::ids::{NodeId, SymbolId, TypeId};
use crate::resolve::{Resolution, ResolveError};
use crate::solver::Site;
use crate::subst::TypeSubstitution;
use crate::symbols::{KindSet, SymbolKind};
use crate::tree::{NodeKind, WildcardBoundKind};
use crate::types::{TypeKind, WildcardKind};

impl<'a> Sema<'a> {
    /// Type denoted by a type tree. Names that do not resolve give the
    /// unknown type; qualified names missing from the classpath are
    /// recorded as not found.
    pub(crate) fn resolve_type(&mut self, node: NodeId) -> TypeId {
        if let Some(ty) = self.type_of_node(node) {
            return ty;
        }
        let ty = self.compute_type(node);
        self.register_type(node, ty);
        ty
    }

    fn compute_type(&mut self, node: NodeId) -> TypeId {
        let tree = self.tree();
        match tree.kind(node) {
            NodeKind::PrimitiveType(primitive) => self.wk.primitive(*primitive),
            NodeKind::VoidType => self.wk.void_type,
            NodeKind::ArrayType { elem } => {
                let element = self.resolve_type(*elem);
                self.array_of(element)
            }
            NodeKind::Identifier(name) => {
                let env = self.env_of(node);
                let res = self.find_type(env, name);
                self.record_type_reference(node, res)
            }
            NodeKind::MemberSelect { expr, name } => match self.type_name_site(*expr) {
                Site::Package(package) => {
                    let res = self.find_ident_in_package(package, name, KindSet::TYPE);
                    if !res.is_found() {
                        let full_name = self.qualified_child_name(package, name);
                        self.record_not_found(&full_name);
                    }
                    self.record_type_reference(node, res)
                }
                Site::Type(outer) => {
                    let class = self.type_symbol(outer);
                    if self.is_unknown_symbol(class) {
                        return self.wk.unknown_type;
                    }
                    let env = self.env_of(node);
                    let res = self.find_member_type(env, class, name, class);
                    self.record_type_reference(node, res)
                }
                Site::Value(_) => self.wk.unknown_type,
            },
            NodeKind::ParameterizedType { ty, args } => {
                let base = self.resolve_type(*ty);
                let class = self.type_symbol(base);
                let arg_types: Vec<TypeId> = args.iter().map(|arg| self.resolve_type(*arg)).collect();
                if arg_types.is_empty() || self.is_unknown_symbol(class) {
                    return base;
                }
                let variables = self.type_variables(class);
                if variables.len() != arg_types.len() {
                    tracing::debug!(
                        target: "nova.sema",
                        class = %self.full_name(class),
                        expected = variables.len(),
                        found = arg_types.len(),
                        "wrong number of type arguments, using the raw type"
                    );
                    return base;
                }
                let substitution = TypeSubstitution::from_pairs(&variables, &arg_types);
                self.parameterized(class, substitution)
            }
            NodeKind::Wildcard { kind, bound } => match (kind, bound) {
                (WildcardBoundKind::Unbounded, _) | (_, None) => self.wk.unbounded_wildcard,
                (WildcardBoundKind::Extends, Some(bound)) => {
                    let bound = self.resolve_type(*bound);
                    self.wildcard(WildcardKind::Extends, bound)
                }
                (WildcardBoundKind::Super, Some(bound)) => {
                    let bound = self.resolve_type(*bound);
                    self.wildcard(WildcardKind::Super, bound)
                }
            },
            NodeKind::UnionType(alternatives) => {
                let types: Vec<TypeId> = alternatives.iter().map(|alt| self.resolve_type(*alt)).collect();
                self.least_upper_bound(&types)
            }
            _ => self.wk.unknown_type,
        }
    }

    /// Qualifier of a qualified type name: a package or an outer type.
    fn type_name_site(&mut self, node: NodeId) -> Site {
        let tree = self.tree();
        match tree.kind(node) {
            NodeKind::Identifier(name) => {
                let env = self.env_of(node);
                let res = self.find_ident(env, name, KindSet::TYPE | KindSet::PACKAGE);
                self.type_name_site_of(node, res)
            }
            NodeKind::MemberSelect { expr, name } => match self.type_name_site(*expr) {
                Site::Package(package) => {
                    let res = self.find_ident_in_package(package, name, KindSet::TYPE | KindSet::PACKAGE);
                    self.type_name_site_of(node, res)
                }
                Site::Type(outer) => {
                    let class = self.type_symbol(outer);
                    let env = self.env_of(node);
                    let res = self.find_member_type(env, class, name, class);
                    Site::Type(self.record_type_reference(node, res))
                }
                Site::Value(ty) => Site::Value(ty),
            },
            _ => Site::Type(self.resolve_type(node)),
        }
    }

    fn type_name_site_of(&mut self, node: NodeId, res: Resolution) -> Site {
        match res.symbol {
            Ok(symbol) if self.kind(symbol) == SymbolKind::Package => {
                self.associate_symbol(node, symbol);
                Site::Package(symbol)
            }
            _ => Site::Type(self.record_type_reference(node, res)),
        }
    }

    /// Associates a resolved type name with its symbol. A type that is not
    /// accessible is still used, so later lookups see its members.
    pub(crate) fn record_type_reference(&mut self, node: NodeId, res: Resolution) -> TypeId {
        let (symbol, ty) = match res.symbol {
            Ok(symbol) => (symbol, res.ty),
            Err(ResolveError::AccessDenied(symbol)) => (symbol, self.type_of_symbol(symbol)),
            Err(_) => {
                self.register_type(node, self.wk.unknown_type);
                return self.wk.unknown_type;
            }
        };
        self.associate_symbol(node, symbol);
        self.add_usage(symbol, node);
        self.register_type(node, ty);
        ty
    }

    /// Element type of the iterable of an enhanced `for`: the component of
    /// an array or the argument of `Iterable`.
    pub(crate) fn iterable_element_type(&mut self, ty: TypeId) -> TypeId {
        if let Some(element) = self.element_type(ty) {
            return element;
        }
        if self.is_unknown(ty) {
            return ty;
        }
        let Some(iterable) = self.load_class("java.lang.Iterable") else {
            return self.wk.object_type;
        };
        let Some(super_type) = self.as_super(ty, iterable) else {
            return self.wk.object_type;
        };
        let element = self
            .substitution_of(super_type)
            .and_then(|substitution| substitution.substituted_types().next());
        let Some(element) = element else {
            return self.wk.object_type;
        };
        match self.ty(element) {
            TypeKind::Wildcard {
                kind: WildcardKind::Extends | WildcardKind::Unbounded,
                bound,
            } => *bound,
            TypeKind::Wildcard { .. } => self.wk.object_type,
            _ => element,
        }
    }

    /// `Class<T>` for `T.class`; primitives use their wrapper.
    pub(crate) fn class_literal_type(&mut self, ty: TypeId) -> TypeId {
        let argument = if matches!(self.ty(ty), TypeKind::Void) {
            match self.load_class("java.lang.Void") {
                Some(void) => self.class_type(void),
                None => self.wk.object_type,
            }
        } else {
            self.boxed(ty)
        };
        let class: SymbolId = self.type_symbol(self.wk.class_type);
        let variables = self.type_variables(class);
        if variables.len() != 1 {
            return self.wk.class_type;
        }
        let substitution = TypeSubstitution::from_pairs(&variables, &[argument]);
        self.parameterized(class, substitution)
    }
}

#[cfg(test)]
mod tests {
    use nova_classpath::InMemoryClasspath;
    use pretty_assertions::assert_eq;

    use crate::context::test_support::sema;
    use crate::tree::{ClassDecl, ClassKind, TreeBuilder, VariableDecl};
    use crate::types::{Primitive, TypeKind};

    #[test]
    fn qualified_names_missing_from_the_classpath_are_recorded() {
        let mut b = TreeBuilder::new();
        let missing = b.qualified("com.acme.Missing");
        let field = b.variable(VariableDecl::new(missing, "dep"));
        let class = b.class(ClassDecl::new(ClassKind::Class, "Holder").members(vec![field]));
        let unit = b.unit(Some("app"), vec![], vec![class]);
        let tree = b.finish(unit);

        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        sema.enter_unit();
        let ty = sema.resolve_type(missing);
        assert!(sema.is_unknown(ty));
        assert!(sema.classes_not_found().contains("com.acme.Missing"));
    }

    #[test]
    fn arrays_and_primitives_resolve_without_lookup() {
        let mut b = TreeBuilder::new();
        let int = b.primitive(Primitive::Int);
        let ints = b.array_of(int);
        let matrix = b.array_of(ints);
        let unit = b.unit(None, vec![], vec![]);
        let tree = b.finish(unit);

        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let ty = sema.resolve_type(matrix);
        let TypeKind::Array(row) = sema.ty(ty).clone() else {
            panic!("expected an array type, got {}", sema.display(ty));
        };
        assert_eq!(sema.element_type(row), Some(sema.wk.primitive(Primitive::Int)));
        assert_eq!(sema.display(ty), "int[][]");
    }
}
