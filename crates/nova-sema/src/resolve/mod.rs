//! Name lookup: variables, types, packages and members, innermost scope
//! first. Method and constructor overloads are in [`method`], visibility
//! rules in [`access`].

mod access;
mod method;

pub(crate) use self::method::CONSTRUCTOR_NAME;

use crate::context::Sema;
use crate::ids::{EnvId, SymbolId, TypeId};
use crate::symbols::{KindSet, SymbolKind};
use crate::tree::Name;

/// Why a lookup produced no usable symbol. Ordered from the most to the
/// least informative outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    /// A symbol was found but is not visible from the lookup site.
    AccessDenied(SymbolId),
    /// Several overloads are applicable and none is more specific.
    Ambiguous,
    NotFound,
}

/// Outcome of a lookup. The type is the symbol's type as seen from the
/// lookup site (substituted, erased for raw sites), or the unknown type on
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub symbol: Result<SymbolId, ResolveError>,
    pub ty: TypeId,
}

impl Resolution {
    pub fn found(symbol: SymbolId, ty: TypeId) -> Self {
        Self {
            symbol: Ok(symbol),
            ty,
        }
    }

    pub fn symbol(&self) -> Option<SymbolId> {
        self.symbol.ok()
    }

    pub fn is_found(&self) -> bool {
        self.symbol.is_ok()
    }

    fn rank(&self) -> u8 {
        match self.symbol {
            Ok(_) => 0,
            Err(ResolveError::AccessDenied(_)) => 1,
            Err(ResolveError::Ambiguous) => 2,
            Err(ResolveError::NotFound) => 3,
        }
    }

    /// Strictly more informative than `other`; equally ranked results keep
    /// the one found first.
    pub(crate) fn is_better_than(&self, other: &Resolution) -> bool {
        self.rank() < other.rank()
    }
}

impl<'a> Sema<'a> {
    pub(crate) fn unresolved(&self, error: ResolveError) -> Resolution {
        Resolution {
            symbol: Err(error),
            ty: self.wk.unknown_type,
        }
    }

    fn resolved(&mut self, symbol: SymbolId) -> Resolution {
        let ty = self.type_of_symbol(symbol);
        Resolution::found(symbol, ty)
    }

    /// Looks `name` up as each requested kind in turn: variable, type,
    /// then top-level package.
    pub fn find_ident(&mut self, env: EnvId, name: &Name, kinds: KindSet) -> Resolution {
        let mut best = self.unresolved(ResolveError::NotFound);
        if kinds.contains(KindSet::VARIABLE) {
            let res = self.find_var(env, name);
            if res.is_found() {
                return res;
            }
            if res.is_better_than(&best) {
                best = res;
            }
        }
        if kinds.contains(KindSet::TYPE) {
            let res = self.find_type(env, name);
            if res.is_found() {
                return res;
            }
            if res.is_better_than(&best) {
                best = res;
            }
        }
        if kinds.contains(KindSet::PACKAGE) {
            let root = self.wk.default_package;
            let res = self.find_ident_in_package(root, name, KindSet::PACKAGE);
            if res.is_found() {
                return res;
            }
        }
        best
    }

    /// A class or subpackage of `package`. Packages always exist, so a
    /// package lookup never fails.
    pub fn find_ident_in_package(&mut self, package: SymbolId, name: &Name, kinds: KindSet) -> Resolution {
        let full_name = self.qualified_child_name(package, name);
        if kinds.contains(KindSet::TYPE) {
            if let Some(class) = self.load_class(&full_name) {
                return self.resolved(class);
            }
        }
        if kinds.contains(KindSet::PACKAGE) {
            let package = self.enter_package(&full_name);
            return self.resolved(package);
        }
        self.unresolved(ResolveError::NotFound)
    }

    /// A field or member type of `site`.
    pub fn find_ident_in_type(&mut self, env: EnvId, site: SymbolId, name: &Name, kinds: KindSet) -> Resolution {
        let mut best = self.unresolved(ResolveError::NotFound);
        if kinds.contains(KindSet::VARIABLE) {
            let site_type = self.class_type(site);
            let res = self.find_field(env, site_type, name, site);
            if res.is_found() {
                return res;
            }
            if res.is_better_than(&best) {
                best = res;
            }
        }
        if kinds.contains(KindSet::TYPE) {
            let res = self.find_member_type(env, site, name, site);
            if res.is_found() {
                return res;
            }
            if res.is_better_than(&best) {
                best = res;
            }
        }
        best
    }

    // ---- variables ----

    /// Local variables, parameters and fields visible from `env`, then
    /// statically imported fields.
    pub fn find_var(&mut self, env: EnvId, name: &Name) -> Resolution {
        let mut best = self.unresolved(ResolveError::NotFound);
        let mut current = env;
        while let Some(outer) = self.env(current).outer {
            let scope = self.env(current).scope;
            let local = self
                .lookup(scope, name)
                .into_iter()
                .rev()
                .find(|symbol| self.kind(*symbol) == SymbolKind::Variable);
            if let Some(symbol) = local {
                return self.resolved(symbol);
            }
            if let Some(class) = self.env(current).enclosing_class {
                let site = self.class_type(class);
                let res = self.find_field(current, site, name, class);
                if res.is_found() {
                    return res;
                }
                if res.is_better_than(&best) {
                    best = res;
                }
            }
            current = outer;
        }
        let res = self.find_var_in_static_imports(env, name);
        if res.is_found() {
            return res;
        }
        best
    }

    fn find_var_in_static_imports(&mut self, env: EnvId, name: &Name) -> Resolution {
        let env = self.env(env).clone();
        for scope in [env.named_imports, env.static_star_imports] {
            let field = self
                .lookup(scope, name)
                .into_iter()
                .find(|symbol| self.kind(*symbol) == SymbolKind::Variable);
            if let Some(field) = field {
                return self.resolved(field);
            }
        }
        self.unresolved(ResolveError::NotFound)
    }

    /// Field `name` declared in `class` or inherited from its supertypes.
    /// Fields found in a supertype get that supertype's substitution.
    pub fn find_field(&mut self, env: EnvId, site: TypeId, name: &Name, class: SymbolId) -> Resolution {
        let mut visited = Vec::new();
        self.find_field_in(env, site, name, class, &mut visited)
    }

    fn find_field_in(
        &mut self,
        env: EnvId,
        site: TypeId,
        name: &Name,
        class: SymbolId,
        visited: &mut Vec<SymbolId>,
    ) -> Resolution {
        let mut best = self.unresolved(ResolveError::NotFound);
        if visited.contains(&class) {
            return best;
        }
        visited.push(class);
        let site_symbol = self.type_symbol(site);
        if let Some(members) = self.members(class) {
            for symbol in self.lookup_local(members, name) {
                if self.kind(symbol) != SymbolKind::Variable {
                    continue;
                }
                if self.is_accessible(env, site_symbol, symbol) {
                    let declared = self.type_of_symbol(symbol);
                    let class_type = self.class_type(class);
                    let ty = self.apply_site_substitution(declared, class_type);
                    return Resolution::found(symbol, ty);
                }
                return self.unresolved(ResolveError::AccessDenied(symbol));
            }
        }
        let supertypes: Vec<TypeId> = self.superclass(class).into_iter().chain(self.interfaces(class)).collect();
        for super_type in supertypes {
            let super_symbol = self.type_symbol(super_type);
            if self.is_unknown_symbol(super_symbol) {
                continue;
            }
            let mut res = self.find_field_in(env, site, name, super_symbol, visited);
            if res.is_found() {
                res.ty = self.apply_site_substitution(res.ty, super_type);
                return res;
            }
            if res.is_better_than(&best) {
                best = res;
            }
        }
        best
    }

    // ---- types ----

    /// Member type `name` of `class` or of its supertypes.
    pub fn find_member_type(&mut self, env: EnvId, site: SymbolId, name: &Name, class: SymbolId) -> Resolution {
        let mut visited = Vec::new();
        self.find_member_type_in(env, site, name, class, &mut visited)
    }

    fn find_member_type_in(
        &mut self,
        env: EnvId,
        site: SymbolId,
        name: &Name,
        class: SymbolId,
        visited: &mut Vec<SymbolId>,
    ) -> Resolution {
        let mut best = self.unresolved(ResolveError::NotFound);
        if visited.contains(&class) {
            return best;
        }
        visited.push(class);
        if let Some(members) = self.members(class) {
            for symbol in self.lookup_local(members, name) {
                if self.kind(symbol) != SymbolKind::Type {
                    continue;
                }
                if self.is_accessible(env, site, symbol) {
                    return self.resolved(symbol);
                }
                return self.unresolved(ResolveError::AccessDenied(symbol));
            }
        }
        let supertypes: Vec<TypeId> = self.superclass(class).into_iter().chain(self.interfaces(class)).collect();
        for super_type in supertypes {
            let super_symbol = self.type_symbol(super_type);
            if self.is_unknown_symbol(super_symbol) {
                continue;
            }
            let res = self.find_member_type_in(env, site, name, super_symbol, visited);
            if res.is_found() {
                return res;
            }
            if res.is_better_than(&best) {
                best = res;
            }
        }
        best
    }

    /// A simple type name: type variables, local and member types from the
    /// innermost scope outwards, primitive types, single-type imports, the
    /// current package, on-demand imports, then the implicit packages.
    pub fn find_type(&mut self, env: EnvId, name: &Name) -> Resolution {
        let mut best = self.unresolved(ResolveError::NotFound);
        let mut current = Some(env);
        while let Some(id) = current {
            let scope = self.env(id).scope;
            let local = self
                .lookup(scope, name)
                .into_iter()
                .find(|symbol| self.is_type_symbol(*symbol));
            if let Some(symbol) = local {
                return self.resolved(symbol);
            }
            let outer = self.env(id).outer;
            if let (Some(_), Some(class)) = (outer, self.env(id).enclosing_class) {
                let res = self.find_member_type(id, class, name, class);
                if res.is_found() {
                    return res;
                }
                if res.is_better_than(&best) {
                    best = res;
                }
            }
            current = outer;
        }

        let predef = self.wk.predef_class;
        if let Some(members) = self.members(predef) {
            let primitive = self
                .lookup_local(members, name)
                .into_iter()
                .find(|symbol| self.kind(*symbol) == SymbolKind::Type);
            if let Some(symbol) = primitive {
                return self.resolved(symbol);
            }
        }

        let imports = self.env(env).clone();
        let named = self
            .lookup(imports.named_imports, name)
            .into_iter()
            .find(|symbol| self.kind(*symbol) == SymbolKind::Type);
        if let Some(symbol) = named {
            return self.resolved(symbol);
        }

        let res = self.find_ident_in_package(imports.package, name, KindSet::TYPE);
        if res.is_found() {
            return res;
        }

        let on_demand = self
            .lookup(imports.star_imports, name)
            .into_iter()
            .find(|symbol| self.kind(*symbol) == SymbolKind::Type);
        if let Some(symbol) = on_demand {
            return self.resolved(symbol);
        }

        for package in self.config.implicit_imports.clone() {
            let package = self.enter_package(&package);
            let res = self.find_ident_in_package(package, name, KindSet::TYPE);
            if res.is_found() {
                return res;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use nova_classpath::InMemoryClasspath;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::context::test_support::{empty_tree, sema};
    use crate::env::Env;
    use crate::flags::Flags;

    /// A class env nested in the root env, the way the first pass builds it.
    fn class_env(sema: &mut Sema<'_>, class: SymbolId) -> EnvId {
        let root = sema.wk.root_env;
        let mut env: Env = sema.dup_env(root);
        env.outer = Some(root);
        env.enclosing_class = Some(class);
        env.scope = sema.members(class).unwrap();
        sema.alloc_env(env)
    }

    #[test]
    fn resolution_ranks_prefer_real_symbols() {
        let found = Resolution::found(SymbolId::from_index(3), TypeId::from_index(0));
        let denied = Resolution {
            symbol: Err(ResolveError::AccessDenied(SymbolId::from_index(3))),
            ty: TypeId::from_index(0),
        };
        let missing = Resolution {
            symbol: Err(ResolveError::NotFound),
            ty: TypeId::from_index(0),
        };
        assert!(found.is_better_than(&denied));
        assert!(denied.is_better_than(&missing));
        assert!(!missing.is_better_than(&missing));
        assert_eq!(denied.symbol(), None);
    }

    #[test]
    fn fields_are_found_in_superclasses_with_their_substitution() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let package = sema.wk.default_package;
        let object = sema.wk.object_type;

        let boxed = sema.new_type_symbol(Flags::PUBLIC, "Box".into(), package);
        let t = sema.add_type_parameter(boxed, "T".into());
        let t = sema.type_of_symbol(t);
        let value = sema.new_variable(Flags::PUBLIC, "value".into(), Some(t), boxed);
        let members = sema.members(boxed).unwrap();
        sema.enter(members, value);
        sema.set_supertypes(boxed, Some(object), vec![]);

        let string = sema.wk.string_type;
        let box_of_string = sema.parameterized(boxed, crate::subst::TypeSubstitution::from_pairs(&[t], &[string]));
        let sub = sema.new_type_symbol(Flags::PUBLIC, "Sub".into(), package);
        sema.set_supertypes(sub, Some(box_of_string), vec![]);

        let env = class_env(&mut sema, sub);
        let res = sema.find_var(env, &Name::new("value"));
        assert_eq!(res.symbol(), Some(value));
        assert_eq!(res.ty, string);

        let missing = sema.find_var(env, &Name::new("other"));
        assert_eq!(missing.symbol, Err(ResolveError::NotFound));
        assert!(sema.is_unknown(missing.ty));
    }

    #[test]
    fn primitive_and_implicit_types_resolve_by_simple_name() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let root = sema.wk.root_env;

        let int = sema.find_type(root, &Name::new("int"));
        assert_eq!(int.ty, sema.wk.primitive(crate::types::Primitive::Int));

        let string = sema.find_type(root, &Name::new("String"));
        assert_eq!(string.ty, sema.wk.string_type);

        let missing = sema.find_type(root, &Name::new("Nope"));
        assert!(!missing.is_found());
    }

    #[test]
    fn package_lookup_always_succeeds() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let root = sema.wk.root_env;
        let res = sema.find_ident(root, &Name::new("java"), KindSet::TYPE | KindSet::PACKAGE);
        let package = res.symbol().unwrap();
        assert_eq!(sema.kind(package), SymbolKind::Package);
        assert_eq!(sema.name(package).as_str(), "java");
    }
}
