//! Visibility of classes and members from a lexical environment.

use crate::context::Sema;
use crate::flags::Flags;
use crate::ids::{EnvId, SymbolId};

impl<'a> Sema<'a> {
    /// Can code in `env` refer to class `class`?
    pub fn is_class_accessible(&mut self, env: EnvId, class: SymbolId) -> bool {
        let flags = self.flags(class) & Flags::ACCESS;
        let env = self.env(env).clone();
        if flags.contains(Flags::PRIVATE) {
            let owner = self.owner(class);
            return match (env.enclosing_class, owner) {
                (Some(enclosing), Some(owner)) => self.same_outermost_class(enclosing, owner),
                _ => false,
            };
        }
        if flags.contains(Flags::PUBLIC) {
            return true;
        }
        let same_package = env.package == self.package_of(class);
        if flags.contains(Flags::PROTECTED) {
            return same_package
                || match (env.enclosing_class, self.owner(class)) {
                    (Some(enclosing), Some(owner)) => self.is_inner_subclass(enclosing, owner),
                    _ => false,
                };
        }
        same_package
    }

    /// Is `symbol` accessible as a member of `site` from `env`? Protected
    /// members are treated like public ones.
    pub fn is_accessible(&mut self, env: EnvId, site: SymbolId, symbol: SymbolId) -> bool {
        let flags = self.flags(symbol) & Flags::ACCESS;
        if flags.contains(Flags::PRIVATE) {
            let Some(enclosing) = self.env(env).enclosing_class else {
                // imports are checked without an enclosing class
                return false;
            };
            let Some(owner) = self.owner(symbol) else {
                return false;
            };
            return self.same_outermost_class(enclosing, owner) && self.is_inherited_in(symbol, site);
        }
        if flags.contains(Flags::PUBLIC) || flags.contains(Flags::PROTECTED) {
            return self.is_class_accessible(env, site);
        }
        self.env(env).package == self.package_of(symbol)
            && self.is_class_accessible(env, site)
            && self.is_inherited_in(symbol, site)
    }

    /// Is `symbol` a member inherited by `class`? Package-private members
    /// are inherited only along a superclass chain that stays inside their
    /// package.
    pub fn is_inherited_in(&mut self, symbol: SymbolId, class: SymbolId) -> bool {
        let flags = self.flags(symbol) & Flags::ACCESS;
        if flags.contains(Flags::PUBLIC) || flags.contains(Flags::PROTECTED) {
            return true;
        }
        if flags.contains(Flags::PRIVATE) {
            return self.owner(symbol) == Some(class);
        }
        let package = self.package_of(symbol);
        let owner = self.owner(symbol);
        let mut current = Some(class);
        let mut seen = Vec::new();
        while let Some(sup) = current {
            if Some(sup) == owner || seen.contains(&sup) {
                break;
            }
            if self.package_of(sup) != package {
                return false;
            }
            seen.push(sup);
            current = self
                .superclass(sup)
                .map(|ty| self.type_symbol(ty))
                .filter(|symbol| !self.is_unknown_symbol(*symbol));
        }
        true
    }

    /// `class` extends or implements `base`, directly or not.
    pub fn is_sub_class(&mut self, class: SymbolId, base: SymbolId) -> bool {
        let mut visited = Vec::new();
        self.is_sub_class_in(class, base, &mut visited)
    }

    fn is_sub_class_in(&mut self, class: SymbolId, base: SymbolId, visited: &mut Vec<SymbolId>) -> bool {
        if class == base {
            return true;
        }
        if visited.contains(&class) || self.is_unknown_symbol(class) {
            return false;
        }
        visited.push(class);
        if self.is_interface(base) {
            for interface in self.interfaces(class) {
                let symbol = self.type_symbol(interface);
                if self.is_sub_class_in(symbol, base, visited) {
                    return true;
                }
            }
        }
        match self.superclass(class) {
            Some(superclass) => {
                let symbol = self.type_symbol(superclass);
                self.is_sub_class_in(symbol, base, visited)
            }
            None => false,
        }
    }

    /// `class` or one of its lexically enclosing classes is a subclass of
    /// `base`.
    fn is_inner_subclass(&mut self, class: SymbolId, base: SymbolId) -> bool {
        let mut current = Some(class);
        while let Some(candidate) = current {
            if self.is_sub_class(candidate, base) {
                return true;
            }
            current = self
                .owner(candidate)
                .and_then(|owner| self.enclosing_class(owner));
        }
        false
    }

    pub(crate) fn same_outermost_class(&self, a: SymbolId, b: SymbolId) -> bool {
        self.outermost_class(a) == self.outermost_class(b)
    }
}

#[cfg(test)]
mod tests {
    use nova_classpath::InMemoryClasspath;

    use crate::context::test_support::{empty_tree, sema};
    use crate::context::Sema;
    use crate::env::Env;
    use crate::flags::Flags;
    use crate::ids::{EnvId, SymbolId};

    fn env_in(sema: &mut Sema<'_>, class: SymbolId) -> EnvId {
        let root = sema.wk.root_env;
        let mut env: Env = sema.dup_env(root);
        env.outer = Some(root);
        env.enclosing_class = Some(class);
        env.package = sema.package_of(class);
        sema.alloc_env(env)
    }

    #[test]
    fn private_members_are_visible_inside_the_outermost_class_only() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let package = sema.enter_package("p");
        let c = sema.new_type_symbol(Flags::PUBLIC, "C".into(), package);
        let inner = sema.new_type_symbol(Flags::STATIC, "Inner".into(), c);
        let other = sema.new_type_symbol(Flags::empty(), "Other".into(), package);
        let secret = sema.new_variable(Flags::PRIVATE, "secret".into(), None, c);

        let in_c = env_in(&mut sema, c);
        let in_inner = env_in(&mut sema, inner);
        let in_other = env_in(&mut sema, other);
        assert!(sema.is_accessible(in_c, c, secret));
        assert!(sema.is_accessible(in_inner, c, secret));
        assert!(!sema.is_accessible(in_other, c, secret));
        // imports have no enclosing class
        let root = sema.wk.root_env;
        assert!(!sema.is_accessible(root, c, secret));
    }

    #[test]
    fn package_private_members_need_the_same_package() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let p = sema.enter_package("p");
        let q = sema.enter_package("q");
        let base = sema.new_type_symbol(Flags::PUBLIC, "Base".into(), p);
        let field = sema.new_variable(Flags::empty(), "count".into(), None, base);
        let neighbour = sema.new_type_symbol(Flags::PUBLIC, "Neighbour".into(), p);
        let stranger = sema.new_type_symbol(Flags::PUBLIC, "Stranger".into(), q);

        let in_neighbour = env_in(&mut sema, neighbour);
        let in_stranger = env_in(&mut sema, stranger);
        assert!(sema.is_accessible(in_neighbour, base, field));
        assert!(!sema.is_accessible(in_stranger, base, field));

        let hidden = sema.new_type_symbol(Flags::empty(), "Hidden".into(), p);
        assert!(sema.is_class_accessible(in_neighbour, hidden));
        assert!(!sema.is_class_accessible(in_stranger, hidden));
    }

    #[test]
    fn package_private_members_are_not_inherited_across_packages() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let p = sema.enter_package("p");
        let q = sema.enter_package("q");
        let base = sema.new_type_symbol(Flags::PUBLIC, "Base".into(), p);
        let field = sema.new_variable(Flags::empty(), "count".into(), None, base);
        let base_type = sema.class_type(base);
        let same = sema.new_type_symbol(Flags::PUBLIC, "Same".into(), p);
        sema.set_supertypes(same, Some(base_type), vec![]);
        let foreign = sema.new_type_symbol(Flags::PUBLIC, "Foreign".into(), q);
        sema.set_supertypes(foreign, Some(base_type), vec![]);

        assert!(sema.is_inherited_in(field, same));
        assert!(!sema.is_inherited_in(field, foreign));
        assert!(sema.is_sub_class(foreign, base));
        assert!(!sema.is_sub_class(base, foreign));
    }
}
