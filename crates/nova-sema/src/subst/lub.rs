//! Least upper bound of a set of types.
//!
//! This is the usual approximation: intersections of several minimal
//! candidates are collapsed to a single representative chosen by sorting
//! classes before interfaces, then by simple name, then by full name.

use std::cmp::Ordering;

use indexmap::IndexSet;

use crate::context::Sema;
use crate::ids::TypeId;
use crate::subst::TypeSubstitution;
use crate::types::{TypeKind, WildcardKind};

impl<'a> Sema<'a> {
    pub fn least_upper_bound(&mut self, types: &[TypeId]) -> TypeId {
        let lub = self.cached_least_upper_bound(types);
        self.lub_in_progress.clear();
        lub
    }

    fn cached_least_upper_bound(&mut self, types: &[TypeId]) -> TypeId {
        let types: IndexSet<TypeId> = types.iter().copied().collect();
        let Some(first) = types.first().copied() else {
            return self.wk.unknown_type;
        };
        if types.len() == 1 {
            return first;
        }
        let all_primitive = types.iter().all(|ty| self.is_primitive(*ty));
        let boxed: Vec<TypeId> = if all_primitive {
            types.iter().copied().collect()
        } else {
            types.iter().map(|ty| self.boxed(*ty)).collect()
        };

        let supertypes: Vec<IndexSet<TypeId>> =
            boxed.iter().map(|ty| self.lub_supertypes(*ty)).collect();
        let mut erased: Vec<IndexSet<TypeId>> = Vec::with_capacity(supertypes.len());
        for set in &supertypes {
            let mut erased_set = IndexSet::new();
            for ty in set {
                erased_set.insert(self.erasure(*ty));
            }
            erased.push(erased_set);
        }

        let mut candidates: Vec<TypeId> = erased[0].iter().copied().collect();
        for set in &erased[1..] {
            candidates.retain(|ty| set.contains(ty));
        }
        let mut minimal = Vec::new();
        for v in &candidates {
            let mut dominated = false;
            for w in &candidates {
                if w != v && self.is_subtype(*w, *v) {
                    dominated = true;
                    break;
                }
            }
            if !dominated {
                minimal.push(*v);
            }
        }
        if minimal.is_empty() {
            return self.wk.unknown_type;
        }

        let best = self.best_candidate(minimal);
        let mut relevant: IndexSet<TypeId> = IndexSet::new();
        for set in &supertypes {
            for ty in set {
                if self.erasure(*ty) == best {
                    relevant.insert(*ty);
                }
            }
        }
        if !relevant.is_empty() && !relevant.contains(&best) {
            let mut key: Vec<TypeId> = types.iter().copied().collect();
            key.sort();
            if self.lub_in_progress.insert(key) {
                return self.least_containing_parameterization(relevant.into_iter().collect());
            }
        }
        best
    }

    /// The type itself, its interfaces (recursively), then each superclass
    /// followed by its interfaces; substitutions applied throughout.
    fn lub_supertypes(&mut self, ty: TypeId) -> IndexSet<TypeId> {
        let mut result = IndexSet::new();
        result.insert(ty);
        let symbol = self.type_symbol(ty);
        if self.is_unknown_symbol(symbol) || matches!(self.ty(ty), TypeKind::TypeVar(_)) {
            return result;
        }
        let mut substitution = self.substitution_of(ty).cloned().unwrap_or_default();
        let variables = self.type_variables(symbol);
        if substitution.is_empty() && !variables.is_empty() {
            substitution = self.erasure_substitution(&variables);
        }
        result.extend(self.lub_interfaces(symbol, &substitution));

        let mut superclass = self.superclass(symbol);
        let mut seen = vec![symbol];
        while let Some(super_type) = superclass {
            let substituted = self.apply_substitution(super_type, &substitution);
            let super_symbol = self.type_symbol(substituted);
            if self.is_unknown_symbol(super_symbol) || seen.contains(&super_symbol) {
                break;
            }
            seen.push(super_symbol);
            result.insert(substituted);
            substitution = self.substitution_of(substituted).cloned().unwrap_or_default();
            result.extend(self.lub_interfaces(super_symbol, &substitution));
            superclass = self.superclass(super_symbol);
        }
        result
    }

    fn lub_interfaces(
        &mut self,
        symbol: crate::ids::SymbolId,
        substitution: &TypeSubstitution,
    ) -> IndexSet<TypeId> {
        let mut result = IndexSet::new();
        for interface in self.interfaces(symbol) {
            let substituted = self.apply_substitution(interface, substitution);
            if substituted == self.class_type(symbol) {
                continue;
            }
            result.extend(self.lub_supertypes(substituted));
        }
        result
    }

    fn best_candidate(&mut self, candidates: Vec<TypeId>) -> TypeId {
        let mut keyed = Vec::with_capacity(candidates.len());
        for ty in candidates {
            let symbol = self.type_symbol(ty);
            let full_name = self.full_name(symbol);
            keyed.push((self.is_interface(symbol), self.name(symbol).to_string(), full_name, ty));
        }
        keyed.sort_by(|a, b| match (a.0, b.0) {
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            _ => a.1.cmp(&b.1).then_with(|| a.2.cmp(&b.2)),
        });
        keyed
            .first()
            .map(|(_, _, _, ty)| *ty)
            .unwrap_or(self.wk.unknown_type)
    }

    fn least_containing_parameterization(&mut self, mut types: Vec<TypeId>) -> TypeId {
        while types.len() > 1 {
            let second = types.remove(1);
            let reduced = self.least_containing_type_argument(types[0], second);
            types[0] = reduced;
        }
        types[0]
    }

    fn least_containing_type_argument(&mut self, first: TypeId, second: TypeId) -> TypeId {
        let (TypeKind::Parameterized {
            symbol,
            substitution: one,
        }, Some(two)) = (self.ty(first).clone(), self.substitution_of(second).cloned())
        else {
            return first;
        };
        let mut reduced = TypeSubstitution::new();
        for (variable, arg1) in one.pairs().to_vec() {
            let arg = match two.substituted_type(variable) {
                Some(arg2) => self.lcta(arg1, arg2),
                None => arg1,
            };
            reduced.add(variable, arg);
        }
        self.parameterized(symbol, reduced)
    }

    fn lcta(&mut self, first: TypeId, second: TypeId) -> TypeId {
        if first == second {
            return first;
        }
        let wildcard_of = |sema: &Self, ty: TypeId| match sema.ty(ty) {
            TypeKind::Wildcard { kind, bound } => Some((*kind, *bound)),
            _ => None,
        };
        match (wildcard_of(self, first), wildcard_of(self, second)) {
            (Some((WildcardKind::Super, b1)), Some((WildcardKind::Super, _))) => {
                // the greatest lower bound is approximated by the first type
                self.wildcard(WildcardKind::Super, b1)
            }
            (Some((WildcardKind::Extends, b1)), Some((WildcardKind::Extends, b2))) => {
                let lub = self.cached_least_upper_bound(&[b1, b2]);
                self.wildcard(WildcardKind::Extends, lub)
            }
            (Some((_, b1)), Some((_, b2))) => {
                if b1 == b2 {
                    b1
                } else {
                    self.wk.unbounded_wildcard
                }
            }
            (Some((kind, bound)), None) | (None, Some((kind, bound))) => {
                let plain = if wildcard_of(self, first).is_some() { second } else { first };
                if kind == WildcardKind::Super {
                    self.wildcard(WildcardKind::Super, plain)
                } else {
                    let lub = self.cached_least_upper_bound(&[plain, bound]);
                    self.wildcard(WildcardKind::Extends, lub)
                }
            }
            (None, None) => {
                let lub = self.cached_least_upper_bound(&[first, second]);
                self.wildcard(WildcardKind::Extends, lub)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use nova_classpath::InMemoryClasspath;
    use pretty_assertions::assert_eq;

    use crate::context::test_support::{empty_tree, sema};
    use crate::context::Sema;
    use crate::flags::Flags;
    use crate::ids::{SymbolId, TypeId};
    use crate::types::Primitive;

    fn subclass(sema: &mut Sema<'_>, name: &str, superclass: TypeId, package: SymbolId) -> TypeId {
        let symbol = sema.new_type_symbol(Flags::PUBLIC, name.into(), package);
        sema.set_supertypes(symbol, Some(superclass), vec![]);
        sema.class_type(symbol)
    }

    #[test]
    fn lub_of_one_type_is_that_type() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let string = sema.wk.string_type;
        assert_eq!(sema.least_upper_bound(&[string]), string);
        assert_eq!(sema.least_upper_bound(&[string, string]), string);
    }

    #[test]
    fn lub_of_sibling_classes_is_their_common_superclass() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let package = sema.wk.default_package;
        let object = sema.wk.object_type;
        let base_type = subclass(&mut sema, "Base", object, package);
        let a = subclass(&mut sema, "A", base_type, package);
        let b = subclass(&mut sema, "B", base_type, package);

        assert_eq!(sema.least_upper_bound(&[a, b]), base_type);
        assert_eq!(sema.least_upper_bound(&[b, a]), base_type);
    }

    #[test]
    fn same_named_interfaces_from_different_packages_order_by_full_name() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let object = sema.wk.object_type;
        let mut markers = Vec::new();
        for package in ["y", "x"] {
            let package = sema.enter_package(package);
            let marker = sema.new_type_symbol(Flags::PUBLIC | Flags::INTERFACE, "Marker".into(), package);
            sema.set_supertypes(marker, Some(object), vec![]);
            markers.push(sema.class_type(marker));
        }
        let (y_marker, x_marker) = (markers[0], markers[1]);
        let package = sema.wk.default_package;
        let a = sema.new_type_symbol(Flags::PUBLIC, "A".into(), package);
        sema.set_supertypes(a, Some(object), vec![y_marker, x_marker]);
        let b = sema.new_type_symbol(Flags::PUBLIC, "B".into(), package);
        sema.set_supertypes(b, Some(object), vec![x_marker, y_marker]);
        let (a, b) = (sema.class_type(a), sema.class_type(b));

        assert_eq!(sema.least_upper_bound(&[a, b]), x_marker);
        assert_eq!(sema.least_upper_bound(&[b, a]), x_marker);
    }

    #[test]
    fn lub_of_primitives_stays_unboxed_only_when_all_primitive() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let int = sema.wk.primitive(Primitive::Int);
        let boxed = sema.wk.boxed(Primitive::Int);
        assert_eq!(sema.least_upper_bound(&[int, boxed]), boxed);
    }
}
