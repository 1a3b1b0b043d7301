use crate::context::Sema;
use crate::ids::{SymbolId, TypeId};
use crate::subst::TypeSubstitution;
use crate::types::{Deferred, MethodType, TypeKind};

impl<'a> Sema<'a> {
    /// Replaces the substitution's type variables throughout `ty`. Results
    /// are interned, so applying an identity substitution returns `ty`.
    pub fn apply_substitution(&mut self, ty: TypeId, substitution: &TypeSubstitution) -> TypeId {
        if substitution.is_empty() {
            return ty;
        }
        if let Some(substituted) = substitution.substituted_type(ty) {
            return substituted;
        }
        match self.ty(ty).clone() {
            TypeKind::Parameterized {
                symbol,
                substitution: own,
            } => {
                let mut replaced = TypeSubstitution::new();
                for (variable, arg) in own.pairs() {
                    let arg = self.apply_substitution(*arg, substitution);
                    replaced.add(*variable, arg);
                }
                if replaced == own {
                    ty
                } else {
                    self.parameterized(symbol, replaced)
                }
            }
            TypeKind::Wildcard { kind, bound } => {
                let substituted = self.apply_substitution(bound, substitution);
                if substituted == bound {
                    ty
                } else {
                    self.wildcard(kind, substituted)
                }
            }
            TypeKind::Array(element) => {
                let substituted = self.apply_substitution(element, substitution);
                if substituted == element {
                    ty
                } else {
                    self.array_of(substituted)
                }
            }
            TypeKind::Method(method) => {
                let params = self.apply_substitution_all(&method.params, substitution);
                let result = method
                    .result
                    .map(|result| self.apply_substitution(result, substitution));
                let thrown = self.apply_substitution_all(&method.thrown, substitution);
                let replaced = MethodType {
                    params,
                    result,
                    thrown,
                };
                if replaced == method {
                    ty
                } else {
                    self.alloc_type(TypeKind::Method(replaced))
                }
            }
            TypeKind::Intersection(parts) => {
                let replaced = self.apply_substitution_all(&parts, substitution);
                if replaced == parts {
                    ty
                } else {
                    self.alloc_type(TypeKind::Intersection(replaced))
                }
            }
            _ => ty,
        }
    }

    pub fn apply_substitution_all(
        &mut self,
        types: &[TypeId],
        substitution: &TypeSubstitution,
    ) -> Vec<TypeId> {
        types
            .iter()
            .map(|ty| self.apply_substitution(*ty, substitution))
            .collect()
    }

    /// Applies the substitution of a parameterized `site`; other sites leave
    /// `ty` unchanged.
    pub fn apply_site_substitution(&mut self, ty: TypeId, site: TypeId) -> TypeId {
        match self.substitution_of(site).cloned() {
            Some(substitution) => self.apply_substitution(ty, &substitution),
            None => ty,
        }
    }

    /// Result type of a call: site substitutions of the declaring and the
    /// calling type, then the inferred substitution. A result still
    /// mentioning the method's own type variables becomes deferred.
    pub(crate) fn substituted_return_type(
        &mut self,
        result: Option<TypeId>,
        def_site: TypeId,
        call_site: TypeId,
        substitution: &TypeSubstitution,
        method_variables: &[TypeId],
    ) -> Option<TypeId> {
        let mut ty = self.apply_site_substitution(result?, def_site);
        if call_site != def_site {
            ty = self.apply_site_substitution(ty, call_site);
        }
        ty = self.apply_substitution(ty, substitution);
        if self.mentions_any(ty, method_variables) {
            return Some(self.deferred(Deferred::Uninferred(ty)));
        }
        Some(ty)
    }

    fn mentions_any(&self, ty: TypeId, variables: &[TypeId]) -> bool {
        if variables.contains(&ty) {
            return true;
        }
        match self.ty(ty) {
            TypeKind::Array(element) => self.mentions_any(*element, variables),
            TypeKind::Wildcard { bound, .. } => self.mentions_any(*bound, variables),
            TypeKind::Parameterized { substitution, .. } => substitution
                .substituted_types()
                .any(|arg| self.mentions_any(arg, variables)),
            _ => false,
        }
    }

    /// Substitution explicitly given by `<A, B>foo()`; empty when the
    /// counts differ.
    pub(crate) fn substitution_from_type_arguments(
        &self,
        variables: &[TypeId],
        args: &[TypeId],
    ) -> TypeSubstitution {
        if variables.len() != args.len() {
            return TypeSubstitution::new();
        }
        TypeSubstitution::from_pairs(variables, args)
    }

    /// Substitution under which `method` is applicable to `args`, or `None`
    /// when it cannot be inferred or violates a bound. Non-generic methods
    /// always get the empty substitution.
    pub(crate) fn method_substitution(
        &mut self,
        method: SymbolId,
        site: TypeId,
        type_args: &[TypeId],
        args: &[TypeId],
    ) -> Option<TypeSubstitution> {
        let variables = self.type_variables(method);
        if variables.is_empty() {
            return Some(TypeSubstitution::new());
        }
        let formals = self.parameter_types(method);
        let substitution = if !type_args.is_empty() {
            self.substitution_from_type_arguments(&variables, type_args)
        } else if formals.is_empty() {
            return Some(TypeSubstitution::new());
        } else {
            let formals: Vec<TypeId> = formals
                .into_iter()
                .map(|formal| self.apply_site_substitution(formal, site))
                .collect();
            self.infer_type_substitution(method, &formals, args)
        };
        if substitution.is_empty() || !self.is_valid_substitution(&substitution, site) {
            return None;
        }
        Some(substitution)
    }

    fn is_valid_substitution(&mut self, candidate: &TypeSubstitution, site: TypeId) -> bool {
        for (variable, arg) in candidate.pairs().to_vec() {
            let variable_symbol = self.type_symbol(variable);
            for bound in self.bounds(variable_symbol) {
                let mut current = self.apply_substitution(bound, candidate);
                let mut seen = vec![current];
                while matches!(self.ty(current), TypeKind::TypeVar(_)) {
                    let next = candidate
                        .substituted_type(current)
                        .or_else(|| self.substitution_of(site).and_then(|s| s.substituted_type(current)));
                    let Some(next) = next else {
                        let site_symbol = self.type_symbol(site);
                        return self.type_variables(site_symbol).contains(&current);
                    };
                    if seen.contains(&next) {
                        break;
                    }
                    seen.push(next);
                    current = next;
                }
                if !self.is_subtype(arg, current) {
                    return false;
                }
            }
        }
        true
    }

    /// Maps each variable to its erasure; used for raw types.
    pub(crate) fn erasure_substitution(&mut self, variables: &[TypeId]) -> TypeSubstitution {
        let erased: Vec<TypeId> = variables.iter().map(|v| self.erasure(*v)).collect();
        TypeSubstitution::from_pairs(variables, &erased)
    }

    /// Function type of a parameterized functional interface: wildcard
    /// arguments are replaced by their bounds.
    pub(crate) fn function_type(&mut self, ty: TypeId) -> TypeId {
        let TypeKind::Parameterized {
            symbol,
            substitution,
        } = self.ty(ty).clone()
        else {
            return ty;
        };
        let mut replaced = TypeSubstitution::new();
        for (variable, arg) in substitution.pairs() {
            let arg = match self.ty(*arg) {
                TypeKind::Wildcard { bound, .. } => *bound,
                _ => *arg,
            };
            replaced.add(*variable, arg);
        }
        self.parameterized(symbol, replaced)
    }

    /// `C<T1..Tn>` with each variable mapped to itself.
    pub(crate) fn identity_parameterization(&mut self, class: SymbolId) -> TypeId {
        let variables = self.type_variables(class);
        if variables.is_empty() {
            return self.class_type(class);
        }
        let substitution = TypeSubstitution::from_pairs(&variables, &variables);
        self.parameterized(class, substitution)
    }
}

#[cfg(test)]
mod tests {
    use nova_classpath::InMemoryClasspath;
    use pretty_assertions::assert_eq;

    use crate::context::test_support::{empty_tree, sema};
    use crate::flags::Flags;
    use crate::subst::TypeSubstitution;
    use crate::types::WildcardKind;

    #[test]
    fn identity_substitution_is_a_no_op() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let holder = sema.new_type_symbol(Flags::PUBLIC, "Holder".into(), sema.wk.default_package);
        let t = sema.add_type_parameter(holder, "T".into());
        let u = sema.add_type_parameter(holder, "U".into());
        let (t, u) = (sema.type_of_symbol(t), sema.type_of_symbol(u));

        let identity = TypeSubstitution::from_pairs(&[t, u], &[t, u]);
        let holder_tu = sema.parameterized(holder, identity.clone());
        let wildcard = sema.wildcard(WildcardKind::Extends, t);
        let holder_wild = sema.parameterized(holder, TypeSubstitution::from_pairs(&[t, u], &[wildcard, u]));
        let array = sema.array_of(holder_wild);

        for ty in [t, u, holder_tu, wildcard, holder_wild, array] {
            assert_eq!(sema.apply_substitution(ty, &identity), ty);
        }
    }

    #[test]
    fn substitution_rebuilds_interned_types() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let holder = sema.new_type_symbol(Flags::PUBLIC, "Holder".into(), sema.wk.default_package);
        let t = sema.add_type_parameter(holder, "T".into());
        let t = sema.type_of_symbol(t);
        let string = sema.wk.string_type;

        let holder_t = sema.parameterized(holder, TypeSubstitution::from_pairs(&[t], &[t]));
        let ts = sema.array_of(holder_t);
        let to_string = TypeSubstitution::from_pairs(&[t], &[string]);
        let substituted = sema.apply_substitution(ts, &to_string);

        let holder_string = sema.parameterized(holder, to_string.clone());
        assert_eq!(substituted, sema.array_of(holder_string));
        assert_eq!(sema.display(substituted), "Holder<java.lang.String>[]");
    }
}
