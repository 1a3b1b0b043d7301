//! Infers a generic method's substitution by structurally matching formal
//! parameter types against argument types.

use crate::context::Sema;
use crate::ids::{SymbolId, TypeId};
use crate::subst::TypeSubstitution;
use crate::types::TypeKind;

/// Existing bindings win; `extra` only contributes new variables.
fn merge(current: &TypeSubstitution, extra: &TypeSubstitution) -> TypeSubstitution {
    let mut merged = current.clone();
    for (variable, ty) in extra.pairs() {
        if merged.substituted_type(*variable).is_none() {
            merged.add(*variable, *ty);
        }
    }
    merged
}

impl<'a> Sema<'a> {
    pub(crate) fn infer_type_substitution(
        &mut self,
        method: SymbolId,
        formals: &[TypeId],
        args: &[TypeId],
    ) -> TypeSubstitution {
        let is_varargs = self.is_varargs(method);
        let variables = self.type_variables(method);
        self.infer_from_lists(is_varargs, &variables, formals, args)
    }

    /// Binds `variables` by matching a type mentioning them against the
    /// type its expression is assigned to.
    pub(crate) fn infer_from_target(
        &mut self,
        variables: &[TypeId],
        formal: TypeId,
        target: TypeId,
    ) -> TypeSubstitution {
        let inferred = self.infer_from_lists(false, variables, &[formal], &[target]);
        let mut substitution = TypeSubstitution::new();
        for (variable, ty) in inferred.pairs() {
            if variables.contains(variable) {
                substitution.add(*variable, *ty);
            }
        }
        substitution
    }

    fn infer_from_lists(
        &mut self,
        is_varargs: bool,
        variables: &[TypeId],
        formals: &[TypeId],
        args: &[TypeId],
    ) -> TypeSubstitution {
        let mut args = args.to_vec();
        let mut to_check = formals.len().min(args.len());
        // variable arity with no argument for the trailing parameter
        if is_varargs && formals.len() == args.len() + 1 {
            to_check += 1;
            args.push(self.wk.object_type);
        }
        let mut substitution = TypeSubstitution::new();
        for index in 0..to_check {
            let variable_arity = is_varargs && index + 1 == formals.len();
            let remaining = args[index..].to_vec();
            substitution = self.infer_one(
                substitution,
                formals[index],
                args[index],
                variable_arity,
                &remaining,
            );
            let bound: Vec<TypeId> = substitution.type_variables().collect();
            if !variables.is_empty() && variables.iter().all(|v| bound.contains(v)) {
                break;
            }
        }
        substitution
    }

    fn infer_one(
        &mut self,
        mut current: TypeSubstitution,
        formal: TypeId,
        arg: TypeId,
        variable_arity: bool,
        remaining: &[TypeId],
    ) -> TypeSubstitution {
        let arg = match self.ty(arg) {
            TypeKind::Deferred(crate::types::Deferred::Uninferred(partial)) => *partial,
            TypeKind::Deferred(_) => return current,
            _ => arg,
        };
        match self.ty(formal).clone() {
            TypeKind::TypeVar(_) => {
                if current.substituted_type(formal).is_none() {
                    let bound = if self.is_primitive(arg) {
                        self.boxed(arg)
                    } else if matches!(self.ty(arg), TypeKind::Null) {
                        self.wk.object_type
                    } else {
                        arg
                    };
                    current.add(formal, bound);
                }
                current
            }
            TypeKind::Array(formal_element) => {
                let element = match self.ty(arg) {
                    TypeKind::Array(element) => Some(*element),
                    _ if variable_arity => {
                        let boxed: Vec<TypeId> = remaining.iter().map(|t| self.boxed(*t)).collect();
                        Some(self.least_upper_bound(&boxed))
                    }
                    _ => None,
                };
                match element {
                    Some(element) => {
                        let inferred =
                            self.infer_one(current.clone(), formal_element, element, variable_arity, remaining);
                        merge(&current, &inferred)
                    }
                    None => current,
                }
            }
            TypeKind::Parameterized {
                symbol,
                substitution: formal_substitution,
            } => {
                let formal_args: Vec<TypeId> = formal_substitution.substituted_types().collect();
                if let Some(arg_substitution) = self.substitution_of(arg).cloned() {
                    if self.type_symbol(arg) == symbol {
                        let arg_args: Vec<TypeId> = arg_substitution.substituted_types().collect();
                        let inferred = self.infer_from_lists(false, &[], &formal_args, &arg_args);
                        return merge(&current, &inferred);
                    }
                }
                let erased_formal = self.erasure(formal);
                if arg == erased_formal || matches!(self.ty(arg), TypeKind::Null) {
                    let fakes = vec![self.wk.object_type; formal_args.len()];
                    let inferred = self.infer_from_lists(false, &[], &formal_args, &fakes);
                    return merge(&current, &inferred);
                }
                if self.ty(arg).is_class() && self.is_subtype(arg, erased_formal) {
                    if let Some(super_type) = self.as_super(arg, symbol) {
                        if super_type != arg {
                            return self.infer_one(current, formal, super_type, variable_arity, remaining);
                        }
                    }
                }
                current
            }
            TypeKind::Wildcard { bound, .. } => {
                let arg = match self.ty(arg) {
                    TypeKind::Wildcard { bound, .. } => *bound,
                    _ => arg,
                };
                let inferred = self.infer_one(current.clone(), bound, arg, variable_arity, remaining);
                merge(&current, &inferred)
            }
            _ => current,
        }
    }
}

#[cfg(test)]
mod tests {
    use nova_classpath::InMemoryClasspath;
    use pretty_assertions::assert_eq;

    use crate::context::test_support::{empty_tree, sema};
    use crate::flags::Flags;
    use crate::types::{MethodType, Primitive};

    #[test]
    fn infers_boxed_binding_and_first_binding_wins() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let owner = sema.new_type_symbol(Flags::PUBLIC, "Util".into(), sema.wk.default_package);
        let method = sema.new_method(Flags::PUBLIC | Flags::STATIC, "pair".into(), owner);
        let t = sema.add_type_parameter(method, "T".into());
        let t = sema.type_of_symbol(t);
        sema.set_method_type(
            method,
            MethodType {
                params: vec![t, t],
                result: Some(t),
                thrown: vec![],
            },
        );

        let int = sema.wk.primitive(Primitive::Int);
        let string = sema.wk.string_type;
        let substitution = sema.infer_type_substitution(method, &[t, t], &[int, string]);
        assert_eq!(substitution.substituted_type(t), Some(sema.wk.boxed(Primitive::Int)));
        assert_eq!(substitution.len(), 1);
    }

    #[test]
    fn infers_through_arrays_and_missing_varargs() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let owner = sema.new_type_symbol(Flags::PUBLIC, "Util".into(), sema.wk.default_package);
        let method = sema.new_method(Flags::PUBLIC | Flags::STATIC | Flags::VARARGS, "of".into(), owner);
        let t = sema.add_type_parameter(method, "T".into());
        let t = sema.type_of_symbol(t);
        let ts = sema.array_of(t);

        let string = sema.wk.string_type;
        let strings = sema.array_of(string);
        let from_array = sema.infer_type_substitution(method, &[ts], &[strings]);
        assert_eq!(from_array.substituted_type(t), Some(string));

        let none = sema.infer_type_substitution(method, &[ts], &[]);
        assert_eq!(none.substituted_type(t), Some(sema.wk.object_type));
    }
}
