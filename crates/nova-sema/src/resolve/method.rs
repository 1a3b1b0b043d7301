//! Overload resolution for methods and constructors, and the functional
//! interface queries lambdas and method references need.
//!
//! Candidates are searched in three phases: strict invocation (subtyping
//! only), loose invocation (boxing and unboxing allowed) and variable
//! arity. A later phase runs only when the earlier ones found nothing.

use crate::context::Sema;
use crate::flags::Flags;
use crate::ids::{EnvId, NodeId, ScopeId, SymbolId, TypeId};
use crate::resolve::{Resolution, ResolveError};
use crate::subst::TypeSubstitution;
use crate::symbols::SymbolKind;
use crate::tree::{Name, NodeKind};
use crate::types::{Deferred, TypeKind};

pub const CONSTRUCTOR_NAME: &str = "<init>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Strict,
    Loose,
    VariableArity,
}

impl Phase {
    fn allows_boxing(self) -> bool {
        !matches!(self, Phase::Strict)
    }

    fn is_variable_arity(self) -> bool {
        matches!(self, Phase::VariableArity)
    }
}

/// Outcome of comparing a new candidate with the best method so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Specificity {
    Candidate,
    BestSoFar,
    /// Same signature (an override): the one found first stays.
    SameSignature,
    Ambiguous,
}

/// Best method so far. An ambiguity keeps every candidate involved, so a
/// later method more specific than all of them still replaces it.
#[derive(Debug, Clone)]
struct Best {
    res: Resolution,
    ambiguous: Vec<Resolution>,
}

impl Best {
    fn new(res: Resolution) -> Self {
        Self {
            res,
            ambiguous: Vec::new(),
        }
    }

    fn ambiguous_symbols(&self) -> Vec<SymbolId> {
        self.ambiguous.iter().filter_map(Resolution::symbol).collect()
    }
}

/// One call being resolved.
struct Call<'c> {
    env: EnvId,
    call_site: TypeId,
    name: &'c Name,
    args: &'c [TypeId],
    type_args: &'c [TypeId],
    phase: Phase,
}

impl<'a> Sema<'a> {
    /// An unqualified call `name(args)`: the enclosing classes from the
    /// innermost outwards, then static imports.
    pub fn find_method(&mut self, env: EnvId, name: &Name, args: &[TypeId], type_args: &[TypeId]) -> Resolution {
        let mut best = self.unresolved(ResolveError::NotFound);
        let mut current = env;
        while let Some(outer) = self.env(current).outer {
            if let Some(class) = self.env(current).enclosing_class {
                let site = self.identity_parameterization(class);
                let res = self.find_method_in(current, site, name, args, type_args);
                if res.is_found() {
                    return res;
                }
                if res.is_better_than(&best) {
                    best = res;
                }
            }
            current = outer;
        }
        let res = self.find_method_in_static_imports(env, name, args, type_args);
        if res.is_found() || res.is_better_than(&best) {
            return res;
        }
        best
    }

    fn find_method_in_static_imports(
        &mut self,
        env: EnvId,
        name: &Name,
        args: &[TypeId],
        type_args: &[TypeId],
    ) -> Resolution {
        let imports = self.env(env).clone();
        let site = match imports.enclosing_class {
            Some(class) => self.class_type(class),
            None => self.wk.unknown_type,
        };
        let mut best = Best::new(self.unresolved(ResolveError::NotFound));
        for phase in [Phase::Strict, Phase::Loose, Phase::VariableArity] {
            let call = Call {
                env,
                call_site: site,
                name,
                args,
                type_args,
                phase,
            };
            for scope in [imports.named_imports, imports.static_star_imports] {
                best = self.lookup_in_scope(&call, site, scope, best);
                if best.res.is_found() {
                    return best.res;
                }
            }
        }
        best.res
    }

    /// A call on `site` (`site.name(args)`); `this` and `super` name the
    /// constructors of the site and of its superclass.
    pub fn find_method_in(
        &mut self,
        env: EnvId,
        site: TypeId,
        name: &Name,
        args: &[TypeId],
        type_args: &[TypeId],
    ) -> Resolution {
        match name.as_str() {
            "this" => self.find_constructor(env, site, args, type_args),
            "super" => {
                let class = self.type_symbol(site);
                match self.superclass(class) {
                    Some(superclass) => self.find_constructor(env, superclass, args, type_args),
                    None => self.unresolved(ResolveError::NotFound),
                }
            }
            _ => self.find_method_by_phases(env, site, name, args, type_args),
        }
    }

    /// Constructor of the class of `site`. Inner classes take the enclosing
    /// instance as an implicit first argument.
    pub fn find_constructor(&mut self, env: EnvId, site: TypeId, args: &[TypeId], type_args: &[TypeId]) -> Resolution {
        let class = self.type_symbol(site);
        let mut all_args = Vec::with_capacity(args.len() + 1);
        all_args.extend(self.implicit_outer_type(class));
        all_args.extend_from_slice(args);
        let name = Name::new(CONSTRUCTOR_NAME);
        self.find_method_by_phases(env, site, &name, &all_args, type_args)
    }

    fn find_method_by_phases(
        &mut self,
        env: EnvId,
        site: TypeId,
        name: &Name,
        args: &[TypeId],
        type_args: &[TypeId],
    ) -> Resolution {
        let mut best = self.unresolved(ResolveError::NotFound);
        for phase in [Phase::Strict, Phase::Loose, Phase::VariableArity] {
            if phase == Phase::Loose && args.is_empty() {
                continue;
            }
            let call = Call {
                env,
                call_site: site,
                name,
                args,
                type_args,
                phase,
            };
            let mut visited = Vec::new();
            let res = self.find_method_in_type(&call, site, &mut visited).res;
            tracing::trace!(
                target: "nova.sema",
                method = %name,
                ?phase,
                found = res.is_found(),
                "overload resolution phase"
            );
            if res.is_found() {
                return res;
            }
            if res.is_better_than(&best) {
                best = res;
            }
        }
        best
    }

    /// Candidates declared in `site`, then those inherited from its
    /// supertypes. Each type is searched once.
    fn find_method_in_type(&mut self, call: &Call<'_>, site: TypeId, visited: &mut Vec<SymbolId>) -> Best {
        let mut best = Best::new(self.unresolved(ResolveError::NotFound));
        let class = self.type_symbol(site);
        if self.is_unknown_symbol(class) || visited.contains(&class) {
            return best;
        }
        visited.push(class);
        if let Some(members) = self.members(class) {
            best = self.lookup_in_scope(call, site, members, best);
        }
        if call.name == CONSTRUCTOR_NAME {
            return best;
        }

        let supertypes: Vec<TypeId> = self.superclass(class).into_iter().chain(self.interfaces(class)).collect();
        for super_type in supertypes {
            let inherited = self.find_method_in_type(call, super_type, visited);
            let methods = match inherited.res.symbol {
                Ok(_) => vec![inherited.res],
                Err(ResolveError::Ambiguous) if !inherited.ambiguous.is_empty() => inherited.ambiguous,
                Err(_) => {
                    if inherited.res.is_better_than(&best.res) {
                        best = inherited;
                    }
                    continue;
                }
            };
            // Each inherited candidate competes with the subclass's best,
            // including every member of a subclass ambiguity.
            for mut method in methods {
                let Ok(symbol) = method.symbol else {
                    continue;
                };
                method.ty = self.apply_site_substitution(method.ty, super_type);
                method.ty = self.apply_site_substitution(method.ty, site);
                let substitution = self
                    .method_substitution(symbol, call.call_site, call.type_args, call.args)
                    .unwrap_or_default();
                if let Some(next) = self.keep_most_specific(call, method, &substitution, &best) {
                    best = next;
                }
            }
        }
        best
    }

    fn lookup_in_scope(&mut self, call: &Call<'_>, def_site: TypeId, scope: ScopeId, best_found: Best) -> Best {
        let mut best = best_found;
        for symbol in self.lookup(scope, call.name) {
            if self.kind(symbol) != SymbolKind::Method {
                continue;
            }
            if let Some(res) = self.select_best(call, def_site, symbol, &best) {
                best = res;
            }
        }
        best
    }

    /// Compares `candidate`, declared in `def_site`, with the best method so
    /// far. `None` keeps the current best.
    fn select_best(
        &mut self,
        call: &Call<'_>,
        def_site: TypeId,
        candidate: SymbolId,
        best_so_far: &Best,
    ) -> Option<Best> {
        let call_class = self.type_symbol(call.call_site);
        if !self.is_inherited_in(candidate, call_class) {
            return None;
        }
        let method_type = self.method_type(candidate)?;
        let varargs = self.is_varargs(candidate);
        if !has_compatible_arity(method_type.params.len(), call.args.len(), varargs, call.phase) {
            return None;
        }
        let substitution = self.method_substitution(candidate, call.call_site, call.type_args, call.args)?;

        let mut formals = method_type.params.clone();
        if def_site != call.call_site {
            formals = self.apply_site_substitution_all(&formals, def_site);
        }
        formals = self.apply_site_substitution_all(&formals, call.call_site);
        formals = self.apply_substitution_all(&formals, &substitution);
        let expand = varargs && call.phase.is_variable_arity();
        if !self.is_arguments_acceptable(call.env, call.args, &formals, expand, call.phase.allows_boxing()) {
            return None;
        }

        if !self.is_accessible(call.env, call_class, candidate) {
            let denied = self.unresolved(ResolveError::AccessDenied(candidate));
            return denied.is_better_than(&best_so_far.res).then(|| Best::new(denied));
        }

        let unchecked = !self.is_static(candidate)
            && !self.is_constructor(candidate)
            && call.type_args.is_empty()
            && self.is_raw_generic(def_site);
        let (result, thrown) = if unchecked {
            let result = method_type.result.map(|result| self.erasure(result));
            let thrown = method_type
                .thrown
                .iter()
                .map(|thrown| self.erasure(*thrown))
                .collect();
            (result, thrown)
        } else {
            let variables = self.type_variables(candidate);
            let result = self.substituted_return_type(
                method_type.result,
                def_site,
                call.call_site,
                &substitution,
                &variables,
            );
            (result, method_type.thrown.clone())
        };
        let ty = self.method_type_of(formals, result, thrown);
        self.keep_most_specific(call, Resolution::found(candidate, ty), &substitution, best_so_far)
    }

    /// Weighs an applicable method against the best so far: it replaces the
    /// best, joins an ambiguity, or is dropped (`None`).
    fn keep_most_specific(
        &mut self,
        call: &Call<'_>,
        found: Resolution,
        substitution: &TypeSubstitution,
        best_so_far: &Best,
    ) -> Option<Best> {
        let candidate = found.symbol()?;
        match self.select_most_specific(call, candidate, substitution, best_so_far) {
            Specificity::Candidate => Some(Best::new(found)),
            Specificity::BestSoFar | Specificity::SameSignature => None,
            Specificity::Ambiguous => {
                let mut ambiguous = match best_so_far.res.symbol {
                    Ok(_) => vec![best_so_far.res],
                    Err(_) => best_so_far.ambiguous.clone(),
                };
                ambiguous.push(found);
                Some(Best {
                    res: self.unresolved(ResolveError::Ambiguous),
                    ambiguous,
                })
            }
        }
    }

    fn apply_site_substitution_all(&mut self, types: &[TypeId], site: TypeId) -> Vec<TypeId> {
        types
            .iter()
            .map(|ty| self.apply_site_substitution(*ty, site))
            .collect()
    }

    /// A raw use of a generic class.
    fn is_raw_generic(&mut self, site: TypeId) -> bool {
        if !matches!(self.ty(site), TypeKind::Class(_)) {
            return false;
        }
        let class = self.type_symbol(site);
        !self.type_variables(class).is_empty()
    }

    fn select_most_specific(
        &mut self,
        call: &Call<'_>,
        candidate: SymbolId,
        candidate_substitution: &TypeSubstitution,
        best_so_far: &Best,
    ) -> Specificity {
        match best_so_far.res.symbol {
            Ok(best) if self.kind(best) == SymbolKind::Method => {
                self.compare_specificity(call, candidate, candidate_substitution, best)
            }
            Err(ResolveError::Ambiguous) if !best_so_far.ambiguous.is_empty() => {
                let mut more_specific_than_all = true;
                let mut less_specific_than_all = true;
                for other in best_so_far.ambiguous_symbols() {
                    match self.compare_specificity(call, candidate, candidate_substitution, other) {
                        Specificity::Candidate => less_specific_than_all = false,
                        Specificity::BestSoFar | Specificity::SameSignature => more_specific_than_all = false,
                        Specificity::Ambiguous => {
                            more_specific_than_all = false;
                            less_specific_than_all = false;
                        }
                    }
                }
                if more_specific_than_all {
                    Specificity::Candidate
                } else if less_specific_than_all {
                    Specificity::BestSoFar
                } else {
                    Specificity::Ambiguous
                }
            }
            _ => Specificity::Candidate,
        }
    }

    fn compare_specificity(
        &mut self,
        call: &Call<'_>,
        candidate: SymbolId,
        candidate_substitution: &TypeSubstitution,
        best: SymbolId,
    ) -> Specificity {
        let best_substitution = if self.is_generic_method(best) {
            self.method_substitution(best, call.call_site, &[], call.args)
                .unwrap_or_default()
        } else {
            TypeSubstitution::new()
        };
        let candidate_more = self.is_signature_more_specific(
            call,
            (candidate, candidate_substitution),
            (best, &best_substitution),
        );
        let best_more = self.is_signature_more_specific(
            call,
            (best, &best_substitution),
            (candidate, candidate_substitution),
        );
        match (candidate_more, best_more) {
            (true, true) => {
                match (self.is_generic_method(candidate), self.is_generic_method(best)) {
                    (true, false) => Specificity::BestSoFar,
                    (false, true) => Specificity::Candidate,
                    _ => Specificity::SameSignature,
                }
            }
            (true, false) => Specificity::Candidate,
            (false, true) => Specificity::BestSoFar,
            (false, false) if self.owner(candidate) == self.owner(best) => Specificity::Ambiguous,
            // methods of different classes: the one found first stays
            (false, false) => Specificity::BestSoFar,
        }
    }

    /// Every formal of `m1` is acceptable where `m2` expects its formals.
    fn is_signature_more_specific(
        &mut self,
        call: &Call<'_>,
        (m1, m1_substitution): (SymbolId, &TypeSubstitution),
        (m2, m2_substitution): (SymbolId, &TypeSubstitution),
    ) -> bool {
        let mut m1_params = self.parameter_types(m1);
        let m2_params = self.parameter_types(m2);
        let variable_arity = call.phase.is_variable_arity();
        let m2_varargs = variable_arity && self.is_varargs(m2);
        if variable_arity && self.is_varargs(m1) {
            m1_params = self.expand_varargs(&m1_params, m2_params.len());
        }
        if !has_compatible_arity(m2_params.len(), m1_params.len(), m2_varargs, call.phase) {
            return false;
        }
        let m1_params = self.apply_substitution_all(&m1_params, m1_substitution);
        let m2_params = self.apply_substitution_all(&m2_params, m2_substitution);
        self.is_arguments_acceptable(call.env, &m1_params, &m2_params, m2_varargs, false)
    }

    /// Replaces the trailing array formal by its element type, repeated
    /// until there are at least `size - 1` formals.
    fn expand_varargs(&self, params: &[TypeId], size: usize) -> Vec<TypeId> {
        let mut expanded = params.to_vec();
        let Some(last) = expanded.last_mut() else {
            return expanded;
        };
        let Some(element) = self.element_type(*last) else {
            return expanded;
        };
        *last = element;
        while expanded.len() < size.saturating_sub(1) {
            expanded.push(element);
        }
        expanded
    }

    /// Arguments against formals; with `varargs` the trailing arguments are
    /// checked against the element type of the last formal, or against the
    /// array itself when a single argument is left for it.
    pub(crate) fn is_arguments_acceptable(
        &mut self,
        env: EnvId,
        args: &[TypeId],
        formals: &[TypeId],
        varargs: bool,
        boxing: bool,
    ) -> bool {
        if !varargs {
            return args.len() == formals.len()
                && args
                    .iter()
                    .zip(formals)
                    .all(|(arg, formal)| self.is_acceptable_type(env, *arg, *formal, boxing));
        }
        let Some(last_formal) = formals.last().copied() else {
            return false;
        };
        let Some(element) = self.element_type(last_formal) else {
            return false;
        };
        let trailing = (args.len() + 1).saturating_sub(formals.len());
        let leading = args.len() - trailing;
        for arg in &args[leading..] {
            let acceptable = self.is_acceptable_type(env, *arg, element, boxing)
                || (trailing == 1 && self.is_acceptable_type(env, *arg, last_formal, boxing));
            if !acceptable {
                return false;
            }
        }
        args[..leading]
            .iter()
            .zip(formals)
            .all(|(arg, formal)| self.is_acceptable_type(env, *arg, *formal, boxing))
    }

    fn is_acceptable_type(&mut self, env: EnvId, arg: TypeId, formal: TypeId, boxing: bool) -> bool {
        let arg_kind = self.ty(arg).clone();
        let formal_kind = self.ty(formal).clone();
        if let TypeKind::Deferred(deferred) = arg_kind {
            return self.is_acceptable_deferred_type(env, deferred, formal);
        }
        if matches!(formal_kind, TypeKind::TypeVar(_)) && !matches!(arg_kind, TypeKind::TypeVar(_)) {
            let arg = if boxing { self.boxed(arg) } else { arg };
            let mut visited = Vec::new();
            return self.is_subtype_of_type_var(arg, formal, &mut visited);
        }
        if let (TypeKind::Array(arg_element), TypeKind::Array(formal_element)) = (&arg_kind, &formal_kind) {
            return self.is_acceptable_type(env, *arg_element, *formal_element, boxing);
        }
        let generic = |kind: &TypeKind| matches!(kind, TypeKind::Parameterized { .. } | TypeKind::Wildcard { .. });
        if generic(&arg_kind) || generic(&formal_kind) {
            if self.call_with_raw_type(arg, formal) || self.is_subtype(arg, formal) {
                return true;
            }
            let erased = self.erasure(formal);
            return boxing && self.is_autoboxable(arg, erased);
        }
        let erased_arg = self.erasure(arg);
        let erased_formal = self.erasure(formal);
        self.is_subtype(erased_arg, erased_formal) || (boxing && self.is_autoboxable(arg, erased_formal))
    }

    /// A raw argument passed where a parameterization of its class (or a
    /// superclass) is expected.
    fn call_with_raw_type(&mut self, arg: TypeId, formal: TypeId) -> bool {
        if !matches!(self.ty(formal), TypeKind::Parameterized { .. })
            || matches!(self.ty(arg), TypeKind::Parameterized { .. })
        {
            return false;
        }
        let erased = self.erasure(formal);
        self.is_subtype(arg, erased)
    }

    fn is_subtype_of_type_var(&mut self, arg: TypeId, variable: TypeId, visited: &mut Vec<TypeId>) -> bool {
        if visited.contains(&variable) {
            return true;
        }
        visited.push(variable);
        let symbol = self.type_symbol(variable);
        for bound in self.bounds(symbol) {
            let acceptable = if matches!(self.ty(bound), TypeKind::TypeVar(_)) {
                self.is_subtype_of_type_var(arg, bound, visited)
            } else {
                self.is_subtype(arg, bound)
            };
            if !acceptable {
                return false;
            }
        }
        true
    }

    /// Deferred arguments are accepted unless their shape rules the formal
    /// out: a lambda of the wrong arity or a method reference that does not
    /// resolve against the function type.
    fn is_acceptable_deferred_type(&mut self, env: EnvId, deferred: Deferred, formal: TypeId) -> bool {
        let Some(node) = deferred.node() else {
            return true;
        };
        let tree = self.tree();
        match tree.kind(node) {
            NodeKind::Lambda { params, .. } => {
                let arity = params.len();
                self.find_sam_method_args(formal).len() == arity
            }
            NodeKind::MethodReference { expr, name, .. } => {
                let expr_type = self.type_of_node(*expr);
                let array_constructor = name == "new"
                    && expr_type.is_some_and(|ty| matches!(self.ty(ty), TypeKind::Array(_)));
                if array_constructor {
                    return true;
                }
                let sam_args = self.find_sam_method_args(formal);
                self.find_method_reference(env, &sam_args, node).is_found()
            }
            _ => true,
        }
    }

    /// Method named by a method reference for the given function type
    /// arguments. A reference on a type may also name an instance method
    /// whose receiver is the first argument.
    pub fn find_method_reference(&mut self, env: EnvId, sam_args: &[TypeId], node: NodeId) -> Resolution {
        let tree = self.tree();
        let NodeKind::MethodReference { expr, name, .. } = tree.kind(node) else {
            return self.unresolved(ResolveError::NotFound);
        };
        let expr = *expr;
        let name = if name == "new" {
            Name::new(CONSTRUCTOR_NAME)
        } else {
            name.clone()
        };
        let expr_type = self.type_of_node(expr).unwrap_or(self.wk.unknown_type);
        let res = self.find_method_by_phases(env, expr_type, &name, sam_args, &[]);

        let on_type = matches!(
            tree.kind(expr),
            NodeKind::Identifier(_) | NodeKind::MemberSelect { .. }
        ) && self
            .symbol_of_node(expr)
            .is_some_and(|symbol| self.is_type_symbol(symbol));
        if !on_type {
            return res;
        }
        let receiver_matches = match sam_args.first() {
            Some(first) => {
                let erased = self.erasure(expr_type);
                self.is_subtype(*first, erased)
            }
            None => true,
        };
        let instance_candidate = match res.symbol {
            Ok(symbol) => !self.is_static(symbol),
            Err(_) => true,
        };
        if receiver_matches && instance_candidate {
            let rest = sam_args.get(1..).unwrap_or_default();
            return self.find_method_by_phases(env, expr_type, &name, rest, &[]);
        }
        res
    }

    /// The single abstract method of a functional interface: the first
    /// abstract member that does not redeclare an `Object` method, else one
    /// inherited from a supertype.
    pub fn sam_method(&mut self, ty: TypeId) -> Option<SymbolId> {
        let class = self.type_symbol(ty);
        let mut visited = Vec::new();
        self.sam_method_in(class, &mut visited)
    }

    fn sam_method_in(&mut self, class: SymbolId, visited: &mut Vec<SymbolId>) -> Option<SymbolId> {
        if self.is_unknown_symbol(class) || visited.contains(&class) {
            return None;
        }
        visited.push(class);
        if let Some(members) = self.members(class) {
            for member in self.scope_symbols(members) {
                if self.kind(member) == SymbolKind::Method
                    && self.has_flag(member, Flags::ABSTRACT)
                    && !self.redeclares_object_method(member)
                {
                    return Some(member);
                }
            }
        }
        for super_type in self.direct_super_types(class) {
            let symbol = self.type_symbol(super_type);
            if let Some(method) = self.sam_method_in(symbol, visited) {
                return Some(method);
            }
        }
        None
    }

    fn redeclares_object_method(&mut self, method: SymbolId) -> bool {
        let mut seen = vec![method];
        let mut current = self.overridden_method(method);
        while let Some(overridden) = current {
            if self.owner(overridden) == Some(self.wk.object) {
                return true;
            }
            if seen.contains(&overridden) {
                break;
            }
            seen.push(overridden);
            current = self.overridden_method(overridden);
        }
        false
    }

    /// Parameter types of the function type of `ty`; wildcard arguments
    /// are replaced by their bounds. Empty when `ty` is not functional.
    pub fn find_sam_method_args(&mut self, ty: TypeId) -> Vec<TypeId> {
        let Some(method) = self.sam_method(ty) else {
            return Vec::new();
        };
        let params = self.parameter_types(method);
        let function_type = self.function_type(ty);
        let site = match self.owner(method) {
            Some(owner) => self.as_super(function_type, owner).unwrap_or(function_type),
            None => function_type,
        };
        params
            .into_iter()
            .map(|param| {
                let param = self.apply_site_substitution(param, site);
                match self.ty(param) {
                    TypeKind::Wildcard { bound, .. } => *bound,
                    _ => param,
                }
            })
            .collect()
    }
}

/// In the fixed-arity phases a method takes exactly its formal count; in
/// the variable-arity phase only varargs methods apply, with the array
/// parameter possibly empty.
fn has_compatible_arity(formals: usize, args: usize, varargs: bool, phase: Phase) -> bool {
    if phase.is_variable_arity() {
        varargs && args + 1 >= formals
    } else {
        formals == args
    }
}

#[cfg(test)]
mod tests {
    use nova_classpath::InMemoryClasspath;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::context::test_support::{empty_tree, sema};
    use crate::env::Env;
    use crate::types::Primitive;

    fn class_env(sema: &mut Sema<'_>, class: SymbolId) -> EnvId {
        let root = sema.wk.root_env;
        let mut env: Env = sema.dup_env(root);
        env.outer = Some(root);
        env.enclosing_class = Some(class);
        env.scope = sema.members(class).unwrap();
        sema.alloc_env(env)
    }

    fn declare(sema: &mut Sema<'_>, class: SymbolId, flags: Flags, name: &str, params: Vec<TypeId>) -> SymbolId {
        let method = sema.new_method(flags, name.into(), class);
        let void = sema.wk.void_type;
        let ty = sema.method_type_of(params, Some(void), vec![]);
        sema.set_symbol_type(method, ty);
        let members = sema.members(class).unwrap();
        sema.enter(members, method);
        method
    }

    fn holder(sema: &mut Sema<'_>) -> SymbolId {
        let package = sema.wk.default_package;
        let class = sema.new_type_symbol(Flags::PUBLIC, "Holder".into(), package);
        let object = sema.wk.object_type;
        sema.set_supertypes(class, Some(object), vec![]);
        class
    }

    #[test]
    fn strict_invocation_wins_over_boxing() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let class = holder(&mut sema);
        let int = sema.wk.primitive(Primitive::Int);
        let object = sema.wk.object_type;
        let by_int = declare(&mut sema, class, Flags::PUBLIC, "foo", vec![int]);
        let by_object = declare(&mut sema, class, Flags::PUBLIC, "foo", vec![object]);
        let env = class_env(&mut sema, class);

        let res = sema.find_method(env, &Name::new("foo"), &[int], &[]);
        assert_eq!(res.symbol(), Some(by_int));

        let string = sema.wk.string_type;
        let res = sema.find_method(env, &Name::new("foo"), &[string], &[]);
        assert_eq!(res.symbol(), Some(by_object));

        let boxed = sema.wk.boxed(Primitive::Int);
        let res = sema.find_method(env, &Name::new("foo"), &[boxed], &[]);
        assert_eq!(res.symbol(), Some(by_object));
    }

    #[test]
    fn boxing_applies_when_nothing_matches_strictly() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let class = holder(&mut sema);
        let object = sema.wk.object_type;
        let long = sema.wk.primitive(Primitive::Long);
        let by_object = declare(&mut sema, class, Flags::PUBLIC, "bar", vec![object]);
        let env = class_env(&mut sema, class);

        let int = sema.wk.primitive(Primitive::Int);
        assert_eq!(sema.find_method(env, &Name::new("bar"), &[int], &[]).symbol(), Some(by_object));

        let by_long = declare(&mut sema, class, Flags::PUBLIC, "baz", vec![long]);
        let boxed_int = sema.wk.boxed(Primitive::Int);
        assert_eq!(sema.find_method(env, &Name::new("baz"), &[boxed_int], &[]).symbol(), Some(by_long));
    }

    #[test]
    fn varargs_are_tried_last() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let class = holder(&mut sema);
        let string = sema.wk.string_type;
        let strings = sema.array_of(string);
        let fixed = declare(&mut sema, class, Flags::PUBLIC, "log", vec![string]);
        let variadic = declare(&mut sema, class, Flags::PUBLIC | Flags::VARARGS, "log", vec![strings]);
        let env = class_env(&mut sema, class);

        let name = Name::new("log");
        assert_eq!(sema.find_method(env, &name, &[string], &[]).symbol(), Some(fixed));
        assert_eq!(sema.find_method(env, &name, &[string, string], &[]).symbol(), Some(variadic));
        assert_eq!(sema.find_method(env, &name, &[], &[]).symbol(), Some(variadic));
        assert_eq!(sema.find_method(env, &name, &[strings], &[]).symbol(), Some(variadic));
    }

    #[test]
    fn unrelated_overloads_are_ambiguous() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let class = holder(&mut sema);
        let string = sema.wk.string_type;
        let integer = sema.wk.boxed(Primitive::Int);
        declare(&mut sema, class, Flags::PUBLIC, "take", vec![string]);
        declare(&mut sema, class, Flags::PUBLIC, "take", vec![integer]);
        let env = class_env(&mut sema, class);

        let null = sema.wk.null_type;
        let res = sema.find_method(env, &Name::new("take"), &[null], &[]);
        assert_eq!(res.symbol, Err(ResolveError::Ambiguous));
    }

    #[test]
    fn less_specific_overload_does_not_settle_an_ambiguity() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let class = holder(&mut sema);
        let integer = sema.wk.boxed(Primitive::Int);
        let object = sema.wk.object_type;
        declare(&mut sema, class, Flags::PUBLIC, "foo", vec![integer, object]);
        declare(&mut sema, class, Flags::PUBLIC, "foo", vec![object, integer]);
        declare(&mut sema, class, Flags::PUBLIC, "foo", vec![object, object]);
        let env = class_env(&mut sema, class);

        let res = sema.find_method(env, &Name::new("foo"), &[integer, integer], &[]);
        assert_eq!(res.symbol, Err(ResolveError::Ambiguous));

        let exact = declare(&mut sema, class, Flags::PUBLIC, "foo", vec![integer, integer]);
        let res = sema.find_method(env, &Name::new("foo"), &[integer, integer], &[]);
        assert_eq!(res.symbol(), Some(exact));
    }

    #[test]
    fn inherited_overloads_compete_with_a_subclass_ambiguity() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let base = holder(&mut sema);
        let package = sema.wk.default_package;
        let derived = sema.new_type_symbol(Flags::PUBLIC, "Derived".into(), package);
        let base_type = sema.class_type(base);
        sema.set_supertypes(derived, Some(base_type), vec![]);
        let integer = sema.wk.boxed(Primitive::Int);
        let object = sema.wk.object_type;
        declare(&mut sema, derived, Flags::PUBLIC, "foo", vec![integer, object]);
        declare(&mut sema, derived, Flags::PUBLIC, "foo", vec![object, integer]);
        declare(&mut sema, base, Flags::PUBLIC, "foo", vec![object, object]);
        let env = class_env(&mut sema, derived);

        let site = sema.class_type(derived);
        let name = Name::new("foo");
        let res = sema.find_method_in(env, site, &name, &[integer, integer], &[]);
        assert_eq!(res.symbol, Err(ResolveError::Ambiguous));

        let exact = declare(&mut sema, base, Flags::PUBLIC, "foo", vec![integer, integer]);
        let res = sema.find_method_in(env, site, &name, &[integer, integer], &[]);
        assert_eq!(res.symbol(), Some(exact));
    }

    #[test]
    fn private_methods_of_other_classes_are_access_errors() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let class = holder(&mut sema);
        let hidden = declare(&mut sema, class, Flags::PRIVATE, "hidden", vec![]);
        let package = sema.wk.default_package;
        let other = sema.new_type_symbol(Flags::PUBLIC, "Other".into(), package);
        let other_env = class_env(&mut sema, other);

        let site = sema.class_type(class);
        let res = sema.find_method_in(other_env, site, &Name::new("hidden"), &[], &[]);
        assert_eq!(res.symbol, Err(ResolveError::AccessDenied(hidden)));

        let own_env = class_env(&mut sema, class);
        let res = sema.find_method_in(own_env, site, &Name::new("hidden"), &[], &[]);
        assert_eq!(res.symbol(), Some(hidden));
    }

    #[test]
    fn operators_resolve_through_the_predefined_class() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let root = sema.wk.root_env;
        let predef = sema.class_type(sema.wk.predef_class);
        let int = sema.wk.primitive(Primitive::Int);
        let long = sema.wk.primitive(Primitive::Long);

        let res = sema.find_method_in(root, predef, &Name::new("+"), &[int, long], &[]);
        let method = res.symbol().unwrap();
        assert_eq!(sema.return_type(method), Some(long));

        let string = sema.wk.string_type;
        let res = sema.find_method_in(root, predef, &Name::new("+"), &[string, int], &[]);
        let method = res.symbol().unwrap();
        assert_eq!(sema.return_type(method), Some(string));
    }

    #[test]
    fn arity_rules_per_phase() {
        assert!(has_compatible_arity(2, 2, false, Phase::Strict));
        assert!(!has_compatible_arity(2, 3, true, Phase::Loose));
        assert!(has_compatible_arity(2, 1, true, Phase::VariableArity));
        assert!(has_compatible_arity(2, 5, true, Phase::VariableArity));
        assert!(!has_compatible_arity(2, 0, true, Phase::VariableArity));
        assert!(!has_compatible_arity(1, 1, false, Phase::VariableArity));
    }
}
