//! Operations over types: subtyping, erasure, boxing and display names.

use crate::context::Sema;
use crate::ids::{SymbolId, TypeId};
use crate::subst::TypeSubstitution;
use crate::types::{Deferred, Primitive, TypeKind, WildcardKind};

impl<'a> Sema<'a> {
    /// Symbol defining a type: the class of a class, raw or parameterized
    /// type, the type variable, the array pseudo-class. Everything else
    /// maps to the unknown symbol.
    pub fn type_symbol(&self, ty: TypeId) -> SymbolId {
        match self.ty(ty) {
            TypeKind::Class(symbol)
            | TypeKind::Parameterized { symbol, .. }
            | TypeKind::TypeVar(symbol) => *symbol,
            TypeKind::Array(_) => self.wk.array_class,
            TypeKind::Wildcard { bound, .. } => self.type_symbol(*bound),
            TypeKind::Intersection(types) => match types.first() {
                Some(first) => self.type_symbol(*first),
                None => self.wk.unknown_symbol,
            },
            _ => self.wk.unknown_symbol,
        }
    }

    pub fn is_unknown(&self, ty: TypeId) -> bool {
        matches!(self.ty(ty), TypeKind::Unknown)
    }

    pub fn is_primitive(&self, ty: TypeId) -> bool {
        matches!(self.ty(ty), TypeKind::Primitive(_))
    }

    pub fn is_deferred(&self, ty: TypeId) -> bool {
        matches!(self.ty(ty), TypeKind::Deferred(_))
    }

    pub fn is_numerical(&self, ty: TypeId) -> bool {
        matches!(self.ty(ty), TypeKind::Primitive(p) if p.is_numeric())
    }

    /// Reference types: classes, arrays, type variables and `null`.
    pub fn is_reference(&self, ty: TypeId) -> bool {
        matches!(
            self.ty(ty),
            TypeKind::Class(_)
                | TypeKind::Parameterized { .. }
                | TypeKind::Array(_)
                | TypeKind::TypeVar(_)
                | TypeKind::Null
                | TypeKind::Intersection(_)
        )
    }

    /// Does `ty` name the class with this fully qualified name?
    pub fn is_named(&self, ty: TypeId, full_name: &str) -> bool {
        match self.ty(ty) {
            TypeKind::Class(symbol) | TypeKind::Parameterized { symbol, .. } => {
                self.full_name(*symbol) == full_name
            }
            _ => false,
        }
    }

    pub(crate) fn element_type(&self, ty: TypeId) -> Option<TypeId> {
        match self.ty(ty) {
            TypeKind::Array(element) => Some(*element),
            _ => None,
        }
    }

    pub(crate) fn substitution_of(&self, ty: TypeId) -> Option<&TypeSubstitution> {
        match self.ty(ty) {
            TypeKind::Parameterized { substitution, .. } => Some(substitution),
            _ => None,
        }
    }

    // ---- erasure ----

    pub fn erasure(&mut self, ty: TypeId) -> TypeId {
        match self.ty(ty).clone() {
            TypeKind::Parameterized { symbol, .. } => self.class_type(symbol),
            TypeKind::TypeVar(symbol) => {
                let bounds = self.bounds(symbol);
                match bounds.first() {
                    Some(first) if *first != ty => self.erasure(*first),
                    _ => self.wk.object_type,
                }
            }
            TypeKind::Array(element) => {
                let erased = self.erasure(element);
                self.array_of(erased)
            }
            TypeKind::Wildcard {
                kind: WildcardKind::Extends,
                bound,
            } => self.erasure(bound),
            TypeKind::Wildcard { .. } => self.wk.object_type,
            TypeKind::Intersection(types) => match types.first() {
                Some(first) => self.erasure(*first),
                None => self.wk.object_type,
            },
            _ => ty,
        }
    }

    // ---- boxing ----

    pub fn boxed(&self, ty: TypeId) -> TypeId {
        match self.ty(ty) {
            TypeKind::Primitive(primitive) => self.wk.boxed(*primitive),
            _ => ty,
        }
    }

    /// The primitive a wrapper class type unboxes to, if any.
    pub fn unboxed_primitive(&self, ty: TypeId) -> Option<Primitive> {
        let symbol = match self.ty(ty) {
            TypeKind::Class(symbol) => *symbol,
            _ => return None,
        };
        Primitive::ALL
            .into_iter()
            .find(|primitive| self.type_symbol(self.wk.boxed(*primitive)) == symbol)
    }

    pub fn unboxed(&self, ty: TypeId) -> TypeId {
        match self.unboxed_primitive(ty) {
            Some(primitive) => self.wk.primitive(primitive),
            None => ty,
        }
    }

    /// Loose invocation conversion: `arg` boxes or unboxes into `formal`.
    pub(crate) fn is_autoboxable(&mut self, arg: TypeId, formal: TypeId) -> bool {
        match (self.ty(arg).primitive(), self.ty(formal).primitive()) {
            (Some(_), None) => {
                let boxed = self.boxed(arg);
                self.is_subtype(boxed, formal)
            }
            (None, Some(target)) => match self.unboxed_primitive(arg) {
                Some(primitive) => primitive.widens_to(target),
                None => false,
            },
            _ => false,
        }
    }

    // ---- subtyping ----

    pub fn is_subtype(&mut self, t: TypeId, s: TypeId) -> bool {
        if t == s {
            return true;
        }
        match self.ty(t).clone() {
            TypeKind::Primitive(from) => match self.ty(s) {
                TypeKind::Primitive(to) => from.widens_to(*to),
                _ => false,
            },
            TypeKind::Void => matches!(self.ty(s), TypeKind::Void),
            TypeKind::Null => matches!(
                self.ty(s),
                TypeKind::Null
                    | TypeKind::Class(_)
                    | TypeKind::Parameterized { .. }
                    | TypeKind::Array(_)
                    | TypeKind::TypeVar(_)
                    | TypeKind::Wildcard { .. }
            ),
            TypeKind::Unknown | TypeKind::Method(_) | TypeKind::Deferred(_) => false,
            TypeKind::Array(element) => self.is_array_subtype(element, s),
            TypeKind::Class(_) | TypeKind::Parameterized { .. } => self.is_class_subtype(t, s),
            TypeKind::TypeVar(symbol) => {
                if let TypeKind::Wildcard { .. } = self.ty(s) {
                    return self.is_contained_by(t, s);
                }
                if s == self.wk.object_type {
                    return true;
                }
                let bounds = self.bounds(symbol);
                bounds
                    .into_iter()
                    .filter(|bound| *bound != t)
                    .any(|bound| self.is_subtype(bound, s))
            }
            TypeKind::Wildcard { kind, bound } => match kind {
                WildcardKind::Extends => self.is_subtype(bound, s),
                WildcardKind::Unbounded | WildcardKind::Super => s == self.wk.object_type,
            },
            TypeKind::Intersection(types) => types.into_iter().any(|part| self.is_subtype(part, s)),
        }
    }

    fn is_array_subtype(&mut self, element: TypeId, s: TypeId) -> bool {
        match self.ty(s).clone() {
            TypeKind::Array(target) => {
                if self.is_primitive(element) || self.is_primitive(target) {
                    element == target
                } else {
                    self.is_subtype(element, target)
                }
            }
            TypeKind::Wildcard { .. } => {
                let array = self.array_of(element);
                self.is_contained_by(array, s)
            }
            _ => {
                s == self.wk.object_type
                    || s == self.wk.cloneable_type
                    || s == self.wk.serializable_type
            }
        }
    }

    fn is_class_subtype(&mut self, t: TypeId, s: TypeId) -> bool {
        match self.ty(s).clone() {
            TypeKind::Wildcard { .. } => return self.is_contained_by(t, s),
            TypeKind::Intersection(parts) => {
                return parts.into_iter().all(|part| self.is_subtype(t, part))
            }
            TypeKind::Class(_) | TypeKind::Parameterized { .. } => {}
            _ => return false,
        }
        let t_symbol = self.type_symbol(t);
        let s_symbol = self.type_symbol(s);
        if t_symbol == s_symbol {
            return match (self.substitution_of(t).cloned(), self.substitution_of(s).cloned()) {
                (Some(mine), Some(theirs)) => self.arguments_contained(&mine, &theirs),
                // raw and parameterized uses of one class are mutually
                // assignable (unchecked)
                _ => true,
            };
        }
        if s == self.wk.object_type {
            return true;
        }
        let mut visited = vec![t_symbol];
        self.is_class_subtype_via_supertypes(t, s, &mut visited)
    }

    fn is_class_subtype_via_supertypes(
        &mut self,
        t: TypeId,
        s: TypeId,
        visited: &mut Vec<SymbolId>,
    ) -> bool {
        for super_type in self.site_direct_super_types(t) {
            let symbol = self.type_symbol(super_type);
            if self.is_unknown_symbol(symbol) || visited.contains(&symbol) {
                continue;
            }
            if self.is_class_subtype(super_type, s) {
                return true;
            }
            visited.push(symbol);
        }
        false
    }

    /// Direct supertypes of a class type, with the type's own substitution
    /// applied. A raw use of a generic class has erased supertypes.
    pub(crate) fn site_direct_super_types(&mut self, ty: TypeId) -> Vec<TypeId> {
        let symbol = self.type_symbol(ty);
        let direct = self.direct_super_types(symbol);
        match self.ty(ty).clone() {
            TypeKind::Parameterized { substitution, .. } => direct
                .into_iter()
                .map(|super_type| self.apply_substitution(super_type, &substitution))
                .collect(),
            TypeKind::Class(_) if !self.type_variables(symbol).is_empty() => direct
                .into_iter()
                .map(|super_type| self.erasure(super_type))
                .collect(),
            _ => direct,
        }
    }

    /// The supertype of `ty` (or `ty` itself) declared by `symbol`, with
    /// substitutions applied along the way.
    pub fn as_super(&mut self, ty: TypeId, symbol: SymbolId) -> Option<TypeId> {
        let mut todo = std::collections::VecDeque::from([ty]);
        let mut visited = Vec::new();
        while let Some(current) = todo.pop_front() {
            let current_symbol = self.type_symbol(current);
            if current_symbol == symbol {
                return Some(current);
            }
            if self.is_unknown_symbol(current_symbol) || visited.contains(&current_symbol) {
                continue;
            }
            visited.push(current_symbol);
            if matches!(self.ty(current), TypeKind::TypeVar(_)) {
                let bounds = self.bounds(current_symbol);
                todo.extend(bounds);
            } else {
                todo.extend(self.site_direct_super_types(current));
            }
        }
        None
    }

    fn arguments_contained(&mut self, mine: &TypeSubstitution, theirs: &TypeSubstitution) -> bool {
        for (variable, their_arg) in theirs.pairs().to_vec() {
            let Some(my_arg) = mine.substituted_type(variable) else {
                continue;
            };
            if my_arg == their_arg {
                continue;
            }
            match self.ty(their_arg) {
                TypeKind::Wildcard { .. } => {
                    if !self.is_contained_by(my_arg, their_arg) {
                        return false;
                    }
                }
                _ => return false,
            }
        }
        true
    }

    /// Is `t` within the wildcard `wildcard`?
    fn is_contained_by(&mut self, t: TypeId, wildcard: TypeId) -> bool {
        let TypeKind::Wildcard { kind, bound } = self.ty(wildcard).clone() else {
            return t == wildcard;
        };
        if let TypeKind::Wildcard {
            kind: inner_kind,
            bound: inner_bound,
        } = self.ty(t).clone()
        {
            return match (kind, inner_kind) {
                (WildcardKind::Unbounded, _) => true,
                (WildcardKind::Extends, WildcardKind::Extends) => self.is_subtype(inner_bound, bound),
                (WildcardKind::Extends, WildcardKind::Unbounded) => bound == self.wk.object_type,
                (WildcardKind::Super, WildcardKind::Super) => self.is_subtype(bound, inner_bound),
                _ => false,
            };
        }
        match kind {
            WildcardKind::Unbounded => true,
            WildcardKind::Extends => self.is_subtype(t, bound),
            WildcardKind::Super => self.is_subtype(bound, t),
        }
    }

    // ---- names ----

    /// Source-like rendering: `java.util.List<java.lang.String>`, `int[]`,
    /// `? extends T`.
    pub fn display(&self, ty: TypeId) -> String {
        match self.ty(ty) {
            TypeKind::Primitive(primitive) => primitive.keyword().to_string(),
            TypeKind::Void => "void".to_string(),
            TypeKind::Null => "<nulltype>".to_string(),
            TypeKind::Unknown => "!unknown!".to_string(),
            TypeKind::Class(symbol) => self.full_name(*symbol),
            TypeKind::Parameterized {
                symbol,
                substitution,
            } => {
                let args: Vec<String> = substitution
                    .substituted_types()
                    .map(|arg| self.display(arg))
                    .collect();
                format!("{}<{}>", self.full_name(*symbol), args.join(","))
            }
            TypeKind::Array(element) => format!("{}[]", self.display(*element)),
            TypeKind::Method(method) => {
                let params: Vec<String> = method.params.iter().map(|p| self.display(*p)).collect();
                let result = method
                    .result
                    .map(|r| self.display(r))
                    .unwrap_or_else(|| "void".to_string());
                format!("({}){result}", params.join(","))
            }
            TypeKind::TypeVar(symbol) => self.name(*symbol).to_string(),
            TypeKind::Wildcard { kind, bound } => match kind {
                WildcardKind::Unbounded => "?".to_string(),
                WildcardKind::Extends => format!("? extends {}", self.display(*bound)),
                WildcardKind::Super => format!("? super {}", self.display(*bound)),
            },
            TypeKind::Deferred(Deferred::Node(_)) => "!deferred!".to_string(),
            TypeKind::Deferred(Deferred::Uninferred(ty)) => {
                format!("!deferred {}!", self.display(*ty))
            }
            TypeKind::Intersection(types) => {
                let parts: Vec<String> = types.iter().map(|t| self.display(*t)).collect();
                parts.join(" & ")
            }
        }
    }

    /// JVM field descriptor of the erased type.
    pub fn descriptor_of(&mut self, ty: TypeId) -> String {
        let erased = self.erasure(ty);
        match self.ty(erased).clone() {
            TypeKind::Primitive(primitive) => match primitive {
                Primitive::Byte => "B",
                Primitive::Char => "C",
                Primitive::Short => "S",
                Primitive::Int => "I",
                Primitive::Long => "J",
                Primitive::Float => "F",
                Primitive::Double => "D",
                Primitive::Boolean => "Z",
            }
            .to_string(),
            TypeKind::Void => "V".to_string(),
            TypeKind::Array(element) => format!("[{}", self.descriptor_of(element)),
            TypeKind::Class(symbol) => format!("L{};", self.full_name(symbol).replace('.', "/")),
            _ => "Ljava/lang/Object;".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use nova_classpath::InMemoryClasspath;
    use pretty_assertions::assert_eq;

    use crate::context::test_support::{empty_tree, sema};
    use crate::types::Primitive;

    #[test]
    fn numeric_subtyping_is_widening() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let numeric = [
            Primitive::Byte,
            Primitive::Short,
            Primitive::Char,
            Primitive::Int,
            Primitive::Long,
            Primitive::Float,
            Primitive::Double,
        ];
        for from in numeric {
            for to in numeric {
                let (t, s) = (sema.wk.primitive(from), sema.wk.primitive(to));
                assert_eq!(sema.is_subtype(t, s), from.widens_to(to), "{from:?} <: {to:?}");
                if from != to {
                    assert!(!(sema.is_subtype(t, s) && sema.is_subtype(s, t)));
                }
            }
        }
    }

    #[test]
    fn arrays_are_covariant_and_cloneable() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let string = sema.wk.string_type;
        let object = sema.wk.object_type;
        let strings = sema.array_of(string);
        let objects = sema.array_of(object);
        let int = sema.wk.primitive(Primitive::Int);
        let long = sema.wk.primitive(Primitive::Long);
        let ints = sema.array_of(int);
        let longs = sema.array_of(long);

        assert!(sema.is_subtype(strings, objects));
        assert!(!sema.is_subtype(objects, strings));
        assert!(!sema.is_subtype(ints, longs));
        assert!(sema.is_subtype(ints, object));
        let cloneable = sema.wk.cloneable_type;
        assert!(sema.is_subtype(ints, cloneable));
        assert_eq!(sema.display(ints), "int[]");
        assert_eq!(sema.descriptor_of(strings), "[Ljava/lang/String;");
    }

    #[test]
    fn null_is_a_subtype_of_references_only() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let null = sema.wk.null_type;
        let string = sema.wk.string_type;
        let int = sema.wk.primitive(Primitive::Int);
        let unknown = sema.wk.unknown_type;
        assert!(sema.is_subtype(null, string));
        assert!(!sema.is_subtype(null, int));
        assert!(!sema.is_subtype(unknown, string));
    }

    #[test]
    fn boxing_round_trips_through_wrappers() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let sema = sema(&tree, &classpath);
        for primitive in Primitive::ALL {
            let ty = sema.wk.primitive(primitive);
            let boxed = sema.boxed(ty);
            assert_eq!(sema.display(boxed), primitive.boxed_name());
            assert_eq!(sema.unboxed(boxed), ty);
        }
    }
}
