use crate::ids::TypeId;

/// Ordered mapping from type variables to the types replacing them.
///
/// Two substitutions are equal only if they bind the same variables to the
/// same types in the same order; the parameterized type interner relies on
/// that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TypeSubstitution {
    pairs: Vec<(TypeId, TypeId)>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(variables: &[TypeId], types: &[TypeId]) -> Self {
        let mut substitution = Self::new();
        for (variable, ty) in variables.iter().zip(types) {
            substitution.add(*variable, *ty);
        }
        substitution
    }

    /// Binds `variable`, replacing an earlier binding in place.
    pub fn add(&mut self, variable: TypeId, ty: TypeId) {
        match self.pairs.iter_mut().find(|(v, _)| *v == variable) {
            Some(pair) => pair.1 = ty,
            None => self.pairs.push((variable, ty)),
        }
    }

    pub fn substituted_type(&self, variable: TypeId) -> Option<TypeId> {
        self.pairs
            .iter()
            .find_map(|(v, ty)| (*v == variable).then_some(*ty))
    }

    pub fn type_variables(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.pairs.iter().map(|(v, _)| *v)
    }

    pub fn substituted_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.pairs.iter().map(|(_, ty)| *ty)
    }

    pub fn pairs(&self) -> &[(TypeId, TypeId)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Every variable maps to itself.
    pub fn is_identity(&self) -> bool {
        self.pairs.iter().all(|(v, ty)| v == ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(n: usize) -> TypeId {
        TypeId::from_index(n)
    }

    #[test]
    fn add_replaces_existing_binding_in_place() {
        let mut s = TypeSubstitution::new();
        s.add(id(1), id(10));
        s.add(id(2), id(20));
        s.add(id(1), id(11));
        assert_eq!(s.pairs(), &[(id(1), id(11)), (id(2), id(20))]);
        assert_eq!(s.substituted_type(id(2)), Some(id(20)));
        assert_eq!(s.substituted_type(id(3)), None);
    }

    #[test]
    fn equality_is_order_sensitive() {
        let a = TypeSubstitution::from_pairs(&[id(1), id(2)], &[id(3), id(4)]);
        let mut b = TypeSubstitution::new();
        b.add(id(2), id(4));
        b.add(id(1), id(3));
        assert!(a != b);
        assert_eq!(a, TypeSubstitution::from_pairs(&[id(1), id(2)], &[id(3), id(4)]));
    }
}
