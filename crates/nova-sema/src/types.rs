//! The type model. Types live in an arena owned by [`crate::Sema`] and are
//! addressed by [`TypeId`]; operations on them (subtyping, erasure,
//! display) are in [`crate::typing`].

use crate::ids::{NodeId, SymbolId, TypeId};
use crate::subst::TypeSubstitution;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Boolean,
}

impl Primitive {
    pub const ALL: [Primitive; 8] = [
        Primitive::Byte,
        Primitive::Char,
        Primitive::Short,
        Primitive::Int,
        Primitive::Long,
        Primitive::Float,
        Primitive::Double,
        Primitive::Boolean,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Boolean => "boolean",
        }
    }

    /// Binary name of the wrapper class.
    pub fn boxed_name(self) -> &'static str {
        match self {
            Primitive::Byte => "java.lang.Byte",
            Primitive::Char => "java.lang.Character",
            Primitive::Short => "java.lang.Short",
            Primitive::Int => "java.lang.Integer",
            Primitive::Long => "java.lang.Long",
            Primitive::Float => "java.lang.Float",
            Primitive::Double => "java.lang.Double",
            Primitive::Boolean => "java.lang.Boolean",
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, Primitive::Boolean)
    }

    /// Widening primitive conversion (JLS 5.1.2), reflexive.
    pub fn widens_to(self, target: Primitive) -> bool {
        use Primitive::*;
        if self == target {
            return true;
        }
        match self {
            Byte => matches!(target, Short | Int | Long | Float | Double),
            Short | Char => matches!(target, Int | Long | Float | Double),
            Int => matches!(target, Long | Float | Double),
            Long => matches!(target, Float | Double),
            Float => matches!(target, Double),
            Double | Boolean => false,
        }
    }
}

impl From<nova_classfile::BaseType> for Primitive {
    fn from(base: nova_classfile::BaseType) -> Self {
        use nova_classfile::BaseType;
        match base {
            BaseType::Byte => Primitive::Byte,
            BaseType::Char => Primitive::Char,
            BaseType::Short => Primitive::Short,
            BaseType::Int => Primitive::Int,
            BaseType::Long => Primitive::Long,
            BaseType::Float => Primitive::Float,
            BaseType::Double => Primitive::Double,
            BaseType::Boolean => Primitive::Boolean,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WildcardKind {
    /// `?`; its bound is `Object`.
    Unbounded,
    Extends,
    Super,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodType {
    pub params: Vec<TypeId>,
    /// `None` for constructors.
    pub result: Option<TypeId>,
    pub thrown: Vec<TypeId>,
}

/// What a deferred type is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// A lambda, method reference or diamond `new` whose type depends on
    /// the target type.
    Node(NodeId),
    /// A generic method result whose type variables could not all be
    /// inferred from the arguments; carries the partially substituted type.
    Uninferred(TypeId),
}

impl Deferred {
    pub fn node(self) -> Option<NodeId> {
        match self {
            Deferred::Node(node) => Some(node),
            Deferred::Uninferred(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Primitive(Primitive),
    Void,
    /// Type of `null`, the bottom of the reference types.
    Null,
    Unknown,
    /// A class, interface, enum or annotation type, including raw uses of
    /// generic classes.
    Class(SymbolId),
    Parameterized {
        symbol: SymbolId,
        substitution: TypeSubstitution,
    },
    Array(TypeId),
    Method(MethodType),
    TypeVar(SymbolId),
    Wildcard {
        kind: WildcardKind,
        bound: TypeId,
    },
    Deferred(Deferred),
    Intersection(Vec<TypeId>),
}

/// Coarse classification used by the typing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Primitive(Primitive),
    Void,
    Null,
    Unknown,
    Class,
    Parameterized,
    Array,
    Method,
    TypeVar,
    Wildcard,
    Deferred,
    Intersection,
}

impl TypeKind {
    pub fn tag(&self) -> TypeTag {
        match self {
            TypeKind::Primitive(p) => TypeTag::Primitive(*p),
            TypeKind::Void => TypeTag::Void,
            TypeKind::Null => TypeTag::Null,
            TypeKind::Unknown => TypeTag::Unknown,
            TypeKind::Class(_) => TypeTag::Class,
            TypeKind::Parameterized { .. } => TypeTag::Parameterized,
            TypeKind::Array(_) => TypeTag::Array,
            TypeKind::Method(_) => TypeTag::Method,
            TypeKind::TypeVar(_) => TypeTag::TypeVar,
            TypeKind::Wildcard { .. } => TypeTag::Wildcard,
            TypeKind::Deferred(_) => TypeTag::Deferred,
            TypeKind::Intersection(_) => TypeTag::Intersection,
        }
    }

    pub fn primitive(&self) -> Option<Primitive> {
        match self {
            TypeKind::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Class-like types: plain, raw or parameterized classes.
    pub fn is_class(&self) -> bool {
        matches!(self, TypeKind::Class(_) | TypeKind::Parameterized { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widening_follows_the_fixed_order() {
        use Primitive::*;
        let chain = [Byte, Short, Int, Long, Float, Double];
        for (i, from) in chain.iter().enumerate() {
            for (j, to) in chain.iter().enumerate() {
                assert_eq!(from.widens_to(*to), i <= j, "{from:?} -> {to:?}");
            }
        }
        for to in [Int, Long, Float, Double] {
            assert!(Char.widens_to(to));
        }
        assert!(!Char.widens_to(Short));
        assert!(!Short.widens_to(Char));
        assert!(!Byte.widens_to(Char));
        for p in Primitive::ALL {
            assert_eq!(Boolean.widens_to(p), p == Boolean);
        }
    }
}
