//! Predefined symbols: the unknown symbol, primitive and special types,
//! the array class, the well-known `java.lang` classes and the operator
//! methods used to type unary and binary expressions.

use crate::context::Sema;
use crate::env::Env;
use crate::flags::Flags;
use crate::ids::{EnvId, SymbolId, TypeId};
use crate::scope::ScopeKind;
use crate::symbols::{Symbol, SymbolData, SymbolKind};
use crate::types::{Primitive, TypeKind, WildcardKind};

/// Handles to the predefined symbols and types of one analysis.
#[derive(Debug, Clone)]
pub struct WellKnown {
    pub unknown_symbol: SymbolId,
    pub unknown_type: TypeId,
    pub default_package: SymbolId,
    /// Holds the primitive type symbols and the operator methods.
    pub predef_class: SymbolId,
    pub(crate) root_env: EnvId,

    pub primitive_types: [TypeId; 8],
    pub void_type: TypeId,
    pub null_type: TypeId,

    pub array_class: SymbolId,
    pub array_length: SymbolId,

    pub java_lang: SymbolId,
    pub object: SymbolId,
    pub object_type: TypeId,
    pub class_type: TypeId,
    pub string_type: TypeId,
    pub cloneable_type: TypeId,
    pub serializable_type: TypeId,
    pub annotation_type: TypeId,
    pub enum_symbol: SymbolId,
    pub synthetic_annotation: SymbolId,
    pub unbounded_wildcard: TypeId,
    /// Wrapper class types, in [`Primitive::ALL`] order.
    pub boxed_types: [TypeId; 8],
}

fn primitive_index(primitive: Primitive) -> usize {
    Primitive::ALL
        .iter()
        .position(|p| *p == primitive)
        .unwrap_or_default()
}

impl WellKnown {
    /// Every handle points at slot zero until [`Sema::enter_predefined`]
    /// has run.
    pub(crate) fn placeholder() -> Self {
        let symbol = SymbolId::from_index(0);
        let ty = TypeId::from_index(0);
        Self {
            unknown_symbol: symbol,
            unknown_type: ty,
            default_package: symbol,
            predef_class: symbol,
            root_env: EnvId::from_index(0),
            primitive_types: [ty; 8],
            void_type: ty,
            null_type: ty,
            array_class: symbol,
            array_length: symbol,
            java_lang: symbol,
            object: symbol,
            object_type: ty,
            class_type: ty,
            string_type: ty,
            cloneable_type: ty,
            serializable_type: ty,
            annotation_type: ty,
            enum_symbol: symbol,
            synthetic_annotation: symbol,
            unbounded_wildcard: ty,
            boxed_types: [ty; 8],
        }
    }

    pub fn primitive(&self, primitive: Primitive) -> TypeId {
        self.primitive_types[primitive_index(primitive)]
    }

    pub fn boxed(&self, primitive: Primitive) -> TypeId {
        self.boxed_types[primitive_index(primitive)]
    }
}

impl<'a> Sema<'a> {
    pub(crate) fn enter_predefined(&mut self) {
        let unknown_members = self.new_scope(None, None);
        let unknown_symbol = self.alloc_symbol(Symbol::new(
            SymbolKind::Error,
            Flags::empty(),
            "!unknown!".into(),
            None,
            SymbolData::Error {
                members: unknown_members,
            },
        ));
        let unknown_type = self.alloc_type(TypeKind::Unknown);
        self.set_symbol_type(unknown_symbol, unknown_type);
        self.wk.unknown_symbol = unknown_symbol;
        self.wk.unknown_type = unknown_type;

        let default_package = self.new_package("".into(), None);
        self.registry.packages.insert(String::new(), default_package);
        self.wk.default_package = default_package;

        let predef = self.new_type_symbol(Flags::PUBLIC, "".into(), default_package);
        self.wk.predef_class = predef;
        let predef_members = self.predef_members();

        for (index, primitive) in Primitive::ALL.into_iter().enumerate() {
            let ty = self.builtin_type(primitive.keyword(), TypeKind::Primitive(primitive));
            self.wk.primitive_types[index] = ty;
        }
        self.wk.void_type = self.builtin_type("void", TypeKind::Void);
        self.wk.null_type = self.builtin_type("<nulltype>", TypeKind::Null);

        let root_env = Env {
            outer: None,
            package: default_package,
            enclosing_class: None,
            scope: self.scope_of_package(default_package),
            named_imports: self.new_scope(None, None),
            star_imports: self.new_import_scope(ScopeKind::StarImport),
            static_star_imports: self.new_import_scope(ScopeKind::StaticStarImport),
        };
        self.wk.root_env = self.alloc_env(root_env);

        self.wk.java_lang = self.enter_package("java.lang");
        let object = self.class_symbol("java.lang.Object");
        self.wk.object = object;
        self.wk.object_type = self.class_type(object);
        self.wk.unbounded_wildcard = self.alloc_type(TypeKind::Wildcard {
            kind: WildcardKind::Unbounded,
            bound: self.wk.object_type,
        });
        let class = self.class_symbol("java.lang.Class");
        self.wk.class_type = self.class_type(class);
        let string = self.class_symbol("java.lang.String");
        self.wk.string_type = self.class_type(string);
        let cloneable = self.class_symbol("java.lang.Cloneable");
        self.wk.cloneable_type = self.class_type(cloneable);
        let serializable = self.class_symbol("java.io.Serializable");
        self.wk.serializable_type = self.class_type(serializable);
        let annotation = self.class_symbol("java.lang.annotation.Annotation");
        self.wk.annotation_type = self.class_type(annotation);
        self.wk.enum_symbol = self.class_symbol("java.lang.Enum");
        for (index, primitive) in Primitive::ALL.into_iter().enumerate() {
            let boxed = self.class_symbol(primitive.boxed_name());
            self.wk.boxed_types[index] = self.class_type(boxed);
        }

        self.enter_array_class();
        self.enter_synthetic_annotation();
        self.enter_operators();
        tracing::debug!(
            target: "nova.sema",
            operators = self.scope_symbols(predef_members).len(),
            "entered predefined symbols"
        );
    }

    fn predef_members(&self) -> crate::ids::ScopeId {
        self.symbol(self.wk.predef_class)
            .type_data()
            .map(|data| data.members)
            .unwrap_or_else(|| crate::ids::ScopeId::from_index(0))
    }

    pub(crate) fn scope_of_package(&self, package: SymbolId) -> crate::ids::ScopeId {
        match &self.symbol(package).data {
            SymbolData::Package { members, .. } => *members,
            _ => self.predef_members(),
        }
    }

    /// A symbol in the predefined class whose type is `kind`.
    fn builtin_type(&mut self, name: &str, kind: TypeKind) -> TypeId {
        let predef = self.wk.predef_class;
        let symbol = self.new_type_symbol(Flags::PUBLIC, name.into(), predef);
        let ty = self.alloc_type(kind);
        self.set_symbol_type(symbol, ty);
        let members = self.predef_members();
        self.enter(members, symbol);
        ty
    }

    pub(crate) fn class_type(&self, symbol: SymbolId) -> TypeId {
        self.symbol(symbol).ty.unwrap_or(self.wk.unknown_type)
    }

    fn enter_array_class(&mut self) {
        let array = self.new_type_symbol(Flags::PUBLIC, "Array".into(), self.wk.predef_class);
        let int = self.wk.primitive(Primitive::Int);
        let length = self.new_variable(Flags::PUBLIC | Flags::FINAL, "length".into(), Some(int), array);
        if let Some(members) = self.symbol(array).type_data().map(|data| data.members) {
            self.enter(members, length);
        }
        let interfaces = vec![self.wk.cloneable_type, self.wk.serializable_type];
        self.set_supertypes(array, Some(self.wk.object_type), interfaces);
        self.wk.array_class = array;
        self.wk.array_length = length;
    }

    fn enter_synthetic_annotation(&mut self) {
        let synthetic = self.new_type_symbol(
            Flags::PUBLIC | Flags::INTERFACE | Flags::ANNOTATION,
            "Synthetic".into(),
            self.wk.java_lang,
        );
        let interfaces = vec![self.wk.annotation_type];
        self.set_supertypes(synthetic, Some(self.wk.object_type), interfaces);
        self.registry
            .classes
            .insert("java.lang.Synthetic".to_string(), synthetic);
        self.wk.synthetic_annotation = synthetic;
    }

    fn enter_operators(&mut self) {
        use Primitive::*;
        let p = |sema: &Self, primitive: Primitive| sema.wk.primitive(primitive);
        let boolean = p(self, Boolean);
        let object = self.wk.object_type;
        let string = self.wk.string_type;
        let null = self.wk.null_type;

        for op in ["+", "-", "*", "/", "%"] {
            for primitive in [Double, Float, Long, Int] {
                let ty = p(self, primitive);
                self.enter_binary_operator(op, ty, ty, ty);
            }
        }
        for op in ["&", "|", "^"] {
            for primitive in [Boolean, Long, Int] {
                let ty = p(self, primitive);
                self.enter_binary_operator(op, ty, ty, ty);
            }
        }
        let (long, int) = (p(self, Long), p(self, Int));
        for op in ["<<", ">>", ">>>"] {
            self.enter_binary_operator(op, long, long, long);
            self.enter_binary_operator(op, int, long, int);
            self.enter_binary_operator(op, long, int, long);
            self.enter_binary_operator(op, int, int, int);
        }
        for op in ["<", ">", ">=", "<="] {
            for primitive in [Double, Float, Long, Int] {
                let ty = p(self, primitive);
                self.enter_binary_operator(op, ty, ty, boolean);
            }
        }
        for op in ["==", "!="] {
            self.enter_binary_operator(op, object, object, boolean);
            for primitive in [Boolean, Double, Float, Long, Int] {
                let ty = p(self, primitive);
                self.enter_binary_operator(op, ty, ty, boolean);
            }
        }
        for op in ["&&", "||"] {
            self.enter_binary_operator(op, boolean, boolean, boolean);
        }

        let mut operands = vec![null, object];
        operands.extend([Boolean, Double, Float, Long, Int].map(|primitive| p(self, primitive)));
        for operand in operands {
            self.enter_binary_operator("+", string, operand, string);
            self.enter_binary_operator("+", operand, string, string);
        }
        self.enter_binary_operator("+", string, string, string);

        for op in ["+", "-", "++", "--"] {
            for primitive in [Double, Float, Long, Int] {
                let ty = p(self, primitive);
                self.enter_operator(op, vec![ty], ty);
            }
        }
        for primitive in [Long, Int] {
            let ty = p(self, primitive);
            self.enter_operator("~", vec![ty], ty);
        }
        self.enter_operator("!", vec![boolean], boolean);
    }

    fn enter_binary_operator(&mut self, op: &str, left: TypeId, right: TypeId, result: TypeId) {
        self.enter_operator(op, vec![left, right], result);
    }

    fn enter_operator(&mut self, op: &str, params: Vec<TypeId>, result: TypeId) {
        let predef = self.wk.predef_class;
        let method = self.new_method(Flags::PUBLIC | Flags::STATIC, op.into(), predef);
        let ty = self.method_type_of(params, Some(result), Vec::new());
        self.set_symbol_type(method, ty);
        let members = self.predef_members();
        self.enter(members, method);
    }
}

#[cfg(test)]
mod tests {
    use nova_classpath::InMemoryClasspath;
    use pretty_assertions::assert_eq;

    use crate::context::test_support::{empty_tree, sema};
    use crate::tree::Name;
    use crate::types::{Primitive, TypeKind};

    #[test]
    fn primitive_symbols_live_in_the_predefined_class() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let members = sema.members(sema.wk.predef_class).unwrap();

        let int = sema.lookup(members, &Name::new("int"));
        assert_eq!(int.len(), 1);
        let ty = sema.type_of_symbol(int[0]);
        assert_eq!(sema.ty(ty), &TypeKind::Primitive(Primitive::Int));
        assert_eq!(ty, sema.wk.primitive(Primitive::Int));
    }

    #[test]
    fn string_concatenation_operators_are_overloaded() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let members = sema.members(sema.wk.predef_class).unwrap();

        let plus = sema.lookup(members, &Name::new("+"));
        // 4 numeric + 7 * 2 string mixes + (String, String) + 4 unary
        assert_eq!(plus.len(), 4 + 14 + 1 + 4);
        let shifts = sema.lookup(members, &Name::new(">>>"));
        assert_eq!(shifts.len(), 4);
    }

    #[test]
    fn array_class_has_a_final_length() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let array = sema.wk.array_class;
        let object = sema.wk.object_type;
        assert_eq!(sema.superclass(array), Some(object));
        assert_eq!(sema.interfaces(array).len(), 2);
        let length = sema.wk.array_length;
        let ty = sema.type_of_symbol(length);
        assert_eq!(ty, sema.wk.primitive(Primitive::Int));
    }
}
