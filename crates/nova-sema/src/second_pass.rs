//! Second pass: the source completer.
//!
//! A symbol declared by the first pass is completed the first time one of
//! its completion-dependent fields is read. Type references are resolved
//! in the environment saved for the declaration, so lookups see exactly
//! what was in scope there.

use crate::context::Sema;
use crate::error::SemaError;
use crate::flags::Flags;
use crate::ids::{NodeId, ScopeId, SymbolId, TypeId};
use crate::resolve::CONSTRUCTOR_NAME;
use crate::subst::TypeSubstitution;
use crate::symbols::SymbolKind;
use crate::tree::{ClassDecl, ClassKind, Name, NodeKind};
use crate::types::MethodType;

impl<'a> Sema<'a> {
    pub(crate) fn complete_from_source(&mut self, symbol: SymbolId) {
        let Some(node) = self.declaration(symbol) else {
            return;
        };
        match self.kind(symbol) {
            SymbolKind::Type => self.complete_source_class(symbol, node),
            SymbolKind::Method => self.complete_source_method(symbol, node),
            SymbolKind::Variable => self.complete_source_variable(symbol, node),
            SymbolKind::TypeVariable => self.complete_source_type_variable(symbol, node),
            _ => {}
        }
    }

    fn complete_source_class(&mut self, class: SymbolId, node: NodeId) {
        let tree = self.tree();
        let NodeKind::Class(decl) = tree.kind(node) else {
            return;
        };
        let Some(members) = self.symbol(class).type_data().map(|data| data.members) else {
            return;
        };

        let (superclass, mut interfaces) = self.source_supertypes(class, node, decl);
        interfaces.extend(decl.interfaces.iter().map(|interface| self.resolve_type(*interface)));
        if decl.kind == ClassKind::Annotation {
            interfaces.push(self.wk.annotation_type);
        }
        self.set_supertypes(class, superclass, interfaces);
        if self.has_cyclic_superclass(class) {
            let name = self.full_name(class);
            self.record_fatal(SemaError::CyclicHierarchy { class: name });
            let unknown = self.wk.unknown_type;
            if let Some(data) = self.symbol_mut(class).type_data_mut() {
                data.superclass = Some(unknown);
            }
        }

        self.enter_this_and_super(class, members);
        if !matches!(decl.kind, ClassKind::Interface | ClassKind::Annotation) {
            self.enter_default_constructor(class, decl, members);
        }

        let annotations = self.resolve_annotations(class, &decl.modifiers.annotations);
        self.symbol_mut(class).annotations = annotations;
        tracing::debug!(target: "nova.sema", class = %self.full_name(class), "completed class from source");
    }

    /// Declared superclass, or the implicit one. Anonymous classes extend
    /// the instantiated class, or `Object` and implement the instantiated
    /// interface.
    fn source_supertypes(&mut self, class: SymbolId, node: NodeId, decl: &ClassDecl) -> (Option<TypeId>, Vec<TypeId>) {
        if let Some(superclass) = decl.superclass {
            return (Some(self.resolve_type(superclass)), Vec::new());
        }
        let tree = self.tree();
        if decl.name.is_none() {
            match tree.parent(node).map(|parent| tree.kind(parent)) {
                Some(NodeKind::NewClass { ty, .. }) => {
                    let instantiated = self.resolve_type(*ty);
                    let symbol = self.type_symbol(instantiated);
                    if self.is_interface(symbol) {
                        return (Some(self.wk.object_type), vec![instantiated]);
                    }
                    return (Some(instantiated), Vec::new());
                }
                Some(NodeKind::EnumConstant { .. }) => {
                    let enum_type = self
                        .owner(class)
                        .and_then(|constant| self.owner(constant))
                        .map(|enum_symbol| self.class_type(enum_symbol))
                        .unwrap_or(self.wk.unknown_type);
                    return (Some(enum_type), Vec::new());
                }
                _ => {}
            }
        }
        match decl.kind {
            ClassKind::Interface | ClassKind::Annotation => (None, Vec::new()),
            ClassKind::Enum => {
                let enum_symbol = self.wk.enum_symbol;
                let variables = self.type_variables(enum_symbol);
                let own_type = self.class_type(class);
                let superclass = match variables.first() {
                    Some(variable) => {
                        let substitution = TypeSubstitution::from_pairs(&[*variable], &[own_type]);
                        self.parameterized(enum_symbol, substitution)
                    }
                    None => self.class_type(enum_symbol),
                };
                (Some(superclass), Vec::new())
            }
            ClassKind::Class if class == self.wk.object => (None, Vec::new()),
            ClassKind::Class => (Some(self.wk.object_type), Vec::new()),
        }
    }

    /// Walks the superclass chain; only a chain that comes back to `class`
    /// is reported here, other cycles are reported by their own members.
    fn has_cyclic_superclass(&mut self, class: SymbolId) -> bool {
        let mut seen = vec![class];
        let mut current = self.symbol(class).type_data().and_then(|data| data.superclass);
        while let Some(ty) = current {
            let symbol = self.type_symbol(ty);
            if symbol == class {
                return true;
            }
            if seen.contains(&symbol) || self.is_unknown_symbol(symbol) {
                return false;
            }
            seen.push(symbol);
            current = self.superclass(symbol);
        }
        false
    }

    fn enter_this_and_super(&mut self, class: SymbolId, members: ScopeId) {
        let this_type = self.identity_parameterization(class);
        let this = self.new_variable(Flags::FINAL, "this".into(), Some(this_type), class);
        self.enter(members, this);
        let super_type = if self.raw_flags(class).contains(Flags::INTERFACE) {
            this_type
        } else {
            self.symbol(class)
                .type_data()
                .and_then(|data| data.superclass)
                .unwrap_or(this_type)
        };
        let sup = self.new_variable(Flags::FINAL, "super".into(), Some(super_type), class);
        self.enter(members, sup);
    }

    fn enter_default_constructor(&mut self, class: SymbolId, decl: &ClassDecl, members: ScopeId) {
        let name = Name::new(CONSTRUCTOR_NAME);
        if !self.lookup_local(members, &name).is_empty() {
            return;
        }
        let flags = match decl.kind {
            ClassKind::Enum => Flags::PRIVATE,
            _ => self.raw_flags(class) & Flags::ACCESS,
        };
        let constructor = self.new_method(flags, name, class);
        let params = self.implicit_outer_type(class).into_iter().collect();
        self.set_method_type(
            constructor,
            MethodType {
                params,
                result: None,
                thrown: Vec::new(),
            },
        );
        self.enter(members, constructor);
    }

    fn complete_source_method(&mut self, method: SymbolId, node: NodeId) {
        let tree = self.tree();
        let NodeKind::Method(decl) = tree.kind(node) else {
            return;
        };
        let mut params = Vec::with_capacity(decl.params.len() + 1);
        if decl.return_type.is_none() {
            if let Some(class) = self.owner(method) {
                params.extend(self.implicit_outer_type(class));
            }
        }
        let parameters = self
            .symbol(method)
            .method_data()
            .map(|data| data.parameters.clone())
            .unwrap_or_default();
        for parameter in parameters {
            params.push(self.type_of_symbol(parameter));
        }
        let result = decl.return_type.map(|ty| self.resolve_type(ty));
        let thrown = decl.throws.iter().map(|ty| self.resolve_type(*ty)).collect();
        self.set_method_type(
            method,
            MethodType {
                params,
                result,
                thrown,
            },
        );

        let annotations = self.resolve_annotations(method, &decl.modifiers.annotations);
        self.symbol_mut(method).annotations = annotations;
        if let Some(default) = decl.default_value {
            let value = self.annotation_element_value(method, default, result);
            if let Some(data) = self.symbol_mut(method).method_data_mut() {
                data.default_value = Some(value);
            }
        }
    }

    fn complete_source_variable(&mut self, variable: SymbolId, node: NodeId) {
        let tree = self.tree();
        let (ty, annotations) = match tree.kind(node) {
            NodeKind::Variable(decl) => {
                let ty = match tree.kind(decl.ty) {
                    NodeKind::InferredType => self.inferred_variable_type(node, decl.initializer),
                    _ => {
                        let ty = self.resolve_type(decl.ty);
                        if decl.varargs {
                            self.array_of(ty)
                        } else {
                            ty
                        }
                    }
                };
                (ty, decl.modifiers.annotations.as_slice())
            }
            NodeKind::EnumConstant { modifiers, .. } => {
                let ty = self
                    .owner(variable)
                    .map(|class| self.class_type(class))
                    .unwrap_or(self.wk.unknown_type);
                (ty, modifiers.annotations.as_slice())
            }
            _ => return,
        };
        self.set_symbol_type(variable, ty);
        let annotations = self.resolve_annotations(variable, annotations);
        self.symbol_mut(variable).annotations = annotations;
    }

    /// `var` locals take the initializer's type, `var` loop variables the
    /// element type of the iterable. Implicit lambda parameters are typed
    /// when the lambda meets its target; until then they are unknown.
    fn inferred_variable_type(&mut self, node: NodeId, initializer: Option<NodeId>) -> TypeId {
        let tree = self.tree();
        if let Some(NodeKind::ForEach { variable, iterable, .. }) = tree.parent(node).map(|parent| tree.kind(parent)) {
            if *variable == node {
                let iterable = self.expression_type(*iterable);
                return self.iterable_element_type(iterable);
            }
        }
        match initializer {
            Some(init) => {
                let ty = self.expression_type(init);
                self.standalone_type(ty)
            }
            None => self.wk.unknown_type,
        }
    }

    fn complete_source_type_variable(&mut self, variable: SymbolId, node: NodeId) {
        let NodeKind::TypeParameter { bounds, .. } = self.tree().kind(node) else {
            return;
        };
        let bounds = bounds.iter().map(|bound| self.resolve_type(*bound)).collect();
        self.set_bounds(variable, bounds);
    }
}

#[cfg(test)]
mod tests {
    use nova_classpath::InMemoryClasspath;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::context::test_support::sema;
    use crate::symbols::SymbolData;
    use crate::tree::{MethodDecl, SyntaxTree, TreeBuilder, VariableDecl};

    fn unit(types: impl FnOnce(&mut TreeBuilder) -> Vec<NodeId>) -> SyntaxTree {
        let mut b = TreeBuilder::new();
        let types = types(&mut b);
        let unit = b.unit(Some("p"), vec![], types);
        b.finish(unit)
    }

    #[test]
    fn superclass_cycles_are_fatal_and_broken() {
        let tree = unit(|b| {
            let b_ref = b.ident("B");
            let a = b.class(ClassDecl::new(ClassKind::Class, "A").extends(b_ref));
            let a_ref = b.ident("A");
            let bee = b.class(ClassDecl::new(ClassKind::Class, "B").extends(a_ref));
            vec![a, bee]
        });
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        sema.enter_unit();
        let a = sema.load_class("p.A").unwrap();
        sema.complete(a);
        assert!(matches!(sema.fatal, Some(SemaError::CyclicHierarchy { .. })));
        // walking the broken chain terminates
        let supertypes = sema.super_types(a);
        assert!(supertypes.len() <= 2);
    }

    #[test]
    fn implicit_members_are_synthesized() {
        let tree = unit(|b| {
            let inner = b.class(ClassDecl::new(ClassKind::Class, "Inner").flags(Flags::PUBLIC));
            let outer = b.class(ClassDecl::new(ClassKind::Class, "Outer").flags(Flags::PUBLIC).members(vec![inner]));
            vec![outer]
        });
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        sema.enter_unit();

        let outer = sema.load_class("p.Outer").unwrap();
        let inner = sema.load_class("p.Outer$Inner").unwrap();
        assert_eq!(sema.superclass(outer), Some(sema.wk.object_type));

        let members = sema.members(inner).unwrap();
        let constructor = sema.lookup_local(members, &Name::new(CONSTRUCTOR_NAME))[0];
        let outer_type = sema.class_type(outer);
        assert_eq!(sema.parameter_types(constructor), vec![outer_type]);
        assert!(sema.flags(constructor).contains(Flags::PUBLIC));

        let this = sema.lookup_local(members, &Name::new("this"))[0];
        let inner_type = sema.class_type(inner);
        assert_eq!(sema.type_of_symbol(this), inner_type);
        let sup = sema.lookup_local(members, &Name::new("super"))[0];
        assert_eq!(sema.type_of_symbol(sup), sema.wk.object_type);
    }

    #[test]
    fn member_signatures_resolve_in_their_declaring_scope() {
        let tree = unit(|b| {
            let t = b.type_param("T", vec![]);
            let t_ref = b.ident("T");
            let item = b.variable(VariableDecl::new(t_ref, "item"));
            let string = b.ident("String");
            let names = b.variable(VariableDecl::new(string, "names").varargs());
            let t_ret = b.ident("T");
            let body = b.block(vec![]);
            let put = b.method(MethodDecl::new("put", Some(t_ret)).params(vec![item, names]).body(body));
            let holder = b.class(ClassDecl::new(ClassKind::Class, "Holder").type_params(vec![t]).members(vec![put]));
            vec![holder]
        });
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        sema.enter_unit();

        let holder = sema.load_class("p.Holder").unwrap();
        let members = sema.members(holder).unwrap();
        let put = sema.lookup_local(members, &Name::new("put"))[0];
        let t = sema.type_variables(holder)[0];
        let strings = sema.array_of(sema.wk.string_type);
        assert_eq!(sema.parameter_types(put), vec![t, strings]);
        assert_eq!(sema.return_type(put), Some(t));
        assert!(sema.is_varargs(put));
    }

    #[test]
    fn enums_extend_the_parameterized_enum_class() {
        let tree = unit(|b| {
            let red = b.add(NodeKind::EnumConstant {
                modifiers: Default::default(),
                name: "RED".into(),
                args: vec![],
                body: None,
            });
            vec![b.class(ClassDecl::new(ClassKind::Enum, "Color").members(vec![red]))]
        });
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        sema.enter_unit();

        let color = sema.load_class("p.Color").unwrap();
        let color_type = sema.class_type(color);
        let superclass = sema.superclass(color).unwrap();
        assert_eq!(sema.type_symbol(superclass), sema.wk.enum_symbol);
        let members = sema.members(color).unwrap();
        let red = sema.lookup_local(members, &Name::new("RED"))[0];
        assert_eq!(sema.type_of_symbol(red), color_type);
        let constructor = sema.lookup_local(members, &Name::new(CONSTRUCTOR_NAME))[0];
        assert!(sema.flags(constructor).contains(Flags::PRIVATE));
        assert!(matches!(sema.symbol(red).data, SymbolData::Variable { .. }));
    }
}
