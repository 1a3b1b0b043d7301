//! The per-analysis context: arenas, caches and the semantic side tables.
//!
//! Every component of the analyzer is an `impl Sema` block in its own
//! module. There is no global state; two analyses never share a `Sema`.

use std::collections::BTreeSet;

use nova_classpath::ClassProvider;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::AnalyzerConfig;
use crate::env::Env;
use crate::error::SemaError;
use crate::flags::Flags;
use crate::ids::{EnvId, NodeId, SymbolId, TypeId};
use crate::scope::ScopeData;
use crate::subst::TypeSubstitution;
use crate::symbols::{
    Callback, CompletionStats, MethodSymbolData, Symbol, SymbolData, SymbolKind, TypeSymbolData,
};
use crate::tree::{Name, SyntaxTree};
use crate::types::{Deferred, MethodType, TypeKind, WildcardKind};
use crate::well_known::WellKnown;

/// Binary classes and packages seen so far, keyed by flat name.
#[derive(Debug, Default)]
pub(crate) struct ClassRegistry {
    pub(crate) classes: FxHashMap<String, SymbolId>,
    pub(crate) packages: FxHashMap<String, SymbolId>,
    pub(crate) not_found: BTreeSet<String>,
}

/// Structural types that must be represented by a single id.
#[derive(Debug, Default)]
pub(crate) struct TypeInterner {
    arrays: FxHashMap<TypeId, TypeId>,
    wildcards: FxHashMap<(WildcardKind, TypeId), TypeId>,
    parameterized: FxHashMap<(SymbolId, TypeSubstitution), TypeId>,
}

#[derive(Debug, Default)]
pub(crate) struct SemanticTables {
    pub(crate) node_symbols: FxHashMap<NodeId, SymbolId>,
    pub(crate) node_types: FxHashMap<NodeId, TypeId>,
    pub(crate) node_envs: FxHashMap<NodeId, EnvId>,
}

pub struct Sema<'a> {
    pub(crate) tree: &'a SyntaxTree,
    pub(crate) provider: &'a dyn ClassProvider,
    pub(crate) config: AnalyzerConfig,

    pub(crate) symbols: Vec<Symbol>,
    pub(crate) types: Vec<TypeKind>,
    pub(crate) scopes: Vec<ScopeData>,
    pub(crate) envs: Vec<Env>,

    pub(crate) wk: WellKnown,
    pub(crate) registry: ClassRegistry,
    pub(crate) interner: TypeInterner,
    pub(crate) callbacks: FxHashMap<SymbolId, Vec<Callback<'a>>>,
    pub(crate) semantic: SemanticTables,
    /// Type sets currently being reduced by the least upper bound; breaks
    /// recursion through self-referential parameterizations.
    pub(crate) lub_in_progress: FxHashSet<Vec<TypeId>>,
    /// `(annotated symbol, enum type)` pairs whose enum constant values
    /// await the enum's completion.
    pub(crate) pending_enum_values: Vec<(SymbolId, SymbolId)>,
    pub(crate) fatal: Option<SemaError>,
    pub(crate) completion_stats: CompletionStats,
}

impl<'a> Sema<'a> {
    pub fn new(tree: &'a SyntaxTree, provider: &'a dyn ClassProvider, config: AnalyzerConfig) -> Self {
        let mut sema = Sema {
            tree,
            provider,
            config,
            symbols: Vec::new(),
            types: Vec::new(),
            scopes: Vec::new(),
            envs: Vec::new(),
            wk: WellKnown::placeholder(),
            registry: ClassRegistry::default(),
            interner: TypeInterner::default(),
            callbacks: FxHashMap::default(),
            semantic: SemanticTables::default(),
            lub_in_progress: FxHashSet::default(),
            pending_enum_values: Vec::new(),
            fatal: None,
            completion_stats: CompletionStats::default(),
        };
        sema.enter_predefined();
        sema
    }

    pub fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    pub fn well_known(&self) -> &WellKnown {
        &self.wk
    }

    /// Binary names referenced but missing from the classpath.
    pub fn classes_not_found(&self) -> &BTreeSet<String> {
        &self.registry.not_found
    }

    pub(crate) fn record_fatal(&mut self, error: SemaError) {
        if self.fatal.is_none() {
            tracing::error!(target: "nova.sema", %error, "aborting analysis");
            self.fatal = Some(error);
        }
    }

    // ---- symbol construction ----

    pub(crate) fn new_package(&mut self, name: Name, owner: Option<SymbolId>) -> SymbolId {
        let members = self.new_scope(None, None);
        let id = self.alloc_symbol(Symbol::new(
            SymbolKind::Package,
            Flags::empty(),
            name,
            owner,
            SymbolData::Package {
                members,
                package_info: None,
            },
        ));
        self.scopes[members.index()].owner = Some(id);
        id
    }

    /// A class, interface, enum or annotation type with empty member and
    /// type parameter scopes and its own class type.
    pub(crate) fn new_type_symbol(&mut self, flags: Flags, name: Name, owner: SymbolId) -> SymbolId {
        let members = self.new_scope(None, None);
        let type_parameters = self.new_scope(None, None);
        let id = self.alloc_symbol(Symbol::new(
            SymbolKind::Type,
            flags,
            name.clone(),
            Some(owner),
            SymbolData::Type(TypeSymbolData {
                members,
                type_parameters,
                type_variables: Vec::new(),
                superclass: None,
                interfaces: None,
                bytecode_name: None,
                internal_name: name,
                local_class_counts: FxHashMap::default(),
            }),
        ));
        self.scopes[members.index()].owner = Some(id);
        self.scopes[type_parameters.index()].owner = Some(id);
        let ty = self.alloc_type(TypeKind::Class(id));
        self.set_symbol_type(id, ty);
        id
    }

    pub(crate) fn new_variable(
        &mut self,
        flags: Flags,
        name: Name,
        ty: Option<TypeId>,
        owner: SymbolId,
    ) -> SymbolId {
        let id = self.alloc_symbol(Symbol::new(
            SymbolKind::Variable,
            flags,
            name,
            Some(owner),
            SymbolData::Variable { constant: None },
        ));
        self.symbol_mut(id).ty = ty;
        id
    }

    pub(crate) fn new_method(&mut self, flags: Flags, name: Name, owner: SymbolId) -> SymbolId {
        let type_parameters = self.new_scope(None, None);
        let id = self.alloc_symbol(Symbol::new(
            SymbolKind::Method,
            flags,
            name,
            Some(owner),
            SymbolData::Method(MethodSymbolData {
                parameters: Vec::new(),
                type_parameters,
                type_variables: Vec::new(),
                descriptor: None,
                default_value: None,
            }),
        ));
        self.scopes[type_parameters.index()].owner = Some(id);
        id
    }

    pub(crate) fn new_type_variable(&mut self, name: Name, owner: SymbolId) -> SymbolId {
        let id = self.alloc_symbol(Symbol::new(
            SymbolKind::TypeVariable,
            Flags::empty(),
            name,
            Some(owner),
            SymbolData::TypeVariable { bounds: Vec::new() },
        ));
        let ty = self.alloc_type(TypeKind::TypeVar(id));
        self.set_symbol_type(id, ty);
        id
    }

    pub(crate) fn set_method_type(&mut self, method: SymbolId, method_type: MethodType) {
        let ty = self.alloc_type(TypeKind::Method(method_type));
        self.set_symbol_type(method, ty);
    }

    /// Declares a type variable in `owner`'s type parameter scope.
    pub(crate) fn add_type_parameter(&mut self, owner: SymbolId, name: Name) -> SymbolId {
        let variable = self.new_type_variable(name, owner);
        let ty = self.symbol(variable).ty.unwrap_or(self.wk.unknown_type);
        let scope = match &mut self.symbol_mut(owner).data {
            SymbolData::Type(data) => {
                data.type_variables.push(ty);
                data.type_parameters
            }
            SymbolData::Method(data) => {
                data.type_variables.push(ty);
                data.type_parameters
            }
            _ => return variable,
        };
        self.enter(scope, variable);
        variable
    }

    pub(crate) fn set_bounds(&mut self, variable: SymbolId, bounds: Vec<TypeId>) {
        if let SymbolData::TypeVariable { bounds: slot } = &mut self.symbol_mut(variable).data {
            *slot = bounds;
        }
    }

    pub(crate) fn set_supertypes(
        &mut self,
        class: SymbolId,
        superclass: Option<TypeId>,
        interfaces: Vec<TypeId>,
    ) {
        if let Some(data) = self.symbol_mut(class).type_data_mut() {
            data.superclass = superclass;
            data.interfaces = Some(interfaces);
        }
    }

    // ---- type arena ----

    pub(crate) fn alloc_type(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId::from_index(self.types.len());
        self.types.push(kind);
        id
    }

    pub fn ty(&self, id: TypeId) -> &TypeKind {
        &self.types[id.index()]
    }

    pub fn array_of(&mut self, element: TypeId) -> TypeId {
        if let Some(id) = self.interner.arrays.get(&element) {
            return *id;
        }
        let id = self.alloc_type(TypeKind::Array(element));
        self.interner.arrays.insert(element, id);
        id
    }

    pub fn wildcard(&mut self, kind: WildcardKind, bound: TypeId) -> TypeId {
        if kind == WildcardKind::Unbounded {
            return self.wk.unbounded_wildcard;
        }
        if let Some(id) = self.interner.wildcards.get(&(kind, bound)) {
            return *id;
        }
        let id = self.alloc_type(TypeKind::Wildcard { kind, bound });
        self.interner.wildcards.insert((kind, bound), id);
        id
    }

    /// The parameterized type cache: equal substitutions of the same class
    /// share one type.
    pub fn parameterized(&mut self, symbol: SymbolId, substitution: TypeSubstitution) -> TypeId {
        if self.is_unknown_symbol(symbol) {
            return self.wk.unknown_type;
        }
        let key = (symbol, substitution);
        if let Some(id) = self.interner.parameterized.get(&key) {
            return *id;
        }
        let id = self.alloc_type(TypeKind::Parameterized {
            symbol,
            substitution: key.1.clone(),
        });
        self.interner.parameterized.insert(key, id);
        id
    }

    pub(crate) fn method_type_of(
        &mut self,
        params: Vec<TypeId>,
        result: Option<TypeId>,
        thrown: Vec<TypeId>,
    ) -> TypeId {
        self.alloc_type(TypeKind::Method(MethodType {
            params,
            result,
            thrown,
        }))
    }

    pub(crate) fn deferred(&mut self, deferred: Deferred) -> TypeId {
        self.alloc_type(TypeKind::Deferred(deferred))
    }

    // ---- semantic side tables ----

    pub fn type_of_node(&self, node: NodeId) -> Option<TypeId> {
        self.semantic.node_types.get(&node).copied()
    }

    pub fn symbol_of_node(&self, node: NodeId) -> Option<SymbolId> {
        self.semantic.node_symbols.get(&node).copied()
    }

    pub(crate) fn register_type(&mut self, node: NodeId, ty: TypeId) {
        self.semantic.node_types.insert(node, ty);
    }

    pub(crate) fn associate_symbol(&mut self, node: NodeId, symbol: SymbolId) {
        self.semantic.node_symbols.insert(node, symbol);
    }

    pub(crate) fn associate_env(&mut self, node: NodeId, env: EnvId) {
        self.semantic.node_envs.insert(node, env);
    }

    /// Environment of the nearest enclosing node that introduced one.
    pub fn env_of(&self, node: NodeId) -> EnvId {
        let mut current = Some(node);
        while let Some(id) = current {
            if let Some(env) = self.semantic.node_envs.get(&id) {
                return *env;
            }
            current = self.tree.parent(id);
        }
        self.wk.root_env
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use nova_classpath::InMemoryClasspath;

    use super::*;
    use crate::tree::TreeBuilder;

    pub(crate) fn empty_tree() -> SyntaxTree {
        let mut b = TreeBuilder::new();
        let unit = b.unit(None, vec![], vec![]);
        b.finish(unit)
    }

    pub(crate) fn sema<'a>(tree: &'a SyntaxTree, classpath: &'a InMemoryClasspath) -> Sema<'a> {
        Sema::new(tree, classpath, AnalyzerConfig::default())
    }
}
