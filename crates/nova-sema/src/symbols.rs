//! Declared program entities and their lazily completed payloads.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::context::Sema;
use crate::flags::Flags;
use crate::ids::{NodeId, ScopeId, SymbolId, TypeId};
use crate::tree::Name;
use crate::types::{MethodType, TypeKind};

bitflags::bitflags! {
    /// Kinds a lookup is interested in.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KindSet: u8 {
        const PACKAGE = 1 << 0;
        const TYPE = 1 << 1;
        const VARIABLE = 1 << 2;
        const METHOD = 1 << 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Package,
    Type,
    Variable,
    Method,
    TypeVariable,
    Label,
    /// The per-analysis "unknown" symbol that unresolved things point at.
    Error,
}

impl SymbolKind {
    pub fn matches(self, set: KindSet) -> bool {
        match self {
            SymbolKind::Package => set.contains(KindSet::PACKAGE),
            SymbolKind::Type | SymbolKind::TypeVariable => set.contains(KindSet::TYPE),
            SymbolKind::Variable => set.contains(KindSet::VARIABLE),
            SymbolKind::Method => set.contains(KindSet::METHOD),
            SymbolKind::Label | SymbolKind::Error => false,
        }
    }
}

/// Who fills in a symbol's completion-dependent payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completer {
    /// Read from the class file on the classpath.
    Bytecode,
    /// Resolved from the declaration in the syntax tree (second pass).
    Source,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Uninitialized(Completer),
    Completing,
    Completed,
}

/// Compile-time constant of a `static final` field or an annotation element.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Boolean(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Constant(Constant),
    Enum {
        type_symbol: SymbolId,
        name: Name,
        /// Filled once the enum type is completed.
        constant: Option<SymbolId>,
    },
    Class(TypeId),
    Annotation(Box<AnnotationInstance>),
    Array(Vec<AnnotationValue>),
    /// A source expression that is not a constant (or did not resolve).
    Unresolved,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationInstance {
    pub symbol: SymbolId,
    pub values: Vec<(Name, AnnotationValue)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSymbolData {
    pub members: ScopeId,
    pub type_parameters: ScopeId,
    pub type_variables: Vec<TypeId>,
    pub(crate) superclass: Option<TypeId>,
    pub(crate) interfaces: Option<Vec<TypeId>>,
    /// Flat binary name for classes read from class files.
    pub(crate) bytecode_name: Option<String>,
    /// Name used in the binary name; local and anonymous classes get a
    /// numeric prefix (`1Local`, `1`).
    pub(crate) internal_name: Name,
    /// Per-name counters for local and anonymous classes declared inside.
    pub(crate) local_class_counts: FxHashMap<Name, u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSymbolData {
    pub parameters: Vec<SymbolId>,
    pub type_parameters: ScopeId,
    pub type_variables: Vec<TypeId>,
    pub(crate) descriptor: Option<String>,
    pub default_value: Option<AnnotationValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolData {
    Package {
        members: ScopeId,
        package_info: Option<SymbolId>,
    },
    Type(TypeSymbolData),
    Variable {
        constant: Option<Constant>,
    },
    Method(MethodSymbolData),
    TypeVariable {
        bounds: Vec<TypeId>,
    },
    Label,
    Error {
        members: ScopeId,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub(crate) flags: Flags,
    pub name: Name,
    pub owner: Option<SymbolId>,
    pub(crate) ty: Option<TypeId>,
    pub(crate) completion: Completion,
    pub declaration: Option<NodeId>,
    pub(crate) usages: Vec<NodeId>,
    pub(crate) annotations: Vec<AnnotationInstance>,
    pub data: SymbolData,
}

impl Symbol {
    pub(crate) fn new(
        kind: SymbolKind,
        flags: Flags,
        name: Name,
        owner: Option<SymbolId>,
        data: SymbolData,
    ) -> Self {
        Self {
            kind,
            flags,
            name,
            owner,
            ty: None,
            completion: Completion::Completed,
            declaration: None,
            usages: Vec::new(),
            annotations: Vec::new(),
            data,
        }
    }

    pub fn completion(&self) -> Completion {
        self.completion
    }

    pub(crate) fn type_data(&self) -> Option<&TypeSymbolData> {
        match &self.data {
            SymbolData::Type(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn type_data_mut(&mut self) -> Option<&mut TypeSymbolData> {
        match &mut self.data {
            SymbolData::Type(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn method_data(&self) -> Option<&MethodSymbolData> {
        match &self.data {
            SymbolData::Method(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn method_data_mut(&mut self) -> Option<&mut MethodSymbolData> {
        match &mut self.data {
            SymbolData::Method(data) => Some(data),
            _ => None,
        }
    }
}

pub(crate) type Callback<'a> = Box<dyn FnOnce(&mut Sema<'a>) + 'a>;

/// How many completions each completer actually ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompletionStats {
    pub bytecode: u32,
    pub source: u32,
}

impl<'a> Sema<'a> {
    pub(crate) fn alloc_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId::from_index(self.symbols.len());
        self.symbols.push(symbol);
        id
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub(crate) fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    pub fn name(&self, id: SymbolId) -> &Name {
        &self.symbols[id.index()].name
    }

    pub fn kind(&self, id: SymbolId) -> SymbolKind {
        self.symbols[id.index()].kind
    }

    pub fn owner(&self, id: SymbolId) -> Option<SymbolId> {
        self.symbols[id.index()].owner
    }

    pub fn completion_stats(&self) -> CompletionStats {
        self.completion_stats
    }

    pub(crate) fn set_completer(&mut self, id: SymbolId, completer: Completer) {
        self.symbol_mut(id).completion = Completion::Uninitialized(completer);
    }

    /// Runs the symbol's completer once. Re-entrant calls for a symbol that
    /// is already completing return immediately; completion of *other*
    /// symbols may nest freely.
    pub fn complete(&mut self, id: SymbolId) {
        let Completion::Uninitialized(completer) = self.symbol(id).completion else {
            return;
        };
        self.symbol_mut(id).completion = Completion::Completing;
        tracing::trace!(target: "nova.sema", symbol = %self.name(id), ?completer, "completing symbol");
        match completer {
            Completer::Bytecode => {
                self.completion_stats.bytecode += 1;
                self.complete_from_bytecode(id);
            }
            Completer::Source => {
                self.completion_stats.source += 1;
                self.complete_from_source(id);
            }
        }
        self.symbol_mut(id).completion = Completion::Completed;
        if let Some(callbacks) = self.callbacks.remove(&id) {
            for callback in callbacks {
                callback(self);
            }
        }
    }

    /// Runs `callback` once `id` is completed: immediately if it can be
    /// completed now, after the outer completion otherwise.
    pub(crate) fn on_completed(&mut self, id: SymbolId, callback: Callback<'a>) {
        if self.symbol(id).completion == Completion::Completing {
            self.callbacks.entry(id).or_default().push(callback);
        } else {
            self.complete(id);
            callback(self);
        }
    }

    pub fn flags(&mut self, id: SymbolId) -> Flags {
        self.complete(id);
        self.symbol(id).flags
    }

    pub(crate) fn raw_flags(&self, id: SymbolId) -> Flags {
        self.symbol(id).flags
    }

    pub fn has_flag(&mut self, id: SymbolId, flag: Flags) -> bool {
        self.flags(id).intersects(flag)
    }

    pub fn is_static(&mut self, id: SymbolId) -> bool {
        self.has_flag(id, Flags::STATIC)
    }

    pub fn is_interface(&mut self, id: SymbolId) -> bool {
        self.has_flag(id, Flags::INTERFACE)
    }

    pub fn is_enum(&mut self, id: SymbolId) -> bool {
        self.has_flag(id, Flags::ENUM)
    }

    pub fn is_type_symbol(&self, id: SymbolId) -> bool {
        matches!(self.kind(id), SymbolKind::Type | SymbolKind::TypeVariable)
    }

    pub fn is_unknown_symbol(&self, id: SymbolId) -> bool {
        self.kind(id) == SymbolKind::Error
    }

    /// Declared type of the symbol: the class type of a type symbol, the
    /// method type of a method, the variable's type.
    pub fn type_of_symbol(&mut self, id: SymbolId) -> TypeId {
        if matches!(self.kind(id), SymbolKind::Variable | SymbolKind::Method) {
            self.complete(id);
        }
        self.symbol(id).ty.unwrap_or(self.wk.unknown_type)
    }

    pub(crate) fn set_symbol_type(&mut self, id: SymbolId, ty: TypeId) {
        self.symbol_mut(id).ty = Some(ty);
    }

    /// Member scope of a type or package; completes the symbol first.
    pub fn members(&mut self, id: SymbolId) -> Option<ScopeId> {
        self.complete(id);
        match &self.symbol(id).data {
            SymbolData::Type(data) => Some(data.members),
            SymbolData::Package { members, .. } | SymbolData::Error { members } => Some(*members),
            _ => None,
        }
    }

    pub fn type_variables(&mut self, id: SymbolId) -> Vec<TypeId> {
        self.complete(id);
        match &self.symbol(id).data {
            SymbolData::Type(data) => data.type_variables.clone(),
            SymbolData::Method(data) => data.type_variables.clone(),
            _ => Vec::new(),
        }
    }

    pub fn type_parameter_scope(&mut self, id: SymbolId) -> Option<ScopeId> {
        self.complete(id);
        match &self.symbol(id).data {
            SymbolData::Type(data) => Some(data.type_parameters),
            SymbolData::Method(data) => Some(data.type_parameters),
            _ => None,
        }
    }

    /// Direct superclass; `None` for `Object`, interfaces read from source
    /// without one, and the unknown symbol.
    pub fn superclass(&mut self, id: SymbolId) -> Option<TypeId> {
        self.complete(id);
        match &self.symbol(id).data {
            SymbolData::Type(data) => data.superclass,
            SymbolData::TypeVariable { bounds } => {
                let first = *bounds.first()?;
                let bound_symbol = self.type_symbol(first);
                if self.is_interface(bound_symbol) {
                    Some(self.wk.object_type)
                } else {
                    Some(first)
                }
            }
            _ => None,
        }
    }

    pub fn interfaces(&mut self, id: SymbolId) -> Vec<TypeId> {
        self.complete(id);
        match &self.symbol(id).data {
            SymbolData::Type(data) => data.interfaces.clone().unwrap_or_default(),
            SymbolData::TypeVariable { bounds } => {
                let bounds = bounds.clone();
                let Some(first) = bounds.first().copied() else {
                    return Vec::new();
                };
                let first_symbol = self.type_symbol(first);
                if self.is_interface(first_symbol) {
                    bounds
                } else {
                    bounds[1..].to_vec()
                }
            }
            _ => Vec::new(),
        }
    }

    /// Bounds of a type variable symbol (at least `Object` once completed).
    pub fn bounds(&mut self, id: SymbolId) -> Vec<TypeId> {
        self.complete(id);
        match &self.symbol(id).data {
            SymbolData::TypeVariable { bounds } if !bounds.is_empty() => bounds.clone(),
            _ => vec![self.wk.object_type],
        }
    }

    /// Superclass and interfaces.
    pub fn direct_super_types(&mut self, id: SymbolId) -> Vec<TypeId> {
        let mut out: Vec<TypeId> = self.superclass(id).into_iter().collect();
        for interface in self.interfaces(id) {
            if !out.contains(&interface) {
                out.push(interface);
            }
        }
        out
    }

    /// All supertypes: interfaces breadth-first, then the superclass chain,
    /// each superclass followed by its own interfaces. Distinct, in order.
    pub fn super_types(&mut self, id: SymbolId) -> Vec<TypeId> {
        let mut out = self.interfaces_closure(id);
        let mut superclass = self.superclass(id);
        let mut seen_classes = vec![id];
        while let Some(ty) = superclass {
            let symbol = self.type_symbol(ty);
            if seen_classes.contains(&symbol) {
                break;
            }
            seen_classes.push(symbol);
            if !out.contains(&ty) {
                out.push(ty);
            }
            for interface in self.interfaces_closure(symbol) {
                if !out.contains(&interface) {
                    out.push(interface);
                }
            }
            superclass = self.superclass(symbol);
        }
        out
    }

    fn interfaces_closure(&mut self, id: SymbolId) -> Vec<TypeId> {
        let own_type = self.symbol(id).ty;
        let mut todo: std::collections::VecDeque<TypeId> = self.interfaces(id).into();
        let mut out = Vec::new();
        while let Some(ty) = todo.pop_front() {
            if Some(ty) == own_type || out.contains(&ty) {
                continue;
            }
            out.push(ty);
            let symbol = self.type_symbol(ty);
            todo.extend(self.interfaces(symbol));
        }
        out
    }

    /// Nearest enclosing type symbol, the symbol itself included.
    pub fn enclosing_class(&self, id: SymbolId) -> Option<SymbolId> {
        let mut current = Some(id);
        while let Some(symbol) = current {
            if matches!(self.kind(symbol), SymbolKind::Type | SymbolKind::Error) {
                return Some(symbol);
            }
            current = self.owner(symbol);
        }
        None
    }

    /// Top-level class containing the symbol.
    pub fn outermost_class(&self, id: SymbolId) -> Option<SymbolId> {
        let mut current = id;
        let mut result = None;
        while self.kind(current) != SymbolKind::Package {
            result = Some(current);
            current = self.owner(current)?;
        }
        result
    }

    pub fn package_of(&self, id: SymbolId) -> SymbolId {
        let mut current = id;
        while self.kind(current) != SymbolKind::Package {
            match self.owner(current) {
                Some(owner) => current = owner,
                None => return self.wk.default_package,
            }
        }
        current
    }

    /// `java.util.Map$Entry`; local classes use their numbered internal name.
    pub fn full_name(&self, id: SymbolId) -> String {
        let symbol = self.symbol(id);
        match &symbol.data {
            SymbolData::Type(data) => {
                if let Some(name) = &data.bytecode_name {
                    return name.clone();
                }
                let prefix = match symbol.owner {
                    Some(owner) => match self.kind(owner) {
                        SymbolKind::Package if !self.name(owner).is_empty() => {
                            format!("{}.", self.name(owner))
                        }
                        SymbolKind::Type => format!("{}$", self.full_name(owner)),
                        SymbolKind::Method | SymbolKind::Variable => {
                            match self.enclosing_class(owner) {
                                Some(class) => format!("{}$", self.full_name(class)),
                                None => String::new(),
                            }
                        }
                        _ => String::new(),
                    },
                    None => String::new(),
                };
                format!("{prefix}{}", data.internal_name)
            }
            _ => symbol.name.to_string(),
        }
    }

    pub fn declaration(&self, id: SymbolId) -> Option<NodeId> {
        self.symbol(id).declaration
    }

    /// Identifier nodes resolved to this symbol, in source order, distinct.
    pub fn usages(&self, id: SymbolId) -> &[NodeId] {
        &self.symbol(id).usages
    }

    pub(crate) fn add_usage(&mut self, id: SymbolId, node: NodeId) {
        if self.is_unknown_symbol(id) || !self.config.record_usages {
            return;
        }
        let usages = &mut self.symbol_mut(id).usages;
        if !usages.contains(&node) {
            usages.push(node);
        }
    }

    /// Annotation instances attached to the symbol. For packages these are
    /// the annotations of `package-info`.
    pub fn annotations(&mut self, id: SymbolId) -> Vec<AnnotationInstance> {
        self.complete(id);
        if let SymbolData::Package {
            package_info: Some(info),
            ..
        } = self.symbol(id).data
        {
            return self.annotations(info);
        }
        self.symbol(id).annotations.clone()
    }

    // ---- methods ----

    pub fn method_type(&mut self, id: SymbolId) -> Option<MethodType> {
        self.complete(id);
        let ty = self.symbol(id).ty?;
        match self.ty(ty) {
            TypeKind::Method(method) => Some(method.clone()),
            _ => None,
        }
    }

    pub fn parameter_types(&mut self, id: SymbolId) -> Vec<TypeId> {
        self.method_type(id)
            .map(|m| m.params)
            .unwrap_or_default()
    }

    pub fn return_type(&mut self, id: SymbolId) -> Option<TypeId> {
        self.method_type(id).and_then(|m| m.result)
    }

    pub fn is_varargs(&mut self, id: SymbolId) -> bool {
        self.has_flag(id, Flags::VARARGS)
    }

    pub fn is_constructor(&self, id: SymbolId) -> bool {
        self.kind(id) == SymbolKind::Method && self.name(id) == "<init>"
    }

    pub fn parameters(&mut self, id: SymbolId) -> Vec<SymbolId> {
        self.complete(id);
        self.symbol(id)
            .method_data()
            .map(|data| data.parameters.clone())
            .unwrap_or_default()
    }

    /// Is the method generic (declares its own type parameters)?
    pub fn is_generic_method(&mut self, id: SymbolId) -> bool {
        !self.type_variables(id).is_empty()
    }

    /// `java.util.List#add(Ljava/lang/Object;)Z`
    pub fn method_signature(&mut self, id: SymbolId) -> String {
        let owner = self
            .owner(id)
            .map(|owner| self.full_name(owner))
            .unwrap_or_default();
        let descriptor = match self.symbol(id).method_data().and_then(|d| d.descriptor.clone()) {
            Some(descriptor) => descriptor,
            None => {
                let method = self.method_type(id);
                let mut descriptor = String::from("(");
                if let Some(method) = &method {
                    for param in &method.params {
                        descriptor.push_str(&self.descriptor_of(*param));
                    }
                }
                descriptor.push(')');
                match method.and_then(|m| m.result) {
                    Some(result) => descriptor.push_str(&self.descriptor_of(result)),
                    None => descriptor.push('V'),
                }
                descriptor
            }
        };
        format!("{owner}#{}{descriptor}", self.name(id))
    }

    /// Method in a supertype that this method overrides: same name, not
    /// static, visible for overriding and with the same erased parameter
    /// types once the supertype's substitution is applied.
    pub fn overridden_method(&mut self, id: SymbolId) -> Option<SymbolId> {
        if self.is_static(id) || self.is_constructor(id) {
            return None;
        }
        let class = self.enclosing_class(self.owner(id)?)?;
        let name = self.name(id).clone();
        let params = self.parameter_types(id);
        for super_type in self.super_types(class) {
            let super_symbol = self.type_symbol(super_type);
            let Some(members) = self.members(super_symbol) else {
                continue;
            };
            for candidate in self.lookup(members, &name) {
                if self.kind(candidate) != SymbolKind::Method || self.is_static(candidate) {
                    continue;
                }
                if self.can_override(id, candidate)
                    && self.same_erased_parameters(&params, candidate, super_type)
                {
                    return Some(candidate);
                }
            }
        }
        None
    }

    fn can_override(&mut self, overrider: SymbolId, overridee: SymbolId) -> bool {
        let flags = self.flags(overridee);
        if flags.is_package_private() {
            let a = self.outermost_class(overridee).map(|c| self.package_of(c));
            let b = self.outermost_class(overrider).map(|c| self.package_of(c));
            return a == b;
        }
        !flags.contains(Flags::PRIVATE)
    }

    fn same_erased_parameters(&mut self, params: &[TypeId], overridee: SymbolId, site: TypeId) -> bool {
        let other = self.parameter_types(overridee);
        if other.len() != params.len() {
            return false;
        }
        for (mine, theirs) in params.iter().zip(other) {
            let theirs = match self.ty(site) {
                TypeKind::Parameterized { substitution, .. } => {
                    substitution.substituted_type(theirs).unwrap_or(theirs)
                }
                _ => theirs,
            };
            if self.erasure(*mine) != self.erasure(theirs) {
                return false;
            }
        }
        true
    }

    // ---- variables ----

    /// Constant value of a `static final` field.
    pub fn constant_value(&mut self, id: SymbolId) -> Option<Constant> {
        let flags = self.flags(id);
        if !flags.contains(Flags::STATIC | Flags::FINAL) {
            return None;
        }
        match &self.symbol(id).data {
            SymbolData::Variable { constant } => constant.clone(),
            _ => None,
        }
    }
}
