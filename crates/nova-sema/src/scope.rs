//! Name-to-symbol tables with optional parent chaining.

use indexmap::IndexMap;

use crate::context::Sema;
use crate::ids::{ScopeId, SymbolId};
use crate::symbols::SymbolData;
use crate::tree::Name;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScopeKind {
    Plain,
    /// Members of on-demand imports; entries are the imported packages or
    /// types, lookups go through their members.
    StarImport,
    /// Static members of the types imported with `import static T.*`.
    StaticStarImport,
}

#[derive(Debug, Clone)]
pub(crate) struct ScopeData {
    pub(crate) owner: Option<SymbolId>,
    pub(crate) parent: Option<ScopeId>,
    pub(crate) kind: ScopeKind,
    entries: IndexMap<Name, Vec<SymbolId>>,
    /// Imported packages or types of an on-demand import scope.
    imported: Vec<SymbolId>,
}

impl ScopeData {
    fn new(owner: Option<SymbolId>, parent: Option<ScopeId>, kind: ScopeKind) -> Self {
        Self {
            owner,
            parent,
            kind,
            entries: IndexMap::new(),
            imported: Vec::new(),
        }
    }
}

impl<'a> Sema<'a> {
    pub(crate) fn new_scope(&mut self, owner: Option<SymbolId>, parent: Option<ScopeId>) -> ScopeId {
        self.push_scope(ScopeData::new(owner, parent, ScopeKind::Plain))
    }

    pub(crate) fn new_import_scope(&mut self, kind: ScopeKind) -> ScopeId {
        self.push_scope(ScopeData::new(None, None, kind))
    }

    fn push_scope(&mut self, data: ScopeData) -> ScopeId {
        let id = ScopeId::from_index(self.scopes.len());
        self.scopes.push(data);
        id
    }

    /// Adds `symbol` under its own name. Re-entering the same symbol is a
    /// no-op; distinct symbols may share a name (overloads, a field and a
    /// type).
    pub(crate) fn enter(&mut self, scope: ScopeId, symbol: SymbolId) {
        let name = self.name(symbol).clone();
        let data = &mut self.scopes[scope.index()];
        match data.kind {
            ScopeKind::Plain => {
                let slot = data.entries.entry(name).or_default();
                if !slot.contains(&symbol) {
                    slot.push(symbol);
                }
            }
            ScopeKind::StarImport | ScopeKind::StaticStarImport => {
                if !data.imported.contains(&symbol) {
                    data.imported.push(symbol);
                }
            }
        }
    }

    /// Entries with that name in this scope only, in entry order.
    pub(crate) fn lookup_local(&mut self, scope: ScopeId, name: &Name) -> Vec<SymbolId> {
        match self.scopes[scope.index()].kind {
            ScopeKind::Plain => self.scopes[scope.index()]
                .entries
                .get(name)
                .cloned()
                .unwrap_or_default(),
            ScopeKind::StarImport => self.lookup_star_import(scope, name),
            ScopeKind::StaticStarImport => self.lookup_static_star_import(scope, name),
        }
    }

    /// Searches this scope, then each parent; the first scope with any
    /// entry for `name` wins.
    pub fn lookup(&mut self, scope: ScopeId, name: &Name) -> Vec<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let found = self.lookup_local(id, name);
            if !found.is_empty() {
                return found;
            }
            current = self.scopes[id.index()].parent;
        }
        Vec::new()
    }

    /// Every symbol entered in a plain scope, in entry order.
    pub fn scope_symbols(&self, scope: ScopeId) -> Vec<SymbolId> {
        self.scopes[scope.index()]
            .entries
            .values()
            .flatten()
            .copied()
            .collect()
    }

    pub(crate) fn scope_owner(&self, scope: ScopeId) -> Option<SymbolId> {
        self.scopes[scope.index()].owner
    }

    fn lookup_star_import(&mut self, scope: ScopeId, name: &Name) -> Vec<SymbolId> {
        let imported = self.scopes[scope.index()].imported.clone();
        let mut out = Vec::new();
        for site in imported {
            if matches!(self.symbol(site).data, SymbolData::Package { .. }) {
                let full = self.qualified_child_name(site, name);
                if let Some(class) = self.load_class(&full) {
                    if !out.contains(&class) {
                        out.push(class);
                    }
                }
            } else if let Some(members) = self.members(site) {
                for member in self.lookup_local(members, name) {
                    if self.is_type_symbol(member) && !out.contains(&member) {
                        out.push(member);
                    }
                }
            }
        }
        out
    }

    fn lookup_static_star_import(&mut self, scope: ScopeId, name: &Name) -> Vec<SymbolId> {
        let imported = self.scopes[scope.index()].imported.clone();
        let mut out = Vec::new();
        for site in imported {
            let Some(members) = self.members(site) else {
                continue;
            };
            for member in self.lookup_local(members, name) {
                if self.is_static(member) && !out.contains(&member) {
                    out.push(member);
                }
            }
        }
        out
    }

    /// `pkg.name`, or `name` in the default package.
    pub(crate) fn qualified_child_name(&self, package: SymbolId, name: &str) -> String {
        let prefix = self.name(package);
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        }
    }
}

#[cfg(test)]
mod tests {
    use nova_classpath::InMemoryClasspath;
    use pretty_assertions::assert_eq;

    use crate::context::test_support::{empty_tree, sema};
    use crate::flags::Flags;
    use crate::tree::Name;

    #[test]
    fn lookup_prefers_the_innermost_scope() {
        let tree = empty_tree();
        let classpath = InMemoryClasspath::new();
        let mut sema = sema(&tree, &classpath);
        let owner = sema.wk.object;

        let outer = sema.new_scope(None, None);
        let inner = sema.new_scope(None, Some(outer));
        let outer_x = sema.new_variable(Flags::empty(), "x".into(), None, owner);
        let inner_x = sema.new_variable(Flags::empty(), "x".into(), None, owner);
        let y = sema.new_variable(Flags::empty(), "y".into(), None, owner);
        sema.enter(outer, outer_x);
        sema.enter(outer, y);
        sema.enter(inner, inner_x);
        sema.enter(inner, inner_x);

        assert_eq!(sema.lookup(inner, &Name::new("x")), vec![inner_x]);
        assert_eq!(sema.lookup(inner, &Name::new("y")), vec![y]);
        assert_eq!(sema.lookup(outer, &Name::new("x")), vec![outer_x]);
        assert!(sema.lookup(inner, &Name::new("z")).is_empty());
    }
}
