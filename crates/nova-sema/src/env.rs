//! Lexical environments: a chain of scopes plus the enclosing class and
//! the compilation unit's import scopes.

use crate::context::Sema;
use crate::ids::{EnvId, ScopeId, SymbolId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Env {
    /// Lexically enclosing environment of a different class or method;
    /// `None` for the compilation unit.
    pub outer: Option<EnvId>,
    pub package: SymbolId,
    pub enclosing_class: Option<SymbolId>,
    pub scope: ScopeId,
    pub named_imports: ScopeId,
    pub star_imports: ScopeId,
    pub static_star_imports: ScopeId,
}

impl<'a> Sema<'a> {
    pub(crate) fn alloc_env(&mut self, env: Env) -> EnvId {
        let id = EnvId::from_index(self.envs.len());
        self.envs.push(env);
        id
    }

    pub fn env(&self, id: EnvId) -> &Env {
        &self.envs[id.index()]
    }

    /// Copy of `id` that the caller then specializes.
    pub(crate) fn dup_env(&self, id: EnvId) -> Env {
        self.env(id).clone()
    }

    /// Same environment with a fresh child scope.
    pub(crate) fn child_env(&mut self, id: EnvId) -> EnvId {
        let mut env = self.dup_env(id);
        let owner = self.scope_owner(env.scope);
        env.scope = self.new_scope(owner, Some(env.scope));
        self.alloc_env(env)
    }
}
