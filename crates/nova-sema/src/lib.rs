//! Semantic analysis for Java compilation units.
//!
//! Given a [`SyntaxTree`] and a [`ClassProvider`] for the classpath, the
//! analyzer builds the symbol table, resolves every name to its
//! declaration, types every expression (overload resolution, generic
//! inference and least upper bounds included) and exposes the result as an
//! [`Analysis`].
//!
//! Declarations are entered in a first pass and completed lazily: a class
//! read from the classpath is only parsed, and a source declaration only
//! resolved, when something needs its supertypes, members or type.
//! Failures never abort the walk; unresolved names get the unknown type and
//! missing classes are collected in [`Analysis::classes_not_found`]. A
//! cyclic class hierarchy is the only fatal error.

mod bytecode;
pub mod config;
mod context;
mod env;
pub mod error;
mod first_pass;
pub mod flags;
mod ids;
mod model;
mod resolve;
mod scope;
mod second_pass;
mod solver;
mod subst;
pub mod symbols;
pub mod tree;
pub mod types;
mod typing;
mod well_known;

use nova_classpath::ClassProvider;

pub use crate::config::{init_tracing, AnalyzerConfig, LoggingConfig};
pub use crate::context::Sema;
pub use crate::env::Env;
pub use crate::error::{ConfigError, SemaError};
pub use crate::flags::Flags;
pub use crate::ids::{EnvId, NodeId, ScopeId, SymbolId, TypeId};
pub use crate::model::{Analysis, AnalysisSummary, NodeSummary};
pub use crate::resolve::{Resolution, ResolveError};
pub use crate::subst::TypeSubstitution;
pub use crate::symbols::{
    AnnotationInstance, AnnotationValue, Completion, CompletionStats, Constant, KindSet, SymbolKind,
};
pub use crate::tree::{SyntaxTree, TreeBuilder};
pub use crate::types::{Primitive, TypeKind, WildcardKind};
pub use crate::well_known::WellKnown;

/// Analyzes the compilation unit rooted at `tree.root()`.
///
/// Returns `Err` only for a cyclic class hierarchy; every other problem is
/// recorded in the returned model.
pub fn analyze<'a>(
    tree: &'a SyntaxTree,
    provider: &'a dyn ClassProvider,
    config: AnalyzerConfig,
) -> Result<Analysis<'a>, SemaError> {
    let mut sema = Sema::new(tree, provider, config);
    sema.enter_unit();
    sema.attribute_unit();
    if let Some(error) = sema.fatal.take() {
        return Err(error);
    }
    let stats = sema.completion_stats();
    tracing::debug!(
        target: "nova.sema",
        nodes = tree.len(),
        bytecode_completions = stats.bytecode,
        source_completions = stats.source,
        missing_classes = sema.classes_not_found().len(),
        "analysis finished"
    );
    Ok(Analysis::new(sema))
}
