//! The semantic model handed to consumers once a unit has been analyzed.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::context::Sema;
use crate::ids::{NodeId, SymbolId, TypeId};
use crate::symbols::{AnnotationInstance, CompletionStats, SymbolKind};

/// Result of [`crate::analyze`]: the node associations, per-symbol
/// metadata and diagnostics of one compilation unit.
///
/// The analysis context stays alive behind the model, so symbols that were
/// never needed during the walk (binary classes, members of supertypes)
/// are still completed on demand when a consumer asks for them.
pub struct Analysis<'a> {
    sema: Sema<'a>,
}

impl<'a> Analysis<'a> {
    pub(crate) fn new(sema: Sema<'a>) -> Self {
        Self { sema }
    }

    pub fn sema(&self) -> &Sema<'a> {
        &self.sema
    }

    pub fn sema_mut(&mut self) -> &mut Sema<'a> {
        &mut self.sema
    }

    pub fn symbol_of(&self, node: NodeId) -> Option<SymbolId> {
        self.sema.symbol_of_node(node)
    }

    pub fn type_of(&self, node: NodeId) -> Option<TypeId> {
        self.sema.type_of_node(node)
    }

    /// Display name of the type recorded for `node`.
    pub fn type_name_of(&self, node: NodeId) -> Option<String> {
        self.type_of(node).map(|ty| self.sema.display(ty))
    }

    pub fn full_name(&self, symbol: SymbolId) -> String {
        self.sema.full_name(symbol)
    }

    pub fn declaration_of(&self, symbol: SymbolId) -> Option<NodeId> {
        self.sema.declaration(symbol)
    }

    /// Every identifier node that resolved to `symbol`.
    pub fn references(&self, symbol: SymbolId) -> &[NodeId] {
        self.sema.usages(symbol)
    }

    pub fn annotations(&mut self, symbol: SymbolId) -> Vec<AnnotationInstance> {
        self.sema.annotations(symbol)
    }

    pub fn classes_not_found(&self) -> &BTreeSet<String> {
        self.sema.classes_not_found()
    }

    pub fn completion_stats(&self) -> CompletionStats {
        self.sema.completion_stats()
    }

    /// Node to symbol associations ordered by node.
    pub fn resolved_nodes(&self) -> Vec<(NodeId, SymbolId)> {
        let mut nodes: Vec<(NodeId, SymbolId)> = self
            .sema
            .semantic
            .node_symbols
            .iter()
            .map(|(node, symbol)| (*node, *symbol))
            .collect();
        nodes.sort_unstable();
        nodes
    }

    /// A serializable snapshot of the model, used for dumps and golden
    /// tests.
    pub fn summary(&self) -> AnalysisSummary {
        let mut nodes: Vec<NodeId> = self
            .sema
            .semantic
            .node_symbols
            .keys()
            .chain(self.sema.semantic.node_types.keys())
            .copied()
            .collect();
        nodes.sort_unstable();
        nodes.dedup();

        let nodes = nodes
            .into_iter()
            .map(|node| {
                let symbol = self.symbol_of(node);
                NodeSummary {
                    node: node.index(),
                    symbol: symbol.map(|symbol| self.full_name(symbol)),
                    kind: symbol.map(|symbol| self.sema.kind(symbol)),
                    ty: self.type_name_of(node),
                }
            })
            .collect();
        AnalysisSummary {
            nodes,
            classes_not_found: self.classes_not_found().iter().cloned().collect(),
            completions: self.completion_stats(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSummary {
    pub node: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<SymbolKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub nodes: Vec<NodeSummary>,
    pub classes_not_found: Vec<String>,
    pub completions: CompletionStats,
}
