//! Linked declaration graph: node identities and materialized cross-unit
//! edges.

use std::collections::HashMap;

use irlink_core::{DeclId, Symbol};

/// Identity of one declaration node across the whole linked graph.
///
/// `unit` is the owning unit's position in the linker's insertion order and
/// `decl` the handle inside that unit's arena. Two references are the same
/// node exactly when their `NodeRef`s are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub unit: u32,
    pub decl: DeclId,
}

impl NodeRef {
    pub fn new(unit: u32, decl: DeclId) -> Self {
        Self { unit, decl }
    }
}

/// Result of a successful link: the symbol index plus resolved non-owning
/// edges. Structural data stays in the linker's decoded units; the graph
/// only holds identities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkedGraph {
    pub(crate) unit_names: Vec<String>,
    pub(crate) by_symbol: HashMap<Symbol, NodeRef>,
    /// Per declaration, one entry per supertype in declared order; `None`
    /// when the supertype's classifier is unit-local (no symbol to chase).
    pub(crate) supertype_targets: HashMap<NodeRef, Vec<Option<NodeRef>>>,
    pub(crate) receivers: HashMap<NodeRef, NodeRef>,
}

impl LinkedGraph {
    /// Node that defines a symbol, if any unit does.
    pub fn node_for(&self, symbol: Symbol) -> Option<NodeRef> {
        self.by_symbol.get(&symbol).copied()
    }

    /// Resolved supertype targets of a declaration, in declared order.
    pub fn supertype_targets(&self, node: NodeRef) -> &[Option<NodeRef>] {
        self.supertype_targets
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Synthetic receiver of a declaration, if it has one.
    pub fn receiver(&self, node: NodeRef) -> Option<NodeRef> {
        self.receivers.get(&node).copied()
    }

    pub fn unit_name(&self, unit: u32) -> Option<&str> {
        self.unit_names.get(unit as usize).map(String::as_str)
    }

    pub fn unit_count(&self) -> usize {
        self.unit_names.len()
    }

    /// Number of symbol definitions in the graph.
    pub fn definition_count(&self) -> usize {
        self.by_symbol.len()
    }
}
