//! The linker proper: merge phase, resolve phase, incremental re-link.

use std::collections::HashMap;

use indexmap::IndexMap;

use irlink_codec::{CodecError, UnlinkedDecl, UnlinkedUnit};
use irlink_core::{Assignment, EntityPath, Symbol, SymbolTable};

use crate::error::LinkError;
use crate::graph::{LinkedGraph, NodeRef};
use crate::session::Session;

/// Links a set of decoded units into one declaration graph.
///
/// Units are held decoded; [`Linker::relink`] replaces changed units by name
/// and never touches the others' bytes. All symbol state flows through the
/// explicit [`Session`], so two linkers never interfere.
#[derive(Debug)]
pub struct Linker {
    units: IndexMap<String, UnlinkedUnit>,
    session: Session,
    /// Losing symbol → winning symbol, accumulated over every merge.
    aliases: HashMap<Symbol, Symbol>,
    graph: Option<LinkedGraph>,
}

impl Linker {
    pub fn new(session: Session) -> Self {
        Self {
            units: IndexMap::new(),
            session,
            aliases: HashMap::new(),
            graph: None,
        }
    }

    /// Register a decoded unit for linking.
    pub fn add_unit(&mut self, unit: UnlinkedUnit) -> Result<(), LinkError> {
        if self.units.contains_key(&unit.name) {
            return Err(LinkError::DuplicateUnit(unit.name.clone()));
        }
        self.graph = None;
        self.units.insert(unit.name.clone(), unit);
        Ok(())
    }

    pub fn unit(&self, name: &str) -> Option<&UnlinkedUnit> {
        self.units.get(name)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    /// The last successfully linked graph, if any.
    pub fn graph(&self) -> Option<&LinkedGraph> {
        self.graph.as_ref()
    }

    /// Full link: merge every unit's symbol assignments into the session,
    /// then resolve all cross-unit references.
    pub fn link(&mut self) -> Result<&LinkedGraph, LinkError> {
        self.graph = None;
        for unit in self.units.values() {
            let table = unit_symbols(unit)?;
            let outcome = self.session.merge(&table)?;
            self.aliases.extend(outcome.aliases);
        }
        let graph = self.resolve()?;
        Ok(&*self.graph.insert(graph))
    }

    /// Incremental re-link: replace the given units by name (or add them),
    /// merge only their symbol assignments, and re-resolve. Unchanged units
    /// keep their decoded form; the result equals a full re-link.
    pub fn relink(
        &mut self,
        changed: impl IntoIterator<Item = UnlinkedUnit>,
    ) -> Result<&LinkedGraph, LinkError> {
        self.graph = None;
        for unit in changed {
            let table = unit_symbols(&unit)?;
            let outcome = self.session.merge(&table)?;
            self.aliases.extend(outcome.aliases);
            // Replacing an existing name keeps its position, so node
            // identities of unchanged units are stable.
            self.units.insert(unit.name.clone(), unit);
        }
        let graph = self.resolve()?;
        Ok(&*self.graph.insert(graph))
    }

    /// Chase a symbol through the alias map to its canonical value.
    /// Chains are finite: the winning origin strictly decreases per hop.
    fn canonical(&self, symbol: Symbol) -> Symbol {
        let mut current = symbol;
        while let Some(&next) = self.aliases.get(&current) {
            current = next;
        }
        current
    }

    /// Resolve phase. Builds a fresh graph; on error nothing is published.
    fn resolve(&self) -> Result<LinkedGraph, LinkError> {
        let mut graph = LinkedGraph {
            unit_names: self.units.keys().cloned().collect(),
            ..LinkedGraph::default()
        };

        // Definitions: every tagged child registers its canonical symbol.
        for (u, unit) in self.units.values().enumerate() {
            let u = u as u32;
            for (id, decl) in unit.decls() {
                let parent = NodeRef::new(u, id);
                if let Some(receiver) = decl.this_receiver {
                    graph
                        .receivers
                        .insert(parent, NodeRef::new(u, receiver.decl()));
                }
                for child in decl.children() {
                    if let Some(symbol) = child.symbol() {
                        let symbol = self.canonical(symbol);
                        graph
                            .by_symbol
                            .entry(symbol)
                            .or_insert(NodeRef::new(u, child.decl()));
                    }
                }
            }
        }

        // References: classifier symbols on supertype shapes must all have a
        // defining node.
        for (u, (name, unit)) in self.units.iter().enumerate() {
            for (id, decl) in unit.decls() {
                if decl.supertypes.is_empty() {
                    continue;
                }
                let mut targets = Vec::with_capacity(decl.supertypes.len());
                for &ty in &decl.supertypes {
                    let shape = unit.types.get(ty.as_u32()).map_err(|_| {
                        CodecError::IndexOutOfRange {
                            unit: name.clone(),
                            field: "super_type",
                            index: ty.as_u32(),
                            len: unit.types.len(),
                        }
                    })?;
                    match shape.classifier_symbol {
                        None => targets.push(None),
                        Some(symbol) => {
                            let symbol = self.canonical(symbol);
                            let target = graph.by_symbol.get(&symbol).copied().ok_or(
                                LinkError::UnresolvedSymbol {
                                    symbol,
                                    unit: name.clone(),
                                },
                            )?;
                            targets.push(Some(target));
                        }
                    }
                }
                graph
                    .supertype_targets
                    .insert(NodeRef::new(u as u32, id), targets);
            }
        }

        Ok(graph)
    }
}

/// Extract one unit's symbol assignments, keyed by entity identity.
fn unit_symbols(unit: &UnlinkedUnit) -> Result<SymbolTable, LinkError> {
    let mut table = SymbolTable::new(unit.seq);
    for &root in &unit.roots {
        let decl = unit.decl(root);
        let path = EntityPath::root(unit.name_of(decl)?, decl.kind());
        collect_symbols(unit, decl, &path, &mut table)?;
    }
    Ok(table)
}

fn collect_symbols(
    unit: &UnlinkedUnit,
    decl: &UnlinkedDecl,
    path: &EntityPath,
    table: &mut SymbolTable,
) -> Result<(), LinkError> {
    if let Some(receiver) = decl.this_receiver {
        let child = unit.decl(receiver.decl());
        let child_path = path.receiver();
        if let Some(symbol) = receiver.symbol() {
            table.restore(
                child_path.clone(),
                Assignment {
                    symbol,
                    origin: unit.seq,
                },
            )?;
        }
        collect_symbols(unit, child, &child_path, table)?;
    }
    for child_ref in decl.type_parameters.iter().chain(decl.members.iter()) {
        let child = unit.decl(child_ref.decl());
        let child_path = path.child(unit.name_of(child)?, child.kind());
        if let Some(symbol) = child_ref.symbol() {
            table.restore(
                child_path.clone(),
                Assignment {
                    symbol,
                    origin: unit.seq,
                },
            )?;
        }
        collect_symbols(unit, child, &child_path, table)?;
    }
    Ok(())
}
