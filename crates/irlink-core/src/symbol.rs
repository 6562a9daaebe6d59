//! Stable symbol allocation and symbol-space merging.
//!
//! A [`SymbolTable`] maps a logical entity — identified by its
//! [`EntityPath`], never by structural content — to a [`Symbol`]. Allocation
//! is monotone and append-only: once a symbol is handed out for a path it is
//! never reassigned, and merging tables from independently compiled units
//! never reuses a value.

use std::collections::HashMap;
use std::sync::Mutex;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ids::{Symbol, UnitSeq};

/// Stable identity of one logical declaration.
///
/// Built from the fully-qualified segment path (unit root downward) plus a
/// disambiguating leaf kind. A synthetic receiver uses the `<this>` segment.
/// The path is derived from where the entity sits in source, so renames and
/// moves produce a new identity while unchanged entities keep theirs across
/// builds.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct EntityPath {
    segments: Vec<String>,
    kind: crate::decl::DeclKind,
}

impl EntityPath {
    pub fn root(segment: impl Into<String>, kind: crate::decl::DeclKind) -> Self {
        Self {
            segments: vec![segment.into()],
            kind,
        }
    }

    pub fn from_segments(segments: Vec<String>, kind: crate::decl::DeclKind) -> Self {
        Self { segments, kind }
    }

    /// Extend the path with a child segment.
    pub fn child(&self, segment: impl Into<String>, kind: crate::decl::DeclKind) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments, kind }
    }

    /// Child path for a synthetic receiver.
    pub fn receiver(&self) -> Self {
        self.child("<this>", crate::decl::DeclKind::ValueParameter)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn kind(&self) -> crate::decl::DeclKind {
        self.kind
    }
}

impl std::fmt::Display for EntityPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Symbol-table errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    /// Two units assigned different symbols to the same entity and the
    /// tie-break is ambiguous (equal originating sequence numbers).
    #[error("symbol collision on `{path}`: {first} and {second} both claim it")]
    SymbolCollision {
        path: String,
        first: Symbol,
        second: Symbol,
    },
    /// One symbol value was assigned to two different entities. This never
    /// happens for tables sharing a session; it indicates corrupt persisted
    /// state.
    #[error("symbol {symbol} assigned to both `{first}` and `{second}`")]
    ValueReused {
        symbol: Symbol,
        first: String,
        second: String,
    },
}

/// One symbol assignment: the value plus the build that allocated it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Assignment {
    pub symbol: Symbol,
    pub origin: UnitSeq,
}

/// Result of merging one table into another.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Losing symbol → winning symbol, for every reconciled collision.
    /// A reference through a losing symbol must be chased to the winner.
    pub aliases: HashMap<Symbol, Symbol>,
}

impl MergeOutcome {
    /// Resolve a symbol through the alias map.
    pub fn canonical(&self, symbol: Symbol) -> Symbol {
        self.aliases.get(&symbol).copied().unwrap_or(symbol)
    }
}

/// Append-only mapping from entity identity to stable symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    by_path: IndexMap<EntityPath, Assignment>,
    /// Reverse index for value-uniqueness checks during merge.
    by_symbol: HashMap<Symbol, EntityPath>,
    /// Next raw value to allocate. Zero is reserved.
    next: u64,
    /// Sequence number stamped on fresh allocations.
    origin: UnitSeq,
}

impl SymbolTable {
    pub fn new(origin: UnitSeq) -> Self {
        Self {
            by_path: IndexMap::new(),
            by_symbol: HashMap::new(),
            next: 1,
            origin,
        }
    }

    /// Symbol for a logical entity: the previously assigned one if this
    /// identity was seen before in the session, else a fresh value.
    pub fn symbol_for(&mut self, path: &EntityPath) -> Symbol {
        if let Some(assignment) = self.by_path.get(path) {
            return assignment.symbol;
        }
        let symbol = Symbol::from_raw(self.next);
        self.next += 1;
        self.by_path.insert(
            path.clone(),
            Assignment {
                symbol,
                origin: self.origin,
            },
        );
        self.by_symbol.insert(symbol, path.clone());
        symbol
    }

    /// Previously assigned symbol, if any. Never allocates.
    pub fn lookup(&self, path: &EntityPath) -> Option<Symbol> {
        self.by_path.get(path).map(|a| a.symbol)
    }

    /// Identity that owns a symbol, if assigned in this table.
    pub fn path_of(&self, symbol: Symbol) -> Option<&EntityPath> {
        self.by_symbol.get(&symbol)
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Iterate over assignments in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&EntityPath, Assignment)> {
        self.by_path.iter().map(|(p, a)| (p, *a))
    }

    /// Raw allocation cursor, for persistence.
    pub fn next_raw(&self) -> u64 {
        self.next
    }

    /// Sequence number stamped on fresh allocations.
    pub fn origin(&self) -> UnitSeq {
        self.origin
    }

    /// Raise the allocation cursor to at least `next`, for state restored
    /// from persistence.
    pub fn advance_cursor(&mut self, next: u64) {
        self.next = self.next.max(next);
    }

    /// Restore an assignment from persisted state or a sibling table.
    ///
    /// Fails if the path or the value is already bound differently.
    pub fn restore(&mut self, path: EntityPath, assignment: Assignment) -> Result<(), SymbolError> {
        if let Some(existing) = self.by_path.get(&path) {
            if existing.symbol != assignment.symbol {
                return Err(SymbolError::SymbolCollision {
                    path: path.to_string(),
                    first: existing.symbol,
                    second: assignment.symbol,
                });
            }
            return Ok(());
        }
        if let Some(owner) = self.by_symbol.get(&assignment.symbol) {
            return Err(SymbolError::ValueReused {
                symbol: assignment.symbol,
                first: owner.to_string(),
                second: path.to_string(),
            });
        }
        self.next = self.next.max(assignment.symbol.as_u64() + 1);
        self.by_symbol.insert(assignment.symbol, path.clone());
        self.by_path.insert(path, assignment);
        Ok(())
    }

    /// Merge another table's symbol space into this one.
    ///
    /// Collisions (same path, different symbols) are reconciled: the
    /// assignment with the lower originating sequence number keeps ownership
    /// and the other value becomes an alias of it. Equal sequence numbers
    /// cannot be reconciled and fail with [`SymbolError::SymbolCollision`].
    /// Merging never reassigns an existing symbol.
    pub fn merge(&mut self, other: &SymbolTable) -> Result<MergeOutcome, SymbolError> {
        let mut outcome = MergeOutcome::default();

        for (path, theirs) in other.iter() {
            match self.by_path.get(path).copied() {
                None => {
                    if let Some(owner) = self.by_symbol.get(&theirs.symbol) {
                        return Err(SymbolError::ValueReused {
                            symbol: theirs.symbol,
                            first: owner.to_string(),
                            second: path.to_string(),
                        });
                    }
                    self.by_symbol.insert(theirs.symbol, path.clone());
                    self.by_path.insert(path.clone(), theirs);
                }
                Some(ours) if ours.symbol == theirs.symbol => {
                    let merged = Assignment {
                        symbol: ours.symbol,
                        origin: ours.origin.min(theirs.origin),
                    };
                    self.by_path.insert(path.clone(), merged);
                }
                Some(ours) => {
                    if ours.origin == theirs.origin {
                        return Err(SymbolError::SymbolCollision {
                            path: path.to_string(),
                            first: ours.symbol,
                            second: theirs.symbol,
                        });
                    }
                    if theirs.origin < ours.origin {
                        // Their assignment is older: it wins, ours aliases.
                        outcome.aliases.insert(ours.symbol, theirs.symbol);
                        self.by_path.insert(path.clone(), theirs);
                        self.by_symbol.insert(theirs.symbol, path.clone());
                    } else {
                        outcome.aliases.insert(theirs.symbol, ours.symbol);
                    }
                }
            }
        }

        self.next = self.next.max(other.next);
        Ok(outcome)
    }
}

/// Shared symbol allocation for encoders.
///
/// Single-unit encoding is sequential, but independent units may encode on
/// worker threads sharing one session table. The trait lets the encoder take
/// `&impl SymbolAllocator` and leave the locking discipline to the caller.
pub trait SymbolAllocator {
    fn symbol_for(&self, path: &EntityPath) -> Symbol;
}

impl SymbolAllocator for std::cell::RefCell<SymbolTable> {
    fn symbol_for(&self, path: &EntityPath) -> Symbol {
        self.borrow_mut().symbol_for(path)
    }
}

impl SymbolAllocator for Mutex<SymbolTable> {
    fn symbol_for(&self, path: &EntityPath) -> Symbol {
        self.lock().expect("symbol table mutex poisoned").symbol_for(path)
    }
}
