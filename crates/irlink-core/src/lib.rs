#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for irlink.
//!
//! Three layers:
//! - **Ids**: cheap typed handles (`StringIdx`, `TypeIdx`, `DeclId`, `Symbol`)
//! - **Unit model**: per-unit dedup tables and the declaration arena
//! - **Symbol table**: stable cross-unit identity, merging, allocation
//!
//! A unit's tables and arena are unit-local: indices from one unit are
//! meaningless in another. The only thing that crosses unit boundaries is a
//! [`Symbol`].

mod dedup;
mod decl;
mod ids;
mod symbol;

#[cfg(test)]
mod decl_tests;
#[cfg(test)]
mod symbol_tests;

pub use decl::{
    DeclArena, DeclBase, DeclKind, DeclNode, DeclOrigin, SourceSpan, StringTable, TypeShape,
    TypeTable, Unit,
};
pub use dedup::{DedupTable, TableError};
pub use ids::{DeclId, StringIdx, Symbol, TypeIdx, UnitSeq};
pub use symbol::{
    Assignment, EntityPath, MergeOutcome, SymbolAllocator, SymbolError, SymbolTable,
};
