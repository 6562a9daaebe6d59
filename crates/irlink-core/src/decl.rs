//! Declaration model: arena of nodes plus per-unit dedup tables.
//!
//! Containment (class → members → nested classes) is a tree of [`DeclId`]
//! handles into one [`DeclArena`], so there are no ownership cycles.
//! Non-owning edges (supertypes, receiver types) are [`TypeIdx`] indices into
//! the unit's type table, resolved to live nodes only by the linker.

use serde::{Deserialize, Serialize};

use crate::dedup::DedupTable;
use crate::ids::{DeclId, StringIdx, Symbol, TypeIdx, UnitSeq};

/// String dedup table for one unit.
pub type StringTable = DedupTable<String>;

/// Type-shape dedup table for one unit.
pub type TypeTable = DedupTable<TypeShape>;

/// How a declaration came to exist.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum DeclOrigin {
    /// Written in source.
    Defined,
    /// Generated override of an inherited member.
    FakeOverride,
    /// Generated delegation member.
    Delegated,
    /// Compiler-synthesized (receivers, default accessors).
    Synthetic,
}

/// Declaration kind.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum DeclKind {
    Class,
    TypeParameter,
    ValueParameter,
    Function,
    Field,
}

/// Half-open byte range in the originating source file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: u32,
    pub end: u32,
}

impl SourceSpan {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

/// Common declaration metadata, owned inline by every node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DeclBase {
    pub kind: DeclKind,
    pub origin: DeclOrigin,
    /// Modifier bits (visibility, modality, etc.). Opaque to this crate.
    pub flags: u32,
    pub span: SourceSpan,
}

impl DeclBase {
    pub fn new(kind: DeclKind) -> Self {
        Self {
            kind,
            origin: DeclOrigin::Defined,
            flags: 0,
            span: SourceSpan::default(),
        }
    }
}

/// Structural type descriptor, interned in the unit's type table.
///
/// `classifier` names the referenced classifier (fully qualified); when the
/// classifier lives in another unit, `classifier_symbol` carries the stable
/// reference the linker resolves. Arguments are indices of previously
/// interned shapes, so a shape's arguments always have smaller indices.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TypeShape {
    pub classifier: StringIdx,
    pub arguments: Vec<TypeIdx>,
    pub nullable: bool,
    pub classifier_symbol: Option<Symbol>,
}

impl TypeShape {
    pub fn simple(classifier: StringIdx) -> Self {
        Self {
            classifier,
            arguments: Vec::new(),
            nullable: false,
            classifier_symbol: None,
        }
    }

    pub fn with_symbol(classifier: StringIdx, symbol: Symbol) -> Self {
        Self {
            classifier,
            arguments: Vec::new(),
            nullable: false,
            classifier_symbol: Some(symbol),
        }
    }
}

/// One IR declaration.
///
/// Children are held by [`DeclId`] in declared order; the order of
/// `type_parameters` is the declared generic parameter order and is
/// semantically significant.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct DeclNode {
    pub base: DeclBase,
    pub name: StringIdx,
    /// Synthetic self-parameter, present only for classes with an instance
    /// receiver.
    pub this_receiver: Option<DeclId>,
    pub type_parameters: Vec<DeclId>,
    pub members: Vec<DeclId>,
    /// Type-table indices. Duplicates are permitted: distinct instantiations
    /// intern to distinct shapes, identical shapes share one index.
    pub supertypes: Vec<TypeIdx>,
}

impl DeclNode {
    pub fn new(kind: DeclKind, name: StringIdx) -> Self {
        Self {
            base: DeclBase::new(kind),
            name,
            this_receiver: None,
            type_parameters: Vec::new(),
            members: Vec::new(),
            supertypes: Vec::new(),
        }
    }

    #[inline]
    pub fn kind(&self) -> DeclKind {
        self.base.kind
    }
}

/// Arena of declaration nodes for one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclArena {
    nodes: Vec<DeclNode>,
}

impl DeclArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node, returning its handle.
    pub fn alloc(&mut self, node: DeclNode) -> DeclId {
        let id = DeclId::from_raw(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Resolve a handle.
    ///
    /// # Panics
    /// Panics if the handle was not created by this arena.
    #[inline]
    pub fn get(&self, id: DeclId) -> &DeclNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: DeclId) -> &mut DeclNode {
        &mut self.nodes[id.index()]
    }

    /// Try to resolve a handle, returning None if invalid.
    #[inline]
    pub fn try_get(&self, id: DeclId) -> Option<&DeclNode> {
        self.nodes.get(id.index())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes with their handles.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &DeclNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (DeclId::from_raw(i as u32), n))
    }
}

/// One compilation unit as produced by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Unit identifier (typically the source file path).
    pub name: String,
    pub seq: UnitSeq,
    pub strings: StringTable,
    pub types: TypeTable,
    pub arena: DeclArena,
    /// Top-level declarations in declared order.
    pub roots: Vec<DeclId>,
}

impl Unit {
    pub fn new(name: impl Into<String>, seq: UnitSeq) -> Self {
        Self {
            name: name.into(),
            seq,
            strings: StringTable::new(),
            types: TypeTable::new(),
            arena: DeclArena::new(),
            roots: Vec::new(),
        }
    }

    /// Intern a string, returning its index.
    pub fn intern_str(&mut self, s: &str) -> StringIdx {
        StringIdx::from_raw(self.strings.intern(s.to_owned()))
    }

    /// Intern a type shape, returning its index.
    pub fn intern_type(&mut self, shape: TypeShape) -> TypeIdx {
        TypeIdx::from_raw(self.types.intern(shape))
    }
}
