//! Typed id newtypes.
//!
//! Unit-local handles (`StringIdx`, `TypeIdx`, `DeclId`) are plain table or
//! arena positions and must never be compared across units. [`Symbol`] is the
//! one identifier that is stable across units and across builds.

use serde::{Deserialize, Serialize};

/// Index into a unit's string table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct StringIdx(u32);

impl StringIdx {
    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index into a unit's type table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TypeIdx(u32);

impl TypeIdx {
    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arena handle for a declaration node, unit-local.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DeclId(u32);

impl DeclId {
    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A stable 64-bit identifier for one logical declaration.
///
/// Allocated once per logical entity in a linking session and never reused.
/// Two occurrences of the same `Symbol` refer to the same entity, even when
/// the occurrences live in units compiled at different times.
///
/// The zero value is reserved and never allocated.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Symbol(u64);

impl Symbol {
    /// Create a Symbol from a raw value. Use only for deserialization.
    #[inline]
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Whether this is the reserved zero value.
    #[inline]
    pub fn is_reserved(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Build sequence number of a unit.
///
/// Lower numbers are older. Used as the tie-break when two units claim the
/// same logical entity: the lower sequence number keeps symbol ownership.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct UnitSeq(u32);

impl UnitSeq {
    #[inline]
    pub fn new(seq: u32) -> Self {
        Self(seq)
    }

    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}
