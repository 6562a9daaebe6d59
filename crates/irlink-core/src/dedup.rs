//! Generic append-only dedup table.
//!
//! Maps a value to a small sequential index, deduplicating equal values
//! within one unit. Indices are 0-based, assigned in first-encounter order,
//! with no gaps. The same value interned in two different units may receive
//! different indices — callers must never compare indices across units.

use std::hash::Hash;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Dedup table lookup error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("index {index} out of range (table has {len} entries)")]
    IndexOutOfRange { index: u32, len: usize },
}

/// Append-only table assigning sequential indices to distinct values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DedupTable<V: Hash + Eq> {
    entries: IndexSet<V>,
}

impl<V: Hash + Eq> DedupTable<V> {
    pub fn new() -> Self {
        Self {
            entries: IndexSet::new(),
        }
    }

    /// Intern a value, returning its index.
    /// If an equal value was already interned, returns the existing index.
    pub fn intern(&mut self, value: V) -> u32 {
        let (index, _) = self.entries.insert_full(value);
        index as u32
    }

    /// Look up a value by index.
    pub fn get(&self, index: u32) -> Result<&V, TableError> {
        self.entries
            .get_index(index as usize)
            .ok_or(TableError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    /// Index of a value if it was interned in this table.
    pub fn index_of(&self, value: &V) -> Option<u32> {
        self.entries.get_index_of(value).map(|i| i as u32)
    }

    /// Number of interned values.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all values in index order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (u32, &V)> {
        self.entries.iter().enumerate().map(|(i, v)| (i as u32, v))
    }
}
