#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Binary unit format and declaration record codec.
//!
//! A serialized unit is a 32-byte header (magic, version, CRC32, size)
//! followed by a tag-length-value payload: unit name, sequence number, the
//! string and type dedup tables, and the root declaration records. Records
//! reference table entries by unit-local index; in incremental mode they
//! additionally carry stable symbols for cross-unit addressing.
//!
//! Decoding is a pure function of one unit's bytes: symbols are preserved as
//! raw values and resolved only by the linker.

pub mod dump;
mod error;
mod header;
mod record;
mod unit;
pub mod wire;

#[cfg(test)]
mod record_tests;

pub use error::CodecError;
pub use header::{HEADER_SIZE, Header, MAGIC, VERSION};
pub use record::{ChildRef, UnlinkedDecl};
pub use unit::{UnlinkedUnit, decode_unit, encode_unit};
