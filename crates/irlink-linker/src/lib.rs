#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Declaration graph linking.
//!
//! Decoded units are self-contained: their records address each other by
//! unit-local handles and carry raw stable symbols for everything that can be
//! referenced across units. The [`Linker`] merges every unit's symbol
//! assignments into one [`Session`], reconciles collisions, and resolves all
//! cross-unit references into a [`LinkedGraph`]. Linking is atomic: either a
//! whole graph is produced or an error is returned and no partial state is
//! observable.
//!
//! A [`Session`] outlives a single link: persisted between builds, it keeps
//! symbol assignments stable so unchanged units re-encode to identical bytes.

mod error;
mod graph;
mod linker;
mod session;

#[cfg(test)]
mod session_tests;

pub use error::LinkError;
pub use graph::{LinkedGraph, NodeRef};
pub use linker::Linker;
pub use session::Session;
