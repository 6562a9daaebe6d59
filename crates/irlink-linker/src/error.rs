//! Linker errors.

use irlink_codec::CodecError;
use irlink_core::{Symbol, SymbolError};

/// Link-phase error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// A unit references a symbol no unit defines. The whole link fails;
    /// the caller falls back to a full re-encode.
    #[error("unit `{unit}`: unresolved symbol {symbol}")]
    UnresolvedSymbol { symbol: Symbol, unit: String },

    #[error("duplicate unit `{0}`")]
    DuplicateUnit(String),

    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Persisted session state did not parse.
    #[error("malformed session state: {0}")]
    MalformedState(String),
}
