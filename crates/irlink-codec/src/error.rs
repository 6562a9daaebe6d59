//! Codec errors.

use crate::header::VERSION;
use crate::wire::WireError;

/// Unit decode/encode error.
///
/// Every variant is fatal for the affected unit only; sibling units decode
/// independently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("file too small: {0} bytes (minimum 32)")]
    FileTooSmall(usize),
    #[error("invalid magic: expected IRLK")]
    InvalidMagic,
    #[error("unsupported version: {0} (expected {VERSION})")]
    UnsupportedVersion(u32),
    #[error("size mismatch: header says {header} bytes, got {actual}")]
    SizeMismatch { header: u32, actual: usize },
    #[error("checksum mismatch: header says {expected:#010x}, payload hashes to {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// Structural violation inside one record: missing required field or
    /// symbol/structural cardinality mismatch.
    #[error("unit `{unit}`: malformed record: {detail}")]
    MalformedRecord { unit: String, detail: String },

    /// A record referenced a table index that was never interned.
    #[error("unit `{unit}`: {field} index {index} out of range (table has {len} entries)")]
    IndexOutOfRange {
        unit: String,
        field: &'static str,
        index: u32,
        len: usize,
    },

    #[error("unit `{unit}`: {source}")]
    Wire {
        unit: String,
        #[source]
        source: WireError,
    },
}

impl CodecError {
    pub(crate) fn malformed(unit: &str, detail: impl Into<String>) -> Self {
        Self::MalformedRecord {
            unit: unit.to_owned(),
            detail: detail.into(),
        }
    }

    pub(crate) fn wire(unit: &str, source: WireError) -> Self {
        Self::Wire {
            unit: unit.to_owned(),
            source,
        }
    }
}
