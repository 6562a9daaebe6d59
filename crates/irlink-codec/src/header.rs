//! Unit file header (32 bytes).
//!
//! Layout:
//! - 0-3: magic `IRLK`
//! - 4-7: format version
//! - 8-11: CRC32 checksum of everything after the header
//! - 12-15: total file size in bytes
//! - 16-31: reserved

use crate::error::CodecError;

/// Magic bytes: b"IRLK"
pub const MAGIC: [u8; 4] = *b"IRLK";

/// Format version (currently 1)
pub const VERSION: u32 = 1;

/// Header size in bytes.
pub const HEADER_SIZE: usize = 32;

/// Unit file header — first 32 bytes of a serialized unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub magic: [u8; 4],
    pub version: u32,
    /// CRC32 checksum of the payload (everything after the header).
    pub checksum: u32,
    /// Total file size in bytes, header included.
    pub total_size: u32,
    pub _reserved: [u8; 16],
}

impl Default for Header {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            checksum: 0,
            total_size: 0,
            _reserved: [0; 16],
        }
    }
}

impl Header {
    /// Decode header from 32 bytes.
    ///
    /// # Panics
    /// Panics if fewer than 32 bytes are given; callers check size first.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= HEADER_SIZE, "header too short");

        let mut reserved = [0u8; 16];
        reserved.copy_from_slice(&bytes[16..32]);

        Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            version: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            checksum: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            total_size: u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
            _reserved: reserved,
        }
    }

    /// Encode header to 32 bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.checksum.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.total_size.to_le_bytes());
        bytes[16..32].copy_from_slice(&self._reserved);
        bytes
    }

    /// Validate magic, version, declared size, and payload checksum.
    pub fn validate(&self, storage: &[u8]) -> Result<(), CodecError> {
        if self.magic != MAGIC {
            return Err(CodecError::InvalidMagic);
        }
        if self.version != VERSION {
            return Err(CodecError::UnsupportedVersion(self.version));
        }
        if self.total_size as usize != storage.len() {
            return Err(CodecError::SizeMismatch {
                header: self.total_size,
                actual: storage.len(),
            });
        }
        let actual = crc32fast::hash(&storage[HEADER_SIZE..]);
        if actual != self.checksum {
            return Err(CodecError::ChecksumMismatch {
                expected: self.checksum,
                actual,
            });
        }
        Ok(())
    }
}
