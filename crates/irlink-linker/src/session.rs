//! Build session: the symbol assignment state carried across builds.
//!
//! Persisted form is the same container discipline as a unit blob: 32-byte
//! header, then a tag-length-value payload. Payload fields: 1 allocation
//! cursor, 2 session sequence number, 3 assignment entry (repeated nested).
//! Entry fields: 1 path segment (repeated, root downward), 2 entity kind,
//! 3 symbol, 4 originating sequence number.

use irlink_codec::wire::{Reader, Writer};
use irlink_codec::{HEADER_SIZE, Header};
use irlink_core::{
    Assignment, DeclKind, EntityPath, MergeOutcome, Symbol, SymbolError, SymbolTable, UnitSeq,
};

use crate::error::LinkError;

mod field {
    pub const CURSOR: u32 = 1;
    pub const ORIGIN: u32 = 2;
    pub const ENTRY: u32 = 3;
}

mod entry_field {
    pub const SEGMENT: u32 = 1;
    pub const KIND: u32 = 2;
    pub const SYMBOL: u32 = 3;
    pub const ORIGIN: u32 = 4;
}

fn kind_to_wire(kind: DeclKind) -> u32 {
    match kind {
        DeclKind::Class => 0,
        DeclKind::TypeParameter => 1,
        DeclKind::ValueParameter => 2,
        DeclKind::Function => 3,
        DeclKind::Field => 4,
    }
}

fn kind_from_wire(value: u32) -> Result<DeclKind, LinkError> {
    match value {
        0 => Ok(DeclKind::Class),
        1 => Ok(DeclKind::TypeParameter),
        2 => Ok(DeclKind::ValueParameter),
        3 => Ok(DeclKind::Function),
        4 => Ok(DeclKind::Field),
        other => Err(LinkError::MalformedState(format!(
            "unknown entity kind {other}"
        ))),
    }
}

/// Symbol assignment state for one build, seedable from the previous one.
///
/// Owns the merged [`SymbolTable`]. Encoding workers that need shared
/// allocation take the table out with [`Session::into_table`], wrap it in a
/// `Mutex` or `RefCell`, and hand it back via [`Session::from_table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    table: SymbolTable,
}

impl Session {
    /// Fresh session for a build with the given sequence number.
    pub fn new(seq: UnitSeq) -> Self {
        Self {
            table: SymbolTable::new(seq),
        }
    }

    pub fn from_table(table: SymbolTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn into_table(self) -> SymbolTable {
        self.table
    }

    /// Merge one unit's symbol assignments into the session.
    pub fn merge(&mut self, other: &SymbolTable) -> Result<MergeOutcome, SymbolError> {
        self.table.merge(other)
    }

    /// Serialize the assignment state for the next build.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut payload = Writer::new();
        payload.field_u64(field::CURSOR, self.table.next_raw());
        payload.field_u32(field::ORIGIN, self.table.origin().as_u32());

        for (path, assignment) in self.table.iter() {
            let mut entry = Writer::new();
            for segment in path.segments() {
                entry.field_str(entry_field::SEGMENT, segment);
            }
            entry.field_u32(entry_field::KIND, kind_to_wire(path.kind()));
            entry.field_u64(entry_field::SYMBOL, assignment.symbol.as_u64());
            entry.field_u32(entry_field::ORIGIN, assignment.origin.as_u32());
            payload.field_bytes(field::ENTRY, &entry.into_bytes());
        }

        let payload = payload.into_bytes();
        let header = Header {
            checksum: crc32fast::hash(&payload),
            total_size: (HEADER_SIZE + payload.len()) as u32,
            ..Header::default()
        };
        let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&payload);
        out
    }

    /// Restore a session from persisted state.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LinkError> {
        if bytes.len() < HEADER_SIZE {
            return Err(LinkError::MalformedState(format!(
                "state file too small: {} bytes",
                bytes.len()
            )));
        }
        let header = Header::from_bytes(bytes);
        header.validate(bytes)?;

        let wire_err = |e: irlink_codec::wire::WireError| LinkError::MalformedState(e.to_string());

        let mut cursor = None;
        let mut origin = None;
        let mut entries: Vec<&[u8]> = Vec::new();

        let mut reader = Reader::new(&bytes[HEADER_SIZE..]);
        while let Some((num, value)) = reader.next_field().map_err(wire_err)? {
            match num {
                field::CURSOR => cursor = Some(value.as_u64(num).map_err(wire_err)?),
                field::ORIGIN => origin = Some(value.as_u32(num).map_err(wire_err)?),
                field::ENTRY => entries.push(value.as_bytes(num).map_err(wire_err)?),
                _ => {}
            }
        }

        let cursor = cursor
            .ok_or_else(|| LinkError::MalformedState("missing allocation cursor".into()))?;
        let origin = origin
            .ok_or_else(|| LinkError::MalformedState("missing sequence number".into()))?;

        let mut table = SymbolTable::new(UnitSeq::new(origin));
        for raw in entries {
            let (path, assignment) = decode_entry(raw)?;
            table.restore(path, assignment)?;
        }
        table.advance_cursor(cursor);

        Ok(Self { table })
    }
}

fn decode_entry(bytes: &[u8]) -> Result<(EntityPath, Assignment), LinkError> {
    let wire_err = |e: irlink_codec::wire::WireError| LinkError::MalformedState(e.to_string());

    let mut segments = Vec::new();
    let mut kind = None;
    let mut symbol = None;
    let mut origin = None;

    let mut reader = Reader::new(bytes);
    while let Some((num, value)) = reader.next_field().map_err(wire_err)? {
        match num {
            entry_field::SEGMENT => segments.push(value.as_str(num).map_err(wire_err)?.to_owned()),
            entry_field::KIND => kind = Some(kind_from_wire(value.as_u32(num).map_err(wire_err)?)?),
            entry_field::SYMBOL => {
                let raw = value.as_u64(num).map_err(wire_err)?;
                let sym = Symbol::from_raw(raw);
                if sym.is_reserved() {
                    return Err(LinkError::MalformedState("reserved symbol value 0".into()));
                }
                symbol = Some(sym);
            }
            entry_field::ORIGIN => {
                origin = Some(UnitSeq::new(value.as_u32(num).map_err(wire_err)?));
            }
            _ => {}
        }
    }

    if segments.is_empty() {
        return Err(LinkError::MalformedState("entry without path segments".into()));
    }
    let kind = kind.ok_or_else(|| LinkError::MalformedState("entry without kind".into()))?;
    let symbol = symbol.ok_or_else(|| LinkError::MalformedState("entry without symbol".into()))?;
    let origin = origin.ok_or_else(|| LinkError::MalformedState("entry without origin".into()))?;

    Ok((
        EntityPath::from_segments(segments, kind),
        Assignment { symbol, origin },
    ))
}
