//! Unit container: header + payload assembly and parsing.
//!
//! Payload fields: 1 unit name, 2 sequence number, 3 string table entry
//! (repeated, index order), 4 type shape (repeated nested, index order),
//! 5 root declaration record (repeated nested, declared order).
//!
//! Encoding a unit twice with the same inputs yields identical bytes: table
//! entries are written in index order and records walk the tree depth-first
//! in declared order.

use irlink_core::{
    DeclId, DeclNode, EntityPath, StringTable, SymbolAllocator, TypeTable, Unit, UnitSeq,
};

use crate::error::CodecError;
use crate::header::{HEADER_SIZE, Header};
use crate::record::{UnlinkedDecl, decode_decl, decode_shape, encode_decl, encode_shape};
use crate::wire::{Reader, Writer};

mod unit_field {
    pub const NAME: u32 = 1;
    pub const SEQ: u32 = 2;
    pub const STRING: u32 = 3;
    pub const TYPE: u32 = 4;
    pub const ROOT: u32 = 5;
}

/// One decoded unit: tables plus unlinked declaration records.
///
/// Pure product of one unit's bytes; no cross-unit state. Symbols inside are
/// raw values awaiting the linker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlinkedUnit {
    pub name: String,
    pub seq: UnitSeq,
    pub strings: StringTable,
    pub types: TypeTable,
    decls: Vec<UnlinkedDecl>,
    pub roots: Vec<DeclId>,
}

impl UnlinkedUnit {
    /// Resolve a decl handle.
    ///
    /// # Panics
    /// Panics if the handle was not produced by this unit's decode.
    #[inline]
    pub fn decl(&self, id: DeclId) -> &UnlinkedDecl {
        &self.decls[id.index()]
    }

    #[inline]
    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    /// Iterate over all decoded declarations with their handles.
    pub fn decls(&self) -> impl Iterator<Item = (DeclId, &UnlinkedDecl)> {
        self.decls
            .iter()
            .enumerate()
            .map(|(i, d)| (DeclId::from_raw(i as u32), d))
    }

    /// Resolve a declaration's name string.
    pub fn name_of(&self, decl: &UnlinkedDecl) -> Result<&str, CodecError> {
        self.strings
            .get(decl.name.as_u32())
            .map(String::as_str)
            .map_err(|_| CodecError::IndexOutOfRange {
                unit: self.name.clone(),
                field: "name",
                index: decl.name.as_u32(),
                len: self.strings.len(),
            })
    }

    /// Collapse to the structural [`Unit`], dropping the symbol layer.
    ///
    /// Handle values are preserved, so the result compares equal to the unit
    /// that was encoded (for units encoded without symbols, exactly equal).
    pub fn to_unit(&self) -> Unit {
        let mut unit = Unit::new(self.name.clone(), self.seq);
        unit.strings = self.strings.clone();
        unit.types = self.types.clone();
        for decl in &self.decls {
            let node: DeclNode = decl.to_node();
            unit.arena.alloc(node);
        }
        unit.roots = self.roots.clone();
        unit
    }
}

/// Encode a unit to its persisted byte form.
///
/// With `alloc` present, incremental mode is active: every receiver, type
/// parameter, and member gets a stable symbol from the shared session,
/// queried by entity identity in traversal order.
pub fn encode_unit(
    unit: &Unit,
    alloc: Option<&dyn SymbolAllocator>,
) -> Result<Vec<u8>, CodecError> {
    let mut payload = Writer::new();
    payload.field_str(unit_field::NAME, &unit.name);
    payload.field_u32(unit_field::SEQ, unit.seq.as_u32());

    for (_, s) in unit.strings.iter() {
        payload.field_str(unit_field::STRING, s);
    }
    for (_, shape) in unit.types.iter() {
        payload.field_bytes(unit_field::TYPE, &encode_shape(shape));
    }

    for &root in &unit.roots {
        let node = unit.arena.try_get(root).ok_or_else(|| {
            CodecError::malformed(&unit.name, format!("dangling root handle {}", root.as_u32()))
        })?;
        let root_name = unit
            .strings
            .get(node.name.as_u32())
            .map_err(|_| CodecError::IndexOutOfRange {
                unit: unit.name.clone(),
                field: "name",
                index: node.name.as_u32(),
                len: unit.strings.len(),
            })?;
        let path = EntityPath::root(root_name.as_str(), node.kind());
        let bytes = encode_decl(unit, root, &path, alloc)?;
        payload.field_bytes(unit_field::ROOT, &bytes);
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
    Ok(out)
}

/// Decode a unit from its persisted byte form.
///
/// Pure and total over one unit's bytes: no symbol resolution, no cross-unit
/// lookups. Fails on structural violations, never silently drops data.
pub fn decode_unit(bytes: &[u8]) -> Result<UnlinkedUnit, CodecError> {
    if bytes.len() < HEADER_SIZE {
        return Err(CodecError::FileTooSmall(bytes.len()));
    }
    let header = Header::from_bytes(bytes);
    header.validate(bytes)?;

    // First pass: pull the unit name so later errors can carry it, and
    // collect raw sections in payload order.
    let payload = &bytes[HEADER_SIZE..];
    let mut name = None;
    let mut seq = None;
    let mut strings_raw: Vec<&str> = Vec::new();
    let mut shapes_raw: Vec<&[u8]> = Vec::new();
    let mut roots_raw: Vec<&[u8]> = Vec::new();

    let mut reader = Reader::new(payload);
    while let Some((num, value)) = reader
        .next_field()
        .map_err(|e| CodecError::wire("<unknown>", e))?
    {
        match num {
            unit_field::NAME => {
                name = Some(
                    value
                        .as_str(num)
                        .map_err(|e| CodecError::wire("<unknown>", e))?
                        .to_owned(),
                );
            }
            unit_field::SEQ => {
                seq = Some(
                    value
                        .as_u32(num)
                        .map_err(|e| CodecError::wire("<unknown>", e))?,
                );
            }
            unit_field::STRING => {
                strings_raw.push(
                    value
                        .as_str(num)
                        .map_err(|e| CodecError::wire("<unknown>", e))?,
                );
            }
            unit_field::TYPE => {
                shapes_raw.push(
                    value
                        .as_bytes(num)
                        .map_err(|e| CodecError::wire("<unknown>", e))?,
                );
            }
            unit_field::ROOT => {
                roots_raw.push(
                    value
                        .as_bytes(num)
                        .map_err(|e| CodecError::wire("<unknown>", e))?,
                );
            }
            _ => {}
        }
    }

    let name =
        name.ok_or_else(|| CodecError::malformed("<unknown>", "missing required field `name`"))?;
    let seq = UnitSeq::new(
        seq.ok_or_else(|| CodecError::malformed(&name, "missing required field `seq`"))?,
    );

    // Rebuild the string table. The encoder wrote deduplicated entries in
    // index order, so interning in order reproduces the same indices; a
    // duplicate means the bytes were not produced by this encoder.
    let mut strings = StringTable::new();
    for (expected, s) in strings_raw.iter().enumerate() {
        let got = strings.intern((*s).to_owned());
        if got as usize != expected {
            return Err(CodecError::malformed(
                &name,
                format!("duplicate string table entry `{s}`"),
            ));
        }
    }

    let mut types = TypeTable::new();
    for (expected, raw) in shapes_raw.iter().enumerate() {
        let shape = decode_shape(&name, raw, strings.len(), expected)?;
        let got = types.intern(shape);
        if got as usize != expected {
            return Err(CodecError::malformed(
                &name,
                "duplicate type table entry".to_owned(),
            ));
        }
    }

    let mut decls = Vec::new();
    let mut roots = Vec::new();
    for raw in roots_raw {
        roots.push(decode_decl(
            &name,
            raw,
            strings.len(),
            types.len(),
            &mut decls,
        )?);
    }

    Ok(UnlinkedUnit {
        name,
        seq,
        strings,
        types,
        decls,
        roots,
    })
}
