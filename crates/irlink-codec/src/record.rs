//! Declaration record codec.
//!
//! Field numbers are part of the format and never reused:
//!
//! Declaration record:
//! 1 base (nested), 2 name, 3 this_receiver (nested), 4 type_parameter
//! (repeated nested), 5 member (repeated nested), 6 super_type (packed),
//! 7 this_receiver_symbol, 8 type_parameter_symbol (repeated),
//! 9 member_symbol (repeated).
//!
//! Base record: 1 origin, 2 flags, 3 span_start, 4 span_end, 5 kind.
//! Type shape record: 1 classifier, 2 argument (packed), 3 nullable,
//! 4 classifier_symbol.
//!
//! Symbol fields are written only in incremental mode, queried in the same
//! depth-first traversal order as the structural fields, so symbol index i
//! always corresponds to structural index i.

use irlink_core::{
    DeclBase, DeclId, DeclKind, DeclNode, DeclOrigin, EntityPath, SourceSpan, StringIdx, Symbol,
    SymbolAllocator, TypeIdx, TypeShape, Unit,
};

use crate::error::CodecError;
use crate::wire::{Reader, Writer, read_packed_u32};

mod field {
    pub const BASE: u32 = 1;
    pub const NAME: u32 = 2;
    pub const THIS_RECEIVER: u32 = 3;
    pub const TYPE_PARAMETER: u32 = 4;
    pub const MEMBER: u32 = 5;
    pub const SUPER_TYPE: u32 = 6;
    pub const THIS_RECEIVER_SYMBOL: u32 = 7;
    pub const TYPE_PARAMETER_SYMBOL: u32 = 8;
    pub const MEMBER_SYMBOL: u32 = 9;
}

mod base_field {
    pub const ORIGIN: u32 = 1;
    pub const FLAGS: u32 = 2;
    pub const SPAN_START: u32 = 3;
    pub const SPAN_END: u32 = 4;
    pub const KIND: u32 = 5;
}

mod shape_field {
    pub const CLASSIFIER: u32 = 1;
    pub const ARGUMENT: u32 = 2;
    pub const NULLABLE: u32 = 3;
    pub const CLASSIFIER_SYMBOL: u32 = 4;
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

fn kind_from_wire(unit: &str, value: u32) -> Result<DeclKind, CodecError> {
    match value {
        0 => Ok(DeclKind::Class),
        1 => Ok(DeclKind::TypeParameter),
        2 => Ok(DeclKind::ValueParameter),
        3 => Ok(DeclKind::Function),
        4 => Ok(DeclKind::Field),
        other => Err(CodecError::malformed(
            unit,
            format!("unknown declaration kind {other}"),
        )),
    }
}

fn origin_to_wire(origin: DeclOrigin) -> u32 {
    match origin {
        DeclOrigin::Defined => 0,
        DeclOrigin::FakeOverride => 1,
        DeclOrigin::Delegated => 2,
        DeclOrigin::Synthetic => 3,
    }
}

fn origin_from_wire(unit: &str, value: u32) -> Result<DeclOrigin, CodecError> {
    match value {
        0 => Ok(DeclOrigin::Defined),
        1 => Ok(DeclOrigin::FakeOverride),
        2 => Ok(DeclOrigin::Delegated),
        3 => Ok(DeclOrigin::Synthetic),
        other => Err(CodecError::malformed(
            unit,
            format!("unknown declaration origin {other}"),
        )),
    }
}

/// Reference to a structural child, with the optional stable symbol layer.
///
/// Within one unit a symbol is always an additional addressing layer over an
/// inline child, never a replacement; this variant makes "both present" a
/// structural fact instead of a checked invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildRef {
    Local(DeclId),
    Tagged { decl: DeclId, symbol: Symbol },
}

impl ChildRef {
    #[inline]
    pub fn decl(self) -> DeclId {
        match self {
            ChildRef::Local(decl) => decl,
            ChildRef::Tagged { decl, .. } => decl,
        }
    }

    #[inline]
    pub fn symbol(self) -> Option<Symbol> {
        match self {
            ChildRef::Local(_) => None,
            ChildRef::Tagged { symbol, .. } => Some(symbol),
        }
    }
}

/// One decoded declaration, symbols unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlinkedDecl {
    pub base: DeclBase,
    pub name: StringIdx,
    pub this_receiver: Option<ChildRef>,
    pub type_parameters: Vec<ChildRef>,
    pub members: Vec<ChildRef>,
    pub supertypes: Vec<TypeIdx>,
}

impl UnlinkedDecl {
    #[inline]
    pub fn kind(&self) -> DeclKind {
        self.base.kind
    }

    /// Collapse to the structural node, dropping the symbol layer.
    pub fn to_node(&self) -> DeclNode {
        DeclNode {
            base: self.base,
            name: self.name,
            this_receiver: self.this_receiver.map(ChildRef::decl),
            type_parameters: self.type_parameters.iter().map(|c| c.decl()).collect(),
            members: self.members.iter().map(|c| c.decl()).collect(),
            supertypes: self.supertypes.clone(),
        }
    }

    /// Child references in traversal order: receiver, type parameters,
    /// members.
    pub fn children(&self) -> impl Iterator<Item = ChildRef> + '_ {
        self.this_receiver
            .into_iter()
            .chain(self.type_parameters.iter().copied())
            .chain(self.members.iter().copied())
    }
}

fn encode_base(base: &DeclBase) -> Vec<u8> {
    let mut w = Writer::new();
    w.field_u32(base_field::ORIGIN, origin_to_wire(base.origin));
    w.field_u32(base_field::FLAGS, base.flags);
    w.field_u32(base_field::SPAN_START, base.span.start);
    w.field_u32(base_field::SPAN_END, base.span.end);
    w.field_u32(base_field::KIND, kind_to_wire(base.kind));
    w.into_bytes()
}

fn decode_base(unit: &str, bytes: &[u8]) -> Result<DeclBase, CodecError> {
    let mut reader = Reader::new(bytes);
    let mut base = DeclBase::new(DeclKind::Class);
    while let Some((num, value)) = reader.next_field().map_err(|e| CodecError::wire(unit, e))? {
        let scalar = || value.as_u32(num).map_err(|e| CodecError::wire(unit, e));
        match num {
            base_field::ORIGIN => base.origin = origin_from_wire(unit, scalar()?)?,
            base_field::FLAGS => base.flags = scalar()?,
            base_field::SPAN_START => base.span.start = scalar()?,
            base_field::SPAN_END => base.span.end = scalar()?,
            base_field::KIND => base.kind = kind_from_wire(unit, scalar()?)?,
            _ => {}
        }
    }
    Ok(base)
}

pub(crate) fn encode_shape(shape: &TypeShape) -> Vec<u8> {
    let mut w = Writer::new();
    w.field_u32(shape_field::CLASSIFIER, shape.classifier.as_u32());
    if !shape.arguments.is_empty() {
        let args: Vec<u32> = shape.arguments.iter().map(|a| a.as_u32()).collect();
        w.field_packed_u32(shape_field::ARGUMENT, &args);
    }
    if shape.nullable {
        w.field_bool(shape_field::NULLABLE, true);
    }
    if let Some(symbol) = shape.classifier_symbol {
        w.field_u64(shape_field::CLASSIFIER_SYMBOL, symbol.as_u64());
    }
    w.into_bytes()
}

/// Decode one type shape. `strings_len` and `types_before` bound the valid
/// index ranges; a shape may only reference shapes interned before it.
pub(crate) fn decode_shape(
    unit: &str,
    bytes: &[u8],
    strings_len: usize,
    types_before: usize,
) -> Result<TypeShape, CodecError> {
    let mut reader = Reader::new(bytes);
    let mut classifier = None;
    let mut arguments = Vec::new();
    let mut nullable = false;
    let mut classifier_symbol = None;

    while let Some((num, value)) = reader.next_field().map_err(|e| CodecError::wire(unit, e))? {
        match num {
            shape_field::CLASSIFIER => {
                classifier = Some(value.as_u32(num).map_err(|e| CodecError::wire(unit, e))?);
            }
            shape_field::ARGUMENT => {
                let packed = value.as_bytes(num).map_err(|e| CodecError::wire(unit, e))?;
                arguments = read_packed_u32(num, packed).map_err(|e| CodecError::wire(unit, e))?;
            }
            shape_field::NULLABLE => {
                nullable = value.as_bool(num).map_err(|e| CodecError::wire(unit, e))?;
            }
            shape_field::CLASSIFIER_SYMBOL => {
                let raw = value.as_u64(num).map_err(|e| CodecError::wire(unit, e))?;
                let symbol = Symbol::from_raw(raw);
                if symbol.is_reserved() {
                    return Err(CodecError::malformed(unit, "reserved symbol value 0"));
                }
                classifier_symbol = Some(symbol);
            }
            _ => {}
        }
    }

    let classifier =
        classifier.ok_or_else(|| CodecError::malformed(unit, "missing required field `classifier`"))?;
    if classifier as usize >= strings_len {
        return Err(CodecError::IndexOutOfRange {
            unit: unit.to_owned(),
            field: "classifier",
            index: classifier,
            len: strings_len,
        });
    }
    for &arg in &arguments {
        if arg as usize >= types_before {
            return Err(CodecError::IndexOutOfRange {
                unit: unit.to_owned(),
                field: "argument",
                index: arg,
                len: types_before,
            });
        }
    }

    Ok(TypeShape {
        classifier: StringIdx::from_raw(classifier),
        arguments: arguments.into_iter().map(TypeIdx::from_raw).collect(),
        nullable,
        classifier_symbol,
    })
}

/// Encode one declaration and its subtree.
///
/// `path` is the entity's stable identity; child paths extend it by the
/// child's name (or `<this>` for the receiver). With an allocator present,
/// symbol fields are emitted for the receiver, each type parameter, and each
/// member, queried in traversal order.
pub(crate) fn encode_decl(
    unit: &Unit,
    id: DeclId,
    path: &EntityPath,
    alloc: Option<&dyn SymbolAllocator>,
) -> Result<Vec<u8>, CodecError> {
    let unit_name = unit.name.as_str();
    let node = unit.arena.try_get(id).ok_or_else(|| {
        CodecError::malformed(unit_name, format!("dangling decl handle {}", id.as_u32()))
    })?;

    let mut w = Writer::new();
    w.field_bytes(field::BASE, &encode_base(&node.base));
    w.field_u32(field::NAME, node.name.as_u32());

    let mut receiver_symbol = None;
    if let Some(receiver) = node.this_receiver {
        let receiver_path = path.receiver();
        if let Some(alloc) = alloc {
            receiver_symbol = Some(alloc.symbol_for(&receiver_path));
        }
        let bytes = encode_decl(unit, receiver, &receiver_path, alloc)?;
        w.field_bytes(field::THIS_RECEIVER, &bytes);
    }

    let mut type_parameter_symbols = Vec::new();
    for &tp in &node.type_parameters {
        let tp_node = unit.arena.try_get(tp).ok_or_else(|| {
            CodecError::malformed(unit_name, format!("dangling decl handle {}", tp.as_u32()))
        })?;
        let tp_path = path.child(resolve_name(unit, unit_name, tp_node.name)?, tp_node.kind());
        if let Some(alloc) = alloc {
            type_parameter_symbols.push(alloc.symbol_for(&tp_path));
        }
        let bytes = encode_decl(unit, tp, &tp_path, alloc)?;
        w.field_bytes(field::TYPE_PARAMETER, &bytes);
    }

    let mut member_symbols = Vec::new();
    for &member in &node.members {
        let member_node = unit.arena.try_get(member).ok_or_else(|| {
            CodecError::malformed(unit_name, format!("dangling decl handle {}", member.as_u32()))
        })?;
        let member_path = path.child(
            resolve_name(unit, unit_name, member_node.name)?,
            member_node.kind(),
        );
        if let Some(alloc) = alloc {
            member_symbols.push(alloc.symbol_for(&member_path));
        }
        let bytes = encode_decl(unit, member, &member_path, alloc)?;
        w.field_bytes(field::MEMBER, &bytes);
    }

    if !node.supertypes.is_empty() {
        let indices: Vec<u32> = node.supertypes.iter().map(|t| t.as_u32()).collect();
        w.field_packed_u32(field::SUPER_TYPE, &indices);
    }

    if let Some(symbol) = receiver_symbol {
        w.field_u64(field::THIS_RECEIVER_SYMBOL, symbol.as_u64());
    }
    for symbol in &type_parameter_symbols {
        w.field_u64(field::TYPE_PARAMETER_SYMBOL, symbol.as_u64());
    }
    for symbol in &member_symbols {
        w.field_u64(field::MEMBER_SYMBOL, symbol.as_u64());
    }

    Ok(w.into_bytes())
}

fn resolve_name<'a>(
    unit: &'a Unit,
    unit_name: &str,
    name: StringIdx,
) -> Result<&'a str, CodecError> {
    unit.strings
        .get(name.as_u32())
        .map(String::as_str)
        .map_err(|_| CodecError::IndexOutOfRange {
            unit: unit_name.to_owned(),
            field: "name",
            index: name.as_u32(),
            len: unit.strings.len(),
        })
}

fn decode_symbol(unit: &str, raw: u64) -> Result<Symbol, CodecError> {
    let symbol = Symbol::from_raw(raw);
    if symbol.is_reserved() {
        return Err(CodecError::malformed(unit, "reserved symbol value 0"));
    }
    Ok(symbol)
}

/// Decode one declaration record and its subtree into `arena`.
///
/// Returns the handle of the decoded node. Never resolves symbols; the raw
/// values are preserved in [`ChildRef::Tagged`] for the linker.
pub(crate) fn decode_decl(
    unit: &str,
    bytes: &[u8],
    strings_len: usize,
    types_len: usize,
    arena: &mut Vec<UnlinkedDecl>,
) -> Result<DeclId, CodecError> {
    let mut reader = Reader::new(bytes);

    let mut base = None;
    let mut name = None;
    let mut receiver = None;
    let mut type_parameters = Vec::new();
    let mut members = Vec::new();
    let mut supertypes = Vec::new();
    let mut receiver_symbol = None;
    let mut type_parameter_symbols = Vec::new();
    let mut member_symbols = Vec::new();

    while let Some((num, value)) = reader.next_field().map_err(|e| CodecError::wire(unit, e))? {
        match num {
            field::BASE => {
                let nested = value.as_bytes(num).map_err(|e| CodecError::wire(unit, e))?;
                base = Some(decode_base(unit, nested)?);
            }
            field::NAME => {
                name = Some(value.as_u32(num).map_err(|e| CodecError::wire(unit, e))?);
            }
            field::THIS_RECEIVER => {
                let nested = value.as_bytes(num).map_err(|e| CodecError::wire(unit, e))?;
                receiver = Some(decode_decl(unit, nested, strings_len, types_len, arena)?);
            }
            field::TYPE_PARAMETER => {
                let nested = value.as_bytes(num).map_err(|e| CodecError::wire(unit, e))?;
                type_parameters.push(decode_decl(unit, nested, strings_len, types_len, arena)?);
            }
            field::MEMBER => {
                let nested = value.as_bytes(num).map_err(|e| CodecError::wire(unit, e))?;
                members.push(decode_decl(unit, nested, strings_len, types_len, arena)?);
            }
            field::SUPER_TYPE => {
                let packed = value.as_bytes(num).map_err(|e| CodecError::wire(unit, e))?;
                supertypes = read_packed_u32(num, packed).map_err(|e| CodecError::wire(unit, e))?;
            }
            field::THIS_RECEIVER_SYMBOL => {
                let raw = value.as_u64(num).map_err(|e| CodecError::wire(unit, e))?;
                receiver_symbol = Some(decode_symbol(unit, raw)?);
            }
            field::TYPE_PARAMETER_SYMBOL => {
                let raw = value.as_u64(num).map_err(|e| CodecError::wire(unit, e))?;
                type_parameter_symbols.push(decode_symbol(unit, raw)?);
            }
            field::MEMBER_SYMBOL => {
                let raw = value.as_u64(num).map_err(|e| CodecError::wire(unit, e))?;
                member_symbols.push(decode_symbol(unit, raw)?);
            }
            _ => {}
        }
    }

    let base =
        base.ok_or_else(|| CodecError::malformed(unit, "missing required field `base`"))?;
    let name =
        name.ok_or_else(|| CodecError::malformed(unit, "missing required field `name`"))?;
    if name as usize >= strings_len {
        return Err(CodecError::IndexOutOfRange {
            unit: unit.to_owned(),
            field: "name",
            index: name,
            len: strings_len,
        });
    }
    for &st in &supertypes {
        if st as usize >= types_len {
            return Err(CodecError::IndexOutOfRange {
                unit: unit.to_owned(),
                field: "super_type",
                index: st,
                len: types_len,
            });
        }
    }

    // The symbol layer must mirror the structural layer exactly.
    if receiver_symbol.is_some() && receiver.is_none() {
        return Err(CodecError::malformed(
            unit,
            "this_receiver_symbol without this_receiver",
        ));
    }
    if !type_parameter_symbols.is_empty()
        && type_parameter_symbols.len() != type_parameters.len()
    {
        return Err(CodecError::malformed(
            unit,
            format!(
                "type_parameter_symbol count {} does not match type_parameter count {}",
                type_parameter_symbols.len(),
                type_parameters.len()
            ),
        ));
    }
    if !member_symbols.is_empty() && member_symbols.len() != members.len() {
        return Err(CodecError::malformed(
            unit,
            format!(
                "member_symbol count {} does not match member count {}",
                member_symbols.len(),
                members.len()
            ),
        ));
    }

    let this_receiver = match (receiver, receiver_symbol) {
        (Some(decl), Some(symbol)) => Some(ChildRef::Tagged { decl, symbol }),
        (Some(decl), None) => Some(ChildRef::Local(decl)),
        (None, _) => None,
    };
    let type_parameters = zip_children(type_parameters, type_parameter_symbols);
    let members = zip_children(members, member_symbols);

    let decl = UnlinkedDecl {
        base,
        name: StringIdx::from_raw(name),
        this_receiver,
        type_parameters,
        members,
        supertypes: supertypes.into_iter().map(TypeIdx::from_raw).collect(),
    };

    let id = DeclId::from_raw(arena.len() as u32);
    arena.push(decl);
    Ok(id)
}

fn zip_children(decls: Vec<DeclId>, symbols: Vec<Symbol>) -> Vec<ChildRef> {
    if symbols.is_empty() {
        decls.into_iter().map(ChildRef::Local).collect()
    } else {
        decls
            .into_iter()
            .zip(symbols)
            .map(|(decl, symbol)| ChildRef::Tagged { decl, symbol })
            .collect()
    }
}
