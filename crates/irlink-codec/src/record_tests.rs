use irlink_core::Symbol;

use crate::error::CodecError;
use crate::record::{ChildRef, decode_decl, decode_shape};
use crate::wire::Writer;

const UNIT: &str = "test.ir";

/// Base record: origin 0 (defined), kind as given.
fn base_bytes(kind: u32) -> Vec<u8> {
    let mut w = Writer::new();
    w.field_u32(1, 0);
    w.field_u32(5, kind);
    w.into_bytes()
}

/// Minimal valid record: base (function) plus a name index.
fn minimal_record(name: u32) -> Vec<u8> {
    let mut w = Writer::new();
    w.field_bytes(1, &base_bytes(3));
    w.field_u32(2, name);
    w.into_bytes()
}

fn decode(bytes: &[u8], strings_len: usize, types_len: usize) -> Result<(), CodecError> {
    let mut arena = Vec::new();
    decode_decl(UNIT, bytes, strings_len, types_len, &mut arena).map(|_| ())
}

#[test]
fn minimal_record_decodes() {
    let mut arena = Vec::new();
    let id = decode_decl(UNIT, &minimal_record(0), 1, 0, &mut arena).unwrap();
    assert_eq!(arena.len(), 1);
    let decl = &arena[id.index()];
    assert_eq!(decl.name.as_u32(), 0);
    assert!(decl.this_receiver.is_none());
    assert!(decl.children().next().is_none());
}

#[test]
fn missing_base_is_malformed() {
    let mut w = Writer::new();
    w.field_u32(2, 0);
    let err = decode(&w.into_bytes(), 1, 0).unwrap_err();
    assert!(matches!(err, CodecError::MalformedRecord { .. }));
}

#[test]
fn missing_name_is_malformed() {
    let mut w = Writer::new();
    w.field_bytes(1, &base_bytes(3));
    let err = decode(&w.into_bytes(), 1, 0).unwrap_err();
    assert!(matches!(err, CodecError::MalformedRecord { .. }));
}

#[test]
fn name_index_out_of_range() {
    let err = decode(&minimal_record(5), 1, 0).unwrap_err();
    assert!(matches!(
        err,
        CodecError::IndexOutOfRange { field: "name", index: 5, len: 1, .. }
    ));
}

#[test]
fn supertype_index_out_of_range() {
    let mut w = Writer::new();
    w.field_bytes(1, &base_bytes(0));
    w.field_u32(2, 0);
    w.field_packed_u32(6, &[3]);
    let err = decode(&w.into_bytes(), 1, 2).unwrap_err();
    assert!(matches!(
        err,
        CodecError::IndexOutOfRange { field: "super_type", index: 3, len: 2, .. }
    ));
}

#[test]
fn unknown_kind_is_malformed() {
    let mut w = Writer::new();
    w.field_bytes(1, &base_bytes(99));
    w.field_u32(2, 0);
    let err = decode(&w.into_bytes(), 1, 0).unwrap_err();
    assert!(matches!(err, CodecError::MalformedRecord { .. }));
}

#[test]
fn unknown_origin_is_malformed() {
    let mut base = Writer::new();
    base.field_u32(1, 7);
    base.field_u32(5, 0);
    let mut w = Writer::new();
    w.field_bytes(1, &base.into_bytes());
    w.field_u32(2, 0);
    let err = decode(&w.into_bytes(), 1, 0).unwrap_err();
    assert!(matches!(err, CodecError::MalformedRecord { .. }));
}

#[test]
fn receiver_symbol_without_receiver() {
    let mut w = Writer::new();
    w.field_bytes(1, &base_bytes(0));
    w.field_u32(2, 0);
    w.field_u64(7, 12);
    let err = decode(&w.into_bytes(), 1, 0).unwrap_err();
    assert!(matches!(err, CodecError::MalformedRecord { .. }));
}

#[test]
fn type_parameter_symbol_count_mismatch() {
    // One symbol, zero structural type parameters.
    let mut w = Writer::new();
    w.field_bytes(1, &base_bytes(0));
    w.field_u32(2, 0);
    w.field_u64(8, 12);
    let err = decode(&w.into_bytes(), 1, 0).unwrap_err();
    assert!(matches!(err, CodecError::MalformedRecord { .. }));
}

#[test]
fn member_symbol_count_mismatch() {
    let mut w = Writer::new();
    w.field_bytes(1, &base_bytes(0));
    w.field_u32(2, 0);
    w.field_bytes(5, &minimal_record(0));
    w.field_u64(9, 12);
    w.field_u64(9, 13);
    let err = decode(&w.into_bytes(), 1, 0).unwrap_err();
    assert!(matches!(err, CodecError::MalformedRecord { .. }));
}

#[test]
fn reserved_symbol_value_rejected() {
    let mut w = Writer::new();
    w.field_bytes(1, &base_bytes(0));
    w.field_u32(2, 0);
    w.field_bytes(5, &minimal_record(0));
    w.field_u64(9, 0);
    let err = decode(&w.into_bytes(), 1, 0).unwrap_err();
    assert!(matches!(err, CodecError::MalformedRecord { .. }));
}

#[test]
fn symbols_zip_with_structural_children() {
    let mut w = Writer::new();
    w.field_bytes(1, &base_bytes(0));
    w.field_u32(2, 0);
    w.field_bytes(4, &minimal_record(1));
    w.field_bytes(5, &minimal_record(2));
    w.field_u64(8, 21);
    w.field_u64(9, 22);

    let mut arena = Vec::new();
    let id = decode_decl(UNIT, &w.into_bytes(), 3, 0, &mut arena).unwrap();

    // Children decode before their parent.
    assert_eq!(id.index(), 2);
    let decl = &arena[id.index()];
    assert_eq!(
        decl.type_parameters[0].symbol(),
        Some(Symbol::from_raw(21))
    );
    assert_eq!(decl.members[0].symbol(), Some(Symbol::from_raw(22)));
    assert!(matches!(decl.type_parameters[0], ChildRef::Tagged { .. }));
}

#[test]
fn children_without_symbols_stay_local() {
    let mut w = Writer::new();
    w.field_bytes(1, &base_bytes(0));
    w.field_u32(2, 0);
    w.field_bytes(5, &minimal_record(1));

    let mut arena = Vec::new();
    let id = decode_decl(UNIT, &w.into_bytes(), 2, 0, &mut arena).unwrap();
    let decl = &arena[id.index()];
    assert!(matches!(decl.members[0], ChildRef::Local(_)));
    assert_eq!(decl.members[0].symbol(), None);
}

#[test]
fn shape_classifier_out_of_range() {
    let mut w = Writer::new();
    w.field_u32(1, 4);
    let err = decode_shape(UNIT, &w.into_bytes(), 2, 0).unwrap_err();
    assert!(matches!(
        err,
        CodecError::IndexOutOfRange { field: "classifier", index: 4, len: 2, .. }
    ));
}

#[test]
fn shape_argument_must_precede_shape() {
    // A shape may only reference shapes interned before it.
    let mut w = Writer::new();
    w.field_u32(1, 0);
    w.field_packed_u32(2, &[1]);
    let err = decode_shape(UNIT, &w.into_bytes(), 2, 1).unwrap_err();
    assert!(matches!(
        err,
        CodecError::IndexOutOfRange { field: "argument", index: 1, len: 1, .. }
    ));
}

#[test]
fn shape_reserved_symbol_rejected() {
    let mut w = Writer::new();
    w.field_u32(1, 0);
    w.field_u64(4, 0);
    let err = decode_shape(UNIT, &w.into_bytes(), 1, 0).unwrap_err();
    assert!(matches!(err, CodecError::MalformedRecord { .. }));
}
