use std::cell::RefCell;

use irlink_codec::wire::Writer;
use irlink_codec::{HEADER_SIZE, Header, encode_unit};
use irlink_core::{DeclKind, DeclNode, EntityPath, Symbol, SymbolTable, Unit, UnitSeq};

use crate::{LinkError, Session};

fn sample_table() -> SymbolTable {
    let mut table = SymbolTable::new(UnitSeq::new(1));
    let container = EntityPath::root("demo.Container", DeclKind::Class);
    table.symbol_for(&container.child("demo.Base", DeclKind::Class));
    table.symbol_for(&container.receiver());
    table.symbol_for(&container.child("size", DeclKind::Field));
    table
}

#[test]
fn state_roundtrip() {
    let session = Session::from_table(sample_table());
    let restored = Session::from_bytes(&session.to_bytes()).unwrap();
    assert_eq!(restored, session);
    assert_eq!(restored.table().next_raw(), 4);
    assert_eq!(restored.table().origin(), UnitSeq::new(1));
}

#[test]
fn seeded_session_reproduces_symbols() {
    let mut unit = Unit::new("src/base.ir", UnitSeq::new(1));
    let container_name = unit.intern_str("demo.Container");
    let base_name = unit.intern_str("demo.Base");
    let base = unit.arena.alloc(DeclNode::new(DeclKind::Class, base_name));
    let mut container = DeclNode::new(DeclKind::Class, container_name);
    container.members.push(base);
    let container = unit.arena.alloc(container);
    unit.roots.push(container);

    let session = RefCell::new(SymbolTable::new(UnitSeq::new(1)));
    let build1 = encode_unit(&unit, Some(&session)).unwrap();
    let state = Session::from_table(session.into_inner()).to_bytes();

    // Next build: seed from persisted state, re-encode the unchanged unit.
    let restored = Session::from_bytes(&state).unwrap();
    let session = RefCell::new(restored.into_table());
    let build2 = encode_unit(&unit, Some(&session)).unwrap();
    assert_eq!(build2, build1);

    // A new entity gets a fresh value, never a recycled one.
    let fresh = session
        .borrow_mut()
        .symbol_for(&EntityPath::root("demo.New", DeclKind::Class));
    assert_eq!(fresh, Symbol::from_raw(2));
}

fn state_from_payload(payload: Vec<u8>) -> Vec<u8> {
    let header = Header {
        checksum: crc32fast::hash(&payload),
        total_size: (HEADER_SIZE + payload.len()) as u32,
        ..Header::default()
    };
    let mut bytes = header.to_bytes().to_vec();
    bytes.extend_from_slice(&payload);
    bytes
}

fn entry(segments: &[&str], symbol: u64) -> Vec<u8> {
    let mut w = Writer::new();
    for s in segments {
        w.field_str(1, s);
    }
    w.field_u32(2, 0);
    w.field_u64(3, symbol);
    w.field_u32(4, 1);
    w.into_bytes()
}

#[test]
fn truncated_state_rejected() {
    assert!(matches!(
        Session::from_bytes(&[0u8; 8]),
        Err(LinkError::MalformedState(_))
    ));
}

#[test]
fn corrupt_state_rejected() {
    let mut bytes = Session::from_table(sample_table()).to_bytes();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    assert!(matches!(
        Session::from_bytes(&bytes),
        Err(LinkError::Codec(_))
    ));
}

#[test]
fn missing_cursor_rejected() {
    let mut payload = Writer::new();
    payload.field_u32(2, 1);
    assert!(matches!(
        Session::from_bytes(&state_from_payload(payload.into_bytes())),
        Err(LinkError::MalformedState(_))
    ));
}

#[test]
fn entry_without_path_rejected() {
    let mut payload = Writer::new();
    payload.field_u64(1, 2);
    payload.field_u32(2, 1);
    payload.field_bytes(3, &entry(&[], 1));
    assert!(matches!(
        Session::from_bytes(&state_from_payload(payload.into_bytes())),
        Err(LinkError::MalformedState(_))
    ));
}

#[test]
fn reused_symbol_value_rejected() {
    let mut payload = Writer::new();
    payload.field_u64(1, 6);
    payload.field_u32(2, 1);
    payload.field_bytes(3, &entry(&["demo.A"], 5));
    payload.field_bytes(3, &entry(&["demo.B"], 5));
    assert!(matches!(
        Session::from_bytes(&state_from_payload(payload.into_bytes())),
        Err(LinkError::Symbol(_))
    ));
}
