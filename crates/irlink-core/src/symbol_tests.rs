use std::sync::{Arc, Mutex};

use crate::{
    Assignment, DeclKind, EntityPath, Symbol, SymbolAllocator, SymbolError, SymbolTable, UnitSeq,
};

fn class_path(name: &str) -> EntityPath {
    EntityPath::root(name, DeclKind::Class)
}

#[test]
fn symbol_for_is_stable_within_session() {
    let mut table = SymbolTable::new(UnitSeq::new(1));
    let path = class_path("demo.Widget");

    let first = table.symbol_for(&path);
    let second = table.symbol_for(&path);

    assert_eq!(first, second);
    assert!(!first.is_reserved());
}

#[test]
fn allocation_is_monotone_and_never_zero() {
    let mut table = SymbolTable::new(UnitSeq::new(1));

    let a = table.symbol_for(&class_path("A"));
    let b = table.symbol_for(&class_path("B"));

    assert!(a.as_u64() >= 1);
    assert!(b.as_u64() > a.as_u64());
}

#[test]
fn receiver_paths_are_distinct_per_class() {
    let mut table = SymbolTable::new(UnitSeq::new(1));

    let a = table.symbol_for(&class_path("A").receiver());
    let b = table.symbol_for(&class_path("B").receiver());

    assert_ne!(a, b);
}

#[test]
fn merge_unions_disjoint_tables() {
    let mut ours = SymbolTable::new(UnitSeq::new(1));
    ours.symbol_for(&class_path("A"));

    let mut theirs = SymbolTable::new(UnitSeq::new(2));
    theirs
        .restore(
            class_path("B"),
            Assignment {
                symbol: Symbol::from_raw(100),
                origin: UnitSeq::new(2),
            },
        )
        .unwrap();

    let outcome = ours.merge(&theirs).unwrap();

    assert!(outcome.aliases.is_empty());
    assert_eq!(ours.lookup(&class_path("B")), Some(Symbol::from_raw(100)));
    // Allocation cursor moves past merged values.
    let fresh = ours.symbol_for(&class_path("C"));
    assert!(fresh.as_u64() > 100);
}

#[test]
fn merge_reconciles_collision_by_lowest_sequence() {
    let mut ours = SymbolTable::new(UnitSeq::new(2));
    let path = class_path("demo.C");
    let newer = ours.symbol_for(&path);

    let mut theirs = SymbolTable::new(UnitSeq::new(1));
    theirs
        .restore(
            path.clone(),
            Assignment {
                symbol: Symbol::from_raw(7),
                origin: UnitSeq::new(1),
            },
        )
        .unwrap();

    let outcome = ours.merge(&theirs).unwrap();

    // Build 1 allocated first, so its symbol keeps ownership.
    assert_eq!(ours.lookup(&path), Some(Symbol::from_raw(7)));
    assert_eq!(outcome.canonical(newer), Symbol::from_raw(7));
}

#[test]
fn merge_keeps_own_assignment_when_older() {
    let mut ours = SymbolTable::new(UnitSeq::new(1));
    let path = class_path("demo.C");
    let older = ours.symbol_for(&path);

    let mut theirs = SymbolTable::new(UnitSeq::new(3));
    let newer = Symbol::from_raw(55);
    theirs
        .restore(
            path.clone(),
            Assignment {
                symbol: newer,
                origin: UnitSeq::new(3),
            },
        )
        .unwrap();

    let outcome = ours.merge(&theirs).unwrap();

    assert_eq!(ours.lookup(&path), Some(older));
    assert_eq!(outcome.canonical(newer), older);
}

#[test]
fn merge_with_equal_sequence_is_fatal() {
    let mut ours = SymbolTable::new(UnitSeq::new(1));
    let path = class_path("demo.C");
    ours.symbol_for(&path);

    let mut theirs = SymbolTable::new(UnitSeq::new(1));
    theirs
        .restore(
            path.clone(),
            Assignment {
                symbol: Symbol::from_raw(99),
                origin: UnitSeq::new(1),
            },
        )
        .unwrap();

    let err = ours.merge(&theirs).unwrap_err();
    assert!(matches!(err, SymbolError::SymbolCollision { .. }));
}

#[test]
fn merge_rejects_reused_symbol_value() {
    let mut ours = SymbolTable::new(UnitSeq::new(1));
    let taken = ours.symbol_for(&class_path("A"));

    let mut theirs = SymbolTable::new(UnitSeq::new(2));
    theirs
        .restore(
            class_path("B"),
            Assignment {
                symbol: taken,
                origin: UnitSeq::new(2),
            },
        )
        .unwrap();

    let err = ours.merge(&theirs).unwrap_err();
    assert!(matches!(err, SymbolError::ValueReused { .. }));
}

#[test]
fn restore_is_idempotent_for_same_assignment() {
    let mut table = SymbolTable::new(UnitSeq::new(1));
    let assignment = Assignment {
        symbol: Symbol::from_raw(42),
        origin: UnitSeq::new(1),
    };

    table.restore(class_path("A"), assignment).unwrap();
    table.restore(class_path("A"), assignment).unwrap();

    assert_eq!(table.len(), 1);
    // Cursor skips past restored values.
    assert!(table.symbol_for(&class_path("B")).as_u64() > 42);
}

#[test]
fn shared_allocation_across_threads() {
    let shared = Arc::new(Mutex::new(SymbolTable::new(UnitSeq::new(1))));

    let mut handles = Vec::new();
    for worker in 0..4 {
        let shared = Arc::clone(&shared);
        handles.push(std::thread::spawn(move || {
            let common = class_path("demo.Shared");
            let own = class_path(&format!("demo.Worker{worker}"));
            (shared.symbol_for(&common), shared.symbol_for(&own))
        }));
    }

    let results: Vec<(Symbol, Symbol)> = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();

    // Every worker saw the same symbol for the shared entity.
    let common = results[0].0;
    assert!(results.iter().all(|(c, _)| *c == common));

    // Per-worker entities got distinct symbols.
    let mut own: Vec<u64> = results.iter().map(|(_, o)| o.as_u64()).collect();
    own.sort_unstable();
    own.dedup();
    assert_eq!(own.len(), 4);
}
