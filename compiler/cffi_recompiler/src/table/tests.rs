#![allow(clippy::unwrap_used, clippy::expect_used)]

use rustc_hash::FxHashMap;

use super::*;
use crate::OpCode;

fn table() -> TypeTable {
    let double = TypeId::from_raw(14);
    let float = TypeId::from_raw(13);
    let raw = TypeId::from_raw(40);
    let ops = vec![
        Op::slot(OpCode::Function, 3),
        Op::new(OpCode::Primitive, 13),
        Op::new(OpCode::FunctionEnd, 0),
        Op::new(OpCode::Primitive, 14),
    ];
    let mut index = FxHashMap::default();
    index.insert(raw, 0);
    index.insert(float, 1);
    index.insert(double, 3);
    TypeTable::new(ops, index, AggregateIndex::default(), AggregateIndex::default())
}

#[test]
fn debug_string_concatenates_ops() {
    assert_eq!(
        table().debug_string(),
        "(FUNCTION 3)(PRIMITIVE 13)(FUNCTION_END 0)(PRIMITIVE 14)"
    );
}

#[test]
fn canonical_owners() {
    let owners = table().canonical_types();
    assert_eq!(
        owners,
        vec![
            Some(TypeId::from_raw(40)),
            Some(TypeId::from_raw(13)),
            None,
            Some(TypeId::from_raw(14)),
        ]
    );
}

#[test]
fn missing_slot_is_internal() {
    let t = table();
    assert_eq!(t.index_of(TypeId::from_raw(14)), Some(3));
    assert!(t.slot_of(TypeId::VOID).unwrap_err().is_internal());
}

#[test]
fn aggregate_index_is_dense() {
    let a = TypeId::from_raw(31);
    let b = TypeId::from_raw(30);
    let idx = AggregateIndex::from_sorted(vec![a, b]);
    assert_eq!(idx.get(a), Some(0));
    assert_eq!(idx.get(b), Some(1));
    assert_eq!(idx.as_slice(), &[a, b]);
    assert_eq!(idx.get(TypeId::VOID), None);
}
