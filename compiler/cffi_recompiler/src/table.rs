//! The compiled type table.
//!
//! ```text
//!  slot  op                          canonical type
//!  ────  ──────────────────────────  ──────────────────
//!    0   _CFFI_OP(FUNCTION, 3)       double()(float)
//!    1   _CFFI_OP(PRIMITIVE, 13)     float
//!    2   _CFFI_OP(FUNCTION_END, 0)
//!    3   _CFFI_OP(PRIMITIVE, 14)     double
//! ```
//!
//! Every reachable type owns exactly one canonical slot. Function argument
//! slots double as the canonical slot of the argument type when that type
//! has no slot of its own yet; otherwise they repeat or redirect to it.

use rustc_hash::FxHashMap;

use cffi_model::TypeId;

use crate::{Op, RecompileError, RecompileResult};

/// Dense numbering of the struct/unions (or enums) of one table.
///
/// Aggregates are numbered in name order, ties kept in discovery order.
#[derive(Clone, Debug, Default)]
pub struct AggregateIndex {
    order: Vec<TypeId>,
    position: FxHashMap<TypeId, usize>,
}

impl AggregateIndex {
    /// Number an already-sorted list of aggregates.
    pub(crate) fn from_sorted(order: Vec<TypeId>) -> Self {
        let position = order.iter().enumerate().map(|(i, &ty)| (ty, i)).collect();
        Self { order, position }
    }

    #[inline]
    pub fn get(&self, ty: TypeId) -> Option<usize> {
        self.position.get(&ty).copied()
    }

    /// Aggregates by dense index.
    pub fn as_slice(&self) -> &[TypeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// The `_cffi_types` table of one interface, fully resolved.
#[derive(Clone, Debug)]
pub struct TypeTable {
    ops: Vec<Op>,
    index: FxHashMap<TypeId, usize>,
    struct_unions: AggregateIndex,
    enums: AggregateIndex,
}

impl TypeTable {
    pub(crate) fn new(
        ops: Vec<Op>,
        index: FxHashMap<TypeId, usize>,
        struct_unions: AggregateIndex,
        enums: AggregateIndex,
    ) -> Self {
        Self {
            ops,
            index,
            struct_unions,
            enums,
        }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Canonical slot of a type, if it is reachable from a declaration.
    #[inline]
    pub fn index_of(&self, ty: TypeId) -> Option<usize> {
        self.index.get(&ty).copied()
    }

    /// Canonical slot of a type that must have one.
    pub(crate) fn slot_of(&self, ty: TypeId) -> RecompileResult<usize> {
        self.index_of(ty)
            .ok_or_else(|| RecompileError::internal(format!("{ty:?} has no slot in the type table")))
    }

    /// Number of distinct types in the table.
    pub fn type_count(&self) -> usize {
        self.index.len()
    }

    pub fn struct_unions(&self) -> &AggregateIndex {
        &self.struct_unions
    }

    pub fn enums(&self) -> &AggregateIndex {
        &self.enums
    }

    /// The type owning each slot, `None` for auxiliary slots.
    pub fn canonical_types(&self) -> Vec<Option<TypeId>> {
        let mut owners = vec![None; self.ops.len()];
        for (&ty, &slot) in &self.index {
            if let Some(owner) = owners.get_mut(slot) {
                *owner = Some(ty);
            }
        }
        owners
    }

    /// All ops in debug form, concatenated: `(FUNCTION 1)(PRIMITIVE 14)...`.
    pub fn debug_string(&self) -> String {
        self.ops.iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests;
