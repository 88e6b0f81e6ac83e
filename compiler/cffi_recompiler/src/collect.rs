//! Type graph discovery and slot layout.
//!
//! # Architecture
//!
//! ```text
//! declarations ──► Collector::collect ──► discovery order
//!                                              │ sort by "<C name>"
//!                                              ▼
//!                       raw functions: FUNCTION, one slot per arg, END
//!                       everything else: one slot (+1 for array length)
//!                                              │
//!                                              ▼
//!                                           Layout
//! ```
//!
//! A function argument slot becomes the argument type's canonical slot when
//! the type has none yet, so `double sin(double)` needs three slots, not four.

use rustc_hash::{FxHashMap, FxHashSet};

use cffi_model::{ArrayLength, DeclKind, Declaration, Ffi, TypeData, TypeId, TypePool};

use crate::lengths::{resolve_length, LengthSite};
use crate::phase::{declared_type, function_type, unsupported};
use crate::table::AggregateIndex;
use crate::{RecompileError, RecompileResult};

/// A reserved slot, before emission.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    /// Canonical slot of a type.
    Type(TypeId),
    /// Argument position inside a function region.
    Arg(TypeId),
    /// `FUNCTION_END` of a function region.
    End,
    /// Length literal after an `ARRAY` op.
    Len,
}

/// Slot reservations and indexes, ready for emission.
#[derive(Debug)]
pub(crate) struct Layout {
    pub slots: Vec<Slot>,
    pub index: FxHashMap<TypeId, usize>,
    /// Every discovered type, in table order.
    pub order: Vec<TypeId>,
    pub struct_unions: AggregateIndex,
    pub enums: AggregateIndex,
}

/// Walks declarations and records every reachable type once.
pub(crate) struct Collector<'a> {
    ffi: &'a Ffi,
    pool: &'a mut TypePool,
    seen: FxHashSet<TypeId>,
    discovered: Vec<TypeId>,
}

impl<'a> Collector<'a> {
    pub(crate) fn new(ffi: &'a Ffi, pool: &'a mut TypePool) -> Self {
        Self {
            ffi,
            pool,
            seen: FxHashSet::default(),
            discovered: Vec::new(),
        }
    }

    /// The collecttype step of one declaration.
    pub(crate) fn declaration(&mut self, decl: &Declaration) -> RecompileResult<()> {
        match decl.kind {
            DeclKind::Macro => Ok(()),
            DeclKind::Function => {
                let (ptr, raw, variadic) = {
                    let function = function_type(self.pool, decl)?;
                    (function.ptr, function.raw, function.sig.ellipsis)
                };
                self.collect(raw)?;
                if variadic {
                    self.collect(ptr)?;
                }
                Ok(())
            }
            DeclKind::Constant => {
                let ty = declared_type(decl)?;
                if self.pool.is_integer_primitive(ty) {
                    Ok(())
                } else {
                    self.collect(ty)
                }
            }
            DeclKind::Variable => {
                let ty = declared_type(decl)?;
                let ty = resolve_length(self.pool, ty, LengthSite::Global(&decl.name))?;
                self.collect(ty)
            }
            DeclKind::Typedef
            | DeclKind::Struct
            | DeclKind::Union
            | DeclKind::Anonymous
            | DeclKind::Enum => {
                let ty = declared_type(decl)?;
                self.collect(ty)
            }
            DeclKind::Other(_) => Err(unsupported(decl)),
        }
    }

    fn collect(&mut self, ty: TypeId) -> RecompileResult<()> {
        if !self.seen.insert(ty) {
            return Ok(());
        }
        self.discovered.push(ty);
        if self.pool.aggregate(ty).is_some() {
            if self.ffi.is_included(ty) {
                return Ok(());
            }
            let fields: Vec<(String, TypeId)> = self
                .pool
                .enum_fields(ty)
                .into_iter()
                .map(|f| (f.name.clone(), f.ty))
                .collect();
            for (name, field_ty) in fields {
                let site = LengthSite::Field {
                    owner: ty,
                    name: &name,
                };
                let field_ty = resolve_length(self.pool, field_ty, site)?;
                self.collect(field_ty)?;
            }
            return Ok(());
        }
        for child in self.pool.type_children(ty) {
            self.collect(child)?;
        }
        Ok(())
    }

    /// Sort the discovered types and reserve their slots.
    pub(crate) fn layout(self) -> RecompileResult<Layout> {
        let pool: &TypePool = self.pool;
        let mut keyed: Vec<(String, TypeId)> = self
            .discovered
            .into_iter()
            .map(|ty| (pool.sort_key(ty), ty))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        let order: Vec<TypeId> = keyed.into_iter().map(|(_, ty)| ty).collect();

        let mut slots = Vec::with_capacity(order.len() * 2);
        let mut index = FxHashMap::default();

        // Function regions first: their length depends on the argument count.
        for &ty in &order {
            let TypeData::RawFunction(sig) = pool.get(ty) else {
                continue;
            };
            index.insert(ty, slots.len());
            slots.push(Slot::Type(ty));
            for &arg in &sig.args {
                check_argument(pool, ty, arg)?;
                index.entry(arg).or_insert(slots.len());
                slots.push(Slot::Arg(arg));
            }
            slots.push(Slot::End);
        }

        for &ty in &order {
            if index.contains_key(&ty) {
                continue;
            }
            index.insert(ty, slots.len());
            slots.push(Slot::Type(ty));
            if let TypeData::Array { length, .. } = pool.get(ty) {
                if !matches!(length, ArrayLength::Open) {
                    slots.push(Slot::Len);
                }
            }
        }
        debug_assert_eq!(index.len(), order.len());

        let struct_unions =
            number_by_name(&order, move |ty| pool.aggregate(ty).map(|a| a.name.as_str()));
        let enums = number_by_name(&order, move |ty| pool.enum_data(ty).map(|e| e.name.as_str()));

        tracing::debug!(
            types = order.len(),
            slots = slots.len(),
            struct_unions = struct_unions.len(),
            enums = enums.len(),
            "type table laid out"
        );

        Ok(Layout {
            slots,
            index,
            order,
            struct_unions,
            enums,
        })
    }
}

fn check_argument(pool: &TypePool, function: TypeId, arg: TypeId) -> RecompileResult<()> {
    match pool.get(arg) {
        TypeData::Void
        | TypeData::Primitive(_)
        | TypeData::Pointer(_)
        | TypeData::ConstPointer(_)
        | TypeData::NamedPointer { .. }
        | TypeData::StructOrUnion(_)
        | TypeData::Enum(_)
        | TypeData::FunctionPtr(_) => Ok(()),
        TypeData::Array { .. } | TypeData::RawFunction(_) => Err(RecompileError::internal(format!(
            "argument '{}' of '{}' was not decayed to a pointer",
            pool.plain_c_name(arg),
            pool.plain_c_name(function)
        ))),
    }
}

/// Dense numbering of the types `name_of` accepts, by name.
fn number_by_name<'p>(
    order: &[TypeId],
    name_of: impl Fn(TypeId) -> Option<&'p str>,
) -> AggregateIndex {
    let mut named: Vec<(&str, TypeId)> = order
        .iter()
        .filter_map(|&ty| name_of(ty).map(|name| (name, ty)))
        .collect();
    named.sort_by(|a, b| a.0.cmp(b.0));
    AggregateIndex::from_sorted(named.into_iter().map(|(_, ty)| ty).collect())
}
