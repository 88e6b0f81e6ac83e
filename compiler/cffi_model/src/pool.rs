//! Arena of C type nodes.
//!
//! Non-nominal nodes (pointers, arrays, function shapes) are hash-consed:
//! building the same shape twice returns the same handle. Struct, union and
//! enum nodes are always allocated fresh, so two field-identical declarations
//! stay distinct.

use rustc_hash::FxHashMap;

use crate::data::{Aggregate, AggregateKind, AggregateOrigin, EnumData, Field, FunctionSig};
use crate::{ArrayLength, ModelError, Primitive, TypeData, TypeId};

mod format;
mod query;

/// Storage for every type node of one interface model.
#[derive(Clone, Debug)]
pub struct TypePool {
    /// Node payloads, indexed by `TypeId`.
    types: Vec<TypeData>,
    /// Deduplication map for non-nominal nodes.
    map: FxHashMap<TypeData, TypeId>,
    /// Raw-function form of every function pointer.
    raw_of: FxHashMap<TypeId, TypeId>,
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}

impl TypePool {
    /// Create a pool with `void` and every primitive pre-interned.
    pub fn new() -> Self {
        let mut pool = Self {
            types: Vec::with_capacity(128),
            map: FxHashMap::default(),
            raw_of: FxHashMap::default(),
        };
        pool.push_interned(TypeData::Void);
        for prim in Primitive::ALL {
            let id = pool.push_interned(TypeData::Primitive(prim));
            debug_assert_eq!(id.raw(), prim.tag());
        }
        pool
    }

    #[allow(clippy::cast_possible_truncation)]
    fn push(&mut self, data: TypeData) -> TypeId {
        let id = TypeId::from_raw(self.types.len() as u32);
        self.types.push(data);
        id
    }

    fn push_interned(&mut self, data: TypeData) -> TypeId {
        let id = self.push(data.clone());
        self.map.insert(data, id);
        id
    }

    fn intern(&mut self, data: TypeData) -> TypeId {
        debug_assert!(!data.is_nominal());
        if let Some(&id) = self.map.get(&data) {
            return id;
        }
        self.push_interned(data)
    }

    /// Number of nodes, builtins included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Payload of a node.
    ///
    /// # Panics
    /// Panics if `id` was not created by this pool.
    #[inline]
    pub fn get(&self, id: TypeId) -> &TypeData {
        &self.types[id.index()]
    }

    /// Handle of an existing non-nominal node, without creating it.
    pub fn find(&self, data: &TypeData) -> Option<TypeId> {
        self.map.get(data).copied()
    }

    // === Builtins ===

    #[inline]
    pub const fn void(&self) -> TypeId {
        TypeId::VOID
    }

    #[inline]
    pub const fn primitive(&self, prim: Primitive) -> TypeId {
        TypeId::from_raw(prim.tag())
    }

    // === Derived nodes ===

    pub fn pointer(&mut self, to: TypeId) -> TypeId {
        self.intern(TypeData::Pointer(to))
    }

    pub fn const_pointer(&mut self, to: TypeId) -> TypeId {
        self.intern(TypeData::ConstPointer(to))
    }

    /// Pointer introduced by a typedef, spelled by the typedef name.
    pub fn named_pointer(&mut self, to: TypeId, name: impl Into<String>) -> TypeId {
        self.intern(TypeData::NamedPointer {
            to,
            name: name.into(),
        })
    }

    pub fn array(&mut self, item: TypeId, length: ArrayLength) -> TypeId {
        self.intern(TypeData::Array { item, length })
    }

    pub fn raw_function(&mut self, args: &[TypeId], result: TypeId, ellipsis: bool) -> TypeId {
        self.intern(TypeData::RawFunction(FunctionSig::new(args, result, ellipsis)))
    }

    /// Function pointer; its raw-function form is interned alongside.
    pub fn function_ptr(&mut self, args: &[TypeId], result: TypeId, ellipsis: bool) -> TypeId {
        let raw = self.raw_function(args, result, ellipsis);
        let ptr = self.intern(TypeData::FunctionPtr(FunctionSig::new(
            args, result, ellipsis,
        )));
        self.raw_of.insert(ptr, raw);
        ptr
    }

    /// Raw-function form of a function pointer (or of a raw function itself).
    pub fn raw_function_of(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            TypeData::RawFunction(_) => Some(id),
            TypeData::FunctionPtr(_) => self.raw_of.get(&id).copied(),
            _ => None,
        }
    }

    /// Same array item with a different length.
    pub fn with_array_length(
        &mut self,
        array: TypeId,
        length: ArrayLength,
    ) -> Result<TypeId, ModelError> {
        match self.get(array) {
            TypeData::Array { item, .. } => {
                let item = *item;
                Ok(self.array(item, length))
            }
            _ => Err(ModelError::UnexpectedNode {
                name: self.plain_c_name(array),
                expected: "an array",
            }),
        }
    }

    // === Nominal nodes ===

    /// Allocate a struct or union node.
    pub fn add_aggregate(&mut self, aggregate: Aggregate) -> TypeId {
        self.push(TypeData::StructOrUnion(aggregate))
    }

    /// Allocate an opaque `struct <name>`; complete it with [`Self::set_fields`].
    pub fn declare_struct(&mut self, name: impl Into<String>) -> TypeId {
        self.add_aggregate(Aggregate::new(AggregateKind::Struct, name))
    }

    /// Allocate an opaque `union <name>`.
    pub fn declare_union(&mut self, name: impl Into<String>) -> TypeId {
        self.add_aggregate(Aggregate::new(AggregateKind::Union, name))
    }

    /// The placeholder for `typedef ... <name>;`.
    pub fn unknown_type(&mut self, name: &str) -> TypeId {
        let mut agg = Aggregate::new(AggregateKind::Struct, name);
        agg.forcename = Some(name.to_owned());
        agg.origin = AggregateOrigin::UnknownType;
        self.add_aggregate(agg)
    }

    /// The named pointer for `typedef ... *<name>;`.
    pub fn unknown_ptr_type(&mut self, name: &str) -> TypeId {
        let mut agg = Aggregate::new(AggregateKind::Struct, format!("${name}"));
        agg.origin = AggregateOrigin::UnknownPtrType;
        let pointee = self.add_aggregate(agg);
        self.named_pointer(pointee, name)
    }

    /// Give an aggregate its field list, making it non-opaque.
    pub fn set_fields(&mut self, id: TypeId, fields: Vec<Field>) -> Result<(), ModelError> {
        let agg = self.aggregate_mut(id)?;
        agg.fields = Some(fields);
        Ok(())
    }

    pub fn aggregate_mut(&mut self, id: TypeId) -> Result<&mut Aggregate, ModelError> {
        const EXPECTED: &str = "a struct or union";
        if self.aggregate(id).is_none() {
            return Err(ModelError::UnexpectedNode {
                name: self.plain_c_name(id),
                expected: EXPECTED,
            });
        }
        match &mut self.types[id.index()] {
            TypeData::StructOrUnion(agg) => Ok(agg),
            _ => Err(ModelError::UnexpectedNode {
                name: String::new(),
                expected: EXPECTED,
            }),
        }
    }

    pub fn add_enum(&mut self, data: EnumData) -> TypeId {
        self.push(TypeData::Enum(data))
    }

    // === Accessors ===

    pub fn aggregate(&self, id: TypeId) -> Option<&Aggregate> {
        match self.get(id) {
            TypeData::StructOrUnion(agg) => Some(agg),
            _ => None,
        }
    }

    pub fn enum_data(&self, id: TypeId) -> Option<&EnumData> {
        match self.get(id) {
            TypeData::Enum(data) => Some(data),
            _ => None,
        }
    }
}
