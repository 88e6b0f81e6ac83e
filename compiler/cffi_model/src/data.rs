//! Type node payloads stored in the pool.

use smallvec::SmallVec;

use crate::{Primitive, TypeId};

/// Length of an array type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArrayLength {
    /// `T[]`: no length at all.
    Open,
    /// `T[N]`.
    Fixed(u64),
    /// `T[...]`: the length is only known to the C compiler.
    Unresolved,
    /// A `...` length replaced by a C expression evaluating to the real length.
    Expr(String),
}

impl ArrayLength {
    /// Whether the length occupies an extra literal slot in the type table.
    #[inline]
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Fixed(_) | Self::Expr(_))
    }
}

/// Shape shared by raw functions and function pointers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionSig {
    pub args: SmallVec<[TypeId; 4]>,
    pub result: TypeId,
    pub ellipsis: bool,
}

impl FunctionSig {
    pub fn new(args: &[TypeId], result: TypeId, ellipsis: bool) -> Self {
        Self {
            args: args.iter().copied().collect(),
            result,
            ellipsis,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AggregateKind {
    Struct,
    Union,
}

impl AggregateKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Union => "union",
        }
    }
}

/// Where an aggregate node came from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum AggregateOrigin {
    /// A `struct`/`union` declaration (possibly anonymous).
    #[default]
    Declared,
    /// Placeholder for `typedef ... foo_t;`.
    UnknownType,
    /// Pointee placeholder for `typedef ... *foo_t;`.
    UnknownPtrType,
}

/// A struct or union field. `name` is empty for an anonymous nested aggregate.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub ty: TypeId,
    pub bitsize: Option<u32>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            bitsize: None,
        }
    }

    pub fn bitfield(name: impl Into<String>, ty: TypeId, bits: u32) -> Self {
        Self {
            name: name.into(),
            ty,
            bitsize: Some(bits),
        }
    }
}

/// A struct or union node.
///
/// Anonymous aggregates are named `$<n>` (nested) or `$<typedef>` with a
/// `forcename` equal to the typedef name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Aggregate {
    pub kind: AggregateKind,
    pub name: String,
    pub forcename: Option<String>,
    /// `None` while the aggregate is opaque.
    pub fields: Option<Vec<Field>>,
    /// Layout is only partially known (`...` in the declaration).
    pub partial: bool,
    pub packed: bool,
    pub origin: AggregateOrigin,
}

impl Aggregate {
    pub fn new(kind: AggregateKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            forcename: None,
            fields: None,
            partial: false,
            packed: false,
            origin: AggregateOrigin::Declared,
        }
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        self.fields.is_none()
    }

    #[inline]
    pub fn is_union(&self) -> bool {
        self.kind == AggregateKind::Union
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Enumerator {
    pub name: String,
    pub value: i128,
}

/// An enum node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumData {
    pub name: String,
    pub forcename: Option<String>,
    pub enumerators: Vec<Enumerator>,
    pub partial: bool,
}

impl EnumData {
    pub fn new(name: impl Into<String>, enumerators: Vec<Enumerator>) -> Self {
        Self {
            name: name.into(),
            forcename: None,
            enumerators,
            partial: false,
        }
    }

    /// Enumerator names joined by `,`.
    pub fn joined_names(&self) -> String {
        let names: Vec<&str> = self.enumerators.iter().map(|e| e.name.as_str()).collect();
        names.join(",")
    }
}

/// Payload of a type node.
///
/// `StructOrUnion` and `Enum` nodes are nominal; every other variant is
/// hash-consed by the pool.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Void,
    Primitive(Primitive),
    Pointer(TypeId),
    ConstPointer(TypeId),
    NamedPointer { to: TypeId, name: String },
    RawFunction(FunctionSig),
    FunctionPtr(FunctionSig),
    Array { item: TypeId, length: ArrayLength },
    StructOrUnion(Aggregate),
    Enum(EnumData),
}

impl TypeData {
    /// Whether the node is identified by handle only.
    #[inline]
    pub fn is_nominal(&self) -> bool {
        matches!(self, Self::StructOrUnion(_) | Self::Enum(_))
    }

    /// Pointee of any pointer-like node other than function pointers.
    #[inline]
    pub fn pointee(&self) -> Option<TypeId> {
        match self {
            Self::Pointer(to) | Self::ConstPointer(to) | Self::NamedPointer { to, .. } => Some(*to),
            _ => None,
        }
    }
}
