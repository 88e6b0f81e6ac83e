//! Type handle.
//!
//! `TypeId` is the identity of a node in the [`TypePool`](crate::TypePool).
//! Every map in the recompiler is keyed by handle, never by shape.
//!
//! # Layout
//!
//! - Index 0 is `void`
//! - Indices 1-29 are the primitives, at the same position as their
//!   runtime tag (see [`Primitive::tag`](crate::Primitive::tag))
//! - Everything else is allocated on demand

use std::fmt;

/// A 32-bit handle into the type pool.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    /// The `void` type.
    pub const VOID: Self = Self(0);

    /// First index handed out for non-builtin nodes.
    pub const FIRST_DYNAMIC: u32 = 30;

    /// Create a handle from a raw index.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw index.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The raw index as a `usize`, for slice access.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether this handle names `void` or a primitive.
    #[inline]
    pub const fn is_builtin(self) -> bool {
        self.0 < Self::FIRST_DYNAMIC
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::VOID {
            write!(f, "TypeId::VOID")
        } else {
            write!(f, "TypeId({})", self.0)
        }
    }
}
