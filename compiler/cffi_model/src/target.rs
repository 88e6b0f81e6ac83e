//! Target data models.
//!
//! Only consulted where the recompiler must evaluate a size in-process
//! instead of deferring it to the C compiler (anonymous enums).

use crate::Primitive;

/// Integer and pointer widths of the target platform.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DataModel {
    /// 64-bit Unix: `long` and pointers are 64-bit.
    #[default]
    Lp64,
    /// 64-bit Windows: `long` stays 32-bit.
    Llp64,
    /// 32-bit platforms.
    Ilp32,
}

impl DataModel {
    pub const fn pointer_size(self) -> usize {
        match self {
            Self::Lp64 | Self::Llp64 => 8,
            Self::Ilp32 => 4,
        }
    }

    /// Size in bytes of a primitive.
    pub const fn size_of(self, prim: Primitive) -> usize {
        match prim {
            Primitive::Bool
            | Primitive::Char
            | Primitive::SignedChar
            | Primitive::UnsignedChar
            | Primitive::Int8
            | Primitive::UInt8 => 1,
            Primitive::Short | Primitive::UnsignedShort | Primitive::Int16 | Primitive::UInt16 => 2,
            Primitive::Int
            | Primitive::UnsignedInt
            | Primitive::Int32
            | Primitive::UInt32
            | Primitive::Float => 4,
            Primitive::WChar => match self {
                Self::Llp64 => 2,
                Self::Lp64 | Self::Ilp32 => 4,
            },
            Primitive::Long | Primitive::UnsignedLong => match self {
                Self::Lp64 => 8,
                Self::Llp64 | Self::Ilp32 => 4,
            },
            Primitive::LongLong
            | Primitive::UnsignedLongLong
            | Primitive::Int64
            | Primitive::UInt64
            | Primitive::Double => 8,
            Primitive::LongDouble => match self {
                Self::Lp64 => 16,
                Self::Llp64 => 8,
                Self::Ilp32 => 12,
            },
            Primitive::IntPtr
            | Primitive::UIntPtr
            | Primitive::PtrDiff
            | Primitive::Size
            | Primitive::SSize => self.pointer_size(),
        }
    }
}
