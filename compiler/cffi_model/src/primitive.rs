//! C primitive types and their runtime tags.

use std::fmt;

/// How a primitive behaves when converted across the boundary.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PrimitiveKind {
    /// Character types (`char`, `wchar_t`).
    Char,
    /// Integer types, including `_Bool`.
    Integer,
    /// Floating point types.
    Float,
}

/// A C primitive type.
///
/// The discriminant is the runtime tag written into the type table as
/// the operand of a `PRIMITIVE` op. Tag 0 is `void`, which is not a
/// primitive in the model.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Primitive {
    Bool = 1,
    Char = 2,
    SignedChar = 3,
    UnsignedChar = 4,
    Short = 5,
    UnsignedShort = 6,
    Int = 7,
    UnsignedInt = 8,
    Long = 9,
    UnsignedLong = 10,
    LongLong = 11,
    UnsignedLongLong = 12,
    Float = 13,
    Double = 14,
    LongDouble = 15,
    WChar = 16,
    Int8 = 17,
    UInt8 = 18,
    Int16 = 19,
    UInt16 = 20,
    Int32 = 21,
    UInt32 = 22,
    Int64 = 23,
    UInt64 = 24,
    IntPtr = 25,
    UIntPtr = 26,
    PtrDiff = 27,
    Size = 28,
    SSize = 29,
}

impl Primitive {
    /// Runtime tag of `void`.
    pub const VOID_TAG: u32 = 0;

    /// Every primitive, in tag order.
    pub const ALL: [Primitive; 29] = [
        Self::Bool,
        Self::Char,
        Self::SignedChar,
        Self::UnsignedChar,
        Self::Short,
        Self::UnsignedShort,
        Self::Int,
        Self::UnsignedInt,
        Self::Long,
        Self::UnsignedLong,
        Self::LongLong,
        Self::UnsignedLongLong,
        Self::Float,
        Self::Double,
        Self::LongDouble,
        Self::WChar,
        Self::Int8,
        Self::UInt8,
        Self::Int16,
        Self::UInt16,
        Self::Int32,
        Self::UInt32,
        Self::Int64,
        Self::UInt64,
        Self::IntPtr,
        Self::UIntPtr,
        Self::PtrDiff,
        Self::Size,
        Self::SSize,
    ];

    /// Runtime tag (operand of the `PRIMITIVE` op).
    #[inline]
    pub const fn tag(self) -> u32 {
        self as u32
    }

    /// The C spelling.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "_Bool",
            Self::Char => "char",
            Self::SignedChar => "signed char",
            Self::UnsignedChar => "unsigned char",
            Self::Short => "short",
            Self::UnsignedShort => "unsigned short",
            Self::Int => "int",
            Self::UnsignedInt => "unsigned int",
            Self::Long => "long",
            Self::UnsignedLong => "unsigned long",
            Self::LongLong => "long long",
            Self::UnsignedLongLong => "unsigned long long",
            Self::Float => "float",
            Self::Double => "double",
            Self::LongDouble => "long double",
            Self::WChar => "wchar_t",
            Self::Int8 => "int8_t",
            Self::UInt8 => "uint8_t",
            Self::Int16 => "int16_t",
            Self::UInt16 => "uint16_t",
            Self::Int32 => "int32_t",
            Self::UInt32 => "uint32_t",
            Self::Int64 => "int64_t",
            Self::UInt64 => "uint64_t",
            Self::IntPtr => "intptr_t",
            Self::UIntPtr => "uintptr_t",
            Self::PtrDiff => "ptrdiff_t",
            Self::Size => "size_t",
            Self::SSize => "ssize_t",
        }
    }

    /// Look up a primitive by its C spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub const fn kind(self) -> PrimitiveKind {
        match self {
            Self::Char | Self::WChar => PrimitiveKind::Char,
            Self::Float | Self::Double | Self::LongDouble => PrimitiveKind::Float,
            _ => PrimitiveKind::Integer,
        }
    }

    #[inline]
    pub const fn is_integer(self) -> bool {
        matches!(self.kind(), PrimitiveKind::Integer)
    }

    /// Name used in runtime helper function names (`_cffi_to_c_<name>`).
    pub fn helper_suffix(self) -> String {
        self.name().replace(' ', "_")
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
