//! The type table instruction set.
//!
//! Each slot of `_cffi_types` holds one [`Op`]: an opcode in the low bits
//! and an operand (usually another slot index) above it, packed by the
//! `_CFFI_OP` macro of the runtime header. Array lengths occupy a slot of
//! their own as a bare literal.

use std::fmt;

/// Opcodes understood by the runtime loader.
///
/// Values are odd so a packed op can never be mistaken for an aligned
/// pointer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    Primitive = 1,
    Pointer = 3,
    Array = 5,
    OpenArray = 7,
    StructUnion = 9,
    Enum = 11,
    Function = 13,
    FunctionEnd = 15,
    Noop = 17,
    Bitfield = 19,
    Typename = 21,
    CpythonBltnV = 23,
    CpythonBltnN = 25,
    CpythonBltnO = 27,
    Constant = 29,
    ConstantInt = 31,
    GlobalVar = 33,
}

impl OpCode {
    /// Numeric value in the packed representation.
    #[inline]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Name without the `_CFFI_OP_` prefix.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Primitive => "PRIMITIVE",
            Self::Pointer => "POINTER",
            Self::Array => "ARRAY",
            Self::OpenArray => "OPEN_ARRAY",
            Self::StructUnion => "STRUCT_UNION",
            Self::Enum => "ENUM",
            Self::Function => "FUNCTION",
            Self::FunctionEnd => "FUNCTION_END",
            Self::Noop => "NOOP",
            Self::Bitfield => "BITFIELD",
            Self::Typename => "TYPENAME",
            Self::CpythonBltnV => "CPYTHON_BLTN_V",
            Self::CpythonBltnN => "CPYTHON_BLTN_N",
            Self::CpythonBltnO => "CPYTHON_BLTN_O",
            Self::Constant => "CONSTANT",
            Self::ConstantInt => "CONSTANT_INT",
            Self::GlobalVar => "GLOBAL_VAR",
        }
    }
}

/// One slot of the type table, or the type operand of a descriptor row.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    Code { code: OpCode, arg: i64 },
    /// A bare value, e.g. the length following an `ARRAY` op.
    Literal(String),
}

impl Op {
    #[inline]
    pub const fn new(code: OpCode, arg: i64) -> Self {
        Self::Code { code, arg }
    }

    /// An op whose operand is a slot or descriptor index.
    pub fn slot(code: OpCode, index: usize) -> Self {
        Self::new(code, i64::try_from(index).unwrap_or(i64::MAX))
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    pub fn code(&self) -> Option<OpCode> {
        match self {
            Self::Code { code, .. } => Some(*code),
            Self::Literal(_) => None,
        }
    }

    /// C initializer for this slot.
    pub fn as_c_expr(&self) -> String {
        match self {
            Self::Code { code, arg } => format!("_CFFI_OP(_CFFI_OP_{}, {arg})", code.name()),
            Self::Literal(value) => format!("(_cffi_opcode_t)({value})"),
        }
    }
}

/// Debug form: `(FUNCTION 3)`, `(None 100)`.
impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code { code, arg } => write!(f, "({} {arg})", code.name()),
            Self::Literal(value) => write!(f, "(None {value})"),
        }
    }
}
