//! Struct/union descriptor flags.
//!
//! Rendered into the third column of `_cffi_struct_unions` rows as the
//! `_CFFI_F_*` macros of the runtime header.

use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct StructFlags: u8 {
        /// The aggregate is a union.
        const UNION = 1 << 0;
        /// The C compiler verified every field type.
        const CHECK_FIELDS = 1 << 1;
        /// Declared packed; alignment is not computed.
        const PACKED = 1 << 2;
        /// Owned by an included unit; no layout here.
        const EXTERNAL = 1 << 3;
    }
}

/// Render order of the flag macros.
const C_NAMES: [(StructFlags, &str); 4] = [
    (StructFlags::UNION, "_CFFI_F_UNION"),
    (StructFlags::CHECK_FIELDS, "_CFFI_F_CHECK_FIELDS"),
    (StructFlags::PACKED, "_CFFI_F_PACKED"),
    (StructFlags::EXTERNAL, "_CFFI_F_EXTERNAL"),
];

impl StructFlags {
    /// `_CFFI_F_UNION|_CFFI_F_EXTERNAL`, or `0` when empty.
    pub fn as_c_expr(self) -> String {
        let names: Vec<&str> = C_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            "0".to_owned()
        } else {
            names.join("|")
        }
    }
}

#[cfg(test)]
mod tests;
