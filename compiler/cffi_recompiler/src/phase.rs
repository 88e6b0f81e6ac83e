//! Declaration walk shared by the three generation phases.
//!
//! Each declaration is visited once per phase, in `"kind name"` order:
//!
//! - **collecttype**: discover reachable types ([`crate::collect`])
//! - **decl**: write C thunks ([`crate::thunk`])
//! - **ctx**: build descriptor rows ([`crate::rows`])
//!
//! Errors raised while handling a declaration are annotated with its key.

use cffi_model::{DeclTarget, Declaration, Ffi, FunctionSig, MacroValue, TypeData, TypeId, TypePool};

use crate::table::TypeTable;
use crate::{RecompileError, RecompileResult, RecompilerOptions};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    CollectType,
    Decl,
    Ctx,
}

impl Phase {
    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::CollectType => "collecttype",
            Self::Decl => "decl",
            Self::Ctx => "ctx",
        }
    }
}

/// Run `step` on every declaration of `ffi` in key order.
pub(crate) fn each_declaration(
    ffi: &Ffi,
    phase: Phase,
    mut step: impl FnMut(&Declaration) -> RecompileResult<()>,
) -> RecompileResult<()> {
    for decl in ffi.declarations.sorted() {
        tracing::trace!(phase = phase.name(), kind = %decl.kind, name = %decl.name, "declaration");
        step(decl).map_err(|err| err.in_declaration(&decl.key()))?;
    }
    Ok(())
}

/// Read-only state shared by the phases that run after collection.
pub(crate) struct Session<'a> {
    pub ffi: &'a Ffi,
    pub pool: &'a TypePool,
    pub table: &'a TypeTable,
    pub options: &'a RecompilerOptions,
}

impl Session<'_> {
    /// Canonical slot of a type.
    #[inline]
    pub(crate) fn type_index(&self, ty: TypeId) -> RecompileResult<usize> {
        self.table.slot_of(ty)
    }
}

/// Error for a declaration kind no phase handles.
pub(crate) fn unsupported(decl: &Declaration) -> RecompileError {
    RecompileError::configuration(format!(
        "not implemented in recompile(): '{}'",
        decl.key()
    ))
}

/// The type a non-macro declaration points at.
pub(crate) fn declared_type(decl: &Declaration) -> RecompileResult<TypeId> {
    match decl.target {
        DeclTarget::Type(ty) => Ok(ty),
        DeclTarget::Macro(_) => Err(RecompileError::configuration(format!(
            "{} declaration '{}' has a macro value instead of a type",
            decl.kind, decl.name
        ))),
    }
}

/// The value of a macro declaration.
pub(crate) fn macro_value(decl: &Declaration) -> RecompileResult<MacroValue> {
    match decl.target {
        DeclTarget::Macro(value) => Ok(value),
        DeclTarget::Type(_) => Err(RecompileError::configuration(format!(
            "macro '{}' has a type instead of a value",
            decl.name
        ))),
    }
}

/// A function declaration's pointer type, raw form and signature.
pub(crate) struct FunctionDecl<'p> {
    pub ptr: TypeId,
    pub raw: TypeId,
    pub sig: &'p FunctionSig,
}

pub(crate) fn function_type<'p>(
    pool: &'p TypePool,
    decl: &Declaration,
) -> RecompileResult<FunctionDecl<'p>> {
    let ptr = declared_type(decl)?;
    let TypeData::FunctionPtr(sig) = pool.get(ptr) else {
        return Err(RecompileError::configuration(format!(
            "'{}' is not a function pointer type",
            pool.plain_c_name(ptr)
        )));
    };
    let raw = pool.raw_function_of(ptr).ok_or_else(|| {
        RecompileError::internal(format!(
            "'{}' has no raw function form",
            pool.plain_c_name(ptr)
        ))
    })?;
    Ok(FunctionDecl { ptr, raw, sig })
}
