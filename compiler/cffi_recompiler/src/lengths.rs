//! Concretizing `...` array lengths.
//!
//! `T[...]` is only legal where the C compiler can tell the real length:
//! on a global (`_cffi_array_len(name)`) or on a struct field
//! (`_cffi_array_len(((struct s *)0)->f)`). The collector interns the
//! resolved node; later phases look the same node up again.

use cffi_model::{ArrayLength, TypeData, TypeId, TypePool};

use crate::{RecompileError, RecompileResult};

/// Where a `...`-length array is declared.
#[derive(Copy, Clone, Debug)]
pub(crate) enum LengthSite<'a> {
    Global(&'a str),
    Field { owner: TypeId, name: &'a str },
}

impl LengthSite<'_> {
    fn length_expr(self, pool: &TypePool) -> RecompileResult<String> {
        match self {
            Self::Global(name) => Ok(format!("_cffi_array_len({name})")),
            Self::Field { owner, name } => {
                let ptr = pool.c_name(owner, "*", "a C file")?;
                Ok(format!("_cffi_array_len((({ptr})0)->{name})"))
            }
        }
    }
}

fn unresolved_item(pool: &TypePool, ty: TypeId) -> Option<TypeId> {
    match pool.get(ty) {
        TypeData::Array {
            item,
            length: ArrayLength::Unresolved,
        } => Some(*item),
        _ => None,
    }
}

/// `ty` with a `...` length replaced, creating the node if needed.
pub(crate) fn resolve_length(
    pool: &mut TypePool,
    ty: TypeId,
    site: LengthSite<'_>,
) -> RecompileResult<TypeId> {
    if unresolved_item(pool, ty).is_none() {
        return Ok(ty);
    }
    let expr = site.length_expr(pool)?;
    Ok(pool.with_array_length(ty, ArrayLength::Expr(expr))?)
}

/// `ty` with a `...` length replaced by the node interned during collection.
pub(crate) fn resolved_length(
    pool: &TypePool,
    ty: TypeId,
    site: LengthSite<'_>,
) -> RecompileResult<TypeId> {
    let Some(item) = unresolved_item(pool, ty) else {
        return Ok(ty);
    };
    let length = ArrayLength::Expr(site.length_expr(pool)?);
    pool.find(&TypeData::Array { item, length }).ok_or_else(|| {
        RecompileError::internal(format!(
            "array length of '{}' was not resolved during collection",
            pool.plain_c_name(ty)
        ))
    })
}
