//! Descriptor rows: the ctx phase.
//!
//! Five row lists are built while walking declarations, then sorted by the
//! name each row starts with and emitted as `_cffi_<kind>s[]` arrays.
//! Struct/union and enum rows must end up at the position of their dense
//! number in the type table; [`CtxBuilder::finish`] verifies this.

use rustc_hash::FxHashSet;

use cffi_model::{AggregateOrigin, DeclKind, Declaration, TypeData, TypeId};

use crate::aggregate::{struct_names, Spelling};
use crate::lengths::{resolved_length, LengthSite};
use crate::phase::{declared_type, function_type, macro_value, unsupported, Session};
use crate::table::AggregateIndex;
use crate::{Op, OpCode, RecompileError, RecompileResult};

/// The descriptor arrays of the type context.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum RowKind {
    Global,
    Field,
    StructUnion,
    Enum,
    Typename,
}

impl RowKind {
    /// Order of the arrays in `struct _cffi_type_context_s`.
    pub(crate) const ALL: [Self; 5] = [
        Self::Global,
        Self::Field,
        Self::StructUnion,
        Self::Enum,
        Self::Typename,
    ];

    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Field => "field",
            Self::StructUnion => "struct_union",
            Self::Enum => "enum",
            Self::Typename => "typename",
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::Global => 0,
            Self::Field => 1,
            Self::StructUnion => 2,
            Self::Enum => 3,
            Self::Typename => 4,
        }
    }
}

/// Rendered rows, one list per [`RowKind`].
///
/// Field rows are grouped: each entry is the block of one aggregate,
/// headed by its approximate name until [`CtxBuilder::finish`] turns the
/// head into a `#define`.
#[derive(Debug, Default)]
pub(crate) struct Rows {
    lists: [Vec<String>; 5],
}

impl Rows {
    pub(crate) fn push(&mut self, kind: RowKind, row: String) {
        self.lists[kind.slot()].push(row);
    }

    pub(crate) fn get(&self, kind: RowKind) -> &[String] {
        &self.lists[kind.slot()]
    }
}

/// Builds descriptor rows for every declaration.
pub(crate) struct CtxBuilder<'s> {
    pub(crate) session: &'s Session<'s>,
    pub(crate) rows: Rows,
    pub(crate) seen_struct_unions: FxHashSet<TypeId>,
    pub(crate) seen_enums: FxHashSet<TypeId>,
}

impl<'s> CtxBuilder<'s> {
    pub(crate) fn new(session: &'s Session<'s>) -> Self {
        Self {
            session,
            rows: Rows::default(),
            seen_struct_unions: FxHashSet::default(),
            seen_enums: FxHashSet::default(),
        }
    }

    /// The ctx step of one declaration.
    pub(crate) fn declaration(&mut self, decl: &Declaration) -> RecompileResult<()> {
        let pool = self.session.pool;
        match decl.kind {
            DeclKind::Typedef => self.typedef(&decl.name, declared_type(decl)?),
            DeclKind::Function => {
                let function = function_type(pool, decl)?;
                if function.sig.ellipsis {
                    return self.constant(&decl.name, function.ptr);
                }
                let kind = match function.sig.args.len() {
                    0 => OpCode::CpythonBltnN,
                    1 => OpCode::CpythonBltnO,
                    _ => OpCode::CpythonBltnV,
                };
                let op = Op::slot(kind, self.session.type_index(function.raw)?);
                let name = &decl.name;
                self.rows.push(
                    RowKind::Global,
                    format!("  {{ \"{name}\", _cffi_f_{name}, {}, 0 }},", op.as_c_expr()),
                );
                Ok(())
            }
            DeclKind::Struct | DeclKind::Union => {
                let ty = declared_type(decl)?;
                let (cname, approx) = struct_names(pool, ty)?;
                self.struct_ctx(
                    ty,
                    Some(Spelling::Named {
                        cname: &cname,
                        approx: &approx,
                    }),
                )
            }
            DeclKind::Anonymous => {
                let ty = declared_type(decl)?;
                if pool.enum_data(ty).is_some() {
                    self.enum_ctx(ty, Some(&decl.name), true)
                } else {
                    let approx = format!("typedef_{}", decl.name);
                    self.struct_ctx(
                        ty,
                        Some(Spelling::Named {
                            cname: &decl.name,
                            approx: &approx,
                        }),
                    )
                }
            }
            DeclKind::Constant => self.constant(&decl.name, declared_type(decl)?),
            DeclKind::Enum => {
                let ty = declared_type(decl)?;
                let cname = pool.plain_c_name(ty);
                self.enum_ctx(ty, Some(&cname), true)
            }
            DeclKind::Macro => {
                macro_value(decl)?;
                let op = Op::new(OpCode::ConstantInt, 0);
                let name = &decl.name;
                self.rows.push(
                    RowKind::Global,
                    format!("  {{ \"{name}\", _cffi_const_{name}, {}, 0 }},", op.as_c_expr()),
                );
                Ok(())
            }
            DeclKind::Variable => self.variable(&decl.name, declared_type(decl)?),
            DeclKind::Other(_) => Err(unsupported(decl)),
        }
    }

    pub(crate) fn typename_row(&mut self, name: &str, ty: TypeId) -> RecompileResult<()> {
        let index = self.session.type_index(ty)?;
        self.rows
            .push(RowKind::Typename, format!("  {{ \"{name}\", {index} }},"));
        Ok(())
    }

    /// A typedef row, plus a struct row for the opaque aggregate behind
    /// `typedef ... foo_t;` or `typedef ... *foo_t;` when nothing else
    /// describes it.
    fn typedef(&mut self, name: &str, ty: TypeId) -> RecompileResult<()> {
        self.typename_row(name, ty)?;
        let pool = self.session.pool;
        let hidden = match pool.get(ty) {
            TypeData::StructOrUnion(agg) if agg.origin == AggregateOrigin::UnknownType => Some(ty),
            TypeData::NamedPointer { to, .. } => Some(*to),
            _ => None,
        };
        let Some(hidden) = hidden else {
            return Ok(());
        };
        let Some(agg) = pool.aggregate(hidden) else {
            return Ok(());
        };
        let expanded = !agg.is_opaque() && !self.session.ffi.is_included(hidden);
        if expanded || self.seen_struct_unions.contains(&hidden) {
            return Ok(());
        }
        self.struct_ctx(hidden, None)
    }

    fn constant(&mut self, name: &str, ty: TypeId) -> RecompileResult<()> {
        let op = if self.session.pool.is_integer_primitive(ty) {
            Op::new(OpCode::ConstantInt, 0)
        } else {
            Op::slot(OpCode::Constant, self.session.type_index(ty)?)
        };
        self.rows.push(
            RowKind::Global,
            format!("  {{ \"{name}\", _cffi_const_{name}, {}, 0 }},", op.as_c_expr()),
        );
        Ok(())
    }

    fn variable(&mut self, name: &str, ty: TypeId) -> RecompileResult<()> {
        let pool = self.session.pool;
        let ty = resolved_length(pool, ty, LengthSite::Global(name))?;
        let op = Op::slot(OpCode::GlobalVar, self.session.type_index(ty)?);
        let size = if pool.sizeof_enabled(ty) {
            format!("sizeof({name})")
        } else {
            "0".to_owned()
        };
        self.rows.push(
            RowKind::Global,
            format!("  {{ \"{name}\", &{name}, {}, {size} }},", op.as_c_expr()),
        );
        Ok(())
    }

    /// Synthesize rows for aggregates, sort every list and check the
    /// struct/enum rows against their dense numbers.
    pub(crate) fn finish(mut self) -> RecompileResult<Rows> {
        self.add_missing_struct_unions()?;
        self.add_missing_enums()?;
        let mut rows = self.rows;
        for list in &mut rows.lists {
            list.sort();
        }
        fix_final_field_list(&mut rows.lists[RowKind::Field.slot()]);

        let table = self.session.table;
        let pool = self.session.pool;
        check_numbering(
            rows.get(RowKind::StructUnion),
            table.struct_unions(),
            move |ty| pool.aggregate(ty).map(|a| a.name.as_str()),
            "struct/union",
        )?;
        check_numbering(
            rows.get(RowKind::Enum),
            table.enums(),
            move |ty| pool.enum_data(ty).map(|e| e.name.as_str()),
            "enum",
        )?;
        Ok(rows)
    }
}

/// Replace the head of each field block with the `#define` of its start
/// offset in the shared field array.
fn fix_final_field_list(blocks: &mut [String]) {
    let mut count = 0;
    for block in blocks {
        let head = block.find('\n').unwrap_or(block.len());
        let (approx, rest) = block.split_at(head);
        let fixed = format!("#define _cffi_FIELDS_FOR_{approx}  {count}{rest}");
        count += fixed.matches("\n  { \"").count();
        *block = fixed;
    }
}

fn check_numbering<'p>(
    rows: &[String],
    index: &AggregateIndex,
    name_of: impl Fn(TypeId) -> Option<&'p str>,
    what: &str,
) -> RecompileResult<()> {
    if rows.len() != index.len() {
        return Err(RecompileError::internal(format!(
            "{} {what} rows for {} numbered {what}s",
            rows.len(),
            index.len()
        )));
    }
    for (i, (&ty, row)) in index.as_slice().iter().zip(rows).enumerate() {
        let name = name_of(ty).unwrap_or_default();
        if !row.starts_with(&format!("  {{ \"{name}\"")) {
            return Err(RecompileError::internal(format!(
                "{what} row {i} does not describe '{name}'"
            )));
        }
    }
    Ok(())
}
