//! Struct, union and enum descriptors.
//!
//! Named aggregates with a complete, non-partial layout are verified by the
//! C compiler: the decl phase writes a never-called `_cffi_checkfld_*`
//! function assigning each field to a pointer of the declared type, so a
//! mismatch with the real headers fails the build. Everything else gets its
//! layout from the C compiler through `sizeof`/`offsetof`, or from the
//! runtime when the aggregate has no C name at all.

use cffi_model::{ArrayLength, TypeData, TypeId, TypePool};

use crate::lengths::{resolved_length, LengthSite};
use crate::rows::{CtxBuilder, RowKind};
use crate::writer::CWriter;
use crate::{Op, OpCode, RecompileError, RecompileResult, StructFlags};

/// How an aggregate is spelled in generated C.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Spelling<'n> {
    /// Has a C name: sizes and offsets come from the C compiler.
    Named { cname: &'n str, approx: &'n str },
    /// No usable C name: the runtime lays the fields out itself.
    Unnamed { approx: &'n str },
}

impl Spelling<'_> {
    fn approx(self) -> String {
        match self {
            Self::Named { approx, .. } | Self::Unnamed { approx } => approx.to_owned(),
        }
    }
}

/// C name and approximate identifier of a named aggregate:
/// `struct foo_s` → `struct_foo_s`, `foo_t` → `_foo_t`.
pub(crate) fn struct_names(pool: &TypePool, ty: TypeId) -> RecompileResult<(String, String)> {
    let cname = pool.c_name(ty, "", "a C file")?;
    let approx = if cname.contains(' ') {
        cname.replace(' ', "_")
    } else {
        format!("_{cname}")
    };
    Ok((cname, approx))
}

/// Write the field check function and alignment probe of an aggregate.
///
/// Integer and bit-field members are only shifted, so integer promotion
/// does not turn a harmless width difference into an error. A field whose
/// type cannot be spelled is skipped with a comment.
pub(crate) fn write_field_check(
    pool: &TypePool,
    out: &mut CWriter,
    ty: TypeId,
    cname: &str,
    approx: &str,
) -> RecompileResult<()> {
    let Some(agg) = pool.aggregate(ty) else {
        return Err(RecompileError::configuration(format!(
            "'{}' is not a struct or union",
            pool.plain_c_name(ty)
        )));
    };
    if agg.is_opaque() {
        return Ok(());
    }
    out.line("_CFFI_UNUSED_FN");
    out.line(format!("static void _cffi_checkfld_{approx}({cname} *p)"));
    out.line("{");
    out.line("  /* only to generate compile-time warnings or errors */");
    out.line("  (void)p;");
    for field in pool.enum_fields(ty) {
        let name = &field.name;
        if pool.is_integer_primitive(field.ty) || field.bitsize.is_some() {
            out.line(format!("  (void)((p->{name}) << 1);"));
            continue;
        }
        match pool.c_name(field.ty, "*tmp", &format!("field '{name}'")) {
            Ok(decl) => out.line(format!("  {{ {decl} = &p->{name}; (void)tmp; }}")),
            Err(err) => out.line(format!("  /* {err} */")),
        }
    }
    out.line("}");
    out.line(format!(
        "struct _cffi_align_{approx} {{ char x; {cname} y; }};"
    ));
    out.newline();
    Ok(())
}

/// `$<digits>`: a nested anonymous aggregate.
fn anonymous_number(name: &str) -> Option<&str> {
    let digits = name.strip_prefix('$')?;
    (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())).then_some(digits)
}

impl CtxBuilder<'_> {
    /// The struct/union row of an aggregate, and its field block when the
    /// layout is described here.
    ///
    /// `spelling` may only be `None` for aggregates that are opaque or
    /// owned by an included unit.
    pub(crate) fn struct_ctx(
        &mut self,
        ty: TypeId,
        spelling: Option<Spelling<'_>>,
    ) -> RecompileResult<()> {
        let pool = self.session.pool;
        let Some(agg) = pool.aggregate(ty) else {
            return Err(RecompileError::configuration(format!(
                "'{}' is not a struct or union",
                pool.plain_c_name(ty)
            )));
        };
        let type_index = self.session.type_index(ty)?;

        let mut flags = StructFlags::empty();
        let mut not_expanding = None;
        if agg.is_union() {
            flags |= StructFlags::UNION;
        }
        if self.session.ffi.is_included(ty) {
            flags |= StructFlags::EXTERNAL;
            not_expanding = Some("external");
        } else {
            if agg.is_opaque() {
                not_expanding = Some("opaque");
            } else if !agg.partial && !pool.has_anonymous_struct_fields(ty) {
                flags |= StructFlags::CHECK_FIELDS;
            }
            if agg.packed {
                flags |= StructFlags::PACKED;
            }
        }

        let size_align = match not_expanding {
            Some(reason) => format!(" (size_t)-1, -1, -1, 0 /* {reason} */ }},"),
            None => {
                let spelling = spelling.ok_or_else(|| {
                    RecompileError::internal(format!(
                        "no C spelling for the layout of '{}'",
                        pool.plain_c_name(ty)
                    ))
                })?;
                let count = self.field_block(ty, spelling)?;
                match spelling {
                    Spelling::Named { cname, approx } => format!(
                        "\n    sizeof({cname}),\
                         \n    offsetof(struct _cffi_align_{approx}, y),\
                         \n    _cffi_FIELDS_FOR_{approx}, {count} }},"
                    ),
                    Spelling::Unnamed { approx } => format!(
                        " (size_t)-2, -2, /* unnamed */\
                         \n    _cffi_FIELDS_FOR_{approx}, {count} }},"
                    ),
                }
            }
        };
        self.rows.push(
            RowKind::StructUnion,
            format!(
                "  {{ \"{}\", {type_index}, {},{size_align}",
                agg.name,
                flags.as_c_expr()
            ),
        );
        self.seen_struct_unions.insert(ty);
        Ok(())
    }

    /// Push the field block of an aggregate; returns the number of fields.
    fn field_block(&mut self, ty: TypeId, spelling: Spelling<'_>) -> RecompileResult<usize> {
        let pool = self.session.pool;
        let named = matches!(spelling, Spelling::Named { .. });
        let fields = pool.enum_fields(ty);
        let mut block = vec![spelling.approx()];
        for field in &fields {
            let name = &field.name;
            let site = LengthSite::Field { owner: ty, name };
            let field_ty = resolved_length(pool, field.ty, site)?;
            let spaces = " ".repeat(name.len());
            let (code, size) = if let Some(bits) = field.bitsize {
                (OpCode::Bitfield, format!("{bits} /* bits */"))
            } else if !named || is_open_array(pool, field_ty) {
                (OpCode::Noop, "(size_t)-1".to_owned())
            } else {
                let ptr = pool.c_name(ty, "*", "a C file")?;
                (OpCode::Noop, format!("sizeof((({ptr})0)->{name})"))
            };
            let offset = if !named || field.bitsize.is_some() {
                "(size_t)-1".to_owned()
            } else {
                format!("offsetof({}, {name})", pool.c_name(ty, "", "a C file")?)
            };
            let op = Op::slot(code, self.session.type_index(field_ty)?);
            block.push(format!(
                "  {{ \"{name}\", {offset},\n     {spaces}   {size},\n     {spaces}   {} }},",
                op.as_c_expr()
            ));
        }
        self.rows.push(RowKind::Field, block.join("\n"));
        Ok(fields.len())
    }

    /// The enum row, plus one globals row per member when `members` is set.
    ///
    /// With a C name the size and signedness are left to the C compiler;
    /// otherwise the backing integer is chosen here from the member values.
    pub(crate) fn enum_ctx(
        &mut self,
        ty: TypeId,
        cname: Option<&str>,
        members: bool,
    ) -> RecompileResult<()> {
        let pool = self.session.pool;
        let Some(data) = pool.enum_data(ty) else {
            return Err(RecompileError::configuration(format!(
                "'{}' is not an enum",
                pool.plain_c_name(ty)
            )));
        };
        let type_index = self.session.type_index(ty)?;
        if members {
            let op = Op::new(OpCode::Enum, -1).as_c_expr();
            for enumerator in &data.enumerators {
                let name = &enumerator.name;
                self.rows.push(
                    RowKind::Global,
                    format!("  {{ \"{name}\", _cffi_const_{name}, {op}, 0 }},"),
                );
            }
        }
        let (size, signed) = match cname {
            Some(cname) if !cname.contains('$') => {
                (format!("sizeof({cname})"), format!("(({cname})-1) <= 0"))
            }
            _ => {
                let model = self.session.options.data_model;
                let base = pool.enum_base_int(ty, model)?;
                let unsigned = base.name().starts_with("unsigned");
                (
                    model.size_of(base).to_string(),
                    if unsigned { "0" } else { "1" }.to_owned(),
                )
            }
        };
        self.rows.push(
            RowKind::Enum,
            format!(
                "  {{ \"{}\", {type_index}, _cffi_prim_int({size}, {signed}),\n    \"{}\" }},",
                data.name,
                data.joined_names()
            ),
        );
        self.seen_enums.insert(ty);
        Ok(())
    }

    /// Rows for numbered aggregates no declaration described, which happens
    /// for aggregates without a C name.
    pub(crate) fn add_missing_struct_unions(&mut self) -> RecompileResult<()> {
        let session = self.session;
        let pool = session.pool;
        for &ty in session.table.struct_unions().as_slice() {
            if self.seen_struct_unions.contains(&ty) {
                continue;
            }
            let Some(agg) = pool.aggregate(ty) else {
                continue;
            };
            if agg.partial {
                return Err(RecompileError::internal(format!(
                    "'{}' is partial but was not seen at this point",
                    pool.plain_c_name(ty)
                )));
            }
            let approx = if let Some(digits) = anonymous_number(&agg.name) {
                digits
            } else if agg.name == "_IO_FILE" && agg.forcename.as_deref() == Some("FILE") {
                self.typename_row("FILE", ty)?;
                "FILE"
            } else {
                return Err(RecompileError::internal(format!(
                    "no descriptor row for '{}'",
                    pool.plain_c_name(ty)
                )));
            };
            self.struct_ctx(ty, Some(Spelling::Unnamed { approx }))?;
        }
        Ok(())
    }

    /// Rows for numbered enums no declaration described. Their members have
    /// no getters, so only the enum row itself is emitted.
    pub(crate) fn add_missing_enums(&mut self) -> RecompileResult<()> {
        let session = self.session;
        let pool = session.pool;
        for &ty in session.table.enums().as_slice() {
            if self.seen_enums.contains(&ty) {
                continue;
            }
            let Some(data) = pool.enum_data(ty) else {
                continue;
            };
            if data.partial || anonymous_number(&data.name).is_none() {
                return Err(RecompileError::internal(format!(
                    "no descriptor row for '{}'",
                    pool.plain_c_name(ty)
                )));
            }
            self.enum_ctx(ty, None, false)?;
        }
        Ok(())
    }
}

fn is_open_array(pool: &TypePool, ty: TypeId) -> bool {
    matches!(
        pool.get(ty),
        TypeData::Array {
            length: ArrayLength::Open,
            ..
        }
    )
}
