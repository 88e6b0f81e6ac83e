//! C thunks: the decl phase.
//!
//! Each non-variadic function gets two bodies behind `#ifndef PYPY_VERSION`:
//! a reflective wrapper that converts Python arguments, calls the function
//! with the GIL released and errno preserved, and converts the result back;
//! and a direct wrapper with the native signature. Constants, enum members
//! and macros get getter functions; variadic functions are exposed as
//! constant function pointers.

use rustc_hash::FxHashSet;

use cffi_model::{DeclKind, Declaration, FunctionSig, MacroValue, Primitive, TypeData, TypeId};

use crate::aggregate::{struct_names, write_field_check};
use crate::phase::{declared_type, function_type, macro_value, unsupported, Session};
use crate::writer::CWriter;
use crate::{RecompileError, RecompileResult};

/// Writes thunks for every declaration.
pub(crate) struct DeclEmitter<'s, 'w> {
    session: &'s Session<'s>,
    out: &'w mut CWriter,
    /// Getter names already emitted.
    constants: FxHashSet<String>,
}

impl<'s, 'w> DeclEmitter<'s, 'w> {
    pub(crate) fn new(session: &'s Session<'s>, out: &'w mut CWriter) -> Self {
        Self {
            session,
            out,
            constants: FxHashSet::default(),
        }
    }

    /// The decl step of one declaration.
    pub(crate) fn declaration(&mut self, decl: &Declaration) -> RecompileResult<()> {
        let pool = self.session.pool;
        match decl.kind {
            DeclKind::Typedef | DeclKind::Variable => {
                declared_type(decl)?;
                Ok(())
            }
            DeclKind::Function => {
                let function = function_type(pool, decl)?;
                if function.sig.ellipsis {
                    self.constant(&decl.name, function.ptr)
                } else {
                    self.function(&decl.name, function.sig)
                }
            }
            DeclKind::Struct | DeclKind::Union => {
                let ty = declared_type(decl)?;
                let (cname, approx) = struct_names(pool, ty)?;
                write_field_check(pool, self.out, ty, &cname, &approx)
            }
            DeclKind::Anonymous => {
                let ty = declared_type(decl)?;
                if pool.enum_data(ty).is_some() {
                    self.enum_members(ty)
                } else {
                    let approx = format!("typedef_{}", decl.name);
                    write_field_check(pool, self.out, ty, &decl.name, &approx)
                }
            }
            DeclKind::Constant => self.constant(&decl.name, declared_type(decl)?),
            DeclKind::Enum => self.enum_members(declared_type(decl)?),
            DeclKind::Macro => {
                let check = match macro_value(decl)? {
                    MacroValue::Unknown => None,
                    MacroValue::Int(value) => Some(value),
                };
                self.int_getter(&decl.name, check)
            }
            DeclKind::Other(_) => Err(unsupported(decl)),
        }
    }

    // === Constants ===

    fn register(&mut self, name: &str) -> RecompileResult<()> {
        if self.constants.insert(name.to_owned()) {
            Ok(())
        } else {
            Err(RecompileError::configuration(format!(
                "duplicate declaration of const '{name}'"
            )))
        }
    }

    fn constant(&mut self, name: &str, ty: TypeId) -> RecompileResult<()> {
        if self.session.pool.is_integer_primitive(ty) {
            self.int_getter(name, None)
        } else {
            self.value_getter(name, ty)
        }
    }

    fn enum_members(&mut self, ty: TypeId) -> RecompileResult<()> {
        let pool = self.session.pool;
        let Some(data) = pool.enum_data(ty) else {
            return Err(RecompileError::configuration(format!(
                "'{}' is not an enum",
                pool.plain_c_name(ty)
            )));
        };
        for enumerator in &data.enumerators {
            self.int_getter(&enumerator.name, None)?;
        }
        Ok(())
    }

    /// Getter storing an integer constant; returns its sign in bit 0 and,
    /// when `check` is given, a mismatch with the headers in bit 1.
    fn int_getter(&mut self, name: &str, check: Option<i128>) -> RecompileResult<()> {
        self.register(name)?;
        let out = &mut *self.out;
        out.line(format!("static int _cffi_const_{name}(unsigned long long *o)"));
        out.line("{");
        out.line(format!("  int n = ({name}) <= 0;"));
        out.line(format!(
            "  *o = (unsigned long long)(({name}) << 0);  /* check that we get an integer */"
        ));
        if let Some(value) = check {
            let value = if value > 0 {
                format!("{value}U")
            } else {
                value.to_string()
            };
            out.line(format!("  if (!_cffi_check_int(*o, n, {value}))"));
            out.line("    n |= 2;");
        }
        out.line("  return n;");
        out.line("}");
        out.newline();
        Ok(())
    }

    /// Getter copying a non-integer constant into a caller buffer.
    fn value_getter(&mut self, name: &str, ty: TypeId) -> RecompileResult<()> {
        self.register(name)?;
        let ptr = self.session.pool.c_name(ty, "*", "a C file")?;
        let out = &mut *self.out;
        out.line(format!("static void _cffi_const_{name}(char *o)"));
        out.line("{");
        out.line(format!("  *({ptr})o = {name};"));
        out.line("}");
        out.newline();
        Ok(())
    }

    // === Functions ===

    fn function(&mut self, name: &str, sig: &FunctionSig) -> RecompileResult<()> {
        let session = self.session;
        let pool = session.pool;
        let argc = sig.args.len();
        let argname = match argc {
            0 => "noarg",
            1 => "arg0",
            _ => "args",
        };

        let context = format!("argument of {name}");
        let arguments = sig
            .args
            .iter()
            .enumerate()
            .map(|(i, &arg)| pool.c_name(arg, &format!(" x{i}"), &context))
            .collect::<Result<Vec<_>, _>>()?;
        let result_decl = if sig.result == TypeId::VOID {
            None
        } else {
            let context = format!("result of {name}");
            Some(format!("  {};", pool.c_name(sig.result, " result", &context)?))
        };
        let call_args: Vec<String> = (0..argc).map(|i| format!("x{i}")).collect();
        let call = format!(
            "  {{ {}{name}({}); }}",
            if result_decl.is_some() { "result = " } else { "" },
            call_args.join(", ")
        );

        let out = &mut *self.out;
        out.line("#ifndef PYPY_VERSION");
        out.line("static PyObject *");
        out.line(format!("_cffi_f_{name}(PyObject *self, PyObject *{argname})"));
        out.line("{");
        for arg in &arguments {
            out.line(format!("  {arg};"));
        }
        if sig.args.iter().any(|&arg| is_data_pointer(session, arg)) {
            out.line("  Py_ssize_t datasize;");
        }
        if let Some(decl) = &result_decl {
            out.line(decl);
        }
        if argc > 1 {
            for i in 0..argc {
                out.line(format!("  PyObject *arg{i};"));
            }
            out.newline();
            let refs: Vec<String> = (0..argc).map(|i| format!("&arg{i}")).collect();
            out.line(format!(
                "  if (!PyArg_ParseTuple(args, \"{}:{name}\", {}))",
                "O".repeat(argc),
                refs.join(", ")
            ));
            out.line("    return NULL;");
        }
        out.newline();

        for (i, &arg) in sig.args.iter().enumerate() {
            convert_arg_to_c(session, out, arg, &format!("arg{i}"), &format!("x{i}"))?;
            out.newline();
        }

        out.line("  Py_BEGIN_ALLOW_THREADS");
        out.line("  _cffi_restore_errno();");
        out.line(&call);
        out.line("  _cffi_save_errno();");
        out.line("  Py_END_ALLOW_THREADS");
        out.newline();

        out.line("  (void)self; /* unused */");
        if argc == 0 {
            out.line("  (void)noarg; /* unused */");
        }
        if result_decl.is_some() {
            let converted = convert_expr_from_c(session, sig.result, "result", "result type")?;
            out.line(format!("  return {converted};"));
        } else {
            out.line("  Py_INCREF(Py_None);");
            out.line("  return Py_None;");
        }
        out.line("}");

        out.line("#else");
        let params = if arguments.is_empty() {
            "void".to_owned()
        } else {
            arguments.join(", ")
        };
        let head = pool.c_name(sig.result, &format!("_cffi_f_{name}({params})"), "a C file")?;
        out.line(format!("static {head}"));
        out.line("{");
        if let Some(decl) = &result_decl {
            out.line(decl);
        }
        out.line(&call);
        if result_decl.is_some() {
            out.line("  return result;");
        }
        out.line("}");
        out.line("#endif");
        out.newline();
        Ok(())
    }
}

/// Pointer arguments, which may need a scratch buffer.
fn is_data_pointer(session: &Session<'_>, ty: TypeId) -> bool {
    session.pool.get(ty).pointee().is_some()
}

/// Decode Python object `from` into C variable `to`, returning `NULL` from
/// the thunk on failure.
fn convert_arg_to_c(
    session: &Session<'_>,
    out: &mut CWriter,
    ty: TypeId,
    from: &str,
    to: &str,
) -> RecompileResult<()> {
    const ERRCODE: &str = "return NULL";
    let pool = session.pool;
    let (converter, extra, cname, errvalue) = match pool.get(ty) {
        TypeData::Primitive(prim) => {
            let (converter, extra) = if prim.is_integer() && *prim != Primitive::Bool {
                ("_cffi_to_c_int".to_owned(), format!(", {}", prim.name()))
            } else {
                (
                    format!("({})_cffi_to_c_{}", prim.name(), prim.helper_suffix()),
                    String::new(),
                )
            };
            (converter, extra, prim.name().to_owned(), "-1")
        }
        TypeData::Pointer(_) | TypeData::ConstPointer(_) | TypeData::NamedPointer { .. } => {
            let index = session.type_index(ty)?;
            out.line("  datasize = _cffi_prepare_pointer_call_argument(");
            out.line(format!("      _cffi_type({index}), {from}, (char **)&{to});"));
            out.line("  if (datasize != 0) {");
            out.line("    if (datasize < 0)");
            out.line(format!("      {ERRCODE};"));
            out.line(format!("    {to} = alloca((size_t)datasize);"));
            out.line(format!("    memset((void *){to}, 0, (size_t)datasize);"));
            out.line(format!(
                "    if (_cffi_convert_array_from_object((char *){to}, _cffi_type({index}), {from}) < 0)"
            ));
            out.line(format!("      {ERRCODE};"));
            out.line("  }");
            return Ok(());
        }
        TypeData::StructOrUnion(_) | TypeData::Enum(_) => {
            let index = session.type_index(ty)?;
            out.line(format!(
                "  if (_cffi_to_c((char *)&{to}, _cffi_type({index}), {from}) < 0)"
            ));
            out.line(format!("    {ERRCODE};"));
            return Ok(());
        }
        TypeData::FunctionPtr(_) => {
            let cname = pool.c_name(ty, "", "a C file")?;
            let index = session.type_index(ty)?;
            (
                format!("({cname})_cffi_to_c_pointer"),
                format!(", _cffi_type({index})"),
                cname,
                "NULL",
            )
        }
        TypeData::Void | TypeData::RawFunction(_) | TypeData::Array { .. } => {
            return Err(RecompileError::configuration(format!(
                "cannot pass '{}' as a function argument",
                pool.plain_c_name(ty)
            )))
        }
    };
    out.line(format!("  {to} = {converter}({from}{extra});"));
    out.line(format!(
        "  if ({to} == ({cname}){errvalue} && PyErr_Occurred())"
    ));
    out.line(format!("    {ERRCODE};"));
    Ok(())
}

/// C expression turning C value `var` into a new Python reference.
fn convert_expr_from_c(
    session: &Session<'_>,
    ty: TypeId,
    var: &str,
    context: &str,
) -> RecompileResult<String> {
    let pool = session.pool;
    Ok(match pool.get(ty) {
        TypeData::Primitive(prim) if prim.is_integer() => {
            format!("_cffi_from_c_int({var}, {})", prim.name())
        }
        TypeData::Primitive(Primitive::LongDouble) | TypeData::Enum(_) => format!(
            "_cffi_from_c_deref((char *)&{var}, _cffi_type({}))",
            session.type_index(ty)?
        ),
        TypeData::Primitive(prim) => format!("_cffi_from_c_{}({var})", prim.helper_suffix()),
        TypeData::Pointer(_)
        | TypeData::ConstPointer(_)
        | TypeData::NamedPointer { .. }
        | TypeData::FunctionPtr(_) => format!(
            "_cffi_from_c_pointer((char *){var}, _cffi_type({}))",
            session.type_index(ty)?
        ),
        TypeData::Array { item, .. } => {
            let ptr = pool.find(&TypeData::Pointer(*item)).ok_or_else(|| {
                RecompileError::internal(format!(
                    "no pointer type to decay '{}' into",
                    pool.plain_c_name(ty)
                ))
            })?;
            format!(
                "_cffi_from_c_pointer((char *){var}, _cffi_type({}))",
                session.type_index(ptr)?
            )
        }
        TypeData::StructOrUnion(agg) => {
            if agg.is_opaque() {
                return Err(RecompileError::configuration(format!(
                    "'{}' is used as {context}, but is opaque",
                    pool.plain_c_name(ty)
                )));
            }
            format!(
                "_cffi_from_c_struct((char *)&{var}, _cffi_type({}))",
                session.type_index(ty)?
            )
        }
        TypeData::Void | TypeData::RawFunction(_) => {
            return Err(RecompileError::configuration(format!(
                "cannot return '{}' from a function",
                pool.plain_c_name(ty)
            )))
        }
    })
}

#[cfg(test)]
mod tests;
