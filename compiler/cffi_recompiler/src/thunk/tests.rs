#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use cffi_model::{Ffi, MacroValue};

use super::*;
use crate::collect::Collector;
use crate::emit::emit_bytecode;
use crate::phase::{each_declaration, Phase};
use crate::RecompilerOptions;

/// Run collection and the decl phase, returning the thunk source.
fn thunks(ffi: &Ffi) -> RecompileResult<String> {
    let options = RecompilerOptions::new("_test");
    let mut pool = ffi.pool.clone();
    let layout = {
        let mut collector = Collector::new(ffi, &mut pool);
        each_declaration(ffi, Phase::CollectType, |decl| collector.declaration(decl))?;
        collector.layout()?
    };
    let table = emit_bytecode(&pool, layout)?;
    let session = Session {
        ffi,
        pool: &pool,
        table: &table,
        options: &options,
    };
    let mut out = CWriter::new();
    let mut decls = DeclEmitter::new(&session, &mut out);
    each_declaration(ffi, Phase::Decl, |decl| decls.declaration(decl))?;
    Ok(out.take_output())
}

#[test]
fn two_argument_function() {
    let mut ffi = Ffi::new();
    let int = ffi.pool.primitive(Primitive::Int);
    let add = ffi.pool.function_ptr(&[int, int], int, false);
    ffi.declarations.function("add", add);

    assert_eq!(
        thunks(&ffi).unwrap(),
        r#"#ifndef PYPY_VERSION
static PyObject *
_cffi_f_add(PyObject *self, PyObject *args)
{
  int x0;
  int x1;
  int result;
  PyObject *arg0;
  PyObject *arg1;

  if (!PyArg_ParseTuple(args, "OO:add", &arg0, &arg1))
    return NULL;

  x0 = _cffi_to_c_int(arg0, int);
  if (x0 == (int)-1 && PyErr_Occurred())
    return NULL;

  x1 = _cffi_to_c_int(arg1, int);
  if (x1 == (int)-1 && PyErr_Occurred())
    return NULL;

  Py_BEGIN_ALLOW_THREADS
  _cffi_restore_errno();
  { result = add(x0, x1); }
  _cffi_save_errno();
  Py_END_ALLOW_THREADS

  (void)self; /* unused */
  return _cffi_from_c_int(result, int);
}
#else
static int _cffi_f_add(int x0, int x1)
{
  int result;
  { result = add(x0, x1); }
  return result;
}
#endif

"#
    );
}

#[test]
fn pointer_argument_and_void_result() {
    let mut ffi = Ffi::new();
    let void_ptr = ffi.pool.pointer(TypeId::VOID);
    let release = ffi.pool.function_ptr(&[void_ptr], TypeId::VOID, false);
    ffi.declarations.function("release", release);

    let source = thunks(&ffi).unwrap();
    assert!(source.contains("_cffi_f_release(PyObject *self, PyObject *arg0)\n"));
    assert!(source.contains("  void * x0;\n  Py_ssize_t datasize;\n"));
    assert!(source.contains(
        "  datasize = _cffi_prepare_pointer_call_argument(\n      _cffi_type(1), arg0, (char **)&x0);\n"
    ));
    assert!(source.contains("  Py_INCREF(Py_None);\n  return Py_None;\n"));
    assert!(source.contains(
        "#else\nstatic void _cffi_f_release(void * x0)\n{\n  { release(x0); }\n}\n#endif\n"
    ));
}

#[test]
fn no_argument_function_marks_noarg_unused() {
    let mut ffi = Ffi::new();
    let double = ffi.pool.primitive(Primitive::Double);
    let now = ffi.pool.function_ptr(&[], double, false);
    ffi.declarations.function("now", now);

    let source = thunks(&ffi).unwrap();
    assert!(source.contains("_cffi_f_now(PyObject *self, PyObject *noarg)\n"));
    assert!(source.contains("  (void)noarg; /* unused */\n"));
    assert!(source.contains("  return _cffi_from_c_double(result);\n"));
    assert!(source.contains("static double _cffi_f_now(void)\n"));
}

#[test]
fn variadic_function_becomes_constant_pointer() {
    let mut ffi = Ffi::new();
    let int = ffi.pool.primitive(Primitive::Int);
    let printf = ffi.pool.function_ptr(&[int], int, true);
    ffi.declarations.function("printf", printf);

    assert_eq!(
        thunks(&ffi).unwrap(),
        "static void _cffi_const_printf(char *o)\n\
         {\n\
         \x20 *(int(* *)(int, ...))o = printf;\n\
         }\n\
         \n"
    );
}

#[test]
fn checked_macro_getter() {
    let mut ffi = Ffi::new();
    ffi.declarations.macro_("FOO", MacroValue::Int(42));
    ffi.declarations.macro_("NEG", MacroValue::Int(-1));

    let source = thunks(&ffi).unwrap();
    assert!(source.starts_with(
        "static int _cffi_const_FOO(unsigned long long *o)\n\
         {\n\
         \x20 int n = (FOO) <= 0;\n\
         \x20 *o = (unsigned long long)((FOO) << 0);  /* check that we get an integer */\n\
         \x20 if (!_cffi_check_int(*o, n, 42U))\n\
         \x20   n |= 2;\n\
         \x20 return n;\n\
         }\n"
    ));
    assert!(source.contains("  if (!_cffi_check_int(*o, n, -1))\n"));
}

#[test]
fn unchecked_macro_getter_has_no_check() {
    let mut ffi = Ffi::new();
    ffi.declarations.macro_("BAR", MacroValue::Unknown);
    let source = thunks(&ffi).unwrap();
    assert!(!source.contains("_cffi_check_int"));
}

#[test]
fn non_integer_constant_is_copied_out() {
    let mut ffi = Ffi::new();
    let double = ffi.pool.primitive(Primitive::Double);
    ffi.declarations.constant("PI", double);

    assert!(thunks(&ffi)
        .unwrap()
        .contains("static void _cffi_const_PI(char *o)\n{\n  *(double *)o = PI;\n}\n"));
}

#[test]
fn duplicate_constant_is_rejected() {
    let mut ffi = Ffi::new();
    let int = ffi.pool.primitive(Primitive::Int);
    ffi.declarations.constant("FOO", int);
    ffi.declarations.macro_("FOO", MacroValue::Unknown);

    let err = thunks(&ffi).unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(err.declaration(), Some("macro FOO"));
    assert_eq!(err.message(), "duplicate declaration of const 'FOO'");
}

#[test]
fn opaque_struct_cannot_be_returned() {
    let mut ffi = Ffi::new();
    let s = ffi.pool.declare_struct("s");
    let f = ffi.pool.function_ptr(&[], s, false);
    ffi.declarations.function("f", f);

    let err = thunks(&ffi).unwrap_err();
    assert_eq!(err.declaration(), Some("function f"));
    assert_eq!(err.message(), "'struct s' is used as result type, but is opaque");
}

#[test]
fn struct_argument_uses_generic_conversion() {
    let mut ffi = Ffi::new();
    let int = ffi.pool.primitive(Primitive::Int);
    let s = ffi.pool.declare_struct("point_s");
    ffi.pool
        .set_fields(s, vec![cffi_model::Field::new("x", int)])
        .unwrap();
    let f = ffi.pool.function_ptr(&[s], int, false);
    ffi.declarations.function("norm", f);

    let source = thunks(&ffi).unwrap();
    assert!(source.contains(
        "  if (_cffi_to_c((char *)&x0, _cffi_type(1), arg0) < 0)\n    return NULL;\n"
    ));
}
