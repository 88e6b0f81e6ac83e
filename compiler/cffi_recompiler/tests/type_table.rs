//! Type table layout for small interfaces.
//!
//! Each case builds the model a parser would produce for a one-line C
//! declaration and compares the table in `(OPCODE arg)` debug form.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use cffi_model::{
    Aggregate, AggregateKind, ArrayLength, EnumData, Enumerator, Ffi, Field, Primitive, TypeId,
};
use cffi_recompiler::{Recompiler, RecompilerOptions};

fn table_of(ffi: &Ffi) -> String {
    Recompiler::new(ffi, RecompilerOptions::new("testmod"))
        .collect_type_table()
        .unwrap()
        .debug_string()
}

/// `<result> <name>(<args>);`
fn function(ffi: &mut Ffi, name: &str, args: &[TypeId], result: TypeId) {
    let ptr = ffi.pool.function_ptr(args, result, false);
    ffi.declarations.function(name, ptr);
}

fn prim(ffi: &Ffi, p: Primitive) -> TypeId {
    ffi.pool.primitive(p)
}

// === Functions ===

#[test]
fn function_tables() {
    let mut ffi = Ffi::new();
    let double = prim(&ffi, Primitive::Double);
    function(&mut ffi, "sin", &[double], double);
    assert_eq!(table_of(&ffi), "(FUNCTION 1)(PRIMITIVE 14)(FUNCTION_END 0)");

    let mut ffi = Ffi::new();
    let (double, float) = (prim(&ffi, Primitive::Double), prim(&ffi, Primitive::Float));
    function(&mut ffi, "sin", &[double], float);
    assert_eq!(
        table_of(&ffi),
        "(FUNCTION 3)(PRIMITIVE 14)(FUNCTION_END 0)(PRIMITIVE 13)"
    );

    let mut ffi = Ffi::new();
    let float = prim(&ffi, Primitive::Float);
    function(&mut ffi, "sin", &[], float);
    assert_eq!(table_of(&ffi), "(FUNCTION 2)(FUNCTION_END 0)(PRIMITIVE 13)");
}

#[test]
fn identical_signatures_share_one_region() {
    let mut ffi = Ffi::new();
    let (double, float) = (prim(&ffi, Primitive::Double), prim(&ffi, Primitive::Float));
    function(&mut ffi, "sin", &[float], double);
    function(&mut ffi, "cos", &[float], double);
    assert_eq!(
        table_of(&ffi),
        "(FUNCTION 3)(PRIMITIVE 13)(FUNCTION_END 0)(PRIMITIVE 14)"
    );
}

#[test]
fn regions_are_ordered_by_signature() {
    let mut ffi = Ffi::new();
    let (double, float) = (prim(&ffi, Primitive::Double), prim(&ffi, Primitive::Float));
    function(&mut ffi, "sin", &[float], double);
    function(&mut ffi, "cos", &[double], double);
    assert_eq!(
        table_of(&ffi),
        "(FUNCTION 1)(PRIMITIVE 14)(FUNCTION_END 0)(FUNCTION 1)(PRIMITIVE 13)(FUNCTION_END 0)"
    );

    let mut ffi = Ffi::new();
    let (double, float) = (prim(&ffi, Primitive::Double), prim(&ffi, Primitive::Float));
    function(&mut ffi, "sin", &[double], float);
    function(&mut ffi, "cos", &[float], float);
    assert_eq!(
        table_of(&ffi),
        "(FUNCTION 4)(PRIMITIVE 14)(FUNCTION_END 0)(FUNCTION 4)(PRIMITIVE 13)(FUNCTION_END 0)"
    );
}

#[test]
fn repeated_pointer_arguments_use_noop() {
    let mut ffi = Ffi::new();
    let double = prim(&ffi, Primitive::Double);
    let ptr = ffi.pool.pointer(double);
    function(&mut ffi, "sin", &[ptr, ptr], double);
    assert_eq!(
        table_of(&ffi),
        "(FUNCTION 4)(POINTER 4)(NOOP 1)(FUNCTION_END 0)(PRIMITIVE 14)"
    );

    let mut ffi = Ffi::new();
    let double = prim(&ffi, Primitive::Double);
    let ptr = ffi.pool.pointer(double);
    function(&mut ffi, "sin", &[ptr, ptr, double], double);
    assert_eq!(
        table_of(&ffi),
        "(FUNCTION 3)(POINTER 3)(NOOP 1)(PRIMITIVE 14)(FUNCTION_END 0)"
    );
}

#[test]
fn repeated_primitive_arguments_are_inlined() {
    let mut ffi = Ffi::new();
    let double = prim(&ffi, Primitive::Double);
    function(&mut ffi, "sin", &[double, double], double);
    assert_eq!(
        table_of(&ffi),
        "(FUNCTION 1)(PRIMITIVE 14)(PRIMITIVE 14)(FUNCTION_END 0)"
    );
}

#[test]
fn function_pointer_argument() {
    // int sin(double(float)): the argument decays to double(*)(float).
    let mut ffi = Ffi::new();
    let (double, float, int) = (
        prim(&ffi, Primitive::Double),
        prim(&ffi, Primitive::Float),
        prim(&ffi, Primitive::Int),
    );
    let callback = ffi.pool.function_ptr(&[float], double, false);
    function(&mut ffi, "sin", &[callback], int);
    assert_eq!(
        table_of(&ffi),
        "(FUNCTION 6)(PRIMITIVE 13)(FUNCTION_END 0)\
         (FUNCTION 7)(POINTER 0)(FUNCTION_END 0)\
         (PRIMITIVE 14)(PRIMITIVE 7)"
    );
}

#[test]
fn variadic_function() {
    let mut ffi = Ffi::new();
    let int = prim(&ffi, Primitive::Int);
    let ptr = ffi.pool.function_ptr(&[int], int, true);
    ffi.declarations.function("sin", ptr);
    assert_eq!(
        table_of(&ffi),
        "(FUNCTION 1)(PRIMITIVE 7)(FUNCTION_END 1)(POINTER 0)"
    );
}

#[test]
fn prebuilt_integer_typedef() {
    let mut ffi = Ffi::new();
    let int32 = prim(&ffi, Primitive::Int32);
    function(&mut ffi, "f", &[], int32);
    assert_eq!(table_of(&ffi), "(FUNCTION 2)(FUNCTION_END 0)(PRIMITIVE 21)");
}

// === Data ===

#[test]
fn fixed_array() {
    let mut ffi = Ffi::new();
    let int = prim(&ffi, Primitive::Int);
    let arr = ffi.pool.array(int, ArrayLength::Fixed(100));
    ffi.declarations.variable("a", arr);
    assert_eq!(table_of(&ffi), "(PRIMITIVE 7)(ARRAY 0)(None 100)");
}

#[test]
fn open_array() {
    let mut ffi = Ffi::new();
    let int = prim(&ffi, Primitive::Int);
    let arr = ffi.pool.array(int, ArrayLength::Open);
    ffi.declarations.variable("a", arr);
    assert_eq!(table_of(&ffi), "(PRIMITIVE 7)(OPEN_ARRAY 0)");
}

#[test]
fn typedef_of_primitive() {
    let mut ffi = Ffi::new();
    let int = prim(&ffi, Primitive::Int);
    ffi.declarations.typedef("foo_t", int);
    assert_eq!(table_of(&ffi), "(PRIMITIVE 7)");
}

// === Aggregates ===

#[test]
fn opaque_struct() {
    let mut ffi = Ffi::new();
    let s = ffi.pool.declare_struct("foo_s");
    ffi.declarations.struct_("foo_s", s);
    assert_eq!(table_of(&ffi), "(STRUCT_UNION 0)");
}

#[test]
fn complete_struct_and_union() {
    for kind in [AggregateKind::Struct, AggregateKind::Union] {
        let mut ffi = Ffi::new();
        let (int, long) = (prim(&ffi, Primitive::Int), prim(&ffi, Primitive::Long));
        let mut agg = Aggregate::new(kind, "foo");
        agg.fields = Some(vec![Field::new("a", int), Field::new("b", long)]);
        let ty = ffi.pool.add_aggregate(agg);
        ffi.declarations.push(cffi_model::Declaration::new(
            cffi_model::DeclKind::parse(kind.keyword()),
            "foo",
            ty,
        ));
        assert_eq!(table_of(&ffi), "(PRIMITIVE 7)(PRIMITIVE 9)(STRUCT_UNION 0)");
    }
}

#[test]
fn struct_used_through_pointer() {
    let mut ffi = Ffi::new();
    let (int, long) = (prim(&ffi, Primitive::Int), prim(&ffi, Primitive::Long));
    let s = ffi.pool.declare_struct("foo_s");
    ffi.pool
        .set_fields(s, vec![Field::new("a", int), Field::new("b", long)])
        .unwrap();
    ffi.declarations.struct_("foo_s", s);
    let ptr = ffi.pool.pointer(s);
    function(&mut ffi, "f", &[ptr], int);
    assert_eq!(
        table_of(&ffi),
        "(FUNCTION 3)(POINTER 5)(FUNCTION_END 0)(PRIMITIVE 7)(PRIMITIVE 9)(STRUCT_UNION 0)"
    );
}

#[test]
fn anonymous_struct_with_typedef() {
    let mut ffi = Ffi::new();
    let (int, long) = (prim(&ffi, Primitive::Int), prim(&ffi, Primitive::Long));
    let mut agg = Aggregate::new(AggregateKind::Struct, "$foo_t");
    agg.forcename = Some("foo_t".into());
    agg.fields = Some(vec![Field::new("a", int), Field::new("b", long)]);
    let ty = ffi.pool.add_aggregate(agg);
    ffi.declarations.anonymous("foo_t", ty);
    assert_eq!(table_of(&ffi), "(STRUCT_UNION 0)(PRIMITIVE 7)(PRIMITIVE 9)");
}

#[test]
fn partial_enum() {
    let mut ffi = Ffi::new();
    let mut data = EnumData::new(
        "foo_e",
        vec![
            Enumerator {
                name: "AA".into(),
                value: 0,
            },
            Enumerator {
                name: "BB".into(),
                value: 1,
            },
        ],
    );
    data.partial = true;
    let e = ffi.pool.add_enum(data);
    ffi.declarations.enum_("foo_e", e);
    assert_eq!(table_of(&ffi), "(ENUM 0)");
}

// === Included units ===

#[test]
fn included_typedef_is_just_its_type() {
    // typedef double foo_t; lives in the included unit.
    let mut ffi = Ffi::new();
    let double = prim(&ffi, Primitive::Double);
    function(&mut ffi, "sin", &[double], double);
    assert_eq!(table_of(&ffi), "(FUNCTION 1)(PRIMITIVE 14)(FUNCTION_END 0)");
}

#[test]
fn included_struct_fields_are_not_collected() {
    let mut ffi = Ffi::new();
    let int = prim(&ffi, Primitive::Int);
    let s = ffi.pool.declare_struct("foo_s");
    ffi.pool
        .set_fields(s, vec![Field::new("x", int), Field::new("y", int)])
        .unwrap();
    ffi.mark_included(s);
    let ptr = ffi.pool.pointer(s);
    function(&mut ffi, "sin", &[ptr], ptr);
    assert_eq!(
        table_of(&ffi),
        "(FUNCTION 1)(POINTER 3)(FUNCTION_END 0)(STRUCT_UNION 0)"
    );
}

// === Errors ===

#[test]
fn dotdotdot_length_outside_global_or_field() {
    let mut ffi = Ffi::new();
    let int = prim(&ffi, Primitive::Int);
    let arr = ffi.pool.array(int, ArrayLength::Unresolved);
    ffi.declarations.typedef("foo_t", arr);

    let err = Recompiler::new(&ffi, RecompilerOptions::new("testmod"))
        .collect_type_table()
        .map(|_| ())
        .unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(
        err.message(),
        "type <int[...]> badly placed: the '...' array length can only be used \
         on global arrays or on fields of structures"
    );
}
