//! Property tests over randomly shaped interfaces.
//!
//! 1. Determinism: compiling the same model twice gives identical source
//! 2. Index totality: every type a declaration reaches has a slot
//! 3. Raw-function inlining: K distinct argument types cost 2+K slots
//! 4. Numbering: struct/union numbers follow name order

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use proptest::prelude::*;

use cffi_model::{ArrayLength, Ffi, Field, Primitive, TypeId};
use cffi_recompiler::{Recompiler, RecompilerOptions};

/// How a generated argument or field wraps its primitive.
#[derive(Clone, Debug)]
enum Shape {
    Plain,
    Pointer,
    Array(u64),
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    prop_oneof![
        Just(Shape::Plain),
        Just(Shape::Pointer),
        (1u64..64).prop_map(Shape::Array),
    ]
}

fn primitive_strategy() -> impl Strategy<Value = Primitive> {
    prop::sample::select(Primitive::ALL.to_vec())
}

/// One function: arguments, result and variadic flag.
type FunctionSpec = (Vec<(Primitive, Shape)>, Primitive, bool);

fn function_strategy() -> impl Strategy<Value = FunctionSpec> {
    (
        prop::collection::vec((primitive_strategy(), shape_strategy()), 0..5),
        primitive_strategy(),
        any::<bool>(),
    )
}

/// Struct names drawn from a small pool so ties are common.
fn struct_strategy() -> impl Strategy<Value = (String, Vec<(Primitive, Shape)>)> {
    (
        prop::string::string_regex("[a-c]{1,3}_s").expect("valid regex"),
        prop::collection::vec((primitive_strategy(), shape_strategy()), 0..4),
    )
}

fn shaped(ffi: &mut Ffi, prim: Primitive, shape: &Shape, as_argument: bool) -> TypeId {
    let base = ffi.pool.primitive(prim);
    match shape {
        Shape::Plain => base,
        // Arrays decay to pointers in argument position.
        Shape::Array(_) if as_argument => ffi.pool.pointer(base),
        Shape::Pointer => ffi.pool.pointer(base),
        Shape::Array(n) => ffi.pool.array(base, ArrayLength::Fixed(*n)),
    }
}

fn build(functions: &[FunctionSpec], structs: &[(String, Vec<(Primitive, Shape)>)]) -> Ffi {
    let mut ffi = Ffi::new();
    for (i, (args, result, variadic)) in functions.iter().enumerate() {
        let args: Vec<TypeId> = args
            .iter()
            .map(|(prim, shape)| shaped(&mut ffi, *prim, shape, true))
            .collect();
        let result = ffi.pool.primitive(*result);
        let ptr = ffi.pool.function_ptr(&args, result, *variadic);
        ffi.declarations.function(&format!("f{i}"), ptr);
    }
    for (name, fields) in structs {
        let fields: Vec<Field> = fields
            .iter()
            .enumerate()
            .map(|(i, (prim, shape))| Field::new(format!("m{i}"), shaped(&mut ffi, *prim, shape, false)))
            .collect();
        let s = ffi.pool.declare_struct(name.clone());
        ffi.pool.set_fields(s, fields).unwrap();
        ffi.declarations.struct_(name, s);
    }
    ffi
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn generation_is_deterministic(
        functions in prop::collection::vec(function_strategy(), 0..6),
        structs in prop::collection::vec(struct_strategy(), 0..3),
    ) {
        // Same-named structs would be a duplicate declaration.
        let mut structs = structs;
        structs.sort_by(|a, b| a.0.cmp(&b.0));
        structs.dedup_by(|a, b| a.0 == b.0);
        let ffi = build(&functions, &structs);

        let options = RecompilerOptions::new("_prop");
        let first = Recompiler::new(&ffi, options.clone()).generate().unwrap();
        let second = Recompiler::new(&ffi, options).generate().unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn every_reachable_type_has_a_slot(
        functions in prop::collection::vec(function_strategy(), 1..6),
    ) {
        let ffi = build(&functions, &[]);
        let mut recompiler = Recompiler::new(&ffi, RecompilerOptions::new("_prop"));
        let table = recompiler.collect_type_table().unwrap();

        for decl in ffi.declarations.iter() {
            let ptr = decl.ty().unwrap();
            let raw = ffi.pool.raw_function_of(ptr).unwrap();
            prop_assert!(table.index_of(raw).is_some());
            for child in ffi.pool.type_children(raw) {
                prop_assert!(table.index_of(child).is_some());
                for grandchild in ffi.pool.type_children(child) {
                    prop_assert!(table.index_of(grandchild).is_some());
                }
            }
        }
        // Every slot owned by a type is unique.
        let owned = table.canonical_types().into_iter().flatten().count();
        prop_assert_eq!(owned, table.type_count());
    }

    #[test]
    fn distinct_arguments_cost_one_slot_each(
        args in prop::sample::subsequence(Primitive::ALL.to_vec(), 0..8),
    ) {
        let mut ffi = Ffi::new();
        let args: Vec<TypeId> = args.iter().map(|&p| ffi.pool.primitive(p)).collect();
        let ptr = ffi.pool.function_ptr(&args, TypeId::VOID, false);
        ffi.declarations.function("f", ptr);

        let mut recompiler = Recompiler::new(&ffi, RecompilerOptions::new("_prop"));
        let table = recompiler.collect_type_table().unwrap();
        // FUNCTION, one slot per argument, FUNCTION_END, then void.
        prop_assert_eq!(table.len(), 2 + args.len() + 1);
        for (i, arg) in args.iter().enumerate() {
            prop_assert_eq!(table.index_of(*arg), Some(i + 1));
        }
    }

    #[test]
    fn struct_numbers_follow_names(
        structs in prop::collection::vec(struct_strategy(), 1..6),
    ) {
        let mut structs = structs;
        structs.sort_by(|a, b| a.0.cmp(&b.0));
        structs.dedup_by(|a, b| a.0 == b.0);
        let ffi = build(&[], &structs);

        let mut recompiler = Recompiler::new(&ffi, RecompilerOptions::new("_prop"));
        let table = recompiler.collect_type_table().unwrap();
        let names: Vec<String> = table
            .struct_unions()
            .as_slice()
            .iter()
            .map(|&ty| ffi.pool.aggregate(ty).unwrap().name.clone())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        prop_assert_eq!(&names, &sorted);
        prop_assert_eq!(names.len(), structs.len());
    }
}
