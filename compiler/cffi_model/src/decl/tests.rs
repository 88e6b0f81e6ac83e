#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;

#[test]
fn kind_parse_roundtrip() {
    for kind in [
        "typedef",
        "function",
        "struct",
        "union",
        "anonymous",
        "constant",
        "enum",
        "macro",
        "variable",
    ] {
        assert_eq!(DeclKind::parse(kind).as_str(), kind);
    }
    assert_eq!(
        DeclKind::parse("extern_python"),
        DeclKind::Other("extern_python".into())
    );
}

#[test]
fn sorted_by_key_string() {
    let mut decls = Declarations::new();
    decls.variable("b", TypeId::VOID);
    decls.function("z", TypeId::VOID);
    decls.function("a", TypeId::VOID);
    decls.anonymous("t", TypeId::VOID);
    let keys: Vec<String> = decls.sorted().iter().map(|d| d.key()).collect();
    assert_eq!(
        keys,
        vec!["anonymous t", "function a", "function z", "variable b"]
    );
}

#[test]
fn duplicates_are_kept_in_order() {
    let mut decls = Declarations::new();
    decls.macro_("FOO", MacroValue::Int(1));
    decls.macro_("FOO", MacroValue::Unknown);
    let sorted = decls.sorted();
    assert_eq!(sorted.len(), 2);
    assert_eq!(sorted[0].target, DeclTarget::Macro(MacroValue::Int(1)));
    assert_eq!(sorted[1].target, DeclTarget::Macro(MacroValue::Unknown));
}

#[test]
fn macro_has_no_type() {
    let mut decls = Declarations::new();
    decls.macro_("FOO", MacroValue::Unknown);
    decls.typedef("foo_t", TypeId::VOID);
    let tys: Vec<Option<TypeId>> = decls.iter().map(Declaration::ty).collect();
    assert_eq!(tys, vec![None, Some(TypeId::VOID)]);
}
