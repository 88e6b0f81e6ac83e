#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;

#[test]
fn empty_renders_zero() {
    assert_eq!(StructFlags::empty().as_c_expr(), "0");
}

#[test]
fn flags_render_in_fixed_order() {
    let flags = StructFlags::PACKED | StructFlags::CHECK_FIELDS | StructFlags::UNION;
    assert_eq!(
        flags.as_c_expr(),
        "_CFFI_F_UNION|_CFFI_F_CHECK_FIELDS|_CFFI_F_PACKED"
    );
    assert_eq!(
        (StructFlags::EXTERNAL | StructFlags::UNION).as_c_expr(),
        "_CFFI_F_UNION|_CFFI_F_EXTERNAL"
    );
}
