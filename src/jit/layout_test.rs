use cranelift_codegen::ir::types;

use crate::jit::layout::{RecordBuffer, RecordLayout};

#[allow(dead_code)]
#[repr(C)]
struct Mixed {
    a: i8,
    b: f64,
    c: i32,
}

#[test]
fn layout_matches_repr_c() {
    let layout = RecordLayout::new(&[types::I8, types::F64, types::I32]);
    assert_eq!(layout.size() as usize, std::mem::size_of::<Mixed>());
    assert_eq!(layout.align() as usize, std::mem::align_of::<Mixed>());
    insta::assert_snapshot!(layout.to_string(), @"{ i8 @0, f64 @8, i32 @16 } size=24 align=8");
}

#[test]
fn empty_layout_has_no_size() {
    let layout = RecordLayout::new(&[]);
    assert!(layout.fields().is_empty());
    insta::assert_snapshot!(layout.to_string(), @"{ } size=0 align=1");
}

#[test]
fn buffer_fields_are_disjoint() {
    let layout = RecordLayout::new(&[types::I32, types::I32]);
    let mut buffer = RecordBuffer::zeroed(&layout);
    buffer.field_mut(&layout.fields()[1]).copy_from_slice(&7i32.to_ne_bytes());
    assert_eq!(buffer.field(&layout.fields()[0]), &[0, 0, 0, 0]);
    assert_eq!(buffer.field(&layout.fields()[1]), &7i32.to_ne_bytes());
}
