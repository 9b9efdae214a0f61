use std::fmt;

use cranelift_codegen::ir::types;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    pub ty: types::Type,
    pub offset: u32,
}

/// Memory layout of a record holding one value per slot, laid out like a
/// `#[repr(C)]` struct with the same field types in the same order.
///
/// Compiled bodies return their outputs through a record of this layout, and
/// packed calls pass their inputs in one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    fields: Vec<FieldLayout>,
    size: u32,
    align: u32,
}

impl RecordLayout {
    pub fn new(slot_types: &[types::Type]) -> Self {
        let mut fields = Vec::with_capacity(slot_types.len());
        let mut offset = 0u32;
        let mut align = 1u32;
        for &ty in slot_types {
            let field_align = ty.bytes().max(1);
            offset = offset.next_multiple_of(field_align);
            fields.push(FieldLayout { ty, offset });
            offset += ty.bytes();
            align = align.max(field_align);
        }
        Self {
            fields,
            size: offset.next_multiple_of(align),
            align,
        }
    }

    pub fn fields(&self) -> &[FieldLayout] {
        &self.fields
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn align(&self) -> u32 {
        self.align
    }
}

impl fmt::Display for RecordLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {} @{}", field.ty, field.offset)?;
        }
        write!(f, " }} size={} align={}", self.size, self.align)
    }
}

/// Zeroed, 8-byte aligned storage for one record.
pub(crate) struct RecordBuffer {
    words: Vec<u64>,
}

impl RecordBuffer {
    pub(crate) fn zeroed(layout: &RecordLayout) -> Self {
        Self {
            words: vec![0; (layout.size() as usize).div_ceil(8)],
        }
    }

    fn bytes(&self) -> &[u8] {
        // SAFETY: any initialized u64 storage is valid as bytes.
        unsafe { std::slice::from_raw_parts(self.words.as_ptr().cast(), self.words.len() * 8) }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as above; every byte pattern is a valid u64.
        unsafe {
            std::slice::from_raw_parts_mut(self.words.as_mut_ptr().cast(), self.words.len() * 8)
        }
    }

    pub(crate) fn field(&self, field: &FieldLayout) -> &[u8] {
        let start = field.offset as usize;
        &self.bytes()[start..start + field.ty.bytes() as usize]
    }

    pub(crate) fn field_mut(&mut self, field: &FieldLayout) -> &mut [u8] {
        let start = field.offset as usize;
        &mut self.bytes_mut()[start..start + field.ty.bytes() as usize]
    }

    pub(crate) fn as_ptr(&self) -> *const u8 {
        self.words.as_ptr().cast()
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut u8 {
        self.words.as_mut_ptr().cast()
    }
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;
