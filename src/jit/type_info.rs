use cranelift_codegen::ir::types;

use crate::function::{SharedType, Type};

use super::context::CodegenContext;

/// Cranelift metadata attached to a [`Type`] as an extension. Tells the
/// compiler which native type represents values of that type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CraneliftTypeInfo {
    /// A fixed scalar type such as `i32` or `f64`.
    Scalar(types::Type),
    /// An integer as wide as a pointer on the target.
    Pointer,
}

impl CraneliftTypeInfo {
    pub fn native_type(&self, ctx: &CodegenContext) -> types::Type {
        match self {
            CraneliftTypeInfo::Scalar(ty) => *ty,
            CraneliftTypeInfo::Pointer => ctx.pointer_type(),
        }
    }
}

/// A shared type named `name` carrying `info`.
pub fn native_type(name: &str, info: CraneliftTypeInfo) -> SharedType {
    Type::new(name).with_extension(info).into_shared()
}
