use cranelift_codegen::ir::types;

/// A scalar passed to or returned from a packed call of a compiled body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NativeValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl NativeValue {
    pub fn ty(&self) -> types::Type {
        match self {
            NativeValue::I8(_) => types::I8,
            NativeValue::I16(_) => types::I16,
            NativeValue::I32(_) => types::I32,
            NativeValue::I64(_) => types::I64,
            NativeValue::F32(_) => types::F32,
            NativeValue::F64(_) => types::F64,
        }
    }

    /// Whether values of `ty` can travel through a packed call.
    pub fn supports(ty: types::Type) -> bool {
        [types::I8, types::I16, types::I32, types::I64, types::F32, types::F64].contains(&ty)
    }

    /// Writes the native-endian bytes into `out`, which is exactly
    /// `self.ty().bytes()` long.
    pub(crate) fn write_to(&self, out: &mut [u8]) {
        match self {
            NativeValue::I8(v) => out.copy_from_slice(&v.to_ne_bytes()),
            NativeValue::I16(v) => out.copy_from_slice(&v.to_ne_bytes()),
            NativeValue::I32(v) => out.copy_from_slice(&v.to_ne_bytes()),
            NativeValue::I64(v) => out.copy_from_slice(&v.to_ne_bytes()),
            NativeValue::F32(v) => out.copy_from_slice(&v.to_ne_bytes()),
            NativeValue::F64(v) => out.copy_from_slice(&v.to_ne_bytes()),
        }
    }

    pub(crate) fn read_from(ty: types::Type, bytes: &[u8]) -> Option<Self> {
        let value = match ty {
            types::I8 => NativeValue::I8(i8::from_ne_bytes(bytes.try_into().ok()?)),
            types::I16 => NativeValue::I16(i16::from_ne_bytes(bytes.try_into().ok()?)),
            types::I32 => NativeValue::I32(i32::from_ne_bytes(bytes.try_into().ok()?)),
            types::I64 => NativeValue::I64(i64::from_ne_bytes(bytes.try_into().ok()?)),
            types::F32 => NativeValue::F32(f32::from_ne_bytes(bytes.try_into().ok()?)),
            types::F64 => NativeValue::F64(f64::from_ne_bytes(bytes.try_into().ok()?)),
            _ => return None,
        };
        Some(value)
    }
}

impl From<i8> for NativeValue {
    fn from(value: i8) -> Self {
        NativeValue::I8(value)
    }
}

impl From<i16> for NativeValue {
    fn from(value: i16) -> Self {
        NativeValue::I16(value)
    }
}

impl From<i32> for NativeValue {
    fn from(value: i32) -> Self {
        NativeValue::I32(value)
    }
}

impl From<i64> for NativeValue {
    fn from(value: i64) -> Self {
        NativeValue::I64(value)
    }
}

impl From<f32> for NativeValue {
    fn from(value: f32) -> Self {
        NativeValue::F32(value)
    }
}

impl From<f64> for NativeValue {
    fn from(value: f64) -> Self {
        NativeValue::F64(value)
    }
}
