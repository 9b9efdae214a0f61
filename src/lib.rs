pub mod function;
pub mod jit;
pub mod shared;
