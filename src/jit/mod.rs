//! Cranelift JIT backend for function bodies.
//!
//! A [`Function`](crate::function::Function) carrying a [`CraneliftGenBody`]
//! can be compiled into a [`CompiledBody`]: a finalized JIT module plus the
//! address of its native entry point. [`CompilationCache::ensure_compiled`]
//! does this lazily and at most once per function.

pub mod cache;
pub mod compiled_body;
pub mod compiler;
pub mod context;
pub mod gen_body;
pub mod layout;
pub mod type_info;
pub mod value;

use cranelift_codegen::CodegenError;
use cranelift_codegen::settings::SetError;
use cranelift_module::ModuleError;

pub use cache::{CacheStats, CompilationCache, CompileStatus, try_ensure_compiled};
pub use compiled_body::CompiledBody;
pub use compiler::compile_body;
pub use context::{CodegenContext, JitOptions, OptLevel};
pub use gen_body::{CraneliftGenBody, IrGenerator};
pub use layout::{FieldLayout, RecordLayout};
pub use type_info::{CraneliftTypeInfo, native_type};
pub use value::NativeValue;

#[derive(Debug, thiserror::Error)]
pub enum JitError {
    #[error("native ISA error: {0}")]
    NativeIsa(String),
    #[error("invalid codegen setting: {0}")]
    Setting(#[from] SetError),
    #[error("failed to build target ISA: {0}")]
    Isa(#[from] CodegenError),
    #[error("Cranelift module error: {0}")]
    Module(#[from] ModuleError),
    #[error("generated IR for `{function}` failed verification:\n{errors}")]
    Verifier { function: String, errors: String },
    #[error("{direction} `{slot}` of `{function}` has type `{ty}` without Cranelift type info")]
    MissingTypeInfo {
        function: String,
        direction: &'static str,
        slot: String,
        ty: String,
    },
    #[error("output {index} of `{function}` is {actual}, but the signature declares {expected}")]
    OutputType {
        function: String,
        index: usize,
        expected: String,
        actual: String,
    },
    #[error("symbol `{0}` could not be resolved after finalizing")]
    UnresolvedSymbol(String),
    #[error("expected {expected} arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },
    #[error("argument {index} is {actual}, expected {expected}")]
    ArgumentType {
        index: usize,
        expected: String,
        actual: String,
    },
    #[error("values of type {0} cannot be passed through a packed call")]
    UnsupportedValueType(String),
}
