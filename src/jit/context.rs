use std::fmt;

use cranelift_codegen::ir::types;
use cranelift_codegen::isa::{OwnedTargetIsa, TargetIsa};
use cranelift_codegen::settings::{self, Configurable};
use cranelift_jit::{JITBuilder, JITModule};

use super::JitError;

/// Cranelift optimization level for generated bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptLevel {
    #[default]
    None,
    Speed,
    SpeedAndSize,
}

impl OptLevel {
    fn as_setting(self) -> &'static str {
        match self {
            OptLevel::None => "none",
            OptLevel::Speed => "speed",
            OptLevel::SpeedAndSize => "speed_and_size",
        }
    }
}

/// Options for compiling function bodies.
#[derive(Debug, Clone)]
pub struct JitOptions {
    pub opt_level: OptLevel,
    /// Log the generated IR at debug level.
    pub dump_ir: bool,
}

impl Default for JitOptions {
    fn default() -> Self {
        Self {
            opt_level: OptLevel::None,
            dump_ir: false,
        }
    }
}

/// Code generation context for the host machine.
///
/// Holds the configured target ISA and is passed to every operation that
/// creates native code. Each compiled body gets its own JIT module built
/// from this context, so the context itself is immutable and can be shared
/// between threads.
pub struct CodegenContext {
    isa: OwnedTargetIsa,
    options: JitOptions,
}

impl CodegenContext {
    pub fn new(options: JitOptions) -> Result<Self, JitError> {
        let mut flag_builder = settings::builder();
        flag_builder.set("use_colocated_libcalls", "false")?;
        flag_builder.set("is_pic", "false")?;
        flag_builder.set("opt_level", options.opt_level.as_setting())?;
        flag_builder.set("enable_verifier", "true")?;

        let isa_builder =
            cranelift_native::builder().map_err(|e| JitError::NativeIsa(e.to_string()))?;
        let isa = isa_builder.finish(settings::Flags::new(flag_builder))?;

        Ok(Self { isa, options })
    }

    /// A context with default options.
    pub fn host() -> Result<Self, JitError> {
        Self::new(JitOptions::default())
    }

    pub fn options(&self) -> &JitOptions {
        &self.options
    }

    pub fn isa(&self) -> &dyn TargetIsa {
        &*self.isa
    }

    pub fn pointer_type(&self) -> types::Type {
        self.isa.pointer_type()
    }

    /// A fresh, empty JIT module targeting this context's ISA.
    pub(crate) fn create_module(&self) -> JITModule {
        let builder = JITBuilder::with_isa(
            self.isa.clone(),
            cranelift_module::default_libcall_names(),
        );
        JITModule::new(builder)
    }
}

impl fmt::Debug for CodegenContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodegenContext")
            .field("triple", &self.isa.triple().to_string())
            .field("options", &self.options)
            .finish()
    }
}
