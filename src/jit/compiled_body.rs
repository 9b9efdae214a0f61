use cranelift_codegen::ir::Function;
use cranelift_codegen::verify_function;
use cranelift_jit::JITModule;
use cranelift_module::{FuncId, FuncOrDataId, Module};
use tracing::debug;

use crate::function::FunctionBody;

use super::JitError;
use super::context::JitOptions;
use super::layout::{RecordBuffer, RecordLayout};
use super::value::NativeValue;

/// A function that has been built but not yet defined in its module.
pub(crate) struct BuiltFunction {
    pub id: FuncId,
    pub name: String,
    pub func: Function,
}

/// Natively compiled body of a function.
///
/// Owns the JIT module holding the generated machine code; the entry point
/// addresses stay valid until the body is dropped, which frees the code.
///
/// The entry point has the signature `(outputs: *mut R, in0, in1, ...)`,
/// where `R` is a `#[repr(C)]` record laid out as [`output_layout`], and uses
/// the host C calling convention.
///
/// [`output_layout`]: CompiledBody::output_layout
pub struct CompiledBody {
    engine: Option<JITModule>,
    entry: *const u8,
    packed_entry: *const u8,
    inputs: RecordLayout,
    outputs: RecordLayout,
}

// SAFETY: the code behind the entry pointers is immutable once finalized and
// the module is only touched again in `Drop`, which has exclusive access.
unsafe impl Send for CompiledBody {}
unsafe impl Sync for CompiledBody {}

impl CompiledBody {
    /// Verifies and defines the entry function and its packed trampoline,
    /// finalizes the module and resolves both symbols.
    pub(crate) fn from_ir(
        mut module: JITModule,
        entry: BuiltFunction,
        packed: BuiltFunction,
        inputs: RecordLayout,
        outputs: RecordLayout,
        options: &JitOptions,
    ) -> Result<Self, JitError> {
        match link(&mut module, entry, packed, options) {
            Ok((entry, packed_entry)) => Ok(CompiledBody {
                engine: Some(module),
                entry,
                packed_entry,
                inputs,
                outputs,
            }),
            Err(err) => {
                // SAFETY: nothing has been handed out from this module yet.
                unsafe { module.free_memory() };
                Err(err)
            }
        }
    }

    /// Address of the native entry point. Valid while `self` is alive.
    pub fn entry_point(&self) -> *const u8 {
        self.entry
    }

    pub fn input_layout(&self) -> &RecordLayout {
        &self.inputs
    }

    pub fn output_layout(&self) -> &RecordLayout {
        &self.outputs
    }

    /// Calls the compiled code with `args`, one per declared input, and
    /// returns one value per declared output.
    pub fn call(&self, args: &[NativeValue]) -> Result<Vec<NativeValue>, JitError> {
        let fields = self.inputs.fields();
        if args.len() != fields.len() {
            return Err(JitError::ArgumentCount {
                expected: fields.len(),
                actual: args.len(),
            });
        }
        if let Some(field) = self
            .outputs
            .fields()
            .iter()
            .find(|field| !NativeValue::supports(field.ty))
        {
            return Err(JitError::UnsupportedValueType(field.ty.to_string()));
        }

        let mut input = RecordBuffer::zeroed(&self.inputs);
        for (index, (arg, field)) in args.iter().zip(fields).enumerate() {
            if arg.ty() != field.ty {
                return Err(JitError::ArgumentType {
                    index,
                    expected: field.ty.to_string(),
                    actual: arg.ty().to_string(),
                });
            }
            arg.write_to(input.field_mut(field));
        }

        let mut output = RecordBuffer::zeroed(&self.outputs);
        // SAFETY: the trampoline was generated with exactly this signature,
        // and both buffers match the layouts it was compiled against.
        unsafe {
            let packed: unsafe extern "C" fn(*const u8, *mut u8) =
                std::mem::transmute(self.packed_entry);
            packed(input.as_ptr(), output.as_mut_ptr());
        }

        self.outputs
            .fields()
            .iter()
            .map(|field| {
                NativeValue::read_from(field.ty, output.field(field))
                    .ok_or_else(|| JitError::UnsupportedValueType(field.ty.to_string()))
            })
            .collect()
    }
}

impl FunctionBody for CompiledBody {
    fn identifier() -> &'static str {
        "Compiled Cranelift Body"
    }
}

impl Drop for CompiledBody {
    fn drop(&mut self) {
        if let Some(engine) = self.engine.take() {
            // SAFETY: the entry pointers die with `self`; borrowed pointers
            // must not outlive the body that handed them out.
            unsafe { engine.free_memory() };
        }
    }
}

fn link(
    module: &mut JITModule,
    entry: BuiltFunction,
    packed: BuiltFunction,
    options: &JitOptions,
) -> Result<(*const u8, *const u8), JitError> {
    let entry_name = entry.name.clone();
    let packed_name = packed.name.clone();
    for built in [entry, packed] {
        define(module, built, options)?;
    }
    module.finalize_definitions()?;
    Ok((resolve(module, &entry_name)?, resolve(module, &packed_name)?))
}

fn define(
    module: &mut JITModule,
    built: BuiltFunction,
    options: &JitOptions,
) -> Result<(), JitError> {
    verify_function(&built.func, module.isa()).map_err(|errors| JitError::Verifier {
        function: built.name.clone(),
        errors: errors.to_string(),
    })?;
    if options.dump_ir {
        debug!(function = %built.name, "generated IR:\n{}", built.func.display());
    }

    let mut ctx = module.make_context();
    ctx.func = built.func;
    module.define_function(built.id, &mut ctx)?;
    module.clear_context(&mut ctx);
    Ok(())
}

fn resolve(module: &JITModule, name: &str) -> Result<*const u8, JitError> {
    match module.get_name(name) {
        Some(FuncOrDataId::Func(id)) => Ok(module.get_finalized_function(id)),
        _ => Err(JitError::UnresolvedSymbol(name.to_string())),
    }
}
