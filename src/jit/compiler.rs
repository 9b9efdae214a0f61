//! Function → Cranelift IR → native code.

use cranelift_codegen::ir::{
    AbiParam, Function as IrFunction, InstBuilder, MemFlags, UserFuncName, types,
};
use cranelift_frontend::{FunctionBuilder, FunctionBuilderContext};
use cranelift_jit::JITModule;
use cranelift_module::{Linkage, Module};
use tracing::debug;

use crate::function::Function;

use super::JitError;
use super::compiled_body::{BuiltFunction, CompiledBody};
use super::context::CodegenContext;
use super::gen_body::CraneliftGenBody;
use super::layout::RecordLayout;
use super::type_info::CraneliftTypeInfo;

/// Builds a native body for `function` from its attached IR generator.
///
/// # Panics
/// If `function` has no [`CraneliftGenBody`], or the generator produces a
/// different number of outputs than the signature declares. Both are
/// contract violations of the caller or the generator.
pub fn compile_body(
    function: &Function,
    ctx: &CodegenContext,
) -> Result<CompiledBody, JitError> {
    let input_types = slot_types(function, ctx, SlotKind::Input)?;
    let output_types = slot_types(function, ctx, SlotKind::Output)?;
    let input_layout = RecordLayout::new(&input_types);
    let output_layout = RecordLayout::new(&output_types);

    let Some(gen_body) = function.body::<CraneliftGenBody>() else {
        panic!("`{}` has no IR generating body to compile", function.name());
    };

    debug!(
        function = function.name(),
        inputs = input_types.len(),
        outputs = output_types.len(),
        "compiling function body"
    );

    let mut module = ctx.create_module();
    let mut builder_ctx = FunctionBuilderContext::new();
    let ptr_type = module.isa().pointer_type();

    // entry signature: (outputs: ptr, in0, in1, ...) -> ()
    let mut sig = module.make_signature();
    sig.params.push(AbiParam::new(ptr_type));
    for ty in &input_types {
        sig.params.push(AbiParam::new(*ty));
    }

    let entry_name = entry_symbol(function.name());
    let entry_id = module.declare_function(&entry_name, Linkage::Export, &sig)?;
    let mut func = IrFunction::with_name_signature(UserFuncName::user(0, entry_id.as_u32()), sig);

    {
        let mut builder = FunctionBuilder::new(&mut func, &mut builder_ctx);
        let entry_block = builder.create_block();
        builder.append_block_params_for_function_params(entry_block);
        builder.switch_to_block(entry_block);
        builder.seal_block(entry_block);

        let params = builder.block_params(entry_block).to_vec();
        let out_ptr = params[0];
        let input_values = &params[1..];

        let mut output_values = Vec::with_capacity(output_types.len());
        gen_body.build_ir(&mut builder, input_values, &mut output_values);
        assert_eq!(
            output_values.len(),
            output_types.len(),
            "IR generator of `{}` produced the wrong number of outputs",
            function.name()
        );

        let slots = output_values.iter().zip(output_layout.fields());
        for (index, (value, field)) in slots.enumerate() {
            let actual = builder.func.dfg.value_type(*value);
            if actual != field.ty {
                return Err(JitError::OutputType {
                    function: function.name().to_string(),
                    index,
                    expected: field.ty.to_string(),
                    actual: actual.to_string(),
                });
            }
            builder
                .ins()
                .store(MemFlags::trusted(), *value, out_ptr, field.offset as i32);
        }
        builder.ins().return_(&[]);
        builder.finalize();
    }

    let entry = BuiltFunction {
        id: entry_id,
        name: entry_name,
        func,
    };
    let packed = build_packed_trampoline(&mut module, &mut builder_ctx, &entry, &input_layout)?;

    let body = CompiledBody::from_ir(
        module,
        entry,
        packed,
        input_layout,
        output_layout,
        ctx.options(),
    )?;
    debug!(function = function.name(), "function body compiled");
    Ok(body)
}

#[derive(Debug, Clone, Copy)]
enum SlotKind {
    Input,
    Output,
}

impl SlotKind {
    fn label(self) -> &'static str {
        match self {
            SlotKind::Input => "input",
            SlotKind::Output => "output",
        }
    }
}

/// Native types of every input or output slot, in declared order.
fn slot_types(
    function: &Function,
    ctx: &CodegenContext,
    kind: SlotKind,
) -> Result<Vec<types::Type>, JitError> {
    let signature = function.signature();
    let (infos, slots): (Vec<Option<&CraneliftTypeInfo>>, Vec<(&str, &str)>) = match kind {
        SlotKind::Input => (
            signature.input_extensions::<CraneliftTypeInfo>(),
            signature
                .inputs()
                .iter()
                .map(|param| (param.name(), param.ty().name()))
                .collect(),
        ),
        SlotKind::Output => (
            signature.output_extensions::<CraneliftTypeInfo>(),
            signature
                .outputs()
                .iter()
                .map(|param| (param.name(), param.ty().name()))
                .collect(),
        ),
    };

    infos
        .into_iter()
        .zip(slots)
        .map(|(info, (slot, ty))| match info {
            Some(info) => Ok(info.native_type(ctx)),
            None => Err(JitError::MissingTypeInfo {
                function: function.name().to_string(),
                direction: kind.label(),
                slot: slot.to_string(),
                ty: ty.to_string(),
            }),
        })
        .collect()
}

/// Emits `<entry>_packed(inputs: ptr, outputs: ptr)`, which loads every
/// input from a packed record and forwards to the entry function.
fn build_packed_trampoline(
    module: &mut JITModule,
    builder_ctx: &mut FunctionBuilderContext,
    entry: &BuiltFunction,
    inputs: &RecordLayout,
) -> Result<BuiltFunction, JitError> {
    let ptr_type = module.isa().pointer_type();
    let mut sig = module.make_signature();
    sig.params.push(AbiParam::new(ptr_type));
    sig.params.push(AbiParam::new(ptr_type));

    let name = format!("{}_packed", entry.name);
    let id = module.declare_function(&name, Linkage::Local, &sig)?;
    let mut func = IrFunction::with_name_signature(UserFuncName::user(0, id.as_u32()), sig);

    {
        let mut builder = FunctionBuilder::new(&mut func, builder_ctx);
        let block = builder.create_block();
        builder.append_block_params_for_function_params(block);
        builder.switch_to_block(block);
        builder.seal_block(block);

        let inputs_ptr = builder.block_params(block)[0];
        let out_ptr = builder.block_params(block)[1];

        let mut args = Vec::with_capacity(inputs.fields().len() + 1);
        args.push(out_ptr);
        for field in inputs.fields() {
            let value = builder.ins().load(
                field.ty,
                MemFlags::trusted(),
                inputs_ptr,
                field.offset as i32,
            );
            args.push(value);
        }

        let callee = module.declare_func_in_func(entry.id, builder.func);
        builder.ins().call(callee, &args);
        builder.ins().return_(&[]);
        builder.finalize();
    }

    Ok(BuiltFunction { id, name, func })
}

fn entry_symbol(name: &str) -> String {
    if name.is_empty() {
        "anonymous".to_string()
    } else {
        name.to_string()
    }
}
