use cranelift_codegen::ir::Value;
use cranelift_frontend::FunctionBuilder;

use crate::function::FunctionBody;

/// Something that can emit the instructions of a function body.
///
/// `build_ir` is called with the builder positioned in the entry block of the
/// function being compiled and one value per declared input, in order. It
/// must push exactly one value per declared output, in order, and leave the
/// builder in an unterminated block.
///
/// `build_ir` runs while the function being compiled holds its compile lock.
/// It must not ensure-compile that same function, which would deadlock;
/// compiling other functions from inside it is fine.
pub trait IrGenerator: Send + Sync {
    fn build_ir(
        &self,
        builder: &mut FunctionBuilder<'_>,
        inputs: &[Value],
        outputs: &mut Vec<Value>,
    );
}

struct FnGenerator<F>(F);

impl<F> IrGenerator for FnGenerator<F>
where
    F: Fn(&mut FunctionBuilder<'_>, &[Value], &mut Vec<Value>) + Send + Sync,
{
    fn build_ir(
        &self,
        builder: &mut FunctionBuilder<'_>,
        inputs: &[Value],
        outputs: &mut Vec<Value>,
    ) {
        (self.0)(builder, inputs, outputs)
    }
}

/// A function body that generates Cranelift IR on demand.
pub struct CraneliftGenBody {
    generator: Box<dyn IrGenerator>,
}

impl CraneliftGenBody {
    pub fn new(generator: impl IrGenerator + 'static) -> Self {
        Self {
            generator: Box::new(generator),
        }
    }

    pub fn from_fn<F>(build: F) -> Self
    where
        F: Fn(&mut FunctionBuilder<'_>, &[Value], &mut Vec<Value>) + Send + Sync + 'static,
    {
        Self::new(FnGenerator(build))
    }

    pub fn build_ir(
        &self,
        builder: &mut FunctionBuilder<'_>,
        inputs: &[Value],
        outputs: &mut Vec<Value>,
    ) {
        self.generator.build_ir(builder, inputs, outputs);
    }
}

impl FunctionBody for CraneliftGenBody {
    fn identifier() -> &'static str {
        "Cranelift Gen Body"
    }
}
