use cranelift_codegen::ir::{InstBuilder, types};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use fnjit::function::{Function, InputParameter, OutputParameter, SharedFunction, Signature};
use fnjit::jit::{
    CodegenContext, CompilationCache, CraneliftGenBody, CraneliftTypeInfo, native_type,
};

fn add_function() -> SharedFunction {
    let int = native_type("Integer", CraneliftTypeInfo::Scalar(types::I32));
    let function = Function::new(
        "add",
        Signature::new(
            vec![
                InputParameter::new("a", int.clone()),
                InputParameter::new("b", int.clone()),
            ],
            vec![OutputParameter::new("sum", int)],
        ),
    )
    .into_shared();
    function.add_body(CraneliftGenBody::from_fn(|builder, inputs, outputs| {
        outputs.push(builder.ins().iadd(inputs[0], inputs[1]));
    }));
    function
}

fn bench_first_compile(c: &mut Criterion) {
    let cache = CompilationCache::new(CodegenContext::host().unwrap());
    c.bench_function("ensure_compiled/first", |b| {
        b.iter(|| {
            let function = add_function();
            black_box(cache.ensure_compiled(&function).unwrap());
        });
    });
}

fn bench_cached(c: &mut Criterion) {
    let cache = CompilationCache::new(CodegenContext::host().unwrap());
    let function = add_function();
    cache.ensure_compiled(&function).unwrap();
    c.bench_function("ensure_compiled/cached", |b| {
        b.iter(|| black_box(cache.ensure_compiled(&function).unwrap()));
    });
}

criterion_group!(benches, bench_first_compile, bench_cached);
criterion_main!(benches);
