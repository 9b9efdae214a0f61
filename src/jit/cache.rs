use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::Serialize;
use tracing::trace;

use crate::function::{Function, SharedFunction};

use super::JitError;
use super::compiled_body::CompiledBody;
use super::compiler::compile_body;
use super::context::CodegenContext;
use super::gen_body::CraneliftGenBody;

/// Outcome of an ensure-compiled request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompileStatus {
    /// A compiled body was already attached; nothing was done.
    AlreadyCompiled,
    /// The IR generating body was compiled and the result attached.
    Compiled,
    /// The function has neither a compiled nor an IR generating body.
    NotApplicable,
}

impl CompileStatus {
    /// `true` when the function now has a compiled body.
    pub fn is_compiled(self) -> bool {
        !matches!(self, CompileStatus::NotApplicable)
    }
}

/// Makes sure `function` has a [`CompiledBody`], compiling its
/// [`CraneliftGenBody`] if needed.
///
/// Compilation happens at most once per function: concurrent callers are
/// serialized on the function's compile lock, and a compiled body is never
/// rebuilt or invalidated. If a compiled body is attached through
/// [`Function::add_body`] while this call is compiling, the attached body
/// wins and the freshly built one is dropped.
pub fn try_ensure_compiled(
    function: &Function,
    ctx: &CodegenContext,
) -> Result<CompileStatus, JitError> {
    if function.has_body::<CompiledBody>() {
        return Ok(CompileStatus::AlreadyCompiled);
    }

    let _guard = function.lock_for_compile();
    // Another caller may have finished compiling while we waited.
    if function.has_body::<CompiledBody>() {
        return Ok(CompileStatus::AlreadyCompiled);
    }
    if !function.has_body::<CraneliftGenBody>() {
        return Ok(CompileStatus::NotApplicable);
    }

    let body = compile_body(function, ctx)?;
    // `add_body` does not take the compile lock, so a compiled body may have
    // been attached directly while this one was being built.
    match function.try_add_body(body) {
        Ok(_) => Ok(CompileStatus::Compiled),
        Err(_) => Ok(CompileStatus::AlreadyCompiled),
    }
}

/// Snapshot of a cache's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: usize,
    pub compilations: usize,
    pub not_applicable: usize,
}

impl CacheStats {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Compiles function bodies on demand against one [`CodegenContext`].
pub struct CompilationCache {
    context: CodegenContext,
    hits: AtomicUsize,
    compilations: AtomicUsize,
    not_applicable: AtomicUsize,
}

impl CompilationCache {
    pub fn new(context: CodegenContext) -> Self {
        Self {
            context,
            hits: AtomicUsize::new(0),
            compilations: AtomicUsize::new(0),
            not_applicable: AtomicUsize::new(0),
        }
    }

    pub fn context(&self) -> &CodegenContext {
        &self.context
    }

    /// See [`try_ensure_compiled`].
    pub fn ensure_compiled(&self, function: &Function) -> Result<CompileStatus, JitError> {
        let status = try_ensure_compiled(function, &self.context)?;
        match status {
            CompileStatus::AlreadyCompiled => {
                trace!(function = function.name(), "compiled body cache hit");
                self.hits.fetch_add(1, Ordering::Relaxed);
            }
            CompileStatus::Compiled => {
                self.compilations.fetch_add(1, Ordering::Relaxed);
            }
            CompileStatus::NotApplicable => {
                self.not_applicable.fetch_add(1, Ordering::Relaxed);
            }
        }
        Ok(status)
    }

    /// Ensures every function is compiled, working on them in parallel.
    /// Results are in the order of `functions`.
    pub fn ensure_compiled_all(
        &self,
        functions: &[SharedFunction],
    ) -> Vec<Result<CompileStatus, JitError>> {
        functions
            .par_iter()
            .map(|function| self.ensure_compiled(function))
            .collect()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            compilations: self.compilations.load(Ordering::Relaxed),
            not_applicable: self.not_applicable.load(Ordering::Relaxed),
        }
    }
}
