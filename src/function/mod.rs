//! The function object the compilation cache works on.
//!
//! A [`Function`] is a named [`Signature`] plus any number of attached
//! bodies, at most one per body kind. It is shared through
//! [`SharedFunction`] handles.

pub mod body;
pub mod signature;
pub mod types;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::shared::{RefCount, RefCounted, SharedHandle};

pub use body::{BodyRegistry, FunctionBody};
pub use signature::{InputParameter, OutputParameter, Signature};
pub use types::{SharedType, Type};

pub type SharedFunction = SharedHandle<Function>;

pub struct Function {
    rc: RefCount,
    name: String,
    signature: Signature,
    bodies: BodyRegistry,
    /// Serializes "inspect bodies, compile, attach" sequences.
    compile_lock: Mutex<()>,
}

impl Function {
    pub fn new(name: impl Into<String>, signature: Signature) -> Self {
        Self {
            rc: RefCount::new(),
            name: name.into(),
            signature,
            bodies: BodyRegistry::new(),
            compile_lock: Mutex::new(()),
        }
    }

    pub fn into_shared(self) -> SharedFunction {
        SharedHandle::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn has_body<B: FunctionBody>(&self) -> bool {
        self.bodies.has::<B>()
    }

    pub fn body<B: FunctionBody>(&self) -> Option<Arc<B>> {
        self.bodies.get::<B>()
    }

    /// Attaches `body`; the function owns it from now on.
    ///
    /// # Panics
    /// If a body of the same kind is already attached.
    pub fn add_body<B: FunctionBody>(&self, body: B) -> Arc<B> {
        self.bodies.add(body)
    }

    /// Attaches `body` unless one of the same kind is already attached, in
    /// which case `body` is returned.
    pub fn try_add_body<B: FunctionBody>(&self, body: B) -> Result<Arc<B>, B> {
        self.bodies.try_add(body)
    }

    pub fn body_names(&self) -> Vec<&'static str> {
        self.bodies.identifiers()
    }

    /// Not reentrant: compiling this function while it is already being
    /// compiled on the same thread deadlocks.
    pub(crate) fn lock_for_compile(&self) -> MutexGuard<'_, ()> {
        self.compile_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

// SAFETY: `rc` is a private field of this function.
unsafe impl RefCounted for Function {
    fn ref_count(&self) -> &RefCount {
        &self.rc
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("signature", &self.signature.to_string())
            .field("bodies", &self.body_names())
            .finish()
    }
}

#[cfg(test)]
mod function_test;
