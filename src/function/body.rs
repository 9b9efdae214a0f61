use std::any::{Any, TypeId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One interchangeable representation of how a function computes its outputs.
///
/// The concrete Rust type is the body's kind: a function holds at most one
/// body of each kind. A body is cleaned up by its own `Drop` impl when the
/// last reference to it goes away.
pub trait FunctionBody: Any + Send + Sync {
    /// Human-readable name of this body kind.
    fn identifier() -> &'static str;
}

struct AttachedBody {
    kind: TypeId,
    identifier: &'static str,
    body: Arc<dyn Any + Send + Sync>,
}

/// The set of bodies attached to one function, keyed by body kind.
#[derive(Default)]
pub struct BodyRegistry {
    bodies: Mutex<Vec<AttachedBody>>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<AttachedBody>> {
        self.bodies.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn has<B: FunctionBody>(&self) -> bool {
        let kind = TypeId::of::<B>();
        self.lock().iter().any(|attached| attached.kind == kind)
    }

    /// A shared reference to the body of kind `B`, if one is attached. The
    /// returned `Arc` keeps the body alive even if the function goes away.
    pub fn get<B: FunctionBody>(&self) -> Option<Arc<B>> {
        let kind = TypeId::of::<B>();
        let body = self
            .lock()
            .iter()
            .find(|attached| attached.kind == kind)
            .map(|attached| Arc::clone(&attached.body))?;
        body.downcast::<B>().ok()
    }

    /// Attaches `body`, transferring ownership to the registry.
    ///
    /// # Panics
    /// If a body of the same kind is already attached.
    pub fn add<B: FunctionBody>(&self, body: B) -> Arc<B> {
        match self.try_add(body) {
            Ok(body) => body,
            Err(_) => panic!("a {} is already attached", B::identifier()),
        }
    }

    /// Attaches `body` unless a body of the same kind is already attached,
    /// in which case `body` is handed back untouched.
    pub fn try_add<B: FunctionBody>(&self, body: B) -> Result<Arc<B>, B> {
        let kind = TypeId::of::<B>();
        let mut bodies = self.lock();
        if bodies.iter().any(|attached| attached.kind == kind) {
            return Err(body);
        }
        let body = Arc::new(body);
        bodies.push(AttachedBody {
            kind,
            identifier: B::identifier(),
            body: Arc::clone(&body) as Arc<dyn Any + Send + Sync>,
        });
        Ok(body)
    }

    /// Identifiers of the attached bodies, in attachment order.
    pub fn identifiers(&self) -> Vec<&'static str> {
        self.lock().iter().map(|attached| attached.identifier).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
