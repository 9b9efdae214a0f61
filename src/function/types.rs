use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::shared::{RefCount, RefCounted, SharedHandle};

pub type SharedType = SharedHandle<Type>;

/// A named value type. Backends attach their own metadata to a type as
/// extensions, keyed by the extension's Rust type.
pub struct Type {
    rc: RefCount,
    name: String,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Type {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            rc: RefCount::new(),
            name: name.into(),
            extensions: HashMap::new(),
        }
    }

    /// Adds (or replaces) the extension of type `E`.
    pub fn with_extension<E: Any + Send + Sync>(mut self, extension: E) -> Self {
        self.extensions.insert(TypeId::of::<E>(), Box::new(extension));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extension<E: Any>(&self) -> Option<&E> {
        self.extensions
            .get(&TypeId::of::<E>())
            .and_then(|extension| extension.downcast_ref::<E>())
    }

    pub fn has_extension<E: Any>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<E>())
    }

    pub fn into_shared(self) -> SharedType {
        SharedHandle::new(self)
    }
}

// SAFETY: `rc` is a private field of this type.
unsafe impl RefCounted for Type {
    fn ref_count(&self) -> &RefCount {
        &self.rc
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Type")
            .field("name", &self.name)
            .field("extensions", &self.extensions.len())
            .finish()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
