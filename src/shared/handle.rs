use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Deref;
use std::ptr::NonNull;

use super::ref_count::RefCounted;

/// One unit of shared ownership over a heap-allocated [`RefCounted`] object.
///
/// Cloning increments the object's embedded count; dropping decrements it and
/// drops the object when the count reaches zero. A handle can be emptied with
/// [`SharedHandle::take`]; an empty handle owns nothing, is a no-op to drop
/// and can be overwritten with [`SharedHandle::assign`] or `clone_from`.
///
/// Equality and hashing are by identity of the underlying object.
pub struct SharedHandle<T: RefCounted + ?Sized> {
    ptr: Option<NonNull<T>>,
    _owns: PhantomData<T>,
}

// SAFETY: `RefCounted` requires `Send + Sync`, and the only state a handle
// mutates on the shared object is the atomic count.
unsafe impl<T: RefCounted + ?Sized> Send for SharedHandle<T> {}
unsafe impl<T: RefCounted + ?Sized> Sync for SharedHandle<T> {}

impl<T: RefCounted> SharedHandle<T> {
    /// Moves `value` to the heap and wraps it, adopting its initial reference.
    pub fn new(value: T) -> Self {
        Self::from_box(Box::new(value))
    }
}

impl<T: RefCounted + ?Sized> SharedHandle<T> {
    /// Adopts an already constructed object. The box carries the object's
    /// initial reference, which becomes this handle's unit.
    pub fn from_box(object: Box<T>) -> Self {
        debug_assert_eq!(
            object.refcount(),
            1,
            "adopted object is already owned by another handle"
        );
        Self {
            ptr: Some(NonNull::from(Box::leak(object))),
            _owns: PhantomData,
        }
    }

    /// Rebuilds a handle from a pointer produced by [`SharedHandle::into_raw`].
    ///
    /// # Safety
    /// `ptr` must come from `into_raw` (or `Box::into_raw` of an object whose
    /// count is 1), and the unit it carries must not be adopted twice.
    pub unsafe fn from_raw(ptr: NonNull<T>) -> Self {
        Self {
            ptr: Some(ptr),
            _owns: PhantomData,
        }
    }

    /// Gives up this handle's unit without decrementing. `None` for an empty
    /// handle.
    pub fn into_raw(mut self) -> Option<NonNull<T>> {
        self.ptr.take()
    }

    /// Moves the reference out, leaving this handle empty. The count is not
    /// touched.
    pub fn take(&mut self) -> Self {
        Self {
            ptr: self.ptr.take(),
            _owns: PhantomData,
        }
    }

    pub fn is_null(&self) -> bool {
        self.ptr.is_none()
    }

    pub fn get(&self) -> Option<&T> {
        // SAFETY: a non-empty handle keeps its object alive.
        self.ptr.map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Owning handles of the target, or 0 for an empty handle. Advisory.
    pub fn refcount(&self) -> usize {
        self.get().map_or(0, |object| object.refcount())
    }

    /// `true` when both handles refer to the same object (or are both empty).
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        match (a.ptr, b.ptr) {
            (Some(a), Some(b)) => std::ptr::addr_eq(a.as_ptr(), b.as_ptr()),
            (None, None) => true,
            _ => false,
        }
    }

    /// Move-assignment. Releases the current target unless `other` refers to
    /// the same object, then takes over `other`'s unit.
    pub fn assign(&mut self, mut other: Self) {
        if Self::ptr_eq(self, &other) {
            // `other`'s unit is surplus; dropping it cannot reach zero
            // because `self` still holds one.
            drop(other);
            return;
        }
        self.release();
        self.ptr = other.ptr.take();
    }

    fn release(&mut self) {
        let Some(ptr) = self.ptr.take() else {
            return;
        };
        // SAFETY: the handle held one unit, so the object is alive here.
        let last = unsafe { ptr.as_ref() }.ref_count().decrement();
        if last {
            // SAFETY: the count reached zero; no other handle can observe the
            // object, and it was allocated through `Box`.
            drop(unsafe { Box::from_raw(ptr.as_ptr()) });
        }
    }
}

impl<T: RefCounted + Default> Default for SharedHandle<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: RefCounted + ?Sized> Clone for SharedHandle<T> {
    fn clone(&self) -> Self {
        if let Some(object) = self.get() {
            object.ref_count().increment();
        }
        Self {
            ptr: self.ptr,
            _owns: PhantomData,
        }
    }

    /// Copy-assignment. Identity is compared before any count changes, so
    /// assigning a handle to itself or to a handle of the same object is a
    /// no-op.
    fn clone_from(&mut self, source: &Self) {
        if Self::ptr_eq(self, source) {
            return;
        }
        self.release();
        if let Some(object) = source.get() {
            object.ref_count().increment();
        }
        self.ptr = source.ptr;
    }
}

impl<T: RefCounted + ?Sized> Drop for SharedHandle<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: RefCounted + ?Sized> Deref for SharedHandle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self.get() {
            Some(object) => object,
            None => panic!("dereferenced an empty SharedHandle"),
        }
    }
}

impl<T: RefCounted + ?Sized> PartialEq for SharedHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}

impl<T: RefCounted + ?Sized> Eq for SharedHandle<T> {}

impl<T: RefCounted + ?Sized> Hash for SharedHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ptr
            .map(|ptr| ptr.as_ptr() as *const ())
            .hash(state);
    }
}

impl<T: RefCounted + fmt::Debug + ?Sized> fmt::Debug for SharedHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(object) => f
                .debug_struct("SharedHandle")
                .field("refcount", &object.refcount())
                .field("object", &object)
                .finish(),
            None => f.write_str("SharedHandle(<empty>)"),
        }
    }
}
