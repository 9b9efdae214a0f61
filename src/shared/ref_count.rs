use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The embedded counter of a reference-counted object.
///
/// Not `Clone`: copying an object would copy its ownership state. Only
/// handles are copied.
pub struct RefCount {
    count: AtomicUsize,
}

impl RefCount {
    /// A new counter holding the creator's reference.
    pub const fn new() -> Self {
        Self {
            count: AtomicUsize::new(1),
        }
    }

    /// Adds one unit of ownership.
    ///
    /// Overflow is not checked; the count is assumed to stay far below
    /// `usize::MAX`.
    #[inline]
    pub(crate) fn increment(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Removes one unit of ownership and returns `true` when it was the last.
    ///
    /// Releasing more units than were acquired is an invariant violation. It
    /// is caught by a debug assertion; in release builds the counter wraps
    /// and the behavior of the owning object is undefined.
    #[inline]
    pub(crate) fn decrement(&self) -> bool {
        let previous = self.count.fetch_sub(1, Ordering::Release);
        debug_assert!(previous > 0, "reference count dropped below zero");
        if previous == 1 {
            // Synchronize with every prior release before the object is dropped.
            std::sync::atomic::fence(Ordering::Acquire);
            return true;
        }
        false
    }

    /// Current value. Advisory only: another thread may change it right
    /// after it is read, so use it for diagnostics and tests.
    pub fn get(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }
}

impl Default for RefCount {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RefCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefCount").field(&self.get()).finish()
    }
}

/// An object whose lifetime is managed by an embedded [`RefCount`].
///
/// Implementors must be `Send + Sync` because handles to them may be cloned
/// and dropped from any thread. All state other than the count is the
/// implementor's own responsibility.
///
/// # Safety
/// `ref_count` must always return the same counter, embedded in `self`,
/// used by no other object and living exactly as long as `self`.
/// [`SharedHandle`](super::SharedHandle) frees the object when that counter
/// reaches zero, so handing out a shared or foreign counter frees objects
/// that are still referenced.
///
/// ```compile_fail
/// use fnjit::shared::{RefCount, RefCounted};
///
/// struct Unchecked {
///     rc: RefCount,
/// }
///
/// impl RefCounted for Unchecked {
///     fn ref_count(&self) -> &RefCount {
///         &self.rc
///     }
/// }
/// ```
pub unsafe trait RefCounted: Send + Sync {
    fn ref_count(&self) -> &RefCount;

    /// Current number of owning handles, for diagnostics.
    fn refcount(&self) -> usize {
        self.ref_count().get()
    }
}
