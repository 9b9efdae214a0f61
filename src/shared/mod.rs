//! Intrusive, thread-safe reference counting.
//!
//! Objects that want to be shared through a [`SharedHandle`] embed a
//! [`RefCount`] and expose it through the [`RefCounted`] trait. The count
//! lives inside the object itself, so a handle is a single pointer and any
//! number of handles can be created from a plain `&T` without a side table.
//!
//! The count starts at 1 when the object is created; that first unit belongs
//! to the handle that wraps the freshly boxed object. The object is dropped
//! exactly once, through its own `Drop` impl, when the last unit is released.

pub mod handle;
pub mod ref_count;

pub use handle::SharedHandle;
pub use ref_count::{RefCount, RefCounted};

#[cfg(test)]
mod handle_test;
