use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::shared::{RefCount, RefCounted, SharedHandle};

#[derive(Debug)]
struct Probe {
    rc: RefCount,
    value: i32,
    drops: Arc<AtomicUsize>,
}

impl Probe {
    fn new(value: i32, drops: &Arc<AtomicUsize>) -> Self {
        Self {
            rc: RefCount::new(),
            value,
            drops: Arc::clone(drops),
        }
    }
}

unsafe impl RefCounted for Probe {
    fn ref_count(&self) -> &RefCount {
        &self.rc
    }
}

impl Drop for Probe {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
struct Plain {
    rc: RefCount,
    tag: u8,
}

unsafe impl RefCounted for Plain {
    fn ref_count(&self) -> &RefCount {
        &self.rc
    }
}

fn drops() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

#[test]
fn new_handle_holds_single_reference() {
    let drops = drops();
    let handle = SharedHandle::new(Probe::new(7, &drops));
    assert_eq!(handle.refcount(), 1);
    assert_eq!(handle.value, 7);
    drop(handle);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn default_handle_default_constructs_target() {
    let handle: SharedHandle<Plain> = SharedHandle::default();
    assert_eq!(handle.tag, 0);
    assert_eq!(handle.refcount(), 1);
}

#[test]
fn clone_increments_and_drop_decrements() {
    let drops = drops();
    let a = SharedHandle::new(Probe::new(1, &drops));
    let b = a.clone();
    let c = b.clone();
    assert_eq!(a.refcount(), 3);
    assert_eq!(a, c);

    drop(b);
    assert_eq!(a.refcount(), 2);
    drop(a);
    assert_eq!(c.refcount(), 1);
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    drop(c);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn take_moves_without_touching_count() {
    let drops = drops();
    let mut a = SharedHandle::new(Probe::new(1, &drops));
    let keep = a.clone();
    let b = a.take();
    assert!(a.is_null());
    assert_eq!(a.refcount(), 0);
    assert_eq!(b.refcount(), 2);

    drop(a);
    assert_eq!(keep.refcount(), 2);
    drop(b);
    drop(keep);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn self_clone_from_is_noop() {
    let drops = drops();
    let mut a = SharedHandle::new(Probe::new(1, &drops));
    let alias = a.clone();
    a.clone_from(&alias);
    assert_eq!(a.refcount(), 2);
    let snapshot = a.clone();
    a.clone_from(&snapshot);
    assert_eq!(a.refcount(), 3);
    assert_eq!(drops.load(Ordering::SeqCst), 0);
}

#[test]
fn clone_from_releases_previous_target() {
    let drops = drops();
    let mut a = SharedHandle::new(Probe::new(1, &drops));
    let b = SharedHandle::new(Probe::new(2, &drops));
    a.clone_from(&b);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
    assert_eq!(a.value, 2);
    assert_eq!(b.refcount(), 2);
}

#[test]
fn assign_same_target_keeps_object_alive() {
    let drops = drops();
    let mut a = SharedHandle::new(Probe::new(1, &drops));
    let b = a.clone();
    a.assign(b);
    assert_eq!(a.refcount(), 1);
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    assert_eq!(a.value, 1);
}

#[test]
fn assign_into_taken_handle() {
    let drops = drops();
    let mut a = SharedHandle::new(Probe::new(1, &drops));
    let moved = a.take();
    drop(moved);
    assert_eq!(drops.load(Ordering::SeqCst), 1);

    a.assign(SharedHandle::new(Probe::new(5, &drops)));
    assert_eq!(a.value, 5);
    assert_eq!(a.refcount(), 1);

    let mut empty = a.take();
    empty.clone_from(&a);
    assert!(empty.is_null());
}

#[test]
fn assign_releases_distinct_target() {
    let drops = drops();
    let mut a = SharedHandle::new(Probe::new(1, &drops));
    let b = SharedHandle::new(Probe::new(2, &drops));
    let b_alias = b.clone();
    a.assign(b);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
    assert_eq!(b_alias.refcount(), 2);
    assert!(a == b_alias);
}

#[test]
fn raw_round_trip_keeps_unit() {
    let drops = drops();
    let a = SharedHandle::new(Probe::new(3, &drops));
    let raw = a.into_raw();
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    let restored = unsafe { SharedHandle::from_raw(raw.unwrap()) };
    assert_eq!(restored.refcount(), 1);
    assert_eq!(restored.value, 3);
}

#[test]
fn equality_and_hash_are_by_identity() {
    let a: SharedHandle<Plain> = SharedHandle::default();
    let b: SharedHandle<Plain> = SharedHandle::default();
    assert_ne!(a, b);

    let mut set = HashSet::new();
    set.insert(a.clone());
    set.insert(a.clone());
    set.insert(b.clone());
    assert_eq!(set.len(), 2);
}

#[test]
#[should_panic(expected = "empty SharedHandle")]
fn deref_of_taken_handle_panics() {
    let mut a: SharedHandle<Plain> = SharedHandle::default();
    let _b = a.take();
    let tag = a.tag;
    assert_eq!(tag, 0);
}

#[test]
fn concurrent_clone_and_drop_destroys_once() {
    let drops = drops();
    let root = SharedHandle::new(Probe::new(0, &drops));

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let local = root.clone();
            scope.spawn(move || {
                for _ in 0..1000 {
                    let copy = local.clone();
                    drop(copy);
                }
                drop(local);
            });
        }
    });

    assert_eq!(root.refcount(), 1);
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    drop(root);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn counts_are_independent_per_object() {
    let drops = drops();
    let a = SharedHandle::new(Probe::new(1, &drops));
    let b = SharedHandle::new(Probe::new(2, &drops));
    let b_copy = b.clone();

    drop(a);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
    drop(b_copy);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
    assert_eq!(b.refcount(), 1);
    assert_eq!(b.value, 2);
}
