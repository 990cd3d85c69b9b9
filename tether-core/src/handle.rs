//! Checked Reference Wrappers
//!
//! Generic reference wrappers over tracked targets. Each wrapper is itself
//! a tracked object: it registers the right dependency flavor when bound,
//! inherits invalid states when copied, forgets its history when rebound,
//! and unregisters itself when dropped. Access goes through
//! [`validate`](crate::track::validate) first.
//!
//! The wrappers hold raw pointers on purpose: they model exactly the
//! references that can outlive their referents in uninstrumented code.
//! Perfect protection would need compiler support; what the wrappers
//! guarantee is that with the default violation handler, a stale access is
//! reported and the process aborts before the load. A non-aborting handler
//! hands that responsibility back to the caller.

use std::ptr::NonNull;

use crate::graph::Identity;
use crate::track;

/// A reference wrapper that needs its target to keep existing.
///
/// The target's content may change freely; only its destruction invalidates
/// the wrapper.
pub struct TrackedRef<T> {
    id: Identity,
    target: Identity,
    ptr: NonNull<T>,
}

impl<T> TrackedRef<T> {
    /// Bind a wrapper to `value`, which is tracked under `target`.
    pub fn new(target: Identity, value: &T) -> Self {
        let id = Identity::next();
        track::add_dependency(id, target);
        Self {
            id,
            target,
            ptr: NonNull::from(value),
        }
    }

    /// The wrapper's own identity in the validity registry.
    pub fn id(&self) -> Identity {
        self.id
    }

    /// The identity of the referent.
    pub fn target(&self) -> Identity {
        self.target
    }

    /// Access the referent, validating the wrapper first.
    pub fn get(&self) -> &T {
        track::validate(self.id);
        // Guarded above: the engine has not seen the target's destruction.
        unsafe { self.ptr.as_ref() }
    }

    /// Rebind to a new target, forgetting the previous dependency history.
    pub fn rebind(&mut self, target: Identity, value: &T) {
        track::reset(self.id);
        self.target = target;
        self.ptr = NonNull::from(value);
        track::add_dependency(self.id, target);
    }
}

impl<T> Clone for TrackedRef<T> {
    /// The copy inherits an invalid state from the original, then registers
    /// its own dependency on the shared target.
    fn clone(&self) -> Self {
        let id = Identity::next();
        track::propagate_invalid(id, self.id);
        track::add_dependency(id, self.target);
        Self {
            id,
            target: self.target,
            ptr: self.ptr,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        track::reset(self.id);
        self.target = source.target;
        self.ptr = source.ptr;
        track::propagate_invalid(self.id, source.id);
        track::add_dependency(self.id, source.target);
    }
}

impl<T> Drop for TrackedRef<T> {
    fn drop(&mut self) {
        track::mark_destroyed(self.id);
    }
}

/// A reference wrapper for values inside an owner that must stay
/// unmodified, such as an element of a buffer.
///
/// Any content change on the owner (or its destruction) invalidates the
/// wrapper.
pub struct ContentRef<T> {
    id: Identity,
    owner: Identity,
    ptr: NonNull<T>,
}

impl<T> ContentRef<T> {
    /// Bind a wrapper to `value`, which lives inside the object tracked
    /// under `owner`.
    pub fn new(owner: Identity, value: &T) -> Self {
        let id = Identity::next();
        track::add_content_dependency(id, owner);
        Self {
            id,
            owner,
            ptr: NonNull::from(value),
        }
    }

    /// The wrapper's own identity in the validity registry.
    pub fn id(&self) -> Identity {
        self.id
    }

    /// The identity of the owning object.
    pub fn owner(&self) -> Identity {
        self.owner
    }

    /// Access the referent, validating the wrapper first.
    pub fn get(&self) -> &T {
        track::validate(self.id);
        // Guarded above: the engine has not seen a modification or
        // destruction of the owner.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T> Clone for ContentRef<T> {
    /// A copy starts with no edges of its own but inherits an invalid
    /// state from the original.
    fn clone(&self) -> Self {
        let id = Identity::next();
        track::propagate_content(id, self.id);
        Self {
            id,
            owner: self.owner,
            ptr: self.ptr,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        track::reset(self.id);
        self.owner = source.owner;
        self.ptr = source.ptr;
        track::propagate_content(self.id, source.id);
    }
}

impl<T> Drop for ContentRef<T> {
    fn drop(&mut self) {
        track::mark_destroyed(self.id);
    }
}
