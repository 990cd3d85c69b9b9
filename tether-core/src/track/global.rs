//! Process-wide registry facade.
//!
//! Instrumented types register and check themselves from constructors,
//! destructors, and accessors, where threading an explicit registry
//! reference through every call is impractical. This module owns the single
//! process-lifetime [`ValidityRegistry`] instance and mirrors each of its
//! operations as a free function.
//!
//! # Availability
//!
//! Every entry point first checks an availability flag. [`shutdown`] drains
//! the registry and clears the flag; from then on every operation is a
//! no-op. Objects destroyed late in process teardown can therefore still
//! issue their destruction notifications safely.
//!
//! # Thread Safety
//!
//! The engine is specified as single-threaded instrumentation, but a Rust
//! `static` must be `Sync`, so the instance lives behind a mutex. The lock
//! makes each individual operation atomic; it does not make interleaved
//! multi-call sequences meaningful across threads, and the violation
//! handler runs while the lock is held, so handlers must not call back into
//! this module.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::graph::Identity;

use super::registry::ValidityRegistry;
use super::violation::ViolationHandler;

/// The process-wide registry instance, created on first use.
static REGISTRY: OnceLock<Mutex<ValidityRegistry>> = OnceLock::new();

/// Cleared by [`shutdown`]; checked by every entry point.
static AVAILABLE: AtomicBool = AtomicBool::new(true);

fn registry() -> &'static Mutex<ValidityRegistry> {
    REGISTRY.get_or_init(|| Mutex::new(ValidityRegistry::new()))
}

/// Check whether the process-wide registry is still accepting operations.
pub fn is_available() -> bool {
    AVAILABLE.load(Ordering::Acquire)
}

/// Drain the process-wide registry and turn every further operation into a
/// no-op. Idempotent.
pub fn shutdown() {
    if AVAILABLE.swap(false, Ordering::AcqRel) {
        registry().lock().drain();
        tracing::debug!("validity registry shut down");
    }
}

/// Assert that `a` is still valid. See [`ValidityRegistry::validate`].
pub fn validate(a: Identity) {
    if is_available() {
        registry().lock().validate(a);
    }
}

/// Register a dependency of `a` on the existence of `b`. See
/// [`ValidityRegistry::add_dependency`].
pub fn add_dependency(a: Identity, b: Identity) {
    if is_available() {
        registry().lock().add_dependency(a, b);
    }
}

/// Register a dependency of `a` on the content of `b`. See
/// [`ValidityRegistry::add_content_dependency`].
pub fn add_content_dependency(a: Identity, b: Identity) {
    if is_available() {
        registry().lock().add_content_dependency(a, b);
    }
}

/// Notify that `b`'s content changed. See
/// [`ValidityRegistry::mark_modified`].
pub fn mark_modified(b: Identity) {
    if is_available() {
        registry().lock().mark_modified(b);
    }
}

/// Notify that `b` was destroyed. Mandatory, exactly once, for every
/// identity ever passed to a dependency registration. See
/// [`ValidityRegistry::mark_destroyed`].
pub fn mark_destroyed(b: Identity) {
    if is_available() {
        registry().lock().mark_destroyed(b);
    }
}

/// Forget `a`'s dependency history and restore its validity. See
/// [`ValidityRegistry::reset`].
pub fn reset(a: Identity) {
    if is_available() {
        registry().lock().reset(a);
    }
}

/// Propagate an invalid state from `b` to a fresh copy `a`. See
/// [`ValidityRegistry::propagate_invalid`].
pub fn propagate_invalid(a: Identity, b: Identity) {
    if is_available() {
        registry().lock().propagate_invalid(a, b);
    }
}

/// Content-flavored variant of [`propagate_invalid`]. See
/// [`ValidityRegistry::propagate_content`].
pub fn propagate_content(a: Identity, b: Identity) {
    if is_available() {
        registry().lock().propagate_content(a, b);
    }
}

/// Replace the process-wide violation handler. Passing `None` restores the
/// default log-and-abort policy.
pub fn set_violation_handler(handler: Option<ViolationHandler>) {
    if is_available() {
        registry().lock().set_violation_handler(handler);
    }
}
