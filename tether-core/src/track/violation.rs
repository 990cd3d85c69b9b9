//! Violation reporting.
//!
//! The engine never signals failure through return values; the one
//! observable failure path is the violation handler. The default handler is
//! fatal: once a dangling reference has been observed, the surrounding
//! uninstrumented code can no longer be trusted to behave. Test harnesses
//! swap in a recording handler and assert on what it captured.
//!
//! The spatial assertion lives here too. It is an independent mechanism
//! used by collaborators for bounds checks; it shares the report-then-abort
//! policy but not the dependency graph.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use thiserror::Error;

use crate::graph::Identity;

/// Callback invoked when a validity check observes an invalid object.
pub type ViolationHandler = Box<dyn Fn(Identity) + Send + Sync>;

/// Callback invoked when a spatial assertion fails.
pub type SpatialHandler = Box<dyn Fn() + Send + Sync>;

/// A recorded validity violation: some identity was accessed after a
/// dependency was destroyed or modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("validity violation on object {identity}")]
pub struct Violation {
    /// The identity that was accessed while invalid.
    pub identity: Identity,
}

/// The default reporting policy: log the offending identity and abort.
pub(crate) fn default_handler(identity: Identity) {
    tracing::error!(%identity, "validity violation, aborting");
    eprintln!("tether: validity violation on object {identity}");
    std::process::abort();
}

/// Build a handler that appends every violation to a shared log instead of
/// aborting. Returns the handler and the log it feeds.
///
/// # Example
///
/// ```rust,ignore
/// let (handler, log) = recording_handler();
/// registry.set_violation_handler(Some(handler));
/// // ... provoke a violation ...
/// assert_eq!(log.lock().len(), 1);
/// ```
pub fn recording_handler() -> (ViolationHandler, Arc<Mutex<Vec<Violation>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let handler: ViolationHandler = Box::new(move |identity| {
        sink.lock().push(Violation { identity });
    });
    (handler, log)
}

/// Installed spatial handler, if any. `None` means the default policy.
static SPATIAL_HANDLER: RwLock<Option<SpatialHandler>> = RwLock::new(None);

/// Assert a spatial condition (typically a bounds check) on behalf of a
/// collaborator.
///
/// On failure the installed spatial handler runs; the default logs and
/// aborts. This check is independent of the dependency graph: it guards
/// where an access lands, not whether the referent is still alive.
pub fn assert_spatial(condition: bool) {
    if condition {
        return;
    }
    let guard = SPATIAL_HANDLER.read();
    match guard.as_ref() {
        Some(handler) => handler(),
        None => {
            tracing::error!("spatial assertion failed, aborting");
            eprintln!("tether: spatial assertion failed");
            std::process::abort();
        }
    }
}

/// Replace the spatial handler. Passing `None` restores the default
/// log-and-abort policy.
pub fn set_spatial_handler(handler: Option<SpatialHandler>) {
    *SPATIAL_HANDLER.write() = handler;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn recording_handler_captures_identities() {
        let (handler, log) = recording_handler();
        let id = Identity::next();

        handler(id);
        handler(id);

        let recorded = log.lock();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0], Violation { identity: id });
    }

    #[test]
    fn violation_displays_the_identity() {
        let id = Identity::next();
        let violation = Violation { identity: id };
        assert!(violation.to_string().contains(&id.to_string()));
    }

    #[test]
    fn passing_spatial_assertion_does_not_invoke_handler() {
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = Arc::clone(&hits);
        set_spatial_handler(Some(Box::new(move || {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        })));

        assert_spatial(true);
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        assert_spatial(false);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        set_spatial_handler(None);
    }
}
