//! The validity registry.
//!
//! One registry tracks one universe of identities. The process-wide facade
//! in [`super::global`] owns the instance instrumented types talk to; tests
//! construct their own and drive it directly.
//!
//! # Operation semantics
//!
//! Per-record state machine: **Unknown -> Valid -> Invalid**, with
//! [`reset`](ValidityRegistry::reset) providing Invalid -> Valid and
//! [`mark_destroyed`](ValidityRegistry::mark_destroyed) providing
//! any -> Unknown. Every operation is one of these transitions or a
//! graph-only mutation that leaves the flag alone.
//!
//! All operations are non-panicking and return nothing; the only observable
//! failure path is the violation handler. Records are created on first
//! mention and must eventually be erased by a destruction notification;
//! omitting that notification leaks the record. That is a documented caller
//! obligation, not something the engine can detect.

use crate::graph::{DepGraph, DepKind, Identity};

use super::violation::{default_handler, ViolationHandler};

/// Registry of tracked objects: the dependency graph plus the violation
/// reporting policy.
pub struct ValidityRegistry {
    graph: DepGraph,
    handler: ViolationHandler,
}

impl ValidityRegistry {
    /// Create an empty registry with the default (log-and-abort) violation
    /// handler.
    pub fn new() -> Self {
        Self {
            graph: DepGraph::new(),
            handler: Box::new(default_handler),
        }
    }

    /// Replace the violation handler. Passing `None` restores the default
    /// log-and-abort policy.
    pub fn set_violation_handler(&mut self, handler: Option<ViolationHandler>) {
        self.handler = handler.unwrap_or_else(|| Box::new(default_handler));
    }

    /// Check that `id` is still valid to use.
    ///
    /// Unknown identities pass: an object the engine was never told about
    /// cannot be stale. Invalid identities are reported to the violation
    /// handler. Never mutates registry state.
    pub fn validate(&self, id: Identity) {
        if let Some(record) = self.graph.record(id) {
            if !record.is_valid() {
                (self.handler)(id);
            }
        }
    }

    /// Declare that `a` depends on the existence of `b`: `a` must not be
    /// used after `b` has been destroyed.
    ///
    /// A no-op if `a` is already invalid; an invalid object cannot acquire
    /// new dependencies.
    pub fn add_dependency(&mut self, a: Identity, b: Identity) {
        self.graph.ensure(a);
        if !self.is_valid(a) {
            return;
        }
        self.graph.ensure(b);
        self.graph.add_edge(a, b, DepKind::Existence);
    }

    /// Declare that `a` depends on the content of `b`: `a` must not be used
    /// after `b` has been destroyed or modified.
    ///
    /// A no-op if `a` is already invalid. If `b` is already invalid there
    /// is nothing more specific left to propagate, so `a` is invalidated
    /// immediately and no edge is created.
    pub fn add_content_dependency(&mut self, a: Identity, b: Identity) {
        self.graph.ensure(a);
        if !self.is_valid(a) {
            return;
        }
        self.graph.ensure(b);
        if !self.is_valid(b) {
            self.graph.invalidate(a);
            return;
        }
        self.graph.add_edge(a, b, DepKind::Content);
    }

    /// Notify that `b`'s content changed. Everything depending on `b`'s
    /// content is invalidated; existence-dependents and `b` itself are
    /// unaffected.
    pub fn mark_modified(&mut self, b: Identity) {
        if self.graph.contains(b) {
            self.graph.invalidate_incoming(b, true);
        }
    }

    /// Notify that `b` was destroyed. Every dependent of `b` (content and
    /// existence) is invalidated and `b`'s record is erased.
    ///
    /// Mandatory, exactly once, for every identity ever passed to a
    /// dependency registration. Calling it for an unknown identity is a
    /// harmless no-op.
    pub fn mark_destroyed(&mut self, b: Identity) {
        if self.graph.contains(b) {
            tracing::debug!(id = %b, "object destroyed");
            self.graph.invalidate_incoming(b, false);
            self.graph.remove(b);
        }
    }

    /// Forget `a`'s dependency history: clear its outgoing edges and
    /// restore its validity, independent of prior state.
    ///
    /// Used when a reference is reassigned to a new target and must stop
    /// being considered invalid because of the old one.
    pub fn reset(&mut self, a: Identity) {
        self.graph.reset(a);
    }

    /// Propagate an invalid state from `b` to `a`, for use when `a` is
    /// freshly constructed as a copy of `b` and has not registered any edge
    /// yet. If `b` is currently invalid, `a` becomes invalid too.
    pub fn propagate_invalid(&mut self, a: Identity, b: Identity) {
        self.graph.ensure(a);
        self.graph.ensure(b);
        if !self.is_valid(b) {
            self.graph.invalidate(a);
        }
    }

    /// Content-flavored variant of [`propagate_invalid`]. There is one
    /// validity flag per object, so the behavior is identical today; the
    /// separate entry point keeps copy-construction call sites aligned with
    /// the kind of dependency the copy will register afterwards, and is the
    /// seam where content-specific state would be consulted if the model
    /// ever grows one.
    ///
    /// [`propagate_invalid`]: Self::propagate_invalid
    pub fn propagate_content(&mut self, a: Identity, b: Identity) {
        self.propagate_invalid(a, b);
    }

    /// Invalidate every record and erase them all. The facade runs this on
    /// shutdown so late destruction notifications find an empty registry.
    pub fn drain(&mut self) {
        let ids: Vec<Identity> = self.graph.identities().collect();
        for id in ids {
            self.graph.invalidate(id);
        }
        for id in self.graph.identities().collect::<Vec<_>>() {
            self.graph.remove(id);
        }
    }

    /// Number of tracked records.
    pub fn record_count(&self) -> usize {
        self.graph.record_count()
    }

    /// Number of live dependency edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn is_valid(&self, id: Identity) -> bool {
        self.graph.record(id).map(|r| r.is_valid()).unwrap_or(false)
    }
}

impl Default for ValidityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ValidityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidityRegistry")
            .field("records", &self.record_count())
            .field("edges", &self.edge_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::violation::recording_handler;
    use crate::track::Violation;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Registry wired to a recording handler.
    fn recording_registry() -> (ValidityRegistry, Arc<Mutex<Vec<Violation>>>) {
        let mut registry = ValidityRegistry::new();
        let (handler, log) = recording_handler();
        registry.set_violation_handler(Some(handler));
        (registry, log)
    }

    fn violations(log: &Arc<Mutex<Vec<Violation>>>) -> Vec<Identity> {
        log.lock().iter().map(|v| v.identity).collect()
    }

    #[test]
    fn validate_unknown_identity_is_silent() {
        let (registry, log) = recording_registry();
        registry.validate(Identity::next());
        assert!(log.lock().is_empty());
    }

    #[test]
    fn content_dependency_plus_modify_reports_violation() {
        let (mut registry, log) = recording_registry();
        let (a, b) = (Identity::next(), Identity::next());

        registry.add_content_dependency(a, b);
        registry.mark_modified(b);
        registry.validate(a);

        assert_eq!(violations(&log), vec![a]);
    }

    #[test]
    fn existence_dependency_ignores_modification() {
        let (mut registry, log) = recording_registry();
        let (a, b) = (Identity::next(), Identity::next());

        registry.add_dependency(a, b);
        registry.mark_modified(b);
        registry.validate(a);

        assert!(log.lock().is_empty());
    }

    #[test]
    fn destruction_invalidates_both_flavors() {
        let (mut registry, log) = recording_registry();
        let (a, b, target) = (Identity::next(), Identity::next(), Identity::next());

        registry.add_dependency(a, target);
        registry.add_content_dependency(b, target);
        registry.mark_destroyed(target);

        registry.validate(a);
        registry.validate(b);
        let seen = violations(&log);
        assert!(seen.contains(&a));
        assert!(seen.contains(&b));
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn validity_is_monotonic_until_reset() {
        let (mut registry, log) = recording_registry();
        let (a, b) = (Identity::next(), Identity::next());

        registry.add_content_dependency(a, b);
        registry.mark_modified(b);

        // Repeated checks keep reporting; nothing silently revalidates.
        registry.validate(a);
        registry.validate(a);
        assert_eq!(violations(&log), vec![a, a]);

        registry.reset(a);
        registry.validate(a);
        assert_eq!(log.lock().len(), 2);
    }

    #[test]
    fn registration_on_invalid_source_is_a_no_op() {
        let (mut registry, log) = recording_registry();
        let (a, b, c) = (Identity::next(), Identity::next(), Identity::next());

        registry.add_content_dependency(a, b);
        registry.mark_modified(b);

        // a is invalid; new registrations must not take hold.
        registry.add_dependency(a, c);
        registry.add_content_dependency(a, c);
        assert_eq!(registry.edge_count(), 0);

        registry.mark_destroyed(c);
        registry.validate(a);
        assert_eq!(violations(&log), vec![a]);
    }

    #[test]
    fn content_dependency_on_invalid_target_invalidates_source() {
        let (mut registry, log) = recording_registry();
        let (a, b, c) = (Identity::next(), Identity::next(), Identity::next());

        // Invalidate b through a throwaway dependent chain.
        registry.add_content_dependency(b, c);
        registry.mark_modified(c);

        registry.add_content_dependency(a, b);
        registry.validate(a);

        assert_eq!(violations(&log), vec![a]);
        // No edge was created for the doomed registration.
        assert_eq!(registry.edge_count(), 0);
    }

    #[test]
    fn existence_dependency_on_invalid_target_still_registers() {
        let (mut registry, log) = recording_registry();
        let (a, b, c) = (Identity::next(), Identity::next(), Identity::next());

        registry.add_content_dependency(b, c);
        registry.mark_modified(c);

        // Existence of b is all a needs, and b still exists.
        registry.add_dependency(a, b);
        registry.validate(a);
        assert!(log.lock().is_empty());

        registry.mark_destroyed(b);
        registry.validate(a);
        assert_eq!(violations(&log), vec![a]);
    }

    #[test]
    fn upgrade_gives_the_edge_content_semantics() {
        let (mut registry, log) = recording_registry();
        let (a, b) = (Identity::next(), Identity::next());

        registry.add_dependency(a, b);
        registry.add_content_dependency(a, b);
        assert_eq!(registry.edge_count(), 1);

        registry.mark_modified(b);
        registry.validate(a);
        assert_eq!(violations(&log), vec![a]);
    }

    #[test]
    fn reset_clears_history_for_fresh_registration() {
        let (mut registry, log) = recording_registry();
        let (a, b, c) = (Identity::next(), Identity::next(), Identity::next());

        registry.add_content_dependency(a, b);
        registry.mark_modified(b);
        registry.reset(a);

        // Behaves as if a had no prior history.
        registry.add_dependency(a, c);
        registry.validate(a);
        assert!(log.lock().is_empty());

        registry.mark_destroyed(c);
        registry.validate(a);
        assert_eq!(violations(&log), vec![a]);
    }

    #[test]
    fn mark_destroyed_on_unknown_identity_is_a_no_op() {
        let (mut registry, log) = recording_registry();
        registry.mark_destroyed(Identity::next());
        assert_eq!(registry.record_count(), 0);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn destroying_a_dependency_of_a_dependency_spares_existence_dependents() {
        let (mut registry, log) = recording_registry();
        let (a, b, c) = (Identity::next(), Identity::next(), Identity::next());

        // a needs b to exist; b needs c's content.
        registry.add_dependency(a, b);
        registry.add_content_dependency(b, c);

        registry.mark_destroyed(c);

        // b was invalidated, but b still exists, so a is fine.
        registry.validate(b);
        assert_eq!(violations(&log), vec![b]);
        registry.validate(a);
        assert_eq!(violations(&log), vec![b]);
    }

    #[test]
    fn chained_content_dependencies_cascade_all_the_way() {
        let (mut registry, log) = recording_registry();
        let (a, b, c) = (Identity::next(), Identity::next(), Identity::next());

        registry.add_content_dependency(a, b);
        registry.add_content_dependency(b, c);

        registry.mark_modified(c);

        registry.validate(a);
        registry.validate(b);
        let seen = violations(&log);
        assert!(seen.contains(&a));
        assert!(seen.contains(&b));
    }

    #[test]
    fn propagate_invalid_copies_the_invalid_state() {
        let (mut registry, log) = recording_registry();
        let (a, b, c) = (Identity::next(), Identity::next(), Identity::next());

        registry.add_content_dependency(b, c);
        registry.mark_modified(c);

        registry.propagate_invalid(a, b);
        registry.validate(a);
        assert_eq!(violations(&log), vec![a]);
    }

    #[test]
    fn propagate_from_a_valid_source_changes_nothing() {
        let (mut registry, log) = recording_registry();
        let (a, b) = (Identity::next(), Identity::next());

        registry.propagate_invalid(a, b);
        registry.propagate_content(a, b);

        registry.validate(a);
        registry.validate(b);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn drain_empties_the_registry() {
        let (mut registry, _log) = recording_registry();
        let (a, b) = (Identity::next(), Identity::next());
        registry.add_content_dependency(a, b);

        registry.drain();

        assert_eq!(registry.record_count(), 0);
        assert_eq!(registry.edge_count(), 0);
    }

    #[test]
    fn restored_default_handler_is_the_aborting_one() {
        // Only checks the swap plumbing; actually invoking the default
        // handler would abort the test run.
        let (mut registry, log) = recording_registry();
        let (a, b) = (Identity::next(), Identity::next());
        registry.add_content_dependency(a, b);
        registry.mark_modified(b);

        registry.set_violation_handler(None);
        // a is still invalid, but we must not validate it now.
        assert!(log.lock().is_empty());
    }
}
