//! Validity Tracking
//!
//! This module implements the public surface of the engine: the registry of
//! tracked objects, the eight lifecycle operations, and violation reporting.
//!
//! # Concepts
//!
//! ## Registry
//!
//! A [`ValidityRegistry`] owns the dependency graph and a violation handler.
//! It is an ordinary, constructible value: tests build their own instance
//! and drive it directly. Nothing about the engine requires global state.
//!
//! ## Process-wide facade
//!
//! Instrumented types cannot thread a registry reference through every
//! constructor and destructor, so the module also exposes free functions
//! ([`validate`], [`add_dependency`], ...) that operate on one
//! process-lifetime registry instance. The facade checks an availability
//! flag on every call: after [`shutdown`], every operation is a no-op, so
//! objects destroyed late in process teardown cannot touch freed state.
//!
//! ## Violations
//!
//! A violation is a [`validate`] call observing an invalid object. It is
//! reported to the installed [`ViolationHandler`]; the default handler logs
//! the identity and aborts the process, because continuing after a detected
//! dangling reference risks undefined behavior in the surrounding code.
//! Tests install a recording handler instead.

mod global;
mod registry;
mod violation;

pub use global::{
    add_content_dependency, add_dependency, is_available, mark_destroyed, mark_modified,
    propagate_content, propagate_invalid, reset, set_violation_handler, shutdown, validate,
};
pub use registry::ValidityRegistry;
pub use violation::{
    assert_spatial, recording_handler, set_spatial_handler, SpatialHandler, Violation,
    ViolationHandler,
};
