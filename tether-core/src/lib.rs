//! Tether Core
//!
//! This crate provides the core runtime for the Tether dangling-reference
//! detection toolkit. It implements:
//!
//! - A process-wide validity registry for tracked object identities
//! - A bidirectional dependency graph with existence and content edges
//! - Transitive invalidation when a dependency is destroyed or modified
//! - A replaceable violation reporter (log-and-abort by default)
//!
//! The engine never touches the memory of the objects it tracks. An
//! [`Identity`](graph::Identity) is an opaque lookup key; collaborators
//! declare dependencies between identities and notify the registry when an
//! object is modified or destroyed. A [`validate`](track::validate) call
//! immediately before each access through a possibly-stale reference is what
//! turns silent corruption into a reported violation.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `graph`: Edge arena, per-object dependency index, invalidation cascade
//! - `track`: Registry, public operation surface, violation reporting
//! - `buffer`: Demonstration growable buffer wired to the tracking contract
//! - `handle`: Checked reference wrappers over tracked targets
//!
//! # Example
//!
//! ```rust,ignore
//! use tether_core::buffer::TrackedBuf;
//!
//! let mut text = TrackedBuf::from("Hello ");
//! let cursor = text.cursor();
//!
//! text.push_str("World!");   // content changed, cursor is now stale
//! cursor.get();              // violation reported before the access
//! ```
//!
//! # Thread Safety
//!
//! The engine is synchronous, single-threaded instrumentation. The injectable
//! [`ValidityRegistry`](track::ValidityRegistry) takes `&mut self` and has no
//! internal locking. The process-wide facade in [`track`] wraps the single
//! registry instance in a mutex so it can exist as a `static`; see that
//! module's documentation for the exact boundary.

pub mod buffer;
pub mod graph;
pub mod handle;
pub mod track;
