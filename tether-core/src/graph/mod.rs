//! Dependency Graph
//!
//! This module implements the bidirectional dependency graph at the heart of
//! the validity engine.
//!
//! # Overview
//!
//! The graph is a directed graph over opaque identities where:
//!
//! - Nodes are [`ObjectRecord`]s, one per tracked identity
//! - Edges record "A depends on B", flavored by [`DepKind`]
//!
//! Every edge is indexed twice. Its source record holds it in an ordered
//! outgoing index (a splay tree keyed by target identity) so repeated
//! registrations of the same pair find the existing edge quickly. Its target
//! record links it into one of two intrusive doubly-linked incoming lists
//! (existence-dependents and content-dependents) so invalidation can fan out
//! without searching.
//!
//! # Design Decisions
//!
//! 1. All edges live in one arena addressed by stable [`EdgeId`] indices.
//!    Tree and list links are indices, never references, which sidesteps
//!    ownership cycles and keeps unlink O(1).
//!
//! 2. The outgoing index is self-adjusting: every lookup splays the touched
//!    edge to the root, so recently-used edges stay cheap to reach.
//!
//! 3. Teardown of an outgoing index is iterative. Dependency sets are
//!    unbounded and bug-controlled in size, so neither the tree teardown nor
//!    the invalidation cascade may recurse.

mod arena;
mod depgraph;
mod edge;
mod identity;
mod record;

pub use arena::{EdgeArena, EdgeId};
pub use depgraph::DepGraph;
pub use edge::{DepKind, Edge};
pub use identity::Identity;
pub use record::ObjectRecord;
