//! Edge records.
//!
//! A single edge records "source depends on target" together with the links
//! that thread it through the two intrusive structures it belongs to: its
//! source's outgoing splay tree and its target's incoming list.

use super::arena::EdgeId;
use super::identity::Identity;

/// The flavor of a dependency.
///
/// A dependency can be upgraded from `Existence` to `Content` when the same
/// (source, target) pair is registered again with the stronger flavor. It is
/// never downgraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepKind {
    /// The source only requires that the target still exists. Content
    /// changes on the target do not affect the source.
    Existence,

    /// The source requires that the target neither be destroyed nor have
    /// its content changed. Either event invalidates the source.
    Content,
}

impl DepKind {
    /// Index of the incoming list this flavor is linked into.
    pub(crate) fn lane(self) -> usize {
        match self {
            DepKind::Existence => 0,
            DepKind::Content => 1,
        }
    }
}

/// A directed dependency edge.
///
/// Each live edge is reachable from exactly one outgoing index (its
/// source's, via `parent`/`left`/`right`) and linked into exactly one
/// incoming list (its target's, via `prev`/`next`). All links are arena
/// indices.
#[derive(Debug)]
pub struct Edge {
    /// The object that depends on another.
    pub source: Identity,

    /// The object being depended on.
    pub target: Identity,

    /// Dependency flavor. Determines which incoming list of the target the
    /// edge is linked into.
    pub kind: DepKind,

    /// Splay tree position within the source's outgoing index.
    pub(crate) parent: Option<EdgeId>,
    pub(crate) left: Option<EdgeId>,
    pub(crate) right: Option<EdgeId>,

    /// Doubly-linked position within the target's incoming list.
    pub(crate) prev: Option<EdgeId>,
    pub(crate) next: Option<EdgeId>,
}

impl Edge {
    /// Create a detached edge. The caller attaches it to the tree and links
    /// it into the target's incoming list.
    pub(crate) fn new(source: Identity, target: Identity, kind: DepKind) -> Self {
        Self {
            source,
            target,
            kind,
            parent: None,
            left: None,
            right: None,
            prev: None,
            next: None,
        }
    }
}
