//! Graph storage and algorithms.
//!
//! [`DepGraph`] owns every record and every edge and implements the three
//! hard operations of the engine:
//!
//! 1. `add_edge`: find-or-insert-with-upgrade on the source's outgoing splay
//!    index, splaying the touched edge to the root so repeated registrations
//!    of the same pair stay cheap.
//!
//! 2. `drop_outgoing`: iterative teardown of an outgoing index. The loop
//!    repeatedly promotes the root's left child until the root has none,
//!    then releases the isolated root and continues with its right subtree.
//!    Auxiliary space is O(1) regardless of tree shape, which matters
//!    because dependency sets are bug-controlled in size.
//!
//! 3. `invalidate` / `invalidate_incoming`: the invalidation cascade, run
//!    with an explicit worklist instead of recursion. Validity flags are
//!    monotonic, so each record is expanded at most once and arbitrarily
//!    long, branching, or even cyclic dependency chains terminate.

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::arena::{EdgeArena, EdgeId};
use super::edge::{DepKind, Edge};
use super::identity::Identity;
use super::record::ObjectRecord;

/// Worklist type for the invalidation cascade. Small cascades stay on the
/// stack; large ones spill to the heap.
type Worklist = SmallVec<[Identity; 16]>;

/// The dependency graph: every record plus the arena holding every edge.
#[derive(Debug, Default)]
pub struct DepGraph {
    /// All edges, addressed by stable indices.
    edges: EdgeArena,

    /// One record per tracked identity.
    records: IndexMap<Identity, ObjectRecord>,
}

impl DepGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            edges: EdgeArena::new(),
            records: IndexMap::new(),
        }
    }

    /// Look up the record for an identity.
    pub fn record(&self, id: Identity) -> Option<&ObjectRecord> {
        self.records.get(&id)
    }

    /// Look up or create the record for an identity.
    pub fn ensure(&mut self, id: Identity) -> &mut ObjectRecord {
        self.records.entry(id).or_default()
    }

    /// Check whether an identity has a record.
    pub fn contains(&self, id: Identity) -> bool {
        self.records.contains_key(&id)
    }

    /// Number of tracked records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Identities of every tracked record, in registration order.
    pub fn identities(&self) -> impl Iterator<Item = Identity> + '_ {
        self.records.keys().copied()
    }

    /// Find or insert the edge `source -> target` in the source's outgoing
    /// index and splay it to the root.
    ///
    /// If the pair already exists with the weaker `Existence` flavor and
    /// `kind` is `Content`, the edge is upgraded in place: unlinked from the
    /// target's existence list and relinked into its content list. The
    /// flavor is never downgraded.
    ///
    /// Both records must already exist; the caller is responsible for
    /// refusing registrations on an invalid source.
    pub fn add_edge(&mut self, source: Identity, target: Identity, kind: DepKind) {
        let mut root = self
            .records
            .get(&source)
            .expect("add_edge on an unknown source")
            .outgoing;

        // Descend the outgoing index looking for an existing edge.
        let mut cursor = root;
        let mut parent = None;
        let mut went_left = false;
        while let Some(idx) = cursor {
            let (edge_target, left, right) = {
                let edge = &self.edges[idx];
                (edge.target, edge.left, edge.right)
            };
            if target < edge_target {
                parent = Some(idx);
                went_left = true;
                cursor = left;
            } else if target > edge_target {
                parent = Some(idx);
                went_left = false;
                cursor = right;
            } else {
                // Existing dependency found, upgrade if needed.
                if kind == DepKind::Content && self.edges[idx].kind == DepKind::Existence {
                    self.unlink_incoming(idx);
                    self.edges[idx].kind = DepKind::Content;
                    self.link_incoming(idx);
                    tracing::trace!(%source, %target, "dependency upgraded to content");
                }
                splay(&mut self.edges, &mut root, idx);
                self.records.get_mut(&source).expect("source record").outgoing = root;
                return;
            }
        }

        // Not found: allocate, attach as a leaf, link into the target's
        // incoming list, then splay to the root.
        let idx = self.edges.alloc(Edge::new(source, target, kind));
        self.edges[idx].parent = parent;
        match parent {
            None => root = Some(idx),
            Some(p) => {
                if went_left {
                    self.edges[p].left = Some(idx);
                } else {
                    self.edges[p].right = Some(idx);
                }
            }
        }
        self.link_incoming(idx);
        splay(&mut self.edges, &mut root, idx);
        self.records.get_mut(&source).expect("source record").outgoing = root;
        tracing::trace!(%source, %target, ?kind, "dependency registered");
    }

    /// Remove every outgoing edge of `id`, unlinking each from its target's
    /// incoming list and releasing it.
    ///
    /// Iterative: while the current root has a left child, rotate that child
    /// up; once it has none, the root is isolated on its left side and can
    /// be released, continuing with the right subtree. Parent links are left
    /// stale during the walk since every node is about to be freed.
    pub fn drop_outgoing(&mut self, id: Identity) {
        let Some(record) = self.records.get_mut(&id) else {
            return;
        };
        let mut cursor = record.outgoing.take();
        while let Some(idx) = cursor {
            if let Some(left) = self.edges[idx].left {
                self.edges[idx].left = self.edges[left].right;
                self.edges[left].right = Some(idx);
                cursor = Some(left);
            } else {
                let right = self.edges[idx].right;
                self.unlink_incoming(idx);
                self.edges.free(idx);
                cursor = right;
            }
        }
    }

    /// Invalidate an object: clear its validity flag, cascade to everything
    /// that depends on its content, and drop its own outgoing edges.
    ///
    /// On a record that is already invalid only the outgoing-drop still
    /// runs; the cascade happened when the flag first flipped.
    pub fn invalidate(&mut self, id: Identity) {
        let mut worklist: Worklist = SmallVec::new();
        worklist.push(id);
        self.run_cascade(&mut worklist);
    }

    /// Invalidate everything that depends on `id`, without touching `id`'s
    /// own validity flag.
    ///
    /// Content-dependents are always cascaded; existence-dependents only
    /// when `content_only` is false. The incoming lists drain as a side
    /// effect, because each cascaded dependent drops its outgoing edges and
    /// those edges are the list entries.
    pub fn invalidate_incoming(&mut self, id: Identity, content_only: bool) {
        let Some(record) = self.records.get(&id) else {
            return;
        };
        let content_head = record.incoming[DepKind::Content.lane()];
        let existence_head = record.incoming[DepKind::Existence.lane()];

        let mut worklist: Worklist = SmallVec::new();
        self.collect_sources(content_head, &mut worklist);
        if !content_only {
            self.collect_sources(existence_head, &mut worklist);
        }
        if !worklist.is_empty() {
            tracing::debug!(%id, dependents = worklist.len(), content_only, "invalidating dependents");
        }
        self.run_cascade(&mut worklist);
    }

    /// Clear the outgoing edges of `id` and restore its validity,
    /// independent of prior state. Unknown identities are left untracked.
    pub fn reset(&mut self, id: Identity) {
        if self.contains(id) {
            self.drop_outgoing(id);
            self.records.get_mut(&id).expect("record").valid = true;
        }
    }

    /// Erase the record for `id`, dropping its own outgoing edges first.
    ///
    /// The caller drains the incoming lists beforehand (via
    /// [`invalidate_incoming`](Self::invalidate_incoming)); leaving the
    /// outgoing edges behind would keep freed arena slots linked into other
    /// records' incoming lists, the exact stale-reference class this engine
    /// exists to catch.
    pub fn remove(&mut self, id: Identity) {
        if !self.contains(id) {
            return;
        }
        self.drop_outgoing(id);
        let record = self.records.swap_remove(&id).expect("record");
        debug_assert!(
            !record.has_dependents(),
            "record erased while dependents were still linked"
        );
    }

    /// Worker for the invalidation cascade.
    fn run_cascade(&mut self, worklist: &mut Worklist) {
        while let Some(current) = worklist.pop() {
            let Some(record) = self.records.get_mut(&current) else {
                continue;
            };
            let content_head = if record.valid {
                record.valid = false;
                tracing::debug!(id = %current, "object invalidated");
                record.incoming[DepKind::Content.lane()]
            } else {
                // Already invalid: the content cascade ran when the flag
                // flipped, only the outgoing-drop below still applies.
                None
            };
            self.collect_sources(content_head, worklist);
            self.drop_outgoing(current);
        }
    }

    /// Push the source of every edge in an incoming list onto the worklist.
    fn collect_sources(&self, head: Option<EdgeId>, worklist: &mut Worklist) {
        let mut cursor = head;
        while let Some(idx) = cursor {
            let edge = &self.edges[idx];
            worklist.push(edge.source);
            cursor = edge.next;
        }
    }

    /// Link an edge at the head of its target's incoming list for its
    /// current flavor.
    fn link_incoming(&mut self, idx: EdgeId) {
        let (target, lane) = {
            let edge = &self.edges[idx];
            (edge.target, edge.kind.lane())
        };
        let record = self.records.get_mut(&target).expect("target record");
        let head = record.incoming[lane];
        record.incoming[lane] = Some(idx);
        self.edges[idx].prev = None;
        self.edges[idx].next = head;
        if let Some(next) = head {
            self.edges[next].prev = Some(idx);
        }
    }

    /// Unlink an edge from its target's incoming list in O(1).
    fn unlink_incoming(&mut self, idx: EdgeId) {
        let (target, lane, prev, next) = {
            let edge = &self.edges[idx];
            (edge.target, edge.kind.lane(), edge.prev, edge.next)
        };
        match prev {
            Some(prev) => self.edges[prev].next = next,
            None => {
                if let Some(record) = self.records.get_mut(&target) {
                    record.incoming[lane] = next;
                }
            }
        }
        if let Some(next) = next {
            self.edges[next].prev = prev;
        }
        self.edges[idx].prev = None;
        self.edges[idx].next = None;
    }
}

/// Splay `idx` to the root of its tree.
fn splay(edges: &mut EdgeArena, root: &mut Option<EdgeId>, idx: EdgeId) {
    while let Some(parent) = edges[idx].parent {
        match edges[parent].parent {
            None => {
                if edges[parent].left == Some(idx) {
                    rotate_right(edges, root, parent);
                } else {
                    rotate_left(edges, root, parent);
                }
            }
            Some(grand) => {
                let idx_is_left = edges[parent].left == Some(idx);
                let parent_is_left = edges[grand].left == Some(parent);
                match (idx_is_left, parent_is_left) {
                    (true, true) => {
                        rotate_right(edges, root, grand);
                        rotate_right(edges, root, parent);
                    }
                    (false, false) => {
                        rotate_left(edges, root, grand);
                        rotate_left(edges, root, parent);
                    }
                    (true, false) => {
                        rotate_right(edges, root, parent);
                        rotate_left(edges, root, grand);
                    }
                    (false, true) => {
                        rotate_left(edges, root, parent);
                        rotate_right(edges, root, grand);
                    }
                }
            }
        }
    }
}

/// Rotate the right child of `idx` into its place.
fn rotate_left(edges: &mut EdgeArena, root: &mut Option<EdgeId>, idx: EdgeId) {
    let other = edges[idx].right;
    if let Some(other) = other {
        edges[idx].right = edges[other].left;
        if let Some(left) = edges[other].left {
            edges[left].parent = Some(idx);
        }
        edges[other].parent = edges[idx].parent;
    }
    match edges[idx].parent {
        None => *root = other,
        Some(parent) => {
            if edges[parent].left == Some(idx) {
                edges[parent].left = other;
            } else {
                edges[parent].right = other;
            }
        }
    }
    if let Some(other) = other {
        edges[other].left = Some(idx);
    }
    edges[idx].parent = other;
}

/// Rotate the left child of `idx` into its place.
fn rotate_right(edges: &mut EdgeArena, root: &mut Option<EdgeId>, idx: EdgeId) {
    let other = edges[idx].left;
    if let Some(other) = other {
        edges[idx].left = edges[other].right;
        if let Some(right) = edges[other].right {
            edges[right].parent = Some(idx);
        }
        edges[other].parent = edges[idx].parent;
    }
    match edges[idx].parent {
        None => *root = other,
        Some(parent) => {
            if edges[parent].left == Some(idx) {
                edges[parent].left = other;
            } else {
                edges[parent].right = other;
            }
        }
    }
    if let Some(other) = other {
        edges[other].right = Some(idx);
    }
    edges[idx].parent = other;
}
