//! Cursors into a tracked buffer.

use std::cmp::Ordering;

use crate::graph::Identity;
use crate::track;

/// A detached cursor into a [`TrackedBuf`](super::TrackedBuf).
///
/// The cursor registers a content dependency on the buffer when created:
/// any mutation of the buffer (or its destruction) invalidates the cursor,
/// and the next element access reports a violation instead of reading
/// through a stale pointer.
///
/// Positions are compared by offset; comparing cursors from different
/// buffers is meaningless but harmless.
#[derive(Debug)]
pub struct Cursor {
    id: Identity,
    base: *const u8,
    pos: usize,
    limit: usize,
}

impl Cursor {
    /// Create a cursor over `limit` bytes at `base`, registering the
    /// content dependency on the owning buffer.
    pub(crate) fn new(owner: Identity, base: *const u8, pos: usize, limit: usize) -> Self {
        let id = Identity::next();
        track::add_content_dependency(id, owner);
        Self {
            id,
            base,
            pos,
            limit,
        }
    }

    /// The cursor's own identity in the validity registry.
    pub fn id(&self) -> Identity {
        self.id
    }

    /// Current offset from the start of the buffer.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Check whether the cursor sits one past the last byte.
    pub fn at_end(&self) -> bool {
        self.pos == self.limit
    }

    /// Step forward one byte. Stepping past the end is a spatial violation.
    pub fn advance(&mut self) {
        track::assert_spatial(self.pos != self.limit);
        self.pos += 1;
    }

    /// Step forward `count` bytes. Stepping past the end is a spatial
    /// violation.
    pub fn advance_by(&mut self, count: usize) {
        track::assert_spatial(count <= self.limit - self.pos);
        self.pos += count;
    }

    /// Read the byte under the cursor.
    ///
    /// Checks the position spatially, then checks the cursor's validity.
    /// With the default violation handler a stale cursor aborts here,
    /// before the read; with a non-aborting handler installed the read
    /// still goes through and the caller owns the consequences.
    pub fn get(&self) -> u8 {
        track::assert_spatial(self.pos < self.limit);
        track::validate(self.id);
        // Guarded above: the engine has not seen a modification or
        // destruction of the owning buffer, so the storage is live.
        unsafe { *self.base.add(self.pos) }
    }
}

impl Clone for Cursor {
    /// A copy starts with no dependency edges of its own but inherits an
    /// invalid state from the original, matching the contract for freshly
    /// constructed copies.
    fn clone(&self) -> Self {
        let id = Identity::next();
        track::propagate_content(id, self.id);
        Self {
            id,
            base: self.base,
            pos: self.pos,
            limit: self.limit,
        }
    }

    /// Reassignment forgets the destination's history first, then inherits
    /// the source's state.
    fn clone_from(&mut self, source: &Self) {
        track::reset(self.id);
        self.base = source.base;
        self.pos = source.pos;
        self.limit = source.limit;
        track::propagate_content(self.id, source.id);
    }
}

impl Drop for Cursor {
    fn drop(&mut self) {
        track::mark_destroyed(self.id);
    }
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
    }
}

impl Eq for Cursor {}

impl PartialOrd for Cursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cursor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.pos.cmp(&other.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::TrackedBuf;

    #[test]
    fn cursor_reads_through_the_buffer() {
        let buf = TrackedBuf::from("abc");
        let mut cursor = buf.cursor();

        assert_eq!(cursor.get(), b'a');
        cursor.advance();
        assert_eq!(cursor.get(), b'b');
        cursor.advance_by(1);
        assert_eq!(cursor.get(), b'c');
        cursor.advance();
        assert!(cursor.at_end());
    }

    #[test]
    fn cursors_compare_by_position() {
        let buf = TrackedBuf::from("abc");
        let start = buf.cursor();
        let mut ahead = buf.cursor();
        ahead.advance();

        assert!(start < ahead);
        assert_eq!(start, buf.cursor());
    }

    #[test]
    fn cloned_cursor_reads_the_same_position() {
        let buf = TrackedBuf::from("xyz");
        let mut cursor = buf.cursor();
        cursor.advance();

        let copy = cursor.clone();
        assert_ne!(copy.id(), cursor.id());
        assert_eq!(copy.pos(), 1);
        assert_eq!(copy.get(), b'y');
    }
}
