//! Demonstration Buffer
//!
//! A growable byte buffer instrumented with the tracking contract, together
//! with a detached cursor type. These are deliberately thin call-sites:
//! ordinary data-structure logic plus the engine calls at the right
//! lifecycle points.
//!
//! # Contract wiring
//!
//! | Event | Engine call |
//! |---|---|
//! | buffer mutated (push, resize, erase, ...) | `mark_modified(buffer)` |
//! | buffer dropped | `mark_destroyed(buffer)` |
//! | cursor created | `add_content_dependency(cursor, buffer)` |
//! | cursor cloned | `propagate_content(copy, original)` |
//! | cursor dropped | `mark_destroyed(cursor)` |
//! | cursor element access | `assert_spatial` + `validate(cursor)` |
//!
//! A cursor holds a raw pointer into the buffer's storage, exactly the kind
//! of reference that outlives its referent in uninstrumented code. With the
//! default violation handler, a stale access is reported and the process
//! aborts before the load; installing a non-aborting handler shifts the
//! responsibility for not completing the access to the caller.

mod buf;
mod cursor;

pub use buf::TrackedBuf;
pub use cursor::Cursor;
