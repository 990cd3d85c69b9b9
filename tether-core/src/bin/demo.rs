//! Minimal demonstration: one dangling access, one reported violation.
//!
//! The cursor registers a content dependency on the buffer. Appending to
//! the buffer may reallocate its storage, so the engine invalidates the
//! cursor; the second read is reported and the process aborts instead of
//! reading through a stale pointer.

use tether_core::buffer::TrackedBuf;

fn main() {
    tracing_subscriber::fmt::init();

    let mut text = TrackedBuf::from("Hello ");
    let cursor = text.cursor();

    println!("first byte: {}", cursor.get() as char);

    text.push_str("World!");

    // The buffer's content changed; this access fails.
    println!("first byte again: {}", cursor.get() as char);
}
