//! Object identities.
//!
//! An identity is the opaque token that names a tracked object for the
//! lifetime of its registry record. The engine only ever uses identities as
//! lookup keys and never dereferences them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque, address-sized token naming a tracked object.
///
/// Identities are totally ordered; the outgoing dependency index of every
/// record is keyed by this order. Two sources exist:
///
/// - [`Identity::next`] draws from a process-wide counter. This is the
///   default for Rust collaborators, whose values move freely and therefore
///   cannot use their own address as a stable name.
/// - [`Identity::from_addr`] derives the token from an address, for callers
///   that do have pinned storage and want the address to be the name.
///
/// The engine treats both the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity(u64);

impl Identity {
    /// Generate a fresh identity from the process-wide counter.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Derive an identity from an address.
    ///
    /// Only meaningful if the storage behind `ptr` does not move for as long
    /// as the identity is registered.
    pub fn from_addr<T: ?Sized>(ptr: *const T) -> Self {
        Self(ptr as *const () as usize as u64)
    }

    /// Get the raw token value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for Identity {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
