//! Strongly-typed identifiers for elements and lattice nodes.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`ElementUid`] allocation.
static ELEMENT_UID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Process-wide unique identifier of a modeling element.
///
/// Allocated from a monotonic atomic counter via [`ElementUid::next`].
/// Two elements never share a UID, even when they carry the same
/// string id or model the same hardware node. Cloning an element keeps
/// its UID, which is correct because a clone models the same unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementUid(u64);

impl ElementUid {
    /// Allocate a fresh, unique element UID.
    ///
    /// Each call returns an ID never returned before within this
    /// process. Thread-safe.
    pub fn next() -> Self {
        Self(ELEMENT_UID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw counter value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle of a node (element or sequence) inside a lattice arena.
///
/// `NodeId(n)` is the n-th node allocated in the arena. Handles are
/// never reused; a node detached from its parent keeps its handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The arena slot this handle points at.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uids_are_unique_and_increasing() {
        let a = ElementUid::next();
        let b = ElementUid::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn node_id_index_and_display() {
        let id = NodeId::from(7);
        assert_eq!(id.index(), 7);
        assert_eq!(id.to_string(), "#7");
    }
}
