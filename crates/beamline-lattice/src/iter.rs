//! Depth-first traversal of a lattice subtree.

use beamline_core::NodeId;
use smallvec::SmallVec;

use crate::lattice::Lattice;

/// Pre-order, depth-first iterator over a subtree, root excluded.
///
/// Created by [`Lattice::global_iter`]. Uses an explicit stack of child
/// cursors, so arbitrarily deep nesting does not recurse.
#[derive(Debug)]
pub struct GlobalIter<'a> {
    lattice: &'a Lattice,
    stack: SmallVec<[std::slice::Iter<'a, NodeId>; 8]>,
}

impl<'a> GlobalIter<'a> {
    pub(crate) fn new(lattice: &'a Lattice, root: NodeId) -> Self {
        let mut stack = SmallVec::new();
        if let Some(children) = lattice.children(root) {
            stack.push(children.iter());
        }
        Self { lattice, stack }
    }
}

impl Iterator for GlobalIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(&node) => {
                    if let Some(children) = self.lattice.children(node) {
                        self.stack.push(children.iter());
                    }
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
