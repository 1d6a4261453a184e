//! The node arena: construction, structural queries and positions.

use beamline_core::NodeId;
use beamline_element::Element;
use tracing::debug;

use crate::error::LatticeError;
use crate::iter::GlobalIter;
use crate::sequence::ElementSeq;

/// Payload of a lattice node.
#[derive(Debug)]
pub enum NodeKind {
    /// An atomic element.
    Element(Element),
    /// A composite of child nodes.
    Sequence(ElementSeq),
}

#[derive(Debug)]
struct Node {
    parent: Option<NodeId>,
    kind: NodeKind,
}

/// Arena owning every element and sequence of a lattice.
///
/// Nodes are never deallocated; a removed child stays addressable as a
/// detached root. A node has at most one parent, and
/// [`add_child`](Self::add_child) refuses any edge that would close a
/// cycle, so every node reachable from a root forms a tree.
///
/// # Examples
///
/// ```
/// use beamline_elements::IdealDrift;
/// use beamline_lattice::{ElementSeq, Lattice};
///
/// let mut lattice = Lattice::new();
/// let root = lattice.add_sequence(ElementSeq::new("LINAC"));
/// let d1 = lattice.add_element(IdealDrift::element("D1", 1.0));
/// let d2 = lattice.add_element(IdealDrift::element("D2", 0.5));
/// lattice.add_child(root, d1).unwrap();
/// lattice.add_child(root, d2).unwrap();
/// assert_eq!(lattice.length(root), Some(1.5));
/// assert_eq!(lattice.children_rev(root), Some(&[d2, d1][..]));
/// ```
#[derive(Debug, Default)]
pub struct Lattice {
    nodes: Vec<Node>,
}

impl Lattice {
    /// An empty lattice.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever added.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node has been added.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `node` names a node of this lattice.
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.nodes.len()
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { parent: None, kind });
        id
    }

    /// Add a detached element and return its handle.
    pub fn add_element(&mut self, element: Element) -> NodeId {
        self.push(NodeKind::Element(element))
    }

    /// Add a detached sequence and return its handle.
    pub fn add_sequence(&mut self, sequence: ElementSeq) -> NodeId {
        self.push(NodeKind::Sequence(sequence))
    }

    fn node(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node.index())
    }

    /// Payload of a node.
    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.node(node).map(|n| &n.kind)
    }

    /// The element at `node`, if it is one.
    pub fn element(&self, node: NodeId) -> Option<&Element> {
        match self.kind(node)? {
            NodeKind::Element(e) => Some(e),
            NodeKind::Sequence(_) => None,
        }
    }

    /// Mutable access to the element at `node`, for construction-time
    /// setters.
    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node.index())?.kind {
            NodeKind::Element(e) => Some(e),
            NodeKind::Sequence(_) => None,
        }
    }

    /// Swap the element stored at `node` for `element`, keeping the
    /// node's place in the tree. Returns the previous element.
    pub fn replace_element(&mut self, node: NodeId, element: Element) -> Result<Element, LatticeError> {
        match &mut self.nodes.get_mut(node.index()).ok_or(LatticeError::UnknownNode(node))?.kind {
            NodeKind::Element(e) => Ok(std::mem::replace(e, element)),
            NodeKind::Sequence(_) => Err(LatticeError::NotAnElement(node)),
        }
    }

    /// The sequence at `node`, if it is one.
    pub fn sequence(&self, node: NodeId) -> Option<&ElementSeq> {
        match self.kind(node)? {
            NodeKind::Sequence(s) => Some(s),
            NodeKind::Element(_) => None,
        }
    }

    /// Mutable access to the sequence at `node`. Children can only be
    /// changed through the lattice.
    pub fn sequence_mut(&mut self, node: NodeId) -> Option<&mut ElementSeq> {
        match &mut self.nodes.get_mut(node.index())?.kind {
            NodeKind::Sequence(s) => Some(s),
            NodeKind::Element(_) => None,
        }
    }

    /// Whether `node` is a sequence.
    pub fn is_sequence(&self, node: NodeId) -> bool {
        self.sequence(node).is_some()
    }

    /// Instance id of a node.
    pub fn id(&self, node: NodeId) -> Option<&str> {
        match self.kind(node)? {
            NodeKind::Element(e) => Some(e.id()),
            NodeKind::Sequence(s) => Some(s.id()),
        }
    }

    /// First node (in allocation order) whose instance id is `id`.
    pub fn find(&self, id: &str) -> Option<NodeId> {
        (0..self.nodes.len())
            .map(|i| NodeId(i as u32))
            .find(|&n| self.id(n) == Some(id))
    }

    /// Parent sequence of a node; `None` for roots and unknown handles.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    /// Whether `ancestor` is `node` or lies on its parent chain.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.parent(n);
        }
        false
    }

    // ── Mutation ───────────────────────────────────────────────────

    /// Append `child` to the end of `parent`.
    ///
    /// The forward list gains `child` at its tail and the reverse list
    /// at its head in the same call. Fails without changing anything if
    /// either handle is unknown, `parent` is not a sequence, `child`
    /// already has a parent, or `child` is `parent` or one of its
    /// ancestors.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), LatticeError> {
        match self.kind(parent) {
            None => return Err(LatticeError::UnknownNode(parent)),
            Some(NodeKind::Element(_)) => return Err(LatticeError::NotASequence(parent)),
            Some(NodeKind::Sequence(_)) => {}
        }
        let existing = self.node(child).ok_or(LatticeError::UnknownNode(child))?.parent;
        if let Some(p) = existing {
            return Err(LatticeError::AlreadyParented { child, parent: p });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(LatticeError::Cycle { parent, child });
        }
        self.attach(parent, child);
        debug!(parent = %parent, child = %child, "child added");
        Ok(())
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
        if let NodeKind::Sequence(s) = &mut self.nodes[parent.index()].kind {
            s.push_child(child);
        }
    }

    /// Remove `target` from wherever it sits inside the subtree of
    /// `sequence`.
    ///
    /// At most one occurrence is removed; the node becomes a detached
    /// root. Returns `false` when `target` is not found below
    /// `sequence`.
    pub fn remove(&mut self, sequence: NodeId, target: NodeId) -> bool {
        let Some(holder) = self.parent(target) else {
            return false;
        };
        if !self.is_ancestor_or_self(sequence, holder) {
            return false;
        }
        let removed = match &mut self.nodes[holder.index()].kind {
            NodeKind::Sequence(s) => s.remove_child(target),
            NodeKind::Element(_) => false,
        };
        if removed {
            self.nodes[target.index()].parent = None;
            debug!(parent = %holder, child = %target, "child removed");
        }
        removed
    }

    /// Move every child of `source` to the end of `target`, in order.
    ///
    /// `source` is left empty. Fails without changing anything if
    /// either node is not a sequence or `target` lies inside `source`.
    pub fn concatenate(&mut self, target: NodeId, source: NodeId) -> Result<(), LatticeError> {
        for n in [target, source] {
            match self.kind(n) {
                None => return Err(LatticeError::UnknownNode(n)),
                Some(NodeKind::Element(_)) => return Err(LatticeError::NotASequence(n)),
                Some(NodeKind::Sequence(_)) => {}
            }
        }
        if self.is_ancestor_or_self(source, target) {
            return Err(LatticeError::Cycle {
                parent: target,
                child: source,
            });
        }
        let moved = match &mut self.nodes[source.index()].kind {
            NodeKind::Sequence(s) => s.take_children(),
            NodeKind::Element(_) => Vec::new(),
        };
        debug!(target = %target, source = %source, moved = moved.len(), "sequences concatenated");
        for child in moved {
            self.attach(target, child);
        }
        Ok(())
    }

    // ── Structure ──────────────────────────────────────────────────

    /// Direct children of a sequence in beam order.
    pub fn children(&self, node: NodeId) -> Option<&[NodeId]> {
        self.sequence(node).map(ElementSeq::children)
    }

    /// Direct children of a sequence in reverse beam order.
    pub fn children_rev(&self, node: NodeId) -> Option<&[NodeId]> {
        self.sequence(node).map(ElementSeq::children_rev)
    }

    /// Number of direct children of a sequence.
    pub fn child_count(&self, node: NodeId) -> Option<usize> {
        self.sequence(node).map(ElementSeq::child_count)
    }

    /// Child of a sequence by beam-order index.
    pub fn child(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.sequence(node)?.child(index)
    }

    /// Every node below `node`, pre-order and depth-first, excluding
    /// `node` itself. Empty for elements and unknown handles.
    pub fn global_iter(&self, node: NodeId) -> GlobalIter<'_> {
        GlobalIter::new(self, node)
    }

    /// The reversal of [`global_iter`](Self::global_iter).
    pub fn global_back_iter(&self, node: NodeId) -> std::iter::Rev<std::vec::IntoIter<NodeId>> {
        self.global_iter(node).collect::<Vec<_>>().into_iter().rev()
    }

    /// Number of elements at or below `node`.
    pub fn leaf_count(&self, node: NodeId) -> usize {
        match self.kind(node) {
            None => 0,
            Some(NodeKind::Element(_)) => 1,
            Some(NodeKind::Sequence(_)) => self
                .global_iter(node)
                .filter(|&n| self.element(n).is_some())
                .count(),
        }
    }

    /// Every element at or below `node`, flattened in beam order.
    pub fn all_elements(&self, node: NodeId) -> Vec<NodeId> {
        match self.kind(node) {
            None => Vec::new(),
            Some(NodeKind::Element(_)) => vec![node],
            Some(NodeKind::Sequence(_)) => self
                .global_iter(node)
                .filter(|&n| self.element(n).is_some())
                .collect(),
        }
    }

    // ── Geometry ───────────────────────────────────────────────────

    fn length_of(&self, node: NodeId) -> f64 {
        match self.kind(node) {
            None => 0.0,
            Some(NodeKind::Element(e)) => e.length(),
            Some(NodeKind::Sequence(s)) => s
                .length_override()
                .unwrap_or_else(|| s.children().iter().map(|&c| self.length_of(c)).sum()),
        }
    }

    /// Length of a node (m): the element length, or the sum of the
    /// children unless the sequence overrides it.
    pub fn length(&self, node: NodeId) -> Option<f64> {
        self.contains(node).then(|| self.length_of(node))
    }

    /// Position of a node's center within its parent (m).
    ///
    /// Elements report their stored position. A sequence inside a
    /// parent sits after its preceding siblings; a root sequence sits at
    /// half its own length.
    pub fn position(&self, node: NodeId) -> Option<f64> {
        match self.kind(node)? {
            NodeKind::Element(e) => Some(e.position()),
            NodeKind::Sequence(_) => {
                let half = self.length_of(node) / 2.0;
                let Some(parent) = self.parent(node) else {
                    return Some(half);
                };
                let preceding: f64 = self
                    .children(parent)?
                    .iter()
                    .take_while(|&&c| c != node)
                    .map(|&c| self.length_of(c))
                    .sum();
                Some(preceding + half)
            }
        }
    }

    /// Absolute position of a node's center in the lattice frame (m).
    pub fn lattice_position(&self, node: NodeId) -> Option<f64> {
        let local = self.position(node)?;
        match self.parent(node) {
            None => Some(local),
            Some(p) => Some(self.lattice_position(p)? - self.length_of(p) / 2.0 + local),
        }
    }

    /// Distance of `s_probe` from the entrance of `node` (m).
    pub fn probe_location(&self, node: NodeId, s_probe: f64) -> Option<f64> {
        let abs = self.lattice_position(node)?;
        match self.kind(node)? {
            NodeKind::Element(e) => Some(e.probe_location(abs, s_probe)),
            NodeKind::Sequence(_) => Some(s_probe - (abs - self.length_of(node) / 2.0)),
        }
    }

    /// Resolve an element's nearby-element references to elements.
    ///
    /// References to sequences or unknown handles are skipped.
    pub fn close_elements(&self, node: NodeId) -> Vec<(NodeId, &Element)> {
        let Some(e) = self.element(node) else {
            return Vec::new();
        };
        e.attrs()
            .close_elements()
            .iter()
            .filter_map(|&n| self.element(n).map(|c| (n, c)))
            .collect()
    }
}
