//! [`ElementSeq`]: the composite node of a lattice.

use beamline_core::NodeId;

/// Child slots reserved by a new sequence.
pub const DEFAULT_RESERVE: usize = 10;

/// An ordered composite of child nodes.
///
/// The forward list is the beam order; the reverse list is always its
/// exact reversal. Both are updated together by the owning
/// [`Lattice`](crate::Lattice), which is the only way to add or remove
/// children.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementSeq {
    type_tag: String,
    id: String,
    hardware_node_id: String,
    comments: String,
    length_override: Option<f64>,
    forward: Vec<NodeId>,
    reverse: Vec<NodeId>,
}

impl ElementSeq {
    /// Type tag of a plain sequence.
    pub const TYPE_TAG: &'static str = "ElementSeq";

    /// An empty sequence with the default type tag.
    pub fn new(id: impl Into<String>) -> Self {
        Self::tagged(Self::TYPE_TAG, id)
    }

    /// An empty sequence with a custom type tag.
    pub fn tagged(type_tag: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            id: id.into(),
            hardware_node_id: String::new(),
            comments: String::new(),
            length_override: None,
            forward: Vec::with_capacity(DEFAULT_RESERVE),
            reverse: Vec::with_capacity(DEFAULT_RESERVE),
        }
    }

    /// Builder: set the hardware-node id.
    pub fn with_hardware_node(mut self, node: impl Into<String>) -> Self {
        self.hardware_node_id = node.into();
        self
    }

    /// Builder: fix the length independently of the children.
    pub fn with_length_override(mut self, length: f64) -> Self {
        self.length_override = Some(length);
        self
    }

    /// Soft type tag.
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Instance id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Hardware-node id (may be empty).
    pub fn hardware_node_id(&self) -> &str {
        &self.hardware_node_id
    }

    /// Free-text comments.
    pub fn comments(&self) -> &str {
        &self.comments
    }

    /// Replace the comments.
    pub fn set_comments(&mut self, comments: impl Into<String>) {
        self.comments = comments.into();
    }

    /// Independent length, if set.
    pub fn length_override(&self) -> Option<f64> {
        self.length_override
    }

    /// Set or clear the independent length.
    pub fn set_length_override(&mut self, length: Option<f64>) {
        self.length_override = length;
    }

    /// Direct children in beam order.
    pub fn children(&self) -> &[NodeId] {
        &self.forward
    }

    /// Direct children in reverse beam order.
    pub fn children_rev(&self) -> &[NodeId] {
        &self.reverse
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.forward.len()
    }

    /// Child at `index` in beam order.
    pub fn child(&self, index: usize) -> Option<NodeId> {
        self.forward.get(index).copied()
    }

    /// Whether `node` is a direct child.
    pub fn contains(&self, node: NodeId) -> bool {
        self.forward.contains(&node)
    }

    pub(crate) fn push_child(&mut self, node: NodeId) {
        self.forward.push(node);
        self.reverse.insert(0, node);
    }

    /// Remove a direct child; returns whether it was present.
    pub(crate) fn remove_child(&mut self, node: NodeId) -> bool {
        let Some(i) = self.forward.iter().position(|&c| c == node) else {
            return false;
        };
        self.forward.remove(i);
        let j = self.reverse.len() - 1 - i;
        self.reverse.remove(j);
        true
    }

    pub(crate) fn take_children(&mut self) -> Vec<NodeId> {
        self.reverse.clear();
        std::mem::take(&mut self.forward)
    }
}
