//! Identity and placement attributes shared by every element.

use beamline_core::{ElementUid, NodeId};
use smallvec::SmallVec;

use crate::align::Alignment;

/// Identity, placement and misalignment of an element.
///
/// Set once during lattice construction and read during propagation.
/// The UID is allocated at construction and cannot be changed.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementAttrs {
    uid: ElementUid,
    type_tag: String,
    id: String,
    hardware_node_id: String,
    position: f64,
    alignment: Alignment,
    close_elements: SmallVec<[NodeId; 4]>,
}

impl ElementAttrs {
    /// New attributes with a fresh UID, at local position 0 and with
    /// no misalignment.
    pub fn new(type_tag: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            uid: ElementUid::next(),
            type_tag: type_tag.into(),
            id: id.into(),
            hardware_node_id: String::new(),
            position: 0.0,
            alignment: Alignment::default(),
            close_elements: SmallVec::new(),
        }
    }

    /// Builder: set the hardware-node id.
    pub fn with_hardware_node(mut self, node: impl Into<String>) -> Self {
        self.hardware_node_id = node.into();
        self
    }

    /// Builder: set the local position (m, element centre).
    pub fn with_position(mut self, position: f64) -> Self {
        self.position = position;
        self
    }

    /// Builder: set the misalignment offsets.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Process-wide unique id.
    pub fn uid(&self) -> ElementUid {
        self.uid
    }

    /// Soft type tag (e.g. `"IdealDrift"`).
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Instance id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Set the instance id.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Id of the hardware node this element models (may be empty).
    pub fn hardware_node_id(&self) -> &str {
        &self.hardware_node_id
    }

    /// Set the hardware-node id.
    pub fn set_hardware_node_id(&mut self, node: impl Into<String>) {
        self.hardware_node_id = node.into();
    }

    /// Local position of the element centre within its parent (m).
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Set the local position.
    pub fn set_position(&mut self, position: f64) {
        self.position = position;
    }

    /// Misalignment offsets.
    pub fn alignment(&self) -> &Alignment {
        &self.alignment
    }

    /// Set the misalignment offsets.
    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }

    /// Nearby elements whose fields couple into this one.
    pub fn close_elements(&self) -> &[NodeId] {
        &self.close_elements
    }

    /// Register a nearby element. Duplicates are ignored.
    pub fn add_close_element(&mut self, node: NodeId) {
        if !self.close_elements.contains(&node) {
            self.close_elements.push(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields_and_fresh_uid() {
        let a = ElementAttrs::new("IdealDrift", "D1")
            .with_hardware_node("DTL_Mag:DR1")
            .with_position(1.25)
            .with_alignment(Alignment::new(1e-3, 0.0, 0.0));
        let b = ElementAttrs::new("IdealDrift", "D1");
        assert_ne!(a.uid(), b.uid());
        assert_eq!(a.type_tag(), "IdealDrift");
        assert_eq!(a.hardware_node_id(), "DTL_Mag:DR1");
        assert_eq!(a.position(), 1.25);
        assert_eq!(a.alignment().dx, 1e-3);
    }

    #[test]
    fn close_elements_deduplicate() {
        let mut a = ElementAttrs::new("IdealRfGap", "G1");
        a.add_close_element(NodeId(3));
        a.add_close_element(NodeId(3));
        a.add_close_element(NodeId(5));
        assert_eq!(a.close_elements(), &[NodeId(3), NodeId(5)]);
    }
}
