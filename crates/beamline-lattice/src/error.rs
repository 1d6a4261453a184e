//! Lattice construction and propagation errors.

use beamline_core::{ModelError, NodeId};
use thiserror::Error;

/// Errors from building or validating a lattice.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LatticeError {
    /// The handle does not name a node of this lattice.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    /// The node is an element where a sequence is required.
    #[error("node {0} is not a sequence")]
    NotASequence(NodeId),
    /// The node is a sequence where an element is required.
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),
    /// The child already belongs to a sequence.
    #[error("node {child} already has parent {parent}")]
    AlreadyParented {
        /// The child being added.
        child: NodeId,
        /// Its current parent.
        parent: NodeId,
    },
    /// Adding the child would make a node its own ancestor.
    #[error("adding {child} under {parent} would create a cycle")]
    Cycle {
        /// The prospective parent.
        parent: NodeId,
        /// The child being added.
        child: NodeId,
    },
    /// A length is negative or not finite.
    #[error("node '{node}' has invalid length {length}")]
    InvalidLength {
        /// Id of the offending node.
        node: String,
        /// The invalid length.
        length: f64,
    },
    /// A cavity does not have exactly one first gap.
    #[error("cavity '{cavity}' has {count} first gaps, expected exactly 1")]
    FirstGapCount {
        /// Id of the offending cavity.
        cavity: String,
        /// Number of gaps flagged as first.
        count: usize,
    },
    /// A cavity was configured with invalid parameters.
    #[error("cavity '{cavity}': {reason}")]
    InvalidCavity {
        /// Id of the offending cavity.
        cavity: String,
        /// Human-readable description.
        reason: String,
    },
}

/// Errors from walking a probe through a lattice.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum PropagateError {
    /// The handle does not name a node of this lattice.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    /// An element could not compute its step; the walk stopped there.
    #[error("element '{element}' at {node} failed: {source}")]
    ElementFailed {
        /// Handle of the failing element.
        node: NodeId,
        /// Instance id of the failing element.
        element: String,
        /// The underlying model error.
        #[source]
        source: ModelError,
    },
}
