//! Lattice structure and propagation for the beamline modeling framework.
//!
//! A [`Lattice`] is an arena of nodes addressed by
//! [`NodeId`](beamline_core::NodeId). Each node is either an
//! [`Element`](beamline_element::Element) or an [`ElementSeq`], a
//! composite that owns an ordered list of child nodes and keeps the
//! reverse order alongside it. Nodes carry a parent index instead of a
//! back-pointer, so the tree has a single owner and is `Send + Sync`.
//!
//! # Propagation
//!
//! [`Lattice::propagate`] walks a subtree in forward order, asks each
//! element for its [`Transfer`](beamline_core::Transfer) at the probe's
//! current state and hands it to the probe through
//! [`AdvanceProbe`](beamline_core::AdvanceProbe). The first failing
//! element aborts the walk.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod cavity;
pub mod error;
pub mod iter;
pub mod lattice;
pub mod metrics;
pub mod sequence;
pub mod validate;
pub mod walk;

pub use cavity::{CavityBuilder, CAVITY_TYPE_TAG};
pub use error::{LatticeError, PropagateError};
pub use iter::GlobalIter;
pub use lattice::{Lattice, NodeKind};
pub use metrics::WalkMetrics;
pub use sequence::{ElementSeq, DEFAULT_RESERVE};
pub use validate::validate_lattice;
