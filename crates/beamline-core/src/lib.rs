//! Core types and traits for the beamline modeling framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the workspace:
//! identifiers, the error taxonomy, physical constants, relativistic
//! conversions, the 7×7 homogeneous transfer primitive, and the probe
//! traits through which elements read and callers advance beam state.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod constants;
pub mod error;
pub mod id;
pub mod phase;
pub mod probe;
pub mod relativity;
pub mod transfer;

pub use error::ModelError;
pub use id::{ElementUid, NodeId};
pub use phase::{PhaseMatrix, PhaseVector, Plane};
pub use probe::{AdvanceProbe, Probe};
pub use transfer::{GapState, Transfer};
