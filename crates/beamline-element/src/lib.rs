//! The beamline element abstraction for the beamline modeling framework.
//!
//! An [`Element`] is one physical or logical unit of a lattice. It is
//! either thin (zero length, an instantaneous kick) or thick (finite
//! length, possibly one slice of a longer hardware node). The physics
//! of an element lives behind the [`ThinMap`] and [`ThickMap`] traits;
//! the element wraps the physics with identity, placement and
//! misalignment, and turns it into a [`Transfer`](beamline_core::Transfer)
//! that the caller applies to its probe.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod align;
pub mod attrs;
pub mod element;
pub mod thick;
pub mod thin;

pub use align::{apply_align_error, apply_sliced_align_error, Alignment, SlicePosition};
pub use attrs::ElementAttrs;
pub use element::{Element, ElementBody};
pub use thick::ThickMap;
pub use thin::ThinMap;
