//! Beamline: linear-map beam transport with a self-consistent RF gap
//! solver.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all beamline sub-crates. For most users, adding `beamline` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use beamline::prelude::*;
//!
//! // A caller-owned probe: one proton tracked by its energy and position.
//! #[derive(Clone)]
//! struct Proton {
//!     w: f64,
//!     phase: f64,
//!     s: f64,
//!     coords: PhaseVector,
//! }
//!
//! impl Probe for Proton {
//!     fn species_charge(&self) -> f64 { 1.0 }
//!     fn species_rest_energy(&self) -> f64 { 938.272e6 }
//!     fn kinetic_energy(&self) -> f64 { self.w }
//!     fn longitudinal_phase(&self) -> f64 { self.phase }
//!     fn position(&self) -> f64 { self.s }
//! }
//!
//! impl AdvanceProbe for Proton {
//!     fn advance(&mut self, t: &Transfer) {
//!         self.coords = t.map.apply(&self.coords);
//!         self.w += t.energy_gain;
//!         self.phase += t.phase_advance;
//!         self.s += t.length;
//!     }
//! }
//!
//! let mut lattice = Lattice::new();
//! let root = lattice.add_sequence(ElementSeq::new("LINE"));
//! let q = lattice.add_element(IdealMagQuad::element("Q1", 0.1, 15.0, Orientation::Horizontal));
//! let d = lattice.add_element(IdealDrift::element("D1", 0.5));
//! lattice.add_child(root, q).unwrap();
//! lattice.add_child(root, d).unwrap();
//!
//! let mut p = Proton {
//!     w: 2.5e6,
//!     phase: 0.0,
//!     s: 0.0,
//!     coords: PhaseVector::new(1e-3, 0.0, 1e-3, 0.0, 0.0, 0.0),
//! };
//! let metrics = lattice.propagate(root, &mut p).unwrap();
//! assert_eq!(metrics.elements, 2);
//! assert!((p.s - 0.6).abs() < 1e-12);
//! // Horizontal quadrupole: focuses x, defocuses y.
//! assert!(p.coords.x() < 1e-3);
//! assert!(p.coords.y() > 1e-3);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `beamline-core` | IDs, errors, phase matrices, probe traits |
//! | [`element`] | `beamline-element` | Element, thin/thick physics traits, misalignment |
//! | [`elements`] | `beamline-elements` | Drift, quadrupole, steering dipole, RF gap |
//! | [`lattice`] | `beamline-lattice` | Lattice arena, traversal, walks, cavities |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`beamline-core`).
pub use beamline_core as types;

/// The element abstraction (`beamline-element`).
///
/// [`element::Element`] pairs shared attributes with a
/// [`element::ThinMap`] or [`element::ThickMap`] physics object.
pub use beamline_element as element;

/// Reference element physics (`beamline-elements`).
pub use beamline_elements as elements;

/// Lattice structure and propagation (`beamline-lattice`).
pub use beamline_lattice as lattice;

/// Common imports for typical beamline usage.
///
/// ```rust
/// use beamline::prelude::*;
/// ```
pub mod prelude {
    // Core
    pub use beamline_core::{
        AdvanceProbe, GapState, ModelError, NodeId, PhaseMatrix, PhaseVector, Plane, Probe,
        Transfer,
    };

    // Elements
    pub use beamline_element::{Alignment, Element, ElementAttrs, SlicePosition, ThickMap, ThinMap};
    pub use beamline_elements::{
        GapSolverConfig, IdealDrift, IdealMagQuad, IdealMagSteeringDipole, IdealRfGap,
        Orientation, PhaseCalcMode, Polynomial, TransitTimeFactors,
    };

    // Lattice
    pub use beamline_lattice::{
        validate_lattice, CavityBuilder, ElementSeq, Lattice, LatticeError, PropagateError,
        WalkMetrics,
    };
}
