//! Reference element physics for the beamline modeling framework.
//!
//! Closed-form magnets build their maps from 2×2 optics blocks (see
//! [`optics`]); the RF gap solves for its phase slip and energy gain
//! before assembling a thin-lens map (see [`rfgap`]).
//!
//! | Physics | Shape | Type tag |
//! |---------|-------|----------|
//! | [`IdealDrift`] | thick | `IdealDrift` |
//! | [`IdealMagQuad`] | thick | `IdealMagQuad` |
//! | [`IdealMagSteeringDipole`] | thin | `IdealMagSteeringDipole` |
//! | [`IdealRfGap`] | thin | `IdealRfGap` |

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod drift;
pub mod optics;
pub mod quadrupole;
pub mod rfgap;
pub mod steering;

pub use drift::IdealDrift;
pub use quadrupole::{IdealMagQuad, Orientation};
pub use rfgap::{
    ConfigError, GapSolverConfig, IdealRfGap, PhaseCalcMode, Polynomial, TransitTimeFactors,
    UnivariateFit,
};
pub use steering::IdealMagSteeringDipole;
