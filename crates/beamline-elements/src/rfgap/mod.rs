//! RF accelerating gap: transit-time factors, the phase/energy solver
//! and the thin-lens gap element.
//!
//! A particle crossing a gap gains energy that depends on the transit
//! time factors at its mid-gap velocity, which in turn depends on the
//! energy gained. [`solver`] resolves that circular dependency by
//! fixed-point iteration; [`IdealRfGap`] turns the result into a
//! thin-lens map.

pub mod config;
pub mod fit;
pub mod gap;
pub mod solver;
pub mod ttf;

pub use config::{ConfigError, GapSolverConfig, PhaseCalcMode};
pub use fit::{Polynomial, UnivariateFit};
pub use gap::IdealRfGap;
pub use solver::{GapInputs, GapSolution, SolveFailure};
pub use ttf::{OffsetFactors, TransitTimeFactors};
