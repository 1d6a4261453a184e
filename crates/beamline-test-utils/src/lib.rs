//! Test utilities for beamline development.
//!
//! Provides [`ParticleProbe`], a minimal single-particle implementation
//! of [`Probe`] and [`AdvanceProbe`], a test logging hook, and reusable
//! element and lattice fixtures in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::Once;

use beamline_core::relativity::kinetic_energy_from_beta;
use beamline_core::{AdvanceProbe, PhaseVector, Probe, Transfer};
use tracing_subscriber::EnvFilter;

/// Proton rest energy (eV).
pub const PROTON_REST_ENERGY: f64 = 938.272_088_16e6;

/// H⁻ rest energy (eV).
pub const H_MINUS_REST_ENERGY: f64 = 939.294_308e6;

static INIT_LOGGING: Once = Once::new();

/// Install a `tracing` subscriber writing to the test output.
///
/// Filtered by `RUST_LOG`, defaulting to `beamline=debug`. Safe to call
/// from every test; only the first call has any effect.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("beamline=debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// A single particle tracked through a lattice.
///
/// All state is public for direct inspection in tests.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleProbe {
    pub charge: f64,
    pub rest_energy: f64,
    pub kinetic_energy: f64,
    pub phase: f64,
    pub position: f64,
    pub time: f64,
    pub coords: PhaseVector,
    pub rf_gap_phase_calculation: bool,
    /// Number of steps applied through [`AdvanceProbe::advance`].
    pub steps: usize,
}

impl ParticleProbe {
    pub fn new(charge: f64, rest_energy: f64, kinetic_energy: f64) -> Self {
        Self {
            charge,
            rest_energy,
            kinetic_energy,
            phase: 0.0,
            position: 0.0,
            time: 0.0,
            coords: PhaseVector::origin(),
            rf_gap_phase_calculation: true,
            steps: 0,
        }
    }

    /// A proton with kinetic energy `w` (eV).
    pub fn proton(w: f64) -> Self {
        Self::new(1.0, PROTON_REST_ENERGY, w)
    }

    /// A proton moving at `beta`.
    pub fn proton_at_beta(beta: f64) -> Self {
        Self::proton(kinetic_energy_from_beta(beta, PROTON_REST_ENERGY))
    }

    /// An H⁻ ion with kinetic energy `w` (eV).
    pub fn h_minus(w: f64) -> Self {
        Self::new(-1.0, H_MINUS_REST_ENERGY, w)
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_position(mut self, position: f64) -> Self {
        self.position = position;
        self
    }

    pub fn with_coords(mut self, coords: PhaseVector) -> Self {
        self.coords = coords;
        self
    }

    pub fn with_rf_gap_phase_calculation(mut self, enabled: bool) -> Self {
        self.rf_gap_phase_calculation = enabled;
        self
    }
}

impl Probe for ParticleProbe {
    fn species_charge(&self) -> f64 {
        self.charge
    }

    fn species_rest_energy(&self) -> f64 {
        self.rest_energy
    }

    fn kinetic_energy(&self) -> f64 {
        self.kinetic_energy
    }

    fn longitudinal_phase(&self) -> f64 {
        self.phase
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn rf_gap_phase_calculation(&self) -> bool {
        self.rf_gap_phase_calculation
    }
}

impl AdvanceProbe for ParticleProbe {
    fn advance(&mut self, transfer: &Transfer) {
        self.coords = transfer.map.apply(&self.coords);
        self.kinetic_energy += transfer.energy_gain;
        self.phase += transfer.phase_advance;
        self.position += transfer.length;
        self.time += transfer.elapsed_time;
        self.steps += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamline_core::PhaseMatrix;

    #[test]
    fn proton_at_beta_round_trips() {
        let p = ParticleProbe::proton_at_beta(0.5);
        assert!((p.beta() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn advance_applies_every_field() {
        let mut p = ParticleProbe::proton(1.0e6).with_coords(PhaseVector::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0));
        p.advance(&Transfer {
            map: PhaseMatrix::translation(0.5, 0.0, 0.0),
            length: 2.0,
            energy_gain: 1.0e5,
            elapsed_time: 1e-9,
            phase_advance: 0.25,
        });
        assert_eq!(p.coords.x(), 1.5);
        assert_eq!(p.kinetic_energy, 1.1e6);
        assert_eq!(p.phase, 0.25);
        assert_eq!(p.position, 2.0);
        assert_eq!(p.time, 1e-9);
        assert_eq!(p.steps, 1);
    }

    #[test]
    fn h_minus_is_negative() {
        assert_eq!(ParticleProbe::h_minus(2.5e6).species_charge(), -1.0);
    }

    #[test]
    fn logging_init_is_idempotent() {
        init_test_logging();
        init_test_logging();
    }
}
