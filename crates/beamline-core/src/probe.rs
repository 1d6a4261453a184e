//! The read-only view of beam state that elements consume, and the
//! caller-owned hook that applies a computed step.

use crate::relativity;
use crate::transfer::Transfer;

/// Beam state read by element physics.
///
/// Energies are in eV, charge in units of the elementary charge
/// (signed), phase in radians, position in metres from the lattice
/// origin.
pub trait Probe {
    /// Signed charge of the species (units of e).
    fn species_charge(&self) -> f64;

    /// Rest energy of the species (eV).
    fn species_rest_energy(&self) -> f64;

    /// Current kinetic energy (eV).
    fn kinetic_energy(&self) -> f64;

    /// Current longitudinal RF phase (rad).
    fn longitudinal_phase(&self) -> f64;

    /// Current absolute lattice position (m).
    fn position(&self) -> f64;

    /// Lorentz factor at the current energy.
    fn gamma(&self) -> f64 {
        relativity::gamma_from_energies(self.kinetic_energy(), self.species_rest_energy())
    }

    /// Normalized velocity at the current energy.
    fn beta(&self) -> f64 {
        relativity::beta_from_gamma(self.gamma())
    }

    /// Momentum at the current energy (eV/c).
    fn momentum(&self) -> f64 {
        relativity::momentum(self.kinetic_energy(), self.species_rest_energy())
    }

    /// Whether the tracking algorithm asks RF gaps to solve for the
    /// phase self-consistently. When `false`, gaps use the direct
    /// (DynPhase) computation regardless of their own mode.
    fn rf_gap_phase_calculation(&self) -> bool {
        true
    }
}

/// A probe that can apply a step computed by an element.
///
/// Implemented by the caller; the lattice walk invokes it once per
/// element in walk order.
pub trait AdvanceProbe: Probe {
    /// Apply `transfer` to this probe's state.
    fn advance(&mut self, transfer: &Transfer);
}
