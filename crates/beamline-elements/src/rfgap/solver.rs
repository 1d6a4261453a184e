//! Phase-change and energy-gain computation for a thin RF gap.
//!
//! Three computations share one result type:
//!
//! - [`design`]: the Panofsky formula at the design phase;
//! - [`direct`]: the Panofsky formula at the probe's entrance phase,
//!   with the phase change from the electrical-centre offset;
//! - [`indirect`]: the self-consistent fixed-point search over the
//!   transit-time factors at the mid-gap velocity.
//!
//! All of them are pure functions of their inputs. The gap element
//! decides which to call and maps failures into element errors.

use beamline_core::constants::{LIGHT_SPEED, TWO_PI};
use beamline_core::relativity::{beta_from_energies, beta_from_gamma, gamma_from_energies};
use beamline_core::GapState;
use tracing::trace;

use crate::rfgap::config::GapSolverConfig;
use crate::rfgap::ttf::OffsetFactors;

/// Beam and gap quantities at the gap entrance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GapInputs {
    /// Charge magnitude (units of e).
    pub charge: f64,
    /// Rest energy (eV).
    pub rest_energy: f64,
    /// Kinetic energy at the entrance (eV).
    pub kinetic_energy: f64,
    /// RF phase at the electrical entrance (rad).
    pub entrance_phase: f64,
    /// Peak axial field (V/m).
    pub e0: f64,
    /// Effective gap length (m).
    pub gap_length: f64,
    /// Cavity mode field coefficient `A = cos(nqπ)`.
    pub field_coeff: f64,
    /// RF frequency (Hz).
    pub frequency: f64,
}

impl GapInputs {
    /// Entrance velocity.
    pub fn beta(&self) -> f64 {
        beta_from_energies(self.kinetic_energy, self.rest_energy)
    }

    /// RF angular frequency.
    pub fn omega(&self) -> f64 {
        TWO_PI * self.frequency
    }

    /// Voltage scale `Q·A·E0·L` (eV).
    pub fn voltage_scale(&self) -> f64 {
        self.charge * self.field_coeff * self.e0 * self.gap_length
    }
}

/// A solved gap crossing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GapSolution {
    /// Phase at the electrical entrance used by the computation (rad).
    pub entrance_phase: f64,
    /// Phase change across the gap `Δφ` (rad).
    pub phase_change: f64,
    /// Energy gain across the gap `ΔW` (eV).
    pub energy_gain: f64,
    /// Fixed-point iterations performed; zero for closed-form modes.
    pub iterations: u32,
}

impl GapSolution {
    /// `(Δφ, ΔW)` as a state pair.
    pub fn gains(&self) -> GapState {
        GapState::new(self.phase_change, self.energy_gain)
    }

    /// Mid-gap phase and kinetic energy for a probe entering with
    /// `kinetic_energy`.
    pub fn mid_gap(&self, kinetic_energy: f64) -> GapState {
        GapState::new(
            self.entrance_phase + self.phase_change / 2.0,
            kinetic_energy + self.energy_gain / 2.0,
        )
    }
}

/// The fixed-point search stopped at its iteration cap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolveFailure {
    /// Iterations performed.
    pub iterations: u32,
    /// Residual of the final iteration (may be NaN).
    pub residual: f64,
    /// Last `(Δφ, ΔW)` iterate.
    pub last: GapState,
}

/// Design-mode gain: `ΔW = Q·ETL·cos φ_design`, `Δφ = 0`.
pub fn design(charge: f64, etl: f64, design_phase: f64) -> GapSolution {
    GapSolution {
        entrance_phase: design_phase,
        phase_change: 0.0,
        energy_gain: charge * etl * design_phase.cos(),
        iterations: 0,
    }
}

/// Direct (dynamic-phase) gain.
///
/// `ΔW = Q·A·V·cos φ_entry` with `V` the gap voltage amplitude (`ETL`,
/// or `E0·L·T₀(β_i)` when fits are known), and the phase change from
/// the centre offset `Δφ = ω·Δz/c·(1/β_i − 1/β_f)`.
pub fn direct(inputs: &GapInputs, amplitude: f64, gap_offset: f64) -> GapSolution {
    let dw = inputs.charge * inputs.field_coeff * amplitude * inputs.entrance_phase.cos();
    let bi = inputs.beta();
    let bf = beta_from_energies(inputs.kinetic_energy + dw, inputs.rest_energy);
    let dphi = inputs.omega() * gap_offset / LIGHT_SPEED * (1.0 / bi - 1.0 / bf);
    GapSolution {
        entrance_phase: inputs.entrance_phase,
        phase_change: dphi,
        energy_gain: dw,
        iterations: 0,
    }
}

/// Self-consistent (dynamic-energy) gain by fixed-point iteration.
///
/// Starting from `seed` (`Δφ`, `ΔW`), each iteration evaluates the
/// energy gain at the current mid-gap phase and velocity, updates the
/// mid-gap velocity, and recomputes the phase change from the
/// transit-time-factor derivatives. The search stops when
/// `|Δφ_new − 2(φ_mid − φ_entry)| < tolerance`. A NaN residual never
/// satisfies the test, so a search that produces NaN runs to the cap.
pub fn indirect(
    inputs: &GapInputs,
    factors: &OffsetFactors<'_>,
    config: &GapSolverConfig,
    seed: GapState,
) -> Result<GapSolution, SolveFailure> {
    let er = inputs.rest_energy;
    let wi = inputs.kinetic_energy;
    let phi0 = inputs.entrance_phase;
    let qael = inputs.voltage_scale();

    let mut dphi = seed.phase;
    let mut dw = seed.energy;
    let mut b_mid = beta_from_energies(wi + dw / 2.0, er);
    let mut residual = f64::NAN;

    for iteration in 1..=config.max_iterations {
        let phi = phi0 + dphi / 2.0;
        dw = qael * (factors.t(b_mid) * phi.cos() - factors.s(b_mid) * phi.sin());

        let g_mid = gamma_from_energies(wi + dw / 2.0, er);
        b_mid = beta_from_gamma(g_mid);
        let r_mid = 1.0 / (b_mid * b_mid * g_mid * g_mid * g_mid);

        let dphi_new = -(qael / er)
            * r_mid
            * b_mid
            * (factors.tp(b_mid) * phi.sin() - factors.sp(b_mid) * phi.cos());
        residual = (dphi_new - 2.0 * (phi - phi0)).abs();
        dphi = dphi_new;

        trace!(
            iteration,
            beta_mid = b_mid,
            phase_change = dphi,
            energy_gain = dw,
            residual,
            "gap solver iteration"
        );

        if residual < config.tolerance {
            return Ok(GapSolution {
                entrance_phase: phi0,
                phase_change: dphi,
                energy_gain: dw,
                iterations: iteration,
            });
        }
    }

    Err(SolveFailure {
        iterations: config.max_iterations,
        residual,
        last: GapState::new(dphi, dw),
    })
}
