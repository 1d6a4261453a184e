//! [`IdealRfGap`]: thin-lens RF accelerating gap.

use std::f64::consts::PI;

use beamline_core::constants::{LIGHT_SPEED, TWO_PI};
use beamline_core::relativity::{beta_from_gamma, gamma_from_energies};
use beamline_core::{GapState, ModelError, PhaseMatrix, Probe, Transfer};
use beamline_element::{Element, ElementAttrs, ThinMap};
use nalgebra::Matrix2;
use tracing::{trace, warn};

use crate::rfgap::config::{ConfigError, GapSolverConfig, PhaseCalcMode};
use crate::rfgap::solver::{self, GapInputs, GapSolution};
use crate::rfgap::ttf::TransitTimeFactors;

/// Thin-lens model of one accelerating gap of an RF cavity.
///
/// The gap imparts an energy gain `ΔW` and a phase change `Δφ`
/// computed according to its [`PhaseCalcMode`], then focuses the beam
/// as a thin lens evaluated at mid-gap. The first gap of a cavity
/// resets the probe phase to the cavity's design phase.
///
/// # Examples
///
/// ```
/// use beamline_elements::{IdealRfGap, PhaseCalcMode};
///
/// let gap = IdealRfGap::new(4.0e4, -0.5, 352.21e6)
///     .with_field(2.0e6, 0.02)
///     .with_mode(PhaseCalcMode::Design);
/// assert_eq!(gap.cavity_field_coeff(), 1.0);
/// let element = gap.into_element("G1");
/// assert_eq!(element.length(), 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct IdealRfGap {
    etl: f64,
    phase: f64,
    frequency: f64,
    e0: f64,
    gap_length: f64,
    gap_offset: f64,
    first_gap: bool,
    end_cell: bool,
    cell_index: u32,
    mode_constant: f64,
    fits: Option<TransitTimeFactors>,
    mode: PhaseCalcMode,
    config: GapSolverConfig,
}

impl IdealRfGap {
    /// Type tag carried by gap elements.
    pub const TYPE_TAG: &'static str = "IdealRfGap";

    /// A gap with voltage `etl` (V), design `phase` (rad) and RF
    /// `frequency` (Hz).
    pub fn new(etl: f64, phase: f64, frequency: f64) -> Self {
        Self {
            etl,
            phase,
            frequency,
            e0: 0.0,
            gap_length: 0.0,
            gap_offset: 0.0,
            first_gap: false,
            end_cell: false,
            cell_index: 0,
            mode_constant: 0.0,
            fits: None,
            mode: PhaseCalcMode::default(),
            config: GapSolverConfig::default(),
        }
    }

    /// Builder: peak field `e0` (V/m) and effective gap length (m).
    pub fn with_field(mut self, e0: f64, gap_length: f64) -> Self {
        self.e0 = e0;
        self.gap_length = gap_length;
        self
    }

    /// Builder: offset of the electrical centre from the geometric
    /// centre (m).
    pub fn with_gap_offset(mut self, gap_offset: f64) -> Self {
        self.gap_offset = gap_offset;
        self
    }

    /// Builder: transit-time-factor fits.
    pub fn with_fits(mut self, fits: TransitTimeFactors) -> Self {
        self.fits = Some(fits);
        self
    }

    /// Builder: phase calculation mode.
    pub fn with_mode(mut self, mode: PhaseCalcMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder: solver parameters, validated.
    pub fn with_solver_config(mut self, config: GapSolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Builder: cell index within the cavity and the cavity mode
    /// constant.
    pub fn with_cell(mut self, cell_index: u32, mode_constant: f64) -> Self {
        self.cell_index = cell_index;
        self.mode_constant = mode_constant;
        self
    }

    /// Wrap into a thin element with the given instance id.
    pub fn into_element(self, id: impl Into<String>) -> Element {
        Element::thin(ElementAttrs::new(Self::TYPE_TAG, id), self)
    }

    /// Gap voltage `E·T·L` (V).
    pub fn etl(&self) -> f64 {
        self.etl
    }

    /// Design phase (rad).
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Set the design phase.
    pub fn set_phase(&mut self, phase: f64) {
        self.phase = phase;
    }

    /// RF frequency (Hz).
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Set the RF frequency.
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
    }

    /// Peak axial field (V/m).
    pub fn e0(&self) -> f64 {
        self.e0
    }

    /// Effective gap length (m).
    pub fn gap_length(&self) -> f64 {
        self.gap_length
    }

    /// Electrical-centre offset (m).
    pub fn gap_offset(&self) -> f64 {
        self.gap_offset
    }

    /// Whether this gap resets the probe phase to the design phase.
    pub fn is_first_gap(&self) -> bool {
        self.first_gap
    }

    /// Mark or unmark this gap as the first of its cavity.
    pub fn set_first_gap(&mut self, first: bool) {
        self.first_gap = first;
    }

    /// Whether this gap sits in the last cell of its cavity.
    pub fn is_end_cell(&self) -> bool {
        self.end_cell
    }

    /// Mark or unmark this gap as in the last cell.
    pub fn set_end_cell(&mut self, end: bool) {
        self.end_cell = end;
    }

    /// 0-based cell index within the cavity.
    pub fn cell_index(&self) -> u32 {
        self.cell_index
    }

    /// Set the cell index.
    pub fn set_cell_index(&mut self, index: u32) {
        self.cell_index = index;
    }

    /// Cavity mode constant `q` (0 for 0-mode, 1 for π-mode).
    pub fn mode_constant(&self) -> f64 {
        self.mode_constant
    }

    /// Set the cavity mode constant.
    pub fn set_mode_constant(&mut self, q: f64) {
        self.mode_constant = q;
    }

    /// Configured phase calculation mode.
    pub fn mode(&self) -> PhaseCalcMode {
        self.mode
    }

    /// Solver parameters.
    pub fn solver_config(&self) -> &GapSolverConfig {
        &self.config
    }

    /// Transit-time-factor fits, if any.
    pub fn fits(&self) -> Option<&TransitTimeFactors> {
        self.fits.as_ref()
    }

    /// Cavity field coefficient `A = cos(nqπ)`.
    pub fn cavity_field_coeff(&self) -> f64 {
        (f64::from(self.cell_index) * self.mode_constant * PI).cos()
    }

    /// RF wavelength `λ = c/f` (m).
    pub fn wavelength(&self) -> f64 {
        LIGHT_SPEED / self.frequency
    }

    /// The mode actually used for `probe`: a probe that disables RF-gap
    /// phase calculation forces the direct computation.
    pub fn effective_mode(&self, probe: &dyn Probe) -> PhaseCalcMode {
        if probe.rf_gap_phase_calculation() {
            self.mode
        } else {
            PhaseCalcMode::DynPhase
        }
    }

    /// Phase at the geometric centre: the design phase for the first
    /// gap, otherwise the probe phase.
    fn carried_phase(&self, probe: &dyn Probe) -> f64 {
        if self.first_gap {
            self.phase
        } else {
            probe.longitudinal_phase()
        }
    }

    /// Phase at the electrical entrance for `mode`.
    fn entrance_phase(&self, probe: &dyn Probe, mode: PhaseCalcMode) -> f64 {
        let phi0 = self.carried_phase(probe);
        match mode {
            PhaseCalcMode::Design => phi0,
            PhaseCalcMode::DynPhase | PhaseCalcMode::DynEnergy => {
                phi0 + TWO_PI * self.frequency * self.gap_offset / (probe.beta() * LIGHT_SPEED)
            }
        }
    }

    fn check_probe(&self, id: &str, probe: &dyn Probe) -> Result<(), ModelError> {
        let beta = probe.beta();
        if !(beta > 0.0 && beta < 1.0) {
            return Err(ModelError::InvalidParameter {
                element: id.to_owned(),
                parameter: "beta",
                reason: format!("probe velocity must lie in (0, 1), got {beta}"),
            });
        }
        Ok(())
    }

    fn check_frequency(&self, id: &str) -> Result<(), ModelError> {
        if self.frequency == 0.0 {
            return Err(ModelError::MissingParameter {
                element: id.to_owned(),
                parameter: "frequency",
            });
        }
        if !(self.frequency > 0.0 && self.frequency.is_finite()) {
            return Err(ModelError::InvalidParameter {
                element: id.to_owned(),
                parameter: "frequency",
                reason: format!("must be finite and positive, got {}", self.frequency),
            });
        }
        Ok(())
    }

    /// The fitted modes build their amplitude from `E0·L`, so both must be
    /// set once transit-time factors are in play.
    fn check_field(&self, id: &str) -> Result<(), ModelError> {
        for (parameter, value) in [("field", self.e0), ("gap length", self.gap_length)] {
            if value == 0.0 {
                return Err(ModelError::MissingParameter {
                    element: id.to_owned(),
                    parameter,
                });
            }
            if !value.is_finite() {
                return Err(ModelError::InvalidParameter {
                    element: id.to_owned(),
                    parameter,
                    reason: format!("must be finite, got {value}"),
                });
            }
        }
        Ok(())
    }

    fn inputs(&self, probe: &dyn Probe, mode: PhaseCalcMode) -> GapInputs {
        GapInputs {
            charge: probe.species_charge().abs(),
            rest_energy: probe.species_rest_energy(),
            kinetic_energy: probe.kinetic_energy(),
            entrance_phase: self.entrance_phase(probe, mode),
            e0: self.e0,
            gap_length: self.gap_length,
            field_coeff: self.cavity_field_coeff(),
            frequency: self.frequency,
        }
    }

    /// Solve for `(Δφ, ΔW)` starting the fixed-point search from the
    /// default seed.
    pub fn solve(&self, attrs: &ElementAttrs, probe: &dyn Probe) -> Result<GapSolution, ModelError> {
        self.solve_seeded(attrs, probe, GapState::default())
    }

    /// Solve for `(Δφ, ΔW)`, seeding the fixed-point search with
    /// `seed`. Closed-form modes ignore the seed.
    pub fn solve_seeded(
        &self,
        attrs: &ElementAttrs,
        probe: &dyn Probe,
        seed: GapState,
    ) -> Result<GapSolution, ModelError> {
        let id = attrs.id();
        self.check_probe(id, probe)?;
        let mode = self.effective_mode(probe);
        let solution = match mode {
            PhaseCalcMode::Design => {
                solver::design(probe.species_charge().abs(), self.etl, self.phase)
            }
            PhaseCalcMode::DynPhase => {
                self.check_frequency(id)?;
                let inputs = self.inputs(probe, mode);
                let amplitude = match &self.fits {
                    Some(fits) => {
                        self.check_field(id)?;
                        self.e0 * self.gap_length * fits.t0(inputs.beta())
                    }
                    None => self.etl,
                };
                solver::direct(&inputs, amplitude, self.gap_offset)
            }
            PhaseCalcMode::DynEnergy => {
                self.check_frequency(id)?;
                let fits = self.fits.as_ref().ok_or_else(|| ModelError::MissingParameter {
                    element: id.to_owned(),
                    parameter: "transit-time factors",
                })?;
                self.check_field(id)?;
                let inputs = self.inputs(probe, mode);
                let factors = fits.offset(self.frequency, self.gap_offset);
                solver::indirect(&inputs, &factors, &self.config, seed).map_err(|f| {
                    warn!(
                        element = id,
                        iterations = f.iterations,
                        residual = f.residual,
                        "rf gap solver did not converge"
                    );
                    ModelError::NonConvergence {
                        element: id.to_owned(),
                        iterations: f.iterations,
                        residual: f.residual,
                        last: f.last,
                    }
                })?
            }
        };
        trace!(
            element = id,
            mode = ?mode,
            phase_change = solution.phase_change,
            energy_gain = solution.energy_gain,
            iterations = solution.iterations,
            "rf gap solved"
        );
        Ok(solution)
    }

    /// Mid-gap velocity.
    pub fn mid_gap_beta(&self, attrs: &ElementAttrs, probe: &dyn Probe) -> Result<f64, ModelError> {
        let s = self.solve(attrs, probe)?;
        let mid = s.mid_gap(probe.kinetic_energy());
        Ok(beta_from_gamma(gamma_from_energies(
            mid.energy,
            probe.species_rest_energy(),
        )))
    }

    /// Entrance phase combined with the cavity structure phase:
    /// `φ_entry + (nqπ mod 2π)`.
    pub fn effective_phase_at_gap(
        &self,
        attrs: &ElementAttrs,
        probe: &dyn Probe,
    ) -> Result<f64, ModelError> {
        let s = self.solve(attrs, probe)?;
        let structure = f64::from(self.cell_index) * self.mode_constant * PI;
        Ok(s.entrance_phase + structure % TWO_PI)
    }

    /// Transverse focusing constant `k_r` (1/m).
    pub fn trans_focusing(&self, attrs: &ElementAttrs, probe: &dyn Probe) -> Result<f64, ModelError> {
        let s = self.solve(attrs, probe)?;
        Ok(self.focusing(probe, &s).0)
    }

    /// Longitudinal focusing constant `k_z = −2 k_r γ_mid²` (1/m).
    pub fn long_focusing(&self, attrs: &ElementAttrs, probe: &dyn Probe) -> Result<f64, ModelError> {
        let s = self.solve(attrs, probe)?;
        Ok(self.focusing(probe, &s).1)
    }

    /// `(k_r, k_z)` at mid-gap.
    fn focusing(&self, probe: &dyn Probe, s: &GapSolution) -> (f64, f64) {
        let er = probe.species_rest_energy();
        let q = probe.species_charge().abs();
        let mid = s.mid_gap(probe.kinetic_energy());
        let g_mid = gamma_from_energies(mid.energy, er);
        let b_mid = beta_from_gamma(g_mid);
        let bg_mid = b_mid * g_mid;

        let amplitude = match &self.fits {
            Some(fits) => self.e0 * fits.t0(b_mid) * self.gap_length,
            None => self.etl,
        };
        let kr = (PI * self.frequency / LIGHT_SPEED)
            * q
            * self.cavity_field_coeff()
            * amplitude
            * (-mid.phase).sin()
            / (er * bg_mid * bg_mid);
        let kz = -2.0 * kr * g_mid * g_mid;
        (kr, kz)
    }

    /// Thin-lens map for a solved crossing.
    fn thin_lens(
        &self,
        id: &str,
        probe: &dyn Probe,
        s: &GapSolution,
    ) -> Result<PhaseMatrix, ModelError> {
        let er = probe.species_rest_energy();
        let gi = probe.gamma();
        let bi = probe.beta();
        let gf = gamma_from_energies(probe.kinetic_energy() + s.energy_gain, er);
        let bf = beta_from_gamma(gf);
        if !(bf > 0.0 && bf.is_finite()) {
            return Err(ModelError::InvalidParameter {
                element: id.to_owned(),
                parameter: "energy gain",
                reason: format!(
                    "gain {} eV leaves the probe without forward velocity",
                    s.energy_gain
                ),
            });
        }
        let (kr, kz) = self.focusing(probe, s);

        let transverse = Matrix2::new(1.0, 0.0, kr / (bf * gf), bi * gi / (bf * gf));
        let longitudinal = Matrix2::new(
            1.0,
            0.0,
            kz / (bf * gf * gf * gf),
            gi * gi * gi * bi / (gf * gf * gf * bf),
        );
        Ok(PhaseMatrix::from_blocks(transverse, transverse, longitudinal))
    }

    /// Phase advance: the first gap also resets the carried phase to
    /// the design phase.
    fn phase_advance_for(&self, probe: &dyn Probe, s: &GapSolution) -> f64 {
        if self.first_gap {
            -probe.longitudinal_phase() + self.phase + s.phase_change
        } else {
            s.phase_change
        }
    }

    /// Time equivalent of the phase change: `Δφ/ω`.
    fn elapsed_for(&self, s: &GapSolution) -> f64 {
        if s.phase_change == 0.0 {
            0.0
        } else {
            s.phase_change / (TWO_PI * self.frequency)
        }
    }
}

impl ThinMap for IdealRfGap {
    fn kind(&self) -> &'static str {
        "rf_gap"
    }

    fn transfer_map(
        &self,
        attrs: &ElementAttrs,
        probe: &dyn Probe,
    ) -> Result<PhaseMatrix, ModelError> {
        let s = self.solve(attrs, probe)?;
        self.thin_lens(attrs.id(), probe, &s)
    }

    fn energy_gain(&self, attrs: &ElementAttrs, probe: &dyn Probe) -> Result<f64, ModelError> {
        Ok(self.solve(attrs, probe)?.energy_gain)
    }

    fn elapsed_time(&self, attrs: &ElementAttrs, probe: &dyn Probe) -> Result<f64, ModelError> {
        let s = self.solve(attrs, probe)?;
        Ok(self.elapsed_for(&s))
    }

    fn phase_advance(&self, attrs: &ElementAttrs, probe: &dyn Probe) -> Result<f64, ModelError> {
        let s = self.solve(attrs, probe)?;
        Ok(self.phase_advance_for(probe, &s))
    }

    fn transfer(&self, attrs: &ElementAttrs, probe: &dyn Probe) -> Result<Transfer, ModelError> {
        let s = self.solve(attrs, probe)?;
        Ok(Transfer {
            map: self.thin_lens(attrs.id(), probe, &s)?,
            length: 0.0,
            energy_gain: s.energy_gain,
            elapsed_time: self.elapsed_for(&s),
            phase_advance: self.phase_advance_for(probe, &s),
        })
    }
}
