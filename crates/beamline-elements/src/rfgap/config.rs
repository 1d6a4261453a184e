//! Gap solver configuration and calculation modes.

use thiserror::Error;

/// Default convergence tolerance on the phase residual (rad).
pub const DEFAULT_TOLERANCE: f64 = 1.0e-12;

/// Default iteration cap of the fixed-point search.
pub const DEFAULT_MAX_ITERATIONS: u32 = 50;

/// How a gap computes its phase change and energy gain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PhaseCalcMode {
    /// Static design values: `ΔW = Q·ETL·cos φ_design`, no phase change.
    Design,
    /// Probe phase corrected for the centre offset, transit-time factor
    /// at the entry velocity, no iteration.
    DynPhase,
    /// Full self-consistent mid-gap solve.
    #[default]
    DynEnergy,
}

/// Errors detected during [`GapSolverConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Tolerance is NaN, infinite, zero or negative.
    #[error("tolerance must be finite and positive, got {value}")]
    InvalidTolerance {
        /// The invalid value.
        value: f64,
    },
    /// Iteration cap is zero.
    #[error("max_iterations must be at least 1")]
    ZeroIterations,
}

/// Fixed-point search parameters of the RF-gap solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GapSolverConfig {
    /// Convergence threshold on `|Δφ_new − 2(φ_mid − φ_entry)|` (rad).
    pub tolerance: f64,
    /// Iteration cap; reaching it is reported as non-convergence.
    pub max_iterations: u32,
}

impl Default for GapSolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl GapSolverConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ConfigError::InvalidTolerance {
                value: self.tolerance,
            });
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let cfg = GapSolverConfig::default();
        assert_eq!(cfg.tolerance, 1e-12);
        assert_eq!(cfg.max_iterations, 50);
        assert!(cfg.validate().is_ok());
        assert_eq!(PhaseCalcMode::default(), PhaseCalcMode::DynEnergy);
    }

    #[test]
    fn bad_tolerance_rejected() {
        for value in [0.0, -1e-9, f64::NAN, f64::INFINITY] {
            let cfg = GapSolverConfig {
                tolerance: value,
                ..Default::default()
            };
            match cfg.validate() {
                Err(ConfigError::InvalidTolerance { .. }) => {}
                other => panic!("expected InvalidTolerance, got {other:?}"),
            }
        }
    }

    #[test]
    fn zero_iterations_rejected() {
        let cfg = GapSolverConfig {
            max_iterations: 0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroIterations));
    }
}
