//! The record an element hands back from a propagation step.

use crate::phase::PhaseMatrix;

/// Longitudinal (phase, energy) pair; the domain and range of the RF-gap
/// solver.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GapState {
    /// Phase change or phase (rad).
    pub phase: f64,
    /// Energy gain or kinetic energy (eV).
    pub energy: f64,
}

impl GapState {
    /// Construct a state pair.
    pub fn new(phase: f64, energy: f64) -> Self {
        Self { phase, energy }
    }
}

/// Everything a caller needs to advance a probe across one element.
///
/// The element computes; the caller applies. `map` maps entrance
/// coordinates to exit coordinates (or exit to entrance for a backward
/// step, in which case every scalar is negated).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transfer {
    /// Homogeneous transfer map.
    pub map: PhaseMatrix,
    /// Signed path length covered (m).
    pub length: f64,
    /// Kinetic energy gained (eV).
    pub energy_gain: f64,
    /// Time elapsed (s).
    pub elapsed_time: f64,
    /// Longitudinal RF phase advance (rad).
    pub phase_advance: f64,
}

impl Transfer {
    /// A zero-length step that leaves the probe unchanged.
    pub fn identity() -> Self {
        Self {
            map: PhaseMatrix::identity(),
            length: 0.0,
            energy_gain: 0.0,
            elapsed_time: 0.0,
            phase_advance: 0.0,
        }
    }

    /// A step with the given map and no scalar change.
    pub fn from_map(map: PhaseMatrix) -> Self {
        Self {
            map,
            ..Self::identity()
        }
    }

    /// The reverse step: inverse map and negated scalars.
    ///
    /// Returns `None` when the map is singular.
    pub fn reversed(&self) -> Option<Self> {
        Some(Self {
            map: self.map.try_inverse()?,
            length: -self.length,
            energy_gain: -self.energy_gain,
            elapsed_time: -self.elapsed_time,
            phase_advance: -self.phase_advance,
        })
    }

    /// This step followed by `next`.
    pub fn then(&self, next: &Transfer) -> Transfer {
        Transfer {
            map: next.map.after(&self.map),
            length: self.length + next.length,
            energy_gain: self.energy_gain + next.energy_gain,
            elapsed_time: self.elapsed_time + next.elapsed_time,
            phase_advance: self.phase_advance + next.phase_advance,
        }
    }
}

impl Default for Transfer {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_negates_scalars() {
        let t = Transfer {
            map: PhaseMatrix::translation(0.01, 0.0, 0.0),
            length: 1.5,
            energy_gain: 3.0e5,
            elapsed_time: 1e-8,
            phase_advance: 0.2,
        };
        let r = t.reversed().unwrap();
        assert_eq!(r.length, -1.5);
        assert_eq!(r.energy_gain, -3.0e5);
        assert_eq!(r.elapsed_time, -1e-8);
        assert_eq!(r.phase_advance, -0.2);
        assert_eq!(r.map, PhaseMatrix::translation(-0.01, 0.0, 0.0));
    }

    #[test]
    fn then_accumulates() {
        let a = Transfer {
            length: 1.0,
            ..Transfer::identity()
        };
        let b = Transfer {
            length: 2.0,
            energy_gain: 5.0,
            ..Transfer::identity()
        };
        let c = a.then(&b);
        assert_eq!(c.length, 3.0);
        assert_eq!(c.energy_gain, 5.0);
    }
}
