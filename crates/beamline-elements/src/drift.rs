//! Field-free drift space.

use beamline_core::{ModelError, PhaseMatrix, Probe};
use beamline_element::{Element, ElementAttrs, ThickMap};

use crate::optics::drift_block;

/// Ideal field-free region: drift blocks in all three planes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IdealDrift;

impl IdealDrift {
    /// Type tag carried by drift elements.
    pub const TYPE_TAG: &'static str = "IdealDrift";

    /// A drift element of the given length.
    pub fn element(id: impl Into<String>, length: f64) -> Element {
        Element::thick(ElementAttrs::new(Self::TYPE_TAG, id), length, IdealDrift)
    }
}

impl ThickMap for IdealDrift {
    fn kind(&self) -> &'static str {
        "drift"
    }

    fn transfer_map(
        &self,
        _attrs: &ElementAttrs,
        _probe: &dyn Probe,
        length: f64,
    ) -> Result<PhaseMatrix, ModelError> {
        let d = drift_block(length);
        Ok(PhaseMatrix::from_blocks(d, d, d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use beamline_core::constants::LIGHT_SPEED;
    use beamline_core::{PhaseVector, Plane};
    use beamline_test_utils::ParticleProbe;

    #[test]
    fn drift_blocks_in_every_plane() {
        let probe = ParticleProbe::proton(2.5e6);
        let e = IdealDrift::element("D1", 1.5);
        let m = e.transfer_map(&probe, 1.5).unwrap();
        for plane in Plane::ALL {
            assert_eq!(m.block(plane), drift_block(1.5));
        }
        assert_eq!(m.get(6, 6), 1.0);
    }

    #[test]
    fn scenario_a_round_trip_at_half_light_speed() {
        let probe = ParticleProbe::proton_at_beta(0.5);
        let e = IdealDrift::element("D1", 1.0);
        let x0 = PhaseVector::new(1e-3, -2e-3, 0.5e-3, 1e-3, 0.0, 0.0);
        let fwd = e.propagate(&probe).unwrap();
        let back = e.back_propagate(&probe).unwrap();
        let x1 = back.map.apply(&fwd.map.apply(&x0));
        assert!(x1.transverse_distance(&x0) < 1e-9);
        assert_relative_eq!(fwd.elapsed_time, 1.0 / (0.5 * LIGHT_SPEED), max_relative = 1e-12);
    }
}
