//! Thin steering dipole (orbit corrector).

use beamline_core::constants::LIGHT_SPEED;
use beamline_core::{ModelError, PhaseMatrix, Probe};
use beamline_element::{Element, ElementAttrs, ThinMap};

use crate::quadrupole::Orientation;

/// Zero-length dipole kick.
///
/// The kick angle is `θ = Q·c·B·L_eff / p`. A horizontal corrector
/// changes `x'` by `-θ`, a vertical corrector changes `y'` by `+θ`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IdealMagSteeringDipole {
    field: f64,
    effective_length: f64,
    orientation: Orientation,
}

impl IdealMagSteeringDipole {
    /// Type tag carried by corrector elements.
    pub const TYPE_TAG: &'static str = "IdealMagSteeringDipole";

    /// A corrector with field `field` (T) over `effective_length` (m).
    pub fn new(field: f64, effective_length: f64, orientation: Orientation) -> Self {
        Self {
            field,
            effective_length,
            orientation,
        }
    }

    /// A corrector element.
    pub fn element(
        id: impl Into<String>,
        field: f64,
        effective_length: f64,
        orientation: Orientation,
    ) -> Element {
        Element::thin(
            ElementAttrs::new(Self::TYPE_TAG, id),
            Self::new(field, effective_length, orientation),
        )
    }

    /// Kick angle for `probe` (rad).
    pub fn kick_angle(&self, probe: &dyn Probe) -> f64 {
        probe.species_charge() * LIGHT_SPEED * self.field * self.effective_length
            / probe.momentum()
    }
}

impl ThinMap for IdealMagSteeringDipole {
    fn kind(&self) -> &'static str {
        "steering"
    }

    fn transfer_map(
        &self,
        attrs: &ElementAttrs,
        probe: &dyn Probe,
    ) -> Result<PhaseMatrix, ModelError> {
        let theta = self.kick_angle(probe);
        let mut m = PhaseMatrix::identity();
        match self.orientation {
            Orientation::Horizontal => m.set(1, 6, -theta),
            Orientation::Vertical => m.set(3, 6, theta),
            Orientation::None => {
                return Err(ModelError::BadOrientation {
                    element: attrs.id().to_owned(),
                    orientation: self.orientation.code(),
                })
            }
        }
        Ok(m)
    }
}
