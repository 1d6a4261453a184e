//! Ideal magnetic quadrupole.

use beamline_core::constants::LIGHT_SPEED;
use beamline_core::{ModelError, PhaseMatrix, Probe};
use beamline_element::{Element, ElementAttrs, ThickMap};

use crate::optics::{defocusing_block, drift_block, focusing_block};

/// Which transverse plane a magnet acts on.
///
/// Upstream hardware descriptions encode orientation as an integer
/// (`0` none, `1` horizontal, `2` vertical); see [`TryFrom<i32>`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Not set. Computing a map with this orientation is an error.
    #[default]
    None,
    /// Horizontal: a quadrupole focuses in x, a corrector kicks x'.
    Horizontal,
    /// Vertical: a quadrupole focuses in y, a corrector kicks y'.
    Vertical,
}

impl Orientation {
    /// Upstream integer code.
    pub fn code(self) -> i32 {
        match self {
            Orientation::None => 0,
            Orientation::Horizontal => 1,
            Orientation::Vertical => 2,
        }
    }

    /// The other transverse plane; `None` stays `None`.
    pub fn swapped(self) -> Self {
        match self {
            Orientation::None => Orientation::None,
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

impl TryFrom<i32> for Orientation {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, i32> {
        match code {
            0 => Ok(Orientation::None),
            1 => Ok(Orientation::Horizontal),
            2 => Ok(Orientation::Vertical),
            other => Err(other),
        }
    }
}

/// Hard-edge quadrupole with constant gradient.
///
/// `k² = Q·c·G / p`. The magnet focuses in the plane named by its
/// orientation when `Q·G > 0` and in the other plane when `Q·G < 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IdealMagQuad {
    gradient: f64,
    orientation_code: i32,
}

impl IdealMagQuad {
    /// Type tag carried by quadrupole elements.
    pub const TYPE_TAG: &'static str = "IdealMagQuad";

    /// A quadrupole with gradient `gradient` (T/m).
    pub fn new(gradient: f64, orientation: Orientation) -> Self {
        Self {
            gradient,
            orientation_code: orientation.code(),
        }
    }

    /// A quadrupole whose orientation arrives as a raw upstream code.
    /// An unknown code is reported when the map is computed.
    pub fn from_code(gradient: f64, orientation_code: i32) -> Self {
        Self {
            gradient,
            orientation_code,
        }
    }

    /// A quadrupole element of the given length.
    pub fn element(
        id: impl Into<String>,
        length: f64,
        gradient: f64,
        orientation: Orientation,
    ) -> Element {
        Element::thick(
            ElementAttrs::new(Self::TYPE_TAG, id),
            length,
            Self::new(gradient, orientation),
        )
    }

    /// Field gradient (T/m).
    pub fn gradient(&self) -> f64 {
        self.gradient
    }

    /// Raw orientation code.
    pub fn orientation_code(&self) -> i32 {
        self.orientation_code
    }

    /// Signed squared focusing strength `Q·c·G/p` (1/m²).
    pub fn k_squared(&self, probe: &dyn Probe) -> f64 {
        probe.species_charge() * LIGHT_SPEED * self.gradient / probe.momentum()
    }

    /// The plane actually focused for this probe, after the sign swap.
    pub fn focusing_orientation(
        &self,
        attrs: &ElementAttrs,
        probe: &dyn Probe,
    ) -> Result<Orientation, ModelError> {
        let bad = || ModelError::BadOrientation {
            element: attrs.id().to_owned(),
            orientation: self.orientation_code,
        };
        let orientation = Orientation::try_from(self.orientation_code).map_err(|_| bad())?;
        if orientation == Orientation::None {
            return Err(bad());
        }
        if self.k_squared(probe) < 0.0 {
            Ok(orientation.swapped())
        } else {
            Ok(orientation)
        }
    }
}

impl ThickMap for IdealMagQuad {
    fn kind(&self) -> &'static str {
        "quadrupole"
    }

    fn transfer_map(
        &self,
        attrs: &ElementAttrs,
        probe: &dyn Probe,
        length: f64,
    ) -> Result<PhaseMatrix, ModelError> {
        let orientation = self.focusing_orientation(attrs, probe)?;
        let k = self.k_squared(probe).abs().sqrt();
        let f = focusing_block(k, length);
        let d = defocusing_block(k, length);
        let z = drift_block(length);
        Ok(match orientation {
            Orientation::Horizontal => PhaseMatrix::from_blocks(f, d, z),
            _ => PhaseMatrix::from_blocks(d, f, z),
        })
    }
}
