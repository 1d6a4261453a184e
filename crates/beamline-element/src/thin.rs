//! Physics of zero-length elements.

use std::any::Any;
use std::fmt;

use beamline_core::{ModelError, PhaseMatrix, Probe, Transfer};

use crate::attrs::ElementAttrs;

/// Transfer-map physics of a thin (zero-length) element.
///
/// The map depends only on the probe state at the element. Energy gain,
/// elapsed time and phase advance default to zero; elements that
/// change the longitudinal state override them.
///
/// # Object safety
///
/// Elements hold their physics as `Arc<dyn ThinMap>`. Use
/// `downcast_ref` on the trait object to reach the concrete type.
pub trait ThinMap: Any + Send + Sync + fmt::Debug {
    /// Short name of the physics model, used in logs.
    fn kind(&self) -> &'static str;

    /// The element's map at the current probe state.
    fn transfer_map(
        &self,
        attrs: &ElementAttrs,
        probe: &dyn Probe,
    ) -> Result<PhaseMatrix, ModelError>;

    /// Kinetic energy gained across the element (eV).
    fn energy_gain(&self, _attrs: &ElementAttrs, _probe: &dyn Probe) -> Result<f64, ModelError> {
        Ok(0.0)
    }

    /// Time elapsed across the element (s).
    fn elapsed_time(&self, _attrs: &ElementAttrs, _probe: &dyn Probe) -> Result<f64, ModelError> {
        Ok(0.0)
    }

    /// Longitudinal RF phase advance across the element (rad).
    fn phase_advance(&self, _attrs: &ElementAttrs, _probe: &dyn Probe) -> Result<f64, ModelError> {
        Ok(0.0)
    }

    /// The full step record, before misalignment.
    ///
    /// The default calls each of the four queries above. Physics whose
    /// queries share an expensive computation override this to compute
    /// it once.
    fn transfer(&self, attrs: &ElementAttrs, probe: &dyn Probe) -> Result<Transfer, ModelError> {
        Ok(Transfer {
            map: self.transfer_map(attrs, probe)?,
            length: 0.0,
            energy_gain: self.energy_gain(attrs, probe)?,
            elapsed_time: self.elapsed_time(attrs, probe)?,
            phase_advance: self.phase_advance(attrs, probe)?,
        })
    }
}

impl dyn ThinMap {
    /// Attempt to downcast to a concrete physics type.
    pub fn downcast_ref<T: ThinMap>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}
