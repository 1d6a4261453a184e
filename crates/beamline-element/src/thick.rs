//! Physics of finite-length elements.

use std::any::Any;
use std::fmt;

use beamline_core::constants::LIGHT_SPEED;
use beamline_core::{ModelError, PhaseMatrix, Probe};

use crate::attrs::ElementAttrs;

/// Transfer-map physics of a thick element.
///
/// Every query takes the sub-length `length` (m) to evaluate over; the
/// owning [`Element`](crate::Element) has already checked that it lies
/// within `[0, L]`.
pub trait ThickMap: Any + Send + Sync + fmt::Debug {
    /// Short name of the physics model, used in logs.
    fn kind(&self) -> &'static str;

    /// The map over `length` at the current probe state.
    fn transfer_map(
        &self,
        attrs: &ElementAttrs,
        probe: &dyn Probe,
        length: f64,
    ) -> Result<PhaseMatrix, ModelError>;

    /// Kinetic energy gained over `length` (eV).
    fn energy_gain(
        &self,
        _attrs: &ElementAttrs,
        _probe: &dyn Probe,
        _length: f64,
    ) -> Result<f64, ModelError> {
        Ok(0.0)
    }

    /// Time to cross `length` (s). Defaults to drifting at the probe's
    /// velocity: `ℓ / (β c)`.
    fn elapsed_time(
        &self,
        _attrs: &ElementAttrs,
        probe: &dyn Probe,
        length: f64,
    ) -> Result<f64, ModelError> {
        Ok(length / (probe.beta() * LIGHT_SPEED))
    }

    /// Longitudinal RF phase advance over `length` (rad).
    fn phase_advance(
        &self,
        _attrs: &ElementAttrs,
        _probe: &dyn Probe,
        _length: f64,
    ) -> Result<f64, ModelError> {
        Ok(0.0)
    }
}

impl dyn ThickMap {
    /// Attempt to downcast to a concrete physics type.
    pub fn downcast_ref<T: ThickMap>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}
