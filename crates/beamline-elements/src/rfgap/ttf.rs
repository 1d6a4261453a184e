//! Transit-time factors with electrical-centre offset.
//!
//! Fits are supplied for the symmetric factors `T₀(β)`, `T₀'(β)` and
//! the conjugate sine factor `S_q0(β)`, `S_q0'(β)`, all evaluated with
//! the origin at the field's point of symmetry. When the electrical
//! centre sits a distance `gap_offset` from the geometric centre, the
//! factors seen from the geometric centre are the symmetric ones
//! rotated by `k·Δz`, with `k = 2π/(βλ)` and `Δz = -gap_offset`.

use std::fmt;
use std::sync::Arc;

use beamline_core::constants::{LIGHT_SPEED, TWO_PI};

use crate::rfgap::fit::UnivariateFit;

/// Fitted symmetric transit-time factors of one gap.
#[derive(Clone)]
pub struct TransitTimeFactors {
    ttf: Arc<dyn UnivariateFit>,
    ttf_prime: Arc<dyn UnivariateFit>,
    stf: Arc<dyn UnivariateFit>,
    stf_prime: Arc<dyn UnivariateFit>,
}

impl TransitTimeFactors {
    /// Factors from the four fits `T₀`, `T₀'`, `S_q0`, `S_q0'`.
    pub fn new(
        ttf: impl UnivariateFit + 'static,
        ttf_prime: impl UnivariateFit + 'static,
        stf: impl UnivariateFit + 'static,
        stf_prime: impl UnivariateFit + 'static,
    ) -> Self {
        Self {
            ttf: Arc::new(ttf),
            ttf_prime: Arc::new(ttf_prime),
            stf: Arc::new(stf),
            stf_prime: Arc::new(stf_prime),
        }
    }

    /// Symmetric cosine factor `T₀(β)`.
    pub fn t0(&self, beta: f64) -> f64 {
        self.ttf.evaluate_at(beta)
    }

    /// Derivative `T₀'(β)`.
    pub fn t0_prime(&self, beta: f64) -> f64 {
        self.ttf_prime.evaluate_at(beta)
    }

    /// Symmetric sine factor `S_q0(β)`.
    pub fn sq0(&self, beta: f64) -> f64 {
        self.stf.evaluate_at(beta)
    }

    /// Derivative `S_q0'(β)`.
    pub fn sq0_prime(&self, beta: f64) -> f64 {
        self.stf_prime.evaluate_at(beta)
    }

    /// The factors seen from the geometric centre of a gap at RF
    /// `frequency` (Hz) whose electrical centre is offset by
    /// `gap_offset` (m).
    pub fn offset(&self, frequency: f64, gap_offset: f64) -> OffsetFactors<'_> {
        OffsetFactors {
            fits: self,
            wavelength: LIGHT_SPEED / frequency,
            dz: -gap_offset,
        }
    }
}

impl fmt::Debug for TransitTimeFactors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitTimeFactors").finish_non_exhaustive()
    }
}

/// Offset-rotated transit-time factors.
#[derive(Clone, Copy, Debug)]
pub struct OffsetFactors<'a> {
    fits: &'a TransitTimeFactors,
    wavelength: f64,
    dz: f64,
}

impl OffsetFactors<'_> {
    /// Wave number `k = 2π/(βλ)`.
    pub fn wave_number(&self, beta: f64) -> f64 {
        TWO_PI / (beta * self.wavelength)
    }

    fn rotation(&self, beta: f64) -> (f64, f64) {
        (self.wave_number(beta) * self.dz).sin_cos()
    }

    /// `T = T₀ cos(kΔz)`.
    pub fn t(&self, beta: f64) -> f64 {
        let (_, cos) = self.rotation(beta);
        self.fits.t0(beta) * cos
    }

    /// `T' = T₀' cos(kΔz) − T₀ Δz sin(kΔz)`.
    pub fn tp(&self, beta: f64) -> f64 {
        let (sin, cos) = self.rotation(beta);
        self.fits.t0_prime(beta) * cos - self.fits.t0(beta) * self.dz * sin
    }

    /// `S = T₀ sin(kΔz)`.
    pub fn s(&self, beta: f64) -> f64 {
        let (sin, _) = self.rotation(beta);
        self.fits.t0(beta) * sin
    }

    /// `S' = T₀' sin(kΔz) + T₀ Δz cos(kΔz)`.
    pub fn sp(&self, beta: f64) -> f64 {
        let (sin, cos) = self.rotation(beta);
        self.fits.t0_prime(beta) * sin + self.fits.t0(beta) * self.dz * cos
    }

    /// `T_q = −S_q0 sin(kΔz)`.
    pub fn tq(&self, beta: f64) -> f64 {
        let (sin, _) = self.rotation(beta);
        -self.fits.sq0(beta) * sin
    }

    /// `T_q' = −S_q0' sin(kΔz) − S_q0 Δz cos(kΔz)`.
    pub fn tqp(&self, beta: f64) -> f64 {
        let (sin, cos) = self.rotation(beta);
        -self.fits.sq0_prime(beta) * sin - self.fits.sq0(beta) * self.dz * cos
    }

    /// `S_q = S_q0 cos(kΔz)`.
    pub fn sq(&self, beta: f64) -> f64 {
        let (_, cos) = self.rotation(beta);
        self.fits.sq0(beta) * cos
    }

    /// `S_q' = S_q0' cos(kΔz) − S_q0 Δz sin(kΔz)`.
    pub fn sqp(&self, beta: f64) -> f64 {
        let (sin, cos) = self.rotation(beta);
        self.fits.sq0_prime(beta) * cos - self.fits.sq0(beta) * self.dz * sin
    }
}
