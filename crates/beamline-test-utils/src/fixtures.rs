//! Reusable element and lattice fixtures.
//!
//! - [`FailingKick`]: thin element that fails after N successful maps.
//! - [`CountingDrift`]: thick drift that counts its map evaluations.
//! - Transit-time fits: constant, sloped, chaotic and NaN.
//! - [`fodo_cell`] and [`dtl_cavity`]: small lattices built into a
//!   caller-owned [`Lattice`].

use std::sync::atomic::{AtomicUsize, Ordering};

use beamline_core::{ModelError, NodeId, PhaseMatrix, Probe};
use beamline_element::{Element, ElementAttrs, ThickMap, ThinMap};
use beamline_elements::optics::drift_block;
use beamline_elements::{
    IdealDrift, IdealMagQuad, IdealRfGap, Orientation, PhaseCalcMode, Polynomial,
    TransitTimeFactors,
};
use beamline_lattice::{CavityBuilder, ElementSeq, Lattice, LatticeError};

/// Identity kick that fails deterministically after a configurable
/// number of successful calls.
///
/// Uses `AtomicUsize` for the call counter so it satisfies `Send + Sync`.
#[derive(Debug)]
pub struct FailingKick {
    pub succeed_count: usize,
    call_count: AtomicUsize,
}

impl FailingKick {
    pub const TYPE_TAG: &'static str = "FailingKick";

    /// A kick that succeeds `succeed_count` times then fails.
    pub fn new(succeed_count: usize) -> Self {
        Self {
            succeed_count,
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn element(id: impl Into<String>, succeed_count: usize) -> Element {
        Element::thin(ElementAttrs::new(Self::TYPE_TAG, id), Self::new(succeed_count))
    }

    /// How many times a map was requested.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.call_count.store(0, Ordering::Relaxed);
    }
}

impl ThinMap for FailingKick {
    fn kind(&self) -> &'static str {
        "failing-kick"
    }

    fn transfer_map(&self, attrs: &ElementAttrs, _probe: &dyn Probe) -> Result<PhaseMatrix, ModelError> {
        let n = self.call_count.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count {
            return Err(ModelError::InvalidParameter {
                element: attrs.id().to_owned(),
                parameter: "succeed_count",
                reason: format!("deliberate failure after {} successful calls", self.succeed_count),
            });
        }
        Ok(PhaseMatrix::identity())
    }
}

/// Field-free drift that records how often it was evaluated.
#[derive(Debug, Default)]
pub struct CountingDrift {
    call_count: AtomicUsize,
}

impl CountingDrift {
    pub const TYPE_TAG: &'static str = "CountingDrift";

    pub fn element(id: impl Into<String>, length: f64) -> Element {
        Element::thick(ElementAttrs::new(Self::TYPE_TAG, id), length, Self::default())
    }

    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl ThickMap for CountingDrift {
    fn kind(&self) -> &'static str {
        "counting-drift"
    }

    fn transfer_map(
        &self,
        _attrs: &ElementAttrs,
        _probe: &dyn Probe,
        length: f64,
    ) -> Result<PhaseMatrix, ModelError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        let d = drift_block(length);
        Ok(PhaseMatrix::from_blocks(d, d, d))
    }
}

// ── Transit-time fits ──────────────────────────────────────────────

/// `T₀ = t0` for every β, all other factors zero.
pub fn constant_fits(t0: f64) -> TransitTimeFactors {
    TransitTimeFactors::new(
        Polynomial::constant(t0),
        Polynomial::constant(0.0),
        Polynomial::constant(0.0),
        Polynomial::constant(0.0),
    )
}

/// A smooth, slowly varying fit resembling a low-β drift-tube gap.
pub fn sloped_fits() -> TransitTimeFactors {
    let t0 = Polynomial::new([0.62, 1.1, -1.4]);
    let sq0 = Polynomial::new([0.0, 0.05]);
    TransitTimeFactors::new(t0.clone(), t0.derivative(), sq0.clone(), sq0.derivative())
}

/// Well-behaved `T₀` with a wildly oscillating derivative, which drives
/// the fixed-point iteration into a non-contracting regime.
pub fn chaotic_fits() -> TransitTimeFactors {
    TransitTimeFactors::new(
        Polynomial::constant(0.8),
        |beta: f64| 1.0e6 * (1.0e7 * beta).sin(),
        Polynomial::constant(0.0),
        Polynomial::constant(0.0),
    )
}

/// Fits whose derivative evaluates to NaN everywhere.
pub fn nan_fits() -> TransitTimeFactors {
    TransitTimeFactors::new(
        Polynomial::constant(0.8),
        |_: f64| f64::NAN,
        Polynomial::constant(0.0),
        Polynomial::constant(0.0),
    )
}

// ── Lattices ───────────────────────────────────────────────────────

/// RF frequency of the fixture cavities (Hz).
pub const FIXTURE_FREQUENCY: f64 = 352.21e6;

/// `QF(L/2) D QD(L) D QF(L/2)` as one detached sequence.
pub fn fodo_cell(
    lattice: &mut Lattice,
    prefix: &str,
    quad_length: f64,
    drift_length: f64,
    gradient: f64,
) -> Result<NodeId, LatticeError> {
    let cell = lattice.add_sequence(ElementSeq::tagged("FODO", prefix));
    let parts = [
        IdealMagQuad::element(format!("{prefix}:QF1"), quad_length / 2.0, gradient, Orientation::Horizontal),
        IdealDrift::element(format!("{prefix}:D1"), drift_length),
        IdealMagQuad::element(format!("{prefix}:QD"), quad_length, gradient, Orientation::Vertical),
        IdealDrift::element(format!("{prefix}:D2"), drift_length),
        IdealMagQuad::element(format!("{prefix}:QF2"), quad_length / 2.0, gradient, Orientation::Horizontal),
    ];
    let mut s = 0.0;
    for mut e in parts {
        let len = e.length();
        e.attrs_mut().set_position(s + len / 2.0);
        s += len;
        let node = lattice.add_element(e);
        lattice.add_child(cell, node)?;
    }
    Ok(cell)
}

/// An `n_gaps` drift-tube cavity in 0 mode, each gap at `etl` volts with
/// [`sloped_fits`] and the given solver `mode`.
pub fn dtl_cavity(
    lattice: &mut Lattice,
    prefix: &str,
    n_gaps: u32,
    etl: f64,
    design_phase: f64,
    mode: PhaseCalcMode,
) -> Result<NodeId, LatticeError> {
    let cell_length = 0.1;
    let gap_length = 0.02;
    let e0 = etl / (gap_length * 0.7);
    let mut builder = CavityBuilder::new(prefix, FIXTURE_FREQUENCY, 0.0, design_phase)
        .drift(format!("{prefix}:D0"), cell_length / 2.0);
    for n in 0..n_gaps {
        let gap = IdealRfGap::new(etl, design_phase, FIXTURE_FREQUENCY)
            .with_field(e0, gap_length)
            .with_fits(sloped_fits())
            .with_mode(mode);
        builder = builder
            .gap(format!("{prefix}:G{n}"), gap)
            .drift(format!("{prefix}:D{}", n + 1), cell_length / 2.0);
    }
    builder.build(lattice)
}
