//! Benchmark profiles for the beamline modeling framework.
//!
//! - [`reference_linac`]: FODO transport interleaved with drift-tube
//!   cavities, with seeded jitter on lengths and gradients
//! - [`gap_profile`]: a batch of RF gaps with seeded phases and offsets
//! - [`bench_fits`]: smooth transit-time fits shared by both

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use beamline_core::NodeId;
use beamline_elements::{
    IdealDrift, IdealMagQuad, IdealRfGap, Orientation, PhaseCalcMode, Polynomial,
    TransitTimeFactors,
};
use beamline_lattice::{CavityBuilder, ElementSeq, Lattice, LatticeError};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// RF frequency of every benchmark cavity (Hz).
pub const BENCH_FREQUENCY: f64 = 402.5e6;

/// Smooth quadratic `T₀(β)` with a small linear `S_q0(β)`.
pub fn bench_fits() -> TransitTimeFactors {
    let t0 = Polynomial::new([0.55, 1.3, -1.9]);
    let sq0 = Polynomial::new([0.0, 0.08]);
    TransitTimeFactors::new(t0.clone(), t0.derivative(), sq0.clone(), sq0.derivative())
}

/// `n` self-consistent gaps with phases in `[-0.8, -0.2]` rad and
/// electrical-centre offsets within ±2 mm.
pub fn gap_profile(seed: u64, n: usize) -> Vec<IdealRfGap> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let phase = rng.gen_range(-0.8..-0.2);
            let offset = rng.gen_range(-2e-3..2e-3);
            IdealRfGap::new(0.0, phase, BENCH_FREQUENCY)
                .with_field(2.5e6, 0.025)
                .with_gap_offset(offset)
                .with_fits(bench_fits())
                .with_mode(PhaseCalcMode::DynEnergy)
        })
        .collect()
}

/// A linac of `periods` periods, each a jittered FODO cell followed by a
/// four-gap cavity. Returns the lattice and its root sequence.
pub fn reference_linac(seed: u64, periods: usize) -> Result<(Lattice, NodeId), LatticeError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut lattice = Lattice::new();
    let root = lattice.add_sequence(ElementSeq::new("LINAC"));

    for p in 0..periods {
        let period = lattice.add_sequence(ElementSeq::new(format!("P{p}")));
        let gradient = 20.0 * (1.0 + rng.gen_range(-0.05..0.05));
        let drift = 0.3 + rng.gen_range(-0.01..0.01);
        let parts = [
            IdealMagQuad::element(format!("P{p}:QF"), 0.08, gradient, Orientation::Horizontal),
            IdealDrift::element(format!("P{p}:D1"), drift),
            IdealMagQuad::element(format!("P{p}:QD"), 0.08, gradient, Orientation::Vertical),
            IdealDrift::element(format!("P{p}:D2"), drift),
        ];
        let mut s = 0.0;
        for mut e in parts {
            let len = e.length();
            e.attrs_mut().set_position(s + len / 2.0);
            s += len;
            let node = lattice.add_element(e);
            lattice.add_child(period, node)?;
        }

        let phase = rng.gen_range(-0.6..-0.3);
        let mut cavity = CavityBuilder::new(format!("P{p}:CAV"), BENCH_FREQUENCY, 0.0, phase)
            .drift(format!("P{p}:CAV:D0"), 0.04);
        for g in 0..4 {
            let gap = IdealRfGap::new(0.0, phase, BENCH_FREQUENCY)
                .with_field(2.5e6, 0.025)
                .with_fits(bench_fits());
            cavity = cavity
                .gap(format!("P{p}:CAV:G{g}"), gap)
                .drift(format!("P{p}:CAV:D{}", g + 1), 0.08);
        }
        let cav = cavity.build(&mut lattice)?;
        lattice.add_child(period, cav)?;
        lattice.add_child(root, period)?;
    }
    Ok((lattice, root))
}
