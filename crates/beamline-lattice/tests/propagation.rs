//! Probe walks through fixture lattices.

use approx::assert_relative_eq;
use beamline_core::{ModelError, PhaseVector};
use beamline_elements::{IdealDrift, IdealRfGap, PhaseCalcMode};
use beamline_lattice::{validate_lattice, ElementSeq, Lattice, LatticeError, PropagateError};
use beamline_test_utils::fixtures::{dtl_cavity, fodo_cell, CountingDrift, FailingKick};
use beamline_test_utils::{init_test_logging, ParticleProbe};

#[test]
fn fodo_lattice_round_trip() {
    init_test_logging();
    let mut l = Lattice::new();
    let root = l.add_sequence(ElementSeq::new("RING"));
    for i in 0..4 {
        let cell = fodo_cell(&mut l, &format!("C{i}"), 0.2, 0.5, 8.0).unwrap();
        l.add_child(root, cell).unwrap();
    }
    assert_relative_eq!(l.length(root).unwrap(), 4.0 * 1.4, epsilon = 1e-12);
    assert_eq!(l.leaf_count(root), 20);

    let start = PhaseVector::new(1e-3, 2e-4, -5e-4, -1e-4, 0.0, 0.0);
    let mut probe = ParticleProbe::proton(2.5e6).with_coords(start);
    let fwd = l.propagate(root, &mut probe).unwrap();
    assert_eq!(fwd.elements, 20);
    assert_eq!(fwd.sequences, 5);
    assert_relative_eq!(probe.position, 5.6, epsilon = 1e-12);

    l.back_propagate(root, &mut probe).unwrap();
    assert!(probe.coords.transverse_distance(&start) < 1e-9);
    assert_relative_eq!(probe.time, 0.0, epsilon = 1e-18);
}

#[test]
fn fodo_positions_follow_parent_frames() {
    let mut l = Lattice::new();
    let root = l.add_sequence(ElementSeq::new("LINE"));
    let c0 = fodo_cell(&mut l, "C0", 0.2, 0.5, 8.0).unwrap();
    let c1 = fodo_cell(&mut l, "C1", 0.2, 0.5, 8.0).unwrap();
    l.add_child(root, c0).unwrap();
    l.add_child(root, c1).unwrap();
    let qd = l.find("C1:QD").unwrap();
    // C1 starts at 1.4 m; QD is centred 0.7 m into the cell.
    assert_relative_eq!(l.lattice_position(qd).unwrap(), 2.1, epsilon = 1e-12);
    assert_relative_eq!(l.probe_location(qd, 2.05).unwrap(), 0.05, epsilon = 1e-12);
}

#[test]
fn walk_stops_at_first_failure() {
    init_test_logging();
    let mut l = Lattice::new();
    let root = l.add_sequence(ElementSeq::new("LINE"));
    let before = l.add_element(CountingDrift::element("BEFORE", 1.0));
    let bad = l.add_element(FailingKick::element("KICK", 0));
    let after = l.add_element(CountingDrift::element("AFTER", 1.0));
    for n in [before, bad, after] {
        l.add_child(root, n).unwrap();
    }

    let mut probe = ParticleProbe::proton(2.5e6);
    let err = l.propagate(root, &mut probe).unwrap_err();
    assert!(matches!(
        &err,
        PropagateError::ElementFailed { node, element, source: ModelError::InvalidParameter { .. } }
            if *node == bad && element == "KICK"
    ));
    assert_eq!(probe.steps, 1);

    let count = |n| l.element(n).unwrap().thick_physics::<CountingDrift>().unwrap().calls();
    assert_eq!(count(before), 1);
    assert_eq!(count(after), 0);
    assert_eq!(
        l.element(bad).unwrap().thin_physics::<FailingKick>().unwrap().calls(),
        1
    );
}

#[test]
fn failing_kick_succeeds_until_its_budget() {
    let mut l = Lattice::new();
    let root = l.add_sequence(ElementSeq::new("LINE"));
    let kick = l.add_element(FailingKick::element("KICK", 2));
    l.add_child(root, kick).unwrap();
    let mut probe = ParticleProbe::proton(2.5e6);
    l.propagate(root, &mut probe).unwrap();
    l.propagate(root, &mut probe).unwrap();
    assert!(l.propagate(root, &mut probe).is_err());
    l.element(kick).unwrap().thin_physics::<FailingKick>().unwrap().reset();
    assert!(l.propagate(root, &mut probe).is_ok());
}

#[test]
fn cavity_accelerates_and_tracks_phase() {
    init_test_logging();
    let mut l = Lattice::new();
    let root = l.add_sequence(ElementSeq::new("DTL"));
    let cav = dtl_cavity(&mut l, "DTL1", 4, 6.0e4, -0.5, PhaseCalcMode::DynEnergy).unwrap();
    l.add_child(root, cav).unwrap();
    validate_lattice(&l, root).unwrap();

    let mut probe = ParticleProbe::proton(2.5e6).with_phase(1.0);
    let metrics = l.propagate(root, &mut probe).unwrap();
    assert_eq!(metrics.elements, 9);
    assert!(metrics.energy_gain > 0.0);
    assert_relative_eq!(probe.kinetic_energy, 2.5e6 + metrics.energy_gain, max_relative = 1e-12);
    // The first gap discards the carried phase.
    assert!((probe.phase - 1.0).abs() > 0.5);
}

#[test]
fn design_cavity_gain_is_closed_form() {
    let mut l = Lattice::new();
    let cav = dtl_cavity(&mut l, "C", 3, 5.0e4, -0.4, PhaseCalcMode::Design).unwrap();
    let mut probe = ParticleProbe::proton(2.5e6);
    let m = l.propagate(cav, &mut probe).unwrap();
    assert_relative_eq!(m.energy_gain, 3.0 * 5.0e4 * (-0.4f64).cos(), max_relative = 1e-12);
}

#[test]
fn compose_matches_stepwise_walk() {
    let mut l = Lattice::new();
    let cav = dtl_cavity(&mut l, "C", 2, 5.0e4, -0.4, PhaseCalcMode::DynEnergy).unwrap();
    let probe = ParticleProbe::proton(2.5e6);
    let total = l.compose(cav, &probe).unwrap();

    let start = PhaseVector::new(1e-3, 0.0, 0.0, 1e-4, 0.0, 0.0);
    let mut walked = probe.clone().with_coords(start);
    l.propagate(cav, &mut walked).unwrap();
    let composed = total.map.apply(&start);
    assert!(composed.transverse_distance(&walked.coords) < 1e-12);
    assert_relative_eq!(total.energy_gain, walked.kinetic_energy - 2.5e6, max_relative = 1e-12);
}

#[test]
fn validation_rejects_cavity_without_first_gap() {
    let mut l = Lattice::new();
    let cav = l.add_sequence(ElementSeq::tagged(beamline_lattice::CAVITY_TYPE_TAG, "HAND"));
    let d = l.add_element(IdealDrift::element("D", 0.05));
    let g = l.add_element(IdealRfGap::new(1.0e4, -0.3, 352.21e6).into_element("G"));
    l.add_child(cav, d).unwrap();
    l.add_child(cav, g).unwrap();
    assert_eq!(
        validate_lattice(&l, cav),
        Err(LatticeError::FirstGapCount {
            cavity: "HAND".into(),
            count: 0
        })
    );
}
