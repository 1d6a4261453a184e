//! Forward-then-backward symmetry and misalignment of closed-form elements.

use approx::assert_relative_eq;
use beamline_core::{PhaseVector, Plane};
use beamline_element::{Alignment, Element, SlicePosition};
use beamline_elements::{IdealDrift, IdealMagQuad, IdealMagSteeringDipole, Orientation};
use beamline_test_utils::ParticleProbe;

fn start() -> PhaseVector {
    PhaseVector::new(1.2e-3, -0.4e-3, -0.7e-3, 0.9e-3, 2e-4, 1e-4)
}

fn round_trip(element: &Element, probe: &ParticleProbe) -> PhaseVector {
    let fwd = element.propagate(probe).unwrap();
    let back = element.back_propagate(probe).unwrap();
    assert_relative_eq!(fwd.length + back.length, 0.0);
    back.map.apply(&fwd.map.apply(&start()))
}

#[test]
fn drift_round_trip() {
    let probe = ParticleProbe::proton_at_beta(0.5);
    let end = round_trip(&IdealDrift::element("D", 1.0), &probe);
    assert!(end.transverse_distance(&start()) < 1e-9);
}

#[test]
fn quadrupole_round_trip_both_orientations() {
    let probe = ParticleProbe::proton(2.5e6);
    for orientation in [Orientation::Horizontal, Orientation::Vertical] {
        let q = IdealMagQuad::element("Q", 0.15, 18.0, orientation);
        let end = round_trip(&q, &probe);
        assert!(end.transverse_distance(&start()) < 1e-9);
    }
}

#[test]
fn steering_round_trip() {
    let probe = ParticleProbe::h_minus(2.5e6);
    for orientation in [Orientation::Horizontal, Orientation::Vertical] {
        let c = IdealMagSteeringDipole::element("C", 0.01, 0.1, orientation);
        let end = round_trip(&c, &probe);
        assert!(end.transverse_distance(&start()) < 1e-9);
    }
}

#[test]
fn misaligned_quadrupole_round_trip() {
    let probe = ParticleProbe::proton(2.5e6);
    let mut q = IdealMagQuad::element("Q", 0.15, 18.0, Orientation::Horizontal);
    q.attrs_mut().set_alignment(Alignment::new(1e-3, -5e-4, 0.0));
    let end = round_trip(&q, &probe);
    assert!(end.transverse_distance(&start()) < 1e-9);
}

#[test]
fn offset_adds_dispersive_column_to_focusing_map() {
    let probe = ParticleProbe::proton(2.5e6);
    let aligned = IdealMagQuad::element("Q", 0.15, 18.0, Orientation::Horizontal);
    let mut shifted = IdealMagQuad::element("Q", 0.15, 18.0, Orientation::Horizontal);
    shifted.attrs_mut().set_alignment(Alignment::new(1e-3, 0.0, 0.0));

    let m0 = aligned.propagate(&probe).unwrap().map;
    let m1 = shifted.propagate(&probe).unwrap().map;
    assert_eq!(m0.homogeneous_column(), [0.0; 6]);
    let col = m1.homogeneous_column();
    // x_out = M(x_in - d) + d
    assert_relative_eq!(col[0], 1e-3 * (1.0 - m0.get(0, 0)), max_relative = 1e-12);
    assert_relative_eq!(col[1], -1e-3 * m0.get(1, 0), max_relative = 1e-12);
    assert_eq!(m1.block(Plane::X), m0.block(Plane::X));
}

#[test]
fn zero_offset_is_a_no_op() {
    let probe = ParticleProbe::proton(2.5e6);
    let a = IdealMagQuad::element("Q", 0.15, 18.0, Orientation::Vertical);
    let mut b = IdealMagQuad::element("Q", 0.15, 18.0, Orientation::Vertical);
    b.attrs_mut().set_alignment(Alignment::new(0.0, 0.0, 0.0));
    assert_eq!(
        a.propagate(&probe).unwrap().map,
        b.propagate(&probe).unwrap().map
    );
}

#[test]
fn sliced_quadrupole_composes_to_misaligned_whole() {
    let probe = ParticleProbe::proton(2.5e6);
    let align = Alignment::new(8e-4, -3e-4, 1e-4);
    let slice = |id: &str, length: f64, pos: SlicePosition| {
        let mut e = IdealMagQuad::element(id, length, 18.0, Orientation::Horizontal).with_slice(pos);
        e.attrs_mut().set_alignment(align);
        e
    };
    let mut whole = IdealMagQuad::element("Q", 0.3, 18.0, Orientation::Horizontal);
    whole.attrs_mut().set_alignment(align);

    let parts = [
        slice("Q:1", 0.1, SlicePosition::FIRST),
        slice("Q:2", 0.1, SlicePosition::INTERIOR),
        slice("Q:3", 0.1, SlicePosition::LAST),
    ];
    let composed = parts
        .iter()
        .map(|e| e.propagate(&probe).unwrap())
        .reduce(|acc, t| acc.then(&t))
        .unwrap();
    let expected = whole.propagate(&probe).unwrap();
    for (a, b) in composed.map.as_matrix().iter().zip(expected.map.as_matrix().iter()) {
        assert!((a - b).abs() < 1e-9, "{a} vs {b}");
    }
    assert_relative_eq!(composed.length, 0.3, epsilon = 1e-15);
}
