//! Structural validation of a built lattice.

use beamline_core::NodeId;
use beamline_elements::IdealRfGap;
use indexmap::IndexMap;

use crate::cavity::CAVITY_TYPE_TAG;
use crate::error::LatticeError;
use crate::lattice::{Lattice, NodeKind};

#[derive(Debug, Default)]
struct GapTally {
    gaps: usize,
    first: usize,
}

/// Check the subtree rooted at `root` before propagation.
///
/// Every element and sequence-override length must be finite and
/// non-negative. Every cavity (a sequence tagged
/// [`CAVITY_TYPE_TAG`]) holding at least one gap must flag exactly one
/// of them as the first gap. Cavities are checked in pre-order, so the
/// reported error is the first offending cavity along the beam.
pub fn validate_lattice(lattice: &Lattice, root: NodeId) -> Result<(), LatticeError> {
    if !lattice.contains(root) {
        return Err(LatticeError::UnknownNode(root));
    }
    let mut cavities: IndexMap<NodeId, GapTally> = IndexMap::new();
    for node in std::iter::once(root).chain(lattice.global_iter(root)) {
        match lattice.kind(node) {
            Some(NodeKind::Element(e)) => check_length(e.id(), e.length())?,
            Some(NodeKind::Sequence(s)) => {
                if let Some(len) = s.length_override() {
                    check_length(s.id(), len)?;
                }
                if s.type_tag() == CAVITY_TYPE_TAG {
                    cavities.insert(node, GapTally::default());
                }
            }
            None => return Err(LatticeError::UnknownNode(node)),
        }
    }

    for (&cavity, tally) in cavities.iter_mut() {
        for node in lattice.global_iter(cavity) {
            if let Some(gap) = lattice.element(node).and_then(|e| e.thin_physics::<IdealRfGap>()) {
                tally.gaps += 1;
                if gap.is_first_gap() {
                    tally.first += 1;
                }
            }
        }
    }

    for (&cavity, tally) in &cavities {
        if tally.gaps > 0 && tally.first != 1 {
            return Err(LatticeError::FirstGapCount {
                cavity: lattice.id(cavity).unwrap_or_default().to_owned(),
                count: tally.first,
            });
        }
    }
    Ok(())
}

fn check_length(id: &str, length: f64) -> Result<(), LatticeError> {
    if length.is_finite() && length >= 0.0 {
        Ok(())
    } else {
        Err(LatticeError::InvalidLength {
            node: id.to_owned(),
            length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CavityBuilder, ElementSeq};
    use beamline_elements::IdealDrift;

    fn cavity(l: &mut Lattice) -> NodeId {
        CavityBuilder::new("CAV", 352.21e6, 0.0, -0.4)
            .gap("G0", IdealRfGap::new(1.0e5, 0.0, 0.0))
            .drift("D", 0.1)
            .gap("G1", IdealRfGap::new(1.0e5, 0.0, 0.0))
            .build(l)
            .unwrap()
    }

    fn gap_of(l: &Lattice, id: &str) -> IdealRfGap {
        let n = l.find(id).unwrap();
        l.element(n).unwrap().thin_physics::<IdealRfGap>().unwrap().clone()
    }

    fn replace_gap(l: &mut Lattice, id: &str, gap: IdealRfGap) {
        let n = l.find(id).unwrap();
        l.replace_element(n, gap.into_element(id)).unwrap();
    }

    #[test]
    fn built_cavity_is_valid() {
        let mut l = Lattice::new();
        let root = l.add_sequence(ElementSeq::new("LINAC"));
        let cav = cavity(&mut l);
        l.add_child(root, cav).unwrap();
        assert_eq!(validate_lattice(&l, root), Ok(()));
    }

    #[test]
    fn two_first_gaps_are_rejected() {
        let mut l = Lattice::new();
        let cav = cavity(&mut l);
        let mut g1 = gap_of(&l, "G1");
        g1.set_first_gap(true);
        replace_gap(&mut l, "G1", g1);
        assert_eq!(
            validate_lattice(&l, cav),
            Err(LatticeError::FirstGapCount {
                cavity: "CAV".into(),
                count: 2
            })
        );
    }

    #[test]
    fn zero_first_gaps_are_rejected() {
        let mut l = Lattice::new();
        let cav = cavity(&mut l);
        let mut g0 = gap_of(&l, "G0");
        g0.set_first_gap(false);
        replace_gap(&mut l, "G0", g0);
        assert!(matches!(
            validate_lattice(&l, cav),
            Err(LatticeError::FirstGapCount { count: 0, .. })
        ));
    }

    #[test]
    fn empty_cavity_is_accepted() {
        let mut l = Lattice::new();
        let cav = l.add_sequence(ElementSeq::tagged(CAVITY_TYPE_TAG, "EMPTY"));
        let d = l.add_element(IdealDrift::element("D", 1.0));
        l.add_child(cav, d).unwrap();
        assert_eq!(validate_lattice(&l, cav), Ok(()));
    }

    #[test]
    fn negative_element_length_is_rejected() {
        let mut l = Lattice::new();
        let s = l.add_sequence(ElementSeq::new("S"));
        let d = l.add_element(IdealDrift::element("DNEG", -0.25));
        l.add_child(s, d).unwrap();
        assert_eq!(
            validate_lattice(&l, s),
            Err(LatticeError::InvalidLength {
                node: "DNEG".into(),
                length: -0.25
            })
        );
    }

    #[test]
    fn bad_override_length_is_rejected() {
        let mut l = Lattice::new();
        let s = l.add_sequence(ElementSeq::new("S").with_length_override(f64::NAN));
        assert!(matches!(
            validate_lattice(&l, s),
            Err(LatticeError::InvalidLength { .. })
        ));
        assert_eq!(
            validate_lattice(&l, NodeId(9)),
            Err(LatticeError::UnknownNode(NodeId(9)))
        );
    }
}
