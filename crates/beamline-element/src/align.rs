//! Misalignment of element maps.
//!
//! A misaligned element is modeled by translating into the element's
//! displaced frame on entry and back out on exit. With `T = T(-d)` the
//! homogeneous translation by the negated offsets, the misaligned map is
//! `T⁻¹ · M · T`. For a hardware node sliced into several model
//! elements the entrance translation belongs to the first slice and the
//! exit translation to the last, so the composed slices equal the
//! misaligned whole.

use beamline_core::PhaseMatrix;

/// Translational misalignment offsets (m).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Alignment {
    /// Horizontal offset.
    pub dx: f64,
    /// Vertical offset.
    pub dy: f64,
    /// Longitudinal offset.
    pub dz: f64,
}

impl Alignment {
    /// Offsets `(dx, dy, dz)`.
    pub fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Self { dx, dy, dz }
    }

    /// Whether all three offsets are exactly zero.
    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0 && self.dz == 0.0
    }

    /// Entrance translation `T(-d)`.
    pub fn entrance(&self) -> PhaseMatrix {
        PhaseMatrix::translation(-self.dx, -self.dy, -self.dz)
    }

    /// Exit translation `T(-d)⁻¹ = T(d)`.
    pub fn exit(&self) -> PhaseMatrix {
        PhaseMatrix::translation(self.dx, self.dy, self.dz)
    }
}

/// Where a thick element sits within its hardware node.
///
/// The default is an unsliced element, which is both first and last.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlicePosition {
    /// This element is the first slice (owns the entrance effects).
    pub first: bool,
    /// This element is the last slice (owns the exit effects).
    pub last: bool,
}

impl SlicePosition {
    /// A whole, unsliced element.
    pub const WHOLE: Self = Self {
        first: true,
        last: true,
    };

    /// An interior slice that owns no boundary effects.
    pub const INTERIOR: Self = Self {
        first: false,
        last: false,
    };

    /// The first slice of several.
    pub const FIRST: Self = Self {
        first: true,
        last: false,
    };

    /// The last slice of several.
    pub const LAST: Self = Self {
        first: false,
        last: true,
    };
}

impl Default for SlicePosition {
    fn default() -> Self {
        Self::WHOLE
    }
}

/// Conjugate `map` by the misalignment translation: `T(-d)⁻¹·M·T(-d)`.
///
/// Returns `map` unchanged when the offsets are zero.
pub fn apply_align_error(map: PhaseMatrix, alignment: &Alignment) -> PhaseMatrix {
    apply_sliced_align_error(map, alignment, SlicePosition::WHOLE)
}

/// Apply only the translations this slice owns.
pub fn apply_sliced_align_error(
    map: PhaseMatrix,
    alignment: &Alignment,
    slice: SlicePosition,
) -> PhaseMatrix {
    if alignment.is_zero() {
        return map;
    }
    let mut out = map;
    if slice.first {
        out = out * alignment.entrance();
    }
    if slice.last {
        out = alignment.exit() * out;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use beamline_core::{PhaseVector, Plane};
    use proptest::prelude::*;

    fn thin_lens(f: f64) -> PhaseMatrix {
        let mut m = PhaseMatrix::identity();
        m.set(1, 0, -1.0 / f);
        m.set(3, 2, 1.0 / f);
        m
    }

    #[test]
    fn zero_offsets_are_a_no_op() {
        let m = thin_lens(2.0);
        assert_eq!(apply_align_error(m, &Alignment::default()), m);
    }

    #[test]
    fn identity_is_invariant_under_conjugation() {
        let a = Alignment::new(1e-3, -2e-3, 5e-4);
        let m = apply_align_error(PhaseMatrix::identity(), &a);
        assert_relative_eq!(
            m.as_matrix(),
            PhaseMatrix::identity().as_matrix(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn offset_lens_steers_the_reference_orbit() {
        let a = Alignment::new(1e-3, 0.0, 0.0);
        let m = apply_align_error(thin_lens(2.0), &a);
        // Focusing about x = dx kicks an on-axis particle toward the
        // displaced axis: x' = +dx / f.
        assert_relative_eq!(m.get(1, 6), 1e-3 / 2.0, epsilon = 1e-15);
        let v = m.apply(&PhaseVector::origin());
        assert_relative_eq!(v.xp(), 5e-4, epsilon = 1e-15);
        assert_eq!(m.block(Plane::X), thin_lens(2.0).block(Plane::X));
    }

    proptest! {
        #[test]
        fn slices_compose_to_misaligned_whole(
            dx in -1e-2f64..1e-2, dy in -1e-2f64..1e-2, dz in -1e-2f64..1e-2,
            f1 in 0.5f64..5.0, f2 in 0.5f64..5.0, f3 in 0.5f64..5.0,
        ) {
            let a = Alignment::new(dx, dy, dz);
            let (m1, m2, m3) = (thin_lens(f1), thin_lens(f2), thin_lens(f3));
            let sliced = apply_sliced_align_error(m3, &a, SlicePosition::LAST)
                * apply_sliced_align_error(m2, &a, SlicePosition::INTERIOR)
                * apply_sliced_align_error(m1, &a, SlicePosition::FIRST);
            let whole = apply_align_error(m3 * m2 * m1, &a);
            for (x, y) in sliced.as_matrix().iter().zip(whole.as_matrix().iter()) {
                prop_assert!((x - y).abs() < 1e-12);
            }
        }
    }
}
