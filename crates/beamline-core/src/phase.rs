//! The homogeneous 7×7 transfer primitive and its phase vector.
//!
//! Coordinates are ordered `(x, x', y, y', z, z', 1)`. The trailing
//! homogeneous unit lets a linear map also carry translations (kicks,
//! misalignments) in its last column, so every element map is a
//! single [`PhaseMatrix`] and a lattice map is a plain product.

use std::fmt;
use std::ops::Mul;

use nalgebra::{Matrix2, SMatrix, SVector};

use crate::constants::HOMOGENEOUS;

/// Backing storage of a [`PhaseMatrix`].
pub type Matrix7 = SMatrix<f64, 7, 7>;

/// Backing storage of a [`PhaseVector`].
pub type Vector7 = SVector<f64, 7>;

/// One of the three phase planes, each a 2×2 diagonal block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Plane {
    /// Horizontal `(x, x')`.
    X,
    /// Vertical `(y, y')`.
    Y,
    /// Longitudinal `(z, z')`.
    Z,
}

impl Plane {
    /// All three planes in coordinate order.
    pub const ALL: [Plane; 3] = [Plane::X, Plane::Y, Plane::Z];

    /// Index of the position coordinate of this plane.
    pub fn offset(self) -> usize {
        match self {
            Plane::X => 0,
            Plane::Y => 2,
            Plane::Z => 4,
        }
    }
}

/// A 7×7 homogeneous linear map over phase space.
#[derive(Clone, Copy, PartialEq)]
#[must_use]
pub struct PhaseMatrix(Matrix7);

impl PhaseMatrix {
    /// The identity map.
    pub fn identity() -> Self {
        Self(Matrix7::identity())
    }

    /// Wrap a raw 7×7 matrix.
    pub fn from_matrix(m: Matrix7) -> Self {
        Self(m)
    }

    /// Build a block-diagonal map from the three plane blocks.
    ///
    /// The homogeneous diagonal entry is set to 1.
    pub fn from_blocks(x: Matrix2<f64>, y: Matrix2<f64>, z: Matrix2<f64>) -> Self {
        let mut m = Self::identity();
        m.set_block(Plane::X, &x);
        m.set_block(Plane::Y, &y);
        m.set_block(Plane::Z, &z);
        m
    }

    /// Pure translation by `(dx, dy, dz)` in homogeneous coordinates.
    ///
    /// Applied to a phase vector it adds `dx` to `x`, `dy` to `y` and
    /// `dz` to `z`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Self::identity();
        m.0[(0, HOMOGENEOUS)] = dx;
        m.0[(2, HOMOGENEOUS)] = dy;
        m.0[(4, HOMOGENEOUS)] = dz;
        m
    }

    /// Borrow the underlying matrix.
    pub fn as_matrix(&self) -> &Matrix7 {
        &self.0
    }

    /// Consume into the underlying matrix.
    pub fn into_matrix(self) -> Matrix7 {
        self.0
    }

    /// Single matrix entry.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0[(row, col)]
    }

    /// Overwrite a single matrix entry.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.0[(row, col)] = value;
    }

    /// The 2×2 diagonal block of a plane.
    pub fn block(&self, plane: Plane) -> Matrix2<f64> {
        let o = plane.offset();
        self.0.fixed_view::<2, 2>(o, o).into_owned()
    }

    /// Overwrite the 2×2 diagonal block of a plane.
    pub fn set_block(&mut self, plane: Plane, block: &Matrix2<f64>) {
        let o = plane.offset();
        self.0.fixed_view_mut::<2, 2>(o, o).copy_from(block);
    }

    /// The homogeneous ("dispersive") column without its diagonal entry.
    pub fn homogeneous_column(&self) -> [f64; 6] {
        let mut col = [0.0; 6];
        for (i, c) in col.iter_mut().enumerate() {
            *c = self.0[(i, HOMOGENEOUS)];
        }
        col
    }

    /// Map of `first` followed by `self`, i.e. `self · first`.
    pub fn after(&self, first: &PhaseMatrix) -> PhaseMatrix {
        PhaseMatrix(self.0 * first.0)
    }

    /// Inverse map, or `None` when the matrix is singular.
    pub fn try_inverse(&self) -> Option<PhaseMatrix> {
        self.0.try_inverse().map(PhaseMatrix)
    }

    /// Apply the map to a phase vector.
    pub fn apply(&self, v: &PhaseVector) -> PhaseVector {
        PhaseVector(self.0 * v.0)
    }

    /// Whether every entry is finite.
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl Default for PhaseMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for PhaseMatrix {
    type Output = PhaseMatrix;

    fn mul(self, rhs: PhaseMatrix) -> PhaseMatrix {
        PhaseMatrix(self.0 * rhs.0)
    }
}

impl Mul<&PhaseMatrix> for &PhaseMatrix {
    type Output = PhaseMatrix;

    fn mul(self, rhs: &PhaseMatrix) -> PhaseMatrix {
        PhaseMatrix(self.0 * rhs.0)
    }
}

impl fmt::Debug for PhaseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhaseMatrix{}", self.0)
    }
}

/// A point in homogeneous phase space `(x, x', y, y', z, z', 1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseVector(Vector7);

impl PhaseVector {
    /// Build from the six phase coordinates; the homogeneous unit is 1.
    pub fn new(x: f64, xp: f64, y: f64, yp: f64, z: f64, zp: f64) -> Self {
        Self(Vector7::from_column_slice(&[x, xp, y, yp, z, zp, 1.0]))
    }

    /// The on-axis reference point.
    pub fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0)
    }

    /// Borrow the underlying vector.
    pub fn as_vector(&self) -> &Vector7 {
        &self.0
    }

    /// Coordinate by index (0..7).
    pub fn get(&self, index: usize) -> f64 {
        self.0[index]
    }

    /// Horizontal position.
    pub fn x(&self) -> f64 {
        self.0[0]
    }

    /// Horizontal divergence.
    pub fn xp(&self) -> f64 {
        self.0[1]
    }

    /// Vertical position.
    pub fn y(&self) -> f64 {
        self.0[2]
    }

    /// Vertical divergence.
    pub fn yp(&self) -> f64 {
        self.0[3]
    }

    /// Longitudinal position.
    pub fn z(&self) -> f64 {
        self.0[4]
    }

    /// Longitudinal momentum deviation.
    pub fn zp(&self) -> f64 {
        self.0[5]
    }

    /// Largest absolute difference in the four transverse coordinates.
    pub fn transverse_distance(&self, other: &PhaseVector) -> f64 {
        (0..4)
            .map(|i| (self.0[i] - other.0[i]).abs())
            .fold(0.0, f64::max)
    }
}

impl Default for PhaseVector {
    fn default() -> Self {
        Self::origin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn drift(len: f64) -> Matrix2<f64> {
        Matrix2::new(1.0, len, 0.0, 1.0)
    }

    #[test]
    fn translation_moves_positions_only() {
        let t = PhaseMatrix::translation(0.1, -0.2, 0.3);
        let v = t.apply(&PhaseVector::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0));
        assert_relative_eq!(v.x(), 1.1);
        assert_relative_eq!(v.xp(), 2.0);
        assert_relative_eq!(v.y(), 2.8);
        assert_relative_eq!(v.z(), 5.3);
        assert_relative_eq!(v.get(6), 1.0);
    }

    #[test]
    fn blocks_round_trip() {
        let m = PhaseMatrix::from_blocks(drift(1.0), drift(2.0), drift(3.0));
        assert_eq!(m.block(Plane::Y), drift(2.0));
        assert_eq!(m.get(6, 6), 1.0);
        assert_eq!(m.get(0, 2), 0.0);
    }

    #[test]
    fn composition_order_is_first_then_self() {
        let kick = {
            let mut m = PhaseMatrix::identity();
            m.set(1, 6, 0.01);
            m
        };
        let d = PhaseMatrix::from_blocks(drift(2.0), drift(2.0), drift(2.0));
        // Kick then drift: x grows by 2 m * 0.01 rad.
        let v = d.after(&kick).apply(&PhaseVector::origin());
        assert_relative_eq!(v.x(), 0.02, epsilon = 1e-15);
        // Drift then kick: x unchanged.
        let w = kick.after(&d).apply(&PhaseVector::origin());
        assert_relative_eq!(w.x(), 0.0);
    }

    #[test]
    fn inverse_of_translation_is_opposite_translation() {
        let t = PhaseMatrix::translation(0.001, 0.002, 0.003);
        let inv = t.try_inverse().unwrap();
        assert_relative_eq!(
            inv.as_matrix(),
            PhaseMatrix::translation(-0.001, -0.002, -0.003).as_matrix(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let m = PhaseMatrix::from_matrix(Matrix7::zeros());
        assert!(m.try_inverse().is_none());
    }

    proptest! {
        #[test]
        fn translations_compose_additively(
            a in -1.0f64..1.0, b in -1.0f64..1.0, c in -1.0f64..1.0,
            d in -1.0f64..1.0, e in -1.0f64..1.0, f in -1.0f64..1.0,
        ) {
            let t = PhaseMatrix::translation(a, b, c) * PhaseMatrix::translation(d, e, f);
            let expected = PhaseMatrix::translation(a + d, b + e, c + f);
            for (x, y) in t.as_matrix().iter().zip(expected.as_matrix().iter()) {
                prop_assert!((x - y).abs() < 1e-12);
            }
        }
    }
}
