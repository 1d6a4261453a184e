//! Closed-form 2×2 optics blocks.
//!
//! Each block maps `(u, u')` across a length `l` of a region with
//! constant focusing strength `k` (1/m).

use nalgebra::Matrix2;

/// Field-free drift: `[[1, l], [0, 1]]`.
pub fn drift_block(l: f64) -> Matrix2<f64> {
    Matrix2::new(1.0, l, 0.0, 1.0)
}

/// Focusing plane: `[[cos kl, sin kl / k], [-k sin kl, cos kl]]`.
///
/// Degenerates to a drift when `k` is zero.
pub fn focusing_block(k: f64, l: f64) -> Matrix2<f64> {
    if k == 0.0 {
        return drift_block(l);
    }
    let (s, c) = (k * l).sin_cos();
    Matrix2::new(c, s / k, -k * s, c)
}

/// Defocusing plane: `[[cosh kl, sinh kl / k], [k sinh kl, cosh kl]]`.
///
/// Degenerates to a drift when `k` is zero.
pub fn defocusing_block(k: f64, l: f64) -> Matrix2<f64> {
    if k == 0.0 {
        return drift_block(l);
    }
    let (s, c) = ((k * l).sinh(), (k * l).cosh());
    Matrix2::new(c, s / k, k * s, c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn zero_strength_is_a_drift() {
        assert_eq!(focusing_block(0.0, 0.7), drift_block(0.7));
        assert_eq!(defocusing_block(0.0, 0.7), drift_block(0.7));
    }

    proptest! {
        #[test]
        fn blocks_are_symplectic(k in 0.01f64..5.0, l in 0.0f64..2.0) {
            prop_assert!((focusing_block(k, l).determinant() - 1.0).abs() < 1e-9);
            // cosh² − sinh² cancels, so the error grows with cosh²(kl).
            let scale = (k * l).cosh().powi(2);
            prop_assert!((defocusing_block(k, l).determinant() - 1.0).abs() < 1e-12 * scale);
        }

        #[test]
        fn blocks_compose_over_length(k in 0.01f64..3.0, a in 0.0f64..1.0, b in 0.0f64..1.0) {
            let whole = focusing_block(k, a + b);
            let parts = focusing_block(k, b) * focusing_block(k, a);
            for (x, y) in whole.iter().zip(parts.iter()) {
                prop_assert!((x - y).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn strong_defocusing_stays_unimodular() {
        let (k, l) = (4.985264938163241, 1.751222070626915);
        let m = defocusing_block(k, l);
        assert_relative_eq!(m.determinant(), 1.0, epsilon = 1e-12 * (k * l).cosh().powi(2));
    }

    #[test]
    fn thin_limit_matches_lens() {
        let k: f64 = 2.0;
        let l = 1e-6;
        let m = focusing_block(k, l);
        assert_relative_eq!(m[(1, 0)], -k * k * l, max_relative = 1e-6);
    }
}
