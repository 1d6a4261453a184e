//! One-dimensional curve fits supplying transit-time-factor data.

use std::fmt;

/// A real function of one real variable.
///
/// Implemented by [`Polynomial`] and by any `Fn(f64) -> f64` closure.
pub trait UnivariateFit: Send + Sync {
    /// Value at `x`.
    fn evaluate_at(&self, x: f64) -> f64;
}

impl<F> UnivariateFit for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn evaluate_at(&self, x: f64) -> f64 {
        self(x)
    }
}

/// Polynomial `c₀ + c₁x + c₂x² + …`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    /// A polynomial from ascending-order coefficients.
    pub fn new(coefficients: impl Into<Vec<f64>>) -> Self {
        Self {
            coefficients: coefficients.into(),
        }
    }

    /// The constant polynomial `c`.
    pub fn constant(c: f64) -> Self {
        Self::new(vec![c])
    }

    /// Ascending-order coefficients.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Degree; the empty polynomial has degree 0.
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// The derivative polynomial.
    pub fn derivative(&self) -> Polynomial {
        Polynomial::new(
            self.coefficients
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| i as f64 * c)
                .collect::<Vec<_>>(),
        )
    }
}

impl UnivariateFit for Polynomial {
    fn evaluate_at(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * x + c)
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (i, c) in self.coefficients.iter().enumerate() {
            if !first {
                write!(f, " + ")?;
            }
            first = false;
            match i {
                0 => write!(f, "{c}")?,
                1 => write!(f, "{c}x")?,
                _ => write!(f, "{c}x^{i}")?,
            }
        }
        if first {
            write!(f, "0")?;
        }
        Ok(())
    }
}
