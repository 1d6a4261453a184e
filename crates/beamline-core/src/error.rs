//! Element-level error taxonomy.
//!
//! Every failure to produce a transfer map is a [`ModelError`]. Lattice
//! construction and walk failures live in `beamline-lattice` and wrap
//! this type as their source.

use thiserror::Error;

use crate::transfer::GapState;

/// Errors raised while computing an element's transfer map.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ModelError {
    /// The element's orientation code is not one of the supported
    /// orientations.
    #[error("element '{element}': bad orientation code {orientation}")]
    BadOrientation {
        /// Instance id of the failing element.
        element: String,
        /// The raw orientation code.
        orientation: i32,
    },

    /// A parameter required by the selected computation was never set.
    #[error("element '{element}': missing parameter '{parameter}'")]
    MissingParameter {
        /// Instance id of the failing element.
        element: String,
        /// Name of the missing parameter.
        parameter: &'static str,
    },

    /// A parameter or probe quantity is outside its valid domain.
    #[error("element '{element}': invalid {parameter}: {reason}")]
    InvalidParameter {
        /// Instance id of the failing element.
        element: String,
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Human-readable description.
        reason: String,
    },

    /// A partial-length map was requested outside `[0, L]`.
    #[error("element '{element}': subsection length {length} outside [0, {element_length}]")]
    InvalidSubsection {
        /// Instance id of the failing element.
        element: String,
        /// The requested length.
        length: f64,
        /// The element's full length.
        element_length: f64,
    },

    /// The forward map is singular, so no backward map exists.
    #[error("element '{element}': transfer map is singular")]
    SingularMap {
        /// Instance id of the failing element.
        element: String,
    },

    /// The RF-gap fixed-point iteration hit its iteration cap.
    #[error(
        "element '{element}': gap solver did not converge after {iterations} iterations \
         (residual {residual:e})"
    )]
    NonConvergence {
        /// Instance id of the failing element.
        element: String,
        /// Iterations performed.
        iterations: u32,
        /// Final convergence residual (may be NaN).
        residual: f64,
        /// The last iterate reached.
        last: GapState,
    },
}

impl ModelError {
    /// Instance id of the element that raised the error.
    pub fn element(&self) -> &str {
        match self {
            Self::BadOrientation { element, .. }
            | Self::MissingParameter { element, .. }
            | Self::InvalidParameter { element, .. }
            | Self::InvalidSubsection { element, .. }
            | Self::SingularMap { element }
            | Self::NonConvergence { element, .. } => element,
        }
    }

    /// Whether this is a configuration error rather than a numerical one.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::NonConvergence { .. } | Self::SingularMap { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_element_and_cause() {
        let e = ModelError::BadOrientation {
            element: "QH01".into(),
            orientation: 0,
        };
        assert_eq!(e.to_string(), "element 'QH01': bad orientation code 0");
        assert_eq!(e.element(), "QH01");
        assert!(e.is_configuration());
    }

    #[test]
    fn non_convergence_carries_last_iterate() {
        let e = ModelError::NonConvergence {
            element: "G1".into(),
            iterations: 50,
            residual: f64::NAN,
            last: GapState::new(0.1, 2.0e3),
        };
        assert!(!e.is_configuration());
        match e {
            ModelError::NonConvergence { last, .. } => {
                assert_eq!(last.phase, 0.1);
                assert_eq!(last.energy, 2.0e3);
            }
            _ => unreachable!(),
        }
    }
}
