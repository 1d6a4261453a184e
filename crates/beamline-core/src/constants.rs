//! Physical and numerical constants shared by every element model.

/// Speed of light in vacuum (m/s).
pub const LIGHT_SPEED: f64 = 2.997_924_58e8;

/// 2π, used for RF angular frequencies and wave numbers.
pub const TWO_PI: f64 = 2.0 * std::f64::consts::PI;

/// Index of the homogeneous coordinate in a phase vector.
pub const HOMOGENEOUS: usize = 6;

/// Dimension of the homogeneous phase space (6 coordinates + 1).
pub const PHASE_DIM: usize = 7;
