//! Relativistic energy/velocity conversions.
//!
//! Energies are in eV, velocities are normalized (`β = v/c`).

/// Lorentz factor from kinetic and rest energy: `γ = W/Er + 1`.
pub fn gamma_from_energies(kinetic: f64, rest: f64) -> f64 {
    kinetic / rest + 1.0
}

/// Normalized velocity from the Lorentz factor: `β = sqrt(1 - 1/γ²)`.
pub fn beta_from_gamma(gamma: f64) -> f64 {
    (1.0 - 1.0 / (gamma * gamma)).sqrt()
}

/// Normalized velocity from kinetic and rest energy.
pub fn beta_from_energies(kinetic: f64, rest: f64) -> f64 {
    beta_from_gamma(gamma_from_energies(kinetic, rest))
}

/// Lorentz factor from normalized velocity.
pub fn gamma_from_beta(beta: f64) -> f64 {
    1.0 / (1.0 - beta * beta).sqrt()
}

/// Kinetic energy for a particle of rest energy `rest` moving at `beta`.
pub fn kinetic_energy_from_beta(beta: f64, rest: f64) -> f64 {
    (gamma_from_beta(beta) - 1.0) * rest
}

/// Momentum in eV/c: `p = sqrt(W (W + 2 Er))`.
pub fn momentum(kinetic: f64, rest: f64) -> f64 {
    (kinetic * (kinetic + 2.0 * rest)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const PROTON: f64 = 938.272_088e6;

    #[test]
    fn beta_energy_round_trip() {
        let w = kinetic_energy_from_beta(0.5, PROTON);
        assert_relative_eq!(beta_from_energies(w, PROTON), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn momentum_matches_beta_gamma() {
        let w = 2.5e6;
        let g = gamma_from_energies(w, PROTON);
        let b = beta_from_gamma(g);
        assert_relative_eq!(momentum(w, PROTON), b * g * PROTON, max_relative = 1e-12);
    }

    #[test]
    fn zero_kinetic_energy_is_at_rest() {
        assert_eq!(gamma_from_energies(0.0, PROTON), 1.0);
        assert_eq!(beta_from_energies(0.0, PROTON), 0.0);
    }
}
