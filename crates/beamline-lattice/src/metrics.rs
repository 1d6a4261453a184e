//! Counters collected during a lattice walk.

/// Totals accumulated by one call to a lattice walk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WalkMetrics {
    /// Elements whose step was applied.
    pub elements: usize,
    /// Sequences entered.
    pub sequences: usize,
    /// Signed path length covered (m).
    pub length: f64,
    /// Kinetic energy gained (eV).
    pub energy_gain: f64,
    /// Time elapsed (s).
    pub elapsed_time: f64,
}

impl WalkMetrics {
    pub(crate) fn record(&mut self, transfer: &beamline_core::Transfer) {
        self.elements += 1;
        self.length += transfer.length;
        self.energy_gain += transfer.energy_gain;
        self.elapsed_time += transfer.elapsed_time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamline_core::Transfer;

    #[test]
    fn default_metrics_are_zero() {
        let m = WalkMetrics::default();
        assert_eq!(m.elements, 0);
        assert_eq!(m.sequences, 0);
        assert_eq!(m.length, 0.0);
        assert_eq!(m.energy_gain, 0.0);
    }

    #[test]
    fn record_accumulates() {
        let mut m = WalkMetrics::default();
        let t = Transfer {
            length: 0.5,
            energy_gain: 10.0,
            ..Transfer::identity()
        };
        m.record(&t);
        m.record(&t);
        assert_eq!(m.elements, 2);
        assert_eq!(m.length, 1.0);
        assert_eq!(m.energy_gain, 20.0);
    }
}
