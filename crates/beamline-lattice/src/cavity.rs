//! Assembly of multi-gap RF cavities.

use beamline_core::NodeId;
use beamline_elements::{IdealDrift, IdealRfGap};
use tracing::debug;

use crate::error::LatticeError;
use crate::lattice::Lattice;
use crate::sequence::ElementSeq;

/// Type tag of sequences built by [`CavityBuilder`].
pub const CAVITY_TYPE_TAG: &str = "RfCavity";

#[derive(Debug)]
enum Part {
    Drift { id: String, length: f64 },
    Gap { id: String, gap: IdealRfGap },
}

/// Builds an RF cavity sequence from drifts and gaps in beam order.
///
/// On [`build`](Self::build) every gap receives the cavity frequency,
/// mode constant and design phase, its 0-based cell index in gap order,
/// and the first-gap / end-cell flags. Exactly one gap, the first, is
/// flagged as first.
///
/// # Examples
///
/// ```
/// use beamline_elements::IdealRfGap;
/// use beamline_lattice::{CavityBuilder, Lattice};
///
/// let mut lattice = Lattice::new();
/// let cav = CavityBuilder::new("CAV1", 352.21e6, 0.0, -0.6)
///     .drift("CAV1:D0", 0.05)
///     .gap("CAV1:G0", IdealRfGap::new(1.0e5, 0.0, 0.0))
///     .drift("CAV1:D1", 0.1)
///     .gap("CAV1:G1", IdealRfGap::new(1.0e5, 0.0, 0.0))
///     .build(&mut lattice)
///     .unwrap();
/// assert_eq!(lattice.leaf_count(cav), 4);
/// ```
#[derive(Debug)]
pub struct CavityBuilder {
    id: String,
    frequency: f64,
    mode_constant: f64,
    design_phase: f64,
    parts: Vec<Part>,
}

impl CavityBuilder {
    /// Start a cavity with RF `frequency` (Hz), `mode_constant` q and
    /// `design_phase` (rad).
    pub fn new(id: impl Into<String>, frequency: f64, mode_constant: f64, design_phase: f64) -> Self {
        Self {
            id: id.into(),
            frequency,
            mode_constant,
            design_phase,
            parts: Vec::new(),
        }
    }

    /// Append a drift of `length` metres.
    pub fn drift(mut self, id: impl Into<String>, length: f64) -> Self {
        self.parts.push(Part::Drift {
            id: id.into(),
            length,
        });
        self
    }

    /// Append a gap. Its frequency, phase, cell index, mode constant and
    /// flags are overwritten on build.
    pub fn gap(mut self, id: impl Into<String>, gap: IdealRfGap) -> Self {
        self.parts.push(Part::Gap { id: id.into(), gap });
        self
    }

    /// Number of gaps added so far.
    pub fn gap_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, Part::Gap { .. }))
            .count()
    }

    fn check(&self) -> Result<(), LatticeError> {
        let invalid = |reason: String| LatticeError::InvalidCavity {
            cavity: self.id.clone(),
            reason,
        };
        if !(self.frequency.is_finite() && self.frequency > 0.0) {
            return Err(invalid(format!("frequency must be positive, got {}", self.frequency)));
        }
        if !self.mode_constant.is_finite() {
            return Err(invalid(format!("mode constant must be finite, got {}", self.mode_constant)));
        }
        if !self.design_phase.is_finite() {
            return Err(invalid(format!("design phase must be finite, got {}", self.design_phase)));
        }
        for part in &self.parts {
            if let Part::Drift { id, length } = part {
                if !(length.is_finite() && *length >= 0.0) {
                    return Err(LatticeError::InvalidLength {
                        node: id.clone(),
                        length: *length,
                    });
                }
            }
        }
        Ok(())
    }

    /// Add the cavity to `lattice` as a detached sequence and return it.
    ///
    /// Element positions are set to their centers measured from the
    /// cavity entrance. Nothing is added if validation fails.
    pub fn build(self, lattice: &mut Lattice) -> Result<NodeId, LatticeError> {
        self.check()?;
        let gaps = self.gap_count();
        let root = lattice.add_sequence(ElementSeq::tagged(CAVITY_TYPE_TAG, self.id.clone()));
        let mut s = 0.0;
        let mut cell: u32 = 0;
        for part in self.parts {
            let element = match part {
                Part::Drift { id, length } => {
                    let mut e = IdealDrift::element(id, length);
                    e.attrs_mut().set_position(s + length / 2.0);
                    s += length;
                    e
                }
                Part::Gap { id, mut gap } => {
                    gap.set_frequency(self.frequency);
                    gap.set_phase(self.design_phase);
                    gap.set_cell_index(cell);
                    gap.set_mode_constant(self.mode_constant);
                    gap.set_first_gap(cell == 0);
                    gap.set_end_cell(cell as usize + 1 == gaps);
                    cell += 1;
                    let mut e = gap.into_element(id);
                    e.attrs_mut().set_position(s);
                    e
                }
            };
            let node = lattice.add_element(element);
            lattice.add_child(root, node)?;
        }
        debug!(cavity = %self.id, gaps, length = s, "cavity built");
        Ok(root)
    }
}
