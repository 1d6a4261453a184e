//! Probe propagation through a lattice subtree.

use beamline_core::{AdvanceProbe, NodeId, Probe, Transfer};
use tracing::{debug, trace, warn};

use crate::error::PropagateError;
use crate::lattice::{Lattice, NodeKind};
use crate::metrics::WalkMetrics;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

impl Lattice {
    /// Walk `probe` through `node` from entrance to exit.
    ///
    /// Each element computes its step at the probe's current state and
    /// the probe applies it before the next element is asked. The first
    /// element error aborts the walk; elements after it are not visited.
    pub fn propagate<P: AdvanceProbe>(
        &self,
        node: NodeId,
        probe: &mut P,
    ) -> Result<WalkMetrics, PropagateError> {
        let mut metrics = WalkMetrics::default();
        self.walk(node, probe, Direction::Forward, None, &mut metrics)?;
        Ok(metrics)
    }

    /// Walk `probe` through `node` from exit to entrance, visiting
    /// children in reverse order and applying inverse steps.
    pub fn back_propagate<P: AdvanceProbe>(
        &self,
        node: NodeId,
        probe: &mut P,
    ) -> Result<WalkMetrics, PropagateError> {
        let mut metrics = WalkMetrics::default();
        self.walk(node, probe, Direction::Backward, None, &mut metrics)?;
        Ok(metrics)
    }

    /// Like [`propagate`](Self::propagate), starting `pos` metres into a
    /// thick element. Sequences and thin elements ignore `pos`.
    pub fn propagate_from<P: AdvanceProbe>(
        &self,
        node: NodeId,
        probe: &mut P,
        pos: f64,
    ) -> Result<WalkMetrics, PropagateError> {
        let mut metrics = WalkMetrics::default();
        self.walk(node, probe, Direction::Forward, Some(pos), &mut metrics)?;
        Ok(metrics)
    }

    /// Like [`back_propagate`](Self::back_propagate), from `pos` metres
    /// into a thick element back to its entrance.
    pub fn back_propagate_from<P: AdvanceProbe>(
        &self,
        node: NodeId,
        probe: &mut P,
        pos: f64,
    ) -> Result<WalkMetrics, PropagateError> {
        let mut metrics = WalkMetrics::default();
        self.walk(node, probe, Direction::Backward, Some(pos), &mut metrics)?;
        Ok(metrics)
    }

    /// The composed forward step of `node` for a copy of `probe`.
    ///
    /// The copy is advanced element by element, so energy-dependent maps
    /// downstream of a gap see the accelerated state. `probe` itself is
    /// untouched.
    pub fn compose<P: AdvanceProbe + Clone>(
        &self,
        node: NodeId,
        probe: &P,
    ) -> Result<Transfer, PropagateError> {
        let mut acc = Composing {
            inner: probe.clone(),
            total: Transfer::identity(),
        };
        self.propagate(node, &mut acc)?;
        Ok(acc.total)
    }

    fn walk<P: AdvanceProbe>(
        &self,
        node: NodeId,
        probe: &mut P,
        dir: Direction,
        pos: Option<f64>,
        metrics: &mut WalkMetrics,
    ) -> Result<(), PropagateError> {
        match self.kind(node).ok_or(PropagateError::UnknownNode(node))? {
            NodeKind::Element(element) => {
                let state: &P = probe;
                let step = match (dir, pos) {
                    (Direction::Forward, None) => element.propagate(state),
                    (Direction::Forward, Some(p)) => element.propagate_from(state, p),
                    (Direction::Backward, None) => element.back_propagate(state),
                    (Direction::Backward, Some(p)) => element.back_propagate_from(state, p),
                };
                let transfer = step.map_err(|source| {
                    warn!(
                        node = %node,
                        element = element.id(),
                        error = %source,
                        "walk aborted"
                    );
                    PropagateError::ElementFailed {
                        node,
                        element: element.id().to_owned(),
                        source,
                    }
                })?;
                trace!(
                    node = %node,
                    element = element.id(),
                    length = transfer.length,
                    energy_gain = transfer.energy_gain,
                    "element step"
                );
                probe.advance(&transfer);
                metrics.record(&transfer);
            }
            NodeKind::Sequence(seq) => {
                debug!(node = %node, sequence = seq.id(), direction = ?dir, "sequence walk start");
                metrics.sequences += 1;
                let children = match dir {
                    Direction::Forward => seq.children(),
                    Direction::Backward => seq.children_rev(),
                };
                for &child in children {
                    self.walk(child, probe, dir, None, metrics)?;
                }
                debug!(node = %node, sequence = seq.id(), elements = metrics.elements, "sequence walk finish");
            }
        }
        Ok(())
    }
}

/// Probe wrapper that folds every applied step into one transfer.
struct Composing<P> {
    inner: P,
    total: Transfer,
}

impl<P: Probe> Probe for Composing<P> {
    fn species_charge(&self) -> f64 {
        self.inner.species_charge()
    }

    fn species_rest_energy(&self) -> f64 {
        self.inner.species_rest_energy()
    }

    fn kinetic_energy(&self) -> f64 {
        self.inner.kinetic_energy()
    }

    fn longitudinal_phase(&self) -> f64 {
        self.inner.longitudinal_phase()
    }

    fn position(&self) -> f64 {
        self.inner.position()
    }

    fn rf_gap_phase_calculation(&self) -> bool {
        self.inner.rf_gap_phase_calculation()
    }
}

impl<P: AdvanceProbe> AdvanceProbe for Composing<P> {
    fn advance(&mut self, transfer: &Transfer) {
        self.inner.advance(transfer);
        self.total = self.total.then(transfer);
    }
}
