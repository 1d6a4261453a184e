//! [`Element`]: physics wrapped with identity, placement and
//! misalignment.

use std::sync::Arc;

use beamline_core::{ElementUid, ModelError, PhaseMatrix, Probe, Transfer};

use crate::align::{apply_sliced_align_error, Alignment, SlicePosition};
use crate::attrs::ElementAttrs;
use crate::thick::ThickMap;
use crate::thin::ThinMap;

/// The closed set of element shapes.
#[derive(Clone, Debug)]
pub enum ElementBody {
    /// Zero-length kick.
    Thin(Arc<dyn ThinMap>),
    /// Finite-length element.
    Thick {
        /// Full length (m).
        length: f64,
        /// Position within a sliced hardware node.
        slice: SlicePosition,
        /// The physics model.
        physics: Arc<dyn ThickMap>,
    },
}

/// One unit of a lattice.
///
/// Cloning is cheap: physics is shared, and the clone keeps the UID of
/// the unit it models.
///
/// # Examples
///
/// ```
/// use beamline_core::{PhaseMatrix, Probe, ModelError};
/// use beamline_element::{Element, ElementAttrs, ThickMap};
///
/// #[derive(Debug)]
/// struct Nothing;
///
/// impl ThickMap for Nothing {
///     fn kind(&self) -> &'static str { "nothing" }
///     fn transfer_map(
///         &self,
///         _attrs: &ElementAttrs,
///         _probe: &dyn Probe,
///         _length: f64,
///     ) -> Result<PhaseMatrix, ModelError> {
///         Ok(PhaseMatrix::identity())
///     }
/// }
///
/// let e = Element::thick(ElementAttrs::new("Nothing", "N1"), 2.0, Nothing);
/// assert_eq!(e.length(), 2.0);
/// assert!(e.thick_physics::<Nothing>().is_some());
/// ```
#[derive(Clone, Debug)]
pub struct Element {
    attrs: ElementAttrs,
    body: ElementBody,
}

impl Element {
    /// A thin element.
    pub fn thin(attrs: ElementAttrs, physics: impl ThinMap) -> Self {
        Self {
            attrs,
            body: ElementBody::Thin(Arc::new(physics)),
        }
    }

    /// An unsliced thick element of the given length.
    ///
    /// The length is stored as given. A negative or non-finite length is
    /// reported by lattice validation and makes every map request fail
    /// with [`ModelError::InvalidSubsection`].
    pub fn thick(attrs: ElementAttrs, length: f64, physics: impl ThickMap) -> Self {
        Self {
            attrs,
            body: ElementBody::Thick {
                length,
                slice: SlicePosition::WHOLE,
                physics: Arc::new(physics),
            },
        }
    }

    /// Builder: mark this thick element as one slice of a hardware node.
    /// No effect on thin elements.
    pub fn with_slice(mut self, slice: SlicePosition) -> Self {
        if let ElementBody::Thick { slice: s, .. } = &mut self.body {
            *s = slice;
        }
        self
    }

    /// Identity and placement.
    pub fn attrs(&self) -> &ElementAttrs {
        &self.attrs
    }

    /// Mutable identity and placement, for lattice construction.
    pub fn attrs_mut(&mut self) -> &mut ElementAttrs {
        &mut self.attrs
    }

    /// The element shape and physics.
    pub fn body(&self) -> &ElementBody {
        &self.body
    }

    /// Process-wide unique id.
    pub fn uid(&self) -> ElementUid {
        self.attrs.uid()
    }

    /// Instance id.
    pub fn id(&self) -> &str {
        self.attrs.id()
    }

    /// Soft type tag.
    pub fn type_tag(&self) -> &str {
        self.attrs.type_tag()
    }

    /// Local position of the element centre (m).
    pub fn position(&self) -> f64 {
        self.attrs.position()
    }

    /// Misalignment offsets.
    pub fn alignment(&self) -> &Alignment {
        self.attrs.alignment()
    }

    /// Length (m); zero for thin elements.
    pub fn length(&self) -> f64 {
        match &self.body {
            ElementBody::Thin(_) => 0.0,
            ElementBody::Thick { length, .. } => *length,
        }
    }

    /// Whether this is a zero-length kick.
    pub fn is_thin(&self) -> bool {
        matches!(self.body, ElementBody::Thin(_))
    }

    /// Slice position; thin elements are always whole.
    pub fn slice(&self) -> SlicePosition {
        match &self.body {
            ElementBody::Thin(_) => SlicePosition::WHOLE,
            ElementBody::Thick { slice, .. } => *slice,
        }
    }

    /// Thin physics downcast to `T`, if this is a thin element of that
    /// kind.
    pub fn thin_physics<T: ThinMap>(&self) -> Option<&T> {
        match &self.body {
            ElementBody::Thin(p) => p.downcast_ref::<T>(),
            ElementBody::Thick { .. } => None,
        }
    }

    /// Thick physics downcast to `T`, if this is a thick element of that
    /// kind.
    pub fn thick_physics<T: ThickMap>(&self) -> Option<&T> {
        match &self.body {
            ElementBody::Thin(_) => None,
            ElementBody::Thick { physics, .. } => physics.downcast_ref::<T>(),
        }
    }

    /// Physics model name.
    pub fn kind(&self) -> &'static str {
        match &self.body {
            ElementBody::Thin(p) => p.kind(),
            ElementBody::Thick { physics, .. } => physics.kind(),
        }
    }

    /// Distance of `s_probe` from the element entrance:
    /// `s_probe - (abs_pos - L/2)`.
    pub fn probe_location(&self, lattice_position: f64, s_probe: f64) -> f64 {
        s_probe - (lattice_position - self.length() / 2.0)
    }

    fn check_subsection(&self, length: f64) -> Result<(), ModelError> {
        let full = self.length();
        if (0.0..=full).contains(&length) {
            Ok(())
        } else {
            Err(ModelError::InvalidSubsection {
                element: self.id().to_owned(),
                length,
                element_length: full,
            })
        }
    }

    /// Misaligned map over a sub-length `length` (ignored for thin
    /// elements).
    pub fn transfer_map(&self, probe: &dyn Probe, length: f64) -> Result<PhaseMatrix, ModelError> {
        self.transfer_over(probe, length).map(|t| t.map)
    }

    /// Energy gain over `length` (eV).
    pub fn energy_gain(&self, probe: &dyn Probe, length: f64) -> Result<f64, ModelError> {
        match &self.body {
            ElementBody::Thin(p) => p.energy_gain(&self.attrs, probe),
            ElementBody::Thick { physics, .. } => {
                self.check_subsection(length)?;
                physics.energy_gain(&self.attrs, probe, length)
            }
        }
    }

    /// Time elapsed over `length` (s).
    pub fn elapsed_time(&self, probe: &dyn Probe, length: f64) -> Result<f64, ModelError> {
        match &self.body {
            ElementBody::Thin(p) => p.elapsed_time(&self.attrs, probe),
            ElementBody::Thick { physics, .. } => {
                self.check_subsection(length)?;
                physics.elapsed_time(&self.attrs, probe, length)
            }
        }
    }

    /// Longitudinal phase advance over `length` (rad).
    pub fn phase_advance(&self, probe: &dyn Probe, length: f64) -> Result<f64, ModelError> {
        match &self.body {
            ElementBody::Thin(p) => p.phase_advance(&self.attrs, probe),
            ElementBody::Thick { physics, .. } => {
                self.check_subsection(length)?;
                physics.phase_advance(&self.attrs, probe, length)
            }
        }
    }

    /// The full step record over `length`, misalignment applied.
    pub fn transfer_over(&self, probe: &dyn Probe, length: f64) -> Result<Transfer, ModelError> {
        let mut t = match &self.body {
            ElementBody::Thin(p) => p.transfer(&self.attrs, probe)?,
            ElementBody::Thick { physics, .. } => {
                self.check_subsection(length)?;
                Transfer {
                    map: physics.transfer_map(&self.attrs, probe, length)?,
                    length,
                    energy_gain: physics.energy_gain(&self.attrs, probe, length)?,
                    elapsed_time: physics.elapsed_time(&self.attrs, probe, length)?,
                    phase_advance: physics.phase_advance(&self.attrs, probe, length)?,
                }
            }
        };
        t.map = apply_sliced_align_error(t.map, self.alignment(), self.slice());
        Ok(t)
    }

    /// Step across the whole element, entrance to exit.
    pub fn propagate(&self, probe: &dyn Probe) -> Result<Transfer, ModelError> {
        self.transfer_over(probe, self.length())
    }

    /// Step from `pos` (m from the entrance) to the exit. Thin elements
    /// ignore `pos`.
    pub fn propagate_from(&self, probe: &dyn Probe, pos: f64) -> Result<Transfer, ModelError> {
        if self.is_thin() {
            return self.propagate(probe);
        }
        self.check_subsection(pos)?;
        self.transfer_over(probe, self.length() - pos)
    }

    /// Step across the whole element, exit to entrance.
    ///
    /// The map is the inverse of the forward map at the probe's current
    /// state; every scalar is negated.
    pub fn back_propagate(&self, probe: &dyn Probe) -> Result<Transfer, ModelError> {
        self.reverse(self.propagate(probe)?)
    }

    /// Step from `pos` (m from the entrance) back to the entrance. Thin
    /// elements ignore `pos`.
    pub fn back_propagate_from(&self, probe: &dyn Probe, pos: f64) -> Result<Transfer, ModelError> {
        if self.is_thin() {
            return self.back_propagate(probe);
        }
        self.reverse(self.transfer_over(probe, pos)?)
    }

    fn reverse(&self, forward: Transfer) -> Result<Transfer, ModelError> {
        forward.reversed().ok_or_else(|| ModelError::SingularMap {
            element: self.id().to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use beamline_core::constants::LIGHT_SPEED;
    use beamline_core::PhaseVector;

    struct Proton {
        w: f64,
    }

    impl Probe for Proton {
        fn species_charge(&self) -> f64 {
            1.0
        }
        fn species_rest_energy(&self) -> f64 {
            938.272_088e6
        }
        fn kinetic_energy(&self) -> f64 {
            self.w
        }
        fn longitudinal_phase(&self) -> f64 {
            0.0
        }
        fn position(&self) -> f64 {
            0.0
        }
    }

    #[derive(Debug)]
    struct Drift;

    impl ThickMap for Drift {
        fn kind(&self) -> &'static str {
            "drift"
        }
        fn transfer_map(
            &self,
            _attrs: &ElementAttrs,
            _probe: &dyn Probe,
            length: f64,
        ) -> Result<PhaseMatrix, ModelError> {
            let mut m = PhaseMatrix::identity();
            m.set(0, 1, length);
            m.set(2, 3, length);
            m.set(4, 5, length);
            Ok(m)
        }
    }

    #[derive(Debug)]
    struct Kick(f64);

    impl ThinMap for Kick {
        fn kind(&self) -> &'static str {
            "kick"
        }
        fn transfer_map(
            &self,
            _attrs: &ElementAttrs,
            _probe: &dyn Probe,
        ) -> Result<PhaseMatrix, ModelError> {
            let mut m = PhaseMatrix::identity();
            m.set(1, 6, self.0);
            Ok(m)
        }
    }

    #[derive(Debug)]
    struct Collapse;

    impl ThinMap for Collapse {
        fn kind(&self) -> &'static str {
            "collapse"
        }
        fn transfer_map(
            &self,
            _attrs: &ElementAttrs,
            _probe: &dyn Probe,
        ) -> Result<PhaseMatrix, ModelError> {
            let mut m = PhaseMatrix::identity();
            m.set(0, 0, 0.0);
            Ok(m)
        }
    }

    fn drift(len: f64) -> Element {
        Element::thick(ElementAttrs::new("Drift", "D"), len, Drift)
    }

    #[test]
    fn thin_elements_have_zero_length() {
        let e = Element::thin(ElementAttrs::new("Kick", "K"), Kick(1e-3));
        assert!(e.is_thin());
        assert_eq!(e.length(), 0.0);
        assert_eq!(e.slice(), SlicePosition::WHOLE);
        assert!(e.thin_physics::<Kick>().is_some());
        assert!(e.thick_physics::<Drift>().is_none());
    }

    #[test]
    fn drift_time_is_length_over_velocity() {
        let p = Proton { w: 2.5e6 };
        let t = drift(1.0).propagate(&p).unwrap();
        assert_eq!(t.length, 1.0);
        assert_relative_eq!(t.elapsed_time, 1.0 / (p.beta() * LIGHT_SPEED));
    }

    #[test]
    fn subsection_outside_element_is_rejected() {
        let p = Proton { w: 2.5e6 };
        let e = drift(1.0);
        assert!(matches!(
            e.transfer_map(&p, 1.5),
            Err(ModelError::InvalidSubsection { .. })
        ));
        assert!(e.transfer_map(&p, -0.1).is_err());
        assert!(e.transfer_map(&p, f64::NAN).is_err());
        assert!(e.transfer_map(&p, 0.4).is_ok());
    }

    #[test]
    fn negative_length_is_kept_and_unusable() {
        let p = Proton { w: 2.5e6 };
        let e = drift(-0.5);
        assert_eq!(e.length(), -0.5);
        assert!(matches!(
            e.propagate(&p),
            Err(ModelError::InvalidSubsection { .. })
        ));
    }

    #[test]
    fn partial_propagation_covers_remaining_length() {
        let p = Proton { w: 2.5e6 };
        let e = drift(2.0);
        assert_eq!(e.propagate_from(&p, 0.5).unwrap().length, 1.5);
        assert_eq!(e.back_propagate_from(&p, 0.5).unwrap().length, -0.5);
    }

    #[test]
    fn back_propagate_inverts_forward() {
        let p = Proton { w: 2.5e6 };
        let e = drift(1.0);
        let x0 = PhaseVector::new(1e-3, 2e-3, -1e-3, 0.5e-3, 0.0, 0.0);
        let fwd = e.propagate(&p).unwrap();
        let back = e.back_propagate(&p).unwrap();
        let x1 = back.map.apply(&fwd.map.apply(&x0));
        assert!(x1.transverse_distance(&x0) < 1e-12);
        assert_eq!(back.length, -1.0);
        assert_relative_eq!(back.elapsed_time, -fwd.elapsed_time);
    }

    #[test]
    fn singular_map_cannot_be_reversed() {
        let p = Proton { w: 2.5e6 };
        let e = Element::thin(ElementAttrs::new("Collapse", "C1"), Collapse);
        assert!(e.propagate(&p).is_ok());
        assert_eq!(
            e.back_propagate(&p),
            Err(ModelError::SingularMap {
                element: "C1".into()
            })
        );
    }

    #[test]
    fn misalignment_is_applied_to_the_step() {
        use crate::align::Alignment;
        let p = Proton { w: 2.5e6 };
        let attrs = ElementAttrs::new("Kick", "K").with_alignment(Alignment::new(1e-3, 0.0, 0.0));
        let e = Element::thin(attrs, Kick(1e-3));
        // A pure kick commutes with translations.
        let t = e.propagate(&p).unwrap();
        assert_relative_eq!(t.map.get(1, 6), 1e-3);
        assert_relative_eq!(t.map.get(0, 6), 0.0);
    }

    #[test]
    fn probe_location_measures_from_entrance() {
        let e = drift(2.0);
        assert_relative_eq!(e.probe_location(5.0, 4.5), 0.5);
    }
}
