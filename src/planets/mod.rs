//! # Planetary positions
//!
//! A [`Body`] couples a set of mean orbital elements with an optional high-precision
//! [`PlanetaryTheory`](planetary_theory::PlanetaryTheory) and an optional reference body,
//! and answers three questions at a UTC instant:
//!
//! * [`Body::state_at`]: where the body is, in the heliocentric (analytic) or barycentric
//!   (high-precision) equatorial J2000 frame,
//! * [`Body::earth_relative_at`]: the same vector seen from the reference body,
//! * [`Body::apparent_direction`]: the light-time corrected direction as RA/Dec.
//!
//! Every query converts the UTC instant to TDB through a [`TimeScales`] value, so the
//! EOP tables must cover the requested date.
//!
//! ## Example
//!
//! ```rust,no_run
//! use skyward::eop::{EopCache, EopConfig};
//! use skyward::planets::{catalog::PlanetId, Body};
//! use skyward::time::{time_scales::TimeScales, TimeInstant};
//!
//! let eop = EopCache::new(EopConfig::default());
//! let scales = TimeScales::new(&eop);
//! let t = TimeInstant::from_gregorian(2024, 3, 20, 0.5)?;
//!
//! let mut mars = Body::from_planet(PlanetId::Mars);
//! let sky = mars.apparent_direction(&t, &scales)?;
//! println!("Mars: RA {:.4}°, Dec {:.4}°", sky.ra_deg(), sky.dec_deg());
//! # Ok::<(), skyward::skyward_errors::SkywardError>(())
//! ```

pub mod analytic;
pub mod catalog;
pub mod kepler;
pub mod orbital_elements;
pub mod planetary_theory;

use std::sync::Arc;

use nalgebra::Vector3;

use self::catalog::{PhysicalProperties, PlanetId};
use self::orbital_elements::OrbitalElementSet;
use self::planetary_theory::{Algorithm, AlgorithmSelection, PlanetaryTheory};
use crate::constants::{Degree, JD, KEPLER_TOLERANCE_DEG, VLIGHT_AU};
use crate::ref_system::{cartesian_to_spherical, CoordinateFrame, SkyPosition};
use crate::skyward_errors::SkywardError;
use crate::time::time_scales::{JulianPair, TimeScales};
use crate::time::TimeInstant;

/// Position in AU and velocity in AU/day.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateVector {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl StateVector {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        StateVector { position, velocity }
    }

    /// `self − origin`, component by component.
    pub fn relative_to(&self, origin: &StateVector) -> StateVector {
        StateVector {
            position: self.position - origin.position,
            velocity: self.velocity - origin.velocity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CachedState {
    jd_utc: JD,
    state: StateVector,
}

/// A solar-system body.
#[derive(Debug, Clone)]
pub struct Body {
    name: String,
    planet: Option<PlanetId>,
    elements: OrbitalElementSet,
    physical: PhysicalProperties,
    selection: AlgorithmSelection,
    tolerance: Degree,
    theory: Option<Arc<dyn PlanetaryTheory>>,
    reference: Option<Box<Body>>,
    cache: Option<CachedState>,
}

impl Body {
    /// A body with user-supplied elements, positioned analytically.
    pub fn new(name: impl Into<String>, elements: OrbitalElementSet) -> Self {
        Body {
            name: name.into(),
            planet: None,
            elements,
            physical: PhysicalProperties::default(),
            selection: AlgorithmSelection::default(),
            tolerance: KEPLER_TOLERANCE_DEG,
            theory: None,
            reference: None,
            cache: None,
        }
    }

    /// A catalog planet.
    ///
    /// Every planet except the Earth and the Earth–Moon barycenter gets the
    /// Earth–Moon barycenter as its reference body.
    pub fn from_planet(id: PlanetId) -> Self {
        let mut body = Body::new(id.name(), id.elements());
        body.planet = Some(id);
        body.physical = id.physical_properties();

        if !matches!(id, PlanetId::Earth | PlanetId::EarthMoonBarycenter) {
            body.reference = Some(Box::new(Body::from_planet(PlanetId::EarthMoonBarycenter)));
        }
        body
    }

    pub fn with_physical_properties(mut self, physical: PhysicalProperties) -> Self {
        self.physical = physical;
        self
    }

    pub fn with_reference(mut self, reference: Body) -> Self {
        self.set_reference(Some(reference));
        self
    }

    pub fn with_theory(mut self, theory: Arc<dyn PlanetaryTheory>) -> Self {
        self.set_theory(Some(theory));
        self
    }

    pub fn with_algorithm(mut self, requested: Algorithm) -> Self {
        self.set_algorithm(requested);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn planet(&self) -> Option<PlanetId> {
        self.planet
    }

    pub fn elements(&self) -> &OrbitalElementSet {
        &self.elements
    }

    pub fn physical_properties(&self) -> &PhysicalProperties {
        &self.physical
    }

    pub fn selection(&self) -> &AlgorithmSelection {
        &self.selection
    }

    /// The algorithm actually used for this body.
    pub fn algorithm(&self) -> Algorithm {
        self.selection.effective
    }

    pub fn kepler_tolerance(&self) -> Degree {
        self.tolerance
    }

    pub fn reference(&self) -> Option<&Body> {
        self.reference.as_deref()
    }

    /// Instant (UTC Julian date) and state of the single-slot cache.
    pub fn cached_state(&self) -> Option<(JD, StateVector)> {
        self.cache.map(|c| (c.jd_utc, c.state))
    }

    /// Drop the cached state of this body and of its reference chain.
    pub fn invalidate(&mut self) {
        self.cache = None;
        if let Some(reference) = self.reference.as_deref_mut() {
            reference.invalidate();
        }
    }

    pub fn set_elements(&mut self, elements: OrbitalElementSet) {
        self.elements = elements;
        self.cache = None;
    }

    /// Set the convergence threshold of the Kepler solver, in degrees.
    pub fn set_kepler_tolerance(&mut self, tolerance: Degree) -> Result<(), SkywardError> {
        if !(tolerance > 0.0) {
            return Err(SkywardError::InvalidValue(format!(
                "Kepler tolerance must be positive, got {tolerance}"
            )));
        }
        self.tolerance = tolerance;
        self.cache = None;
        Ok(())
    }

    /// Replace the reference body.
    ///
    /// The new reference inherits this body's theory and effective algorithm.
    pub fn set_reference(&mut self, reference: Option<Body>) {
        self.reference = reference.map(|mut reference| {
            reference.set_theory(self.theory.clone());
            reference.set_algorithm(self.selection.effective);
            Box::new(reference)
        });
        self.cache = None;
    }

    /// Attach or detach a high-precision theory, here and on the reference chain.
    ///
    /// The requested algorithm is resolved again against the new theory.
    pub fn set_theory(&mut self, theory: Option<Arc<dyn PlanetaryTheory>>) {
        self.theory = theory;
        if let Some(reference) = self.reference.as_deref_mut() {
            reference.set_theory(self.theory.clone());
        }
        self.set_algorithm(self.selection.requested);
    }

    /// Select the algorithm used to position the body.
    ///
    /// A high-precision request that cannot be honoured (no catalog identity, no theory,
    /// or a planet the theory does not cover) resolves to [`Algorithm::Analytic`]; the
    /// returned selection records both and the fallback is logged.
    ///
    /// The effective algorithm is propagated to the reference body, and all caches
    /// along the chain are cleared.
    pub fn set_algorithm(&mut self, requested: Algorithm) -> &AlgorithmSelection {
        self.selection =
            AlgorithmSelection::resolve(requested, self.planet, self.theory.as_deref());
        if let Some(reason) = &self.selection.fallback {
            log::warn!(
                "{}: high-precision positions unavailable ({reason}), using the analytic model",
                self.name
            );
        }

        let effective = self.selection.effective;
        if let Some(reference) = self.reference.as_deref_mut() {
            reference.set_algorithm(effective);
        }
        self.cache = None;
        &self.selection
    }

    /// Position and velocity at a TDB date, without touching the cache.
    ///
    /// Analytic states are heliocentric, high-precision states barycentric; both are
    /// equatorial J2000 in AU and AU/day.
    pub fn state_at_tdb(&self, tdb: JulianPair) -> Result<StateVector, SkywardError> {
        match (self.selection.effective, self.planet, self.theory.as_deref()) {
            (Algorithm::HighPrecision, Some(id), Some(theory)) => theory.barycentric(id, tdb),
            _ => analytic::heliocentric_state(
                &self.elements,
                tdb.centuries_since_j2000(),
                self.tolerance,
            ),
        }
    }

    /// Position and velocity at a UTC instant.
    ///
    /// Arguments
    /// ---------
    /// * `t`: the UTC instant
    /// * `scales`: time-scale conversions used to reach TDB
    ///
    /// Return
    /// ------
    /// * the state, served from the cache when `t` is the cached instant
    /// * [`SkywardError::InvalidValue`] if `t` is outside the EOP tables or the orbit
    ///   cannot be solved
    pub fn state_at(
        &mut self,
        t: &TimeInstant,
        scales: &TimeScales,
    ) -> Result<StateVector, SkywardError> {
        if let Some(cached) = self.cache {
            if cached.jd_utc == t.jd() {
                return Ok(cached.state);
            }
        }

        let state = self.state_at_tdb(scales.utc_to_tdb(t)?)?;
        self.cache = Some(CachedState {
            jd_utc: t.jd(),
            state,
        });
        Ok(state)
    }

    /// State relative to the reference at a TDB date, without touching any cache.
    pub fn earth_relative_at_tdb(&self, tdb: JulianPair) -> Result<StateVector, SkywardError> {
        let state = self.state_at_tdb(tdb)?;
        match self.origin_at_tdb(tdb)? {
            Some(origin) => Ok(state.relative_to(&origin)),
            None => Ok(state),
        }
    }

    /// State relative to the reference body at a UTC instant.
    ///
    /// Analytic bodies subtract their reference body evaluated with the same algorithm;
    /// high-precision bodies subtract the barycentric Earth of the theory. Without a
    /// reference the analytic state is returned unchanged.
    pub fn earth_relative_at(
        &mut self,
        t: &TimeInstant,
        scales: &TimeScales,
    ) -> Result<StateVector, SkywardError> {
        let state = self.state_at(t, scales)?;

        let origin = match (self.selection.effective, self.theory.as_deref()) {
            (Algorithm::HighPrecision, Some(theory)) => {
                Some(theory.earth(scales.utc_to_tdb(t)?)?.barycentric)
            }
            _ => match self.reference.as_deref_mut() {
                Some(reference) => Some(reference.state_at(t, scales)?),
                None => None,
            },
        };

        Ok(match origin {
            Some(origin) => state.relative_to(&origin),
            None => state,
        })
    }

    /// Light-time corrected state relative to the reference.
    ///
    /// The distance at `t` gives the delay `Δt = d / c`; the body and its reference are
    /// then evaluated once more at `t − Δt`. The cache keeps the uncorrected state at `t`.
    pub fn apparent_state(
        &mut self,
        t: &TimeInstant,
        scales: &TimeScales,
    ) -> Result<StateVector, SkywardError> {
        let geometric = self.earth_relative_at(t, scales)?;
        let delay_days = geometric.position.norm() / VLIGHT_AU;

        let tdb = scales.utc_to_tdb(t)?;
        self.earth_relative_at_tdb(tdb.add_days(-delay_days))
    }

    /// Apparent right ascension, declination and distance at a UTC instant.
    ///
    /// Arguments
    /// ---------
    /// * `t`: the UTC instant
    /// * `scales`: time-scale conversions used to reach TDB
    ///
    /// Return
    /// ------
    /// * the light-time corrected [`SkyPosition`], in [`CoordinateFrame::Icrs`]
    ///
    /// # See also
    /// * [`Body::apparent_state`]
    pub fn apparent_direction(
        &mut self,
        t: &TimeInstant,
        scales: &TimeScales,
    ) -> Result<SkyPosition, SkywardError> {
        let apparent = self.apparent_state(t, scales)?;
        let (ra, dec, distance) = cartesian_to_spherical(&apparent.position);
        Ok(SkyPosition {
            ra,
            dec,
            distance,
            frame: CoordinateFrame::Icrs,
        })
    }

    fn origin_at_tdb(&self, tdb: JulianPair) -> Result<Option<StateVector>, SkywardError> {
        match (self.selection.effective, self.theory.as_deref()) {
            (Algorithm::HighPrecision, Some(theory)) => Ok(Some(theory.earth(tdb)?.barycentric)),
            _ => self
                .reference
                .as_deref()
                .map(|reference| reference.state_at_tdb(tdb))
                .transpose(),
        }
    }
}
