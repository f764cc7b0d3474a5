//! # Skyward: shared corrections and planet factory
//!
//! [`Skyward`] is the context object that ties the crate together:
//!
//! 1. **EOP cache**: one [`EopCache`] shared behind an [`Arc`], lazily loaded from the
//!    configured directory on first use.
//! 2. **Time scales**: [`TimeScales`] views over that cache, handed to every body query.
//! 3. **Planetary theory**: an optional high-precision [`PlanetaryTheory`] attached to every
//!    body built through [`Skyward::planet`], such as a JPL kernel loaded with
//!    [`Skyward::with_jpl_ephemeris`].
//!
//! ## Typical usage
//!
//! ```rust, no_run
//! use skyward::eop::EopConfig;
//! use skyward::planets::catalog::PlanetId;
//! use skyward::skyward::Skyward;
//! use skyward::time::TimeInstant;
//!
//! let sky = Skyward::new(EopConfig::default());
//! let t = TimeInstant::from_gregorian(2025, 6, 21, 0.0).unwrap();
//!
//! let mut jupiter = sky.planet(PlanetId::Jupiter);
//! let pos = jupiter.apparent_direction(&t, &sky.time_scales()).unwrap();
//! ```
//!
//! ## See also
//! ------------
//! * [`EopConfig`] – Cache directory, table names and source URLs.
//! * [`Body`] – Position queries.

use std::sync::Arc;

use crate::eop::{EopCache, EopConfig};
use crate::jpl_ephem::{EphemFileSource, JplEphemeris};
use crate::planets::catalog::PlanetId;
use crate::planets::orbital_elements::OrbitalElementSet;
use crate::planets::planetary_theory::{Algorithm, PlanetaryTheory};
use crate::planets::Body;
use crate::skyward_errors::SkywardError;
use crate::time::time_scales::TimeScales;

#[derive(Debug, Clone)]
pub struct Skyward {
    eop: Arc<EopCache>,
    theory: Option<Arc<dyn PlanetaryTheory>>,
}

impl Skyward {
    /// Construct a context over a lazily loaded EOP cache.
    ///
    /// Nothing is read from disk until the first time-scale conversion.
    pub fn new(config: EopConfig) -> Self {
        Skyward {
            eop: Arc::new(EopCache::new(config)),
            theory: None,
        }
    }

    /// Construct a context sharing an existing cache.
    pub fn with_eop(eop: Arc<EopCache>) -> Self {
        Skyward { eop, theory: None }
    }

    /// Attach a high-precision theory to the bodies built from now on.
    pub fn with_theory(mut self, theory: Arc<dyn PlanetaryTheory>) -> Self {
        self.theory = Some(theory);
        self
    }

    /// Attach a JPL kernel as the high-precision theory.
    ///
    /// Return
    /// ------
    /// * the context, with the kernel shared by every body built from now on
    /// * [`SkywardError::EphemerisError`] if the kernel cannot be found, fetched or read
    pub fn with_jpl_ephemeris(self, source: &EphemFileSource) -> Result<Self, SkywardError> {
        let ephemeris = JplEphemeris::load(source)?;
        Ok(self.with_theory(Arc::new(ephemeris)))
    }

    pub fn eop(&self) -> &EopCache {
        &self.eop
    }

    pub fn shared_eop(&self) -> Arc<EopCache> {
        Arc::clone(&self.eop)
    }

    pub fn theory(&self) -> Option<&Arc<dyn PlanetaryTheory>> {
        self.theory.as_ref()
    }

    pub fn time_scales(&self) -> TimeScales<'_> {
        TimeScales::new(&self.eop)
    }

    /// Load the correction tables now rather than on first use.
    pub fn preload(&self) -> Result<(), SkywardError> {
        self.eop.ensure_loaded()
    }

    /// A catalog planet.
    ///
    /// With a theory attached the body requests [`Algorithm::HighPrecision`]; planets the
    /// theory does not cover fall back to the analytic model.
    pub fn planet(&self, id: PlanetId) -> Body {
        let body = Body::from_planet(id);
        match &self.theory {
            Some(theory) => body
                .with_theory(Arc::clone(theory))
                .with_algorithm(Algorithm::HighPrecision),
            None => body,
        }
    }

    /// A body with user-supplied elements, referenced to the Earth–Moon barycenter.
    pub fn body(&self, name: &str, elements: OrbitalElementSet) -> Body {
        Body::new(name, elements)
            .with_reference(Body::from_planet(PlanetId::EarthMoonBarycenter))
    }
}
