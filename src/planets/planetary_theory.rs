use std::fmt;

use super::catalog::PlanetId;
use super::StateVector;
use crate::skyward_errors::SkywardError;
use crate::time::time_scales::JulianPair;

/// Heliocentric and barycentric states of the Earth at one date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarthStates {
    pub heliocentric: StateVector,
    pub barycentric: StateVector,
}

/// A high-precision planetary theory.
///
/// Implementations return equatorial J2000 states in AU and AU/day for a TDB date
/// given as a two-part Julian date.
pub trait PlanetaryTheory: Send + Sync + fmt::Debug {
    /// Whether `planet` is covered. Defaults to the catalog coverage.
    fn supports(&self, planet: PlanetId) -> bool {
        planet.has_high_precision()
    }

    /// Heliocentric state of a supported planet.
    fn heliocentric(&self, planet: PlanetId, tdb: JulianPair) -> Result<StateVector, SkywardError>;

    /// Heliocentric and barycentric states of the Earth.
    fn earth(&self, tdb: JulianPair) -> Result<EarthStates, SkywardError>;

    /// Barycentric state of a supported planet.
    ///
    /// The heliocentric state is shifted by the Sun's barycentric offset,
    /// obtained from the two Earth states.
    fn barycentric(&self, planet: PlanetId, tdb: JulianPair) -> Result<StateVector, SkywardError> {
        let earth = self.earth(tdb)?;
        if planet == PlanetId::Earth {
            return Ok(earth.barycentric);
        }
        let helio = self.heliocentric(planet, tdb)?;
        Ok(StateVector {
            position: helio.position + (earth.barycentric.position - earth.heliocentric.position),
            velocity: helio.velocity + (earth.barycentric.velocity - earth.heliocentric.velocity),
        })
    }
}

/// Algorithm used to position a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// Mean Keplerian elements
    #[default]
    Analytic,
    /// A [`PlanetaryTheory`]
    HighPrecision,
}

/// Why a high-precision request was served analytically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    NotInCatalog,
    NoTheory,
    Unsupported(PlanetId),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NotInCatalog => write!(f, "body is not a catalog planet"),
            FallbackReason::NoTheory => write!(f, "no planetary theory is attached"),
            FallbackReason::Unsupported(id) => write!(f, "{id} is not covered by the theory"),
        }
    }
}

/// The algorithm a caller asked for and the one actually used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmSelection {
    pub requested: Algorithm,
    pub effective: Algorithm,
    pub fallback: Option<FallbackReason>,
}

impl Default for AlgorithmSelection {
    fn default() -> Self {
        AlgorithmSelection {
            requested: Algorithm::Analytic,
            effective: Algorithm::Analytic,
            fallback: None,
        }
    }
}

impl AlgorithmSelection {
    /// Resolve `requested` for a body.
    ///
    /// Arguments
    /// ---------
    /// * `requested`: the algorithm asked for
    /// * `planet`: the catalog identity of the body, if any
    /// * `theory`: the attached high-precision theory, if any
    ///
    /// Return
    /// ------
    /// * the selection, with [`AlgorithmSelection::fallback`] set when a high-precision
    ///   request has to be served by [`Algorithm::Analytic`]
    pub fn resolve(
        requested: Algorithm,
        planet: Option<PlanetId>,
        theory: Option<&dyn PlanetaryTheory>,
    ) -> Self {
        let fallback = match (requested, planet, theory) {
            (Algorithm::Analytic, _, _) => None,
            (Algorithm::HighPrecision, None, _) => Some(FallbackReason::NotInCatalog),
            (Algorithm::HighPrecision, Some(_), None) => Some(FallbackReason::NoTheory),
            (Algorithm::HighPrecision, Some(id), Some(theory)) if !theory.supports(id) => {
                Some(FallbackReason::Unsupported(id))
            }
            (Algorithm::HighPrecision, Some(_), Some(_)) => None,
        };

        AlgorithmSelection {
            requested,
            effective: if fallback.is_some() {
                Algorithm::Analytic
            } else {
                requested
            },
            fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

#[cfg(test)]
mod planetary_theory_test {
    use super::*;
    use nalgebra::Vector3;

    #[derive(Debug)]
    struct Offset;

    impl PlanetaryTheory for Offset {
        fn heliocentric(&self, _: PlanetId, _: JulianPair) -> Result<StateVector, SkywardError> {
            Ok(StateVector::new(Vector3::new(1.0, 0.0, 0.0), Vector3::zeros()))
        }

        fn earth(&self, _: JulianPair) -> Result<EarthStates, SkywardError> {
            Ok(EarthStates {
                heliocentric: StateVector::new(Vector3::new(0.0, 1.0, 0.0), Vector3::zeros()),
                barycentric: StateVector::new(Vector3::new(0.0, 1.0, 0.01), Vector3::zeros()),
            })
        }
    }

    #[test]
    fn test_resolution() {
        let theory = Offset;
        let hp = Algorithm::HighPrecision;

        let selection = AlgorithmSelection::resolve(hp, Some(PlanetId::Mars), Some(&theory));
        assert_eq!(selection.effective, hp);
        assert!(!selection.is_fallback());

        let selection = AlgorithmSelection::resolve(hp, Some(PlanetId::Pluto), Some(&theory));
        assert_eq!(selection.requested, hp);
        assert_eq!(selection.effective, Algorithm::Analytic);
        assert_eq!(selection.fallback, Some(FallbackReason::Unsupported(PlanetId::Pluto)));

        let selection = AlgorithmSelection::resolve(hp, Some(PlanetId::Mars), None);
        assert_eq!(selection.fallback, Some(FallbackReason::NoTheory));

        let selection = AlgorithmSelection::resolve(hp, None, Some(&theory));
        assert_eq!(selection.fallback, Some(FallbackReason::NotInCatalog));

        let selection = AlgorithmSelection::resolve(Algorithm::Analytic, None, None);
        assert_eq!(selection, AlgorithmSelection::default());
    }

    #[test]
    fn test_barycentric_shift() {
        let theory = Offset;
        let tdb = JulianPair::new(2451545.0, 0.0);
        let mars = theory.barycentric(PlanetId::Mars, tdb).unwrap();
        assert_eq!(mars.position, Vector3::new(1.0, 0.0, 0.01));
        let earth = theory.barycentric(PlanetId::Earth, tdb).unwrap();
        assert_eq!(earth.position, Vector3::new(0.0, 1.0, 0.01));
    }

    #[test]
    fn test_fallback_reason_display() {
        assert_eq!(
            FallbackReason::Unsupported(PlanetId::Pluto).to_string(),
            "Pluto is not covered by the theory"
        );
    }
}
