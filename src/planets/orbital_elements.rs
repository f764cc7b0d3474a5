//! Mean orbital elements with linear secular rates.
//!
//! Each element is `value + rate * T`, with `T` in Julian centuries of TDB since J2000.
//! Angles are in degrees, the semi-major axis in AU.

use crate::constants::{AstronomicalUnit, Degree};
use crate::skyward_errors::SkywardError;

/// One element and its rate per Julian century.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Element {
    pub value: f64,
    pub rate_per_century: f64,
}

impl Element {
    pub const fn new(value: f64, rate_per_century: f64) -> Self {
        Element {
            value,
            rate_per_century,
        }
    }

    /// Value at `t_centuries` from the reference epoch.
    pub fn at(&self, t_centuries: f64) -> f64 {
        self.value + self.rate_per_century * t_centuries
    }
}

/// Additional mean-anomaly terms of the outer planets.
///
/// `b·T² + c·cos(f·T) + s·sin(f·T)`, with `b`, `c`, `s` in degrees and `f` in degrees
/// per century (the trigonometric arguments are converted to radians).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeanAnomalyTerms {
    pub b: f64,
    pub c: f64,
    pub s: f64,
    pub f: f64,
}

impl MeanAnomalyTerms {
    pub const fn new(b: f64, c: f64, s: f64, f: f64) -> Self {
        MeanAnomalyTerms { b, c, s, f }
    }

    /// Correction in degrees at `t_centuries`.
    pub fn correction(&self, t_centuries: f64) -> Degree {
        let arg = (self.f * t_centuries).to_radians();
        self.b * t_centuries * t_centuries + self.c * arg.cos() + self.s * arg.sin()
    }

    /// Time derivative of [`MeanAnomalyTerms::correction`], degrees per century.
    pub fn correction_rate(&self, t_centuries: f64) -> Degree {
        let arg = (self.f * t_centuries).to_radians();
        let df = self.f.to_radians();
        2.0 * self.b * t_centuries - self.c * df * arg.sin() + self.s * df * arg.cos()
    }
}

/// Elements evaluated at one date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementsAtDate {
    pub semi_major_axis: AstronomicalUnit,
    pub eccentricity: f64,
    pub inclination: Degree,
    pub mean_longitude: Degree,
    pub perihelion_longitude: Degree,
    pub ascending_node_longitude: Degree,
}

impl ElementsAtDate {
    /// Argument of perihelion `ω = ϖ − Ω`.
    pub fn periapsis_argument(&self) -> Degree {
        self.perihelion_longitude - self.ascending_node_longitude
    }
}

/// The six classical mean elements of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElementSet {
    pub semi_major_axis: Element,
    pub eccentricity: Element,
    pub inclination: Element,
    pub mean_longitude: Element,
    pub perihelion_longitude: Element,
    pub ascending_node_longitude: Element,
    pub extra_terms: Option<MeanAnomalyTerms>,
}

impl OrbitalElementSet {
    /// Build and validate an element set.
    ///
    /// Arguments
    /// ---------
    /// * `semi_major_axis`: AU and AU/century
    /// * `eccentricity`: unitless and per century
    /// * `inclination`, `mean_longitude`, `perihelion_longitude`, `ascending_node_longitude`:
    ///   degrees and degrees/century
    ///
    /// Return
    /// ------
    /// * the element set
    /// * [`SkywardError::InvalidValue`] when the semi-major axis is not strictly positive or the
    ///   eccentricity is outside `[0, 1)` at the reference epoch
    pub fn new(
        semi_major_axis: Element,
        eccentricity: Element,
        inclination: Element,
        mean_longitude: Element,
        perihelion_longitude: Element,
        ascending_node_longitude: Element,
    ) -> Result<Self, SkywardError> {
        if !(semi_major_axis.value > 0.0) {
            return Err(SkywardError::InvalidValue(format!(
                "semi-major axis must be positive, got {} AU",
                semi_major_axis.value
            )));
        }
        if !(0.0..1.0).contains(&eccentricity.value) {
            return Err(SkywardError::InvalidValue(format!(
                "eccentricity must be in [0, 1), got {}",
                eccentricity.value
            )));
        }

        Ok(OrbitalElementSet {
            semi_major_axis,
            eccentricity,
            inclination,
            mean_longitude,
            perihelion_longitude,
            ascending_node_longitude,
            extra_terms: None,
        })
    }

    pub fn with_extra_terms(mut self, terms: MeanAnomalyTerms) -> Self {
        self.extra_terms = Some(terms);
        self
    }

    /// Evaluate every element at `t_centuries`.
    pub fn at(&self, t_centuries: f64) -> ElementsAtDate {
        ElementsAtDate {
            semi_major_axis: self.semi_major_axis.at(t_centuries),
            eccentricity: self.eccentricity.at(t_centuries),
            inclination: self.inclination.at(t_centuries),
            mean_longitude: self.mean_longitude.at(t_centuries),
            perihelion_longitude: self.perihelion_longitude.at(t_centuries),
            ascending_node_longitude: self.ascending_node_longitude.at(t_centuries),
        }
    }

    /// Mean anomaly `L − ϖ + b·T² + c·cos(fT) + s·sin(fT)` in `(-180°, 180°]`.
    pub fn mean_anomaly(&self, t_centuries: f64) -> Degree {
        let mut m = self.mean_longitude.at(t_centuries) - self.perihelion_longitude.at(t_centuries);
        if let Some(terms) = &self.extra_terms {
            m += terms.correction(t_centuries);
        }
        normalize_degrees(m)
    }

    /// Rate of the mean anomaly in degrees per century.
    pub fn mean_motion(&self, t_centuries: f64) -> Degree {
        let rate =
            self.mean_longitude.rate_per_century - self.perihelion_longitude.rate_per_century;
        match &self.extra_terms {
            Some(terms) => rate + terms.correction_rate(t_centuries),
            None => rate,
        }
    }
}

/// Reduce an angle into `(-180°, 180°]`.
pub fn normalize_degrees(angle: Degree) -> Degree {
    let reduced = 180.0 - (180.0 - angle).rem_euclid(360.0);
    if reduced <= -180.0 {
        reduced + 360.0
    } else {
        reduced
    }
}
