//! Keplerian propagation of mean elements.
//!
//! The orbit is solved in its own plane, rotated to the J2000 ecliptic with
//! `Rz(Ω)·Rx(I)·Rz(ω)` and then to the J2000 equator with the fixed obliquity.

use nalgebra::Vector3;

use super::kepler::solve_eccentric_anomaly;
use super::orbital_elements::OrbitalElementSet;
use super::StateVector;
use crate::constants::{Degree, DAYS_PER_JULIAN_CENTURY};
use crate::ref_system::{ecliptic_to_equatorial, orbital_to_ecliptic};
use crate::skyward_errors::SkywardError;

/// Heliocentric equatorial J2000 state from mean elements.
///
/// Arguments
/// ---------
/// * `elements`: the element set of the body
/// * `t_centuries`: Julian centuries of TDB since J2000
/// * `tolerance`: convergence threshold of the Kepler solver, in degrees
///
/// Return
/// ------
/// * position in AU and velocity in AU/day
/// * [`SkywardError::InvalidValue`] if the propagated eccentricity leaves `[0, 1)` or
///   the Kepler solver fails to converge
///
/// The velocity only carries the orbital motion; the slow drift of `a`, `e`, `I`, `ω`
/// and `Ω` is neglected.
pub fn heliocentric_state(
    elements: &OrbitalElementSet,
    t_centuries: f64,
    tolerance: Degree,
) -> Result<StateVector, SkywardError> {
    let at = elements.at(t_centuries);
    let mean_anomaly = elements.mean_anomaly(t_centuries);

    let solution = solve_eccentric_anomaly(mean_anomaly, at.eccentricity, tolerance)?;
    let ecc_anomaly = solution.eccentric_anomaly.to_radians();

    let a = at.semi_major_axis;
    let e = at.eccentricity;
    let (sin_e, cos_e) = ecc_anomaly.sin_cos();
    let b_over_a = (1.0 - e * e).sqrt();

    let orbital_position = Vector3::new(a * (cos_e - e), a * b_over_a * sin_e, 0.0);

    // dE/dt in rad/day
    let mean_motion = elements.mean_motion(t_centuries).to_radians() / DAYS_PER_JULIAN_CENTURY;
    let ecc_rate = mean_motion / (1.0 - e * cos_e);
    let orbital_velocity = Vector3::new(
        -a * sin_e * ecc_rate,
        a * b_over_a * cos_e * ecc_rate,
        0.0,
    );

    let rotation = ecliptic_to_equatorial()
        * orbital_to_ecliptic(
            at.periapsis_argument().to_radians(),
            at.inclination.to_radians(),
            at.ascending_node_longitude.to_radians(),
        );

    Ok(StateVector {
        position: rotation * orbital_position,
        velocity: rotation * orbital_velocity,
    })
}
