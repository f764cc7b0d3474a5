use std::fmt;

use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::constants::{AstronomicalUnit, Radian, DPI, OBLIQUITY_J2000_DEG, RADEG};

/// Frame in which a sky position is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinateFrame {
    /// Celestial intermediate reference system
    Cirs,
    /// International celestial reference system
    Icrs,
    Galactic,
    /// Topocentric observed place
    Observed,
}

impl fmt::Display for CoordinateFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoordinateFrame::Cirs => "CIRS",
            CoordinateFrame::Icrs => "ICRS",
            CoordinateFrame::Galactic => "GALACTIC",
            CoordinateFrame::Observed => "OBSERVED",
        };
        write!(f, "{name}")
    }
}

/// Principal axis of an elementary rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationAxis {
    X,
    Y,
    Z,
}

/// Right ascension, declination and distance of a body in a given frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyPosition {
    /// Right ascension in radians, in `[0, 2π)`
    pub ra: Radian,
    /// Declination in radians, in `[−π/2, π/2]`
    pub dec: Radian,
    pub distance: AstronomicalUnit,
    pub frame: CoordinateFrame,
}

impl SkyPosition {
    pub fn ra_deg(&self) -> f64 {
        self.ra.to_degrees()
    }

    pub fn dec_deg(&self) -> f64 {
        self.dec.to_degrees()
    }
}

/// Construct a right-handed 3×3 rotation matrix around one of the principal axes.
///
/// The matrix is an **active rotation** of a vector by `alpha` in the direct
/// (counter-clockwise) sense, so that the rotated vector is `x' = R · x`.
///
/// Arguments
/// ---------
/// * `alpha`: rotation angle in radians
/// * `axis`: axis of rotation
///
/// Return
/// ------
/// * an orthonormal matrix, `R.transpose() == R.inverse()`
///
/// # See also
/// * [`ecliptic_to_equatorial`]
/// * [`orbital_to_ecliptic`]
pub fn rotmt(alpha: Radian, axis: RotationAxis) -> Matrix3<f64> {
    let axis = match axis {
        RotationAxis::X => Vector3::x_axis(),
        RotationAxis::Y => Vector3::y_axis(),
        RotationAxis::Z => Vector3::z_axis(),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// Rotation from the J2000 ecliptic to the J2000 equator, using the fixed
/// mean obliquity of the approximate planetary theory.
pub fn ecliptic_to_equatorial() -> Matrix3<f64> {
    rotmt(OBLIQUITY_J2000_DEG * RADEG, RotationAxis::X)
}

/// Rotation from the orbital plane (x axis toward perihelion) to the J2000 ecliptic.
///
/// Arguments
/// ---------
/// * `periapsis_argument`: ω, in radians
/// * `inclination`: I, in radians
/// * `ascending_node`: Ω, in radians
///
/// Return
/// ------
/// * `Rz(Ω) · Rx(I) · Rz(ω)`
pub fn orbital_to_ecliptic(
    periapsis_argument: Radian,
    inclination: Radian,
    ascending_node: Radian,
) -> Matrix3<f64> {
    rotmt(ascending_node, RotationAxis::Z)
        * rotmt(inclination, RotationAxis::X)
        * rotmt(periapsis_argument, RotationAxis::Z)
}

/// Reduce an angle into `[0, 2π)`.
pub fn principal_angle(angle: Radian) -> Radian {
    let reduced = angle.rem_euclid(DPI);
    if reduced >= DPI {
        0.0
    } else {
        reduced
    }
}

/// Convert a Cartesian vector to spherical angles.
///
/// Arguments
/// ---------
/// * `cartesian_position`: vector in any length unit
///
/// Return
/// ------
/// * `(α, δ, ρ)` with `α` in `[0, 2π)`, `δ` in `[−π/2, π/2]` and `ρ` the norm
///
/// A null vector maps to `(0, 0, 0)`.
pub fn cartesian_to_spherical(cartesian_position: &Vector3<f64>) -> (Radian, Radian, f64) {
    let pos_norm = cartesian_position.norm();
    if pos_norm == 0.0 {
        return (0.0, 0.0, 0.0);
    }

    let rxy = cartesian_position.x.hypot(cartesian_position.y);
    let delta = cartesian_position.z.atan2(rxy);
    let alpha = if rxy == 0.0 {
        0.0
    } else {
        principal_angle(cartesian_position.y.atan2(cartesian_position.x))
    };

    (alpha, delta, pos_norm)
}
