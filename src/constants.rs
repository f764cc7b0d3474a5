//! # Constants and type definitions for Skyward
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! definitions** used throughout the `skyward` library.
//!
//! ## Overview
//!
//! - Calendar and epoch constants (J2000, JD ↔ MJD offset, Julian century)
//! - Unit conversions (degrees ↔ radians, arcseconds/milliarcseconds ↔ radians)
//! - Astronomical constants (AU, speed of light, mean obliquity)
//! - Numerical settings of the Kepler solver
//! - Core type aliases used across the crate

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number of days in a Julian century
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

/// Julian date of J2000.0 (2000-01-01 12:00:00 TT)
pub const J2000_JD: f64 = 2_451_545.0;

/// MJD epoch of J2000.0 (2000-01-01 12:00:00 TT)
pub const T2000: f64 = 51544.5;

/// Conversion factor between Julian Date and Modified Julian Date
pub const JDTOMJD: f64 = 2400000.5;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Radians → degrees
pub const DEGRAD: f64 = 180.0 / std::f64::consts::PI;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// Milliarcseconds → radians
pub const RADMAS: f64 = RADSEC / 1000.0;

/// Speed of light in km/s
pub const VLIGHT: f64 = 2.99792458e5;

/// Speed of light in astronomical units per day
pub const VLIGHT_AU: f64 = VLIGHT / AU * SECONDS_PER_DAY;

/// Mean obliquity of the ecliptic at J2000 used by the approximate planetary theory (degrees)
pub const OBLIQUITY_J2000_DEG: f64 = 23.43928;

/// Default convergence threshold on the eccentric anomaly increment (degrees)
pub const KEPLER_TOLERANCE_DEG: f64 = 1e-6;

/// Hard cap on Newton iterations when solving Kepler's equation
pub const KEPLER_MAX_ITERATIONS: usize = 50;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in astronomical units
pub type AstronomicalUnit = f64;
/// Julian Date (days)
pub type JD = f64;
/// Modified Julian Date (days)
pub type MJD = f64;
/// Time in seconds
pub type Seconds = f64;

#[cfg(test)]
mod constants_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_epoch_constants_agree() {
        assert_eq!(J2000_JD - JDTOMJD, T2000);
    }

    #[test]
    fn test_light_speed_au_per_day() {
        assert_relative_eq!(VLIGHT_AU, 173.144_632_674_240_3, epsilon = 1e-9);
    }

    #[test]
    fn test_angle_conversions() {
        assert_relative_eq!(180.0 * RADEG, std::f64::consts::PI);
        assert_relative_eq!(3600.0 * RADSEC, RADEG, epsilon = 1e-18);
        assert_relative_eq!(1000.0 * RADMAS, RADSEC, epsilon = 1e-20);
        assert_relative_eq!(RADEG * DEGRAD, 1.0);
    }
}
