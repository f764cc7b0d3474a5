//! # Skyward
//!
//! Apparent positions of the planets as seen from the Earth, built from three layers:
//!
//! * [`time`]: instants in JD/MJD/Gregorian form and the UTC → UT1 → TT → TDB chain,
//! * [`eop`]: Earth orientation parameters and ΔT, parsed from IERS/USNO tables and
//!   cached on disk,
//! * [`planets`]: Keplerian mean elements, an optional high-precision theory, and the
//!   light-time corrected direction of a body,
//! * [`jpl_ephem`]: the high-precision theory read from a JPL SPK kernel (DE440 family).
//!
//! [`skyward::Skyward`] wires them together.

pub mod constants;
pub mod download_file;
pub mod eop;
pub mod jpl_ephem;
pub mod planets;
pub mod ref_system;
pub mod skyward;
pub mod skyward_errors;
pub mod time;
