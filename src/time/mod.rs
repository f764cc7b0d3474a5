//! # Time-scale kernel
//!
//! Representation of an instant and conversions between the calendar and
//! time-scale systems used by the rest of the crate.
//!
//! ## Overview
//!
//! - [`TimeInstant`]: an instant holding the Julian Date, the Modified Julian Date and the
//!   Gregorian calendar date, always recomputed together from a single canonical JD.
//! - [`GregorianDate`]: `(year, month, day, day_fraction)`, also available in the packed
//!   decimal form `YYYYMMDD.ffff`.
//! - [`running_date::RunningInstant`]: a live instant driven by the wall clock, with an
//!   adjustable speed factor.
//! - [`time_scales::TimeScales`]: the staged chain UTC → UT1 → TT → TDB, backed by an
//!   [`EopCache`](crate::eop::EopCache).
//! - [`clock::WallClock`]: the wall clock seam used by [`TimeInstant::current`].
//!
//! ## Invariants
//!
//! - `jd() - mjd() == 2400000.5` for every instant built by this module.
//! - A Gregorian day outside the month's range (e.g. 32 January) is accepted: the Julian
//!   date is computed numerically and the stored calendar date is the normalized one.
//! - A month outside `1..=12` or a year before −4799 is rejected with
//!   [`SkywardError::InvalidDate`].
//!
//! ## Example
//!
//! ```rust
//! use skyward::time::TimeInstant;
//!
//! let j2000 = TimeInstant::from_gregorian(2000, 1, 1, 0.5).unwrap();
//! assert_eq!(j2000.jd(), 2451545.0);
//! assert_eq!(j2000.mjd(), 51544.5);
//! ```

pub mod calendar;
pub mod clock;
pub mod running_date;
pub mod time_scales;

use std::fmt;

use crate::constants::{JDTOMJD, JD, MJD, SECONDS_PER_DAY};
use crate::skyward_errors::SkywardError;
use calendar::{calendar_to_mjd, jd_to_calendar};
use clock::WallClock;

/// Which representation a raw date value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    Jd,
    Mjd,
    /// Packed Gregorian `YYYYMMDD.ffff`
    Gregorian,
}

/// A proleptic Gregorian calendar date with a fractional day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GregorianDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Fraction of the day elapsed since 0h, in `[0, 1)`
    pub day_fraction: f64,
}

impl GregorianDate {
    pub fn new(year: i32, month: u32, day: u32, day_fraction: f64) -> Self {
        GregorianDate {
            year,
            month,
            day,
            day_fraction,
        }
    }

    /// Pack the date as `YYYYMMDD.ffff`. Only meaningful for positive years.
    pub fn to_packed(&self) -> f64 {
        self.year as f64 * 10_000.0
            + self.month as f64 * 100.0
            + self.day as f64
            + self.day_fraction
    }

    /// Unpack a `YYYYMMDD.ffff` value.
    ///
    /// The day is the integer part modulo 100, the month the remaining hundreds
    /// modulo 100 and the year what is left once both are removed.
    pub fn from_packed(packed: f64) -> Self {
        let whole = packed.floor();
        let day_fraction = packed - whole;
        let day = whole.rem_euclid(100.0);
        let month = ((whole - day) / 100.0).rem_euclid(100.0);
        let year = (whole - day - month * 100.0) / 10_000.0;

        GregorianDate {
            year: year as i32,
            month: month as u32,
            day: day as u32,
            day_fraction,
        }
    }
}

impl fmt::Display for GregorianDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} +{:.6}d",
            self.year, self.month, self.day, self.day_fraction
        )
    }
}

/// An instant in time, in the UTC scale unless stated otherwise.
///
/// The Julian Date is the canonical value; the Modified Julian Date and the
/// Gregorian date are derived from it on every construction or [`TimeInstant::set`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeInstant {
    jd: JD,
    mjd: MJD,
    gregorian: GregorianDate,
}

impl TimeInstant {
    /// Build an instant from a Julian Date.
    ///
    /// Return
    /// ------
    /// * the instant, or [`SkywardError::InvalidDate`] if the date falls outside the
    ///   calendar range supported by [`calendar::jd_to_calendar`]
    pub fn from_jd(jd: JD) -> Result<Self, SkywardError> {
        let gregorian = Self::gregorian_of(jd)?;
        Ok(TimeInstant {
            jd,
            mjd: jd - JDTOMJD,
            gregorian,
        })
    }

    /// Build an instant from a Modified Julian Date.
    pub fn from_mjd(mjd: MJD) -> Result<Self, SkywardError> {
        Self::from_jd(mjd + JDTOMJD)
    }

    /// Build an instant from a Gregorian calendar date.
    ///
    /// Arguments
    /// ---------
    /// * `year`: ≥ −4799
    /// * `month`: `1..=12`
    /// * `day`: day of month, not range checked
    /// * `day_fraction`: fraction of the day since 0h
    ///
    /// Return
    /// ------
    /// * the instant, with the calendar date normalized from the resulting JD
    /// * [`SkywardError::InvalidDate`] if the month or year is malformed
    ///
    /// See also
    /// ------------
    /// * [`calendar::calendar_to_mjd`] – Underlying integer algorithm.
    pub fn from_gregorian(
        year: i32,
        month: i32,
        day: i32,
        day_fraction: f64,
    ) -> Result<Self, SkywardError> {
        let conv = calendar_to_mjd(year, month, day)?;
        if !conv.day_in_range {
            log::warn!("day {day} is outside month {month} of {year}, the date is normalized");
        }
        Self::from_mjd(conv.mjd + day_fraction)
    }

    /// Build an instant from a packed `YYYYMMDD.ffff` Gregorian value.
    pub fn from_packed_gregorian(packed: f64) -> Result<Self, SkywardError> {
        let date = GregorianDate::from_packed(packed);
        Self::from_gregorian(
            date.year,
            date.month as i32,
            date.day as i32,
            date.day_fraction,
        )
    }

    /// Build an instant from a [`GregorianDate`].
    pub fn from_gregorian_date(date: &GregorianDate) -> Result<Self, SkywardError> {
        Self::from_gregorian(
            date.year,
            date.month as i32,
            date.day as i32,
            date.day_fraction,
        )
    }

    /// Read the wall clock and convert it through [`TimeInstant::from_gregorian`].
    pub fn current(clock: &dyn WallClock) -> Result<Self, SkywardError> {
        let now = clock.now_utc()?;
        Self::from_gregorian_date(&now)
    }

    /// Replace the instant with a new value, recomputing every representation at once.
    ///
    /// On error the instant is left untouched.
    pub fn set(&mut self, value: f64, format: DateFormat) -> Result<(), SkywardError> {
        *self = match format {
            DateFormat::Jd => Self::from_jd(value)?,
            DateFormat::Mjd => Self::from_mjd(value)?,
            DateFormat::Gregorian => Self::from_packed_gregorian(value)?,
        };
        Ok(())
    }

    fn gregorian_of(jd: JD) -> Result<GregorianDate, SkywardError> {
        let (year, month, day, day_fraction) = jd_to_calendar(jd, 0.0)?;
        Ok(GregorianDate {
            year,
            month,
            day,
            day_fraction,
        })
    }

    pub fn jd(&self) -> JD {
        self.jd
    }

    pub fn mjd(&self) -> MJD {
        self.mjd
    }

    pub fn gregorian(&self) -> GregorianDate {
        self.gregorian
    }

    /// Gregorian date packed as `YYYYMMDD.ffff`.
    pub fn packed_gregorian(&self) -> f64 {
        self.gregorian.to_packed()
    }

    pub fn year(&self) -> i32 {
        self.gregorian.year
    }

    pub fn month(&self) -> u32 {
        self.gregorian.month
    }

    pub fn day(&self) -> u32 {
        self.gregorian.day
    }

    pub fn day_fraction(&self) -> f64 {
        self.gregorian.day_fraction
    }

    /// Seconds elapsed since the local midnight.
    ///
    /// Arguments
    /// ---------
    /// * `utc_offset_hours`: observer offset from UTC, daylight saving included
    pub fn seconds_since_midnight(&self, utc_offset_hours: f64) -> f64 {
        let local = self.mjd + utc_offset_hours / 24.0;
        (local - local.floor()) * SECONDS_PER_DAY
    }

    /// Local time of day packed as `HHMMSS.ss`.
    pub fn time_of_day(&self, utc_offset_hours: f64) -> f64 {
        let secs = self.seconds_since_midnight(utc_offset_hours);
        let hours = (secs / 3600.0).floor();
        let minutes = ((secs - hours * 3600.0) / 60.0).floor();
        let seconds = secs - hours * 3600.0 - minutes * 60.0;
        hours * 10_000.0 + minutes * 100.0 + seconds
    }
}

impl fmt::Display for TimeInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JD {:.6} ({})", self.jd, self.gregorian)
    }
}
