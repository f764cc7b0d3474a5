//! Proleptic Gregorian calendar arithmetic.
//!
//! Integer algorithms converting a civil date into a two-part Julian date and back.
//! All divisions are truncating integer divisions, which is what makes the formulas
//! valid for negative intermediate values as well.

use crate::constants::{JDTOMJD, MJD};
use crate::skyward_errors::SkywardError;

/// Earliest year accepted by [`calendar_to_mjd`].
pub const MIN_YEAR: i32 = -4799;

/// Valid Julian date range for [`jd_to_calendar`].
const JD_MIN: f64 = -68569.5;
const JD_MAX: f64 = 1e9;

const MONTH_LENGTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Result of the Gregorian → Julian date conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarConversion {
    /// MJD zero point, always [`JDTOMJD`]
    pub mjd_zero: f64,
    /// MJD of 0h on the requested day
    pub mjd: MJD,
    /// `false` when the day of month is outside the month's range.
    /// The MJD is still numerically defined in that case.
    pub day_in_range: bool,
}

impl CalendarConversion {
    /// Julian date at 0h of the converted day.
    pub fn jd(&self) -> f64 {
        self.mjd_zero + self.mjd
    }
}

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in a month of the proleptic Gregorian calendar.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let base = MONTH_LENGTH[(month.clamp(1, 12) - 1) as usize];
    if month == 2 && is_leap_year(year) {
        base + 1
    } else {
        base
    }
}

/// Gregorian calendar date to Modified Julian Date at 0h.
///
/// Arguments
/// ---------
/// * `year`: calendar year, must be ≥ [`MIN_YEAR`]
/// * `month`: month in `1..=12`
/// * `day`: day of month; values outside the month are not rejected
///
/// Return
/// ------
/// * a [`CalendarConversion`] holding the two-part date and a day range flag
/// * [`SkywardError::InvalidDate`] for a year below the floor or a month outside `1..=12`
pub fn calendar_to_mjd(
    year: i32,
    month: i32,
    day: i32,
) -> Result<CalendarConversion, SkywardError> {
    if year < MIN_YEAR {
        return Err(SkywardError::InvalidDate(format!(
            "year {year} is before the supported floor {MIN_YEAR}"
        )));
    }
    if !(1..=12).contains(&month) {
        return Err(SkywardError::InvalidDate(format!(
            "month {month} is outside 1-12"
        )));
    }

    let day_in_range = day >= 1 && day as u32 <= days_in_month(year, month as u32);

    let (iy, im, id) = (year as i64, month as i64, day as i64);
    let my = (im - 14) / 12;
    let iypmy = iy + my;
    let mjd = (1461 * (iypmy + 4800)) / 4 + (367 * (im - 2 - 12 * my)) / 12
        - (3 * ((iypmy + 4900) / 100)) / 4
        + id
        - 2_432_076;

    Ok(CalendarConversion {
        mjd_zero: JDTOMJD,
        mjd: mjd as f64,
        day_in_range,
    })
}

/// Round to the nearest integer, halves away from zero.
fn dnint(a: f64) -> f64 {
    if a.abs() < 0.5 {
        0.0
    } else if a < 0.0 {
        (a - 0.5).ceil()
    } else {
        (a + 0.5).floor()
    }
}

/// Two-part Julian date to Gregorian `(year, month, day, day_fraction)`.
///
/// The split `jd1 + jd2` can be apportioned in any convenient way; the day
/// fraction is accumulated with compensated summation so that it keeps the
/// resolution of the smaller part.
///
/// Arguments
/// ---------
/// * `jd1`, `jd2`: the two parts of the Julian date
///
/// Return
/// ------
/// * `(year, month, day, fraction)` with `fraction` in `[0, 1)`
/// * [`SkywardError::InvalidDate`] outside the range `-68569.5 ..= 1e9`
pub fn jd_to_calendar(jd1: f64, jd2: f64) -> Result<(i32, u32, u32, f64), SkywardError> {
    let dj = jd1 + jd2;
    if !(JD_MIN..=JD_MAX).contains(&dj) {
        return Err(SkywardError::InvalidDate(format!(
            "julian date {dj} is outside {JD_MIN} - {JD_MAX}"
        )));
    }

    let d1 = dnint(jd1);
    let d2 = dnint(jd2);
    let mut jd = d1 as i64 + d2 as i64;

    // f1 + f2 + 0.5, Kahan-Babuska summation
    let mut s = 0.5;
    let mut cs = 0.0;
    for x in [jd1 - d1, jd2 - d2] {
        let t = s + x;
        cs += if f64::abs(s) >= x.abs() {
            (s - t) + x
        } else {
            (x - t) + s
        };
        s = t;
        if s >= 1.0 {
            jd += 1;
            s -= 1.0;
        }
    }
    let mut f = s + cs;
    cs = f - s;

    if f < 0.0 {
        f = s + 1.0;
        cs += (1.0 - f) + s;
        s = f;
        f = s + cs;
        cs = f - s;
        jd -= 1;
    }

    if (f - 1.0) >= -f64::EPSILON / 4.0 {
        let t = s - 1.0;
        cs += (s - t) - 1.0;
        s = t;
        f = s + cs;
        if -f64::EPSILON / 2.0 < f {
            jd += 1;
            f = f.max(0.0);
        }
    }

    let mut l = jd + 68_569;
    let n = (4 * l) / 146_097;
    l -= (146_097 * n + 3) / 4;
    let i = (4000 * (l + 1)) / 1_461_001;
    l -= (1461 * i) / 4 - 31;
    let k = (80 * l) / 2447;
    let day = l - (2447 * k) / 80;
    l = k / 11;
    let month = k + 2 - 12 * l;
    let year = 100 * (n - 49) + i + l;

    Ok((year as i32, month as u32, day as u32, f))
}
