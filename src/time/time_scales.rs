//! # Staged time-scale conversions
//!
//! The chain runs in a fixed order, each stage consuming the output of the previous one:
//!
//! ```text
//! UTC ──(+ dUT1)──▶ UT1 ──(+ TT−UT1)──▶ TT ──(+ TDB−TT)──▶ TDB
//! ```
//!
//! * dUT1 and TT − UT1 come from the tabulated values of an [`EopCache`].
//! * TDB − TT is the small periodic term evaluated by [`hifitime`].
//!
//! Every stage returns a [`JulianPair`]: the large constant part of the date is kept in
//! `day` and each offset is added to `fraction` only, so that sub-millisecond offsets are
//! not swallowed by the magnitude of a full Julian date.

use hifitime::{Epoch, TimeScale};

use super::TimeInstant;
use crate::constants::{
    Radian, Seconds, DAYS_PER_JULIAN_CENTURY, J2000_JD, JD, JDTOMJD, MJD, SECONDS_PER_DAY,
};
use crate::eop::EopCache;
use crate::skyward_errors::SkywardError;

/// A Julian date split in two parts, `day + fraction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JulianPair {
    pub day: f64,
    pub fraction: f64,
}

impl JulianPair {
    pub fn new(day: f64, fraction: f64) -> Self {
        JulianPair { day, fraction }
    }

    /// Pair `(2400000.5, mjd)`.
    pub fn from_mjd(mjd: MJD) -> Self {
        JulianPair {
            day: JDTOMJD,
            fraction: mjd,
        }
    }

    pub fn jd(&self) -> JD {
        self.day + self.fraction
    }

    pub fn mjd(&self) -> MJD {
        (self.day - JDTOMJD) + self.fraction
    }

    /// Shift the date by `seconds`, touching only the fraction.
    pub fn add_seconds(&self, seconds: Seconds) -> Self {
        self.add_days(seconds / SECONDS_PER_DAY)
    }

    pub fn add_days(&self, days: f64) -> Self {
        JulianPair {
            day: self.day,
            fraction: self.fraction + days,
        }
    }

    /// Julian centuries since J2000.
    pub fn centuries_since_j2000(&self) -> f64 {
        ((self.day - J2000_JD) + self.fraction) / DAYS_PER_JULIAN_CENTURY
    }
}

/// TDB − TT in seconds at a TT date.
///
/// Both durations are counted from J2000 so that their difference is taken on
/// integer nanoseconds, not on two large day counts.
pub fn tdb_minus_tt(mjd_tt: MJD) -> Seconds {
    let epoch = Epoch::from_mjd_in_time_scale(mjd_tt, TimeScale::TT);
    (epoch.to_tdb_duration() - epoch.to_tt_since_j2k()).to_seconds()
}

/// Time-scale conversions backed by a shared [`EopCache`].
#[derive(Debug, Clone, Copy)]
pub struct TimeScales<'a> {
    eop: &'a EopCache,
}

impl<'a> TimeScales<'a> {
    pub fn new(eop: &'a EopCache) -> Self {
        TimeScales { eop }
    }

    pub fn eop(&self) -> &'a EopCache {
        self.eop
    }

    /// UT1 as an MJD: `mjd + dUT1(mjd) / 86400`.
    pub fn utc_to_ut1_mjd(&self, mjd_utc: MJD) -> Result<MJD, SkywardError> {
        Ok(mjd_utc + self.eop.dut1(mjd_utc)? / SECONDS_PER_DAY)
    }

    /// First stage, UTC → UT1.
    pub fn utc_to_ut1(&self, utc: &TimeInstant) -> Result<JulianPair, SkywardError> {
        let dut1 = self.eop.dut1(utc.mjd())?;
        Ok(JulianPair::from_mjd(utc.mjd()).add_seconds(dut1))
    }

    /// Second stage, UT1 → TT, adding the tabulated TT − UT1.
    pub fn ut1_to_tt(&self, ut1: JulianPair) -> Result<JulianPair, SkywardError> {
        let tt_ut1 = self.eop.tt_minus_ut1(ut1.mjd())?;
        Ok(ut1.add_seconds(tt_ut1))
    }

    /// Third stage, TT → TDB.
    pub fn tt_to_tdb(&self, tt: JulianPair) -> JulianPair {
        tt.add_seconds(tdb_minus_tt(tt.mjd()))
    }

    pub fn utc_to_tt(&self, utc: &TimeInstant) -> Result<JulianPair, SkywardError> {
        self.ut1_to_tt(self.utc_to_ut1(utc)?)
    }

    /// Full chain UTC → UT1 → TT → TDB.
    ///
    /// Return
    /// ------
    /// * the TDB date as a [`JulianPair`]
    /// * [`SkywardError::InvalidValue`] if the date is outside the loaded tables
    /// * [`SkywardError::CorrectionsLoadError`] if the tables cannot be loaded
    pub fn utc_to_tdb(&self, utc: &TimeInstant) -> Result<JulianPair, SkywardError> {
        Ok(self.tt_to_tdb(self.utc_to_tt(utc)?))
    }

    /// UT1 − UTC at an instant, in seconds.
    pub fn dut1_at(&self, utc: &TimeInstant) -> Result<Seconds, SkywardError> {
        self.eop.dut1(utc.mjd())
    }

    /// Polar motion x at an instant, in radians.
    pub fn xpolar_at(&self, utc: &TimeInstant) -> Result<Radian, SkywardError> {
        self.eop.xpolar(utc.mjd())
    }

    /// Polar motion y at an instant, in radians.
    pub fn ypolar_at(&self, utc: &TimeInstant) -> Result<Radian, SkywardError> {
        self.eop.ypolar(utc.mjd())
    }
}
