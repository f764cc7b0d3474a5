use hifitime::Epoch;

use super::GregorianDate;
use crate::constants::SECONDS_PER_DAY;
use crate::skyward_errors::SkywardError;

/// Source of the current civil date.
///
/// [`TimeInstant::current`](super::TimeInstant::current) only sees the Gregorian
/// tuple returned here, so a fixed clock exercises the same conversion path as the
/// real one.
pub trait WallClock {
    fn now_utc(&self) -> Result<GregorianDate, SkywardError>;
}

/// The operating system clock, read through [`hifitime::Epoch::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now_utc(&self) -> Result<GregorianDate, SkywardError> {
        let (year, month, day, hour, minute, second, nanos) = Epoch::now()?.to_gregorian_utc();
        let seconds = hour as f64 * 3600.0
            + minute as f64 * 60.0
            + second as f64
            + nanos as f64 * 1e-9;

        Ok(GregorianDate::new(
            year,
            month as u32,
            day as u32,
            seconds / SECONDS_PER_DAY,
        ))
    }
}

/// A clock frozen on a given date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock(pub GregorianDate);

impl WallClock for FixedClock {
    fn now_utc(&self) -> Result<GregorianDate, SkywardError> {
        Ok(self.0)
    }
}
