use std::time::Instant;

use super::clock::WallClock;
use super::{DateFormat, GregorianDate, TimeInstant};
use crate::constants::{JDTOMJD, JD, MJD, SECONDS_PER_DAY};
use crate::skyward_errors::SkywardError;

/// A live date that keeps advancing with the wall clock.
///
/// Every read recomputes `base_jd + elapsed_seconds * speed / 86400`, where the
/// elapsed time is measured from construction or from the last call to
/// [`RunningInstant::set`] / [`RunningInstant::reset_timer`]. A speed of `0`
/// freezes the date and a negative speed runs it backwards.
#[derive(Debug, Clone)]
pub struct RunningInstant {
    base: TimeInstant,
    start: Instant,
    speed: f64,
}

impl RunningInstant {
    pub fn new(base: TimeInstant) -> Self {
        RunningInstant {
            base,
            start: Instant::now(),
            speed: 1.0,
        }
    }

    /// Start running from the current date given by `clock`.
    pub fn from_clock(clock: &dyn WallClock) -> Result<Self, SkywardError> {
        Ok(Self::new(TimeInstant::current(clock)?))
    }

    /// Wall-clock seconds since the timer was started.
    pub fn run_time(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Elapsed seconds multiplied by the speed factor.
    pub fn scaled_run_time(&self) -> f64 {
        self.speed * self.run_time()
    }

    /// Julian date reached after `elapsed_seconds` of wall-clock time.
    pub fn jd_at_elapsed(&self, elapsed_seconds: f64) -> JD {
        self.base.jd() + self.speed * elapsed_seconds / SECONDS_PER_DAY
    }

    pub fn jd(&self) -> JD {
        self.jd_at_elapsed(self.run_time())
    }

    pub fn mjd(&self) -> MJD {
        self.jd() - JDTOMJD
    }

    pub fn gregorian(&self) -> Result<GregorianDate, SkywardError> {
        Ok(self.snapshot()?.gregorian())
    }

    /// Freeze the current value into a plain [`TimeInstant`].
    pub fn snapshot(&self) -> Result<TimeInstant, SkywardError> {
        TimeInstant::from_jd(self.jd())
    }

    pub fn base(&self) -> &TimeInstant {
        &self.base
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    /// Re-base the date and restart the timer.
    pub fn set(&mut self, value: f64, format: DateFormat) -> Result<(), SkywardError> {
        self.base.set(value, format)?;
        self.reset_timer();
        Ok(())
    }

    pub fn reset_timer(&mut self) {
        self.start = Instant::now();
    }
}
