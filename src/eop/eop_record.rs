//! Tabulated Earth orientation records and the bracketing lookup used on them.
//!
//! A table is a slice of [`TableEntry`] sorted by strictly increasing integer MJD.
//! [`lookup`] finds the greatest tabulated day not after the query and either
//! returns that row as-is (values hold for the whole day) or interpolates linearly
//! toward the following row.

use itertools::Itertools;

use crate::constants::{Radian, Seconds, MJD};
use crate::skyward_errors::SkywardError;

/// One tabulated day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableEntry<V> {
    pub mjd: i64,
    pub values: V,
}

impl<V> TableEntry<V> {
    pub fn new(mjd: i64, values: V) -> Self {
        TableEntry { mjd, values }
    }
}

/// Earth orientation values of one IERS `finals2000A` day, angles already in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EopValues {
    /// UT1 − UTC
    pub dut1: Seconds,
    /// Polar motion x
    pub xp: Radian,
    /// Polar motion y
    pub yp: Radian,
    /// Celestial pole offset in longitude
    pub dpsi: Radian,
    /// Celestial pole offset in obliquity
    pub deps: Radian,
}

pub type EopRecord = TableEntry<EopValues>;

/// TT − UT1 in seconds.
pub type DeltaTRecord = TableEntry<Seconds>;

/// Values that can be linearly interpolated between two tabulated days.
pub trait Interpolate: Copy {
    fn interpolate(x: f64, x0: f64, y0: &Self, x1: f64, y1: &Self) -> Self;
}

fn interp_value(x: f64, x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
    (y0 * (x1 - x) + y1 * (x - x0)) / (x1 - x0)
}

impl Interpolate for f64 {
    fn interpolate(x: f64, x0: f64, y0: &Self, x1: f64, y1: &Self) -> Self {
        interp_value(x, x0, *y0, x1, *y1)
    }
}

impl Interpolate for EopValues {
    fn interpolate(x: f64, x0: f64, y0: &Self, x1: f64, y1: &Self) -> Self {
        EopValues {
            dut1: interp_value(x, x0, y0.dut1, x1, y1.dut1),
            xp: interp_value(x, x0, y0.xp, x1, y1.xp),
            yp: interp_value(x, x0, y0.yp, x1, y1.yp),
            dpsi: interp_value(x, x0, y0.dpsi, x1, y1.dpsi),
            deps: interp_value(x, x0, y0.deps, x1, y1.deps),
        }
    }
}

/// Check that a table is non empty with strictly increasing MJD keys.
pub(crate) fn check_table<V>(table: &[TableEntry<V>], name: &str) -> Result<(), SkywardError> {
    if table.is_empty() {
        return Err(SkywardError::CorrectionsLoadError(format!(
            "{name} holds no usable rows"
        )));
    }
    if let Some((prev, next)) = table
        .iter()
        .tuple_windows()
        .find(|(prev, next)| next.mjd <= prev.mjd)
    {
        return Err(SkywardError::CorrectionsLoadError(format!(
            "{name} is not sorted: mjd {} follows mjd {}",
            next.mjd, prev.mjd
        )));
    }
    Ok(())
}

/// Find the values valid at `mjd`.
///
/// Arguments
/// ---------
/// * `table`: entries sorted by increasing MJD
/// * `mjd`: query date
/// * `interpolate`: `false` returns the bracketing lower row unchanged,
///   `true` interpolates linearly between the lower and upper rows
///
/// Return
/// ------
/// * the values at `mjd`
/// * [`SkywardError::InvalidValue`] when no row precedes `mjd` or when the
///   preceding row is the last one, with the supported range in the message
pub fn lookup<V: Interpolate>(
    table: &[TableEntry<V>],
    mjd: MJD,
    interpolate: bool,
) -> Result<V, SkywardError> {
    let (Some(first), Some(last)) = (table.first(), table.last()) else {
        return Err(SkywardError::InvalidValue(format!(
            "Invalid mjd: {mjd}. No correction values are loaded"
        )));
    };

    let upper = table.partition_point(|entry| entry.mjd as f64 <= mjd);
    if upper == 0 || upper == table.len() {
        return Err(SkywardError::InvalidValue(format!(
            "Invalid mjd: {mjd}. Accepted range is {} - {}",
            first.mjd, last.mjd
        )));
    }

    let lower = &table[upper - 1];
    if !interpolate {
        return Ok(lower.values);
    }

    let upper = &table[upper];
    Ok(V::interpolate(
        mjd,
        lower.mjd as f64,
        &lower.values,
        upper.mjd as f64,
        &upper.values,
    ))
}
